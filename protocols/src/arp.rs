//! Address-resolution frames for the discovery sweep.

use std::net::Ipv4Addr;

use pnet::datalink::MacAddr;
use pnet::packet::Packet;
use pnet::packet::arp::{ArpHardwareTypes, ArpOperations, ArpPacket, MutableArpPacket};
use pnet::packet::ethernet::{EtherTypes, EthernetPacket, MutableEthernetPacket};
use thiserror::Error;

pub const ETH_HDR_LEN: usize = 14;
pub const ARP_LEN: usize = 28;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PacketError {
    #[error("buffer too small for an Ethernet header")]
    EthernetBuffer,
    #[error("buffer too small for an ARP payload")]
    ArpBuffer,
}

/// Builds a broadcast ARP request asking who holds `target_addr`.
pub fn build_request(
    src_mac: MacAddr,
    src_addr: Ipv4Addr,
    target_addr: Ipv4Addr,
) -> Result<Vec<u8>, PacketError> {
    let mut buffer: Vec<u8> = vec![0u8; ETH_HDR_LEN + ARP_LEN];

    {
        let mut eth = MutableEthernetPacket::new(&mut buffer[..ETH_HDR_LEN])
            .ok_or(PacketError::EthernetBuffer)?;
        eth.set_source(src_mac);
        eth.set_destination(MacAddr::broadcast());
        eth.set_ethertype(EtherTypes::Arp);
    }

    {
        let mut arp =
            MutableArpPacket::new(&mut buffer[ETH_HDR_LEN..]).ok_or(PacketError::ArpBuffer)?;
        arp.set_hardware_type(ArpHardwareTypes::Ethernet);
        arp.set_protocol_type(EtherTypes::Ipv4);
        arp.set_hw_addr_len(6);
        arp.set_proto_addr_len(4);
        arp.set_operation(ArpOperations::Request);
        arp.set_sender_hw_addr(src_mac);
        arp.set_sender_proto_addr(src_addr);
        arp.set_target_hw_addr(MacAddr::zero());
        arp.set_target_proto_addr(target_addr);
    }

    Ok(buffer)
}

/// Extracts `(sender address, sender MAC)` from an ARP reply frame.
///
/// Returns `None` for anything that is not an ARP reply, so the capture loop
/// can feed every frame through without filtering first.
pub fn parse_reply(frame: &[u8]) -> Option<(Ipv4Addr, MacAddr)> {
    let eth = EthernetPacket::new(frame)?;
    if eth.get_ethertype() != EtherTypes::Arp {
        return None;
    }

    let arp = ArpPacket::new(eth.payload())?;
    if arp.get_operation() != ArpOperations::Reply {
        return None;
    }

    Some((arp.get_sender_proto_addr(), arp.get_sender_hw_addr()))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
