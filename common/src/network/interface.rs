use std::net::Ipv4Addr;

use anyhow::Context;
use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::{IpNetwork, Ipv4Network};

/// Generic helpers on top of [`NetworkInterface`].
pub trait NetworkInterfaceExt {
    fn ipv4_nets(&self) -> Vec<Ipv4Network>;
    fn first_ipv4(&self) -> Option<Ipv4Addr>;
    /// Up, not loopback, and carries both a MAC and an IPv4 network.
    fn is_usable(&self) -> bool;
}

impl NetworkInterfaceExt for NetworkInterface {
    fn ipv4_nets(&self) -> Vec<Ipv4Network> {
        self.ips
            .iter()
            .filter_map(|ip| {
                if let IpNetwork::V4(ipv4) = ip {
                    Some(*ipv4)
                } else {
                    None
                }
            })
            .collect()
    }

    fn first_ipv4(&self) -> Option<Ipv4Addr> {
        self.ipv4_nets().first().map(|net| net.ip())
    }

    fn is_usable(&self) -> bool {
        self.is_up() && !self.is_loopback() && self.mac.is_some() && !self.ipv4_nets().is_empty()
    }
}

/// First usable interface, in enumeration order.
pub fn default_interface() -> anyhow::Result<NetworkInterface> {
    datalink::interfaces()
        .into_iter()
        .find(|intf| intf.is_usable())
        .context("no usable non-loopback interface with an IPv4 address")
}

/// IPv4 network of the default LAN interface.
pub fn lan_ipv4_network() -> anyhow::Result<Ipv4Network> {
    let intf = default_interface()?;
    intf.ipv4_nets()
        .into_iter()
        .next()
        .with_context(|| format!("interface {} has no IPv4 network", intf.name))
}

/// Interface owning `addr`, falling back to the default interface so that
/// routed sweeps still have a channel to send on.
pub fn interface_for(addr: Ipv4Addr) -> anyhow::Result<NetworkInterface> {
    let owning = datalink::interfaces().into_iter().find(|intf| {
        intf.is_usable() && intf.ipv4_nets().iter().any(|net| net.contains(addr))
    });

    match owning {
        Some(intf) => Ok(intf),
        None => default_interface(),
    }
}
