//! Datalink capture plumbing.
//!
//! Opening the channel and reading from it are blocking pnet operations, so
//! a dedicated thread forwards every captured frame into a tokio queue the
//! async side can `select!` on.

use std::time::Duration;

use anyhow::{Context, bail};
use pnet::datalink::{self, Channel, Config, DataLinkSender, NetworkInterface};
use tokio::sync::mpsc;

const READ_TIMEOUT: Duration = Duration::from_millis(50);

/// Sending half plus the capture queue of one Ethernet channel.
pub struct EthernetHandle {
    pub tx: Box<dyn DataLinkSender>,
    pub rx: mpsc::UnboundedReceiver<Vec<u8>>,
}

/// Opens the interface's Ethernet channel and spawns the capture thread.
///
/// The thread exits once the queue's receiving half is dropped; the short
/// read timeout is what gives it a chance to notice.
pub fn start_capture(intf: &NetworkInterface) -> anyhow::Result<EthernetHandle> {
    let cfg = Config {
        read_timeout: Some(READ_TIMEOUT),
        ..Default::default()
    };

    let ch: Channel = datalink::channel(intf, cfg)
        .with_context(|| format!("opening channel on {}", intf.name))?;

    let (tx, mut eth_rx) = match ch {
        Channel::Ethernet(tx, rx) => (tx, rx),
        _ => bail!("non-ethernet channel for {}", intf.name),
    };

    let (queue_tx, queue_rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        loop {
            match eth_rx.next() {
                Ok(frame) => {
                    if queue_tx.send(frame.to_vec()).is_err() {
                        break;
                    }
                }
                Err(_) => {
                    if queue_tx.is_closed() {
                        break;
                    }
                }
            }
        }
    });

    Ok(EthernetHandle { tx, rx: queue_rx })
}
