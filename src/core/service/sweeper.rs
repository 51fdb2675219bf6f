//! Periodic ARP maintenance.

use std::io;
use std::sync::Arc;
use std::thread::{
    self,
    JoinHandle,
};

use crate::core::arp_queue::{
    Origin,
    PendingArpRequest,
};
use crate::core::repr::{
    EthernetFrame,
    Icmpv4DestinationUnreachable,
    Icmpv4Repr,
    Ipv4Packet,
};
use crate::core::service::{
    arp,
    icmpv4,
    Router,
};
use crate::core::time::Env;
use crate::Result;

/// Runs one sweep over the ARP state.
///
/// Stale cache entries are purged and pending requests polled under the lock.
/// Retransmissions and host unreachable errors for abandoned frames are sent
/// after the lock is released.
pub fn sweep<T: Env>(router: &Router<T>) {
    let poll = {
        let mut arp = router.arp();
        let expired = arp.cache.expire_eth_addr();
        if expired > 0 {
            debug!("Expired {} ARP cache entries.", expired);
        }
        arp.pending.poll()
    };

    for solicitation in poll.retransmit {
        if let Err(err) = arp::send_request(router, &solicitation) {
            debug!(
                "Error retransmitting ARP request for {} with {:?}.",
                solicitation.target, err
            );
        }
    }

    for request in poll.failed {
        fail_request(router, request);
    }
}

fn fail_request<T: Env>(router: &Router<T>, request: PendingArpRequest) {
    warn!(
        "ARP for {} via {} unanswered after {} attempts, dropping {} frames.",
        request.target,
        request.interface,
        request.attempts,
        request.frames.len()
    );

    for queued in request.frames {
        let name = match queued.origin {
            Origin::Forwarded(name) => name,
            Origin::Local => {
                debug!("Dropping local frame waiting on {}.", request.target);
                continue;
            }
        };
        if let Err(err) = send_host_unreachable(router, &name, &queued.frame) {
            debug!("Error sending host unreachable via {} with {:?}.", name, err);
        }
    }
}

/// Sends host unreachable for a queued frame.
///
/// The error is sourced from the arrival interface's address, then routed to
/// the original sender like any datagram the router originates, so it may
/// leave through a different interface.
fn send_host_unreachable<T: Env>(router: &Router<T>, name: &str, eth_buffer: &[u8]) -> Result<()> {
    let interface = match router.interfaces.by_name(name) {
        Some(interface) => interface,
        None => return Ok(()),
    };
    let eth_frame = EthernetFrame::try_new(eth_buffer)?;
    let ipv4_packet = Ipv4Packet::try_new(eth_frame.payload())?;

    icmpv4::send_error(
        router,
        interface,
        &ipv4_packet,
        Icmpv4Repr::DestinationUnreachable(Icmpv4DestinationUnreachable::HostUnreachable),
    )
}

/// Spawns a thread which sweeps the router every sweep interval, for as long
/// as the process runs.
pub fn spawn<T: Env + 'static>(router: Arc<Router<T>>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("arp-sweeper".to_string())
        .spawn(move || {
            info!(
                "Sweeping ARP state every {:?}.",
                router.config.sweep_interval
            );
            loop {
                thread::sleep(router.config.sweep_interval);
                router.sweep();
            }
        })
}
