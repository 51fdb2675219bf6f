use crate::core::arp_queue::{
    Origin,
    Solicitation,
};
use crate::core::interface::Interface;
use crate::core::repr::{
    eth_types,
    Arp,
    ArpOp,
    EthernetAddress,
    EthernetFrame,
    Ipv4Address,
};
use crate::core::service::{
    ethernet,
    ipv4,
    Router,
};
use crate::core::time::Env;
use crate::{
    Error,
    Result,
};

/// Sends an ARP packet via an interface.
pub fn send_packet<T: Env>(
    router: &Router<T>,
    interface: &Interface,
    arp_repr: &Arp,
    dst_addr: EthernetAddress,
) -> Result<()> {
    ethernet::send_frame(
        router,
        interface,
        dst_addr,
        eth_types::ARP,
        arp_repr.buffer_len(),
        |payload| arp_repr.serialize(payload),
    )
}

/// Broadcasts an ARP request for the solicited address out of the solicited
/// interface.
pub fn send_request<T: Env>(router: &Router<T>, solicitation: &Solicitation) -> Result<()> {
    let interface = router
        .interfaces
        .by_name(&solicitation.interface)
        .ok_or_else(|| Error::Config(format!("unknown interface {}", solicitation.interface)))?;

    let arp_repr = Arp {
        op: ArpOp::Request,
        source_hw_addr: interface.ethernet_addr,
        source_proto_addr: interface.ipv4_addr,
        target_hw_addr: EthernetAddress::UNSPECIFIED,
        target_proto_addr: solicitation.target,
    };

    debug!(
        "Sending ARP request for {} via {}.",
        solicitation.target, interface.name
    );
    send_packet(router, interface, &arp_repr, EthernetAddress::BROADCAST)
}

/// Receives an ARP packet from an interface.
///
/// Requests for any of the router's addresses are answered out of the arrival
/// interface. Replies update the ARP cache and release frames waiting on the
/// sender's address.
pub fn recv_packet<T: Env>(
    router: &Router<T>,
    interface: &Interface,
    eth_frame: &EthernetFrame<&[u8]>,
) -> Result<()> {
    let arp_repr = Arp::deserialize(eth_frame.payload())?;

    match arp_repr.op {
        ArpOp::Request => {
            if router
                .interfaces
                .by_ipv4_addr(arp_repr.target_proto_addr)
                .is_none()
            {
                debug!(
                    "Ignoring ARP request for {} on {}.",
                    arp_repr.target_proto_addr, interface.name
                );
                return Err(Error::NoOp);
            }

            let arp_reply = Arp {
                op: ArpOp::Reply,
                source_hw_addr: interface.ethernet_addr,
                source_proto_addr: arp_repr.target_proto_addr,
                target_hw_addr: arp_repr.source_hw_addr,
                target_proto_addr: arp_repr.source_proto_addr,
            };

            debug!(
                "Sending ARP reply to {}/{}.",
                arp_reply.target_proto_addr, arp_reply.target_hw_addr
            );

            send_packet(router, interface, &arp_reply, arp_reply.target_hw_addr)
        }
        ArpOp::Reply => {
            resolve(router, arp_repr.source_proto_addr, arp_repr.source_hw_addr);
            Ok(())
        }
    }
}

/// Records an address translation, then sends every frame that was waiting
/// on it.
fn resolve<T: Env>(router: &Router<T>, ipv4_addr: Ipv4Address, eth_addr: EthernetAddress) {
    debug!("Adding ARP mapping from {} to {}.", ipv4_addr, eth_addr);

    let request = {
        let mut arp = router.arp();
        arp.cache.set_eth_addr_for_ip(ipv4_addr, eth_addr);
        arp.pending.resolve(ipv4_addr)
    };

    let request = match request {
        Some(request) => request,
        None => return,
    };

    debug!(
        "Releasing {} frames waiting on {}.",
        request.frames.len(),
        ipv4_addr
    );

    for queued in request.frames {
        let result = match queued.origin {
            Origin::Forwarded(ref name) => match router.interfaces.by_name(name) {
                Some(interface) => ipv4::recv_packet(router, interface, &queued.frame),
                None => Err(Error::Config(format!("unknown interface {}", name))),
            },
            Origin::Local => ipv4::send_frame(router, queued.frame),
        };

        if let Err(err) = result {
            debug!("Dropping frame waiting on {} with {:?}.", ipv4_addr, err);
        }
    }
}
