use crate::core::arp_queue::QueuedFrame;
use crate::core::interface::Interface;
use crate::core::repr::{
    eth_types,
    EthernetAddress,
    EthernetFrame,
    Icmpv4DestinationUnreachable,
    Icmpv4Repr,
    Icmpv4TimeExceeded,
    Ipv4Address,
    Ipv4Packet,
};
use crate::core::service::{
    arp,
    icmpv4,
    Router,
};
use crate::core::time::Env;
use crate::{
    Error,
    Result,
};

/// Receives an IPv4 datagram from an interface.
///
/// Datagrams for one of the router's own addresses are handed to the ICMP
/// service. Everything else is forwarded along the most specific route, or
/// answered with an ICMP error when its TTL runs out or no route exists.
///
/// eth_buffer holds the complete Ethernet frame the datagram arrived in.
pub fn recv_packet<T: Env>(
    router: &Router<T>,
    interface: &Interface,
    eth_buffer: &[u8],
) -> Result<()> {
    let eth_frame = EthernetFrame::try_new(eth_buffer)?;
    let ipv4_packet = Ipv4Packet::try_new(eth_frame.payload())?;
    ipv4_packet.check_encoding()?;

    let dst_addr = ipv4_packet.dst_addr();

    if router.interfaces.by_ipv4_addr(dst_addr).is_some() {
        return icmpv4::recv_packet(router, interface, &ipv4_packet);
    }

    if ipv4_packet.ttl() <= 1 {
        debug!(
            "TTL expired for datagram from {} to {}.",
            ipv4_packet.src_addr(),
            dst_addr
        );
        return icmpv4::send_error(
            router,
            interface,
            &ipv4_packet,
            Icmpv4Repr::TimeExceeded(Icmpv4TimeExceeded::TTLExpired),
        );
    }

    let route = match router.routing_table.lookup(dst_addr) {
        Some(route) => route,
        None => {
            debug!("No route for datagram to {}.", dst_addr);
            return icmpv4::send_error(
                router,
                interface,
                &ipv4_packet,
                Icmpv4Repr::DestinationUnreachable(Icmpv4DestinationUnreachable::NetUnreachable),
            );
        }
    };
    let out_interface = egress_interface(router, &route.interface)?;
    let next_hop = route.next_hop(dst_addr);

    let dst_eth_addr = match resolve_or_enqueue(router, out_interface, next_hop, || {
        QueuedFrame::forwarded(eth_buffer.to_vec(), interface.name.clone())
    })? {
        Some(eth_addr) => eth_addr,
        None => return Ok(()),
    };

    // Ethernet padding is not forwarded.
    let frame_len = EthernetFrame::<&[u8]>::buffer_len(ipv4_packet.packet_len() as usize);
    let ttl = ipv4_packet.ttl();
    let mut out_buffer = eth_buffer[..frame_len].to_vec();
    {
        let mut out_frame = EthernetFrame::try_new(&mut out_buffer[..])?;
        out_frame.set_src_addr(out_interface.ethernet_addr);
        out_frame.set_dst_addr(dst_eth_addr);
        let mut out_packet = Ipv4Packet::try_new(out_frame.payload_mut())?;
        out_packet.set_ttl(ttl - 1);
        out_packet.fill_checksum();
    }

    debug!(
        "Forwarding datagram to {} via {} on {}.",
        dst_addr, next_hop, out_interface.name
    );
    router.transmit(&out_buffer, &out_interface.name)
}

/// Sends an IPv4 datagram originated by the router.
///
/// The datagram is routed like a forwarded one but keeps its TTL.
pub fn send_packet<T: Env>(router: &Router<T>, ipv4_buffer: &[u8]) -> Result<()> {
    let mut eth_buffer = vec![0; EthernetFrame::<&[u8]>::buffer_len(ipv4_buffer.len())];
    {
        let mut eth_frame = EthernetFrame::try_new(&mut eth_buffer[..])?;
        eth_frame.set_payload_type(eth_types::IPV4);
        eth_frame.payload_mut().copy_from_slice(ipv4_buffer);
    }
    send_frame(router, eth_buffer)
}

/// Sends an Ethernet frame carrying a datagram originated by the router,
/// filling in its addresses once the next hop resolves.
pub fn send_frame<T: Env>(router: &Router<T>, mut eth_buffer: Vec<u8>) -> Result<()> {
    let dst_addr = {
        let eth_frame = EthernetFrame::try_new(&eth_buffer[..])?;
        Ipv4Packet::try_new(eth_frame.payload())?.dst_addr()
    };

    let route = match router.routing_table.lookup(dst_addr) {
        Some(route) => route,
        None => {
            debug!("No route for local datagram to {}.", dst_addr);
            return Err(Error::NoRoute(dst_addr));
        }
    };
    let out_interface = egress_interface(router, &route.interface)?;
    let next_hop = route.next_hop(dst_addr);

    let dst_eth_addr = match resolve_or_enqueue(router, out_interface, next_hop, || {
        QueuedFrame::local(eth_buffer.clone())
    })? {
        Some(eth_addr) => eth_addr,
        None => return Ok(()),
    };

    {
        let mut eth_frame = EthernetFrame::try_new(&mut eth_buffer[..])?;
        eth_frame.set_src_addr(out_interface.ethernet_addr);
        eth_frame.set_dst_addr(dst_eth_addr);
    }
    router.transmit(&eth_buffer, &out_interface.name)
}

fn egress_interface<'a, T: Env>(router: &'a Router<T>, name: &str) -> Result<&'a Interface> {
    router
        .interfaces
        .by_name(name)
        .ok_or_else(|| Error::Config(format!("route uses unknown interface {}", name)))
}

/// Looks up the Ethernet address of a next hop.
///
/// On a miss the frame produced by queued waits for the next hop to resolve,
/// and an ARP request is sent if none is outstanding yet. The lookup and the
/// enqueue happen under one lock so a reply cannot slip in between them.
fn resolve_or_enqueue<T, F>(
    router: &Router<T>,
    out_interface: &Interface,
    next_hop: Ipv4Address,
    queued: F,
) -> Result<Option<EthernetAddress>>
where
    T: Env,
    F: FnOnce() -> QueuedFrame,
{
    let solicitation = {
        let mut arp = router.arp();
        if let Some(eth_addr) = arp.cache.eth_addr_for_ip(next_hop) {
            return Ok(Some(eth_addr));
        }
        arp.pending.enqueue(next_hop, queued(), &out_interface.name)
    };

    debug!("Queued frame waiting on ARP for {}.", next_hop);

    if let Some(solicitation) = solicitation {
        arp::send_request(router, &solicitation)?;
    }

    Ok(None)
}
