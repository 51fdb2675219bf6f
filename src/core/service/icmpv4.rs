use byteorder::{
    ByteOrder,
    NetworkEndian,
};

use crate::core::interface::Interface;
use crate::core::repr::{
    icmpv4_types,
    ipv4_protocols,
    Icmpv4DestinationUnreachable,
    Icmpv4Packet,
    Icmpv4Repr,
    Ipv4Address,
    Ipv4Packet,
    Ipv4Repr,
};
use crate::core::service::{
    ipv4,
    Router,
};
use crate::core::time::Env;
use crate::Result;

/// Sends an ICMP packet originated by the router.
///
/// The closure fills in payload_len bytes of ICMP payload before the header
/// and checksum are written.
pub fn send_packet<T, F>(
    router: &Router<T>,
    src_addr: Ipv4Address,
    dst_addr: Ipv4Address,
    icmp_repr: &Icmpv4Repr,
    payload_len: usize,
    f: F,
) -> Result<()>
where
    T: Env,
    F: FnOnce(&mut [u8]),
{
    let ipv4_repr = Ipv4Repr {
        src_addr,
        dst_addr,
        protocol: ipv4_protocols::ICMP,
        ttl: router.config.icmp_ttl,
        identification: rand::random::<u16>(),
        payload_len: Icmpv4Packet::<&[u8]>::buffer_len(payload_len) as u16,
    };

    let mut ipv4_buffer = vec![0; ipv4_repr.buffer_len()];
    ipv4_repr.serialize(&mut ipv4_buffer)?;
    {
        let mut ipv4_packet = Ipv4Packet::try_new(&mut ipv4_buffer[..])?;
        let mut icmp_packet = Icmpv4Packet::try_new(ipv4_packet.payload_mut())?;
        f(icmp_packet.payload_mut());
        icmp_repr.serialize(&mut icmp_packet);
    }

    ipv4::send_packet(router, &ipv4_buffer)
}

/// Receives an IPv4 datagram addressed to one of the router's interfaces.
///
/// Echo requests are answered with echo replies. Any other ICMP message is
/// answered with host unreachable, and any other protocol with port
/// unreachable.
pub fn recv_packet<T: Env>(
    router: &Router<T>,
    interface: &Interface,
    ipv4_packet: &Ipv4Packet<&[u8]>,
) -> Result<()> {
    if ipv4_packet.protocol() != ipv4_protocols::ICMP {
        debug!(
            "Got protocol {} datagram from {} for {}.",
            ipv4_packet.protocol(),
            ipv4_packet.src_addr(),
            ipv4_packet.dst_addr()
        );
        return send_error(
            router,
            interface,
            ipv4_packet,
            Icmpv4Repr::DestinationUnreachable(Icmpv4DestinationUnreachable::PortUnreachable),
        );
    }

    let icmp_packet = Icmpv4Packet::try_new(ipv4_packet.payload())?;
    icmp_packet.check_encoding()?;

    if icmp_packet._type() != icmpv4_types::ECHO_REQUEST {
        debug!(
            "Got ICMP type {} from {} for {}.",
            icmp_packet._type(),
            ipv4_packet.src_addr(),
            ipv4_packet.dst_addr()
        );
        return send_error(
            router,
            interface,
            ipv4_packet,
            Icmpv4Repr::DestinationUnreachable(Icmpv4DestinationUnreachable::HostUnreachable),
        );
    }

    debug!(
        "Got a ping from {}; Sending response...",
        ipv4_packet.src_addr()
    );

    let header = icmp_packet.header();
    let icmp_repr = Icmpv4Repr::EchoReply {
        id: NetworkEndian::read_u16(&header[0..2]),
        seq: NetworkEndian::read_u16(&header[2..4]),
    };
    let data = icmp_packet.payload();

    send_packet(
        router,
        ipv4_packet.dst_addr(),
        ipv4_packet.src_addr(),
        &icmp_repr,
        data.len(),
        |payload| payload.copy_from_slice(data),
    )
}

/// Sends an ICMP error about a datagram back to its source.
///
/// The error comes from the address of the interface the datagram arrived on
/// and quotes the original header plus the first 8 bytes of its payload.
pub fn send_error<T: Env>(
    router: &Router<T>,
    interface: &Interface,
    ipv4_packet: &Ipv4Packet<&[u8]>,
    icmp_repr: Icmpv4Repr,
) -> Result<()> {
    let header = ipv4_packet.header();
    let payload = ipv4_packet.payload();
    let quoted_len = payload.len().min(Icmpv4Repr::QUOTED_PAYLOAD_LEN);

    debug!(
        "Sending {:?} to {} via {}.",
        icmp_repr,
        ipv4_packet.src_addr(),
        interface.name
    );

    send_packet(
        router,
        interface.ipv4_addr,
        ipv4_packet.src_addr(),
        &icmp_repr,
        header.len() + quoted_len,
        |icmp_payload| {
            icmp_payload[..header.len()].copy_from_slice(header);
            icmp_payload[header.len()..].copy_from_slice(&payload[..quoted_len]);
        },
    )
}
