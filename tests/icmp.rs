#[macro_use]
extern crate assert_matches;
#[macro_use]
extern crate lazy_static;
extern crate usrouter;

mod context;

use context::*;
use usrouter::core::repr::{
    ipv4_protocols,
    EthernetAddress,
    Icmpv4DestinationUnreachable,
    Icmpv4Repr,
    Ipv4Address,
};
use usrouter::Error;

fn ping(context: &Context, dst_addr: Ipv4Address, data: &[u8]) -> Vec<(String, Vec<u8>)> {
    let icmp = icmp_packet(Icmpv4Repr::EchoRequest { id: 0xBEEF, seq: 3 }, data);
    let frame = ipv4_frame(*ETH0_MAC, *HOST_IP, dst_addr, 64, ipv4_protocols::ICMP, &icmp);
    context.router.recv_frame(&frame, "eth0").unwrap();
    context.sent()
}

#[test]
fn echo_request_answered() {
    let context = Context::new();
    context.learn("eth0", *HOST_IP, *HOST_MAC);

    let data: Vec<u8> = (0..56).collect();
    let sent = ping(&context, *ETH0_IP, &data);

    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "eth0");
    let (ipv4_packet, icmp_repr, payload) = parse_icmp(&sent[0].1);
    assert_eq!(icmp_repr, Icmpv4Repr::EchoReply { id: 0xBEEF, seq: 3 });
    assert_eq!(payload, data);
    assert_eq!(ipv4_packet.src_addr(), *ETH0_IP);
    assert_eq!(ipv4_packet.dst_addr(), *HOST_IP);
    assert_eq!(ipv4_packet.ttl(), 64);
}

#[test]
fn echo_request_for_other_interface_answered() {
    let context = Context::new();
    context.learn("eth0", *HOST_IP, *HOST_MAC);

    let sent = ping(&context, *ETH1_IP, &[9; 8]);

    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "eth0");
    let (ipv4_packet, icmp_repr, _) = parse_icmp(&sent[0].1);
    assert_matches!(icmp_repr, Icmpv4Repr::EchoReply { .. });
    assert_eq!(ipv4_packet.src_addr(), *ETH1_IP);
}

#[test]
fn echo_request_with_low_ttl_answered() {
    let context = Context::new();
    context.learn("eth0", *HOST_IP, *HOST_MAC);

    let icmp = icmp_packet(Icmpv4Repr::EchoRequest { id: 1, seq: 1 }, &[]);
    let frame = ipv4_frame(*ETH0_MAC, *HOST_IP, *ETH0_IP, 1, ipv4_protocols::ICMP, &icmp);
    context.router.recv_frame(&frame, "eth0").unwrap();

    let sent = context.sent();
    let (_, icmp_repr, _) = parse_icmp(&sent[0].1);
    assert_eq!(icmp_repr, Icmpv4Repr::EchoReply { id: 1, seq: 1 });
}

#[test]
fn udp_for_router_is_port_unreachable() {
    let context = Context::new();
    context.learn("eth0", *HOST_IP, *HOST_MAC);

    let frame = ipv4_frame(
        *ETH0_MAC,
        *HOST_IP,
        *ETH0_IP,
        64,
        ipv4_protocols::UDP,
        &[0x30, 0x39, 0x00, 0x35, 0, 12, 0, 0, 1, 2, 3, 4],
    );
    context.router.recv_frame(&frame, "eth0").unwrap();

    let sent = context.sent();
    assert_eq!(sent.len(), 1);
    let (ipv4_packet, icmp_repr, quoted) = parse_icmp(&sent[0].1);
    assert_eq!(
        icmp_repr,
        Icmpv4Repr::DestinationUnreachable(Icmpv4DestinationUnreachable::PortUnreachable)
    );
    assert_eq!(ipv4_packet.src_addr(), *ETH0_IP);
    assert_eq!(ipv4_packet.dst_addr(), *HOST_IP);
    assert_eq!(&quoted[..], &frame[14..14 + 28]);
}

#[test]
fn tcp_for_router_uses_arrival_interface_address() {
    let context = Context::new();
    context.learn("eth0", *HOST_IP, *HOST_MAC);

    let frame = ipv4_frame(
        *ETH0_MAC,
        *HOST_IP,
        *ETH1_IP,
        64,
        ipv4_protocols::TCP,
        &[0; 20],
    );
    context.router.recv_frame(&frame, "eth0").unwrap();

    let sent = context.sent();
    let (ipv4_packet, icmp_repr, _) = parse_icmp(&sent[0].1);
    assert_eq!(
        icmp_repr,
        Icmpv4Repr::DestinationUnreachable(Icmpv4DestinationUnreachable::PortUnreachable)
    );
    assert_eq!(ipv4_packet.src_addr(), *ETH0_IP);
}

#[test]
fn non_echo_icmp_for_router_is_host_unreachable() {
    let context = Context::new();
    context.learn("eth0", *HOST_IP, *HOST_MAC);

    let icmp = icmp_packet(Icmpv4Repr::EchoReply { id: 1, seq: 2 }, &[5; 4]);
    let frame = ipv4_frame(*ETH0_MAC, *HOST_IP, *ETH0_IP, 64, ipv4_protocols::ICMP, &icmp);
    context.router.recv_frame(&frame, "eth0").unwrap();

    let sent = context.sent();
    assert_eq!(sent.len(), 1);
    let (_, icmp_repr, quoted) = parse_icmp(&sent[0].1);
    assert_eq!(
        icmp_repr,
        Icmpv4Repr::DestinationUnreachable(Icmpv4DestinationUnreachable::HostUnreachable)
    );
    assert_eq!(quoted.len(), 20 + 8);
}

#[test]
fn short_payload_quoted_whole() {
    let context = Context::new();
    context.learn("eth0", *HOST_IP, *HOST_MAC);

    let frame = ipv4_frame(*ETH0_MAC, *HOST_IP, *ETH0_IP, 64, ipv4_protocols::UDP, &[1, 2, 3]);
    context.router.recv_frame(&frame, "eth0").unwrap();

    let sent = context.sent();
    let (_, _, quoted) = parse_icmp(&sent[0].1);
    assert_eq!(&quoted[..], &frame[14..]);
}

#[test]
fn bad_icmp_checksum_dropped() {
    let context = Context::new();
    context.learn("eth0", *HOST_IP, *HOST_MAC);

    let mut icmp = icmp_packet(Icmpv4Repr::EchoRequest { id: 1, seq: 2 }, &[5; 4]);
    icmp[8] ^= 0xFF;
    let frame = ipv4_frame(*ETH0_MAC, *HOST_IP, *ETH0_IP, 64, ipv4_protocols::ICMP, &icmp);

    assert_matches!(
        context.router.recv_frame(&frame, "eth0"),
        Err(Error::Checksum)
    );
    assert!(context.sent().is_empty());
}

#[test]
fn broadcast_destination_accepted() {
    let context = Context::new();
    context.learn("eth0", *HOST_IP, *HOST_MAC);

    let icmp = icmp_packet(Icmpv4Repr::EchoRequest { id: 4, seq: 4 }, &[]);
    let frame = ipv4_frame(
        EthernetAddress::BROADCAST,
        *HOST_IP,
        *ETH0_IP,
        64,
        ipv4_protocols::ICMP,
        &icmp,
    );
    context.router.recv_frame(&frame, "eth0").unwrap();
    assert_eq!(context.sent().len(), 1);
}
