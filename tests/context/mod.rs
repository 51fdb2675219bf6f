#![allow(dead_code)]

use std::sync::atomic::{
    AtomicBool,
    Ordering,
};
use std::sync::Arc;
use std::time::Duration;

use usrouter::core::config::Config;
use usrouter::core::interface::Interface;
use usrouter::core::link::{
    self,
    Capture,
    Link,
};
use usrouter::core::repr::{
    eth_types,
    ipv4_protocols,
    Arp,
    ArpOp,
    EthernetAddress,
    EthernetFrame,
    Icmpv4Packet,
    Icmpv4Repr,
    Ipv4Address,
    Ipv4Packet,
    Ipv4Repr,
};
use usrouter::core::route::RoutingTable;
use usrouter::core::service::Router;
use usrouter::core::time::MockEnv;

lazy_static! {
    pub static ref ETH0_MAC: EthernetAddress = EthernetAddress::new([0x02, 0, 0, 0, 0, 0x01]);
    pub static ref ETH0_IP: Ipv4Address = Ipv4Address::new([10, 0, 0, 1]);
    pub static ref ETH1_MAC: EthernetAddress = EthernetAddress::new([0x02, 0, 0, 0, 0, 0x02]);
    pub static ref ETH1_IP: Ipv4Address = Ipv4Address::new([192, 168, 1, 1]);
    /// A host on the eth0 network.
    pub static ref HOST_MAC: EthernetAddress = EthernetAddress::new([0x02, 0, 0, 0, 0xAA, 0x07]);
    pub static ref HOST_IP: Ipv4Address = Ipv4Address::new([10, 0, 0, 7]);
    /// The upstream router on the eth1 network.
    pub static ref GATEWAY_MAC: EthernetAddress = EthernetAddress::new([0x02, 0, 0, 0, 0xBB, 0x02]);
    pub static ref GATEWAY_IP: Ipv4Address = Ipv4Address::new([192, 168, 1, 2]);
}

pub const ROUTES: &str = "10.0.0.0    0.0.0.0     255.255.255.0 eth0\n\
                          192.168.1.0 0.0.0.0     255.255.255.0 eth1\n\
                          0.0.0.0     192.168.1.2 0.0.0.0       eth1\n";

/// A link which records frames sent while up and fails every send while down.
#[derive(Default)]
pub struct Switch {
    capture: Capture,
    down: AtomicBool,
}

impl Switch {
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }
}

impl Link for Switch {
    fn send(&self, buffer: &[u8], interface: &str) -> link::Result<()> {
        if self.down.load(Ordering::SeqCst) {
            Err(link::Error::Unknown("link down"))
        } else {
            self.capture.send(buffer, interface)
        }
    }
}

/// A router with a mock clock and a link that records every frame sent.
pub struct Context {
    pub router: Arc<Router<MockEnv>>,
    pub link: Arc<Switch>,
    pub env: MockEnv,
}

impl Context {
    pub fn new() -> Context {
        Context::with_routes(ROUTES)
    }

    pub fn with_routes(routes: &str) -> Context {
        let _ = env_logger::try_init();

        let interfaces = vec![
            Interface::new("eth0", *ETH0_MAC, *ETH0_IP),
            Interface::new("eth1", *ETH1_MAC, *ETH1_IP),
        ];

        let mut routing_table = RoutingTable::new();
        routing_table.load(routes.as_bytes()).unwrap();

        let link = Arc::new(Switch::default());
        let env = MockEnv::new();
        let router = Router::new(
            interfaces,
            routing_table,
            Box::new(link.clone()),
            Config::default(),
            env.clone(),
        )
        .unwrap();

        Context {
            router: Arc::new(router),
            link,
            env,
        }
    }

    /// Removes and returns every frame sent so far.
    pub fn sent(&self) -> Vec<(String, Vec<u8>)> {
        self.link.capture.drain()
    }

    /// Advances the clock by a second and runs a sweep.
    pub fn tick(&self) {
        self.env.advance(Duration::from_secs(1));
        self.router.sweep();
    }

    /// Teaches the router a neighbor's address with an ARP reply.
    pub fn learn(&self, interface: &str, ipv4_addr: Ipv4Address, eth_addr: EthernetAddress) {
        let (dst_eth_addr, dst_ipv4_addr) = match interface {
            "eth0" => (*ETH0_MAC, *ETH0_IP),
            _ => (*ETH1_MAC, *ETH1_IP),
        };
        let frame = arp_frame(
            ArpOp::Reply,
            eth_addr,
            ipv4_addr,
            dst_eth_addr,
            dst_ipv4_addr,
            dst_eth_addr,
        );
        self.router.recv_frame(&frame, interface).unwrap();
    }
}

pub fn arp_frame(
    op: ArpOp,
    source_hw_addr: EthernetAddress,
    source_proto_addr: Ipv4Address,
    target_hw_addr: EthernetAddress,
    target_proto_addr: Ipv4Address,
    dst_addr: EthernetAddress,
) -> Vec<u8> {
    let arp_repr = Arp {
        op,
        source_hw_addr,
        source_proto_addr,
        target_hw_addr,
        target_proto_addr,
    };

    let mut buffer = vec![0; EthernetFrame::<&[u8]>::buffer_len(arp_repr.buffer_len())];
    {
        let mut frame = EthernetFrame::try_new(&mut buffer[..]).unwrap();
        frame.set_dst_addr(dst_addr);
        frame.set_src_addr(source_hw_addr);
        frame.set_payload_type(eth_types::ARP);
        arp_repr.serialize(frame.payload_mut()).unwrap();
    }
    buffer
}

/// Builds an Ethernet frame carrying an IPv4 datagram with a valid checksum.
pub fn ipv4_frame(
    dst_eth_addr: EthernetAddress,
    src_addr: Ipv4Address,
    dst_addr: Ipv4Address,
    ttl: u8,
    protocol: u8,
    payload: &[u8],
) -> Vec<u8> {
    let ipv4_repr = Ipv4Repr {
        src_addr,
        dst_addr,
        protocol,
        ttl,
        identification: 0x1234,
        payload_len: payload.len() as u16,
    };

    let mut buffer = vec![0; EthernetFrame::<&[u8]>::buffer_len(ipv4_repr.buffer_len())];
    {
        let mut frame = EthernetFrame::try_new(&mut buffer[..]).unwrap();
        frame.set_dst_addr(dst_eth_addr);
        frame.set_src_addr(*HOST_MAC);
        frame.set_payload_type(eth_types::IPV4);
        ipv4_repr.serialize(frame.payload_mut()).unwrap();
        let mut packet = Ipv4Packet::try_new(frame.payload_mut()).unwrap();
        packet.payload_mut().copy_from_slice(payload);
    }
    buffer
}

/// Builds an ICMP message with a valid checksum.
pub fn icmp_packet(icmp_repr: Icmpv4Repr, data: &[u8]) -> Vec<u8> {
    let mut buffer = vec![0; Icmpv4Packet::<&[u8]>::buffer_len(data.len())];
    {
        let mut packet = Icmpv4Packet::try_new(&mut buffer[..]).unwrap();
        packet.payload_mut().copy_from_slice(data);
        icmp_repr.serialize(&mut packet);
    }
    buffer
}

/// A datagram from the eth0 host towards dst_addr.
pub fn host_datagram(dst_addr: Ipv4Address, ttl: u8) -> Vec<u8> {
    ipv4_frame(
        *ETH0_MAC,
        *HOST_IP,
        dst_addr,
        ttl,
        ipv4_protocols::UDP,
        &[0xDE, 0xAD, 0xBE, 0xEF, 0, 1, 2, 3, 4, 5, 6, 7],
    )
}

/// Splits a sent frame into its Ethernet and IPv4 views.
pub fn parse_ipv4(frame: &[u8]) -> (EthernetFrame<&[u8]>, Ipv4Packet<&[u8]>) {
    let eth_frame = EthernetFrame::try_new(frame).unwrap();
    assert_eq!(eth_frame.payload_type(), eth_types::IPV4);
    let ipv4_packet = Ipv4Packet::try_new(&frame[EthernetFrame::<&[u8]>::HEADER_LEN..]).unwrap();
    ipv4_packet.check_encoding().unwrap();
    (eth_frame, ipv4_packet)
}

/// Parses the ICMP message carried by a sent frame.
pub fn parse_icmp(frame: &[u8]) -> (Ipv4Packet<&[u8]>, Icmpv4Repr, Vec<u8>) {
    let (_, ipv4_packet) = parse_ipv4(frame);
    assert_eq!(ipv4_packet.protocol(), ipv4_protocols::ICMP);
    let icmp_packet = Icmpv4Packet::try_new(ipv4_packet.payload()).unwrap();
    icmp_packet.check_encoding().unwrap();
    let icmp_repr = Icmpv4Repr::deserialize(&icmp_packet).unwrap();
    let payload = icmp_packet.payload().to_vec();
    (ipv4_packet, icmp_repr, payload)
}

/// Parses a sent ARP packet, returning it with the frame's destination.
pub fn parse_arp(frame: &[u8]) -> (EthernetAddress, Arp) {
    let eth_frame = EthernetFrame::try_new(frame).unwrap();
    assert_eq!(eth_frame.payload_type(), eth_types::ARP);
    (eth_frame.dst_addr(), Arp::deserialize(eth_frame.payload()).unwrap())
}
