//! Serialization and deserialization of network packets.
//!
//! The `repr` module provides views over byte buffers for frames and packets at
//! different network layers. Each view validates the buffer length before any
//! field is read, and every field lives at a fixed offset.

pub mod arp;
pub mod ethernet;
pub mod icmpv4;
pub mod ipv4;

pub use self::arp::{
    Arp,
    Op as ArpOp,
};
pub use self::ethernet::{
    eth_types,
    Address as EthernetAddress,
    Frame as EthernetFrame,
};
pub use self::icmpv4::{
    types as icmpv4_types,
    DestinationUnreachable as Icmpv4DestinationUnreachable,
    Packet as Icmpv4Packet,
    Repr as Icmpv4Repr,
    TimeExceeded as Icmpv4TimeExceeded,
};
pub use self::ipv4::{
    protocols as ipv4_protocols,
    Address as Ipv4Address,
    Packet as Ipv4Packet,
    Repr as Ipv4Repr,
};
