//! Packet processing services for different network layers.
//!
//! The `service` module deals with the reception, forwarding and transmission
//! logic at different layers of the router. Every service operates on a shared
//! `Router`, which may be used from several threads at once.

pub mod arp;
pub mod ethernet;
pub mod icmpv4;
pub mod ipv4;
pub mod sweeper;

use std::sync::{
    Mutex,
    MutexGuard,
};

use crate::core::arp_cache::ArpCache;
use crate::core::arp_queue::PendingArpRequests;
use crate::core::config::Config;
use crate::core::interface::{
    Interface,
    Interfaces,
};
use crate::core::link::Link;
use crate::core::route::RoutingTable;
use crate::core::time::{
    Env,
    SystemEnv,
};
use crate::{
    Error,
    Result,
};

/// ARP state shared by frame processing and the sweeper.
///
/// The cache and the pending requests live behind a single lock so that a
/// resolution and an expiry can never interleave for the same address.
pub struct ArpState<T: Env> {
    /// Cache for IPv4/Ethernet address translations.
    pub cache: ArpCache<T>,
    /// Frames waiting on address translations.
    pub pending: PendingArpRequests<T>,
}

/// The forwarding core of a router.
pub struct Router<T: Env = SystemEnv> {
    /// Interfaces owned by the router.
    pub interfaces: Interfaces,
    /// Static routes, read only once the router is built.
    pub routing_table: RoutingTable,
    /// Timers and limits.
    pub config: Config,
    link: Box<dyn Link>,
    arp: Mutex<ArpState<T>>,
}

#[cfg(test)]
impl<T: Env> std::fmt::Debug for Router<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Router").finish_non_exhaustive()
    }
}

impl<T: Env> Router<T> {
    /// Creates a router, checking that every route leaves through one of the
    /// interfaces.
    pub fn new(
        interfaces: Vec<Interface>,
        routing_table: RoutingTable,
        link: Box<dyn Link>,
        config: Config,
        time_env: T,
    ) -> Result<Router<T>> {
        let interfaces = Interfaces::new(interfaces)?;

        for route in routing_table.iter() {
            if interfaces.by_name(&route.interface).is_none() {
                return Err(Error::Config(format!(
                    "route {} uses unknown interface {}",
                    route, route.interface
                )));
            }
        }

        let arp = ArpState {
            cache: ArpCache::new(config.arp_cache_ttl, time_env.clone()),
            pending: PendingArpRequests::new(
                config.arp_retransmit_interval,
                config.arp_max_attempts,
                time_env,
            ),
        };

        Ok(Router {
            interfaces,
            routing_table,
            config,
            link,
            arp: Mutex::new(arp),
        })
    }

    /// Processes a frame received on the named interface.
    ///
    /// Errors describe why a frame was dropped; none of them are fatal.
    pub fn recv_frame(&self, eth_buffer: &[u8], interface: &str) -> Result<()> {
        ethernet::recv_frame(self, eth_buffer, interface)
    }

    /// Expires stale cache entries and drives ARP retransmission.
    pub fn sweep(&self) {
        sweeper::sweep(self)
    }

    /// Locks the shared ARP state.
    ///
    /// The lock is never held while sending.
    pub fn arp(&self) -> MutexGuard<'_, ArpState<T>> {
        match self.arp.lock() {
            Ok(arp) => arp,
            Err(err) => err.into_inner(),
        }
    }

    /// Sends a frame out of the named interface via the link.
    fn transmit(&self, buffer: &[u8], interface: &str) -> Result<()> {
        self.link.send(buffer, interface).map_err(|err| {
            warn!(
                "Dropping {} byte frame for {} after send error {:?}.",
                buffer.len(),
                interface,
                err
            );
            Error::from(err)
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::link::Capture;
    use crate::core::repr::{
        eth_types,
        Arp,
        ArpOp,
        EthernetAddress,
        EthernetFrame,
        Ipv4Address,
    };
    use crate::core::route::RouteEntry;
    use crate::core::time::MockEnv;

    /// A router with eth0 on 10.0.0.1/24 and eth1 on 192.168.1.1/24, with a
    /// default route via 192.168.1.2.
    pub fn router() -> (Router<MockEnv>, Arc<Capture>, MockEnv) {
        let interfaces = vec![
            Interface::new(
                "eth0",
                EthernetAddress::new([0x02, 0, 0, 0, 0, 0x01]),
                Ipv4Address::new([10, 0, 0, 1]),
            ),
            Interface::new(
                "eth1",
                EthernetAddress::new([0x02, 0, 0, 0, 0, 0x02]),
                Ipv4Address::new([192, 168, 1, 1]),
            ),
        ];

        let mut routing_table = RoutingTable::new();
        for line in &[
            "10.0.0.0 0.0.0.0 255.255.255.0 eth0",
            "192.168.1.0 0.0.0.0 255.255.255.0 eth1",
            "0.0.0.0 192.168.1.2 0.0.0.0 eth1",
        ] {
            routing_table.add(line.parse::<RouteEntry>().unwrap()).unwrap();
        }

        let capture = Arc::new(Capture::new());
        let env = MockEnv::new();
        let router = Router::new(
            interfaces,
            routing_table,
            Box::new(capture.clone()),
            Config::default(),
            env.clone(),
        )
        .unwrap();

        (router, capture, env)
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

    #[test]
    fn test_route_with_unknown_interface_rejected() {
        let mut routing_table = RoutingTable::new();
        routing_table
            .add("0.0.0.0 10.0.0.2 0.0.0.0 eth7".parse().unwrap())
            .unwrap();

        let router = Router::new(
            vec![],
            routing_table,
            Box::new(Capture::new()),
            Config::default(),
            MockEnv::new(),
        );
        assert_matches!(router, Err(Error::Config(_)));
    }

    #[test]
    fn test_router_is_send_and_sync() {
        fn assert_send_sync<S: Send + Sync>() {}
        assert_send_sync::<Router<MockEnv>>();
        assert_send_sync::<Router>();
    }

    #[test]
    fn test_poisoned_lock_recovered() {
        let (router, _, _) = router();
        let router = Arc::new(router);

        let poisoner = router.clone();
        let _ = std::thread::spawn(move || {
            let _arp = poisoner.arp();
            panic!("poison the ARP lock");
        })
        .join();

        assert!(router.arp().cache.is_empty());
    }
}
