//! Tunables for the ARP resolution schedule and generated datagrams.

use std::time::Duration;

/// Default lifetime of an ARP cache entry.
pub static ARP_CACHE_TTL: Duration = Duration::from_secs(15);

/// Default period of the background sweeper.
pub static SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Default time between ARP request retransmissions.
pub static ARP_RETRANSMIT_INTERVAL: Duration = Duration::from_secs(1);

/// Default number of ARP requests sent before giving up on a target.
pub static ARP_MAX_ATTEMPTS: u32 = 5;

/// Default TTL for datagrams the router originates.
pub static ICMP_TTL: u8 = 64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Age after which ARP cache entries are expired.
    pub arp_cache_ttl: Duration,
    /// How often the sweeper runs.
    pub sweep_interval: Duration,
    /// Minimum time between two ARP requests for the same target.
    pub arp_retransmit_interval: Duration,
    /// ARP requests to send before reporting the target unreachable.
    pub arp_max_attempts: u32,
    /// TTL used for ICMP replies.
    pub icmp_ttl: u8,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            arp_cache_ttl: ARP_CACHE_TTL,
            sweep_interval: SWEEP_INTERVAL,
            arp_retransmit_interval: ARP_RETRANSMIT_INTERVAL,
            arp_max_attempts: ARP_MAX_ATTEMPTS,
            icmp_ttl: ICMP_TTL,
        }
    }
}
