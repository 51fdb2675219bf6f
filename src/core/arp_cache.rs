use std::collections::HashMap;
use std::time::{
    Duration,
    Instant,
};

use crate::core::repr::{
    EthernetAddress,
    Ipv4Address,
};
use crate::core::time::{
    Env,
    SystemEnv,
};

struct Entry {
    eth_addr: EthernetAddress,
    in_cache_since: Instant,
}

/// Maintains an expiring set of IPv4 -> ethernet address mappings.
pub struct ArpCache<T = SystemEnv>
where
    T: Env,
{
    entries: HashMap<Ipv4Address, Entry>,
    expiration: Duration,
    in_cache_since_min: Instant,
    time_env: T,
}

impl<T: Env> ArpCache<T> {
    /// Creates an ARP cache where ethernet address mappings expire once they
    /// are older than expiration.
    pub fn new(expiration: Duration, time_env: T) -> ArpCache<T> {
        ArpCache {
            entries: HashMap::new(),
            expiration,
            in_cache_since_min: time_env.now_instant(),
            time_env,
        }
    }

    /// Lookup the ethernet address for an IPv4 address.
    ///
    /// Entries past their expiration are never returned, even if the sweeper
    /// has not purged them yet.
    pub fn eth_addr_for_ip(&self, ipv4_addr: Ipv4Address) -> Option<EthernetAddress> {
        let now = self.time_env.now_instant();

        match self.entries.get(&ipv4_addr) {
            Some(entry) if now.duration_since(entry.in_cache_since) <= self.expiration => {
                Some(entry.eth_addr)
            }
            _ => None,
        }
    }

    /// Create or update the ethernet address mapping for an IPv4 address.
    ///
    /// Updating an existing mapping restarts its expiration.
    pub fn set_eth_addr_for_ip(&mut self, ipv4_addr: Ipv4Address, eth_addr: EthernetAddress) {
        let in_cache_since = self.time_env.now_instant();

        if self.entries.is_empty() {
            self.in_cache_since_min = in_cache_since;
        }

        self.entries.insert(
            ipv4_addr,
            Entry {
                eth_addr,
                in_cache_since,
            },
        );
    }

    /// Purge ethernet address entries that have expired, returning how many
    /// were removed.
    pub fn expire_eth_addr(&mut self) -> usize {
        let now = self.time_env.now_instant();

        if now <= self.in_cache_since_min + self.expiration {
            return 0;
        }

        // Purge expired entries...
        let before = self.entries.len();
        let expiration = self.expiration;
        self.entries
            .retain(|_, entry| now.duration_since(entry.in_cache_since) <= expiration);

        // Update timestamp of the oldest entry...
        let in_cache_since = self.entries.values().map(|entry| entry.in_cache_since);
        self.in_cache_since_min = match in_cache_since.min() {
            Some(in_cache_since) => in_cache_since,
            None => now,
        };

        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
