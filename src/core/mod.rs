//! Core, platform independent forwarding code.

pub mod arp_cache;
pub mod arp_queue;
pub mod check;
pub mod config;
pub mod interface;
pub mod link;
pub mod repr;
pub mod route;
pub mod service;
pub mod time;
