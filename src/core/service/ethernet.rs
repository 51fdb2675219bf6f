use crate::core::interface::Interface;
use crate::core::repr::{
    eth_types,
    EthernetAddress,
    EthernetFrame,
};
use crate::core::service::{
    arp,
    ipv4,
    Router,
};
use crate::core::time::Env;
use crate::{
    Error,
    Result,
};

/// Send an Ethernet frame via an interface.
///
/// The source address is set to the interface's address. The closure fills in
/// a payload of payload_len bytes.
pub fn send_frame<T, F>(
    router: &Router<T>,
    interface: &Interface,
    dst_addr: EthernetAddress,
    payload_type: u16,
    payload_len: usize,
    f: F,
) -> Result<()>
where
    T: Env,
    F: FnOnce(&mut [u8]) -> Result<()>,
{
    let mut eth_buffer = vec![0; EthernetFrame::<&[u8]>::buffer_len(payload_len)];
    {
        let mut eth_frame = EthernetFrame::try_new(&mut eth_buffer[..])?;
        eth_frame.set_dst_addr(dst_addr);
        eth_frame.set_src_addr(interface.ethernet_addr);
        eth_frame.set_payload_type(payload_type);
        f(eth_frame.payload_mut())?;
    }
    router.transmit(&eth_buffer, &interface.name)
}

/// Receives an Ethernet frame from an interface.
///
/// Frames addressed to neither the interface nor broadcast are dropped, the
/// rest are handed to the ARP or IPv4 service by payload type.
pub fn recv_frame<T: Env>(router: &Router<T>, eth_buffer: &[u8], interface: &str) -> Result<()> {
    let interface = match router.interfaces.by_name(interface) {
        Some(interface) => interface,
        None => {
            debug!("Ignoring ethernet frame from unknown interface {}.", interface);
            return Err(Error::NoOp);
        }
    };

    let eth_frame = EthernetFrame::try_new(eth_buffer)?;

    if eth_frame.dst_addr() != interface.ethernet_addr && !eth_frame.dst_addr().is_broadcast() {
        debug!(
            "Ignoring ethernet frame with destination {} on {}.",
            eth_frame.dst_addr(),
            interface.name
        );
        return Err(Error::NoOp);
    }

    match eth_frame.payload_type() {
        eth_types::ARP => arp::recv_packet(router, interface, &eth_frame),
        eth_types::IPV4 => ipv4::recv_packet(router, interface, eth_buffer),
        i => {
            debug!("Ignoring ethernet frame with type {:#06x}.", i);
            Err(Error::NoOp)
        }
    }
}
