use std::fmt::{
    Display,
    Formatter,
    Result as FmtResult,
};
use std::result::Result as StdResult;
use std::str::FromStr;

use byteorder::{
    ByteOrder,
    NetworkEndian,
};

use crate::{
    Error,
    Result,
};

/// [MAC address](https://en.wikipedia.org/wiki/MAC_address) in network byte order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Address([u8; 6]);

impl Address {
    pub const BROADCAST: Address = Address([0xFF; 6]);

    pub const UNSPECIFIED: Address = Address([0x00; 6]);

    /// Creates a MAC address from a network byte order buffer.
    pub fn new(addr: [u8; 6]) -> Address {
        Address(addr)
    }

    /// Tries to creates a MAC address from a network byte order slice.
    pub fn try_new(addr: &[u8]) -> Result<Address> {
        if addr.len() != 6 {
            return Err(Error::Exhausted);
        }

        let mut _addr: [u8; 6] = [0; 6];
        _addr.copy_from_slice(addr);
        Ok(Address(_addr))
    }

    /// Returns a reference to the network byte order representation of the
    /// address.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Checks if this is a broadcast address.
    pub fn is_broadcast(&self) -> bool {
        self.0 == [0xFF; 6]
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5],
        )
    }
}

impl FromStr for Address {
    type Err = Error;

    /// Parses a MAC address from an A:B:C:D:E:F style string.
    fn from_str(addr: &str) -> StdResult<Address, Self::Err> {
        let bytes = addr
            .split(':')
            .map(|token| u8::from_str_radix(token, 16).map_err(|_| Error::Address))
            .collect::<Result<Vec<_>>>()?;

        if bytes.len() != 6 {
            return Err(Error::Address);
        }

        let mut mac: [u8; 6] = [0; 6];
        mac.copy_from_slice(&bytes);

        Ok(Address::new(mac))
    }
}

/// [https://en.wikipedia.org/wiki/EtherType](https://en.wikipedia.org/wiki/EtherType)
pub mod eth_types {
    pub const IPV4: u16 = 0x800;

    pub const ARP: u16 = 0x806;
}

mod fields {
    use std::ops::{
        Range,
        RangeFrom,
    };

    pub const DST_ADDR: Range<usize> = 0..6;

    pub const SRC_ADDR: Range<usize> = 6..12;

    pub const PAYLOAD_TYPE: Range<usize> = 12..14;

    pub const PAYLOAD: RangeFrom<usize> = 14..;
}

/// View of a byte buffer as an Ethernet frame.
#[derive(Debug)]
pub struct Frame<T: AsRef<[u8]>> {
    buffer: T,
}

impl<T: AsRef<[u8]>> AsRef<[u8]> for Frame<T> {
    fn as_ref(&self) -> &[u8] {
        self.buffer.as_ref()
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> AsMut<[u8]> for Frame<T> {
    fn as_mut(&mut self) -> &mut [u8] {
        self.buffer.as_mut()
    }
}

impl<T: AsRef<[u8]>> Frame<T> {
    pub const HEADER_LEN: usize = 14;

    pub const MAX_FRAME_LEN: usize = 1518;

    /// Tries to create an Ethernet frame view over a byte buffer.
    pub fn try_new(buffer: T) -> Result<Frame<T>> {
        let buffer_len = buffer.as_ref().len();

        if buffer_len < Self::HEADER_LEN {
            Err(Error::Exhausted)
        } else if buffer_len > Self::MAX_FRAME_LEN {
            Err(Error::Malformed)
        } else {
            Ok(Frame { buffer })
        }
    }

    /// Returns the length of an Ethernet frame with the specified payload size.
    pub fn buffer_len(payload_len: usize) -> usize {
        Self::HEADER_LEN + payload_len
    }

    pub fn dst_addr(&self) -> Address {
        let mut addr = [0; 6];
        addr.copy_from_slice(&self.buffer.as_ref()[fields::DST_ADDR]);
        Address(addr)
    }

    pub fn src_addr(&self) -> Address {
        let mut addr = [0; 6];
        addr.copy_from_slice(&self.buffer.as_ref()[fields::SRC_ADDR]);
        Address(addr)
    }

    pub fn payload_type(&self) -> u16 {
        NetworkEndian::read_u16(&self.buffer.as_ref()[fields::PAYLOAD_TYPE])
    }

    pub fn payload(&self) -> &[u8] {
        &self.buffer.as_ref()[fields::PAYLOAD]
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Frame<T> {
    pub fn set_dst_addr(&mut self, addr: Address) {
        self.buffer.as_mut()[fields::DST_ADDR].copy_from_slice(addr.as_bytes());
    }

    pub fn set_src_addr(&mut self, addr: Address) {
        self.buffer.as_mut()[fields::SRC_ADDR].copy_from_slice(addr.as_bytes());
    }

    pub fn set_payload_type(&mut self, payload_type: u16) {
        NetworkEndian::write_u16(
            &mut self.buffer.as_mut()[fields::PAYLOAD_TYPE],
            payload_type,
        );
    }

    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.buffer.as_mut()[fields::PAYLOAD]
    }
}
