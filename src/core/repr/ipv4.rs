use byteorder::{
    ByteOrder,
    NetworkEndian,
};

use crate::core::check::internet_checksum;
use crate::{
    Error,
    Result,
};

/// [IPv4 address](https://en.wikipedia.org/wiki/IPv4) in network byte order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 4]);

impl Address {
    pub const UNSPECIFIED: Address = Address([0; 4]);

    /// Creates an IPv4 address from a network byte order buffer.
    pub fn new(addr: [u8; 4]) -> Address {
        Address(addr)
    }

    /// Creates an IPv4 address from a network byte order slice.
    pub fn try_new(addr: &[u8]) -> Result<Address> {
        if addr.len() != 4 {
            return Err(Error::Exhausted);
        }

        let mut _addr: [u8; 4] = [0; 4];
        _addr.copy_from_slice(addr);
        Ok(Address(_addr))
    }

    /// Returns a reference to the network byte order representation of the address.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the address as a host order integer.
    pub fn as_u32(&self) -> u32 {
        NetworkEndian::read_u32(&self.0)
    }

    /// Checks if this is the 0.0.0.0 address.
    pub fn is_unspecified(&self) -> bool {
        self.0 == [0; 4]
    }
}

impl From<u32> for Address {
    fn from(addr: u32) -> Address {
        let mut bytes = [0; 4];
        NetworkEndian::write_u32(&mut bytes, addr);
        Address(bytes)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}.{}.{}.{}", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}

impl std::str::FromStr for Address {
    type Err = Error;

    /// Parses an Ipv4 address from an A.B.C.D style string.
    fn from_str(addr: &str) -> std::result::Result<Address, Self::Err> {
        let bytes = addr
            .split('.')
            .map(|token| token.parse::<u8>().map_err(|_| Error::Address))
            .collect::<Result<Vec<_>>>()?;

        if bytes.len() != 4 {
            return Err(Error::Address);
        }

        let mut ipv4: [u8; 4] = [0; 4];
        ipv4.copy_from_slice(&bytes);

        Ok(Address::new(ipv4))
    }
}

/// https://www.iana.org/assignments/protocol-numbers/protocol-numbers.xhtml
pub mod protocols {
    pub const ICMP: u8 = 1;

    pub const TCP: u8 = 6;

    pub const UDP: u8 = 17;
}

mod fields {
    use std::ops::Range;

    pub const VERSION_AND_HEADER_LEN: usize = 0;

    pub const TOS: usize = 1;

    pub const PACKET_LEN: Range<usize> = 2..4;

    pub const IDENTIFICATION: Range<usize> = 4..6;

    pub const FLAGS_AND_FRAGMENT_OFFSET: Range<usize> = 6..8;

    pub const TTL: usize = 8;

    pub const PROTOCOL: usize = 9;

    pub const CHECKSUM: Range<usize> = 10..12;

    pub const SRC_ADDR: Range<usize> = 12..16;

    pub const DST_ADDR: Range<usize> = 16..20;
}

/// View of a byte buffer as an IPv4 packet.
///
/// The buffer may extend past the total length recorded in the header, for
/// example due to Ethernet padding. Those trailing bytes are not considered part
/// of the packet.
#[derive(Debug)]
pub struct Packet<T: AsRef<[u8]>> {
    buffer: T,
}

impl<T: AsRef<[u8]>> AsRef<[u8]> for Packet<T> {
    fn as_ref(&self) -> &[u8] {
        &self.buffer.as_ref()[..self.packet_len() as usize]
    }
}

impl<T: AsRef<[u8]>> Packet<T> {
    pub const MIN_HEADER_LEN: usize = 20;

    /// Tries to create an IPv4 packet view over a byte buffer.
    ///
    /// Fails if the buffer cannot hold a minimal header, or if the version,
    /// header length or total length fields are inconsistent with the buffer.
    pub fn try_new(buffer: T) -> Result<Packet<T>> {
        let buffer_len = buffer.as_ref().len();

        if buffer_len < Self::MIN_HEADER_LEN {
            return Err(Error::Exhausted);
        }

        let packet = Packet { buffer };
        let header_len = packet.header_len() as usize;
        let packet_len = packet.packet_len() as usize;

        if packet.ip_version() != 4
            || header_len < Self::MIN_HEADER_LEN
            || header_len > packet_len
            || packet_len > buffer_len
        {
            return Err(Error::Malformed);
        }

        Ok(packet)
    }

    /// Returns the length of a IPv4 packet with no options and the payload size.
    pub fn buffer_len(payload_len: usize) -> usize {
        Self::MIN_HEADER_LEN + payload_len
    }

    /// Checks if the packet has a valid header checksum.
    pub fn check_encoding(&self) -> Result<()> {
        if self.gen_header_checksum() != 0 {
            Err(Error::Checksum)
        } else {
            Ok(())
        }
    }

    /// Calculates the checksum over the header as it currently is.
    pub fn gen_header_checksum(&self) -> u16 {
        internet_checksum(self.header())
    }

    pub fn ip_version(&self) -> u8 {
        (self.buffer.as_ref()[fields::VERSION_AND_HEADER_LEN] & 0xF0) >> 4
    }

    pub fn header_len(&self) -> u8 {
        (self.buffer.as_ref()[fields::VERSION_AND_HEADER_LEN] & 0x0F) * 4
    }

    pub fn tos(&self) -> u8 {
        self.buffer.as_ref()[fields::TOS]
    }

    pub fn packet_len(&self) -> u16 {
        NetworkEndian::read_u16(&self.buffer.as_ref()[fields::PACKET_LEN])
    }

    pub fn identification(&self) -> u16 {
        NetworkEndian::read_u16(&self.buffer.as_ref()[fields::IDENTIFICATION])
    }

    pub fn flags_and_fragment_offset(&self) -> u16 {
        NetworkEndian::read_u16(&self.buffer.as_ref()[fields::FLAGS_AND_FRAGMENT_OFFSET])
    }

    pub fn ttl(&self) -> u8 {
        self.buffer.as_ref()[fields::TTL]
    }

    pub fn protocol(&self) -> u8 {
        self.buffer.as_ref()[fields::PROTOCOL]
    }

    pub fn header_checksum(&self) -> u16 {
        NetworkEndian::read_u16(&self.buffer.as_ref()[fields::CHECKSUM])
    }

    pub fn src_addr(&self) -> Address {
        let mut addr = [0; 4];
        addr.copy_from_slice(&self.buffer.as_ref()[fields::SRC_ADDR]);
        Address(addr)
    }

    pub fn dst_addr(&self) -> Address {
        let mut addr = [0; 4];
        addr.copy_from_slice(&self.buffer.as_ref()[fields::DST_ADDR]);
        Address(addr)
    }

    /// Returns the header, including options.
    pub fn header(&self) -> &[u8] {
        &self.buffer.as_ref()[..self.header_len() as usize]
    }

    /// Returns the payload, excluding any trailing padding.
    pub fn payload(&self) -> &[u8] {
        &self.buffer.as_ref()[self.header_len() as usize..self.packet_len() as usize]
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    pub fn set_version_and_header_len(&mut self, version: u8, header_len: u8) {
        self.buffer.as_mut()[fields::VERSION_AND_HEADER_LEN] =
            (version << 4) | ((header_len / 4) & 0x0F);
    }

    pub fn set_tos(&mut self, tos: u8) {
        self.buffer.as_mut()[fields::TOS] = tos;
    }

    pub fn set_packet_len(&mut self, packet_len: u16) {
        NetworkEndian::write_u16(&mut self.buffer.as_mut()[fields::PACKET_LEN], packet_len);
    }

    pub fn set_identification(&mut self, id: u16) {
        NetworkEndian::write_u16(&mut self.buffer.as_mut()[fields::IDENTIFICATION], id);
    }

    pub fn set_flags_and_fragment_offset(&mut self, value: u16) {
        NetworkEndian::write_u16(
            &mut self.buffer.as_mut()[fields::FLAGS_AND_FRAGMENT_OFFSET],
            value,
        );
    }

    pub fn set_ttl(&mut self, ttl: u8) {
        self.buffer.as_mut()[fields::TTL] = ttl;
    }

    pub fn set_protocol(&mut self, protocol: u8) {
        self.buffer.as_mut()[fields::PROTOCOL] = protocol;
    }

    pub fn set_header_checksum(&mut self, checksum: u16) {
        NetworkEndian::write_u16(&mut self.buffer.as_mut()[fields::CHECKSUM], checksum);
    }

    pub fn set_src_addr(&mut self, addr: Address) {
        self.buffer.as_mut()[fields::SRC_ADDR].copy_from_slice(addr.as_bytes());
    }

    pub fn set_dst_addr(&mut self, addr: Address) {
        self.buffer.as_mut()[fields::DST_ADDR].copy_from_slice(addr.as_bytes());
    }

    /// Zeroes the checksum field and then recomputes it over the header.
    pub fn fill_checksum(&mut self) {
        self.set_header_checksum(0);
        let checksum = self.gen_header_checksum();
        self.set_header_checksum(checksum);
    }

    /// Returns a mutable view of the payload, excluding any trailing padding.
    pub fn payload_mut(&mut self) -> &mut [u8] {
        let (header_len, packet_len) = (self.header_len() as usize, self.packet_len() as usize);
        &mut self.buffer.as_mut()[header_len..packet_len]
    }
}

/// Safe representation of an IPv4 header without options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Repr {
    pub src_addr: Address,
    pub dst_addr: Address,
    pub protocol: u8,
    pub ttl: u8,
    pub identification: u16,
    pub payload_len: u16,
}

impl Repr {
    /// Returns the IPv4 packet size needed to serialize this representation
    /// and its payload.
    pub fn buffer_len(&self) -> usize {
        Packet::<&[u8]>::buffer_len(self.payload_len as usize)
    }

    /// Serializes the header into a buffer of at least buffer_len() bytes,
    /// filling in the checksum. The payload is left untouched.
    pub fn serialize(&self, buffer: &mut [u8]) -> Result<()> {
        if buffer.len() < self.buffer_len() {
            return Err(Error::Exhausted);
        }

        let mut packet = Packet { buffer };
        packet.set_version_and_header_len(4, Packet::<&[u8]>::MIN_HEADER_LEN as u8);
        packet.set_tos(0);
        packet.set_packet_len(self.buffer_len() as u16);
        packet.set_identification(self.identification);
        packet.set_flags_and_fragment_offset(0);
        packet.set_ttl(self.ttl);
        packet.set_protocol(self.protocol);
        packet.set_src_addr(self.src_addr);
        packet.set_dst_addr(self.dst_addr);
        packet.fill_checksum();

        Ok(())
    }
}
