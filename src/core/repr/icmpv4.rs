use byteorder::{
    ByteOrder,
    NetworkEndian,
};

use crate::core::check::internet_checksum;
use crate::{
    Error,
    Result,
};

/// Reasons for a destination unreachable message, valued by their ICMP code.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DestinationUnreachable {
    NetUnreachable = 0,
    HostUnreachable = 1,
    PortUnreachable = 3,
}

/// Reasons for a time exceeded message, valued by their ICMP code.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeExceeded {
    TTLExpired = 0,
}

/// https://www.iana.org/assignments/icmp-parameters/icmp-parameters.xhtml
pub mod types {
    pub const ECHO_REPLY: u8 = 0;

    pub const DESTINATION_UNREACHABLE: u8 = 3;

    pub const ECHO_REQUEST: u8 = 8;

    pub const TIME_EXCEEDED: u8 = 11;
}

/// Safe representation of an ICMP header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repr {
    EchoReply { id: u16, seq: u16 },
    EchoRequest { id: u16, seq: u16 },
    DestinationUnreachable(DestinationUnreachable),
    TimeExceeded(TimeExceeded),
}

impl Repr {
    /// Number of original payload bytes quoted after the original IPv4 header in
    /// error messages.
    pub const QUOTED_PAYLOAD_LEN: usize = 8;

    /// Tries to deserialize a packet into an ICMP representation.
    pub fn deserialize<T>(packet: &Packet<T>) -> Result<Repr>
    where
        T: AsRef<[u8]>,
    {
        let header = packet.header();
        let id = NetworkEndian::read_u16(&header[0..2]);
        let seq = NetworkEndian::read_u16(&header[2..4]);

        match (packet._type(), packet.code()) {
            (types::ECHO_REPLY, 0) => Ok(Repr::EchoReply { id, seq }),
            (types::ECHO_REQUEST, 0) => Ok(Repr::EchoRequest { id, seq }),
            (types::DESTINATION_UNREACHABLE, 0) => Ok(Repr::DestinationUnreachable(
                DestinationUnreachable::NetUnreachable,
            )),
            (types::DESTINATION_UNREACHABLE, 1) => Ok(Repr::DestinationUnreachable(
                DestinationUnreachable::HostUnreachable,
            )),
            (types::DESTINATION_UNREACHABLE, 3) => Ok(Repr::DestinationUnreachable(
                DestinationUnreachable::PortUnreachable,
            )),
            (types::TIME_EXCEEDED, 0) => Ok(Repr::TimeExceeded(TimeExceeded::TTLExpired)),
            _ => Err(Error::Malformed),
        }
    }

    /// Serializes the ICMP representation into a packet.
    ///
    /// The checksum covers the payload, so the payload must be written before
    /// calling this.
    pub fn serialize<T>(&self, packet: &mut Packet<T>)
    where
        T: AsRef<[u8]> + AsMut<[u8]>,
    {
        let (type_of, code, header) = match *self {
            Repr::EchoReply { id, seq } => (types::ECHO_REPLY, 0, echo_header(id, seq)),
            Repr::EchoRequest { id, seq } => (types::ECHO_REQUEST, 0, echo_header(id, seq)),
            Repr::DestinationUnreachable(reason) => {
                (types::DESTINATION_UNREACHABLE, reason as u8, [0; 4])
            }
            Repr::TimeExceeded(reason) => (types::TIME_EXCEEDED, reason as u8, [0; 4]),
        };

        packet.set_type(type_of);
        packet.set_code(code);
        packet.set_header(header);
        packet.fill_checksum();
    }
}

fn echo_header(id: u16, seq: u16) -> [u8; 4] {
    let mut header = [0; 4];
    NetworkEndian::write_u16(&mut header[0..2], id);
    NetworkEndian::write_u16(&mut header[2..4], seq);
    header
}

/// [https://en.wikipedia.org/wiki/Internet_Control_Message_Protocol](https://en.wikipedia.org/wiki/Internet_Control_Message_Protocol)
mod fields {
    use std::ops::{
        Range,
        RangeFrom,
    };

    pub const TYPE: usize = 0;

    pub const CODE: usize = 1;

    pub const CHECKSUM: Range<usize> = 2..4;

    pub const HEADER: Range<usize> = 4..8;

    pub const PAYLOAD: RangeFrom<usize> = 8..;
}

/// View of a byte buffer as an ICMP packet.
#[derive(Debug)]
pub struct Packet<T: AsRef<[u8]>> {
    buffer: T,
}

impl<T: AsRef<[u8]>> AsRef<[u8]> for Packet<T> {
    fn as_ref(&self) -> &[u8] {
        self.buffer.as_ref()
    }
}

impl<T: AsRef<[u8]>> Packet<T> {
    pub const HEADER_LEN: usize = 8;

    const MAX_PACKET_LEN: usize = 65535;

    /// Tries to create an ICMP packet view over a byte buffer.
    pub fn try_new(buffer: T) -> Result<Packet<T>> {
        if buffer.as_ref().len() < Self::HEADER_LEN {
            Err(Error::Exhausted)
        } else if buffer.as_ref().len() > Self::MAX_PACKET_LEN {
            Err(Error::Malformed)
        } else {
            Ok(Packet { buffer })
        }
    }

    /// Returns the length of an ICMP packet with the specified payload size.
    pub fn buffer_len(payload_len: usize) -> usize {
        Self::HEADER_LEN + payload_len
    }

    /// Checks if the packet has a valid encoding. This may include checksum, field
    /// consistency, etc. checks.
    pub fn check_encoding(&self) -> Result<()> {
        if self.gen_packet_checksum() != 0 {
            Err(Error::Checksum)
        } else {
            Ok(())
        }
    }

    /// Calculates the packet checksum.
    pub fn gen_packet_checksum(&self) -> u16 {
        internet_checksum(self.buffer.as_ref())
    }

    pub fn _type(&self) -> u8 {
        self.buffer.as_ref()[fields::TYPE]
    }

    pub fn code(&self) -> u8 {
        self.buffer.as_ref()[fields::CODE]
    }

    pub fn checksum(&self) -> u16 {
        NetworkEndian::read_u16(&self.buffer.as_ref()[fields::CHECKSUM])
    }

    pub fn header(&self) -> [u8; 4] {
        let mut header: [u8; 4] = [0; 4];
        header.copy_from_slice(&self.buffer.as_ref()[fields::HEADER]);
        header
    }

    pub fn payload(&self) -> &[u8] {
        &self.buffer.as_ref()[fields::PAYLOAD]
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    pub fn set_type(&mut self, type_of: u8) {
        self.buffer.as_mut()[fields::TYPE] = type_of
    }

    pub fn set_code(&mut self, code: u8) {
        self.buffer.as_mut()[fields::CODE] = code;
    }

    pub fn set_checksum(&mut self, checksum: u16) {
        NetworkEndian::write_u16(&mut self.buffer.as_mut()[fields::CHECKSUM], checksum);
    }

    pub fn set_header(&mut self, header: [u8; 4]) {
        self.buffer.as_mut()[fields::HEADER].copy_from_slice(&header[..]);
    }

    /// Zeroes the checksum field and then recomputes it over the packet.
    pub fn fill_checksum(&mut self) {
        self.set_checksum(0);
        let checksum = self.gen_packet_checksum();
        self.set_checksum(checksum);
    }

    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.buffer.as_mut()[fields::PAYLOAD]
    }
}
