#[cfg(test)]
#[macro_use]
extern crate assert_matches;
extern crate byteorder;
#[macro_use]
extern crate log;
extern crate rand;

pub mod core;

use crate::core::link::Error as LinkError;
use crate::core::repr::Ipv4Address;

#[derive(Debug)]
pub enum Error {
    /// Indicates an error where an address could not be parsed.
    Address,
    /// Indicates an error where a buffer is too small for a header.
    Exhausted,
    /// Indicates an error where a packet or frame is malformed.
    Malformed,
    /// Indicates an error where a checksum is invalid.
    Checksum,
    /// Indicates an error where the frame was ignored and not processed.
    NoOp,
    /// Indicates an error where no route leads to an address.
    NoRoute(Ipv4Address),
    /// Indicates an invalid interface or routing table configuration.
    Config(String),
    /// Indicates an error transmitting a frame via the link layer.
    Link(LinkError),
    /// Indicates a generic IO error.
    IO(std::io::Error),
}

impl From<LinkError> for Error {
    fn from(err: LinkError) -> Self {
        Error::Link(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IO(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
