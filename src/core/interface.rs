use crate::core::repr::{
    EthernetAddress,
    Ipv4Address,
};
use crate::{
    Error,
    Result,
};

/// A router port frames arrive on and are sent out of.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interface {
    /// Name used by the link layer to identify the interface, e.g. "eth0".
    pub name: String,
    /// Ethernet address for the interface.
    pub ethernet_addr: EthernetAddress,
    /// IPv4 address for the interface.
    pub ipv4_addr: Ipv4Address,
}

impl Interface {
    pub fn new<S: Into<String>>(
        name: S,
        ethernet_addr: EthernetAddress,
        ipv4_addr: Ipv4Address,
    ) -> Interface {
        Interface {
            name: name.into(),
            ethernet_addr,
            ipv4_addr,
        }
    }
}

/// The fixed set of interfaces a router owns.
#[derive(Clone, Debug)]
pub struct Interfaces {
    interfaces: Vec<Interface>,
}

impl Interfaces {
    /// Creates an interface set, rejecting duplicate names.
    pub fn new(interfaces: Vec<Interface>) -> Result<Interfaces> {
        for (i, interface) in interfaces.iter().enumerate() {
            if interfaces[..i].iter().any(|other| other.name == interface.name) {
                return Err(Error::Config(format!(
                    "duplicate interface {}",
                    interface.name
                )));
            }
        }

        Ok(Interfaces { interfaces })
    }

    /// Returns the interface with name.
    pub fn by_name(&self, name: &str) -> Option<&Interface> {
        self.interfaces.iter().find(|interface| interface.name == name)
    }

    /// Returns the interface which owns an IPv4 address.
    pub fn by_ipv4_addr(&self, addr: Ipv4Address) -> Option<&Interface> {
        self.interfaces
            .iter()
            .find(|interface| interface.ipv4_addr == addr)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interface> {
        self.interfaces.iter()
    }
}
