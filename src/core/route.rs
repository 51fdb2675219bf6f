//! Static IPv4 routing with longest prefix match lookup.

use std::fmt::{
    Display,
    Formatter,
    Result as FmtResult,
};
use std::fs::File;
use std::io::{
    BufRead,
    BufReader,
};
use std::path::Path;
use std::str::FromStr;

use crate::core::repr::Ipv4Address;
use crate::{
    Error,
    Result,
};

/// A static route towards a destination network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteEntry {
    /// Destination network.
    pub destination: Ipv4Address,
    /// Next hop router, or 0.0.0.0 if the network is directly connected.
    pub gateway: Ipv4Address,
    /// Subnet mask for the destination network.
    pub mask: Ipv4Address,
    /// Name of the interface to send matching packets out of.
    pub interface: String,
}

impl RouteEntry {
    pub fn new<S: Into<String>>(
        destination: Ipv4Address,
        gateway: Ipv4Address,
        mask: Ipv4Address,
        interface: S,
    ) -> RouteEntry {
        RouteEntry {
            destination,
            gateway,
            mask,
            interface: interface.into(),
        }
    }

    /// Network portion of the destination.
    pub fn network(&self) -> u32 {
        self.destination.as_u32() & self.mask.as_u32()
    }

    /// Checks if an address falls inside the destination network.
    pub fn is_match(&self, addr: Ipv4Address) -> bool {
        addr.as_u32() & self.mask.as_u32() == self.network()
    }

    /// Returns the address which must be resolved to deliver a packet for dst
    /// along this route.
    pub fn next_hop(&self, dst: Ipv4Address) -> Ipv4Address {
        if self.gateway.is_unspecified() {
            dst
        } else {
            self.gateway
        }
    }
}

impl Display for RouteEntry {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(
            f,
            "{} {} {} {}",
            self.destination, self.gateway, self.mask, self.interface
        )
    }
}

impl FromStr for RouteEntry {
    type Err = Error;

    /// Parses a "destination gateway mask interface" line.
    fn from_str(line: &str) -> Result<RouteEntry> {
        let tokens: Vec<_> = line.split_whitespace().collect();

        if tokens.len() < 4 {
            return Err(Error::Config(format!(
                "expected destination gateway mask interface, got '{}'",
                line
            )));
        }

        let addr = |token: &str| {
            token
                .parse::<Ipv4Address>()
                .map_err(|_| Error::Config(format!("cannot convert {} to valid IP", token)))
        };

        Ok(RouteEntry {
            destination: addr(tokens[0])?,
            gateway: addr(tokens[1])?,
            mask: addr(tokens[2])?,
            interface: tokens[3].to_string(),
        })
    }
}

/// An unordered set of static routes.
#[derive(Clone, Debug, Default)]
pub struct RoutingTable {
    routes: Vec<RouteEntry>,
}

impl RoutingTable {
    pub fn new() -> RoutingTable {
        RoutingTable { routes: Vec::new() }
    }

    /// Adds a route, rejecting a second route for the same network and mask.
    pub fn add(&mut self, route: RouteEntry) -> Result<()> {
        let duplicate = self
            .routes
            .iter()
            .any(|other| other.mask == route.mask && other.network() == route.network());

        if duplicate {
            return Err(Error::Config(format!("duplicate route {}", route)));
        }

        self.routes.push(route);
        Ok(())
    }

    /// Returns the most specific route matching an address.
    pub fn lookup(&self, addr: Ipv4Address) -> Option<&RouteEntry> {
        self.routes
            .iter()
            .filter(|route| route.is_match(addr))
            .max_by_key(|route| route.mask.as_u32())
    }

    /// Replaces the table with routes read from a route file.
    ///
    /// Each non-empty line holds "destination gateway mask interface" in dotted
    /// decimal. The table is left untouched if any line fails to parse.
    pub fn load<R: BufRead>(&mut self, reader: R) -> Result<()> {
        let mut table = RoutingTable::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let route = line.parse::<RouteEntry>().map_err(|err| match err {
                Error::Config(msg) => Error::Config(format!("line {}: {}", i + 1, msg)),
                err => err,
            })?;
            table.add(route)?;
        }

        info!("Loaded routing table with {} routes.", table.len());
        *self = table;
        Ok(())
    }

    /// Replaces the table with routes read from the file at path.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let file = File::open(path)?;
        self.load(BufReader::new(file))
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteEntry> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
