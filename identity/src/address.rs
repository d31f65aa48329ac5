//! The multiaddress this node advertises to the main node.
//!
//! Canonical form: `/ip4/<ip>/tcp/<gossip port>/p2p/<peer id>`.
//! Built once at startup from immutable inputs and reused by every cycle.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use libp2p_identity::PeerId;
use multiaddr::{Multiaddr, Protocol};
use peerlink_types::ConfigError;

/// Local node's gossip address and identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocalAddress {
    pub ip: Ipv4Addr,
    pub port: u16,
    pub peer_id: PeerId,
}

impl LocalAddress {
    /// Build from configuration values, rejecting a malformed IPv4 address
    /// or a zero port.
    pub fn build(ip: &str, port: u16, peer_id: PeerId) -> Result<Self, ConfigError> {
        let ip = ip
            .trim()
            .parse::<Ipv4Addr>()
            .map_err(|e| ConfigError::invalid("local IP", format!("{ip:?}: {e}")))?;
        if port == 0 {
            return Err(ConfigError::invalid("gossip port", "must be positive"));
        }
        Ok(Self { ip, port, peer_id })
    }

    pub fn to_multiaddr(&self) -> Multiaddr {
        Multiaddr::empty()
            .with(Protocol::Ip4(self.ip))
            .with(Protocol::Tcp(self.port))
            .with(Protocol::P2p(self.peer_id))
    }
}

impl fmt::Display for LocalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_multiaddr())
    }
}

impl FromStr for LocalAddress {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| ConfigError::invalid("multiaddress", reason);

        let addr: Multiaddr = s.parse().map_err(|e| invalid(format!("{s:?}: {e}")))?;
        let mut parts = addr.iter();
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(Protocol::Ip4(ip)), Some(Protocol::Tcp(port)), Some(Protocol::P2p(peer_id)), None)
                if port != 0 =>
            {
                Ok(Self { ip, port, peer_id })
            }
            _ => Err(invalid(format!("{s:?} is not /ip4/<ip>/tcp/<port>/p2p/<peer id>"))),
        }
    }
}
