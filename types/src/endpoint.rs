//! Location of the main node, resolved fresh every cycle.

use std::fmt;
use std::net::IpAddr;

/// Network location of the main node's pod.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub ip: IpAddr,
}

impl Endpoint {
    pub fn new(ip: IpAddr) -> Self {
        Self { ip }
    }

    /// `host:port` authority for URLs, bracketing IPv6 hosts.
    pub fn authority(&self, port: u16) -> String {
        match self.ip {
            IpAddr::V4(v4) => format!("{v4}:{port}"),
            IpAddr::V6(v6) => format!("[{v6}]:{port}"),
        }
    }
}

impl From<IpAddr> for Endpoint {
    fn from(ip: IpAddr) -> Self {
        Self::new(ip)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authority_brackets_ipv6() {
        let v4 = Endpoint::new("10.0.0.1".parse().unwrap());
        let v6 = Endpoint::new("fd00::1".parse().unwrap());
        assert_eq!(v4.authority(14265), "10.0.0.1:14265");
        assert_eq!(v6.authority(14265), "[fd00::1]:14265");
    }
}
