//! Peer records as exchanged with the peering service.

use serde::{Deserialize, Serialize};

/// A peer entry from the main node's peer table.
///
/// The peering service owns this schema and adds fields freely, so every
/// field is optional and unknown fields are ignored. The reconciler decides
/// what a missing field means.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerRecord {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub alias: Option<String>,

    /// Advertised addresses, without the `/p2p/<id>` suffix.
    #[serde(default, rename = "multiAddresses", alias = "multiAddress")]
    pub multi_addresses: Option<Vec<String>>,
}

impl PeerRecord {
    pub fn new(id: &str, alias: &str, addresses: &[&str]) -> Self {
        Self {
            id: Some(id.to_string()),
            alias: Some(alias.to_string()),
            multi_addresses: Some(addresses.iter().map(|a| a.to_string()).collect()),
        }
    }

    pub fn has_alias(&self, alias: &str) -> bool {
        self.alias.as_deref() == Some(alias)
    }

    /// First advertised address, if the record carries one.
    pub fn first_address(&self) -> Option<&str> {
        self.multi_addresses
            .as_ref()
            .and_then(|addrs| addrs.first())
            .map(String::as_str)
    }

    /// Full addressable form `<first address>/p2p/<id>`.
    pub fn full_address(&self) -> Option<String> {
        let address = self.first_address()?;
        let id = self.id.as_deref()?;
        Some(format!("{address}/p2p/{id}"))
    }
}

/// Body of a create-peer request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPeer {
    #[serde(rename = "multiAddress")]
    pub multi_address: String,
    pub alias: String,
}

impl NewPeer {
    pub fn new(multi_address: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            multi_address: multi_address.into(),
            alias: alias.into(),
        }
    }
}
