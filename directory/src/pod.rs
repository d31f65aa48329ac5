//! Pod list schema and single-match selection.

use std::net::IpAddr;

use peerlink_types::{Endpoint, ResolutionError};
use serde::Deserialize;

/// Subset of the Kubernetes `PodList` the sidecar reads.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PodList {
    #[serde(default)]
    pub items: Vec<Pod>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Pod {
    #[serde(default)]
    pub metadata: PodMetadata,
    #[serde(default)]
    pub status: Option<PodStatus>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PodMetadata {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PodStatus {
    #[serde(default, rename = "podIP")]
    pub pod_ip: Option<String>,
}

impl Pod {
    pub fn name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or("<unnamed>")
    }

    pub fn ip(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.pod_ip.as_deref())
            .filter(|ip| !ip.is_empty())
    }
}

/// Pin the lookup result to exactly one pod with a usable IP.
///
/// Zero or several pods are normal while the main node is being
/// rescheduled, so every mismatch is a recoverable [`ResolutionError`].
pub fn select_single_endpoint(pods: &[Pod]) -> Result<Endpoint, ResolutionError> {
    let [pod] = pods else {
        return Err(ResolutionError::NotExactlyOne(pods.len()));
    };
    let ip = pod
        .ip()
        .ok_or_else(|| ResolutionError::MissingAddress(pod.name().to_string()))?;
    let ip: IpAddr = ip.parse().map_err(|_| ResolutionError::InvalidAddress {
        pod: pod.name().to_string(),
        ip: ip.to_string(),
    })?;
    Ok(Endpoint::new(ip))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pod(name: &str, ip: Option<&str>) -> Pod {
        Pod {
            metadata: PodMetadata {
                name: Some(name.into()),
            },
            status: Some(PodStatus {
                pod_ip: ip.map(Into::into),
            }),
        }
    }

    #[test]
    fn single_pod_resolves() {
        let endpoint = select_single_endpoint(&[pod("hornet-0", Some("10.1.2.3"))]).unwrap();
        assert_eq!(endpoint.to_string(), "10.1.2.3");
    }

    #[test]
    fn zero_pods_is_not_exactly_one() {
        let err = select_single_endpoint(&[]).unwrap_err();
        assert!(matches!(err, ResolutionError::NotExactlyOne(0)));
    }

    #[test]
    fn two_pods_is_not_exactly_one() {
        let pods = [pod("a", Some("10.0.0.1")), pod("b", Some("10.0.0.2"))];
        let err = select_single_endpoint(&pods).unwrap_err();
        assert!(matches!(err, ResolutionError::NotExactlyOne(2)));
    }

    #[test]
    fn pod_without_ip_is_rejected() {
        for p in [pod("pending", None), pod("pending", Some("")), Pod::default()] {
            let err = select_single_endpoint(&[p]).unwrap_err();
            assert!(matches!(err, ResolutionError::MissingAddress(_)));
        }
    }

    #[test]
    fn pod_with_garbage_ip_is_rejected() {
        let err = select_single_endpoint(&[pod("odd", Some("not-an-ip"))]).unwrap_err();
        assert!(matches!(err, ResolutionError::InvalidAddress { .. }));
    }

    #[test]
    fn decodes_api_server_pod_list() {
        let json = r#"{
            "kind": "PodList",
            "apiVersion": "v1",
            "metadata": {"resourceVersion": "123"},
            "items": [{
                "metadata": {"name": "hornet-x7k2p", "namespace": "iota"},
                "spec": {"nodeName": "node-a"},
                "status": {"phase": "Running", "podIP": "10.42.0.17"}
            }]
        }"#;
        let list: PodList = serde_json::from_str(json).unwrap();
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].name(), "hornet-x7k2p");
        assert_eq!(list.items[0].ip(), Some("10.42.0.17"));
    }
}
