//! Sidecar configuration with TOML file support.

use std::path::PathBuf;
use std::time::Duration;

use peerlink_types::ConfigError;
use peerlink_utils::LogFormat;
use serde::{Deserialize, Serialize};

/// Configuration for one sidecar instance.
///
/// Loaded from a TOML file via [`SidecarConfig::from_toml_file`], then
/// overridden by CLI flags and environment variables in the daemon.
/// Required string values are empty until set; [`SidecarConfig::validate`]
/// rejects them before anything starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SidecarConfig {
    /// Cluster node hosting the main node's pod.
    #[serde(default)]
    pub main_node_name: String,

    /// Label selector of the node pods.
    #[serde(default)]
    pub selector: String,

    /// Namespace of the node pods.
    #[serde(default)]
    pub namespace: String,

    /// PEM file with this node's PKCS#8 Ed25519 key.
    #[serde(default)]
    pub private_key_file: PathBuf,

    /// Name of the cluster node this sidecar runs on; used as the peer alias.
    #[serde(default)]
    pub node_name: String,

    /// IPv4 address of this node's pod.
    #[serde(default)]
    pub node_ip: String,

    /// Period between checks that the peering is still in place.
    #[serde(default = "default_refresh_period", with = "humane_duration")]
    pub refresh_period: Duration,

    /// Period between attempts while the peering is not in place.
    #[serde(default = "default_retry_period", with = "humane_duration")]
    pub retry_period: Duration,

    /// Period between checks for the key file.
    #[serde(default = "default_key_poll_interval", with = "humane_duration")]
    pub key_poll_interval: Duration,

    /// Timeout for each directory and peering request.
    #[serde(default = "default_request_timeout", with = "humane_duration")]
    pub request_timeout: Duration,

    /// Port of the main node's REST API.
    #[serde(default = "default_rest_api_port")]
    pub rest_api_port: u16,

    /// Gossip port advertised in this node's multiaddress.
    #[serde(default = "default_gossip_port")]
    pub gossip_port: u16,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_refresh_period() -> Duration {
    Duration::from_secs(5 * 60)
}

fn default_retry_period() -> Duration {
    Duration::from_secs(5)
}

fn default_key_poll_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_rest_api_port() -> u16 {
    14265
}

fn default_gossip_port() -> u16 {
    15600
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Durations as `"5m"`, `"300ms"`, `"1h30m"` strings.
mod humane_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = value.as_millis();
        if millis % 1000 == 0 {
            serializer.serialize_str(&format!("{}s", millis / 1000))
        } else {
            serializer.serialize_str(&format!("{millis}ms"))
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let s = String::deserialize(deserializer)?;
        peerlink_utils::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}

// ── Impl ───────────────────────────────────────────────────────────────

impl SidecarConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::File {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content).map_err(|e| ConfigError::File {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::invalid("config", e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::invalid("config", e.to_string()))
    }

    /// Check that every required value is present and usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            (&self.main_node_name, "main node name"),
            (&self.selector, "pod selector"),
            (&self.namespace, "pod namespace"),
            (&self.node_name, "local node name (MY_NODE_NAME)"),
            (&self.node_ip, "local IP (MY_IP)"),
        ];
        for (value, name) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(name));
            }
        }
        if self.private_key_file.as_os_str().is_empty() {
            return Err(ConfigError::Missing("private key file"));
        }
        if self.rest_api_port == 0 {
            return Err(ConfigError::invalid("REST API port", "must be positive"));
        }
        if self.gossip_port == 0 {
            return Err(ConfigError::invalid("gossip port", "must be positive"));
        }
        let periods = [
            (self.refresh_period, "refresh period"),
            (self.retry_period, "retry period"),
            (self.key_poll_interval, "key poll interval"),
            (self.request_timeout, "request timeout"),
        ];
        for (period, name) in periods {
            if period.is_zero() {
                return Err(ConfigError::invalid(name, "must be positive"));
            }
        }
        Ok(())
    }

    /// The main node does not peer with itself.
    pub fn is_main_node(&self) -> bool {
        self.main_node_name == self.node_name
    }
}

impl Default for SidecarConfig {
    fn default() -> Self {
        Self {
            main_node_name: String::new(),
            selector: String::new(),
            namespace: String::new(),
            private_key_file: PathBuf::new(),
            node_name: String::new(),
            node_ip: String::new(),
            refresh_period: default_refresh_period(),
            retry_period: default_retry_period(),
            key_poll_interval: default_key_poll_interval(),
            request_timeout: default_request_timeout(),
            rest_api_port: default_rest_api_port(),
            gossip_port: default_gossip_port(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> SidecarConfig {
        SidecarConfig {
            main_node_name: "node-a".into(),
            selector: "app=hornet".into(),
            namespace: "iota".into(),
            private_key_file: "/app/p2pstore/identity.key".into(),
            node_name: "node-b".into(),
            node_ip: "10.0.0.5".into(),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_match_node_conventions() {
        let config = SidecarConfig::default();
        assert_eq!(config.refresh_period, Duration::from_secs(300));
        assert_eq!(config.retry_period, Duration::from_secs(5));
        assert_eq!(config.rest_api_port, 14265);
        assert_eq!(config.gossip_port, 15600);
    }

    #[test]
    fn complete_config_validates() {
        complete().validate().unwrap();
    }

    #[test]
    fn each_missing_value_is_reported() {
        let cases: [(fn(&mut SidecarConfig), &str); 6] = [
            (|c| c.main_node_name.clear(), "main node name"),
            (|c| c.selector.clear(), "pod selector"),
            (|c| c.namespace.clear(), "pod namespace"),
            (|c| c.node_name.clear(), "local node name (MY_NODE_NAME)"),
            (|c| c.node_ip.clear(), "local IP (MY_IP)"),
            (|c| c.private_key_file = PathBuf::new(), "private key file"),
        ];
        for (clear, name) in cases {
            let mut config = complete();
            clear(&mut config);
            match config.validate() {
                Err(ConfigError::Missing(missing)) => assert_eq!(missing, name),
                other => panic!("expected missing {name}, got {other:?}"),
            }
        }
    }

    #[test]
    fn zero_ports_are_invalid() {
        let mut config = complete();
        config.gossip_port = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "gossip port", .. })
        ));
    }

    #[test]
    fn partial_toml_overrides_defaults() {
        let toml = r#"
            main_node_name = "node-a"
            refresh_period = "10m"
            retry_period = "500ms"
            gossip_port = 15601
            log_format = "json"
        "#;
        let config = SidecarConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.main_node_name, "node-a");
        assert_eq!(config.refresh_period, Duration::from_secs(600));
        assert_eq!(config.retry_period, Duration::from_millis(500));
        assert_eq!(config.gossip_port, 15601);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.rest_api_port, 14265);
    }

    #[test]
    fn bad_duration_in_toml_is_rejected() {
        let err = SidecarConfig::from_toml_str(r#"retry_period = "soon""#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "config", .. }));
    }

    #[test]
    fn config_round_trips_through_toml() {
        let mut config = complete();
        config.retry_period = Duration::from_millis(1500);
        let parsed = SidecarConfig::from_toml_str(&config.to_toml_string().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn missing_file_returns_file_error() {
        let err =
            SidecarConfig::from_toml_file(std::path::Path::new("/nonexistent/peerlink.toml"))
                .unwrap_err();
        assert!(matches!(err, ConfigError::File { .. }));
    }

    #[test]
    fn detects_main_node() {
        let mut config = complete();
        assert!(!config.is_main_node());
        config.node_name = "node-a".into();
        assert!(config.is_main_node());
    }
}
