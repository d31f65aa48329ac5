//! peerlink daemon — keeps this node peered with the main node.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use peerlink_sidecar::{ShutdownController, SidecarConfig};
use peerlink_utils::{format_duration, init_logging, parse_duration, LogFormat};

#[derive(Parser, Debug)]
#[command(name = "peerlink", about = "Peering sidecar for a node pod")]
struct Cli {
    /// Name of the cluster node hosting the main node's pod.
    #[arg(long, env = "PEERLINK_MAIN_NODE_NAME")]
    main_node_name: Option<String>,

    /// Label selector of the node pods, e.g. "app=hornet".
    #[arg(long, env = "PEERLINK_SELECTOR")]
    selector: Option<String>,

    /// Namespace of the node pods.
    #[arg(long, env = "PEERLINK_NAMESPACE")]
    namespace: Option<String>,

    /// PEM file with this node's PKCS#8 Ed25519 key.
    #[arg(long, env = "PEERLINK_PRIVATE_KEY_FILE")]
    private_key_file: Option<PathBuf>,

    /// Name of the cluster node this sidecar runs on.
    #[arg(long, env = "MY_NODE_NAME")]
    node_name: Option<String>,

    /// IPv4 address of this node's pod.
    #[arg(long, env = "MY_IP")]
    node_ip: Option<String>,

    /// Period between checks once the peering is in place ("5m", "1h").
    #[arg(long, env = "PEERLINK_REFRESH_PERIOD", value_parser = parse_duration)]
    refresh_period: Option<Duration>,

    /// Period between attempts while the peering is not in place.
    #[arg(long, env = "PEERLINK_RETRY_PERIOD", value_parser = parse_duration)]
    retry_period: Option<Duration>,

    /// Period between checks for the key file.
    #[arg(long, env = "PEERLINK_KEY_POLL_INTERVAL", value_parser = parse_duration)]
    key_poll_interval: Option<Duration>,

    /// Timeout for each directory and peering request.
    #[arg(long, env = "PEERLINK_REQUEST_TIMEOUT", value_parser = parse_duration)]
    request_timeout: Option<Duration>,

    /// Port of the main node's REST API.
    #[arg(long, env = "PEERLINK_REST_API_PORT")]
    rest_api_port: Option<u16>,

    /// Gossip port advertised in this node's multiaddress.
    #[arg(long, env = "PEERLINK_GOSSIP_PORT")]
    gossip_port: Option<u16>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "PEERLINK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log output: "human" or "json".
    #[arg(long, env = "PEERLINK_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "PEERLINK_CONFIG")]
    config: Option<PathBuf>,
}

impl Cli {
    /// Layer the flags that were given over `base`.
    fn apply(self, base: SidecarConfig) -> SidecarConfig {
        SidecarConfig {
            main_node_name: self.main_node_name.unwrap_or(base.main_node_name),
            selector: self.selector.unwrap_or(base.selector),
            namespace: self.namespace.unwrap_or(base.namespace),
            private_key_file: self.private_key_file.unwrap_or(base.private_key_file),
            node_name: self.node_name.unwrap_or(base.node_name),
            node_ip: self.node_ip.unwrap_or(base.node_ip),
            refresh_period: self.refresh_period.unwrap_or(base.refresh_period),
            retry_period: self.retry_period.unwrap_or(base.retry_period),
            key_poll_interval: self.key_poll_interval.unwrap_or(base.key_poll_interval),
            request_timeout: self.request_timeout.unwrap_or(base.request_timeout),
            rest_api_port: self.rest_api_port.unwrap_or(base.rest_api_port),
            gossip_port: self.gossip_port.unwrap_or(base.gossip_port),
            log_format: self.log_format.unwrap_or(base.log_format),
            log_level: self.log_level.unwrap_or(base.log_level),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let base = match cli.config.as_deref() {
        Some(path) => SidecarConfig::from_toml_file(path)?,
        None => SidecarConfig::default(),
    };
    let config_path = cli.config.clone();
    let config = cli.apply(base);

    init_logging(config.log_format, &config.log_level);
    if let Some(path) = config_path {
        tracing::info!("Loaded config from {}", path.display());
    }
    config.validate().context("invalid configuration")?;

    tracing::info!(
        main_node = %config.main_node_name,
        namespace = %config.namespace,
        selector = %config.selector,
        refresh = %format_duration(config.refresh_period),
        retry = %format_duration(config.retry_period),
        "starting peerlink sidecar"
    );

    let controller = Arc::new(ShutdownController::new());
    let signal = controller.signal();
    let signals = controller.clone();
    tokio::spawn(async move { signals.wait_for_signal().await });

    peerlink_sidecar::run(config, signal)
        .await
        .context("sidecar stopped")?;

    tracing::info!("peerlink exited cleanly");
    Ok(())
}
