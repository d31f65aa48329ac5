//! peerlink sidecar — keeps one node peered with the main node.
//!
//! Startup computes the local multiaddress once: wait for the key file,
//! derive the peer id, and combine it with the pod IP and gossip port. The
//! scheduler then runs reconciliation cycles forever, each resolving the main
//! node afresh and converging its peer table.

pub mod config;
pub mod error;
pub mod scheduler;
pub mod shutdown;

use std::sync::Arc;

use peerlink_directory::{ClusterCredentials, DirectoryQuery, KubeDirectory};
use peerlink_identity::{load_identity, LocalAddress, PollingWaiter};
use peerlink_peering::{DesiredPeer, PeeringClient, PeeringTask};
use peerlink_types::{FileWaiter, PeerDirectory, PeeringApi};

pub use config::SidecarConfig;
pub use error::SidecarError;
pub use scheduler::Scheduler;
pub use shutdown::{ShutdownController, ShutdownSignal};

/// Run the sidecar against the cluster it is deployed in.
pub async fn run(config: SidecarConfig, shutdown: ShutdownSignal) -> Result<(), SidecarError> {
    config.validate()?;
    if config.is_main_node() {
        return idle_as_main_node(&config, shutdown).await;
    }

    let credentials = ClusterCredentials::in_cluster()?;
    let query = DirectoryQuery {
        label_selector: config.selector.clone(),
        namespace: config.namespace.clone(),
        node_name: config.main_node_name.clone(),
    };
    let directory = KubeDirectory::new(credentials, query, config.request_timeout)?;
    let client = PeeringClient::new(config.rest_api_port, config.request_timeout)?;
    let waiter = PollingWaiter::new(config.key_poll_interval);

    run_with(
        &config,
        Arc::new(directory),
        Arc::new(client),
        &waiter,
        shutdown,
    )
    .await
}

/// Run the sidecar with explicit collaborators.
///
/// Returns once shutdown is signalled, or an error if the identity or the
/// local address cannot be established.
pub async fn run_with(
    config: &SidecarConfig,
    directory: Arc<dyn PeerDirectory>,
    api: Arc<dyn PeeringApi>,
    waiter: &dyn FileWaiter,
    mut shutdown: ShutdownSignal,
) -> Result<(), SidecarError> {
    config.validate()?;
    if config.is_main_node() {
        return idle_as_main_node(config, shutdown).await;
    }

    let identity = tokio::select! {
        identity = load_identity(&config.private_key_file, waiter) => identity?,
        _ = shutdown.wait() => {
            tracing::info!("shutdown before the key file appeared");
            return Ok(());
        }
    };
    let local = LocalAddress::build(&config.node_ip, config.gossip_port, identity.peer_id())?;
    tracing::info!(multiaddress = %local, "computed local multiaddress");

    let task = PeeringTask::new(
        directory,
        api,
        DesiredPeer::new(config.node_name.clone(), local.to_string()),
    );
    Scheduler::from_config(config)
        .run(|| task.try_peering(), shutdown)
        .await;
    Ok(())
}

async fn idle_as_main_node(
    config: &SidecarConfig,
    mut shutdown: ShutdownSignal,
) -> Result<(), SidecarError> {
    tracing::info!(node = %config.node_name, "this is the main node, not peering");
    shutdown.wait().await;
    Ok(())
}
