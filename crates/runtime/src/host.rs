//! Authoritative host orchestrator.
//!
//! The host owns the worker task, wires up the command and broadcast
//! channels, and hands out [`HostHandle`]s.

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use arena_core::{Battle, ReplicationFilter};

use crate::api::{HostHandle, Result, RuntimeError};
use crate::replication::Replicator;
use crate::workers::HostWorker;

/// Host configuration shared across the orchestrator and worker.
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub command_buffer_size: usize,
    /// Messages an observer may fall behind before it starts missing them.
    pub broadcast_capacity: usize,
    /// Skip stunned turns automatically after the battle's stun delay.
    pub auto_skip_stunned: bool,
    pub replication: ReplicationFilter,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            command_buffer_size: 32,
            broadcast_capacity: 256,
            auto_skip_stunned: true,
            replication: ReplicationFilter::default(),
        }
    }
}

/// Running authoritative host.
///
/// [`HostHandle`] provides a cloneable façade for clients.
pub struct Host {
    handle: HostHandle,
    worker: JoinHandle<()>,
}

impl Host {
    pub fn builder(battle: Battle) -> HostBuilder {
        HostBuilder {
            battle,
            config: HostConfig::default(),
        }
    }

    /// Get a cloneable handle to this host.
    pub fn handle(&self) -> HostHandle {
        self.handle.clone()
    }

    /// Wait for the worker to finish.
    ///
    /// The worker exits once every handle, including clones, is dropped.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);
        self.worker.await.map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Host`].
pub struct HostBuilder {
    battle: Battle,
    config: HostConfig,
}

impl HostBuilder {
    /// Override host configuration.
    pub fn config(mut self, config: HostConfig) -> Self {
        self.config = config;
        self
    }

    /// Spawn the worker on the current tokio runtime.
    pub fn spawn(self) -> Host {
        let (command_tx, command_rx) = mpsc::channel(self.config.command_buffer_size);
        let (outbound, _) = broadcast::channel(self.config.broadcast_capacity);

        let worker = HostWorker::new(
            self.battle,
            command_rx,
            outbound.clone(),
            Replicator::new(self.config.replication),
            self.config.auto_skip_stunned,
        );
        let worker = tokio::spawn(worker.run());

        Host {
            handle: HostHandle::new(command_tx, outbound),
            worker,
        }
    }
}
