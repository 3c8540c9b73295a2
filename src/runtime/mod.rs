//! Workload runtime interface — the abstract contract the orchestrator
//! drives to start, stop, and inspect workloads, independent of the
//! concrete container backend.

mod mock;

pub use mock::MockRuntime;

use std::collections::HashMap;

use async_trait::async_trait;

/// The lifecycle state of a single workload as reported by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadState {
    Running,
    Stopped,
    Failed,
    Creating,
    Unknown,
}

/// Everything needed to start one workload.
#[derive(Debug, Clone)]
pub struct WorkloadConfig {
    pub name: String,
    pub stack: String,
    pub workload_type: String,
    pub image: Option<String>,
    pub command: Option<Vec<String>>,
    pub env: HashMap<String, String>,
    pub network: Option<String>,
    pub exposed_port: Option<u16>,
    pub host_port: Option<u16>,
    pub volumes: Vec<String>,
    pub transport: Option<String>,
    pub labels: HashMap<String, String>,
}

/// A point-in-time snapshot of a workload's runtime state.
#[derive(Debug, Clone)]
pub struct WorkloadStatus {
    pub id: String,
    pub name: String,
    pub stack: String,
    pub workload_type: String,
    pub state: WorkloadState,
    pub message: Option<String>,
    pub endpoint: Option<String>,
    pub host_port: Option<u16>,
    pub image: Option<String>,
    pub labels: HashMap<String, String>,
}

/// Filter for [`WorkloadRuntime::list`].
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub stack: Option<String>,
    pub labels: HashMap<String, String>,
}

/// Driver/network configuration passed to [`WorkloadRuntime::ensure_network`].
#[derive(Debug, Clone)]
pub struct NetworkSpec {
    pub driver: String,
    pub stack: String,
}

/// Errors a runtime implementation may return. Anything else is treated
/// by the orchestrator as transient and surfaced verbatim.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RuntimeError {
    #[error("workload not found: {0}")]
    NotFound(String),

    #[error("network missing: {0}")]
    NetworkMissing(String),

    #[error("runtime unavailable: {0}")]
    Unavailable(String),

    #[error("operation not supported: {0}")]
    NotSupported(String),

    #[error("invalid workload config: {0}")]
    InvalidConfig(String),

    #[error("runtime error: {0}")]
    Other(String),
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Abstract workload runtime the orchestrator is parameterized over.
/// A conforming in-crate implementation, [`MockRuntime`], backs this
/// crate's own test suite — it is reachable through the same trait
/// object the orchestrator uses in production, never special-cased.
#[async_trait]
pub trait WorkloadRuntime: Send + Sync {
    async fn start(&self, config: WorkloadConfig) -> RuntimeResult<WorkloadStatus>;
    async fn stop(&self, id: &str) -> RuntimeResult<()>;
    async fn remove(&self, id: &str) -> RuntimeResult<()>;
    async fn status(&self, id: &str) -> RuntimeResult<WorkloadStatus>;
    async fn exists(&self, name: &str) -> RuntimeResult<Option<String>>;
    async fn list(&self, filter: ListFilter) -> RuntimeResult<Vec<WorkloadStatus>>;
    async fn get_host_port(&self, id: &str, container_port: u16) -> RuntimeResult<u16>;
    async fn ensure_network(&self, name: &str, spec: NetworkSpec) -> RuntimeResult<()>;
    async fn list_networks(&self, stack: &str) -> RuntimeResult<Vec<String>>;
    async fn remove_network(&self, name: &str) -> RuntimeResult<()>;
    async fn ensure_image(&self, image: &str) -> RuntimeResult<()>;
    async fn ping(&self) -> RuntimeResult<()>;
    async fn close(&self) -> RuntimeResult<()> {
        Ok(())
    }
}
