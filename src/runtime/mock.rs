//! In-memory [`WorkloadRuntime`] test double.
//!
//! Ships as a first-class in-crate module, not just a test fixture, so
//! integration tests can exercise the full [`crate::orchestrator::Orchestrator`]
//! without a real container daemon.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{
    ListFilter, NetworkSpec, RuntimeError, RuntimeResult, WorkloadConfig, WorkloadRuntime,
    WorkloadState, WorkloadStatus,
};

#[derive(Debug, Default)]
struct State {
    workloads: HashMap<String, WorkloadStatus>,
    networks: HashMap<String, String>, // name -> stack
    images: std::collections::HashSet<String>,
}

/// In-memory runtime backed by `HashMap`s, following the same
/// lock-acquire-scan-mutate pattern as [`crate::server::task_store::InMemoryTaskStore`].
#[derive(Debug)]
pub struct MockRuntime {
    state: Arc<RwLock<State>>,
    next_id: AtomicU16,
}

impl MockRuntime {
    pub fn new() -> Self {
        MockRuntime {
            state: Arc::new(RwLock::new(State::default())),
            next_id: AtomicU16::new(1),
        }
    }

    fn next_workload_id(&self) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        format!("mock-workload-{}", n)
    }
}

impl Default for MockRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkloadRuntime for MockRuntime {
    async fn start(&self, config: WorkloadConfig) -> RuntimeResult<WorkloadStatus> {
        if config.network.is_some() {
            let state = self.state.read().await;
            let network = config.network.as_ref().unwrap();
            if !state.networks.contains_key(network) {
                return Err(RuntimeError::NetworkMissing(network.clone()));
            }
        }

        let id = self.next_workload_id();
        let status = WorkloadStatus {
            id: id.clone(),
            name: config.name.clone(),
            stack: config.stack.clone(),
            workload_type: config.workload_type.clone(),
            state: WorkloadState::Running,
            message: None,
            endpoint: config
                .host_port
                .map(|p| format!("http://localhost:{}", p)),
            host_port: config.host_port,
            image: config.image.clone(),
            labels: config.labels.clone(),
        };

        let mut state = self.state.write().await;
        state.workloads.insert(id.clone(), status.clone());
        debug!(workload_id = %id, name = %config.name, "mock runtime started workload");
        Ok(status)
    }

    async fn stop(&self, id: &str) -> RuntimeResult<()> {
        let mut state = self.state.write().await;
        match state.workloads.get_mut(id) {
            Some(status) => {
                status.state = WorkloadState::Stopped;
                Ok(())
            }
            None => Err(RuntimeError::NotFound(id.to_string())),
        }
    }

    async fn remove(&self, id: &str) -> RuntimeResult<()> {
        let mut state = self.state.write().await;
        state
            .workloads
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RuntimeError::NotFound(id.to_string()))
    }

    async fn status(&self, id: &str) -> RuntimeResult<WorkloadStatus> {
        let state = self.state.read().await;
        state
            .workloads
            .get(id)
            .cloned()
            .ok_or_else(|| RuntimeError::NotFound(id.to_string()))
    }

    async fn exists(&self, name: &str) -> RuntimeResult<Option<String>> {
        let state = self.state.read().await;
        Ok(state
            .workloads
            .values()
            .find(|w| w.name == name)
            .map(|w| w.id.clone()))
    }

    async fn list(&self, filter: ListFilter) -> RuntimeResult<Vec<WorkloadStatus>> {
        let state = self.state.read().await;
        let matches: Vec<WorkloadStatus> = state
            .workloads
            .values()
            .filter(|w| {
                filter.stack.as_ref().map(|s| s == &w.stack).unwrap_or(true)
                    && filter
                        .labels
                        .iter()
                        .all(|(k, v)| w.labels.get(k) == Some(v))
            })
            .cloned()
            .collect();
        Ok(matches)
    }

    async fn get_host_port(&self, id: &str, _container_port: u16) -> RuntimeResult<u16> {
        let state = self.state.read().await;
        state
            .workloads
            .get(id)
            .and_then(|w| w.host_port)
            .ok_or_else(|| RuntimeError::NotFound(id.to_string()))
    }

    async fn ensure_network(&self, name: &str, spec: NetworkSpec) -> RuntimeResult<()> {
        let mut state = self.state.write().await;
        state.networks.entry(name.to_string()).or_insert(spec.stack);
        Ok(())
    }

    async fn list_networks(&self, stack: &str) -> RuntimeResult<Vec<String>> {
        let state = self.state.read().await;
        Ok(state
            .networks
            .iter()
            .filter(|(_, s)| s.as_str() == stack)
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn remove_network(&self, name: &str) -> RuntimeResult<()> {
        let mut state = self.state.write().await;
        state.networks.remove(name);
        Ok(())
    }

    async fn ensure_image(&self, image: &str) -> RuntimeResult<()> {
        let mut state = self.state.write().await;
        state.images.insert(image.to_string());
        Ok(())
    }

    async fn ping(&self) -> RuntimeResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(name: &str, stack: &str) -> WorkloadConfig {
        WorkloadConfig {
            name: name.to_string(),
            stack: stack.to_string(),
            workload_type: "agent".to_string(),
            image: Some("demo:latest".to_string()),
            command: None,
            env: HashMap::new(),
            network: None,
            exposed_port: None,
            host_port: Some(9000),
            volumes: vec![],
            transport: None,
            labels: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn start_then_status_roundtrip() {
        let runtime = MockRuntime::new();
        let started = runtime.start(config("billing", "demo")).await.unwrap();
        let status = runtime.status(&started.id).await.unwrap();
        assert_eq!(status.name, "billing");
        assert_eq!(status.state, WorkloadState::Running);
    }

    #[tokio::test]
    async fn stop_transitions_state() {
        let runtime = MockRuntime::new();
        let started = runtime.start(config("billing", "demo")).await.unwrap();
        runtime.stop(&started.id).await.unwrap();
        let status = runtime.status(&started.id).await.unwrap();
        assert_eq!(status.state, WorkloadState::Stopped);
    }

    #[tokio::test]
    async fn list_filters_by_stack_and_labels() {
        let runtime = MockRuntime::new();
        let mut cfg_a = config("a", "stack-1");
        cfg_a.labels.insert("agent".to_string(), "a".to_string());
        runtime.start(cfg_a).await.unwrap();

        let mut cfg_b = config("b", "stack-2");
        cfg_b.labels.insert("agent".to_string(), "b".to_string());
        runtime.start(cfg_b).await.unwrap();

        let results = runtime
            .list(ListFilter {
                stack: Some("stack-1".to_string()),
                labels: HashMap::new(),
            })
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "a");
    }

    #[tokio::test]
    async fn start_fails_when_network_missing() {
        let runtime = MockRuntime::new();
        let mut cfg = config("a", "stack-1");
        cfg.network = Some("missing-net".to_string());
        let result = runtime.start(cfg).await;
        assert!(matches!(result, Err(RuntimeError::NetworkMissing(_))));
    }

    #[tokio::test]
    async fn ensure_network_then_start_succeeds() {
        let runtime = MockRuntime::new();
        runtime
            .ensure_network(
                "demo-net",
                NetworkSpec {
                    driver: "bridge".to_string(),
                    stack: "demo".to_string(),
                },
            )
            .await
            .unwrap();
        let mut cfg = config("a", "demo");
        cfg.network = Some("demo-net".to_string());
        assert!(runtime.start(cfg).await.is_ok());
    }

    #[tokio::test]
    async fn remove_then_status_not_found() {
        let runtime = MockRuntime::new();
        let started = runtime.start(config("a", "demo")).await.unwrap();
        runtime.remove(&started.id).await.unwrap();
        assert!(runtime.status(&started.id).await.is_err());
    }
}
