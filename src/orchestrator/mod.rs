//! Stack orchestration — drives a declared [`Stack`] through
//! `up`/`down`/`status` against an injected [`WorkloadRuntime`].

pub mod error;

pub use error::{OrchestratorError, OrchestratorResult};

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::runtime::{
    ListFilter, NetworkSpec, WorkloadConfig, WorkloadRuntime, WorkloadState, WorkloadStatus,
};
use crate::stack::{validate, DependencyGraph, Stack, ToolServerKind};

/// Options for [`Orchestrator::up`].
#[derive(Debug, Clone)]
pub struct UpOptions {
    pub no_cache: bool,
    pub base_port: u16,
    pub gateway_port: u16,
}

impl Default for UpOptions {
    fn default() -> Self {
        UpOptions {
            no_cache: false,
            base_port: 8100,
            gateway_port: 0,
        }
    }
}

fn workload_name(stack: &str, name: &str) -> String {
    format!("{}-{}", stack, name)
}

fn labels(stack: &str, kind: &str, logical_name: &str) -> HashMap<String, String> {
    let mut labels = HashMap::new();
    labels.insert("managed".to_string(), "true".to_string());
    labels.insert("stack".to_string(), stack.to_string());
    labels.insert(kind.to_string(), logical_name.to_string());
    labels
}

/// Drives a [`Stack`] through its lifecycle against a [`WorkloadRuntime`]:
/// a coordinator struct wrapping one injected abstraction, sequencing
/// calls against it per request and logging entry/exit via `tracing`.
pub struct Orchestrator<R: WorkloadRuntime> {
    runtime: Arc<R>,
}

impl<R: WorkloadRuntime> Orchestrator<R> {
    pub fn new(runtime: Arc<R>) -> Self {
        Orchestrator { runtime }
    }

    pub async fn up(
        &self,
        stack: &Stack,
        opts: UpOptions,
    ) -> OrchestratorResult<Vec<WorkloadStatus>> {
        let errors = validate(stack);
        if !errors.is_empty() {
            return Err(OrchestratorError::InvalidStack(errors));
        }

        self.runtime
            .ping()
            .await
            .map_err(|e| OrchestratorError::Unavailable(e.to_string()))?;

        self.ensure_networks(stack).await?;

        let mut results = Vec::new();

        for resource in &stack.resources {
            let status = self.start_resource(stack, resource, opts.no_cache).await?;
            results.push(status);
        }

        let mut container_index: u16 = 0;
        let mut server_statuses = HashMap::new();
        for server in &stack.mcp_servers {
            let status = self
                .start_tool_server(stack, server, &opts, &mut container_index)
                .await?;
            server_statuses.insert(server.name.clone(), status.clone());
            results.push(status);
        }

        let agent_order = self.resolve_agent_order(stack)?;
        let agents_by_name: HashMap<&str, &crate::stack::Agent> =
            stack.agents.iter().map(|a| (a.name.as_str(), a)).collect();

        for name in &agent_order {
            let Some(agent) = agents_by_name.get(name.as_str()) else {
                continue;
            };
            let status = self.start_agent(stack, agent, &opts).await?;
            results.push(status);
        }

        info!(stack = %stack.name, workloads = results.len(), "stack up complete");
        Ok(results)
    }

    pub async fn down(&self, stack_name: &str) -> OrchestratorResult<()> {
        self.runtime
            .ping()
            .await
            .map_err(|e| OrchestratorError::Unavailable(e.to_string()))?;

        let filter = ListFilter {
            stack: Some(stack_name.to_string()),
            labels: HashMap::new(),
        };
        let workloads = match self.runtime.list(filter).await {
            Ok(w) => w,
            Err(e) => {
                warn!(stack = %stack_name, error = %e, "failed to list workloads during down");
                Vec::new()
            }
        };

        for workload in &workloads {
            if let Err(e) = self.runtime.stop(&workload.id).await {
                warn!(workload_id = %workload.id, error = %e, "failed to stop workload");
            }
            if let Err(e) = self.runtime.remove(&workload.id).await {
                warn!(workload_id = %workload.id, error = %e, "failed to remove workload");
            }
        }

        match self.runtime.list_networks(stack_name).await {
            Ok(networks) => {
                for network in networks {
                    if let Err(e) = self.runtime.remove_network(&network).await {
                        warn!(network = %network, error = %e, "failed to remove network");
                    }
                }
            }
            Err(e) => warn!(stack = %stack_name, error = %e, "failed to list networks during down"),
        }

        debug!(stack = %stack_name, "stack down complete");
        Ok(())
    }

    pub async fn status(&self, stack_name: &str) -> OrchestratorResult<Vec<WorkloadStatus>> {
        let filter = ListFilter {
            stack: Some(stack_name.to_string()),
            labels: HashMap::new(),
        };
        Ok(self.runtime.list(filter).await?)
    }

    async fn ensure_networks(&self, stack: &Stack) -> OrchestratorResult<()> {
        if stack.is_advanced_mode() {
            for network in &stack.networks {
                self.runtime
                    .ensure_network(
                        &network.name,
                        NetworkSpec {
                            driver: format!("{:?}", network.driver).to_lowercase(),
                            stack: stack.name.clone(),
                        },
                    )
                    .await?;
            }
        } else {
            let name = stack.simple_network_name();
            let driver = stack
                .network
                .as_ref()
                .map(|n| format!("{:?}", n.driver).to_lowercase())
                .unwrap_or_else(|| "bridge".to_string());
            self.runtime
                .ensure_network(
                    &name,
                    NetworkSpec {
                        driver,
                        stack: stack.name.clone(),
                    },
                )
                .await?;
        }
        Ok(())
    }

    async fn start_resource(
        &self,
        stack: &Stack,
        resource: &crate::stack::Resource,
        no_cache: bool,
    ) -> OrchestratorResult<WorkloadStatus> {
        let name = workload_name(&stack.name, &resource.name);
        if let Some(id) = self.runtime.exists(&name).await? {
            debug!(resource = %resource.name, "resource already exists, reusing");
            return Ok(self.runtime.status(&id).await?);
        }

        if !no_cache {
            self.runtime.ensure_image(&resource.image).await?;
        }

        let network = resource
            .network
            .clone()
            .or_else(|| (!stack.is_advanced_mode()).then(|| stack.simple_network_name()));

        let config = WorkloadConfig {
            name,
            stack: stack.name.clone(),
            workload_type: "resource".to_string(),
            image: Some(resource.image.clone()),
            command: None,
            env: resource.env.clone(),
            network,
            exposed_port: None,
            host_port: None,
            volumes: resource.volumes.clone(),
            transport: None,
            labels: labels(&stack.name, "resource", &resource.name),
        };
        Ok(self.runtime.start(config).await?)
    }

    async fn start_tool_server(
        &self,
        stack: &Stack,
        server: &crate::stack::ToolServer,
        opts: &UpOptions,
        container_index: &mut u16,
    ) -> OrchestratorResult<WorkloadStatus> {
        let name = workload_name(&stack.name, &server.name);

        match server.kind() {
            Some(ToolServerKind::Container) => {
                if let Some(id) = self.runtime.exists(&name).await? {
                    debug!(server = %server.name, "mcp server already exists, reusing");
                    let host_port = match server.port {
                        Some(p) => Some(self.runtime.get_host_port(&id, p).await?),
                        None => None,
                    };
                    let mut status = self.runtime.status(&id).await?;
                    if let Some(port) = host_port {
                        status.host_port = Some(port);
                    }
                    return Ok(status);
                }

                if !opts.no_cache {
                    if let Some(image) = &server.image {
                        self.runtime.ensure_image(image).await?;
                    }
                }

                let host_port = server.port.map(|_| opts.base_port + *container_index);
                *container_index += 1;

                let network = server
                    .network
                    .clone()
                    .or_else(|| (!stack.is_advanced_mode()).then(|| stack.simple_network_name()));

                let config = WorkloadConfig {
                    name,
                    stack: stack.name.clone(),
                    workload_type: "mcp_server".to_string(),
                    image: server.image.clone(),
                    command: server.command.clone(),
                    env: server.env.clone(),
                    network,
                    exposed_port: server.port,
                    host_port,
                    volumes: vec![],
                    transport: Some(format!("{:?}", server.transport_or_default()).to_lowercase()),
                    labels: labels(&stack.name, "mcp_server", &server.name),
                };
                Ok(self.runtime.start(config).await?)
            }
            _ => {
                // External / local-process / SSH / OpenAPI: pseudo-workload,
                // no container and no port allocation.
                debug!(server = %server.name, kind = ?server.kind(), "recording pseudo-workload");
                Ok(WorkloadStatus {
                    id: name.clone(),
                    name,
                    stack: stack.name.clone(),
                    workload_type: "mcp_server".to_string(),
                    state: WorkloadState::Running,
                    message: Some("externally managed".to_string()),
                    endpoint: server.url.clone(),
                    host_port: None,
                    image: None,
                    labels: labels(&stack.name, "mcp_server", &server.name),
                })
            }
        }
    }

    /// Builds the agent dependency graph restricted to inter-agent A2A
    /// edges: `agent.uses[i].server` only creates an edge when the
    /// target is another A2A-enabled agent; tool-server and non-A2A-agent
    /// targets are ignored for ordering.
    fn resolve_agent_order(&self, stack: &Stack) -> OrchestratorResult<Vec<String>> {
        let a2a_agent_names: std::collections::HashSet<&str> = stack
            .agents
            .iter()
            .filter(|a| a.is_a2a_enabled())
            .map(|a| a.name.as_str())
            .collect();

        let mut graph = DependencyGraph::new();
        for agent in &stack.agents {
            graph.add_node(agent.name.clone());
        }
        for agent in &stack.agents {
            for selector in &agent.uses {
                if a2a_agent_names.contains(selector.server.as_str())
                    && selector.server != agent.name
                {
                    graph.add_edge(agent.name.clone(), selector.server.clone());
                }
            }
        }
        Ok(graph.sort()?)
    }

    async fn start_agent(
        &self,
        stack: &Stack,
        agent: &crate::stack::Agent,
        opts: &UpOptions,
    ) -> OrchestratorResult<WorkloadStatus> {
        let name = workload_name(&stack.name, &agent.name);

        if agent.is_headless() {
            debug!(agent = %agent.name, "headless agent, no container workload");
            return Ok(WorkloadStatus {
                id: name.clone(),
                name,
                stack: stack.name.clone(),
                workload_type: "agent".to_string(),
                state: WorkloadState::Running,
                message: Some("headless".to_string()),
                endpoint: None,
                host_port: None,
                image: None,
                labels: labels(&stack.name, "agent", &agent.name),
            });
        }

        if let Some(id) = self.runtime.exists(&name).await? {
            debug!(agent = %agent.name, "agent already exists, reusing");
            return Ok(self.runtime.status(&id).await?);
        }

        if !opts.no_cache {
            if let Some(image) = &agent.image {
                self.runtime.ensure_image(image).await?;
            }
        }

        let mut env = agent.env.clone();
        if opts.gateway_port > 0 {
            env.insert(
                "MCP_ENDPOINT".to_string(),
                format!("http://host.docker.internal:{}", opts.gateway_port),
            );
        }

        let network = agent
            .network
            .clone()
            .or_else(|| (!stack.is_advanced_mode()).then(|| stack.simple_network_name()));

        let config = WorkloadConfig {
            name,
            stack: stack.name.clone(),
            workload_type: "agent".to_string(),
            image: agent.image.clone(),
            command: agent.command.clone(),
            env,
            network,
            exposed_port: None,
            host_port: None,
            volumes: vec![],
            transport: None,
            labels: labels(&stack.name, "agent", &agent.name),
        };
        Ok(self.runtime.start(config).await?)
    }
}
