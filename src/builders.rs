//! Builder patterns for ergonomic construction of gateway types.

use crate::types::{AgentCapabilities, AgentCard, AgentProvider, AgentSkill};

/// Builder for constructing [`AgentCard`] with sensible defaults.
///
/// # Example
///
/// ```
/// use gridctl::builders::AgentCardBuilder;
///
/// let card = AgentCardBuilder::new("billing", "http://localhost:8080/a2a/billing")
///     .description("Handles billing questions")
///     .version("1.0.0")
///     .with_skill("refund", "Refund", "Process a refund", vec!["billing".to_string()])
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct AgentCardBuilder {
    name: String,
    url: String,
    description: Option<String>,
    version: Option<String>,
    provider: Option<AgentProvider>,
    documentation_url: Option<String>,
    capabilities: AgentCapabilities,
    default_input_modes: Vec<String>,
    default_output_modes: Vec<String>,
    skills: Vec<AgentSkill>,
}

impl AgentCardBuilder {
    /// Create a new builder for an agent reachable at `url`.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            description: None,
            version: None,
            provider: None,
            documentation_url: None,
            capabilities: AgentCapabilities::default(),
            default_input_modes: vec!["text/plain".to_string()],
            default_output_modes: vec!["text/plain".to_string()],
            skills: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn provider(mut self, organization: impl Into<String>, url: impl Into<String>) -> Self {
        self.provider = Some(AgentProvider {
            organization: organization.into(),
            url: url.into(),
        });
        self
    }

    pub fn documentation_url(mut self, url: impl Into<String>) -> Self {
        self.documentation_url = Some(url.into());
        self
    }

    /// Streaming and push notifications are Non-goals for this gateway; this
    /// setter exists only for wire-compatibility with peers that do
    /// advertise them.
    pub fn with_streaming(mut self, enabled: bool) -> Self {
        self.capabilities.streaming = Some(enabled);
        self
    }

    pub fn with_skill(
        mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        tags: Vec<String>,
    ) -> Self {
        self.skills.push(AgentSkill {
            id: id.into(),
            name: name.into(),
            description: Some(description.into()),
            tags,
            examples: Vec::new(),
        });
        self
    }

    pub fn input_modes(mut self, modes: Vec<String>) -> Self {
        self.default_input_modes = modes;
        self
    }

    pub fn output_modes(mut self, modes: Vec<String>) -> Self {
        self.default_output_modes = modes;
        self
    }

    pub fn build(self) -> AgentCard {
        AgentCard {
            name: self.name,
            description: self.description,
            url: self.url,
            version: self.version,
            provider: self.provider,
            documentation_url: self.documentation_url,
            capabilities: self.capabilities,
            skills: self.skills,
            default_input_modes: self.default_input_modes,
            default_output_modes: self.default_output_modes,
        }
    }
}

/// Builder for constructing [`crate::client::A2AClient`] with custom configuration.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// use gridctl::builders::ClientBuilder;
/// use std::time::Duration;
///
/// let client = ClientBuilder::new("http://localhost:7420")
///     .with_timeout(Duration::from_secs(30))
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "client")]
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    url: String,
    timeout: Option<std::time::Duration>,
    headers: std::collections::HashMap<String, String>,
}

#[cfg(feature = "client")]
impl ClientBuilder {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: None,
            headers: std::collections::HashMap::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.headers.insert(
            "Authorization".to_string(),
            format!("Bearer {}", token.into()),
        );
        self
    }

    /// Resolve the agent card at `url` and build a client targeting it.
    pub async fn build(self) -> crate::A2AResult<crate::client::A2AClient> {
        use crate::client::{CardResolver, JsonRpcTransport, TransportConfig};

        let resolver = CardResolver::new();
        let card = resolver.resolve(&self.url).await?;

        let mut config = TransportConfig::default();
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        config.headers = self.headers;

        let transport = JsonRpcTransport::with_config(card.url.clone(), config);
        Ok(crate::client::A2AClient::with_transport(Box::new(transport)))
    }

    /// Build a client from a direct endpoint URL (skip agent card resolution).
    pub fn build_from_endpoint(self) -> crate::client::A2AClient {
        use crate::client::{JsonRpcTransport, TransportConfig};

        let mut config = TransportConfig::default();
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        config.headers = self.headers;

        let transport = JsonRpcTransport::with_config(self.url, config);
        crate::client::A2AClient::with_transport(Box::new(transport))
    }
}

/// Builder for hosting a single local agent behind an axum router.
///
/// # Example
///
/// ```rust,ignore
/// use gridctl::builders::{AgentCardBuilder, ServerBuilder};
/// use gridctl::server::InMemoryTaskStore;
/// use std::sync::Arc;
///
/// let card = AgentCardBuilder::new("billing", "http://localhost:8080/a2a/billing").build();
/// let app = ServerBuilder::new("billing", card)
///     .with_task_store(Arc::new(InMemoryTaskStore::new()))
///     .with_cors(true)
///     .build();
/// ```
#[cfg(feature = "server")]
pub struct ServerBuilder {
    name: String,
    agent_card: AgentCard,
    task_store: Option<std::sync::Arc<dyn crate::server::TaskStore>>,
    handler: Option<std::sync::Arc<dyn crate::server::RequestHandler>>,
    cors_enabled: bool,
}

#[cfg(feature = "server")]
impl ServerBuilder {
    /// Create a new server builder hosting one agent under path segment `name`.
    pub fn new(name: impl Into<String>, agent_card: AgentCard) -> Self {
        Self {
            name: name.into(),
            agent_card,
            task_store: None,
            handler: None,
            cors_enabled: false,
        }
    }

    pub fn with_task_store(
        mut self,
        store: std::sync::Arc<dyn crate::server::TaskStore>,
    ) -> Self {
        self.task_store = Some(store);
        self
    }

    /// Register the agent's business logic. Omit to get the default
    /// "Message received" acknowledgment behavior.
    pub fn with_handler(mut self, handler: std::sync::Arc<dyn crate::server::RequestHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn with_cors(mut self, enabled: bool) -> Self {
        self.cors_enabled = enabled;
        self
    }

    /// Build the axum router hosting this single agent.
    pub fn build(self) -> axum::Router {
        use crate::server::{a2a_router, AgentEntry, DefaultRequestHandler, InMemoryTaskStore};
        use std::collections::HashMap;
        use std::sync::Arc;

        let store = self
            .task_store
            .unwrap_or_else(|| Arc::new(InMemoryTaskStore::new()));
        let handler = Arc::new(match self.handler {
            Some(h) => DefaultRequestHandler::with_handler(store, h),
            None => DefaultRequestHandler::new(store),
        });

        let mut agents = HashMap::new();
        agents.insert(
            self.name,
            AgentEntry {
                card: self.agent_card,
                handler,
            },
        );
        let mut router = a2a_router(agents);

        if self.cors_enabled {
            use tower_http::cors::CorsLayer;
            router = router.layer(CorsLayer::permissive());
        }

        router
    }
}
