//! Typed representation of a declared stack.
//!
//! Mirrors the wire shape of the externally-parsed YAML descriptor
//! (parsing itself — file I/O, env-var expansion — is out of scope for
//! this crate; callers hand us an already-deserialized [`Stack`]).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

fn default_version() -> String {
    "1".to_string()
}

fn default_git_ref() -> String {
    "main".to_string()
}

fn default_dockerfile() -> String {
    "Dockerfile".to_string()
}

fn default_driver() -> NetworkDriver {
    NetworkDriver::Bridge
}

/// The root stack descriptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Stack {
    pub name: String,

    #[serde(default = "default_version")]
    pub version: String,

    /// Simple mode: a single network shared by every workload.
    #[serde(default)]
    pub network: Option<Network>,

    /// Advanced mode: each workload names the network it belongs to.
    #[serde(default)]
    pub networks: Vec<Network>,

    #[serde(default, rename = "mcp-servers")]
    pub mcp_servers: Vec<ToolServer>,

    #[serde(default)]
    pub resources: Vec<Resource>,

    #[serde(default)]
    pub agents: Vec<Agent>,

    #[serde(default, rename = "a2a-agents")]
    pub a2a_agents: Vec<RemoteA2AAgent>,
}

impl Stack {
    /// True when the stack declares per-workload networks (`networks[]`
    /// populated) rather than the single implicit simple-mode network.
    pub fn is_advanced_mode(&self) -> bool {
        !self.networks.is_empty()
    }

    /// The simple-mode network name, defaulting to `"{stack}-net"`.
    pub fn simple_network_name(&self) -> String {
        self.network
            .as_ref()
            .map(|n| n.name.clone())
            .unwrap_or_else(|| format!("{}-net", self.name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkDriver {
    #[default]
    Bridge,
    Host,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub name: String,
    #[serde(default = "default_driver")]
    pub driver: NetworkDriver,
}

/// Source build configuration for a container-backed workload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Source {
    Git {
        url: String,
        #[serde(rename = "ref", default = "default_git_ref")]
        git_ref: String,
        #[serde(default = "default_dockerfile")]
        dockerfile: String,
    },
    Local {
        path: String,
        #[serde(default = "default_dockerfile")]
        dockerfile: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Http,
    Stdio,
    Sse,
}

/// SSH connection details for an SSH-backed tool server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SshConfig {
    pub host: String,
    pub user: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub identity_file: Option<String>,
}

/// OpenAPI-adapter configuration for an OpenAPI-backed tool server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenApiConfig {
    pub spec: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub auth: Option<String>,
    #[serde(default)]
    pub operations: Vec<String>,
}

/// The five mutually-exclusive shapes a [`ToolServer`] may take, inferred
/// from which fields are populated. See `validate` (C1 check 3) for the
/// exclusivity enforcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolServerKind {
    Container,
    External,
    LocalProcess,
    Ssh,
    OpenApi,
}

/// A declared MCP/tool server. Fields for all five shapes coexist on one
/// struct — the active shape is inferred by [`ToolServer::kind`], matching
/// the flat YAML shape the descriptor actually uses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolServer {
    pub name: String,

    // Container-backed
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub source: Option<Source>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub command: Option<Vec<String>>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default)]
    pub build_args: HashMap<String, String>,
    #[serde(default)]
    pub transport: Option<TransportKind>,
    #[serde(default)]
    pub tools: Vec<String>,

    // External
    #[serde(default)]
    pub url: Option<String>,

    // SSH
    #[serde(default)]
    pub ssh: Option<SshConfig>,

    // OpenAPI adapter
    #[serde(default)]
    pub openapi: Option<OpenApiConfig>,

    #[serde(default)]
    pub network: Option<String>,
}

impl ToolServer {
    pub fn transport_or_default(&self) -> TransportKind {
        self.transport.unwrap_or(TransportKind::Http)
    }

    /// Best-effort classification used by both validation and the
    /// orchestrator. Returns `None` when no recognizable shape is set at
    /// all (caught separately by `validate`'s exclusivity check).
    pub fn kind(&self) -> Option<ToolServerKind> {
        if self.openapi.is_some() {
            Some(ToolServerKind::OpenApi)
        } else if self.ssh.is_some() {
            Some(ToolServerKind::Ssh)
        } else if self.url.is_some() {
            Some(ToolServerKind::External)
        } else if self.image.is_some() || self.source.is_some() {
            Some(ToolServerKind::Container)
        } else if self.command.is_some() {
            Some(ToolServerKind::LocalProcess)
        } else {
            None
        }
    }
}

/// A supporting data service started alongside tool servers and agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default)]
    pub ports: Vec<String>,
    #[serde(default)]
    pub volumes: Vec<String>,
    #[serde(default)]
    pub network: Option<String>,
}

/// A tool reference on an agent: either a bare server name or the
/// explicit `{server, tools?}` object.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSelector {
    pub server: String,
    #[serde(default)]
    pub tools: Vec<String>,
}

impl<'de> Deserialize<'de> for ToolSelector {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        if let Some(server) = value.as_str() {
            return Ok(ToolSelector {
                server: server.to_string(),
                tools: Vec::new(),
            });
        }
        #[derive(Deserialize)]
        struct Explicit {
            server: String,
            #[serde(default)]
            tools: Vec<String>,
        }
        let explicit: Explicit = serde_json::from_value(value).map_err(serde::de::Error::custom)?;
        Ok(ToolSelector {
            server: explicit.server,
            tools: explicit.tools,
        })
    }
}

/// A declared agent workload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub source: Option<Source>,
    #[serde(default)]
    pub runtime: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub uses: Vec<ToolSelector>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default)]
    pub build_args: HashMap<String, String>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub command: Option<Vec<String>>,
    #[serde(default)]
    pub a2a: Option<A2AConfig>,

    /// Deprecated alias for `uses`, merged into it on load. De-duplicated
    /// by `server` name against any pre-existing `uses` entries; cleared
    /// once merged.
    #[serde(default, rename = "equipped_skills")]
    pub equipped_skills: Vec<ToolSelector>,
}

impl Agent {
    /// True when this agent runs without its own container (driven by an
    /// in-process `runtime` identifier rather than `image`/`source`).
    pub fn is_headless(&self) -> bool {
        self.runtime.is_some()
    }

    /// True when this agent is exposed over A2A (card + JSON-RPC endpoint).
    pub fn is_a2a_enabled(&self) -> bool {
        match &self.a2a {
            Some(cfg) => cfg.enabled.unwrap_or(false) || !cfg.skills.is_empty(),
            None => false,
        }
    }

    /// Merges `equipped_skills` into `uses`, de-duplicating by server
    /// name, then clears `equipped_skills`. Idempotent.
    pub fn merge_equipped_skills(&mut self) {
        if self.equipped_skills.is_empty() {
            return;
        }
        let existing: std::collections::HashSet<String> =
            self.uses.iter().map(|s| s.server.clone()).collect();
        for selector in self.equipped_skills.drain(..) {
            if !existing.contains(&selector.server) {
                self.uses.push(selector);
            }
        }
    }
}

/// A2A exposure configuration on an [`Agent`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct A2AConfig {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub skills: Vec<A2ASkill>,
}

/// A declared skill, prior to translation into the protocol-facing
/// `AgentSkill` (see [`crate::types::AgentSkill`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct A2ASkill {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    Bearer,
    ApiKey,
    None,
}

/// Outbound auth configuration for a [`RemoteA2AAgent`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteAuth {
    #[serde(rename = "type")]
    pub auth_type: AuthType,
    #[serde(default)]
    pub token_env: Option<String>,
    #[serde(default)]
    pub header_name: Option<String>,
}

impl RemoteAuth {
    pub fn header_name_or_default(&self) -> &str {
        self.header_name.as_deref().unwrap_or("Authorization")
    }
}

/// A peer agent discovered by URL rather than started locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteA2AAgent {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub auth: Option<RemoteAuth>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_selector_accepts_bare_string() {
        let selector: ToolSelector = serde_json::from_str(r#""search-server""#).unwrap();
        assert_eq!(selector.server, "search-server");
        assert!(selector.tools.is_empty());
    }

    #[test]
    fn tool_selector_accepts_object() {
        let selector: ToolSelector =
            serde_json::from_str(r#"{"server":"search-server","tools":["query"]}"#).unwrap();
        assert_eq!(selector.server, "search-server");
        assert_eq!(selector.tools, vec!["query".to_string()]);
    }

    #[test]
    fn stack_kebab_case_keys() {
        let stack: Stack = serde_json::from_str(
            r#"{"name":"demo","mcp-servers":[],"a2a-agents":[]}"#,
        )
        .unwrap();
        assert_eq!(stack.name, "demo");
        assert_eq!(stack.version, "1");
    }

    #[test]
    fn simple_network_name_defaults() {
        let stack = Stack {
            name: "demo".to_string(),
            ..Default::default()
        };
        assert_eq!(stack.simple_network_name(), "demo-net");
    }

    #[test]
    fn agent_is_a2a_enabled_via_skills() {
        let agent = Agent {
            name: "billing".to_string(),
            description: None,
            image: Some("billing:latest".to_string()),
            source: None,
            runtime: None,
            prompt: None,
            uses: vec![],
            env: HashMap::new(),
            build_args: HashMap::new(),
            network: None,
            command: None,
            a2a: Some(A2AConfig {
                enabled: None,
                version: None,
                skills: vec![A2ASkill {
                    id: "quote".to_string(),
                    name: "Quote".to_string(),
                    description: None,
                    tags: vec![],
                    examples: vec![],
                }],
            }),
            equipped_skills: vec![],
        };
        assert!(agent.is_a2a_enabled());
    }

    #[test]
    fn merge_equipped_skills_dedupes_by_server() {
        let mut agent = Agent {
            name: "a".to_string(),
            description: None,
            image: Some("a:latest".to_string()),
            source: None,
            runtime: None,
            prompt: None,
            uses: vec![ToolSelector {
                server: "s1".to_string(),
                tools: vec![],
            }],
            env: HashMap::new(),
            build_args: HashMap::new(),
            network: None,
            command: None,
            a2a: None,
            equipped_skills: vec![
                ToolSelector {
                    server: "s1".to_string(),
                    tools: vec![],
                },
                ToolSelector {
                    server: "s2".to_string(),
                    tools: vec![],
                },
            ],
        };
        agent.merge_equipped_skills();
        assert_eq!(agent.uses.len(), 2);
        assert!(agent.equipped_skills.is_empty());
    }

    #[test]
    fn tool_server_kind_classification() {
        let container = ToolServer {
            name: "c".to_string(),
            image: Some("img".to_string()),
            ..Default::default()
        };
        assert_eq!(container.kind(), Some(ToolServerKind::Container));

        let external = ToolServer {
            name: "e".to_string(),
            url: Some("https://example.com".to_string()),
            ..Default::default()
        };
        assert_eq!(external.kind(), Some(ToolServerKind::External));

        let unset = ToolServer {
            name: "u".to_string(),
            ..Default::default()
        };
        assert_eq!(unset.kind(), None);
    }
}
