//! Shape and cross-reference validation for a [`Stack`].
//!
//! `validate` collects every problem found rather than stopping at the
//! first, so a caller can report all of them at once.

use std::collections::HashSet;

use serde::Serialize;

use super::model::{AuthType, NetworkDriver, Source, Stack, ToolServer, ToolServerKind, TransportKind};

/// One validation failure, addressed by a dotted/bracketed field path
/// (e.g. `"agents[2].uses[0].server"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field_path: String,
    pub message: String,
}

impl FieldError {
    fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError {
            field_path: field_path.into(),
            message: message.into(),
        }
    }
}

/// Runs every shape and cross-reference check against `stack` and returns
/// the full set of problems found (empty when the stack is valid).
pub fn validate(stack: &Stack) -> Vec<FieldError> {
    let mut errors = Vec::new();

    check_name_and_version(stack, &mut errors);
    check_network_mode(stack, &mut errors);
    check_servers(stack, &mut errors);
    check_unique_names(stack, &mut errors);
    check_agents(stack, &mut errors);
    check_remote_agents(stack, &mut errors);
    check_network_references(stack, &mut errors);

    errors
}

// 1. name non-empty; version defaults to "1" (applied by serde default).
fn check_name_and_version(stack: &Stack, errors: &mut Vec<FieldError>) {
    if stack.name.trim().is_empty() {
        errors.push(FieldError::new("name", "name must not be empty"));
    }
}

// 2. exactly one network mode populated; network names unique within networks[].
fn check_network_mode(stack: &Stack, errors: &mut Vec<FieldError>) {
    let simple_set = stack.network.is_some();
    let advanced_set = !stack.networks.is_empty();
    if simple_set && advanced_set {
        errors.push(FieldError::new(
            "network",
            "exactly one of `network` or `networks` may be set, not both",
        ));
    }

    let mut seen = HashSet::new();
    for (i, net) in stack.networks.iter().enumerate() {
        if !seen.insert(net.name.clone()) {
            errors.push(FieldError::new(
                format!("networks[{}].name", i),
                format!("duplicate network name `{}`", net.name),
            ));
        }
    }
}

// 3. server shape exclusivity, port requirement, source shape.
fn check_servers(stack: &Stack, errors: &mut Vec<FieldError>) {
    for (i, server) in stack.mcp_servers.iter().enumerate() {
        let path = format!("mcp-servers[{}]", i);
        check_one_server(server, &path, errors);
    }
}

fn check_one_server(server: &ToolServer, path: &str, errors: &mut Vec<FieldError>) {
    let has_container = server.image.is_some() || server.source.is_some();
    let has_external = server.url.is_some();
    let has_ssh = server.ssh.is_some();
    let has_openapi = server.openapi.is_some();
    let has_local_process = server.command.is_some() && !has_ssh;
    let shapes_set = [has_container, has_external, has_ssh, has_openapi, has_local_process]
        .iter()
        .filter(|set| **set)
        .count();

    match server.kind() {
        None => errors.push(FieldError::new(
            path.to_string(),
            "server must set exactly one of {image, source, url, command, ssh+command, openapi}",
        )),
        Some(kind) => {
            if shapes_set > 1 {
                errors.push(FieldError::new(
                    path.to_string(),
                    "server fields describe more than one shape; exactly one is allowed",
                ));
            }
            if kind == ToolServerKind::Container
                && server.transport_or_default() != TransportKind::Stdio
            {
                match server.port {
                    Some(p) if p > 0 => {}
                    _ => errors.push(FieldError::new(
                        format!("{}.port", path),
                        "port must be set and in (0, 65535] when transport is not stdio",
                    )),
                }
            }
            if kind == ToolServerKind::Ssh && server.command.is_none() {
                errors.push(FieldError::new(
                    format!("{}.command", path),
                    "ssh-backed server requires `command`",
                ));
            }
        }
    }

    if let Some(source) = &server.source {
        check_source(source, &format!("{}.source", path), errors);
    }
}

fn check_source(source: &Source, path: &str, errors: &mut Vec<FieldError>) {
    match source {
        Source::Git { url, .. } => {
            if url.trim().is_empty() {
                errors.push(FieldError::new(
                    format!("{}.url", path),
                    "git source requires `url`",
                ));
            }
        }
        Source::Local { path: local_path, .. } => {
            if local_path.trim().is_empty() {
                errors.push(FieldError::new(
                    format!("{}.path", path),
                    "local source requires `path`",
                ));
            }
        }
    }
}

// 4. names unique across mcp_servers ∪ resources ∪ agents ∪ a2a_agents.
fn check_unique_names(stack: &Stack, errors: &mut Vec<FieldError>) {
    let mut seen: HashSet<String> = HashSet::new();

    for (i, s) in stack.mcp_servers.iter().enumerate() {
        check_name_collision(&s.name, &format!("mcp-servers[{}].name", i), &mut seen, errors);
    }
    for (i, r) in stack.resources.iter().enumerate() {
        check_name_collision(&r.name, &format!("resources[{}].name", i), &mut seen, errors);
    }
    for (i, a) in stack.agents.iter().enumerate() {
        check_name_collision(&a.name, &format!("agents[{}].name", i), &mut seen, errors);
    }
    for (i, a) in stack.a2a_agents.iter().enumerate() {
        check_name_collision(&a.name, &format!("a2a-agents[{}].name", i), &mut seen, errors);
    }
}

fn check_name_collision(
    name: &str,
    path: &str,
    seen: &mut HashSet<String>,
    errors: &mut Vec<FieldError>,
) {
    if !seen.insert(name.to_string()) {
        errors.push(FieldError::new(
            path.to_string(),
            format!("duplicate workload name `{}`", name),
        ));
    }
}

// 5. agent runtime/image exclusivity, uses[] resolution. 6. a2a skill uniqueness.
fn check_agents(stack: &Stack, errors: &mut Vec<FieldError>) {
    let resolvable: HashSet<String> = resolvable_selector_targets(stack);

    for (i, agent) in stack.agents.iter().enumerate() {
        let path = format!("agents[{}]", i);

        if agent.is_headless() {
            if agent.prompt.is_none() {
                errors.push(FieldError::new(
                    format!("{}.prompt", path),
                    "headless agents (runtime set) require `prompt`",
                ));
            }
            if agent.image.is_some() || agent.source.is_some() {
                errors.push(FieldError::new(
                    path.clone(),
                    "headless agents (runtime set) must not set `image` or `source`",
                ));
            }
        } else {
            let set_count = [agent.image.is_some(), agent.source.is_some()]
                .iter()
                .filter(|s| **s)
                .count();
            if set_count != 1 {
                errors.push(FieldError::new(
                    path.clone(),
                    "non-headless agents require exactly one of {image, source}",
                ));
            }
        }

        for (j, selector) in agent.uses.iter().enumerate() {
            if !resolvable.contains(&selector.server) {
                errors.push(FieldError::new(
                    format!("{}.uses[{}].server", path, j),
                    format!("`{}` does not resolve to a declared server, a2a-agent, or A2A-enabled agent", selector.server),
                ));
            }
        }

        if let Some(a2a) = &agent.a2a {
            let mut seen_ids = HashSet::new();
            for (j, skill) in a2a.skills.iter().enumerate() {
                if !seen_ids.insert(skill.id.clone()) {
                    errors.push(FieldError::new(
                        format!("{}.a2a.skills[{}].id", path, j),
                        format!("duplicate skill id `{}`", skill.id),
                    ));
                }
                if skill.name.trim().is_empty() {
                    errors.push(FieldError::new(
                        format!("{}.a2a.skills[{}].name", path, j),
                        "skill name must not be empty",
                    ));
                }
            }
        }
    }
}

fn resolvable_selector_targets(stack: &Stack) -> HashSet<String> {
    let mut targets: HashSet<String> = stack.mcp_servers.iter().map(|s| s.name.clone()).collect();
    targets.extend(stack.a2a_agents.iter().map(|a| a.name.clone()));
    targets.extend(
        stack
            .agents
            .iter()
            .filter(|a| a.is_a2a_enabled())
            .map(|a| a.name.clone()),
    );
    targets
}

// 7. remote agent url/auth shape.
fn check_remote_agents(stack: &Stack, errors: &mut Vec<FieldError>) {
    for (i, remote) in stack.a2a_agents.iter().enumerate() {
        let path = format!("a2a-agents[{}]", i);
        if remote.url.trim().is_empty() {
            errors.push(FieldError::new(format!("{}.url", path), "remote agent requires `url`"));
        }
        if let Some(auth) = &remote.auth {
            if auth.auth_type != AuthType::None && auth.token_env.is_none() {
                errors.push(FieldError::new(
                    format!("{}.auth.token_env", path),
                    "auth.token_env is required unless auth.type is `none`",
                ));
            }
        }
    }
}

// 8. advanced-mode network references.
fn check_network_references(stack: &Stack, errors: &mut Vec<FieldError>) {
    if !stack.is_advanced_mode() {
        return;
    }
    let declared: HashSet<String> = stack.networks.iter().map(|n| n.name.clone()).collect();

    for (i, s) in stack.mcp_servers.iter().enumerate() {
        check_network_field(s.network.as_deref(), &format!("mcp-servers[{}].network", i), &declared, errors);
    }
    for (i, r) in stack.resources.iter().enumerate() {
        check_network_field(r.network.as_deref(), &format!("resources[{}].network", i), &declared, errors);
    }
    for (i, a) in stack.agents.iter().enumerate() {
        check_network_field(a.network.as_deref(), &format!("agents[{}].network", i), &declared, errors);
    }
}

fn check_network_field(
    network: Option<&str>,
    path: &str,
    declared: &HashSet<String>,
    errors: &mut Vec<FieldError>,
) {
    match network {
        None => errors.push(FieldError::new(
            path.to_string(),
            "network is required in advanced mode",
        )),
        Some(name) if !declared.contains(name) => errors.push(FieldError::new(
            path.to_string(),
            format!("network `{}` is not declared in `networks[]`", name),
        )),
        Some(_) => {}
    }
}

/// Confirms the declared driver belongs to the closed `{bridge, host,
/// none}` set (the enum representation makes out-of-set values a parse
/// error before validation ever sees them; kept as its own named check so
/// it shows up alongside the rest of the validation checklist).
pub fn driver_is_valid(driver: NetworkDriver) -> bool {
    matches!(driver, NetworkDriver::Bridge | NetworkDriver::Host | NetworkDriver::None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::model::{A2AConfig, A2ASkill, Agent, RemoteAuth, Resource, ToolSelector};
    use std::collections::HashMap;

    fn base_stack() -> Stack {
        Stack {
            name: "demo".to_string(),
            version: "1".to_string(),
            network: None,
            networks: vec![],
            mcp_servers: vec![],
            resources: vec![],
            agents: vec![],
            a2a_agents: vec![],
        }
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut stack = base_stack();
        stack.name = "".to_string();
        let errors = validate(&stack);
        assert!(errors.iter().any(|e| e.field_path == "name"));
    }

    #[test]
    fn both_network_modes_rejected() {
        let mut stack = base_stack();
        stack.network = Some(super::super::model::Network {
            name: "n".to_string(),
            driver: NetworkDriver::Bridge,
        });
        stack.networks = vec![super::super::model::Network {
            name: "n2".to_string(),
            driver: NetworkDriver::Bridge,
        }];
        let errors = validate(&stack);
        assert!(errors.iter().any(|e| e.field_path == "network"));
    }

    #[test]
    fn container_server_requires_port_unless_stdio() {
        let mut stack = base_stack();
        stack.mcp_servers.push(ToolServer {
            name: "search".to_string(),
            image: Some("search:latest".to_string()),
            ..Default::default()
        });
        let errors = validate(&stack);
        assert!(errors.iter().any(|e| e.field_path.ends_with(".port")));
    }

    #[test]
    fn stdio_container_server_does_not_require_port() {
        let mut stack = base_stack();
        stack.mcp_servers.push(ToolServer {
            name: "search".to_string(),
            image: Some("search:latest".to_string()),
            transport: Some(TransportKind::Stdio),
            ..Default::default()
        });
        let errors = validate(&stack);
        assert!(!errors.iter().any(|e| e.field_path.ends_with(".port")));
    }

    #[test]
    fn duplicate_names_across_kinds_reported() {
        let mut stack = base_stack();
        stack.mcp_servers.push(ToolServer {
            name: "shared".to_string(),
            url: Some("https://x".to_string()),
            ..Default::default()
        });
        stack.resources.push(Resource {
            name: "shared".to_string(),
            image: "img".to_string(),
            env: HashMap::new(),
            ports: vec![],
            volumes: vec![],
            network: None,
        });
        let errors = validate(&stack);
        assert!(errors.iter().any(|e| e.field_path == "resources[0].name"));
    }

    #[test]
    fn headless_agent_requires_prompt() {
        let mut stack = base_stack();
        stack.agents.push(Agent {
            name: "a".to_string(),
            description: None,
            image: None,
            source: None,
            runtime: Some("python".to_string()),
            prompt: None,
            uses: vec![],
            env: HashMap::new(),
            build_args: HashMap::new(),
            network: None,
            command: None,
            a2a: None,
            equipped_skills: vec![],
        });
        let errors = validate(&stack);
        assert!(errors.iter().any(|e| e.field_path.ends_with(".prompt")));
    }

    #[test]
    fn agent_uses_must_resolve() {
        let mut stack = base_stack();
        stack.agents.push(Agent {
            name: "a".to_string(),
            description: None,
            image: Some("a:latest".to_string()),
            source: None,
            runtime: None,
            prompt: None,
            uses: vec![ToolSelector {
                server: "missing".to_string(),
                tools: vec![],
            }],
            env: HashMap::new(),
            build_args: HashMap::new(),
            network: None,
            command: None,
            a2a: None,
            equipped_skills: vec![],
        });
        let errors = validate(&stack);
        assert!(errors.iter().any(|e| e.field_path.contains("uses[0]")));
    }

    #[test]
    fn agent_uses_resolves_to_a2a_enabled_agent() {
        let mut stack = base_stack();
        stack.agents.push(Agent {
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
                enabled: Some(true),
                version: None,
                skills: vec![],
            }),
            equipped_skills: vec![],
        });
        stack.agents.push(Agent {
            name: "router".to_string(),
            description: None,
            image: Some("router:latest".to_string()),
            source: None,
            runtime: None,
            prompt: None,
            uses: vec![ToolSelector {
                server: "billing".to_string(),
                tools: vec![],
            }],
            env: HashMap::new(),
            build_args: HashMap::new(),
            network: None,
            command: None,
            a2a: None,
            equipped_skills: vec![],
        });
        let errors = validate(&stack);
        assert!(!errors.iter().any(|e| e.field_path.contains("uses[0]")));
    }

    #[test]
    fn duplicate_skill_ids_rejected() {
        let mut stack = base_stack();
        stack.agents.push(Agent {
            name: "a".to_string(),
            description: None,
            image: Some("a:latest".to_string()),
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
                skills: vec![
                    A2ASkill {
                        id: "x".to_string(),
                        name: "X".to_string(),
                        description: None,
                        tags: vec![],
                        examples: vec![],
                    },
                    A2ASkill {
                        id: "x".to_string(),
                        name: "X2".to_string(),
                        description: None,
                        tags: vec![],
                        examples: vec![],
                    },
                ],
            }),
            equipped_skills: vec![],
        });
        let errors = validate(&stack);
        assert!(errors.iter().any(|e| e.field_path.contains("skills[1].id")));
    }

    #[test]
    fn remote_agent_requires_token_env_unless_none() {
        let mut stack = base_stack();
        stack.a2a_agents.push(crate::stack::model::RemoteA2AAgent {
            name: "peer".to_string(),
            url: "https://peer.example.com".to_string(),
            auth: Some(RemoteAuth {
                auth_type: AuthType::Bearer,
                token_env: None,
                header_name: None,
            }),
        });
        let errors = validate(&stack);
        assert!(errors.iter().any(|e| e.field_path.ends_with(".token_env")));
    }

    #[test]
    fn advanced_mode_requires_network_field() {
        let mut stack = base_stack();
        stack.networks.push(super::super::model::Network {
            name: "net-a".to_string(),
            driver: NetworkDriver::Bridge,
        });
        stack.resources.push(Resource {
            name: "db".to_string(),
            image: "postgres".to_string(),
            env: HashMap::new(),
            ports: vec![],
            volumes: vec![],
            network: None,
        });
        let errors = validate(&stack);
        assert!(errors.iter().any(|e| e.field_path == "resources[0].network"));
    }

    #[test]
    fn simple_mode_ignores_network_field() {
        let mut stack = base_stack();
        stack.resources.push(Resource {
            name: "db".to_string(),
            image: "postgres".to_string(),
            env: HashMap::new(),
            ports: vec![],
            volumes: vec![],
            network: None,
        });
        let errors = validate(&stack);
        assert!(!errors.iter().any(|e| e.field_path.contains("network")));
    }
}
