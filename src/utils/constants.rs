//! Constants for well-known paths used by the gateway's HTTP surface.

/// Aggregate agent-card discovery path, serving every local agent's card.
pub const AGENT_CARD_WELL_KNOWN_PATH: &str = "/.well-known/agent.json";

/// Base path under which each local agent's JSON-RPC endpoint is mounted.
pub const AGENT_RPC_BASE_PATH: &str = "/a2a";
