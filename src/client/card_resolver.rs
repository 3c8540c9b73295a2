//! Agent card discovery and resolution.
//!
//! An agent card describes a remote agent's capabilities, skills, and the
//! endpoint URL for JSON-RPC communication.

use crate::error::{A2AError, A2AResult};
use crate::types::AgentCard;
use crate::utils::AGENT_CARD_WELL_KNOWN_PATH;

/// Resolves [`AgentCard`]s from agent base URLs.
///
/// If the given endpoint already ends with `agent.json`, it is fetched
/// verbatim; otherwise [`AGENT_CARD_WELL_KNOWN_PATH`] is appended to the
/// trimmed base URL.
///
/// # Example
///
/// ```no_run
/// use gridctl::client::CardResolver;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let resolver = CardResolver::new();
/// let card = resolver.resolve("http://localhost:7420").await?;
/// println!("Agent: {}", card.name);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CardResolver {
    client: reqwest::Client,
}

impl CardResolver {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Fetch and parse the agent card reachable from `base_url`.
    pub async fn resolve(&self, base_url: &str) -> A2AResult<AgentCard> {
        let url = Self::card_url(base_url);

        tracing::debug!("resolving agent card from {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    A2AError::Transport(format!("failed to connect to agent at {url}: {e}"))
                } else if e.is_timeout() {
                    A2AError::Timeout(format!("timed out fetching agent card from {url}: {e}"))
                } else {
                    A2AError::Transport(format!("failed to fetch agent card from {url}: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(A2AError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| A2AError::Transport(format!("failed to read agent card response: {e}")))?;

        let card: AgentCard = serde_json::from_slice(&bytes)
            .map_err(|e| A2AError::InvalidJson(format!("failed to parse agent card: {e}")))?;

        tracing::debug!(agent = %card.name, "resolved agent card");

        Ok(card)
    }

    /// The URL a card would be fetched from for the given endpoint.
    pub fn card_url(base_url: &str) -> String {
        if base_url.ends_with("agent.json") {
            base_url.to_string()
        } else {
            format!("{}{}", base_url.trim_end_matches('/'), AGENT_CARD_WELL_KNOWN_PATH)
        }
    }
}

impl Default for CardResolver {
    fn default() -> Self {
        Self::new()
    }
}
