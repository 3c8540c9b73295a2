//! A2A client — call remote A2A agents (and local gateway peers).
//!
//! - [`A2AClient`] — typed methods for every JSON-RPC method this gateway
//!   speaks (`message/send`, `tasks/get`, `tasks/list`, `tasks/cancel`)
//! - [`CardResolver`] — discover agent cards via the well-known URL convention
//! - [`Transport`] / [`JsonRpcTransport`] — pluggable transport layer
//!
//! # Quick Start
//!
//! ```no_run
//! use gridctl::client::A2AClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Connect to an agent (resolves agent card automatically):
//! let client = A2AClient::from_url("http://localhost:7420").await?;
//!
//! // Send a text message:
//! let response = client.send_text("Hello, agent!").await?;
//! println!("Task {} — status: {}", response.task.id, response.task.status.state);
//! # Ok(())
//! # }
//! ```

mod a2a_client;
mod card_resolver;
mod transport;

pub use a2a_client::{create_text_message, A2AClient};
pub use card_resolver::CardResolver;
pub use transport::{JsonRpcTransport, Transport, TransportConfig};
