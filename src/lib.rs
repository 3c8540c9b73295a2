//! # gridctl — stack orchestrator and A2A protocol gateway
//!
//! `gridctl` runs heterogeneous workload stacks — tool servers, plain
//! resources, and agents — from a single declarative descriptor, and
//! exposes every agent in a stack as an
//! [A2A](https://a2a-protocol.org/latest/specification/) JSON-RPC peer so
//! agents can call each other (or be called from outside the stack) over a
//! uniform protocol.
//!
//! ## What's in here
//!
//! - [`stack`] — the stack descriptor's data model, validation, and the
//!   agent dependency graph used to order `Up`.
//! - [`runtime`] — the pluggable workload runtime trait (`start`/`stop`/
//!   `status`/...) plus an in-memory [`runtime::MockRuntime`] for tests.
//! - [`orchestrator`] — drives a stack's `Up`/`Down`/`Status` against a
//!   runtime.
//! - [`types`] — A2A wire types (tasks, messages, agent cards, JSON-RPC
//!   envelopes).
//! - [`server`] — hosts local agents: task storage, per-agent request
//!   dispatch, and the axum HTTP surface.
//! - [`client`] — calls remote A2A agents.
//! - [`gateway`] — composes local and remote agents into one federation,
//!   aggregating their skills under a single namespace.
//! - [`adapter`] — exposes an A2A agent's skills as callable tools.
//!
//! ## Feature flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `client` | yes     | HTTP client for calling remote A2A agents |
//! | `server` | yes     | axum-based HTTP surface for hosting local agents |
//! | `full`   | no      | Enable all features |
//!
//! ## Quick start: bring a stack up
//!
//! A stack descriptor arrives pre-parsed from YAML (parsing and
//! environment-variable expansion happen upstream of this crate; see
//! [`stack::Stack`]'s `Deserialize` impl for the wire shape it expects):
//!
//! ```no_run
//! use gridctl::orchestrator::{Orchestrator, UpOptions};
//! use gridctl::runtime::MockRuntime;
//! use gridctl::stack::Stack;
//! use std::sync::Arc;
//!
//! # async fn example(descriptor_json: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let stack: Stack = serde_json::from_str(descriptor_json)?;
//! let orchestrator = Orchestrator::new(Arc::new(MockRuntime::new()));
//! let statuses = orchestrator.up(&stack, UpOptions::default()).await?;
//! for status in statuses {
//!     println!("{}: {:?}", status.name, status.state);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Quick start: call a remote agent
//!
//! ```no_run
//! use gridctl::client::A2AClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = A2AClient::from_url("http://localhost:7420").await?;
//! let response = client.send_text("Hello, agent!").await?;
//! println!("Task {} — status: {}", response.task.id, response.task.status.state);
//! # Ok(())
//! # }
//! ```

pub mod builders;
pub mod error;
pub mod orchestrator;
pub mod stack;
pub mod types;
pub mod utils;

#[cfg(feature = "client")]
pub mod client;

#[cfg(feature = "server")]
pub mod server;

#[cfg(all(feature = "client", feature = "server"))]
pub mod gateway;

#[cfg(feature = "client")]
pub mod adapter;

pub mod runtime;

/// Prelude module that re-exports commonly used types and traits.
///
/// Import this module with `use gridctl::prelude::*;` to get access to the
/// most frequently used types without having to import them individually.
pub mod prelude {
    // Stack model
    pub use crate::stack::{Agent, Resource, Stack, ToolServer};

    // Runtime + orchestrator
    pub use crate::orchestrator::{Orchestrator, UpOptions};
    pub use crate::runtime::WorkloadRuntime;

    // Core A2A types
    pub use crate::types::{
        AgentCapabilities, AgentCard, AgentSkill, Message, Part, Role, Task, TaskState, TaskStatus,
    };

    // Error types
    pub use crate::error::{A2AError, A2AResult};

    // Builders
    pub use crate::builders::AgentCardBuilder;

    #[cfg(feature = "client")]
    pub use crate::builders::ClientBuilder;

    #[cfg(feature = "client")]
    pub use crate::client::A2AClient;

    #[cfg(feature = "server")]
    pub use crate::builders::ServerBuilder;

    #[cfg(feature = "server")]
    pub use crate::server::{a2a_router, DefaultRequestHandler, InMemoryTaskStore, TaskStore};

    #[cfg(all(feature = "client", feature = "server"))]
    pub use crate::gateway::Gateway;
}

// Re-export core types at crate root for convenience.
pub use builders::AgentCardBuilder;
pub use error::{A2AError, A2AResult};
pub use types::*;

#[cfg(feature = "client")]
pub use builders::ClientBuilder;

#[cfg(feature = "server")]
pub use builders::ServerBuilder;
