//! A2A server framework — local agent hosting and JSON-RPC dispatch.
//!
//! - [`TaskStore`] trait + [`InMemoryTaskStore`] — task persistence
//! - [`RequestHandler`] trait + [`DefaultRequestHandler`] — per-agent dispatch
//! - [`AgentEntry`] + [`a2a_router`] — ready-made axum routes hosting many agents
//!
//! # Quick start
//!
//! ```rust,ignore
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use gridctl::server::{a2a_router, AgentEntry, DefaultRequestHandler, InMemoryTaskStore};
//!
//! let store = Arc::new(InMemoryTaskStore::new());
//! let handler = Arc::new(DefaultRequestHandler::new(store));
//!
//! let mut agents = HashMap::new();
//! agents.insert("billing".to_string(), AgentEntry { card: billing_card, handler });
//! let app = a2a_router(agents);
//! ```

pub mod axum_integration;
pub mod handler;
pub mod task_store;

pub use axum_integration::{a2a_router, AgentEntry};
pub use handler::{DefaultRequestHandler, RequestHandler};
pub use task_store::{InMemoryTaskStore, TaskListParams, TaskListResponse, TaskStore};
