//! Stack model, validation, and dependency resolution (C1, C2).

pub mod graph;
pub mod model;
pub mod validate;

pub use graph::{DependencyGraph, GraphError};
pub use model::{
    A2AConfig, A2ASkill, Agent, AuthType, Network, NetworkDriver, OpenApiConfig, RemoteA2AAgent,
    RemoteAuth, Resource, Source, SshConfig, Stack, ToolSelector, ToolServer, ToolServerKind,
    TransportKind,
};
pub use validate::{validate, FieldError};
