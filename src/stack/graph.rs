//! Directed dependency graph with topological sort.
//!
//! Used to order agent startup by inter-agent A2A dependency edges.
//! Kahn's algorithm, O(V+E); ties among zero-in-degree nodes break by
//! insertion order — this is an observable guarantee callers rely on.

use std::collections::{HashMap, VecDeque};

/// Errors raised while resolving a [`DependencyGraph`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum GraphError {
    /// `sort` could not fully order the graph — the named nodes form a
    /// cycle (or depend on a cycle).
    #[error("circular dependency among: {}", participants.join(", "))]
    CircularDependency { participants: Vec<String> },
}

/// A directed graph over opaque node names. An edge `from -> to` means
/// "`from` depends on `to`"; `sort` yields dependencies before dependents.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<String>,
    edges: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        DependencyGraph::default()
    }

    /// Registers a node. Idempotent — adding the same name twice is a no-op.
    pub fn add_node(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.edges.contains_key(&name) {
            self.nodes.push(name.clone());
            self.edges.insert(name, Vec::new());
        }
    }

    /// Registers a `from` depends-on `to` edge. Both ends must already be
    /// known nodes (callers add nodes before edges referencing them).
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) {
        let from = from.into();
        let to = to.into();
        self.add_node(from.clone());
        self.add_node(to.clone());
        self.edges.get_mut(&from).unwrap().push(to);
    }

    /// Topologically sorts the graph, dependencies first. Fails with
    /// [`GraphError::CircularDependency`] naming exactly the residual set
    /// when a cycle prevents a full ordering.
    pub fn sort(&self) -> Result<Vec<String>, GraphError> {
        // in_degree[n] = n's own unresolved dependency count (|edges[n]|).
        let mut in_degree: HashMap<&str, usize> = self
            .nodes
            .iter()
            .map(|n| (n.as_str(), self.edges.get(n).map(Vec::len).unwrap_or(0)))
            .collect();

        // dependents[to] = nodes that depend on `to` (used to decrement
        // their in-degree once `to` is emitted).
        let mut dependents: HashMap<&str, Vec<&str>> =
            self.nodes.iter().map(|n| (n.as_str(), Vec::new())).collect();
        for from in &self.nodes {
            for to in self.edges.get(from).unwrap() {
                dependents.entry(to.as_str()).or_default().push(from.as_str());
            }
        }

        let mut queue: VecDeque<&str> = VecDeque::new();
        for n in &self.nodes {
            if in_degree[n.as_str()] == 0 {
                queue.push_back(n.as_str());
            }
        }

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(n) = queue.pop_front() {
            order.push(n.to_string());
            for dependent in &dependents[n] {
                let entry = in_degree.get_mut(dependent).unwrap();
                *entry -= 1;
                if *entry == 0 {
                    queue.push_back(dependent);
                }
            }
        }

        if order.len() != self.nodes.len() {
            let resolved: std::collections::HashSet<&str> = order.iter().map(String::as_str).collect();
            let participants = self
                .nodes
                .iter()
                .filter(|n| !resolved.contains(n.as_str()))
                .cloned()
                .collect();
            return Err(GraphError::CircularDependency { participants });
        }

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_dependencies_first() {
        let mut g = DependencyGraph::new();
        g.add_node("router");
        g.add_node("billing");
        g.add_edge("router", "billing");
        let order = g.sort().unwrap();
        assert_eq!(order, vec!["billing".to_string(), "router".to_string()]);
    }

    #[test]
    fn independent_nodes_keep_insertion_order() {
        let mut g = DependencyGraph::new();
        g.add_node("b");
        g.add_node("a");
        g.add_node("c");
        let order = g.sort().unwrap();
        assert_eq!(order, vec!["b".to_string(), "a".to_string(), "c".to_string()]);
    }

    #[test]
    fn detects_circular_dependency() {
        let mut g = DependencyGraph::new();
        g.add_edge("a", "b");
        g.add_edge("b", "a");
        let err = g.sort().unwrap_err();
        match err {
            GraphError::CircularDependency { participants } => {
                let mut p = participants;
                p.sort();
                assert_eq!(p, vec!["a".to_string(), "b".to_string()]);
            }
        }
    }

    #[test]
    fn diamond_dependency_resolves() {
        let mut g = DependencyGraph::new();
        g.add_edge("top", "left");
        g.add_edge("top", "right");
        g.add_edge("left", "bottom");
        g.add_edge("right", "bottom");
        let order = g.sort().unwrap();
        assert_eq!(order.last().unwrap(), "top");
        assert_eq!(order.first().unwrap(), "bottom");
    }

    #[test]
    fn partial_cycle_names_only_residual_set() {
        let mut g = DependencyGraph::new();
        g.add_node("isolated");
        g.add_edge("a", "b");
        g.add_edge("b", "a");
        let err = g.sort().unwrap_err();
        match err {
            GraphError::CircularDependency { participants } => {
                assert!(!participants.contains(&"isolated".to_string()));
                assert_eq!(participants.len(), 2);
            }
        }
    }
}
