//! The output graph and its namespace table.

use std::collections::BTreeMap;

use oxrdf::{Graph, TripleRef};
use oxttl::TurtleSerializer;

use crate::error::{R2rmlError, R2rmlResult};

/// An RDF graph produced by a mapping run, together with the namespace
/// prefixes seeded from the mapping document.
///
/// Triples are deduplicated: inserting an already-present triple is a no-op,
/// which is what makes repeated runs over the same data idempotent.
#[derive(Clone, Debug, Default)]
pub struct MappedGraph {
    graph: Graph,
    prefixes: BTreeMap<String, String>,
}

impl MappedGraph {
    pub fn new() -> Self {
        MappedGraph::default()
    }

    /// Start from an existing prefix table.
    pub fn with_prefixes(prefixes: BTreeMap<String, String>) -> Self {
        MappedGraph {
            graph: Graph::new(),
            prefixes,
        }
    }

    /// Register a namespace prefix, replacing any previous expansion.
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Expansion of a registered prefix.
    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    pub fn prefixes(&self) -> &BTreeMap<String, String> {
        &self.prefixes
    }

    /// Insert a triple; returns whether the graph did not already contain
    /// it.
    pub fn insert<'a>(&mut self, triple: impl Into<TripleRef<'a>>) -> bool {
        self.graph.insert(triple)
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = TripleRef<'_>> {
        self.graph.iter()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }

    /// Render the graph as Turtle with the registered prefixes.
    pub fn to_turtle(&self) -> R2rmlResult<String> {
        let mut serializer = TurtleSerializer::new();
        for (prefix, namespace) in &self.prefixes {
            serializer = serializer
                .with_prefix(prefix, namespace)
                .map_err(|source| R2rmlError::InvalidIri {
                    value: namespace.clone(),
                    source,
                })?;
        }
        let mut writer = serializer.for_writer(Vec::new());
        for triple in self.graph.iter() {
            writer.serialize_triple(triple)?;
        }
        let bytes = writer.finish()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{Literal, NamedNode, Triple};

    fn triple() -> Triple {
        Triple::new(
            NamedNode::new("http://data.example.com/employee/7369").unwrap(),
            NamedNode::new("http://example.com/ns#name").unwrap(),
            Literal::new_simple_literal("SMITH"),
        )
    }

    #[test]
    fn test_duplicate_insertion_is_a_noop() {
        let mut graph = MappedGraph::new();
        assert!(graph.insert(&triple()));
        assert!(!graph.insert(&triple()));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_prefixes_round_trip() {
        let mut graph = MappedGraph::new();
        graph.add_prefix("ex", "http://example.com/ns#");
        assert_eq!(graph.namespace("ex"), Some("http://example.com/ns#"));
        assert_eq!(graph.namespace("rr"), None);
    }

    #[test]
    fn test_to_turtle_uses_registered_prefixes() {
        let mut graph = MappedGraph::new();
        graph.add_prefix("ex", "http://example.com/ns#");
        graph.insert(&triple());
        let turtle = graph.to_turtle().unwrap();
        assert!(turtle.contains("@prefix ex: <http://example.com/ns#>"));
        assert!(turtle.contains("ex:name"));
        assert!(turtle.contains("\"SMITH\""));
    }
}
