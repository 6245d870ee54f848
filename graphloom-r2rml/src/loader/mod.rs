//! Loading and compiling mapping documents.
//!
//! [`R2rmlLoader`] parses a Turtle mapping document into an RDF graph,
//! keeping the document's namespace prefixes, and [`R2rmlLoader::compile`]
//! turns that graph into a [`CompiledMapping`] by running the extractor over
//! it. Loading and compiling are separate steps so callers can inspect or
//! augment the raw graph in between.

mod extractor;
mod graph_query;

use std::collections::BTreeMap;
use std::path::Path;

use oxrdf::Graph;
use oxttl::TurtleParser;
use tracing::debug;

pub use extractor::MappingExtractor;

use crate::error::{R2rmlError, R2rmlResult};
use crate::mapping::CompiledMapping;
use crate::vocab::R2RML;

/// Parses mapping documents and compiles them into rule sets.
#[derive(Debug)]
pub struct R2rmlLoader {
    graph: Graph,
    prefixes: BTreeMap<String, String>,
}

impl R2rmlLoader {
    /// Load a Turtle mapping document from a file.
    pub fn from_path(path: impl AsRef<Path>) -> R2rmlResult<Self> {
        let data = std::fs::read(path)?;
        let (graph, prefixes) = parse(&data, None)?;
        Ok(R2rmlLoader { graph, prefixes })
    }

    /// Load from a file, resolving relative IRIs against `base`.
    pub fn from_path_with_base(path: impl AsRef<Path>, base: &str) -> R2rmlResult<Self> {
        let data = std::fs::read(path)?;
        let (graph, prefixes) = parse(&data, Some(base))?;
        Ok(R2rmlLoader { graph, prefixes })
    }

    /// Load a Turtle mapping document from a string.
    pub fn from_turtle(turtle: &str) -> R2rmlResult<Self> {
        let (graph, prefixes) = parse(turtle.as_bytes(), None)?;
        Ok(R2rmlLoader { graph, prefixes })
    }

    /// Load from a string, resolving relative IRIs against `base`.
    pub fn from_turtle_with_base(turtle: &str, base: &str) -> R2rmlResult<Self> {
        let (graph, prefixes) = parse(turtle.as_bytes(), Some(base))?;
        Ok(R2rmlLoader { graph, prefixes })
    }

    /// Wrap an already-built mapping graph. No prefixes are captured.
    pub fn from_graph(graph: Graph) -> Self {
        R2rmlLoader {
            graph,
            prefixes: BTreeMap::new(),
        }
    }

    /// The parsed mapping graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Namespace prefixes declared by the mapping document.
    pub fn prefixes(&self) -> &BTreeMap<String, String> {
        &self.prefixes
    }

    /// Extract and validate every rule in the graph.
    ///
    /// The document's prefixes are carried into the compiled mapping, with
    /// `rr` bound to the R2RML namespace unless the document rebinds it.
    pub fn compile(&self) -> R2rmlResult<CompiledMapping> {
        let maps = MappingExtractor::new(&self.graph).extract_all()?;
        let mut prefixes = self.prefixes.clone();
        prefixes
            .entry(R2RML::PREFIX.to_string())
            .or_insert_with(|| R2RML::NS.to_string());
        debug!(
            triples_maps = maps.len(),
            prefixes = prefixes.len(),
            "compiled mapping"
        );
        Ok(CompiledMapping::new(maps, prefixes))
    }
}

fn parse(data: &[u8], base: Option<&str>) -> R2rmlResult<(Graph, BTreeMap<String, String>)> {
    let mut parser = TurtleParser::new();
    if let Some(base) = base {
        parser = parser
            .with_base_iri(base)
            .map_err(|source| R2rmlError::InvalidIri {
                value: base.to_string(),
                source,
            })?;
    }
    let mut reader = parser.for_slice(data);
    let mut graph = Graph::new();
    for triple in &mut reader {
        let triple = triple.map_err(oxttl::TurtleParseError::from)?;
        graph.insert(&triple);
    }
    let prefixes = reader
        .prefixes()
        .map(|(prefix, iri)| (prefix.to_string(), iri.to_string()))
        .collect();
    Ok((graph, prefixes))
}
