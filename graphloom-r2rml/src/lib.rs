//! R2RML mapping engine for row-oriented data.
//!
//! Compiles [R2RML](https://www.w3.org/TR/r2rml/) mapping documents into an
//! immutable rule set and materializes rows from any tabular source into an
//! RDF graph. The engine never talks to a database itself: rows arrive
//! through the [`RowSource`] trait, and referencing relations hand the
//! source a synthesized joint query instead of joining in memory.
//!
//! # Key Features
//!
//! - **Two-phase pipeline**: mapping documents are fully validated at
//!   compile time, so materialization only deals with data-shaped surprises
//! - **Tolerant generation**: a row missing a referenced column suppresses
//!   the affected triples and the run continues
//! - **Referencing relations**: cross-rule joins are expressed as SQL joint
//!   queries executed by the row source
//! - **Deterministic output**: rules run in identifier order and the output
//!   graph deduplicates triples, so repeated runs are idempotent
//!
//! # Supported R2RML Features
//!
//! - Logical tables: `rr:tableName`, `rr:sqlQuery`, `rr:sqlVersion`
//! - Term maps: `rr:constant`, `rr:template`, `rr:column`, and the
//!   `rr:subject` / `rr:predicate` / `rr:object` constant shorthands
//! - Term types: `rr:IRI`, `rr:BlankNode`, `rr:Literal`
//! - Subject maps with `rr:class`, object maps with `rr:datatype` and
//!   `rr:language`
//! - Referencing object maps with `rr:parentTriplesMap` and
//!   `rr:joinCondition`
//!
//! # Usage
//!
//! ```
//! use graphloom_r2rml::{map_to_graph, MemorySource, R2rmlLoader};
//! use std::collections::BTreeMap;
//!
//! let mapping = R2rmlLoader::from_turtle(r#"
//!     @prefix rr: <http://www.w3.org/ns/r2rml#> .
//!     @prefix ex: <http://example.com/ns#> .
//!
//!     <http://example.com/mapping#EmpMapping>
//!         rr:logicalTable [ rr:tableName "EMP" ] ;
//!         rr:subjectMap [
//!             rr:template "http://data.example.com/employee/{EMPNO}" ;
//!             rr:class ex:Employee ;
//!         ] ;
//!         rr:predicateObjectMap [
//!             rr:predicate ex:name ;
//!             rr:objectMap [ rr:column "ENAME" ] ;
//!         ] .
//! "#)?
//! .compile()?;
//!
//! let row: BTreeMap<String, String> = [
//!     ("EMPNO".to_string(), "7369".to_string()),
//!     ("ENAME".to_string(), "SMITH".to_string()),
//! ]
//! .into();
//! let mut source = MemorySource::new().with_table("EMP", vec![row]);
//!
//! let graph = map_to_graph(Some(&mut source), Some(&mapping))?;
//! assert_eq!(graph.len(), 2);
//! # Ok::<(), graphloom_r2rml::R2rmlError>(())
//! ```

pub mod error;
pub mod graph;
pub mod loader;
pub mod mapping;
pub mod materialize;
pub mod source;
pub mod vocab;

pub use error::{R2rmlError, R2rmlResult};
pub use graph::MappedGraph;
pub use loader::R2rmlLoader;
pub use mapping::{
    CompiledMapping, ConstantValue, JoinCondition, LogicalTable, ObjectMap, PredicateMap,
    PredicateObjectMap, RefObjectMap, RefPredicateObjectMap, SubjectMap, TableSource, Template,
    TermMap, TermType, TriplesMap,
};
pub use materialize::{generate_term, generate_term_joined, joint_table, map_to_graph};
pub use source::{MemorySource, Row, RowSource};
pub use vocab::R2RML;
