//! Materialization: turning compiled rules and rows into RDF triples.
//!
//! Three layers build on each other. [`generate_term`] and its role-specific
//! siblings turn one term map and one row into one RDF term. [`joint_table`]
//! synthesizes the query a referencing relation scans. [`map_to_graph`] runs
//! a whole compiled mapping against a row source.

mod join;
mod mapper;
mod term;

pub use join::joint_table;
pub use mapper::map_to_graph;
pub use term::{
    generate_object, generate_predicate, generate_subject, generate_subject_joined, generate_term,
    generate_term_joined, iri_safe,
};
