//! The rule model: validated, immutable mapping data types.
//!
//! A mapping document compiles into a [`CompiledMapping`], a set of
//! [`TriplesMap`] rules. Each rule pairs a [`LogicalTable`] with a
//! [`SubjectMap`] and any number of relation rules; relation objects are
//! either direct term recipes or references to another rule's subject.

mod compiled;
mod ref_object_map;
mod term_map;
mod triples_map;

pub use compiled::CompiledMapping;
pub use ref_object_map::{JoinCondition, RefObjectMap};
pub use term_map::{
    ConstantValue, ObjectMap, PredicateMap, SubjectMap, Template, TermMap, TermType,
};
pub use triples_map::{
    normalize_table_name, LogicalTable, PredicateObjectMap, RefPredicateObjectMap, TableSource,
    TriplesMap,
};
