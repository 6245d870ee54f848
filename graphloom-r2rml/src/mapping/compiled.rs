//! The compiled mapping: a validated, immutable rule set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::triples_map::{normalize_table_name, TriplesMap};

/// Every rule extracted from a mapping document, keyed by identifier,
/// together with the document's namespace prefixes.
///
/// Compilation happens once in the loader; afterwards the set is read-only
/// and can be shared across materialization runs. Iteration order is
/// deterministic (sorted by identifier).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledMapping {
    triples_maps: BTreeMap<String, TriplesMap>,
    prefixes: BTreeMap<String, String>,
}

impl CompiledMapping {
    pub fn new(triples_maps: Vec<TriplesMap>, prefixes: BTreeMap<String, String>) -> Self {
        let triples_maps = triples_maps
            .into_iter()
            .map(|map| (map.iri().to_string(), map))
            .collect();
        CompiledMapping {
            triples_maps,
            prefixes,
        }
    }

    /// Look up a rule by identifier.
    pub fn get(&self, iri: &str) -> Option<&TriplesMap> {
        self.triples_maps.get(iri)
    }

    pub fn len(&self) -> usize {
        self.triples_maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples_maps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TriplesMap> {
        self.triples_maps.values()
    }

    /// Namespace prefixes captured from the mapping document.
    pub fn prefixes(&self) -> &BTreeMap<String, String> {
        &self.prefixes
    }

    /// Expansion of a registered prefix.
    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    /// All rules whose logical table is the named base table.
    pub fn find_maps_for_table(&self, table: &str) -> Vec<&TriplesMap> {
        let wanted = normalize_table_name(table);
        self.iter()
            .filter(|map| {
                map.logical_table()
                    .as_table_name()
                    .map(normalize_table_name)
                    .as_deref()
                    == Some(wanted.as_str())
            })
            .collect()
    }

    /// All rules asserting the given class on their subjects.
    pub fn find_maps_for_class(&self, class: &str) -> Vec<&TriplesMap> {
        self.iter()
            .filter(|map| map.subject_map().classes().iter().any(|c| c == class))
            .collect()
    }
}
