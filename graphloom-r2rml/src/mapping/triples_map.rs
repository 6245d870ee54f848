//! Triples maps and their logical tables.

use serde::{Deserialize, Serialize};

use super::ref_object_map::RefObjectMap;
use super::term_map::{ObjectMap, PredicateMap, SubjectMap};

/// Strip surrounding double quotes, or fold an unquoted name to upper case
/// the way SQL resolves unquoted identifiers.
pub fn normalize_table_name(name: &str) -> String {
    let trimmed = name.trim();
    if let Some(inner) = trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        inner.to_string()
    } else {
        trimmed.to_ascii_uppercase()
    }
}

/// Row reference of a logical table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableSource {
    /// Named table or view.
    TableName(String),
    /// Raw query text, handed to the row source verbatim.
    Query(String),
}

/// A logical table: where a rule's rows come from.
///
/// Equality compares the normalized payload only. Table names are compared
/// after quote stripping and case folding, queries after trimming, and the
/// SQL version hint never participates. A table name and a query never
/// compare equal, even when the query merely selects that table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogicalTable {
    source: TableSource,
    sql_version: Option<String>,
}

impl LogicalTable {
    /// Logical table naming a base table or view.
    pub fn table_name(name: impl Into<String>) -> Self {
        LogicalTable {
            source: TableSource::TableName(name.into()),
            sql_version: None,
        }
    }

    /// Logical table wrapping a raw query.
    pub fn query(query: impl Into<String>) -> Self {
        LogicalTable {
            source: TableSource::Query(query.into()),
            sql_version: None,
        }
    }

    /// Attach a SQL conformance hint (`rr:sqlVersion`).
    pub fn with_sql_version(mut self, version: impl Into<String>) -> Self {
        self.sql_version = Some(version.into());
        self
    }

    pub fn source(&self) -> &TableSource {
        &self.source
    }

    pub fn sql_version(&self) -> Option<&str> {
        self.sql_version.as_deref()
    }

    pub fn as_table_name(&self) -> Option<&str> {
        match &self.source {
            TableSource::TableName(name) => Some(name),
            TableSource::Query(_) => None,
        }
    }

    pub fn as_query(&self) -> Option<&str> {
        match &self.source {
            TableSource::Query(query) => Some(query),
            TableSource::TableName(_) => None,
        }
    }

    fn normalized(&self) -> (bool, String) {
        match &self.source {
            TableSource::TableName(name) => (false, normalize_table_name(name)),
            TableSource::Query(query) => (true, query.trim().to_string()),
        }
    }
}

impl PartialEq for LogicalTable {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl Eq for LogicalTable {}

/// One direct relation rule: a predicate recipe and an object recipe.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredicateObjectMap {
    pub predicate: PredicateMap,
    pub object: ObjectMap,
}

impl PredicateObjectMap {
    pub fn new(predicate: PredicateMap, object: ObjectMap) -> Self {
        PredicateObjectMap { predicate, object }
    }
}

/// One referencing relation rule: a predicate recipe and a parent reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefPredicateObjectMap {
    pub predicate: PredicateMap,
    pub object: RefObjectMap,
}

impl RefPredicateObjectMap {
    pub fn new(predicate: PredicateMap, object: RefObjectMap) -> Self {
        RefPredicateObjectMap { predicate, object }
    }
}

/// One mapping rule: a logical table, a subject recipe, and relation rules.
///
/// The required parts are supplied at construction and the relation rules
/// are attached with the `with_*` builders. Once assembled, a triples map is
/// never mutated; materialization only reads it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriplesMap {
    iri: String,
    logical_table: LogicalTable,
    subject_map: SubjectMap,
    predicate_object_maps: Vec<PredicateObjectMap>,
    ref_predicate_object_maps: Vec<RefPredicateObjectMap>,
}

impl TriplesMap {
    pub fn new(
        iri: impl Into<String>,
        logical_table: LogicalTable,
        subject_map: SubjectMap,
    ) -> Self {
        TriplesMap {
            iri: iri.into(),
            logical_table,
            subject_map,
            predicate_object_maps: Vec::new(),
            ref_predicate_object_maps: Vec::new(),
        }
    }

    pub fn with_predicate_object_map(mut self, map: PredicateObjectMap) -> Self {
        self.predicate_object_maps.push(map);
        self
    }

    pub fn with_ref_predicate_object_map(mut self, map: RefPredicateObjectMap) -> Self {
        self.ref_predicate_object_maps.push(map);
        self
    }

    /// Identifier of this rule: the IRI or blank node label it was declared
    /// under.
    pub fn iri(&self) -> &str {
        &self.iri
    }

    pub fn logical_table(&self) -> &LogicalTable {
        &self.logical_table
    }

    pub fn subject_map(&self) -> &SubjectMap {
        &self.subject_map
    }

    pub fn predicate_object_maps(&self) -> &[PredicateObjectMap] {
        &self.predicate_object_maps
    }

    pub fn ref_predicate_object_maps(&self) -> &[RefPredicateObjectMap] {
        &self.ref_predicate_object_maps
    }
}
