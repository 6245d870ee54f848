//! Referencing object maps: relations whose object is another rule's
//! subject.
//!
//! ```turtle
//! rr:predicateObjectMap [
//!     rr:predicate ex:department ;
//!     rr:objectMap [
//!         rr:parentTriplesMap <#DeptMapping> ;
//!         rr:joinCondition [ rr:child "DEPTNO" ; rr:parent "DEPTNO" ] ;
//!     ] ;
//! ] .
//! ```

use serde::{Deserialize, Serialize};

/// One equality between a child column and a parent column.
///
/// Column names are taken as given; the loader rejects empty ones before a
/// condition is built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinCondition {
    /// Column of the referencing (child) logical table.
    pub child_column: String,
    /// Column of the referenced (parent) logical table.
    pub parent_column: String,
}

impl JoinCondition {
    pub fn new(child_column: impl Into<String>, parent_column: impl Into<String>) -> Self {
        JoinCondition {
            child_column: child_column.into(),
            parent_column: parent_column.into(),
        }
    }
}

/// An object produced by another triples map, optionally joined on column
/// equalities.
///
/// The parent is recorded by identifier; resolution against the compiled
/// rule set happens at materialization time. Join conditions keep their
/// declared order and are never deduplicated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefObjectMap {
    parent_triples_map: String,
    join_conditions: Vec<JoinCondition>,
}

impl RefObjectMap {
    /// Reference to a parent rule with no join conditions. Legal only when
    /// both rules read the same logical table.
    pub fn new(parent_triples_map: impl Into<String>) -> Self {
        RefObjectMap {
            parent_triples_map: parent_triples_map.into(),
            join_conditions: Vec::new(),
        }
    }

    /// Reference with a full set of join conditions.
    pub fn with_conditions(
        parent_triples_map: impl Into<String>,
        join_conditions: Vec<JoinCondition>,
    ) -> Self {
        RefObjectMap {
            parent_triples_map: parent_triples_map.into(),
            join_conditions,
        }
    }

    /// Append one join condition.
    pub fn with_condition(
        mut self,
        child_column: impl Into<String>,
        parent_column: impl Into<String>,
    ) -> Self {
        self.join_conditions
            .push(JoinCondition::new(child_column, parent_column));
        self
    }

    /// Identifier of the referenced triples map.
    pub fn parent_triples_map(&self) -> &str {
        &self.parent_triples_map
    }

    pub fn join_conditions(&self) -> &[JoinCondition] {
        &self.join_conditions
    }

    pub fn has_conditions(&self) -> bool {
        !self.join_conditions.is_empty()
    }
}
