//! R2RML vocabulary constants.
//!
//! Term constants are [`NamedNodeRef`]s so they can be handed straight to
//! graph lookups without allocation.

use oxrdf::NamedNodeRef;

/// The R2RML vocabulary (`http://www.w3.org/ns/r2rml#`).
pub struct R2RML;

impl R2RML {
    /// Namespace IRI of the vocabulary.
    pub const NS: &'static str = "http://www.w3.org/ns/r2rml#";
    /// Conventional prefix for the vocabulary.
    pub const PREFIX: &'static str = "rr";

    // ------------------------------------------------------------------
    // Classes
    // ------------------------------------------------------------------

    pub const TRIPLES_MAP: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/r2rml#TriplesMap");

    // ------------------------------------------------------------------
    // Logical tables
    // ------------------------------------------------------------------

    pub const LOGICAL_TABLE: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/r2rml#logicalTable");
    pub const TABLE_NAME: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/r2rml#tableName");
    pub const SQL_QUERY: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/r2rml#sqlQuery");
    pub const SQL_VERSION: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/r2rml#sqlVersion");

    // ------------------------------------------------------------------
    // Subject maps
    // ------------------------------------------------------------------

    pub const SUBJECT_MAP: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/r2rml#subjectMap");
    pub const SUBJECT: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/r2rml#subject");
    pub const CLASS: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/r2rml#class");

    // ------------------------------------------------------------------
    // Predicate-object maps
    // ------------------------------------------------------------------

    pub const PREDICATE_OBJECT_MAP: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/r2rml#predicateObjectMap");
    pub const PREDICATE_MAP: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/r2rml#predicateMap");
    pub const PREDICATE: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/r2rml#predicate");
    pub const OBJECT_MAP: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/r2rml#objectMap");
    pub const OBJECT: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/r2rml#object");

    // ------------------------------------------------------------------
    // Term maps
    // ------------------------------------------------------------------

    pub const TEMPLATE: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/r2rml#template");
    pub const COLUMN: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/r2rml#column");
    pub const CONSTANT: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/r2rml#constant");
    pub const TERM_TYPE: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/r2rml#termType");
    pub const DATATYPE: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/r2rml#datatype");
    pub const LANGUAGE: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/r2rml#language");

    // ------------------------------------------------------------------
    // Referencing object maps
    // ------------------------------------------------------------------

    pub const PARENT_TRIPLES_MAP: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/r2rml#parentTriplesMap");
    pub const JOIN_CONDITION: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/r2rml#joinCondition");
    pub const CHILD: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/r2rml#child");
    pub const PARENT: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/r2rml#parent");

    // ------------------------------------------------------------------
    // Term types
    // ------------------------------------------------------------------

    pub const IRI: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/r2rml#IRI");
    pub const BLANK_NODE: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/r2rml#BlankNode");
    pub const LITERAL: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/r2rml#Literal");
}
