//! Error types for mapping compilation and materialization.
//!
//! Errors fall into two families. Build failures (`MissingLogicalTable`
//! through `InvalidValue`) are raised while a mapping document is being
//! compiled and always identify the offending node. Run failures
//! (`MissingRowSource` through `TableNotFound`) are raised while rows are
//! being materialized, after compilation has already succeeded.

use thiserror::Error;

/// Errors produced by the mapping engine.
#[derive(Debug, Error)]
pub enum R2rmlError {
    /// Mapping document could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Mapping document is not well-formed Turtle.
    #[error("failed to parse mapping document: {0}")]
    Parse(#[from] oxttl::TurtleParseError),

    /// Triples map has no rr:logicalTable, or its logical table carries
    /// neither rr:tableName nor rr:sqlQuery.
    #[error("triples map {0} has no usable logical table")]
    MissingLogicalTable(String),

    /// Triples map has neither rr:subjectMap nor rr:subject.
    #[error("triples map {0} has no subject map")]
    MissingSubjectMap(String),

    /// Predicate-object map has neither rr:predicateMap nor rr:predicate.
    #[error("predicate-object map {0} has no predicate map")]
    MissingPredicateMap(String),

    /// Predicate-object map has neither rr:objectMap nor rr:object.
    #[error("predicate-object map {0} has no object map")]
    MissingObjectMap(String),

    /// Node in term-map position carries none of rr:constant, rr:template,
    /// or rr:column.
    #[error("node {0} is not a constant, template, or column term map")]
    NotATermMap(String),

    /// Template pattern does not contain exactly one `{column}` placeholder.
    #[error("template {0:?} must contain exactly one {{column}} placeholder")]
    InvalidTemplate(String),

    /// Referencing object map names its own triples map as parent.
    #[error("triples map {0} references itself as join parent")]
    SelfReferencingJoin(String),

    /// Referencing object map has no join condition even though the child
    /// and parent logical tables differ.
    #[error("referencing object map in {child} has no join condition for parent {parent} over a different logical table")]
    MissingJoinCondition { child: String, parent: String },

    /// Two or more triples maps reference each other as join parents.
    #[error("circular triples map reference involving {0}")]
    CircularDependency(String),

    /// A mapping property carries a value of the wrong shape.
    #[error("invalid value for {property}: {message}")]
    InvalidValue { property: String, message: String },

    /// Materialization was started without a row source.
    #[error("no row source provided")]
    MissingRowSource,

    /// Materialization was started without a compiled mapping.
    #[error("no compiled mapping provided")]
    MissingMapping,

    /// Joint query synthesis was asked to join on zero conditions.
    #[error("cannot synthesize a joint query without join conditions")]
    EmptyJoinSet,

    /// A referencing object map names a triples map that is not in the
    /// compiled mapping.
    #[error("unknown triples map: {0}")]
    UnknownTriplesMap(String),

    /// A subject map produced a literal; subjects must be IRIs or blank
    /// nodes.
    #[error("subject of triples map {0} is a literal")]
    LiteralSubject(String),

    /// A generated or constant IRI failed validation.
    #[error("generated term {value:?} is not a valid IRI")]
    InvalidIri {
        value: String,
        #[source]
        source: oxrdf::IriParseError,
    },

    /// A row source has no table or query under the requested name.
    #[error("row source has no table or query named {0:?}")]
    TableNotFound(String),
}

/// Result type for mapping operations.
pub type R2rmlResult<T> = Result<T, R2rmlError>;
