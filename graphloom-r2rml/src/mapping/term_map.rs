//! Term maps: the recipes that turn one row into one RDF term.
//!
//! Every position of a generated triple is described by a [`TermMap`], a
//! closed set of three recipes. A constant ignores the row entirely, a
//! template substitutes one column value into a pattern, and a column map
//! uses the column value directly. Role-specific wrappers ([`SubjectMap`],
//! [`PredicateMap`], [`ObjectMap`]) add the properties that only make sense
//! for that position, such as class assertions or literal datatypes.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{R2rmlError, R2rmlResult};

/// Matches one `{column}` placeholder in a template pattern.
static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}]+)\}").expect("valid regex"));

/// The kind of RDF term a term map produces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TermType {
    /// `rr:IRI`, the default for subject and predicate maps.
    #[default]
    Iri,
    /// `rr:BlankNode`; the generated label is fresh per invocation.
    BlankNode,
    /// `rr:Literal`, the default for column and template object maps.
    Literal,
}

impl TermType {
    /// Parse a full `rr:` term-type IRI, `None` for anything else.
    pub fn from_iri(iri: &str) -> Option<Self> {
        match iri {
            "http://www.w3.org/ns/r2rml#IRI" => Some(TermType::Iri),
            "http://www.w3.org/ns/r2rml#BlankNode" => Some(TermType::BlankNode),
            "http://www.w3.org/ns/r2rml#Literal" => Some(TermType::Literal),
            _ => None,
        }
    }

    pub fn is_iri(&self) -> bool {
        matches!(self, TermType::Iri)
    }

    pub fn is_blank_node(&self) -> bool {
        matches!(self, TermType::BlankNode)
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, TermType::Literal)
    }
}

/// A fixed RDF term held by a constant term map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstantValue {
    /// A fixed IRI.
    Iri(String),
    /// A fixed literal, optionally typed or language-tagged.
    Literal {
        value: String,
        datatype: Option<String>,
        language: Option<String>,
    },
}

impl ConstantValue {
    /// Constant IRI value.
    pub fn iri(iri: impl Into<String>) -> Self {
        ConstantValue::Iri(iri.into())
    }

    /// Constant plain literal value.
    pub fn literal(value: impl Into<String>) -> Self {
        ConstantValue::Literal {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn is_iri(&self) -> bool {
        matches!(self, ConstantValue::Iri(_))
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            ConstantValue::Iri(iri) => Some(iri),
            ConstantValue::Literal { .. } => None,
        }
    }
}

/// A template pattern together with its single `{column}` placeholder.
///
/// Parsing validates the pattern, so a held template is always expandable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pattern: String,
    column: String,
}

impl Template {
    /// Parse a template pattern, requiring exactly one `{column}`
    /// placeholder.
    ///
    /// ```
    /// use graphloom_r2rml::mapping::Template;
    ///
    /// let t = Template::parse("http://data.example.com/employee/{EMPNO}").unwrap();
    /// assert_eq!(t.column(), "EMPNO");
    /// assert!(Template::parse("http://data.example.com/none").is_err());
    /// ```
    pub fn parse(pattern: impl Into<String>) -> R2rmlResult<Self> {
        let pattern = pattern.into();
        let (first, extra) = {
            let mut names = PLACEHOLDER_RE
                .captures_iter(&pattern)
                .map(|caps| caps[1].to_string());
            (names.next(), names.next())
        };
        match (first, extra) {
            (Some(column), None) => Ok(Template { pattern, column }),
            _ => Err(R2rmlError::InvalidTemplate(pattern)),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Name of the column the placeholder references.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Substitute an already-encoded value for the placeholder.
    pub fn fill(&self, value: &str) -> String {
        self.pattern
            .replacen(&format!("{{{}}}", self.column), value, 1)
    }
}

/// One term recipe.
///
/// Classification happens by elimination while the mapping document is
/// compiled: `rr:constant` wins over `rr:template`, which wins over
/// `rr:column`. A node carrying none of the three is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TermMap {
    /// Fixed term; the row is ignored and may be absent.
    Constant(ConstantValue),
    /// Pattern with one placeholder resolved against the row.
    Template(Template),
    /// Column name resolved directly against the row.
    Column(String),
}

impl TermMap {
    /// The column this recipe reads, if any.
    pub fn referenced_column(&self) -> Option<&str> {
        match self {
            TermMap::Constant(_) => None,
            TermMap::Template(template) => Some(template.column()),
            TermMap::Column(column) => Some(column),
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, TermMap::Constant(_))
    }
}

/// How a rule's entity term and class memberships are produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectMap {
    term_map: TermMap,
    term_type: TermType,
    classes: Vec<String>,
}

impl SubjectMap {
    /// Subject map from any recipe; the term kind defaults to IRI.
    pub fn new(term_map: TermMap) -> Self {
        SubjectMap {
            term_map,
            term_type: TermType::Iri,
            classes: Vec::new(),
        }
    }

    /// Subject map from a template pattern.
    pub fn template(pattern: impl Into<String>) -> R2rmlResult<Self> {
        Ok(SubjectMap::new(TermMap::Template(Template::parse(pattern)?)))
    }

    /// Subject map reading one column.
    pub fn column(column: impl Into<String>) -> Self {
        SubjectMap::new(TermMap::Column(column.into()))
    }

    /// Subject map with a fixed IRI.
    pub fn constant_iri(iri: impl Into<String>) -> Self {
        SubjectMap::new(TermMap::Constant(ConstantValue::iri(iri)))
    }

    pub fn with_term_type(mut self, term_type: TermType) -> Self {
        self.term_type = term_type;
        self
    }

    /// Add a class every generated subject is asserted to belong to.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn term_map(&self) -> &TermMap {
        &self.term_map
    }

    pub fn term_type(&self) -> TermType {
        self.term_type
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// How a relation's predicate term is produced. Predicates are always IRIs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredicateMap {
    term_map: TermMap,
}

impl PredicateMap {
    pub fn new(term_map: TermMap) -> Self {
        PredicateMap { term_map }
    }

    /// Predicate map with a fixed IRI, the overwhelmingly common case.
    pub fn constant(iri: impl Into<String>) -> Self {
        PredicateMap::new(TermMap::Constant(ConstantValue::iri(iri)))
    }

    /// Predicate map from a template pattern.
    pub fn template(pattern: impl Into<String>) -> R2rmlResult<Self> {
        Ok(PredicateMap::new(TermMap::Template(Template::parse(
            pattern,
        )?)))
    }

    /// Predicate map reading one column.
    pub fn column(column: impl Into<String>) -> Self {
        PredicateMap::new(TermMap::Column(column.into()))
    }

    pub fn term_map(&self) -> &TermMap {
        &self.term_map
    }
}

/// How a direct relation's object term is produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMap {
    term_map: TermMap,
    term_type: TermType,
    datatype: Option<String>,
    language: Option<String>,
}

impl ObjectMap {
    /// Object map from any recipe; the term kind defaults to literal.
    /// Constants carry their own kind and ignore it.
    pub fn new(term_map: TermMap) -> Self {
        ObjectMap {
            term_map,
            term_type: TermType::Literal,
            datatype: None,
            language: None,
        }
    }

    /// Object map reading one column as a literal.
    pub fn column(column: impl Into<String>) -> Self {
        ObjectMap::new(TermMap::Column(column.into()))
    }

    /// Object map reading one column as an IRI.
    pub fn column_iri(column: impl Into<String>) -> Self {
        ObjectMap::column(column).with_term_type(TermType::Iri)
    }

    /// Object map from a template pattern, producing IRIs.
    pub fn template(pattern: impl Into<String>) -> R2rmlResult<Self> {
        Ok(ObjectMap::new(TermMap::Template(Template::parse(pattern)?))
            .with_term_type(TermType::Iri))
    }

    /// Object map with a fixed IRI.
    pub fn constant_iri(iri: impl Into<String>) -> Self {
        ObjectMap::new(TermMap::Constant(ConstantValue::iri(iri)))
    }

    /// Object map with a fixed plain literal.
    pub fn constant_literal(value: impl Into<String>) -> Self {
        ObjectMap::new(TermMap::Constant(ConstantValue::literal(value)))
    }

    pub fn with_term_type(mut self, term_type: TermType) -> Self {
        self.term_type = term_type;
        self
    }

    /// Datatype IRI applied to generated literals.
    pub fn with_datatype(mut self, datatype: impl Into<String>) -> Self {
        self.datatype = Some(datatype.into());
        self
    }

    /// Language tag applied to generated literals.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn term_map(&self) -> &TermMap {
        &self.term_map
    }

    pub fn term_type(&self) -> TermType {
        self.term_type
    }

    pub fn datatype(&self) -> Option<&str> {
        self.datatype.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_type_from_iri() {
        assert_eq!(
            TermType::from_iri("http://www.w3.org/ns/r2rml#IRI"),
            Some(TermType::Iri)
        );
        assert_eq!(
            TermType::from_iri("http://www.w3.org/ns/r2rml#BlankNode"),
            Some(TermType::BlankNode)
        );
        assert_eq!(
            TermType::from_iri("http://www.w3.org/ns/r2rml#Literal"),
            Some(TermType::Literal)
        );
        assert_eq!(TermType::from_iri("http://example.com/Other"), None);
    }

    #[test]
    fn test_template_parses_single_placeholder() {
        let template = Template::parse("http://data.example.com/employee/{EMPNO}").unwrap();
        assert_eq!(template.column(), "EMPNO");
        assert_eq!(
            template.fill("7369"),
            "http://data.example.com/employee/7369"
        );
    }

    #[test]
    fn test_template_rejects_zero_placeholders() {
        let err = Template::parse("http://data.example.com/static").unwrap_err();
        assert!(matches!(err, R2rmlError::InvalidTemplate(_)));
    }

    #[test]
    fn test_template_rejects_multiple_placeholders() {
        let err = Template::parse("http://example.com/{A}/{B}").unwrap_err();
        assert!(matches!(err, R2rmlError::InvalidTemplate(_)));
    }

    #[test]
    fn test_template_fill_replaces_only_the_placeholder() {
        let template = Template::parse("urn:{ID}:tail").unwrap();
        assert_eq!(template.fill("x"), "urn:x:tail");
    }

    #[test]
    fn test_referenced_column_by_variant() {
        assert_eq!(
            TermMap::Constant(ConstantValue::iri("http://example.com/x")).referenced_column(),
            None
        );
        let template = Template::parse("urn:{DEPTNO}").unwrap();
        assert_eq!(
            TermMap::Template(template).referenced_column(),
            Some("DEPTNO")
        );
        assert_eq!(
            TermMap::Column("ENAME".to_string()).referenced_column(),
            Some("ENAME")
        );
    }

    #[test]
    fn test_subject_map_defaults_and_builders() {
        let map = SubjectMap::template("http://data.example.com/employee/{EMPNO}")
            .unwrap()
            .with_class("http://example.com/ns#Employee");
        assert!(map.term_type().is_iri());
        assert_eq!(map.classes(), ["http://example.com/ns#Employee"]);
        assert_eq!(map.term_map().referenced_column(), Some("EMPNO"));
    }

    #[test]
    fn test_object_map_defaults_to_literal() {
        let map = ObjectMap::column("ENAME");
        assert!(map.term_type().is_literal());
        assert!(ObjectMap::column_iri("DEPT_IRI").term_type().is_iri());
    }

    #[test]
    fn test_object_map_literal_decorations() {
        let map = ObjectMap::column("HIREDATE")
            .with_datatype("http://www.w3.org/2001/XMLSchema#date");
        assert_eq!(
            map.datatype(),
            Some("http://www.w3.org/2001/XMLSchema#date")
        );
        assert_eq!(map.language(), None);
    }
}
