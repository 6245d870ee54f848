//! Term generation: one term map and one row in, one RDF term out.
//!
//! Generation is tolerant of missing data. A recipe whose referenced column
//! is absent from the row yields `Ok(None)` and the caller emits nothing for
//! that row; only structurally invalid output (a malformed IRI, a literal in
//! subject position) is an error. Template substitution percent-encodes the
//! column value so the surrounding pattern always survives verbatim.

use oxrdf::{BlankNode, Literal, NamedNode, Subject, Term};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::{R2rmlError, R2rmlResult};
use crate::mapping::{
    ConstantValue, JoinCondition, ObjectMap, PredicateMap, SubjectMap, TermMap, TermType,
};
use crate::source::Row;

/// Everything outside RFC 3986 unreserved characters is percent-encoded.
const IRI_UNSAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// IRI-safe form of a raw column value for template substitution.
pub fn iri_safe(value: &str) -> String {
    utf8_percent_encode(value, IRI_UNSAFE).to_string()
}

/// Generate one RDF term from a term map and a row.
///
/// Returns `Ok(None)` when the recipe reads a column the row does not have
/// (or when no row was supplied at all); constants never read the row and
/// always produce a term.
pub fn generate_term(
    term_map: &TermMap,
    term_type: TermType,
    row: Option<&dyn Row>,
) -> R2rmlResult<Option<Term>> {
    generate(term_map, term_type, None, None, &[], row)
}

/// Join-aware variant of [`generate_term`].
///
/// When a referencing relation evaluates its parent's term map against a
/// joint row, the parent-side column names are rewritten to the child
/// columns the join conditions equate them with, since the joint row only
/// carries the child's columns.
pub fn generate_term_joined(
    term_map: &TermMap,
    term_type: TermType,
    join_conditions: &[JoinCondition],
    row: Option<&dyn Row>,
) -> R2rmlResult<Option<Term>> {
    generate(term_map, term_type, None, None, join_conditions, row)
}

/// Generate a subject from a subject map, rejecting literals.
pub fn generate_subject(
    subject_map: &SubjectMap,
    triples_map_iri: &str,
    row: Option<&dyn Row>,
) -> R2rmlResult<Option<Subject>> {
    generate_subject_joined(subject_map, triples_map_iri, &[], row)
}

/// Join-aware variant of [`generate_subject`], used for parent subjects
/// evaluated against joint rows.
pub fn generate_subject_joined(
    subject_map: &SubjectMap,
    triples_map_iri: &str,
    join_conditions: &[JoinCondition],
    row: Option<&dyn Row>,
) -> R2rmlResult<Option<Subject>> {
    let term = generate(
        subject_map.term_map(),
        subject_map.term_type(),
        None,
        None,
        join_conditions,
        row,
    )?;
    match term {
        None => Ok(None),
        Some(Term::NamedNode(node)) => Ok(Some(Subject::NamedNode(node))),
        Some(Term::BlankNode(node)) => Ok(Some(Subject::BlankNode(node))),
        Some(Term::Literal(_)) => Err(R2rmlError::LiteralSubject(triples_map_iri.to_string())),
    }
}

/// Generate a predicate IRI from a predicate map.
pub fn generate_predicate(
    predicate_map: &PredicateMap,
    row: Option<&dyn Row>,
) -> R2rmlResult<Option<NamedNode>> {
    let term = generate(predicate_map.term_map(), TermType::Iri, None, None, &[], row)?;
    match term {
        None => Ok(None),
        Some(Term::NamedNode(node)) => Ok(Some(node)),
        Some(_) => Err(R2rmlError::InvalidValue {
            property: "rr:predicateMap".to_string(),
            message: "predicates must be IRIs".to_string(),
        }),
    }
}

/// Generate an object term from an object map, applying its datatype or
/// language tag to generated literals.
pub fn generate_object(object_map: &ObjectMap, row: Option<&dyn Row>) -> R2rmlResult<Option<Term>> {
    generate(
        object_map.term_map(),
        object_map.term_type(),
        object_map.datatype(),
        object_map.language(),
        &[],
        row,
    )
}

fn generate(
    term_map: &TermMap,
    term_type: TermType,
    datatype: Option<&str>,
    language: Option<&str>,
    join_conditions: &[JoinCondition],
    row: Option<&dyn Row>,
) -> R2rmlResult<Option<Term>> {
    match term_map {
        TermMap::Constant(value) => constant_term(value).map(Some),
        TermMap::Column(column) => {
            let column = rewrite_column(column, join_conditions);
            match lookup(row, column) {
                None => Ok(None),
                Some(value) => wrap(value, term_type, datatype, language).map(Some),
            }
        }
        TermMap::Template(template) => {
            let column = rewrite_column(template.column(), join_conditions);
            match lookup(row, column) {
                None => Ok(None),
                Some(value) => {
                    let expanded = template.fill(&iri_safe(value));
                    wrap(&expanded, term_type, datatype, language).map(Some)
                }
            }
        }
    }
}

/// Swap a parent-side column for the child column its join condition equates
/// it with. Columns without a matching condition pass through unchanged.
fn rewrite_column<'a>(column: &'a str, join_conditions: &'a [JoinCondition]) -> &'a str {
    join_conditions
        .iter()
        .find(|condition| condition.parent_column == column)
        .map(|condition| condition.child_column.as_str())
        .unwrap_or(column)
}

fn lookup<'r>(row: Option<&'r dyn Row>, column: &str) -> Option<&'r str> {
    row.and_then(|row| row.get(column))
}

/// Turn a resolved value into a term of the requested kind.
fn wrap(
    value: &str,
    term_type: TermType,
    datatype: Option<&str>,
    language: Option<&str>,
) -> R2rmlResult<Term> {
    match term_type {
        TermType::Iri => NamedNode::new(value)
            .map(Term::from)
            .map_err(|source| R2rmlError::InvalidIri {
                value: value.to_string(),
                source,
            }),
        // The resolved value is discarded: blank node labels are fresh per
        // generated term.
        TermType::BlankNode => Ok(Term::from(BlankNode::default())),
        TermType::Literal => literal_term(value, datatype, language),
    }
}

fn literal_term(
    value: &str,
    datatype: Option<&str>,
    language: Option<&str>,
) -> R2rmlResult<Term> {
    if let Some(language) = language {
        Literal::new_language_tagged_literal(value, language)
            .map(Term::from)
            .map_err(|err| R2rmlError::InvalidValue {
                property: "rr:language".to_string(),
                message: err.to_string(),
            })
    } else if let Some(datatype) = datatype {
        let datatype = NamedNode::new(datatype).map_err(|source| R2rmlError::InvalidIri {
            value: datatype.to_string(),
            source,
        })?;
        Ok(Term::from(Literal::new_typed_literal(value, datatype)))
    } else {
        Ok(Term::from(Literal::new_simple_literal(value)))
    }
}

fn constant_term(value: &ConstantValue) -> R2rmlResult<Term> {
    match value {
        ConstantValue::Iri(iri) => NamedNode::new(iri.as_str())
            .map(Term::from)
            .map_err(|source| R2rmlError::InvalidIri {
                value: iri.clone(),
                source,
            }),
        ConstantValue::Literal {
            value,
            datatype,
            language,
        } => literal_term(value, datatype.as_deref(), language.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::Template;
    use std::collections::BTreeMap;

    fn row(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn named(iri: &str) -> Term {
        Term::from(NamedNode::new(iri).unwrap())
    }

    #[test]
    fn test_constant_ignores_the_row() {
        let map = TermMap::Constant(ConstantValue::iri("http://example.com/ns#name"));
        let with_row = row(&[("X", "1")]);
        assert_eq!(
            generate_term(&map, TermType::Iri, Some(&with_row)).unwrap(),
            Some(named("http://example.com/ns#name"))
        );
        assert_eq!(
            generate_term(&map, TermType::Iri, None).unwrap(),
            Some(named("http://example.com/ns#name"))
        );
    }

    #[test]
    fn test_column_value_becomes_a_plain_literal() {
        let map = TermMap::Column("EMPNO".to_string());
        let r = row(&[("EMPNO", "7369")]);
        assert_eq!(
            generate_term(&map, TermType::Literal, Some(&r)).unwrap(),
            Some(Term::from(Literal::new_simple_literal("7369")))
        );
    }

    #[test]
    fn test_absent_column_suppresses_the_term() {
        let map = TermMap::Column("ENAME".to_string());
        let r = row(&[("EMPNO", "7369")]);
        assert_eq!(generate_term(&map, TermType::Literal, Some(&r)).unwrap(), None);
        assert_eq!(generate_term(&map, TermType::Literal, None).unwrap(), None);
    }

    #[test]
    fn test_template_expands_to_an_iri() {
        let map = TermMap::Template(
            Template::parse("http://data.example.com/employee/{EMPNO}").unwrap(),
        );
        let r = row(&[("EMPNO", "7369")]);
        assert_eq!(
            generate_term(&map, TermType::Iri, Some(&r)).unwrap(),
            Some(named("http://data.example.com/employee/7369"))
        );
    }

    #[test]
    fn test_template_values_are_percent_encoded() {
        let map = TermMap::Template(
            Template::parse("http://data.example.com/department/{DNAME}").unwrap(),
        );
        let r = row(&[("DNAME", "NEW YORK/HQ")]);
        assert_eq!(
            generate_term(&map, TermType::Iri, Some(&r)).unwrap(),
            Some(named("http://data.example.com/department/NEW%20YORK%2FHQ"))
        );
    }

    #[test]
    fn test_unreserved_characters_survive_encoding() {
        assert_eq!(iri_safe("A-b.c_d~e"), "A-b.c_d~e");
        assert_eq!(iri_safe("a b"), "a%20b");
        assert_eq!(iri_safe("100%"), "100%25");
    }

    #[test]
    fn test_column_as_iri_uses_the_raw_value() {
        let map = TermMap::Column("URL".to_string());
        let r = row(&[("URL", "http://example.com/page")]);
        assert_eq!(
            generate_term(&map, TermType::Iri, Some(&r)).unwrap(),
            Some(named("http://example.com/page"))
        );
    }

    #[test]
    fn test_invalid_generated_iri_is_an_error() {
        let map = TermMap::Column("URL".to_string());
        let r = row(&[("URL", "not an iri")]);
        let err = generate_term(&map, TermType::Iri, Some(&r)).unwrap_err();
        assert!(matches!(err, R2rmlError::InvalidIri { value, .. } if value == "not an iri"));
    }

    #[test]
    fn test_blank_nodes_are_fresh_per_term() {
        let map = TermMap::Column("EMPNO".to_string());
        let r = row(&[("EMPNO", "7369")]);
        let first = generate_term(&map, TermType::BlankNode, Some(&r)).unwrap();
        let second = generate_term(&map, TermType::BlankNode, Some(&r)).unwrap();
        assert!(matches!(first, Some(Term::BlankNode(_))));
        assert_ne!(first, second);
    }

    #[test]
    fn test_blank_node_still_requires_the_column() {
        let map = TermMap::Column("EMPNO".to_string());
        let r = row(&[("OTHER", "x")]);
        assert_eq!(
            generate_term(&map, TermType::BlankNode, Some(&r)).unwrap(),
            None
        );
    }

    #[test]
    fn test_literal_subject_is_rejected() {
        let subject_map = SubjectMap::column("EMPNO").with_term_type(TermType::Literal);
        let r = row(&[("EMPNO", "7369")]);
        let err = generate_subject(&subject_map, "http://example.com/#M", Some(&r)).unwrap_err();
        assert!(matches!(err, R2rmlError::LiteralSubject(id) if id == "http://example.com/#M"));
    }

    #[test]
    fn test_constant_literal_subject_is_rejected() {
        let subject_map = SubjectMap::new(TermMap::Constant(ConstantValue::literal("oops")));
        let err = generate_subject(&subject_map, "http://example.com/#M", None).unwrap_err();
        assert!(matches!(err, R2rmlError::LiteralSubject(_)));
    }

    #[test]
    fn test_constant_iri_subject_needs_no_row() {
        let subject_map = SubjectMap::constant_iri("http://example.com/company");
        let subject = generate_subject(&subject_map, "http://example.com/#M", None).unwrap();
        assert_eq!(
            subject,
            Some(Subject::NamedNode(
                NamedNode::new("http://example.com/company").unwrap()
            ))
        );
    }

    #[test]
    fn test_predicate_must_be_an_iri() {
        let predicate_map = PredicateMap::new(TermMap::Constant(ConstantValue::literal("name")));
        let err = generate_predicate(&predicate_map, None).unwrap_err();
        assert!(matches!(err, R2rmlError::InvalidValue { .. }));
    }

    #[test]
    fn test_template_and_column_predicates_read_the_row() {
        let templated = PredicateMap::template("http://example.com/ns#{PROP}").unwrap();
        let r = row(&[("PROP", "salary")]);
        assert_eq!(
            generate_predicate(&templated, Some(&r)).unwrap(),
            Some(NamedNode::new("http://example.com/ns#salary").unwrap())
        );

        let from_column = PredicateMap::column("PRED");
        let r = row(&[("PRED", "http://example.com/ns#grade")]);
        assert_eq!(
            generate_predicate(&from_column, Some(&r)).unwrap(),
            Some(NamedNode::new("http://example.com/ns#grade").unwrap())
        );
    }

    #[test]
    fn test_object_map_decorations_apply_to_generated_literals() {
        let map = ObjectMap::column("HIREDATE")
            .with_datatype("http://www.w3.org/2001/XMLSchema#date");
        let r = row(&[("HIREDATE", "1980-12-17")]);
        let term = generate_object(&map, Some(&r)).unwrap().unwrap();
        assert_eq!(
            term,
            Term::from(Literal::new_typed_literal(
                "1980-12-17",
                NamedNode::new("http://www.w3.org/2001/XMLSchema#date").unwrap()
            ))
        );

        let map = ObjectMap::column("TITLE").with_language("en");
        let r = row(&[("TITLE", "Clerk")]);
        let term = generate_object(&map, Some(&r)).unwrap().unwrap();
        assert_eq!(
            term,
            Term::from(Literal::new_language_tagged_literal("Clerk", "en").unwrap())
        );
    }

    #[test]
    fn test_constant_and_template_object_builders() {
        assert_eq!(
            generate_object(&ObjectMap::constant_iri("http://example.com/hq"), None).unwrap(),
            Some(named("http://example.com/hq"))
        );
        assert_eq!(
            generate_object(&ObjectMap::constant_literal("onward"), None).unwrap(),
            Some(Term::from(Literal::new_simple_literal("onward")))
        );

        let map = ObjectMap::template("http://data.example.com/department/{DEPTNO}").unwrap();
        let r = row(&[("DEPTNO", "10")]);
        assert_eq!(
            generate_object(&map, Some(&r)).unwrap(),
            Some(named("http://data.example.com/department/10"))
        );
    }

    #[test]
    fn test_join_conditions_rewrite_parent_columns() {
        let map = TermMap::Template(
            Template::parse("http://data.example.com/department/{DEPTNO}").unwrap(),
        );
        let conditions = vec![JoinCondition::new("DNO", "DEPTNO")];
        // The joint row carries child columns only.
        let r = row(&[("DNO", "10")]);
        assert_eq!(
            generate_term_joined(&map, TermType::Iri, &conditions, Some(&r)).unwrap(),
            Some(named("http://data.example.com/department/10"))
        );
        // Without the rewrite the column is missing and the term vanishes.
        assert_eq!(
            generate_term(&map, TermType::Iri, Some(&r)).unwrap(),
            None
        );
    }

    #[test]
    fn test_unrelated_columns_pass_through_rewrite() {
        let conditions = vec![JoinCondition::new("DNO", "DEPTNO")];
        assert_eq!(rewrite_column("LOC", &conditions), "LOC");
        assert_eq!(rewrite_column("DEPTNO", &conditions), "DNO");
    }
}
