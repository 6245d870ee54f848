//! The mapping run: walking compiled rules over a row source.

use oxrdf::vocab::rdf;
use oxrdf::{NamedNode, Subject, Term, TripleRef};
use tracing::debug;

use super::join::joint_table;
use super::term::{generate_object, generate_predicate, generate_subject, generate_subject_joined};
use crate::error::{R2rmlError, R2rmlResult};
use crate::graph::MappedGraph;
use crate::mapping::{CompiledMapping, RefPredicateObjectMap, TriplesMap};
use crate::source::RowSource;

/// Materialize every rule in `mapping` against `source`.
///
/// Both arguments are checked before any row is read; a missing source or
/// mapping fails without touching data. An empty rule set or empty tables
/// yield an empty graph. Rows that cannot produce a subject are skipped
/// whole; an absent object or predicate value suppresses just that triple.
/// The output graph starts from the mapping document's namespace prefixes.
pub fn map_to_graph(
    source: Option<&mut dyn RowSource>,
    mapping: Option<&CompiledMapping>,
) -> R2rmlResult<MappedGraph> {
    let source = source.ok_or(R2rmlError::MissingRowSource)?;
    let mapping = mapping.ok_or(R2rmlError::MissingMapping)?;

    let mut graph = MappedGraph::with_prefixes(mapping.prefixes().clone());
    for triples_map in mapping.iter() {
        map_direct(triples_map, source, &mut graph)?;
        for relation in triples_map.ref_predicate_object_maps() {
            map_referencing(triples_map, relation, mapping, source, &mut graph)?;
        }
    }
    debug!(triples = graph.len(), rules = mapping.len(), "mapping run complete");
    Ok(graph)
}

/// Scan a rule's own logical table, emitting class assertions and direct
/// relations.
fn map_direct(
    triples_map: &TriplesMap,
    source: &mut dyn RowSource,
    graph: &mut MappedGraph,
) -> R2rmlResult<()> {
    let classes = class_nodes(triples_map)?;

    let mut rows = 0u64;
    let mut triples = 0u64;
    source.for_each_row(triples_map.logical_table(), &mut |row| {
        rows += 1;
        let Some(subject) =
            generate_subject(triples_map.subject_map(), triples_map.iri(), Some(row))?
        else {
            return Ok(());
        };
        for class in &classes {
            if graph.insert(TripleRef::new(&subject, rdf::TYPE, class)) {
                triples += 1;
            }
        }
        for pom in triples_map.predicate_object_maps() {
            let Some(predicate) = generate_predicate(&pom.predicate, Some(row))? else {
                continue;
            };
            let Some(object) = generate_object(&pom.object, Some(row))? else {
                continue;
            };
            if graph.insert(TripleRef::new(&subject, &predicate, &object)) {
                triples += 1;
            }
        }
        Ok(())
    })?;
    debug!(
        triples_map = triples_map.iri(),
        rows, triples, "direct scan complete"
    );
    Ok(())
}

/// Emit one referencing relation by scanning the joint table (or, with no
/// join conditions, the shared logical table) and generating the parent's
/// subject against each row.
fn map_referencing(
    triples_map: &TriplesMap,
    relation: &RefPredicateObjectMap,
    mapping: &CompiledMapping,
    source: &mut dyn RowSource,
    graph: &mut MappedGraph,
) -> R2rmlResult<()> {
    let ref_object = &relation.object;
    let parent = mapping
        .get(ref_object.parent_triples_map())
        .ok_or_else(|| R2rmlError::UnknownTriplesMap(ref_object.parent_triples_map().to_string()))?;
    let conditions = ref_object.join_conditions();

    // With no conditions the parent shares this rule's logical table and its
    // subject is generated from the same row, no rewrite needed.
    let scan_table = if conditions.is_empty() {
        triples_map.logical_table().clone()
    } else {
        joint_table(triples_map.logical_table(), parent.logical_table(), conditions)?
    };

    let mut rows = 0u64;
    let mut triples = 0u64;
    source.for_each_row(&scan_table, &mut |row| {
        rows += 1;
        let Some(subject) =
            generate_subject(triples_map.subject_map(), triples_map.iri(), Some(row))?
        else {
            return Ok(());
        };
        let Some(predicate) = generate_predicate(&relation.predicate, Some(row))? else {
            return Ok(());
        };
        let Some(object) =
            generate_subject_joined(parent.subject_map(), parent.iri(), conditions, Some(row))?
        else {
            return Ok(());
        };
        let object = subject_term(object);
        if graph.insert(TripleRef::new(&subject, &predicate, &object)) {
            triples += 1;
        }
        Ok(())
    })?;
    debug!(
        triples_map = triples_map.iri(),
        parent = parent.iri(),
        rows,
        triples,
        "referencing scan complete"
    );
    Ok(())
}

fn class_nodes(triples_map: &TriplesMap) -> R2rmlResult<Vec<NamedNode>> {
    triples_map
        .subject_map()
        .classes()
        .iter()
        .map(|class| {
            NamedNode::new(class.as_str()).map_err(|source| R2rmlError::InvalidIri {
                value: class.clone(),
                source,
            })
        })
        .collect()
}

fn subject_term(subject: Subject) -> Term {
    match subject {
        Subject::NamedNode(node) => Term::NamedNode(node),
        Subject::BlankNode(node) => Term::BlankNode(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::R2rmlLoader;
    use crate::mapping::LogicalTable;
    use crate::source::{MemorySource, Row};
    use std::collections::BTreeMap;

    fn row(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn compile(turtle: &str) -> CompiledMapping {
        R2rmlLoader::from_turtle_with_base(turtle, "http://example.com/mapping")
            .unwrap()
            .compile()
            .unwrap()
    }

    /// Row source that counts how often it is asked for rows.
    struct CountingSource {
        calls: usize,
    }

    impl RowSource for CountingSource {
        fn for_each_row(
            &mut self,
            _table: &LogicalTable,
            _on_row: &mut dyn FnMut(&dyn Row) -> R2rmlResult<()>,
        ) -> R2rmlResult<()> {
            self.calls += 1;
            Ok(())
        }
    }

    #[test]
    fn test_missing_source_fails_before_reading_rows() {
        let mapping = compile(
            r#"
            @prefix rr: <http://www.w3.org/ns/r2rml#> .
            <#M>
                rr:logicalTable [ rr:tableName "EMP" ] ;
                rr:subjectMap [ rr:template "http://example.com/{EMPNO}" ] .
        "#,
        );
        let err = map_to_graph(None, Some(&mapping)).unwrap_err();
        assert!(matches!(err, R2rmlError::MissingRowSource));
    }

    #[test]
    fn test_missing_mapping_fails_before_reading_rows() {
        let mut source = CountingSource { calls: 0 };
        let err = map_to_graph(Some(&mut source), None).unwrap_err();
        assert!(matches!(err, R2rmlError::MissingMapping));
        assert_eq!(source.calls, 0);
    }

    #[test]
    fn test_empty_mapping_yields_empty_graph_without_scans() {
        let mapping = compile("");
        let mut source = CountingSource { calls: 0 };
        let graph = map_to_graph(Some(&mut source), Some(&mapping)).unwrap();
        assert!(graph.is_empty());
        assert_eq!(source.calls, 0);
    }

    #[test]
    fn test_skips_rows_that_cannot_produce_a_subject() {
        let mapping = compile(
            r#"
            @prefix rr: <http://www.w3.org/ns/r2rml#> .
            @prefix ex: <http://example.com/ns#> .
            <#M>
                rr:logicalTable [ rr:tableName "EMP" ] ;
                rr:subjectMap [ rr:template "http://example.com/e/{EMPNO}" ; rr:class ex:Employee ] ;
                rr:predicateObjectMap [
                    rr:predicate ex:name ;
                    rr:objectMap [ rr:column "ENAME" ] ;
                ] .
        "#,
        );
        let mut source = MemorySource::new().with_table("EMP", vec![
            row(&[("EMPNO", "7369"), ("ENAME", "SMITH")]),
            row(&[("ENAME", "GHOST")]),
            row(&[("EMPNO", "7499")]),
        ]);
        let graph = map_to_graph(Some(&mut source), Some(&mapping)).unwrap();
        // Row 1: class + name. Row 2: nothing. Row 3: class only.
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn test_duplicate_rows_do_not_duplicate_triples() {
        let mapping = compile(
            r#"
            @prefix rr: <http://www.w3.org/ns/r2rml#> .
            @prefix ex: <http://example.com/ns#> .
            <#M>
                rr:logicalTable [ rr:tableName "EMP" ] ;
                rr:subjectMap [ rr:template "http://example.com/e/{EMPNO}" ] ;
                rr:predicateObjectMap [
                    rr:predicate ex:name ;
                    rr:objectMap [ rr:column "ENAME" ] ;
                ] .
        "#,
        );
        let mut source = MemorySource::new().with_table("EMP", vec![
            row(&[("EMPNO", "7369"), ("ENAME", "SMITH")]),
            row(&[("EMPNO", "7369"), ("ENAME", "SMITH")]),
        ]);
        let graph = map_to_graph(Some(&mut source), Some(&mapping)).unwrap();
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_prefixes_are_seeded_into_the_output_graph() {
        let mapping = compile(
            r#"
            @prefix rr: <http://www.w3.org/ns/r2rml#> .
            @prefix ex: <http://example.com/ns#> .
            <#M>
                rr:logicalTable [ rr:tableName "EMP" ] ;
                rr:subjectMap [ rr:template "http://example.com/e/{EMPNO}" ] .
        "#,
        );
        let mut source = MemorySource::new().with_table("EMP", vec![]);
        let graph = map_to_graph(Some(&mut source), Some(&mapping)).unwrap();
        assert!(graph.is_empty());
        assert_eq!(graph.namespace("ex"), Some("http://example.com/ns#"));
        assert_eq!(graph.namespace("rr"), Some("http://www.w3.org/ns/r2rml#"));
    }

    #[test]
    fn test_condition_free_reference_reads_parent_subject_from_the_same_row() {
        let mapping = compile(
            r#"
            @prefix rr: <http://www.w3.org/ns/r2rml#> .
            @prefix ex: <http://example.com/ns#> .
            <#EmpMapping>
                rr:logicalTable [ rr:tableName "EMP" ] ;
                rr:subjectMap [ rr:template "http://example.com/e/{EMPNO}" ] ;
                rr:predicateObjectMap [
                    rr:predicate ex:paySlip ;
                    rr:objectMap [ rr:parentTriplesMap <#SlipMapping> ] ;
                ] .
            <#SlipMapping>
                rr:logicalTable [ rr:tableName "EMP" ] ;
                rr:subjectMap [ rr:template "http://example.com/slip/{EMPNO}" ] .
        "#,
        );
        let mut source = MemorySource::new()
            .with_table("EMP", vec![row(&[("EMPNO", "7369")])]);
        let graph = map_to_graph(Some(&mut source), Some(&mapping)).unwrap();
        let turtle = graph.to_turtle().unwrap();
        assert!(turtle.contains("<http://example.com/slip/7369>"));
    }

    #[test]
    fn test_unknown_parent_fails_the_run() {
        use crate::mapping::{
            PredicateMap, RefObjectMap, RefPredicateObjectMap, SubjectMap, TriplesMap,
        };
        use std::collections::BTreeMap as Prefixes;

        let emp = TriplesMap::new(
            "http://example.com/#EmpMapping",
            LogicalTable::table_name("EMP"),
            SubjectMap::template("http://example.com/e/{EMPNO}").unwrap(),
        )
        .with_ref_predicate_object_map(RefPredicateObjectMap::new(
            PredicateMap::constant("http://example.com/ns#department"),
            RefObjectMap::new("http://example.com/#Missing").with_condition("DEPTNO", "DEPTNO"),
        ));
        let mapping = CompiledMapping::new(vec![emp], Prefixes::new());

        let mut source = MemorySource::new().with_table("EMP", vec![]);
        let err = map_to_graph(Some(&mut source), Some(&mapping)).unwrap_err();
        assert!(matches!(err, R2rmlError::UnknownTriplesMap(id) if id.ends_with("#Missing")));
    }
}
