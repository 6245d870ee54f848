//! The `inspect` command: summarize the rules of a mapping document.

use std::path::Path;

use graphloom_r2rml::{ConstantValue, R2rmlLoader, TableSource, TermMap};

use crate::error::CliResult;

pub fn run(mapping: &Path, base: Option<&str>) -> CliResult<()> {
    let loader = match base {
        Some(base) => R2rmlLoader::from_path_with_base(mapping, base)?,
        None => R2rmlLoader::from_path(mapping)?,
    };
    let compiled = loader.compile()?;

    println!("{} triples map(s)", compiled.len());
    for map in compiled.iter() {
        println!();
        println!("{}", map.iri());
        match map.logical_table().source() {
            TableSource::TableName(name) => println!("  table: {name}"),
            TableSource::Query(query) => println!("  query: {query}"),
        }
        println!("  subject: {}", describe(map.subject_map().term_map()));
        for class in map.subject_map().classes() {
            println!("  class: <{class}>");
        }
        for pom in map.predicate_object_maps() {
            println!(
                "  relation: {} -> {}",
                describe(pom.predicate.term_map()),
                describe(pom.object.term_map())
            );
        }
        for pom in map.ref_predicate_object_maps() {
            let conditions = pom
                .object
                .join_conditions()
                .iter()
                .map(|c| format!("{}={}", c.child_column, c.parent_column))
                .collect::<Vec<_>>()
                .join(", ");
            if conditions.is_empty() {
                println!(
                    "  relation: {} -> ref {}",
                    describe(pom.predicate.term_map()),
                    pom.object.parent_triples_map()
                );
            } else {
                println!(
                    "  relation: {} -> ref {} on {}",
                    describe(pom.predicate.term_map()),
                    pom.object.parent_triples_map(),
                    conditions
                );
            }
        }
    }
    Ok(())
}

fn describe(term_map: &TermMap) -> String {
    match term_map {
        TermMap::Constant(ConstantValue::Iri(iri)) => format!("<{iri}>"),
        TermMap::Constant(ConstantValue::Literal { value, .. }) => format!("{value:?}"),
        TermMap::Template(template) => format!("template {:?}", template.pattern()),
        TermMap::Column(column) => format!("column {column:?}"),
    }
}
