//! The `map` command: run a mapping document over a JSON row-data file.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use graphloom_r2rml::{map_to_graph, MemorySource, R2rmlLoader};
use serde::Deserialize;

use crate::error::CliResult;

/// On-disk row-data format: named tables and raw queries, each holding an
/// array of row objects.
///
/// ```json
/// {
///   "tables": { "EMP": [ { "EMPNO": "7369", "ENAME": "SMITH" } ] },
///   "queries": { "SELECT * FROM DEPT": [ { "DEPTNO": "10" } ] }
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DataFile {
    #[serde(default)]
    tables: BTreeMap<String, Vec<BTreeMap<String, serde_json::Value>>>,
    #[serde(default)]
    queries: BTreeMap<String, Vec<BTreeMap<String, serde_json::Value>>>,
}

pub fn run(
    mapping: &Path,
    data: &Path,
    base: Option<&str>,
    out: Option<&Path>,
    quiet: bool,
) -> CliResult<()> {
    let loader = match base {
        Some(base) => R2rmlLoader::from_path_with_base(mapping, base)?,
        None => R2rmlLoader::from_path(mapping)?,
    };
    let compiled = loader.compile()?;

    let file: DataFile = serde_json::from_str(&fs::read_to_string(data)?)?;
    let mut source = MemorySource::new();
    for (name, rows) in file.tables {
        source = source.with_table(&name, to_rows(rows));
    }
    for (query, rows) in file.queries {
        source = source.with_query(&query, to_rows(rows));
    }

    let graph = map_to_graph(Some(&mut source), Some(&compiled))?;
    let turtle = graph.to_turtle()?;
    match out {
        Some(path) => fs::write(path, &turtle)?,
        None => print!("{turtle}"),
    }
    if !quiet {
        eprintln!("{} triples from {} rules", graph.len(), compiled.len());
    }
    Ok(())
}

fn to_rows(rows: Vec<BTreeMap<String, serde_json::Value>>) -> Vec<BTreeMap<String, String>> {
    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .filter_map(|(column, value)| coerce(value).map(|text| (column, text)))
                .collect()
        })
        .collect()
}

/// JSON scalars become column text; a null leaves the column absent.
fn coerce(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(text) => Some(text),
        serde_json::Value::Bool(flag) => Some(flag.to_string()),
        serde_json::Value::Number(number) => Some(number.to_string()),
        other => Some(other.to_string()),
    }
}
