//! The row-source boundary: how tabular rows reach the engine.
//!
//! The engine never talks to a database and never executes SQL. It hands a
//! [`LogicalTable`] (a table name, a raw query, or a synthesized joint
//! query) to a [`RowSource`] and consumes whatever rows come back through
//! the callback. [`MemorySource`] is the in-memory implementation used in
//! tests and by the CLI.

use std::collections::{BTreeMap, HashMap};

use crate::error::{R2rmlError, R2rmlResult};
use crate::mapping::{normalize_table_name, LogicalTable, TableSource};

/// One record yielded by a row source.
pub trait Row {
    /// Value of the named column, or `None` when the column is absent or
    /// null in this record.
    fn get(&self, column: &str) -> Option<&str>;
}

impl Row for BTreeMap<String, String> {
    fn get(&self, column: &str) -> Option<&str> {
        BTreeMap::get(self, column).map(String::as_str)
    }
}

/// A pull-based provider of rows for logical tables.
///
/// `for_each_row` invokes the callback once per record, in source order, and
/// stops at the first callback error, propagating it unchanged. The engine
/// only passes logical tables it was compiled with or synthesized itself.
pub trait RowSource {
    fn for_each_row(
        &mut self,
        table: &LogicalTable,
        on_row: &mut dyn FnMut(&dyn Row) -> R2rmlResult<()>,
    ) -> R2rmlResult<()>;
}

/// In-memory row source keyed by table name and raw query text.
///
/// Table names are matched after SQL-identifier normalization, query text
/// after trimming, so joint queries must be registered with their exact
/// synthesized text.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    tables: HashMap<String, Vec<BTreeMap<String, String>>>,
    queries: HashMap<String, Vec<BTreeMap<String, String>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        MemorySource::default()
    }

    /// Register rows for a named table.
    pub fn with_table(mut self, name: &str, rows: Vec<BTreeMap<String, String>>) -> Self {
        self.tables.insert(normalize_table_name(name), rows);
        self
    }

    /// Register rows for a raw or synthesized query.
    pub fn with_query(mut self, query: &str, rows: Vec<BTreeMap<String, String>>) -> Self {
        self.queries.insert(query.trim().to_string(), rows);
        self
    }
}

impl RowSource for MemorySource {
    fn for_each_row(
        &mut self,
        table: &LogicalTable,
        on_row: &mut dyn FnMut(&dyn Row) -> R2rmlResult<()>,
    ) -> R2rmlResult<()> {
        let rows = match table.source() {
            TableSource::TableName(name) => self
                .tables
                .get(&normalize_table_name(name))
                .ok_or_else(|| R2rmlError::TableNotFound(name.clone()))?,
            TableSource::Query(query) => self
                .queries
                .get(query.trim())
                .ok_or_else(|| R2rmlError::TableNotFound(query.clone()))?,
        };
        for row in rows {
            on_row(row)?;
        }
        Ok(())
    }
}
