//! Joint-query synthesis for referencing relations.

use crate::error::{R2rmlError, R2rmlResult};
use crate::mapping::{JoinCondition, LogicalTable, TableSource};

/// Combine a referencing (child) and a referenced (parent) logical table
/// into one joint query scanning the child's columns.
///
/// The synthesized text has the shape
///
/// ```text
/// SELECT child.* FROM EMP AS child, (SELECT * FROM DEPT) AS parent WHERE child.DEPTNO=parent.DEPTNO
/// ```
///
/// with raw-query operands parenthesized so nested joins compose.
/// Conditions are rendered in declared order, joined with ` AND `, without
/// deduplication. The referencing side's SQL version hint carries over to
/// the joint table.
pub fn joint_table(
    referencing: &LogicalTable,
    referenced: &LogicalTable,
    conditions: &[JoinCondition],
) -> R2rmlResult<LogicalTable> {
    if conditions.is_empty() {
        return Err(R2rmlError::EmptyJoinSet);
    }

    let mut sql = format!(
        "SELECT child.* FROM {} AS child, {} AS parent WHERE ",
        sql_operand(referencing),
        sql_operand(referenced)
    );
    for (i, condition) in conditions.iter().enumerate() {
        if i > 0 {
            sql.push_str(" AND ");
        }
        sql.push_str("child.");
        sql.push_str(&condition.child_column);
        sql.push('=');
        sql.push_str("parent.");
        sql.push_str(&condition.parent_column);
    }

    let mut joint = LogicalTable::query(sql);
    if let Some(version) = referencing.sql_version() {
        joint = joint.with_sql_version(version);
    }
    Ok(joint)
}

/// A FROM-clause operand: a bare table name, or a parenthesized subquery.
fn sql_operand(table: &LogicalTable) -> String {
    match table.source() {
        TableSource::TableName(name) => name.clone(),
        TableSource::Query(query) => format!("({query})"),
    }
}
