//! Utility functions for generating Oracle SQL text.
//!
//! This module parses table qualifiers, builds the SELECT list for a table
//! export and normalizes ad-hoc statements before they are executed.

use crate::domain::entities::{TableColumn, TableRef};
use crate::domain::errors::{ExportError, Result};
use crate::domain::mapping::is_unsupported_data_type;
use log::warn;

/// Parses `TABLE` or `SCHEMA.TABLE`.
pub fn parse_table_ref(qualified: &str) -> Result<TableRef> {
    let trimmed = qualified.trim();
    let parts: Vec<&str> = trimmed.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(ExportError::ConfigError(format!(
            "Failed to parse table name: {}",
            qualified
        )));
    }

    match parts.as_slice() {
        [name] => Ok(TableRef {
            owner: None,
            name: name.to_string(),
        }),
        [owner, name] => Ok(TableRef {
            owner: Some(owner.to_string()),
            name: name.to_string(),
        }),
        _ => Err(ExportError::ConfigError(format!(
            "Failed to parse table name: {}",
            qualified
        ))),
    }
}

/// Column names excluded for `table`.
///
/// Exclusions are qualified the same way as the table itself: `TAB.COL` for
/// `TAB`, `SCOTT.TAB.COL` for `SCOTT.TAB`.
pub fn excluded_columns(table: &TableRef, exclude: &[String]) -> Vec<String> {
    let prefix = format!("{}.", table.qualified());
    exclude
        .iter()
        .filter_map(|c| c.strip_prefix(&prefix))
        .filter(|c| !c.contains('.'))
        .map(|c| c.to_string())
        .collect()
}

/// SELECT list entries for the given columns, in dictionary order.
///
/// Columns of unsupported types are kept in position as an empty literal.
pub fn select_list(columns: &[TableColumn], exclude: &[String]) -> Vec<String> {
    columns
        .iter()
        .filter(|c| !exclude.iter().any(|e| e == &c.name))
        .map(|c| {
            if is_unsupported_data_type(&c.data_type) {
                warn!(
                    "Skipping column: {}. Unsupported type: {}",
                    c.name, c.data_type
                );
                format!("'' AS \"{}\"", c.name)
            } else {
                format!("\"{}\"", c.name)
            }
        })
        .collect()
}

/// Builds the export query for a table, optionally as of a given SCN.
pub fn build_table_select(table: &TableRef, select_list: &[String], scn: Option<u64>) -> String {
    let mut sql = format!("SELECT {} FROM {}", select_list.join(","), table.qualified());
    if let Some(scn) = scn {
        sql.push_str(&format!(" AS OF SCN {}", scn));
    }
    sql
}

/// Trims whitespace and a trailing `;` from an ad-hoc statement.
pub fn normalize_statement(sql: &str) -> String {
    sql.trim().trim_end_matches(';').trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str, data_type: &str) -> TableColumn {
        TableColumn {
            name: name.to_string(),
            data_type: data_type.to_string(),
        }
    }

    #[test]
    fn test_parse_table_ref() {
        let t = parse_table_ref("EMP").unwrap();
        assert_eq!(t.owner, None);
        assert_eq!(t.name, "EMP");

        let t = parse_table_ref("SCOTT.EMP").unwrap();
        assert_eq!(t.owner.as_deref(), Some("SCOTT"));
        assert_eq!(t.name, "EMP");
    }

    #[test]
    fn test_parse_table_ref_rejects_bad_qualifiers() {
        assert!(matches!(
            parse_table_ref("DB.SCOTT.EMP"),
            Err(ExportError::ConfigError(_))
        ));
        assert!(parse_table_ref("").is_err());
        assert!(parse_table_ref("SCOTT.").is_err());
    }

    #[test]
    fn test_excluded_columns() {
        let table = parse_table_ref("SCOTT.EMP").unwrap();
        let exclude = vec![
            "SCOTT.EMP.SAL".to_string(),
            "EMP.COMM".to_string(),
            "SCOTT.DEPT.LOC".to_string(),
        ];
        assert_eq!(excluded_columns(&table, &exclude), vec!["SAL".to_string()]);

        let table = parse_table_ref("EMP").unwrap();
        assert_eq!(excluded_columns(&table, &exclude), vec!["COMM".to_string()]);
    }

    #[test]
    fn test_select_list_masks_unsupported_types() {
        let columns = vec![
            col("ID", "NUMBER"),
            col("SAL", "NUMBER"),
            col("SPAN", "INTERVAL YEAR(2) TO MONTH"),
            col("PHOTO", "BLOB"),
        ];
        let list = select_list(&columns, &["SAL".to_string()]);
        assert_eq!(list, vec!["\"ID\"", "'' AS \"SPAN\"", "\"PHOTO\""]);
    }

    #[test]
    fn test_build_table_select() {
        let table = parse_table_ref("SCOTT.EMP").unwrap();
        let list = vec!["\"ID\"".to_string(), "\"NAME\"".to_string()];
        assert_eq!(
            build_table_select(&table, &list, None),
            "SELECT \"ID\",\"NAME\" FROM SCOTT.EMP"
        );
        assert_eq!(
            build_table_select(&table, &list, Some(42)),
            "SELECT \"ID\",\"NAME\" FROM SCOTT.EMP AS OF SCN 42"
        );
    }

    #[test]
    fn test_normalize_statement() {
        assert_eq!(normalize_statement("  select 1 from dual;\n"), "select 1 from dual");
        assert_eq!(normalize_statement("select 1 from dual"), "select 1 from dual");
    }
}
