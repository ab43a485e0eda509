//! Infrastructure adapter for reading table and column lists from the Oracle dictionary.

use crate::domain::entities::{TableColumn, TableRef};
use crate::domain::errors::Result;
use crate::ports::metadata_port::MetadataPort;
use log::debug;
use oracle::Connection;
use std::sync::Arc;

/// Concrete implementation of `MetadataPort` for Oracle databases.
pub struct OracleMetadataAdapter {
    conn: Arc<Connection>,
}

impl OracleMetadataAdapter {
    pub fn new(conn: Arc<Connection>) -> Self {
        Self { conn }
    }
}

// --- ORACLE DICTIONARY QUERIES ---

/// Lists every table of a schema, already qualified with its owner.
const SQL_LIST_TABLES: &str = "
    SELECT OWNER || '.' || TABLE_NAME
      FROM ALL_TABLES
     WHERE OWNER = :1
     ORDER BY TABLE_NAME
";

/// Columns of a table in the current user's schema.
const SQL_USER_COLUMNS: &str = "
    SELECT COLUMN_NAME, DATA_TYPE
      FROM USER_TAB_COLUMNS
     WHERE TABLE_NAME = :1
     ORDER BY COLUMN_ID
";

/// Columns of a table in an explicit schema.
const SQL_ALL_COLUMNS: &str = "
    SELECT COLUMN_NAME, DATA_TYPE
      FROM ALL_TAB_COLUMNS
     WHERE TABLE_NAME = :1
       AND OWNER = :2
     ORDER BY COLUMN_ID
";

impl MetadataPort for OracleMetadataAdapter {
    fn get_tables(&self, schema: &str) -> Result<Vec<String>> {
        let rows = self.conn.query(SQL_LIST_TABLES, &[&schema])?;
        let mut tables = Vec::new();
        for row_result in rows {
            let row = row_result?;
            let name: String = row.get(0)?;
            tables.push(name);
        }
        debug!("Found {} tables in {}", tables.len(), schema);
        Ok(tables)
    }

    fn get_columns(&self, table: &TableRef) -> Result<Vec<TableColumn>> {
        let rows = match &table.owner {
            Some(owner) => self.conn.query(SQL_ALL_COLUMNS, &[&table.name, owner])?,
            None => self.conn.query(SQL_USER_COLUMNS, &[&table.name])?,
        };

        let mut columns = Vec::new();
        for row_result in rows {
            let row = row_result?;
            columns.push(TableColumn {
                name: row.get(0)?,
                data_type: row.get(1)?,
            });
        }
        Ok(columns)
    }
}
