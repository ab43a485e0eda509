//! Infrastructure adapter for paging Oracle result sets into domain rows.

use crate::domain::entities::{Cell, ColumnDescriptor, ColumnKind, Row};
use crate::domain::errors::Result;
use crate::domain::mapping;
use crate::ports::extraction_port::{ExtractionPort, RowCursor};
use log::debug;
use oracle::sql_type::{OracleType, Timestamp};
use oracle::{Connection, ResultSet};
use std::sync::Arc;

/// Concrete implementation of `ExtractionPort` for Oracle databases.
///
/// Each statement gets a cursor that converts driver values into `Cell`s:
/// RAW/BLOB values are read fully into memory as bytes, dates and
/// timestamps are formatted as text, everything else is fetched as
/// Oracle's own text representation.
pub struct OracleExtractionAdapter {
    conn: Arc<Connection>,
}

impl OracleExtractionAdapter {
    pub fn new(conn: Arc<Connection>) -> Self {
        Self { conn }
    }
}

impl ExtractionPort for OracleExtractionAdapter {
    fn open_cursor<'a>(&'a self, sql: &str, array_size: usize) -> Result<Box<dyn RowCursor + 'a>> {
        debug!("Executing: {}", sql);
        let array_size = u32::try_from(array_size).unwrap_or(u32::MAX);

        let stmt = self
            .conn
            .statement(sql)
            .prefetch_rows(array_size)
            .fetch_array_size(array_size)
            .build()?;
        let rows = stmt.into_result_set(&[])?;

        let (descriptors, types): (Vec<ColumnDescriptor>, Vec<OracleType>) = rows
            .column_info()
            .iter()
            .map(|c| {
                let otype = c.oracle_type().clone();
                (ColumnDescriptor::new(c.name(), mapping::column_kind(&otype)), otype)
            })
            .unzip();

        Ok(Box::new(OracleCursor {
            rows,
            descriptors,
            types,
        }))
    }
}

/// Cursor over an executing Oracle statement.
pub struct OracleCursor<'a> {
    rows: ResultSet<'a, oracle::Row>,
    descriptors: Vec<ColumnDescriptor>,
    types: Vec<OracleType>,
}

impl OracleCursor<'_> {
    fn convert(&self, row: &oracle::Row) -> Result<Row> {
        let mut cells = Vec::with_capacity(self.descriptors.len());
        for (i, (desc, otype)) in self.descriptors.iter().zip(&self.types).enumerate() {
            let cell = match desc.kind {
                ColumnKind::Binary => Cell::from(row.get::<_, Option<Vec<u8>>>(i)?),
                ColumnKind::Unsupported => Cell::Null,
                ColumnKind::Numeric | ColumnKind::Text => match otype {
                    OracleType::Date
                    | OracleType::Timestamp(_)
                    | OracleType::TimestampTZ(_)
                    | OracleType::TimestampLTZ(_) => {
                        let v: Option<Timestamp> = row.get(i)?;
                        Cell::from(v.map(|ts| format_timestamp(&ts)))
                    }
                    _ => Cell::from(row.get::<_, Option<String>>(i)?),
                },
            };
            cells.push(cell);
        }
        Ok(cells)
    }
}

impl RowCursor for OracleCursor<'_> {
    fn column_descriptors(&self) -> &[ColumnDescriptor] {
        &self.descriptors
    }

    fn fetch_batch(&mut self, max_rows: usize) -> Result<Vec<Row>> {
        let mut batch = Vec::with_capacity(max_rows.min(4096));
        while batch.len() < max_rows {
            match self.rows.next() {
                Some(row_res) => {
                    let row = row_res?;
                    batch.push(self.convert(&row)?);
                }
                None => break,
            }
        }
        Ok(batch)
    }
}

/// Formats a `Timestamp` as `YYYY-MM-DD HH:MM:SS`, adding microseconds when non-zero.
fn format_timestamp(ts: &Timestamp) -> String {
    let base = format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        ts.year(),
        ts.month(),
        ts.day(),
        ts.hour(),
        ts.minute(),
        ts.second()
    );
    let micros = ts.nanosecond() / 1000;
    if micros == 0 {
        base
    } else {
        format!("{}.{:06}", base, micros)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        let ts = Timestamp::new(2023, 10, 27, 14, 30, 45, 123456000).unwrap();
        assert_eq!(format_timestamp(&ts), "2023-10-27 14:30:45.123456");

        let ts2 = Timestamp::new(2023, 1, 1, 0, 0, 0, 0).unwrap();
        assert_eq!(format_timestamp(&ts2), "2023-01-01 00:00:00");
    }
}
