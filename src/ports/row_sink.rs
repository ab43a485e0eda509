use crate::domain::entities::Row;
use crate::domain::errors::Result;

/// Port for the data stream rows are serialized to.
pub trait RowSink {
    fn write_header(&mut self, names: &[String]) -> Result<()>;

    /// Appends rows in order. Writes are sequential; nothing is rewritten.
    fn write_rows(&mut self, rows: &[Row]) -> Result<()>;

    fn flush(&mut self) -> Result<()>;
}
