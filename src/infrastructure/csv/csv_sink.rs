//! Infrastructure adapter that serializes rows as CSV.

use crate::domain::entities::{Cell, LineTerminator, Row};
use crate::domain::errors::{ExportError, Result};
use crate::ports::row_sink::RowSink;
use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};
use std::io::Write;

/// Concrete implementation of `RowSink` on top of the `csv` crate.
///
/// Fields are quoted only when they contain a comma, a quote or a line
/// break; embedded quotes are doubled. NULL cells are written as empty
/// fields. Binary cells that were not externalized are written as
/// uppercase hex.
pub struct CsvSink<W: Write> {
    wtr: Writer<W>,
}

impl<W: Write> CsvSink<W> {
    pub fn new(inner: W, line_terminator: LineTerminator) -> Self {
        let terminator = match line_terminator {
            LineTerminator::Lf => Terminator::Any(b'\n'),
            LineTerminator::Crlf => Terminator::CRLF,
        };

        let wtr = WriterBuilder::new()
            .delimiter(b',')
            .quote_style(QuoteStyle::Necessary)
            .terminator(terminator)
            .from_writer(inner);

        Self { wtr }
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.wtr.into_inner().map_err(|e| {
            ExportError::IoError(std::io::Error::new(e.error().kind(), e.error().to_string()))
        })
    }

    fn write_cell(&mut self, cell: &Cell) -> Result<()> {
        match cell {
            Cell::Null => self.wtr.write_field(b"")?,
            Cell::Text(s) => self.wtr.write_field(s.as_bytes())?,
            Cell::Bytes(b) => self.wtr.write_field(hex::encode_upper(b))?,
        }
        Ok(())
    }
}

impl<W: Write> RowSink for CsvSink<W> {
    fn write_header(&mut self, names: &[String]) -> Result<()> {
        self.wtr.write_record(names)?;
        Ok(())
    }

    fn write_rows(&mut self, rows: &[Row]) -> Result<()> {
        for row in rows {
            for cell in row {
                self.write_cell(cell)?;
            }
            // Ends the record; also rejects rows whose width differs from the header.
            self.wtr.write_record(None::<&[u8]>)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.wtr.flush()?;
        Ok(())
    }
}
