//! The application logic that turns a configured export source into one or
//! more statement exports.
//!
//! Tables are exported one after another on the calling thread. Each table
//! gets `<output>/<TABLE>.csv` and, when it has binary columns, a sibling
//! `<output>/<TABLE>/` directory of blob files. Ad-hoc SQL goes to stdout
//! with binary values written inline.

use crate::application::batch_exporter::{BatchExporter, BlobTarget};
use crate::config::{ExportConfig, ExportSource};
use crate::domain::entities::{BinaryOutput, ExportSettings, ExportStats, TableRef};
use crate::domain::errors::{ExportError, Result};
use crate::domain::throughput;
use crate::infrastructure::csv::csv_sink::CsvSink;
use crate::infrastructure::local_storage::local_blob_store::LocalBlobStore;
use crate::infrastructure::oracle::sql_utils;
use crate::ports::extraction_port::ExtractionPort;
use crate::ports::metadata_port::MetadataPort;
use log::{error, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Orchestrates the export of schemas, tables or a single statement.
pub struct Orchestrator<'a> {
    metadata_port: &'a dyn MetadataPort,
    extraction_port: &'a dyn ExtractionPort,
    config: &'a ExportConfig,
    settings: ExportSettings,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        metadata_port: &'a dyn MetadataPort,
        extraction_port: &'a dyn ExtractionPort,
        config: &'a ExportConfig,
    ) -> Self {
        Self {
            metadata_port,
            extraction_port,
            config,
            settings: config.settings(),
        }
    }

    /// Runs the configured export. Stops at the first failing statement.
    pub fn run(&self) -> Result<Vec<ExportStats>> {
        match self.config.source()? {
            ExportSource::Schemas(schemas) => {
                let mut results = Vec::new();
                for schema in schemas {
                    results.extend(self.export_schema(&schema)?);
                }
                Ok(results)
            }
            ExportSource::Tables(tables) => {
                // Reject every malformed name before anything is written.
                let refs = tables
                    .iter()
                    .map(|t| sql_utils::parse_table_ref(t))
                    .collect::<Result<Vec<_>>>()?;
                refs.iter().map(|t| self.export_table(t)).collect()
            }
            ExportSource::Sql(sql) => {
                let stdout = std::io::stdout();
                let stats = self.export_sql(&sql, stdout.lock())?;
                Ok(vec![stats])
            }
        }
    }

    fn export_schema(&self, schema: &str) -> Result<Vec<ExportStats>> {
        info!("Exporting schema {}", schema);
        let tables = self.metadata_port.get_tables(schema)?;
        if tables.is_empty() {
            info!("No tables found in schema {}", schema);
        }
        tables
            .iter()
            .map(|t| {
                let table = sql_utils::parse_table_ref(t)?;
                self.export_table(&table)
            })
            .collect()
    }

    /// Exports one table to `<output>/<TABLE>.csv`.
    pub fn export_table(&self, table: &TableRef) -> Result<ExportStats> {
        info!("EXPORTING: {}...", table);

        let columns = self.metadata_port.get_columns(table)?;
        let exclude = sql_utils::excluded_columns(table, &self.config.exclude_columns);
        let select_list = sql_utils::select_list(&columns, &exclude);
        if select_list.is_empty() {
            return Err(ExportError::ExtractionError {
                table: table.qualified(),
                reason: "no exportable columns found".to_string(),
            });
        }
        let sql = sql_utils::build_table_select(table, &select_list, self.config.scn);

        let output_dir = self.output_dir()?;
        let name = table.qualified();
        let csv_path = output_dir.join(format!("{}.csv", name));
        let binary = BinaryOutput::new(output_dir.join(&name), name);
        let store = LocalBlobStore::new(&binary.abs_dir);

        let file = File::create(&csv_path)?;
        let writer = BufWriter::with_capacity(128 * 1024, file);
        self.export_statement(
            &sql,
            writer,
            Some(BlobTarget {
                output: &binary,
                store: &store,
            }),
        )
    }

    /// Runs an ad-hoc statement, writing CSV to `out`.
    pub fn export_sql<W: Write>(&self, sql: &str, out: W) -> Result<ExportStats> {
        let sql = sql_utils::normalize_statement(sql);
        self.export_statement(&sql, out, None)
    }

    fn export_statement<W: Write>(
        &self,
        sql: &str,
        out: W,
        blobs: Option<BlobTarget<'_>>,
    ) -> Result<ExportStats> {
        let mut cursor = self
            .extraction_port
            .open_cursor(sql, self.settings.batch_size)
            .map_err(|e| {
                error!("Statement failed: {}", sql);
                e
            })?;
        let mut sink = CsvSink::new(out, self.settings.line_terminator);

        let stats = BatchExporter::new(&self.settings, blobs).run(cursor.as_mut(), &mut sink)?;
        sink.into_inner()?.flush()?;

        let summary = throughput::report(stats.rows, stats.duration);
        info!("{}", summary.describe(sql));
        if stats.blobs_written + stats.blobs_skipped > 0 {
            info!(
                "binary files: {} written, {} already present",
                stats.blobs_written, stats.blobs_skipped
            );
        }
        Ok(stats)
    }

    fn output_dir(&self) -> Result<PathBuf> {
        let dir = self.config.output_path();
        std::fs::create_dir_all(&dir)?;
        Ok(std::fs::canonicalize(dir)?)
    }
}
