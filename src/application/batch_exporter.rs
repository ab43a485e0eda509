// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Batch Exporter
//!
//! Streams one result set to a `RowSink`, one batch at a time:
//!
//! 1. **Fetch** up to `batch_size` rows. An empty batch ends the export.
//! 2. **Externalize** binary cells into content-addressed blob files.
//! 3. **Substitute** NULLs with the configured marker.
//! 4. **Write** the batch and flush it.
//!
//! Only one batch is held in memory at a time. The export is not
//! transactional: if a fetch or write fails, whatever was already flushed
//! stays on disk.

use crate::domain::binary_rewriter::{binary_columns, rewrite};
use crate::domain::entities::{
    BinaryOutput, Cell, ColumnDescriptor, ColumnKind, ExportSettings, ExportStats, Row,
};
use crate::domain::errors::Result;
use crate::ports::blob_port::{BlobStore, BlobWrite};
use crate::ports::extraction_port::RowCursor;
use crate::ports::row_sink::RowSink;
use log::{debug, warn};
use std::time::Instant;

/// Destination for binary values. Without one, binary cells are written inline.
pub struct BlobTarget<'a> {
    pub output: &'a BinaryOutput,
    pub store: &'a dyn BlobStore,
}

pub struct BatchExporter<'a> {
    settings: &'a ExportSettings,
    blobs: Option<BlobTarget<'a>>,
}

impl<'a> BatchExporter<'a> {
    pub fn new(settings: &'a ExportSettings, blobs: Option<BlobTarget<'a>>) -> Self {
        Self { settings, blobs }
    }

    /// Drains `cursor` into `sink`.
    ///
    /// The header is written whenever it is enabled, even if the result set
    /// turns out to be empty.
    pub fn run(&self, cursor: &mut dyn RowCursor, sink: &mut dyn RowSink) -> Result<ExportStats> {
        let start_time = Instant::now();
        let descriptors = cursor.column_descriptors().to_vec();

        let unsupported: Vec<usize> = descriptors
            .iter()
            .enumerate()
            .filter(|(_, d)| d.kind == ColumnKind::Unsupported)
            .map(|(i, d)| {
                warn!("Column {} has an unsupported type, exporting it empty", d.name);
                i
            })
            .collect();
        let has_binary = !binary_columns(&descriptors).is_empty();

        if self.settings.header {
            let names: Vec<String> = descriptors.iter().map(|d| d.name.clone()).collect();
            sink.write_header(&names)?;
        }

        let mut stats = ExportStats::default();

        loop {
            let mut rows = cursor.fetch_batch(self.settings.batch_size)?;
            if rows.is_empty() {
                break;
            }
            let row_offset = stats.rows;
            stats.rows += rows.len() as u64;
            stats.batches += 1;

            blank_columns(&mut rows, &unsupported);

            if has_binary {
                if let Some(target) = &self.blobs {
                    rows = self.externalize(rows, &descriptors, target, row_offset, &mut stats)?;
                }
            }

            if let Some(marker) = &self.settings.null_marker {
                substitute_nulls(&mut rows, marker);
            }

            sink.write_rows(&rows)?;
            sink.flush()?;
            debug!("Batch {}: {} rows (total {})", stats.batches, rows.len(), stats.rows);
        }

        sink.flush()?;
        stats.duration = start_time.elapsed().as_secs_f64();
        Ok(stats)
    }

    fn externalize(
        &self,
        rows: Vec<Row>,
        descriptors: &[ColumnDescriptor],
        target: &BlobTarget<'_>,
        row_offset: u64,
        stats: &mut ExportStats,
    ) -> Result<Vec<Row>> {
        let rewritten = rewrite(rows, descriptors, target.output, row_offset);
        stats.empty_payloads += rewritten.empty_cells.len() as u64;

        if !rewritten.blobs.is_empty() {
            target.store.prepare()?;
        }
        for (filename, bytes) in &rewritten.blobs {
            match target.store.store(filename, bytes)? {
                BlobWrite::Written => stats.blobs_written += 1,
                BlobWrite::AlreadyExists => stats.blobs_skipped += 1,
            }
        }

        Ok(rewritten.rows)
    }
}

fn blank_columns(rows: &mut [Row], columns: &[usize]) {
    if columns.is_empty() {
        return;
    }
    for row in rows.iter_mut() {
        for &col in columns {
            if let Some(cell) = row.get_mut(col) {
                *cell = Cell::text("");
            }
        }
    }
}

fn substitute_nulls(rows: &mut [Row], marker: &str) {
    for cell in rows.iter_mut().flat_map(|r| r.iter_mut()) {
        if cell.is_null() {
            *cell = Cell::text(marker);
        }
    }
}
