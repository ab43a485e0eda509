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

//! # Binary Column Rewriter
//!
//! Replaces every binary cell in a batch with a `file://` reference and
//! collects the payloads that have to be written to disk, keyed by their
//! content-derived file name.
//!
//! This module only decides *what* to write. The filesystem work belongs to
//! the exporter, so the rewrite logic can be tested without touching disk.

use crate::domain::blob_identity::identify;
use crate::domain::entities::{BinaryOutput, Cell, ColumnDescriptor, Row};
use log::warn;
use std::collections::BTreeMap;

/// The outcome of rewriting one batch.
#[derive(Debug, Default)]
pub struct RewrittenBatch {
    pub rows: Vec<Row>,
    /// File name to payload. One entry per distinct content hash.
    pub blobs: BTreeMap<String, Vec<u8>>,
    /// Binary cells that were NULL or zero-length, in row order.
    pub empty_cells: Vec<EmptyPayload>,
}

/// Position of a binary cell that had nothing to externalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyPayload {
    /// 1-based row number within the whole result set.
    pub row: u64,
    pub column: usize,
}

/// Positions of the columns whose values are externalized.
pub fn binary_columns(descriptors: &[ColumnDescriptor]) -> Vec<usize> {
    descriptors
        .iter()
        .enumerate()
        .filter(|(_, d)| d.kind.is_binary())
        .map(|(i, _)| i)
        .collect()
}

/// Rewrites the binary cells of `batch`.
///
/// `row_offset` is the number of rows exported before this batch and is only
/// used to number rows in warnings and `empty_cells`. When no column is binary the batch is
/// handed back untouched.
pub fn rewrite(
    batch: Vec<Row>,
    descriptors: &[ColumnDescriptor],
    output: &BinaryOutput,
    row_offset: u64,
) -> RewrittenBatch {
    let binary_cols = binary_columns(descriptors);
    if binary_cols.is_empty() {
        return RewrittenBatch {
            rows: batch,
            ..Default::default()
        };
    }

    let mut blobs = BTreeMap::new();
    let mut empty_cells = Vec::new();
    let mut rows = Vec::with_capacity(batch.len());

    for (ri, mut row) in batch.into_iter().enumerate() {
        let row_number = row_offset + ri as u64 + 1;
        for &col in &binary_cols {
            // A short row is left for the sink to reject.
            let Some(cell) = row.get_mut(col) else {
                continue;
            };
            let data = match std::mem::replace(cell, Cell::Null) {
                Cell::Bytes(b) => b,
                Cell::Text(s) => s.into_bytes(),
                Cell::Null => Vec::new(),
            };

            if data.is_empty() {
                warn!(
                    "Binary data is empty, skipping column {} ({}) in row {}",
                    col, descriptors[col].name, row_number
                );
                *cell = Cell::text("");
                empty_cells.push(EmptyPayload {
                    row: row_number,
                    column: col,
                });
                continue;
            }

            let filename = identify(&data).filename();
            *cell = Cell::Text(output.reference(&filename));
            blobs.entry(filename).or_insert(data);
        }
        rows.push(row);
    }

    RewrittenBatch {
        rows,
        blobs,
        empty_cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ColumnKind;

    const GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x80\x00\x00\xff\xff\xff\x00\x00\x00,\x00\x00\x00\x00\x01\x00\x01\x00\x00\x02\x02D\x01\x00;";

    fn descriptors() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::new("ID", ColumnKind::Numeric),
            ColumnDescriptor::new("PHOTO", ColumnKind::Binary),
        ]
    }

    fn output() -> BinaryOutput {
        BinaryOutput::new("/tmp/out/EMP", "EMP")
    }

    #[test]
    fn test_no_binary_columns_returns_batch_unchanged() {
        let descriptors = vec![ColumnDescriptor::new("NAME", ColumnKind::Text)];
        let batch = vec![vec![Cell::text("a")], vec![Cell::Null]];
        let out = rewrite(batch.clone(), &descriptors, &output(), 0);
        assert_eq!(out.rows, batch);
        assert!(out.blobs.is_empty());
        assert!(out.empty_cells.is_empty());
    }

    #[test]
    fn test_identical_payloads_are_deduplicated() {
        let batch = vec![
            vec![Cell::text("1"), Cell::Bytes(GIF.to_vec())],
            vec![Cell::text("2"), Cell::Bytes(GIF.to_vec())],
        ];
        let out = rewrite(batch, &descriptors(), &output(), 0);

        assert_eq!(out.blobs.len(), 1);
        let (name, bytes) = out.blobs.iter().next().unwrap();
        assert!(name.ends_with(".gif"));
        assert_eq!(bytes.as_slice(), GIF);

        let expected = Cell::Text(format!("file://EMP/{}", name));
        assert_eq!(out.rows[0][1], expected);
        assert_eq!(out.rows[1][1], expected);
        // Non-binary cells are left alone.
        assert_eq!(out.rows[0][0], Cell::text("1"));
    }

    #[test]
    fn test_empty_and_null_payloads_become_empty_text() {
        let batch = vec![
            vec![Cell::text("1"), Cell::Bytes(Vec::new())],
            vec![Cell::text("2"), Cell::Null],
        ];
        let out = rewrite(batch, &descriptors(), &output(), 10);
        assert!(out.blobs.is_empty());
        assert_eq!(
            out.empty_cells,
            vec![
                EmptyPayload { row: 11, column: 1 },
                EmptyPayload { row: 12, column: 1 },
            ]
        );
        assert_eq!(out.rows[0][1], Cell::text(""));
        assert_eq!(out.rows[1][1], Cell::text(""));
    }

    #[test]
    fn test_unsniffable_payload_uses_bare_hash() {
        let batch = vec![vec![Cell::text("1"), Cell::Bytes(b"opaque".to_vec())]];
        let out = rewrite(batch, &descriptors(), &output(), 0);
        let name = out.blobs.keys().next().unwrap();
        assert_eq!(name.len(), 64);
        assert_eq!(out.rows[0][1], Cell::Text(format!("file://EMP/{}", name)));
    }

    #[test]
    fn test_empty_payload_is_reported_by_row() {
        let batch = vec![
            vec![Cell::text("1"), Cell::Bytes(GIF.to_vec())],
            vec![Cell::text("2"), Cell::Bytes(Vec::new())],
            vec![Cell::text("3"), Cell::Bytes(GIF.to_vec())],
        ];
        let out = rewrite(batch, &descriptors(), &output(), 0);
        assert_eq!(out.blobs.len(), 1);
        assert_eq!(out.empty_cells, vec![EmptyPayload { row: 2, column: 1 }]);
        assert_eq!(out.rows[1][1], Cell::text(""));
    }

    #[test]
    fn test_short_row_is_passed_through() {
        let batch = vec![vec![Cell::text("1")]];
        let out = rewrite(batch.clone(), &descriptors(), &output(), 0);
        assert_eq!(out.rows, batch);
        assert!(out.blobs.is_empty());
        assert!(out.empty_cells.is_empty());
    }

    #[test]
    fn test_binary_columns_from_descriptors() {
        assert_eq!(binary_columns(&descriptors()), vec![1]);
    }
}
