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

//! # Extraction Port
//!
//! This Port defines the contract for the "Data Source".
//!
//! Anything that implements `ExtractionPort` must be able to execute a
//! statement and hand back a `RowCursor` that pages through the result set
//! in batches. The exporter never sees driver types: only column
//! descriptors and cells.

use crate::domain::entities::{ColumnDescriptor, Row};
use crate::domain::errors::Result;

/// A forward-only cursor over one executed statement.
pub trait RowCursor {
    /// Output columns, in SELECT order. Constant for the cursor's lifetime.
    fn column_descriptors(&self) -> &[ColumnDescriptor];

    /// Fetches up to `max_rows` rows. An empty batch means the cursor is exhausted.
    fn fetch_batch(&mut self, max_rows: usize) -> Result<Vec<Row>>;
}

/// `ExtractionPort` runs queries against the source database.
pub trait ExtractionPort {
    /// Executes `sql` and returns a cursor over its rows.
    ///
    /// `array_size` is a fetch-buffer hint; implementations may ignore it.
    fn open_cursor<'a>(&'a self, sql: &str, array_size: usize) -> Result<Box<dyn RowCursor + 'a>>;
}
