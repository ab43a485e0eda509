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

//! # Metadata Port
//!
//! This Port defines what it means to "read metadata" for an export: which
//! tables a schema owns and which columns a table has. Any struct that
//! implements `MetadataPort` (the Oracle adapter, or a mock in tests) can be
//! used by the Orchestrator.

use crate::domain::entities::{TableColumn, TableRef};
use crate::domain::errors::Result;

pub trait MetadataPort {
    /// Returns `OWNER.TABLE_NAME` for every table owned by `schema`.
    fn get_tables(&self, schema: &str) -> Result<Vec<String>>;

    /// Returns the table's columns in `COLUMN_ID` order.
    ///
    /// Unqualified tables are looked up in the current user's schema.
    fn get_columns(&self, table: &TableRef) -> Result<Vec<TableColumn>>;
}
