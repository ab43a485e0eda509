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

//! # Type Mapping Logic
//!
//! The pipeline never branches on driver type codes. Each Oracle type is
//! resolved here, once per export, into a `ColumnKind`:
//! 1. **Binary**: RAW, LONG RAW and BLOB. Externalized as blob files.
//! 2. **Numeric**: NUMBER, FLOAT and the IEEE binary types.
//! 3. **Unsupported**: types the driver cannot fetch as text or bytes.
//! 4. **Text**: everything else (strings, CLOBs, dates, intervals...).
//!
//! It also knows which dictionary `DATA_TYPE` names have to be masked out
//! of the SELECT list before the query runs.

use crate::domain::entities::ColumnKind;
use oracle::sql_type::OracleType;

/// Dictionary data types that are replaced by an empty literal in the SELECT list.
pub const UNSUPPORTED_DATA_TYPES: &[&str] = &["INTERVAL YEAR(2) TO MONTH"];

/// Resolves the pipeline's view of a result-set column.
pub fn column_kind(oracle_type: &OracleType) -> ColumnKind {
    match oracle_type {
        OracleType::Raw(_) | OracleType::LongRaw | OracleType::BLOB => ColumnKind::Binary,

        OracleType::Number(_, _)
        | OracleType::Float(_)
        | OracleType::BinaryFloat
        | OracleType::BinaryDouble
        | OracleType::Int64
        | OracleType::UInt64 => ColumnKind::Numeric,

        OracleType::BFILE | OracleType::Object(_) | OracleType::RefCursor => {
            ColumnKind::Unsupported
        }

        _ => ColumnKind::Text,
    }
}

/// True when a dictionary `DATA_TYPE` cannot be selected directly.
pub fn is_unsupported_data_type(data_type: &str) -> bool {
    let upper = data_type.trim().to_uppercase();
    UNSUPPORTED_DATA_TYPES.iter().any(|t| *t == upper)
}
