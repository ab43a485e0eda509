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

//! Oracle logon handling.
//!
//! Accepts the SQL*Plus style logon string
//! `{<username>[/<password>][@<connect_identifier>] | /}` and opens a
//! single connection with it.

use crate::domain::errors::{ExportError, Result};
use log::info;
use oracle::{Connection, Connector};

/// Credentials and target for one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logon {
    pub username: String,
    pub password: String,
    pub connect_string: String,
    /// OS authentication (`/`): no username or password is sent.
    pub external_auth: bool,
}

impl Logon {
    /// Parses a logon string.
    ///
    /// A missing password is taken from `ORACLE_PASSWORD` when set.
    pub fn parse(logon: &str) -> Result<Self> {
        let logon = logon.trim();
        let (credentials, connect_string) = match logon.rsplit_once('@') {
            Some((c, s)) => (c, s.to_string()),
            None => (logon, String::new()),
        };

        if credentials == "/" {
            return Ok(Self {
                username: String::new(),
                password: String::new(),
                connect_string,
                external_auth: true,
            });
        }

        let (username, password) = match credentials.split_once('/') {
            Some((u, p)) => (u.to_string(), Some(p.to_string())),
            None => (credentials.to_string(), None),
        };

        if username.is_empty() {
            return Err(ExportError::ConfigError(format!(
                "Invalid Oracle logon: {}",
                logon
            )));
        }

        let password = password
            .or_else(|| std::env::var("ORACLE_PASSWORD").ok())
            .unwrap_or_default();

        Ok(Self {
            username,
            password,
            connect_string,
            external_auth: false,
        })
    }

    /// Opens the connection.
    pub fn connect(&self) -> Result<Connection> {
        let target = if self.connect_string.is_empty() {
            "<default>"
        } else {
            self.connect_string.as_str()
        };
        info!("Connecting to {}...", target);

        let mut connector = Connector::new(
            self.username.as_str(),
            self.password.as_str(),
            self.connect_string.as_str(),
        );
        connector.external_auth(self.external_auth);
        connector
            .connect()
            .map_err(|e| ExportError::OracleError(format!("Unable to connect: {}", e)))
    }
}
