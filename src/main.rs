//! # CSV Exporter for Oracle (Rust)
//!
//! Streams Oracle tables, whole schemas or ad-hoc queries to CSV. Values of
//! binary columns (RAW, LONG RAW, BLOB) are written to content-addressed
//! files next to the CSV and referenced from the cell as `file://...`.
//!
//! This application follows the **Hexagonal Architecture** (Ports and Adapters)
//! to keep the export pipeline independent of the Oracle driver.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ports;

use crate::application::orchestrator::Orchestrator;
use crate::config::{AppConfig, CliArgs};
use crate::domain::errors::Result;
use crate::infrastructure::oracle::oracle_extraction_adapter::OracleExtractionAdapter;
use crate::infrastructure::oracle::oracle_metadata_adapter::OracleMetadataAdapter;
use clap::Parser;
use log::{error, info};
use std::process;
use std::sync::Arc;

fn main() {
    // 1. Initialize Logging (diagnostics go to stderr, data may go to stdout)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 2. Parse Arguments
    let args = CliArgs::parse();

    // 3. Load and validate Config
    let config = match AppConfig::load(&args) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        process::exit(1);
    }

    // 4. Run
    if let Err(e) = run(&config) {
        error!("Export failed: {}", e);
        process::exit(1);
    }
}

fn run(config: &AppConfig) -> Result<()> {
    let conn = Arc::new(config.logon()?.connect()?);

    let metadata = OracleMetadataAdapter::new(Arc::clone(&conn));
    let extraction = OracleExtractionAdapter::new(Arc::clone(&conn));

    let orchestrator = Orchestrator::new(&metadata, &extraction, &config.export);
    let results = orchestrator.run()?;

    let total_rows: u64 = results.iter().map(|r| r.rows).sum();
    info!(
        "Export finished. {} statement(s), {} rows.",
        results.len(),
        total_rows
    );

    conn.close()?;
    Ok(())
}
