pub mod connection;
pub mod oracle_extraction_adapter;
pub mod oracle_metadata_adapter;
pub mod sql_utils;
