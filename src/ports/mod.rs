pub mod blob_port;
pub mod extraction_port;
pub mod metadata_port;
pub mod row_sink;
