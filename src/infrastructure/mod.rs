pub mod csv;
pub mod local_storage;
pub mod oracle;
