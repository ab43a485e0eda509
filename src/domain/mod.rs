pub mod binary_rewriter;
pub mod blob_identity;
pub mod entities;
pub mod errors;
pub mod mapping;
pub mod throughput;
