use crate::domain::errors::Result;

/// What happened when a blob was handed to a `BlobStore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobWrite {
    Written,
    /// A file with that name was already present; nothing was written.
    AlreadyExists,
}

/// Port for persisting content-addressed binary payloads.
pub trait BlobStore {
    /// Makes sure the destination exists. Called before the first write of a batch.
    fn prepare(&self) -> Result<()>;

    /// Writes `bytes` under `filename` unless that name is already taken.
    ///
    /// Must never overwrite an existing file.
    fn store(&self, filename: &str, bytes: &[u8]) -> Result<BlobWrite>;
}
