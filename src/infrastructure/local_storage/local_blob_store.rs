//! Infrastructure adapter for writing externalized binary values to local storage.

use crate::domain::errors::Result;
use crate::ports::blob_port::{BlobStore, BlobWrite};
use log::{debug, warn};
use std::fs::{self, DirBuilder, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Concrete implementation of `BlobStore` backed by a single directory.
///
/// The directory is created owner-only (0700). A blob is first written to a
/// private staging file and then hard-linked under its final name, so the
/// final name only ever refers to a complete payload and is never
/// overwritten. If two writers race on the same name, the loser skips.
pub struct LocalBlobStore {
    dir: PathBuf,
}

impl LocalBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn staging_path(&self, filename: &str) -> PathBuf {
        self.dir.join(format!(".{}.{}.partial", filename, std::process::id()))
    }

    fn create_staging(path: &Path) -> io::Result<File> {
        let mut opts = OpenOptions::new();
        opts.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            opts.mode(0o600);
        }
        opts.open(path)
    }

    /// Fills a staging file with `fill` and links it to `filename`.
    ///
    /// The staging file is removed whether or not the write succeeded.
    fn publish<F>(&self, filename: &str, fill: F) -> Result<BlobWrite>
    where
        F: FnOnce(&mut File) -> io::Result<()>,
    {
        let staging = self.staging_path(filename);
        let path = self.dir.join(filename);

        let result = Self::create_staging(&staging)
            .and_then(|mut file| {
                fill(&mut file)?;
                file.flush()
            })
            .and_then(|()| fs::hard_link(&staging, &path));

        if let Err(e) = fs::remove_file(&staging) {
            if e.kind() != ErrorKind::NotFound {
                warn!("Could not remove staging file {}: {}", staging.display(), e);
            }
        }

        match result {
            Ok(()) => Ok(BlobWrite::Written),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                warn!("File {} appeared while writing, skipping", path.display());
                Ok(BlobWrite::AlreadyExists)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl BlobStore for LocalBlobStore {
    fn prepare(&self) -> Result<()> {
        let mut builder = DirBuilder::new();
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }
        match builder.create(&self.dir) {
            Ok(()) => {
                debug!("Created binary output directory {}", self.dir.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists && self.dir.is_dir() => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, filename: &str, bytes: &[u8]) -> Result<BlobWrite> {
        let path = self.dir.join(filename);

        if path.exists() {
            warn!("File {} already exists, skipping", path.display());
            return Ok(BlobWrite::AlreadyExists);
        }

        self.publish(filename, |file| file.write_all(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_prepare_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("EMP");
        let store = LocalBlobStore::new(&dir);
        store.prepare().unwrap();
        store.prepare().unwrap();
        assert!(dir.is_dir());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&dir).unwrap().permissions().mode();
            assert_eq!(mode & 0o077, 0);
        }
    }

    #[test]
    fn test_prepare_fails_when_path_is_a_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("EMP");
        fs::write(&path, b"not a dir").unwrap();
        assert!(LocalBlobStore::new(path).prepare().is_err());
    }

    #[test]
    fn test_store_never_overwrites() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(temp_dir.path());

        assert_eq!(store.store("abc", b"first").unwrap(), BlobWrite::Written);
        assert_eq!(
            store.store("abc", b"second").unwrap(),
            BlobWrite::AlreadyExists
        );
        assert_eq!(fs::read(temp_dir.path().join("abc")).unwrap(), b"first");
        assert_eq!(entries(temp_dir.path()), vec!["abc".to_string()]);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(temp_dir.path().join("abc"))
                .unwrap()
                .permissions()
                .mode();
            assert_eq!(mode & 0o077, 0);
        }
    }

    #[test]
    fn test_store_without_directory_is_fatal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(temp_dir.path().join("missing"));
        assert!(store.store("abc", b"data").is_err());
    }

    #[test]
    fn test_failed_write_leaves_no_file_behind() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(temp_dir.path());

        let res = store.publish("abc", |file| {
            file.write_all(b"trunc")?;
            Err(io::Error::new(ErrorKind::Other, "No space left on device"))
        });
        assert!(res.is_err());
        assert!(entries(temp_dir.path()).is_empty());

        // A later run writes the blob instead of skipping a truncated one.
        assert_eq!(store.store("abc", b"complete").unwrap(), BlobWrite::Written);
        assert_eq!(fs::read(temp_dir.path().join("abc")).unwrap(), b"complete");
    }

    #[test]
    fn test_concurrent_writer_wins_the_name() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(temp_dir.path());
        let final_path = temp_dir.path().join("abc");

        // Another writer publishes the same name after the existence check.
        let res = store
            .publish("abc", |file| {
                fs::write(&final_path, b"other writer")?;
                file.write_all(b"mine")
            })
            .unwrap();

        assert_eq!(res, BlobWrite::AlreadyExists);
        assert_eq!(fs::read(&final_path).unwrap(), b"other writer");
        assert_eq!(entries(temp_dir.path()), vec!["abc".to_string()]);
    }
}
