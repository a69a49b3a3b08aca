//! Per-request scratch storage
//!
//! Each request writes its uploads into its own randomly named directory
//! under the configured root. Stored files are named by position, never by
//! the client filename, so concurrent requests cannot collide. The directory
//! is removed when the [`ScratchSpace`] is dropped.

use crate::error::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

pub struct ScratchSpace {
    dir: TempDir,
    stored: usize,
}

impl ScratchSpace {
    /// Create a fresh directory under `root`, creating `root` if needed
    pub fn create(root: &Path) -> Result<Self> {
        std::fs::create_dir_all(root)?;
        let dir = tempfile::Builder::new().prefix("req-").tempdir_in(root)?;
        debug!(path = %dir.path().display(), "Created scratch directory");
        Ok(Self { dir, stored: 0 })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write one uploaded file and return where it was stored
    pub async fn store(&mut self, data: &[u8]) -> Result<PathBuf> {
        self.stored += 1;
        let path = self.dir.path().join(format!("input-{}.pdf", self.stored));
        tokio::fs::write(&path, data).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_store_uses_positional_names() {
        let root = tempfile::tempdir().unwrap();
        let mut scratch = ScratchSpace::create(root.path()).unwrap();

        let first = scratch.store(b"one").await.unwrap();
        let second = scratch.store(b"two").await.unwrap();

        assert_eq!(first.file_name().unwrap(), "input-1.pdf");
        assert_eq!(second.file_name().unwrap(), "input-2.pdf");
        assert_eq!(std::fs::read(&second).unwrap(), b"two");
    }

    #[tokio::test]
    async fn test_directories_are_unique_and_removed_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let a = ScratchSpace::create(root.path()).unwrap();
        let b = ScratchSpace::create(root.path()).unwrap();
        assert_ne!(a.path(), b.path());

        let a_path = a.path().to_path_buf();
        drop(a);
        assert!(!a_path.exists());
        assert!(b.path().exists());
    }

    #[test]
    fn test_create_makes_missing_root() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("nested/scratch");
        let scratch = ScratchSpace::create(&nested).unwrap();
        assert!(scratch.path().starts_with(&nested));
    }
}
