use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::document::ports::FileStore;
use crate::domain::document::ports::FileStoreError;

/// Filesystem blob store rooted at a configured directory. Relative
/// paths are produced by the document service (never by clients), so no
/// traversal handling is needed here.
pub struct FsFileStore {
    root: PathBuf,
}

impl FsFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn absolute(&self, relative_path: &str) -> PathBuf {
        self.root.join(relative_path)
    }
}

fn io_error(e: std::io::Error) -> FileStoreError {
    if e.kind() == ErrorKind::NotFound {
        FileStoreError::NotFound
    } else {
        FileStoreError::Io(e.to_string())
    }
}

#[async_trait]
impl FileStore for FsFileStore {
    async fn save(&self, relative_path: &str, content: &[u8]) -> Result<(), FileStoreError> {
        let path = self.absolute(relative_path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| FileStoreError::Io(e.to_string()))?;
        }
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| FileStoreError::Io(e.to_string()))
    }

    async fn read(&self, relative_path: &str) -> Result<Vec<u8>, FileStoreError> {
        tokio::fs::read(self.absolute(relative_path))
            .await
            .map_err(io_error)
    }

    async fn remove(&self, relative_path: &str) -> Result<(), FileStoreError> {
        tokio::fs::remove_file(self.absolute(relative_path))
            .await
            .map_err(io_error)
    }
}
