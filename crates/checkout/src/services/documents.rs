//! Document store trait with in-memory and filesystem implementations.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::error::{CheckoutError, Result};

/// Trait for storing files under named directories.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Stores a file, creating the directory as needed. Returns the stored
    /// file name.
    async fn upload(&self, directory: &str, file_name: &str, content: Bytes) -> Result<String>;

    /// Lists file names in a directory. A missing directory is empty.
    async fn list(&self, directory: &str) -> Result<Vec<String>>;

    /// Reads a file.
    async fn download(&self, directory: &str, file_name: &str) -> Result<Bytes>;

    /// Deletes a file. Returns whether it existed.
    async fn delete(&self, directory: &str, file_name: &str) -> Result<bool>;
}

#[async_trait]
impl<T: DocumentStore + ?Sized> DocumentStore for Arc<T> {
    async fn upload(&self, directory: &str, file_name: &str, content: Bytes) -> Result<String> {
        (**self).upload(directory, file_name, content).await
    }

    async fn list(&self, directory: &str) -> Result<Vec<String>> {
        (**self).list(directory).await
    }

    async fn download(&self, directory: &str, file_name: &str) -> Result<Bytes> {
        (**self).download(directory, file_name).await
    }

    async fn delete(&self, directory: &str, file_name: &str) -> Result<bool> {
        (**self).delete(directory, file_name).await
    }
}

fn not_found(directory: &str, file_name: &str) -> CheckoutError {
    CheckoutError::DocumentNotFound {
        directory: directory.to_string(),
        file_name: file_name.to_string(),
    }
}

#[derive(Debug, Default)]
struct InMemoryDocumentState {
    files: BTreeMap<(String, String), Bytes>,
    fail_on_upload: bool,
}

/// In-memory document store for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    state: Arc<RwLock<InMemoryDocumentState>>,
}

impl InMemoryDocumentStore {
    /// Creates a new in-memory document store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the store to fail every upload while set.
    pub async fn set_fail_on_upload(&self, fail: bool) {
        self.state.write().await.fail_on_upload = fail;
    }

    /// Returns the number of stored files.
    pub async fn file_count(&self) -> usize {
        self.state.read().await.files.len()
    }

    /// Returns true if a file exists.
    pub async fn has_file(&self, directory: &str, file_name: &str) -> bool {
        self.state
            .read()
            .await
            .files
            .contains_key(&(directory.to_string(), file_name.to_string()))
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn upload(&self, directory: &str, file_name: &str, content: Bytes) -> Result<String> {
        let mut state = self.state.write().await;
        if state.fail_on_upload {
            return Err(CheckoutError::DocumentStore(
                "File share unavailable".to_string(),
            ));
        }
        state
            .files
            .insert((directory.to_string(), file_name.to_string()), content);
        Ok(file_name.to_string())
    }

    async fn list(&self, directory: &str) -> Result<Vec<String>> {
        let state = self.state.read().await;
        Ok(state
            .files
            .keys()
            .filter(|(dir, _)| dir == directory)
            .map(|(_, name)| name.clone())
            .collect())
    }

    async fn download(&self, directory: &str, file_name: &str) -> Result<Bytes> {
        let state = self.state.read().await;
        state
            .files
            .get(&(directory.to_string(), file_name.to_string()))
            .cloned()
            .ok_or_else(|| not_found(directory, file_name))
    }

    async fn delete(&self, directory: &str, file_name: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        Ok(state
            .files
            .remove(&(directory.to_string(), file_name.to_string()))
            .is_some())
    }
}

/// Document store backed by a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    /// Creates a store rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn directory_path(&self, directory: &str) -> Result<PathBuf> {
        let mut path = self.root.clone();
        for segment in directory.split('/').filter(|s| !s.is_empty()) {
            check_segment(segment)?;
            path.push(segment);
        }
        Ok(path)
    }

    fn file_path(&self, directory: &str, file_name: &str) -> Result<PathBuf> {
        check_segment(file_name)?;
        Ok(self.directory_path(directory)?.join(file_name))
    }
}

/// Rejects names that would escape the store root.
fn check_segment(segment: &str) -> Result<()> {
    if segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains(['/', '\\'])
    {
        return Err(CheckoutError::DocumentStore(format!(
            "invalid path segment: {segment:?}"
        )));
    }
    Ok(())
}

fn io_error(e: std::io::Error) -> CheckoutError {
    CheckoutError::DocumentStore(e.to_string())
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    #[tracing::instrument(skip(self, content), fields(bytes = content.len()))]
    async fn upload(&self, directory: &str, file_name: &str, content: Bytes) -> Result<String> {
        let dir = self.directory_path(directory)?;
        let path = self.file_path(directory, file_name)?;

        tokio::fs::create_dir_all(&dir).await.map_err(io_error)?;
        tokio::fs::write(&path, &content).await.map_err(io_error)?;

        tracing::info!(path = %path.display(), "document stored");
        Ok(file_name.to_string())
    }

    async fn list(&self, directory: &str) -> Result<Vec<String>> {
        let dir = self.directory_path(directory)?;
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
            if entry.file_type().await.map_err(io_error)?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    async fn download(&self, directory: &str, file_name: &str) -> Result<Bytes> {
        let path = self.file_path(directory, file_name)?;
        match tokio::fs::read(&path).await {
            Ok(content) => Ok(Bytes::from(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(not_found(directory, file_name))
            }
            Err(e) => Err(io_error(e)),
        }
    }

    async fn delete(&self, directory: &str, file_name: &str) -> Result<bool> {
        let path = self.file_path(directory, file_name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_roundtrip() {
        let store = InMemoryDocumentStore::new();
        let name = store
            .upload("c1/orders", "A-contract.pdf", Bytes::from_static(b"pdf"))
            .await
            .unwrap();
        assert_eq!(name, "A-contract.pdf");
        assert_eq!(store.list("c1/orders").await.unwrap(), vec![name.clone()]);
        assert!(store.list("c2/orders").await.unwrap().is_empty());

        let content = store.download("c1/orders", &name).await.unwrap();
        assert_eq!(&content[..], b"pdf");

        assert!(store.delete("c1/orders", &name).await.unwrap());
        assert!(!store.delete("c1/orders", &name).await.unwrap());
    }

    #[tokio::test]
    async fn in_memory_fail_on_upload() {
        let store = InMemoryDocumentStore::new();
        store.set_fail_on_upload(true).await;

        let result = store
            .upload("c1/orders", "A-contract.pdf", Bytes::from_static(b"pdf"))
            .await;
        assert!(result.is_err());
        assert_eq!(store.file_count().await, 0);
    }

    #[tokio::test]
    async fn fs_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsDocumentStore::new(dir.path());

        store
            .upload("c1/orders", "B-contract.png", Bytes::from_static(b"png"))
            .await
            .unwrap();
        store
            .upload("c1/orders", "A-contract.pdf", Bytes::from_static(b"pdf"))
            .await
            .unwrap();

        assert_eq!(
            store.list("c1/orders").await.unwrap(),
            vec!["A-contract.pdf".to_string(), "B-contract.png".to_string()]
        );
        assert!(dir.path().join("c1/orders/A-contract.pdf").exists());

        let content = store.download("c1/orders", "B-contract.png").await.unwrap();
        assert_eq!(&content[..], b"png");

        assert!(store.delete("c1/orders", "B-contract.png").await.unwrap());
        assert!(matches!(
            store.download("c1/orders", "B-contract.png").await,
            Err(CheckoutError::DocumentNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn fs_missing_directory_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsDocumentStore::new(dir.path());
        assert!(store.list("nobody/orders").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn fs_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsDocumentStore::new(dir.path());

        assert!(store
            .upload("../escape", "x.pdf", Bytes::from_static(b"x"))
            .await
            .is_err());
        assert!(store.download("c1/orders", "../secret").await.is_err());
    }
}
