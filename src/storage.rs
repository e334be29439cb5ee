use std::{
    collections::HashMap,
    path::{Component, Path, PathBuf},
};

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Blob store keyed by relative, slash-separated paths.
///
/// Absence of an object is `Ok(None)`, never an error.
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn get_object(&self, key: &str) -> anyhow::Result<Option<Bytes>>;
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()>;
    async fn create_prefix(&self, prefix: &str) -> anyhow::Result<()>;
}

/// Rejects keys that could escape the storage root.
pub fn validate_key(key: &str) -> anyhow::Result<()> {
    if key.is_empty() {
        anyhow::bail!("empty storage key");
    }
    let path = Path::new(key);
    for component in path.components() {
        match component {
            Component::Normal(part) if !part.is_empty() => {}
            _ => anyhow::bail!("invalid storage key {:?}", key),
        }
    }
    if key.split('/').any(|part| part.is_empty() || part == "..") {
        anyhow::bail!("invalid storage key {:?}", key);
    }
    Ok(())
}

/// Directory-backed storage; each key maps to a file under `root`.
#[derive(Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    pub async fn new(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("create data dir {}", root.display()))?;
        Ok(Self { root })
    }

    fn resolve(&self, key: &str) -> anyhow::Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl StorageClient for FsStorage {
    async fn get_object(&self, key: &str) -> anyhow::Result<Option<Bytes>> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("read {}", path.display())),
        }
    }

    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create dir {}", parent.display()))?;
        }

        // write-then-rename so a reader never sees a half-written file
        let tmp = path.with_extension(format!("{}.tmp", Uuid::new_v4()));
        tokio::fs::write(&tmp, &body)
            .await
            .with_context(|| format!("write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;

        debug!(key, content_type, bytes = body.len(), "object stored");
        Ok(())
    }

    async fn create_prefix(&self, prefix: &str) -> anyhow::Result<()> {
        let path = self.resolve(prefix)?;
        tokio::fs::create_dir_all(&path)
            .await
            .with_context(|| format!("create dir {}", path.display()))?;
        Ok(())
    }
}

/// In-process storage used by tests and throwaway runs.
#[derive(Default)]
pub struct MemoryStorage {
    objects: RwLock<HashMap<String, Bytes>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageClient for MemoryStorage {
    async fn get_object(&self, key: &str) -> anyhow::Result<Option<Bytes>> {
        validate_key(key)?;
        Ok(self.objects.read().await.get(key).cloned())
    }

    async fn put_object(&self, key: &str, body: Bytes, _content_type: &str) -> anyhow::Result<()> {
        validate_key(key)?;
        self.objects.write().await.insert(key.to_string(), body);
        Ok(())
    }

    async fn create_prefix(&self, prefix: &str) -> anyhow::Result<()> {
        validate_key(prefix)
    }
}
