use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Document '{document}' is corrupt: {reason}")]
    Corrupt { document: String, reason: String },
    #[error("Invalid document name: {0}")]
    InvalidName(String),
    #[error("Item not found: {0}")]
    NotFound(String),
}

/// What a read does when a document exists but is not valid JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorruptionPolicy {
    /// Overwrite the file with the document's default shape and return that.
    #[default]
    Repair,
    /// Leave the file alone and fail with [`StoreError::Corrupt`].
    Reject,
}

/// A named JSON file with a known default shape.
pub trait Document: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// File stem under the data directory.
    const NAME: &'static str;

    fn default_shape() -> Self;
}

/// On-disk JSON documents, one file per document name.
pub struct JsonStore {
    base_path: PathBuf,
    policy: CorruptionPolicy,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl JsonStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            policy: CorruptionPolicy::default(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_policy(mut self, policy: CorruptionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn initialize(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.base_path).await?;
        tracing::info!("JSON store initialized at {:?}", self.base_path);
        Ok(())
    }

    pub fn document_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        if name.is_empty() || name.contains("..") || name.contains('/') || name.contains('\\') {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self.base_path.join(format!("{}.json", name)))
    }

    /// Load a document, creating it with its default shape on first access.
    pub async fn read<D: Document>(&self) -> Result<D, StoreError> {
        let lock = self.lock_for(D::NAME);
        let _guard = lock.lock().await;
        self.read_unlocked::<D>().await
    }

    /// Replace a document wholesale.
    pub async fn write<D: Document>(&self, document: &D) -> Result<(), StoreError> {
        let lock = self.lock_for(D::NAME);
        let _guard = lock.lock().await;
        self.write_unlocked(D::NAME, document).await
    }

    /// Read-modify-write under the document's lock. Nothing is written when
    /// the closure fails.
    pub async fn update<D, R, E, F>(&self, mutate: F) -> Result<R, E>
    where
        D: Document,
        E: From<StoreError>,
        F: FnOnce(&mut D) -> Result<R, E>,
    {
        let lock = self.lock_for(D::NAME);
        let _guard = lock.lock().await;
        let mut document = self.read_unlocked::<D>().await?;
        let result = mutate(&mut document)?;
        self.write_unlocked(D::NAME, &document).await?;
        Ok(result)
    }

    /// Untyped read with a caller-supplied default shape.
    pub async fn read_value(&self, name: &str, default: Value) -> Result<Value, StoreError> {
        let lock = self.lock_for(name);
        let _guard = lock.lock().await;
        match self.load_raw::<Value>(name).await? {
            Loaded::Parsed(value) => Ok(value),
            Loaded::Missing => {
                self.write_unlocked(name, &default).await?;
                Ok(default)
            }
            Loaded::Unparseable(reason) => {
                self.recover(name, reason, default).await
            }
            Loaded::Unrecognized(reason) => Err(unrecognized(name, reason)),
        }
    }

    pub async fn write_value(&self, name: &str, value: &Value) -> Result<(), StoreError> {
        let lock = self.lock_for(name);
        let _guard = lock.lock().await;
        self.write_unlocked(name, value).await
    }

    async fn read_unlocked<D: Document>(&self) -> Result<D, StoreError> {
        match self.load_raw::<D>(D::NAME).await? {
            Loaded::Parsed(document) => {
                tracing::debug!("Loaded document: {}", D::NAME);
                Ok(document)
            }
            Loaded::Missing => {
                tracing::info!("Creating document with defaults: {}", D::NAME);
                let document = D::default_shape();
                self.write_unlocked(D::NAME, &document).await?;
                Ok(document)
            }
            Loaded::Unparseable(reason) => {
                self.recover(D::NAME, reason, D::default_shape()).await
            }
            Loaded::Unrecognized(reason) => Err(unrecognized(D::NAME, reason)),
        }
    }

    async fn recover<T: Serialize>(
        &self,
        name: &str,
        reason: String,
        default: T,
    ) -> Result<T, StoreError> {
        match self.policy {
            CorruptionPolicy::Repair => {
                tracing::warn!("Resetting corrupt document {} to defaults: {}", name, reason);
                self.write_unlocked(name, &default).await?;
                Ok(default)
            }
            CorruptionPolicy::Reject => Err(StoreError::Corrupt {
                document: name.to_string(),
                reason,
            }),
        }
    }

    async fn load_raw<T: DeserializeOwned>(&self, name: &str) -> Result<Loaded<T>, StoreError> {
        let path = self.document_path(name)?;
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Loaded::Missing),
            Err(e) => return Ok(Loaded::Unparseable(e.to_string())),
        };
        let value: Value = match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => return Ok(Loaded::Unparseable(e.to_string())),
        };
        // Valid JSON is never overwritten, whatever its shape
        Ok(match serde_json::from_value(value) {
            Ok(parsed) => Loaded::Parsed(parsed),
            Err(e) => Loaded::Unrecognized(e.to_string()),
        })
    }

    async fn write_unlocked<T: Serialize + ?Sized>(
        &self,
        name: &str,
        document: &T,
    ) -> Result<(), StoreError> {
        let path = self.document_path(name)?;
        fs::create_dir_all(&self.base_path).await?;

        // Atomic write: write to temp file, then rename
        let temp_path = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(document)?;

        fs::write(&temp_path, content).await?;
        fs::rename(&temp_path, &path).await?;

        tracing::debug!("Saved document: {}", name);
        Ok(())
    }

    fn lock_for(&self, name: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.locks
            .lock()
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

enum Loaded<T> {
    Parsed(T),
    Missing,
    Unparseable(String),
    Unrecognized(String),
}

fn unrecognized(name: &str, reason: String) -> StoreError {
    tracing::error!("Document {} is valid JSON of an unexpected shape: {}", name, reason);
    StoreError::Corrupt {
        document: name.to_string(),
        reason,
    }
}
