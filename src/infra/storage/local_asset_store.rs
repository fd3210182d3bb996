use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::AssetStore;
use crate::error::AppError;

/// Uploaded media kept as flat files under one directory.
pub struct LocalAssetStore {
    root: PathBuf,
}

impl LocalAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of `filename` inside the store, or `None` if it would escape it.
    fn resolve(&self, filename: &str) -> Option<PathBuf> {
        let mut components = Path::new(filename).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => Some(self.root.join(name)),
            _ => None,
        }
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn release(&self, filename: &str) -> Result<(), AppError> {
        let Some(path) = self.resolve(filename) else {
            warn!("Refusing to release asset outside the upload directory: {}", filename);
            return Ok(());
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!("Released asset {}", filename);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::InternalWithMsg(format!("Failed to remove {}: {}", path.display(), e))),
        }
    }
}
