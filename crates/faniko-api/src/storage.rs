use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use uuid::Uuid;

/// Flat on-disk directory holding KYC documents and post media.
///
/// Files are stored as `{field}-{uuid}{ext}` and served back verbatim under
/// `/uploads/{name}`.
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub async fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("Upload directory: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Write an uploaded file and return the name it was stored under.
    pub async fn save(&self, field: &str, original_name: Option<&str>, data: &[u8]) -> Result<String> {
        let name = stored_name(field, original_name);
        let path = self.file_path(&name);

        let mut file = fs::File::create(&path).await?;
        file.write_all(data).await?;
        file.flush().await?;

        info!("Stored upload {} ({} bytes)", name, data.len());
        Ok(name)
    }

    pub async fn delete_file(&self, name: &str) -> Result<()> {
        if name.contains(['/', '\\']) || name.starts_with('.') {
            bail!("Refusing to delete suspicious upload name {:?}", name);
        }
        match fs::remove_file(self.file_path(name)).await {
            Ok(()) => {
                info!("Deleted upload {}", name);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Upload {} already gone", name);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Best-effort removal of files written for a request that was rejected.
    pub async fn discard(&self, names: impl IntoIterator<Item = &str>) {
        for name in names {
            if let Err(e) = self.delete_file(name).await {
                warn!("Failed to discard upload {}: {}", name, e);
            }
        }
    }
}

/// `{field}-{uuid}{ext}`, keeping only a plain alphanumeric extension of the
/// client's filename.
fn stored_name(field: &str, original_name: Option<&str>) -> String {
    let field: String = field
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    let ext = original_name
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    format!("{}-{}{}", field, Uuid::new_v4(), ext)
}
