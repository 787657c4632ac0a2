use std::path::{Path, PathBuf};

use axum::body::Bytes;
use futures::{Stream, StreamExt};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use super::{FsError, PathResolver};

/// Characters never accepted in an uploaded file or new directory name.
pub const INVALID_NAME_CHARS: &[char] = &['\\', '/', ':', '*', '?', '<', '>', '|'];

/// Rejects names that could escape the target directory or are reserved on common filesystems.
pub fn validate_filename(name: &str) -> Result<(), FsError> {
    if name.is_empty() || name == "." || name == ".." {
        return Err(FsError::InvalidFilename(format!("'{}' is not a usable name", name)));
    }
    if name.trim() != name {
        return Err(FsError::InvalidFilename(format!("'{}' starts or ends with whitespace", name)));
    }
    if name.contains('\0') || name.contains(INVALID_NAME_CHARS) {
        return Err(FsError::InvalidFilename(format!("'{}' contains a reserved character", name)));
    }
    Ok(())
}

/// Result of a successful upload.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Persists uploaded file streams below the root.
///
/// Uploads never overwrite: the destination is opened with `create_new`, so two
/// concurrent uploads of the same name cannot both succeed. A failed upload removes
/// whatever it had written so far.
#[derive(Debug, Clone)]
pub struct UploadManager {
    resolver: PathResolver,
    max_bytes: u64,
}

impl UploadManager {
    pub fn new(resolver: PathResolver, max_bytes: u64) -> Self {
        Self { resolver, max_bytes }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Streams `content` into `<target_logical_dir>/<filename>`.
    ///
    /// # Errors
    ///
    /// * [`FsError::InvalidFilename`] before anything touches the filesystem
    /// * [`FsError::InvalidPath`] if the target directory escapes the root
    /// * [`FsError::NotFound`] if the target directory does not exist
    /// * [`FsError::AlreadyExists`] if the destination is taken
    /// * [`FsError::PayloadTooLarge`] once the stream exceeds `max_bytes`
    pub async fn store<S>(&self, target_logical_dir: &str, filename: &str, content: S) -> Result<StoredUpload, FsError>
    where
        S: Stream<Item = Result<Bytes, FsError>>,
    {
        validate_filename(filename)?;
        let dir = self.resolver.resolve(target_logical_dir)?;

        match fs::metadata(&dir).await {
            Ok(md) if md.is_dir() => {}
            Ok(_) => return Err(FsError::NotFound(format!("{} is not a directory", target_logical_dir))),
            Err(e) => return Err(FsError::from_io(e, target_logical_dir)),
        }

        let dest = dir.join(filename);
        if fs::try_exists(&dest).await.unwrap_or(false) {
            return Err(FsError::AlreadyExists(filename.to_string()));
        }

        // create_new closes the gap between the check above and the create.
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&dest)
            .await
            .map_err(|e| FsError::from_io(e, filename))?;

        match self.copy_into(&mut file, content).await {
            Ok(bytes) => {
                tracing::info!("File uploaded successfully: {} ({} bytes)", dest.display(), bytes);
                Ok(StoredUpload { path: dest, bytes })
            }
            Err(e) => {
                drop(file);
                discard_partial(&dest).await;
                Err(e)
            }
        }
    }

    async fn copy_into<S>(&self, file: &mut fs::File, content: S) -> Result<u64, FsError>
    where
        S: Stream<Item = Result<Bytes, FsError>>,
    {
        let mut content = std::pin::pin!(content);
        let mut written: u64 = 0;
        while let Some(chunk) = content.next().await {
            let chunk = chunk?;
            let next_total = written.saturating_add(chunk.len() as u64);
            if next_total > self.max_bytes {
                return Err(FsError::PayloadTooLarge { limit: self.max_bytes });
            }
            file.write_all(&chunk).await?;
            written = next_total;
        }
        file.flush().await?;
        file.sync_all().await?;
        Ok(written)
    }
}

async fn discard_partial(dest: &Path) {
    if let Err(e) = fs::remove_file(dest).await {
        tracing::error!("Failed to remove partial upload {}: {}", dest.display(), e);
    } else {
        tracing::warn!("Removed partial upload {}", dest.display());
    }
}
