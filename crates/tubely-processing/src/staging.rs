//! Scratch files for in-flight uploads.
//!
//! A [`StagedFile`] owns its path: dropping it unlinks the file, so every exit path
//! of a request releases what it staged. [`StagedFile::dispose`] does the same
//! eagerly and logs unlink failures.

use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncWriteExt};

use crate::error::StagingError;
use crate::video::toolkit::validate_path;

const STAGING_PREFIX: &str = "tubely-upload-";
const STAGING_SUFFIX: &str = ".mp4";

/// Directory in which uploads are staged.
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create `dir` if needed and resolve it to a canonical absolute path.
    ///
    /// Fails when the resolved path would be refused by the media tools, so a bad
    /// `STAGING_DIR` is reported at startup rather than on the first upload.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StagingError> {
        let dir = dir.as_ref();
        let create_failed = |source| StagingError::Create {
            dir: dir.display().to_string(),
            source,
        };
        tokio::fs::create_dir_all(dir).await.map_err(create_failed)?;
        let canonical = tokio::fs::canonicalize(dir).await.map_err(create_failed)?;

        validate_path(&canonical.to_string_lossy()).map_err(|e| StagingError::UnusableDir {
            dir: canonical.display().to_string(),
            reason: e.to_string(),
        })?;

        tracing::info!(dir = %canonical.display(), "Staging area ready");
        Ok(Self { dir: canonical })
    }

    /// Copy `reader` to a uniquely named file until EOF.
    ///
    /// On error the partially written file is unlinked before returning.
    pub async fn stage<R>(&self, reader: &mut R) -> Result<StagedFile, StagingError>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let named = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(STAGING_SUFFIX)
            .tempfile_in(&self.dir)
            .map_err(|source| StagingError::Create {
                dir: self.dir.display().to_string(),
                source,
            })?;
        let (std_file, path) = named.into_parts();
        let mut file = File::from_std(std_file);

        let size = tokio::io::copy(reader, &mut file)
            .await
            .map_err(StagingError::Write)?;
        file.flush().await.map_err(StagingError::Write)?;
        file.sync_all().await.map_err(StagingError::Write)?;

        tracing::debug!(path = %path.display(), size_bytes = size, "Upload staged");

        Ok(StagedFile { path, size })
    }
}

/// Exclusively owned scratch file.
#[derive(Debug)]
pub struct StagedFile {
    path: TempPath,
    size: u64,
}

impl StagedFile {
    /// Take ownership of a file produced by someone else (e.g. an external tool),
    /// so it is removed with the same guarantees as a staged upload. The file does
    /// not have to exist yet. Relative paths are resolved against the current
    /// directory now, so a later chdir cannot redirect the unlink.
    pub fn adopt(path: impl Into<PathBuf>) -> Result<Self, StagingError> {
        let path = path.into();
        let path = TempPath::try_from_path(&path).map_err(|source| StagingError::Adopt {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self { path, size: 0 })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size in bytes as staged. Zero for adopted files until [`refresh_size`] runs.
    ///
    /// [`refresh_size`]: StagedFile::refresh_size
    pub fn size(&self) -> u64 {
        self.size
    }

    pub async fn refresh_size(&mut self) -> Result<u64, StagingError> {
        let metadata = tokio::fs::metadata(&*self.path)
            .await
            .map_err(StagingError::Read)?;
        self.size = metadata.len();
        Ok(self.size)
    }

    /// Open a fresh read handle positioned at the start of the file.
    pub async fn open(&self) -> Result<File, StagingError> {
        File::open(&*self.path).await.map_err(StagingError::Read)
    }

    /// Unlink the file now.
    pub fn dispose(self) {
        let shown = self.path.display().to_string();
        match self.path.close() {
            Ok(()) => tracing::debug!(path = %shown, "Staged file removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(error = %e, path = %shown, "Failed to remove staged file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn test_stage_then_read_back_from_start() {
        let dir = TempDir::new().unwrap();
        let area = StagingArea::new(dir.path());
        let payload: Vec<u8> = (0..=255u8).cycle().take(70_000).collect();

        let staged = area
            .stage(&mut std::io::Cursor::new(payload.clone()))
            .await
            .unwrap();
        assert_eq!(staged.size(), payload.len() as u64);

        for _ in 0..2 {
            let mut read_back = Vec::new();
            staged.open().await.unwrap().read_to_end(&mut read_back).await.unwrap();
            assert_eq!(read_back, payload);
        }

        let name = staged.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(STAGING_PREFIX));
        assert!(name.ends_with(STAGING_SUFFIX));
    }

    #[tokio::test]
    async fn test_dispose_and_drop_remove_file() {
        let dir = TempDir::new().unwrap();
        let area = StagingArea::new(dir.path());

        let disposed = area.stage(&mut &b"abc"[..]).await.unwrap();
        let dropped = area.stage(&mut &b"def"[..]).await.unwrap();
        assert_ne!(disposed.path(), dropped.path());
        assert_eq!(entries(dir.path()), 2);

        disposed.dispose();
        assert_eq!(entries(dir.path()), 1);

        drop(dropped);
        assert_eq!(entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_adopted_missing_file_disposes_quietly() {
        let dir = TempDir::new().unwrap();
        let adopted = StagedFile::adopt(dir.path().join("never-written.processing")).unwrap();
        adopted.dispose();
        assert_eq!(entries(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_adopted_relative_path_is_made_absolute() {
        let adopted = StagedFile::adopt("relative-output.processing").unwrap();
        assert!(adopted.path().is_absolute());
        assert!(adopted.path().ends_with("relative-output.processing"));
        adopted.dispose();
    }

    #[tokio::test]
    async fn test_disposed_output_of_external_writer_is_removed() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("written-later.processing");
        let adopted = StagedFile::adopt(&target).unwrap();
        std::fs::write(&target, b"remuxed").unwrap();

        adopted.dispose();
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_open_resolves_parent_segments() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();
        let area = StagingArea::open(dir.path().join("a").join("..").join("staging"))
            .await
            .unwrap();

        let staged = area.stage(&mut &b"abc"[..]).await.unwrap();
        let path = staged.path().to_string_lossy().to_string();
        assert!(!path.contains(".."));
        assert!(validate_path(&path).is_ok());
        assert!(dir.path().join("staging").is_dir());
    }

    #[tokio::test]
    async fn test_open_rejects_dir_media_tools_would_refuse() {
        let dir = TempDir::new().unwrap();
        let result = StagingArea::open(dir.path().join("uploads&more")).await;
        assert!(matches!(result, Err(StagingError::UnusableDir { .. })));
    }

    #[tokio::test]
    async fn test_stage_into_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let area = StagingArea::new(dir.path().join("missing"));
        let result = area.stage(&mut &b"abc"[..]).await;
        assert!(matches!(result, Err(StagingError::Create { .. })));
    }
}
