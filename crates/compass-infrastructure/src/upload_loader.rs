//! Reads user-selected files into `UploadFile`s.

use compass_core::analysis::UploadFile;
use compass_core::error::{CompassError, Result};
use std::path::{Path, PathBuf};

/// Reads a single file and guesses its MIME type from the extension.
pub async fn load_upload(path: &Path) -> Result<UploadFile> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| CompassError::io(format!("Failed to read {:?}: {}", path, e)))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| CompassError::invalid_input(format!("Not a file path: {:?}", path)))?;

    let mime_type = mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string());

    tracing::debug!(
        "[Uploads] Loaded {} ({} bytes, {:?})",
        file_name,
        bytes.len(),
        mime_type
    );
    Ok(UploadFile::new(file_name, mime_type, bytes))
}

/// Reads every path in order; the first failure aborts.
pub async fn load_uploads(paths: &[PathBuf]) -> Result<Vec<UploadFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(load_upload(path).await?);
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_upload_guesses_mime() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("policy.txt");
        std::fs::write(&path, "Integrity first").unwrap();

        let file = load_upload(&path).await.unwrap();
        assert_eq!(file.file_name, "policy.txt");
        assert_eq!(file.mime_type, "text/plain");
        assert_eq!(file.bytes, b"Integrity first");
    }

    #[tokio::test]
    async fn test_unknown_extension_falls_back_to_octet_stream() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dossier.zzunknown");
        std::fs::write(&path, [0u8, 1, 2]).unwrap();

        let file = load_upload(&path).await.unwrap();
        assert_eq!(file.mime_type, "application/octet-stream");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_uploads(&[temp_dir.path().join("absent.pdf")])
            .await
            .unwrap_err();
        assert!(err.is_io());
    }
}
