//! # Object Storage
//!
//! Where shared documents live so a link to them can be sent.
//!
//! Only the local-disk backend ships. It copies the file under the upload
//! directory, which the API serves statically at `/uploads`:
//!
//! ```text
//! upload("/tmp/inv-7.pdf", "inv-7.pdf", "invoices")
//!   → copy to  {upload_dir}/invoices/inv-7.pdf
//!   → url      {public_base_url}/uploads/invoices/inv-7.pdf
//!   → publicId invoices/inv-7.pdf
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::error::{DispatchError, DispatchResult};

/// URL path the upload directory is served under.
pub const UPLOADS_ROUTE: &str = "/uploads";

/// A stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    pub url: String,
    pub public_id: String,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores a copy of `local_file` as `name` inside `folder`.
    async fn upload(&self, local_file: &Path, name: &str, folder: &str)
        -> DispatchResult<StoredObject>;
}

/// Storage on the API host's own disk.
#[derive(Debug, Clone)]
pub struct LocalDiskStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalDiskStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        LocalDiskStorage {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ObjectStorage for LocalDiskStorage {
    async fn upload(
        &self,
        local_file: &Path,
        name: &str,
        folder: &str,
    ) -> DispatchResult<StoredObject> {
        let name = safe_segment("file name", name)?;
        let folder = safe_segment("folder", folder)?;

        let dir = self.root.join(&folder);
        tokio::fs::create_dir_all(&dir).await?;
        let bytes = tokio::fs::copy(local_file, dir.join(&name)).await?;

        let public_id = format!("{folder}/{name}");
        debug!(public_id = %public_id, bytes, "Document stored on local disk");

        Ok(StoredObject {
            url: format!("{}{UPLOADS_ROUTE}/{public_id}", self.public_base_url),
            public_id,
        })
    }
}

/// One path segment, reduced to `[A-Za-z0-9._-]`.
fn safe_segment(field: &'static str, raw: &str) -> DispatchResult<String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        return Err(DispatchError::invalid(field, raw));
    }
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_copies_into_folder() {
        let src_dir = tempfile::tempdir().unwrap();
        let src = src_dir.path().join("inv.pdf");
        tokio::fs::write(&src, b"%PDF-1.4").await.unwrap();

        let root = tempfile::tempdir().unwrap();
        let storage = LocalDiskStorage::new(root.path(), "http://localhost:8080/");

        let stored = storage.upload(&src, "Invoice 7.pdf", "invoices").await.unwrap();
        assert_eq!(stored.public_id, "invoices/Invoice_7.pdf");
        assert_eq!(
            stored.url,
            "http://localhost:8080/uploads/invoices/Invoice_7.pdf"
        );

        let copied = tokio::fs::read(root.path().join("invoices/Invoice_7.pdf"))
            .await
            .unwrap();
        assert_eq!(copied, b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_missing_source_is_io_error() {
        let root = tempfile::tempdir().unwrap();
        let storage = LocalDiskStorage::new(root.path(), "http://localhost:8080");

        let err = storage
            .upload(Path::new("/definitely/not/here.pdf"), "x.pdf", "invoices")
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Io(_)));
    }

    #[test]
    fn test_segments_cannot_escape() {
        assert_eq!(safe_segment("folder", "../etc").unwrap(), ".._etc");
        assert!(safe_segment("folder", "..").is_err());
        assert!(safe_segment("file name", "   ").is_err());
    }
}
