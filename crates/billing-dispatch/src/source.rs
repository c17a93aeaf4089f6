//! # Document Source
//!
//! Shared documents are read only from one configured directory on the API
//! host, where the billing front end writes its generated PDFs.
//!
//! ```text
//! filePath "invoices/inv-7.pdf"            → {documents_dir}/invoices/inv-7.pdf
//! filePath "{documents_dir}/inv-7.pdf"     → accepted as is
//! filePath "/etc/passwd"                   → Invalid (outside the directory)
//! filePath "../secrets.txt"                → Invalid (parent segment)
//! filePath "link-to-etc/passwd"            → Invalid (symlink resolves outside)
//! filePath "missing.pdf"                   → Io(NotFound)
//! ```
//!
//! Escapes are rejected before the filesystem is touched, so a path outside
//! the directory never reports whether it exists.

use std::path::{Component, Path, PathBuf};

use tracing::warn;

use crate::error::{DispatchError, DispatchResult};

const FIELD: &str = "filePath";

/// The directory shared documents must come from.
#[derive(Debug, Clone)]
pub struct DocumentSource {
    dir: PathBuf,
}

impl DocumentSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DocumentSource { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolves a caller-supplied path to a regular file inside the directory.
    ///
    /// ## Errors
    /// - `Invalid` when the path leaves the directory or is not a file
    /// - `Io` when the directory or the file cannot be read
    pub async fn resolve(&self, requested: &Path) -> DispatchResult<PathBuf> {
        let root = tokio::fs::canonicalize(&self.dir).await?;
        let relative = self.relative_part(requested, &root)?;

        let resolved = tokio::fs::canonicalize(root.join(relative)).await?;
        if !resolved.starts_with(&root) {
            warn!(
                requested = %requested.display(),
                resolved = %resolved.display(),
                "Shared document resolves outside the documents directory"
            );
            return Err(invalid(requested));
        }

        if !tokio::fs::metadata(&resolved).await?.is_file() {
            return Err(invalid(requested));
        }
        Ok(resolved)
    }

    /// The part of `requested` below the directory, checked lexically.
    fn relative_part<'a>(&self, requested: &'a Path, root: &Path) -> DispatchResult<&'a Path> {
        let relative = if requested.is_absolute() {
            requested
                .strip_prefix(root)
                .or_else(|_| requested.strip_prefix(&self.dir))
                .map_err(|_| invalid(requested))?
        } else {
            requested
        };

        let plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !plain || relative.as_os_str().is_empty() {
            return Err(invalid(requested));
        }
        Ok(relative)
    }
}

fn invalid(requested: &Path) -> DispatchError {
    DispatchError::invalid(FIELD, requested.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    struct Fixture {
        dir: tempfile::TempDir,
        source: DocumentSource,
    }

    async fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::create_dir_all(dir.path().join("invoices")).await.unwrap();
        tokio::fs::write(dir.path().join("invoices/inv-7.pdf"), b"%PDF").await.unwrap();
        let source = DocumentSource::new(dir.path());
        Fixture { dir, source }
    }

    #[tokio::test]
    async fn test_relative_and_absolute_paths_inside_resolve() {
        let f = fixture().await;
        let expected = tokio::fs::canonicalize(f.dir.path().join("invoices/inv-7.pdf"))
            .await
            .unwrap();

        let relative = f.source.resolve(Path::new("invoices/inv-7.pdf")).await.unwrap();
        assert_eq!(relative, expected);

        let absolute = f.dir.path().join("invoices/./inv-7.pdf");
        assert_eq!(f.source.resolve(&absolute).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_system_files_are_rejected() {
        let f = fixture().await;

        for path in ["/etc/passwd", "/etc/shadow", "/proc/self/environ"] {
            let err = f.source.resolve(Path::new(path)).await.unwrap_err();
            assert!(
                matches!(err, DispatchError::Invalid { field: "filePath", .. }),
                "{path} was not rejected: {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_parent_segments_are_rejected() {
        let f = fixture().await;

        for path in ["../etc/passwd", "invoices/../../etc/passwd", "invoices/.."] {
            let err = f.source.resolve(Path::new(path)).await.unwrap_err();
            assert!(matches!(err, DispatchError::Invalid { .. }), "{path}");
        }
        let escaped = f.dir.path().join("../outside.pdf");
        assert!(matches!(
            f.source.resolve(&escaped).await.unwrap_err(),
            DispatchError::Invalid { .. }
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_out_of_the_directory_is_rejected() {
        let f = fixture().await;
        tokio::fs::symlink("/etc", f.dir.path().join("etc-link")).await.unwrap();

        let err = f
            .source
            .resolve(Path::new("etc-link/passwd"))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Invalid { .. }));
    }

    #[tokio::test]
    async fn test_directories_and_missing_files() {
        let f = fixture().await;

        let err = f.source.resolve(Path::new("invoices")).await.unwrap_err();
        assert!(matches!(err, DispatchError::Invalid { .. }));

        let err = f.source.resolve(Path::new("")).await.unwrap_err();
        assert!(matches!(err, DispatchError::Invalid { .. }));

        match f.source.resolve(Path::new("missing.pdf")).await.unwrap_err() {
            DispatchError::Io(e) => assert_eq!(e.kind(), ErrorKind::NotFound),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
