//! Input resolution: validate a local PDF path, or materialise a byte
//! buffer to a temporary file.
//!
//! pdfium opens documents from a file-system path here, so in-memory input
//! is written to a [`NamedTempFile`] first. The file is owned by
//! [`with_temp_pdf`] and removed when it returns, whether the wrapped call
//! succeeded, failed, or panicked. The `%PDF` magic bytes are checked up
//! front so callers get `DocumentOpen` rather than an opaque pdfium error.

use crate::error::Pdf2ImageError;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Validate a local file path: it must exist, be readable, and look like a PDF.
pub fn resolve_local(path: &Path) -> Result<PathBuf, Pdf2ImageError> {
    let open_err = |detail: String| Pdf2ImageError::DocumentOpen {
        path: path.to_path_buf(),
        detail,
    };

    if !path.exists() {
        return Err(open_err("file not found".into()));
    }
    if path.is_dir() {
        return Err(open_err("path is a directory".into()));
    }

    match std::fs::File::open(path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            match f.read_exact(&mut magic) {
                Ok(()) if &magic == PDF_MAGIC => {}
                Ok(()) => {
                    return Err(open_err(format!(
                        "not a PDF (first bytes: {magic:?})"
                    )))
                }
                Err(_) => return Err(open_err("file is shorter than a PDF header".into())),
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(open_err("permission denied".into()));
        }
        Err(e) => return Err(open_err(e.to_string())),
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path.to_path_buf())
}

/// Write `bytes` to a fresh temporary file.
///
/// The file is deleted when the returned handle is dropped.
pub fn materialise(bytes: &[u8]) -> Result<NamedTempFile, Pdf2ImageError> {
    let mut tmp = tempfile::Builder::new()
        .prefix("pdf2image-")
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| Pdf2ImageError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.flush())
        .map_err(|e| Pdf2ImageError::Internal(format!("tempfile write: {e}")))?;
    debug!(
        "Materialised {} bytes to {}",
        bytes.len(),
        tmp.path().display()
    );
    Ok(tmp)
}

/// Run `f` against a temporary copy of `bytes` on disk.
///
/// The temporary file exists only for the duration of `f`.
pub fn with_temp_pdf<T, F>(bytes: &[u8], f: F) -> Result<T, Pdf2ImageError>
where
    F: FnOnce(&Path) -> Result<T, Pdf2ImageError>,
{
    let tmp = materialise(bytes)?;
    // `tmp` is dropped (and the file deleted) on every path out of here.
    f(tmp.path())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_document_open_error() {
        let err = resolve_local(Path::new("/definitely/not/a/real/file.pdf")).unwrap_err();
        assert!(
            matches!(err, Pdf2ImageError::DocumentOpen { ref detail, .. } if detail.contains("not found")),
            "got: {err:?}"
        );
    }

    #[test]
    fn non_pdf_is_document_open_error() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(b"GIF89a....").unwrap();
        let err = resolve_local(f.path()).unwrap_err();
        assert!(matches!(err, Pdf2ImageError::DocumentOpen { .. }));
    }

    #[test]
    fn directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve_local(dir.path()).is_err());
    }

    #[test]
    fn pdf_header_is_accepted() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(b"%PDF-1.7\n").unwrap();
        assert_eq!(resolve_local(f.path()).unwrap(), f.path());
    }

    #[test]
    fn temp_file_removed_after_success() {
        let mut seen = PathBuf::new();
        let len = with_temp_pdf(b"%PDF-1.4 body", |p| {
            seen = p.to_path_buf();
            assert!(p.exists());
            Ok(std::fs::read(p).unwrap().len())
        })
        .unwrap();
        assert_eq!(len, 13);
        assert!(!seen.as_os_str().is_empty());
        assert!(!seen.exists(), "temp file must be deleted");
    }

    #[test]
    fn temp_file_removed_after_failure() {
        let mut seen = PathBuf::new();
        let result: Result<(), _> = with_temp_pdf(b"%PDF-1.4 body", |p| {
            seen = p.to_path_buf();
            Err(Pdf2ImageError::Internal("render blew up".into()))
        });
        assert!(result.is_err());
        assert!(!seen.exists(), "temp file must be deleted on error");
    }

    #[test]
    fn temp_file_removed_after_panic() {
        let seen = std::sync::Mutex::new(PathBuf::new());
        let outcome = std::panic::catch_unwind(|| {
            let _: Result<(), _> = with_temp_pdf(b"%PDF-1.4", |p| {
                *seen.lock().unwrap() = p.to_path_buf();
                panic!("boom");
            });
        });
        assert!(outcome.is_err());
        let path = seen.lock().unwrap().clone();
        assert!(!path.exists(), "temp file must be deleted on unwind");
    }
}
