//! Error types for the edgequake-pdf2image library.
//!
//! Every failure is fatal for the call that hit it: there are no per-page
//! partial results and no retries. The variants are grouped by the stage
//! that failed so callers can tell "could not open" from "could not count
//! pages" from "could not render" without parsing messages.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the edgequake-pdf2image library.
#[derive(Debug, Error)]
pub enum Pdf2ImageError {
    // ── Open errors ───────────────────────────────────────────────────────
    /// The source is missing, unreadable, not a PDF, or rejected by the parser.
    #[error("Cannot open PDF '{path}': {detail}")]
    DocumentOpen { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it as the user or owner password.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    // ── Metadata errors ───────────────────────────────────────────────────
    /// The page tree or its `/Count` could not be resolved.
    #[error("Unable to get page count of '{path}': {detail}")]
    PageCount { path: PathBuf, detail: String },

    /// The rendering or parsing library itself cannot run.
    #[error(
        "{tool} is unavailable: {detail}\n\n\
You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (file or directory).\n\
  • Place libpdfium next to the executable or in the working directory.\n\
  • Install pdfium system-wide so the dynamic loader can find it.\n"
    )]
    ToolUnavailable { tool: String, detail: String },

    // ── Render errors ─────────────────────────────────────────────────────
    /// The configured deadline passed before all pages were rendered.
    #[error("Conversion timed out after {secs}s ({pages_done} pages rendered)")]
    Timeout { secs: u64, pages_done: usize },

    /// Selection does not contain any page of the document.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not encode or write a page image.
    #[error("Failed to write image '{path}': {source}")]
    ImageWriteFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Could not read back a page image.
    #[error("Failed to load image '{path}': {source}")]
    ImageLoadFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Could not create or list an output directory.
    #[error("Output directory '{path}' is not usable: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2ImageError {
    /// True for every failure that happened while opening the document.
    pub fn is_open_error(&self) -> bool {
        matches!(
            self,
            Pdf2ImageError::DocumentOpen { .. }
                | Pdf2ImageError::PasswordRequired { .. }
                | Pdf2ImageError::WrongPassword { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_open_display() {
        let e = Pdf2ImageError::DocumentOpen {
            path: PathBuf::from("/tmp/missing.pdf"),
            detail: "file not found".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("missing.pdf"), "got: {msg}");
        assert!(msg.contains("file not found"), "got: {msg}");
        assert!(e.is_open_error());
    }

    #[test]
    fn timeout_display() {
        let e = Pdf2ImageError::Timeout {
            secs: 5,
            pages_done: 3,
        };
        assert!(e.to_string().contains("5s"));
        assert!(e.to_string().contains("3 pages"));
        assert!(!e.is_open_error());
    }

    #[test]
    fn tool_unavailable_mentions_env_var() {
        let e = Pdf2ImageError::ToolUnavailable {
            tool: "PDFium".into(),
            detail: "library not found".into(),
        };
        let msg = e.to_string();
        assert!(msg.starts_with("PDFium is unavailable"));
        assert!(msg.contains("PDFIUM_LIB_PATH"));
    }

    #[test]
    fn page_count_is_distinct_from_tool_unavailable() {
        let e = Pdf2ImageError::PageCount {
            path: PathBuf::from("a.pdf"),
            detail: "no /Count".into(),
        };
        assert!(matches!(e, Pdf2ImageError::PageCount { .. }));
        assert!(!matches!(e, Pdf2ImageError::ToolUnavailable { .. }));
    }
}
