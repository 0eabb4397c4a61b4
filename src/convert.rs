//! Eager (whole-document) conversion and metadata entry points.
//!
//! The blocking functions run start-to-finish on the caller's thread. The
//! `_async` variants move the same work onto tokio's blocking pool, since
//! pdfium calls are CPU-bound and must not stall the async executor. Use
//! [`crate::stream::convert_stream`] to receive pages as they are rendered.

use crate::config::{ConversionConfig, InfoConfig};
use crate::error::Pdf2ImageError;
use crate::output::{ConvertedPages, PdfInfo};
use crate::pipeline::collect::{self, OutputFilter};
use crate::pipeline::{engine, input, metadata, render};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Convert a PDF file into one image per selected page.
///
/// # Returns
/// * [`ConvertedPages::Images`] — decoded images in page order (default)
/// * [`ConvertedPages::Paths`]  — paths of the written files (`paths_only`)
///
/// Without `output_dir` the images are written to a temporary directory
/// that is removed before this function returns.
///
/// # Errors
/// * [`Pdf2ImageError::DocumentOpen`] — missing, unreadable or non-PDF source
/// * [`Pdf2ImageError::ToolUnavailable`] — pdfium library cannot be bound
/// * [`Pdf2ImageError::Timeout`] — `timeout_secs` elapsed
pub fn convert_from_path(
    pdf_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConvertedPages, Pdf2ImageError> {
    let start = Instant::now();
    config.validate()?;
    let pdf_path = input::resolve_local(pdf_path.as_ref())?;
    info!("Starting conversion: {}", pdf_path.display());

    // ── Output directory ─────────────────────────────────────────────────
    // `_temp_dir` owns the auto-created directory; dropping it removes it.
    let (output_dir, _temp_dir) = match config.output_dir {
        Some(ref dir) => {
            std::fs::create_dir_all(dir).map_err(|source| Pdf2ImageError::OutputDir {
                path: dir.clone(),
                source,
            })?;
            (dir.clone(), None)
        }
        None => {
            let tmp = tempfile::Builder::new()
                .prefix("pdf2image-")
                .tempdir()
                .map_err(|source| Pdf2ImageError::OutputDir {
                    path: std::env::temp_dir(),
                    source,
                })?;
            (tmp.path().to_path_buf(), Some(tmp))
        }
    };
    debug!("Writing pages to {}", output_dir.display());

    // ── Render ───────────────────────────────────────────────────────────
    let pdfium = engine::engine(config.pdfium_library_path.as_deref())?;
    let written = render::render_to_dir(pdfium, &pdf_path, &output_dir, config)?;
    let count = written.len();

    // ── Collect ──────────────────────────────────────────────────────────
    // Only the files written above; a reused directory may hold others.
    let pages = collect::load_pages(written, config.paths_only)?;

    info!(
        "Conversion complete: {} pages in {}ms",
        count,
        start.elapsed().as_millis()
    );
    Ok(pages)
}

/// Convert an in-memory PDF.
///
/// The bytes are written to a temporary file that is deleted when this
/// function returns, on success and on error alike.
///
/// # Example
/// ```rust,no_run
/// use edgequake_pdf2image::{convert_from_bytes, ConversionConfig};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes: Vec<u8> = std::fs::read("document.pdf")?;
/// let pages = convert_from_bytes(&bytes, &ConversionConfig::default())?;
/// println!("{} pages", pages.len());
/// # Ok(())
/// # }
/// ```
pub fn convert_from_bytes(
    bytes: &[u8],
    config: &ConversionConfig,
) -> Result<ConvertedPages, Pdf2ImageError> {
    input::with_temp_pdf(bytes, |path| convert_from_path(path, config))
}

/// Async wrapper around [`convert_from_path`].
pub async fn convert_from_path_async(
    pdf_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConvertedPages, Pdf2ImageError> {
    let path = pdf_path.as_ref().to_path_buf();
    let config = config.clone();
    tokio::task::spawn_blocking(move || convert_from_path(&path, &config))
        .await
        .map_err(|e| Pdf2ImageError::Internal(format!("Render task panicked: {}", e)))?
}

/// Async wrapper around [`convert_from_bytes`].
pub async fn convert_from_bytes_async(
    bytes: Vec<u8>,
    config: &ConversionConfig,
) -> Result<ConvertedPages, Pdf2ImageError> {
    let config = config.clone();
    tokio::task::spawn_blocking(move || convert_from_bytes(&bytes, &config))
        .await
        .map_err(|e| Pdf2ImageError::Internal(format!("Render task panicked: {}", e)))?
}

/// Read the info dictionary and page count of a PDF file.
///
/// # Errors
/// * [`Pdf2ImageError::DocumentOpen`] — missing, unreadable or non-PDF source
/// * [`Pdf2ImageError::PageCount`] — the page tree could not be resolved
/// * [`Pdf2ImageError::ToolUnavailable`] — pdfium backend selected but unavailable
pub fn pdfinfo_from_path(
    pdf_path: impl AsRef<Path>,
    config: &InfoConfig,
) -> Result<PdfInfo, Pdf2ImageError> {
    let pdf_path = input::resolve_local(pdf_path.as_ref())?;
    metadata::read_info(&pdf_path, config)
}

/// Read the info dictionary and page count of an in-memory PDF.
pub fn pdfinfo_from_bytes(bytes: &[u8], config: &InfoConfig) -> Result<PdfInfo, Pdf2ImageError> {
    metadata::read_info_from_bytes(bytes, config)
}

/// Async wrapper around [`pdfinfo_from_path`].
pub async fn pdfinfo_from_path_async(
    pdf_path: impl AsRef<Path>,
    config: &InfoConfig,
) -> Result<PdfInfo, Pdf2ImageError> {
    let path: PathBuf = pdf_path.as_ref().to_path_buf();
    let config = config.clone();
    tokio::task::spawn_blocking(move || pdfinfo_from_path(&path, &config))
        .await
        .map_err(|e| Pdf2ImageError::Internal(format!("Metadata task panicked: {}", e)))?
}

/// Read back a directory written by an earlier conversion (or any
/// directory of images) in file-name order.
pub fn load_from_dir(
    dir: impl AsRef<Path>,
    extension: &str,
    paths_only: bool,
) -> Result<ConvertedPages, Pdf2ImageError> {
    collect::collect_pages(dir.as_ref(), &OutputFilter::extension(extension), paths_only)
}
