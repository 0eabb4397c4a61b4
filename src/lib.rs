//! # edgequake-pdf2image
//!
//! Rasterise PDF pages into images, and read PDF metadata.
//!
//! Every selected page becomes one image at a chosen resolution and format.
//! Callers get the decoded images back in page order, or only the paths of
//! the files written to an output directory.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF (path or bytes)
//!  │
//!  ├─ 1. Input    validate the path, or spill bytes to a temp file
//!  ├─ 2. Engine   bind pdfium once per process
//!  ├─ 3. Render   rasterise selected pages (dpi / size / grayscale / alpha)
//!  ├─ 4. Encode   write <prefix>_<nn>.<ext> with zero-padded page numbers
//!  └─ 5. Collect  read the files back in page order (images or paths)
//! ```
//!
//! Metadata (`pdfinfo_*`) takes a separate path: lopdf parses the trailer
//! info dictionary and page tree without touching pdfium.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf2image::{convert_from_path, pdfinfo_from_path, ConversionConfig, InfoConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let info = pdfinfo_from_path("document.pdf", &InfoConfig::default())?;
//!     println!("{} pages", info.pages);
//!
//!     let config = ConversionConfig::builder().dpi(150).build()?;
//!     let pages = convert_from_path("document.pdf", &config)?;
//!     for (i, img) in pages.images().unwrap_or_default().iter().enumerate() {
//!         println!("page {}: {}x{}", i + 1, img.width(), img.height());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2image` binary (clap + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-pdf2image = { version = "0.1", default-features = false }
//! ```
//!
//! ## Locating pdfium
//!
//! Rendering needs the pdfium shared library. It is looked up at
//! `ConversionConfig::pdfium_library_path`, then `$PDFIUM_LIB_PATH`, then
//! the working directory, then the system library path. Metadata reads do
//! not need it.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ConversionConfig, ConversionConfigBuilder, InfoConfig, MetadataBackend, OutputFormat,
    PageSelection, TargetSize,
};
pub use convert::{
    convert_from_bytes, convert_from_bytes_async, convert_from_path, convert_from_path_async,
    load_from_dir, pdfinfo_from_bytes, pdfinfo_from_path, pdfinfo_from_path_async,
};
pub use error::Pdf2ImageError;
pub use output::{ConvertedPages, PdfInfo, RenderedPage};
pub use pipeline::collect::{collect_pages, OutputFilter};
pub use progress::{NoopProgressCallback, ProgressCallback, RenderProgressCallback};
pub use stream::{convert_stream, convert_stream_from_bytes, PageStream};
