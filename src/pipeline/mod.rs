//! Pipeline stages for PDF-to-image conversion.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own and the rendering backend can change without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ engine ──▶ render ──▶ encode ──▶ collect
//! (path/bytes) (pdfium)  (bitmap)   (file)     (images/paths)
//!
//! input ──▶ metadata                (independent path)
//! ```
//!
//! 1. [`input`]    — validate a local path, or materialise bytes to a temp file
//! 2. [`engine`]   — bind the pdfium library once per process
//! 3. [`render`]   — rasterise selected pages at the configured DPI or size
//! 4. [`encode`]   — name, encode and write each page image
//! 5. [`collect`]  — read the output directory back in page order
//! 6. [`metadata`] — info dictionary + page count via lopdf (or pdfium)

pub mod collect;
pub mod encode;
pub mod engine;
pub mod input;
pub mod metadata;
pub mod render;
