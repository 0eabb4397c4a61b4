//! Configuration types for PDF-to-image conversion and metadata reads.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Metadata reads take the much smaller
//! [`InfoConfig`]. Every option that is accepted is wired into the pipeline;
//! options that only make sense together (transparency and PNG/TIFF, paths
//! and a persistent output directory) are checked in
//! [`ConversionConfigBuilder::build`].

use crate::error::Pdf2ImageError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Lowest accepted rendering resolution.
pub const MIN_DPI: u32 = 18;
/// Highest accepted rendering resolution.
pub const MAX_DPI: u32 = 2400;

/// Configuration for a PDF-to-image conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_pdf2image::{ConversionConfig, OutputFormat};
///
/// let config = ConversionConfig::builder()
///     .dpi(150)
///     .format(OutputFormat::Jpeg)
///     .thread_count(4)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Rendering DPI. Range: 18–2400. Default: 200.
    ///
    /// PDF user space is 72 points per inch, so a US-Letter page at 200 DPI
    /// becomes 1700 × 2200 px. Ignored when [`ConversionConfig::size`] is set.
    pub dpi: u32,

    /// Directory receiving the page images. Default: None.
    ///
    /// When None, images are written to a temporary directory owned by the
    /// call, loaded into memory, and the directory is removed before the
    /// call returns.
    pub output_dir: Option<PathBuf>,

    /// Page selection. Default: All pages.
    pub pages: PageSelection,

    /// Encoded image format. Default: PNG.
    pub format: OutputFormat,

    /// JPEG quality (1–100). Only used with [`OutputFormat::Jpeg`]. Default: 75.
    pub jpeg_quality: u8,

    /// Produce 8-bit grayscale images. Default: false.
    pub grayscale: bool,

    /// Render onto a transparent background instead of white. Default: false.
    ///
    /// Only PNG and TIFF can carry alpha; other formats are rejected by
    /// the builder.
    pub transparent: bool,

    /// Fixed output size in pixels. Overrides `dpi` when set. Default: None.
    pub size: Option<TargetSize>,

    /// Skip annotation rendering (form widgets, comments, stamps). Default: false.
    pub hide_annotations: bool,

    /// Return file paths instead of decoded images. Default: false.
    ///
    /// Requires `output_dir`: paths into a temporary directory would dangle.
    pub paths_only: bool,

    /// File-name prefix of every written page. Default: `"page"`.
    pub output_file: String,

    /// Render only the first selected page to `<output_file>.<ext>`. Default: false.
    pub single_file: bool,

    /// Worker threads used to encode and write rendered pages. Default: 1.
    ///
    /// Rasterisation itself always runs on a single pdfium handle; only the
    /// encode/write stage fans out. Output order never depends on this value.
    pub thread_count: usize,

    /// Abort the conversion once this many seconds have elapsed. Default: None.
    ///
    /// Checked before each page is rendered, so the overshoot is bounded by
    /// the time it takes to render a single page.
    pub timeout_secs: Option<u64>,

    /// PDF user password for encrypted documents.
    pub user_password: Option<String>,

    /// PDF owner password, tried after the user password.
    pub owner_password: Option<String>,

    /// Explicit pdfium library (file or directory). Default: None.
    ///
    /// Falls back to `PDFIUM_LIB_PATH`, the working directory, then the
    /// system library search path.
    pub pdfium_library_path: Option<PathBuf>,

    /// Per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            dpi: 200,
            output_dir: None,
            pages: PageSelection::default(),
            format: OutputFormat::default(),
            jpeg_quality: 75,
            grayscale: false,
            transparent: false,
            size: None,
            hide_annotations: false,
            paths_only: false,
            output_file: "page".to_string(),
            single_file: false,
            thread_count: 1,
            timeout_secs: None,
            user_password: None,
            owner_password: None,
            pdfium_library_path: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("dpi", &self.dpi)
            .field("output_dir", &self.output_dir)
            .field("pages", &self.pages)
            .field("format", &self.format)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("grayscale", &self.grayscale)
            .field("transparent", &self.transparent)
            .field("size", &self.size)
            .field("hide_annotations", &self.hide_annotations)
            .field("paths_only", &self.paths_only)
            .field("output_file", &self.output_file)
            .field("single_file", &self.single_file)
            .field("thread_count", &self.thread_count)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_password", &self.user_password.as_ref().map(|_| "<redacted>"))
            .field("owner_password", &self.owner_password.as_ref().map(|_| "<redacted>"))
            .field("pdfium_library_path", &self.pdfium_library_path)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn RenderProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// File extension of the images this configuration produces.
    pub fn extension(&self) -> &'static str {
        self.format.extension(self.grayscale)
    }

    /// Check cross-field constraints.
    ///
    /// [`ConversionConfigBuilder::build`] calls this; the conversion entry
    /// points call it again because every field is public.
    pub fn validate(&self) -> Result<(), Pdf2ImageError> {
        if self.dpi < MIN_DPI || self.dpi > MAX_DPI {
            return Err(Pdf2ImageError::InvalidConfig(format!(
                "DPI must be {MIN_DPI}–{MAX_DPI}, got {}",
                self.dpi
            )));
        }
        if self.thread_count == 0 {
            return Err(Pdf2ImageError::InvalidConfig(
                "Thread count must be ≥ 1".into(),
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(Pdf2ImageError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                self.jpeg_quality
            )));
        }
        if self.transparent && !self.format.supports_alpha() {
            return Err(Pdf2ImageError::InvalidConfig(format!(
                "Transparent output requires PNG or TIFF, got {}",
                self.format
            )));
        }
        if self.paths_only && self.output_dir.is_none() {
            return Err(Pdf2ImageError::InvalidConfig(
                "paths_only requires an output directory".into(),
            ));
        }
        if let Some(size) = self.size {
            if size.width.unwrap_or(0) == 0 && size.height.unwrap_or(0) == 0 {
                return Err(Pdf2ImageError::InvalidConfig(
                    "Target size needs a non-zero width or height".into(),
                ));
            }
            let limit = i32::MAX as u32;
            if size.width.unwrap_or(0) > limit || size.height.unwrap_or(0) > limit {
                return Err(Pdf2ImageError::InvalidConfig(format!(
                    "Target size sides must be at most {limit} px, got {}x{}",
                    size.width.map_or("auto".into(), |w| w.to_string()),
                    size.height.map_or("auto".into(), |h| h.to_string()),
                )));
            }
        }
        if self.output_file.is_empty()
            || self.output_file.contains(['/', '\\'])
            || self.output_file.starts_with('.')
        {
            return Err(Pdf2ImageError::InvalidConfig(format!(
                "Output file prefix must be a plain file name, got {:?}",
                self.output_file
            )));
        }
        if self.timeout_secs == Some(0) {
            return Err(Pdf2ImageError::InvalidConfig(
                "Timeout must be at least 1 second".into(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`ConversionConfig`].
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl fmt::Debug for ConversionConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl ConversionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(MIN_DPI, MAX_DPI);
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    /// Restrict to `first..=last` (1-indexed); either bound may be open.
    pub fn page_bounds(mut self, first: Option<usize>, last: Option<usize>) -> Self {
        self.config.pages = PageSelection::from_bounds(first, last);
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn grayscale(mut self, v: bool) -> Self {
        self.config.grayscale = v;
        self
    }

    pub fn transparent(mut self, v: bool) -> Self {
        self.config.transparent = v;
        self
    }

    pub fn size(mut self, size: TargetSize) -> Self {
        self.config.size = Some(size);
        self
    }

    pub fn hide_annotations(mut self, v: bool) -> Self {
        self.config.hide_annotations = v;
        self
    }

    pub fn paths_only(mut self, v: bool) -> Self {
        self.config.paths_only = v;
        self
    }

    pub fn output_file(mut self, prefix: impl Into<String>) -> Self {
        self.config.output_file = prefix.into();
        self
    }

    pub fn single_file(mut self, v: bool) -> Self {
        self.config.single_file = v;
        self
    }

    pub fn thread_count(mut self, n: usize) -> Self {
        self.config.thread_count = n.max(1);
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = Some(secs);
        self
    }

    pub fn user_password(mut self, pwd: impl Into<String>) -> Self {
        self.config.user_password = Some(pwd.into());
        self
    }

    pub fn owner_password(mut self, pwd: impl Into<String>) -> Self {
        self.config.owner_password = Some(pwd.into());
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2ImageError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// ── Metadata config ──────────────────────────────────────────────────────

/// Options for [`crate::pdfinfo_from_path`] and [`crate::pdfinfo_from_bytes`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InfoConfig {
    /// Password forwarded to the parser for encrypted documents.
    pub password: Option<String>,
    /// Keep `CreationDate` / `ModDate` in raw `D:YYYYMMDDHHmmSS` form.
    pub raw_dates: bool,
    /// Which library reads the document.
    pub backend: MetadataBackend,
    /// Explicit pdfium library, used by [`MetadataBackend::Pdfium`] only.
    pub pdfium_library_path: Option<PathBuf>,
}

impl InfoConfig {
    pub fn with_password(mut self, pwd: impl Into<String>) -> Self {
        self.password = Some(pwd.into());
        self
    }

    pub fn with_raw_dates(mut self, v: bool) -> Self {
        self.raw_dates = v;
        self
    }

    pub fn with_backend(mut self, backend: MetadataBackend) -> Self {
        self.backend = backend;
        self
    }
}

/// Library used to read document metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MetadataBackend {
    /// Pure-Rust `lopdf` parser; needs no native library. (default)
    #[default]
    Lopdf,
    /// The pdfium renderer's own metadata accessors.
    Pdfium,
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Encoded format of the written page images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Lossless, supports transparency. (default)
    #[default]
    Png,
    /// Lossy; quality set by [`ConversionConfig::jpeg_quality`].
    Jpeg,
    /// Netpbm pixmap (`.ppm`), or graymap (`.pgm`) when grayscale.
    Ppm,
    /// Lossless, supports transparency.
    Tiff,
}

impl OutputFormat {
    /// File extension written to disk and matched by the collector.
    pub fn extension(self, grayscale: bool) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Ppm if grayscale => "pgm",
            OutputFormat::Ppm => "ppm",
            OutputFormat::Tiff => "tif",
        }
    }

    pub fn supports_alpha(self) -> bool {
        matches!(self, OutputFormat::Png | OutputFormat::Tiff)
    }

    /// Matching `image` crate format.
    pub fn image_format(self) -> image::ImageFormat {
        match self {
            OutputFormat::Png => image::ImageFormat::Png,
            OutputFormat::Jpeg => image::ImageFormat::Jpeg,
            OutputFormat::Ppm => image::ImageFormat::Pnm,
            OutputFormat::Tiff => image::ImageFormat::Tiff,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Ppm => "ppm",
            OutputFormat::Tiff => "tiff",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = Pdf2ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            "ppm" | "pgm" | "pnm" => Ok(OutputFormat::Ppm),
            "tif" | "tiff" => Ok(OutputFormat::Tiff),
            other => Err(Pdf2ImageError::InvalidConfig(format!(
                "Unknown output format '{other}' (expected png, jpeg, ppm or tiff)"
            ))),
        }
    }
}

/// Output size in pixels; a missing side keeps the page's aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSize {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl TargetSize {
    pub fn width(width: u32) -> Self {
        Self {
            width: Some(width),
            height: None,
        }
    }

    pub fn height(height: u32) -> Self {
        Self {
            width: None,
            height: Some(height),
        }
    }

    pub fn exact(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
        }
    }
}

/// Specifies which pages of the PDF to convert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSelection {
    /// Convert all pages (default).
    #[default]
    All,
    /// Convert a single page (1-indexed).
    Single(usize),
    /// Convert a contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Convert specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Selection for optional first/last page bounds (1-indexed, inclusive).
    pub fn from_bounds(first: Option<usize>, last: Option<usize>) -> Self {
        match (first, last) {
            (None, None) => PageSelection::All,
            (first, last) => PageSelection::Range(first.unwrap_or(1), last.unwrap_or(usize::MAX)),
        }
    }

    /// Expand the selection into a sorted, deduplicated list of 0-indexed page numbers.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| p >= 1 && p <= total_pages)
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}
