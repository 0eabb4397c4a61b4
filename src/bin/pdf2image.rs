//! CLI binary for edgequake-pdf2image.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` / `InfoConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdf2image::{
    convert_from_path, pdfinfo_from_path, ConversionConfig, InfoConfig, MetadataBackend,
    OutputFormat, PageSelection, ProgressCallback, RenderProgressCallback, TargetSize,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a progress bar that advances when each page
/// file is written, with one log line per page.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    /// The bar starts as a spinner; its length is set by `on_conversion_start`.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl RenderProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total_pages as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Rendering");
        self.bar.reset_eta();
    }

    fn on_page_rendered(&self, page_num: usize, _total: usize) {
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_written(&self, page_num: usize, total: usize, path: &Path) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            green("✓"),
            page_num,
            total,
            dim(&path.display().to_string()),
        ));
        self.bar.inc(1);
    }

    fn on_conversion_complete(&self, total_pages: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages rendered",
            green("✔"),
            bold(&total_pages.to_string())
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Every page as PNG at 200 DPI into the current directory
  pdf2image document.pdf

  # Pages 2-5 as JPEG at 300 DPI into ./out
  pdf2image --first-page 2 --last-page 5 --fmt jpeg --dpi 300 -o out document.pdf

  # Thumbnails 400 px wide, grayscale
  pdf2image --width 400 --grayscale document.pdf

  # Cover page only, as cover.png
  pdf2image --single-file --output-file cover document.pdf

  # Metadata only
  pdf2image --info-only --json document.pdf

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Directory (or file) of the pdfium shared library
  RUST_LOG          Override the log filter (e.g. edgequake_pdf2image=debug)
  PDF2IMAGE_*       Defaults for the matching flags (see --help)
"#;

/// Rasterise PDF pages into image files.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2image",
    version,
    about = "Rasterise PDF pages into PNG, JPEG, PPM or TIFF images",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Directory the page images are written to.
    #[arg(short, long, env = "PDF2IMAGE_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Rendering DPI (18–2400).
    #[arg(long, env = "PDF2IMAGE_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(18..=2400))]
    dpi: u32,

    /// Output image format.
    #[arg(long, env = "PDF2IMAGE_FMT", value_enum, default_value = "png")]
    fmt: FormatArg,

    /// JPEG quality (1–100).
    #[arg(long, env = "PDF2IMAGE_JPEG_QUALITY", default_value_t = 75,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: u8,

    /// Page selection: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, env = "PDF2IMAGE_PAGES", default_value = "all",
          conflicts_with_all = ["first_page", "last_page"])]
    pages: String,

    /// First page to render (1-indexed).
    #[arg(short = 'f', long)]
    first_page: Option<usize>,

    /// Last page to render (1-indexed, inclusive).
    #[arg(short = 'l', long)]
    last_page: Option<usize>,

    /// Scale pages to this width in pixels (keeps aspect ratio without --height).
    #[arg(long)]
    width: Option<u32>,

    /// Scale pages to this height in pixels (keeps aspect ratio without --width).
    #[arg(long)]
    height: Option<u32>,

    /// Render in grayscale.
    #[arg(long, env = "PDF2IMAGE_GRAYSCALE")]
    grayscale: bool,

    /// Keep a transparent background (PNG and TIFF only).
    #[arg(long)]
    transparent: bool,

    /// Do not draw annotations.
    #[arg(long)]
    hide_annotations: bool,

    /// File-name prefix for the written images.
    #[arg(long, env = "PDF2IMAGE_OUTPUT_FILE", default_value = "page")]
    output_file: String,

    /// Render only the first selected page, named <output-file>.<ext>.
    #[arg(long)]
    single_file: bool,

    /// Threads used to encode and write page images.
    #[arg(short = 't', long, env = "PDF2IMAGE_THREADS", default_value_t = 1)]
    thread_count: usize,

    /// Abort after this many seconds.
    #[arg(long, env = "PDF2IMAGE_TIMEOUT")]
    timeout: Option<u64>,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2IMAGE_USER_PASSWORD")]
    userpw: Option<String>,

    /// PDF owner password for encrypted documents.
    #[arg(long, env = "PDF2IMAGE_OWNER_PASSWORD")]
    ownerpw: Option<String>,

    /// Directory (or file) of the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_path: Option<PathBuf>,

    /// Print PDF metadata only, no rendering.
    #[arg(long)]
    info_only: bool,

    /// Metadata reader used by --info-only.
    #[arg(long, value_enum, default_value = "lopdf")]
    info_backend: BackendArg,

    /// Keep PDF date strings (D:YYYYMMDD…) as stored instead of ISO 8601.
    #[arg(long)]
    raw_dates: bool,

    /// Print metadata or written paths as JSON.
    #[arg(long, env = "PDF2IMAGE_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2IMAGE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2IMAGE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2IMAGE_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Png,
    #[value(alias = "jpg")]
    Jpeg,
    Ppm,
    #[value(alias = "tif")]
    Tiff,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Png => OutputFormat::Png,
            FormatArg::Jpeg => OutputFormat::Jpeg,
            FormatArg::Ppm => OutputFormat::Ppm,
            FormatArg::Tiff => OutputFormat::Tiff,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum BackendArg {
    Lopdf,
    Pdfium,
}

impl From<BackendArg> for MetadataBackend {
    fn from(v: BackendArg) -> Self {
        match v {
            BackendArg::Lopdf => MetadataBackend::Lopdf,
            BackendArg::Pdfium => MetadataBackend::Pdfium,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.info_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Info-only mode ───────────────────────────────────────────────────
    if cli.info_only {
        let mut info_config = InfoConfig::default()
            .with_raw_dates(cli.raw_dates)
            .with_backend(cli.info_backend.into());
        if let Some(ref pwd) = cli.userpw.clone().or_else(|| cli.ownerpw.clone()) {
            info_config = info_config.with_password(pwd.as_str());
        }
        info_config.pdfium_library_path = cli.pdfium_path.clone();

        let info = pdfinfo_from_path(&cli.input, &info_config)
            .with_context(|| format!("Failed to read metadata of {}", cli.input.display()))?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&info.to_map())
                    .context("Failed to serialize metadata")?
            );
        } else {
            println!("{:<16}{}", "File:", cli.input.display());
            for (key, value) in &info.fields {
                println!("{:<16}{}", format!("{key}:"), value);
            }
            println!("{:<16}{}", "Pages:", info.pages);
            if let Some(ref v) = info.pdf_version {
                println!("{:<16}{}", "PDF version:", v);
            }
            println!(
                "{:<16}{}",
                "Encrypted:",
                if info.encrypted { "yes" } else { "no" }
            );
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn RenderProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let start = Instant::now();
    let pages = convert_from_path(&cli.input, &config).context("Conversion failed")?;
    let paths = pages.into_paths().unwrap_or_default();

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&paths).context("Failed to serialise output")?
        );
    } else if !cli.quiet {
        if !show_progress {
            for path in &paths {
                println!("{}", path.display());
            }
        }
        eprintln!(
            "{}  {} pages  {}ms  →  {}",
            cyan("◆"),
            paths.len(),
            start.elapsed().as_millis(),
            bold(&cli.output_dir.display().to_string()),
        );
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let pages = if cli.first_page.is_some() || cli.last_page.is_some() {
        PageSelection::from_bounds(cli.first_page, cli.last_page)
    } else {
        parse_pages(&cli.pages)?
    };

    let mut builder = ConversionConfig::builder()
        .dpi(cli.dpi)
        .output_dir(&cli.output_dir)
        .pages(pages)
        .format(cli.fmt.into())
        .jpeg_quality(cli.jpeg_quality)
        .grayscale(cli.grayscale)
        .transparent(cli.transparent)
        .hide_annotations(cli.hide_annotations)
        .output_file(cli.output_file.as_str())
        .single_file(cli.single_file)
        .thread_count(cli.thread_count)
        .paths_only(true);

    match (cli.width, cli.height) {
        (Some(w), Some(h)) => builder = builder.size(TargetSize::exact(w, h)),
        (Some(w), None) => builder = builder.size(TargetSize::width(w)),
        (None, Some(h)) => builder = builder.size(TargetSize::height(h)),
        (None, None) => {}
    }
    if let Some(secs) = cli.timeout {
        builder = builder.timeout_secs(secs);
    }
    if let Some(ref pwd) = cli.userpw {
        builder = builder.user_password(pwd.as_str());
    }
    if let Some(ref pwd) = cli.ownerpw {
        builder = builder.owner_password(pwd.as_str());
    }
    if let Some(ref path) = cli.pdfium_path {
        builder = builder.pdfium_library_path(path);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--pages` string into `PageSelection`.
fn parse_pages(s: &str) -> Result<PageSelection> {
    let s = s.trim().to_lowercase();

    if s == "all" {
        return Ok(PageSelection::All);
    }

    // Range: "3-15"
    if let Some((start, end)) = s.split_once('-') {
        let start: usize = start
            .trim()
            .parse()
            .context("Invalid start page in range")?;
        let end: usize = end.trim().parse().context("Invalid end page in range")?;

        if start < 1 {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", start);
        }
        if start > end {
            anyhow::bail!(
                "Invalid page range '{}-{}': start must be <= end",
                start,
                end
            );
        }
        return Ok(PageSelection::Range(start, end));
    }

    // Set: "1,3,5,7"
    if s.contains(',') {
        let pages: Vec<usize> = s
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<usize>()
                    .context(format!("Invalid page number: '{}'", p.trim()))
            })
            .collect::<Result<Vec<_>>>()?;

        if let Some(&p) = pages.iter().find(|&&p| p < 1) {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", p);
        }
        return Ok(PageSelection::Set(pages));
    }

    // Single page: "5"
    let page: usize = s.parse().context("Invalid page number")?;
    if page < 1 {
        anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", page);
    }
    Ok(PageSelection::Single(page))
}
