//! Streaming conversion API: emit pages as they are rasterised.
//!
//! [`convert_from_path`](crate::convert::convert_from_path) returns only after
//! every page is written and read back. [`convert_stream`] instead yields a
//! [`RenderedPage`] per selected page, in page order, as soon as pdfium has
//! produced it. Rendering runs on tokio's blocking pool and hands pages over
//! a bounded channel, so a slow consumer applies back-pressure instead of
//! letting the whole document pile up in memory.
//!
//! When `output_dir` is set each page is also written there, using the same
//! file names as the eager API.

use crate::config::ConversionConfig;
use crate::error::Pdf2ImageError;
use crate::output::RenderedPage;
use crate::pipeline::encode::{self, PageNamer};
use crate::pipeline::{engine, input, render};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tempfile::NamedTempFile;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;
use tracing::{debug, info, warn};

/// A boxed stream of rendered pages.
pub type PageStream = Pin<Box<dyn Stream<Item = Result<RenderedPage, Pdf2ImageError>> + Send>>;

/// Pages buffered between the renderer and the consumer.
const CHANNEL_CAPACITY: usize = 4;

/// Convert a PDF file, streaming pages in page order.
///
/// Fatal input problems (missing file, invalid config) are returned before
/// the stream is built. Errors met while rendering end the stream with a
/// single `Err` item.
pub async fn convert_stream(
    pdf_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<PageStream, Pdf2ImageError> {
    config.validate()?;
    let pdf_path = input::resolve_local(pdf_path.as_ref())?;
    info!("Starting streaming conversion: {}", pdf_path.display());
    Ok(spawn_producer(pdf_path, config.clone(), None))
}

/// Convert an in-memory PDF, streaming pages in page order.
///
/// The temporary copy of `bytes` lives until the renderer finishes (or the
/// stream is dropped) and is deleted then.
pub async fn convert_stream_from_bytes(
    bytes: &[u8],
    config: &ConversionConfig,
) -> Result<PageStream, Pdf2ImageError> {
    config.validate()?;
    let temp = input::materialise(bytes)?;
    let pdf_path = temp.path().to_path_buf();
    info!("Starting streaming conversion of {} bytes", bytes.len());
    Ok(spawn_producer(pdf_path, config.clone(), Some(temp)))
}

fn spawn_producer(
    pdf_path: PathBuf,
    config: ConversionConfig,
    temp: Option<NamedTempFile>,
) -> PageStream {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

    tokio::task::spawn_blocking(move || {
        // Owned here so the temp file outlives rendering.
        let _temp = temp;
        if let Err(e) = produce(&pdf_path, &config, &tx) {
            warn!("Streaming conversion stopped: {}", e);
            let _ = tx.blocking_send(Err(e));
        }
    });

    Box::pin(ReceiverStream::new(rx))
}

fn produce(
    pdf_path: &Path,
    config: &ConversionConfig,
    tx: &mpsc::Sender<Result<RenderedPage, Pdf2ImageError>>,
) -> Result<(), Pdf2ImageError> {
    let deadline = render::Deadline::new(config.timeout_secs);
    let pdfium = engine::engine(config.pdfium_library_path.as_deref())?;
    let document = render::open_document(
        pdfium,
        pdf_path,
        config.user_password.as_deref(),
        config.owner_password.as_deref(),
    )?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    let indices = render::select_pages(config, total_pages)?;
    let namer = PageNamer::new(config, total_pages);
    let render_config = render::render_config(config);
    let selected = indices.len();

    if let Some(ref dir) = config.output_dir {
        std::fs::create_dir_all(dir).map_err(|source| Pdf2ImageError::OutputDir {
            path: dir.clone(),
            source,
        })?;
    }
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(selected);
    }

    for (done, idx) in indices.into_iter().enumerate() {
        deadline.check(done)?;
        let image = render::render_page(pages, idx, &render_config, config)?;
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_rendered(idx + 1, selected);
        }

        if let Some(ref dir) = config.output_dir {
            let path = dir.join(namer.file_name(idx + 1));
            encode::write_page(&image, &path, config.format, config.jpeg_quality)?;
            if let Some(ref cb) = config.progress_callback {
                cb.on_page_written(idx + 1, selected, &path);
            }
        }

        let page = RenderedPage {
            page_num: idx + 1,
            image,
        };
        if tx.blocking_send(Ok(page)).is_err() {
            debug!("Stream receiver dropped after {} pages", done + 1);
            return Ok(());
        }
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(selected);
    }
    Ok(())
}
