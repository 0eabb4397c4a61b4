//! PDF rasterisation: render selected pages and write them to a directory.
//!
//! Pages are rasterised one after another on the shared pdfium handle;
//! pdfium is not re-entrant, so that part never runs in parallel. The
//! encode/write stage is what `thread_count` fans out: each batch of
//! `thread_count` rendered pages is handed to a rayon pool, and because
//! every page lands in its own numbered file the result is identical for
//! any pool size.

use crate::config::{ConversionConfig, PageSelection};
use crate::error::Pdf2ImageError;
use crate::pipeline::encode::{self, PageNamer};
use image::DynamicImage;
use pdfium_render::prelude::*;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Open a document, trying the user password and then the owner password.
pub fn open_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    user_password: Option<&'a str>,
    owner_password: Option<&'a str>,
) -> Result<PdfDocument<'a>, Pdf2ImageError> {
    let candidates: Vec<&'a str> = [user_password, owner_password]
        .into_iter()
        .flatten()
        .collect();

    if candidates.is_empty() {
        return pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| map_open_error(pdf_path, &e, false));
    }

    let mut last_err = None;
    for password in candidates {
        match pdfium.load_pdf_from_file(pdf_path, Some(password)) {
            Ok(document) => return Ok(document),
            Err(e) => last_err = Some(map_open_error(pdf_path, &e, true)),
        }
    }
    Err(last_err.unwrap_or_else(|| Pdf2ImageError::Internal("no password attempted".into())))
}

fn map_open_error(pdf_path: &Path, err: &PdfiumError, had_password: bool) -> Pdf2ImageError {
    let err_str = format!("{:?}", err);
    if err_str.contains("Password") || err_str.contains("password") {
        if had_password {
            Pdf2ImageError::WrongPassword {
                path: pdf_path.to_path_buf(),
            }
        } else {
            Pdf2ImageError::PasswordRequired {
                path: pdf_path.to_path_buf(),
            }
        }
    } else {
        Pdf2ImageError::DocumentOpen {
            path: pdf_path.to_path_buf(),
            detail: err_str,
        }
    }
}

/// Translate the conversion options into a pdfium render configuration.
pub fn render_config(config: &ConversionConfig) -> PdfRenderConfig {
    // `ConversionConfig::validate` keeps both sides within i32.
    let mut render_config = match config.size {
        Some(size) => match (size.width, size.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => {
                PdfRenderConfig::new().set_target_size(w as i32, h as i32)
            }
            (Some(w), _) if w > 0 => PdfRenderConfig::new().set_target_width(w as i32),
            (_, Some(h)) => PdfRenderConfig::new().set_target_height(h as i32),
            _ => PdfRenderConfig::new().scale_page_by_factor(config.dpi as f32 / 72.0),
        },
        None => PdfRenderConfig::new().scale_page_by_factor(config.dpi as f32 / 72.0),
    };

    render_config = render_config
        .render_annotations(!config.hide_annotations)
        .use_grayscale_rendering(config.grayscale);

    if config.transparent {
        render_config = render_config.set_clear_color(PdfColor::new(255, 255, 255, 0));
    }

    render_config
}

/// Rasterise one page into an image ready for encoding.
pub fn render_page(
    pages: &PdfPages,
    idx: usize,
    render_config: &PdfRenderConfig,
    config: &ConversionConfig,
) -> Result<DynamicImage, Pdf2ImageError> {
    let page = pages
        .get(idx as u16)
        .map_err(|e| Pdf2ImageError::RasterisationFailed {
            page: idx + 1,
            detail: format!("{:?}", e),
        })?;

    let bitmap = page.render_with_config(render_config).map_err(|e| {
        Pdf2ImageError::RasterisationFailed {
            page: idx + 1,
            detail: format!("{:?}", e),
        }
    })?;

    let image = encode::prepare(
        bitmap.as_image(),
        config.format,
        config.grayscale,
        config.transparent,
    );
    debug!(
        "Rendered page {} → {}x{} px",
        idx + 1,
        image.width(),
        image.height()
    );
    Ok(image)
}

/// Tracks the optional conversion deadline.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    expires: Option<(Instant, u64)>,
}

impl Deadline {
    pub fn new(timeout_secs: Option<u64>) -> Self {
        Self {
            expires: timeout_secs.map(|s| (Instant::now() + Duration::from_secs(s), s)),
        }
    }

    /// Fail with `Timeout` once the deadline has passed.
    pub fn check(&self, pages_done: usize) -> Result<(), Pdf2ImageError> {
        match self.expires {
            Some((at, secs)) if Instant::now() >= at => {
                Err(Pdf2ImageError::Timeout { secs, pages_done })
            }
            _ => Ok(()),
        }
    }
}

/// Resolve the selected 0-indexed pages of a document with `total_pages` pages.
pub fn select_pages(config: &ConversionConfig, total_pages: usize) -> Result<Vec<usize>, Pdf2ImageError> {
    let mut indices = config.pages.to_indices(total_pages);
    if indices.is_empty() {
        let page = match &config.pages {
            PageSelection::Single(p) => *p,
            PageSelection::Range(s, _) => *s,
            PageSelection::Set(v) => v.first().copied().unwrap_or(0),
            PageSelection::All => 0,
        };
        return Err(Pdf2ImageError::PageOutOfRange {
            page,
            total: total_pages,
        });
    }
    if config.single_file {
        indices.truncate(1);
    }
    Ok(indices)
}

/// Render every selected page of `pdf_path` into `output_dir`.
///
/// Returns the paths this call wrote, in page order. Other files already
/// in `output_dir` are never part of the result.
pub fn render_to_dir(
    pdfium: &Pdfium,
    pdf_path: &Path,
    output_dir: &Path,
    config: &ConversionConfig,
) -> Result<Vec<PathBuf>, Pdf2ImageError> {
    let deadline = Deadline::new(config.timeout_secs);

    let document = open_document(
        pdfium,
        pdf_path,
        config.user_password.as_deref(),
        config.owner_password.as_deref(),
    )?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    let indices = select_pages(config, total_pages)?;
    let namer = PageNamer::new(config, total_pages);
    let render_config = render_config(config);
    let selected = indices.len();

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(selected);
    }

    let pool = if config.thread_count > 1 {
        Some(
            rayon::ThreadPoolBuilder::new()
                .num_threads(config.thread_count)
                .thread_name(|i| format!("pdf2image-encode-{i}"))
                .build()
                .map_err(|e| Pdf2ImageError::Internal(format!("encode pool: {e}")))?,
        )
    } else {
        None
    };

    let mut written: Vec<PathBuf> = Vec::with_capacity(selected);
    for chunk in indices.chunks(config.thread_count.max(1)) {
        let mut batch = Vec::with_capacity(chunk.len());
        for &idx in chunk {
            deadline.check(written.len() + batch.len())?;
            let image = render_page(pages, idx, &render_config, config)?;
            if let Some(ref cb) = config.progress_callback {
                cb.on_page_rendered(idx + 1, selected);
            }
            let path = output_dir.join(namer.file_name(idx + 1));
            batch.push((idx, path, image));
        }

        let write_one =
            |(idx, path, image): &(usize, PathBuf, DynamicImage)| -> Result<(), Pdf2ImageError> {
                encode::write_page(image, path, config.format, config.jpeg_quality)?;
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_written(idx + 1, selected, path);
                }
                Ok(())
            };

        match pool {
            Some(ref pool) => pool.install(|| batch.par_iter().try_for_each(write_one))?,
            None => batch.iter().try_for_each(write_one)?,
        }
        written.extend(batch.into_iter().map(|(_, path, _)| path));
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(selected);
    }
    info!(
        "Wrote {} of {} pages to {}",
        written.len(),
        total_pages,
        output_dir.display()
    );

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_without_timeout_never_fires() {
        let d = Deadline::new(None);
        assert!(d.check(10).is_ok());
    }

    #[test]
    fn expired_deadline_reports_progress() {
        let d = Deadline {
            expires: Some((Instant::now() - Duration::from_millis(1), 2)),
        };
        match d.check(4) {
            Err(Pdf2ImageError::Timeout { secs, pages_done }) => {
                assert_eq!(secs, 2);
                assert_eq!(pages_done, 4);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn empty_selection_is_out_of_range() {
        let config = ConversionConfig::builder()
            .pages(PageSelection::Single(9))
            .build()
            .unwrap();
        let err = select_pages(&config, 3).unwrap_err();
        assert!(matches!(
            err,
            Pdf2ImageError::PageOutOfRange { page: 9, total: 3 }
        ));
    }

    #[test]
    fn single_file_keeps_first_selected_page() {
        let config = ConversionConfig::builder()
            .single_file(true)
            .page_bounds(Some(2), None)
            .build()
            .unwrap();
        assert_eq!(select_pages(&config, 5).unwrap(), vec![1]);
    }
}
