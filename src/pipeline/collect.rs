//! Output collection: read page images back in page order.
//!
//! A conversion hands [`load_pages`] the exact list of files it wrote, so
//! leftovers from earlier runs in a reused directory never leak into the
//! result. [`collect_pages`] scans a directory instead: files are matched
//! by extension (and optionally by the file-name pattern of one namer) and
//! sorted by name. Zero-padded page numbers make name order equal page
//! order. `image::open` decodes the whole file eagerly, so loaded images
//! never depend on the directory outliving the call.

use crate::error::Pdf2ImageError;
use crate::output::ConvertedPages;
use crate::pipeline::encode::PageNamer;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Which files in a directory belong to the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFilter {
    /// Required extension, without the dot, compared case-insensitively.
    pub extension: String,
    /// Required file-name prefix, if any.
    pub prefix: Option<String>,
    /// Exact digit count of the page number after the prefix, if any.
    pub width: Option<usize>,
}

impl OutputFilter {
    /// Match every file with `extension`.
    pub fn extension(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            prefix: None,
            width: None,
        }
    }

    /// Match the file-name pattern of `namer`: same prefix, extension and
    /// padding width.
    pub fn for_namer(namer: &PageNamer) -> Self {
        Self {
            extension: namer.extension().to_string(),
            prefix: Some(namer.prefix().to_string()),
            width: (!namer.single_file()).then(|| namer.width()),
        }
    }

    fn matches(&self, path: &Path) -> bool {
        let ext_ok = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&self.extension));
        if !ext_ok {
            return false;
        }
        match self.prefix {
            None => true,
            Some(ref prefix) => path
                .file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(|stem| {
                    stem == prefix
                        || stem
                            .strip_prefix(prefix.as_str())
                            .and_then(|rest| rest.strip_prefix('_'))
                            .is_some_and(|n| {
                                !n.is_empty()
                                    && n.bytes().all(|b| b.is_ascii_digit())
                                    && self.width.is_none_or(|w| n.len() == w)
                            })
                }),
        }
    }
}

/// List the matching files of `dir`, sorted by file name.
pub fn list_pages(dir: &Path, filter: &OutputFilter) -> Result<Vec<PathBuf>, Pdf2ImageError> {
    let dir_err = |source: std::io::Error| Pdf2ImageError::OutputDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(dir_err)? {
        let path = entry.map_err(dir_err)?.path();
        if path.is_file() && filter.matches(&path) {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!("Collected {} files from {}", paths.len(), dir.display());
    Ok(paths)
}

/// Collect the pages in `dir` as paths (`paths_only`) or decoded images.
pub fn collect_pages(
    dir: &Path,
    filter: &OutputFilter,
    paths_only: bool,
) -> Result<ConvertedPages, Pdf2ImageError> {
    load_pages(list_pages(dir, filter)?, paths_only)
}

/// Return `paths` as-is (`paths_only`) or decode each one, keeping order.
pub fn load_pages(paths: Vec<PathBuf>, paths_only: bool) -> Result<ConvertedPages, Pdf2ImageError> {
    if paths_only {
        return Ok(ConvertedPages::Paths(paths));
    }

    let images = paths
        .iter()
        .map(|path| {
            image::open(path).map_err(|source| Pdf2ImageError::ImageLoadFailed {
                path: path.clone(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ConvertedPages::Images(images))
}
