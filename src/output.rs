//! Result types returned by the conversion and metadata entry points.

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Pages produced by a conversion, in page order.
#[derive(Debug, Clone)]
pub enum ConvertedPages {
    /// Fully decoded images (default mode).
    Images(Vec<DynamicImage>),
    /// Paths of the written image files (`paths_only` mode).
    Paths(Vec<PathBuf>),
}

impl ConvertedPages {
    pub fn len(&self) -> usize {
        match self {
            ConvertedPages::Images(v) => v.len(),
            ConvertedPages::Paths(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The images, or `None` in `paths_only` mode.
    pub fn images(&self) -> Option<&[DynamicImage]> {
        match self {
            ConvertedPages::Images(v) => Some(v),
            ConvertedPages::Paths(_) => None,
        }
    }

    /// The paths, or `None` when images were loaded.
    pub fn paths(&self) -> Option<&[PathBuf]> {
        match self {
            ConvertedPages::Paths(v) => Some(v),
            ConvertedPages::Images(_) => None,
        }
    }

    pub fn into_images(self) -> Option<Vec<DynamicImage>> {
        match self {
            ConvertedPages::Images(v) => Some(v),
            ConvertedPages::Paths(_) => None,
        }
    }

    pub fn into_paths(self) -> Option<Vec<PathBuf>> {
        match self {
            ConvertedPages::Paths(v) => Some(v),
            ConvertedPages::Images(_) => None,
        }
    }
}

/// One rasterised page, as yielded by [`crate::stream::convert_stream`].
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// 1-indexed page number in the source document.
    pub page_num: usize,
    pub image: DynamicImage,
}

/// Document information read by the metadata path.
///
/// `fields` holds the info dictionary as strings, keyed by the PDF names
/// (`Title`, `Author`, `Producer`, `CreationDate`, …). The page count comes
/// from the page-tree root, not from the info dictionary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PdfInfo {
    pub fields: BTreeMap<String, String>,
    pub pages: usize,
    pub pdf_version: Option<String>,
    pub encrypted: bool,
}

impl PdfInfo {
    /// Look up an info-dictionary entry by its PDF key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.get("Title")
    }

    pub fn author(&self) -> Option<&str> {
        self.get("Author")
    }

    pub fn producer(&self) -> Option<&str> {
        self.get("Producer")
    }

    /// Flatten into a single mapping: info strings plus an integer `Pages`.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map: Map<String, Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        map.insert("Pages".into(), Value::from(self.pages));
        map.insert(
            "Encrypted".into(),
            Value::String(if self.encrypted { "yes" } else { "no" }.into()),
        );
        if let Some(ref v) = self.pdf_version {
            map.insert("PDF version".into(), Value::String(v.clone()));
        }
        map
    }
}
