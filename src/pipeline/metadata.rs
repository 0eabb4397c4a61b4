//! Metadata extraction: info dictionary and page count, without rendering.
//!
//! The default backend is `lopdf`, a pure-Rust parser that is independent
//! of the renderer and needs no native library. The page count is read
//! from the page-tree root (`/Root → /Pages → /Count`), not from the info
//! dictionary, and a missing or malformed tree is a [`Pdf2ImageError::PageCount`]
//! rather than an open failure. The pdfium backend reads the same fields
//! through the renderer; it is the only path that can report
//! [`Pdf2ImageError::ToolUnavailable`].

use crate::config::{InfoConfig, MetadataBackend};
use crate::error::Pdf2ImageError;
use crate::output::PdfInfo;
use crate::pipeline::{engine, input, render};
use lopdf::{Dictionary, Document, Object};
use once_cell::sync::Lazy;
use pdfium_render::prelude::*;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Info-dictionary keys holding dates.
const DATE_KEYS: [&str; 2] = ["CreationDate", "ModDate"];

/// Label used in errors for in-memory documents.
const MEMORY_SOURCE: &str = "<memory>";

/// Read metadata from a validated PDF path.
pub fn read_info(pdf_path: &Path, config: &InfoConfig) -> Result<PdfInfo, Pdf2ImageError> {
    match config.backend {
        MetadataBackend::Lopdf => {
            let doc = Document::load(pdf_path).map_err(|e| Pdf2ImageError::DocumentOpen {
                path: pdf_path.to_path_buf(),
                detail: e.to_string(),
            })?;
            read_lopdf(doc, pdf_path, config)
        }
        MetadataBackend::Pdfium => read_pdfium(pdf_path, config),
    }
}

/// Read metadata from an in-memory PDF.
pub fn read_info_from_bytes(bytes: &[u8], config: &InfoConfig) -> Result<PdfInfo, Pdf2ImageError> {
    let source = PathBuf::from(MEMORY_SOURCE);
    if !bytes.starts_with(b"%PDF") {
        return Err(Pdf2ImageError::DocumentOpen {
            path: source,
            detail: "not a PDF (missing %PDF header)".into(),
        });
    }

    match config.backend {
        MetadataBackend::Lopdf => {
            let doc = Document::load_mem(bytes).map_err(|e| Pdf2ImageError::DocumentOpen {
                path: source.clone(),
                detail: e.to_string(),
            })?;
            read_lopdf(doc, &source, config)
        }
        MetadataBackend::Pdfium => input::with_temp_pdf(bytes, |path| read_pdfium(path, config)),
    }
}

// ── lopdf backend ────────────────────────────────────────────────────────

fn read_lopdf(
    mut doc: Document,
    source: &Path,
    config: &InfoConfig,
) -> Result<PdfInfo, Pdf2ImageError> {
    let encrypted = doc.is_encrypted();
    if encrypted {
        // Permissions-only documents open with the empty user password.
        match config.password {
            Some(ref password) => doc
                .decrypt(password)
                .map_err(|_| Pdf2ImageError::WrongPassword {
                    path: source.to_path_buf(),
                })?,
            None => doc.decrypt("").map_err(|e| {
                debug!("{} rejects the empty password: {}", source.display(), e);
                Pdf2ImageError::PasswordRequired {
                    path: source.to_path_buf(),
                }
            })?,
        }
    }

    let pages = page_count(&doc, source)?;
    let fields = match doc.trailer.get(b"Info") {
        Ok(obj) => match resolve(&doc, obj).and_then(Object::as_dict) {
            Ok(dict) => info_fields(&doc, dict, config.raw_dates),
            Err(e) => {
                debug!("Ignoring unreadable /Info in {}: {}", source.display(), e);
                BTreeMap::new()
            }
        },
        Err(_) => BTreeMap::new(),
    };

    info!("Read metadata of {}: {} pages", source.display(), pages);
    Ok(PdfInfo {
        fields,
        pages,
        pdf_version: Some(doc.version.clone()),
        encrypted,
    })
}

/// Follow a single indirect reference.
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> lopdf::Result<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id),
        other => Ok(other),
    }
}

/// Resolve `/Root → /Pages → /Count`.
fn page_count(doc: &Document, source: &Path) -> Result<usize, Pdf2ImageError> {
    let err = |detail: String| Pdf2ImageError::PageCount {
        path: source.to_path_buf(),
        detail,
    };

    let catalog = doc
        .catalog()
        .map_err(|e| err(format!("document catalog missing: {e}")))?;
    let pages = catalog
        .get(b"Pages")
        .and_then(|p| resolve(doc, p))
        .and_then(Object::as_dict)
        .map_err(|e| err(format!("page-tree root unreadable: {e}")))?;
    let count = pages
        .get(b"Count")
        .and_then(|c| resolve(doc, c))
        .and_then(Object::as_i64)
        .map_err(|e| err(format!("page-tree /Count unreadable: {e}")))?;

    usize::try_from(count).map_err(|_| err(format!("negative page count {count}")))
}

fn info_fields(doc: &Document, dict: &Dictionary, raw_dates: bool) -> BTreeMap<String, String> {
    dict.iter()
        .filter_map(|(key, value)| {
            let key = String::from_utf8_lossy(key).into_owned();
            let value = object_to_string(doc, value)?;
            let value = if !raw_dates && DATE_KEYS.contains(&key.as_str()) {
                decode_pdf_date(&value).unwrap_or(value)
            } else {
                value
            };
            Some((key, value))
        })
        .collect()
}

fn object_to_string(doc: &Document, obj: &Object) -> Option<String> {
    match resolve(doc, obj).ok()? {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        Object::Integer(i) => Some(i.to_string()),
        Object::Real(r) => Some(r.to_string()),
        Object::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Decode a PDF text string: UTF-16BE or UTF-8 with BOM, else PDFDocEncoding.
///
/// PDFDocEncoding agrees with Latin-1 for every printable byte an info
/// dictionary realistically contains.
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    if let Some(utf8) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(utf8).into_owned();
    }
    bytes.iter().map(|&b| b as char).collect()
}

static RE_PDF_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^D:(\d{4})(\d{2})?(\d{2})?(\d{2})?(\d{2})?(\d{2})?(?:(Z)|([+\-])(\d{2})'?(?:(\d{2})'?)?)?$",
    )
    .unwrap()
});

/// Convert `D:YYYYMMDDHHmmSS+HH'mm'` into ISO-8601.
///
/// Missing components default to the start of their range; a missing
/// timezone yields a local (offset-less) timestamp. Returns `None` when
/// the value is not a PDF date.
pub fn decode_pdf_date(raw: &str) -> Option<String> {
    let caps = RE_PDF_DATE.captures(raw.trim())?;
    let part = |i: usize, default: &'static str| caps.get(i).map_or(default, |m| m.as_str());

    let mut out = format!(
        "{}-{}-{}T{}:{}:{}",
        part(1, "0000"),
        part(2, "01"),
        part(3, "01"),
        part(4, "00"),
        part(5, "00"),
        part(6, "00"),
    );
    if caps.get(7).is_some() {
        out.push('Z');
    } else if let Some(sign) = caps.get(8) {
        out.push_str(&format!("{}{}:{}", sign.as_str(), part(9, "00"), part(10, "00")));
    }
    Some(out)
}

// ── pdfium backend ───────────────────────────────────────────────────────

fn read_pdfium(pdf_path: &Path, config: &InfoConfig) -> Result<PdfInfo, Pdf2ImageError> {
    let pdfium = engine::engine(config.pdfium_library_path.as_deref())?;
    let document = render::open_document(pdfium, pdf_path, config.password.as_deref(), None)?;

    let metadata = document.metadata();
    let tags = [
        ("Title", PdfDocumentMetadataTagType::Title),
        ("Author", PdfDocumentMetadataTagType::Author),
        ("Subject", PdfDocumentMetadataTagType::Subject),
        ("Keywords", PdfDocumentMetadataTagType::Keywords),
        ("Creator", PdfDocumentMetadataTagType::Creator),
        ("Producer", PdfDocumentMetadataTagType::Producer),
        ("CreationDate", PdfDocumentMetadataTagType::CreationDate),
        ("ModDate", PdfDocumentMetadataTagType::ModificationDate),
    ];

    let fields = tags
        .into_iter()
        .filter_map(|(key, tag)| {
            let value = metadata.get(tag)?.value().to_string();
            if value.is_empty() {
                return None;
            }
            let value = if !config.raw_dates && DATE_KEYS.contains(&key) {
                decode_pdf_date(&value).unwrap_or(value)
            } else {
                value
            };
            Some((key.to_string(), value))
        })
        .collect();

    let pages = document.pages().len() as usize;
    info!("Read metadata of {} via pdfium: {} pages", pdf_path.display(), pages);

    Ok(PdfInfo {
        fields,
        pages,
        pdf_version: Some(format!("{:?}", document.version())),
        // pdfium doesn't readily expose this after opening
        encrypted: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_date_with_offset() {
        assert_eq!(
            decode_pdf_date("D:20230115093000+01'00'").as_deref(),
            Some("2023-01-15T09:30:00+01:00")
        );
    }

    #[test]
    fn decodes_utc_and_partial_dates() {
        assert_eq!(
            decode_pdf_date("D:20231231235959Z").as_deref(),
            Some("2023-12-31T23:59:59Z")
        );
        assert_eq!(
            decode_pdf_date("D:2021").as_deref(),
            Some("2021-01-01T00:00:00")
        );
        assert_eq!(
            decode_pdf_date("D:199812231952-08'00").as_deref(),
            Some("1998-12-23T19:52:00-08:00")
        );
    }

    #[test]
    fn non_dates_are_left_alone() {
        assert_eq!(decode_pdf_date("yesterday"), None);
        assert_eq!(decode_pdf_date("20230115"), None);
    }

    #[test]
    fn text_string_encodings() {
        assert_eq!(decode_text_string(b"Plain title"), "Plain title");
        assert_eq!(
            decode_text_string(&[0xFE, 0xFF, 0x00, 0x48, 0x00, 0xE9]),
            "Hé"
        );
        assert_eq!(decode_text_string(&[0xEF, 0xBB, 0xBF, b'o', b'k']), "ok");
        assert_eq!(decode_text_string(&[0x43, 0x61, 0x66, 0xE9]), "Café");
    }

    #[test]
    fn bytes_without_header_are_rejected() {
        let err = read_info_from_bytes(b"hello", &InfoConfig::default()).unwrap_err();
        assert!(matches!(err, Pdf2ImageError::DocumentOpen { .. }));
    }

    #[test]
    fn catalog_without_count_is_a_page_count_error() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.add_object(lopdf::dictionary! { "Type" => "Pages", "Kids" => Vec::<Object>::new() });
        let catalog_id = doc.add_object(lopdf::dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);

        let err = page_count(&doc, Path::new("broken.pdf")).unwrap_err();
        assert!(matches!(err, Pdf2ImageError::PageCount { .. }), "got: {err:?}");
    }

    #[test]
    fn missing_catalog_is_a_page_count_error() {
        let doc = Document::with_version("1.5");
        let err = page_count(&doc, Path::new("empty.pdf")).unwrap_err();
        assert!(matches!(err, Pdf2ImageError::PageCount { .. }));
    }
}
