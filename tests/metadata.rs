//! Metadata reader integration tests.
//!
//! The default lopdf backend needs no native library, so everything here
//! runs everywhere except the explicitly pdfium-backed test.

#[macro_use]
mod common;

use edgequake_pdf2image::{
    pdfinfo_from_bytes, pdfinfo_from_path, pdfinfo_from_path_async, InfoConfig, MetadataBackend,
    Pdf2ImageError,
};
use serde_json::Value;

#[test]
fn three_page_document_reports_three_pages() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = common::write_fixture(dir.path(), "three.pdf", 3, Some("Quarterly Report"));

    let info = pdfinfo_from_path(&pdf, &InfoConfig::default()).unwrap();
    assert_eq!(info.pages, 3);
    assert_eq!(info.title(), Some("Quarterly Report"));
    assert_eq!(info.author(), Some("Test Suite"));
    assert_eq!(info.producer(), Some("lopdf"));
    assert_eq!(info.pdf_version.as_deref(), Some("1.5"));
    assert!(!info.encrypted);

    let map = info.to_map();
    assert_eq!(map["Pages"], Value::from(3));
    assert_eq!(map["Title"], Value::String("Quarterly Report".into()));
}

#[test]
fn dates_are_iso_unless_raw_requested() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = common::write_fixture(dir.path(), "dated.pdf", 1, Some("Dated"));

    let info = pdfinfo_from_path(&pdf, &InfoConfig::default()).unwrap();
    assert_eq!(info.get("CreationDate"), Some("2023-01-15T09:30:00+01:00"));

    let raw = pdfinfo_from_path(&pdf, &InfoConfig::default().with_raw_dates(true)).unwrap();
    assert_eq!(raw.get("CreationDate"), Some("D:20230115093000+01'00'"));
}

#[test]
fn document_without_info_dictionary_still_has_page_count() {
    let bytes = common::fixture_pdf(5, None);
    let info = pdfinfo_from_bytes(&bytes, &InfoConfig::default()).unwrap();
    assert_eq!(info.pages, 5);
    assert!(info.fields.is_empty());
    assert_eq!(info.to_map()["Pages"], Value::from(5));
}

#[test]
fn bytes_and_path_agree() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = common::write_fixture(dir.path(), "same.pdf", 4, Some("Same"));
    let bytes = std::fs::read(&pdf).unwrap();

    let from_path = pdfinfo_from_path(&pdf, &InfoConfig::default()).unwrap();
    let from_bytes = pdfinfo_from_bytes(&bytes, &InfoConfig::default()).unwrap();
    assert_eq!(from_path, from_bytes);
}

#[test]
fn nonexistent_path_is_a_document_open_error() {
    let err = pdfinfo_from_path("/definitely/not/here.pdf", &InfoConfig::default()).unwrap_err();
    assert!(
        matches!(err, Pdf2ImageError::DocumentOpen { .. }),
        "got: {err:?}"
    );
    assert!(err.is_open_error());
}

#[test]
fn non_pdf_file_is_a_document_open_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.pdf");
    std::fs::write(&path, b"just some text").unwrap();

    let err = pdfinfo_from_path(&path, &InfoConfig::default()).unwrap_err();
    assert!(matches!(err, Pdf2ImageError::DocumentOpen { .. }));
}

#[test]
fn truncated_pdf_is_rejected() {
    let bytes = common::fixture_pdf(2, None);
    let err = pdfinfo_from_bytes(&bytes[..bytes.len() / 3], &InfoConfig::default()).unwrap_err();
    assert!(
        err.is_open_error() || matches!(err, Pdf2ImageError::PageCount { .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn async_wrapper_matches_blocking_call() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = common::write_fixture(dir.path(), "async.pdf", 2, Some("Async"));

    let info = pdfinfo_from_path_async(&pdf, &InfoConfig::default())
        .await
        .unwrap();
    assert_eq!(info.pages, 2);
    assert_eq!(info.title(), Some("Async"));
}

#[test]
fn pdfium_backend_reports_same_page_count() {
    skip_without_pdfium!();
    let dir = tempfile::tempdir().unwrap();
    let pdf = common::write_fixture(dir.path(), "pdfium.pdf", 3, Some("Via pdfium"));

    let config = InfoConfig::default().with_backend(MetadataBackend::Pdfium);
    let info = pdfinfo_from_path(&pdf, &config).unwrap();
    assert_eq!(info.pages, 3);
    assert_eq!(info.title(), Some("Via pdfium"));
}

#[test]
fn encrypted_document_opens_with_empty_user_password() {
    let bytes = common::encrypted_fixture_pdf(2, "Locked Title", true);

    let info = pdfinfo_from_bytes(&bytes, &InfoConfig::default()).unwrap();
    assert!(info.encrypted);
    assert_eq!(info.pages, 2);
    assert_eq!(info.title(), Some("Locked Title"));
}

#[test]
fn encrypted_document_needs_the_right_password() {
    let bytes = common::encrypted_fixture_pdf(1, "Secret", false);

    let err = pdfinfo_from_bytes(&bytes, &InfoConfig::default()).unwrap_err();
    assert!(
        matches!(err, Pdf2ImageError::PasswordRequired { .. }),
        "got: {err:?}"
    );

    let err = pdfinfo_from_bytes(&bytes, &InfoConfig::default().with_password("guess")).unwrap_err();
    assert!(
        matches!(err, Pdf2ImageError::WrongPassword { .. }),
        "got: {err:?}"
    );
}
