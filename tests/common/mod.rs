//! Shared fixtures for the integration tests.
//!
//! PDFs are generated with lopdf so no binary files live in the repo. Page
//! `n` (1-indexed) is `200 + 10 * (n - 1)` points wide and 100 points tall,
//! which lets tests check page order from image widths alone.

#![allow(dead_code)]

use edgequake_pdf2image::pipeline::engine;
use lopdf::{dictionary, encryption, Document, Object, Stream, StringFormat};
use std::path::{Path, PathBuf};

pub const PAGE_HEIGHT_PT: i64 = 100;

/// Width in points of 1-indexed page `n`.
pub fn page_width_pt(n: usize) -> i64 {
    200 + 10 * (n as i64 - 1)
}

/// Build a PDF with `pages` blank pages and an optional info dictionary.
pub fn fixture_pdf(pages: usize, title: Option<&str>) -> Vec<u8> {
    save(fixture_doc(pages, title))
}

fn fixture_doc(pages: usize, title: Option<&str>) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (1..=pages)
        .map(|n| {
            let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(page_width_pt(n)),
                    Object::Integer(PAGE_HEIGHT_PT),
                ],
                "Contents" => content_id,
                "Resources" => dictionary! {},
            });
            page_id.into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(pages as i64),
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if let Some(title) = title {
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(title),
            "Author" => Object::string_literal("Test Suite"),
            "Producer" => Object::string_literal("lopdf"),
            "CreationDate" => Object::string_literal("D:20230115093000+01'00'"),
        });
        doc.trailer.set("Info", info_id);
    }

    doc
}

fn save(mut doc: Document) -> Vec<u8> {
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("fixture PDF serialises");
    bytes
}

/// Build a 40-bit RC4 (V1/R2) encrypted PDF whose `/Title` is stored
/// encrypted.
///
/// With `empty_user_password` the document opens with the empty password,
/// like a permissions-only PDF. Otherwise its `/U` entry matches no
/// password this suite uses.
pub fn encrypted_fixture_pdf(pages: usize, title: &str, empty_user_password: bool) -> Vec<u8> {
    let mut doc = fixture_doc(pages, None);

    let mut encrypt = dictionary! {
        "Filter" => "Standard",
        "V" => Object::Integer(1),
        "R" => Object::Integer(2),
        "Length" => Object::Integer(40),
        "O" => Object::String(vec![0x4F; 32], StringFormat::Literal),
        "P" => Object::Integer(-4),
    };
    if !empty_user_password {
        encrypt.set("U", Object::String(vec![0; 32], StringFormat::Literal));
    }
    let encrypt_id = doc.add_object(encrypt);
    doc.trailer.set("Encrypt", encrypt_id);

    let file_id = Object::String(b"pdf2image-fixture".to_vec(), StringFormat::Hexadecimal);
    doc.trailer.set("ID", vec![file_id.clone(), file_id]);

    // RC4 is symmetric: "decrypting" the plain title yields its ciphertext.
    let key = encryption::get_encryption_key(&doc, "", false).expect("fixture key");
    let info_id = doc.new_object_id();
    let cipher = encryption::decrypt_object(&key, info_id, &Object::string_literal(title))
        .expect("title encrypts");
    doc.objects.insert(
        info_id,
        Object::Dictionary(dictionary! {
            "Title" => Object::String(cipher, StringFormat::Literal),
        }),
    );
    doc.trailer.set("Info", info_id);

    save(doc)
}

/// Write a fixture PDF into `dir` and return its path.
pub fn write_fixture(dir: &Path, name: &str, pages: usize, title: Option<&str>) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, fixture_pdf(pages, title)).expect("fixture PDF written");
    path
}

/// Skip this test when no pdfium library can be bound.
macro_rules! skip_without_pdfium {
    () => {
        if !$crate::common::pdfium_available() {
            println!("SKIP — pdfium not found; set PDFIUM_LIB_PATH to run rendering tests");
            return;
        }
    };
}

pub fn pdfium_available() -> bool {
    engine::is_available(None)
}
