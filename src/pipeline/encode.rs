//! Image encoding: file naming and `DynamicImage` → file on disk.
//!
//! Page numbers are zero-padded to the digit count of the document's page
//! count (`page_01.png … page_12.png`), so a plain lexical sort of the
//! output directory yields page order. The collector relies on that.

use crate::config::{ConversionConfig, OutputFormat};
use crate::error::Pdf2ImageError;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{DynamicImage, ImageError};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Builds the file name of every page written by one conversion.
///
/// Created fresh per call; it holds no state across conversions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageNamer {
    prefix: String,
    width: usize,
    extension: &'static str,
    single_file: bool,
}

impl PageNamer {
    /// Namer for a document with `total_pages` pages.
    pub fn new(config: &ConversionConfig, total_pages: usize) -> Self {
        Self {
            prefix: config.output_file.clone(),
            width: digits(total_pages),
            extension: config.extension(),
            single_file: config.single_file,
        }
    }

    /// File name for a 1-indexed page number.
    pub fn file_name(&self, page_num: usize) -> String {
        if self.single_file {
            format!("{}.{}", self.prefix, self.extension)
        } else {
            format!(
                "{}_{:0width$}.{}",
                self.prefix,
                page_num,
                self.extension,
                width = self.width
            )
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Digits every page number is padded to.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn single_file(&self) -> bool {
        self.single_file
    }

    pub fn extension(&self) -> &'static str {
        self.extension
    }
}

/// Number of decimal digits in `n` (at least 1).
pub fn digits(n: usize) -> usize {
    n.max(1).ilog10() as usize + 1
}

/// Convert a freshly rendered bitmap into the pixel layout the target
/// format can store.
pub fn prepare(img: DynamicImage, format: OutputFormat, grayscale: bool, transparent: bool) -> DynamicImage {
    let keep_alpha = transparent && format.supports_alpha();
    match (grayscale, keep_alpha) {
        // The TIFF encoder has no gray+alpha layout.
        (true, true) if format == OutputFormat::Tiff => {
            DynamicImage::ImageRgba8(DynamicImage::ImageLumaA8(img.to_luma_alpha8()).to_rgba8())
        }
        (true, true) => DynamicImage::ImageLumaA8(img.to_luma_alpha8()),
        (true, false) => DynamicImage::ImageLuma8(img.to_luma8()),
        (false, true) => DynamicImage::ImageRgba8(img.to_rgba8()),
        (false, false) => DynamicImage::ImageRgb8(img.to_rgb8()),
    }
}

/// Encode `img` as `format` and write it to `path`.
pub fn write_page(
    img: &DynamicImage,
    path: &Path,
    format: OutputFormat,
    jpeg_quality: u8,
) -> Result<(), Pdf2ImageError> {
    let write_err = |source: ImageError| Pdf2ImageError::ImageWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(|e| write_err(ImageError::IoError(e)))?;
    let mut writer = BufWriter::new(file);

    match format {
        OutputFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut writer, jpeg_quality);
            img.write_with_encoder(encoder).map_err(write_err)?;
        }
        // `ImageFormat::Pnm` picks PAM (P7); force binary PGM (P5) / PPM (P6).
        OutputFormat::Ppm => {
            let encoder = PnmEncoder::new(&mut writer);
            if img.color().has_color() {
                let encoder =
                    encoder.with_subtype(PnmSubtype::Pixmap(SampleEncoding::Binary));
                DynamicImage::ImageRgb8(img.to_rgb8())
                    .write_with_encoder(encoder)
                    .map_err(write_err)?;
            } else {
                let encoder =
                    encoder.with_subtype(PnmSubtype::Graymap(SampleEncoding::Binary));
                DynamicImage::ImageLuma8(img.to_luma8())
                    .write_with_encoder(encoder)
                    .map_err(write_err)?;
            }
        }
        other => img
            .write_to(&mut writer, other.image_format())
            .map_err(write_err)?,
    }

    writer
        .flush()
        .map_err(|e| write_err(ImageError::IoError(e)))?;

    debug!(
        "Wrote {}x{} {} → {}",
        img.width(),
        img.height(),
        format,
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn red_square() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 128])))
    }

    #[test]
    fn digits_counts_decimal_places() {
        assert_eq!(digits(0), 1);
        assert_eq!(digits(9), 1);
        assert_eq!(digits(10), 2);
        assert_eq!(digits(120), 3);
    }

    #[test]
    fn names_are_zero_padded_and_sort_numerically() {
        let config = ConversionConfig::default();
        let namer = PageNamer::new(&config, 12);
        let mut names: Vec<String> = (1..=12).map(|n| namer.file_name(n)).collect();
        assert_eq!(names[0], "page_01.png");
        assert_eq!(names[11], "page_12.png");

        let expected = names.clone();
        names.sort();
        assert_eq!(names, expected, "lexical order must equal page order");
    }

    #[test]
    fn single_file_has_no_page_suffix() {
        let config = ConversionConfig::builder()
            .single_file(true)
            .output_file("cover")
            .format(OutputFormat::Jpeg)
            .build()
            .unwrap();
        let namer = PageNamer::new(&config, 40);
        assert_eq!(namer.file_name(1), "cover.jpg");
    }

    #[test]
    fn prepare_matches_format_capabilities() {
        let img = red_square();
        assert!(matches!(
            prepare(img.clone(), OutputFormat::Png, false, true),
            DynamicImage::ImageRgba8(_)
        ));
        assert!(matches!(
            prepare(img.clone(), OutputFormat::Png, false, false),
            DynamicImage::ImageRgb8(_)
        ));
        assert!(matches!(
            prepare(img.clone(), OutputFormat::Ppm, true, false),
            DynamicImage::ImageLuma8(_)
        ));
        assert!(matches!(
            prepare(img.clone(), OutputFormat::Png, true, true),
            DynamicImage::ImageLumaA8(_)
        ));
        assert!(matches!(
            prepare(img, OutputFormat::Tiff, true, true),
            DynamicImage::ImageRgba8(_)
        ));
    }

    #[test]
    fn every_format_round_trips_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        for format in [
            OutputFormat::Png,
            OutputFormat::Jpeg,
            OutputFormat::Ppm,
            OutputFormat::Tiff,
        ] {
            let img = prepare(red_square(), format, false, false);
            let path = dir.path().join(format!("p.{}", format.extension(false)));
            write_page(&img, &path, format, 80).expect("write should succeed");
            let back = image::open(&path).expect("written file must decode");
            assert_eq!((back.width(), back.height()), (10, 10), "{format}");
        }
    }

    #[test]
    fn grayscale_ppm_is_a_graymap() {
        let dir = tempfile::tempdir().unwrap();
        let img = prepare(red_square(), OutputFormat::Ppm, true, false);
        let path = dir.path().join("g.pgm");
        write_page(&img, &path, OutputFormat::Ppm, 75).unwrap();
        let header = std::fs::read(&path).unwrap();
        assert_eq!(&header[..2], b"P5");
    }

    #[test]
    fn color_ppm_is_a_pixmap() {
        let dir = tempfile::tempdir().unwrap();
        let img = prepare(red_square(), OutputFormat::Ppm, false, false);
        let path = dir.path().join("c.ppm");
        write_page(&img, &path, OutputFormat::Ppm, 75).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], b"P6");

        let back = image::open(&path).unwrap();
        assert!(matches!(back, DynamicImage::ImageRgb8(_)));
        assert_eq!(back.to_rgb8().get_pixel(0, 0).0, [255, 0, 0]);
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let err = write_page(
            &red_square(),
            Path::new("/definitely/not/here/p.png"),
            OutputFormat::Png,
            75,
        )
        .unwrap_err();
        assert!(matches!(err, Pdf2ImageError::ImageWriteFailed { .. }));
    }
}
