//! Fixtures for the integration tests, generated on the fly.

#![allow(dead_code)]

use lopdf::content::Content;
use lopdf::{Dictionary, Document};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use pdfstitch::classify::OfficeKind;
use pdfstitch::convert::{Converters, OfficeRenderer};
use pdfstitch::error::{Result, StitchError};
use pdfstitch::io::{DocumentBuilder, PdfWriter};
use pdfstitch::job::JobDriver;

/// Write a PDF with one empty page per entry of `widths`, all 200pt tall.
pub fn write_pdf(path: &Path, widths: &[f32]) -> PathBuf {
    let mut builder = DocumentBuilder::new();
    for &width in widths {
        builder
            .add_page(width, 200.0, Content { operations: vec![] }, Dictionary::new())
            .unwrap();
    }
    let mut doc = builder.finish();
    PdfWriter::non_atomic()
        .write_blocking(&mut doc, path)
        .unwrap();
    path.to_path_buf()
}

/// Write a `width` x `height` PNG.
pub fn write_png(path: &Path, width: u32, height: u32) -> PathBuf {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 8) as u8, (y * 8) as u8, 128])
    });
    img.save(path).unwrap();
    path.to_path_buf()
}

/// Write a plain text file.
pub fn write_text(path: &Path, text: &str) -> PathBuf {
    std::fs::write(path, text).unwrap();
    path.to_path_buf()
}

/// MediaBox widths of every page of the PDF at `path`, in page order.
pub fn page_widths(path: &Path) -> Vec<f32> {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .values()
        .map(|id| {
            let page = doc.get_dictionary(*id).unwrap();
            let mediabox = page.get(b"MediaBox").unwrap().as_array().unwrap();
            mediabox[2].as_float().unwrap()
        })
        .collect()
}

/// Office renderer that is never expected to be called.
pub struct NoOffice;

impl OfficeRenderer for NoOffice {
    fn render(&self, source: &Path, _kind: OfficeKind, _target: &Path) -> Result<()> {
        Err(StitchError::OfficeUnavailable {
            program: "none".to_string(),
            reason: format!("no office suite for {}", source.display()),
        })
    }
}

/// Office renderer that produces a one-page PDF of a fixed width after a
/// delay.
pub struct FakeOffice {
    pub width: f32,
    pub delay: Duration,
}

impl OfficeRenderer for FakeOffice {
    fn render(&self, _source: &Path, _kind: OfficeKind, target: &Path) -> Result<()> {
        std::thread::sleep(self.delay);
        write_pdf(target, &[self.width]);
        Ok(())
    }
}

/// Office renderer that deletes the document it renders, leaving a source
/// that can no longer be removed after the merge.
pub struct ConsumingOffice;

impl OfficeRenderer for ConsumingOffice {
    fn render(&self, source: &Path, _kind: OfficeKind, target: &Path) -> Result<()> {
        std::fs::remove_file(source)?;
        write_pdf(target, &[300.0]);
        Ok(())
    }
}

/// Driver without an office suite.
pub fn driver() -> JobDriver {
    driver_with(NoOffice)
}

/// Driver using `office` for office documents.
pub fn driver_with(office: impl OfficeRenderer + 'static) -> JobDriver {
    JobDriver::new(Converters::new(Arc::new(office)))
}
