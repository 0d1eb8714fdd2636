//! Raster image to single-page PDF.
//!
//! The image is decoded with the `image` crate, normalised to 8-bit RGB and
//! embedded as a `DeviceRGB` image XObject. The page is exactly the size of
//! the image at 72 dpi, so one pixel maps to one point. For animated GIFs
//! only the first frame is used.

use image::{ImageReader, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::path::Path;

use crate::error::{Result, StitchError};
use crate::io::{DocumentBuilder, PdfWriter};

/// Resource name of the image on its page.
const IMAGE_NAME: &str = "Im0";

/// Convert the image at `source` into a one-page PDF at `target`.
///
/// # Errors
///
/// Returns [`StitchError::ConversionFailed`] if the image cannot be
/// decoded, and a write error if `target` cannot be written.
pub fn convert_image(source: &Path, target: &Path) -> Result<()> {
    let failed = |reason: String| StitchError::conversion_failed(source.to_path_buf(), reason);

    // Format is sniffed from the file contents, not the extension.
    let decoded = ImageReader::open(source)
        .and_then(ImageReader::with_guessed_format)
        .map_err(|e| failed(e.to_string()))?
        .decode()
        .map_err(|e| failed(e.to_string()))?;

    let mut doc = image_document(&decoded.to_rgb8()).map_err(|e| failed(e.to_string()))?;
    PdfWriter::non_atomic().write_blocking(&mut doc, target)?;
    Ok(())
}

/// Build a document with a single page showing `rgb`.
pub fn image_document(rgb: &RgbImage) -> Result<Document> {
    let (width, height) = rgb.dimensions();
    if width == 0 || height == 0 {
        return Err(StitchError::other("image has no pixels"));
    }

    let mut builder = DocumentBuilder::new();
    let image_id = builder.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width),
            "Height" => i64::from(height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        rgb.as_raw().clone(),
    ));

    let (w, h) = (width as f32, height as f32);
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![w.into(), 0.into(), 0.into(), h.into(), 0.into(), 0.into()],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let resources = dictionary! {
        "XObject" => dictionary! { IMAGE_NAME => image_id },
    };

    builder.add_page(w, h, content, resources)?;
    Ok(builder.finish())
}
