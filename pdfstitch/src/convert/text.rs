//! Plain text to PDF.
//!
//! Text is drawn in Courier 10 pt with 12 pt leading on A4 pages, starting
//! 40 pt from the top left corner. Lines are never wrapped. By default only
//! the first page is produced and the remaining lines are dropped with a
//! warning; [`TextOverflow::Paginate`] continues onto further pages.
//!
//! The standard Type 1 font is used with `WinAnsiEncoding`, so characters
//! outside Latin-1 are replaced with `?`.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, StringFormat, dictionary};
use std::path::Path;
use tracing::warn;

use crate::config::TextOverflow;
use crate::error::{Result, StitchError};
use crate::io::{DocumentBuilder, PdfWriter};

/// A4 width in points.
pub const PAGE_WIDTH: f32 = 595.0;
/// A4 height in points.
pub const PAGE_HEIGHT: f32 = 842.0;
/// Distance of the text block from the top and left edges.
pub const MARGIN: f32 = 40.0;
/// Font size in points.
pub const FONT_SIZE: f32 = 10.0;
/// Baseline-to-baseline distance.
pub const LEADING: f32 = 12.0;

const TAB_WIDTH: usize = 4;
const FONT_NAME: &str = "F1";

/// Number of lines that fit on one page.
pub fn lines_per_page() -> usize {
    ((PAGE_HEIGHT - 2.0 * MARGIN - FONT_SIZE) / LEADING) as usize + 1
}

/// Lines of a text file split into pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLayout {
    /// Lines per page, in order. Never empty.
    pub pages: Vec<Vec<String>>,
    /// Lines left out because they did not fit.
    pub dropped_lines: usize,
}

/// Split `text` into pages.
///
/// Tabs are expanded to four spaces. `\n`, `\r\n` and a lone `\r` all end a
/// line. An empty text yields a single empty page.
pub fn layout(text: &str, overflow: TextOverflow) -> TextLayout {
    let mut lines: Vec<String> = text
        .replace("\r\n", "\n")
        .split(['\n', '\r'])
        .map(|line| line.replace('\t', &" ".repeat(TAB_WIDTH)))
        .collect();
    if text.ends_with(['\n', '\r']) || text.is_empty() {
        lines.pop();
    }

    let per_page = lines_per_page();
    let mut pages: Vec<Vec<String>> = lines
        .chunks(per_page)
        .map(|chunk| chunk.to_vec())
        .collect();
    if pages.is_empty() {
        pages.push(Vec::new());
    }

    let mut dropped_lines = 0;
    if overflow == TextOverflow::Truncate && pages.len() > 1 {
        dropped_lines = pages[1..].iter().map(Vec::len).sum();
        pages.truncate(1);
    }

    TextLayout {
        pages,
        dropped_lines,
    }
}

/// Encode a line for a `WinAnsiEncoding` font.
fn encode_line(line: &str) -> Vec<u8> {
    line.chars()
        .map(|c| match u32::from(c) {
            code @ 0x20..=0x7E | code @ 0xA0..=0xFF => code as u8,
            _ => b'?',
        })
        .collect()
}

/// Build the document for an already laid out text.
pub fn text_document(layout: &TextLayout) -> Result<Document> {
    let mut builder = DocumentBuilder::new();
    let font_id = builder.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });

    for lines in &layout.pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![FONT_NAME.into(), FONT_SIZE.into()]),
            Operation::new("TL", vec![LEADING.into()]),
            Operation::new(
                "Td",
                vec![MARGIN.into(), (PAGE_HEIGHT - MARGIN - FONT_SIZE).into()],
            ),
        ];
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                operations.push(Operation::new("T*", vec![]));
            }
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(encode_line(line), StringFormat::Literal)],
            ));
        }
        operations.push(Operation::new("ET", vec![]));

        let resources = dictionary! {
            "Font" => dictionary! { FONT_NAME => font_id },
        };
        builder.add_page(PAGE_WIDTH, PAGE_HEIGHT, Content { operations }, resources)?;
    }

    Ok(builder.finish())
}

/// Convert the UTF-8 text file at `source` into a PDF at `target`.
///
/// # Errors
///
/// Returns [`StitchError::ConversionFailed`] if the file cannot be read or
/// is not valid UTF-8.
pub fn convert_text(source: &Path, target: &Path, overflow: TextOverflow) -> Result<()> {
    let bytes = std::fs::read(source)
        .map_err(|e| StitchError::conversion_failed(source.to_path_buf(), e.to_string()))?;
    let text = String::from_utf8(bytes).map_err(|e| {
        StitchError::conversion_failed(source.to_path_buf(), format!("not valid UTF-8: {e}"))
    })?;

    let layout = layout(&text, overflow);
    if layout.dropped_lines > 0 {
        warn!(
            path = %source.display(),
            dropped_lines = layout.dropped_lines,
            kept_lines = lines_per_page(),
            "text does not fit on one page; extra lines were dropped (use pagination to keep them)"
        );
    }

    let mut doc = text_document(&layout)?;
    PdfWriter::non_atomic().write_blocking(&mut doc, target)?;
    Ok(())
}
