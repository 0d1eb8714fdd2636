//! Minimal document assembly for generated pages.
//!
//! The image and text converters produce fresh documents; this builder owns
//! the catalog and page tree so each converter only supplies page contents.

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

use crate::error::{Result, StitchError};

/// PDF version written for generated documents.
pub const GENERATED_PDF_VERSION: &str = "1.5";

/// Incrementally builds a flat, single-level page tree.
pub struct DocumentBuilder {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
}

impl DocumentBuilder {
    /// Start an empty document.
    pub fn new() -> Self {
        let mut doc = Document::with_version(GENERATED_PDF_VERSION);
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
        }
    }

    /// Add an object that pages can reference (fonts, images).
    pub fn add_object(&mut self, object: impl Into<Object>) -> ObjectId {
        self.doc.add_object(object)
    }

    /// Append a page of `width` x `height` points drawing `content`.
    ///
    /// # Errors
    ///
    /// Returns an error if the content stream cannot be encoded.
    pub fn add_page(
        &mut self,
        width: f32,
        height: f32,
        content: Content,
        resources: Dictionary,
    ) -> Result<ObjectId> {
        let bytes = content
            .encode()
            .map_err(|e| StitchError::other(format!("Failed to encode page content: {e}")))?;
        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), bytes));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Contents" => content_id,
            "Resources" => resources,
        });
        self.kids.push(page_id.into());
        Ok(page_id)
    }

    /// Number of pages added so far.
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Write the page tree and catalog and return the document.
    ///
    /// Uncompressed streams are Flate-compressed.
    pub fn finish(mut self) -> Document {
        let count = self.kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => self.kids,
                "Count" => count,
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.compress();
        self.doc
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_has_page_tree() {
        let doc = DocumentBuilder::new().finish();
        assert!(doc.catalog().is_ok());
        assert!(doc.get_pages().is_empty());
    }

    #[test]
    fn test_pages_keep_insertion_order() {
        let mut builder = DocumentBuilder::new();
        for width in [100.0, 200.0, 300.0] {
            builder
                .add_page(width, 50.0, Content { operations: vec![] }, Dictionary::new())
                .unwrap();
        }
        assert_eq!(builder.page_count(), 3);

        let doc = builder.finish();
        let widths: Vec<f32> = doc
            .get_pages()
            .values()
            .map(|id| {
                let page = doc.get_dictionary(*id).unwrap();
                let mediabox = page.get(b"MediaBox").unwrap().as_array().unwrap();
                mediabox[2].as_float().unwrap()
            })
            .collect();
        assert_eq!(widths, vec![100.0, 200.0, 300.0]);
    }
}
