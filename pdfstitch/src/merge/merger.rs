//! Core PDF merging implementation.
//!
//! The first document is the base. Every later document has its objects
//! renumbered past the base's highest id, its pages re-parented onto the
//! base's root page tree and appended to its `Kids`, in order.

use lopdf::{Document, Object, ObjectId};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::CompressionLevel;
use crate::error::{Result, StitchError};
use crate::io::{LoadedPdf, PdfReader};
use crate::utils::format_file_size;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_ATTRIBUTES: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Guard against cyclic `Parent` chains in malformed files.
const MAX_TREE_DEPTH: usize = 64;

/// Statistics about a merge operation.
#[derive(Debug, Clone, Serialize)]
pub struct MergeStatistics {
    /// Number of PDFs successfully merged.
    pub files_merged: usize,

    /// Total number of pages in merged document.
    pub total_pages: usize,

    /// Total time taken for merge.
    pub merge_time: Duration,

    /// Time taken to load all PDFs.
    pub load_time: Duration,

    /// Total size of input files.
    pub input_size: u64,

    /// Whether compression was applied.
    pub compressed: bool,
}

impl MergeStatistics {
    /// Format input size as human-readable string.
    pub fn format_input_size(&self) -> String {
        format_file_size(self.input_size)
    }
}

/// Result of a merge operation.
pub struct MergeResult {
    /// The merged PDF document.
    pub document: Document,

    /// Statistics about the merge.
    pub statistics: MergeStatistics,

    /// Paths of files that were merged.
    pub merged_files: Vec<PathBuf>,
}

/// PDF merger that combines multiple documents.
#[derive(Debug, Clone, Default)]
pub struct Merger {
    /// Reader for loading PDFs.
    reader: PdfReader,

    /// Compression applied to the merged document.
    compression: CompressionLevel,
}

impl Merger {
    /// Create a new merger with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the compression level of the output.
    pub fn with_compression(mut self, compression: CompressionLevel) -> Self {
        self.compression = compression;
        self
    }

    /// Load and merge the PDFs at `paths`, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `paths` is empty
    /// - Any file cannot be loaded (no file is skipped)
    /// - The page tree of a document is malformed
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfstitch::merge::Merger;
    /// # use std::path::PathBuf;
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let merger = Merger::new();
    /// let result = merger.merge_files(&[PathBuf::from("a.pdf"), PathBuf::from("b.pdf")])?;
    /// println!("Merged {} files into {} pages",
    ///          result.statistics.files_merged,
    ///          result.statistics.total_pages);
    /// # Ok(())
    /// # }
    /// ```
    pub fn merge_files(&self, paths: &[PathBuf]) -> Result<MergeResult> {
        if paths.is_empty() {
            return Err(StitchError::NoFilesToMerge);
        }

        let merge_start = Instant::now();

        let load_start = Instant::now();
        let loaded_pdfs = paths
            .iter()
            .map(|path| self.reader.load(path))
            .collect::<Result<Vec<LoadedPdf>>>()?;
        let load_time = load_start.elapsed();

        let input_size = loaded_pdfs.iter().map(|p| p.file_size).sum();
        let mut merged_files = Vec::with_capacity(loaded_pdfs.len());
        let mut documents = Vec::with_capacity(loaded_pdfs.len());
        for loaded in loaded_pdfs {
            debug!(path = %loaded.path.display(), pages = loaded.page_count, "loaded");
            merged_files.push(loaded.path);
            documents.push(loaded.document);
        }

        let document = self.merge_documents(documents)?;

        let statistics = MergeStatistics {
            files_merged: merged_files.len(),
            total_pages: document.get_pages().len(),
            merge_time: merge_start.elapsed(),
            load_time,
            input_size,
            compressed: self.compression != CompressionLevel::None,
        };

        Ok(MergeResult {
            document,
            statistics,
            merged_files,
        })
    }

    /// Merge already loaded documents, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if `documents` is empty or a page tree is malformed.
    pub fn merge_documents(&self, documents: Vec<Document>) -> Result<Document> {
        let mut documents = documents.into_iter();
        let mut merged = documents.next().ok_or(StitchError::NoFilesToMerge)?;
        let root_pages_id = root_pages_id(&merged)?;
        let mut max_id = merged.max_id;

        for mut doc in documents {
            // Renumber objects to avoid ID conflicts
            doc.renumber_objects_with(max_id + 1);
            max_id = doc.max_id;

            let doc_pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
            for &page_id in &doc_pages {
                reparent_page(&mut doc, page_id, root_pages_id)?;
            }

            // The old catalog and page tree nodes are now unreachable.
            for id in document_skeleton(&doc)? {
                doc.objects.remove(&id);
            }

            if doc.version > merged.version {
                merged.version = doc.version.clone();
            }

            merged.objects.extend(doc.objects);
            merged.max_id = max_id;

            self.add_pages_to_tree(&mut merged, root_pages_id, &doc_pages)?;
        }

        match self.compression {
            CompressionLevel::None => {}
            CompressionLevel::Standard => {
                merged.compress();
            }
            CompressionLevel::Maximum => {
                merged.compress();
                merged.prune_objects();
            }
        }

        // Always renumber for consistency
        merged.renumber_objects();

        Ok(merged)
    }

    /// Add pages to the merged document's root page tree node.
    fn add_pages_to_tree(
        &self,
        merged: &mut Document,
        pages_id: ObjectId,
        page_ids: &[ObjectId],
    ) -> Result<()> {
        let pages_dict = merged
            .get_object_mut(pages_id)
            .map_err(|e| StitchError::merge_failed(format!("Failed to get pages object: {e}")))?;

        let Object::Dictionary(dict) = pages_dict else {
            return Err(StitchError::merge_failed(
                "Pages object is not a dictionary",
            ));
        };

        let kids = dict
            .get_mut(b"Kids")
            .map_err(|_| StitchError::merge_failed("Pages dictionary missing Kids array"))?;
        let Object::Array(kids_array) = kids else {
            return Err(StitchError::merge_failed("Kids is not an array"));
        };
        kids_array.extend(page_ids.iter().map(|&id| Object::Reference(id)));

        let current_count = dict.get(b"Count").and_then(|c| c.as_i64()).unwrap_or(0);
        dict.set("Count", current_count + page_ids.len() as i64);

        Ok(())
    }
}

/// Id of the root `Pages` node of `doc`.
fn root_pages_id(doc: &Document) -> Result<ObjectId> {
    doc.catalog()
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|e| StitchError::merge_failed(format!("Failed to get pages reference: {e}")))
}

/// Copy inherited attributes onto the page itself and point its `Parent`
/// at `new_parent`.
fn reparent_page(doc: &mut Document, page_id: ObjectId, new_parent: ObjectId) -> Result<()> {
    let inherited = inherited_attributes(doc, page_id);

    let page = doc
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| StitchError::merge_failed(format!("Failed to get page {page_id:?}: {e}")))?;

    for (key, value) in inherited {
        page.set(key, value);
    }
    page.set("Parent", Object::Reference(new_parent));
    Ok(())
}

/// Inheritable attributes the page lacks, taken from its closest ancestor.
fn inherited_attributes(doc: &Document, page_id: ObjectId) -> Vec<(&'static [u8], Object)> {
    let mut found = Vec::new();
    let Ok(page) = doc.get_dictionary(page_id) else {
        return found;
    };

    let mut missing: Vec<&'static [u8]> = INHERITABLE_ATTRIBUTES
        .into_iter()
        .filter(|key| !page.has(key))
        .collect();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;

    while let Some(node_id) = parent
        && !missing.is_empty()
        && depth < MAX_TREE_DEPTH
    {
        let Ok(node) = doc.get_dictionary(node_id) else {
            break;
        };
        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                found.push((*key, value.clone()));
                false
            }
            Err(_) => true,
        });
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }

    found
}

/// The catalog and every `Pages` node of `doc`.
fn document_skeleton(doc: &Document) -> Result<BTreeSet<ObjectId>> {
    let mut skeleton = BTreeSet::new();
    if let Ok(catalog_id) = doc.trailer.get(b"Root").and_then(Object::as_reference) {
        skeleton.insert(catalog_id);
    }

    let mut pending = vec![root_pages_id(doc)?];
    while let Some(node_id) = pending.pop() {
        let Ok(node) = doc.get_dictionary(node_id) else {
            continue;
        };
        let is_pages_node = node
            .get(b"Type")
            .and_then(Object::as_name)
            .is_ok_and(|name| name == b"Pages");
        if !is_pages_node || !skeleton.insert(node_id) {
            continue;
        }

        if let Ok(kids) = node.get(b"Kids").and_then(Object::as_array) {
            pending.extend(kids.iter().filter_map(|kid| kid.as_reference().ok()));
        }
    }

    Ok(skeleton)
}
