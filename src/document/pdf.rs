//! PDF validation and merging on top of `lopdf`

use super::{DocumentError, DocumentFormat};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use std::path::{Path, PathBuf};

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against cyclic `Parent` chains in broken files
const MAX_TREE_DEPTH: usize = 64;

/// PDF documents; the structural unit is a page
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfFormat;

impl DocumentFormat for PdfFormat {
    fn extension(&self) -> &str {
        ".pdf"
    }

    fn count_units(&self, path: &Path) -> Result<usize, DocumentError> {
        let document = Document::load(path)?;
        let pages = document.get_pages().len();
        if pages == 0 {
            return Err(DocumentError::NoUnits);
        }
        Ok(pages)
    }

    fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<(), DocumentError> {
        if inputs.is_empty() {
            return Err(DocumentError::NoInputs);
        }

        let mut merged = Document::with_version("1.5");
        let mut next_id = 1;
        let mut pages: Vec<(ObjectId, Dictionary)> = Vec::new();

        for input in inputs {
            let mut document = Document::load(input)?;
            document.renumber_objects_with(next_id);
            next_id = document.max_id + 1;

            for page_id in document.get_pages().into_values() {
                pages.push((page_id, flatten_page(&document, page_id)?));
            }

            for (object_id, object) in document.objects {
                let structural = matches!(
                    object.type_name().unwrap_or(""),
                    "Catalog" | "Pages" | "Page" | "Outlines" | "Outline" | "XRef" | "ObjStm"
                );
                if !structural {
                    merged.objects.insert(object_id, object);
                }
            }
        }

        if pages.is_empty() {
            return Err(DocumentError::NoUnits);
        }

        let pages_id: ObjectId = (next_id, 0);
        let catalog_id: ObjectId = (next_id + 1, 0);

        let kids: Vec<Object> = pages.iter().map(|(id, _)| Object::Reference(*id)).collect();
        let count = pages.len() as i64;

        for (page_id, mut page) in pages {
            page.set("Parent", pages_id);
            merged.objects.insert(page_id, Object::Dictionary(page));
        }

        merged.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        merged.objects.insert(
            catalog_id,
            Object::Dictionary(dictionary! {
                "Type" => "Catalog",
                "Pages" => pages_id,
            }),
        );
        merged.trailer.set("Root", catalog_id);
        merged.max_id = next_id + 1;

        merged.renumber_objects();
        merged.compress();
        merged.save(output)?;

        Ok(())
    }
}

/// Copies a page dictionary and pulls in attributes inherited from its parents
///
/// The merged file gets a single flat page tree, so anything a page relied on
/// from its original ancestors must live on the page itself.
fn flatten_page(document: &Document, page_id: ObjectId) -> Result<Dictionary, DocumentError> {
    let mut page = document.get_dictionary(page_id)?.clone();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;

    while let Some(parent_id) = parent {
        depth += 1;
        if depth > MAX_TREE_DEPTH {
            return Err(DocumentError::Malformed(format!(
                "page tree deeper than {} levels",
                MAX_TREE_DEPTH
            )));
        }

        let Ok(node) = document.get_dictionary(parent_id) else {
            break;
        };

        for key in INHERITABLE_KEYS {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key.to_vec(), value.clone());
                }
            }
        }

        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    Ok(page)
}
