//! PDF text extraction.

use lopdf::Document;
use std::io::Cursor;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("failed to load PDF: {0}")]
    Load(String),
}

/// Turns a binary document into flat plain text.
///
/// Extraction is CPU-bound and synchronous; async callers should run it on a
/// blocking worker.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, data: &[u8]) -> Result<String, ExtractionError>;
}

/// [`TextExtractor`] backed by lopdf.
///
/// Pages are extracted in page order and joined with a newline. No layout
/// is kept (headings, tables and columns all flatten into running text).
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract_text(&self, data: &[u8]) -> Result<String, ExtractionError> {
        let doc = Document::load_from(Cursor::new(data))
            .map_err(|e| ExtractionError::Load(e.to_string()))?;

        let mut text = String::new();
        let pages = doc.get_pages();
        let total_pages = pages.len();

        for (page_num, _) in pages {
            match doc.extract_text(&[page_num]) {
                Ok(content) => {
                    text.push_str(&content);
                    text.push('\n');
                }
                // Undecodable pages are skipped, the rest of the document still counts.
                Err(e) => warn!("Skipping page {}: {}", page_num, e),
            }
        }

        debug!("Extracted {} bytes of text from {} pages", text.len(), total_pages);
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    fn hello_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal("Hello World!")]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_extracts_page_text() {
        let text = PdfTextExtractor.extract_text(&hello_pdf()).unwrap();
        assert!(text.contains("Hello World!"), "got: {:?}", text);
    }

    #[test]
    fn test_rejects_non_pdf_buffer() {
        let err = PdfTextExtractor
            .extract_text(b"just some plain text")
            .unwrap_err();
        assert!(err.to_string().starts_with("failed to load PDF"));
    }

    #[test]
    fn test_rejects_empty_buffer() {
        assert!(PdfTextExtractor.extract_text(&[]).is_err());
    }
}
