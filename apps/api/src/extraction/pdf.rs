//! PDF text extraction, page by page.
//!
//! A page whose text cannot be extracted contributes an empty string; only a
//! document that cannot be parsed at all is an error.

use lopdf::Document;
use tracing::warn;

use super::ExtractionError;

/// A paginated document that can yield text one page at a time.
pub trait PageSource {
    /// Page numbers in reading order.
    fn page_numbers(&self) -> Vec<u32>;

    fn page_text(&self, page: u32) -> Result<String, String>;
}

impl PageSource for Document {
    fn page_numbers(&self) -> Vec<u32> {
        self.get_pages().into_keys().collect()
    }

    fn page_text(&self, page: u32) -> Result<String, String> {
        self.extract_text(&[page]).map_err(|e| e.to_string())
    }
}

/// Concatenates every page's text in order, substituting `""` for pages
/// that fail.
pub fn concatenate_pages<S: PageSource + ?Sized>(source: &S) -> String {
    let mut text = String::new();
    for page in source.page_numbers() {
        match source.page_text(page) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => warn!(page, "Skipping unextractable PDF page: {e}"),
        }
    }
    text
}

pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let document = Document::load_mem(bytes)
        .map_err(|e| ExtractionError::DocumentUnreadable(format!("invalid PDF: {e}")))?;
    Ok(concatenate_pages(&document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// In-memory pages; `None` marks a page whose extraction fails.
    struct FakePages(Vec<Option<&'static str>>);

    impl PageSource for FakePages {
        fn page_numbers(&self) -> Vec<u32> {
            (1..=self.0.len() as u32).collect()
        }

        fn page_text(&self, page: u32) -> Result<String, String> {
            self.0[(page - 1) as usize]
                .map(str::to_string)
                .ok_or_else(|| format!("page {page} has no text layer"))
        }
    }

    /// Builds a PDF with one Courier text line per page.
    fn build_pdf(lines: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for line in lines {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*line)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
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
    fn test_pages_are_concatenated_in_order() {
        let pages = FakePages(vec![Some("Jane Doe\n"), Some("Rust, SQL\n")]);
        assert_eq!(concatenate_pages(&pages), "Jane Doe\nRust, SQL\n");
    }

    #[test]
    fn test_failed_page_contributes_empty_string() {
        let pages = FakePages(vec![Some("first "), None, Some("third")]);
        assert_eq!(concatenate_pages(&pages), "first third");
    }

    #[test]
    fn test_all_pages_failing_yields_empty_string() {
        let pages = FakePages(vec![None, None, None]);
        assert_eq!(concatenate_pages(&pages), "");
    }

    #[test]
    fn test_garbage_bytes_are_unreadable() {
        let err = extract_pdf_text(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, ExtractionError::DocumentUnreadable(_)));
    }

    #[test]
    fn test_real_pdf_text_follows_page_order() {
        let bytes = build_pdf(&["Experience Rust", "Education Physics"]);
        let text = extract_pdf_text(&bytes).unwrap();

        let first = text.find("Experience").expect("page 1 text present");
        let second = text.find("Education").expect("page 2 text present");
        assert!(first < second);
    }
}
