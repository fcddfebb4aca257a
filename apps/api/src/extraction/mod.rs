// Document text extraction for uploaded resumes.
// Format is chosen from the file name's extension; the bytes are never sniffed.

pub mod docx;
pub mod pdf;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported document format: '{0}'")]
    UnsupportedDocumentFormat(String),

    #[error("Document could not be read: {0}")]
    DocumentUnreadable(String),
}

impl ExtractionError {
    pub fn code(&self) -> &'static str {
        match self {
            ExtractionError::UnsupportedDocumentFormat(_) => "UNSUPPORTED_DOCUMENT_FORMAT",
            ExtractionError::DocumentUnreadable(_) => "DOCUMENT_UNREADABLE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

impl DocumentFormat {
    /// Picks the format from the text after the last `.` of `file_name`,
    /// case-insensitively.
    pub fn from_file_name(file_name: &str) -> Result<Self, ExtractionError> {
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            "txt" => Ok(DocumentFormat::Txt),
            _ => Err(ExtractionError::UnsupportedDocumentFormat(ext)),
        }
    }
}

/// Extracts plain text from an uploaded document.
pub fn extract_text(file_name: &str, bytes: &[u8]) -> Result<String, ExtractionError> {
    let format = DocumentFormat::from_file_name(file_name)?;
    let text = match format {
        DocumentFormat::Pdf => pdf::extract_pdf_text(bytes)?,
        DocumentFormat::Docx => docx::extract_docx_text(bytes)?,
        DocumentFormat::Txt => extract_plain_text(bytes)?,
    };

    debug!(
        file_name,
        ?format,
        bytes = bytes.len(),
        chars = text.len(),
        "Extracted document text"
    );
    Ok(text)
}

/// Strict UTF-8 decode; the text is returned unmodified.
fn extract_plain_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| ExtractionError::DocumentUnreadable(format!("text file is not UTF-8: {e}")))
}
