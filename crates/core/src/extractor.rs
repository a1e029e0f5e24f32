use crate::error::IngestError;
use lopdf::Document;
use std::path::Path;

/// Pull the full text out of an uploaded document. PDFs go through lopdf
/// page by page; everything else is treated as UTF-8 plain text. Any
/// extraction failure aborts ingestion of that file with an error message
/// for the caller, never partial output.
pub fn extract_text_from_bytes(bytes: &[u8], filename: &str) -> Result<String, IngestError> {
    if is_pdf(filename) {
        let document =
            Document::load_mem(bytes).map_err(|error| IngestError::PdfParse(error.to_string()))?;
        extract_pdf_text(&document, filename)
    } else {
        String::from_utf8(bytes.to_vec())
            .map_err(|error| IngestError::BadEncoding(format!("{filename}: {error}")))
    }
}

pub fn extract_text(path: &Path) -> Result<String, IngestError> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            IngestError::InvalidArgument(format!("path missing filename: {}", path.display()))
        })?;

    let bytes = std::fs::read(path)?;
    extract_text_from_bytes(&bytes, filename)
}

fn is_pdf(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

fn extract_pdf_text(document: &Document, filename: &str) -> Result<String, IngestError> {
    let mut text = String::new();
    for (page_no, _page_id) in document.get_pages() {
        let page_text = document
            .extract_text(&[page_no])
            .map_err(|error| IngestError::PdfParse(error.to_string()))?;
        text.push_str(&page_text);
        text.push('\n');
    }

    if text.trim().is_empty() {
        return Err(IngestError::PdfParse(format!(
            "pdf had no readable page text: {filename}"
        )));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_bytes_decode_as_utf8() {
        let text = extract_text_from_bytes("suku bunga acuan".as_bytes(), "notes.txt").unwrap();
        assert_eq!(text, "suku bunga acuan");
    }

    #[test]
    fn invalid_utf8_is_an_encoding_error() {
        let result = extract_text_from_bytes(&[0xff, 0xfe, 0x00], "notes.txt");
        assert!(matches!(result, Err(IngestError::BadEncoding(_))));
    }

    #[test]
    fn corrupt_pdf_is_a_parse_error() {
        let result = extract_text_from_bytes(b"%PDF-1.4\n%broken", "broken.pdf");
        assert!(matches!(result, Err(IngestError::PdfParse(_))));
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(is_pdf("REPORT.PDF"));
        assert!(is_pdf("report.pdf"));
        assert!(!is_pdf("report.txt"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = extract_text(Path::new("/nonexistent/nothing.txt"));
        assert!(matches!(result, Err(IngestError::Io(_))));
    }
}
