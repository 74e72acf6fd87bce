use tracing::debug;

use crate::errors::AppError;

/// Extracts plain text from an uploaded contract document.
///
/// PDF uploads go through `pdf-extract` (pages concatenated by the library);
/// anything else is treated as UTF-8 text. The extractor is a black box: it
/// either yields text or an [`AppError::ExtractionFailed`] the boundary maps
/// to a 400.
///
/// CPU-bound for large PDFs; callers on the async runtime should wrap this
/// in `spawn_blocking`.
pub fn extract_contract_text(filename: &str, bytes: &[u8]) -> Result<String, AppError> {
    let is_pdf = filename.to_ascii_lowercase().ends_with(".pdf") || bytes.starts_with(b"%PDF");

    let text = if is_pdf {
        debug!(%filename, size = bytes.len(), "Extracting text from PDF upload");
        pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| AppError::ExtractionFailed(format!("unreadable PDF: {e}")))?
    } else {
        debug!(%filename, size = bytes.len(), "Treating upload as plain text");
        std::str::from_utf8(bytes)
            .map_err(|_| AppError::ExtractionFailed("document is not valid UTF-8 text".to_string()))?
            .to_string()
    };

    if text.trim().is_empty() {
        return Err(AppError::ExtractionFailed(
            "document contained no extractable text".to_string(),
        ));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        let text = extract_contract_text("contract.txt", b"This Agreement is made between A and B.")
            .expect("extract");
        assert!(text.contains("between A and B"));
    }

    #[test]
    fn empty_document_is_rejected() {
        let err = extract_contract_text("contract.txt", b"   \n  ").unwrap_err();
        assert!(matches!(err, AppError::ExtractionFailed(_)));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let err = extract_contract_text("contract.txt", &[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, AppError::ExtractionFailed(_)));
    }

    #[test]
    fn garbage_pdf_is_an_extraction_error() {
        let err = extract_contract_text("contract.pdf", b"%PDF-1.7 not really a pdf").unwrap_err();
        assert!(matches!(err, AppError::ExtractionFailed(_)));
    }
}
