use crate::extraction::ExtractionError;

/// Extracts the text layer of a PDF. Runs inside `spawn_blocking`.
pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    if !bytes.starts_with(b"%PDF") {
        return Err(ExtractionError::CorruptDocument(
            "missing %PDF header".to_string(),
        ));
    }
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractionError::CorruptDocument(format!("PDF extraction error: {e}")))
}
