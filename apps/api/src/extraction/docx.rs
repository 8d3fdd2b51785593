//! DOCX text extraction: reads `word/document.xml` out of the OOXML zip container and joins the
//! `w:t` runs, one line per paragraph.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::extraction::ExtractionError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Extracts paragraph text from DOCX bytes. Runs inside `spawn_blocking`.
pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractionError::CorruptDocument(format!("not a DOCX container: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractionError::CorruptDocument(format!("missing {DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractionError::CorruptDocument(format!("unreadable {DOCUMENT_PART}: {e}")))?;

    paragraphs_from_xml(&xml)
}

fn paragraphs_from_xml(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text_run => {
                let run = t.unescape().map_err(|e| {
                    ExtractionError::CorruptDocument(format!("bad text run in {DOCUMENT_PART}: {e}"))
                })?;
                text.push_str(&run);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractionError::CorruptDocument(format!(
                    "malformed {DOCUMENT_PART} at byte {}: {e}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn build_docx(document_xml: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(DOCUMENT_PART, zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p>
    <w:p><w:r><w:t xml:space="preserve">Rust &amp; Go </w:t></w:r><w:r><w:tab/><w:t>jane@example.com</w:t></w:r></w:p>
    <w:p><w:r><w:rPr><w:b/></w:rPr><w:t>Experience</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    #[test]
    fn test_extracts_paragraphs_in_order() {
        let text = extract_text(&build_docx(DOCUMENT)).unwrap();
        assert_eq!(text, "Jane Doe\nRust & Go \tjane@example.com\nExperience\n");
    }

    #[test]
    fn test_ignores_text_outside_runs() {
        let xml = r#"<w:document xmlns:w="x"><w:body><w:p><w:instrText>PAGE</w:instrText><w:t>Kept</w:t></w:p></w:body></w:document>"#;
        assert_eq!(paragraphs_from_xml(xml).unwrap(), "Kept\n");
    }

    #[test]
    fn test_not_a_zip_is_corrupt() {
        let err = extract_text(b"%PDF-1.7 not a docx").unwrap_err();
        assert!(matches!(err, ExtractionError::CorruptDocument(_)));
    }

    #[test]
    fn test_zip_without_document_part_is_corrupt() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/styles.xml", zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(b"<styles/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let err = extract_text(&bytes).unwrap_err();
        assert!(err.to_string().contains(DOCUMENT_PART));
    }
}
