//! Minimal WordprocessingML support: raw-text extraction from uploaded
//! `.docx` files and a single-section writer for generated proposals.

use std::io::{Cursor, Read, Write};

use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::escape::escape;
use quick_xml::Reader;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const MAIN_PART: &str = "word/document.xml";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_OPEN: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;

const DOCUMENT_CLOSE: &str = r#"<w:sectPr/></w:body></w:document>"#;

/// Extracts the raw text of a `.docx` package, one blank line between paragraphs.
pub fn extract_raw_text(bytes: &[u8]) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).context("not a zip package")?;
    let mut xml = String::new();
    archive
        .by_name(MAIN_PART)
        .with_context(|| format!("package has no {MAIN_PART}"))?
        .read_to_string(&mut xml)?;

    let mut reader = Reader::from_str(&xml);
    let mut text = String::new();
    let mut in_text_run = false;
    // `w:tab` inside `w:pPr/w:tabs` is a tab-stop definition, not content.
    let mut in_tab_stops = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:t" => in_text_run = true,
                b"w:tabs" => in_tab_stops = true,
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:tabs" => in_tab_stops = false,
                b"w:p" => text.push_str("\n\n"),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" if !in_tab_stops => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text_run => text.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}

/// Builds a `.docx` package whose body holds `text`, one paragraph per line.
pub fn build_document(text: &str) -> Result<Vec<u8>> {
    let mut body = String::with_capacity(text.len() + 256);
    body.push_str(DOCUMENT_OPEN);
    for line in text.lines() {
        body.push_str(r#"<w:p><w:r><w:t xml:space="preserve">"#);
        body.push_str(&escape(line));
        body.push_str("</w:t></w:r></w:p>");
    }
    body.push_str(DOCUMENT_CLOSE);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, contents) in [
        ("[Content_Types].xml", CONTENT_TYPES_XML),
        ("_rels/.rels", ROOT_RELS_XML),
        (MAIN_PART, body.as_str()),
    ] {
        zip.start_file(name, options)?;
        zip.write_all(contents.as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_built_document_is_readable_with_markup_preserved() {
        let html = "<h1>Grid Study & Validation</h1>\n<p>Scope</p>";
        let bytes = build_document(html).unwrap();

        let text = extract_raw_text(&bytes).unwrap();
        assert_eq!(text, "<h1>Grid Study & Validation</h1>\n\n<p>Scope</p>\n\n");
    }

    #[test]
    fn test_built_document_has_required_parts() {
        let bytes = build_document("hello").unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        for part in ["[Content_Types].xml", "_rels/.rels", "word/document.xml"] {
            assert!(archive.by_name(part).is_ok(), "missing {part}");
        }
    }

    #[test]
    fn test_extract_handles_tabs_and_breaks() {
        let xml = r#"<?xml version="1.0"?><w:document xmlns:w="w"><w:body><w:p><w:r><w:t>Bid</w:t><w:tab/><w:t>Scope</w:t><w:br/><w:t>Line two</w:t></w:r></w:p></w:body></w:document>"#;
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file(MAIN_PART, FileOptions::default()).unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        assert_eq!(extract_raw_text(&bytes).unwrap(), "Bid\tScope\nLine two\n\n");
    }

    #[test]
    fn test_extract_ignores_tab_stop_definitions() {
        let xml = r#"<?xml version="1.0"?><w:document xmlns:w="w"><w:body><w:p><w:pPr><w:tabs><w:tab w:val="center" w:pos="4680"/><w:tab w:val="right" w:pos="9360"/></w:tabs></w:pPr><w:r><w:t>Scope</w:t><w:tab/><w:t>1.0</w:t></w:r></w:p></w:body></w:document>"#;
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file(MAIN_PART, FileOptions::default()).unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        assert_eq!(extract_raw_text(&bytes).unwrap(), "Scope\t1.0\n\n");
    }

    #[test]
    fn test_extract_rejects_non_zip_input() {
        assert!(extract_raw_text(b"plain text, not a package").is_err());
    }
}
