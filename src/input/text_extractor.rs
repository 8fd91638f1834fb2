//! Text extraction from various file formats

use crate::error::{Result, SkillMatcherError};
use pulldown_cmark::{Event, Parser, Tag};
use quick_xml::events::Event as XmlEvent;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use std::path::Path;
use tokio::fs;

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;

        let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
            SkillMatcherError::PdfExtraction(format!("Failed to extract text from PDF '{}': {}", path.display(), e))
        })?;
        Ok(text.trim().to_string())
    }
}

pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;
        let xml = Self::document_xml(&bytes)
            .map_err(|e| SkillMatcherError::DocxExtraction(format!("'{}': {}", path.display(), e)))?;
        Self::document_xml_to_text(&xml)
    }
}

impl DocxExtractor {
    const DOCUMENT_PART: &'static str = "word/document.xml";

    fn document_xml(bytes: &[u8]) -> zip::result::ZipResult<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
        let mut part = archive.by_name(Self::DOCUMENT_PART)?;
        let mut xml = String::new();
        part.read_to_string(&mut xml)?;
        Ok(xml)
    }

    /// Paragraph text of a WordprocessingML body, one paragraph per line
    pub fn document_xml_to_text(xml: &str) -> Result<String> {
        let xml_error = |e: quick_xml::Error| SkillMatcherError::DocxExtraction(e.to_string());
        let mut reader = Reader::from_str(xml);
        let mut text = String::new();
        let mut in_run_text = false;

        loop {
            match reader.read_event().map_err(xml_error)? {
                XmlEvent::Start(e) if e.local_name().as_ref() == b"t" => in_run_text = true,
                XmlEvent::End(e) => match e.local_name().as_ref() {
                    b"t" => in_run_text = false,
                    b"p" => text.push('\n'),
                    _ => {}
                },
                XmlEvent::Empty(e) => match e.local_name().as_ref() {
                    b"tab" => text.push('\t'),
                    b"br" | b"cr" => text.push('\n'),
                    _ => {}
                },
                XmlEvent::Text(chunk) if in_run_text => text.push_str(&chunk.unescape().map_err(xml_error)?),
                XmlEvent::Eof => break,
                _ => {}
            }
        }

        Ok(text.trim().to_string())
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let content = fs::read_to_string(path).await?;
        Ok(content)
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let markdown_content = fs::read_to_string(path).await?;
        Ok(Self::markdown_to_text(&markdown_content))
    }
}

impl MarkdownExtractor {
    /// Keep the visible text of a markdown document, one block per line
    pub fn markdown_to_text(markdown: &str) -> String {
        let mut text = String::new();

        for event in Parser::new(markdown) {
            match event {
                Event::Text(chunk) | Event::Code(chunk) => text.push_str(&chunk),
                Event::SoftBreak | Event::HardBreak => text.push(' '),
                Event::End(Tag::Paragraph | Tag::Heading(..) | Tag::Item | Tag::CodeBlock(_)) => {
                    text.push('\n')
                }
                _ => {}
            }
        }

        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_to_text() {
        let markdown = "# Jane Doe\n\n## Skills\n\n- **Python**, `Docker`\n- C++ and *CSS3*\n\nBuilt [APIs](https://example.com) in Node.js.";
        let text = MarkdownExtractor::markdown_to_text(markdown);

        assert_eq!(text, "Jane Doe\nSkills\nPython, Docker\nC++ and CSS3\nBuilt APIs in Node.js.");
        assert!(!text.contains("**"));
        assert!(!text.contains('#'));
    }

    #[test]
    fn test_document_xml_to_text() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p>
    <w:p>
      <w:pPr><w:pStyle w:val="Heading1"/></w:pPr>
      <w:r><w:t xml:space="preserve">Skills: </w:t></w:r>
      <w:r><w:rPr><w:b/></w:rPr><w:t>Python</w:t></w:r>
      <w:r><w:tab/><w:t>R&amp;D with C++</w:t></w:r>
    </w:p>
    <w:p/>
    <w:p><w:r><w:t>Docker</w:t><w:br/><w:t>Kubernetes</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

        let text = DocxExtractor::document_xml_to_text(xml).unwrap();
        assert_eq!(text, "Jane Doe\nSkills: Python\tR&D with C++\nDocker\nKubernetes");
    }

    #[test]
    fn test_document_xml_to_text_rejects_broken_markup() {
        let result = DocxExtractor::document_xml_to_text("<w:p><w:t>Python</w:p>");
        assert!(matches!(result, Err(SkillMatcherError::DocxExtraction(_))));
    }
}
