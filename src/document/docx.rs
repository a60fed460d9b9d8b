//! `.docx` serialization
//!
//! Every document opens with the page title as a level-1 heading and the page
//! URL as a hyperlink, followed by the synthesized body. Files land under the
//! documents root at the path derived from the page URL.

use crate::document::{Block, Inline, StructuredDocument};
use crate::url::document_relative_path;
use crate::ScribeError;
use docx_rs::{
    BreakType, Docx, Hyperlink, HyperlinkType, PageMargin, Paragraph, Run, Style, StyleType,
};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use url::Url;

/// One inch in twentieths of a point
const MARGIN_TWIPS: i32 = 1440;

/// Heading font sizes in half-points, level 1 first
const HEADING_SIZES: [usize; 6] = [32, 28, 26, 24, 22, 20];

const LIST_PREFIX: &str = "• ";

/// Writes documents below a fixed root directory
#[derive(Debug, Clone)]
pub struct DocumentWriter {
    root: PathBuf,
}

impl DocumentWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Serializes `doc` for the page at `page_url`
    ///
    /// Returns the absolute path of the written file. An existing file at the
    /// same path is replaced.
    pub fn write(
        &self,
        doc: &StructuredDocument,
        title: &str,
        page_url: &Url,
    ) -> Result<PathBuf, ScribeError> {
        let path = self.root.join(document_relative_path(page_url));
        if let Some(folder) = path.parent() {
            fs::create_dir_all(folder)?;
        }

        write_document(doc, title, page_url, &path)?;
        tracing::debug!("Wrote {} ({} blocks)", path.display(), doc.len());
        Ok(path)
    }
}

/// Serializes `doc` to `path`
pub fn write_document(
    doc: &StructuredDocument,
    title: &str,
    page_url: &Url,
    path: &Path,
) -> Result<(), ScribeError> {
    let title = if title.trim().is_empty() {
        page_url.as_str()
    } else {
        title
    };

    let mut docx = base_document()
        .add_paragraph(
            Paragraph::new()
                .style("Heading1")
                .add_run(Run::new().add_text(title)),
        )
        .add_paragraph(Paragraph::new().add_hyperlink(hyperlink(page_url.as_str(), page_url.as_str())))
        .add_paragraph(Paragraph::new());

    for block in &doc.blocks {
        docx = docx.add_paragraph(block_paragraph(block));
    }

    let file = File::create(path)?;
    docx.build()
        .pack(file)
        .map_err(|e| ScribeError::Document {
            url: page_url.to_string(),
            message: e.to_string(),
        })
}

fn base_document() -> Docx {
    let margins = PageMargin::new()
        .top(MARGIN_TWIPS)
        .bottom(MARGIN_TWIPS)
        .left(MARGIN_TWIPS)
        .right(MARGIN_TWIPS);

    let mut docx = Docx::new().page_margin(margins);

    for (i, size) in HEADING_SIZES.iter().enumerate() {
        let level = i + 1;
        docx = docx.add_style(
            Style::new(&format!("Heading{}", level), StyleType::Paragraph)
                .name(&format!("Heading {}", level))
                .size(*size)
                .bold(),
        );
    }

    docx.add_style(
        Style::new("Hyperlink", StyleType::Character)
            .name("Hyperlink")
            .color("0563C1")
            .underline("single"),
    )
}

fn block_paragraph(block: &Block) -> Paragraph {
    match block {
        Block::Heading {
            level,
            runs,
            emphasized,
        } => {
            let level = (*level).clamp(1, 6);
            add_runs(Paragraph::new(), runs, *emphasized).style(&format!("Heading{}", level))
        }
        Block::Paragraph(runs) => add_runs(Paragraph::new(), runs, false),
        Block::ListItem(runs) => add_runs(
            Paragraph::new().add_run(Run::new().add_text(LIST_PREFIX)),
            runs,
            false,
        ),
        Block::Image { .. } => {
            Paragraph::new().add_run(Run::new().add_text(block.text()).italic())
        }
        Block::Spacer => Paragraph::new(),
        Block::PageBreak => Paragraph::new().add_run(Run::new().add_break(BreakType::Page)),
    }
}

fn add_runs(mut paragraph: Paragraph, runs: &[Inline], force_bold: bool) -> Paragraph {
    for inline in runs {
        paragraph = match inline {
            Inline::Text { text, bold, italic } => {
                let mut run = Run::new().add_text(text);
                if *bold || force_bold {
                    run = run.bold();
                }
                if *italic {
                    run = run.italic();
                }
                paragraph.add_run(run)
            }
            Inline::Link { text, href } => paragraph.add_hyperlink(hyperlink(text, href)),
        };
    }
    paragraph
}

fn hyperlink(text: &str, href: &str) -> Hyperlink {
    Hyperlink::new(href, HyperlinkType::External)
        .add_run(Run::new().add_text(text).style("Hyperlink"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    fn document_xml(path: &Path) -> String {
        let file = File::open(path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    #[test]
    fn test_write_places_file_by_url() {
        let dir = TempDir::new().unwrap();
        let writer = DocumentWriter::new(dir.path());
        let url = Url::parse("https://example.com/about/team.html").unwrap();

        let path = writer
            .write(&StructuredDocument::default(), "Team", &url)
            .unwrap();

        assert_eq!(path, dir.path().join("example_com/about/team.html/team.docx"));
        assert!(path.is_file());
    }

    #[test]
    fn test_document_contains_title_url_and_body() {
        let dir = TempDir::new().unwrap();
        let url = Url::parse("https://example.com/").unwrap();
        let doc = StructuredDocument::new(vec![
            Block::Heading {
                level: 2,
                runs: vec![Inline::plain("Measuring Care,")],
                emphasized: true,
            },
            Block::ListItem(vec![Inline::plain("first item")]),
            Block::Paragraph(vec![
                Inline::plain("See "),
                Inline::link("docs", "https://example.com/docs"),
            ]),
            Block::PageBreak,
        ]);

        let path = DocumentWriter::new(dir.path())
            .write(&doc, "Home Page", &url)
            .unwrap();
        let xml = document_xml(&path);

        assert!(xml.contains("Home Page"));
        assert!(xml.contains("Measuring Care,"));
        assert!(xml.contains("• "));
        assert!(xml.contains("first item"));
        assert!(xml.contains("docs"));
        assert!(xml.contains("Heading2"));
    }

    #[test]
    fn test_blank_title_falls_back_to_url() {
        let dir = TempDir::new().unwrap();
        let url = Url::parse("https://example.com/x").unwrap();
        let path = DocumentWriter::new(dir.path())
            .write(&StructuredDocument::default(), "  ", &url)
            .unwrap();
        assert!(document_xml(&path).contains("https://example.com/x"));
    }
}
