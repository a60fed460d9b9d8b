//! Structured document model and its `.docx` serializer
//!
//! A [`StructuredDocument`] is the flat block list the synthesizer produces
//! for one page. It lives only long enough to be written out.

mod docx;

pub use docx::{write_document, DocumentWriter};

/// Inline run inside a paragraph, heading or list item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text {
        text: String,
        bold: bool,
        italic: bool,
    },
    Link {
        text: String,
        /// Absolute URL
        href: String,
    },
}

impl Inline {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            bold: false,
            italic: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            bold: true,
            italic: false,
        }
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            bold: false,
            italic: true,
        }
    }

    pub fn link(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self::Link {
            text: text.into(),
            href: href.into(),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Text { text, .. } | Self::Link { text, .. } => text,
        }
    }

    pub(crate) fn text_mut(&mut self) -> &mut String {
        match self {
            Self::Text { text, .. } | Self::Link { text, .. } => text,
        }
    }
}

/// Block-level node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        /// 1 through 6
        level: u8,
        runs: Vec<Inline>,
        /// Rendered bold
        emphasized: bool,
    },
    Paragraph(Vec<Inline>),
    ListItem(Vec<Inline>),
    /// Reference to an image saved next to the document
    Image {
        alt: String,
        file_name: String,
    },
    /// Empty line
    Spacer,
    PageBreak,
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph(vec![Inline::plain(text)])
    }

    /// Concatenated text of the block's runs
    pub fn text(&self) -> String {
        match self {
            Self::Heading { runs, .. } | Self::Paragraph(runs) | Self::ListItem(runs) => {
                runs.iter().map(Inline::text).collect()
            }
            Self::Image { alt, file_name } => {
                format!("[Image: {} - saved as images/{}]", alt, file_name)
            }
            Self::Spacer | Self::PageBreak => String::new(),
        }
    }

    /// True for blocks that carry visible content
    pub fn is_content(&self) -> bool {
        match self {
            Self::Spacer | Self::PageBreak => false,
            Self::Image { .. } => true,
            _ => !self.text().trim().is_empty(),
        }
    }
}

/// Ordered block sequence for one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredDocument {
    pub blocks: Vec<Block>,
}

impl StructuredDocument {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of blocks with visible content
    pub fn content_blocks(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_content()).count()
    }

    /// Visible text, one block per line
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .filter(|b| b.is_content())
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
