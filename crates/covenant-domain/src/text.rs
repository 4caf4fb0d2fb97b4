//! Extracted document text
//!
//! Text is kept as an ordered sequence of blocks rather than one string so that
//! layout structure (headings, table cells, page boundaries) survives into
//! recognition and field resolution. Blocks are joined with a single newline to
//! form the document's full text; every block records where it starts in that
//! joined text (its origin, counted in characters).

use serde::{Deserialize, Serialize};

/// Separator inserted between blocks in [`ExtractedText::full_text`]
pub const BLOCK_SEPARATOR: char = '\n';

/// Structural role of a text block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockRole {
    /// Body paragraph
    Paragraph,

    /// One cell of a table
    TableCell,

    /// Title or section heading
    Heading,
}

impl BlockRole {
    /// Get the role name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockRole::Paragraph => "paragraph",
            BlockRole::TableCell => "table-cell",
            BlockRole::Heading => "heading",
        }
    }
}

/// Position of a table cell within the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableCoordinates {
    /// Index of the table in document order
    pub table: usize,
    /// Zero-based row index
    pub row: usize,
    /// Zero-based column index
    pub column: usize,
}

/// Where a block came from in the source document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockLocation {
    /// One-based page number, when the format has pages
    pub page: Option<u32>,
    /// Table coordinates, for table cells
    pub cell: Option<TableCoordinates>,
}

impl BlockLocation {
    /// Location on a page
    pub fn page(page: u32) -> Self {
        Self { page: Some(page), cell: None }
    }

    /// Location in a table
    pub fn cell(table: usize, row: usize, column: usize) -> Self {
        Self {
            page: None,
            cell: Some(TableCoordinates { table, row, column }),
        }
    }
}

/// A non-empty run of text with a structural role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    text: String,
    role: BlockRole,
    origin: usize,
    char_len: usize,
    location: BlockLocation,
}

impl TextBlock {
    /// The block's text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The block's structural role
    pub fn role(&self) -> BlockRole {
        self.role
    }

    /// Character offset of the block's first character in the full text
    pub fn origin(&self) -> usize {
        self.origin
    }

    /// Length of the block in characters
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    /// Character offset one past the block's last character in the full text
    pub fn end(&self) -> usize {
        self.origin + self.char_len
    }

    /// Where the block came from in the source document
    pub fn location(&self) -> BlockLocation {
        self.location
    }
}

/// Text extracted from one document, in reading order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedText {
    blocks: Vec<TextBlock>,
    full_text: String,
    char_len: usize,
}

impl ExtractedText {
    /// Start building extracted text block by block
    pub fn builder() -> ExtractedTextBuilder {
        ExtractedTextBuilder::default()
    }

    /// Build from a list of (role, text) pairs, skipping empty ones
    pub fn from_blocks<'a, I>(blocks: I) -> Self
    where
        I: IntoIterator<Item = (BlockRole, &'a str)>,
    {
        let mut builder = Self::builder();
        for (role, text) in blocks {
            builder.push(role, text);
        }
        builder.build()
    }

    /// The blocks in reading order
    pub fn blocks(&self) -> &[TextBlock] {
        &self.blocks
    }

    /// Number of blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether no text was extracted
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// All blocks joined by [`BLOCK_SEPARATOR`]
    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    /// Length of the full text in characters
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    /// Find the block containing a character offset of the full text
    pub fn block_at(&self, offset: usize) -> Option<(usize, &TextBlock)> {
        let idx = self.blocks.partition_point(|b| b.end() <= offset);
        self.blocks
            .get(idx)
            .filter(|b| b.origin() <= offset)
            .map(|b| (idx, b))
    }
}

/// Incrementally assembles [`ExtractedText`] while maintaining its invariants
///
/// Whitespace-only blocks are dropped, surrounding whitespace is trimmed, line
/// endings are normalized and control characters other than newline and tab
/// are removed.
#[derive(Debug, Default)]
pub struct ExtractedTextBuilder {
    blocks: Vec<TextBlock>,
    full_text: String,
    char_len: usize,
}

impl ExtractedTextBuilder {
    /// Append a block with no location information
    ///
    /// Returns the index of the new block, or `None` if the text was empty.
    pub fn push(&mut self, role: BlockRole, text: &str) -> Option<usize> {
        self.push_located(role, text, BlockLocation::default())
    }

    /// Append a block with its location in the source document
    pub fn push_located(&mut self, role: BlockRole, text: &str, location: BlockLocation) -> Option<usize> {
        let cleaned = clean_block_text(text);
        if cleaned.is_empty() {
            return None;
        }

        if !self.blocks.is_empty() {
            self.full_text.push(BLOCK_SEPARATOR);
            self.char_len += 1;
        }

        let char_len = cleaned.chars().count();
        let origin = self.char_len;
        self.full_text.push_str(&cleaned);
        self.char_len += char_len;

        self.blocks.push(TextBlock {
            text: cleaned,
            role,
            origin,
            char_len,
            location,
        });
        Some(self.blocks.len() - 1)
    }

    /// Number of blocks pushed so far
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether no block has been pushed yet
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Finish building
    pub fn build(self) -> ExtractedText {
        ExtractedText {
            blocks: self.blocks,
            full_text: self.full_text,
            char_len: self.char_len,
        }
    }
}

fn clean_block_text(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    normalized
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect::<String>()
        .trim()
        .to_string()
}
