//! DOCX text extraction using the docx-rs crate
//!
//! The document tree looks like:
//!
//! ```text
//! Document
//!   └── children: Vec<DocumentChild>
//!         ├── Paragraph → Run → Text
//!         └── Table → TableRow → TableCell → Paragraph | Table
//! ```
//!
//! Body paragraphs become paragraph or heading blocks in document order. Each
//! table cell becomes one table-cell block; nested tables are flattened in
//! reading order and numbered after their parent.

use crate::error::TextError;
use covenant_domain::{BlockLocation, BlockRole, DocumentFormat, ExtractedText, ExtractedTextBuilder};
use docx_rs::{
    DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCellContent, TableChild, TableRowChild,
};

/// Extract the text of a DOCX package
pub(crate) fn extract(bytes: &[u8], declared: DocumentFormat) -> Result<ExtractedText, TextError> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| TextError::corrupt(declared, format!("{:?}", e)))?;

    let mut walker = Walker::default();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(paragraph) => walker.paragraph(paragraph),
            DocumentChild::Table(table) => walker.table(table),
            _ => {}
        }
    }

    tracing::debug!(
        blocks = walker.builder.len(),
        tables = walker.tables,
        "Parsed DOCX body"
    );
    Ok(walker.builder.build())
}

#[derive(Default)]
struct Walker {
    builder: ExtractedTextBuilder,
    tables: usize,
}

impl Walker {
    fn paragraph(&mut self, paragraph: &Paragraph) {
        let role = if is_heading_style(paragraph) {
            BlockRole::Heading
        } else {
            BlockRole::Paragraph
        };
        self.builder.push(role, &paragraph_text(paragraph));
    }

    fn table(&mut self, table: &Table) {
        let index = self.tables;
        self.tables += 1;

        for (row_index, row) in table.rows.iter().enumerate() {
            let TableChild::TableRow(row) = row else {
                continue;
            };
            for (column, cell) in row.cells.iter().enumerate() {
                let TableRowChild::TableCell(cell) = cell else {
                    continue;
                };

                let mut text = Vec::new();
                let mut nested = Vec::new();
                for content in &cell.children {
                    match content {
                        TableCellContent::Paragraph(paragraph) => text.push(paragraph_text(paragraph)),
                        TableCellContent::Table(inner) => nested.push(inner),
                        _ => {}
                    }
                }

                let text = text.join("\n");
                self.builder
                    .push_located(BlockRole::TableCell, &text, BlockLocation::cell(index, row_index, column));

                for inner in nested {
                    self.table(inner);
                }
            }
        }
    }
}

fn is_heading_style(paragraph: &Paragraph) -> bool {
    paragraph
        .property
        .style
        .as_ref()
        .map(|style| {
            let name = style.val.to_ascii_lowercase();
            name.starts_with("heading") || name == "title"
        })
        .unwrap_or(false)
}

/// Concatenate the text runs of a paragraph, including hyperlink runs
fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    collect_runs(&paragraph.children, &mut text);
    text
}

fn collect_runs(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for run_child in &run.children {
                    match run_child {
                        RunChild::Text(t) => out.push_str(&t.text),
                        RunChild::Tab(_) => out.push('\t'),
                        RunChild::Break(_) => out.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => collect_runs(&link.children, out),
            _ => {}
        }
    }
}
