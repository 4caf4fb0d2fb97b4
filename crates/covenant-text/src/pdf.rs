//! PDF text extraction using the pdf-extract crate
//!
//! Handles digital PDFs with an embedded text layer. Every page boundary is a
//! block boundary; within a page, blank lines separate paragraphs.

use crate::error::TextError;
use covenant_domain::{BlockLocation, BlockRole, DocumentFormat, ExtractedText, ExtractedTextBuilder};
use std::panic;

/// Headings longer than this are treated as body text
const MAX_HEADING_CHARS: usize = 100;

/// Minimum letters for an all-caps line to count as a heading
const MIN_HEADING_LETTERS: usize = 3;

/// Extract the text of a PDF, one page at a time
pub(crate) fn extract(bytes: &[u8], declared: DocumentFormat) -> Result<ExtractedText, TextError> {
    // pdf-extract panics on some malformed inputs rather than returning an error
    let pages = panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
        .map_err(|_| TextError::corrupt(declared, "PDF parser aborted on malformed content"))?
        .map_err(|e| TextError::corrupt(declared, e.to_string()))?;

    tracing::debug!(pages = pages.len(), "Parsed PDF text layer");

    let mut builder = ExtractedText::builder();
    for (index, page) in pages.iter().enumerate() {
        let page_number = u32::try_from(index + 1).unwrap_or(u32::MAX);
        push_page(&mut builder, page_number, page);
    }
    Ok(builder.build())
}

/// Split one page of text into paragraph and heading blocks
pub(crate) fn push_page(builder: &mut ExtractedTextBuilder, page_number: u32, page: &str) {
    for paragraph in paragraphs(page) {
        let role = if is_heading(&paragraph) {
            BlockRole::Heading
        } else {
            BlockRole::Paragraph
        };
        builder.push_located(role, &paragraph, BlockLocation::page(page_number));
    }
}

/// Group non-blank lines into paragraphs
fn paragraphs(page: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in page.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }

    paragraphs
}

/// A short single line whose letters are all upper case
fn is_heading(paragraph: &str) -> bool {
    if paragraph.contains('\n') || paragraph.chars().count() > MAX_HEADING_CHARS {
        return false;
    }
    let letters: Vec<char> = paragraph.chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() >= MIN_HEADING_LETTERS && letters.iter().all(|c| c.is_uppercase())
}
