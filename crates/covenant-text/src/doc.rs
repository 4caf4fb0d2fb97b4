//! Word 97-2003 (`.doc`) text extraction
//!
//! A `.doc` file is an OLE compound file. The `WordDocument` stream starts
//! with the File Information Block (FIB), which points at the piece table
//! (the CLX) stored in either the `0Table` or the `1Table` stream. The piece
//! table maps character positions to byte ranges of the `WordDocument`
//! stream, each holding either 8-bit (cp1252) or UTF-16LE text.
//!
//! Special characters in the text stream:
//!
//! | char   | meaning                      |
//! |--------|------------------------------|
//! | `\r`   | end of paragraph             |
//! | `\x07` | end of table cell or row     |
//! | `\x0C` | page or section break        |
//! | `\x0B` | line break                   |
//! | `\x13` | field begin (instructions)   |
//! | `\x14` | field separator (result)     |
//! | `\x15` | field end                    |

use crate::error::TextError;
use covenant_domain::{BlockLocation, BlockRole, DocumentFormat, ExtractedText, ExtractedTextBuilder};
use std::io::{Cursor, Read};

const WORD_IDENT: u16 = 0xA5EC;
const FIB_FLAGS: usize = 0x000A;
const FIB_FC_CLX: usize = 0x01A2;
const FIB_LCB_CLX: usize = 0x01A6;
const FIB_MIN_LEN: usize = FIB_LCB_CLX + 4;

const FLAG_ENCRYPTED: u16 = 0x0100;
const FLAG_WHICH_TABLE: u16 = 0x0200;

const CLXT_PRC: u8 = 0x01;
const CLXT_PCDT: u8 = 0x02;
const PCD_LEN: usize = 8;
const FC_COMPRESSED: u32 = 0x4000_0000;
const FC_MASK: u32 = 0x3FFF_FFFF;

/// Extract the text of a Word 97-2003 binary document
pub(crate) fn extract(bytes: &[u8], declared: DocumentFormat) -> Result<ExtractedText, TextError> {
    let corrupt = |reason: String| TextError::corrupt(declared, reason);

    let mut file = cfb::CompoundFile::open(Cursor::new(bytes)).map_err(|e| corrupt(e.to_string()))?;
    let word = read_stream(&mut file, "/WordDocument").map_err(|e| corrupt(format!("WordDocument stream: {}", e)))?;

    if word.len() < FIB_MIN_LEN {
        return Err(corrupt("FIB is truncated".to_string()));
    }
    if read_u16(&word, 0) != Some(WORD_IDENT) {
        return Err(corrupt("not a Word binary document".to_string()));
    }

    let flags = read_u16(&word, FIB_FLAGS).unwrap_or(0);
    if flags & FLAG_ENCRYPTED != 0 {
        return Err(corrupt("document is encrypted".to_string()));
    }

    let table_name = if flags & FLAG_WHICH_TABLE != 0 {
        "/1Table"
    } else {
        "/0Table"
    };
    let table = read_stream(&mut file, table_name).map_err(|e| corrupt(format!("{} stream: {}", table_name, e)))?;

    let fc_clx = read_u32(&word, FIB_FC_CLX).unwrap_or(0) as usize;
    let lcb_clx = read_u32(&word, FIB_LCB_CLX).unwrap_or(0) as usize;
    let clx = fc_clx
        .checked_add(lcb_clx)
        .and_then(|end| table.get(fc_clx..end))
        .ok_or_else(|| corrupt("piece table lies outside the table stream".to_string()))?;

    let text = decode_pieces(&word, clx).map_err(corrupt)?;
    tracing::debug!(chars = text.chars().count(), "Decoded DOC piece table");

    let mut builder = ExtractedText::builder();
    split_blocks(&text, &mut builder);
    Ok(builder.build())
}

fn read_stream<F: Read + std::io::Seek>(file: &mut cfb::CompoundFile<F>, path: &str) -> std::io::Result<Vec<u8>> {
    let mut stream = file.open_stream(path)?;
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf)?;
    Ok(buf)
}

fn read_u16(bytes: &[u8], offset: usize) -> Option<u16> {
    let slice = bytes.get(offset..offset + 2)?;
    Some(u16::from_le_bytes([slice[0], slice[1]]))
}

fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let slice = bytes.get(offset..offset + 4)?;
    Some(u32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]]))
}

/// Walk the CLX and concatenate the text of every piece
fn decode_pieces(word: &[u8], clx: &[u8]) -> Result<String, String> {
    let mut pos = 0;

    // Skip formatting records (Prc) until the piece table descriptor (Pcdt)
    loop {
        match clx.get(pos) {
            Some(&CLXT_PRC) => {
                let cb = read_u16(clx, pos + 1).ok_or("truncated Prc record")? as usize;
                pos += 3 + cb;
            }
            Some(&CLXT_PCDT) => break,
            Some(other) => return Err(format!("unexpected CLX record type {:#04x}", other)),
            None => return Err("CLX has no piece table".to_string()),
        }
    }

    let lcb = read_u32(clx, pos + 1).ok_or("truncated Pcdt record")? as usize;
    let plc = clx
        .get(pos + 5..pos + 5 + lcb)
        .ok_or("piece table is truncated")?;
    if lcb < 4 || (lcb - 4) % (4 + PCD_LEN) != 0 {
        return Err(format!("piece table has invalid length {}", lcb));
    }

    let pieces = (lcb - 4) / (4 + PCD_LEN);
    let descriptors = 4 * (pieces + 1);
    let mut text = String::new();

    for i in 0..pieces {
        let cp_start = read_u32(plc, 4 * i).ok_or("truncated CP array")?;
        let cp_end = read_u32(plc, 4 * (i + 1)).ok_or("truncated CP array")?;
        let chars = cp_end.checked_sub(cp_start).ok_or("piece CPs are not increasing")? as usize;

        let fc = read_u32(plc, descriptors + i * PCD_LEN + 2).ok_or("truncated piece descriptor")?;
        if fc & FC_COMPRESSED != 0 {
            let offset = ((fc & FC_MASK) / 2) as usize;
            let bytes = word
                .get(offset..offset + chars)
                .ok_or("8-bit piece lies outside the WordDocument stream")?;
            text.extend(bytes.iter().map(|&b| cp1252(b)));
        } else {
            let offset = (fc & FC_MASK) as usize;
            let bytes = word
                .get(offset..offset + 2 * chars)
                .ok_or("UTF-16 piece lies outside the WordDocument stream")?;
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect();
            text.extend(char::decode_utf16(units).map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER)));
        }
    }

    Ok(text)
}

/// Decode one Windows-1252 byte
fn cp1252(byte: u8) -> char {
    match byte {
        0x80 => '\u{20AC}',
        0x82 => '\u{201A}',
        0x84 => '\u{201E}',
        0x85 => '\u{2026}',
        0x91 => '\u{2018}',
        0x92 => '\u{2019}',
        0x93 => '\u{201C}',
        0x94 => '\u{201D}',
        0x95 => '\u{2022}',
        0x96 => '\u{2013}',
        0x97 => '\u{2014}',
        0x99 => '\u{2122}',
        other => char::from(other),
    }
}

/// Split decoded document text into paragraph and table-cell blocks
///
/// Paragraph marks end paragraphs and cell marks end cells. A cell mark that
/// directly follows another one with nothing in between ends a row. The first
/// paragraph after a row end closes the table.
///
/// The first row of a table fixes its column count, so later rows may hold
/// empty cells anywhere. An empty cell inside the first row still reads as a
/// row end, since row marks are only distinguishable through table
/// properties.
fn split_blocks(text: &str, builder: &mut ExtractedTextBuilder) {
    let mut current = String::new();
    // true while inside field instructions
    let mut fields: Vec<bool> = Vec::new();

    let mut table = 0usize;
    let mut row = 0usize;
    let mut column = 0usize;
    let mut in_table = false;
    let mut after_cell = false;
    let mut columns: Option<usize> = None;

    for c in text.chars() {
        match c {
            '\u{13}' => {
                fields.push(true);
                continue;
            }
            '\u{14}' => {
                if let Some(top) = fields.last_mut() {
                    *top = false;
                }
                continue;
            }
            '\u{15}' => {
                fields.pop();
                continue;
            }
            _ if fields.iter().any(|&instruction| instruction) => continue,
            _ => {}
        }

        match c {
            '\r' => {
                if in_table && column == 0 && row > 0 {
                    in_table = false;
                    table += 1;
                    row = 0;
                    columns = None;
                }
                builder.push(BlockRole::Paragraph, &current);
                current.clear();
                after_cell = false;
            }
            '\u{07}' => {
                let row_end = after_cell && current.is_empty() && columns.is_none_or(|width| column >= width);
                if row_end {
                    columns.get_or_insert(column);
                    row += 1;
                    column = 0;
                    after_cell = false;
                } else if after_cell && current.is_empty() {
                    column += 1;
                } else {
                    in_table = true;
                    builder.push_located(BlockRole::TableCell, &current, BlockLocation::cell(table, row, column));
                    current.clear();
                    column += 1;
                    after_cell = true;
                }
            }
            '\u{0C}' => {
                builder.push(BlockRole::Paragraph, &current);
                current.clear();
                after_cell = false;
            }
            '\u{0B}' => current.push('\n'),
            '\u{1E}' => current.push('-'),
            '\u{1F}' => {}
            '\u{A0}' => current.push(' '),
            '\t' => current.push('\t'),
            c if c.is_control() => {}
            c => {
                current.push(c);
                after_cell = false;
            }
        }
    }

    builder.push(BlockRole::Paragraph, &current);
}
