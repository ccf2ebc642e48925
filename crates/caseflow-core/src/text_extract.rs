use anyhow::{anyhow, Context, Result};
use docx_rs::{
    DocumentChild, ParagraphChild, RunChild, Table, TableCellContent, TableChild, TableRowChild,
};
use lopdf::{Document, Object};

use crate::error::CaseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Docx,
}

impl FileKind {
    /// Determine the kind from a file name or storage path suffix.
    pub fn from_name(name: &str) -> Result<Self, CaseError> {
        let lower = name.trim().to_ascii_lowercase();
        if lower.ends_with(".pdf") {
            Ok(Self::Pdf)
        } else if lower.ends_with(".docx") {
            Ok(Self::Docx)
        } else {
            Err(CaseError::UnsupportedFormat(name.to_string()))
        }
    }
}

/// Extract plain text from a case file.
pub fn extract_text(bytes: &[u8], kind: FileKind) -> Result<String, CaseError> {
    let text = match kind {
        FileKind::Pdf => pdf_text(bytes),
        FileKind::Docx => docx_text(bytes),
    };
    text.map_err(CaseError::ExtractionFailed)
}

/// One line per page; the fragments on a page are joined with single spaces.
fn pdf_text(bytes: &[u8]) -> Result<String> {
    let doc = Document::load_mem(bytes).context("failed to parse PDF")?;

    let mut pages = Vec::new();
    for (page_num, page_id) in doc.get_pages() {
        let content = doc
            .get_and_decode_page_content(page_id)
            .with_context(|| format!("failed to decode content of page {page_num}"))?;
        let fragments: Vec<String> = content
            .operations
            .iter()
            .filter_map(|op| text_fragment(&op.operator, &op.operands))
            .collect();
        pages.push(
            fragments
                .iter()
                .flat_map(|f| f.split_whitespace())
                .collect::<Vec<_>>()
                .join(" "),
        );
    }
    Ok(pages.join("\n"))
}

// Text-showing operators: Tj, ' and " carry one string; TJ an array of
// strings interleaved with kerning offsets.
fn text_fragment(operator: &str, operands: &[Object]) -> Option<String> {
    let text = match operator {
        "Tj" | "'" | "\"" => match operands.last()? {
            Object::String(bytes, _) => decode_pdf_string(bytes),
            _ => return None,
        },
        "TJ" => match operands.first()? {
            Object::Array(items) => items
                .iter()
                .filter_map(|item| match item {
                    Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
                    _ => None,
                })
                .collect(),
            _ => return None,
        },
        _ => return None,
    };
    Some(text)
}

fn decode_pdf_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        },
        _ => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

/// One line per body paragraph; table cells contribute one line per cell
/// paragraph, in row order.
fn docx_text(bytes: &[u8]) -> Result<String> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| anyhow!("failed to read DOCX: {e}"))?;

    let mut lines = Vec::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(p) => lines.push(paragraph_line(&p.children)),
            DocumentChild::Table(table) => push_table_lines(table, &mut lines),
            _ => {},
        }
    }
    Ok(lines.join("\n"))
}

fn paragraph_line(children: &[ParagraphChild]) -> String {
    let mut line = String::new();
    push_paragraph_children(children, &mut line);
    line
}

fn push_table_lines(table: &Table, lines: &mut Vec<String>) {
    for TableChild::TableRow(row) in &table.rows {
        for TableRowChild::TableCell(cell) in &row.cells {
            for content in &cell.children {
                match content {
                    TableCellContent::Paragraph(p) => lines.push(paragraph_line(&p.children)),
                    TableCellContent::Table(nested) => push_table_lines(nested, lines),
                    _ => {},
                }
            }
        }
    }
}

fn push_paragraph_children(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for rc in &run.children {
                    match rc {
                        RunChild::Text(t) => out.push_str(&t.text),
                        RunChild::Tab(_) => out.push('\t'),
                        RunChild::Break(_) => out.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => push_paragraph_children(&link.children, out),
            _ => {}
        }
    }
}
