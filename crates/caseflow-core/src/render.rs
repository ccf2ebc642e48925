use std::io::Cursor;
use std::str::FromStr;

use anyhow::{anyhow, bail, Result};
use docx_rs::{AlignmentType, Docx, LineSpacing, Paragraph, Run as DocxRun, RunFonts};
use serde::{Deserialize, Serialize};

use crate::types::{Block, Run};

pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justified,
}

impl Alignment {
    fn to_docx(self) -> AlignmentType {
        match self {
            Self::Left => AlignmentType::Left,
            Self::Center => AlignmentType::Center,
            Self::Right => AlignmentType::Right,
            Self::Justified => AlignmentType::Both,
        }
    }
}

impl FromStr for Alignment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "center" | "centre" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            "justified" | "justify" | "both" => Ok(Self::Justified),
            other => bail!("unknown alignment: {other}"),
        }
    }
}

/// Presentation settings for generated documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentStyle {
    pub font_family: String,
    pub body_size_pt: f32,
    /// Point sizes for heading levels 1, 2 and 3.
    pub heading_sizes_pt: [f32; 3],
    pub heading_align: Alignment,
    pub body_align: Alignment,
    /// Space after every paragraph.
    pub paragraph_spacing_pt: f32,
}

impl Default for DocumentStyle {
    fn default() -> Self {
        Self {
            font_family: "Arial".into(),
            body_size_pt: 12.0,
            heading_sizes_pt: [16.0, 14.0, 12.0],
            heading_align: Alignment::Center,
            body_align: Alignment::Justified,
            paragraph_spacing_pt: 6.0,
        }
    }
}

impl DocumentStyle {
    fn heading_size(&self, level: u8) -> f32 {
        let idx = usize::from(level.clamp(1, 3)) - 1;
        self.heading_sizes_pt[idx]
    }
}

// docx sizes are half-points, spacing is twentieths of a point
fn half_points(pt: f32) -> usize {
    (pt * 2.0).round().max(1.0) as usize
}

fn twips(pt: f32) -> u32 {
    (pt * 20.0).round().max(0.0) as u32
}

fn styled_run(text: &str, bold: bool, size_pt: f32, style: &DocumentStyle) -> DocxRun {
    let font = style.font_family.as_str();
    let run = DocxRun::new()
        .add_text(text)
        .size(half_points(size_pt))
        .fonts(RunFonts::new().ascii(font).hi_ansi(font).cs(font).east_asia(font));
    if bold {
        run.bold()
    } else {
        run
    }
}

fn render_block(block: &Block, style: &DocumentStyle) -> Paragraph {
    let spacing = LineSpacing::new().after(twips(style.paragraph_spacing_pt));
    match block {
        Block::Heading { level, text } => Paragraph::new()
            .add_run(styled_run(text, true, style.heading_size(*level), style))
            .align(style.heading_align.to_docx())
            .line_spacing(spacing),
        Block::Paragraph { runs } => runs
            .iter()
            .fold(Paragraph::new(), |p, Run { text, bold }| {
                p.add_run(styled_run(text, *bold, style.body_size_pt, style))
            })
            .align(style.body_align.to_docx())
            .line_spacing(spacing),
    }
}

/// Render blocks into a packed `.docx` file.
pub fn render_docx(blocks: &[Block], style: &DocumentStyle) -> Result<Vec<u8>> {
    let docx = blocks
        .iter()
        .fold(Docx::new(), |doc, block| doc.add_paragraph(render_block(block, style)));

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| anyhow!("failed to pack docx: {e}"))?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::translate;
    use crate::text_extract::{extract_text, FileKind};

    #[test]
    fn test_alignment_parsing() {
        assert_eq!("CENTER".parse::<Alignment>().unwrap(), Alignment::Center);
        assert_eq!("justify".parse::<Alignment>().unwrap(), Alignment::Justified);
        assert_eq!(" left ".parse::<Alignment>().unwrap(), Alignment::Left);
        assert!("diagonal".parse::<Alignment>().is_err());
    }

    #[test]
    fn test_unit_conversion() {
        assert_eq!(half_points(12.0), 24);
        assert_eq!(half_points(10.5), 21);
        assert_eq!(twips(6.0), 120);
    }

    #[test]
    fn test_heading_size_by_level() {
        let style = DocumentStyle {
            heading_sizes_pt: [20.0, 16.0, 13.0],
            ..DocumentStyle::default()
        };
        assert_eq!(style.heading_size(1), 20.0);
        assert_eq!(style.heading_size(2), 16.0);
        assert_eq!(style.heading_size(3), 13.0);
    }

    #[test]
    fn test_rendered_docx_is_a_zip_with_the_text() {
        let blocks = translate("# PAYMENT ORDER\n\nThe debtor **ACME** must pay.");
        let bytes = render_docx(&blocks, &DocumentStyle::default()).unwrap();
        assert!(bytes.starts_with(b"PK"));

        let text = extract_text(&bytes, FileKind::Docx).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "PAYMENT ORDER");
        assert_eq!(lines[1], "");
        assert!(lines[2].contains("ACME"));
        assert!(!lines[2].contains("**"));
    }

    #[test]
    fn test_empty_document_renders() {
        let bytes = render_docx(&[], &DocumentStyle::default()).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
