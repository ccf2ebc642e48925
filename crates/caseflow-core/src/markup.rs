//! Line-oriented markup used by drafted documents.
//!
//! Recognized per line, in order: blank line, `### `, `## `, `# ` headings
//! (after trimming), otherwise a paragraph whose `**`-delimited spans are bold.
//! An unmatched trailing `**` stays in the text as a literal.

use crate::types::{Block, Run};

const BOLD_DELIMITER: &str = "**";

/// Translate markup text into document blocks. Every input is valid markup.
pub fn translate(text: &str) -> Vec<Block> {
    text.split('\n')
        .map(|line| translate_line(line.strip_suffix('\r').unwrap_or(line)))
        .collect()
}

fn translate_line(line: &str) -> Block {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Block::Paragraph { runs: Vec::new() };
    }

    for (level, marker) in [(3u8, "### "), (2, "## "), (1, "# ")] {
        if let Some(rest) = trimmed.strip_prefix(marker) {
            return Block::Heading {
                level,
                text: rest.to_string(),
            };
        }
    }

    Block::Paragraph {
        runs: split_bold(line),
    }
}

fn split_bold(line: &str) -> Vec<Run> {
    let mut segments: Vec<String> = line.split(BOLD_DELIMITER).map(str::to_string).collect();

    // An even segment count means one delimiter has no partner. Fold it and
    // the text after it back into the preceding plain segment.
    if segments.len() % 2 == 0 {
        if let Some(tail) = segments.pop() {
            if let Some(prev) = segments.last_mut() {
                prev.push_str(BOLD_DELIMITER);
                prev.push_str(&tail);
            }
        }
    }

    segments
        .into_iter()
        .enumerate()
        .filter(|(_, text)| !text.is_empty())
        .map(|(i, text)| Run { text, bold: i % 2 == 1 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(level: u8, text: &str) -> Block {
        Block::Heading {
            level,
            text: text.into(),
        }
    }

    fn para(runs: Vec<Run>) -> Block {
        Block::Paragraph { runs }
    }

    #[test]
    fn test_title_blank_and_bold() {
        assert_eq!(
            translate("# Title\n\n**Bold** and plain"),
            vec![
                heading(1, "Title"),
                para(vec![]),
                para(vec![Run::bold("Bold"), Run::plain(" and plain")]),
            ]
        );
    }

    #[test]
    fn test_heading_levels() {
        assert_eq!(
            translate("### Three\n## Two\n# One"),
            vec![heading(3, "Three"), heading(2, "Two"), heading(1, "One")]
        );
    }

    #[test]
    fn test_indented_heading_is_recognized() {
        assert_eq!(translate("   ## Facts  "), vec![heading(2, "Facts")]);
    }

    #[test]
    fn test_marker_without_space_is_paragraph() {
        assert_eq!(
            translate("#hashtag"),
            vec![para(vec![Run::plain("#hashtag")])]
        );
    }

    #[test]
    fn test_four_hashes_is_paragraph() {
        assert_eq!(
            translate("#### deep"),
            vec![para(vec![Run::plain("#### deep")])]
        );
    }

    #[test]
    fn test_whitespace_only_line_is_blank() {
        assert_eq!(translate(" \t "), vec![para(vec![])]);
    }

    #[test]
    fn test_multiple_bold_spans() {
        assert_eq!(
            translate("Debtor: **ACME S.A.** owes **$ 1.000**."),
            vec![para(vec![
                Run::plain("Debtor: "),
                Run::bold("ACME S.A."),
                Run::plain(" owes "),
                Run::bold("$ 1.000"),
                Run::plain("."),
            ])]
        );
    }

    #[test]
    fn test_unmatched_trailing_delimiter_is_literal() {
        assert_eq!(
            translate("**one** and **two"),
            vec![para(vec![Run::bold("one"), Run::plain(" and **two")])]
        );
        assert_eq!(translate("a **b"), vec![para(vec![Run::plain("a **b")])]);
    }

    #[test]
    fn test_crlf_line_endings() {
        assert_eq!(
            translate("# A\r\nbody\r\n"),
            vec![heading(1, "A"), para(vec![Run::plain("body")]), para(vec![])]
        );
    }

    #[test]
    fn test_paragraph_keeps_leading_whitespace() {
        assert_eq!(
            translate("  indented **x**"),
            vec![para(vec![Run::plain("  indented "), Run::bold("x")])]
        );
    }

    #[test]
    fn test_reconstruction_preserves_lines() {
        let input = "# Payment order\n\nWHEREAS **the debtor** failed to pay.\n## Orders\n**FIRST:** pay.\n\nSigned **";
        let rebuilt: Vec<String> = translate(input).iter().map(Block::plain_text).collect();
        let expected: Vec<String> = input
            .split('\n')
            .map(|line| {
                let t = line.trim();
                for marker in ["### ", "## ", "# "] {
                    if let Some(rest) = t.strip_prefix(marker) {
                        return rest.to_string();
                    }
                }
                if t.is_empty() {
                    return String::new();
                }
                line.to_string()
            })
            .map(|line| {
                // paired markers vanish, the odd trailing one stays
                let pairs = line.matches("**").count() / 2 * 2;
                line.replacen("**", "", pairs)
            })
            .collect();
        assert_eq!(rebuilt, expected);
    }
}
