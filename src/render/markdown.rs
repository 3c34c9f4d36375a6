//! Markdown parsing into printable blocks.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

/// A unit of printable content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph(String),
    /// One list entry. `marker` is empty for continuation paragraphs.
    ListItem { depth: usize, marker: String, text: String },
    Code(String),
    Rule,
}

/// Markdown extensions enabled for both the PDF and HTML output.
pub(crate) fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH
}

#[derive(Default)]
struct BlockBuilder {
    blocks: Vec<Block>,
    buf: String,
    heading: Option<u8>,
    in_code: bool,
    /// Next number for ordered lists, `None` for bullet lists.
    lists: Vec<Option<u64>>,
    item_marker: Option<String>,
}

impl BlockBuilder {
    fn flush(&mut self) {
        let text = collapse_whitespace(&self.buf);
        self.buf.clear();
        if text.is_empty() {
            return;
        }

        let block = if let Some(level) = self.heading {
            Block::Heading { level, text }
        } else if !self.lists.is_empty() {
            Block::ListItem {
                depth: self.lists.len() - 1,
                marker: self.item_marker.take().unwrap_or_default(),
                text,
            }
        } else {
            Block::Paragraph(text)
        };
        self.blocks.push(block);
    }

    fn start_item(&mut self) {
        self.flush();
        let marker = match self.lists.last_mut() {
            Some(Some(n)) => {
                let marker = format!("{}.", n);
                *n += 1;
                marker
            }
            _ => "-".to_string(),
        };
        self.item_marker = Some(marker);
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                self.flush();
                self.heading = Some(heading_level(level));
            }
            Event::End(TagEnd::Heading(_)) => {
                self.flush();
                self.heading = None;
            }
            Event::Start(Tag::List(start)) => {
                self.flush();
                self.lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                self.flush();
                self.lists.pop();
            }
            Event::Start(Tag::Item) => self.start_item(),
            Event::End(TagEnd::Item) | Event::End(TagEnd::Paragraph) => self.flush(),
            Event::Start(Tag::CodeBlock(_)) => {
                self.flush();
                self.in_code = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                let code = self.buf.trim_end_matches('\n').to_string();
                self.buf.clear();
                self.in_code = false;
                if !code.trim().is_empty() {
                    self.blocks.push(Block::Code(code));
                }
            }
            Event::End(TagEnd::TableCell) => self.buf.push_str(" | "),
            Event::End(TagEnd::TableHead) | Event::End(TagEnd::TableRow) => {
                let row = self.buf.trim_end().trim_end_matches('|').to_string();
                self.buf = row;
                self.flush();
            }
            Event::Text(text) | Event::Code(text) => self.buf.push_str(&text),
            Event::SoftBreak => self.buf.push(' '),
            Event::HardBreak => self.buf.push(if self.in_code { '\n' } else { ' ' }),
            Event::Rule => {
                self.flush();
                self.blocks.push(Block::Rule);
            }
            Event::TaskListMarker(done) => self.buf.push_str(if done { "[x] " } else { "[ ] " }),
            _ => {}
        }
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse Markdown into a flat list of blocks, dropping empty content.
pub fn parse_blocks(markdown: &str) -> Vec<Block> {
    let mut builder = BlockBuilder::default();
    for event in Parser::new_ext(markdown, parser_options()) {
        builder.handle(event);
    }
    builder.flush();
    builder.blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(level: u8, text: &str) -> Block {
        Block::Heading { level, text: text.to_string() }
    }

    fn item(depth: usize, marker: &str, text: &str) -> Block {
        Block::ListItem {
            depth,
            marker: marker.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_cheat_sheet_structure() {
        let md = "# Thermodynamics\n\n\
                  ## Summary\n\
                  Energy is **conserved**\nacross processes.\n\n\
                  ## Key Terms\n\
                  - *Entropy*: disorder\n\
                  - Enthalpy\n\n\
                  ## Practice Exam\n\
                  1. What is entropy?\n\
                  2. State the first law.\n";

        assert_eq!(
            parse_blocks(md),
            vec![
                heading(1, "Thermodynamics"),
                heading(2, "Summary"),
                Block::Paragraph("Energy is conserved across processes.".to_string()),
                heading(2, "Key Terms"),
                item(0, "-", "Entropy: disorder"),
                item(0, "-", "Enthalpy"),
                heading(2, "Practice Exam"),
                item(0, "1.", "What is entropy?"),
                item(0, "2.", "State the first law."),
            ]
        );
    }

    #[test]
    fn test_nested_lists() {
        let md = "- Outer\n  - Inner\n- Second\n";
        assert_eq!(
            parse_blocks(md),
            vec![item(0, "-", "Outer"), item(1, "-", "Inner"), item(0, "-", "Second")]
        );
    }

    #[test]
    fn test_ordered_list_start_number() {
        let md = "3. third\n4. fourth\n";
        assert_eq!(parse_blocks(md), vec![item(0, "3.", "third"), item(0, "4.", "fourth")]);
    }

    #[test]
    fn test_code_and_rule() {
        let md = "```python\nx = 1\ny = 2\n```\n\n---\n";
        assert_eq!(
            parse_blocks(md),
            vec![Block::Code("x = 1\ny = 2".to_string()), Block::Rule]
        );
    }

    #[test]
    fn test_table_rows_become_paragraphs() {
        let md = "| Term | Meaning |\n|---|---|\n| ATP | energy |\n";
        assert_eq!(
            parse_blocks(md),
            vec![
                Block::Paragraph("Term | Meaning".to_string()),
                Block::Paragraph("ATP | energy".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_input_has_no_blocks() {
        assert!(parse_blocks("").is_empty());
        assert!(parse_blocks("   \n\n  ").is_empty());
    }
}
