//! Markdown rendering for reconstructed blocks.

use crate::model::{Block, BlockContent, FootnoteTable, TextKind};

use super::ExtractionStats;

/// Separator placed after every rendered block.
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// Markdown renderer.
///
/// Blocks are rendered one at a time so the caller can stream them to a
/// sink; the renderer only keeps counts.
#[derive(Debug, Default)]
pub struct MarkdownRenderer {
    stats: ExtractionStats,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Render one block, including its trailing separator.
    pub fn render_block(&mut self, block: &Block) -> String {
        let mut output = String::new();
        match &block.content {
            BlockContent::Text { kind, text } => {
                let text = escape_text(text);
                match kind {
                    TextKind::Heading(level) => {
                        self.stats.add_heading();
                        output.push_str(&"#".repeat((*level).clamp(1, 6) as usize));
                        output.push(' ');
                        output.push_str(&text);
                    }
                    TextKind::Quote => {
                        self.stats.add_quote();
                        let quoted: Vec<String> =
                            text.lines().map(|line| format!("> {}", line)).collect();
                        output.push_str(&quoted.join("\n"));
                    }
                    TextKind::Paragraph => {
                        self.stats.add_paragraph();
                        output.push_str(&text);
                    }
                }
                self.stats.count_text(&text);
            }
            BlockContent::Image { path } => {
                self.stats.add_image();
                output.push_str(&format!("![image]({})", escape_path(path)));
            }
        }
        output.push_str(BLOCK_SEPARATOR);
        output
    }

    /// Consume the renderer and return its statistics.
    pub fn into_stats(self) -> ExtractionStats {
        self.stats
    }
}

/// Render footnote definitions, one per key.
///
/// Continuation lines are indented so they stay inside their definition.
/// Comment text is escaped like extracted text.
pub fn render_footnotes(footnotes: &FootnoteTable) -> String {
    let mut output = String::new();
    for (key, text) in footnotes.iter() {
        let mut lines = text.lines().map(escape_text);
        output.push_str(&format!("[^{}]: {}\n", key, lines.next().unwrap_or_default()));
        for line in lines {
            output.push_str("    ");
            output.push_str(&line);
            output.push('\n');
        }
    }
    output
}

/// Escape wiki-link openers so they render literally.
pub fn escape_text(text: &str) -> String {
    text.replace("[[", "\\[\\[")
}

/// Percent-escape the characters that would end a Markdown link target.
pub fn escape_path(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        match c {
            ' ' => escaped.push_str("%20"),
            '(' => escaped.push_str("%28"),
            ')' => escaped.push_str("%29"),
            _ => escaped.push(c),
        }
    }
    escaped
}
