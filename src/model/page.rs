//! Page-level types.

use serde::{Deserialize, Serialize};

/// How a text block is decorated when rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextKind {
    /// Body paragraph
    Paragraph,
    /// Heading with level 1-6
    Heading(u8),
    /// Indented, smaller block quotation
    Quote,
}

/// Content carried by a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockContent {
    /// Styled Markdown text
    Text { kind: TextKind, text: String },
    /// Reference to an extracted image
    Image { path: String },
}

/// One reconstructed unit on a page, in page coordinates (y grows upward).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Left edge
    pub x: f32,
    /// Baseline of the first line
    pub y: f32,
    /// Horizontal extent
    pub width: f32,
    /// Vertical extent
    pub height: f32,
    /// Block content
    pub content: BlockContent,
}

impl Block {
    /// Create a text block.
    pub fn text(x: f32, y: f32, width: f32, height: f32, kind: TextKind, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            width,
            height,
            content: BlockContent::Text {
                kind,
                text: text.into(),
            },
        }
    }

    /// Create an image block.
    pub fn image(x: f32, y: f32, width: f32, height: f32, path: impl Into<String>) -> Self {
        Self {
            x,
            y,
            width,
            height,
            content: BlockContent::Image { path: path.into() },
        }
    }

    /// Right edge of the block.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Text of a text block.
    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            BlockContent::Text { text, .. } => Some(text),
            BlockContent::Image { .. } => None,
        }
    }

    /// Heading level, if the block is a heading.
    pub fn heading_level(&self) -> Option<u8> {
        match self.content {
            BlockContent::Text {
                kind: TextKind::Heading(level),
                ..
            } => Some(level),
            _ => None,
        }
    }

    /// Check if this is an image block.
    pub fn is_image(&self) -> bool {
        matches!(self.content, BlockContent::Image { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_accessors() {
        let block = Block::text(10.0, 700.0, 200.0, 12.0, TextKind::Heading(2), "Intro");
        assert_eq!(block.as_text(), Some("Intro"));
        assert_eq!(block.heading_level(), Some(2));
        assert_eq!(block.right(), 210.0);
        assert!(!block.is_image());

        let image = Block::image(0.0, 0.0, 50.0, 50.0, "images/a.png");
        assert!(image.is_image());
        assert_eq!(image.as_text(), None);
    }
}
