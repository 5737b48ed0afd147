//! Two-column reading order.
//!
//! Blocks arrive in paint order, which for two-column layouts often
//! interleaves the columns line band by line band. A block that starts in
//! the right part of the page pulls every later block lying fully to its
//! left in front of itself. Headers and footers are never moved.

use super::params::{COLUMN_THRESHOLD, FOOTER_THRESHOLD, HEADER_THRESHOLD};
use crate::model::Block;

/// Reorder one page's blocks into reading order.
///
/// The pass is stable: a page with no second-column block comes back in
/// exactly the input order.
pub fn reorder_blocks(blocks: Vec<Block>, page_width: f32, page_height: f32) -> Vec<Block> {
    let column_x = page_width * COLUMN_THRESHOLD;
    let footer_y = page_height * FOOTER_THRESHOLD;
    let header_y = page_height * HEADER_THRESHOLD;
    let in_body = |y: f32| y > footer_y && y < header_y;

    let mut placed = vec![false; blocks.len()];
    let mut order = Vec::with_capacity(blocks.len());

    for i in 0..blocks.len() {
        if placed[i] {
            continue;
        }
        let a = &blocks[i];
        if a.x > column_x && in_body(a.y) {
            for j in (i + 1)..blocks.len() {
                let b = &blocks[j];
                if !placed[j] && a.x > b.right() && in_body(b.y) {
                    placed[j] = true;
                    order.push(j);
                }
            }
        }
        placed[i] = true;
        order.push(i);
    }

    if order.iter().enumerate().any(|(pos, &i)| pos != i) {
        log::debug!("reordered blocks: {:?}", order);
    }

    let mut slots: Vec<Option<Block>> = blocks.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TextKind;

    fn block(x: f32, y: f32, width: f32, text: &str) -> Block {
        Block::text(x, y, width, 12.0, TextKind::Paragraph, text)
    }

    fn texts(blocks: &[Block]) -> Vec<&str> {
        blocks.iter().filter_map(|b| b.as_text()).collect()
    }

    #[test]
    fn test_single_column_unchanged() {
        let blocks = vec![
            block(72.0, 700.0, 450.0, "one"),
            block(72.0, 650.0, 450.0, "two"),
            block(100.0, 600.0, 400.0, "three"),
        ];
        let reordered = reorder_blocks(blocks.clone(), 612.0, 792.0);
        assert_eq!(reordered, blocks);
    }

    #[test]
    fn test_interleaved_columns() {
        let blocks = vec![
            block(300.0, 770.0, 200.0, "running head"),
            block(72.0, 700.0, 200.0, "left 1"),
            block(320.0, 700.0, 200.0, "right 1"),
            block(72.0, 600.0, 200.0, "left 2"),
            block(320.0, 600.0, 200.0, "right 2"),
            block(72.0, 30.0, 200.0, "footer"),
        ];
        let reordered = reorder_blocks(blocks, 612.0, 792.0);
        assert_eq!(
            texts(&reordered),
            vec!["running head", "left 1", "left 2", "right 1", "right 2", "footer"]
        );
    }

    #[test]
    fn test_overlapping_block_not_moved() {
        // "wide" reaches under the right block, so it is not fully to its left
        let blocks = vec![
            block(320.0, 700.0, 200.0, "right"),
            block(72.0, 650.0, 300.0, "wide"),
        ];
        let reordered = reorder_blocks(blocks.clone(), 612.0, 792.0);
        assert_eq!(reordered, blocks);
    }
}
