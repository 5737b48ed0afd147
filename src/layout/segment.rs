//! Line and block segmentation with style inference.
//!
//! Glyph runs of one page arrive in paint order. Each run either continues
//! the current line, starts the next line of the same block, or starts a
//! new block. Headings, block quotes, scripts, emphasis, highlights and
//! the bibliography flag are inferred on the way.

use super::annotations::HighlightMarker;
use super::params::*;
use crate::model::{Block, DocumentState, TextKind};
use crate::parser::{GlyphRun, ImagePlacement};
use crate::render::is_spaceless_script_char;

/// How a run relates to the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDecision {
    /// Continues the current line
    SameLine,
    /// Next line of the same block
    NewLine,
    /// Starts a new block
    NewBlock,
}

/// Segmentation state of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentState {
    /// No block is open
    BlockClosed,
    /// A block is open and its current line has more than one run
    InLine,
    /// A block is open at the start of a line
    InBlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    Superscript,
    Subscript,
}

/// Block being accumulated.
#[derive(Debug)]
struct OpenBlock {
    y: f32,
    left: f32,
    right: f32,
    bottom: f32,
    top: f32,
    /// Markdown text
    text: String,
    /// Same text without markup, for heading and bibliography tests
    plain: String,
    weighted_height: f32,
    weight: f32,
    first_height: f32,
    quote: bool,
}

impl OpenBlock {
    fn new(run: &GlyphRun, quote: bool) -> Self {
        Self {
            y: run.y,
            left: run.x,
            right: run.right(),
            bottom: run.y,
            top: run.top(),
            text: String::new(),
            plain: String::new(),
            weighted_height: 0.0,
            weight: 0.0,
            first_height: run.magnitude(),
            quote,
        }
    }

    fn extend(&mut self, run: &GlyphRun) {
        self.left = self.left.min(run.x);
        self.right = self.right.max(run.right());
        self.bottom = self.bottom.min(run.y);
        self.top = self.top.max(run.top());
        let chars = run.text.trim().chars().count() as f32;
        self.weighted_height += run.magnitude() * chars;
        self.weight += chars;
    }

    /// Text-length weighted mean of run heights.
    fn height(&self) -> f32 {
        if self.weight > 0.0 {
            self.weighted_height / self.weight
        } else {
            self.first_height
        }
    }

    fn push(&mut self, text: &str) {
        self.text.push_str(text);
        self.plain.push_str(text);
    }
}

/// Per-page segmentation state.
#[derive(Debug, Default)]
pub struct PageCursor {
    /// Origin x of the last run
    pub last_x: f32,
    /// Baseline of the last non-script run
    pub last_y: f32,
    /// Right edge of the last run
    pub last_end_x: f32,
    /// x where the current line started
    pub line_start_x: f32,
    /// Height of the last non-script run
    pub last_height: f32,
    /// Bold span is open
    pub bold: bool,
    /// Italic span is open
    pub italic: bool,
    /// Last run was a subscript
    pub subscript: bool,
    /// Last run was a superscript
    pub superscript: bool,
    /// Current block is a quote
    pub blockquote: bool,
    /// Last run started a new line
    pub new_line: bool,
    /// Line-start reference of an active block quote
    pub blockquote_x: Option<f32>,
    block: Option<OpenBlock>,
}

/// Turns one page's runs and images into blocks.
pub struct PageSegmenter<'d> {
    state: &'d mut DocumentState,
    page: u32,
    cursor: PageCursor,
    blocks: Vec<Block>,
    last_decision: Option<LineDecision>,
}

impl<'d> PageSegmenter<'d> {
    /// Start a page. `state.page` is set to `page`.
    pub fn new(state: &'d mut DocumentState, page: u32) -> Self {
        state.page = page;
        Self {
            state,
            page,
            cursor: PageCursor::default(),
            blocks: Vec::new(),
            last_decision: None,
        }
    }

    /// Cursor after the last run.
    pub fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    /// Decision taken for the last run.
    pub fn last_decision(&self) -> Option<LineDecision> {
        self.last_decision
    }

    /// Current state of the block machine.
    pub fn state(&self) -> SegmentState {
        match (&self.cursor.block, self.last_decision) {
            (None, _) => SegmentState::BlockClosed,
            (Some(_), Some(LineDecision::SameLine)) => SegmentState::InLine,
            (Some(_), _) => SegmentState::InBlock,
        }
    }

    /// Add the next run of the page.
    pub fn push_run(&mut self, run: &GlyphRun, markers: &[HighlightMarker]) {
        let magnitude = run.magnitude().max(self.cursor.last_height);
        if magnitude <= 0.0 {
            return;
        }

        let decision = if self.cursor.block.is_none() {
            LineDecision::NewBlock
        } else {
            self.classify(run, magnitude)
        };
        let y_change = (run.y - self.cursor.last_y) / magnitude;

        let script = if decision == LineDecision::SameLine
            && run.magnitude() < self.state.stats.modal_glyph_height * SUBSCRIPT_DEVIANCE
            && run.magnitude() < self.cursor.last_height
        {
            if y_change > 0.0 {
                Some(Script::Superscript)
            } else if y_change < 0.0 {
                Some(Script::Subscript)
            } else {
                None
            }
        } else {
            None
        };

        match decision {
            LineDecision::NewBlock => {
                self.close_block();
                self.open_block(run, magnitude);
            }
            LineDecision::NewLine => {
                if let Some(block) = self.cursor.block.as_mut() {
                    join_line(&mut block.text);
                    join_line(&mut block.plain);
                }
                self.cursor.line_start_x = run.x;
            }
            LineDecision::SameLine => {
                if self.needs_space(run) {
                    if let Some(block) = self.cursor.block.as_mut() {
                        block.push(" ");
                    }
                }
            }
        }
        log::trace!(
            "page {} item {}: {:?} y_change={:.2} {:?}",
            self.page,
            run.item,
            decision,
            y_change,
            run.text
        );

        let footnotes: Vec<Option<u32>> = markers
            .iter()
            .map(|m| {
                m.comment_text
                    .as_ref()
                    .filter(|_| m.end && m.is_comment)
                    .map(|text| self.state.footnotes.push(text.clone()))
            })
            .collect();
        let mut text = if markers.is_empty() {
            run.text.clone()
        } else {
            insert_highlight_markers(&run.text, markers, &footnotes)
        };
        if let Some(script) = script {
            text = wrap_script(&text, script);
        }
        self.append_styled(&text, &run.text, run.bold, run.italic);

        let cursor = &mut self.cursor;
        if let Some(block) = cursor.block.as_mut() {
            block.extend(run);
        }
        cursor.last_x = run.x;
        cursor.last_end_x = run.right();
        cursor.new_line = decision == LineDecision::NewLine;
        cursor.superscript = script == Some(Script::Superscript);
        cursor.subscript = script == Some(Script::Subscript);
        if script.is_none() {
            cursor.last_y = run.y;
            cursor.last_height = run.magnitude();
        }
        self.last_decision = Some(decision);
    }

    /// An image closes the open block and becomes a block of its own.
    pub fn push_image(&mut self, placement: &ImagePlacement, path: impl Into<String>) {
        self.close_block();
        self.blocks.push(Block::image(
            placement.x,
            placement.y,
            placement.width,
            placement.height,
            path,
        ));
        self.last_decision = None;
    }

    /// Close the page and return its blocks in paint order.
    pub fn finish(mut self) -> Vec<Block> {
        self.close_block();
        self.blocks
    }

    fn tolerance(&self, magnitude: f32) -> f32 {
        let deviance = if self.state.in_bibliography {
            BIBLIOGRAPHY_MARGIN_DEVIANCE
        } else {
            MARGIN_DEVIANCE
        };
        magnitude * deviance
    }

    fn classify(&self, run: &GlyphRun, magnitude: f32) -> LineDecision {
        let stats = &self.state.stats;
        let cursor = &self.cursor;
        let y_change = (run.y - cursor.last_y) / magnitude;
        let tolerance = self.tolerance(magnitude);
        let near = |reference: f32| (run.x - reference).abs() <= tolerance;

        let at_line_start = near(stats.left_margin(self.page))
            || cursor.blockquote_x.is_some_and(near)
            || near(cursor.line_start_x);
        let in_band = y_change >= stats.line_spacing_max && y_change <= stats.line_spacing_min;

        if at_line_start && in_band && magnitude > stats.modal_glyph_height * NEW_LINE_DEVIANCE {
            LineDecision::NewLine
        } else if run.x >= cursor.last_x - X_BACKTRACK && y_change.abs() < SAME_LINE_DEVIANCE {
            LineDecision::SameLine
        } else {
            LineDecision::NewBlock
        }
    }

    fn open_block(&mut self, run: &GlyphRun, magnitude: f32) {
        let stats = self.state.stats;
        let margin = stats.left_margin(self.page);
        let tolerance = self.tolerance(magnitude);
        let height = run.magnitude();

        let in_quote_band = margin >= run.x - height * BLOCKQUOTE_MAX_INDENT
            && margin <= run.x - height * BLOCKQUOTE_MIN_INDENT;
        let quote = if height < stats.modal_glyph_height * BLOCKQUOTE_DEVIANCE && in_quote_band {
            self.cursor.blockquote_x = Some(run.x);
            true
        } else if (run.x - margin).abs() <= tolerance {
            self.cursor.blockquote_x = None;
            false
        } else {
            self.cursor
                .blockquote_x
                .is_some_and(|q| (run.x - q).abs() <= tolerance)
        };

        self.cursor.blockquote = quote;
        self.cursor.line_start_x = run.x;
        self.cursor.block = Some(OpenBlock::new(run, quote));
    }

    fn close_block(&mut self) {
        let Some(mut block) = self.cursor.block.take() else {
            return;
        };
        close_emphasis(&mut block.text, self.cursor.bold, self.cursor.italic);
        self.cursor.bold = false;
        self.cursor.italic = false;

        let text = block.text.trim();
        if text.is_empty() {
            return;
        }
        let plain = block.plain.trim();

        let kind = if block.quote {
            TextKind::Quote
        } else {
            match heading_level(block.height(), self.state.stats.mean_glyph_height, plain) {
                Some(level) => TextKind::Heading(level),
                None => TextKind::Paragraph,
            }
        };

        if !self.state.in_bibliography && is_bibliography_title(plain) {
            log::debug!("page {}: bibliography starts", self.page);
            self.state.in_bibliography = true;
        }

        self.blocks.push(Block::text(
            block.left,
            block.y,
            block.right - block.left,
            block.top - block.bottom,
            kind,
            text,
        ));
    }

    fn needs_space(&self, run: &GlyphRun) -> bool {
        let Some(block) = &self.cursor.block else {
            return false;
        };
        let (Some(last), Some(first)) = (block.plain.chars().last(), run.text.chars().next())
        else {
            return false;
        };
        if last.is_whitespace() || first.is_whitespace() {
            return false;
        }
        if is_spaceless_script_char(last) && is_spaceless_script_char(first) {
            return false;
        }
        let gap = run.x - self.cursor.last_end_x;
        gap > SPACE_GAP_FACTOR * GLYPH_WIDTH_FACTOR * run.magnitude()
    }

    /// Append decorated run text, opening and closing emphasis only where the style changes.
    fn append_styled(&mut self, text: &str, plain: &str, bold: bool, italic: bool) {
        let cursor = &mut self.cursor;
        let Some(block) = cursor.block.as_mut() else {
            return;
        };
        block.plain.push_str(plain);

        let core = text.trim();
        if core.is_empty() {
            block.text.push_str(text);
            return;
        }
        let leading = &text[..text.len() - text.trim_start().len()];
        let trailing = &text[text.trim_end().len()..];

        if (cursor.bold, cursor.italic) != (bold, italic) {
            close_emphasis(&mut block.text, cursor.bold, cursor.italic);
            block.text.push_str(leading);
            if bold {
                block.text.push_str("**");
            }
            if italic {
                block.text.push('*');
            }
            cursor.bold = bold;
            cursor.italic = italic;
        } else {
            block.text.push_str(leading);
        }
        block.text.push_str(core);
        block.text.push_str(trailing);
    }
}

/// Join the next line: drop a line-end hyphen, otherwise separate with one space.
fn join_line(text: &mut String) {
    if text.ends_with("- ") {
        text.truncate(text.len() - 2);
    } else if text.ends_with('-') {
        text.pop();
    } else if !text.is_empty() && !text.ends_with(char::is_whitespace) {
        text.push(' ');
    }
}

/// Close open emphasis markers before any trailing whitespace.
fn close_emphasis(text: &mut String, bold: bool, italic: bool) {
    if !bold && !italic {
        return;
    }
    let trailing = text.split_off(text.trim_end().len());
    if italic {
        text.push('*');
    }
    if bold {
        text.push_str("**");
    }
    text.push_str(&trailing);
}

fn wrap_script(text: &str, script: Script) -> String {
    let core = text.trim();
    if core.is_empty() {
        return text.to_string();
    }
    let leading = &text[..text.len() - text.trim_start().len()];
    let trailing = &text[text.trim_end().len()..];
    let tag = match script {
        Script::Superscript => "sup",
        Script::Subscript => "sub",
    };
    format!("{}<{}>{}</{}>{}", leading, tag, core, tag, trailing)
}

/// Insert `==` markers at each marker's fractions of `text`.
///
/// `footnotes[i]` is the footnote key of `markers[i]`, placed right after
/// its closing `==`. At a shared position a closing marker goes before an
/// opening one, unless both belong to the same empty highlight.
pub fn insert_highlight_markers(
    text: &str,
    markers: &[HighlightMarker],
    footnotes: &[Option<u32>],
) -> String {
    let len = text.chars().count();
    let byte_at = |fraction: f32| {
        let index = (fraction.clamp(0.0, 1.0) * len as f32).round() as usize;
        text.char_indices()
            .nth(index)
            .map(|(byte, _)| byte)
            .unwrap_or(text.len())
    };

    // (byte offset, rank at that offset, inserted text)
    let mut inserts: Vec<(usize, u8, String)> = Vec::with_capacity(markers.len() * 2);
    for (index, marker) in markers.iter().enumerate() {
        let end = byte_at(marker.right_fraction);
        let start = byte_at(marker.left_fraction);
        let start = if marker.end { start.min(end) } else { start };
        if marker.start {
            inserts.push((start, 1, "==".to_string()));
        }
        if marker.end {
            let mut close = String::from("==");
            if let Some(key) = footnotes.get(index).copied().flatten() {
                close.push_str(&format!("[^{}]", key));
            }
            let rank = if marker.start && start == end { 2 } else { 0 };
            inserts.push((end, rank, close));
        }
    }
    inserts.sort_by_key(|(at, rank, _)| (*at, *rank));

    let mut result = String::with_capacity(text.len() + inserts.len() * 8);
    let mut copied = 0;
    for (at, _, insert) in inserts {
        result.push_str(&text[copied..at]);
        result.push_str(&insert);
        copied = at;
    }
    result.push_str(&text[copied..]);
    result
}

/// Heading level for a block of `height` given the document's mean glyph height.
pub fn heading_level(height: f32, mean: f32, text: &str) -> Option<u8> {
    if mean <= 0.0 {
        return None;
    }
    if is_all_caps(text) && height > ALL_CAPS_HEADING_RATIO * mean {
        return Some(ALL_CAPS_HEADING_LEVEL);
    }
    if height > mean {
        let level = (HEADING_SCALE / (height / mean - 1.0)).ceil();
        if level <= MAX_HEADING_LEVEL as f32 {
            return Some(level.max(1.0) as u8);
        }
    }
    None
}

fn is_all_caps(text: &str) -> bool {
    let mut letters = text.chars().filter(|c| c.is_alphabetic()).peekable();
    letters.peek().is_some() && letters.all(|c| c.is_uppercase())
}

fn is_bibliography_title(text: &str) -> bool {
    text.eq_ignore_ascii_case("bibliography") || text.eq_ignore_ascii_case("references")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::DocumentStatistics;
    use crate::model::BlockContent;

    fn stats() -> DocumentStatistics {
        DocumentStatistics {
            line_spacing_min: 1.2 * MIN_LINE_HEIGHT,
            line_spacing_max: 1.2 * MAX_LINE_HEIGHT,
            left_margin_odd: 72.0,
            left_margin_even: 72.0,
            mean_glyph_height: 12.5,
            modal_glyph_height: 10.0,
        }
    }

    fn run(x: f32, y: f32, height: f32, text: &str) -> GlyphRun {
        GlyphRun {
            item: 0,
            text: text.to_string(),
            x,
            y,
            width: text.chars().count() as f32 * 0.5 * height,
            height,
            bold: false,
            italic: false,
        }
    }

    fn texts(blocks: &[Block]) -> Vec<&str> {
        blocks.iter().filter_map(|b| b.as_text()).collect()
    }

    #[test]
    fn test_midpoint_of_band_is_new_line() {
        let mut state = DocumentState::new(stats());
        let mut seg = PageSegmenter::new(&mut state, 1);
        seg.push_run(&run(72.0, 700.0, 10.0, "first line"), &[]);
        let dy = stats().line_spacing_mid() * 10.0;
        seg.push_run(&run(72.0, 700.0 + dy, 10.0, "second line"), &[]);
        assert_eq!(seg.last_decision(), Some(LineDecision::NewLine));
        assert_eq!(seg.state(), SegmentState::InBlock);

        let blocks = seg.finish();
        assert_eq!(texts(&blocks), vec!["first line second line"]);
    }

    #[test]
    fn test_same_line_and_new_block() {
        let mut state = DocumentState::new(stats());
        let mut seg = PageSegmenter::new(&mut state, 1);
        assert_eq!(seg.state(), SegmentState::BlockClosed);
        seg.push_run(&run(72.0, 700.0, 10.0, "Hello"), &[]);
        seg.push_run(&run(97.0, 700.0, 10.0, "world"), &[]);
        assert_eq!(seg.last_decision(), Some(LineDecision::SameLine));
        assert_eq!(seg.state(), SegmentState::InLine);
        seg.push_run(&run(72.0, 600.0, 10.0, "Far below"), &[]);
        assert_eq!(seg.last_decision(), Some(LineDecision::NewBlock));

        let blocks = seg.finish();
        assert_eq!(texts(&blocks), vec!["Helloworld", "Far below"]);
    }

    #[test]
    fn test_gap_inserts_space() {
        let mut state = DocumentState::new(stats());
        let mut seg = PageSegmenter::new(&mut state, 1);
        seg.push_run(&run(72.0, 700.0, 10.0, "Hello"), &[]);
        seg.push_run(&run(100.0, 700.0, 10.0, "world"), &[]);
        assert_eq!(texts(&seg.finish()), vec!["Hello world"]);
    }

    #[test]
    fn test_hyphen_repair() {
        let mut state = DocumentState::new(stats());
        let mut seg = PageSegmenter::new(&mut state, 1);
        seg.push_run(&run(72.0, 700.0, 10.0, "recon-"), &[]);
        seg.push_run(&run(72.0, 688.0, 10.0, "struction and"), &[]);
        seg.push_run(&run(72.0, 676.0, 10.0, "more"), &[]);
        assert_eq!(texts(&seg.finish()), vec!["reconstruction and more"]);
    }

    #[test]
    fn test_heading_levels() {
        assert_eq!(heading_level(12.5, 12.5, "Body"), None);
        assert_eq!(heading_level(25.0, 12.5, "Title"), Some(1));
        assert_eq!(heading_level(17.0, 12.5, "Section"), Some(2));
        assert_eq!(heading_level(13.0, 12.5, "Barely larger"), None);
        assert_eq!(heading_level(12.0, 12.5, "METHODS"), Some(3));
        assert_eq!(heading_level(10.0, 12.5, "METHODS"), None);
        assert_eq!(heading_level(25.0, 0.0, "x"), None);
    }

    #[test]
    fn test_heading_block() {
        let mut state = DocumentState::new(stats());
        let mut seg = PageSegmenter::new(&mut state, 1);
        seg.push_run(&run(72.0, 720.0, 25.0, "Introduction"), &[]);
        seg.push_run(&run(72.0, 680.0, 10.0, "Body text."), &[]);
        let blocks = seg.finish();
        assert_eq!(blocks[0].heading_level(), Some(1));
        assert_eq!(blocks[1].heading_level(), None);
    }

    #[test]
    fn test_blockquote() {
        let mut state = DocumentState::new(stats());
        let mut seg = PageSegmenter::new(&mut state, 1);
        seg.push_run(&run(72.0, 700.0, 10.0, "Body paragraph."), &[]);
        seg.push_run(&run(100.0, 670.0, 9.0, "Quoted words"), &[]);
        seg.push_run(&run(100.0, 659.2, 9.0, "continue here."), &[]);
        seg.push_run(&run(72.0, 630.0, 10.0, "Back to body."), &[]);
        let blocks = seg.finish();

        let kinds: Vec<TextKind> = blocks
            .iter()
            .map(|b| match &b.content {
                BlockContent::Text { kind, .. } => *kind,
                _ => panic!("unexpected image"),
            })
            .collect();
        assert_eq!(
            kinds,
            vec![TextKind::Paragraph, TextKind::Quote, TextKind::Paragraph]
        );
        assert_eq!(blocks[1].as_text(), Some("Quoted words continue here."));
    }

    #[test]
    fn test_superscript() {
        let mut state = DocumentState::new(stats());
        let mut seg = PageSegmenter::new(&mut state, 1);
        seg.push_run(&run(72.0, 700.0, 10.0, "E = mc"), &[]);
        seg.push_run(&run(102.0, 703.0, 6.0, "2"), &[]);
        assert!(seg.cursor().superscript);
        seg.push_run(&run(105.0, 700.0, 10.0, " holds"), &[]);
        assert!(!seg.cursor().superscript);
        assert_eq!(texts(&seg.finish()), vec!["E = mc<sup>2</sup> holds"]);
    }

    #[test]
    fn test_subscript() {
        let mut state = DocumentState::new(stats());
        let mut seg = PageSegmenter::new(&mut state, 1);
        seg.push_run(&run(72.0, 700.0, 10.0, "H"), &[]);
        seg.push_run(&run(77.0, 698.0, 6.0, "2"), &[]);
        seg.push_run(&run(80.0, 700.0, 10.0, "O"), &[]);
        assert_eq!(texts(&seg.finish()), vec!["H<sub>2</sub>O"]);
    }

    #[test]
    fn test_emphasis_collapses_adjacent_runs() {
        let mut state = DocumentState::new(stats());
        let mut seg = PageSegmenter::new(&mut state, 1);
        let mut bold_a = run(72.0, 700.0, 10.0, "very ");
        bold_a.bold = true;
        let mut space = run(97.0, 700.0, 10.0, " ");
        space.bold = false;
        let mut bold_b = run(102.0, 700.0, 10.0, "bold ");
        bold_b.bold = true;
        let plain = run(127.0, 700.0, 10.0, "text");
        let mut italic = run(147.0, 700.0, 10.0, " here");
        italic.italic = true;

        for r in [&bold_a, &space, &bold_b, &plain, &italic] {
            seg.push_run(r, &[]);
        }
        assert_eq!(
            texts(&seg.finish()),
            vec!["**very  bold** text *here*"]
        );
    }

    #[test]
    fn test_highlight_split_at_bounds() {
        let marker = HighlightMarker {
            start: true,
            end: true,
            left_fraction: 0.0,
            right_fraction: 1.0,
            ..Default::default()
        };
        assert_eq!(
            insert_highlight_markers("héllo", std::slice::from_ref(&marker), &[None]),
            "==héllo=="
        );
        assert_eq!(
            insert_highlight_markers("héllo", &[marker], &[Some(3)]),
            "==héllo==[^3]"
        );
    }

    #[test]
    fn test_highlight_split_inside_run() {
        let marker = HighlightMarker {
            start: true,
            end: true,
            left_fraction: 0.2,
            right_fraction: 0.6,
            ..Default::default()
        };
        assert_eq!(insert_highlight_markers("abcdefghij", &[marker], &[]), "ab==cdef==ghij");

        let open_only = HighlightMarker {
            start: true,
            left_fraction: 0.5,
            ..Default::default()
        };
        assert_eq!(insert_highlight_markers("abcd", &[open_only], &[]), "ab==cd");
    }

    #[test]
    fn test_several_highlights_in_one_run() {
        let text = "aaaaaaaaaa bbbbbbbbbb";
        let markers = [
            HighlightMarker {
                start: true,
                end: true,
                left_fraction: 0.0,
                right_fraction: 10.0 / 21.0,
                ..Default::default()
            },
            HighlightMarker {
                start: true,
                end: true,
                left_fraction: 11.0 / 21.0,
                right_fraction: 1.0,
                ..Default::default()
            },
        ];
        assert_eq!(
            insert_highlight_markers(text, &markers, &[Some(1), Some(2)]),
            "==aaaaaaaaaa==[^1] ==bbbbbbbbbb==[^2]"
        );

        let touching = [
            HighlightMarker {
                start: true,
                end: true,
                left_fraction: 0.0,
                right_fraction: 0.5,
                ..Default::default()
            },
            HighlightMarker {
                start: true,
                end: true,
                left_fraction: 0.5,
                right_fraction: 1.0,
                ..Default::default()
            },
        ];
        assert_eq!(
            insert_highlight_markers("abcd", &touching, &[Some(4), None]),
            "==ab==[^4]====cd=="
        );

        let empty = HighlightMarker {
            start: true,
            end: true,
            left_fraction: 0.5,
            right_fraction: 0.5,
            ..Default::default()
        };
        assert_eq!(insert_highlight_markers("abcd", &[empty], &[Some(1)]), "ab====[^1]cd");
    }

    #[test]
    fn test_commented_highlight_records_footnote() {
        let mut state = DocumentState::new(stats());
        {
            let mut seg = PageSegmenter::new(&mut state, 2);
            let marker = HighlightMarker {
                start: true,
                end: true,
                left_fraction: 0.0,
                right_fraction: 1.0,
                is_comment: true,
                comment_text: Some("p. 2: important".into()),
            };
            seg.push_run(&run(72.0, 700.0, 10.0, "claim"), &[marker]);
            assert_eq!(texts(&seg.finish()), vec!["==claim==[^1]"]);
        }
        assert_eq!(
            state.footnotes.iter().collect::<Vec<_>>(),
            vec![(1, "p. 2: important")]
        );
    }

    fn push_entry(seg: &mut PageSegmenter<'_>) {
        seg.push_run(&run(72.0, 650.0, 10.0, "Smith, J. (2020). A study"), &[]);
        // hanging indent, one line down
        seg.push_run(&run(97.0, 638.0, 10.0, "of things."), &[]);
    }

    #[test]
    fn test_bibliography_relaxes_margin_tolerance() {
        let mut state = DocumentState::new(stats());
        let mut seg = PageSegmenter::new(&mut state, 1);
        push_entry(&mut seg);
        assert_eq!(seg.finish().len(), 2);
        assert!(!state.in_bibliography);

        let mut state = DocumentState::new(stats());
        let mut seg = PageSegmenter::new(&mut state, 1);
        seg.push_run(&run(72.0, 700.0, 10.0, "References"), &[]);
        push_entry(&mut seg);
        assert_eq!(seg.last_decision(), Some(LineDecision::NewLine));
        let blocks = seg.finish();
        assert_eq!(
            texts(&blocks),
            vec!["References", "Smith, J. (2020). A study of things."]
        );
        assert!(state.in_bibliography);
    }

    #[test]
    fn test_image_closes_block() {
        let mut state = DocumentState::new(stats());
        let mut seg = PageSegmenter::new(&mut state, 1);
        seg.push_run(&run(72.0, 700.0, 10.0, "Before"), &[]);
        let placement = ImagePlacement {
            resource: "Im1".into(),
            x: 72.0,
            y: 500.0,
            width: 100.0,
            height: 100.0,
        };
        seg.push_image(&placement, "images/doc-1-1.png");
        seg.push_run(&run(72.0, 480.0, 10.0, "After"), &[]);
        let blocks = seg.finish();
        assert_eq!(blocks.len(), 3);
        assert!(blocks[1].is_image());
        assert_eq!(blocks[2].as_text(), Some("After"));
    }
}
