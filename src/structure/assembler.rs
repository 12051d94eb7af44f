//! Single-pass assembly of layout blocks into document elements.
//!
//! Consecutive text blocks are merged into paragraphs when geometry and
//! punctuation say the sentence continues. Headings, math, tables and
//! figures close the open paragraph and stand alone.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{BlockType, DocumentElement, ElementKind, ExtractedContent, LayoutBlock};

use super::{BlockClassifier, ClassifierConfig, Patterns};

/// Paragraph assembler configuration. Distances are fractions of the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblerConfig {
    /// Horizontal shift of the left edge that signals a column change
    pub column_shift: f32,
    /// Vertical gap that always breaks a paragraph
    pub huge_gap: f32,
    /// Vertical gap that breaks unless a line ends in a hyphen
    pub large_gap: f32,
    /// Share of uppercase letters marking a heading line
    pub uppercase_ratio: f32,
    /// Uppercase headings are at least this long
    pub uppercase_min_len: usize,
    /// Uppercase headings are at most this long
    pub uppercase_max_len: usize,
    /// Page numbers above this y are dropped
    pub margin_top: f32,
    /// Page numbers below this y are dropped
    pub margin_bottom: f32,
    /// Heading-number reordering applies below this length
    pub reorder_max_len: usize,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            column_shift: 0.10,
            huge_gap: 0.10,
            large_gap: 0.04,
            uppercase_ratio: 0.8,
            uppercase_min_len: 4,
            uppercase_max_len: 149,
            margin_top: 0.1,
            margin_bottom: 0.9,
            reorder_max_len: 80,
        }
    }
}

/// State threaded through one pass over a page.
#[derive(Debug, Default)]
struct AssemblyState<'a> {
    /// Normalized lines of the open paragraph
    paragraph: Vec<String>,
    /// Last text, math or table block seen
    prev: Option<&'a LayoutBlock>,
    elements: Vec<DocumentElement>,
}

impl AssemblyState<'_> {
    fn flush(&mut self) {
        if self.paragraph.is_empty() {
            return;
        }
        let text = self.paragraph.join(" ");
        self.paragraph.clear();
        self.elements.push(DocumentElement::paragraph(text));
    }

    fn last_is_math(&self) -> bool {
        self.elements
            .last()
            .is_some_and(|e| e.kind == ElementKind::Math)
    }
}

/// Merges a page's blocks into a flat element list.
#[derive(Debug, Clone)]
pub struct BlockAssembler {
    config: AssemblerConfig,
    classifier: BlockClassifier,
    patterns: Patterns,
}

impl BlockAssembler {
    /// Create an assembler with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(AssemblerConfig::default(), ClassifierConfig::default())
    }

    /// Create an assembler with custom configuration.
    pub fn with_config(config: AssemblerConfig, classifier: ClassifierConfig) -> Result<Self> {
        Ok(Self {
            config,
            classifier: BlockClassifier::with_config(classifier)?,
            patterns: Patterns::new()?,
        })
    }

    /// Assemble one page. Blocks and contents are paired by position; extra
    /// entries on either side are ignored.
    pub fn assemble(
        &self,
        blocks: &[LayoutBlock],
        contents: &[ExtractedContent],
    ) -> Vec<DocumentElement> {
        let mut state = AssemblyState::default();

        for (block, content) in blocks.iter().zip(contents) {
            if let Some(text) = content.text() {
                self.push_text(&mut state, block, text);
            } else if let Some(latex) = content.latex() {
                self.push_markup(&mut state, block, latex);
            } else if let Some(path) = content.image_path() {
                state.flush();
                state.elements.push(DocumentElement::image(path.clone()));
            }
        }
        state.flush();

        log::debug!(
            "BlockAssembler: {} blocks -> {} elements",
            blocks.len().min(contents.len()),
            state.elements.len()
        );
        state.elements
    }

    fn push_text<'a>(&self, state: &mut AssemblyState<'a>, block: &'a LayoutBlock, text: &str) {
        if self.is_margin_page_number(block, text) {
            log::debug!("BlockAssembler: dropped page number {:?}", text.trim());
            return;
        }

        let text = self.reorder_heading_number(text);

        if let Some(tag) = self.equation_tag(&text) {
            if state.paragraph.is_empty() && state.last_is_math() {
                if let Some(math) = state.elements.last_mut() {
                    math.latex = Some(format!("{} \\tag{{{}}}", math.latex_str(), tag));
                }
                return;
            }
        }

        let should_break = match (state.prev, state.paragraph.last()) {
            (Some(prev), Some(prev_text)) => self.should_break(prev, prev_text, block, &text),
            _ => false,
        };

        let normalized = normalize_whitespace(&text);
        match self.classifier.classify(block, &text).structural_kind() {
            Some(kind) => {
                state.flush();
                state.elements.push(
                    DocumentElement::with_text(kind, normalized).with_metadata(block.metadata()),
                );
            }
            None => {
                if should_break {
                    state.flush();
                }
                state.paragraph.push(normalized);
            }
        }
        state.prev = Some(block);
    }

    fn push_markup<'a>(&self, state: &mut AssemblyState<'a>, block: &'a LayoutBlock, latex: &str) {
        let mut pending_tag = None;
        if !state.paragraph.is_empty() {
            let joined = state.paragraph.join(" ");
            match self.equation_tag(joined.trim()) {
                Some(tag) => {
                    pending_tag = Some(tag.replace(' ', ""));
                    state.paragraph.clear();
                }
                None => state.flush(),
            }
        }

        let element = if block.block_type == BlockType::Table {
            DocumentElement::table(latex)
        } else {
            match pending_tag {
                Some(tag) => DocumentElement::math(format!("{} \\tag{{{}}}", latex, tag)),
                None => DocumentElement::math(latex),
            }
        };
        state.elements.push(element);
        state.prev = Some(block);
    }

    /// Whether `text` starts a new paragraph after `prev_text`.
    ///
    /// Checks run in priority order: column change, huge gap, uppercase
    /// heading, hyphenation, sentence continuation, sentence end.
    pub fn should_break(
        &self,
        prev: &LayoutBlock,
        prev_text: &str,
        block: &LayoutBlock,
        text: &str,
    ) -> bool {
        let c = &self.config;
        let gap = block.bbox.y0 - prev.bbox.y1;
        let prev_text = prev_text.trim();

        let (decision, reason) = if (block.bbox.x0 - prev.bbox.x0).abs() > c.column_shift {
            (true, "column change")
        } else if gap > c.huge_gap {
            (true, "huge gap")
        } else if self.is_uppercase_heading(text) {
            (true, "uppercase heading")
        } else if prev_text.ends_with('-') {
            (false, "hyphenation")
        } else if !ends_sentence(prev_text) {
            (gap > c.large_gap, "mid-sentence")
        } else {
            (
                gap > c.large_gap || block.block_type != prev.block_type,
                "sentence end",
            )
        };

        log::debug!(
            "BlockAssembler: {} ({}, gap {:.3})",
            if decision { "break" } else { "merge" },
            reason,
            gap
        );
        decision
    }

    fn is_margin_page_number(&self, block: &LayoutBlock, text: &str) -> bool {
        self.patterns.page_number.is_match(text)
            && (block.bbox.y0 < self.config.margin_top || block.bbox.y0 > self.config.margin_bottom)
    }

    /// `Results 3.2` becomes `3.2 Results` for short capitalized headings.
    fn reorder_heading_number(&self, text: &str) -> String {
        if text.chars().count() >= self.config.reorder_max_len {
            return text.to_string();
        }
        let trimmed = text.trim();
        let Some(caps) = self.patterns.trailing_number.captures(trimmed) else {
            return text.to_string();
        };
        let heading = caps[1].trim();
        let looks_like_heading = heading.chars().next().is_some_and(char::is_uppercase)
            || heading.contains("Trang");
        if looks_like_heading {
            format!("{} {}", &caps[2], heading)
        } else {
            text.to_string()
        }
    }

    fn equation_tag(&self, text: &str) -> Option<String> {
        self.patterns
            .equation_tag
            .captures(text)
            .map(|caps| caps[1].to_string())
    }

    fn is_uppercase_heading(&self, text: &str) -> bool {
        let text = text.trim();
        let len = text.chars().count();
        if len < self.config.uppercase_min_len || len > self.config.uppercase_max_len {
            return false;
        }
        let alpha = text.chars().filter(|c| c.is_alphabetic()).count();
        let upper = text.chars().filter(|c| c.is_uppercase()).count();
        alpha > 0 && upper as f32 / alpha as f32 > self.config.uppercase_ratio
    }
}

fn ends_sentence(text: &str) -> bool {
    ['.', '!', '?', ':'].iter().any(|c| text.ends_with(*c))
        || [".\"", "!\"", "?\""].iter().any(|s| text.ends_with(*s))
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
