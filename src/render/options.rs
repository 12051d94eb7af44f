//! Rendering options and configuration.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Options for serializing a document to markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Emit the preamble and document environment around the pages
    pub full_document: bool,

    /// Emit a title block from the document info
    pub title_block: bool,

    /// Prefix each page with a `% Page N` comment
    pub page_comments: bool,

    /// Separate pages with `\newpage`
    pub page_breaks: bool,

    /// Width argument for figure images
    pub figure_width: String,

    /// Image paths under this directory are written relative to it
    pub image_base: Option<PathBuf>,

    /// Page selection
    #[serde(skip)]
    pub page_selection: PageSelection,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only the page bodies, without preamble or document environment.
    pub fn body_only() -> Self {
        Self::default().without_document()
    }

    /// Drop the preamble and page breaks, keeping every other option.
    pub fn without_document(mut self) -> Self {
        self.full_document = false;
        self.page_breaks = false;
        self
    }

    /// Enable or disable the title block.
    pub fn with_title_block(mut self, include: bool) -> Self {
        self.title_block = include;
        self
    }

    /// Enable or disable `% Page N` comments.
    pub fn with_page_comments(mut self, include: bool) -> Self {
        self.page_comments = include;
        self
    }

    /// Set the figure width argument.
    pub fn with_figure_width(mut self, width: impl Into<String>) -> Self {
        self.figure_width = width.into();
        self
    }

    /// Write image paths relative to `dir`.
    pub fn with_image_base(mut self, dir: impl Into<PathBuf>) -> Self {
        self.image_base = Some(dir.into());
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, selection: PageSelection) -> Self {
        self.page_selection = selection;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            full_document: true,
            title_block: false,
            page_comments: true,
            page_breaks: true,
            figure_width: "0.8\\textwidth".to_string(),
            image_base: None,
            page_selection: PageSelection::All,
        }
    }
}

/// Page selection for rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PageSelection {
    /// Render all pages
    #[default]
    All,
    /// Render a range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Render specific pages (1-indexed)
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Parse a page selection string such as `"2-4"` or `"1,3,5-7"`.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(PageSelection::All);
        }

        let mut pages = Vec::new();
        for part in s.split(',').map(str::trim) {
            let (start, end) = part.split_once('-').unwrap_or((part, part));
            let start: u32 = start
                .trim()
                .parse()
                .map_err(|_| Error::InvalidInput(format!("invalid page number: {}", part)))?;
            let end: u32 = end
                .trim()
                .parse()
                .map_err(|_| Error::InvalidInput(format!("invalid page number: {}", part)))?;
            if start > end {
                return Err(Error::InvalidInput(format!("descending page range: {}", part)));
            }
            pages.extend(start..=end);
        }

        pages.sort_unstable();
        pages.dedup();
        match (pages.first(), pages.last()) {
            (Some(&first), Some(&last)) if (last - first) as usize + 1 == pages.len() => {
                Ok(PageSelection::Range(first..=last))
            }
            _ => Ok(PageSelection::Pages(pages)),
        }
    }
}
