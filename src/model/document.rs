//! Document-level types.

use super::{DocumentElement, ElementKind};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// A reconstructed document: pages of semantic elements.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Title, author and date
    #[serde(default)]
    pub info: DocumentInfo,

    /// Pages in reading order
    pub pages: Vec<Page>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by number (1-indexed).
    pub fn get_page(&self, number: u32) -> Option<&Page> {
        if number == 0 {
            return None;
        }
        self.pages.get((number - 1) as usize)
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// All elements across pages, in order.
    pub fn elements(&self) -> impl Iterator<Item = &DocumentElement> {
        self.pages.iter().flat_map(|p| p.elements.iter())
    }

    /// Per-page counts plus document info.
    pub fn stats(&self) -> DocumentStats {
        DocumentStats {
            title: self.info.title.clone(),
            author: self.info.author.clone(),
            date: self.info.date_or_today(),
            pages: self.pages.iter().map(|p| p.stats.clone()).collect(),
        }
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.pages
            .iter()
            .map(|page| page.plain_text())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Document information rendered in the title block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// Document title
    pub title: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// Document date
    pub date: Option<NaiveDate>,
}

impl DocumentInfo {
    /// Create info with a title.
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Set the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the date.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// The configured date, or the local current date.
    pub fn date_or_today(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Local::now().date_naive())
    }
}

/// One processed page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,

    /// Elements in reading order
    pub elements: Vec<DocumentElement>,

    /// Input counts for diagnostics
    pub stats: PageStats,
}

impl Page {
    /// Create an empty page.
    pub fn new(number: u32) -> Self {
        Self {
            number,
            elements: Vec::new(),
            stats: PageStats::new(number),
        }
    }

    /// Check if the page has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Count elements of a kind.
    pub fn count(&self, kind: ElementKind) -> usize {
        self.elements.iter().filter(|e| e.kind == kind).count()
    }

    /// Get plain text content of the page.
    pub fn plain_text(&self) -> String {
        self.elements
            .iter()
            .filter_map(|e| e.text.as_deref())
            .filter(|t| !t.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Per-page input counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageStats {
    /// Page number (1-indexed)
    pub page: u32,
    /// Layout blocks received
    pub blocks: usize,
    /// Blocks carrying text
    pub text_blocks: usize,
    /// Blocks carrying math/table markup
    pub latex_blocks: usize,
    /// Blocks carrying an image
    pub image_blocks: usize,
}

impl PageStats {
    /// Create empty stats for a page.
    pub fn new(page: u32) -> Self {
        Self {
            page,
            ..Default::default()
        }
    }

    /// Merge another page's counts into this one.
    pub fn merge(&mut self, other: &PageStats) {
        self.blocks += other.blocks;
        self.text_blocks += other.text_blocks;
        self.latex_blocks += other.latex_blocks;
        self.image_blocks += other.image_blocks;
    }
}

/// Diagnostics written alongside a rendered document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentStats {
    pub title: Option<String>,
    pub author: Option<String>,
    pub date: NaiveDate,
    pub pages: Vec<PageStats>,
}

impl DocumentStats {
    /// Sum of all page counts.
    pub fn totals(&self) -> PageStats {
        let mut total = PageStats::new(0);
        for page in &self.pages {
            total.merge(page);
        }
        total
    }
}
