//! Rewrite passes over an assembled element list.
//!
//! Each pass is a pure `Vec<DocumentElement> -> Vec<DocumentElement>`
//! transform. [`SemanticRefiner::refine`] applies them in a fixed order:
//!
//! 1. drop empty elements
//! 2. abstract on the first page
//! 3. explicit section keywords
//! 4. short paragraph labels (`Note: ...`)
//! 5. theorem-like environments
//! 6. proofs
//! 7. table-of-contents tables
//! 8. uppercase paragraphs promoted to sections
//! 9. header/body splitting of run-on sections

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{DocumentElement, ElementKind, TheoremEnv};
use crate::render::MarkupEscaper;

use super::Patterns;

/// Characters that mark a paragraph as a formula rather than a heading.
const MATH_OPERATORS: &[char] = &['=', '<', '>', '≤', '≥', '∫', '∑'];

/// Semantic refiner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefinerConfig {
    /// Zero-based page index on which abstracts are recognized
    pub abstract_page_index: usize,
    /// Paragraph labels have fewer words than this
    pub label_max_words: usize,
    /// Theorems are longer than this after markup is stripped
    pub theorem_min_len: usize,
    /// Theorem labels are shorter than this
    pub theorem_label_max_len: usize,
    /// Promoted sections are shorter than this
    pub promote_max_len: usize,
    /// Promoted sections have at least this many words
    pub promote_min_words: usize,
    /// Paragraphs longer than this are split candidates
    pub split_min_len: usize,
    /// Split candidates have more words than this
    pub split_min_words: usize,
    /// A first-line header has fewer words than this
    pub line_header_max_words: usize,
    /// An uppercase-run header has fewer words than this
    pub run_header_max_words: usize,
}

impl Default for RefinerConfig {
    fn default() -> Self {
        Self {
            abstract_page_index: 0,
            label_max_words: 6,
            theorem_min_len: 10,
            theorem_label_max_len: 20,
            promote_max_len: 100,
            promote_min_words: 3,
            split_min_len: 100,
            split_min_words: 20,
            line_header_max_words: 20,
            run_header_max_words: 15,
        }
    }
}

type Pass = fn(&SemanticRefiner, Vec<DocumentElement>, usize) -> Vec<DocumentElement>;

/// Retypes and splits assembled elements.
#[derive(Debug, Clone)]
pub struct SemanticRefiner {
    config: RefinerConfig,
    patterns: Patterns,
    escaper: MarkupEscaper,
}

impl SemanticRefiner {
    /// Create a refiner with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(RefinerConfig::default())
    }

    /// Create a refiner with custom configuration.
    pub fn with_config(config: RefinerConfig) -> Result<Self> {
        Ok(Self {
            config,
            patterns: Patterns::new()?,
            escaper: MarkupEscaper::with_defaults()?,
        })
    }

    /// Use a specific escaper for labels rewritten as markup.
    pub fn with_escaper(mut self, escaper: MarkupEscaper) -> Self {
        self.escaper = escaper;
        self
    }

    /// Apply every pass in order to one page's elements.
    pub fn refine(&self, elements: Vec<DocumentElement>, page_index: usize) -> Vec<DocumentElement> {
        let passes: [(&str, Pass); 9] = [
            ("drop_empty", Self::drop_empty),
            ("mark_abstract", Self::mark_abstract),
            ("mark_explicit_sections", Self::mark_explicit_sections),
            ("rewrite_paragraph_labels", Self::rewrite_paragraph_labels),
            ("mark_theorems", Self::mark_theorems),
            ("mark_proofs", Self::mark_proofs),
            ("rewrite_contents_tables", Self::rewrite_contents_tables),
            ("promote_uppercase", Self::promote_uppercase),
            ("split_headers", Self::split_headers),
        ];

        passes.iter().fold(elements, |elements, (name, pass)| {
            let before = elements.len();
            let elements = pass(self, elements, page_index);
            log::debug!("SemanticRefiner: {} ({} -> {})", name, before, elements.len());
            elements
        })
    }

    /// Remove elements with no text, markup or image.
    pub fn drop_empty(&self, elements: Vec<DocumentElement>, _page: usize) -> Vec<DocumentElement> {
        elements.into_iter().filter(|e| !e.is_empty()).collect()
    }

    /// First-page text starting with an abstract marker becomes `Abstract`.
    pub fn mark_abstract(&self, elements: Vec<DocumentElement>, page: usize) -> Vec<DocumentElement> {
        if page != self.config.abstract_page_index {
            return elements;
        }
        self.retype(elements, |e| {
            (is_textual(e) && self.patterns.abstract_marker.is_match(e.text_str().trim()))
                .then_some(ElementKind::Abstract)
        })
    }

    /// Chapter, appendix and part markers override to `Section`.
    pub fn mark_explicit_sections(
        &self,
        elements: Vec<DocumentElement>,
        _page: usize,
    ) -> Vec<DocumentElement> {
        self.retype(elements, |e| {
            (is_textual(e) && self.patterns.explicit_section.is_match(e.text_str().trim()))
                .then_some(ElementKind::Section)
        })
    }

    /// `Label: body` paragraphs become a raw `\paragraph` heading with body.
    pub fn rewrite_paragraph_labels(
        &self,
        elements: Vec<DocumentElement>,
        _page: usize,
    ) -> Vec<DocumentElement> {
        elements
            .into_iter()
            .map(|mut e| {
                if e.kind != ElementKind::Paragraph {
                    return e;
                }
                let text = e.text_str().trim();
                if self.is_theorem_start(text) || self.is_proof_start(text) {
                    return e;
                }
                let Some(caps) = self.patterns.paragraph_label.captures(text) else {
                    return e;
                };
                let label = &caps[1];
                if label.split_whitespace().count() >= self.config.label_max_words
                    || text.chars().count() <= label.chars().count() + 2
                {
                    return e;
                }

                let body = text[label.len() + 1..].trim();
                let markup = format!(
                    "\\paragraph{{{}:}} {}",
                    self.escaper.escape(label),
                    self.escaper.escape(body)
                );
                log::debug!("SemanticRefiner: paragraph label {:?}", label);
                e.kind = ElementKind::RawMarkup;
                e.latex = Some(markup);
                e.text = None;
                e
            })
            .collect()
    }

    /// Theorem-like markers become `Theorem` with environment and label.
    pub fn mark_theorems(&self, elements: Vec<DocumentElement>, _page: usize) -> Vec<DocumentElement> {
        elements
            .into_iter()
            .map(|mut e| {
                if !is_textual(&e) {
                    return e;
                }
                let text = e.text_str().trim().to_string();
                let clean = self.strip_markup(&text);
                if !self.patterns.theorem.is_match(&clean)
                    || clean.chars().count() <= self.config.theorem_min_len
                {
                    return e;
                }

                let source = if self.patterns.theorem.is_match(&text) {
                    text.as_str()
                } else {
                    clean.as_str()
                };
                let (env, label, body) = self.parse_theorem(source);
                log::debug!("SemanticRefiner: {} {:?}", env.name(), label);
                e.kind = ElementKind::Theorem;
                e.environment = Some(env);
                e.label = label;
                e.text = Some(body);
                e
            })
            .collect()
    }

    /// Proof markers become `Proof` with the marker removed.
    pub fn mark_proofs(&self, elements: Vec<DocumentElement>, _page: usize) -> Vec<DocumentElement> {
        elements
            .into_iter()
            .map(|mut e| {
                if !is_textual(&e) {
                    return e;
                }
                let text = e.text_str().trim();
                let marker = self
                    .patterns
                    .proof_start
                    .find(text)
                    .or_else(|| self.patterns.proof_only.find(text));
                if let Some(m) = marker {
                    let body = text[m.end()..].trim().to_string();
                    e.kind = ElementKind::Proof;
                    e.text = Some(body);
                }
                e
            })
            .collect()
    }

    /// Tables full of dot leaders are tables of contents.
    pub fn rewrite_contents_tables(
        &self,
        elements: Vec<DocumentElement>,
        _page: usize,
    ) -> Vec<DocumentElement> {
        elements
            .into_iter()
            .map(|mut e| {
                if e.kind != ElementKind::Table {
                    return e;
                }
                let latex = e.latex_str().trim();
                if !latex.is_empty() {
                    if self.patterns.dot_leaders.is_match(latex) {
                        log::debug!("SemanticRefiner: table of contents");
                        e.latex = Some(self.contents_markup(latex));
                        e.kind = ElementKind::RawMarkup;
                    }
                } else if self.patterns.dot_leaders.is_match(e.text_str()) {
                    e.kind = ElementKind::Paragraph;
                }
                e
            })
            .collect()
    }

    /// Short uppercase paragraphs become `Section`.
    pub fn promote_uppercase(
        &self,
        elements: Vec<DocumentElement>,
        _page: usize,
    ) -> Vec<DocumentElement> {
        self.retype(elements, |e| {
            (e.kind == ElementKind::Paragraph && self.looks_like_heading(e.text_str().trim()))
                .then_some(ElementKind::Section)
        })
    }

    /// Split run-on sections into a `Section` header and a `Paragraph` body.
    pub fn split_headers(&self, elements: Vec<DocumentElement>, _page: usize) -> Vec<DocumentElement> {
        let mut out = Vec::with_capacity(elements.len());
        for mut e in elements {
            let split = if self.is_split_candidate(&e) {
                self.split_header(e.text_str().trim())
            } else {
                None
            };
            match split {
                Some((header, body)) => {
                    log::debug!("SemanticRefiner: split header {:?}", header);
                    e.kind = ElementKind::Section;
                    e.text = Some(header);
                    out.push(e);
                    out.push(DocumentElement::paragraph(body));
                }
                None => out.push(e),
            }
        }
        out
    }

    fn retype<F>(&self, elements: Vec<DocumentElement>, rule: F) -> Vec<DocumentElement>
    where
        F: Fn(&DocumentElement) -> Option<ElementKind>,
    {
        elements
            .into_iter()
            .map(|mut e| {
                if let Some(kind) = rule(&e) {
                    if kind != e.kind {
                        log::debug!("SemanticRefiner: {:?} -> {:?}", e.kind, kind);
                    }
                    e.kind = kind;
                }
                e
            })
            .collect()
    }

    /// Drop `\command{` openers and closing braces.
    fn strip_markup(&self, text: &str) -> String {
        self.patterns.markup_command.replace_all(text, "").replace('}', "")
    }

    fn is_theorem_start(&self, text: &str) -> bool {
        self.patterns.theorem.is_match(&self.strip_markup(text))
    }

    fn is_proof_start(&self, text: &str) -> bool {
        self.patterns.proof_start.is_match(text) || self.patterns.proof_only.is_match(text)
    }

    /// Environment, optional label and body of a theorem-like text.
    ///
    /// The label runs from the marker to the first colon or period that is
    /// followed by whitespace.
    fn parse_theorem(&self, text: &str) -> (TheoremEnv, Option<String>, String) {
        let Some(marker) = self.patterns.theorem.find(text) else {
            return (TheoremEnv::Theorem, None, text.to_string());
        };
        let name = marker.as_str().to_lowercase();
        let env = if name.contains("lemma") || name.contains("bổ đề") {
            TheoremEnv::Lemma
        } else {
            TheoremEnv::Theorem
        };

        let rest = &text[marker.end()..];
        match self.patterns.label_delimiter.find(rest) {
            Some(delim) => {
                let label = rest[..delim.start()].trim();
                let label = (!label.is_empty()
                    && label.chars().count() < self.config.theorem_label_max_len)
                    .then(|| label.to_string());
                (env, label, rest[delim.end()..].trim().to_string())
            }
            None => (env, None, rest.trim().to_string()),
        }
    }

    /// Rows of a contents table as `label \dotfill page` lines.
    fn contents_markup(&self, latex: &str) -> String {
        let raw = self.patterns.tabular_begin.replace_all(latex, "");
        let raw = raw
            .replace("\\end{tabular}", "")
            .replace("\\begin{center}", "")
            .replace("\\end{center}", "")
            .replace("\\hline", "");

        raw.split("\\\\")
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                let parts: Vec<&str> = line.split('&').collect();
                match (parts.first(), parts.last()) {
                    (Some(first), Some(last)) if parts.len() > 1 => format!(
                        "{} \\dotfill {}",
                        first.trim().trim_end_matches(['.', '…', ' ']),
                        last.trim()
                    ),
                    _ => line.trim().to_string(),
                }
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn looks_like_heading(&self, text: &str) -> bool {
        if text.chars().count() >= self.config.promote_max_len || text.contains(MATH_OPERATORS) {
            return false;
        }
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.len() < self.config.promote_min_words {
            return false;
        }
        let upper = words
            .iter()
            .filter(|w| is_upper_word(w) || !w.chars().all(char::is_alphabetic))
            .count();
        upper + 1 >= words.len()
    }

    fn is_split_candidate(&self, e: &DocumentElement) -> bool {
        match e.kind {
            ElementKind::Section => true,
            ElementKind::Paragraph => {
                let text = e.text_str().trim();
                if text.chars().count() <= self.config.split_min_len {
                    return false;
                }
                let clean = self.strip_markup(text);
                self.patterns
                    .upper_then_mixed
                    .captures(&clean)
                    .is_some_and(|caps| caps[1].split_whitespace().count() > 2)
            }
            _ => false,
        }
    }

    /// Header and body of a run-on heading, trying in order: first line,
    /// punctuated prefix, uppercase-to-mixed-case transition.
    fn split_header(&self, text: &str) -> Option<(String, String)> {
        if text.split_whitespace().count() <= self.config.split_min_words {
            return None;
        }
        self.split_at_newline(text)
            .or_else(|| self.split_at_punctuation(text))
            .or_else(|| self.split_at_case_change(text))
            .filter(|(header, body)| !header.is_empty() && !body.is_empty())
    }

    fn split_at_newline(&self, text: &str) -> Option<(String, String)> {
        let (first, rest) = text.split_once('\n')?;
        let header = first.trim();
        (header.split_whitespace().count() < self.config.line_header_max_words
            && self.patterns.upper_line.is_match(header))
        .then(|| (header.to_string(), rest.trim().to_string()))
    }

    fn split_at_punctuation(&self, text: &str) -> Option<(String, String)> {
        let caps = self.patterns.punctuated_header.captures(text)?;
        let header = format!("{}{}", &caps[1], &caps[2]);
        (self.patterns.upper_header.is_match(&header)
            || self.patterns.explicit_section.is_match(&header))
        .then(|| (header, caps[3].to_string()))
    }

    fn split_at_case_change(&self, text: &str) -> Option<(String, String)> {
        let caps = self.patterns.upper_then_mixed.captures(text)?;
        let header = caps[1].trim();
        (header.split_whitespace().count() < self.config.run_header_max_words
            && header.chars().count() > 5)
            .then(|| (header.to_string(), caps[2].trim().to_string()))
    }
}

/// Elements whose text payload the retyping rules look at.
fn is_textual(e: &DocumentElement) -> bool {
    !e.kind.is_markup() && e.kind != ElementKind::Image
}

/// Has cased letters, none of them lowercase.
fn is_upper_word(word: &str) -> bool {
    word.chars().any(char::is_uppercase) && !word.chars().any(char::is_lowercase)
}
