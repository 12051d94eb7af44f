//! Markup serialization for reconstructed documents.
//!
//! Each page renders independently; the only state crossing page boundaries
//! is whether the document's leading title has been emitted. Within a page,
//! consecutive list items share one `itemize` and consecutive abstract
//! elements share one `abstract` environment.

use std::path::Path;

use regex::Regex;

use crate::error::Result;
use crate::model::{Document, DocumentElement, DocumentInfo, ElementKind, Page};

use super::{MarkupEscaper, RenderOptions, RenderResult, RenderStats};

const PREAMBLE: &str = r"\documentclass[12pt,a4paper]{article}
\usepackage{amsmath,amssymb,amsfonts,amsthm}
\usepackage{graphicx}
\usepackage{multirow}
\usepackage{geometry}
\geometry{margin=2.5cm}
\setlength{\parindent}{0pt}
\setlength{\parskip}{6pt}

\newtheorem{theorem}{Theorem}[section]
\newtheorem{lemma}[theorem]{Lemma}
\renewcommand{\abstractname}{\Large\bfseries Abstract}
";

/// Convert a document to markup.
pub fn to_latex(doc: &Document, options: &RenderOptions) -> Result<String> {
    LatexRenderer::new(options.clone())?.render(doc)
}

/// Convert a document to markup with element statistics.
pub fn to_latex_with_stats(doc: &Document, options: &RenderOptions) -> Result<RenderResult> {
    LatexRenderer::new(options.clone())?.render_with_stats(doc)
}

/// Environments open while walking one page.
#[derive(Debug, Default)]
struct PageState {
    in_list: bool,
    in_abstract: bool,
}

impl PageState {
    fn open_list(&mut self, out: &mut String) {
        self.close_abstract(out);
        if !self.in_list {
            out.push_str("\\begin{itemize}\n");
            self.in_list = true;
        }
    }

    fn close_list(&mut self, out: &mut String) {
        if self.in_list {
            out.push_str("\\end{itemize}\n\n");
            self.in_list = false;
        }
    }

    fn open_abstract(&mut self, out: &mut String) {
        self.close_list(out);
        if !self.in_abstract {
            out.push_str("\\begin{abstract}\n");
            self.in_abstract = true;
        }
    }

    fn close_abstract(&mut self, out: &mut String) {
        if self.in_abstract {
            out.push_str("\\end{abstract}\n\n");
            self.in_abstract = false;
        }
    }

    fn close_all(&mut self, out: &mut String) {
        self.close_abstract(out);
        self.close_list(out);
    }
}

/// Document markup renderer.
pub struct LatexRenderer {
    options: RenderOptions,
    escaper: MarkupEscaper,
    abstract_marker: Regex,
    references: Regex,
    list_marker: Regex,
}

impl LatexRenderer {
    /// Create a renderer with the default escaper.
    pub fn new(options: RenderOptions) -> Result<Self> {
        Ok(Self {
            options,
            escaper: MarkupEscaper::with_defaults()?,
            abstract_marker: Regex::new(r"(?i)^(Abstract|Tóm tắt)[:.]?\s*")?,
            references: Regex::new(r"(?i)^(References|Tài liệu tham khảo|Bibliography)")?,
            list_marker: Regex::new(r"^\s*(?:[•\-*]\s*)?(?:\(?(?:\d+|[a-zA-Z])[.)]\s+)?")?,
        })
    }

    /// Use a specific escaper for text payloads.
    pub fn with_escaper(mut self, escaper: MarkupEscaper) -> Self {
        self.escaper = escaper;
        self
    }

    /// Render a document.
    pub fn render(&self, doc: &Document) -> Result<String> {
        Ok(self.render_with_stats(doc)?.content)
    }

    /// Render a document and count what was written.
    pub fn render_with_stats(&self, doc: &Document) -> Result<RenderResult> {
        let mut stats = RenderStats::new();
        let mut out = String::new();

        if self.options.full_document {
            out.push_str(PREAMBLE);
            out.push_str("\n\\begin{document}\n\n");
            if self.options.title_block {
                out.push_str(&self.title_block(&doc.info));
            }
        }

        let mut title_seen = false;
        for page in &doc.pages {
            if !self.options.page_selection.includes(page.number) {
                continue;
            }
            out.push_str(&self.render_page(page, &mut title_seen, &mut stats));
            if self.options.page_breaks {
                out.push_str("\n\\newpage\n\n");
            }
        }

        if self.options.full_document {
            out.push_str("\\end{document}\n");
        }

        log::debug!(
            "LatexRenderer: {} pages, {} bytes",
            stats.page_count,
            out.len()
        );
        Ok(RenderResult::new(out, stats))
    }

    fn title_block(&self, info: &DocumentInfo) -> String {
        let Some(title) = info.title.as_deref() else {
            return String::new();
        };
        let author = info.author.as_deref().unwrap_or("");
        format!(
            "\\title{{{}}}\n\\author{{{}}}\n\\date{{{}}}\n\\maketitle\n\n",
            self.escaper.escape(title),
            self.escaper.escape(author),
            info.date_or_today().format("%B %-d, %Y")
        )
    }

    /// Render one page's elements.
    pub fn render_page(&self, page: &Page, title_seen: &mut bool, stats: &mut RenderStats) -> String {
        stats.add_page();

        let mut out = String::new();
        if self.options.page_comments {
            out.push_str(&format!("% Page {}\n", page.number));
        }

        let mut state = PageState::default();
        for element in &page.elements {
            stats.add_element(element);
            match element.kind {
                ElementKind::Abstract => {
                    state.open_abstract(&mut out);
                    let text = self.abstract_marker.replace(element.text_str(), "");
                    out.push_str(&self.escaper.escape(&text));
                    out.push('\n');
                }
                ElementKind::ListItem => {
                    state.open_list(&mut out);
                    out.push_str("  \\item ");
                    out.push_str(&self.escaper.escape(self.strip_list_marker(element.text_str())));
                    out.push('\n');
                }
                _ => {
                    state.close_all(&mut out);
                    self.render_element(element, page.number, title_seen, &mut out);
                }
            }
        }
        state.close_all(&mut out);

        out
    }

    fn render_element(
        &self,
        element: &DocumentElement,
        page_number: u32,
        title_seen: &mut bool,
        out: &mut String,
    ) {
        let text = element.text_str();
        match element.kind {
            ElementKind::Title => {
                let command = if *title_seen { "subsection*" } else { "section*" };
                *title_seen = true;
                out.push_str(&format!("\\{}{{{}}}\n\n", command, self.escaper.escape(text)));
            }
            ElementKind::Section => self.heading("section", text, out),
            ElementKind::Subsection => self.heading("subsection", text, out),
            ElementKind::Subsubsection => self.heading("subsubsection", text, out),
            ElementKind::Theorem => {
                let env = element.environment.unwrap_or_default().name();
                let label = element
                    .label
                    .as_deref()
                    .map(|l| format!("[{}]", self.escaper.escape(l)))
                    .unwrap_or_default();
                out.push_str(&format!(
                    "\\begin{{{env}}}{label}\n{}\n\\end{{{env}}}\n\n",
                    self.escaper.escape(text)
                ));
            }
            ElementKind::Proof => {
                out.push_str(&format!(
                    "\\begin{{proof}}\n{}\n\\end{{proof}}\n\n",
                    self.escaper.escape(text)
                ));
            }
            ElementKind::Paragraph => {
                if self.references.is_match(text) {
                    out.push_str(&format!("\\section*{{{}}}\n\n", self.escaper.escape(text)));
                } else {
                    self.paragraph(text, out);
                }
            }
            ElementKind::Math => {
                let latex = element.latex_str().trim();
                if !latex.is_empty() {
                    out.push_str(&format!("\\[\n{}\n\\]\n\n", latex));
                }
            }
            ElementKind::Table | ElementKind::RawMarkup => {
                if let Some(latex) = element.latex.as_deref().filter(|l| !l.trim().is_empty()) {
                    out.push_str(&format!("\n{}\n\n", latex));
                } else if !text.trim().is_empty() {
                    self.paragraph(text, out);
                } else if let Some(path) = element.image_path.as_deref() {
                    self.figure(path, page_number, out);
                }
            }
            ElementKind::Image => {
                if let Some(path) = element.image_path.as_deref() {
                    self.figure(path, page_number, out);
                }
            }
            ElementKind::Abstract | ElementKind::ListItem => {}
        }
    }

    fn heading(&self, command: &str, text: &str, out: &mut String) {
        out.push_str(&format!("\\{}{{{}}}\n\n", command, self.escaper.escape(text)));
    }

    fn paragraph(&self, text: &str, out: &mut String) {
        out.push_str(&self.escaper.escape(text));
        out.push_str("\n\n");
    }

    fn figure(&self, path: &Path, page_number: u32, out: &mut String) {
        let path = self
            .options
            .image_base
            .as_deref()
            .and_then(|base| path.strip_prefix(base).ok())
            .unwrap_or(path);
        out.push_str("\\begin{figure}[h]\n");
        out.push_str("  \\centering\n");
        out.push_str(&format!(
            "  \\includegraphics[width={}]{{{}}}\n",
            self.options.figure_width,
            path.display()
        ));
        out.push_str(&format!("  \\caption{{Figure from page {}}}\n", page_number));
        out.push_str("\\end{figure}\n\n");
    }

    /// Drop a leading bullet, then a leading enumerator such as `1.` or `a)`.
    fn strip_list_marker<'a>(&self, text: &'a str) -> &'a str {
        let end = self.list_marker.find(text).map_or(0, |m| m.end());
        &text[end..]
    }
}
