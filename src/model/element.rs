//! Semantic document elements produced by assembly and refinement.

use super::BlockMetadata;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Semantic type of a document element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Title,
    Section,
    Subsection,
    Subsubsection,
    ListItem,
    Paragraph,
    Theorem,
    Proof,
    Abstract,
    Math,
    Table,
    Image,
    /// Pre-rendered markup emitted verbatim
    RawMarkup,
}

impl ElementKind {
    /// Title and section levels.
    pub fn is_heading(&self) -> bool {
        matches!(
            self,
            Self::Title | Self::Section | Self::Subsection | Self::Subsubsection
        )
    }

    /// Elements whose payload is markup rather than text.
    pub fn is_markup(&self) -> bool {
        matches!(self, Self::Math | Self::Table | Self::RawMarkup)
    }
}

/// Theorem-like environment selected for a `Theorem` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TheoremEnv {
    #[default]
    Theorem,
    Lemma,
}

impl TheoremEnv {
    /// Environment name in the output markup.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Theorem => "theorem",
            Self::Lemma => "lemma",
        }
    }
}

/// One element of the assembled document, in reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentElement {
    /// Semantic type
    #[serde(rename = "type")]
    pub kind: ElementKind,

    /// Plain or rich text payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Markup payload (math, tables, raw markup)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latex: Option<String>,

    /// Figure path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,

    /// Environment for theorem elements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<TheoremEnv>,

    /// Optional theorem label such as "2.1"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Layout metadata for structural elements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BlockMetadata>,
}

impl DocumentElement {
    fn empty(kind: ElementKind) -> Self {
        Self {
            kind,
            text: None,
            latex: None,
            image_path: None,
            environment: None,
            label: None,
            metadata: None,
        }
    }

    /// Create a text-bearing element.
    pub fn with_text(kind: ElementKind, text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::empty(kind)
        }
    }

    /// Create a markup-bearing element.
    pub fn with_latex(kind: ElementKind, latex: impl Into<String>) -> Self {
        Self {
            latex: Some(latex.into()),
            ..Self::empty(kind)
        }
    }

    /// Create a paragraph.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::with_text(ElementKind::Paragraph, text)
    }

    /// Create a display-math element.
    pub fn math(latex: impl Into<String>) -> Self {
        Self::with_latex(ElementKind::Math, latex)
    }

    /// Create a table element from rendered markup.
    pub fn table(latex: impl Into<String>) -> Self {
        Self::with_latex(ElementKind::Table, latex)
    }

    /// Create an image element.
    pub fn image(path: impl Into<PathBuf>) -> Self {
        Self {
            image_path: Some(path.into()),
            ..Self::empty(ElementKind::Image)
        }
    }

    /// Attach layout metadata.
    pub fn with_metadata(mut self, metadata: BlockMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Text payload or an empty string.
    pub fn text_str(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Markup payload or an empty string.
    pub fn latex_str(&self) -> &str {
        self.latex.as_deref().unwrap_or("")
    }

    /// True when the element carries no payload at all.
    pub fn is_empty(&self) -> bool {
        self.text_str().trim().is_empty()
            && self.latex_str().trim().is_empty()
            && self.image_path.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_constructors() {
        let p = DocumentElement::paragraph("Hello");
        assert_eq!(p.kind, ElementKind::Paragraph);
        assert_eq!(p.text_str(), "Hello");
        assert_eq!(p.latex_str(), "");

        let m = DocumentElement::math("x^2");
        assert!(m.kind.is_markup());
        assert!(!m.is_empty());
    }

    #[test]
    fn test_empty_element() {
        assert!(DocumentElement::paragraph("   ").is_empty());
        assert!(!DocumentElement::image("fig.png").is_empty());
    }

    #[test]
    fn test_element_serde_shape() {
        let json = serde_json::to_string(&DocumentElement::paragraph("x")).unwrap();
        assert_eq!(json, r#"{"type":"paragraph","text":"x"}"#);

        let raw = DocumentElement::with_latex(ElementKind::RawMarkup, "\\dotfill");
        let json = serde_json::to_string(&raw).unwrap();
        assert!(json.contains("\"raw_markup\""));
    }

    #[test]
    fn test_heading_kinds() {
        assert!(ElementKind::Title.is_heading());
        assert!(ElementKind::Subsubsection.is_heading());
        assert!(!ElementKind::ListItem.is_heading());
        assert_eq!(TheoremEnv::Lemma.name(), "lemma");
    }
}
