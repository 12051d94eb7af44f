//! Compiled text patterns shared by the structure heuristics.

use regex::Regex;

use crate::error::Result;

/// Regular expressions used by classification, assembly and refinement.
///
/// Compiled once per component; cloning shares the compiled programs.
#[derive(Debug, Clone)]
pub struct Patterns {
    /// `2.1 Background`, `IV. Results`, `B. Appendix`
    pub section_number: Regex,
    /// Leading year such as `2024 ...`
    pub leading_year: Regex,
    /// A bare page number
    pub page_number: Regex,
    /// `Heading 2.1`, a heading whose number was read after its text
    pub trailing_number: Regex,
    /// `(3)`, `[2.1]`, `( 1.2 ).`
    pub equation_tag: Regex,
    /// `Abstract`, `Abstract:`
    pub abstract_marker: Regex,
    /// `CHAPTER 2`, `APPENDIX A`, `PHẦN I`
    pub explicit_section: Regex,
    /// `Note: ...`
    pub paragraph_label: Regex,
    /// Theorem-like markers
    pub theorem: Regex,
    /// End of a theorem label
    pub label_delimiter: Regex,
    /// Proof marker followed by a delimiter, optionally wrapped in emphasis
    pub proof_start: Regex,
    /// A block holding nothing but a proof marker
    pub proof_only: Regex,
    /// Dot leaders of a table of contents
    pub dot_leaders: Regex,
    /// Opening command of a markup group, `\textbf{`
    pub markup_command: Regex,
    /// Opening line of a tabular environment
    pub tabular_begin: Regex,
    /// Uppercase run followed by a capitalized word
    pub upper_then_mixed: Regex,
    /// A line made only of uppercase letters, digits and dots
    pub upper_line: Regex,
    /// Heading ended by a colon or period
    pub punctuated_header: Regex,
    /// Uppercase heading text including colons
    pub upper_header: Regex,
}

impl Patterns {
    /// Compile all patterns.
    pub fn new() -> Result<Self> {
        Ok(Self {
            section_number: Regex::new(r"^(\d+(\.\d+)*|[IVX]+\.|[A-Z]\.)\s+\p{Lu}")?,
            leading_year: Regex::new(r"^(19|20)\d{2}")?,
            page_number: Regex::new(r"^\s*\d+\s*$")?,
            trailing_number: Regex::new(r"^([^.]+?)\s+(\d+(\.\d+)*)$")?,
            equation_tag: Regex::new(r"^\s*[(\[]\s*(\d+(?:[.\s]\d+)*)\s*[)\]][.,;]?\s*$")?,
            abstract_marker: Regex::new(r"(?i)^(Abstract|Tóm tắt)(\s*[:.])?")?,
            explicit_section: Regex::new(
                r"(?i)^(PHẦN|PHỤ LỤC|CHƯƠNG|SECTION|APPENDIX|CHAPTER|PART)\s+(?-i:[A-Z0-9.]+)\b",
            )?,
            paragraph_label: Regex::new(r"^([^.]+?):")?,
            theorem: Regex::new(r"(?i)^(Định lý|Theorem|Lemma|Bổ đề|Tính chất|Hệ quả)\b")?,
            label_delimiter: Regex::new(r"[:.](\s|$)")?,
            proof_start: Regex::new(
                r"(?i)^(\\textit\{|\\textbf\{|[*\\{])*(Chứng minh|Proof|Lời giải)[*}.]*(\s*[:.])",
            )?,
            proof_only: Regex::new(
                r"(?i)^(\\textit\{|\\textbf\{|[*\\{])*(Chứng minh|Proof|Lời giải)[*}.]*(\s*[:.])?$",
            )?,
            dot_leaders: Regex::new(r"(\.\s*){4,}|…{3,}")?,
            markup_command: Regex::new(r"\\[a-zA-Z]+\{")?,
            tabular_begin: Regex::new(r"\\begin\{tabular\}.*?(\n|$)")?,
            upper_then_mixed: Regex::new(r"(?s)^([\p{Lu}\s()0-9.]{5,50}?)\s+(\p{Lu}\p{Ll}.*)")?,
            upper_line: Regex::new(r"^[\p{Lu}\s0-9.]+$")?,
            punctuated_header: Regex::new(r"(?s)^(.{5,50}?)([:.])\s+(.*)")?,
            upper_header: Regex::new(r"^[\p{Lu}\s0-9.:]+$")?,
        })
    }
}
