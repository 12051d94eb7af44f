//! Rich-text escaping for the markup output.
//!
//! OCR text arrives with light HTML-style markup (`<b>`, `<i>`, `<sup>`,
//! `<sub>`, `<math>`) and inline math delimiters. Math spans pass through
//! untouched, formatting tags become typed commands, and everything else has
//! its reserved characters escaped.

use regex::{NoExpand, Regex};
use unicode_normalization::UnicodeNormalization;

use crate::error::Result;

const SUP_OPEN: char = '\u{E000}';
const SUP_CLOSE: char = '\u{E001}';
const SUB_OPEN: char = '\u{E002}';
const SUB_CLOSE: char = '\u{E003}';

/// Known OCR misreadings in Vietnamese mathematical text.
const OCR_CORRECTIONS: &[(&str, &str)] = &[
    (r"n\\'eu", "nếu"),
    (r"\\'", "'"),
    (r"\bNhửn diửn\b", "Nhận diện"),
    (r"\bkứ hứu\b", "ký hiệu"),
    (r"\bký h iệu\b", "ký hiệu"),
    (r"toận", "toán"),
    (r"thuộng", "thường"),
    (r"Phân biửt", "Phân biệt"),
    (r"h\.t\.d\b", "h.t.đ"),
    (r"v'oi", "với"),
    (r"vòi", "với"),
    (r"khì", "khi"),
    (r"công thúc", "công thức"),
    (r"đinh lý", "định lý"),
    (r"già sử", "giả sử"),
    (r"mênh đề", "mệnh đề"),
    (r"hàm sô\b", "hàm số"),
    (r"Phuong trình", "Phương trình"),
    (r"nghiêm\b", "nghiệm"),
    (r"tôn tại", "tồn tại"),
    (r"khong gian", "không gian"),
    (r"vửét", "viết"),
    (r"đirợc", "được"),
    (r"dược", "được"),
    (r"cùa", "của"),
    (r"\bma trân\b", "ma trận"),
    (r"\bĐinh nghĩa\b", "Định nghĩa"),
    (r"\bDjnh nghia\b", "Định nghĩa"),
    (r"\bDinh ly\b", "Định lý"),
    (r"\bBô dề\b", "Bổ đề"),
    (r"\bHê quả\b", "Hệ quả"),
];

const LIGATURES: &[(&str, &str)] = &[
    ("\u{FB00}", "ff"),
    ("\u{FB01}", "fi"),
    ("\u{FB02}", "fl"),
    ("\u{FB03}", "ffi"),
    ("\u{FB04}", "ffl"),
    ("\u{FB05}", "st"),
    ("\u{FB06}", "st"),
];

/// Options for text escaping.
#[derive(Debug, Clone)]
pub struct EscapeOptions {
    /// Normalize Unicode to NFC form
    pub normalize_unicode: bool,

    /// Expand typographic ligatures (fi, fl, ...)
    pub fix_ligatures: bool,

    /// Apply the OCR correction table
    pub ocr_corrections: bool,
}

impl EscapeOptions {
    /// All repairs enabled.
    pub fn new() -> Self {
        Self {
            normalize_unicode: true,
            fix_ligatures: true,
            ocr_corrections: true,
        }
    }

    /// Escaping only, no text repair.
    pub fn minimal() -> Self {
        Self {
            normalize_unicode: false,
            fix_ligatures: false,
            ocr_corrections: false,
        }
    }

    /// Enable or disable the OCR correction table.
    pub fn with_ocr_corrections(mut self, enabled: bool) -> Self {
        self.ocr_corrections = enabled;
        self
    }
}

impl Default for EscapeOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts rich OCR text into escaped markup text.
#[derive(Debug, Clone)]
pub struct MarkupEscaper {
    options: EscapeOptions,
    sup: Regex,
    sub: Regex,
    math: Regex,
    stray_math: Regex,
    rich: Regex,
    corrections: Vec<(Regex, &'static str)>,
}

impl MarkupEscaper {
    /// Create an escaper with the given options.
    pub fn new(options: EscapeOptions) -> Result<Self> {
        let corrections = OCR_CORRECTIONS
            .iter()
            .map(|(pattern, replacement)| {
                Regex::new(&format!("(?i){}", pattern)).map(|re| (re, *replacement))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            options,
            sup: Regex::new(r"(?is)<sup\b[^>]*>(.*?)</sup>")?,
            sub: Regex::new(r"(?is)<sub\b[^>]*>(.*?)</sub>")?,
            math: Regex::new(
                r#"(?s)<math(?:\s+display="(?:block|inline)")?>.+?</math>|\$\$.+?\$\$|\$.+?\$|\\\(.+?\\\)|\\\[.+?\\\]"#,
            )?,
            stray_math: Regex::new(r"(?i)</?math[^>]*>")?,
            rich: Regex::new(r"(?is)<b>(.*?)</b>|<i>(.*?)</i>")?,
            corrections,
        })
    }

    /// Create an escaper with all repairs enabled.
    pub fn with_defaults() -> Result<Self> {
        Self::new(EscapeOptions::default())
    }

    /// Escape one rich-text string.
    pub fn escape(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let mut text: String = text.chars().filter(|c| !is_sentinel(*c)).collect();
        if self.options.normalize_unicode {
            text = text.nfc().collect();
        }

        let sup = format!("{}${{1}}{}", SUP_OPEN, SUP_CLOSE);
        let sub = format!("{}${{1}}{}", SUB_OPEN, SUB_CLOSE);
        text = self.sup.replace_all(&text, sup.as_str()).into_owned();
        text = self.sub.replace_all(&text, sub.as_str()).into_owned();
        text = text.replace("&nbsp;", " ");

        if self.options.fix_ligatures {
            for (ligature, replacement) in LIGATURES {
                text = text.replace(ligature, replacement);
            }
        }
        if self.options.ocr_corrections {
            for (re, replacement) in &self.corrections {
                text = re.replace_all(&text, NoExpand(*replacement)).into_owned();
            }
        }

        let mut output = String::with_capacity(text.len() + 16);
        let mut last = 0;
        for m in self.math.find_iter(&text) {
            output.push_str(&self.rich_text(&text[last..m.start()]));
            output.push_str(&render_math(m.as_str()));
            last = m.end();
        }
        output.push_str(&self.rich_text(&text[last..]));

        output
            .replace(SUP_OPEN, "\\textsuperscript{")
            .replace(SUB_OPEN, "\\textsubscript{")
            .replace(&[SUP_CLOSE, SUB_CLOSE][..], "}")
    }

    /// Bold/italic spans become commands; the rest is escaped.
    fn rich_text(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        let text = self.stray_math.replace_all(text, "");

        let mut output = String::with_capacity(text.len());
        let mut last = 0;
        for caps in self.rich.captures_iter(&text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            output.push_str(&escape_reserved(&text[last..whole.start()]));
            if let Some(bold) = caps.get(1) {
                output.push_str("\\textbf{");
                output.push_str(&self.rich_text(bold.as_str()));
            } else if let Some(italic) = caps.get(2) {
                output.push_str("\\textit{");
                output.push_str(&self.rich_text(italic.as_str()));
            }
            output.push('}');
            last = whole.end();
        }
        output.push_str(&escape_reserved(&text[last..]));
        output
    }
}

/// Escape the ten reserved characters of the markup language.
pub fn escape_reserved(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => result.push_str("\\textbackslash{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                result.push('\\');
                result.push(c);
            }
            '~' => result.push_str("\\textasciitilde{}"),
            '^' => result.push_str("\\textasciicircum{}"),
            _ => result.push(c),
        }
    }
    result
}

fn render_math(span: &str) -> String {
    let (content, display) = if span.starts_with("<math") {
        let open_end = span.find('>').map(|i| i + 1).unwrap_or(0);
        let display = span[..open_end].contains(r#"display="block""#);
        let inner = span[open_end..].strip_suffix("</math>").unwrap_or(&span[open_end..]);
        (inner, display)
    } else if let Some(inner) = span.strip_prefix("$$").and_then(|s| s.strip_suffix("$$")) {
        (inner, true)
    } else if let Some(inner) = span.strip_prefix('$').and_then(|s| s.strip_suffix('$')) {
        (inner, false)
    } else if let Some(inner) = span.strip_prefix("\\(").and_then(|s| s.strip_suffix("\\)")) {
        (inner, false)
    } else if let Some(inner) = span.strip_prefix("\\[").and_then(|s| s.strip_suffix("\\]")) {
        (inner, true)
    } else {
        (span, false)
    };

    if display {
        format!("\n\\[ {} \\]\n", content.trim())
    } else {
        format!("${}$", content)
    }
}

fn is_sentinel(c: char) -> bool {
    matches!(c, SUP_OPEN | SUP_CLOSE | SUB_OPEN | SUB_CLOSE)
}
