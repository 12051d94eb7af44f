//! Rendering: text escaping, table markup and document serialization.

mod escape;
mod json;
mod latex;
mod options;
mod result;
mod tabular;

pub use escape::{escape_reserved, EscapeOptions, MarkupEscaper};
pub use json::{elements_to_json, to_json, JsonFormat};
pub use latex::{to_latex, to_latex_with_stats, LatexRenderer};
pub use options::{PageSelection, RenderOptions};
pub use result::{RenderResult, RenderStats};
pub use tabular::{clean_cell_content, TabularRenderer};
