//! Document structure inference from layout blocks.
//!
//! A page flows through three stages: [`BlockClassifier`] assigns each text
//! block a role, [`BlockAssembler`] merges the blocks into a flat element
//! list, and [`SemanticRefiner`] retypes and splits those elements.

mod assembler;
mod classifier;
mod patterns;
mod refiner;

pub use assembler::{AssemblerConfig, BlockAssembler};
pub use classifier::{BlockClass, BlockClassifier, ClassifierConfig};
pub use patterns::Patterns;
pub use refiner::{RefinerConfig, SemanticRefiner};
