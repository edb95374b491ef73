//! Quill Core - tokenized LCS diffing and everyday text tools
//!
//! The heart of this crate is a dynamic-programming diff over word, line,
//! grapheme or code tokens, plus renderers for its output. The remaining
//! modules cover the smaller utilities: a regex tester, text formatting,
//! random generation and PDF page coordinate math.

pub mod change;
pub mod diff;
pub mod format;
pub mod lcs;
pub mod page_geometry;
pub mod random;
pub mod regex_tester;
pub mod render;
pub mod tokenize;

pub use change::{DiffOp, OpKind};
pub use diff::{CompareOptions, DiffEngine, DiffError, DiffResult, DiffStats, FileDiff};
pub use render::{Hunk, OutputFormat, Row, RowKind};
pub use tokenize::TokenMode;
