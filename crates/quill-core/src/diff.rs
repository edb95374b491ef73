//! Diff computation engine

use crate::change::{DiffOp, OpKind};
use crate::lcs::{self, DEFAULT_MAX_CELLS};
use crate::tokenize::TokenMode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum DiffError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error(
        "Input too large to diff: {old_tokens} x {new_tokens} tokens exceeds {max_cells} table cells"
    )]
    TooLarge {
        old_tokens: usize,
        new_tokens: usize,
        max_cells: usize,
    },
}

/// Token counts for a diff
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    /// Tokens only in the new text
    pub insertions: usize,
    /// Tokens only in the old text
    pub deletions: usize,
    /// Tokens shared by both texts
    pub unchanged: usize,
}

impl DiffStats {
    pub fn from_ops(ops: &[DiffOp]) -> Self {
        let mut stats = Self::default();
        for op in ops {
            match op.kind {
                OpKind::Equal => stats.unchanged += op.len(),
                OpKind::Insert => stats.insertions += op.len(),
                OpKind::Delete => stats.deletions += op.len(),
            }
        }
        stats
    }

    /// Dice-style similarity: `2 * unchanged / (old + new)`.
    /// Two empty inputs are fully similar.
    pub fn similarity(&self) -> f64 {
        let total = 2 * self.unchanged + self.insertions + self.deletions;
        if total == 0 {
            return 1.0;
        }
        (2 * self.unchanged) as f64 / total as f64
    }
}

/// How tokens are compared, shared by the engine and by renderers that
/// re-diff a result line by line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareOptions {
    /// Compare tokens case-insensitively
    pub ignore_case: bool,
    /// Compare tokens with all whitespace stripped
    pub ignore_whitespace: bool,
    /// Upper bound on LCS table cells
    pub max_cells: usize,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            ignore_case: false,
            ignore_whitespace: false,
            max_cells: DEFAULT_MAX_CELLS,
        }
    }
}

impl CompareOptions {
    /// True when tokens with different text may still compare equal
    pub fn is_loose(&self) -> bool {
        self.ignore_case || self.ignore_whitespace
    }

    /// Equality key for a token
    pub fn key(&self, token: &str) -> String {
        let stripped: String = if self.ignore_whitespace {
            token.chars().filter(|c| !c.is_whitespace()).collect()
        } else {
            token.to_string()
        };
        if self.ignore_case {
            stripped.to_lowercase()
        } else {
            stripped
        }
    }

    /// Diff two token sequences under these options
    pub fn diff<T: AsRef<str>>(&self, old: &[T], new: &[T]) -> Result<Vec<DiffOp>, DiffError> {
        if self.is_loose() {
            lcs::diff_by_key(old, new, self.max_cells, |t| self.key(t.as_ref()))
        } else {
            lcs::diff(old, new, self.max_cells)
        }
    }
}

/// Result of a diff operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffResult {
    /// Tokenization used to produce the ops
    pub mode: TokenMode,
    /// Comparison the ops were computed with
    #[serde(default)]
    pub compare: CompareOptions,
    /// All operations in order
    pub ops: Vec<DiffOp>,
    pub stats: DiffStats,
}

impl DiffResult {
    pub fn new(mode: TokenMode, ops: Vec<DiffOp>) -> Self {
        let stats = DiffStats::from_ops(&ops);
        Self {
            mode,
            compare: CompareOptions::default(),
            ops,
            stats,
        }
    }

    pub fn with_compare(mut self, compare: CompareOptions) -> Self {
        self.compare = compare;
        self
    }

    /// True when no op is an insert or delete
    pub fn is_identical(&self) -> bool {
        !self.ops.iter().any(DiffOp::is_change)
    }

    /// Rebuild the old input from Equal + Delete ops
    pub fn old_text(&self) -> String {
        self.ops
            .iter()
            .filter(|op| op.in_old())
            .map(DiffOp::old_text)
            .collect()
    }

    /// Rebuild the new input from Equal + Insert ops
    pub fn new_text(&self) -> String {
        self.ops
            .iter()
            .filter(|op| op.in_new())
            .map(DiffOp::text)
            .collect()
    }

    /// Iterate over only the changed ops
    pub fn changes(&self) -> impl Iterator<Item = &DiffOp> {
        self.ops.iter().filter(|op| op.is_change())
    }
}

/// A diff for a pair of files
#[derive(Debug, Clone, Serialize)]
pub struct FileDiff {
    pub old_path: Option<String>,
    pub new_path: Option<String>,
    pub result: DiffResult,
}

/// The main diff engine
#[derive(Debug, Clone)]
pub struct DiffEngine {
    mode: TokenMode,
    compare: CompareOptions,
    /// Number of context lines for unified output
    context_lines: usize,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self {
            mode: TokenMode::Words,
            compare: CompareOptions::default(),
            context_lines: 3,
        }
    }
}

impl DiffEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: TokenMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_ignore_case(mut self, enabled: bool) -> Self {
        self.compare.ignore_case = enabled;
        self
    }

    pub fn with_ignore_whitespace(mut self, enabled: bool) -> Self {
        self.compare.ignore_whitespace = enabled;
        self
    }

    pub fn with_context(mut self, lines: usize) -> Self {
        self.context_lines = lines;
        self
    }

    pub fn with_max_cells(mut self, cells: usize) -> Self {
        self.compare.max_cells = cells;
        self
    }

    pub fn mode(&self) -> TokenMode {
        self.mode
    }

    pub fn context_lines(&self) -> usize {
        self.context_lines
    }

    pub fn compare(&self) -> CompareOptions {
        self.compare
    }

    /// Compute diff between two strings
    pub fn diff_strings(&self, old: &str, new: &str) -> Result<DiffResult, DiffError> {
        let old_tokens = self.mode.tokenize(old);
        let new_tokens = self.mode.tokenize(new);
        debug!(
            mode = %self.mode,
            old_tokens = old_tokens.len(),
            new_tokens = new_tokens.len(),
            "diffing strings"
        );

        let ops = self.compare.diff(&old_tokens, &new_tokens)?;
        Ok(DiffResult::new(self.mode, ops).with_compare(self.compare))
    }

    /// Compute diff between two files
    pub fn diff_files(&self, old_path: &Path, new_path: &Path) -> Result<FileDiff, DiffError> {
        let old_content = std::fs::read_to_string(old_path)?;
        let new_content = std::fs::read_to_string(new_path)?;

        let result = self.diff_strings(&old_content, &new_content)?;

        Ok(FileDiff {
            old_path: Some(old_path.to_string_lossy().to_string()),
            new_path: Some(new_path.to_string_lossy().to_string()),
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_simple_diff() {
        let engine = DiffEngine::new().with_mode(TokenMode::Lines);
        let old = "foo\nbar\nbaz";
        let new = "foo\nqux\nbaz";

        let result = engine.diff_strings(old, new).unwrap();

        assert_eq!(result.stats.insertions, 1);
        assert_eq!(result.stats.deletions, 1);
        assert_eq!(result.stats.unchanged, 2);
        assert!(!result.is_identical());
    }

    #[test]
    fn test_no_changes() {
        let engine = DiffEngine::new();
        let text = "foo bar baz";

        let result = engine.diff_strings(text, text).unwrap();

        assert!(result.is_identical());
        assert_eq!(result.ops.len(), 1);
        assert_eq!(result.stats.similarity(), 1.0);
    }

    #[test]
    fn test_word_diff_round_trips() {
        let engine = DiffEngine::new();
        let old = "The quick brown fox jumps";
        let new = "The slow brown cat jumps high";

        let result = engine.diff_strings(old, new).unwrap();

        assert_eq!(result.old_text(), old);
        assert_eq!(result.new_text(), new);
        assert_eq!(result.stats.unchanged, 2);
    }

    #[test]
    fn test_ignore_case() {
        let engine = DiffEngine::new().with_ignore_case(true);
        let result = engine.diff_strings("Hello World", "hello world").unwrap();

        assert!(result.is_identical());
        assert_eq!(result.old_text(), "Hello World");
        assert_eq!(result.new_text(), "hello world");
    }

    #[test]
    fn test_ignore_whitespace() {
        let engine = DiffEngine::new()
            .with_mode(TokenMode::Lines)
            .with_ignore_whitespace(true);
        let result = engine
            .diff_strings("fn main() {\n  x();\n}\n", "fn main() {\n\tx();\n}\n")
            .unwrap();

        assert!(result.is_identical());
        assert_eq!(result.old_text(), "fn main() {\n  x();\n}\n");
    }

    #[test]
    fn test_result_keeps_compare_options() {
        let engine = DiffEngine::new()
            .with_ignore_case(true)
            .with_max_cells(1_000);
        let result = engine.diff_strings("A b", "a B").unwrap();
        assert_eq!(result.compare, engine.compare());
        assert!(result.compare.ignore_case);
        assert_eq!(result.compare.max_cells, 1_000);

        let json = serde_json::to_string(&result).unwrap();
        let back: DiffResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_compare_key() {
        let compare = CompareOptions {
            ignore_case: true,
            ignore_whitespace: true,
            ..Default::default()
        };
        assert_eq!(compare.key("  Foo Bar\n"), "foobar");
        assert!(!CompareOptions::default().is_loose());
    }

    #[test]
    fn test_similarity_ratio() {
        let stats = DiffStats {
            insertions: 1,
            deletions: 1,
            unchanged: 2,
        };
        assert!((stats.similarity() - 4.0 / 6.0).abs() < 1e-9);
        assert_eq!(DiffStats::default().similarity(), 1.0);
    }

    #[test]
    fn test_too_large_is_reported() {
        let engine = DiffEngine::new().with_mode(TokenMode::Chars).with_max_cells(10);
        let err = engine.diff_strings("abcdef", "uvwxyz").unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn test_diff_files() {
        let dir = tempfile::tempdir().unwrap();
        let old_path = dir.path().join("old.txt");
        let new_path = dir.path().join("new.txt");
        std::fs::File::create(&old_path)
            .unwrap()
            .write_all(b"one\ntwo\n")
            .unwrap();
        std::fs::File::create(&new_path)
            .unwrap()
            .write_all(b"one\nthree\n")
            .unwrap();

        let engine = DiffEngine::new().with_mode(TokenMode::Lines);
        let diff = engine.diff_files(&old_path, &new_path).unwrap();

        assert_eq!(diff.result.stats.insertions, 1);
        assert!(diff.old_path.unwrap().ends_with("old.txt"));
    }

    #[test]
    fn test_missing_file() {
        let engine = DiffEngine::new();
        let err = engine
            .diff_files(Path::new("/nonexistent/a"), Path::new("/nonexistent/b"))
            .unwrap_err();
        assert!(matches!(err, DiffError::FileRead(_)));
    }
}
