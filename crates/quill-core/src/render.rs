//! Renderers that turn diff ops into HTML, unified text, terminal text,
//! side-by-side rows or JSON

use crate::change::{DiffOp, OpKind};
use crate::diff::{DiffError, DiffResult};
use crate::tokenize::{tokenize_lines, TokenMode};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ANSI_RED: &str = "\x1b[31m";
const ANSI_GREEN: &str = "\x1b[32m";
const ANSI_CYAN: &str = "\x1b[36m";
const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_RESET: &str = "\x1b[0m";

const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown output format: {0} (expected html, unified, ansi, side-by-side or json)")]
pub struct UnknownOutputFormat(pub String);

/// Output format for a rendered diff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    Html,
    #[default]
    Unified,
    Ansi,
    SideBySide,
    Json,
}

impl FromStr for OutputFormat {
    type Err = UnknownOutputFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(OutputFormat::Html),
            "unified" | "patch" => Ok(OutputFormat::Unified),
            "ansi" | "inline" | "text" => Ok(OutputFormat::Ansi),
            "side-by-side" | "side" | "split" => Ok(OutputFormat::SideBySide),
            "json" => Ok(OutputFormat::Json),
            _ => Err(UnknownOutputFormat(s.to_string())),
        }
    }
}

/// Escape text for inclusion in HTML element content or attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Render ops as inline-highlighted HTML.
///
/// Equal text is emitted as-is, insertions inside `<ins class="diff-insert">`
/// and deletions inside `<del class="diff-delete">`. All text is escaped.
pub fn render_html(ops: &[DiffOp]) -> String {
    let mut html = String::new();
    for op in ops {
        let text = escape_html(&op.text());
        match op.kind {
            OpKind::Equal => html.push_str(&text),
            OpKind::Insert => {
                let _ = write!(html, "<ins class=\"diff-insert\">{text}</ins>");
            }
            OpKind::Delete => {
                let _ = write!(html, "<del class=\"diff-delete\">{text}</del>");
            }
        }
    }
    html
}

/// Render ops inline for a terminal.
///
/// With `color`, insertions are green and deletions red. Without it,
/// wdiff-style markers `{+..+}` and `[-..-]` are used instead.
pub fn render_ansi(ops: &[DiffOp], color: bool) -> String {
    let mut out = String::new();
    for op in ops {
        let text = op.text();
        match (op.kind, color) {
            (OpKind::Equal, _) => out.push_str(&text),
            (OpKind::Insert, true) => {
                let _ = write!(out, "{ANSI_GREEN}{text}{ANSI_RESET}");
            }
            (OpKind::Delete, true) => {
                let _ = write!(out, "{ANSI_RED}{text}{ANSI_RESET}");
            }
            (OpKind::Insert, false) => {
                let _ = write!(out, "{{+{text}+}}");
            }
            (OpKind::Delete, false) => {
                let _ = write!(out, "[-{text}-]");
            }
        }
    }
    out
}

/// One line of a line-level diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffLine {
    pub kind: OpKind,
    /// Line text including its terminator, if it had one (new side for
    /// Equal lines)
    pub text: String,
    /// Old-side text of an Equal line that only matched loosely
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_text: Option<String>,
}

fn strip_terminator(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|s| s.strip_suffix('\r').unwrap_or(s))
        .unwrap_or(line)
}

impl DiffLine {
    fn content(&self) -> &str {
        strip_terminator(&self.text)
    }

    /// Text as it appears in the old input
    fn old_content(&self) -> &str {
        strip_terminator(self.old_text.as_deref().unwrap_or(&self.text))
    }

    /// True when either side of this line ends its file without a newline
    fn missing_newline(&self) -> bool {
        !self.text.ends_with('\n')
            || self.old_text.as_ref().is_some_and(|old| !old.ends_with('\n'))
    }
}

/// Flatten a diff result into line-level entries.
///
/// Results produced in a mode other than lines are re-diffed line by line
/// from their reconstructed texts, with the result's comparison options.
pub fn diff_lines(result: &DiffResult) -> Result<Vec<DiffLine>, DiffError> {
    let relined;
    let ops = if result.mode == TokenMode::Lines {
        &result.ops
    } else {
        let old_text = result.old_text();
        let new_text = result.new_text();
        relined = result
            .compare
            .diff(&tokenize_lines(&old_text), &tokenize_lines(&new_text))?;
        &relined
    };

    Ok(ops
        .iter()
        .flat_map(|op| {
            op.tokens.iter().enumerate().map(move |(i, line)| DiffLine {
                kind: op.kind,
                text: line.clone(),
                old_text: op
                    .old_tokens
                    .as_ref()
                    .map(|old| old[i].clone())
                    .filter(|old| old != line),
            })
        })
        .collect())
}

/// A group of nearby changed lines with surrounding context
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hunk {
    pub old_start: usize,
    pub old_count: usize,
    pub new_start: usize,
    pub new_count: usize,
    pub lines: Vec<DiffLine>,
}

impl Hunk {
    pub fn header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_count, self.new_start, self.new_count
        )
    }

    pub fn insertions(&self) -> usize {
        self.lines.iter().filter(|l| l.kind == OpKind::Insert).count()
    }

    pub fn deletions(&self) -> usize {
        self.lines.iter().filter(|l| l.kind == OpKind::Delete).count()
    }
}

/// Group changed lines into hunks.
///
/// Changes separated by at most `2 * context` unchanged lines share a hunk.
pub fn compute_hunks(lines: &[DiffLine], context: usize) -> Vec<Hunk> {
    let changed: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.kind != OpKind::Equal)
        .map(|(i, _)| i)
        .collect();

    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for &idx in &changed {
        let start = idx.saturating_sub(context);
        let end = (idx + 1 + context).min(lines.len());
        match ranges.last_mut() {
            Some(last) if start <= last.1 => last.1 = end,
            _ => ranges.push((start, end)),
        }
    }

    // Line numbers of the first entry on each side
    let mut old_before = vec![0usize; lines.len() + 1];
    let mut new_before = vec![0usize; lines.len() + 1];
    for (i, line) in lines.iter().enumerate() {
        old_before[i + 1] = old_before[i] + usize::from(line.kind != OpKind::Insert);
        new_before[i + 1] = new_before[i] + usize::from(line.kind != OpKind::Delete);
    }

    let hunks: Vec<Hunk> = ranges
        .into_iter()
        .map(|(start, end)| {
            let old_count = old_before[end] - old_before[start];
            let new_count = new_before[end] - new_before[start];
            Hunk {
                old_start: old_before[start] + usize::from(old_count > 0),
                old_count,
                new_start: new_before[start] + usize::from(new_count > 0),
                new_count,
                lines: lines[start..end].to_vec(),
            }
        })
        .collect();
    debug!(hunks = hunks.len(), context, "computed hunks");
    hunks
}

/// Reorder each run of changed lines so deletions precede insertions,
/// matching what patch tools expect.
fn patch_order(lines: &[DiffLine]) -> Vec<&DiffLine> {
    let mut ordered = Vec::with_capacity(lines.len());
    let mut pending_inserts = Vec::new();
    for line in lines {
        match line.kind {
            OpKind::Delete => ordered.push(line),
            OpKind::Insert => pending_inserts.push(line),
            OpKind::Equal => {
                ordered.append(&mut pending_inserts);
                ordered.push(line);
            }
        }
    }
    ordered.append(&mut pending_inserts);
    ordered
}

/// Render a unified diff with `---`/`+++` headers and `@@` hunks.
///
/// Identical inputs render as an empty string.
pub fn render_unified(
    result: &DiffResult,
    old_label: &str,
    new_label: &str,
    context: usize,
    color: bool,
) -> Result<String, DiffError> {
    let lines = diff_lines(result)?;
    let hunks = compute_hunks(&lines, context);
    if hunks.is_empty() {
        return Ok(String::new());
    }

    let paint = |code: &str, text: &str| {
        if color {
            format!("{code}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", paint(ANSI_BOLD, &format!("--- {old_label}")));
    let _ = writeln!(out, "{}", paint(ANSI_BOLD, &format!("+++ {new_label}")));
    for hunk in &hunks {
        let _ = writeln!(out, "{}", paint(ANSI_CYAN, &hunk.header()));
        for line in patch_order(&hunk.lines) {
            // Context lines show the old side so the hunk applies to the old file
            let (prefix, code, text) = match line.kind {
                OpKind::Equal => (' ', "", line.old_content()),
                OpKind::Insert => ('+', ANSI_GREEN, line.content()),
                OpKind::Delete => ('-', ANSI_RED, line.content()),
            };
            let body = format!("{prefix}{text}");
            if code.is_empty() {
                let _ = writeln!(out, "{body}");
            } else {
                let _ = writeln!(out, "{}", paint(code, &body));
            }
            if line.missing_newline() {
                let _ = writeln!(out, "{NO_NEWLINE_MARKER}");
            }
        }
    }
    Ok(out)
}

/// Classification of a side-by-side row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    Equal,
    Insert,
    Delete,
    Modified,
}

/// One row of a two-column view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub kind: RowKind,
    pub left: Option<String>,
    pub right: Option<String>,
    pub left_line: Option<usize>,
    pub right_line: Option<usize>,
}

/// Pair deleted and inserted lines into rows for column display.
pub fn render_side_by_side(result: &DiffResult) -> Result<Vec<Row>, DiffError> {
    let lines = diff_lines(result)?;
    let mut rows = Vec::new();
    let mut old_no = 0;
    let mut new_no = 0;
    let mut idx = 0;

    while idx < lines.len() {
        let line = &lines[idx];
        if line.kind == OpKind::Equal {
            old_no += 1;
            new_no += 1;
            rows.push(Row {
                kind: RowKind::Equal,
                left: Some(line.old_content().to_string()),
                right: Some(line.content().to_string()),
                left_line: Some(old_no),
                right_line: Some(new_no),
            });
            idx += 1;
            continue;
        }

        let block_end = lines[idx..]
            .iter()
            .position(|l| l.kind == OpKind::Equal)
            .map_or(lines.len(), |p| idx + p);
        let block = &lines[idx..block_end];
        let deleted: Vec<&DiffLine> = block
            .iter()
            .filter(|l| l.kind == OpKind::Delete)
            .collect();
        let inserted: Vec<&DiffLine> = block
            .iter()
            .filter(|l| l.kind == OpKind::Insert)
            .collect();

        for k in 0..deleted.len().max(inserted.len()) {
            let left = deleted.get(k).map(|l| {
                old_no += 1;
                (l.content().to_string(), old_no)
            });
            let right = inserted.get(k).map(|l| {
                new_no += 1;
                (l.content().to_string(), new_no)
            });
            let kind = match (&left, &right) {
                (Some(_), Some(_)) => RowKind::Modified,
                (Some(_), None) => RowKind::Delete,
                _ => RowKind::Insert,
            };
            rows.push(Row {
                kind,
                left_line: left.as_ref().map(|(_, n)| *n),
                right_line: right.as_ref().map(|(_, n)| *n),
                left: left.map(|(t, _)| t),
                right: right.map(|(t, _)| t),
            });
        }
        idx = block_end;
    }

    Ok(rows)
}

/// Truncate or pad `text` to exactly `width` terminal columns.
fn fit_width(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = if ch == '\t' { 1 } else { ch.width().unwrap_or(0) };
        if used + w > width {
            break;
        }
        out.push(if ch == '\t' { ' ' } else { ch });
        used += w;
    }
    out.push_str(&" ".repeat(width.saturating_sub(out.width())));
    out
}

/// Lay out side-by-side rows in `total_width` columns, `diff -y` style.
pub fn format_side_by_side(rows: &[Row], total_width: usize) -> String {
    let column = total_width.saturating_sub(3) / 2;
    let mut out = String::new();
    for row in rows {
        let marker = match row.kind {
            RowKind::Equal => ' ',
            RowKind::Insert => '>',
            RowKind::Delete => '<',
            RowKind::Modified => '|',
        };
        let left = fit_width(row.left.as_deref().unwrap_or(""), column);
        let right = row.right.as_deref().unwrap_or("");
        let line = format!("{left} {marker} {}", fit_width(right, column));
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

/// Serialize a diff result as pretty JSON
pub fn render_json(result: &DiffResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{CompareOptions, DiffEngine};

    fn line_diff(old: &str, new: &str) -> DiffResult {
        DiffEngine::new()
            .with_mode(TokenMode::Lines)
            .diff_strings(old, new)
            .unwrap()
    }

    #[test]
    fn test_html_escapes_and_marks() {
        let result = DiffEngine::new()
            .diff_strings("a <b> c", "a <i> c")
            .unwrap();
        let html = render_html(&result.ops);
        assert_eq!(
            html,
            "a <ins class=\"diff-insert\">&lt;i&gt; </ins><del class=\"diff-delete\">&lt;b&gt; </del>c"
        );
    }

    #[test]
    fn test_ansi_without_color_uses_markers() {
        let result = DiffEngine::new().diff_strings("one two", "one three").unwrap();
        assert_eq!(render_ansi(&result.ops, false), "one {+three+}[-two-]");
    }

    #[test]
    fn test_unified_basic() {
        let result = line_diff("a\nb\nc\n", "a\nx\nc\n");
        let out = render_unified(&result, "old", "new", 3, false).unwrap();
        assert_eq!(
            out,
            "--- old\n+++ new\n@@ -1,3 +1,3 @@\n a\n-b\n+x\n c\n"
        );
    }

    #[test]
    fn test_unified_identical_is_empty() {
        let result = line_diff("same\n", "same\n");
        assert!(render_unified(&result, "a", "b", 3, false).unwrap().is_empty());
    }

    #[test]
    fn test_unified_no_newline_marker() {
        let result = line_diff("a\nb", "a\nc");
        let out = render_unified(&result, "a", "b", 1, false).unwrap();
        assert!(out.contains(
            "-b\n\\ No newline at end of file\n+c\n\\ No newline at end of file\n"
        ));
    }

    #[test]
    fn test_unified_from_word_mode_relines() {
        let result = DiffEngine::new()
            .diff_strings("hello world\nbye\n", "hello there\nbye\n")
            .unwrap();
        let out = render_unified(&result, "a", "b", 0, false).unwrap();
        assert!(out.contains("@@ -1,1 +1,1 @@\n-hello world\n+hello there\n"));
    }

    #[test]
    fn test_unified_respects_ignore_case() {
        for mode in [TokenMode::Words, TokenMode::Lines] {
            let result = DiffEngine::new()
                .with_mode(mode)
                .with_ignore_case(true)
                .diff_strings("Hello World\n", "hello world\n")
                .unwrap();
            assert!(result.is_identical());
            assert!(render_unified(&result, "a", "b", 3, false)
                .unwrap()
                .is_empty());
        }
    }

    #[test]
    fn test_unified_loose_context_keeps_old_side() {
        let result = DiffEngine::new()
            .with_ignore_whitespace(true)
            .diff_strings("keep  this\nold\n", "keep this\nnew\n")
            .unwrap();
        let out = render_unified(&result, "a", "b", 3, false).unwrap();
        assert_eq!(
            out,
            "--- a\n+++ b\n@@ -1,2 +1,2 @@\n keep  this\n-old\n+new\n"
        );
    }

    #[test]
    fn test_relining_uses_result_cell_limit() {
        let old: String = (0..20).map(|i| format!("{i}\n")).collect();
        let new: String = (0..20).map(|i| format!("x{i}\n")).collect();
        let compare = CompareOptions {
            ignore_case: true,
            max_cells: 10,
            ..Default::default()
        };
        let result = DiffResult::new(
            TokenMode::Chars,
            vec![DiffOp::insert(vec![new]), DiffOp::delete(vec![old])],
        )
        .with_compare(compare);
        assert!(matches!(
            render_unified(&result, "a", "b", 3, false),
            Err(DiffError::TooLarge { max_cells: 10, .. })
        ));
    }

    #[test]
    fn test_old_side_keeps_no_newline_marker() {
        let result = DiffEngine::new()
            .with_mode(TokenMode::Lines)
            .with_ignore_whitespace(true)
            .diff_strings("a\nb\nend", "a\nB \nend\n")
            .unwrap();
        // "end" and "end\n" only match once whitespace is ignored
        let lines = diff_lines(&result).unwrap();
        let last = lines.last().unwrap();
        assert_eq!(last.kind, OpKind::Equal);
        assert_eq!(last.old_text.as_deref(), Some("end"));
        assert!(last.missing_newline());
    }

    #[test]
    fn test_side_by_side_respects_ignore_case() {
        let result = DiffEngine::new()
            .with_ignore_case(true)
            .diff_strings("Hello World\nsame\n", "hello world\nsame\n")
            .unwrap();
        let rows = render_side_by_side(&result).unwrap();
        assert!(rows.iter().all(|r| r.kind == RowKind::Equal));
        assert_eq!(rows[0].left.as_deref(), Some("Hello World"));
        assert_eq!(rows[0].right.as_deref(), Some("hello world"));
    }

    #[test]
    fn test_hunks_split_by_distance() {
        let old: String = (1..=20).map(|i| format!("{i}\n")).collect();
        let new: String = (1..=20)
            .map(|i| match i {
                2 => "two\n".to_string(),
                18 => "eighteen\n".to_string(),
                _ => format!("{i}\n"),
            })
            .collect();
        let result = line_diff(&old, &new);
        let lines = diff_lines(&result).unwrap();
        let hunks = compute_hunks(&lines, 2);

        assert_eq!(hunks.len(), 2);
        assert_eq!(hunks[0].old_start, 1);
        assert_eq!(hunks[0].old_count, 4);
        assert_eq!(hunks[1].old_start, 16);
        assert_eq!(hunks[1].new_count, 5);
        assert_eq!(hunks[1].insertions(), 1);
        assert_eq!(hunks[1].deletions(), 1);
    }

    #[test]
    fn test_hunks_merge_when_close() {
        let old = "1\n2\n3\n4\n5\n";
        let new = "1\nB\n3\n4\nE\n";
        let result = line_diff(old, new);
        let lines = diff_lines(&result).unwrap();
        assert_eq!(compute_hunks(&lines, 1).len(), 1);
    }

    #[test]
    fn test_hunk_for_empty_old_file() {
        let result = line_diff("", "new\n");
        let lines = diff_lines(&result).unwrap();
        let hunks = compute_hunks(&lines, 3);
        assert_eq!(hunks[0].header(), "@@ -0,0 +1,1 @@");
    }

    #[test]
    fn test_side_by_side_pairs_changes() {
        let result = line_diff("a\nb\nc\n", "a\nB\nc\nd\n");
        let rows = render_side_by_side(&result).unwrap();
        let kinds: Vec<RowKind> = rows.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![RowKind::Equal, RowKind::Modified, RowKind::Equal, RowKind::Insert]
        );
        assert_eq!(rows[1].left.as_deref(), Some("b"));
        assert_eq!(rows[1].right.as_deref(), Some("B"));
        assert_eq!(rows[3].right_line, Some(4));
        assert_eq!(rows[3].left_line, None);
    }

    #[test]
    fn test_format_side_by_side() {
        let rows = vec![Row {
            kind: RowKind::Modified,
            left: Some("left".into()),
            right: Some("right".into()),
            left_line: Some(1),
            right_line: Some(1),
        }];
        assert_eq!(format_side_by_side(&rows, 23), "left       | right\n");
    }

    #[test]
    fn test_fit_width_handles_wide_chars() {
        assert_eq!(fit_width("日本語", 4), "日本");
        assert_eq!(fit_width("ab", 4), "ab  ");
    }

    #[test]
    fn test_json_output() {
        let result = line_diff("a\n", "b\n");
        let json = render_json(&result).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["mode"], "lines");
        assert_eq!(value["stats"]["insertions"], 1);
        assert_eq!(value["ops"][0]["kind"], "insert");
    }

    #[test]
    fn test_parse_output_format() {
        assert_eq!(
            "side-by-side".parse::<OutputFormat>().unwrap(),
            OutputFormat::SideBySide
        );
        assert!("pdf".parse::<OutputFormat>().is_err());
    }
}
