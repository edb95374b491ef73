//! Text formatting helpers: case conversion, whitespace cleanup, JSON
//! pretty-printing and text statistics

use heck::{
    ToKebabCase, ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToTitleCase, ToUpperCamelCase,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

/// Reading speed used for [`TextStats::reading_time_secs`]
pub const WORDS_PER_MINUTE: usize = 200;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown case style: {0}")]
    UnknownCase(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStyle {
    Upper,
    Lower,
    /// Every Word Capitalized
    Title,
    /// First letter of each sentence capitalized
    Sentence,
    /// camelCase
    Camel,
    /// PascalCase
    Pascal,
    /// snake_case
    Snake,
    /// kebab-case
    Kebab,
    /// CONSTANT_CASE
    Constant,
}

impl FromStr for CaseStyle {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let style = match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "upper" | "uppercase" => CaseStyle::Upper,
            "lower" | "lowercase" => CaseStyle::Lower,
            "title" | "titlecase" => CaseStyle::Title,
            "sentence" | "sentencecase" => CaseStyle::Sentence,
            "camel" | "camelcase" => CaseStyle::Camel,
            "pascal" | "pascalcase" => CaseStyle::Pascal,
            "snake" | "snakecase" => CaseStyle::Snake,
            "kebab" | "kebabcase" => CaseStyle::Kebab,
            "constant" | "constantcase" | "screamingsnake" => CaseStyle::Constant,
            _ => return Err(FormatError::UnknownCase(s.to_string())),
        };
        Ok(style)
    }
}

/// Convert `text` to the given case style
pub fn convert_case(text: &str, style: CaseStyle) -> String {
    match style {
        CaseStyle::Upper => text.to_uppercase(),
        CaseStyle::Lower => text.to_lowercase(),
        CaseStyle::Title => text.to_title_case(),
        CaseStyle::Sentence => sentence_case(text),
        CaseStyle::Camel => text.to_lower_camel_case(),
        CaseStyle::Pascal => text.to_upper_camel_case(),
        CaseStyle::Snake => text.to_snake_case(),
        CaseStyle::Kebab => text.to_kebab_case(),
        CaseStyle::Constant => text.to_shouty_snake_case(),
    }
}

fn sentence_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut start_of_sentence = true;
    for ch in text.chars() {
        if start_of_sentence && ch.is_alphabetic() {
            out.extend(ch.to_uppercase());
            start_of_sentence = false;
        } else {
            out.extend(ch.to_lowercase());
            if matches!(ch, '.' | '!' | '?') {
                start_of_sentence = true;
            }
        }
    }
    out
}

/// Line-oriented whitespace cleanup switches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupOptions {
    pub trim_lines: bool,
    /// Collapse runs of spaces and tabs into one space
    pub collapse_spaces: bool,
    pub remove_blank_lines: bool,
    /// Keep only the first occurrence of each line
    pub dedupe_lines: bool,
    pub sort_lines: bool,
}

/// Apply the enabled cleanups. A trailing newline on the input is kept.
pub fn cleanup(text: &str, options: &CleanupOptions) -> String {
    let mut lines: Vec<String> = text
        .lines()
        .map(|line| {
            let mut line = line.to_string();
            if options.collapse_spaces {
                line = collapse_spaces(&line);
            }
            if options.trim_lines {
                line = line.trim().to_string();
            }
            line
        })
        .collect();

    if options.remove_blank_lines {
        lines.retain(|l| !l.trim().is_empty());
    }
    if options.dedupe_lines {
        let mut seen = HashSet::new();
        lines.retain(|l| seen.insert(l.clone()));
    }
    if options.sort_lines {
        lines.sort();
    }

    let mut out = lines.join("\n");
    if text.ends_with('\n') && !out.is_empty() {
        out.push('\n');
    }
    out
}

fn collapse_spaces(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_run = false;
    for ch in line.chars() {
        if ch == ' ' || ch == '\t' {
            if !in_run {
                out.push(' ');
            }
            in_run = true;
        } else {
            out.push(ch);
            in_run = false;
        }
    }
    out
}

/// Pretty-print JSON with `indent` spaces per level, keeping key order
pub fn json_pretty(text: &str, indent: usize) -> Result<String, FormatError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let indent = " ".repeat(indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Minify JSON, keeping key order
pub fn json_minify(text: &str) -> Result<String, FormatError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    Ok(serde_json::to_string(&value)?)
}

/// Counts shown by the word counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TextStats {
    /// Grapheme clusters
    pub characters: usize,
    pub characters_no_whitespace: usize,
    pub words: usize,
    pub lines: usize,
    pub sentences: usize,
    pub paragraphs: usize,
    pub reading_time_secs: usize,
}

pub fn text_stats(text: &str) -> TextStats {
    let graphemes: Vec<&str> = text.graphemes(true).collect();
    let words = text.unicode_words().count();
    let sentences = text
        .unicode_sentences()
        .filter(|s| s.chars().any(char::is_alphanumeric))
        .count();

    let mut paragraphs = 0;
    let mut in_paragraph = false;
    for line in text.lines() {
        if line.trim().is_empty() {
            in_paragraph = false;
        } else if !in_paragraph {
            paragraphs += 1;
            in_paragraph = true;
        }
    }

    TextStats {
        characters: graphemes.len(),
        characters_no_whitespace: graphemes
            .iter()
            .filter(|g| !g.chars().all(char::is_whitespace))
            .count(),
        words,
        lines: text.lines().count(),
        sentences,
        paragraphs,
        reading_time_secs: (words * 60).div_ceil(WORDS_PER_MINUTE),
    }
}
