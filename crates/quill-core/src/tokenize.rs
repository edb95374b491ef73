//! Tokenizers that split text into diffable units
//!
//! Every tokenizer is lossless: concatenating the tokens yields the input.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown token mode: {0} (expected words, lines, chars or code)")]
pub struct UnknownTokenMode(pub String);

/// Granularity of comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenMode {
    /// A word together with the whitespace that follows it
    #[default]
    Words,
    /// A full line including its terminator
    Lines,
    /// A single grapheme cluster
    Chars,
    /// Identifiers, single punctuation characters and whitespace runs
    Code,
}

impl TokenMode {
    pub fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
        match self {
            TokenMode::Words => tokenize_words(text),
            TokenMode::Lines => tokenize_lines(text),
            TokenMode::Chars => tokenize_chars(text),
            TokenMode::Code => tokenize_code(text),
        }
    }
}

impl FromStr for TokenMode {
    type Err = UnknownTokenMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "words" | "word" => Ok(TokenMode::Words),
            "lines" | "line" => Ok(TokenMode::Lines),
            "chars" | "char" => Ok(TokenMode::Chars),
            "code" => Ok(TokenMode::Code),
            _ => Err(UnknownTokenMode(s.to_string())),
        }
    }
}

impl fmt::Display for TokenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenMode::Words => "words",
            TokenMode::Lines => "lines",
            TokenMode::Chars => "chars",
            TokenMode::Code => "code",
        };
        f.write_str(name)
    }
}

/// Split into words, each carrying its trailing whitespace.
/// Whitespace before the first word is a token of its own.
pub fn tokenize_words(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut seen_space = false;

    for (idx, ch) in text.char_indices() {
        if ch.is_whitespace() {
            seen_space = true;
        } else if seen_space {
            if idx > start {
                tokens.push(&text[start..idx]);
            }
            start = idx;
            seen_space = false;
        }
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

/// Split into lines, keeping `\n` / `\r\n` terminators attached.
pub fn tokenize_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

/// Split into grapheme clusters.
pub fn tokenize_chars(text: &str) -> Vec<&str> {
    text.graphemes(true).collect()
}

/// Tokenize code for word-level diffing.
/// Separates identifiers from punctuation for accurate diffs.
pub fn tokenize_code(text: &str) -> Vec<&str> {
    #[derive(PartialEq, Clone, Copy)]
    enum Class {
        Word,
        Space,
        Punct,
    }

    let classify = |ch: char| {
        if ch.is_alphanumeric() || ch == '_' {
            Class::Word
        } else if ch.is_whitespace() {
            Class::Space
        } else {
            Class::Punct
        }
    };

    let mut tokens = Vec::new();
    let mut start = 0;
    let mut current: Option<Class> = None;

    for (idx, ch) in text.char_indices() {
        let class = classify(ch);
        match current {
            Some(prev) if prev == class && class != Class::Punct => {}
            Some(_) => {
                tokens.push(&text[start..idx]);
                start = idx;
            }
            None => {}
        }
        current = Some(class);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}
