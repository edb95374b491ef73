//! Regular expression tester
//!
//! Compiles a pattern with JavaScript-style flags and reports every match
//! with its capture groups, or performs a replacement.

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum RegexError {
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    #[error("Unknown regex flag: '{0}'")]
    UnknownFlag(char),
}

/// Flags accepted in a flag string such as `"gim"`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegexFlags {
    /// `g`: report or replace every match instead of the first
    pub global: bool,
    /// `i`
    pub case_insensitive: bool,
    /// `m`: `^`/`$` match at line boundaries
    pub multi_line: bool,
    /// `s`: `.` matches `\n`
    pub dot_all: bool,
    /// `x`: ignore whitespace and `#` comments in the pattern
    pub extended: bool,
    /// `U`: swap greedy and lazy quantifiers
    pub swap_greed: bool,
}

impl FromStr for RegexFlags {
    type Err = RegexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut flags = Self::default();
        for ch in s.chars() {
            match ch {
                'g' => flags.global = true,
                'i' => flags.case_insensitive = true,
                'm' => flags.multi_line = true,
                's' => flags.dot_all = true,
                'x' => flags.extended = true,
                'U' => flags.swap_greed = true,
                // patterns are always Unicode-aware
                'u' => {}
                other => return Err(RegexError::UnknownFlag(other)),
            }
        }
        Ok(flags)
    }
}

impl fmt::Display for RegexFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (set, ch) in [
            (self.global, 'g'),
            (self.case_insensitive, 'i'),
            (self.multi_line, 'm'),
            (self.dot_all, 's'),
            (self.extended, 'x'),
            (self.swap_greed, 'U'),
        ] {
            if set {
                write!(f, "{ch}")?;
            }
        }
        Ok(())
    }
}

impl RegexFlags {
    pub fn compile(&self, pattern: &str) -> Result<Regex, RegexError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(self.case_insensitive)
            .multi_line(self.multi_line)
            .dot_matches_new_line(self.dot_all)
            .ignore_whitespace(self.extended)
            .swap_greed(self.swap_greed)
            .build()?;
        Ok(regex)
    }
}

/// A capture group within a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub index: usize,
    pub name: Option<String>,
    /// None when the group did not participate in the match
    pub text: Option<String>,
    pub start: Option<usize>,
}

/// A single match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    /// Byte offsets into the haystack
    pub start: usize,
    pub end: usize,
    /// Offset in characters, as an editor would show it
    pub char_start: usize,
    pub text: String,
    pub groups: Vec<Group>,
}

/// Outcome of testing a pattern against a haystack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestReport {
    pub pattern: String,
    pub flags: String,
    pub group_names: Vec<Option<String>>,
    pub matches: Vec<Match>,
}

impl TestReport {
    pub fn is_match(&self) -> bool {
        !self.matches.is_empty()
    }
}

/// Run `pattern` against `haystack`.
pub fn test(pattern: &str, flags: RegexFlags, haystack: &str) -> Result<TestReport, RegexError> {
    let regex = flags.compile(pattern)?;
    let names: Vec<Option<String>> = regex
        .capture_names()
        .skip(1)
        .map(|n| n.map(str::to_string))
        .collect();

    let limit = if flags.global { usize::MAX } else { 1 };
    let matches: Vec<Match> = regex
        .captures_iter(haystack)
        .take(limit)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let groups = names
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    let group = caps.get(i + 1);
                    Group {
                        index: i + 1,
                        name: name.clone(),
                        text: group.map(|g| g.as_str().to_string()),
                        start: group.map(|g| g.start()),
                    }
                })
                .collect();
            Some(Match {
                start: whole.start(),
                end: whole.end(),
                char_start: haystack[..whole.start()].chars().count(),
                text: whole.as_str().to_string(),
                groups,
            })
        })
        .collect();

    debug!(pattern, flags = %flags, matches = matches.len(), "regex tested");

    Ok(TestReport {
        pattern: pattern.to_string(),
        flags: flags.to_string(),
        group_names: names,
        matches,
    })
}

/// Replace matches of `pattern` in `haystack`.
///
/// The replacement accepts `$1`, `${name}` and the JavaScript forms
/// `$<name>` and `$&`.
pub fn replace(
    pattern: &str,
    flags: RegexFlags,
    haystack: &str,
    replacement: &str,
) -> Result<String, RegexError> {
    let regex = flags.compile(pattern)?;
    let replacement = translate_replacement(replacement);
    let out = if flags.global {
        regex.replace_all(haystack, replacement.as_str())
    } else {
        regex.replace(haystack, replacement.as_str())
    };
    Ok(out.into_owned())
}

/// Rewrite JavaScript replacement tokens into the regex crate's syntax.
fn translate_replacement(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len());
    let mut chars = replacement.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '$' {
            out.push(ch);
            continue;
        }
        match chars.peek() {
            Some('$') => {
                chars.next();
                out.push_str("$$");
            }
            Some('&') => {
                chars.next();
                out.push_str("${0}");
            }
            Some('<') => {
                chars.next();
                let name: String = chars.by_ref().take_while(|&c| c != '>').collect();
                out.push_str("${");
                out.push_str(&name);
                out.push('}');
            }
            Some(c) if c.is_ascii_digit() => {
                // `$1a` would otherwise be read as a group named "1a"
                let digits: String =
                    std::iter::from_fn(|| chars.next_if(char::is_ascii_digit)).collect();
                out.push_str("${");
                out.push_str(&digits);
                out.push('}');
            }
            _ => out.push('$'),
        }
    }
    out
}
