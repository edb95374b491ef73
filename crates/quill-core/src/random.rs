//! Random generators: passwords, integers, list shuffling and UUIDs
//!
//! Every generator takes the RNG explicitly so callers can seed it.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::RangeInclusive;
use thiserror::Error;

const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()-_=+[]{};:,.<>?/~";
const AMBIGUOUS: &str = "il1Lo0O|";

/// Ranges at most this wide are sampled without replacement directly
const DENSE_RANGE_LIMIT: u128 = 10_000;

/// Most integers a single `random_integers` call will produce
pub const MAX_INTEGERS: usize = 1_000_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RandomError {
    #[error("At least one character class must be enabled")]
    NoCharacterClass,
    #[error("Password length {length} is shorter than the {required} enabled character classes")]
    LengthTooShort { length: usize, required: usize },
    #[error("Empty range: {start} > {end}")]
    EmptyRange { start: i64, end: i64 },
    #[error("Cannot draw {count} unique values from a range of {available}")]
    NotEnoughValues { count: usize, available: u128 },
    #[error("Cannot draw {count} values at once (at most {max})")]
    TooManyValues { count: usize, max: usize },
    #[error("Nothing to pick from")]
    EmptyList,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordOptions {
    pub length: usize,
    pub lowercase: bool,
    pub uppercase: bool,
    pub digits: bool,
    pub symbols: bool,
    /// Leave out look-alike characters such as `l`, `1` and `O`
    pub exclude_ambiguous: bool,
}

impl Default for PasswordOptions {
    fn default() -> Self {
        Self {
            length: 16,
            lowercase: true,
            uppercase: true,
            digits: true,
            symbols: false,
            exclude_ambiguous: false,
        }
    }
}

impl PasswordOptions {
    fn classes(&self) -> Vec<Vec<char>> {
        [
            (self.lowercase, LOWERCASE),
            (self.uppercase, UPPERCASE),
            (self.digits, DIGITS),
            (self.symbols, SYMBOLS),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, set)| {
            set.chars()
                .filter(|c| !(self.exclude_ambiguous && AMBIGUOUS.contains(*c)))
                .collect()
        })
        .collect()
    }
}

/// Generate a password holding at least one character of every enabled class
pub fn password<R: Rng + ?Sized>(
    options: &PasswordOptions,
    rng: &mut R,
) -> Result<String, RandomError> {
    let classes = options.classes();
    if classes.is_empty() {
        return Err(RandomError::NoCharacterClass);
    }
    if options.length < classes.len() {
        return Err(RandomError::LengthTooShort {
            length: options.length,
            required: classes.len(),
        });
    }

    let pool: Vec<char> = classes.iter().flatten().copied().collect();
    let mut chars: Vec<char> = classes
        .iter()
        .filter_map(|class| class.choose(rng).copied())
        .collect();
    while chars.len() < options.length {
        if let Some(&c) = pool.choose(rng) {
            chars.push(c);
        }
    }
    chars.shuffle(rng);
    Ok(chars.into_iter().collect())
}

/// Draw `count` integers from `range`, optionally without repeats.
///
/// `count` is capped at [`MAX_INTEGERS`].
pub fn random_integers<R: Rng + ?Sized>(
    range: RangeInclusive<i64>,
    count: usize,
    unique: bool,
    rng: &mut R,
) -> Result<Vec<i64>, RandomError> {
    let (start, end) = (*range.start(), *range.end());
    if start > end {
        return Err(RandomError::EmptyRange { start, end });
    }
    if count > MAX_INTEGERS {
        return Err(RandomError::TooManyValues {
            count,
            max: MAX_INTEGERS,
        });
    }
    if !unique {
        return Ok((0..count).map(|_| rng.random_range(start..=end)).collect());
    }

    let available = (end as i128 - start as i128 + 1) as u128;
    if count as u128 > available {
        return Err(RandomError::NotEnoughValues { count, available });
    }
    if available <= DENSE_RANGE_LIMIT {
        let mut values: Vec<i64> = (start..=end).collect();
        values.shuffle(rng);
        values.truncate(count);
        return Ok(values);
    }

    let mut seen = HashSet::with_capacity(count);
    let mut values = Vec::with_capacity(count);
    while values.len() < count {
        let value = rng.random_range(start..=end);
        if seen.insert(value) {
            values.push(value);
        }
    }
    Ok(values)
}

/// Shuffle the lines of `text`, dropping empty lines
pub fn shuffle_lines<R: Rng + ?Sized>(text: &str, rng: &mut R) -> String {
    let mut lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    lines.shuffle(rng);
    lines.join("\n")
}

/// Pick `count` distinct entries from `items`
pub fn pick<'a, R: Rng + ?Sized>(
    items: &'a [String],
    count: usize,
    rng: &mut R,
) -> Result<Vec<&'a str>, RandomError> {
    if items.is_empty() {
        return Err(RandomError::EmptyList);
    }
    Ok(items
        .choose_multiple(rng, count.min(items.len()))
        .map(String::as_str)
        .collect())
}

/// Random (version 4) UUID in the usual hyphenated form
pub fn uuid_v4<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);
    uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .hyphenated()
        .to_string()
}
