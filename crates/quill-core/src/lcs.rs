//! Longest-common-subsequence diff over token slices
//!
//! Builds an (n+1)×(m+1) table of suffix LCS lengths and walks it from the
//! start. When two unequal tokens tie on suffix length the walk consumes the
//! new sequence first, so disjoint inputs come out as `Insert(B)` then
//! `Delete(A)`. Only the common prefix is skipped before the table is built.

use crate::change::{push_equal, push_token, DiffOp, OpKind};
use crate::diff::DiffError;
use tracing::{debug, trace};

/// Default ceiling on table cells (roughly 100 MB of `u32`s).
pub const DEFAULT_MAX_CELLS: usize = 25_000_000;

/// Diff two token sequences by exact text equality.
pub fn diff<T: AsRef<str>>(
    old: &[T],
    new: &[T],
    max_cells: usize,
) -> Result<Vec<DiffOp>, DiffError> {
    diff_by_key(old, new, max_cells, |t| t.as_ref().to_string())
}

/// Diff two token sequences comparing the keys produced by `key`.
///
/// Emitted ops carry the original token text. Equal runs whose old text
/// differs from the new text keep the old side in [`DiffOp::old_tokens`].
pub fn diff_by_key<T, K, F>(
    old: &[T],
    new: &[T],
    max_cells: usize,
    key: F,
) -> Result<Vec<DiffOp>, DiffError>
where
    T: AsRef<str>,
    K: PartialEq,
    F: Fn(&T) -> K,
{
    let old_keys: Vec<K> = old.iter().map(&key).collect();
    let new_keys: Vec<K> = new.iter().map(&key).collect();

    // Equal heads are always matched by the walk, so the common prefix never
    // needs table cells. The suffix must stay: it decides how ties break.
    let prefix = old_keys
        .iter()
        .zip(new_keys.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut ops = Vec::new();
    for (o, n) in old.iter().zip(new).take(prefix) {
        push_equal(&mut ops, o.as_ref(), n.as_ref());
    }

    let edits = walk(&old_keys[prefix..], &new_keys[prefix..], max_cells)?;
    debug!(
        old_tokens = old.len(),
        new_tokens = new.len(),
        prefix,
        edits = edits.len(),
        "lcs diff computed"
    );

    for edit in edits {
        match edit {
            Edit::Equal(i, j) => {
                push_equal(&mut ops, old[prefix + i].as_ref(), new[prefix + j].as_ref())
            }
            Edit::Insert(j) => push_token(&mut ops, OpKind::Insert, new[prefix + j].as_ref()),
            Edit::Delete(i) => push_token(&mut ops, OpKind::Delete, old[prefix + i].as_ref()),
        }
    }

    Ok(ops)
}

/// Length of the longest common subsequence of two key slices.
pub fn lcs_len<K: PartialEq>(
    old: &[K],
    new: &[K],
    max_cells: usize,
) -> Result<usize, DiffError> {
    let table = Table::build(old, new, max_cells)?;
    Ok(table.get(0, 0) as usize)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit {
    Equal(usize, usize),
    Insert(usize),
    Delete(usize),
}

/// Suffix LCS table stored row-major with `new.len() + 1` columns.
struct Table {
    cells: Vec<u32>,
    width: usize,
}

impl Table {
    fn build<K: PartialEq>(old: &[K], new: &[K], max_cells: usize) -> Result<Self, DiffError> {
        let (n, m) = (old.len(), new.len());
        let width = m + 1;
        let cells = (n + 1)
            .checked_mul(width)
            .filter(|&c| c <= max_cells)
            .ok_or(DiffError::TooLarge {
                old_tokens: n,
                new_tokens: m,
                max_cells,
            })?;
        trace!(n, m, cells, "allocating lcs table");

        let mut table = Self {
            cells: vec![0; cells],
            width,
        };
        for i in (0..n).rev() {
            for j in (0..m).rev() {
                let value = if old[i] == new[j] {
                    table.get(i + 1, j + 1) + 1
                } else {
                    table.get(i + 1, j).max(table.get(i, j + 1))
                };
                table.cells[i * width + j] = value;
            }
        }
        Ok(table)
    }

    fn get(&self, i: usize, j: usize) -> u32 {
        self.cells[i * self.width + j]
    }
}

fn walk<K: PartialEq>(old: &[K], new: &[K], max_cells: usize) -> Result<Vec<Edit>, DiffError> {
    if old.is_empty() {
        return Ok((0..new.len()).map(Edit::Insert).collect());
    }
    if new.is_empty() {
        return Ok((0..old.len()).map(Edit::Delete).collect());
    }

    let table = Table::build(old, new, max_cells)?;
    let (n, m) = (old.len(), new.len());
    let mut edits = Vec::with_capacity(n + m);
    let (mut i, mut j) = (0, 0);

    while i < n && j < m {
        if old[i] == new[j] {
            edits.push(Edit::Equal(i, j));
            i += 1;
            j += 1;
        } else if table.get(i, j + 1) >= table.get(i + 1, j) {
            edits.push(Edit::Insert(j));
            j += 1;
        } else {
            edits.push(Edit::Delete(i));
            i += 1;
        }
    }
    edits.extend((j..m).map(Edit::Insert));
    edits.extend((i..n).map(Edit::Delete));

    Ok(edits)
}
