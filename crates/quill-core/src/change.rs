//! Operation representation for diff output

use serde::{Deserialize, Serialize};

/// The kind of a diff operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    /// Tokens present in both sequences
    Equal,
    /// Tokens only present in the new sequence
    Insert,
    /// Tokens only present in the old sequence
    Delete,
}

/// A run of tokens sharing the same operation kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffOp {
    pub kind: OpKind,
    /// Token text (new side for Equal, old side for Delete)
    pub tokens: Vec<String>,
    /// Old-side text for Equal runs matched by a loose key whose text differs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_tokens: Option<Vec<String>>,
}

impl DiffOp {
    pub fn new(kind: OpKind, tokens: Vec<String>) -> Self {
        Self {
            kind,
            tokens,
            old_tokens: None,
        }
    }

    pub fn equal(tokens: Vec<String>) -> Self {
        Self::new(OpKind::Equal, tokens)
    }

    pub fn insert(tokens: Vec<String>) -> Self {
        Self::new(OpKind::Insert, tokens)
    }

    pub fn delete(tokens: Vec<String>) -> Self {
        Self::new(OpKind::Delete, tokens)
    }

    /// Concatenated token text
    pub fn text(&self) -> String {
        self.tokens.concat()
    }

    /// Tokens as they appeared in the old sequence
    pub fn old_side(&self) -> &[String] {
        self.old_tokens.as_deref().unwrap_or(&self.tokens)
    }

    /// Concatenated old-side text
    pub fn old_text(&self) -> String {
        self.old_side().concat()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Check if this is an actual change (not just context)
    pub fn is_change(&self) -> bool {
        self.kind != OpKind::Equal
    }

    /// Whether this op contributes to the old sequence
    pub fn in_old(&self) -> bool {
        matches!(self.kind, OpKind::Equal | OpKind::Delete)
    }

    /// Whether this op contributes to the new sequence
    pub fn in_new(&self) -> bool {
        matches!(self.kind, OpKind::Equal | OpKind::Insert)
    }
}

/// Append a token to an op list, merging with the last op when kinds match.
pub(crate) fn push_token(ops: &mut Vec<DiffOp>, kind: OpKind, token: &str) {
    match ops.last_mut() {
        Some(last) if last.kind == kind => last.tokens.push(token.to_string()),
        _ => ops.push(DiffOp::new(kind, vec![token.to_string()])),
    }
}

/// Append a matched pair, tracking old-side text once the two sides diverge.
pub(crate) fn push_equal(ops: &mut Vec<DiffOp>, old: &str, new: &str) {
    if !matches!(ops.last(), Some(op) if op.kind == OpKind::Equal) {
        ops.push(DiffOp::equal(Vec::new()));
    }
    let Some(last) = ops.last_mut() else {
        return;
    };
    if old != new && last.old_tokens.is_none() {
        last.old_tokens = Some(last.tokens.clone());
    }
    if let Some(old_tokens) = last.old_tokens.as_mut() {
        old_tokens.push(old.to_string());
    }
    last.tokens.push(new.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_token_coalesces() {
        let mut ops = Vec::new();
        push_token(&mut ops, OpKind::Delete, "a");
        push_token(&mut ops, OpKind::Delete, "b");
        push_token(&mut ops, OpKind::Insert, "c");

        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].text(), "ab");
        assert_eq!(ops[1].kind, OpKind::Insert);
    }

    #[test]
    fn test_push_equal_tracks_diverging_old_side() {
        let mut ops = Vec::new();
        push_equal(&mut ops, "same ", "same ");
        assert!(ops[0].old_tokens.is_none());

        push_equal(&mut ops, "Hello", "hello");
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].text(), "same hello");
        assert_eq!(ops[0].old_text(), "same Hello");
    }

    #[test]
    fn test_side_membership() {
        let op = DiffOp::delete(vec!["x".into()]);
        assert!(op.in_old());
        assert!(!op.in_new());
        assert!(op.is_change());
    }

    #[test]
    fn test_serializes_lowercase_kind() {
        let op = DiffOp::insert(vec!["hi".into()]);
        let json = serde_json::to_string(&op).unwrap();
        assert_eq!(json, r#"{"kind":"insert","tokens":["hi"]}"#);
    }
}
