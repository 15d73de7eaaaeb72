//! Move history as a persistent list
//!
//! The history handed to the page is a snapshot: appending a move builds a
//! new list on top of the old spine and leaves every earlier snapshot as it
//! was.

use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

#[derive(Debug)]
struct Node {
    mv: String,
    prev: Option<Arc<Node>>,
}

/// Append-only list of moves in standard algebraic notation.
///
/// Nodes point from the newest move back to the oldest, so `append` is a
/// single allocation and cloning a list is a reference count bump.
#[derive(Debug, Clone, Default)]
pub struct MoveList {
    head: Option<Arc<Node>>,
    len: usize,
}

/// One numbered row of the history panel, e.g. `3. Bb5 a6`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovePair {
    pub number: u32,
    pub white: String,
    pub black: Option<String>,
}

impl MoveList {
    pub fn new() -> Self {
        Self::default()
    }

    /// The empty history a game starts with.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns a new list with `mv` added at the end. `self` is not touched.
    pub fn append(&self, mv: impl Into<String>) -> MoveList {
        let node = Node {
            mv: mv.into(),
            prev: self.head.clone(),
        };

        MoveList {
            head: Some(Arc::new(node)),
            len: self.len + 1,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Most recent move, if any.
    pub fn last(&self) -> Option<&str> {
        self.head.as_deref().map(|node| node.mv.as_str())
    }

    /// True when both lists are the very same snapshot.
    pub fn ptr_eq(&self, other: &MoveList) -> bool {
        match (&self.head, &other.head) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Walks newest to oldest.
    fn iter_rev(&self) -> RevIter<'_> {
        RevIter {
            next: self.head.as_deref(),
        }
    }

    /// Owned copy of the moves in the order they were played.
    pub fn to_sequence(&self) -> Vec<String> {
        let mut moves: Vec<String> = self.iter_rev().map(String::from).collect();
        moves.reverse();
        moves
    }

    /// Moves joined by single spaces, e.g. `"e4 e5 Nf3 Nc6"`.
    pub fn to_notation_string(&self) -> String {
        self.to_sequence().join(" ")
    }

    /// Groups the history into numbered white/black rows.
    pub fn numbered_pairs(&self) -> Vec<MovePair> {
        self.to_sequence()
            .chunks(2)
            .enumerate()
            .map(|(idx, pair)| MovePair {
                number: idx as u32 + 1,
                white: pair[0].clone(),
                black: pair.get(1).cloned(),
            })
            .collect()
    }
}

struct RevIter<'a> {
    next: Option<&'a Node>,
}

impl<'a> Iterator for RevIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.prev.as_deref();
        Some(node.mv.as_str())
    }
}

// Unlink uniquely owned nodes one at a time so a long game does not recurse
// through the whole spine on drop.
impl Drop for MoveList {
    fn drop(&mut self) {
        let mut head = self.head.take();
        while let Some(node) = head {
            match Arc::try_unwrap(node) {
                Ok(mut node) => head = node.prev.take(),
                Err(_) => break,
            }
        }
    }
}

impl PartialEq for MoveList {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter_rev().eq(other.iter_rev())
    }
}

impl Eq for MoveList {}

impl fmt::Display for MoveList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_notation_string())
    }
}

impl<S: Into<String>> FromIterator<S> for MoveList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        iter.into_iter()
            .fold(MoveList::empty(), |list, mv| list.append(mv))
    }
}

impl Serialize for MoveList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.to_sequence())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list() {
        let list = MoveList::empty();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert_eq!(list.to_notation_string(), "");
        assert!(list.to_sequence().is_empty());
        assert_eq!(list.last(), None);
    }

    #[test]
    fn test_append_two_moves() {
        let list = MoveList::empty().append("e4").append("e5");
        assert_eq!(list.to_notation_string(), "e4 e5");
        assert_eq!(list.to_sequence(), vec!["e4", "e5"]);
        assert_eq!(list.last(), Some("e5"));
    }

    #[test]
    fn test_earlier_snapshots_unchanged() {
        let empty = MoveList::empty();
        let one = empty.append("e4");
        let two = one.append("e5");
        let three = two.append("Nf3");

        // Branch from an older snapshot
        let other = one.append("c5");

        assert!(empty.is_empty());
        assert_eq!(one.to_sequence(), vec!["e4"]);
        assert_eq!(two.to_sequence(), vec!["e4", "e5"]);
        assert_eq!(three.to_sequence(), vec!["e4", "e5", "Nf3"]);
        assert_eq!(other.to_sequence(), vec!["e4", "c5"]);
    }

    #[test]
    fn test_append_is_concatenation() {
        let moves = ["d4", "Nf6", "c4", "e6", "Nc3", "Bb4"];
        let mut list = MoveList::empty();

        for mv in moves {
            let before = list.to_sequence();
            let next = list.append(mv);

            let mut expected = before.clone();
            expected.push(mv.to_string());
            assert_eq!(next.to_sequence(), expected);
            assert_eq!(list.to_sequence(), before);

            list = next;
        }
        assert_eq!(list.len(), moves.len());
    }

    #[test]
    fn test_numbered_pairs() {
        let list: MoveList = ["e4", "e5", "Nf3"].into_iter().collect();
        let pairs = list.numbered_pairs();

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].number, 1);
        assert_eq!(pairs[0].white, "e4");
        assert_eq!(pairs[0].black.as_deref(), Some("e5"));
        assert_eq!(pairs[1].white, "Nf3");
        assert_eq!(pairs[1].black, None);
    }

    #[test]
    fn test_clone_shares_snapshot() {
        let list = MoveList::empty().append("e4");
        let copy = list.clone();
        assert!(list.ptr_eq(&copy));
        assert!(!list.ptr_eq(&list.append("e5")));
        assert_eq!(list, MoveList::empty().append("e4"));
    }

    #[test]
    fn test_long_history_drops() {
        let list: MoveList = (0..100_000).map(|i| format!("m{}", i)).collect();
        assert_eq!(list.len(), 100_000);
        drop(list);
    }

    #[test]
    fn test_serializes_as_array() {
        let list = MoveList::empty().append("e4").append("c5");
        let json = serde_json::to_string(&list).unwrap();
        assert_eq!(json, r#"["e4","c5"]"#);
    }
}
