//! # Error Index
//!
//! Translates a flat list of [`Issue`]s into a structure a table cell can
//! query by its own coordinates.
//!
//! Issues whose path starts with a row index followed by a field name are
//! stored under `(row, field)`; deeper path segments attribute to the same
//! cell. When two issues hit the same cell the later one wins.
//!
//! Issues without such a location are handled according to
//! [`UnlocatedIssues`]: kept as global messages, or dropped and only
//! counted. Either way they keep the index non-empty, so an index is empty
//! exactly when the pass that built it found nothing. An unlocated issue
//! that still starts with a row index (a rule on the row object as a whole)
//! also flags that row, see [`ErrorIndex::row_has_issues`].

use std::collections::{BTreeMap, BTreeSet};

use acct_core::Issue;
use serde::Serialize;

/// What to do with issues that do not address a `(row, field)` cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum UnlocatedIssues {
    /// Keep their messages in [`ErrorIndex::global`].
    #[default]
    Surface,
    /// Discard their messages; only [`ErrorIndex::dropped`] records them.
    Drop,
}

/// Per-cell error messages from one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorIndex {
    cells: BTreeMap<usize, BTreeMap<String, String>>,
    global: Vec<String>,
    dropped: usize,
    flagged_rows: BTreeSet<usize>,
}

impl ErrorIndex {
    /// The canonical empty index.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build an index from the issues of one pass.
    pub fn build(issues: &[Issue], unlocated: UnlocatedIssues) -> Self {
        let mut index = Self::empty();
        for issue in issues {
            match issue.path.cell() {
                Some((row, field)) => {
                    index
                        .cells
                        .entry(row)
                        .or_default()
                        .insert(field.to_string(), issue.message.clone());
                }
                None => {
                    if let Some(row) = issue.path.row() {
                        index.flagged_rows.insert(row);
                    }
                    match unlocated {
                        UnlocatedIssues::Surface => index.global.push(issue.message.clone()),
                        UnlocatedIssues::Drop => index.dropped += 1,
                    }
                }
            }
        }
        index
    }

    /// Reset to the empty index.
    pub fn clear(&mut self) {
        *self = Self::empty();
    }

    /// The message for `(row, field)`, if any. Never fails, whatever the
    /// coordinates.
    pub fn lookup(&self, row: usize, field: &str) -> Option<&str> {
        self.cells.get(&row)?.get(field).map(String::as_str)
    }

    /// All messages of one row, keyed by field.
    pub fn row(&self, row: usize) -> Option<&BTreeMap<String, String>> {
        self.cells.get(&row)
    }

    /// Indices of rows with at least one cell error, ascending.
    pub fn invalid_rows(&self) -> Vec<usize> {
        self.cells.keys().copied().collect()
    }

    /// Whether any issue of the pass falls in `row`: a cell error, or an
    /// unlocated issue on the row itself. Holds under either
    /// [`UnlocatedIssues`] policy.
    pub fn row_has_issues(&self, row: usize) -> bool {
        self.cells.contains_key(&row) || self.flagged_rows.contains(&row)
    }

    /// Number of cells with an error.
    pub fn cell_count(&self) -> usize {
        self.cells.values().map(BTreeMap::len).sum()
    }

    /// Messages that do not belong to any cell.
    pub fn global(&self) -> &[String] {
        &self.global
    }

    /// Number of unlocated issues discarded under [`UnlocatedIssues::Drop`].
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Whether the pass that built this index found no issues at all.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.global.is_empty() && self.dropped == 0
    }

    /// Every cell error as `(row, field, message)`, ordered by row then
    /// field.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str, &str)> + '_ {
        self.cells.iter().flat_map(|(row, fields)| {
            fields
                .iter()
                .map(move |(field, message)| (*row, field.as_str(), message.as_str()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acct_core::IssuePath;
    use proptest::prelude::*;

    fn issue(pointer: &str, message: &str) -> Issue {
        Issue::new(IssuePath::from_pointer(pointer), message)
    }

    #[test]
    fn test_build_indexes_cells() {
        let index = ErrorIndex::build(
            &[
                issue("/0/login", "empty login"),
                issue("/0/password", "short"),
                issue("/2/label/1/text", "empty label"),
            ],
            UnlocatedIssues::Surface,
        );
        assert_eq!(index.lookup(0, "login"), Some("empty login"));
        assert_eq!(index.lookup(0, "password"), Some("short"));
        assert_eq!(index.lookup(2, "label"), Some("empty label"));
        assert_eq!(index.invalid_rows(), vec![0, 2]);
        assert_eq!(index.cell_count(), 3);
        assert!(index.global().is_empty());
    }

    #[test]
    fn test_last_write_wins() {
        let index = ErrorIndex::build(
            &[issue("/1/login", "first"), issue("/1/login", "second")],
            UnlocatedIssues::Surface,
        );
        assert_eq!(index.lookup(1, "login"), Some("second"));
        assert_eq!(index.cell_count(), 1);
    }

    #[test]
    fn test_lookup_out_of_range_is_absent() {
        let index = ErrorIndex::build(&[issue("/0/login", "x")], UnlocatedIssues::Surface);
        assert_eq!(index.lookup(99, "login"), None);
        assert_eq!(index.lookup(0, "nope"), None);
        assert_eq!(ErrorIndex::empty().lookup(usize::MAX, ""), None);
    }

    #[test]
    fn test_unlocated_surface() {
        let index = ErrorIndex::build(
            &[Issue::at_root("not a list"), issue("/login", "bad")],
            UnlocatedIssues::Surface,
        );
        assert_eq!(index.global(), &["not a list".to_string(), "bad".to_string()]);
        assert_eq!(index.cell_count(), 0);
        assert!(!index.is_empty());
    }

    #[test]
    fn test_unlocated_drop_still_non_empty() {
        let index = ErrorIndex::build(&[issue("/0", "row")], UnlocatedIssues::Drop);
        assert!(index.global().is_empty());
        assert_eq!(index.dropped(), 1);
        assert!(!index.is_empty());
    }

    #[test]
    fn test_row_level_issue_flags_row() {
        for policy in [UnlocatedIssues::Surface, UnlocatedIssues::Drop] {
            let index = ErrorIndex::build(
                &[issue("/1", "row must match exactly one kind"), issue("/0/login", "x")],
                policy,
            );
            assert!(index.row_has_issues(0));
            assert!(index.row_has_issues(1));
            assert!(!index.row_has_issues(2));
            assert_eq!(index.invalid_rows(), vec![0]);
            assert_eq!(index.lookup(1, "login"), None);
        }
    }

    #[test]
    fn test_root_issue_flags_no_row() {
        let index = ErrorIndex::build(&[Issue::at_root("not a list")], UnlocatedIssues::Surface);
        assert!(!index.row_has_issues(0));
    }

    #[test]
    fn test_clear() {
        let mut index = ErrorIndex::build(&[issue("/0/login", "x")], UnlocatedIssues::Surface);
        index.clear();
        assert!(index.is_empty());
        assert_eq!(index, ErrorIndex::empty());
    }

    #[test]
    fn test_iter_is_ordered() {
        let index = ErrorIndex::build(
            &[
                issue("/3/login", "c"),
                issue("/0/password", "b"),
                issue("/0/login", "a"),
            ],
            UnlocatedIssues::Surface,
        );
        let cells: Vec<_> = index.iter().collect();
        assert_eq!(
            cells,
            vec![(0, "login", "a"), (0, "password", "b"), (3, "login", "c")]
        );
    }

    #[test]
    fn test_serializes_rows_as_keys() {
        let index = ErrorIndex::build(&[issue("/1/login", "x")], UnlocatedIssues::Surface);
        let value = serde_json::to_value(&index).unwrap();
        assert_eq!(value["cells"]["1"]["login"], "x");
    }

    fn arb_issue() -> impl Strategy<Value = Issue> {
        let cell = (0usize..5, prop::sample::select(vec!["login", "password", "label"]))
            .prop_map(|(row, field)| format!("/{row}/{field}"));
        let pointer = prop_oneof![4 => cell, 1 => Just(String::new())];
        (pointer, "[a-z]{1,6}").prop_map(|(p, m)| Issue::new(IssuePath::from_pointer(&p), m))
    }

    proptest! {
        #[test]
        fn prop_empty_iff_no_issues(issues in prop::collection::vec(arb_issue(), 0..12)) {
            for policy in [UnlocatedIssues::Surface, UnlocatedIssues::Drop] {
                let index = ErrorIndex::build(&issues, policy);
                prop_assert_eq!(index.is_empty(), issues.is_empty());
            }
        }

        #[test]
        fn prop_build_is_deterministic(issues in prop::collection::vec(arb_issue(), 0..12)) {
            let a = ErrorIndex::build(&issues, UnlocatedIssues::Surface);
            let b = ErrorIndex::build(&issues, UnlocatedIssues::Surface);
            prop_assert_eq!(a, b);
        }
    }
}
