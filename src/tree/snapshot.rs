//! Capture and restore tree expansion/selection across rebuilds.
//!
//! A [`TreeStateSnapshot`] is taken from the live tree right before its nodes
//! are rebuilt and applied right after. It only holds [`IdPath`]s, so it does
//! not care that every node handle has changed in between.
//!
//! ```text
//! Empty --capture--> Captured --apply--> Applied
//!                                  ^       |
//!                                  +-apply-+
//! ```
//!
//! Applying again is allowed and gives the same result; capturing again is
//! not, take a new snapshot instead.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::TreeError;
use super::path::{decode, encode, IdPath};
use super::view::TreeView;

/// Lifecycle of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SnapshotState {
    #[default]
    Empty,
    Captured,
    Applied,
}

/// Outcome of [`TreeStateSnapshot::apply`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Expanded paths found in the new tree
    pub expanded: usize,
    /// Selected paths found in the new tree
    pub selected: usize,
    /// Paths that no longer exist
    pub skipped: Vec<IdPath>,
}

/// Expanded and selected positions of a tree, by identifier path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeStateSnapshot {
    expanded: BTreeSet<IdPath>,
    selected: BTreeSet<IdPath>,
    #[serde(default)]
    state: SnapshotState,
}

impl TreeStateSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture a fresh snapshot from `tree`
    pub fn capture_from<T: TreeView + ?Sized>(tree: &T) -> Self {
        let mut snapshot = Self::new();
        snapshot.record(tree);
        snapshot
    }

    /// A captured snapshot built from known paths, e.g. restored from storage
    pub fn from_paths(
        expanded: impl IntoIterator<Item = IdPath>,
        selected: impl IntoIterator<Item = IdPath>,
    ) -> Self {
        Self {
            expanded: expanded.into_iter().collect(),
            selected: selected.into_iter().collect(),
            state: SnapshotState::Captured,
        }
    }

    /// Record the expanded and selected positions of `tree`
    pub fn capture<T: TreeView + ?Sized>(&mut self, tree: &T) -> Result<(), TreeError> {
        if self.state != SnapshotState::Empty {
            return Err(TreeError::AlreadyCaptured);
        }
        self.record(tree);
        Ok(())
    }

    fn record<T: TreeView + ?Sized>(&mut self, tree: &T) {
        let mut expanded = BTreeSet::new();
        tree.for_each_path(&mut |path| {
            if tree.is_expanded(path) {
                if let Some(ids) = encode_or_warn(tree, path) {
                    expanded.insert(ids);
                }
            }
        });

        let selected = tree
            .selection()
            .iter()
            .filter_map(|path| encode_or_warn(tree, path))
            .collect();

        self.expanded = expanded;
        self.selected = selected;
        self.state = SnapshotState::Captured;
        debug!(
            expanded = self.expanded.len(),
            selected = self.selected.len(),
            "captured tree state"
        );
    }

    /// Restore the captured state onto a (possibly rebuilt) tree
    ///
    /// Expansion is restored first, shortest paths first. The resolved
    /// selection is then set in a single call. Paths that cannot be found are
    /// skipped and listed in the report.
    pub fn apply<T: TreeView + ?Sized>(&mut self, tree: &mut T) -> Result<ApplyReport, TreeError> {
        if self.state == SnapshotState::Empty {
            return Err(TreeError::NotCaptured);
        }

        let mut report = ApplyReport::default();
        let root = tree.root();

        let mut expanded: Vec<&IdPath> = self.expanded.iter().collect();
        expanded.sort_by_key(|path| path.len());
        for id_path in expanded {
            match root.as_ref().and_then(|root| decode(&*tree, id_path, root)) {
                Some(visual) => {
                    tree.set_expanded(&visual);
                    report.expanded += 1;
                }
                None => report.skipped.push(id_path.clone()),
            }
        }

        let mut selection = Vec::with_capacity(self.selected.len());
        for id_path in &self.selected {
            match root.as_ref().and_then(|root| decode(&*tree, id_path, root)) {
                Some(visual) => selection.push(visual),
                None => report.skipped.push(id_path.clone()),
            }
        }
        report.selected = selection.len();
        tree.set_selection(selection);

        for id_path in &report.skipped {
            debug!(path = %id_path, "path no longer present");
        }
        self.state = SnapshotState::Applied;
        Ok(report)
    }

    pub fn state(&self) -> SnapshotState {
        self.state
    }

    pub fn expanded_paths(&self) -> &BTreeSet<IdPath> {
        &self.expanded
    }

    pub fn selected_paths(&self) -> &BTreeSet<IdPath> {
        &self.selected
    }

    /// Whether nothing was expanded or selected at capture time
    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty() && self.selected.is_empty()
    }
}

fn encode_or_warn<T: TreeView + ?Sized>(tree: &T, path: &[T::Node]) -> Option<IdPath> {
    match encode(tree, path) {
        Ok(ids) => Some(ids),
        Err(e) => {
            warn!(error = %e, "dropping tree path from snapshot");
            None
        }
    }
}
