//! Identifier paths and the codec between them and visual tree paths.
//!
//! A visual path is the chain of tree-view nodes from the root to some node.
//! Those node objects are thrown away whenever the tree is rebuilt, so state
//! that must survive a rebuild is keyed by an [`IdPath`] instead: the chain of
//! stable domain identifiers along the same positions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::AreaId;

use super::error::TreeError;
use super::view::TreeView;

/// Stable identifier of a domain node shown in a tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<AreaId> for NodeId {
    fn from(area: AreaId) -> Self {
        NodeId(area.0)
    }
}

/// Root-to-leaf sequence of stable identifiers
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdPath(Vec<NodeId>);

impl IdPath {
    pub fn new(ids: Vec<NodeId>) -> Self {
        Self(ids)
    }

    /// Build a path from raw identifiers
    pub fn from_raw(ids: impl IntoIterator<Item = u64>) -> Self {
        Self(ids.into_iter().map(NodeId).collect())
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn leaf(&self) -> Option<NodeId> {
        self.0.last().copied()
    }

    /// The path of the parent position, if any
    pub fn parent(&self) -> Option<IdPath> {
        match self.0.split_last() {
            Some((_, rest)) if !rest.is_empty() => Some(IdPath(rest.to_vec())),
            _ => None,
        }
    }

    pub fn starts_with(&self, prefix: &IdPath) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl FromIterator<NodeId> for IdPath {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for IdPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|id| id.to_string()).collect();
        write!(f, "/{}", parts.join("/"))
    }
}

/// Convert a visual path into its identifier path
pub fn encode<T: TreeView + ?Sized>(tree: &T, visual_path: &[T::Node]) -> Result<IdPath, TreeError> {
    visual_path
        .iter()
        .enumerate()
        .map(|(depth, node)| {
            tree.stable_id(node)
                .ok_or(TreeError::UnidentifiableNode { depth })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(IdPath)
}

/// Find the visual path matching `id_path`, starting at `root`
///
/// Returns `None` when some level has no matching node, which is the normal
/// outcome for positions deleted since the path was recorded. Identifiers are
/// unique among siblings, so only one branch is followed per level.
pub fn decode<T: TreeView + ?Sized>(
    tree: &T,
    id_path: &IdPath,
    root: &T::Node,
) -> Option<Vec<T::Node>> {
    let (first, rest) = id_path.ids().split_first()?;
    if tree.stable_id(root)? != *first {
        return None;
    }

    let mut visual_path = Vec::with_capacity(id_path.len());
    visual_path.push(root.clone());
    for id in rest {
        let current = visual_path.last()?;
        let next = tree
            .children(current)
            .into_iter()
            .find(|child| tree.stable_id(child) == Some(*id))?;
        visual_path.push(next);
    }
    Some(visual_path)
}

/// [`decode`] against the tree's current root
pub fn resolve<T: TreeView + ?Sized>(tree: &T, id_path: &IdPath) -> Option<Vec<T::Node>> {
    let root = tree.root()?;
    decode(tree, id_path, &root)
}
