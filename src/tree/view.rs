//! Tree view collaborator
//!
//! [`TreeView`] is the narrow interface the synchronization code needs from a
//! tree widget. [`MemoryTree`] is an arena-backed implementation used by the
//! CLI and the tests; its node handles are arena indices, so rebuilding it
//! produces entirely new handles for the same identifiers.

use tracing::{debug, warn};

use crate::model::{AreaId, AreaSource};

use super::path::NodeId;

/// A tree widget whose expansion and selection can be read and written
///
/// Paths are root-to-node chains of the widget's own node handles.
pub trait TreeView {
    type Node: Clone + PartialEq;

    fn root(&self) -> Option<Self::Node>;

    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Stable domain identifier of the node, if it has one
    fn stable_id(&self, node: &Self::Node) -> Option<NodeId>;

    fn is_expanded(&self, path: &[Self::Node]) -> bool;

    fn selection(&self) -> Vec<Vec<Self::Node>>;

    /// Expand the node at the end of `path`, and its ancestors
    fn set_expanded(&mut self, path: &[Self::Node]);

    /// Replace the whole selection, notifying listeners once
    fn set_selection(&mut self, paths: Vec<Vec<Self::Node>>);

    /// Visit the path of every node, depth-first, parents before children
    fn for_each_path(&self, visitor: &mut dyn FnMut(&[Self::Node])) {
        if let Some(root) = self.root() {
            let mut path = vec![root];
            walk(self, &mut path, visitor);
        }
    }
}

fn walk<T: TreeView + ?Sized>(
    tree: &T,
    path: &mut Vec<T::Node>,
    visitor: &mut dyn FnMut(&[T::Node]),
) {
    visitor(path.as_slice());
    let Some(node) = path.last() else {
        return;
    };
    for child in tree.children(node) {
        path.push(child);
        walk(tree, path, visitor);
        path.pop();
    }
}

#[derive(Debug, Clone)]
struct MemoryNode {
    id: Option<NodeId>,
    label: String,
    parent: Option<usize>,
    children: Vec<usize>,
    expanded: bool,
}

/// In-memory tree view
#[derive(Debug, Clone, Default)]
pub struct MemoryTree {
    nodes: Vec<MemoryNode>,
    root: Option<usize>,
    selection: Vec<Vec<usize>>,
    selection_events: usize,
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the container hierarchy of `source` below `root`
    ///
    /// An area already present on the current path becomes a leaf, so cyclic
    /// references terminate. Unknown children are skipped.
    pub fn from_source(source: &dyn AreaSource, root: AreaId) -> Self {
        let mut tree = Self::new();
        if !source.contains(root) {
            return tree;
        }
        let root_node = tree.add_root(root.0, source.name(root));
        let mut ancestors = vec![root];
        tree.fill(source, root_node, &mut ancestors);
        tree
    }

    fn fill(&mut self, source: &dyn AreaSource, node: usize, ancestors: &mut Vec<AreaId>) {
        let Some(&area) = ancestors.last() else {
            return;
        };
        let children = match source.children(area) {
            Ok(children) => children,
            Err(e) => {
                debug!(%area, error = %e, "skipping children");
                return;
            }
        };
        for child in children {
            if !source.contains(child) {
                debug!(%area, %child, "skipping unknown child");
                continue;
            }
            let child_node = self.add_child(node, child.0, source.name(child));
            if !ancestors.contains(&child) {
                ancestors.push(child);
                self.fill(source, child_node, ancestors);
                ancestors.pop();
            }
        }
    }

    /// Allocate a node; an unknown `parent` leaves it detached
    fn alloc(&mut self, id: Option<NodeId>, label: String, parent: Option<usize>) -> usize {
        let index = self.nodes.len();
        let parent = parent.filter(|&p| match self.nodes.get_mut(p) {
            Some(node) => {
                node.children.push(index);
                true
            }
            None => {
                warn!(parent = p, "unknown parent handle, node left detached");
                false
            }
        });
        self.nodes.push(MemoryNode {
            id,
            label,
            parent,
            children: vec![],
            expanded: false,
        });
        index
    }

    /// Set the root node, replacing any previous tree
    pub fn add_root(&mut self, id: u64, label: impl Into<String>) -> usize {
        let index = self.alloc(Some(NodeId(id)), label.into(), None);
        self.root = Some(index);
        self.selection.clear();
        index
    }

    pub fn add_child(&mut self, parent: usize, id: u64, label: impl Into<String>) -> usize {
        self.alloc(Some(NodeId(id)), label.into(), Some(parent))
    }

    /// Add a node without a stable identifier
    pub fn add_unidentified_child(&mut self, parent: usize, label: impl Into<String>) -> usize {
        self.alloc(None, label.into(), Some(parent))
    }

    /// Allocate a node that is not attached anywhere
    ///
    /// Useful to shift the handles of a rebuilt tree away from a previous one.
    pub fn add_detached(&mut self, label: impl Into<String>) -> usize {
        self.alloc(None, label.into(), None)
    }

    pub fn label(&self, node: usize) -> Option<&str> {
        self.nodes.get(node).map(|n| n.label.as_str())
    }

    pub fn is_node_expanded(&self, node: usize) -> bool {
        self.nodes.get(node).is_some_and(|n| n.expanded)
    }

    pub fn set_node_expanded(&mut self, node: usize, expanded: bool) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.expanded = expanded;
        }
    }

    pub fn collapse_all(&mut self) {
        for node in &mut self.nodes {
            node.expanded = false;
        }
    }

    /// Root-to-node chain of handles, if `node` is attached to the root
    pub fn path_to(&self, node: usize) -> Option<Vec<usize>> {
        let mut path = vec![node];
        let mut current = self.nodes.get(node)?;
        while let Some(parent) = current.parent {
            path.push(parent);
            current = self.nodes.get(parent)?;
        }
        path.reverse();
        (path.first() == self.root.as_ref()).then_some(path)
    }

    /// Every expanded node, in depth-first order
    pub fn expanded_nodes(&self) -> Vec<usize> {
        let mut expanded = vec![];
        self.for_each_path(&mut |path| {
            if let Some(&node) = path.last() {
                if self.is_node_expanded(node) {
                    expanded.push(node);
                }
            }
        });
        expanded
    }

    /// Leaf handles of the current selection
    pub fn selected_nodes(&self) -> Vec<usize> {
        self.selection.iter().filter_map(|p| p.last().copied()).collect()
    }

    /// How many times the selection has been replaced
    pub fn selection_events(&self) -> usize {
        self.selection_events
    }
}

impl TreeView for MemoryTree {
    type Node = usize;

    fn root(&self) -> Option<usize> {
        self.root
    }

    fn children(&self, node: &usize) -> Vec<usize> {
        self.nodes
            .get(*node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn stable_id(&self, node: &usize) -> Option<NodeId> {
        self.nodes.get(*node).and_then(|n| n.id)
    }

    fn is_expanded(&self, path: &[usize]) -> bool {
        path.last().is_some_and(|&node| self.is_node_expanded(node))
    }

    fn selection(&self) -> Vec<Vec<usize>> {
        self.selection.clone()
    }

    fn set_expanded(&mut self, path: &[usize]) {
        for &node in path {
            self.set_node_expanded(node, true);
        }
    }

    fn set_selection(&mut self, paths: Vec<Vec<usize>>) {
        self.selection = paths;
        self.selection_events += 1;
    }
}
