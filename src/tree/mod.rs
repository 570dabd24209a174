//! Tree-state synchronization
//!
//! Tree views lose their expansion and selection when their nodes are rebuilt
//! after a domain reload. This module records that state as paths of stable
//! identifiers and re-applies it to the rebuilt tree.

pub mod error;
pub mod path;
pub mod snapshot;
pub mod view;

pub use error::TreeError;
pub use path::{decode, encode, resolve, IdPath, NodeId};
pub use snapshot::{ApplyReport, SnapshotState, TreeStateSnapshot};
pub use view::{MemoryTree, TreeView};
