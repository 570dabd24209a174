//! Domain model collaborator
//!
//! The layout core only reads the content model through [`AreaSource`]. Areas
//! are referenced by [`AreaId`], never owned, so a reload of the underlying
//! model does not invalidate anything the core keeps around.
//!
//! [`AreaModel`] is an in-memory source that can be loaded from TOML:
//!
//! ```toml
//! root = 1
//!
//! [[areas]]
//! id = 1
//! name = "Home"
//! children = [2, 3]
//!
//! [[areas]]
//! id = 2
//! name = "Header"
//! inherits = [1]
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable identifier of an area, preserved across reloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AreaId(pub u64);

impl fmt::Display for AreaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors reported by a domain model
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("unknown area {0}")]
    UnknownArea(AreaId),
    #[error("area {0} is defined more than once")]
    DuplicateArea(AreaId),
    #[error("failed to read model file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse model TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Read-only view of the hierarchical content model
///
/// Children may include references to areas that also appear elsewhere,
/// including ancestors of the area itself.
pub trait AreaSource {
    /// Whether the model knows this area
    fn contains(&self, area: AreaId) -> bool;

    /// Child areas in display order
    fn children(&self, area: AreaId) -> Result<Vec<AreaId>, ModelError>;

    /// The container of `area`, if any
    fn parent(&self, area: AreaId) -> Result<Option<AreaId>, ModelError>;

    /// Whether `area` inherits its content from `ancestor`
    fn inherits_from(&self, area: AreaId, ancestor: AreaId) -> Result<bool, ModelError>;

    /// Whether `area` holds constructors rather than plain content
    fn is_constructor(&self, _area: AreaId) -> bool {
        false
    }

    /// Display name of `area`
    fn name(&self, area: AreaId) -> String {
        area.to_string()
    }
}

/// One area as stored in an [`AreaModel`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaRecord {
    pub id: AreaId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub children: Vec<AreaId>,
    #[serde(default)]
    pub inherits: Vec<AreaId>,
    #[serde(default)]
    pub constructor: bool,
}

impl AreaRecord {
    pub fn new(id: u64) -> Self {
        Self {
            id: AreaId(id),
            name: None,
            children: vec![],
            inherits: vec![],
            constructor: false,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = u64>) -> Self {
        self.children = children.into_iter().map(AreaId).collect();
        self
    }

    pub fn inheriting(mut self, ancestors: impl IntoIterator<Item = u64>) -> Self {
        self.inherits = ancestors.into_iter().map(AreaId).collect();
        self
    }

    pub fn constructor(mut self) -> Self {
        self.constructor = true;
        self
    }
}

/// TOML structure for deserializing models
#[derive(Deserialize)]
struct TomlModel {
    root: Option<AreaId>,
    #[serde(default)]
    areas: Vec<AreaRecord>,
}

/// In-memory content model
#[derive(Debug, Clone, Default)]
pub struct AreaModel {
    root: Option<AreaId>,
    areas: HashMap<AreaId, AreaRecord>,
    /// Declaration order, used for deterministic iteration
    order: Vec<AreaId>,
}

impl AreaModel {
    /// Build a model from records; the first record is the root unless set otherwise
    pub fn from_records(records: impl IntoIterator<Item = AreaRecord>) -> Result<Self, ModelError> {
        let mut model = Self::default();
        for record in records {
            model.insert(record)?;
        }
        Ok(model)
    }

    /// Parse a model from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ModelError> {
        let parsed: TomlModel = toml::from_str(content)?;
        let mut model = Self::from_records(parsed.areas)?;
        if let Some(root) = parsed.root {
            model.set_root(root)?;
        }
        Ok(model)
    }

    /// Load a model from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Add an area; ids must be unique
    pub fn insert(&mut self, record: AreaRecord) -> Result<(), ModelError> {
        let id = record.id;
        if self.areas.contains_key(&id) {
            return Err(ModelError::DuplicateArea(id));
        }
        self.root.get_or_insert(id);
        self.order.push(id);
        self.areas.insert(id, record);
        Ok(())
    }

    /// Delete an area; references to it from other areas become dangling
    pub fn remove(&mut self, id: AreaId) -> Option<AreaRecord> {
        self.order.retain(|a| *a != id);
        if self.root == Some(id) {
            self.root = self.order.first().copied();
        }
        self.areas.remove(&id)
    }

    /// Delete an area and drop every reference to it
    pub fn remove_and_unlink(&mut self, id: AreaId) -> Option<AreaRecord> {
        let removed = self.remove(id)?;
        for record in self.areas.values_mut() {
            record.children.retain(|c| *c != id);
            record.inherits.retain(|a| *a != id);
        }
        Some(removed)
    }

    pub fn set_root(&mut self, root: AreaId) -> Result<(), ModelError> {
        if !self.areas.contains_key(&root) {
            return Err(ModelError::UnknownArea(root));
        }
        self.root = Some(root);
        Ok(())
    }

    pub fn root(&self) -> Option<AreaId> {
        self.root
    }

    pub fn get(&self, id: AreaId) -> Option<&AreaRecord> {
        self.areas.get(&id)
    }

    /// All areas in declaration order
    pub fn areas(&self) -> impl Iterator<Item = &AreaRecord> {
        self.order.iter().filter_map(|id| self.areas.get(id))
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    fn record(&self, id: AreaId) -> Result<&AreaRecord, ModelError> {
        self.areas.get(&id).ok_or(ModelError::UnknownArea(id))
    }
}

impl AreaSource for AreaModel {
    fn contains(&self, area: AreaId) -> bool {
        self.areas.contains_key(&area)
    }

    fn children(&self, area: AreaId) -> Result<Vec<AreaId>, ModelError> {
        Ok(self.record(area)?.children.clone())
    }

    fn parent(&self, area: AreaId) -> Result<Option<AreaId>, ModelError> {
        self.record(area)?;
        Ok(self
            .areas()
            .find(|record| record.children.contains(&area) && record.id != area)
            .map(|record| record.id))
    }

    fn inherits_from(&self, area: AreaId, ancestor: AreaId) -> Result<bool, ModelError> {
        self.record(ancestor)?;
        let mut stack = vec![area];
        let mut seen = vec![];
        while let Some(current) = stack.pop() {
            if seen.contains(&current) {
                continue;
            }
            seen.push(current);
            for next in &self.record(current)?.inherits {
                if *next == ancestor {
                    return Ok(true);
                }
                stack.push(*next);
            }
        }
        Ok(false)
    }

    fn is_constructor(&self, area: AreaId) -> bool {
        self.areas.get(&area).is_some_and(|r| r.constructor)
    }

    fn name(&self, area: AreaId) -> String {
        self.areas
            .get(&area)
            .and_then(|r| r.name.clone())
            .unwrap_or_else(|| area.to_string())
    }
}
