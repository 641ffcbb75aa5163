//! Capability-tagged entity index with parent-pointer ancestry.
//!
//! The world's entity tree itself is an external collaborator; what the
//! core keeps is a flat index of entity records (name, capability tag,
//! parent pointer) supporting the "nearest enclosing entity of a given
//! capability" query and interactive selection tracking. Ancestor
//! lookups resolve by capability tag, not by runtime type identity.

use std::fmt;

use indexmap::IndexMap;
use smallvec::SmallVec;

/// Identifies an entity within the index.
///
/// Allocated sequentially by [`EntityIndex::insert`]; never reused
/// within one index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for EntityId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Capability tag carried by each entity record.
///
/// Ancestor queries match on this tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// A complete articulated model.
    Model,
    /// A rigid body within a model.
    Body,
    /// A collision geometry attached to a body.
    Geom,
    /// A sensor attached to a body or model.
    Sensor,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model => write!(f, "model"),
            Self::Body => write!(f, "body"),
            Self::Geom => write!(f, "geom"),
            Self::Sensor => write!(f, "sensor"),
        }
    }
}

struct Record {
    name: String,
    capability: Capability,
    parent: Option<EntityId>,
}

/// Flat parent-pointer table over the world's entities.
///
/// Insertion order is preserved (useful for deterministic iteration in
/// deferred add/delete processing). Also tracks the interactively
/// selected entity, with toggling semantics: selecting the currently
/// selected entity clears the selection.
#[derive(Default)]
pub struct EntityIndex {
    records: IndexMap<EntityId, Record>,
    selected: Option<EntityId>,
    next_id: u32,
}

impl EntityIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity. Returns its fresh ID, or `None` if `parent`
    /// names an entity not present in the index.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        capability: Capability,
        parent: Option<EntityId>,
    ) -> Option<EntityId> {
        if let Some(p) = parent {
            if !self.records.contains_key(&p) {
                return None;
            }
        }
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.records.insert(
            id,
            Record {
                name: name.into(),
                capability,
                parent,
            },
        );
        Some(id)
    }

    /// Remove an entity, splicing its children onto its parent.
    ///
    /// Clears the selection if the removed entity was selected.
    /// Returns `false` if the entity was not present.
    pub fn remove(&mut self, id: EntityId) -> bool {
        let Some(removed) = self.records.shift_remove(&id) else {
            return false;
        };
        for record in self.records.values_mut() {
            if record.parent == Some(id) {
                record.parent = removed.parent;
            }
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
        true
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: EntityId) -> bool {
        self.records.contains_key(&id)
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The entity's name.
    pub fn name(&self, id: EntityId) -> Option<&str> {
        self.records.get(&id).map(|r| r.name.as_str())
    }

    /// The entity's capability tag.
    pub fn capability(&self, id: EntityId) -> Option<Capability> {
        self.records.get(&id).map(|r| r.capability)
    }

    /// The entity's parent, if any.
    pub fn parent(&self, id: EntityId) -> Option<EntityId> {
        self.records.get(&id).and_then(|r| r.parent)
    }

    /// First entity registered under `name`, in insertion order.
    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.records
            .iter()
            .find(|(_, r)| r.name == name)
            .map(|(id, _)| *id)
    }

    /// Nearest entity with the given capability, starting from `id`
    /// itself and walking the parent chain toward the root.
    ///
    /// Returns `None` if no entity on the chain carries the tag — the
    /// walk terminates at the root rather than spinning.
    pub fn nearest_ancestor(&self, id: EntityId, capability: Capability) -> Option<EntityId> {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let record = self.records.get(&current)?;
            if record.capability == capability {
                return Some(current);
            }
            cursor = record.parent;
        }
        None
    }

    /// The chain of ancestors from the entity's parent to the root.
    pub fn ancestors(&self, id: EntityId) -> SmallVec<[EntityId; 8]> {
        let mut path = SmallVec::new();
        let mut cursor = self.parent(id);
        while let Some(current) = cursor {
            path.push(current);
            cursor = self.parent(current);
        }
        path
    }

    /// Toggle selection of `id`: selecting the currently selected
    /// entity clears the selection. Unknown IDs leave the selection
    /// unchanged. Returns the selection after the call.
    pub fn toggle_selection(&mut self, id: EntityId) -> Option<EntityId> {
        if !self.records.contains_key(&id) {
            return self.selected;
        }
        self.selected = if self.selected == Some(id) {
            None
        } else {
            Some(id)
        };
        self.selected
    }

    /// The currently selected entity, if any.
    pub fn selected(&self) -> Option<EntityId> {
        self.selected
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }
}

impl fmt::Debug for EntityIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityIndex")
            .field("entities", &self.records.len())
            .field("selected", &self.selected)
            .finish()
    }
}
