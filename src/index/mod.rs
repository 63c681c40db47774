//! Index metadata reported by the indexing service.
//!
//! These are plain snapshots: index state transitions happen server-side,
//! nothing here moves an index between states.

use crate::core::{ModelError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One property of a composite index and its sort direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexProperty {
    name: String,
    direction: Direction,
}

impl IndexProperty {
    pub fn new(name: impl Into<String>, direction: Direction) -> Self {
        Self {
            name: name.into(),
            direction,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

impl fmt::Display for IndexProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IndexProperty(name='{}', direction='{}')",
            self.name, self.direction
        )
    }
}

/// Composite index definition. Property order is significant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Index {
    kind: String,
    properties: Vec<IndexProperty>,
    ancestor: bool,
}

impl Index {
    pub fn new(kind: impl Into<String>, properties: Vec<IndexProperty>, ancestor: bool) -> Self {
        Self {
            kind: kind.into(),
            properties,
            ancestor,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn properties(&self) -> &[IndexProperty] {
        &self.properties
    }

    pub fn ancestor(&self) -> bool {
        self.ancestor
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let properties: Vec<String> = self.properties.iter().map(ToString::to_string).collect();
        write!(
            f,
            "Index(kind='{}', properties=[{}], ancestor={})",
            self.kind,
            properties.join(", "),
            if self.ancestor { "True" } else { "False" }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexStatus {
    Error,
    Serving,
    Deleting,
    Building,
}

impl IndexStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Serving => "serving",
            Self::Deleting => "deleting",
            Self::Building => "building",
        }
    }
}

impl fmt::Display for IndexStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observed state of an index definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexState {
    definition: Index,
    state: IndexStatus,
    id: i64,
}

impl IndexState {
    pub fn new(definition: Index, state: IndexStatus, id: i64) -> Self {
        Self {
            definition,
            state,
            id,
        }
    }

    /// Decode a batch of index snapshots as returned by the indexing service.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>> {
        serde_json::from_str(json).map_err(|e| {
            ModelError::InvalidArgument(format!("Malformed index state snapshot: {}", e))
        })
    }

    pub fn definition(&self) -> &Index {
        &self.definition
    }

    pub fn state(&self) -> IndexStatus {
        self.state
    }

    pub fn id(&self) -> i64 {
        self.id
    }
}

impl fmt::Display for IndexState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IndexState(definition={}, state='{}', id={})",
            self.definition, self.state, self.id
        )
    }
}
