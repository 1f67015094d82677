//! Value objects for transaction job construction

use super::errors::SyncJobError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Tag identifying a class of business entity (e.g. `Category`, `Product`).
///
/// Used both for dependency-order lookup and to find the DAO adapter that
/// knows the entity's object graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityType(String);

impl EntityType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for EntityType {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Operation applied to an entity on the target side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Command {
    /// Create the entity or overwrite it with the source state
    Update,
    /// Delete the entity from the target
    Remove,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Update => "UPDATE",
            Command::Remove => "REMOVE",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = SyncJobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UPDATE" => Ok(Command::Update),
            "REMOVE" => Ok(Command::Remove),
            _ => Err(SyncJobError::UnexpectedCommand(s.to_string())),
        }
    }
}

/// Cache and lookup key: one entity instance
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntryKey {
    pub guid: String,
    pub entity_type: EntityType,
}

impl EntryKey {
    pub fn new(guid: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            guid: guid.into(),
            entity_type,
        }
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.entity_type, self.guid)
    }
}

/// In-memory payload holding one entity instance's full source state.
///
/// Produced by an [`EntityLocator`](crate::ports::outbound::EntityLocator);
/// the engine never inspects it beyond identity.
pub trait Persistable: fmt::Debug + Send + Sync {
    fn guid(&self) -> &str;

    fn entity_type(&self) -> &EntityType;
}

/// Shared handle to a located payload
pub type SourceObject = Arc<dyn Persistable>;
