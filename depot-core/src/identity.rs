// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::{Display, Formatter};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Opaque identifier of an actor (a person using the repository).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ActorId(String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ActorId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ActorId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ActorId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Opaque identifier of a business object (project, collection, data item, data file or metadata
/// file).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ObjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A node in the relationship graph, which is either an actor or a business object.
///
/// Actors and objects live in separate identifier spaces, an actor "p1" and a project "p1" are
/// different nodes.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Entity {
    Actor(ActorId),
    Object(ObjectId),
}

impl Entity {
    /// Return the actor id if this entity is an actor.
    pub fn as_actor(&self) -> Option<&ActorId> {
        match self {
            Entity::Actor(id) => Some(id),
            Entity::Object(_) => None,
        }
    }

    /// Return the object id if this entity is a business object.
    pub fn as_object(&self) -> Option<&ObjectId> {
        match self {
            Entity::Actor(_) => None,
            Entity::Object(id) => Some(id),
        }
    }

    pub fn is_actor(&self) -> bool {
        matches!(self, Entity::Actor(_))
    }

    pub fn is_object(&self) -> bool {
        !self.is_actor()
    }
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Entity::Actor(id) => write!(f, "actor:{id}"),
            Entity::Object(id) => write!(f, "object:{id}"),
        }
    }
}

impl From<ActorId> for Entity {
    fn from(value: ActorId) -> Self {
        Entity::Actor(value)
    }
}

impl From<&ActorId> for Entity {
    fn from(value: &ActorId) -> Self {
        Entity::Actor(value.clone())
    }
}

impl From<ObjectId> for Entity {
    fn from(value: ObjectId) -> Self {
        Entity::Object(value)
    }
}

impl From<&ObjectId> for Entity {
    fn from(value: &ObjectId) -> Self {
        Entity::Object(value.clone())
    }
}
