// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::Entity;

/// Type of a directed edge in the relationship graph.
///
/// Kinds come in pairs, every edge `a -[kind]-> b` is stored together with its inverse
/// `b -[kind.inverse()]-> a`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum RelationKind {
    /// Actor administers a project.
    IsAdministratorFor,
    IsAdministeredBy,

    /// Actor may deposit into a collection.
    IsDepositorFor,
    AcceptsDeposit,

    /// Collection contains another collection.
    HasSubcollection,
    IsSubcollectionOf,

    /// Project contains a collection, collection contains a data item or data item contains a
    /// data file.
    Aggregates,
    IsAggregatedBy,

    /// Object is described by a metadata file.
    HasMetadataFile,
    IsMetadataFor,
}

impl RelationKind {
    pub const ALL: [RelationKind; 10] = [
        RelationKind::IsAdministratorFor,
        RelationKind::IsAdministeredBy,
        RelationKind::IsDepositorFor,
        RelationKind::AcceptsDeposit,
        RelationKind::HasSubcollection,
        RelationKind::IsSubcollectionOf,
        RelationKind::Aggregates,
        RelationKind::IsAggregatedBy,
        RelationKind::HasMetadataFile,
        RelationKind::IsMetadataFor,
    ];

    /// The kind of the edge pointing back.
    pub fn inverse(&self) -> Self {
        match self {
            RelationKind::IsAdministratorFor => RelationKind::IsAdministeredBy,
            RelationKind::IsAdministeredBy => RelationKind::IsAdministratorFor,
            RelationKind::IsDepositorFor => RelationKind::AcceptsDeposit,
            RelationKind::AcceptsDeposit => RelationKind::IsDepositorFor,
            RelationKind::HasSubcollection => RelationKind::IsSubcollectionOf,
            RelationKind::IsSubcollectionOf => RelationKind::HasSubcollection,
            RelationKind::Aggregates => RelationKind::IsAggregatedBy,
            RelationKind::IsAggregatedBy => RelationKind::Aggregates,
            RelationKind::HasMetadataFile => RelationKind::IsMetadataFor,
            RelationKind::IsMetadataFor => RelationKind::HasMetadataFile,
        }
    }

    /// Returns `true` for kinds whose source is an actor and target is an object.
    pub fn is_actor_to_object(&self) -> bool {
        matches!(
            self,
            RelationKind::IsAdministratorFor | RelationKind::IsDepositorFor
        )
    }

    /// Returns `true` for kinds whose source is an object and target is an actor.
    pub fn is_object_to_actor(&self) -> bool {
        self.inverse().is_actor_to_object()
    }

    /// Returns `true` for kinds describing containment, pointing from the child to its container.
    pub fn is_child_to_container(&self) -> bool {
        matches!(
            self,
            RelationKind::IsSubcollectionOf | RelationKind::IsAggregatedBy
        )
    }

    /// Returns `true` for kinds describing containment, pointing from a container to a child.
    pub fn is_container_to_child(&self) -> bool {
        self.inverse().is_child_to_container()
    }

    /// Returns `true` for kinds pointing from an object to the one object it belongs to: its
    /// container, or the object a metadata file describes.
    pub fn is_child_to_parent(&self) -> bool {
        self.is_child_to_container() || *self == RelationKind::IsMetadataFor
    }

    pub fn is_parent_to_child(&self) -> bool {
        self.inverse().is_child_to_parent()
    }

    /// Returns `true` if the source and target entity variants fit this kind.
    pub fn accepts(&self, source: &Entity, target: &Entity) -> bool {
        if self.is_actor_to_object() {
            source.is_actor() && target.is_object()
        } else if self.is_object_to_actor() {
            source.is_object() && target.is_actor()
        } else {
            source.is_object() && target.is_object()
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::IsAdministratorFor => "IS_ADMINISTRATOR_FOR",
            RelationKind::IsAdministeredBy => "IS_ADMINISTERED_BY",
            RelationKind::IsDepositorFor => "IS_DEPOSITOR_FOR",
            RelationKind::AcceptsDeposit => "ACCEPTS_DEPOSIT",
            RelationKind::HasSubcollection => "HAS_SUBCOLLECTION",
            RelationKind::IsSubcollectionOf => "IS_SUBCOLLECTION_OF",
            RelationKind::Aggregates => "AGGREGATES",
            RelationKind::IsAggregatedBy => "IS_AGGREGATED_BY",
            RelationKind::HasMetadataFile => "HAS_METADATA_FILE",
            RelationKind::IsMetadataFor => "IS_METADATA_FOR",
        }
    }
}

impl Display for RelationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown relation kind '{0}'")]
pub struct RelationKindError(String);

impl FromStr for RelationKind {
    type Err = RelationKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RelationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| RelationKindError(s.to_string()))
    }
}

/// A directed, typed edge between two entities.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Relationship {
    pub source: Entity,
    pub target: Entity,
    pub kind: RelationKind,
}

impl Relationship {
    pub fn new(source: impl Into<Entity>, target: impl Into<Entity>, kind: RelationKind) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
        }
    }

    /// The same edge seen from the other end.
    pub fn inverse(&self) -> Self {
        Self {
            source: self.target.clone(),
            target: self.source.clone(),
            kind: self.kind.inverse(),
        }
    }
}

impl Display for Relationship {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -[{}]-> {}", self.source, self.kind, self.target)
    }
}
