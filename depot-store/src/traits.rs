// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::{HashMap, HashSet};

use depot_core::{Actor, ActorId, BusinessObject, Entity, ObjectId, RelationKind, Relationship};
use thiserror::Error;

/// Storage of typed, directed edges between entities.
pub trait RelationshipGraph {
    /// Insert an edge together with its inverse.
    ///
    /// Returns `true` when the insert occurred, or `false` when the edge already existed and no
    /// insertion occurred.
    fn add_relation(
        &mut self,
        source: &Entity,
        target: &Entity,
        kind: RelationKind,
    ) -> Result<bool, GraphError>;

    /// Remove an edge together with its inverse.
    ///
    /// Returns `true` when the removal occurred and `false` when the edge was not found.
    fn remove_relation(
        &mut self,
        source: &Entity,
        target: &Entity,
        kind: RelationKind,
    ) -> Result<bool, GraphError>;

    /// All edges starting at the given entity, grouped by kind.
    fn relations(
        &self,
        id: &Entity,
    ) -> Result<HashMap<RelationKind, HashSet<Relationship>>, GraphError>;

    /// All edges of one kind starting at the given entity.
    fn relations_of_kind(
        &self,
        id: &Entity,
        kind: RelationKind,
    ) -> Result<HashSet<Relationship>, GraphError>;
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("{kind} can not connect {start} to {end}")]
    InvalidEndpoints {
        kind: RelationKind,
        start: Entity,
        end: Entity,
    },

    #[error("{child} is already contained in {existing}")]
    MultipleContainers { child: Entity, existing: Entity },

    #[error("placing {child} into {container} would create a containment cycle")]
    ContainmentCycle { container: Entity, child: Entity },

    #[error("relationship store backend failed: {0}")]
    Backend(String),
}

/// Read-only access to actor snapshots.
pub trait ActorDirectory {
    /// Look up an actor. Returns `None` for actors which were never registered.
    fn actor(&self, id: &ActorId) -> Result<Option<Actor>, DirectoryError>;
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("actor directory backend failed: {0}")]
    Backend(String),
}

/// Read-only access to business objects, supplied by the surrounding service layer.
pub trait ObjectCatalog {
    /// Look up an object. Returns `None` for unknown or deleted objects.
    fn object(&self, id: &ObjectId) -> Result<Option<BusinessObject>, CatalogError>;
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("object catalog backend failed: {0}")]
    Backend(String),
}
