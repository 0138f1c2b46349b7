// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core data types of the depot data repository.
//!
//! A depot holds a hierarchy of business objects: projects contain collections, collections contain
//! sub-collections and data items, data items contain data files and any object can be described by
//! metadata files. Actors (people) are linked to projects as administrators and to collections as
//! depositors.
//!
//! All of these links are expressed as typed, directed [`Relationship`]s between [`Entity`]
//! identifiers. Relationship kinds always come in inverse pairs, see [`RelationKind::inverse`].
mod actor;
mod identity;
mod object;
mod relation;

pub use actor::{Actor, RegistrationStatus, Role};
pub use identity::{ActorId, Entity, ObjectId};
pub use object::{BusinessObject, ObjectKind};
pub use relation::{RelationKind, RelationKindError, Relationship};
