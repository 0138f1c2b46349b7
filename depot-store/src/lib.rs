// SPDX-License-Identifier: MIT OR Apache-2.0

#![cfg_attr(doctest, doc=include_str!("../README.md"))]

//! Interfaces and in-memory implementations of the stores the depot authorization engine reads
//! from.
//!
//! The central piece is the [`RelationshipGraph`]: a store of typed, directed edges between actors
//! and business objects. Edges always exist in pairs (see `RelationKind::inverse`), implementations
//! add and remove both directions of a pair atomically through the single `add_relation` and
//! `remove_relation` entry points. Queries for unknown identifiers return empty results instead of
//! errors, "never linked" and "unlinked again" look the same to readers.
//!
//! Named traversal primitives ("who administers this project", "what is the parent collection of
//! this collection") and typed mutators are provided for every graph by the [`GraphQuery`]
//! extension trait.
//!
//! Next to the graph two read-only collaborators are defined: the [`ActorDirectory`] resolving an
//! actor id to a role snapshot and the [`ObjectCatalog`] resolving an object id to its kind.
//!
//! An in-memory implementation of all three interfaces is provided behind the `memory` feature
//! flag, which is enabled by default.
#[cfg(feature = "memory")]
pub mod memory;
mod query;
mod traits;

#[cfg(feature = "memory")]
pub use memory::{MemoryCatalog, MemoryDirectory, MemoryGraph};
pub use query::GraphQuery;
pub use traits::{
    ActorDirectory, CatalogError, DirectoryError, GraphError, ObjectCatalog, RelationshipGraph,
};
