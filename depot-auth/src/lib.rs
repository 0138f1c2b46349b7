// SPDX-License-Identifier: MIT OR Apache-2.0

#![cfg_attr(doctest, doc=include_str!("../README.md"))]

//! Authorization decisions for the depot data repository.
//!
//! Every decision is a function of the requesting [`Actor`](depot_core::Actor) (if any), the
//! target [`BusinessObject`](depot_core::BusinessObject) (if any) and the relationships recorded
//! in a [`RelationshipGraph`](depot_store::RelationshipGraph):
//!
//! - retrievals of collections, data items and files are public,
//! - instance administrators may do everything except removing themselves as administrators or
//!   depositors,
//! - project administrators manage their project, its collections and its depositors,
//! - depositors deposit into their collections and into every collection below them.
//!
//! [`PermissionPolicy`] evaluates decisions on resolved objects, [`Authorization`] additionally
//! resolves identifiers through an [`ObjectCatalog`](depot_store::ObjectCatalog) and an
//! [`ActorDirectory`](depot_store::ActorDirectory).
//!
//! ```
//! use depot_auth::{Authorization, Config, PermissionPolicy};
//! use depot_core::{Actor, BusinessObject};
//! use depot_store::{GraphQuery, MemoryCatalog, MemoryDirectory, MemoryGraph};
//!
//! let mut graph = MemoryGraph::new();
//! let directory = MemoryDirectory::new();
//! let catalog = MemoryCatalog::new();
//!
//! let alice = Actor::regular("alice");
//! directory.insert_actor(alice.clone());
//!
//! let project = BusinessObject::project("project");
//! let collection = BusinessObject::collection("collection");
//! catalog.insert_object(project.clone());
//! catalog.insert_object(collection.clone());
//!
//! graph.add_collection_to_project(&project.id, &collection.id)?;
//! graph.add_administrator(alice.id(), &project.id)?;
//!
//! let policy = PermissionPolicy::new(graph, directory, Config::default());
//! let auth = Authorization::new(policy, catalog);
//!
//! assert!(auth.can_retrieve_collection(None, Some(&collection)));
//! assert!(auth.can_update_collection(Some(&alice), Some(&collection))?);
//! assert!(auth.can_deposit_to_collection_by_id(Some(alice.id()), &collection.id)?);
//! assert!(!auth.can_create_project(Some(&alice))?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
mod config;
mod error;
mod facade;
mod guard;
mod policy;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
#[cfg(test)]
mod tests;
mod walk;

pub use config::{Config, DEFAULT_MAX_WALK_DEPTH, FailurePolicy};
pub use error::AuthError;
pub use facade::Authorization;
pub use policy::PermissionPolicy;
