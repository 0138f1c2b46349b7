// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities.
use std::collections::{HashMap, HashSet};

use depot_core::{
    Actor, ActorId, BusinessObject, Entity, ObjectId, ObjectKind, RelationKind, Relationship,
};
use depot_store::{
    ActorDirectory, CatalogError, DirectoryError, GraphError, GraphQuery, MemoryCatalog,
    MemoryDirectory, MemoryGraph, ObjectCatalog, RelationshipGraph,
};

use crate::{Authorization, Config, PermissionPolicy};

pub fn setup_logging() {
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }
}

/// A depot with in-memory stores and helpers to populate them.
#[derive(Clone, Debug, Default)]
pub struct TestDepot {
    pub graph: MemoryGraph,
    pub directory: MemoryDirectory,
    pub catalog: MemoryCatalog,
}

impl TestDepot {
    pub fn new() -> Self {
        setup_logging();
        Self::default()
    }

    /// Register an approved regular user.
    pub fn user(&self, id: &str) -> Actor {
        let actor = Actor::regular(id);
        self.directory.insert_actor(actor.clone());
        actor
    }

    /// Register an approved instance administrator.
    pub fn instance_admin(&self, id: &str) -> Actor {
        let actor = Actor::instance_admin(id);
        self.directory.insert_actor(actor.clone());
        actor
    }

    pub fn project(&mut self, id: &str, administrators: &[&Actor]) -> BusinessObject {
        let project = self.object(id, ObjectKind::Project);
        for administrator in administrators {
            self.graph
                .add_administrator(administrator.id(), &project.id)
                .expect("add administrator");
        }
        project
    }

    pub fn collection(&mut self, project: &BusinessObject, id: &str) -> BusinessObject {
        let collection = self.object(id, ObjectKind::Collection);
        self.graph
            .add_collection_to_project(&project.id, &collection.id)
            .expect("add collection to project");
        collection
    }

    pub fn subcollection(&mut self, parent: &BusinessObject, id: &str) -> BusinessObject {
        let collection = self.object(id, ObjectKind::Collection);
        self.graph
            .add_subcollection(&parent.id, &collection.id)
            .expect("add sub-collection");
        collection
    }

    pub fn data_item(&mut self, collection: &BusinessObject, id: &str) -> BusinessObject {
        let item = self.object(id, ObjectKind::DataItem);
        self.graph
            .add_data_item(&collection.id, &item.id)
            .expect("add data item");
        item
    }

    pub fn data_file(&mut self, item: &BusinessObject, id: &str) -> BusinessObject {
        let file = self.object(id, ObjectKind::DataFile);
        self.graph
            .add_data_file(&item.id, &file.id)
            .expect("add data file");
        file
    }

    pub fn metadata_file(&mut self, described: &BusinessObject, id: &str) -> BusinessObject {
        let file = self.object(id, ObjectKind::MetadataFile);
        self.graph
            .add_metadata_file(&described.id, &file.id)
            .expect("add metadata file");
        file
    }

    pub fn depositor(&mut self, actor: &Actor, collection: &BusinessObject) {
        self.graph
            .add_depositor(actor.id(), &collection.id)
            .expect("add depositor");
    }

    pub fn policy(&self) -> PermissionPolicy<MemoryGraph, MemoryDirectory> {
        self.policy_with(Config::default())
    }

    pub fn policy_with(&self, config: Config) -> PermissionPolicy<MemoryGraph, MemoryDirectory> {
        PermissionPolicy::new(self.graph.clone(), self.directory.clone(), config)
    }

    pub fn authorization(&self) -> Authorization<MemoryGraph, MemoryDirectory, MemoryCatalog> {
        Authorization::new(self.policy(), self.catalog.clone())
    }

    fn object(&self, id: &str, kind: ObjectKind) -> BusinessObject {
        let object = BusinessObject::new(id, kind);
        self.catalog.insert_object(object.clone());
        object
    }
}

/// Relationship graph whose backend is down.
#[derive(Clone, Debug, Default)]
pub struct FailingGraph;

impl RelationshipGraph for FailingGraph {
    fn add_relation(
        &mut self,
        _: &Entity,
        _: &Entity,
        _: RelationKind,
    ) -> Result<bool, GraphError> {
        Err(unavailable())
    }

    fn remove_relation(
        &mut self,
        _: &Entity,
        _: &Entity,
        _: RelationKind,
    ) -> Result<bool, GraphError> {
        Err(unavailable())
    }

    fn relations(
        &self,
        _: &Entity,
    ) -> Result<HashMap<RelationKind, HashSet<Relationship>>, GraphError> {
        Err(unavailable())
    }

    fn relations_of_kind(
        &self,
        _: &Entity,
        _: RelationKind,
    ) -> Result<HashSet<Relationship>, GraphError> {
        Err(unavailable())
    }
}

fn unavailable() -> GraphError {
    GraphError::Backend("connection refused".to_string())
}

/// Actor directory whose backend is down.
#[derive(Clone, Debug, Default)]
pub struct FailingDirectory;

impl ActorDirectory for FailingDirectory {
    fn actor(&self, _: &ActorId) -> Result<Option<Actor>, DirectoryError> {
        Err(DirectoryError::Backend("connection refused".to_string()))
    }
}

/// Object catalog whose backend is down.
#[derive(Clone, Debug, Default)]
pub struct FailingCatalog;

impl ObjectCatalog for FailingCatalog {
    fn object(&self, _: &ObjectId) -> Result<Option<BusinessObject>, CatalogError> {
        Err(CatalogError::Backend("connection refused".to_string()))
    }
}

/// Read-only graph in which the given collections form a ring: every collection is a
/// sub-collection of the next one and the last one is a sub-collection of the first.
///
/// The store implementations refuse to build such a hierarchy, this stands in for a corrupted
/// backend.
#[derive(Clone, Debug)]
pub struct CyclicGraph {
    ring: Vec<ObjectId>,
}

impl CyclicGraph {
    pub fn new(ring: &[&str]) -> Self {
        Self {
            ring: ring.iter().map(|id| ObjectId::from(*id)).collect(),
        }
    }

    fn neighbour(&self, id: &ObjectId, offset: usize) -> Option<&ObjectId> {
        let position = self.ring.iter().position(|member| member == id)?;
        self.ring.get((position + offset) % self.ring.len())
    }
}

impl RelationshipGraph for CyclicGraph {
    fn add_relation(
        &mut self,
        _: &Entity,
        _: &Entity,
        _: RelationKind,
    ) -> Result<bool, GraphError> {
        Err(GraphError::Backend("read-only".to_string()))
    }

    fn remove_relation(
        &mut self,
        _: &Entity,
        _: &Entity,
        _: RelationKind,
    ) -> Result<bool, GraphError> {
        Err(GraphError::Backend("read-only".to_string()))
    }

    fn relations(
        &self,
        id: &Entity,
    ) -> Result<HashMap<RelationKind, HashSet<Relationship>>, GraphError> {
        let mut relations = HashMap::new();
        for kind in [RelationKind::IsSubcollectionOf, RelationKind::HasSubcollection] {
            let of_kind = self.relations_of_kind(id, kind)?;
            if !of_kind.is_empty() {
                relations.insert(kind, of_kind);
            }
        }
        Ok(relations)
    }

    fn relations_of_kind(
        &self,
        id: &Entity,
        kind: RelationKind,
    ) -> Result<HashSet<Relationship>, GraphError> {
        let Some(object) = id.as_object() else {
            return Ok(HashSet::new());
        };
        let previous = self.ring.len().saturating_sub(1);
        let neighbour = match kind {
            RelationKind::IsSubcollectionOf => self.neighbour(object, 1),
            RelationKind::HasSubcollection => self.neighbour(object, previous),
            _ => None,
        };
        Ok(neighbour
            .map(|neighbour| Relationship::new(object.clone(), neighbour.clone(), kind))
            .into_iter()
            .collect())
    }
}
