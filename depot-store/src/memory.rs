// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory relationship graph, actor directory and object catalog.
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use depot_core::{Actor, ActorId, BusinessObject, Entity, ObjectId, RelationKind, Relationship};
use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use tracing::trace;

use crate::traits::{
    ActorDirectory, CatalogError, DirectoryError, GraphError, ObjectCatalog, RelationshipGraph,
};

/// Edge storage of the in-memory graph.
///
/// Entities are petgraph nodes, every relationship is a pair of petgraph edges weighted with the
/// relation kind: `source -> target` and `target -> source` with the inverse kind. The outgoing
/// edges of a node are therefore both the forward index keyed by `(source, kind)` and the inverse
/// index keyed by `(target, inverse kind)`.
#[derive(Clone, Debug, Default)]
pub struct InnerMemoryGraph {
    graph: StableDiGraph<Entity, RelationKind>,
    nodes: HashMap<Entity, NodeIndex>,
}

impl InnerMemoryGraph {
    fn node(&self, entity: &Entity) -> Option<NodeIndex> {
        self.nodes.get(entity).copied()
    }

    fn node_or_insert(&mut self, entity: &Entity) -> NodeIndex {
        if let Some(index) = self.node(entity) {
            return index;
        }
        let index = self.graph.add_node(entity.clone());
        self.nodes.insert(entity.clone(), index);
        index
    }

    fn find_edge(&self, from: NodeIndex, to: NodeIndex, kind: RelationKind) -> Option<EdgeIndex> {
        self.graph
            .edges_directed(from, Direction::Outgoing)
            .find(|edge| edge.target() == to && *edge.weight() == kind)
            .map(|edge| edge.id())
    }

    fn outgoing(&self, entity: &Entity) -> impl Iterator<Item = (RelationKind, &Entity)> {
        self.node(entity).into_iter().flat_map(move |index| {
            self.graph
                .edges_directed(index, Direction::Outgoing)
                .map(move |edge| (*edge.weight(), &self.graph[edge.target()]))
        })
    }

    /// Remove a node once the last edge pair touching it is gone.
    fn prune(&mut self, index: NodeIndex) {
        if !self.graph.contains_node(index) {
            return;
        }
        if self.graph.neighbors_undirected(index).next().is_none() {
            if let Some(entity) = self.graph.remove_node(index) {
                self.nodes.remove(&entity);
            }
        }
    }

    /// Check that `child` may be linked to `container` with a child-to-parent edge of the given
    /// kind.
    ///
    /// Every object has at most one container (a collection lives either in one project or in one
    /// parent collection) and every metadata file describes at most one object. The sub-collection
    /// hierarchy stays acyclic.
    fn check_containment(
        &self,
        child: &Entity,
        container: &Entity,
        kind: RelationKind,
    ) -> Result<(), GraphError> {
        if let Some((_, existing)) = self.outgoing(child).find(|(existing_kind, existing)| {
            existing_kind.is_child_to_parent()
                && existing_kind.is_child_to_container() == kind.is_child_to_container()
                && (*existing_kind != kind || *existing != container)
        }) {
            return Err(GraphError::MultipleContainers {
                child: child.clone(),
                existing: existing.clone(),
            });
        }

        if kind == RelationKind::IsSubcollectionOf {
            let mut visited = HashSet::new();
            let mut frontier = vec![container];
            while let Some(current) = frontier.pop() {
                if current == child {
                    return Err(GraphError::ContainmentCycle {
                        container: container.clone(),
                        child: child.clone(),
                    });
                }
                if !visited.insert(current) {
                    continue;
                }
                frontier.extend(
                    self.outgoing(current)
                        .filter(|(kind, _)| *kind == RelationKind::IsSubcollectionOf)
                        .map(|(_, parent)| parent),
                );
            }
        }

        Ok(())
    }
}

/// An in-memory relationship graph.
///
/// `MemoryGraph` supports usage in multi-threaded contexts by wrapping an `InnerMemoryGraph` with
/// an `RwLock` and `Arc`. Clones share the same edges. Every call takes the lock once, so each
/// query sees a consistent snapshot and every mutation is atomic.
#[derive(Clone, Debug, Default)]
pub struct MemoryGraph {
    inner: Arc<RwLock<InnerMemoryGraph>>,
}

impl MemoryGraph {
    /// Create a new in-memory graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Obtain a read-lock on the graph.
    pub fn read_graph(&self) -> RwLockReadGuard<'_, InnerMemoryGraph> {
        self.inner
            .read()
            .expect("acquire shared read access on graph")
    }

    /// Obtain a write-lock on the graph.
    pub fn write_graph(&self) -> RwLockWriteGuard<'_, InnerMemoryGraph> {
        self.inner
            .write()
            .expect("acquire exclusive write access on graph")
    }

    /// Number of stored edges, counting both directions of a pair.
    pub fn edge_count(&self) -> usize {
        self.read_graph().graph.edge_count()
    }

    /// Number of entities with at least one relationship.
    pub fn entity_count(&self) -> usize {
        self.read_graph().graph.node_count()
    }
}

impl RelationshipGraph for MemoryGraph {
    fn add_relation(
        &mut self,
        source: &Entity,
        target: &Entity,
        kind: RelationKind,
    ) -> Result<bool, GraphError> {
        if source == target || !kind.accepts(source, target) {
            return Err(GraphError::InvalidEndpoints {
                kind,
                start: source.clone(),
                end: target.clone(),
            });
        }

        let mut graph = self.write_graph();

        if kind.is_child_to_parent() {
            graph.check_containment(source, target, kind)?;
        } else if kind.is_parent_to_child() {
            graph.check_containment(target, source, kind.inverse())?;
        }

        let from = graph.node_or_insert(source);
        let to = graph.node_or_insert(target);
        if graph.find_edge(from, to, kind).is_some() {
            return Ok(false);
        }

        graph.graph.add_edge(from, to, kind);
        graph.graph.add_edge(to, from, kind.inverse());
        trace!(%source, %target, %kind, "added relation");

        Ok(true)
    }

    fn remove_relation(
        &mut self,
        source: &Entity,
        target: &Entity,
        kind: RelationKind,
    ) -> Result<bool, GraphError> {
        let mut graph = self.write_graph();

        let (Some(from), Some(to)) = (graph.node(source), graph.node(target)) else {
            return Ok(false);
        };

        let forward = graph.find_edge(from, to, kind);
        let backward = graph.find_edge(to, from, kind.inverse());
        let removed = forward.is_some() || backward.is_some();

        for edge in [forward, backward].into_iter().flatten() {
            graph.graph.remove_edge(edge);
        }
        graph.prune(from);
        graph.prune(to);

        if removed {
            trace!(%source, %target, %kind, "removed relation");
        }

        Ok(removed)
    }

    fn relations(
        &self,
        id: &Entity,
    ) -> Result<HashMap<RelationKind, HashSet<Relationship>>, GraphError> {
        let graph = self.read_graph();
        let mut relations: HashMap<RelationKind, HashSet<Relationship>> = HashMap::new();
        for (kind, target) in graph.outgoing(id) {
            relations
                .entry(kind)
                .or_default()
                .insert(Relationship::new(id.clone(), target.clone(), kind));
        }
        Ok(relations)
    }

    fn relations_of_kind(
        &self,
        id: &Entity,
        kind: RelationKind,
    ) -> Result<HashSet<Relationship>, GraphError> {
        let graph = self.read_graph();
        let relations: HashSet<Relationship> = graph
            .outgoing(id)
            .filter(|(edge_kind, _)| *edge_kind == kind)
            .map(|(_, target)| Relationship::new(id.clone(), target.clone(), kind))
            .collect();
        trace!(%id, %kind, count = relations.len(), "queried relations");
        Ok(relations)
    }
}

/// An in-memory actor directory.
#[derive(Clone, Debug, Default)]
pub struct MemoryDirectory {
    inner: Arc<RwLock<HashMap<ActorId, Actor>>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an actor snapshot.
    pub fn insert_actor(&self, actor: Actor) {
        self.inner
            .write()
            .expect("acquire exclusive write access on directory")
            .insert(actor.id().clone(), actor);
    }

    pub fn remove_actor(&self, id: &ActorId) -> Option<Actor> {
        self.inner
            .write()
            .expect("acquire exclusive write access on directory")
            .remove(id)
    }
}

impl ActorDirectory for MemoryDirectory {
    fn actor(&self, id: &ActorId) -> Result<Option<Actor>, DirectoryError> {
        Ok(self
            .inner
            .read()
            .expect("acquire shared read access on directory")
            .get(id)
            .cloned())
    }
}

/// An in-memory object catalog.
#[derive(Clone, Debug, Default)]
pub struct MemoryCatalog {
    inner: Arc<RwLock<HashMap<ObjectId, BusinessObject>>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an object.
    pub fn insert_object(&self, object: BusinessObject) {
        self.inner
            .write()
            .expect("acquire exclusive write access on catalog")
            .insert(object.id.clone(), object);
    }

    pub fn remove_object(&self, id: &ObjectId) -> Option<BusinessObject> {
        self.inner
            .write()
            .expect("acquire exclusive write access on catalog")
            .remove(id)
    }
}

impl ObjectCatalog for MemoryCatalog {
    fn object(&self, id: &ObjectId) -> Result<Option<BusinessObject>, CatalogError> {
        Ok(self
            .inner
            .read()
            .expect("acquire shared read access on catalog")
            .get(id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use depot_core::{Actor, ActorId, BusinessObject, Entity, ObjectId, RelationKind};

    use crate::traits::{ActorDirectory, GraphError, ObjectCatalog, RelationshipGraph};
    use crate::GraphQuery;

    use super::{MemoryCatalog, MemoryDirectory, MemoryGraph};

    fn object(id: &str) -> Entity {
        Entity::from(ObjectId::from(id))
    }

    fn actor(id: &str) -> Entity {
        Entity::from(ActorId::from(id))
    }

    #[test]
    fn inverse_edge_is_added_atomically() {
        let mut graph = MemoryGraph::new();
        let inserted = graph
            .add_relation(&actor("alice"), &object("c"), RelationKind::IsDepositorFor)
            .unwrap();
        assert!(inserted);
        assert_eq!(graph.edge_count(), 2);

        let inverse = graph
            .relations_of_kind(&object("c"), RelationKind::AcceptsDeposit)
            .unwrap();
        assert_eq!(inverse.len(), 1);
        let relationship = inverse.into_iter().next().unwrap();
        assert_eq!(relationship.target, actor("alice"));
    }

    #[test]
    fn adding_the_same_relation_twice_is_idempotent() {
        let mut graph = MemoryGraph::new();
        let project = ObjectId::from("p");
        let admin = ActorId::from("a1");

        assert!(graph.add_administrator(&admin, &project).unwrap());
        assert!(!graph.add_administrator(&admin, &project).unwrap());

        // Adding the inverse direction is the same relationship.
        assert!(
            !graph
                .add_relation(&object("p"), &actor("a1"), RelationKind::IsAdministeredBy)
                .unwrap()
        );

        assert_eq!(graph.administrators_of(&project).unwrap().len(), 1);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn removal_is_symmetric() {
        let mut graph = MemoryGraph::new();
        let collection = ObjectId::from("c");
        let depositor = ActorId::from("d");

        graph.add_depositor(&depositor, &collection).unwrap();

        // Removing through the inverse kind drops both edges.
        let removed = graph
            .remove_relation(&object("c"), &actor("d"), RelationKind::AcceptsDeposit)
            .unwrap();
        assert!(removed);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.entity_count(), 0);
        assert!(graph.depositors_of(&collection).unwrap().is_empty());

        assert!(!graph.remove_depositor(&depositor, &collection).unwrap());
    }

    #[test]
    fn relations_are_grouped_by_kind() {
        let mut graph = MemoryGraph::new();
        let project = ObjectId::from("p");

        graph.add_administrator(&"a1".into(), &project).unwrap();
        graph.add_administrator(&"a2".into(), &project).unwrap();
        graph
            .add_collection_to_project(&project, &"c".into())
            .unwrap();

        let relations = graph.relations(&object("p")).unwrap();
        assert_eq!(relations.len(), 2);
        assert_eq!(relations[&RelationKind::IsAdministeredBy].len(), 2);
        assert_eq!(relations[&RelationKind::Aggregates].len(), 1);
        assert!(graph.relations(&object("unknown")).unwrap().is_empty());
    }

    #[test]
    fn rejects_mismatching_endpoints() {
        let mut graph = MemoryGraph::new();

        assert_matches!(
            graph.add_relation(&object("p"), &object("c"), RelationKind::IsAdministratorFor),
            Err(GraphError::InvalidEndpoints { .. })
        );
        assert_matches!(
            graph.add_relation(&actor("a"), &object("c"), RelationKind::HasSubcollection),
            Err(GraphError::InvalidEndpoints { .. })
        );
        assert_eq!(graph.entity_count(), 0);
    }

    #[test]
    fn collection_has_one_parent_project_xor_one_parent_collection() {
        let mut graph = MemoryGraph::new();
        let project = ObjectId::from("p");
        let other_project = ObjectId::from("q");
        let root = ObjectId::from("c1");
        let sub = ObjectId::from("c2");

        graph.add_collection_to_project(&project, &root).unwrap();
        graph.add_subcollection(&root, &sub).unwrap();

        // A second project for the root collection.
        assert_matches!(
            graph.add_collection_to_project(&other_project, &root),
            Err(GraphError::MultipleContainers { .. })
        );

        // A project for a collection which already has a parent collection.
        assert_matches!(
            graph.add_collection_to_project(&project, &sub),
            Err(GraphError::MultipleContainers { .. })
        );

        // A second parent collection.
        let other_root = ObjectId::from("c3");
        graph
            .add_collection_to_project(&project, &other_root)
            .unwrap();
        assert_matches!(
            graph.add_subcollection(&other_root, &sub),
            Err(GraphError::MultipleContainers { .. })
        );

        // Re-adding the existing placement is fine.
        assert!(!graph.add_subcollection(&root, &sub).unwrap());
    }

    #[test]
    fn metadata_file_describes_one_object() {
        let mut graph = MemoryGraph::new();
        let collection = ObjectId::from("c");
        let item = ObjectId::from("item1");
        let other_item = ObjectId::from("item2");
        let metadata = ObjectId::from("m");

        graph.add_data_item(&collection, &item).unwrap();
        graph.add_data_item(&collection, &other_item).unwrap();
        assert!(graph.add_metadata_file(&item, &metadata).unwrap());
        assert!(!graph.add_metadata_file(&item, &metadata).unwrap());

        assert_matches!(
            graph.add_metadata_file(&other_item, &metadata),
            Err(GraphError::MultipleContainers { .. })
        );
        assert_eq!(graph.described_object_of(&metadata).unwrap(), Some(item.clone()));
        assert!(graph.metadata_files_of(&other_item).unwrap().is_empty());

        // Describing an object does not count as a container of the described object.
        let file = ObjectId::from("file");
        graph.add_data_file(&item, &file).unwrap();
        graph
            .add_metadata_file(&file, &ObjectId::from("file-metadata"))
            .unwrap();
        assert_eq!(graph.data_item_of_data_file(&file).unwrap(), Some(item));
    }

    #[test]
    fn rejects_containment_cycles() {
        let mut graph = MemoryGraph::new();
        let a = ObjectId::from("a");
        let b = ObjectId::from("b");
        let c = ObjectId::from("c");

        graph.add_subcollection(&a, &b).unwrap();
        graph.add_subcollection(&b, &c).unwrap();

        assert_matches!(
            graph.add_subcollection(&c, &a),
            Err(GraphError::ContainmentCycle { .. })
        );
        assert_matches!(
            graph.add_subcollection(&a, &a),
            Err(GraphError::InvalidEndpoints { .. })
        );
        assert!(graph.super_collection_ids_of(&a).unwrap().is_empty());
    }

    #[test]
    fn clones_share_edges() {
        let mut writer = MemoryGraph::new();
        let reader = writer.clone();

        writer
            .add_depositor(&"d".into(), &"c".into())
            .unwrap();
        assert_eq!(reader.depositors_of(&"c".into()).unwrap().len(), 1);
    }

    #[test]
    fn directory_and_catalog_lookups() {
        let directory = MemoryDirectory::new();
        directory.insert_actor(Actor::instance_admin("root"));

        assert!(
            directory
                .actor(&"root".into())
                .unwrap()
                .unwrap()
                .is_instance_admin()
        );
        assert_eq!(directory.actor(&"ghost".into()).unwrap(), None);
        assert!(directory.remove_actor(&"root".into()).is_some());
        assert_eq!(directory.actor(&"root".into()).unwrap(), None);

        let catalog = MemoryCatalog::new();
        catalog.insert_object(BusinessObject::collection("c"));

        assert_eq!(
            catalog.object(&"c".into()).unwrap(),
            Some(BusinessObject::collection("c"))
        );
        assert_eq!(catalog.object(&"p".into()).unwrap(), None);
    }
}
