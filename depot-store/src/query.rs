// SPDX-License-Identifier: MIT OR Apache-2.0

//! Named traversal primitives and typed mutators on top of any [`RelationshipGraph`].
use std::collections::{BTreeSet, HashSet};

use depot_core::{ActorId, Entity, ObjectId, RelationKind};
use tracing::warn;

use crate::traits::{GraphError, RelationshipGraph};

/// Extension trait adding domain queries to every relationship graph.
///
/// All queries only follow _direct_ edges. Anything which needs to walk the collection hierarchy
/// (ancestor depositors, the project of a nested collection) is policy and lives with the
/// authorization engine.
pub trait GraphQuery: RelationshipGraph {
    /// Actors linked to the given project as administrators.
    fn administrators_of(&self, project: &ObjectId) -> Result<HashSet<ActorId>, GraphError> {
        actors(self, &project.into(), RelationKind::IsAdministeredBy)
    }

    /// Projects the given actor administers.
    fn projects_administered_by(&self, actor: &ActorId) -> Result<HashSet<ObjectId>, GraphError> {
        objects(self, &actor.into(), RelationKind::IsAdministratorFor)
    }

    /// Actors linked to exactly this collection as depositors.
    fn depositors_of(&self, collection: &ObjectId) -> Result<HashSet<ActorId>, GraphError> {
        actors(self, &collection.into(), RelationKind::AcceptsDeposit)
    }

    /// Collections the given actor is directly linked to as depositor.
    fn collections_accepting_deposits_from(
        &self,
        actor: &ActorId,
    ) -> Result<HashSet<ObjectId>, GraphError> {
        objects(self, &actor.into(), RelationKind::IsDepositorFor)
    }

    /// Project the collection was placed in. Sub-collections have no parent project of their own.
    fn parent_project_of(&self, collection: &ObjectId) -> Result<Option<ObjectId>, GraphError> {
        single_container(self, collection, RelationKind::IsAggregatedBy)
    }

    /// Immediate parent collections. By construction this holds at most one id.
    fn super_collection_ids_of(
        &self,
        collection: &ObjectId,
    ) -> Result<HashSet<ObjectId>, GraphError> {
        objects(self, &collection.into(), RelationKind::IsSubcollectionOf)
    }

    /// Immediate child collections.
    fn sub_collection_ids_of(
        &self,
        collection: &ObjectId,
    ) -> Result<HashSet<ObjectId>, GraphError> {
        objects(self, &collection.into(), RelationKind::HasSubcollection)
    }

    /// Collections placed directly in the given project.
    fn collections_of_project(&self, project: &ObjectId) -> Result<HashSet<ObjectId>, GraphError> {
        objects(self, &project.into(), RelationKind::Aggregates)
    }

    fn collection_of_data_item(
        &self,
        data_item: &ObjectId,
    ) -> Result<Option<ObjectId>, GraphError> {
        single_container(self, data_item, RelationKind::IsAggregatedBy)
    }

    fn data_items_of(&self, collection: &ObjectId) -> Result<HashSet<ObjectId>, GraphError> {
        objects(self, &collection.into(), RelationKind::Aggregates)
    }

    fn data_item_of_data_file(
        &self,
        data_file: &ObjectId,
    ) -> Result<Option<ObjectId>, GraphError> {
        single_container(self, data_file, RelationKind::IsAggregatedBy)
    }

    fn data_files_of(&self, data_item: &ObjectId) -> Result<HashSet<ObjectId>, GraphError> {
        objects(self, &data_item.into(), RelationKind::Aggregates)
    }

    fn metadata_files_of(&self, object: &ObjectId) -> Result<HashSet<ObjectId>, GraphError> {
        objects(self, &object.into(), RelationKind::HasMetadataFile)
    }

    /// Object a metadata file describes.
    fn described_object_of(
        &self,
        metadata_file: &ObjectId,
    ) -> Result<Option<ObjectId>, GraphError> {
        single_container(self, metadata_file, RelationKind::IsMetadataFor)
    }

    fn add_administrator(
        &mut self,
        actor: &ActorId,
        project: &ObjectId,
    ) -> Result<bool, GraphError> {
        self.add_relation(
            &actor.into(),
            &project.into(),
            RelationKind::IsAdministratorFor,
        )
    }

    fn remove_administrator(
        &mut self,
        actor: &ActorId,
        project: &ObjectId,
    ) -> Result<bool, GraphError> {
        self.remove_relation(
            &actor.into(),
            &project.into(),
            RelationKind::IsAdministratorFor,
        )
    }

    fn add_depositor(
        &mut self,
        actor: &ActorId,
        collection: &ObjectId,
    ) -> Result<bool, GraphError> {
        self.add_relation(
            &actor.into(),
            &collection.into(),
            RelationKind::IsDepositorFor,
        )
    }

    fn remove_depositor(
        &mut self,
        actor: &ActorId,
        collection: &ObjectId,
    ) -> Result<bool, GraphError> {
        self.remove_relation(
            &actor.into(),
            &collection.into(),
            RelationKind::IsDepositorFor,
        )
    }

    fn add_collection_to_project(
        &mut self,
        project: &ObjectId,
        collection: &ObjectId,
    ) -> Result<bool, GraphError> {
        self.add_relation(
            &project.into(),
            &collection.into(),
            RelationKind::Aggregates,
        )
    }

    fn add_subcollection(
        &mut self,
        parent: &ObjectId,
        child: &ObjectId,
    ) -> Result<bool, GraphError> {
        self.add_relation(
            &parent.into(),
            &child.into(),
            RelationKind::HasSubcollection,
        )
    }

    fn add_data_item(
        &mut self,
        collection: &ObjectId,
        data_item: &ObjectId,
    ) -> Result<bool, GraphError> {
        self.add_relation(
            &collection.into(),
            &data_item.into(),
            RelationKind::Aggregates,
        )
    }

    fn add_data_file(
        &mut self,
        data_item: &ObjectId,
        data_file: &ObjectId,
    ) -> Result<bool, GraphError> {
        self.add_relation(
            &data_item.into(),
            &data_file.into(),
            RelationKind::Aggregates,
        )
    }

    fn add_metadata_file(
        &mut self,
        object: &ObjectId,
        metadata_file: &ObjectId,
    ) -> Result<bool, GraphError> {
        self.add_relation(
            &object.into(),
            &metadata_file.into(),
            RelationKind::HasMetadataFile,
        )
    }

    /// Remove every edge pair touching the given entity, for example when a business object gets
    /// deleted.
    ///
    /// Returns the number of removed pairs.
    fn remove_entity(&mut self, entity: &Entity) -> Result<usize, GraphError> {
        let mut removed = 0;
        for relationships in self.relations(entity)?.into_values() {
            for relationship in relationships {
                if self.remove_relation(
                    &relationship.source,
                    &relationship.target,
                    relationship.kind,
                )? {
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }
}

impl<G> GraphQuery for G where G: RelationshipGraph + ?Sized {}

fn actors<G>(graph: &G, id: &Entity, kind: RelationKind) -> Result<HashSet<ActorId>, GraphError>
where
    G: RelationshipGraph + ?Sized,
{
    Ok(graph
        .relations_of_kind(id, kind)?
        .into_iter()
        .filter_map(|relationship| relationship.target.as_actor().cloned())
        .collect())
}

fn objects<G>(graph: &G, id: &Entity, kind: RelationKind) -> Result<HashSet<ObjectId>, GraphError>
where
    G: RelationshipGraph + ?Sized,
{
    Ok(graph
        .relations_of_kind(id, kind)?
        .into_iter()
        .filter_map(|relationship| relationship.target.as_object().cloned())
        .collect())
}

/// Follow a single-parent edge.
///
/// The store enforces one container per object on write. If a store holds more than one anyway,
/// the smallest id is returned so the answer stays deterministic.
fn single_container<G>(
    graph: &G,
    child: &ObjectId,
    kind: RelationKind,
) -> Result<Option<ObjectId>, GraphError>
where
    G: RelationshipGraph + ?Sized,
{
    let containers: BTreeSet<ObjectId> = objects(graph, &child.into(), kind)?
        .into_iter()
        .collect();

    if containers.len() > 1 {
        warn!(
            %child,
            %kind,
            count = containers.len(),
            "object has more than one container"
        );
    }

    Ok(containers.into_iter().next())
}
