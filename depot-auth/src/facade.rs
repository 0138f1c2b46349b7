// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entry point for callers which hold identifiers instead of resolved objects.
use std::collections::BTreeSet;

use depot_core::{Actor, ActorId, BusinessObject, ObjectId};
use depot_store::{ActorDirectory, ObjectCatalog, RelationshipGraph};
use tracing::warn;

use crate::error::AuthError;
use crate::policy::PermissionPolicy;

/// Authorization decisions with object and actor resolution in front of them.
///
/// Methods taking resolved objects delegate to the [`PermissionPolicy`] unchanged. The `_by_id`
/// variants first look identifiers up: an unknown object is an absent target and an unknown actor
/// is an anonymous requester. Public reads resolve only the object, the requester's id is accepted
/// but not looked up.
///
/// Public reads never fail. When the catalog can not be reached they answer according to the
/// configured [`FailurePolicy`](crate::FailurePolicy). Restricted actions return the lookup error.
#[derive(Clone, Debug)]
pub struct Authorization<G, D, C> {
    policy: PermissionPolicy<G, D>,
    catalog: C,
}

impl<G, D, C> Authorization<G, D, C>
where
    G: RelationshipGraph,
    D: ActorDirectory,
    C: ObjectCatalog,
{
    pub fn new(policy: PermissionPolicy<G, D>, catalog: C) -> Self {
        Self { policy, catalog }
    }

    pub fn policy(&self) -> &PermissionPolicy<G, D> {
        &self.policy
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn can_retrieve_collection(
        &self,
        actor: Option<&Actor>,
        collection: Option<&BusinessObject>,
    ) -> bool {
        self.policy.can_retrieve_collection(actor, collection)
    }

    pub fn can_retrieve_data_item(
        &self,
        actor: Option<&Actor>,
        data_item: Option<&BusinessObject>,
    ) -> bool {
        self.policy.can_retrieve_data_item(actor, data_item)
    }

    pub fn can_retrieve_data_file(
        &self,
        actor: Option<&Actor>,
        data_file: Option<&BusinessObject>,
    ) -> bool {
        self.policy.can_retrieve_data_file(actor, data_file)
    }

    pub fn can_retrieve_metadata_file(
        &self,
        actor: Option<&Actor>,
        metadata_file: Option<&BusinessObject>,
    ) -> bool {
        self.policy.can_retrieve_metadata_file(actor, metadata_file)
    }

    pub fn can_view_collection_list(&self, actor: Option<&Actor>) -> bool {
        self.policy.can_view_collection_list(actor)
    }

    pub fn can_create_project(&self, actor: Option<&Actor>) -> Result<bool, AuthError> {
        self.policy.can_create_project(actor)
    }

    pub fn can_read_project(
        &self,
        actor: Option<&Actor>,
        project: Option<&BusinessObject>,
    ) -> Result<bool, AuthError> {
        self.policy.can_read_project(actor, project)
    }

    pub fn can_update_project(
        &self,
        actor: Option<&Actor>,
        project: Option<&BusinessObject>,
    ) -> Result<bool, AuthError> {
        self.policy.can_update_project(actor, project)
    }

    pub fn can_list_project_collections(
        &self,
        actor: Option<&Actor>,
        project: Option<&BusinessObject>,
    ) -> Result<bool, AuthError> {
        self.policy.can_list_project_collections(actor, project)
    }

    pub fn can_add_administrator(
        &self,
        actor: Option<&Actor>,
        project: Option<&BusinessObject>,
    ) -> Result<bool, AuthError> {
        self.policy.can_add_administrator(actor, project)
    }

    pub fn can_remove_administrator(
        &self,
        actor: Option<&Actor>,
        administrator: &ActorId,
        project: Option<&BusinessObject>,
    ) -> Result<bool, AuthError> {
        self.policy
            .can_remove_administrator(actor, administrator, project)
    }

    pub fn can_create_collection(
        &self,
        actor: Option<&Actor>,
        container: Option<&BusinessObject>,
    ) -> Result<bool, AuthError> {
        self.policy.can_create_collection(actor, container)
    }

    pub fn can_update_collection(
        &self,
        actor: Option<&Actor>,
        collection: Option<&BusinessObject>,
    ) -> Result<bool, AuthError> {
        self.policy.can_update_collection(actor, collection)
    }

    pub fn can_deposit_to_collection(
        &self,
        actor: Option<&Actor>,
        collection: Option<&BusinessObject>,
    ) -> Result<bool, AuthError> {
        self.policy.can_deposit_to_collection(actor, collection)
    }

    pub fn can_add_depositor(
        &self,
        actor: Option<&Actor>,
        collection: Option<&BusinessObject>,
    ) -> Result<bool, AuthError> {
        self.policy.can_add_depositor(actor, collection)
    }

    pub fn can_remove_depositor(
        &self,
        actor: Option<&Actor>,
        depositor: &ActorId,
        collection: Option<&BusinessObject>,
    ) -> Result<bool, AuthError> {
        self.policy
            .can_remove_depositor(actor, depositor, collection)
    }

    pub fn can_update_data_item(
        &self,
        actor: Option<&Actor>,
        data_item: Option<&BusinessObject>,
    ) -> Result<bool, AuthError> {
        self.policy.can_update_data_item(actor, data_item)
    }

    pub fn can_add_metadata_file(
        &self,
        actor: Option<&Actor>,
        object: Option<&BusinessObject>,
    ) -> Result<bool, AuthError> {
        self.policy.can_add_metadata_file(actor, object)
    }

    pub fn administrators_of(&self, project: &ObjectId) -> Result<BTreeSet<ActorId>, AuthError> {
        self.policy.administrators_of(project)
    }

    pub fn project_of(&self, collection: &ObjectId) -> Result<Option<ObjectId>, AuthError> {
        self.policy.project_of(collection)
    }

    pub fn depositors_of(&self, collection: &ObjectId) -> Result<BTreeSet<ActorId>, AuthError> {
        self.policy.depositors_of(collection)
    }

    pub fn depositable_collections(
        &self,
        actor: &ActorId,
    ) -> Result<BTreeSet<ObjectId>, AuthError> {
        self.policy.depositable_collections(actor)
    }

    pub fn can_retrieve_collection_by_id(&self, actor: Option<&ActorId>, id: &ObjectId) -> bool {
        self.public_by_id(actor, id, |object| {
            self.policy.can_retrieve_collection(None, object)
        })
    }

    pub fn can_retrieve_data_item_by_id(&self, actor: Option<&ActorId>, id: &ObjectId) -> bool {
        self.public_by_id(actor, id, |object| {
            self.policy.can_retrieve_data_item(None, object)
        })
    }

    pub fn can_retrieve_data_file_by_id(&self, actor: Option<&ActorId>, id: &ObjectId) -> bool {
        self.public_by_id(actor, id, |object| {
            self.policy.can_retrieve_data_file(None, object)
        })
    }

    pub fn can_retrieve_metadata_file_by_id(&self, actor: Option<&ActorId>, id: &ObjectId) -> bool {
        self.public_by_id(actor, id, |object| {
            self.policy.can_retrieve_metadata_file(None, object)
        })
    }

    pub fn can_create_project_by_id(&self, actor: Option<&ActorId>) -> Result<bool, AuthError> {
        let actor = self.resolve_actor(actor)?;
        self.policy.can_create_project(actor.as_ref())
    }

    pub fn can_read_project_by_id(
        &self,
        actor: Option<&ActorId>,
        project: &ObjectId,
    ) -> Result<bool, AuthError> {
        let (actor, project) = self.resolve(actor, project)?;
        self.policy.can_read_project(actor.as_ref(), project.as_ref())
    }

    pub fn can_update_project_by_id(
        &self,
        actor: Option<&ActorId>,
        project: &ObjectId,
    ) -> Result<bool, AuthError> {
        let (actor, project) = self.resolve(actor, project)?;
        self.policy
            .can_update_project(actor.as_ref(), project.as_ref())
    }

    pub fn can_list_project_collections_by_id(
        &self,
        actor: Option<&ActorId>,
        project: &ObjectId,
    ) -> Result<bool, AuthError> {
        let (actor, project) = self.resolve(actor, project)?;
        self.policy
            .can_list_project_collections(actor.as_ref(), project.as_ref())
    }

    pub fn can_add_administrator_by_id(
        &self,
        actor: Option<&ActorId>,
        project: &ObjectId,
    ) -> Result<bool, AuthError> {
        let (actor, project) = self.resolve(actor, project)?;
        self.policy
            .can_add_administrator(actor.as_ref(), project.as_ref())
    }

    pub fn can_remove_administrator_by_id(
        &self,
        actor: Option<&ActorId>,
        administrator: &ActorId,
        project: &ObjectId,
    ) -> Result<bool, AuthError> {
        let (actor, project) = self.resolve(actor, project)?;
        self.policy
            .can_remove_administrator(actor.as_ref(), administrator, project.as_ref())
    }

    pub fn can_create_collection_by_id(
        &self,
        actor: Option<&ActorId>,
        container: &ObjectId,
    ) -> Result<bool, AuthError> {
        let (actor, container) = self.resolve(actor, container)?;
        self.policy
            .can_create_collection(actor.as_ref(), container.as_ref())
    }

    pub fn can_update_collection_by_id(
        &self,
        actor: Option<&ActorId>,
        collection: &ObjectId,
    ) -> Result<bool, AuthError> {
        let (actor, collection) = self.resolve(actor, collection)?;
        self.policy
            .can_update_collection(actor.as_ref(), collection.as_ref())
    }

    pub fn can_deposit_to_collection_by_id(
        &self,
        actor: Option<&ActorId>,
        collection: &ObjectId,
    ) -> Result<bool, AuthError> {
        let (actor, collection) = self.resolve(actor, collection)?;
        self.policy
            .can_deposit_to_collection(actor.as_ref(), collection.as_ref())
    }

    pub fn can_add_depositor_by_id(
        &self,
        actor: Option<&ActorId>,
        collection: &ObjectId,
    ) -> Result<bool, AuthError> {
        let (actor, collection) = self.resolve(actor, collection)?;
        self.policy
            .can_add_depositor(actor.as_ref(), collection.as_ref())
    }

    pub fn can_remove_depositor_by_id(
        &self,
        actor: Option<&ActorId>,
        depositor: &ActorId,
        collection: &ObjectId,
    ) -> Result<bool, AuthError> {
        let (actor, collection) = self.resolve(actor, collection)?;
        self.policy
            .can_remove_depositor(actor.as_ref(), depositor, collection.as_ref())
    }

    pub fn can_update_data_item_by_id(
        &self,
        actor: Option<&ActorId>,
        data_item: &ObjectId,
    ) -> Result<bool, AuthError> {
        let (actor, data_item) = self.resolve(actor, data_item)?;
        self.policy
            .can_update_data_item(actor.as_ref(), data_item.as_ref())
    }

    pub fn can_add_metadata_file_by_id(
        &self,
        actor: Option<&ActorId>,
        object: &ObjectId,
    ) -> Result<bool, AuthError> {
        let (actor, object) = self.resolve(actor, object)?;
        self.policy
            .can_add_metadata_file(actor.as_ref(), object.as_ref())
    }

    /// Resolve the object of a public read. The requester is never looked up, reads do not depend
    /// on who asks.
    fn public_by_id<F>(&self, actor: Option<&ActorId>, id: &ObjectId, decide: F) -> bool
    where
        F: FnOnce(Option<&BusinessObject>) -> bool,
    {
        match self.catalog.object(id) {
            Ok(object) => decide(object.as_ref()),
            Err(err) => {
                let outcome = self.policy.config().read_failure().outcome();
                warn!(
                    actor = ?actor,
                    %id,
                    outcome,
                    "could not resolve object for public read: {err}"
                );
                outcome
            }
        }
    }

    fn resolve_actor(&self, actor: Option<&ActorId>) -> Result<Option<Actor>, AuthError> {
        match actor {
            Some(id) => Ok(self.policy.directory().actor(id)?),
            None => Ok(None),
        }
    }

    fn resolve(
        &self,
        actor: Option<&ActorId>,
        object: &ObjectId,
    ) -> Result<(Option<Actor>, Option<BusinessObject>), AuthError> {
        let actor = self.resolve_actor(actor)?;
        let object = self.catalog.object(object)?;
        Ok((actor, object))
    }
}
