// SPDX-License-Identifier: MIT OR Apache-2.0

//! The rule set deciding which actor may do what to which business object.
//!
//! Every predicate is a short-circuiting OR of grant clauses, cheapest first:
//!
//! 1. unconditional grants (public reads),
//! 2. the instance administrator role,
//! 3. administration of the project the target belongs to,
//! 4. depositor relationships on the target collection or any collection above it,
//! 5. otherwise deny.
//!
//! Depositor rights flow strictly downward: a depositor of a collection may deposit into every
//! collection below it, but never into the collections above it. Rules only ever walk upward from
//! the target, so a relationship further down the hierarchy can not be found.
//!
//! Public reads return a plain `bool`. All other predicates return `Result<bool, AuthError>`, a
//! failing store surfaces as an error instead of a silent denial.
use std::collections::BTreeSet;

use depot_core::{Actor, ActorId, BusinessObject, ObjectId, ObjectKind};
use depot_store::{ActorDirectory, GraphQuery, RelationshipGraph};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::AuthError;
use crate::guard::{Family, Guard, guard};
use crate::walk::{Lineage, ancestry, descendants};

/// Authorization rules evaluated against a relationship graph and an actor directory.
///
/// Decisions do not mutate anything and keep no state between calls. A policy can be shared
/// between threads whenever the graph and directory handles can.
#[derive(Clone, Debug)]
pub struct PermissionPolicy<G, D> {
    graph: G,
    directory: D,
    config: Config,
}

impl<G, D> PermissionPolicy<G, D>
where
    G: RelationshipGraph,
    D: ActorDirectory,
{
    pub fn new(graph: G, directory: D, config: Config) -> Self {
        Self {
            graph,
            directory,
            config,
        }
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn can_retrieve_collection(
        &self,
        actor: Option<&Actor>,
        collection: Option<&BusinessObject>,
    ) -> bool {
        self.public("retrieve collection", actor, collection)
    }

    pub fn can_retrieve_data_item(
        &self,
        actor: Option<&Actor>,
        data_item: Option<&BusinessObject>,
    ) -> bool {
        self.public("retrieve data item", actor, data_item)
    }

    pub fn can_retrieve_data_file(
        &self,
        actor: Option<&Actor>,
        data_file: Option<&BusinessObject>,
    ) -> bool {
        self.public("retrieve data file", actor, data_file)
    }

    pub fn can_retrieve_metadata_file(
        &self,
        actor: Option<&Actor>,
        metadata_file: Option<&BusinessObject>,
    ) -> bool {
        self.public("retrieve metadata file", actor, metadata_file)
    }

    /// The list of collections is public.
    pub fn can_view_collection_list(&self, actor: Option<&Actor>) -> bool {
        decision("view collection list", actor, None, true)
    }

    /// Only instance administrators create projects.
    pub fn can_create_project(&self, actor: Option<&Actor>) -> Result<bool, AuthError> {
        let allowed = actor.is_some_and(Actor::is_instance_admin);
        Ok(decision("create project", actor, None, allowed))
    }

    pub fn can_read_project(
        &self,
        actor: Option<&Actor>,
        project: Option<&BusinessObject>,
    ) -> Result<bool, AuthError> {
        self.restricted("read project", actor, project, |actor, project| {
            self.project_rule(actor, project)
        })
    }

    pub fn can_update_project(
        &self,
        actor: Option<&Actor>,
        project: Option<&BusinessObject>,
    ) -> Result<bool, AuthError> {
        self.restricted("update project", actor, project, |actor, project| {
            self.project_rule(actor, project)
        })
    }

    pub fn can_list_project_collections(
        &self,
        actor: Option<&Actor>,
        project: Option<&BusinessObject>,
    ) -> Result<bool, AuthError> {
        self.restricted(
            "list project collections",
            actor,
            project,
            |actor, project| self.project_rule(actor, project),
        )
    }

    /// Only instance administrators appoint project administrators.
    pub fn can_add_administrator(
        &self,
        actor: Option<&Actor>,
        project: Option<&BusinessObject>,
    ) -> Result<bool, AuthError> {
        self.restricted("add administrator", actor, project, |actor, project| {
            Ok(project.is_project() && actor.is_instance_admin())
        })
    }

    /// Only instance administrators remove project administrators, and never themselves. Project
    /// administrators can not remove each other.
    pub fn can_remove_administrator(
        &self,
        actor: Option<&Actor>,
        administrator: &ActorId,
        project: Option<&BusinessObject>,
    ) -> Result<bool, AuthError> {
        self.restricted("remove administrator", actor, project, |actor, project| {
            Ok(project.is_project() && actor.is_instance_admin() && administrator != actor.id())
        })
    }

    /// Create a collection inside a project or inside another collection.
    ///
    /// Inside a project this needs administration of that project, inside a collection it needs
    /// depositor rights on it.
    pub fn can_create_collection(
        &self,
        actor: Option<&Actor>,
        container: Option<&BusinessObject>,
    ) -> Result<bool, AuthError> {
        self.restricted("create collection", actor, container, |actor, container| {
            if actor.is_instance_admin() {
                return Ok(true);
            }
            match container.kind {
                ObjectKind::Project => self.administers(actor.id(), &container.id),
                ObjectKind::Collection => match self.lineage(&container.id)? {
                    Some(lineage) => self.is_depositor_in(actor.id(), &lineage),
                    None => Ok(false),
                },
                _ => Ok(false),
            }
        })
    }

    /// Update a collection. Depositors never can, only administrators of the owning project.
    pub fn can_update_collection(
        &self,
        actor: Option<&Actor>,
        collection: Option<&BusinessObject>,
    ) -> Result<bool, AuthError> {
        self.restricted("update collection", actor, collection, |actor, collection| {
            Ok(collection.is_collection() && self.update_collection_rule(actor, &collection.id)?)
        })
    }

    pub fn can_deposit_to_collection(
        &self,
        actor: Option<&Actor>,
        collection: Option<&BusinessObject>,
    ) -> Result<bool, AuthError> {
        self.restricted("deposit", actor, collection, |actor, collection| {
            Ok(collection.is_collection() && self.deposit_rule(actor, &collection.id)?)
        })
    }

    /// Appoint a depositor for a collection.
    pub fn can_add_depositor(
        &self,
        actor: Option<&Actor>,
        collection: Option<&BusinessObject>,
    ) -> Result<bool, AuthError> {
        self.restricted("add depositor", actor, collection, |actor, collection| {
            Ok(collection.is_collection() && self.update_collection_rule(actor, &collection.id)?)
        })
    }

    /// Remove a depositor from a collection.
    ///
    /// Nobody removes themselves. Instance administrators remove anybody else. Administrators of
    /// the owning project remove anybody who is neither an instance administrator nor an
    /// administrator of that project.
    pub fn can_remove_depositor(
        &self,
        actor: Option<&Actor>,
        depositor: &ActorId,
        collection: Option<&BusinessObject>,
    ) -> Result<bool, AuthError> {
        self.restricted("remove depositor", actor, collection, |actor, collection| {
            if !collection.is_collection() || depositor == actor.id() {
                return Ok(false);
            }
            if actor.is_instance_admin() {
                return Ok(true);
            }
            let Some(lineage) = self.lineage(&collection.id)? else {
                return Ok(false);
            };
            let projects = self.projects_of(&lineage)?;
            if !self.administers_any(actor.id(), &projects)? {
                return Ok(false);
            }
            let depositor_is_instance_admin = self
                .directory
                .actor(depositor)?
                .is_some_and(|depositor| depositor.is_instance_admin());
            if depositor_is_instance_admin {
                return Ok(false);
            }
            Ok(!self.administers_any(depositor, &projects)?)
        })
    }

    /// Update a data item, which requires deposit rights on its collection.
    pub fn can_update_data_item(
        &self,
        actor: Option<&Actor>,
        data_item: Option<&BusinessObject>,
    ) -> Result<bool, AuthError> {
        self.restricted("update data item", actor, data_item, |actor, data_item| {
            Ok(data_item.kind == ObjectKind::DataItem
                && self.update_data_item_rule(actor, &data_item.id)?)
        })
    }

    /// Attach a metadata file to an object, which requires update rights on that object.
    ///
    /// Metadata files describing metadata files are reserved to instance administrators.
    pub fn can_add_metadata_file(
        &self,
        actor: Option<&Actor>,
        object: Option<&BusinessObject>,
    ) -> Result<bool, AuthError> {
        self.restricted("add metadata file", actor, object, |actor, object| {
            if actor.is_instance_admin() {
                return Ok(true);
            }
            match object.kind {
                ObjectKind::Project => self.administers(actor.id(), &object.id),
                ObjectKind::Collection => self.update_collection_rule(actor, &object.id),
                ObjectKind::DataItem => self.update_data_item_rule(actor, &object.id),
                ObjectKind::DataFile => match self.graph.data_item_of_data_file(&object.id)? {
                    Some(data_item) => self.update_data_item_rule(actor, &data_item),
                    None => Ok(false),
                },
                ObjectKind::MetadataFile => Ok(false),
            }
        })
    }

    /// Actors directly administering the project.
    pub fn administrators_of(&self, project: &ObjectId) -> Result<BTreeSet<ActorId>, AuthError> {
        Ok(self.graph.administrators_of(project)?.into_iter().collect())
    }

    /// Project the collection belongs to, found through the root of its hierarchy.
    pub fn project_of(&self, collection: &ObjectId) -> Result<Option<ObjectId>, AuthError> {
        let Some(lineage) = self.lineage(collection)? else {
            return Ok(None);
        };
        Ok(self.projects_of(&lineage)?.into_iter().next())
    }

    /// Actors with depositor rights on the collection: its own depositors and the depositors of
    /// every collection above it.
    pub fn depositors_of(&self, collection: &ObjectId) -> Result<BTreeSet<ActorId>, AuthError> {
        let mut depositors = BTreeSet::new();
        if let Some(lineage) = self.lineage(collection)? {
            for collection in &lineage.chain {
                depositors.extend(self.graph.depositors_of(collection)?);
            }
        }
        Ok(depositors)
    }

    /// Collections the actor may deposit into through depositor relationships: the collections
    /// it is linked to and every collection below them.
    ///
    /// Collections whose way up to the root can not be walked are left out, deposits into them
    /// are denied.
    pub fn depositable_collections(
        &self,
        actor: &ActorId,
    ) -> Result<BTreeSet<ObjectId>, AuthError> {
        let direct = self.graph.collections_accepting_deposits_from(actor)?;
        let mut depositable = BTreeSet::new();
        for collection in descendants(&self.graph, direct, self.config.max_walk_depth)? {
            if self.lineage(&collection)?.is_some() {
                depositable.insert(collection);
            }
        }
        Ok(depositable)
    }

    fn public(
        &self,
        action: &'static str,
        actor: Option<&Actor>,
        target: Option<&BusinessObject>,
    ) -> bool {
        let allowed = match guard(Family::Public, actor, target) {
            Guard::Decided(allowed) => allowed,
            Guard::Evaluate(_, _) => true,
        };
        decision(action, actor, target, allowed)
    }

    fn restricted<F>(
        &self,
        action: &'static str,
        actor: Option<&Actor>,
        target: Option<&BusinessObject>,
        rule: F,
    ) -> Result<bool, AuthError>
    where
        F: FnOnce(&Actor, &BusinessObject) -> Result<bool, AuthError>,
    {
        let allowed = match guard(Family::Restricted, actor, target) {
            Guard::Decided(allowed) => allowed,
            Guard::Evaluate(actor, target) => rule(actor, target).inspect_err(|err| {
                warn!(action, actor = %actor.id(), target = %target.id, "{err}");
            })?,
        };
        Ok(decision(action, actor, target, allowed))
    }

    fn project_rule(&self, actor: &Actor, project: &BusinessObject) -> Result<bool, AuthError> {
        if !project.is_project() {
            return Ok(false);
        }
        Ok(actor.is_instance_admin() || self.administers(actor.id(), &project.id)?)
    }

    fn update_collection_rule(
        &self,
        actor: &Actor,
        collection: &ObjectId,
    ) -> Result<bool, AuthError> {
        if actor.is_instance_admin() {
            return Ok(true);
        }
        let Some(lineage) = self.lineage(collection)? else {
            return Ok(false);
        };
        let projects = self.projects_of(&lineage)?;
        self.administers_any(actor.id(), &projects)
    }

    fn deposit_rule(&self, actor: &Actor, collection: &ObjectId) -> Result<bool, AuthError> {
        if actor.is_instance_admin() {
            return Ok(true);
        }
        let Some(lineage) = self.lineage(collection)? else {
            return Ok(false);
        };
        let projects = self.projects_of(&lineage)?;
        if self.administers_any(actor.id(), &projects)? {
            return Ok(true);
        }
        self.is_depositor_in(actor.id(), &lineage)
    }

    fn update_data_item_rule(
        &self,
        actor: &Actor,
        data_item: &ObjectId,
    ) -> Result<bool, AuthError> {
        if actor.is_instance_admin() {
            return Ok(true);
        }
        match self.graph.collection_of_data_item(data_item)? {
            Some(collection) => self.deposit_rule(actor, &collection),
            None => Ok(false),
        }
    }

    /// Walk up from the collection. `None` when the walk had to give up, which grants nothing.
    fn lineage(&self, collection: &ObjectId) -> Result<Option<Lineage>, AuthError> {
        Ok(ancestry(&self.graph, collection, self.config.max_walk_depth)?.ok())
    }

    fn projects_of(&self, lineage: &Lineage) -> Result<BTreeSet<ObjectId>, AuthError> {
        let mut projects = BTreeSet::new();
        for root in &lineage.roots {
            if let Some(project) = self.graph.parent_project_of(root)? {
                projects.insert(project);
            }
        }
        Ok(projects)
    }

    fn administers(&self, actor: &ActorId, project: &ObjectId) -> Result<bool, AuthError> {
        Ok(self.graph.administrators_of(project)?.contains(actor))
    }

    fn administers_any(
        &self,
        actor: &ActorId,
        projects: &BTreeSet<ObjectId>,
    ) -> Result<bool, AuthError> {
        for project in projects {
            if self.administers(actor, project)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn is_depositor_in(&self, actor: &ActorId, lineage: &Lineage) -> Result<bool, AuthError> {
        for collection in &lineage.chain {
            if self.graph.depositors_of(collection)?.contains(actor) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

fn decision(
    action: &'static str,
    actor: Option<&Actor>,
    target: Option<&BusinessObject>,
    allowed: bool,
) -> bool {
    debug!(
        action,
        actor = ?actor.map(Actor::id),
        target = ?target.map(|target| &target.id),
        allowed,
        "authorization decision"
    );
    allowed
}
