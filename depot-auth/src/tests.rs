// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::BTreeSet;

use assert_matches::assert_matches;
use depot_core::{Actor, ActorId, BusinessObject, ObjectId, RegistrationStatus, Role};
use depot_store::{GraphQuery, MemoryDirectory};

use crate::test_utils::{CyclicGraph, FailingGraph, TestDepot};
use crate::{AuthError, Config, PermissionPolicy};

fn actors(ids: &[&str]) -> BTreeSet<ActorId> {
    ids.iter().map(|id| ActorId::from(*id)).collect()
}

fn objects(ids: &[&str]) -> BTreeSet<ObjectId> {
    ids.iter().map(|id| ObjectId::from(*id)).collect()
}

#[test]
fn deposit_rights_flow_downward_only() {
    let mut depot = TestDepot::new();
    let d1 = depot.user("d1");
    let d3 = depot.user("d3");
    let project = depot.project("p", &[]);
    let c1 = depot.collection(&project, "c1");
    let c2 = depot.subcollection(&c1, "c2");
    let c3 = depot.subcollection(&c2, "c3");
    depot.depositor(&d1, &c1);
    depot.depositor(&d3, &c3);
    let policy = depot.policy();

    assert!(policy.can_deposit_to_collection(Some(&d1), Some(&c3)).unwrap());
    assert!(policy.can_deposit_to_collection(Some(&d1), Some(&c2)).unwrap());
    assert!(policy.can_deposit_to_collection(Some(&d1), Some(&c1)).unwrap());

    assert!(policy.can_deposit_to_collection(Some(&d3), Some(&c3)).unwrap());
    assert!(!policy.can_deposit_to_collection(Some(&d3), Some(&c2)).unwrap());
    assert!(!policy.can_deposit_to_collection(Some(&d3), Some(&c1)).unwrap());

    assert_eq!(policy.depositors_of(&c3.id).unwrap(), actors(&["d1", "d3"]));
    assert_eq!(policy.depositors_of(&c2.id).unwrap(), actors(&["d1"]));
    assert_eq!(
        policy.depositable_collections(d1.id()).unwrap(),
        objects(&["c1", "c2", "c3"])
    );
    assert_eq!(
        policy.depositable_collections(d3.id()).unwrap(),
        objects(&["c3"])
    );
}

#[test]
fn project_administration() {
    let mut depot = TestDepot::new();
    let a1 = depot.user("a1");
    let a2 = depot.user("a2");
    let dep = depot.user("dep");
    let project = depot.project("p", &[&a1, &a2]);
    let col = depot.collection(&project, "col");
    let sub = depot.subcollection(&col, "sub");
    depot.depositor(&dep, &col);
    let policy = depot.policy();

    assert!(policy.can_update_collection(Some(&a1), Some(&col)).unwrap());
    assert!(!policy.can_update_collection(Some(&dep), Some(&col)).unwrap());
    assert!(policy.can_remove_depositor(Some(&a1), dep.id(), Some(&col)).unwrap());
    assert!(!policy.can_remove_depositor(Some(&a1), a2.id(), Some(&col)).unwrap());

    // Administration reaches sub-collections through the root of the hierarchy.
    assert!(policy.can_update_collection(Some(&a2), Some(&sub)).unwrap());
    assert!(policy.can_deposit_to_collection(Some(&a2), Some(&sub)).unwrap());
    assert!(!policy.can_update_collection(Some(&dep), Some(&sub)).unwrap());
    assert!(policy.can_deposit_to_collection(Some(&dep), Some(&sub)).unwrap());

    assert_eq!(policy.project_of(&sub.id).unwrap(), Some(project.id.clone()));
    assert_eq!(policy.administrators_of(&project.id).unwrap(), actors(&["a1", "a2"]));
}

#[test]
fn administrators_are_scoped_to_their_project() {
    let mut depot = TestDepot::new();
    let alice = depot.user("alice");
    let bob = depot.user("bob");
    let ours = depot.project("ours", &[&alice]);
    let theirs = depot.project("theirs", &[&bob]);
    let collection = depot.collection(&theirs, "c");
    let policy = depot.policy();

    assert!(policy.can_read_project(Some(&alice), Some(&ours)).unwrap());
    assert!(policy.can_update_project(Some(&alice), Some(&ours)).unwrap());
    assert!(policy.can_list_project_collections(Some(&alice), Some(&ours)).unwrap());
    assert!(!policy.can_read_project(Some(&alice), Some(&theirs)).unwrap());
    assert!(!policy.can_update_project(Some(&alice), Some(&theirs)).unwrap());
    assert!(!policy.can_list_project_collections(Some(&alice), Some(&theirs)).unwrap());

    assert!(!policy.can_update_collection(Some(&alice), Some(&collection)).unwrap());
    assert!(!policy.can_deposit_to_collection(Some(&alice), Some(&collection)).unwrap());
    assert!(!policy.can_add_depositor(Some(&alice), Some(&collection)).unwrap());
    assert!(policy.can_add_depositor(Some(&bob), Some(&collection)).unwrap());
}

#[test]
fn instance_administrators() {
    let mut depot = TestDepot::new();
    let root = depot.instance_admin("root");
    let other_root = depot.instance_admin("other-root");
    let alice = depot.user("alice");
    let project = depot.project("p", &[&alice]);
    let collection = depot.collection(&project, "c");
    let item = depot.data_item(&collection, "item");
    depot.depositor(&other_root, &collection);
    let policy = depot.policy();

    assert!(policy.can_create_project(Some(&root)).unwrap());
    assert!(!policy.can_create_project(Some(&alice)).unwrap());
    assert!(!policy.can_create_project(None).unwrap());

    assert!(policy.can_read_project(Some(&root), Some(&project)).unwrap());
    assert!(policy.can_update_project(Some(&root), Some(&project)).unwrap());
    assert!(policy.can_create_collection(Some(&root), Some(&collection)).unwrap());
    assert!(policy.can_update_collection(Some(&root), Some(&collection)).unwrap());
    assert!(policy.can_deposit_to_collection(Some(&root), Some(&collection)).unwrap());
    assert!(policy.can_update_data_item(Some(&root), Some(&item)).unwrap());
    assert!(policy.can_add_administrator(Some(&root), Some(&project)).unwrap());
    assert!(!policy.can_add_administrator(Some(&alice), Some(&project)).unwrap());

    // Never themselves.
    assert!(!policy.can_remove_administrator(Some(&root), root.id(), Some(&project)).unwrap());
    assert!(!policy.can_remove_depositor(Some(&root), root.id(), Some(&collection)).unwrap());
    // Anybody else.
    assert!(policy.can_remove_administrator(Some(&root), alice.id(), Some(&project)).unwrap());
    assert!(
        policy
            .can_remove_depositor(Some(&root), other_root.id(), Some(&collection))
            .unwrap()
    );
    // Project administrators can not remove instance administrators as depositors.
    assert!(
        !policy
            .can_remove_depositor(Some(&alice), other_root.id(), Some(&collection))
            .unwrap()
    );
}

#[test]
fn peer_administrators_can_not_remove_each_other() {
    let mut depot = TestDepot::new();
    let a = depot.user("a");
    let b = depot.user("b");
    let project = depot.project("p", &[&a, &b]);
    let policy = depot.policy();

    assert!(!policy.can_remove_administrator(Some(&a), b.id(), Some(&project)).unwrap());
    assert!(!policy.can_remove_administrator(Some(&b), a.id(), Some(&project)).unwrap());
    assert!(!policy.can_remove_administrator(Some(&a), a.id(), Some(&project)).unwrap());
}

#[test]
fn depositors_can_not_remove_depositors() {
    let mut depot = TestDepot::new();
    let alice = depot.user("alice");
    let bob = depot.user("bob");
    let project = depot.project("p", &[]);
    let collection = depot.collection(&project, "c");
    depot.depositor(&alice, &collection);
    depot.depositor(&bob, &collection);
    let policy = depot.policy();

    assert!(!policy.can_remove_depositor(Some(&alice), bob.id(), Some(&collection)).unwrap());
    assert!(!policy.can_remove_depositor(Some(&alice), alice.id(), Some(&collection)).unwrap());
}

#[test]
fn creating_collections() {
    let mut depot = TestDepot::new();
    let admin = depot.user("admin");
    let depositor = depot.user("depositor");
    let stranger = depot.user("stranger");
    let project = depot.project("p", &[&admin]);
    let parent = depot.collection(&project, "parent");
    let child = depot.subcollection(&parent, "child");
    let item = depot.data_item(&child, "item");
    depot.depositor(&depositor, &parent);
    let policy = depot.policy();

    assert!(policy.can_create_collection(Some(&admin), Some(&project)).unwrap());
    assert!(!policy.can_create_collection(Some(&depositor), Some(&project)).unwrap());
    assert!(!policy.can_create_collection(Some(&stranger), Some(&project)).unwrap());

    assert!(policy.can_create_collection(Some(&depositor), Some(&parent)).unwrap());
    assert!(policy.can_create_collection(Some(&depositor), Some(&child)).unwrap());
    assert!(!policy.can_create_collection(Some(&stranger), Some(&child)).unwrap());

    // Only projects and collections contain collections.
    assert!(!policy.can_create_collection(Some(&admin), Some(&item)).unwrap());
}

#[test]
fn data_items_and_metadata_files() {
    let mut depot = TestDepot::new();
    let admin = depot.user("admin");
    let depositor = depot.user("depositor");
    let stranger = depot.user("stranger");
    let root = depot.instance_admin("root");
    let project = depot.project("p", &[&admin]);
    let collection = depot.collection(&project, "c");
    let item = depot.data_item(&collection, "item");
    let file = depot.data_file(&item, "file");
    let metadata = depot.metadata_file(&item, "metadata");
    let orphan = BusinessObject::data_item("orphan");
    depot.depositor(&depositor, &collection);
    let policy = depot.policy();

    for actor in [&admin, &depositor] {
        assert!(policy.can_update_data_item(Some(actor), Some(&item)).unwrap());
        assert!(policy.can_add_metadata_file(Some(actor), Some(&item)).unwrap());
        assert!(policy.can_add_metadata_file(Some(actor), Some(&file)).unwrap());
        assert!(!policy.can_add_metadata_file(Some(actor), Some(&metadata)).unwrap());
        assert!(!policy.can_update_data_item(Some(actor), Some(&orphan)).unwrap());
    }
    assert!(policy.can_add_metadata_file(Some(&root), Some(&metadata)).unwrap());
    assert!(!policy.can_update_data_item(Some(&stranger), Some(&item)).unwrap());
    assert!(!policy.can_add_metadata_file(Some(&stranger), Some(&file)).unwrap());

    // Metadata on collections and projects needs update rights on them.
    assert!(policy.can_add_metadata_file(Some(&admin), Some(&collection)).unwrap());
    assert!(policy.can_add_metadata_file(Some(&admin), Some(&project)).unwrap());
    assert!(!policy.can_add_metadata_file(Some(&depositor), Some(&collection)).unwrap());
    assert!(!policy.can_add_metadata_file(Some(&depositor), Some(&project)).unwrap());

    // Wrong kind of target.
    assert!(!policy.can_update_data_item(Some(&admin), Some(&collection)).unwrap());
    assert!(!policy.can_deposit_to_collection(Some(&admin), Some(&item)).unwrap());
    assert!(!policy.can_update_project(Some(&admin), Some(&collection)).unwrap());
}

#[test]
fn absent_targets_are_denied() {
    let mut depot = TestDepot::new();
    let root = depot.instance_admin("root");
    let project = depot.project("p", &[]);
    let policy = depot.policy();

    for actor in [None, Some(&root)] {
        assert!(!policy.can_retrieve_collection(actor, None));
        assert!(!policy.can_retrieve_data_item(actor, None));
        assert!(!policy.can_retrieve_data_file(actor, None));
        assert!(!policy.can_retrieve_metadata_file(actor, None));
        assert!(!policy.can_read_project(actor, None).unwrap());
        assert!(!policy.can_update_project(actor, None).unwrap());
        assert!(!policy.can_list_project_collections(actor, None).unwrap());
        assert!(!policy.can_create_collection(actor, None).unwrap());
        assert!(!policy.can_update_collection(actor, None).unwrap());
        assert!(!policy.can_deposit_to_collection(actor, None).unwrap());
        assert!(!policy.can_add_depositor(actor, None).unwrap());
        assert!(!policy.can_remove_depositor(actor, &"d".into(), None).unwrap());
        assert!(!policy.can_add_administrator(actor, None).unwrap());
        assert!(!policy.can_remove_administrator(actor, &"a".into(), None).unwrap());
        assert!(!policy.can_update_data_item(actor, None).unwrap());
        assert!(!policy.can_add_metadata_file(actor, None).unwrap());
    }

    // Restricted actions need a requester.
    assert!(!policy.can_read_project(None, Some(&project)).unwrap());
    assert!(!policy.can_add_administrator(None, Some(&project)).unwrap());
}

#[test]
fn reads_are_public() {
    let mut depot = TestDepot::new();
    let project = depot.project("p", &[]);
    let collection = depot.collection(&project, "c");
    let item = depot.data_item(&collection, "item");
    let file = depot.data_file(&item, "file");
    let metadata = depot.metadata_file(&collection, "metadata");
    let policy = depot.policy();

    let black_listed = Actor::new("spam", [], RegistrationStatus::BlackListed);
    let pending = Actor::new("newbie", [], RegistrationStatus::Pending);
    let unregistered = Actor::regular("stranger");

    for actor in [None, Some(&black_listed), Some(&pending), Some(&unregistered)] {
        assert!(policy.can_retrieve_collection(actor, Some(&collection)));
        assert!(policy.can_retrieve_data_item(actor, Some(&item)));
        assert!(policy.can_retrieve_data_file(actor, Some(&file)));
        assert!(policy.can_retrieve_metadata_file(actor, Some(&metadata)));
        assert!(policy.can_view_collection_list(actor));
        assert!(!policy.can_deposit_to_collection(actor, Some(&collection)).unwrap());
    }

    // Public reads never consult the graph, a broken backend does not matter.
    let policy = PermissionPolicy::new(FailingGraph, MemoryDirectory::new(), Config::new());
    assert!(policy.can_retrieve_collection(None, Some(&collection)));
}

#[test]
fn write_path_surfaces_graph_failures() {
    let depot = TestDepot::new();
    let root = depot.instance_admin("root");
    let alice = depot.user("alice");
    let project = BusinessObject::project("p");
    let collection = BusinessObject::collection("c");
    let policy = PermissionPolicy::new(FailingGraph, depot.directory.clone(), Config::new());

    assert_matches!(
        policy.can_deposit_to_collection(Some(&alice), Some(&collection)),
        Err(AuthError::Graph(_))
    );
    assert_matches!(
        policy.can_update_project(Some(&alice), Some(&project)),
        Err(AuthError::Graph(_))
    );
    assert_matches!(
        policy.can_remove_depositor(Some(&alice), root.id(), Some(&collection)),
        Err(AuthError::Graph(_))
    );
    assert_matches!(policy.depositors_of(&collection.id), Err(AuthError::Graph(_)));

    // Decisions which never reach the graph still succeed.
    assert!(policy.can_deposit_to_collection(Some(&root), Some(&collection)).unwrap());
    assert!(!policy.can_deposit_to_collection(None, Some(&collection)).unwrap());
}

#[test]
fn cycles_are_denied() {
    let depot = TestDepot::new();
    let alice = depot.user("alice");
    let root = depot.instance_admin("root");
    let collection = BusinessObject::collection("a");
    let policy = PermissionPolicy::new(
        CyclicGraph::new(&["a", "b", "c"]),
        depot.directory.clone(),
        Config::new(),
    );

    assert!(!policy.can_deposit_to_collection(Some(&alice), Some(&collection)).unwrap());
    assert!(!policy.can_update_collection(Some(&alice), Some(&collection)).unwrap());
    assert!(policy.depositors_of(&collection.id).unwrap().is_empty());
    assert_eq!(policy.project_of(&collection.id).unwrap(), None);

    // The role grant does not need a walk.
    assert!(policy.can_deposit_to_collection(Some(&root), Some(&collection)).unwrap());
}

#[test]
fn deep_hierarchies_are_denied() {
    let mut depot = TestDepot::new();
    let depositor = depot.user("depositor");
    let project = depot.project("p", &[]);
    let top = depot.collection(&project, "c0");
    depot.depositor(&depositor, &top);
    let mut bottom = top.clone();
    for level in 1..=4 {
        bottom = depot.subcollection(&bottom, &format!("c{level}"));
    }

    let policy = depot.policy_with(Config::new().with_max_walk_depth(4));
    assert!(policy.can_deposit_to_collection(Some(&depositor), Some(&bottom)).unwrap());

    let policy = depot.policy_with(Config::new().with_max_walk_depth(3));
    assert!(!policy.can_deposit_to_collection(Some(&depositor), Some(&bottom)).unwrap());
    assert!(policy.can_deposit_to_collection(Some(&depositor), Some(&top)).unwrap());
}

#[test]
fn depositable_collections_agree_with_deposit_decisions() {
    let mut depot = TestDepot::new();
    let depositor = depot.user("depositor");
    let project = depot.project("p", &[]);
    let mut chain = vec![depot.collection(&project, "r0")];
    for level in 1..=5 {
        let parent = chain[level - 1].clone();
        chain.push(depot.subcollection(&parent, &format!("r{level}")));
    }
    let bottom = depot.subcollection(&chain[5], "c");
    chain.push(bottom);
    depot.depositor(&depositor, &chain[4]);
    depot.depositor(&depositor, &chain[6]);

    // Six parent hops from c up to r0.
    for (max_walk_depth, expected) in [
        (3, objects(&[])),
        (5, objects(&["r4", "r5"])),
        (10, objects(&["r4", "r5", "c"])),
    ] {
        let policy = depot.policy_with(Config::new().with_max_walk_depth(max_walk_depth));
        let depositable = policy.depositable_collections(depositor.id()).unwrap();
        assert_eq!(depositable, expected);

        for collection in &chain {
            assert_eq!(
                depositable.contains(&collection.id),
                policy
                    .can_deposit_to_collection(Some(&depositor), Some(collection))
                    .unwrap()
            );
        }
    }
}

#[test]
fn registration_status_does_not_change_write_decisions() {
    let mut depot = TestDepot::new();
    let project = depot.project("p", &[]);
    let collection = depot.collection(&project, "c");
    let item = depot.data_item(&collection, "item");

    let black_listed_depositor =
        Actor::new("spam", [Role::RegularUser], RegistrationStatus::BlackListed);
    let pending_admin = Actor::new("newbie", [Role::InstanceAdmin], RegistrationStatus::Pending);
    let black_listed = Actor::new("nobody", [], RegistrationStatus::BlackListed);
    for actor in [&black_listed_depositor, &pending_admin, &black_listed] {
        depot.directory.insert_actor(actor.clone());
    }
    depot.depositor(&black_listed_depositor, &collection);
    let policy = depot.policy();

    // Only roles and relationships count.
    assert!(
        policy
            .can_deposit_to_collection(Some(&black_listed_depositor), Some(&collection))
            .unwrap()
    );
    assert!(
        policy
            .can_update_data_item(Some(&black_listed_depositor), Some(&item))
            .unwrap()
    );
    assert!(
        !policy
            .can_update_collection(Some(&black_listed_depositor), Some(&collection))
            .unwrap()
    );

    assert!(policy.can_create_project(Some(&pending_admin)).unwrap());
    assert!(policy.can_update_collection(Some(&pending_admin), Some(&collection)).unwrap());
    assert!(
        policy
            .can_remove_depositor(
                Some(&pending_admin),
                black_listed_depositor.id(),
                Some(&collection)
            )
            .unwrap()
    );

    assert!(!policy.can_create_project(Some(&black_listed)).unwrap());
    assert!(!policy.can_deposit_to_collection(Some(&black_listed), Some(&collection)).unwrap());
}

#[test]
fn relationship_changes_apply_to_the_next_decision() {
    let mut depot = TestDepot::new();
    let alice = depot.user("alice");
    let project = depot.project("p", &[]);
    let collection = depot.collection(&project, "c");
    let policy = depot.policy();

    assert!(!policy.can_deposit_to_collection(Some(&alice), Some(&collection)).unwrap());
    depot.depositor(&alice, &collection);
    assert!(policy.can_deposit_to_collection(Some(&alice), Some(&collection)).unwrap());
    depot
        .graph
        .remove_depositor(alice.id(), &collection.id)
        .unwrap();
    assert!(!policy.can_deposit_to_collection(Some(&alice), Some(&collection)).unwrap());
}

#[test]
fn concurrent_decisions() {
    let mut depot = TestDepot::new();
    let admin = depot.user("admin");
    let depositor = depot.user("depositor");
    let project = depot.project("p", &[&admin]);
    let collection = depot.collection(&project, "c");
    let sub = depot.subcollection(&collection, "sub");
    depot.depositor(&depositor, &collection);
    let policy = depot.policy();

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..100 {
                    assert!(
                        policy
                            .can_deposit_to_collection(Some(&depositor), Some(&sub))
                            .unwrap()
                    );
                    assert!(policy.can_update_collection(Some(&admin), Some(&sub)).unwrap());
                    assert!(!policy.can_update_collection(Some(&depositor), Some(&sub)).unwrap());
                }
            });
        }

        // Unrelated writes happen while decisions are evaluated.
        let mut graph = depot.graph.clone();
        scope.spawn(move || {
            for i in 0..100 {
                let stranger = ActorId::from(format!("stranger-{i}"));
                graph.add_depositor(&stranger, &"elsewhere".into()).unwrap();
            }
        });
    });
}
