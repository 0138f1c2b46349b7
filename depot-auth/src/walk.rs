// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded walks through the collection hierarchy.
//!
//! The graph is expected to be acyclic and every collection to have at most one parent, but the
//! walks do not rely on it: they keep a visited set and give up after a configured number of hops.
use std::collections::{BTreeSet, HashSet};

use depot_core::ObjectId;
use depot_store::{GraphError, GraphQuery, RelationshipGraph};
use tracing::{trace, warn};

/// Why a walk gave up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum WalkAbort {
    /// The collection was reached a second time.
    Cycle(ObjectId),

    /// More parent hops than allowed.
    DepthExceeded(usize),
}

/// A collection together with all collections above it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Lineage {
    /// The start collection followed by its ancestors, nearest first.
    pub chain: Vec<ObjectId>,

    /// Collections of the chain without a parent collection.
    pub roots: Vec<ObjectId>,
}

/// Walk from a collection up to the root of its hierarchy.
///
/// Only ever follows "is sub-collection of" edges, descendants are never visited.
pub(crate) fn ancestry<G>(
    graph: &G,
    collection: &ObjectId,
    max_depth: usize,
) -> Result<Result<Lineage, WalkAbort>, GraphError>
where
    G: RelationshipGraph + ?Sized,
{
    let mut visited = HashSet::from([collection.clone()]);
    let mut chain = vec![collection.clone()];
    let mut roots = Vec::new();
    let mut frontier = vec![collection.clone()];
    let mut depth = 0;

    while !frontier.is_empty() {
        let mut next = Vec::new();
        for current in frontier {
            let parents: BTreeSet<ObjectId> = graph
                .super_collection_ids_of(&current)?
                .into_iter()
                .collect();
            if parents.is_empty() {
                roots.push(current);
                continue;
            }
            if parents.len() > 1 {
                warn!(%current, count = parents.len(), "collection has more than one parent");
            }
            for parent in parents {
                if !visited.insert(parent.clone()) {
                    warn!(%collection, %parent, "cycle in collection hierarchy, giving up");
                    return Ok(Err(WalkAbort::Cycle(parent)));
                }
                trace!(%current, %parent, "walked up");
                chain.push(parent.clone());
                next.push(parent);
            }
        }

        if next.is_empty() {
            break;
        }
        depth += 1;
        if depth > max_depth {
            warn!(%collection, max_depth, "collection hierarchy too deep, giving up");
            return Ok(Err(WalkAbort::DepthExceeded(max_depth)));
        }
        frontier = next;
    }

    Ok(Ok(Lineage { chain, roots }))
}

/// All collections below the given ones, including the given ones.
///
/// Collections further down than `max_depth` hops are left out.
pub(crate) fn descendants<G>(
    graph: &G,
    collections: impl IntoIterator<Item = ObjectId>,
    max_depth: usize,
) -> Result<BTreeSet<ObjectId>, GraphError>
where
    G: RelationshipGraph + ?Sized,
{
    let mut found = BTreeSet::new();
    let mut frontier: Vec<ObjectId> = collections
        .into_iter()
        .filter(|collection| found.insert(collection.clone()))
        .collect();
    let mut depth = 0;

    while !frontier.is_empty() {
        if depth == max_depth {
            warn!(max_depth, "collection hierarchy too deep, ignoring lower levels");
            break;
        }
        let mut next = Vec::new();
        for current in frontier {
            for child in graph.sub_collection_ids_of(&current)? {
                if found.insert(child.clone()) {
                    next.push(child);
                }
            }
        }
        depth += 1;
        frontier = next;
    }

    Ok(found)
}
