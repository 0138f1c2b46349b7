// SPDX-License-Identifier: MIT OR Apache-2.0

//! Handling of absent actors and absent targets, shared by every predicate.
//!
//! | family     | actor   | target  | outcome  |
//! |------------|---------|---------|----------|
//! | any        | any     | absent  | deny     |
//! | public     | any     | present | grant    |
//! | restricted | absent  | present | deny     |
//! | restricted | present | present | evaluate |
//!
//! Public reads never look at the actor, so pending or black-listed registrations do not block
//! them either.
use depot_core::Actor;

/// The two families of actions with different null handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Family {
    /// World-readable retrievals.
    Public,

    /// Everything which needs a role or a relationship.
    Restricted,
}

/// Outcome of the guard.
#[derive(Debug)]
pub(crate) enum Guard<'a, T> {
    /// The decision is already known.
    Decided(bool),

    /// Both sides are present, the rule of the action needs to run.
    Evaluate(&'a Actor, &'a T),
}

pub(crate) fn guard<'a, T>(
    family: Family,
    actor: Option<&'a Actor>,
    target: Option<&'a T>,
) -> Guard<'a, T> {
    match (family, actor, target) {
        (_, _, None) => Guard::Decided(false),
        (Family::Public, _, Some(_)) => Guard::Decided(true),
        (Family::Restricted, None, Some(_)) => Guard::Decided(false),
        (Family::Restricted, Some(actor), Some(target)) => Guard::Evaluate(actor, target),
    }
}
