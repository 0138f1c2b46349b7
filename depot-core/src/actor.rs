// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::identity::ActorId;

/// Global roles which can be assigned to an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Role {
    RegularUser,

    /// Administrator of the whole depot instance. Supersedes all object-scoped checks.
    InstanceAdmin,
}

/// Where an actor is in the account registration process.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RegistrationStatus {
    #[default]
    Pending,
    Approved,
    BlackListed,
}

/// Immutable snapshot of an actor as handed out by an actor directory.
///
/// Decisions are always taken against a snapshot, changes to the underlying account record are
/// only visible to decisions which start after they happened.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Actor {
    id: ActorId,
    roles: BTreeSet<Role>,
    status: RegistrationStatus,
}

impl Actor {
    pub fn new(
        id: impl Into<ActorId>,
        roles: impl IntoIterator<Item = Role>,
        status: RegistrationStatus,
    ) -> Self {
        Self {
            id: id.into(),
            roles: roles.into_iter().collect(),
            status,
        }
    }

    /// Approved actor with the `RegularUser` role.
    pub fn regular(id: impl Into<ActorId>) -> Self {
        Self::new(id, [Role::RegularUser], RegistrationStatus::Approved)
    }

    /// Approved actor with the `RegularUser` and `InstanceAdmin` roles.
    pub fn instance_admin(id: impl Into<ActorId>) -> Self {
        Self::new(
            id,
            [Role::RegularUser, Role::InstanceAdmin],
            RegistrationStatus::Approved,
        )
    }

    pub fn id(&self) -> &ActorId {
        &self.id
    }

    pub fn roles(&self) -> &BTreeSet<Role> {
        &self.roles
    }

    pub fn status(&self) -> RegistrationStatus {
        self.status
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_instance_admin(&self) -> bool {
        self.has_role(Role::InstanceAdmin)
    }
}
