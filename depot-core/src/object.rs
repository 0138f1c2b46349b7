// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::{Display, Formatter};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::identity::ObjectId;

/// The variants of business objects held by a depot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ObjectKind {
    /// Top-level container, administered by one or more actors.
    Project,

    /// Container for data items and other collections, placed either in a project or in exactly
    /// one parent collection.
    Collection,

    /// A deposited data set, aggregated by one collection.
    DataItem,

    /// A file belonging to one data item.
    DataFile,

    /// A file describing any other business object.
    MetadataFile,
}

impl Display for ObjectKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ObjectKind::Project => "project",
            ObjectKind::Collection => "collection",
            ObjectKind::DataItem => "data item",
            ObjectKind::DataFile => "data file",
            ObjectKind::MetadataFile => "metadata file",
        };

        write!(f, "{}", s)
    }
}

/// Minimal view of a business object: everything the authorization engine needs to know about it.
///
/// Where an object sits in the hierarchy is not stored here, it is read from the relationship
/// graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BusinessObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
}

impl BusinessObject {
    pub fn new(id: impl Into<ObjectId>, kind: ObjectKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    pub fn project(id: impl Into<ObjectId>) -> Self {
        Self::new(id, ObjectKind::Project)
    }

    pub fn collection(id: impl Into<ObjectId>) -> Self {
        Self::new(id, ObjectKind::Collection)
    }

    pub fn data_item(id: impl Into<ObjectId>) -> Self {
        Self::new(id, ObjectKind::DataItem)
    }

    pub fn data_file(id: impl Into<ObjectId>) -> Self {
        Self::new(id, ObjectKind::DataFile)
    }

    pub fn metadata_file(id: impl Into<ObjectId>) -> Self {
        Self::new(id, ObjectKind::MetadataFile)
    }

    pub fn is_project(&self) -> bool {
        self.kind == ObjectKind::Project
    }

    pub fn is_collection(&self) -> bool {
        self.kind == ObjectKind::Collection
    }
}

impl Display for BusinessObject {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}
