// SPDX-License-Identifier: MIT OR Apache-2.0

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default upper bound of parent hops for collection hierarchy walks.
pub const DEFAULT_MAX_WALK_DEPTH: usize = 64;

/// What public reads answer when the infrastructure needed to resolve them fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FailurePolicy {
    /// Grant the read. Repository content is world-readable, an unavailable catalog should not
    /// take reads down with it.
    #[default]
    FailOpen,

    /// Deny the read.
    FailClosed,
}

impl FailurePolicy {
    pub(crate) fn outcome(&self) -> bool {
        matches!(self, FailurePolicy::FailOpen)
    }
}

/// Configuration of the authorization engine.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Walks up (and down) the collection hierarchy give up after this many hops. A walk which
    /// gives up grants nothing.
    pub(crate) max_walk_depth: usize,

    /// Outcome of public reads when resolving an identifier fails.
    pub(crate) read_failure: FailurePolicy,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_walk_depth(mut self, max_walk_depth: usize) -> Self {
        self.max_walk_depth = max_walk_depth;
        self
    }

    pub fn with_read_failure(mut self, read_failure: FailurePolicy) -> Self {
        self.read_failure = read_failure;
        self
    }

    pub fn max_walk_depth(&self) -> usize {
        self.max_walk_depth
    }

    pub fn read_failure(&self) -> FailurePolicy {
        self.read_failure
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_walk_depth: DEFAULT_MAX_WALK_DEPTH,
            read_failure: FailurePolicy::default(),
        }
    }
}
