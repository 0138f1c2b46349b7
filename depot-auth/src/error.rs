// SPDX-License-Identifier: MIT OR Apache-2.0

use depot_store::{CatalogError, DirectoryError, GraphError};
use thiserror::Error;

/// Infrastructure failure while evaluating a decision.
///
/// This is never used to express a denial: "you may not do this" is `Ok(false)`, an `AuthError`
/// means it could not be determined whether you may.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("could not query relationship graph: {0}")]
    Graph(#[from] GraphError),

    #[error("could not look up actor: {0}")]
    Directory(#[from] DirectoryError),

    #[error("could not look up business object: {0}")]
    Catalog(#[from] CatalogError),
}
