//! The engine context: single owner of all native types and metadata nodes.

use crate::metadata::MetadataGraph;
use crate::types::TypePool;

/// Top-level owner of a [`TypePool`] and a [`MetadataGraph`].
///
/// A context is a container for interning: running several independent
/// compilations means several contexts, each with its own identity space.
/// Handles from one context are meaningless in another.
///
/// A context is intended for a single logical writer. There is no internal
/// synchronization; a concurrent embedding must add its own mutual exclusion
/// around context mutation.
#[derive(Debug, Default)]
pub struct Context {
    pub types: TypePool,
    pub metadata: MetadataGraph,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }
}
