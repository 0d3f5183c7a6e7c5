//! Aspect Handler Registry
//!
//! Handlers declare the metadata tag they are interested in. The tag is the
//! dispatch key: a root method carrying the tag gets the handler woven in.

use std::sync::Arc;

use crate::aspect::AspectHandler;

/// Registry entry for an aspect handler
pub struct AspectHandlerEntry {
    /// Metadata tag the handler applies to
    pub tag: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Factory function creating the handler
    pub factory: fn() -> Arc<dyn AspectHandler>,
}

#[linkme::distributed_slice]
pub static ASPECT_HANDLERS: [AspectHandlerEntry] = [..];

/// List all registered aspect handlers as (tag, description)
pub fn list_aspect_handlers() -> Vec<(&'static str, &'static str)> {
    let mut handlers: Vec<(&'static str, &'static str)> = ASPECT_HANDLERS
        .iter()
        .map(|entry| (entry.tag, entry.description))
        .collect();
    handlers.sort_by_key(|(tag, _)| *tag);
    handlers
}
