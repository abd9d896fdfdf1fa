//! Supporting-information linking
//!
//! Attaches references to earlier resources of selected kinds onto a newly
//! created resource. Linking appends: calling it twice for the same target
//! and kinds duplicates the edges.

use crate::error::Result;
use casebridge_models::{CreationRegistry, Error as ModelError, Resource, ResourceId, ResourceKind};

/// Link every registry resource of `kinds` to `target` as supporting info
///
/// References are added in registry order. The target never links to itself.
/// Returns the number of references added.
#[tracing::instrument(level = "debug", skip(registry), fields(target = %target))]
pub fn link_supporting_info(
    registry: &mut CreationRegistry,
    target: ResourceId,
    kinds: &[ResourceKind],
) -> Result<usize> {
    let references: Vec<_> = registry
        .of_kinds(kinds)
        .filter(|resource| resource.id() != target)
        .map(Resource::reference)
        .collect();

    let resource = registry.get_mut(target)?;
    let kind = resource.kind();
    let edge = resource
        .body_mut()
        .supporting_info_mut()
        .ok_or(ModelError::UnsupportedEdge {
            kind,
            edge: "supportingInfo",
        })?;

    edge.extend(references.iter().copied());
    tracing::debug!(linked = references.len(), "Linked supporting information");
    Ok(references.len())
}
