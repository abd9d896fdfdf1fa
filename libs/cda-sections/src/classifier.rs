//! Code-driven section classification
//!
//! [`find_sections`] locates every section below a starting section whose
//! code satisfies a predicate, however deeply it is nested. For each node the
//! matching direct children are reported first, in child order, followed by
//! the matches found inside each child in turn.
//!
//! The starting section itself is never tested, so a component whose own
//! code matches is not reported unless the caller checks it separately.

use crate::section::{Section, StructuredBody};
use casebridge_models::{CodeValue, SNOMED_URI};

/// SNOMED CT concept "Information advice given"
pub const INFORMATION_ADVICE_GIVEN: &str = "1052951000000105";

/// Predicate selecting care-advice sections
pub fn is_information_advice_given(code: &CodeValue) -> bool {
    code.is(SNOMED_URI, INFORMATION_ADVICE_GIVEN)
}

/// Find all descendants of `root` whose code satisfies `predicate`
///
/// Sections with a missing or malformed code never match. Traversal uses an
/// explicit stack, so nesting depth is bounded only by memory.
pub fn find_sections<'a, P>(root: &'a Section, mut predicate: P) -> Vec<&'a Section>
where
    P: FnMut(&CodeValue) -> bool,
{
    let mut found = Vec::new();
    let mut pending = vec![root];

    // Each node contributes its matching children; nodes are visited in
    // pre-order so that deeper matches follow their ancestors' siblings.
    while let Some(section) = pending.pop() {
        for child in &section.components {
            if child.code_value().is_some_and(|code| predicate(&code)) {
                found.push(child);
            }
        }
        pending.extend(section.components.iter().rev());
    }

    found
}

/// Run [`find_sections`] over every top-level component of a body
#[tracing::instrument(level = "debug", skip_all, fields(components = body.components.len()))]
pub fn find_sections_in_body<'a, P>(body: &'a StructuredBody, mut predicate: P) -> Vec<&'a Section>
where
    P: FnMut(&CodeValue) -> bool,
{
    let found: Vec<&Section> = body
        .components
        .iter()
        .flat_map(|component| find_sections(component, &mut predicate))
        .collect();

    tracing::debug!(matched = found.len(), "Classified sections");
    found
}
