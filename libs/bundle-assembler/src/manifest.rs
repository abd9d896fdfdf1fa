//! Manifest derivation

use crate::assembler::AssembledEntry;
use casebridge_models::{
    Encounter, ListEntry, ListResource, Ref, Resource, ResourceId, ResourceType, Subject,
};
use uuid::Uuid;

/// Identity of the manifest for an encounter
///
/// Derived from the encounter's full URL, so assembling the same encounter
/// twice yields the same manifest.
pub fn manifest_id(encounter: Ref<Encounter>) -> ResourceId {
    let name = format!("{}/List", encounter.id().full_url());
    ResourceId::from_uuid(Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes()))
}

/// Build the List resource enumerating `entries` in emission order
pub fn derive_manifest(
    encounter: Ref<Encounter>,
    subject: Option<Subject>,
    entries: &[AssembledEntry<'_>],
) -> Resource {
    let list = ListResource {
        status: "current".to_string(),
        mode: "working".to_string(),
        subject,
        encounter: Some(encounter),
        entry: entries
            .iter()
            .map(|entry| ListEntry {
                item: entry.resource.reference(),
            })
            .collect(),
    };
    Resource::new(manifest_id(encounter), list.into_body())
}

#[cfg(test)]
mod tests {
    use super::*;
    use casebridge_models::{Observation, ResourceKind};
    use serde_json::json;

    #[test]
    fn test_manifest_id_is_stable() {
        let encounter: Ref<Encounter> = Ref::new(ResourceId::new_random());
        let other: Ref<Encounter> = Ref::new(ResourceId::new_random());
        assert_eq!(manifest_id(encounter), manifest_id(encounter));
        assert_ne!(manifest_id(encounter), manifest_id(other));
        assert_eq!(manifest_id(encounter).as_uuid().get_version_num(), 5);
    }

    #[test]
    fn test_manifest_lists_entries_in_order() {
        let encounter: Ref<Encounter> = Ref::new(ResourceId::new_random());
        let first = Resource::new(ResourceId::new_random(), Observation {}.into_body());
        let second = Resource::new(ResourceId::new_random(), Observation {}.into_body());
        let entries = [
            AssembledEntry {
                full_url: first.id().full_url(),
                resource: &first,
            },
            AssembledEntry {
                full_url: second.id().full_url(),
                resource: &second,
            },
        ];

        let manifest = derive_manifest(encounter, None, &entries);
        assert_eq!(manifest.kind(), ResourceKind::List);

        let value = manifest.to_value().unwrap();
        assert_eq!(value["status"], "current");
        assert_eq!(value["mode"], "working");
        assert_eq!(value["encounter"], json!({"reference": encounter.id().full_url()}));
        assert!(value.get("subject").is_none());
        assert_eq!(
            value["entry"],
            json!([
                {"item": {"reference": first.id().full_url()}},
                {"item": {"reference": second.id().full_url()}}
            ])
        );
    }
}
