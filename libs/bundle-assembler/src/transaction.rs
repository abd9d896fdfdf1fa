//! Transaction rendering
//!
//! Turns an [`AssembledBundle`] into the FHIR `Bundle` JSON model: one entry
//! per resource in bundle order, each with a request targeting its type.

use crate::assembler::AssembledBundle;
use crate::config::AssemblerConfig;
use crate::error::Result;
use casebridge_models::{Bundle, BundleEntry, Resource};

impl AssembledBundle<'_> {
    /// Render as a FHIR `Bundle` of the configured type
    #[tracing::instrument(level = "debug", skip_all, fields(entries = self.len()))]
    pub fn to_fhir_bundle(&self, config: &AssemblerConfig) -> Result<Bundle> {
        let mut bundle = Bundle::new(config.bundle_type);

        for entry in self.entries() {
            bundle.add_entry(render_entry(&entry.full_url, entry.resource, config)?);
        }
        let manifest = self.manifest();
        bundle.add_entry(render_entry(&manifest.id().full_url(), manifest, config)?);

        Ok(bundle)
    }
}

fn render_entry(
    full_url: &str,
    resource: &Resource,
    config: &AssemblerConfig,
) -> Result<BundleEntry> {
    Ok(BundleEntry::for_resource(full_url, resource.to_value()?)
        .with_request(config.request_method.as_str(), resource.kind().as_str()))
}

#[cfg(test)]
mod tests {
    use crate::assembler::BundleAssembler;
    use crate::config::AssemblerConfig;
    use casebridge_models::{
        BundleType, Composition, CreationRegistry, Encounter, Organization, Patient, Subject,
    };
    use serde_json::{json, Map};

    #[test]
    fn test_transaction_entries() {
        let mut registry = CreationRegistry::new();
        let practice = registry.create(Organization::default());
        let patient = registry.create(Patient {
            general_practitioner: vec![practice],
        });
        let mut extensions = Map::new();
        extensions.insert("status".to_string(), json!("finished"));
        let encounter = registry.create_with_extensions(
            Encounter {
                subject: Some(Subject::Individual(patient)),
                ..Encounter::default()
            },
            extensions,
        );
        let composition = registry.create(Composition {
            encounter: Some(encounter),
            ..Composition::default()
        });

        let config = AssemblerConfig::default();
        let assembled = BundleAssembler::new(&registry)
            .assemble(encounter, composition)
            .unwrap();
        let bundle = assembled.to_fhir_bundle(&config).unwrap();

        assert!(bundle.is_transaction());
        assert_eq!(bundle.entry_count(), 5);

        let urls: Vec<&str> = bundle
            .entries()
            .iter()
            .map(|e| e.request.as_ref().unwrap().url.as_str())
            .collect();
        assert_eq!(urls, ["Encounter", "Patient", "Organization", "Composition", "List"]);

        let first = &bundle.entries()[0];
        assert_eq!(first.full_url.as_deref(), Some(encounter.id().full_url().as_str()));
        assert_eq!(first.request.as_ref().unwrap().method, "POST");
        let resource = first.resource.as_ref().unwrap();
        assert_eq!(resource["resourceType"], "Encounter");
        assert_eq!(resource["id"], encounter.id().to_string());
        assert_eq!(resource["subject"], json!({"reference": patient.id().full_url()}));
        assert_eq!(resource["status"], "finished");

        let value = bundle.to_value().unwrap();
        assert_eq!(value["type"], "transaction");
        assert_eq!(value["entry"][4]["resource"]["entry"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_configured_type_and_method() {
        let mut registry = CreationRegistry::new();
        let encounter = registry.create(Encounter::default());
        let composition = registry.create(Composition::default());

        let config = AssemblerConfig {
            bundle_type: BundleType::Batch,
            request_method: "PUT".to_string(),
            ..AssemblerConfig::default()
        };
        let bundle = BundleAssembler::new(&registry)
            .assemble(encounter, composition)
            .unwrap()
            .to_fhir_bundle(&config)
            .unwrap();

        assert_eq!(bundle.bundle_type, BundleType::Batch);
        assert!(bundle
            .entries()
            .iter()
            .all(|e| e.request.as_ref().unwrap().method == "PUT"));
    }
}
