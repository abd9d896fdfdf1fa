//! Care-plan mapping
//!
//! Every "information/advice given" section of the document becomes a
//! CarePlan in the creation registry, linked to the encounter it belongs to
//! and to the supporting information created before it.

use crate::config::AssemblerConfig;
use crate::error::Result;
use crate::linker::link_supporting_info;
use casebridge_models::{
    CarePlan, CarePlanIntent, CarePlanStatus, CreationRegistry, Encounter, Narrative, Ref, Subject,
};
use casebridge_sections::{find_sections_in_body, is_information_advice_given, Section, StructuredBody};
use serde_json::Value;

/// Encounter attributes a care plan inherits
#[derive(Debug, Clone)]
pub struct EncounterContext {
    pub encounter: Ref<Encounter>,
    pub subject: Option<Subject>,
    pub period: Option<Value>,
}

impl EncounterContext {
    /// Read the subject and `period` attribute of a registered encounter
    pub fn from_registry(registry: &CreationRegistry, encounter: Ref<Encounter>) -> Result<Self> {
        let subject = registry.resolve(encounter)?.subject;
        let period = registry
            .get(encounter.id())?
            .extensions
            .get("period")
            .cloned();
        Ok(Self {
            encounter,
            subject,
            period,
        })
    }
}

/// Build the care plan described by one advice section
pub fn care_plan_from_section(section: &Section, context: &EncounterContext) -> CarePlan {
    let description = section.first_text().map(str::to_string);

    CarePlan {
        language: section.language_code.clone(),
        text: description.as_deref().map(Narrative::generated),
        status: CarePlanStatus::Active,
        intent: CarePlanIntent::Plan,
        title: Some(section.title.clone()),
        description,
        subject: context.subject,
        context: Some(context.encounter),
        period: context.period.clone(),
        supporting_info: Vec::new(),
    }
}

pub struct CarePlanMapper<'c> {
    config: &'c AssemblerConfig,
}

impl<'c> CarePlanMapper<'c> {
    pub fn new(config: &'c AssemblerConfig) -> Self {
        Self { config }
    }

    /// Create one care plan per advice section found in `body`
    ///
    /// Plans are created in component order, then classification order. Each
    /// plan is linked to its supporting information right after creation.
    #[tracing::instrument(level = "debug", skip_all, fields(encounter = %encounter.id()))]
    pub fn map_care_plans(
        &self,
        body: &StructuredBody,
        encounter: Ref<Encounter>,
        registry: &mut CreationRegistry,
    ) -> Result<Vec<Ref<CarePlan>>> {
        let context = EncounterContext::from_registry(registry, encounter)?;
        let sections = find_sections_in_body(body, is_information_advice_given);

        let mut created = Vec::with_capacity(sections.len());
        for section in sections {
            let care_plan = registry.create(care_plan_from_section(section, &context));
            link_supporting_info(
                registry,
                care_plan.id(),
                &self.config.supporting_info_kinds,
            )?;
            tracing::trace!(care_plan = %care_plan.id(), title = %section.title, "Created care plan");
            created.push(care_plan);
        }

        tracing::debug!(created = created.len(), "Mapped care plans");
        Ok(created)
    }
}
