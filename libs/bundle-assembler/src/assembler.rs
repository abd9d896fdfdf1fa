//! Resource graph assembly
//!
//! Walks the references reachable from an encounter and its composition in a
//! fixed order and emits every distinct resource once, at its first visit.
//! A manifest List over everything emitted closes the bundle.
//!
//! Emission order:
//!
//! 1. encounter
//! 2. service provider
//! 3. participants' individuals
//! 4. each location, then its managing organization and that organization's
//!    `partOf` ancestors
//! 5. subject: a patient and its general practitioners, or a group and its
//!    members
//! 6. first incoming referral, its subject, each recipient with the
//!    recipient's first location and providing organization, then the
//!    requester's on-behalf-of organization
//! 7. appointment and its participants' actors
//! 8. first episode of care, its care manager and managing organization
//! 9. composition and its first author
//! 10. manifest
//!
//! Absent optional edges are skipped. A reference that does not resolve, or
//! resolves to the wrong kind, aborts the whole assembly.

use crate::error::Result;
use crate::manifest::derive_manifest;
use casebridge_models::{
    Appointment, Composition, CreationRegistry, Encounter, EpisodeOfCare, Group,
    HealthcareService, Location, Organization, Patient, Ref, ReferralRequest, Resource,
    ResourceId, ResourceType, Subject,
};
use std::collections::HashSet;

/// One emitted resource and the full URL it is filed under
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledEntry<'r> {
    pub full_url: String,
    pub resource: &'r Resource,
}

/// Ordered, duplicate-free result of one assembly
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledBundle<'r> {
    entries: Vec<AssembledEntry<'r>>,
    manifest: Resource,
}

impl<'r> AssembledBundle<'r> {
    /// Emitted resources in first-visit order, excluding the manifest
    pub fn entries(&self) -> &[AssembledEntry<'r>] {
        &self.entries
    }

    pub fn manifest(&self) -> &Resource {
        &self.manifest
    }

    /// Every resource of the bundle, manifest last
    pub fn resources(&self) -> impl Iterator<Item = &Resource> + '_ {
        self.entries
            .iter()
            .map(|entry| entry.resource)
            .chain(std::iter::once(&self.manifest))
    }

    /// Identities in bundle order, manifest last
    pub fn ids(&self) -> Vec<ResourceId> {
        self.resources().map(Resource::id).collect()
    }

    /// Number of resources including the manifest
    pub fn len(&self) -> usize {
        self.entries.len() + 1
    }

    /// Always `false`: an assembled bundle carries at least its manifest
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Assembles bundles from resources held in a creation registry
///
/// The assembler only reads the registry. Each call to
/// [`assemble`](Self::assemble) starts from an empty visited set.
pub struct BundleAssembler<'r> {
    registry: &'r CreationRegistry,
}

impl<'r> BundleAssembler<'r> {
    pub fn new(registry: &'r CreationRegistry) -> Self {
        Self { registry }
    }

    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(encounter = %encounter.id(), composition = %composition.id())
    )]
    pub fn assemble(
        &self,
        encounter: Ref<Encounter>,
        composition: Ref<Composition>,
    ) -> Result<AssembledBundle<'r>> {
        let mut walk = Walk::new(self.registry);
        let root = self.registry.resolve(encounter)?;

        walk.emit_typed(encounter)?;
        if let Some(provider) = root.service_provider {
            walk.emit_typed(provider)?;
        }
        for participant in &root.participant {
            walk.emit(participant.individual.id())?;
        }
        walk.locations(root)?;
        walk.subject(root.subject)?;
        if let Some(referral) = root.incoming_referral.first() {
            walk.referral(*referral)?;
        }
        if let Some(appointment) = root.appointment {
            walk.appointment(appointment)?;
        }
        if let Some(episode) = root.episode_of_care.first() {
            walk.episode_of_care(*episode)?;
        }
        walk.composition(composition)?;

        let manifest = derive_manifest(encounter, root.subject, &walk.entries);
        tracing::debug!(entries = walk.entries.len(), "Assembled bundle");

        Ok(AssembledBundle {
            entries: walk.entries,
            manifest,
        })
    }
}

/// Mutable state of a single assembly
struct Walk<'r> {
    registry: &'r CreationRegistry,
    visited: HashSet<ResourceId>,
    /// Organizations whose `partOf` chain has been followed
    chains_walked: HashSet<ResourceId>,
    entries: Vec<AssembledEntry<'r>>,
}

impl<'r> Walk<'r> {
    fn new(registry: &'r CreationRegistry) -> Self {
        Self {
            registry,
            visited: HashSet::new(),
            chains_walked: HashSet::new(),
            entries: Vec::new(),
        }
    }

    /// Emit a resource under its own full URL; `false` if already emitted
    fn emit(&mut self, id: ResourceId) -> Result<bool> {
        self.emit_as(id, None)
    }

    fn emit_as(&mut self, id: ResourceId, full_url: Option<String>) -> Result<bool> {
        if self.visited.contains(&id) {
            return Ok(false);
        }
        let resource = self.registry.get(id)?;
        tracing::trace!(kind = %resource.kind(), id = %id, "Emitting resource");

        self.visited.insert(id);
        self.entries.push(AssembledEntry {
            full_url: full_url.unwrap_or_else(|| id.full_url()),
            resource,
        });
        Ok(true)
    }

    /// Emit a typed reference, checking the target's kind
    fn emit_typed<T: ResourceType>(&mut self, reference: Ref<T>) -> Result<bool> {
        self.registry.resolve(reference)?;
        self.emit(reference.id())
    }

    fn locations(&mut self, encounter: &Encounter) -> Result<()> {
        for location in encounter.location.iter().filter_map(|l| l.location) {
            let resolved: &Location = self.registry.resolve(location)?;
            self.emit(location.id())?;
            if let Some(organization) = resolved.managing_organization {
                self.organization_chain(organization)?;
            }
        }
        Ok(())
    }

    /// Emit an organization and its `partOf` ancestors
    ///
    /// Organizations emitted by an earlier step still have their ancestors
    /// walked. The walk ends at an organization whose chain was already
    /// walked, which also ends any cycle in the hierarchy.
    fn organization_chain(&mut self, start: Ref<Organization>) -> Result<()> {
        let mut next = Some(start);

        while let Some(current) = next {
            let organization = self.registry.resolve(current)?;
            if !self.chains_walked.insert(current.id()) {
                tracing::debug!(organization = %current.id(), "Organization chain reached a walked ancestor");
                break;
            }
            self.emit(current.id())?;
            next = organization.part_of;
        }
        Ok(())
    }

    fn subject(&mut self, subject: Option<Subject>) -> Result<()> {
        match subject {
            Some(Subject::Individual(patient)) => {
                let resolved: &Patient = self.registry.resolve(patient)?;
                self.emit(patient.id())?;
                for practice in &resolved.general_practitioner {
                    self.emit_typed(*practice)?;
                }
            }
            Some(Subject::Group(group)) => {
                let resolved: &Group = self.registry.resolve(group)?;
                self.emit(group.id())?;
                for member in &resolved.member {
                    self.emit_as(member.entity.id(), Some(member.full_url()))?;
                }
            }
            Some(Subject::Unknown(other)) => {
                tracing::debug!(subject = %other.id(), "Subject is neither a patient nor a group, not emitted");
            }
            None => {}
        }
        Ok(())
    }

    fn referral(&mut self, referral: Ref<ReferralRequest>) -> Result<()> {
        let resolved = self.registry.resolve(referral)?;
        self.emit(referral.id())?;

        if let Some(subject) = resolved.subject {
            self.emit(subject.id())?;
        }
        for recipient in &resolved.recipient {
            self.emit(recipient.id())?;
            let service = self
                .registry
                .get(recipient.id())?
                .downcast::<HealthcareService>();
            if let Some(service) = service {
                if let Some(location) = service.location.first() {
                    self.emit_typed(*location)?;
                }
                if let Some(provider) = service.provided_by {
                    self.emit_typed(provider)?;
                }
            }
        }
        if let Some(on_behalf_of) = resolved.requester.as_ref().and_then(|r| r.on_behalf_of) {
            self.emit_typed(on_behalf_of)?;
        }
        Ok(())
    }

    fn appointment(&mut self, appointment: Ref<Appointment>) -> Result<()> {
        let resolved = self.registry.resolve(appointment)?;
        self.emit(appointment.id())?;
        for actor in resolved.participant.iter().filter_map(|p| p.actor) {
            self.emit(actor.id())?;
        }
        Ok(())
    }

    fn episode_of_care(&mut self, episode: Ref<EpisodeOfCare>) -> Result<()> {
        let resolved = self.registry.resolve(episode)?;
        self.emit(episode.id())?;
        if let Some(manager) = resolved.care_manager {
            self.emit(manager.id())?;
        }
        if let Some(organization) = resolved.managing_organization {
            self.emit_typed(organization)?;
        }
        Ok(())
    }

    fn composition(&mut self, composition: Ref<Composition>) -> Result<()> {
        let resolved = self.registry.resolve(composition)?;
        self.emit(composition.id())?;
        if let Some(author) = resolved.author.first() {
            self.emit(author.id())?;
        }
        Ok(())
    }
}
