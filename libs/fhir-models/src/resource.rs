//! Resource model
//!
//! Resources reference each other by [`ResourceId`] rather than by ownership.
//! Typed edges are expressed as [`Ref<T>`], which carries the target kind at
//! the type level and is resolved against a
//! [`CreationRegistry`](crate::registry::CreationRegistry).
//!
//! Only the edges the bundle assembler walks are modelled as fields; other
//! kind-specific attributes travel in [`Resource::extensions`].

use crate::error::Result;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use uuid::Uuid;

/// Process-unique identity of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(Uuid);

impl ResourceId {
    /// Allocate a fresh random identifier
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Bundle full URL for this identity (`urn:uuid:...`)
    pub fn full_url(&self) -> String {
        format!("urn:uuid:{}", self.0)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Marker for references whose target kind is not fixed
#[derive(Debug)]
pub enum Untyped {}

/// Non-owning reference to a resource of kind `T`
pub struct Ref<T = Untyped> {
    id: ResourceId,
    _target: PhantomData<fn() -> T>,
}

/// Reference whose target may be of any kind
pub type AnyRef = Ref<Untyped>;

impl<T> Ref<T> {
    pub fn new(id: ResourceId) -> Self {
        Self {
            id,
            _target: PhantomData,
        }
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// Drop the target kind
    pub fn erase(self) -> AnyRef {
        Ref::new(self.id)
    }
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Ref<T> {}

impl<T> PartialEq for Ref<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Ref<T> {}

impl<T> Hash for Ref<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Ref").field(&self.id).finish()
    }
}

impl<T> Serialize for Ref<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("reference", &self.id.full_url())?;
        map.end()
    }
}

/// Implemented by every concrete resource payload
pub trait ResourceType: Sized {
    const KIND: ResourceKind;

    fn into_body(self) -> ResourceBody;

    fn from_body(body: &ResourceBody) -> Option<&Self>;

    fn from_body_mut(body: &mut ResourceBody) -> Option<&mut Self>;
}

macro_rules! resource_kinds {
    ($($kind:ident => $ty:ident),* $(,)?) => {
        /// Kind tag of a resource, named after its FHIR `resourceType`
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum ResourceKind {
            $($kind,)*
        }

        impl ResourceKind {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$kind => stringify!($kind),)*
                }
            }
        }

        /// Kind-specific payload of a resource
        #[derive(Debug, Clone, PartialEq, Serialize)]
        #[serde(tag = "resourceType")]
        pub enum ResourceBody {
            $($kind($ty),)*
        }

        impl ResourceBody {
            pub fn kind(&self) -> ResourceKind {
                match self {
                    $(Self::$kind(_) => ResourceKind::$kind,)*
                }
            }
        }

        $(
            impl ResourceType for $ty {
                const KIND: ResourceKind = ResourceKind::$kind;

                fn into_body(self) -> ResourceBody {
                    ResourceBody::$kind(self)
                }

                fn from_body(body: &ResourceBody) -> Option<&Self> {
                    match body {
                        ResourceBody::$kind(value) => Some(value),
                        _ => None,
                    }
                }

                fn from_body_mut(body: &mut ResourceBody) -> Option<&mut Self> {
                    match body {
                        ResourceBody::$kind(value) => Some(value),
                        _ => None,
                    }
                }
            }
        )*
    };
}

resource_kinds! {
    Encounter => Encounter,
    Composition => Composition,
    CarePlan => CarePlan,
    Organization => Organization,
    Location => Location,
    Patient => Patient,
    Group => Group,
    Practitioner => Practitioner,
    RelatedPerson => RelatedPerson,
    ReferralRequest => ReferralRequest,
    Appointment => Appointment,
    EpisodeOfCare => EpisodeOfCare,
    HealthcareService => HealthcareService,
    QuestionnaireResponse => QuestionnaireResponse,
    Observation => Observation,
    List => ListResource,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ResourceBody {
    /// Supporting-information edge, for the kinds that carry one
    pub fn supporting_info_mut(&mut self) -> Option<&mut Vec<AnyRef>> {
        match self {
            Self::CarePlan(care_plan) => Some(&mut care_plan.supporting_info),
            Self::ReferralRequest(referral) => Some(&mut referral.supporting_info),
            _ => None,
        }
    }
}

/// A created resource: identity, typed payload and free-form attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    id: ResourceId,
    body: ResourceBody,
    /// Kind-specific attributes populated by the mapping layer
    pub extensions: Map<String, Value>,
}

impl Resource {
    pub fn new(id: ResourceId, body: ResourceBody) -> Self {
        Self {
            id,
            body,
            extensions: Map::new(),
        }
    }

    pub fn with_extensions(mut self, extensions: Map<String, Value>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn kind(&self) -> ResourceKind {
        self.body.kind()
    }

    pub fn body(&self) -> &ResourceBody {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut ResourceBody {
        &mut self.body
    }

    pub fn reference(&self) -> AnyRef {
        Ref::new(self.id)
    }

    /// View the payload as a concrete kind
    pub fn downcast<T: ResourceType>(&self) -> Option<&T> {
        T::from_body(&self.body)
    }

    /// Render as FHIR JSON
    ///
    /// Edge fields come first after `resourceType` and `id`; extension
    /// attributes never override them.
    pub fn to_value(&self) -> Result<Value> {
        let mut object = Map::new();
        if let Value::Object(body) = serde_json::to_value(&self.body)? {
            let mut body = body.into_iter();
            // The serialized body starts with its `resourceType` tag
            if let Some((tag, kind)) = body.next() {
                object.insert(tag, kind);
            }
            object.insert("id".to_string(), Value::String(self.id.to_string()));
            object.extend(body);
        }
        for (key, value) in &self.extensions {
            if !object.contains_key(key) {
                object.insert(key.clone(), value.clone());
            }
        }
        Ok(Value::Object(object))
    }
}

// ============================================================================
// Shared element types
// ============================================================================

/// Subject of an encounter or care record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    /// A single patient
    Individual(Ref<Patient>),
    /// A group of patients
    Group(Ref<Group>),
    /// A subject of some other kind
    Unknown(AnyRef),
}

impl Subject {
    pub fn reference(&self) -> AnyRef {
        match self {
            Self::Individual(patient) => patient.erase(),
            Self::Group(group) => group.erase(),
            Self::Unknown(other) => *other,
        }
    }
}

impl Serialize for Subject {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.reference().serialize(serializer)
    }
}

/// Human-readable summary of a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Narrative {
    pub status: String,
    pub div: String,
}

impl Narrative {
    /// Wrap plain text in an XHTML div, escaping markup
    pub fn generated(text: &str) -> Self {
        Self {
            status: "generated".to_string(),
            div: format!(
                "<div xmlns=\"http://www.w3.org/1999/xhtml\">{}</div>",
                html_escape::encode_text(text)
            ),
        }
    }
}

// ============================================================================
// Resource payloads
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_provider: Option<Ref<Organization>>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub participant: Vec<EncounterParticipant>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub location: Vec<EncounterLocation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub incoming_referral: Vec<Ref<ReferralRequest>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment: Option<Ref<Appointment>>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub episode_of_care: Vec<Ref<EpisodeOfCare>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncounterParticipant {
    /// Practitioner or related person taking part
    pub individual: AnyRef,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EncounterLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Ref<Location>>,
}

/// Document-level summary
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Composition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounter: Option<Ref<Encounter>>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub author: Vec<AnyRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CarePlanStatus {
    Draft,
    Active,
    Suspended,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CarePlanIntent {
    Proposal,
    Plan,
    Order,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarePlan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Narrative>,

    pub status: CarePlanStatus,

    pub intent: CarePlanIntent,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Ref<Encounter>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Value>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub supporting_info: Vec<AnyRef>,
}

impl Default for CarePlan {
    fn default() -> Self {
        Self {
            language: None,
            text: None,
            status: CarePlanStatus::Active,
            intent: CarePlanIntent::Plan,
            title: None,
            description: None,
            subject: None,
            context: None,
            period: None,
            supporting_info: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_of: Option<Ref<Organization>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managing_organization: Option<Ref<Organization>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub general_practitioner: Vec<Ref<Organization>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Group {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub member: Vec<GroupMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMember {
    /// Element id; doubles as the bundle full URL of the member entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub entity: AnyRef,
}

impl GroupMember {
    /// Full URL the member's bundle entry is filed under
    pub fn full_url(&self) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| self.entity.id().full_url())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Practitioner {}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RelatedPerson {}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<AnyRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester: Option<ReferralRequester>,

    /// Usually healthcare services
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recipient: Vec<AnyRef>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub supporting_info: Vec<AnyRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralRequester {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<AnyRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_behalf_of: Option<Ref<Organization>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Appointment {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub participant: Vec<AppointmentParticipant>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppointmentParticipant {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<AnyRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeOfCare {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub care_manager: Option<AnyRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub managing_organization: Option<Ref<Organization>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthcareService {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provided_by: Option<Ref<Organization>>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub location: Vec<Ref<Location>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuestionnaireResponse {}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Observation {}

/// FHIR `List`: an enumeration of other resources
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListResource {
    pub status: String,

    pub mode: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounter: Option<Ref<Encounter>>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entry: Vec<ListEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListEntry {
    pub item: AnyRef,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_matches_body() {
        let body = Organization::default().into_body();
        assert_eq!(body.kind(), ResourceKind::Organization);
        assert_eq!(ListResource::KIND, ResourceKind::List);
        assert_eq!(ResourceKind::EpisodeOfCare.to_string(), "EpisodeOfCare");
    }

    #[test]
    fn test_downcast() {
        let resource = Resource::new(ResourceId::new_random(), Location::default().into_body());
        assert!(resource.downcast::<Location>().is_some());
        assert!(resource.downcast::<Organization>().is_none());
    }

    #[test]
    fn test_ref_serializes_as_reference() {
        let id = ResourceId::new_random();
        let reference: Ref<Organization> = Ref::new(id);
        assert_eq!(
            serde_json::to_value(reference).unwrap(),
            json!({"reference": format!("urn:uuid:{}", id)})
        );
        assert_eq!(reference.erase().id(), id);
    }

    #[test]
    fn test_to_value_layout() {
        let parent = ResourceId::new_random();
        let mut extensions = Map::new();
        extensions.insert("name".to_string(), json!("Out of hours"));
        extensions.insert("partOf".to_string(), json!("ignored"));

        let resource = Resource::new(
            ResourceId::new_random(),
            Organization {
                part_of: Some(Ref::new(parent)),
            }
            .into_body(),
        )
        .with_extensions(extensions);

        let value = resource.to_value().unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["resourceType", "id", "partOf", "name"]);
        assert_eq!(value["resourceType"], "Organization");
        assert_eq!(value["id"], resource.id().to_string());
        assert_eq!(value["partOf"]["reference"], parent.full_url());
        assert_eq!(value["name"], "Out of hours");
    }

    #[test]
    fn test_empty_payload_renders_tag_and_id() {
        let resource = Resource::new(ResourceId::new_random(), Practitioner {}.into_body());
        let value = resource.to_value().unwrap();
        assert_eq!(
            value,
            json!({"resourceType": "Practitioner", "id": resource.id().to_string()})
        );
    }

    #[test]
    fn test_group_member_full_url() {
        let entity = ResourceId::new_random();
        let with_id = GroupMember {
            id: Some("urn:uuid:member-1".to_string()),
            entity: Ref::new(entity),
        };
        let without_id = GroupMember {
            id: None,
            entity: Ref::new(entity),
        };
        assert_eq!(with_id.full_url(), "urn:uuid:member-1");
        assert_eq!(without_id.full_url(), entity.full_url());
    }

    #[test]
    fn test_supporting_info_only_on_supporting_kinds() {
        let mut care_plan = CarePlan::default().into_body();
        let mut location = Location::default().into_body();
        assert!(care_plan.supporting_info_mut().is_some());
        assert!(location.supporting_info_mut().is_none());
    }

    #[test]
    fn test_narrative_escapes_markup() {
        let narrative = Narrative::generated("Drink <lots> of water & rest");
        assert_eq!(narrative.status, "generated");
        assert_eq!(
            narrative.div,
            "<div xmlns=\"http://www.w3.org/1999/xhtml\">Drink &lt;lots&gt; of water &amp; rest</div>"
        );
    }
}
