//! Coded values and code-system translation
//!
//! Source documents identify terminologies by OID while FHIR expects canonical
//! URIs. [`translate`] applies the static substitution table; anything it does
//! not know about passes through untouched.

use serde::Serialize;
use std::hash::{Hash, Hasher};

/// OID used by source documents for SNOMED CT
pub const SNOMED_OID: &str = "2.16.840.1.113883.2.1.3.2.4.15";

/// Canonical FHIR URI for SNOMED CT
pub const SNOMED_URI: &str = "http://snomed.info/sct";

const SYSTEM_SUBSTITUTIONS: &[(&str, &str)] = &[(SNOMED_OID, SNOMED_URI)];

/// A single coding drawn from a code system
///
/// Equality and hashing consider only `system` and `code`; `display` is
/// informational.
#[derive(Debug, Clone, Serialize, Eq)]
pub struct CodeValue {
    pub system: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl CodeValue {
    pub fn new(
        system: impl Into<String>,
        code: impl Into<String>,
        display: Option<impl Into<String>>,
    ) -> Self {
        Self {
            system: system.into(),
            code: code.into(),
            display: display.map(Into::into),
        }
    }

    /// Check whether this coding names the given `(system, code)` pair
    pub fn is(&self, system: &str, code: &str) -> bool {
        self.system == system && self.code == code
    }
}

impl PartialEq for CodeValue {
    fn eq(&self, other: &Self) -> bool {
        self.system == other.system && self.code == other.code
    }
}

impl Hash for CodeValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.system.hash(state);
        self.code.hash(state);
    }
}

/// Map a source code-system identifier to its canonical form
pub fn map_system(system: &str) -> &str {
    SYSTEM_SUBSTITUTIONS
        .iter()
        .find(|(source, _)| *source == system)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(system)
}

/// Build a [`CodeValue`] with the code system normalized
pub fn translate(system: &str, code: &str, display: Option<&str>) -> CodeValue {
    CodeValue::new(map_system(system), code, display)
}

/// A concept expressed as one or more codings plus optional text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CodeableConcept {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<CodeValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CodeableConcept {
    /// Create a concept whose text is the display of its first coding
    pub fn from_codings(coding: Vec<CodeValue>) -> Self {
        let text = coding.first().and_then(|c| c.display.clone());
        Self { coding, text }
    }

    /// Create a concept from untranslated `(system, code, display)` triples
    pub fn from_source_codes<'a, I>(codes: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str, Option<&'a str>)>,
    {
        Self::from_codings(
            codes
                .into_iter()
                .map(|(system, code, display)| translate(system, code, display))
                .collect(),
        )
    }
}
