//! Section tree of a clinical document
//!
//! Sections own their children; there are no back-edges. The tree is built
//! once by the document parser and only read afterwards.

use casebridge_models::{translate, CodeValue};
use serde::{Deserialize, Serialize};

/// Structured body of a clinical document: the top-level components
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredBody {
    #[serde(default)]
    pub components: Vec<Section>,
}

/// A titled, coded block of narrative with nested sub-sections
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,

    /// Narrative blocks, in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub text: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<SectionCode>,

    /// Child sections, in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Section>,
}

/// Coded value exactly as it appears in the source document
///
/// Any attribute may be missing; a code is only usable when both `code` and
/// `code_system` are present and non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionCode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_system: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl SectionCode {
    pub fn new(code_system: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            code_system: Some(code_system.into()),
            display_name: None,
        }
    }

    pub fn with_display(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Translate into a normalized [`CodeValue`], if well formed
    pub fn to_code_value(&self) -> Option<CodeValue> {
        let code = self.code.as_deref().filter(|c| !c.is_empty())?;
        let system = self.code_system.as_deref().filter(|s| !s.is_empty())?;
        Some(translate(system, code, self.display_name.as_deref()))
    }
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_code(mut self, code: SectionCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_language(mut self, language_code: impl Into<String>) -> Self {
        self.language_code = Some(language_code.into());
        self
    }

    pub fn with_text(mut self, block: impl Into<String>) -> Self {
        self.text.push(block.into());
        self
    }

    pub fn with_component(mut self, child: Section) -> Self {
        self.components.push(child);
        self
    }

    /// Normalized code of this section; `None` when missing or malformed
    pub fn code_value(&self) -> Option<CodeValue> {
        self.code.as_ref().and_then(SectionCode::to_code_value)
    }

    /// First narrative block, if any
    pub fn first_text(&self) -> Option<&str> {
        self.text.first().map(String::as_str)
    }

    pub fn is_leaf(&self) -> bool {
        self.components.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casebridge_models::{SNOMED_OID, SNOMED_URI};
    use serde_json::json;

    #[test]
    fn test_code_value_is_translated() {
        let section = Section::new("Advice").with_code(SectionCode::new(SNOMED_OID, "1052951000000105"));
        let code = section.code_value().unwrap();
        assert_eq!(code.system, SNOMED_URI);
        assert_eq!(code.code, "1052951000000105");
    }

    #[test]
    fn test_malformed_codes_are_ignored() {
        let missing_system = SectionCode {
            code: Some("123".to_string()),
            ..SectionCode::default()
        };
        let empty_code = SectionCode {
            code: Some(String::new()),
            code_system: Some(SNOMED_OID.to_string()),
            display_name: None,
        };

        assert_eq!(Section::new("a").code_value(), None);
        assert_eq!(Section::new("b").with_code(missing_system).code_value(), None);
        assert_eq!(Section::new("c").with_code(empty_code).code_value(), None);
    }

    #[test]
    fn test_deserialize_nested_sections() {
        let body: StructuredBody = serde_json::from_value(json!({
            "components": [{
                "title": "Plan",
                "languageCode": "en-GB",
                "text": ["Rest", "Fluids"],
                "components": [{
                    "title": "Advice",
                    "code": {"code": "1052951000000105", "codeSystem": SNOMED_OID}
                }]
            }]
        }))
        .unwrap();

        let plan = &body.components[0];
        assert_eq!(plan.language_code.as_deref(), Some("en-GB"));
        assert_eq!(plan.first_text(), Some("Rest"));
        assert!(!plan.is_leaf());
        assert!(plan.components[0].is_leaf());
        assert!(plan.components[0].code_value().is_some());
    }
}
