//! Clinical document sections
//!
//! Provides the owned section tree produced by the document parser and the
//! classifier that locates coded sections anywhere in it.
//!
//! # Example
//!
//! ```rust
//! use casebridge_models::SNOMED_OID;
//! use casebridge_sections::{
//!     find_sections, is_information_advice_given, Section, SectionCode, INFORMATION_ADVICE_GIVEN,
//! };
//!
//! let advice = SectionCode::new(SNOMED_OID, INFORMATION_ADVICE_GIVEN);
//! let root = Section::new("Report")
//!     .with_component(Section::new("A").with_code(advice.clone()).with_component(
//!         Section::new("C").with_code(advice),
//!     ))
//!     .with_component(Section::new("B"));
//!
//! let found = find_sections(&root, is_information_advice_given);
//! let titles: Vec<&str> = found.iter().map(|s| s.title.as_str()).collect();
//! assert_eq!(titles, ["A", "C"]);
//! ```

pub mod classifier;
pub mod section;

pub use classifier::{
    find_sections, find_sections_in_body, is_information_advice_given, INFORMATION_ADVICE_GIVEN,
};
pub use section::{Section, SectionCode, StructuredBody};
