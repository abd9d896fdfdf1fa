//! Resource models for encounter report conversion
//!
//! This crate provides the in-memory model shared by the section classifier
//! and the bundle assembler.
//!
//! # Module Organization
//!
//! - `coding`: coded values and code-system translation
//! - `resource`: typed resource payloads and identity-based references
//! - `registry`: the per-document store every reference resolves against
//! - `bundle`: the FHIR Bundle wire model produced at the end
//!
//! # Example
//!
//! ```rust
//! use casebridge_models::{CreationRegistry, Location, Organization};
//!
//! let mut registry = CreationRegistry::new();
//! let trust = registry.create(Organization::default());
//! let site = registry.create(Location {
//!     managing_organization: Some(trust),
//! });
//!
//! let location = registry.resolve(site).unwrap();
//! assert_eq!(location.managing_organization, Some(trust));
//! ```

pub mod bundle;
pub mod coding;
pub mod error;
pub mod registry;
pub mod resource;

// Re-export commonly used types
pub use bundle::*;
pub use coding::{map_system, translate, CodeValue, CodeableConcept, SNOMED_OID, SNOMED_URI};
pub use error::{Error, Result};
pub use registry::CreationRegistry;
pub use resource::*;
