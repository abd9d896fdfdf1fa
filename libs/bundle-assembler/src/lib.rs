//! Encounter bundle assembly
//!
//! Turns the resources created for one clinical document into an ordered,
//! duplicate-free transaction bundle.
//!
//! # Module Organization
//!
//! - `config`: YAML-loadable settings for linking and rendering
//! - `linker`: attaches earlier resources as supporting information
//! - `care_plan`: creates a care plan per advice section of the document
//! - `assembler`: walks the encounter's reference graph
//! - `manifest`: derives the List resource closing a bundle
//! - `transaction`: renders an assembled bundle as FHIR `Bundle` JSON
//!
//! # Example
//!
//! ```rust
//! use casebridge_assembler::{AssemblerConfig, BundleAssembler};
//! use casebridge_models::{Composition, CreationRegistry, Encounter, Organization};
//!
//! let mut registry = CreationRegistry::new();
//! let provider = registry.create(Organization::default());
//! let encounter = registry.create(Encounter {
//!     service_provider: Some(provider),
//!     ..Encounter::default()
//! });
//! let composition = registry.create(Composition::default());
//!
//! let config = AssemblerConfig::default();
//! let assembled = BundleAssembler::new(&registry)
//!     .assemble(encounter, composition)
//!     .unwrap();
//! assert_eq!(assembled.len(), 4);
//!
//! let bundle = assembled.to_fhir_bundle(&config).unwrap();
//! assert!(bundle.is_transaction());
//! ```

pub mod assembler;
pub mod care_plan;
pub mod config;
pub mod error;
pub mod linker;
pub mod manifest;
pub mod transaction;

pub use assembler::{AssembledBundle, AssembledEntry, BundleAssembler};
pub use care_plan::{care_plan_from_section, CarePlanMapper, EncounterContext};
pub use config::AssemblerConfig;
pub use error::{ConfigError, Error, Result};
pub use linker::link_supporting_info;
pub use manifest::{derive_manifest, manifest_id};
