//! Disease identifiers and the single field table per disease.
//!
//! Every feature vector in the crate is built from these tables; there is no
//! second copy of a field list anywhere else.

pub mod domain;

pub use domain::{DiseaseId, FeatureSchema, FieldSpec, Outcome};
