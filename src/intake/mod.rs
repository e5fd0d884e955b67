//! Intake: raw per-field text in, ordered numeric feature vector out.

pub mod domain;
pub mod service;

pub use domain::{FeatureVector, RawInput};
pub use service::coerce;
