//! Prediction dispatch: schema, coercion, classifier and suggestion in one call.

pub mod domain;
pub mod service;

pub use domain::{PredictionRequest, PredictionResult, RequestContext};
pub use service::PredictionService;
