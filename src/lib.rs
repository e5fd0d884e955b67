// lib.rs - prediction dispatch core
pub mod advice;
pub mod api;
pub mod common;
pub mod inference;
pub mod intake;
pub mod models;
pub mod schema;

pub use common::error::{ErrorClass, ErrorCode, PredictionError};
pub use inference::{PredictionRequest, PredictionResult, PredictionService};
pub use intake::RawInput;
pub use schema::{DiseaseId, Outcome};
