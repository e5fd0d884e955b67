//! Error handling primitives shared across the core.
//!
//! Every error type carries a stable [`ErrorCode`] so the C boundary can
//! report failures without parsing messages.

use thiserror::Error;

use crate::schema::{DiseaseId, Outcome};

/// Stable error codes that cross the FFI boundary.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorCode {
    /// Success code used as a sentinel.
    Ok = 0,
    /// A field was missing or did not parse as a number.
    InvalidInput = 1,
    /// The classifier for the requested disease is not loaded.
    ModelUnavailable = 2,
    /// Schema and classifier disagree; a deployment bug.
    Internal = 3,
    /// Startup configuration (catalog, paths) is unusable.
    Config = 4,
}

/// Coarse grouping that tells a caller what kind of message to render.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    /// Fix the input and retry.
    UserInput,
    /// Nothing the user can do; the deployment is missing pieces.
    Deployment,
    /// Contract violation inside the system.
    Internal,
}

/// Failures while turning raw text into a feature vector.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CoercionError {
    #[error("missing value for field `{field}`")]
    MissingField { field: String },
    #[error("field `{field}` is not a finite number: {text:?}")]
    InvalidNumber { field: String, text: String },
}

impl CoercionError {
    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            CoercionError::MissingField { field } | CoercionError::InvalidNumber { field, .. } => {
                field
            }
        }
    }
}

/// Failures while loading or invoking a classifier.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("no classifier loaded for {0}")]
    Unavailable(DiseaseId),
    #[error("cannot read artefact for {disease}: {detail}")]
    Io { disease: DiseaseId, detail: String },
    #[error("malformed artefact for {disease}: {detail}")]
    Malformed { disease: DiseaseId, detail: String },
    #[error("feature vector has {actual} values, classifier expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("classifier produced label {0}, expected 0 or 1")]
    UnexpectedLabel(i64),
    #[error("classifier decision is not a finite number")]
    NonFiniteDecision,
}

impl ModelError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ModelError::Unavailable(_) | ModelError::Io { .. } | ModelError::Malformed { .. } => {
                ErrorCode::ModelUnavailable
            }
            ModelError::DimensionMismatch { .. }
            | ModelError::UnexpectedLabel(_)
            | ModelError::NonFiniteDecision => ErrorCode::Internal,
        }
    }
}

/// Failures while building or loading the suggestion catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no suggestion for {disease}/{outcome}")]
    MissingEntry { disease: DiseaseId, outcome: Outcome },
    #[error("cannot read suggestion catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed suggestion catalog: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl CatalogError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::Config
    }
}

/// The single error returned by a prediction call.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PredictionError {
    #[error("invalid input for `{field}`: {detail}")]
    InvalidInput {
        field: String,
        #[source]
        detail: CoercionError,
    },
    #[error("prediction for {0} is unavailable")]
    ModelUnavailable(DiseaseId),
    #[error("internal inconsistency: {0}")]
    InternalInconsistency(#[source] ModelError),
}

impl PredictionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PredictionError::InvalidInput { .. } => ErrorCode::InvalidInput,
            PredictionError::ModelUnavailable(_) => ErrorCode::ModelUnavailable,
            PredictionError::InternalInconsistency(_) => ErrorCode::Internal,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            PredictionError::InvalidInput { .. } => ErrorClass::UserInput,
            PredictionError::ModelUnavailable(_) => ErrorClass::Deployment,
            PredictionError::InternalInconsistency(_) => ErrorClass::Internal,
        }
    }
}

impl From<CoercionError> for PredictionError {
    fn from(detail: CoercionError) -> Self {
        PredictionError::InvalidInput {
            field: detail.field().to_string(),
            detail,
        }
    }
}

impl From<ModelError> for PredictionError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Unavailable(disease)
            | ModelError::Io { disease, .. }
            | ModelError::Malformed { disease, .. } => PredictionError::ModelUnavailable(disease),
            other => PredictionError::InternalInconsistency(other),
        }
    }
}

/// Result alias used for prediction calls.
pub type PredictResult<T> = Result<T, PredictionError>;
