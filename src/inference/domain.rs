//! Request and result types for a prediction call.

use serde::{Deserialize, Serialize};

use crate::intake::RawInput;
use crate::schema::{DiseaseId, Outcome};

/// Caller-supplied context. Access control happens before the core is
/// invoked; the context only correlates log lines.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    #[serde(default)]
    pub request_id: Option<String>,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: Some(request_id.into()),
        }
    }
}

/// One prediction request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub disease: DiseaseId,
    pub fields: RawInput,
    #[serde(default)]
    pub context: RequestContext,
}

impl PredictionRequest {
    pub fn new(disease: DiseaseId, fields: RawInput) -> Self {
        Self {
            disease,
            fields,
            context: RequestContext::default(),
        }
    }

    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }
}

/// Complete answer for one request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub disease: DiseaseId,
    pub outcome: Outcome,
    pub suggestion: String,
}
