//! Classifier artefacts, the `Classifier` capability and loaded handles.
//!
//! Artefacts are produced by an external training pipeline as JSON documents
//! tagged by `kind`. Only the "load once, predict many" path lives here.

use serde::{Deserialize, Serialize};

use crate::common::error::ModelError;
use crate::common::ids::Fingerprint;
use crate::intake::FeatureVector;
use crate::schema::{DiseaseId, Outcome};

/// A trained model that maps a feature slice to a raw class label.
///
/// Implementations must be pure: the same slice always yields the same label
/// and nothing is mutated, so a handle can be shared across threads freely.
pub trait Classifier: Send + Sync {
    /// Number of features the model was trained on.
    fn n_features(&self) -> usize;
    /// Raw label for a slice of exactly `n_features()` values.
    ///
    /// A slice of another length is a `DimensionMismatch`; a model that
    /// cannot decide (e.g. an overflowing decision) reports an error rather
    /// than falling back to a class.
    fn predict_label(&self, features: &[f64]) -> Result<i64, ModelError>;
    /// Short name of the model family for logs.
    fn kind(&self) -> &'static str;
}

/// Decode a raw classifier label into an outcome.
pub fn decode_label(label: i64) -> Result<Outcome, ModelError> {
    match label {
        1 => Ok(Outcome::Positive),
        0 => Ok(Outcome::Negative),
        other => Err(ModelError::UnexpectedLabel(other)),
    }
}

/// Serialized form of a classifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ModelArtefact {
    Linear(LinearModel),
    Tree(TreeModel),
}

impl ModelArtefact {
    pub fn from_json(disease: DiseaseId, bytes: &[u8]) -> Result<Self, ModelError> {
        serde_json::from_slice(bytes).map_err(|err| ModelError::Malformed {
            disease,
            detail: err.to_string(),
        })
    }

    /// Check internal consistency and turn the artefact into a classifier.
    pub fn into_classifier(self, disease: DiseaseId) -> Result<Box<dyn Classifier>, ModelError> {
        let malformed = |detail: String| ModelError::Malformed { disease, detail };
        match self {
            ModelArtefact::Linear(model) => {
                model.validate().map_err(malformed)?;
                Ok(Box::new(model))
            }
            ModelArtefact::Tree(model) => {
                model.validate().map_err(malformed)?;
                Ok(Box::new(model))
            }
        }
    }
}

/// Per-feature standardisation applied before the linear decision.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

fn default_classes() -> [i64; 2] {
    [0, 1]
}

/// Linear decision function (logistic regression or linear SVM export).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub n_features: usize,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// Labels for a non-positive and a positive decision, in that order.
    #[serde(default = "default_classes")]
    pub classes: [i64; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaler: Option<Scaler>,
}

impl LinearModel {
    fn validate(&self) -> Result<(), String> {
        if self.coefficients.len() != self.n_features {
            return Err(format!(
                "{} coefficients for {} features",
                self.coefficients.len(),
                self.n_features
            ));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|w| !w.is_finite()) {
            return Err("non-finite coefficient".into());
        }
        if let Some(scaler) = &self.scaler {
            if scaler.mean.len() != self.n_features || scaler.scale.len() != self.n_features {
                return Err("scaler length differs from n_features".into());
            }
            if scaler.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
                return Err("scaler has a zero or non-finite scale".into());
            }
        }
        Ok(())
    }

    /// Signed distance from the separating hyperplane.
    pub fn decision(&self, features: &[f64]) -> f64 {
        let dot: f64 = match &self.scaler {
            Some(scaler) => features
                .iter()
                .zip(&self.coefficients)
                .zip(scaler.mean.iter().zip(&scaler.scale))
                .map(|((x, w), (mean, scale))| w * (x - mean) / scale)
                .sum(),
            None => features
                .iter()
                .zip(&self.coefficients)
                .map(|(x, w)| w * x)
                .sum(),
        };
        dot + self.intercept
    }
}

impl Classifier for LinearModel {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_label(&self, features: &[f64]) -> Result<i64, ModelError> {
        if features.len() != self.n_features {
            return Err(ModelError::DimensionMismatch {
                expected: self.n_features,
                actual: features.len(),
            });
        }
        let decision = self.decision(features);
        if !decision.is_finite() {
            return Err(ModelError::NonFiniteDecision);
        }
        Ok(if decision > 0.0 {
            self.classes[1]
        } else {
            self.classes[0]
        })
    }

    fn kind(&self) -> &'static str {
        "linear"
    }
}

/// Node of a binary decision tree stored in a flat array.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// `features[feature] <= threshold` goes to `left`, otherwise `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        label: i64,
    },
}

/// Decision tree rooted at `nodes[0]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeModel {
    pub n_features: usize,
    pub nodes: Vec<TreeNode>,
}

impl TreeModel {
    fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".into());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } = node
            {
                if *feature >= self.n_features {
                    return Err(format!("node {idx} splits on feature {feature}"));
                }
                if threshold.is_nan() {
                    return Err(format!("node {idx} has a NaN threshold"));
                }
                // Children must come after their parent, which rules out cycles.
                for child in [*left, *right] {
                    if child <= idx || child >= self.nodes.len() {
                        return Err(format!("node {idx} points at invalid child {child}"));
                    }
                }
            }
        }
        Ok(())
    }
}

impl Classifier for TreeModel {
    fn n_features(&self) -> usize {
        self.n_features
    }

    /// Node indices are trusted; trees built by hand should go through
    /// `ModelArtefact::into_classifier` first.
    fn predict_label(&self, features: &[f64]) -> Result<i64, ModelError> {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { label } => return Ok(*label),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = features.get(*feature).ok_or(ModelError::DimensionMismatch {
                        expected: self.n_features,
                        actual: features.len(),
                    })?;
                    idx = if value <= threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    fn kind(&self) -> &'static str {
        "tree"
    }
}

/// A loaded, read-only classifier bound to one disease.
pub struct ClassifierHandle {
    disease: DiseaseId,
    fingerprint: String,
    model: Box<dyn Classifier>,
}

impl ClassifierHandle {
    pub fn new(disease: DiseaseId, model: Box<dyn Classifier>) -> Self {
        Self {
            disease,
            fingerprint: String::from("-"),
            model,
        }
    }

    /// Parse and validate serialized artefact bytes.
    pub fn from_bytes(disease: DiseaseId, bytes: &[u8]) -> Result<Self, ModelError> {
        let model = ModelArtefact::from_json(disease, bytes)?.into_classifier(disease)?;
        Ok(Self {
            disease,
            fingerprint: Fingerprint::of(bytes).finish_hex(),
            model,
        })
    }

    pub fn disease(&self) -> DiseaseId {
        self.disease
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn n_features(&self) -> usize {
        self.model.n_features()
    }

    pub fn kind(&self) -> &'static str {
        self.model.kind()
    }

    /// Run the classifier and decode its label.
    pub fn predict(&self, features: &FeatureVector) -> Result<Outcome, ModelError> {
        let expected = self.model.n_features();
        if features.len() != expected {
            return Err(ModelError::DimensionMismatch {
                expected,
                actual: features.len(),
            });
        }
        decode_label(self.model.predict_label(features.as_slice())?)
    }
}

impl std::fmt::Debug for ClassifierHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierHandle")
            .field("disease", &self.disease)
            .field("kind", &self.model.kind())
            .field("n_features", &self.model.n_features())
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

/// Source of serialized classifier artefacts.
pub trait ModelRepo: Sync {
    /// Raw artefact bytes; a missing artefact is `ModelError::Unavailable`.
    fn fetch(&self, disease: DiseaseId) -> Result<Vec<u8>, ModelError>;
}
