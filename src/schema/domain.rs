//! Domain types for disease selection, outcomes and feature ordering.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which of the three independent prediction tasks is being performed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiseaseId {
    Diabetes,
    Heart,
    Parkinsons,
}

impl DiseaseId {
    pub const ALL: [DiseaseId; 3] = [DiseaseId::Diabetes, DiseaseId::Heart, DiseaseId::Parkinsons];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiseaseId::Diabetes => "diabetes",
            DiseaseId::Heart => "heart",
            DiseaseId::Parkinsons => "parkinsons",
        }
    }

    /// File stem of the serialized classifier for this disease.
    pub fn artefact_stem(&self) -> &'static str {
        match self {
            DiseaseId::Diabetes => "diabetes_model",
            DiseaseId::Heart => "heart_disease_model",
            DiseaseId::Parkinsons => "parkinsons_model",
        }
    }

    /// Field table the classifier for this disease was trained on.
    pub fn schema(&self) -> &'static FeatureSchema {
        FeatureSchema::for_disease(*self)
    }
}

impl fmt::Display for DiseaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a string does not name a known disease.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown disease `{0}`")]
pub struct UnknownDisease(pub String);

impl FromStr for DiseaseId {
    type Err = UnknownDisease;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "diabetes" => Ok(DiseaseId::Diabetes),
            "heart" | "heart_disease" => Ok(DiseaseId::Heart),
            "parkinsons" | "parkinson" => Ok(DiseaseId::Parkinsons),
            _ => Err(UnknownDisease(raw.to_string())),
        }
    }
}

/// Binary diagnosis.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Positive,
    Negative,
}

impl Outcome {
    pub const ALL: [Outcome; 2] = [Outcome::Positive, Outcome::Negative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Positive => "positive",
            Outcome::Negative => "negative",
        }
    }

    pub fn is_positive(&self) -> bool {
        matches!(self, Outcome::Positive)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One input of a feature schema.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FieldSpec {
    /// Key looked up in the raw input.
    pub name: &'static str,
    /// Caption a form shows next to the input.
    pub label: &'static str,
}

const fn field(name: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec { name, label }
}

const fn same(name: &'static str) -> FieldSpec {
    FieldSpec { name, label: name }
}

/// Ordered feature list for one disease. Order matches the training data.
#[derive(Debug, Eq, PartialEq)]
pub struct FeatureSchema {
    pub disease: DiseaseId,
    pub fields: &'static [FieldSpec],
}

static DIABETES: FeatureSchema = FeatureSchema {
    disease: DiseaseId::Diabetes,
    fields: &[
        same("Pregnancies"),
        same("Glucose"),
        same("BloodPressure"),
        same("SkinThickness"),
        same("Insulin"),
        same("BMI"),
        field("DiabetesPedigreeFunction", "DPF"),
        same("Age"),
    ],
};

static HEART: FeatureSchema = FeatureSchema {
    disease: DiseaseId::Heart,
    fields: &[
        same("age"),
        same("sex"),
        same("cp"),
        same("trestbps"),
        same("chol"),
        same("fbs"),
        same("restecg"),
        same("thalach"),
        same("exang"),
        same("oldpeak"),
        same("slope"),
        same("ca"),
        same("thal"),
    ],
};

static PARKINSONS: FeatureSchema = FeatureSchema {
    disease: DiseaseId::Parkinsons,
    fields: &[
        same("MDVP:Fo(Hz)"),
        same("MDVP:Fhi(Hz)"),
        same("MDVP:Flo(Hz)"),
        same("MDVP:Jitter(%)"),
        same("MDVP:Jitter(Abs)"),
        same("MDVP:RAP"),
        same("MDVP:PPQ"),
        same("Jitter:DDP"),
        same("MDVP:Shimmer"),
        same("MDVP:Shimmer(dB)"),
        same("Shimmer:APQ3"),
        same("Shimmer:APQ5"),
        same("MDVP:APQ"),
        same("Shimmer:DDA"),
        same("NHR"),
        same("HNR"),
        same("RPDE"),
        same("DFA"),
        same("spread1"),
        same("spread2"),
        same("D2"),
        same("PPE"),
    ],
};

impl FeatureSchema {
    pub fn for_disease(disease: DiseaseId) -> &'static FeatureSchema {
        match disease {
            DiseaseId::Diabetes => &DIABETES,
            DiseaseId::Heart => &HEART,
            DiseaseId::Parkinsons => &PARKINSONS,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn arities_match_trained_classifiers() {
        assert_eq!(DiseaseId::Diabetes.schema().len(), 8);
        assert_eq!(DiseaseId::Heart.schema().len(), 13);
        assert_eq!(DiseaseId::Parkinsons.schema().len(), 22);
    }

    #[test]
    fn diabetes_order_is_fixed() {
        let names: Vec<_> = DiseaseId::Diabetes.schema().names().collect();
        assert_eq!(
            names,
            [
                "Pregnancies",
                "Glucose",
                "BloodPressure",
                "SkinThickness",
                "Insulin",
                "BMI",
                "DiabetesPedigreeFunction",
                "Age"
            ]
        );
        assert_eq!(DiseaseId::Diabetes.schema().fields[6].label, "DPF");
    }

    #[test]
    fn field_names_are_unique_per_schema() {
        for disease in DiseaseId::ALL {
            let schema = disease.schema();
            let unique: HashSet<_> = schema.names().collect();
            assert_eq!(unique.len(), schema.len(), "{disease}");
            assert_eq!(schema.disease, disease);
        }
    }

    #[test]
    fn disease_ids_parse_with_aliases() {
        assert_eq!("Diabetes".parse::<DiseaseId>(), Ok(DiseaseId::Diabetes));
        assert_eq!("heart_disease".parse::<DiseaseId>(), Ok(DiseaseId::Heart));
        assert_eq!(" parkinson ".parse::<DiseaseId>(), Ok(DiseaseId::Parkinsons));
        assert!("flu".parse::<DiseaseId>().is_err());
    }

    #[test]
    fn position_follows_schema_order() {
        let heart = DiseaseId::Heart.schema();
        assert_eq!(heart.position("age"), Some(0));
        assert_eq!(heart.position("thal"), Some(12));
        assert_eq!(heart.position("Age"), None);
    }
}
