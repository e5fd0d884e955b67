//! Validated suggestion catalog.
//!
//! A catalog can only be constructed when every (disease, outcome) pair has a
//! non-empty text, so `lookup` never fails at request time.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::common::error::CatalogError;
use crate::schema::{DiseaseId, Outcome};

/// File layout: `{"diabetes": {"positive": "...", "negative": "..."}, ...}`.
type CatalogFile = HashMap<DiseaseId, HashMap<Outcome, String>>;

#[derive(Clone, Debug)]
pub struct SuggestionCatalog {
    entries: HashMap<(DiseaseId, Outcome), String>,
}

impl SuggestionCatalog {
    /// Build from arbitrary entries, rejecting gaps and blank texts.
    pub fn from_entries<I, S>(entries: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (DiseaseId, Outcome, S)>,
        S: Into<String>,
    {
        let entries: HashMap<_, _> = entries
            .into_iter()
            .map(|(disease, outcome, text)| ((disease, outcome), text.into()))
            .filter(|(_, text): &(_, String)| !text.trim().is_empty())
            .collect();

        for disease in DiseaseId::ALL {
            for outcome in Outcome::ALL {
                if !entries.contains_key(&(disease, outcome)) {
                    return Err(CatalogError::MissingEntry { disease, outcome });
                }
            }
        }
        Ok(Self { entries })
    }

    /// Parse a JSON catalog.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::from_entries(file.into_iter().flat_map(|(disease, texts)| {
            texts
                .into_iter()
                .map(move |(outcome, text)| (disease, outcome, text))
        }))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Texts shipped with the application.
    pub fn builtin() -> Self {
        let mut entries = HashMap::with_capacity(BUILTIN.len());
        for (disease, outcome, text) in BUILTIN {
            entries.insert((*disease, *outcome), (*text).to_string());
        }
        Self { entries }
    }

    pub fn lookup(&self, disease: DiseaseId, outcome: Outcome) -> &str {
        // Construction guarantees totality over DiseaseId x Outcome.
        self.entries
            .get(&(disease, outcome))
            .map(String::as_str)
            .unwrap_or_default()
    }
}

impl Default for SuggestionCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

const BUILTIN: &[(DiseaseId, Outcome, &str)] = &[
    (
        DiseaseId::Diabetes,
        Outcome::Positive,
        "Follow a controlled diet with low sugar and refined carbs. \
         Take your medicines regularly and check blood glucose as advised. \
         Exercise daily and avoid stress to keep your sugar stable.",
    ),
    (
        DiseaseId::Diabetes,
        Outcome::Negative,
        "Maintain a healthy weight and eat balanced meals with less sugar. \
         Exercise regularly to keep insulin levels normal. \
         Go for routine checkups if you have a family history of diabetes.",
    ),
    (
        DiseaseId::Heart,
        Outcome::Positive,
        "Follow a low-salt and low-fat diet strictly. \
         Take heart medications exactly as prescribed. \
         Avoid smoking, alcohol, and heavy stress. \
         Do light exercise only after your doctor approves.",
    ),
    (
        DiseaseId::Heart,
        Outcome::Negative,
        "Eat heart-healthy foods like vegetables, fruits, and lean proteins. \
         Exercise regularly to keep your heart strong. \
         Avoid smoking and control cholesterol levels. \
         Go for routine heart checkups if you have risk factors.",
    ),
    (
        DiseaseId::Parkinsons,
        Outcome::Positive,
        "Take your Parkinson's medications consistently and on time. \
         Do regular physiotherapy to keep movement flexible. \
         Avoid falls by keeping your home safe and walking carefully. \
         Follow up with a neurologist regularly.",
    ),
    (
        DiseaseId::Parkinsons,
        Outcome::Negative,
        "Exercise daily to keep your brain and nerves healthy. \
         Eat antioxidant-rich foods like fruits and vegetables. \
         Avoid exposure to toxins, chemicals, and pesticides. \
         Protect your head from injuries and maintain overall brain health.",
    ),
];
