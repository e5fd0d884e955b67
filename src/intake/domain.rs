//! Request-scoped input containers.

use std::collections::HashMap;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::schema::FeatureSchema;

/// Field name to free-form text, as typed by the user for one request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawInput {
    values: HashMap<String, String>,
}

impl RawInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind values to fields in schema order. Surplus values are dropped and
    /// fields without a value stay absent.
    pub fn positional<S: AsRef<str>>(schema: &FeatureSchema, values: &[S]) -> Self {
        schema
            .names()
            .zip(values.iter())
            .map(|(name, value)| (name, value.as_ref()))
            .collect()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(field.into(), value.into());
        self
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.values.remove(field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Field names not present in `schema`.
    pub fn unknown_fields<'a>(&'a self, schema: &'a FeatureSchema) -> impl Iterator<Item = &'a str> {
        self.values
            .keys()
            .map(String::as_str)
            .filter(move |name| schema.position(name).is_none())
    }
}

impl<K, V> FromIterator<(K, V)> for RawInput
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Numeric features in schema order. Only built by [`super::coerce`].
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub(crate) fn from_ordered(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl Deref for FeatureVector {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}
