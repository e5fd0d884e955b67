//! Text to number coercion.
//!
//! Values are accepted as long as they parse as finite base-10 numbers.
//! There is no physiological range check: a negative age or a blood pressure
//! of zero passes through unchanged. That permissive intake is current
//! behaviour, kept as a known limitation.

use crate::common::error::CoercionError;
use crate::schema::FeatureSchema;

use super::domain::{FeatureVector, RawInput};

/// Build the feature vector for `schema`, failing on the first bad field.
pub fn coerce(schema: &FeatureSchema, raw: &RawInput) -> Result<FeatureVector, CoercionError> {
    let mut values = Vec::with_capacity(schema.len());
    for field in schema.fields {
        let text = raw.get(field.name).ok_or_else(|| CoercionError::MissingField {
            field: field.name.to_string(),
        })?;
        values.push(parse_number(field.name, text)?);
    }
    Ok(FeatureVector::from_ordered(values))
}

fn parse_number(field: &str, text: &str) -> Result<f64, CoercionError> {
    let invalid = || CoercionError::InvalidNumber {
        field: field.to_string(),
        text: text.to_string(),
    };

    let trimmed = text.trim();
    // `f64::from_str` accepts "inf" and "NaN"; neither is a measurement.
    if trimmed.is_empty() || !trimmed.bytes().any(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(invalid()),
    }
}
