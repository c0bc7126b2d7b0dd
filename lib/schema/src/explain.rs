//! Explainability for encoded feature vectors
//!
//! Decodes a feature vector back into the answers it represents: one level
//! per category plus the raw numerics. Decoding fails when a vector could not
//! have come from the encoder, such as two indicators of the same category
//! switched on at once.

use crate::category::{Category, Level};
use crate::schema::{ColumnSpec, FeatureSchema};
use churnx_core::FeatureVector;
use serde::Serialize;

/// Level a category was encoded as
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAssignment {
    pub category: Category,
    pub level: &'static str,
    pub is_baseline: bool,
    /// Indicator column that is switched on; `None` for the baseline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericValue {
    pub name: &'static str,
    pub value: f64,
}

/// Decoded view of one feature vector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodingExplanation {
    pub numerics: Vec<NumericValue>,
    pub categories: Vec<CategoryAssignment>,
}

impl EncodingExplanation {
    /// Decode `vector` against `schema`
    pub fn decode(schema: &FeatureSchema, vector: &FeatureVector) -> Result<Self, DecodeError> {
        if vector.len() != schema.len() {
            return Err(DecodeError::WidthMismatch {
                expected: schema.len(),
                actual: vector.len(),
            });
        }

        let numerics = schema
            .columns()
            .iter()
            .enumerate()
            .filter_map(|(i, c)| match c {
                ColumnSpec::Numeric { name } => Some(NumericValue {
                    name: *name,
                    value: vector[i],
                }),
                ColumnSpec::Indicator { .. } => None,
            })
            .collect();

        let mut categories = Vec::new();
        for category in schema.categories() {
            let mut active: Option<(&'static str, Level)> = None;
            for (i, level) in schema.indicators_for(category) {
                let value = vector[i];
                if value == 0.0 {
                    continue;
                }
                let name = schema.columns()[i].name();
                if value != 1.0 {
                    return Err(DecodeError::NonBinaryIndicator {
                        column: name.to_string(),
                        value,
                    });
                }
                if let Some((other, _)) = active {
                    return Err(DecodeError::ConflictingIndicators {
                        category: category.field().to_string(),
                        first: other.to_string(),
                        second: name.to_string(),
                    });
                }
                active = Some((name, level));
            }

            let assignment = match active {
                Some((name, level)) => CategoryAssignment {
                    category,
                    level: level.label(),
                    is_baseline: false,
                    column: Some(name),
                },
                None => CategoryAssignment {
                    category,
                    level: category.baseline().label(),
                    is_baseline: true,
                    column: None,
                },
            };
            categories.push(assignment);
        }

        Ok(Self { numerics, categories })
    }

    /// Level assigned to one category, if the schema encodes it
    pub fn level_of(&self, category: Category) -> Option<&'static str> {
        self.categories
            .iter()
            .find(|a| a.category == category)
            .map(|a| a.level)
    }

    /// Names of the indicator columns that are switched on
    pub fn active_columns(&self) -> Vec<&'static str> {
        self.categories.iter().filter_map(|a| a.column).collect()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("Vector has {actual} values, schema has {expected} columns")]
    WidthMismatch { expected: usize, actual: usize },

    #[error("Indicator '{column}' holds {value}, expected 0 or 1")]
    NonBinaryIndicator { column: String, value: f64 },

    #[error("Category '{category}' has both '{first}' and '{second}' set")]
    ConflictingIndicators {
        category: String,
        first: String,
        second: String,
    },
}
