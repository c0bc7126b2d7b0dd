//! Feature encoder
//!
//! Converts raw survey answers into the fixed-width feature vector described
//! by a [`FeatureSchema`].

use crate::category::{Category, Level};
use crate::schema::{ColumnSpec, FeatureSchema, SchemaError};
use churnx_core::{AnswerValue, EncodeError, FeatureVector, RawAnswers};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// What to do with a category label outside the known level table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryPolicy {
    /// Encode the whole group as the baseline (all zeros) and log a warning.
    /// This is how the churn form has always behaved.
    #[default]
    Baseline,
    /// Reject the request with [`EncodeError::UnrecognizedCategory`]
    Strict,
}

/// Schema-driven encoder from raw answers to feature vectors
#[derive(Debug, Clone)]
pub struct Encoder {
    schema: FeatureSchema,
    policy: CategoryPolicy,
    categories: Vec<Category>,
}

impl Encoder {
    /// Create an encoder for a validated copy of `schema`
    pub fn new(schema: FeatureSchema) -> Result<Self, SchemaError> {
        Self::with_policy(schema, CategoryPolicy::default())
    }

    pub fn with_policy(schema: FeatureSchema, policy: CategoryPolicy) -> Result<Self, SchemaError> {
        schema.validate()?;
        Ok(Self::from_valid(schema, policy))
    }

    /// Encoder for the built-in churn layout
    pub fn churn(policy: CategoryPolicy) -> Self {
        Self::from_valid(FeatureSchema::churn(), policy)
    }

    fn from_valid(schema: FeatureSchema, policy: CategoryPolicy) -> Self {
        let categories = schema.categories();
        Self {
            schema,
            policy,
            categories,
        }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn policy(&self) -> CategoryPolicy {
        self.policy
    }

    /// Width of every vector this encoder produces
    pub fn dim(&self) -> usize {
        self.schema.len()
    }

    /// Encode one set of answers.
    ///
    /// Each category answer is read once, then a single pass over the
    /// columns writes every slot exactly once.
    pub fn encode(&self, answers: &RawAnswers) -> Result<FeatureVector, EncodeError> {
        let resolved = self.resolve_categories(answers)?;

        let mut data = Vec::with_capacity(self.schema.len());
        for column in self.schema.columns() {
            let value = match *column {
                ColumnSpec::Numeric { name } => read_number(answers, name)?,
                ColumnSpec::Indicator { category, level, .. } => {
                    if resolved[category.index()] == level {
                        1.0
                    } else {
                        0.0
                    }
                }
            };
            data.push(value);
        }

        debug_assert_eq!(data.len(), self.schema.len());
        Ok(FeatureVector::new(data))
    }

    /// Encode a batch, keeping input order
    pub fn encode_many(&self, batch: &[RawAnswers]) -> Vec<Result<FeatureVector, EncodeError>> {
        batch.iter().map(|answers| self.encode(answers)).collect()
    }

    /// Resolve every category in the schema to a level index.
    ///
    /// Slots of categories the schema does not use stay at the baseline and
    /// are never read.
    fn resolve_categories(&self, answers: &RawAnswers) -> Result<[u8; Category::COUNT], EncodeError> {
        let mut resolved = [0u8; Category::COUNT];
        for &category in &self.categories {
            resolved[category.index()] = self.resolve(answers, category)?.index();
        }
        Ok(resolved)
    }

    fn resolve(&self, answers: &RawAnswers, category: Category) -> Result<Level, EncodeError> {
        let value = lookup(answers, category.field())?;
        let label = value.as_label();
        match category.resolve(&label) {
            Some(level) => Ok(level),
            None => match self.policy {
                CategoryPolicy::Strict => Err(EncodeError::UnrecognizedCategory {
                    field: category.field().to_string(),
                    value: label.into_owned(),
                }),
                CategoryPolicy::Baseline => {
                    warn!(
                        field = category.field(),
                        value = %label,
                        baseline = category.baseline().label(),
                        "Unrecognized category, encoding as baseline"
                    );
                    Ok(category.baseline())
                }
            },
        }
    }
}

fn lookup<'a>(answers: &'a RawAnswers, field: &str) -> Result<&'a AnswerValue, EncodeError> {
    answers.get(field).ok_or_else(|| EncodeError::MissingField {
        field: field.to_string(),
    })
}

/// Numbers pass through unclamped; only non-finite values are rejected
fn read_number(answers: &RawAnswers, field: &str) -> Result<f64, EncodeError> {
    let value = lookup(answers, field)?;
    match value.as_number() {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(EncodeError::InvalidNumber {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}
