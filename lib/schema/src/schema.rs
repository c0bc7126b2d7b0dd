//! Feature schema definitions
//!
//! The schema is the ordered column layout the scaler and classifier were
//! fitted on. Column order is part of the model contract: reordering columns
//! without retraining silently corrupts every prediction.

use crate::category::{Category, Level};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::HashSet;

/// One column of the feature layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSpec {
    /// Copied verbatim from the answer of the same name
    Numeric { name: &'static str },
    /// 1.0 when `category`'s answer is level `level`, else 0.0
    Indicator {
        name: &'static str,
        category: Category,
        level: u8,
    },
}

impl ColumnSpec {
    pub const fn numeric(name: &'static str) -> Self {
        ColumnSpec::Numeric { name }
    }

    pub const fn indicator(name: &'static str, category: Category, level: u8) -> Self {
        ColumnSpec::Indicator { name, category, level }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColumnSpec::Numeric { name } | ColumnSpec::Indicator { name, .. } => *name,
        }
    }

    /// Category this column belongs to, if it is an indicator
    pub fn category(&self) -> Option<Category> {
        match self {
            ColumnSpec::Numeric { .. } => None,
            ColumnSpec::Indicator { category, .. } => Some(*category),
        }
    }

    /// Label that switches this indicator on
    pub fn match_value(&self) -> Option<&'static str> {
        match *self {
            ColumnSpec::Numeric { .. } => None,
            ColumnSpec::Indicator { category, level, .. } => {
                Level::new(category, level).map(|l| l.label())
            }
        }
    }
}

use Category::*;

static CHURN_COLUMNS: [ColumnSpec; 30] = [
    ColumnSpec::numeric("SeniorCitizen"),
    ColumnSpec::numeric("tenure"),
    ColumnSpec::numeric("MonthlyCharges"),
    ColumnSpec::numeric("TotalCharges"),
    ColumnSpec::indicator("gender_Male", Gender, 1),
    ColumnSpec::indicator("Partner_Yes", Partner, 1),
    ColumnSpec::indicator("Dependents_Yes", Dependents, 1),
    ColumnSpec::indicator("PhoneService_Yes", PhoneService, 1),
    ColumnSpec::indicator("MultipleLines_No phone service", MultipleLines, 1),
    ColumnSpec::indicator("MultipleLines_Yes", MultipleLines, 2),
    ColumnSpec::indicator("InternetService_Fiber optic", InternetService, 1),
    ColumnSpec::indicator("InternetService_No", InternetService, 2),
    ColumnSpec::indicator("OnlineSecurity_No internet service", OnlineSecurity, 1),
    ColumnSpec::indicator("OnlineSecurity_Yes", OnlineSecurity, 2),
    ColumnSpec::indicator("OnlineBackup_No internet service", OnlineBackup, 1),
    ColumnSpec::indicator("OnlineBackup_Yes", OnlineBackup, 2),
    ColumnSpec::indicator("DeviceProtection_No internet service", DeviceProtection, 1),
    ColumnSpec::indicator("DeviceProtection_Yes", DeviceProtection, 2),
    ColumnSpec::indicator("TechSupport_No internet service", TechSupport, 1),
    ColumnSpec::indicator("TechSupport_Yes", TechSupport, 2),
    ColumnSpec::indicator("StreamingTV_No internet service", StreamingTV, 1),
    ColumnSpec::indicator("StreamingTV_Yes", StreamingTV, 2),
    ColumnSpec::indicator("StreamingMovies_No internet service", StreamingMovies, 1),
    ColumnSpec::indicator("StreamingMovies_Yes", StreamingMovies, 2),
    ColumnSpec::indicator("Contract_One year", Contract, 1),
    ColumnSpec::indicator("Contract_Two year", Contract, 2),
    ColumnSpec::indicator("PaperlessBilling_Yes", PaperlessBilling, 1),
    ColumnSpec::indicator("PaymentMethod_Credit card (automatic)", PaymentMethod, 1),
    ColumnSpec::indicator("PaymentMethod_Electronic check", PaymentMethod, 2),
    ColumnSpec::indicator("PaymentMethod_Mailed check", PaymentMethod, 3),
];

/// Ordered column layout expected by the trained pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    columns: Cow<'static, [ColumnSpec]>,
}

impl FeatureSchema {
    /// Build a schema from an explicit column list.
    ///
    /// The list is not checked here; call [`FeatureSchema::validate`] or go
    /// through [`crate::Encoder::new`], which does.
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self {
            columns: Cow::Owned(columns),
        }
    }

    /// The 30-column layout of the churn model
    pub fn churn() -> Self {
        Self {
            columns: Cow::Borrowed(&CHURN_COLUMNS),
        }
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    pub fn numeric_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().filter_map(|c| match c {
            ColumnSpec::Numeric { name } => Some(*name),
            ColumnSpec::Indicator { .. } => None,
        })
    }

    /// Categories referenced by indicator columns, in first-appearance order
    pub fn categories(&self) -> Vec<Category> {
        let mut seen = Vec::new();
        for category in self.columns.iter().filter_map(|c| c.category()) {
            if !seen.contains(&category) {
                seen.push(category);
            }
        }
        seen
    }

    /// Indicator columns of one category as `(column index, level)`
    pub fn indicators_for(&self, category: Category) -> Vec<(usize, Level)> {
        self.columns
            .iter()
            .enumerate()
            .filter_map(|(i, c)| match *c {
                ColumnSpec::Indicator { category: cat, level, .. } if cat == category => {
                    Level::new(cat, level).map(|l| (i, l))
                }
                _ => None,
            })
            .collect()
    }

    /// Every answer field an encode call will read
    pub fn required_fields(&self) -> Vec<&'static str> {
        let mut fields: Vec<&'static str> = self.numeric_fields().collect();
        fields.extend(self.categories().into_iter().map(|c| c.field()));
        fields
    }

    /// Check the structural invariants of the layout.
    ///
    /// A category with `k` levels must contribute exactly `k - 1` distinct
    /// indicators, none of them for the baseline level.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.columns.is_empty() {
            return Err(SchemaError::EmptySchema);
        }

        let mut names = HashSet::new();
        for column in self.columns.iter() {
            if !names.insert(column.name()) {
                return Err(SchemaError::DuplicateColumn(column.name().to_string()));
            }

            match *column {
                ColumnSpec::Numeric { name } => {
                    if Category::from_field(name).is_some() {
                        return Err(SchemaError::NumericCategory(name.to_string()));
                    }
                }
                ColumnSpec::Indicator { name, category, level } => {
                    let level = Level::new(category, level)
                        .ok_or_else(|| SchemaError::UnknownLevel(name.to_string()))?;
                    if level.is_baseline() {
                        return Err(SchemaError::BaselineIndicator(name.to_string()));
                    }
                    let expected = format!("{}_{}", category.field(), level.label());
                    if name != expected {
                        return Err(SchemaError::NameMismatch {
                            column: name.to_string(),
                            expected,
                        });
                    }
                }
            }
        }

        for category in self.categories() {
            let expected = category.levels().len() - 1;
            let actual = self.indicators_for(category).len();
            if actual != expected {
                return Err(SchemaError::IncompleteCategory {
                    category: category.field().to_string(),
                    expected,
                    actual,
                });
            }
        }

        Ok(())
    }

    /// Serializable description of every column, in order
    pub fn describe(&self) -> Vec<ColumnInfo> {
        self.columns
            .iter()
            .enumerate()
            .map(|(index, c)| ColumnInfo {
                index,
                name: c.name(),
                kind: match c {
                    ColumnSpec::Numeric { .. } => ColumnKind::Numeric,
                    ColumnSpec::Indicator { .. } => ColumnKind::Indicator,
                },
                category: c.category(),
                match_value: c.match_value(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Indicator,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnInfo {
    pub index: usize,
    pub name: &'static str,
    pub kind: ColumnKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_value: Option<&'static str>,
}

/// Errors that can occur during schema validation
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum SchemaError {
    #[error("Schema cannot be empty")]
    EmptySchema,

    #[error("Column '{0}' appears more than once")]
    DuplicateColumn(String),

    #[error("Numeric column '{0}' names a categorical field")]
    NumericCategory(String),

    #[error("Indicator '{0}' refers to an unknown level")]
    UnknownLevel(String),

    #[error("Indicator '{0}' encodes the baseline level")]
    BaselineIndicator(String),

    #[error("Indicator '{column}' should be named '{expected}'")]
    NameMismatch { column: String, expected: String },

    #[error("Category '{category}' needs {expected} indicator columns, found {actual}")]
    IncompleteCategory {
        category: String,
        expected: usize,
        actual: usize,
    },
}
