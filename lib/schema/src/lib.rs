//! # ChurnX Schema
//!
//! Feature layout and encoder for the churn model.
//!
//! ## Overview
//!
//! The classifier was fitted on a fixed 30-column table: four numeric
//! answers followed by one-hot indicator columns for fifteen categorical
//! answers. Each category drops one level (its baseline), which the model
//! sees as all of that category's indicators being zero.
//!
//! This crate owns that layout and the single-pass encoder that turns raw
//! answers into it:
//!
//! - [`Category`] - closed set of categorical fields and their levels
//! - [`FeatureSchema`] - ordered [`ColumnSpec`] list, validated up front
//! - [`Encoder`] - raw answers to [`churnx_core::FeatureVector`]
//! - [`EncodingExplanation`] - decodes a vector back to one level per category
//!
//! ## Example
//!
//! ```rust
//! use churnx_schema::{CategoryPolicy, Encoder};
//! use churnx_core::RawAnswers;
//!
//! let encoder = Encoder::churn(CategoryPolicy::Strict);
//! let answers = RawAnswers::from_json(r#"{
//!     "gender": "Male", "SeniorCitizen": 0, "Partner": "Yes", "Dependents": "No",
//!     "tenure": 1, "PhoneService": "No", "MultipleLines": "No phone service",
//!     "InternetService": "Fiber optic", "OnlineSecurity": "No", "OnlineBackup": "No",
//!     "DeviceProtection": "No", "TechSupport": "No", "StreamingTV": "No",
//!     "StreamingMovies": "No", "Contract": "Month-to-month", "PaperlessBilling": "Yes",
//!     "PaymentMethod": "Electronic check", "MonthlyCharges": 70.35, "TotalCharges": 70.35
//! }"#).unwrap();
//!
//! let vector = encoder.encode(&answers).unwrap();
//! assert_eq!(vector.len(), 30);
//! ```

pub mod category;
pub mod schema;
pub mod encoder;
pub mod explain;

// Re-export main types
pub use category::{Category, Level};
pub use schema::{
    FeatureSchema,
    ColumnSpec,
    ColumnInfo,
    ColumnKind,
    SchemaError,
};
pub use encoder::{Encoder, CategoryPolicy};
pub use explain::{EncodingExplanation, CategoryAssignment, NumericValue, DecodeError};
