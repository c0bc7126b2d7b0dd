//! # ChurnX
//!
//! Customer churn scoring from survey answers.
//!
//! ChurnX turns a flat set of human-entered answers into the exact 30-column
//! feature layout a churn classifier was fitted on, scales it with the fitted
//! scaler and returns the churn label and probability.
//!
//! ## Quick Start
//!
//! ### From the command line
//!
//! ```bash
//! churnx predict --scaler models/churn_scaler.json --model models/churn_model.json \
//!     --answers customer.json --explain
//! churnx schema
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use churnx::prelude::*;
//! use std::sync::Arc;
//!
//! let schema = FeatureSchema::churn();
//! let pipeline = TrainedPipeline::load("models/churn_scaler.json", "models/churn_model.json", &schema).unwrap();
//! let predictor = Predictor::new(Arc::new(pipeline), PredictorConfig::default()).unwrap();
//!
//! let answers = RawAnswers::from_json(r#"{"gender": "Male", "tenure": 1}"#).unwrap();
//! match predictor.predict(&answers) {
//!     Ok(result) => println!("{} ({})", result.label, result.probability_percent()),
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```
//!
//! ## Crate Structure
//!
//! - [`churnx-core`](https://docs.rs/churnx-core) - Raw answers, feature vectors, errors
//! - [`churnx-schema`](https://docs.rs/churnx-schema) - Column layout and encoder
//! - [`churnx-model`](https://docs.rs/churnx-model) - Scaler, classifiers, artifacts, predictor

// Re-export core types
pub use churnx_core::{AnswerValue, EncodeError, Error, FeatureVector, RawAnswers, Result};

// Re-export schema
pub use churnx_schema::{
    Category, CategoryPolicy, ColumnSpec, Encoder, EncodingExplanation, FeatureSchema, Level,
    SchemaError,
};

// Re-export model
pub use churnx_model::{
    ChurnLabel, ClassPrediction, Classifier, ClassifierArtifact, LogisticRegression,
    PredictionResponse, PredictionResult, Predictor, PredictorConfig, RandomForest, Scaler,
    ScalerArtifact, StandardScaler, TrainedPipeline,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        RawAnswers, FeatureVector, Error, Result,
        FeatureSchema, Encoder, CategoryPolicy,
        TrainedPipeline, Predictor, PredictorConfig,
        PredictionResult, ChurnLabel,
    };
}
