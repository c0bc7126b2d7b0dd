//! # ChurnX Model
//!
//! The trained half of the churn pipeline.
//!
//! - [`Scaler`] / [`Classifier`] - read-only capability traits
//! - [`StandardScaler`], [`LogisticRegression`], [`RandomForest`] - fitted models
//! - [`ScalerArtifact`] / [`ClassifierArtifact`] - on-disk forms (JSON or bincode)
//! - [`TrainedPipeline`] - scaler + classifier, checked against the schema at startup
//! - [`Predictor`] - encode, scale, classify
//!
//! ## Example
//!
//! ```rust
//! use churnx_model::{LogisticRegression, Predictor, PredictorConfig, StandardScaler, TrainedPipeline};
//! use churnx_schema::FeatureSchema;
//! use std::sync::Arc;
//!
//! let schema = FeatureSchema::churn();
//! let pipeline = TrainedPipeline::new(
//!     StandardScaler::identity(schema.len()),
//!     LogisticRegression::new(vec![0.0; schema.len()], -1.0).unwrap(),
//!     &schema,
//! ).unwrap();
//! let predictor = Predictor::new(Arc::new(pipeline), PredictorConfig::default()).unwrap();
//! # let _ = predictor;
//! ```

pub mod artifact;
pub mod classifier;
pub mod pipeline;
pub mod predictor;
pub mod scaler;

pub use artifact::{load_artifact, save_artifact, ArtifactFormat, ClassifierArtifact, ScalerArtifact};
pub use classifier::{
    ClassPrediction, Classifier, DecisionTree, LogisticRegression, RandomForest, TreeNode,
    DECISION_THRESHOLD,
};
pub use pipeline::TrainedPipeline;
pub use predictor::{ChurnLabel, PredictionResponse, PredictionResult, Predictor, PredictorConfig};
pub use scaler::{Scaler, StandardScaler};
