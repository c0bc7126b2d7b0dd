//! Feature scaling applied between the encoder and the classifier

use churnx_core::{Error, FeatureVector, Result};
use serde::{Deserialize, Serialize};

/// A fitted, read-only feature transform
pub trait Scaler: Send + Sync {
    /// Input width the scaler was fitted on
    fn n_features(&self) -> usize;

    /// Column names seen at fit time, when the artifact recorded them
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    /// Check fitted parameters; run once when a pipeline is assembled
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn transform(&self, input: &FeatureVector) -> Result<FeatureVector>;
}

/// Standardization `(x - mean) / scale`, as fitted by scikit-learn's `StandardScaler`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        let scaler = Self {
            mean,
            scale,
            feature_names: None,
        };
        scaler.validate()?;
        Ok(scaler)
    }

    /// Pass-through scaler of the given width
    pub fn identity(n_features: usize) -> Self {
        Self {
            mean: vec![0.0; n_features],
            scale: vec![1.0; n_features],
            feature_names: None,
        }
    }

    #[must_use]
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = Some(names);
        self
    }
}

impl Scaler for StandardScaler {
    fn n_features(&self) -> usize {
        self.mean.len()
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn validate(&self) -> Result<()> {
        if self.mean.len() != self.scale.len() {
            return Err(Error::Artifact(format!(
                "scaler mean has {} values but scale has {}",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if !self.mean.iter().chain(self.scale.iter()).all(|x| x.is_finite()) {
            return Err(Error::Artifact("scaler parameters must be finite".to_string()));
        }
        if let Some(names) = &self.feature_names {
            if names.len() != self.mean.len() {
                return Err(Error::Artifact(format!(
                    "scaler has {} feature names for {} features",
                    names.len(),
                    self.mean.len()
                )));
            }
        }
        Ok(())
    }

    fn transform(&self, input: &FeatureVector) -> Result<FeatureVector> {
        if input.len() != self.n_features() {
            return Err(Error::Pipeline(format!(
                "scaler expects {} features, got {}",
                self.n_features(),
                input.len()
            )));
        }

        let data = input
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(x, (mean, scale))| {
                // zero-variance columns were fitted with scale 1
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (x - mean) / scale
            })
            .collect();
        Ok(FeatureVector::new(data))
    }
}
