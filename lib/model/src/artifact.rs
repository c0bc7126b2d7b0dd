//! Persisted model artifacts
//!
//! Scaler and classifier parameters exported from the training pipeline.
//! Files ending in `.json` are read as JSON; anything else is bincode.
//! Writes go through a temporary file and an atomic rename.

use crate::classifier::{ClassPrediction, Classifier, LogisticRegression, RandomForest};
use crate::scaler::{Scaler, StandardScaler};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use churnx_core::{Error, FeatureVector, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Json,
    Bincode,
}

impl ArtifactFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ArtifactFormat::Json,
            _ => ArtifactFormat::Bincode,
        }
    }
}

/// Read and deserialize an artifact file
pub fn load_artifact<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path = path.as_ref();
    let data = std::fs::read(path)
        .map_err(|e| Error::Artifact(format!("{}: {}", path.display(), e)))?;

    let value = match ArtifactFormat::from_path(path) {
        ArtifactFormat::Json => serde_json::from_slice(&data)
            .map_err(|e| Error::Artifact(format!("{}: {}", path.display(), e)))?,
        ArtifactFormat::Bincode => bincode::deserialize(&data)
            .map_err(|e| Error::Artifact(format!("{}: {}", path.display(), e)))?,
    };
    debug!(path = %path.display(), bytes = data.len(), "Artifact loaded");
    Ok(value)
}

/// Serialize and atomically write an artifact file
pub fn save_artifact<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    let data = match ArtifactFormat::from_path(path) {
        ArtifactFormat::Json => serde_json::to_vec_pretty(value)?,
        ArtifactFormat::Bincode => bincode::serialize(value)
            .map_err(|e| Error::Serialization(e.to_string()))?,
    };

    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(|f| f.write_all(&data))
        .map_err(|e| Error::Artifact(format!("{}: {}", path.display(), e)))?;
    debug!(path = %path.display(), bytes = data.len(), "Artifact saved");
    Ok(())
}

/// Any supported scaler artifact
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ScalerArtifact {
    Standard(StandardScaler),
}

impl ScalerArtifact {
    /// Load and validate a scaler artifact
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let artifact: Self = load_artifact(path)?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_artifact(path, self)
    }
}

impl Scaler for ScalerArtifact {
    fn n_features(&self) -> usize {
        match self {
            ScalerArtifact::Standard(s) => s.n_features(),
        }
    }

    fn feature_names(&self) -> Option<&[String]> {
        match self {
            ScalerArtifact::Standard(s) => s.feature_names(),
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            ScalerArtifact::Standard(s) => s.validate(),
        }
    }

    fn transform(&self, input: &FeatureVector) -> Result<FeatureVector> {
        match self {
            ScalerArtifact::Standard(s) => s.transform(input),
        }
    }
}

/// Any supported classifier artifact
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierArtifact {
    LogisticRegression(LogisticRegression),
    RandomForest(RandomForest),
}

impl ClassifierArtifact {
    /// Load and validate a classifier artifact
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let artifact: Self = load_artifact(path)?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_artifact(path, self)
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            ClassifierArtifact::LogisticRegression(m) => m,
            ClassifierArtifact::RandomForest(m) => m,
        }
    }
}

impl Classifier for ClassifierArtifact {
    fn n_features(&self) -> usize {
        self.inner().n_features()
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.inner().feature_names()
    }

    fn validate(&self) -> Result<()> {
        self.inner().validate()
    }

    fn predict_proba(&self, input: &FeatureVector) -> Result<f64> {
        self.inner().predict_proba(input)
    }

    fn predict(&self, input: &FeatureVector) -> Result<ClassPrediction> {
        self.inner().predict(input)
    }
}
