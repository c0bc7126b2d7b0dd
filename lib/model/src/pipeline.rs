//! The fitted scaler/classifier pair

use crate::artifact::{ClassifierArtifact, ScalerArtifact};
use crate::classifier::{ClassPrediction, Classifier};
use crate::scaler::Scaler;
use churnx_core::{Error, FeatureVector, Result};
use churnx_schema::FeatureSchema;
use std::path::Path;
use tracing::info;

/// Scaler and classifier loaded once at startup.
///
/// Never mutated after construction. Both stages take `&self` and are
/// `Send + Sync`, so one pipeline can serve any number of threads without
/// locking.
pub struct TrainedPipeline {
    scaler: Box<dyn Scaler>,
    classifier: Box<dyn Classifier>,
    /// Column layout both stages were checked against
    columns: Vec<&'static str>,
}

impl std::fmt::Debug for TrainedPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainedPipeline")
            .field("n_features", &self.n_features())
            .finish_non_exhaustive()
    }
}

impl TrainedPipeline {
    /// Assemble a pipeline, checking it against the feature layout.
    ///
    /// Both stages must pass their own parameter checks and accept exactly
    /// `schema.len()` inputs, and any fit-time column names they carry must
    /// equal the schema's, in order.
    pub fn new<S, C>(scaler: S, classifier: C, schema: &FeatureSchema) -> Result<Self>
    where
        S: Scaler + 'static,
        C: Classifier + 'static,
    {
        scaler.validate()?;
        classifier.validate()?;
        check_stage("scaler", scaler.n_features(), scaler.feature_names(), schema)?;
        check_stage("classifier", classifier.n_features(), classifier.feature_names(), schema)?;

        Ok(Self {
            scaler: Box::new(scaler),
            classifier: Box::new(classifier),
            columns: schema.column_names(),
        })
    }

    /// Load both artifacts from disk and validate them against `schema`
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(
        scaler_path: P,
        classifier_path: Q,
        schema: &FeatureSchema,
    ) -> Result<Self> {
        let scaler = ScalerArtifact::load(scaler_path.as_ref())?;
        let classifier = ClassifierArtifact::load(classifier_path.as_ref())?;
        let pipeline = Self::new(scaler, classifier, schema)?;
        info!(
            scaler = %scaler_path.as_ref().display(),
            classifier = %classifier_path.as_ref().display(),
            n_features = pipeline.n_features(),
            "Trained pipeline loaded"
        );
        Ok(pipeline)
    }

    pub fn n_features(&self) -> usize {
        self.scaler.n_features()
    }

    /// Column names the pipeline was assembled against, in order
    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    /// Fail unless `schema` has exactly the columns this pipeline was built for
    pub fn check_schema(&self, schema: &FeatureSchema) -> Result<()> {
        if schema.len() != self.columns.len() {
            return Err(Error::SchemaMismatch {
                expected: format!("{} features", self.columns.len()),
                actual: format!("encoder producing {} features", schema.len()),
            });
        }
        let position = self
            .columns
            .iter()
            .zip(schema.columns())
            .position(|(name, column)| *name != column.name());
        if let Some(i) = position {
            return Err(Error::SchemaMismatch {
                expected: format!("column {} '{}'", i, self.columns[i]),
                actual: format!("encoder column '{}'", schema.columns()[i].name()),
            });
        }
        Ok(())
    }

    pub fn transform(&self, input: &FeatureVector) -> Result<FeatureVector> {
        self.scaler.transform(input)
    }

    /// Scale then classify; each stage runs exactly once
    pub fn predict(&self, input: &FeatureVector) -> Result<ClassPrediction> {
        let scaled = self.scaler.transform(input)?;
        self.classifier.predict(&scaled)
    }
}

fn check_stage(
    stage: &str,
    n_features: usize,
    names: Option<&[String]>,
    schema: &FeatureSchema,
) -> Result<()> {
    if n_features != schema.len() {
        return Err(Error::SchemaMismatch {
            expected: format!("{} features", schema.len()),
            actual: format!("{} fitted on {} features", stage, n_features),
        });
    }

    if let Some(names) = names {
        let position = schema
            .columns()
            .iter()
            .zip(names.iter())
            .position(|(column, name)| column.name() != name.as_str());
        if let Some(i) = position {
            return Err(Error::SchemaMismatch {
                expected: format!("column {} '{}'", i, schema.columns()[i].name()),
                actual: format!("{} column '{}'", stage, names[i]),
            });
        }
    }
    Ok(())
}
