//! Prediction orchestrator
//!
//! Runs encode -> scale -> classify for one set of answers. Encoding errors
//! stop the request before the trained pipeline sees anything.

use crate::pipeline::TrainedPipeline;
use churnx_core::{Error, RawAnswers, Result};
use churnx_schema::{CategoryPolicy, EncodingExplanation, Encoder};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Predicted outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChurnLabel {
    Churn,
    NoChurn,
}

impl ChurnLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChurnLabel::Churn => "Churn",
            ChurnLabel::NoChurn => "NoChurn",
        }
    }

    /// Human-readable risk line
    pub fn risk_text(&self) -> &'static str {
        match self {
            ChurnLabel::Churn => "Churn (High Risk)",
            ChurnLabel::NoChurn => "No Churn (Safe)",
        }
    }
}

impl std::fmt::Display for ChurnLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: ChurnLabel,
    /// Probability of churn, in [0, 1]
    pub probability: f64,
}

impl PredictionResult {
    /// Churn probability as a percentage with two decimals, e.g. `"85.00%"`
    pub fn probability_percent(&self) -> String {
        format!("{:.2}%", self.probability * 100.0)
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {} chance of leaving",
            self.label.risk_text(),
            self.probability_percent()
        )
    }

    pub fn to_response(&self) -> PredictionResponse {
        PredictionResponse {
            label: self.label,
            probability: self.probability_percent(),
            summary: self.summary(),
        }
    }
}

/// Caller-facing rendering of a [`PredictionResult`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResponse {
    pub label: ChurnLabel,
    pub probability: String,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictorConfig {
    #[serde(default)]
    pub category_policy: CategoryPolicy,
}

/// Encoder plus shared trained pipeline
#[derive(Debug, Clone)]
pub struct Predictor {
    encoder: Encoder,
    pipeline: Arc<TrainedPipeline>,
}

impl Predictor {
    /// Predictor over the built-in churn layout
    pub fn new(pipeline: Arc<TrainedPipeline>, config: PredictorConfig) -> Result<Self> {
        Self::with_encoder(Encoder::churn(config.category_policy), pipeline)
    }

    /// Pair an encoder with a pipeline; the encoder's columns must match the
    /// pipeline's, name for name and in order
    pub fn with_encoder(encoder: Encoder, pipeline: Arc<TrainedPipeline>) -> Result<Self> {
        pipeline.check_schema(encoder.schema())?;
        Ok(Self { encoder, pipeline })
    }

    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    pub fn pipeline(&self) -> &Arc<TrainedPipeline> {
        &self.pipeline
    }

    pub fn predict(&self, answers: &RawAnswers) -> Result<PredictionResult> {
        let features = self.encoder.encode(answers)?;
        let prediction = self.pipeline.predict(&features)?;

        let result = PredictionResult {
            label: if prediction.positive {
                ChurnLabel::Churn
            } else {
                ChurnLabel::NoChurn
            },
            probability: prediction.probability,
        };
        debug!(label = %result.label, probability = result.probability, "Prediction");
        Ok(result)
    }

    /// Predict many requests in parallel, keeping input order
    pub fn predict_batch(&self, batch: &[RawAnswers]) -> Vec<Result<PredictionResult>> {
        batch.par_iter().map(|answers| self.predict(answers)).collect()
    }

    /// Decode what the model will see for these answers
    pub fn explain(&self, answers: &RawAnswers) -> Result<EncodingExplanation> {
        let features = self.encoder.encode(answers)?;
        EncodingExplanation::decode(self.encoder.schema(), &features)
            .map_err(|e| Error::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Classifier, LogisticRegression};
    use crate::scaler::{Scaler, StandardScaler};
    use churnx_core::{EncodeError, FeatureVector};
    use churnx_schema::FeatureSchema;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Calls {
        transform: AtomicUsize,
        predict: AtomicUsize,
    }

    struct CountingScaler(Arc<Calls>);

    impl Scaler for CountingScaler {
        fn n_features(&self) -> usize {
            30
        }

        fn transform(&self, input: &FeatureVector) -> Result<FeatureVector> {
            self.0.transform.fetch_add(1, Ordering::SeqCst);
            Ok(input.clone())
        }
    }

    struct CountingClassifier(Arc<Calls>);

    impl Classifier for CountingClassifier {
        fn n_features(&self) -> usize {
            30
        }

        fn predict_proba(&self, _input: &FeatureVector) -> Result<f64> {
            self.0.predict.fetch_add(1, Ordering::SeqCst);
            Ok(0.8512)
        }
    }

    fn answers() -> RawAnswers {
        RawAnswers::from_json(
            r#"{
                "gender": "Male", "SeniorCitizen": 0, "Partner": "Yes", "Dependents": "No",
                "tenure": 1, "PhoneService": "No", "MultipleLines": "No phone service",
                "InternetService": "Fiber optic", "OnlineSecurity": "No", "OnlineBackup": "No",
                "DeviceProtection": "No", "TechSupport": "No", "StreamingTV": "No",
                "StreamingMovies": "No", "Contract": "Month-to-month", "PaperlessBilling": "Yes",
                "PaymentMethod": "Electronic check", "MonthlyCharges": 70.35, "TotalCharges": 70.35
            }"#,
        )
        .unwrap()
    }

    fn counting_predictor(policy: CategoryPolicy) -> (Predictor, Arc<Calls>) {
        let calls = Arc::new(Calls::default());
        let pipeline = TrainedPipeline::new(
            CountingScaler(calls.clone()),
            CountingClassifier(calls.clone()),
            &FeatureSchema::churn(),
        )
        .unwrap();
        let predictor = Predictor::new(
            Arc::new(pipeline),
            PredictorConfig {
                category_policy: policy,
            },
        )
        .unwrap();
        (predictor, calls)
    }

    #[test]
    fn test_each_stage_runs_once() {
        let (predictor, calls) = counting_predictor(CategoryPolicy::Baseline);
        let result = predictor.predict(&answers()).unwrap();

        assert_eq!(result.label, ChurnLabel::Churn);
        assert_eq!(result.probability, 0.8512);
        assert_eq!(calls.transform.load(Ordering::SeqCst), 1);
        assert_eq!(calls.predict.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_field_never_reaches_pipeline() {
        let (predictor, calls) = counting_predictor(CategoryPolicy::Baseline);
        let mut raw = answers();
        raw.remove("tenure");

        let err = predictor.predict(&raw).unwrap_err();
        assert!(matches!(
            err,
            Error::Encoding(EncodeError::MissingField { ref field }) if field == "tenure"
        ));
        assert_eq!(calls.transform.load(Ordering::SeqCst), 0);
        assert_eq!(calls.predict.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_strict_policy_never_reaches_pipeline() {
        let (predictor, calls) = counting_predictor(CategoryPolicy::Strict);
        let mut raw = answers();
        raw.insert("PaymentMethod", "Bitcoin");

        assert!(matches!(
            predictor.predict(&raw),
            Err(Error::Encoding(EncodeError::UnrecognizedCategory { .. }))
        ));
        assert_eq!(calls.transform.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_formatting() {
        let result = PredictionResult {
            label: ChurnLabel::Churn,
            probability: 0.8512,
        };
        assert_eq!(result.probability_percent(), "85.12%");
        assert_eq!(result.summary(), "Churn (High Risk): 85.12% chance of leaving");

        let safe = PredictionResult {
            label: ChurnLabel::NoChurn,
            probability: 0.03,
        };
        assert_eq!(safe.probability_percent(), "3.00%");

        let json = serde_json::to_value(safe.to_response()).unwrap();
        assert_eq!(json["label"], "NoChurn");
        assert_eq!(json["probability"], "3.00%");
        assert_eq!(json["summary"], "No Churn (Safe): 3.00% chance of leaving");
    }

    #[test]
    fn test_width_checked_against_encoder() {
        let schema = FeatureSchema::new(vec![churnx_schema::ColumnSpec::numeric("tenure")]);
        let pipeline = TrainedPipeline::new(
            StandardScaler::identity(1),
            LogisticRegression::new(vec![1.0], 0.0).unwrap(),
            &schema,
        )
        .unwrap();

        let err = Predictor::new(Arc::new(pipeline), PredictorConfig::default()).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch { .. }));
    }

    #[test]
    fn test_with_encoder_rejects_reordered_columns() {
        let schema = FeatureSchema::churn();
        let names: Vec<String> = schema.column_names().into_iter().map(String::from).collect();
        let pipeline = TrainedPipeline::new(
            StandardScaler::identity(30).with_feature_names(names.clone()),
            LogisticRegression::new(vec![0.0; 30], 0.0)
                .unwrap()
                .with_feature_names(names),
            &schema,
        )
        .unwrap();

        let mut columns = schema.columns().to_vec();
        columns.swap(5, 6);
        let swapped = Encoder::new(FeatureSchema::new(columns)).unwrap();

        let err = Predictor::with_encoder(swapped, Arc::new(pipeline)).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch { .. }));
    }

    #[test]
    fn test_batch_keeps_order() {
        let (predictor, calls) = counting_predictor(CategoryPolicy::Baseline);
        let mut broken = answers();
        broken.remove("Contract");
        let batch = vec![answers(), broken, answers()];

        let results = predictor.predict_batch(&batch);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
        assert_eq!(calls.predict.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_explain() {
        let (predictor, _) = counting_predictor(CategoryPolicy::Baseline);
        let explained = predictor.explain(&answers()).unwrap();
        assert!(explained.active_columns().contains(&"InternetService_Fiber optic"));
    }
}
