// Integration tests for ChurnX
use churnx::prelude::*;
use churnx::{ClassifierArtifact, EncodeError, ScalerArtifact, StandardScaler};
use std::path::PathBuf;
use std::sync::Arc;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load_predictor(policy: CategoryPolicy) -> Predictor {
    let pipeline = TrainedPipeline::load(
        fixture("churn_scaler.json"),
        fixture("churn_model.json"),
        &FeatureSchema::churn(),
    )
    .unwrap();
    Predictor::new(Arc::new(pipeline), PredictorConfig { category_policy: policy }).unwrap()
}

fn new_customer() -> RawAnswers {
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

fn loyal_customer() -> RawAnswers {
    // form posts send every value as text
    RawAnswers::from_pairs([
        "gender=Female",
        "SeniorCitizen=0",
        "Partner=Yes",
        "Dependents=Yes",
        "tenure=72",
        "PhoneService=Yes",
        "MultipleLines=Yes",
        "InternetService=No",
        "OnlineSecurity=No internet service",
        "OnlineBackup=No internet service",
        "DeviceProtection=No internet service",
        "TechSupport=No internet service",
        "StreamingTV=No internet service",
        "StreamingMovies=No internet service",
        "Contract=Two year",
        "PaperlessBilling=No",
        "PaymentMethod=Credit card (automatic)",
        "MonthlyCharges=24.1",
        "TotalCharges=1734.65",
    ])
    .unwrap()
}

fn baseline_customer() -> RawAnswers {
    RawAnswers::new()
        .with("gender", "Female")
        .with("SeniorCitizen", 1)
        .with("Partner", "No")
        .with("Dependents", "No")
        .with("tenure", 24)
        .with("PhoneService", "No")
        .with("MultipleLines", "No")
        .with("InternetService", "DSL")
        .with("OnlineSecurity", "No")
        .with("OnlineBackup", "No")
        .with("DeviceProtection", "No")
        .with("TechSupport", "No")
        .with("StreamingTV", "No")
        .with("StreamingMovies", "No")
        .with("Contract", "Month-to-month")
        .with("PaperlessBilling", "No")
        .with("PaymentMethod", "Bank transfer")
        .with("MonthlyCharges", 29.85)
        .with("TotalCharges", 716.4)
}

#[test]
fn test_new_fiber_customer_churns() {
    let predictor = load_predictor(CategoryPolicy::Strict);
    let result = predictor.predict(&new_customer()).unwrap();

    assert_eq!(result.label, ChurnLabel::Churn);
    assert_eq!(result.probability_percent(), "84.04%");
    assert_eq!(
        result.summary(),
        "Churn (High Risk): 84.04% chance of leaving"
    );
}

#[test]
fn test_loyal_customer_stays() {
    let predictor = load_predictor(CategoryPolicy::Strict);
    let result = predictor.predict(&loyal_customer()).unwrap();

    assert_eq!(result.label, ChurnLabel::NoChurn);
    assert_eq!(result.probability_percent(), "0.16%");
}

#[test]
fn test_baseline_customer() {
    let predictor = load_predictor(CategoryPolicy::Strict);
    let features = predictor.encoder().encode(&baseline_customer()).unwrap();
    assert!(features.as_slice()[4..].iter().all(|v| *v == 0.0));

    let result = predictor.predict(&baseline_customer()).unwrap();
    assert_eq!(result.label, ChurnLabel::NoChurn);
    assert_eq!(result.probability_percent(), "34.39%");
}

#[test]
fn test_missing_tenure_is_an_error() {
    let predictor = load_predictor(CategoryPolicy::Baseline);
    let mut answers = new_customer();
    answers.remove("tenure");

    match predictor.predict(&answers) {
        Err(Error::Encoding(EncodeError::MissingField { field })) => assert_eq!(field, "tenure"),
        other => panic!("expected missing tenure, got {:?}", other),
    }
}

#[test]
fn test_typo_policy() {
    let mut answers = new_customer();
    answers.insert("InternetService", "Fibre optic");

    // legacy behavior: the typo silently becomes DSL
    let lenient = load_predictor(CategoryPolicy::Baseline).predict(&answers).unwrap();
    let mut dsl = new_customer();
    dsl.insert("InternetService", "DSL");
    let expected = load_predictor(CategoryPolicy::Baseline).predict(&dsl).unwrap();
    assert_eq!(lenient, expected);

    let strict = load_predictor(CategoryPolicy::Strict).predict(&answers);
    assert!(matches!(
        strict,
        Err(Error::Encoding(EncodeError::UnrecognizedCategory { .. }))
    ));
}

#[test]
fn test_bincode_artifacts_predict_identically() {
    let dir = tempfile::tempdir().unwrap();
    let scaler_bin = dir.path().join("churn_scaler.bin");
    let model_bin = dir.path().join("churn_model.bin");

    ScalerArtifact::load(fixture("churn_scaler.json"))
        .unwrap()
        .save(&scaler_bin)
        .unwrap();
    ClassifierArtifact::load(fixture("churn_model.json"))
        .unwrap()
        .save(&model_bin)
        .unwrap();

    let schema = FeatureSchema::churn();
    let pipeline = TrainedPipeline::load(&scaler_bin, &model_bin, &schema).unwrap();
    let from_bin = Predictor::new(Arc::new(pipeline), PredictorConfig::default()).unwrap();
    let from_json = load_predictor(CategoryPolicy::Baseline);

    for answers in [new_customer(), loyal_customer(), baseline_customer()] {
        let a = from_bin.predict(&answers).unwrap();
        let b = from_json.predict(&answers).unwrap();
        assert_eq!(a.probability.to_bits(), b.probability.to_bits());
    }
}

#[test]
fn test_mismatched_artifact_fails_at_startup() {
    let dir = tempfile::tempdir().unwrap();
    let scaler_path = dir.path().join("short_scaler.json");
    ScalerArtifact::Standard(StandardScaler::identity(29))
        .save(&scaler_path)
        .unwrap();

    let err = TrainedPipeline::load(&scaler_path, fixture("churn_model.json"), &FeatureSchema::churn())
        .unwrap_err();
    assert!(matches!(err, Error::SchemaMismatch { .. }));
}

#[test]
fn test_shared_pipeline_across_threads() {
    let predictor = Arc::new(load_predictor(CategoryPolicy::Baseline));
    let customers = [new_customer(), loyal_customer(), baseline_customer()];
    let expected: Vec<f64> = customers
        .iter()
        .map(|c| predictor.predict(c).unwrap().probability)
        .collect();

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let predictor = Arc::clone(&predictor);
            let customers = customers.clone();
            let expected = expected.clone();
            std::thread::spawn(move || {
                for i in 0..200 {
                    let idx = (i + t) % customers.len();
                    let result = predictor.predict(&customers[idx]).unwrap();
                    assert_eq!(result.probability.to_bits(), expected[idx].to_bits());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_batch_prediction() {
    let predictor = load_predictor(CategoryPolicy::Baseline);
    let mut broken = loyal_customer();
    broken.insert("TotalCharges", " ");

    let batch = vec![new_customer(), broken, loyal_customer()];
    let results = predictor.predict_batch(&batch);

    assert_eq!(results[0].as_ref().unwrap().label, ChurnLabel::Churn);
    assert!(matches!(
        results[1],
        Err(Error::Encoding(EncodeError::InvalidNumber { .. }))
    ));
    assert_eq!(results[2].as_ref().unwrap().label, ChurnLabel::NoChurn);
}

#[test]
fn test_explain_round_trip() {
    let predictor = load_predictor(CategoryPolicy::Strict);
    let answers = loyal_customer();
    let explained = predictor.explain(&answers).unwrap();

    assert_eq!(explained.categories.len(), 15);
    for assignment in &explained.categories {
        let field = assignment.category.field();
        assert_eq!(assignment.level, answers.get(field).unwrap().as_label(), "{}", field);
    }
    assert_eq!(
        explained.active_columns(),
        vec![
            "Partner_Yes",
            "Dependents_Yes",
            "PhoneService_Yes",
            "MultipleLines_Yes",
            "InternetService_No",
            "OnlineSecurity_No internet service",
            "OnlineBackup_No internet service",
            "DeviceProtection_No internet service",
            "TechSupport_No internet service",
            "StreamingTV_No internet service",
            "StreamingMovies_No internet service",
            "Contract_Two year",
            "PaymentMethod_Credit card (automatic)",
        ]
    );
}
