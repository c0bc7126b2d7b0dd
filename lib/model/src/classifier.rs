//! Binary churn classifiers
//!
//! Both models reproduce scikit-learn inference on already-scaled inputs:
//! the positive class is "churn" and `predict` fires when its probability
//! exceeds one half.

use churnx_core::{Error, FeatureVector, Result};
use serde::{Deserialize, Serialize};

/// Probability above which the positive class is predicted
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Output of a single classifier call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassPrediction {
    /// True when the positive (churn) class is predicted
    pub positive: bool,
    /// Probability of the positive class, in [0, 1]
    pub probability: f64,
}

impl ClassPrediction {
    pub fn from_probability(probability: f64) -> Self {
        Self {
            positive: probability > DECISION_THRESHOLD,
            probability,
        }
    }
}

/// A fitted, read-only binary classifier
pub trait Classifier: Send + Sync {
    fn n_features(&self) -> usize;

    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    /// Check fitted parameters; run once when a pipeline is assembled
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Probability of the positive class
    fn predict_proba(&self, input: &FeatureVector) -> Result<f64>;

    fn predict(&self, input: &FeatureVector) -> Result<ClassPrediction> {
        let probability = self.predict_proba(input)?;
        if !(0.0..=1.0).contains(&probability) {
            return Err(Error::Pipeline(format!(
                "classifier returned probability {} outside [0, 1]",
                probability
            )));
        }
        Ok(ClassPrediction::from_probability(probability))
    }
}

fn check_width(expected: usize, input: &FeatureVector) -> Result<()> {
    if input.len() != expected {
        return Err(Error::Pipeline(format!(
            "classifier expects {} features, got {}",
            expected,
            input.len()
        )));
    }
    Ok(())
}

fn check_names(names: &Option<Vec<String>>, n_features: usize) -> Result<()> {
    match names {
        Some(names) if names.len() != n_features => Err(Error::Artifact(format!(
            "classifier has {} feature names for {} features",
            names.len(),
            n_features
        ))),
        _ => Ok(()),
    }
}

/// Numerically stable logistic function
#[inline]
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Binary logistic regression
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogisticRegression {
    pub coef: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
}

impl LogisticRegression {
    pub fn new(coef: Vec<f64>, intercept: f64) -> Result<Self> {
        let model = Self {
            coef,
            intercept,
            feature_names: None,
        };
        model.validate()?;
        Ok(model)
    }

    #[must_use]
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = Some(names);
        self
    }

    /// Raw decision value `intercept + coef . x`
    pub fn decision_function(&self, input: &FeatureVector) -> Result<f64> {
        check_width(self.coef.len(), input)?;
        Ok(self.intercept + self.coef.iter().zip(input.iter()).map(|(c, x)| c * x).sum::<f64>())
    }
}

impl Classifier for LogisticRegression {
    fn n_features(&self) -> usize {
        self.coef.len()
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn validate(&self) -> Result<()> {
        if self.coef.is_empty() {
            return Err(Error::Artifact("logistic regression has no coefficients".to_string()));
        }
        if !self.coef.iter().all(|c| c.is_finite()) || !self.intercept.is_finite() {
            return Err(Error::Artifact(
                "logistic regression parameters must be finite".to_string(),
            ));
        }
        check_names(&self.feature_names, self.coef.len())
    }

    fn predict_proba(&self, input: &FeatureVector) -> Result<f64> {
        Ok(sigmoid(self.decision_function(input)?))
    }
}

/// A node of a fitted decision tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    /// Go to `left` when `x[feature] <= threshold`, else `right`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Class weights `[no churn, churn]` of the training samples in the leaf
    Leaf { value: [f64; 2] },
}

/// A single tree, stored flat with the root at index 0
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Children must come after their parent, which rules out cycles
    fn validate(&self, n_features: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(Error::Artifact("decision tree has no nodes".to_string()));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(Error::Artifact(format!(
                            "node {} splits on feature {} of {}",
                            i, feature, n_features
                        )));
                    }
                    if threshold.is_nan() {
                        return Err(Error::Artifact(format!("node {} has a NaN threshold", i)));
                    }
                    for child in [left, right] {
                        if *child <= i || *child >= self.nodes.len() {
                            return Err(Error::Artifact(format!(
                                "node {} has invalid child {}",
                                i, child
                            )));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    let total = value[0] + value[1];
                    if value.iter().any(|v| *v < 0.0 || !v.is_finite()) || total <= 0.0 {
                        return Err(Error::Artifact(format!("leaf {} has invalid weights", i)));
                    }
                }
            }
        }
        Ok(())
    }

    /// Positive-class share of the leaf `input` lands in.
    ///
    /// A root-to-leaf walk visits at most `nodes.len()` nodes, so a malformed
    /// tree that loops is reported instead of spinning.
    fn leaf_probability(&self, input: &FeatureVector) -> Result<f64> {
        let mut index = 0;
        for _ in 0..self.nodes.len() {
            match self.nodes.get(index) {
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = input.get(*feature).ok_or_else(|| {
                        Error::Pipeline(format!(
                            "tree node {} splits on feature {} of {}",
                            index,
                            feature,
                            input.len()
                        ))
                    })?;
                    index = if x <= *threshold { *left } else { *right };
                }
                Some(TreeNode::Leaf { value }) => return Ok(value[1] / (value[0] + value[1])),
                None => {
                    return Err(Error::Pipeline(format!("tree node {} does not exist", index)));
                }
            }
        }
        Err(Error::Pipeline("tree walk did not reach a leaf".to_string()))
    }
}

/// Random forest of decision trees; probabilities are averaged across trees
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RandomForest {
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
}

impl RandomForest {
    pub fn new(n_features: usize, trees: Vec<DecisionTree>) -> Result<Self> {
        let forest = Self {
            n_features,
            trees,
            feature_names: None,
        };
        forest.validate()?;
        Ok(forest)
    }

    #[must_use]
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = Some(names);
        self
    }
}

impl Classifier for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(Error::Artifact("random forest has no trees".to_string()));
        }
        for tree in &self.trees {
            tree.validate(self.n_features)?;
        }
        check_names(&self.feature_names, self.n_features)
    }

    fn predict_proba(&self, input: &FeatureVector) -> Result<f64> {
        check_width(self.n_features, input)?;
        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.leaf_probability(input)?;
        }
        Ok(total / self.trees.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: usize, threshold: f64, left: [f64; 2], right: [f64; 2]) -> DecisionTree {
        DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { value: left },
                TreeNode::Leaf { value: right },
            ],
        }
    }

    #[test]
    fn test_sigmoid() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!((sigmoid(2.0) - 0.880_797_077_977_882_3).abs() < 1e-12);
        assert!((sigmoid(-2.0) + sigmoid(2.0) - 1.0).abs() < 1e-12);
        assert_eq!(sigmoid(-1000.0), 0.0);
        assert_eq!(sigmoid(1000.0), 1.0);
    }

    #[test]
    fn test_logistic_regression() {
        let model = LogisticRegression::new(vec![1.0, -2.0], 0.5).unwrap();
        let input = FeatureVector::new(vec![1.5, 1.0]);

        assert_eq!(model.decision_function(&input).unwrap(), 0.0);
        let prediction = model.predict(&input).unwrap();
        assert_eq!(prediction.probability, 0.5);
        // exactly one half is not churn
        assert!(!prediction.positive);

        let churn = model.predict(&FeatureVector::new(vec![3.0, 0.0])).unwrap();
        assert!(churn.positive);
        assert!(churn.probability > 0.97);
    }

    #[test]
    fn test_logistic_width_mismatch() {
        let model = LogisticRegression::new(vec![1.0; 30], 0.0).unwrap();
        assert!(matches!(
            model.predict_proba(&FeatureVector::new(vec![0.0; 4])),
            Err(Error::Pipeline(_))
        ));
    }

    #[test]
    fn test_logistic_validation() {
        assert!(LogisticRegression::new(vec![], 0.0).is_err());
        assert!(LogisticRegression::new(vec![1.0], f64::INFINITY).is_err());
    }

    #[test]
    fn test_random_forest_averages_trees() {
        let forest = RandomForest::new(
            2,
            vec![
                stump(0, 0.5, [9.0, 1.0], [2.0, 8.0]),
                stump(1, 10.0, [5.0, 5.0], [0.0, 4.0]),
            ],
        )
        .unwrap();

        // tree 1 -> right (0.8), tree 2 -> left (0.5)
        let p = forest.predict_proba(&FeatureVector::new(vec![1.0, 3.0])).unwrap();
        assert!((p - 0.65).abs() < 1e-12);

        // threshold is inclusive on the left
        let p = forest.predict_proba(&FeatureVector::new(vec![0.5, 11.0])).unwrap();
        assert!((p - 0.55).abs() < 1e-12);
    }

    #[test]
    fn test_random_forest_validation() {
        let backwards = DecisionTree {
            nodes: vec![
                TreeNode::Leaf { value: [1.0, 0.0] },
                TreeNode::Split {
                    feature: 0,
                    threshold: 0.0,
                    left: 0,
                    right: 0,
                },
            ],
        };
        assert!(RandomForest::new(1, vec![backwards]).is_err());
        assert!(RandomForest::new(1, vec![stump(3, 0.0, [1.0, 0.0], [0.0, 1.0])]).is_err());
        assert!(RandomForest::new(1, vec![stump(0, 0.0, [0.0, 0.0], [0.0, 1.0])]).is_err());
        assert!(RandomForest::new(1, vec![]).is_err());
    }

    #[test]
    fn test_tree_node_serde() {
        let node: TreeNode = serde_json::from_str(
            r#"{"split": {"feature": 3, "threshold": 29.5, "left": 1, "right": 2}}"#,
        )
        .unwrap();
        assert_eq!(
            node,
            TreeNode::Split {
                feature: 3,
                threshold: 29.5,
                left: 1,
                right: 2
            }
        );
        let leaf: TreeNode = serde_json::from_str(r#"{"leaf": {"value": [3.0, 1.0]}}"#).unwrap();
        assert_eq!(leaf, TreeNode::Leaf { value: [3.0, 1.0] });
    }

    #[test]
    fn test_unvalidated_forest_errors_instead_of_panicking() {
        let out_of_range = RandomForest {
            n_features: 1,
            trees: vec![stump(99, 0.0, [1.0, 0.0], [0.0, 1.0])],
            feature_names: None,
        };
        assert!(out_of_range.validate().is_err());
        assert!(matches!(
            out_of_range.predict_proba(&FeatureVector::new(vec![0.0])),
            Err(Error::Pipeline(_))
        ));

        let looping = RandomForest {
            n_features: 1,
            trees: vec![DecisionTree {
                nodes: vec![
                    TreeNode::Split {
                        feature: 0,
                        threshold: 0.0,
                        left: 0,
                        right: 1,
                    },
                    TreeNode::Leaf { value: [1.0, 1.0] },
                ],
            }],
            feature_names: None,
        };
        assert!(looping.validate().is_err());
        assert!(matches!(
            looping.predict_proba(&FeatureVector::new(vec![-1.0])),
            Err(Error::Pipeline(_))
        ));
    }

    struct Broken;

    impl Classifier for Broken {
        fn n_features(&self) -> usize {
            1
        }

        fn predict_proba(&self, _input: &FeatureVector) -> Result<f64> {
            Ok(1.5)
        }
    }

    #[test]
    fn test_out_of_range_probability_is_rejected() {
        assert!(Broken.predict(&FeatureVector::new(vec![0.0])).is_err());
    }
}
