//! # ChurnX Core
//!
//! Core types shared by the ChurnX crates.
//!
//! - [`RawAnswers`] - loosely typed survey answers for one request
//! - [`FeatureVector`] - the fixed-width numeric row fed to the model
//! - [`EncodeError`] / [`Error`] - the error taxonomy
//!
//! ## Example
//!
//! ```rust
//! use churnx_core::{RawAnswers, AnswerValue};
//!
//! let answers = RawAnswers::from_json(r#"{"gender": "Male", "tenure": 1}"#).unwrap();
//! assert_eq!(answers.get("tenure"), Some(&AnswerValue::Number(1.0)));
//! ```

pub mod answers;
pub mod error;
pub mod vector;

pub use answers::{AnswerValue, RawAnswers};
pub use error::{EncodeError, Error, Result};
pub use vector::FeatureVector;
