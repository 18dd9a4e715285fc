//! Whole-model structural validation, reported as data rather than as errors.
pub mod error;
mod rules;
pub mod validator;

pub use error::{ValidationError, ValidationErrorType};
pub use validator::{ValidationReport, Validator};
