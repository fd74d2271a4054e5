//! Sentiment classification.
//!
//! Polarity scoring sits behind [`PolarityModel`]; this layer only maps the
//! score onto a [`SentimentLabel`](crate::models::SentimentLabel). Model
//! errors propagate unchanged.

pub mod lexicon;

pub use lexicon::LexiconModel;

use crate::models::SentimentResult;
use thiserror::Error;

/// Errors raised by a polarity model.
#[derive(Debug, Error)]
pub enum SentimentError {
    /// A lexicon file could not be read or contained a bad row.
    #[error("Invalid lexicon: {0}")]
    Lexicon(String),

    /// The model failed to score a text or returned an invalid score.
    #[error("Sentiment model failed: {0}")]
    Model(String),
}

/// A text polarity scorer returning a value in `[-1.0, 1.0]`.
pub trait PolarityModel {
    fn polarity(&self, text: &str) -> Result<f64, SentimentError>;
}

/// Analyze `text` with the built-in lexicon model.
pub fn analyze(text: &str) -> Result<SentimentResult, SentimentError> {
    analyze_with(&LexiconModel::default(), text)
}

/// Analyze `text` with a specific model.
///
/// Scores outside `[-1.0, 1.0]`, including NaN, are rejected.
pub fn analyze_with<M: PolarityModel + ?Sized>(
    model: &M,
    text: &str,
) -> Result<SentimentResult, SentimentError> {
    let polarity = model.polarity(text)?;
    if !(-1.0..=1.0).contains(&polarity) {
        return Err(SentimentError::Model(format!(
            "polarity {} outside [-1, 1]",
            polarity
        )));
    }
    Ok(SentimentResult::new(polarity))
}
