//! Lexicon-based polarity model.
//!
//! Each lexicon word found in the text contributes one assessment. Preceding
//! intensifiers multiply it, a negation since the previous assessment flips
//! and halves it. The text polarity is the mean of all assessments.

use super::{PolarityModel, SentimentError};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Multiplier applied to an assessment preceded by a negation.
const NEGATION_FACTOR: f64 = -0.5;

/// English polarity lexicon with intensifiers and negations.
pub struct LexiconModel {
    words: HashMap<String, f64>,
    intensifiers: HashMap<String, f64>,
    negations: Vec<String>,
}

impl Default for LexiconModel {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconModel {
    /// Create a model with the built-in lexicon.
    pub fn new() -> Self {
        let positive_words = [
            ("happy", 0.8),
            ("good", 0.7),
            ("great", 0.8),
            ("best", 1.0),
            ("better", 0.5),
            ("love", 0.5),
            ("amazing", 0.6),
            ("awesome", 1.0),
            ("excellent", 1.0),
            ("wonderful", 1.0),
            ("beautiful", 0.85),
            ("nice", 0.6),
            ("proud", 0.8),
            ("win", 0.8),
            ("winning", 0.5),
            ("strong", 0.43),
            ("hope", 0.4),
            ("honest", 0.6),
            ("safe", 0.5),
            ("free", 0.4),
            ("fair", 0.7),
            ("true", 0.35),
            ("right", 0.29),
            ("glad", 0.5),
            ("positive", 0.23),
            ("success", 0.3),
            ("perfect", 1.0),
            ("fantastic", 0.4),
            ("brilliant", 0.9),
        ];

        let negative_words = [
            ("sad", -0.5),
            ("bad", -0.7),
            ("worst", -1.0),
            ("worse", -0.4),
            ("terrible", -1.0),
            ("horrible", -1.0),
            ("awful", -1.0),
            ("hate", -0.8),
            ("evil", -1.0),
            ("stupid", -0.8),
            ("corrupt", -0.5),
            ("fake", -0.5),
            ("wrong", -0.5),
            ("lie", -0.4),
            ("liar", -0.5),
            ("weak", -0.38),
            ("angry", -0.5),
            ("afraid", -0.6),
            ("dangerous", -0.6),
            ("disgusting", -1.0),
            ("crazy", -0.6),
            ("poor", -0.4),
            ("sick", -0.71),
            ("dead", -0.2),
            ("fraud", -0.5),
            ("negative", -0.3),
            ("pathetic", -1.0),
            ("shame", -0.5),
            ("lose", -0.4),
        ];

        let words = positive_words
            .into_iter()
            .chain(negative_words)
            .map(|(w, p)| (w.to_string(), p))
            .collect();

        let intensifiers = [
            ("very", 1.3),
            ("really", 1.3),
            ("extremely", 1.3),
            ("so", 1.3),
            ("totally", 1.3),
            ("absolutely", 1.3),
            ("incredibly", 1.3),
            ("too", 1.3),
            ("quite", 1.1),
            ("pretty", 1.1),
            ("slightly", 0.5),
            ("somewhat", 0.7),
        ]
        .into_iter()
        .map(|(w, i)| (w.to_string(), i))
        .collect();

        let negations = [
            "not", "no", "never", "neither", "nor", "nobody", "nothing", "none", "cannot",
            "cant", "dont", "doesnt", "didnt", "wont", "wouldnt", "isnt", "arent", "wasnt",
            "werent", "don't", "doesn't", "didn't", "won't", "wouldn't", "isn't", "aren't",
            "wasn't", "weren't", "can't",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        Self {
            words,
            intensifiers,
            negations,
        }
    }

    /// Merge a `word,polarity` CSV file over the built-in lexicon.
    ///
    /// The file has no header; polarities must lie in `[-1, 1]`.
    pub fn with_lexicon_file(mut self, path: &Path) -> Result<Self, SentimentError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| SentimentError::Lexicon(format!("{}: {}", path.display(), e)))?;

        let mut added = 0usize;
        for (i, row) in reader.records().enumerate() {
            let row = row.map_err(|e| SentimentError::Lexicon(e.to_string()))?;
            let (word, score) = match (row.get(0), row.get(1)) {
                (Some(w), Some(s)) if !w.is_empty() => (w, s),
                _ => {
                    return Err(SentimentError::Lexicon(format!(
                        "row {} needs a word and a polarity",
                        i + 1
                    )))
                }
            };
            let polarity: f64 = score.parse().map_err(|_| {
                SentimentError::Lexicon(format!("row {}: invalid polarity '{}'", i + 1, score))
            })?;
            if !(-1.0..=1.0).contains(&polarity) {
                return Err(SentimentError::Lexicon(format!(
                    "row {}: polarity {} outside [-1, 1]",
                    i + 1,
                    polarity
                )));
            }
            self.words.insert(word.to_lowercase(), polarity);
            added += 1;
        }

        debug!(
            "Merged {} lexicon entries from {} ({} words total)",
            added,
            path.display(),
            self.len()
        );
        Ok(self)
    }

    /// Number of scored words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
        text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .filter(|t| !t.is_empty())
            .map(|t| t.to_lowercase())
    }
}

impl PolarityModel for LexiconModel {
    fn polarity(&self, text: &str) -> Result<f64, SentimentError> {
        let mut assessments = Vec::new();
        let mut intensity = 1.0;
        let mut negated = false;

        for token in Self::tokens(text) {
            if self.negations.contains(&token) {
                negated = true;
            } else if let Some(factor) = self.intensifiers.get(&token) {
                intensity *= factor;
            } else if let Some(polarity) = self.words.get(&token) {
                let mut score = polarity * intensity;
                if negated {
                    score *= NEGATION_FACTOR;
                }
                assessments.push(score.clamp(-1.0, 1.0));
                intensity = 1.0;
                negated = false;
            } else {
                intensity = 1.0;
            }
        }

        if assessments.is_empty() {
            return Ok(0.0);
        }
        let mean = assessments.iter().sum::<f64>() / assessments.len() as f64;
        Ok(mean.clamp(-1.0, 1.0))
    }
}
