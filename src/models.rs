//! Data models for the tweet comparison pipeline.
//!
//! This module contains the core data structures shared by the loader,
//! the aggregator, the sentiment classifier and the significance tests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Standardized column names of a loaded table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Column {
    /// Calendar date of the tweet (time discarded).
    Date,
    /// Raw tweet text.
    Tweet,
    /// Country name.
    Country,
    /// State or region name (nullable).
    State,
    /// Source label assigned by the pipeline.
    Hashtag,
}

impl Column {
    /// Columns a loaded file must provide.
    pub const LOADED: [Column; 4] = [Column::Date, Column::Tweet, Column::Country, Column::State];
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Date => write!(f, "Date"),
            Column::Tweet => write!(f, "Tweet"),
            Column::Country => write!(f, "Country"),
            Column::State => write!(f, "State"),
            Column::Hashtag => write!(f, "Hashtag"),
        }
    }
}

/// Which dataset a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Hashtag {
    Trump,
    Biden,
}

impl Hashtag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Hashtag::Trump => "Trump",
            Hashtag::Biden => "Biden",
        }
    }
}

impl fmt::Display for Hashtag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tweet observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub date: NaiveDate,
    pub tweet: String,
    pub country: String,
    pub state: Option<String>,
    /// Unset until the pipeline tags the dataset.
    pub hashtag: Option<Hashtag>,
}

impl Record {
    /// Returns the cell for `column` as text, or `None` when it is null.
    ///
    /// Empty strings are treated as null, matching how blank CSV cells load.
    pub fn field(&self, column: Column) -> Option<String> {
        let value = match column {
            Column::Date => Some(self.date.format("%Y-%m-%d").to_string()),
            Column::Tweet => Some(self.tweet.clone()),
            Column::Country => Some(self.country.clone()),
            Column::State => self.state.clone(),
            Column::Hashtag => self.hashtag.map(|h| h.to_string()),
        };
        value.filter(|v| !v.is_empty())
    }

    /// Returns a copy of this record tagged with `hashtag`.
    pub fn tagged(&self, hashtag: Hashtag) -> Self {
        Self {
            hashtag: Some(hashtag),
            ..self.clone()
        }
    }
}

/// Discrete sentiment classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Classify a polarity by its sign.
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > 0.0 {
            SentimentLabel::Positive
        } else if polarity < 0.0 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "POSITIVE"),
            SentimentLabel::Negative => write!(f, "NEGATIVE"),
            SentimentLabel::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Polarity score with its derived label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub polarity: f64,
    pub label: SentimentLabel,
}

impl SentimentResult {
    pub fn new(polarity: f64) -> Self {
        Self {
            polarity,
            label: SentimentLabel::from_polarity(polarity),
        }
    }
}

/// Kind of two-sample t-test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestKind {
    /// Index-aligned samples (same unit measured twice).
    Paired,
    /// Independent samples with pooled variance.
    Independent,
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestKind::Paired => write!(f, "paired"),
            TestKind::Independent => write!(f, "independent"),
        }
    }
}

/// Test statistic and two-tailed p-value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub statistic: f64,
    pub p_value: f64,
}
