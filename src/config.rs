//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.tweetcompare.toml` files.

use crate::ingest::{ColumnMapping, LoadError};
use crate::models::Column;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".tweetcompare.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Input datasets and column selection.
    #[serde(default)]
    pub data: DataConfig,

    /// Row filters.
    #[serde(default)]
    pub filter: FilterConfig,

    /// Test and reporting settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// Input dataset settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// CSV of #Trump tweets.
    #[serde(default = "default_trump")]
    pub trump: PathBuf,

    /// CSV of #Biden tweets.
    #[serde(default = "default_biden")]
    pub biden: PathBuf,

    /// Source columns to read.
    #[serde(default = "default_usecols")]
    pub usecols: Vec<String>,

    /// Standard names for `usecols`, position by position.
    #[serde(default = "default_renames")]
    pub renames: Vec<Column>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            trump: default_trump(),
            biden: default_biden(),
            usecols: default_usecols(),
            renames: default_renames(),
        }
    }
}

fn default_trump() -> PathBuf {
    PathBuf::from("./dataset/hashtag_donaldtrump.csv")
}

fn default_biden() -> PathBuf {
    PathBuf::from("./dataset/hashtag_joebiden.csv")
}

fn default_usecols() -> Vec<String> {
    vec!["created_at", "tweet", "country", "state"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_renames() -> Vec<Column> {
    Column::LOADED.to_vec()
}

/// Row filter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Only tweets from this country are kept.
    #[serde(default = "default_country")]
    pub country: String,

    /// Regions dropped even though they carry a state value.
    #[serde(default = "default_excluded_regions")]
    pub excluded_regions: Vec<String>,

    /// Fail unless exactly the 50 states and D.C. remain after filtering.
    #[serde(default = "default_true")]
    pub require_all_states: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            country: default_country(),
            excluded_regions: default_excluded_regions(),
            require_all_states: true,
        }
    }
}

fn default_country() -> String {
    "United States of America".to_string()
}

fn default_excluded_regions() -> Vec<String> {
    vec!["Puerto Rico", "Guam", "Northern Mariana Islands"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_true() -> bool {
    true
}

/// Analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Discard the test report lines while tests run.
    #[serde(default = "default_true")]
    pub suppress_report: bool,

    /// Score tweet sentiment and compare polarity between hashtags.
    #[serde(default)]
    pub sentiment: bool,

    /// Extra `word,polarity` CSV merged into the sentiment lexicon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lexicon: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            suppress_report: true,
            sentiment: false,
            lexicon: None,
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Column mapping described by `[data]`.
    pub fn mapping(&self) -> Result<ColumnMapping, LoadError> {
        ColumnMapping::new(self.data.usecols.as_slice(), &self.data.renames)
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref trump) = args.trump {
            self.data.trump = trump.clone();
        }
        if let Some(ref biden) = args.biden {
            self.data.biden = biden.clone();
        }
        if let Some(ref country) = args.country {
            self.filter.country = country.clone();
        }
        if let Some(ref lexicon) = args.lexicon {
            self.analysis.lexicon = Some(lexicon.clone());
        }

        // Flags only ever switch behavior on
        if args.lenient_regions {
            self.filter.require_all_states = false;
        }
        if args.show_report {
            self.analysis.suppress_report = false;
        }
        if args.sentiment {
            self.analysis.sentiment = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
