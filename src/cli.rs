//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// TweetCompare - compare #Trump and #Biden tweet activity
///
/// Counts election tweets per day and per US state and tests whether the
/// per-state counts differ between the two hashtags.
///
/// Examples:
///   tweetcompare --trump hashtag_donaldtrump.csv --biden hashtag_joebiden.csv
///   tweetcompare --show-report --format json
///   tweetcompare --sentiment --lexicon extra_words.csv
///   tweetcompare --clean "Check https://t.co/x NOW!"
///   tweetcompare --analyze "I am very happy"
///   tweetcompare --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// CSV file of #Trump tweets
    #[arg(long, value_name = "FILE", env = "TWEETCOMPARE_TRUMP")]
    pub trump: Option<PathBuf>,

    /// CSV file of #Biden tweets
    #[arg(long, value_name = "FILE", env = "TWEETCOMPARE_BIDEN")]
    pub biden: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .tweetcompare.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Country whose tweets are kept
    #[arg(long, value_name = "NAME")]
    pub country: Option<String>,

    /// Warn instead of failing when the kept regions are not exactly the
    /// 50 states plus D.C.
    #[arg(long)]
    pub lenient_regions: bool,

    /// Print the t-test report lines instead of suppressing them
    #[arg(long)]
    pub show_report: bool,

    /// Also score tweet sentiment and compare polarity between hashtags
    #[arg(long)]
    pub sentiment: bool,

    /// Extra `word,polarity` CSV merged into the sentiment lexicon
    #[arg(long, value_name = "FILE")]
    pub lexicon: Option<PathBuf>,

    /// Output format for the run summary (text, json)
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Clean a single text and print it, then exit
    #[arg(long, value_name = "TEXT", conflicts_with = "analyze")]
    pub clean: Option<String>,

    /// Print the sentiment of a single text, then exit
    #[arg(long, value_name = "TEXT")]
    pub analyze: Option<String>,

    /// Generate a default .tweetcompare.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Output format for the run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text (default)
    #[default]
    Text,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Whether this invocation runs the dataset pipeline.
    pub fn runs_pipeline(&self) -> bool {
        !self.init_config && self.clean.is_none() && self.analyze.is_none()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref country) = self.country {
            if country.trim().is_empty() {
                return Err("Country must not be empty".to_string());
            }
        }

        // Validate lexicon file if provided
        if let Some(ref lexicon) = self.lexicon {
            if !lexicon.is_file() {
                return Err(format!("Lexicon file does not exist: {}", lexicon.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            trump: Some(PathBuf::from("trump.csv")),
            biden: Some(PathBuf::from("biden.csv")),
            config: None,
            country: None,
            lenient_regions: false,
            show_report: false,
            sentiment: false,
            lexicon: None,
            format: OutputFormat::Text,
            clean: None,
            analyze: None,
            init_config: false,
            verbose: false,
            quiet: false,
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::parse_from([
            "tweetcompare",
            "--trump",
            "t.csv",
            "--biden",
            "b.csv",
            "--format",
            "json",
            "--sentiment",
        ]);
        assert_eq!(args.trump, Some(PathBuf::from("t.csv")));
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.sentiment);
        assert!(args.runs_pipeline());
    }

    #[test]
    fn test_clean_and_analyze_conflict() {
        let result = Args::try_parse_from(["tweetcompare", "--clean", "a", "--analyze", "b"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_one_shot_modes_skip_pipeline() {
        let mut args = make_args();
        args.clean = Some("text".to_string());
        assert!(!args.runs_pipeline());

        let mut args = make_args();
        args.init_config = true;
        assert!(!args.runs_pipeline());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_lexicon() {
        let mut args = make_args();
        args.lexicon = Some(PathBuf::from("/nonexistent/lexicon.csv"));
        assert!(args.validate().is_err());

        args.lexicon = None;
        args.country = Some("  ".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
