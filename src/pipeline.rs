//! End-to-end comparison of #Trump and #Biden tweet activity.
//!
//! Loads both datasets, tags and concatenates them, keeps US tweets from the
//! 50 states and D.C., counts tweets per day and per state, and runs a paired
//! t-test on the per-state counts. An optional sentiment pass scores every
//! kept tweet and compares polarity between the two hashtags.

use crate::analysis::{pivot, stat_test, value_counts, AggregateError, PivotTable, StatsError};
use crate::config::{Config, FilterConfig};
use crate::ingest::{read_csv, ColumnMapping, LoadError};
use crate::models::{Column, Hashtag, Record, SentimentLabel, TestKind, TestResult};
use crate::report::ReportSink;
use crate::sentiment::{analyze_with, LexiconModel, PolarityModel, SentimentError};
use crate::text::clean_text;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// The 50 US states plus the District of Columbia.
pub const US_STATES: [&str; 51] = [
    "Alabama",
    "Alaska",
    "Arizona",
    "Arkansas",
    "California",
    "Colorado",
    "Connecticut",
    "Delaware",
    "District of Columbia",
    "Florida",
    "Georgia",
    "Hawaii",
    "Idaho",
    "Illinois",
    "Indiana",
    "Iowa",
    "Kansas",
    "Kentucky",
    "Louisiana",
    "Maine",
    "Maryland",
    "Massachusetts",
    "Michigan",
    "Minnesota",
    "Mississippi",
    "Missouri",
    "Montana",
    "Nebraska",
    "Nevada",
    "New Hampshire",
    "New Jersey",
    "New Mexico",
    "New York",
    "North Carolina",
    "North Dakota",
    "Ohio",
    "Oklahoma",
    "Oregon",
    "Pennsylvania",
    "Rhode Island",
    "South Carolina",
    "South Dakota",
    "Tennessee",
    "Texas",
    "Utah",
    "Vermont",
    "Virginia",
    "Washington",
    "West Virginia",
    "Wisconsin",
    "Wyoming",
];

pub const PAIRED_TEST_NAME: &str =
    "Paired T-Test      : Difference between #Trump & #Biden Tweet Counts";
pub const POLARITY_TEST_NAME: &str =
    "Independent T-Test : Difference between #Trump & #Biden Tweet Polarity";

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to load {hashtag} dataset: {source}")]
    Load {
        hashtag: Hashtag,
        #[source]
        source: LoadError,
    },

    #[error(transparent)]
    Mapping(LoadError),

    #[error(
        "Filtered regions are not the 50 states plus D.C. (missing: [{}], unexpected: [{}])",
        .missing.join(", "),
        .unexpected.join(", ")
    )]
    RegionCoverage {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error(transparent)]
    Stats(#[from] StatsError),

    #[error(transparent)]
    Sentiment(#[from] SentimentError),
}

/// Row counts after each stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StageCounts {
    pub trump_loaded: usize,
    pub biden_loaded: usize,
    pub combined: usize,
    pub in_country: usize,
    pub in_regions: usize,
}

/// A named test and its result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedTest {
    pub name: String,
    pub kind: TestKind,
    pub result: TestResult,
}

/// Sentiment tallies per hashtag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentSummary {
    pub labels: BTreeMap<Hashtag, BTreeMap<SentimentLabel, usize>>,
    pub mean_polarity: BTreeMap<Hashtag, f64>,
    pub polarity_test: NamedTest,
}

/// Everything a run produces.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub stages: StageCounts,
    /// Kept tweets per hashtag label.
    pub tweets_per_hashtag: BTreeMap<String, usize>,
    pub by_date: PivotTable,
    pub by_state: PivotTable,
    pub paired_test: NamedTest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<SentimentSummary>,
}

/// Copy `records` with every row tagged as `hashtag`.
pub fn tag(records: &[Record], hashtag: Hashtag) -> Vec<Record> {
    records.iter().map(|r| r.tagged(hashtag)).collect()
}

/// Keep rows whose country equals `country` exactly.
pub fn filter_country(records: &[Record], country: &str) -> Vec<Record> {
    records
        .iter()
        .filter(|r| r.country == country)
        .cloned()
        .collect()
}

/// Drop rows with no state or with a state in `excluded`.
pub fn filter_regions(records: &[Record], excluded: &[String]) -> Vec<Record> {
    records
        .iter()
        .filter(|r| match r.state.as_deref() {
            Some(state) if !state.is_empty() => !excluded.iter().any(|e| e == state),
            _ => false,
        })
        .cloned()
        .collect()
}

/// Compare observed regions with [`US_STATES`].
///
/// Returns (missing, unexpected), both sorted.
pub fn region_coverage<'a, I>(regions: I) -> (Vec<String>, Vec<String>)
where
    I: IntoIterator<Item = &'a str>,
{
    let observed: BTreeSet<&str> = regions.into_iter().collect();
    let expected: BTreeSet<&str> = US_STATES.iter().copied().collect();

    let missing = expected.difference(&observed).map(|s| s.to_string()).collect();
    let unexpected = observed.difference(&expected).map(|s| s.to_string()).collect();
    (missing, unexpected)
}

fn check_regions(by_state: &PivotTable, filter: &FilterConfig) -> Result<(), PipelineError> {
    let (missing, unexpected) = region_coverage(by_state.index_values());
    if missing.is_empty() && unexpected.is_empty() {
        return Ok(());
    }
    if filter.require_all_states {
        return Err(PipelineError::RegionCoverage {
            missing,
            unexpected,
        });
    }
    warn!(
        "Region coverage differs from 50 states + D.C. (missing {}, unexpected {})",
        missing.len(),
        unexpected.len()
    );
    Ok(())
}

fn load(
    path: &Path,
    mapping: &ColumnMapping,
    hashtag: Hashtag,
) -> Result<Vec<Record>, PipelineError> {
    let records =
        read_csv(path, mapping).map_err(|source| PipelineError::Load { hashtag, source })?;
    Ok(tag(&records, hashtag))
}

/// Paired t-test of Trump vs. Biden counts across states, in index order.
pub fn compare_states(
    by_state: &PivotTable,
    sink: &mut ReportSink,
) -> Result<NamedTest, PipelineError> {
    let trump = counts_as_f64(by_state.complete_column(Hashtag::Trump.as_str())?);
    let biden = counts_as_f64(by_state.complete_column(Hashtag::Biden.as_str())?);

    let result = stat_test(&trump, &biden, PAIRED_TEST_NAME, TestKind::Paired, sink)?;
    Ok(NamedTest {
        name: PAIRED_TEST_NAME.to_string(),
        kind: TestKind::Paired,
        result,
    })
}

fn counts_as_f64(counts: Vec<u64>) -> Vec<f64> {
    counts.into_iter().map(|c| c as f64).collect()
}

/// Clean and score every tweet, then compare polarity between hashtags.
pub fn sentiment_pass<M: PolarityModel + ?Sized>(
    records: &[Record],
    model: &M,
    sink: &mut ReportSink,
) -> Result<SentimentSummary, PipelineError> {
    let mut labels: BTreeMap<Hashtag, BTreeMap<SentimentLabel, usize>> = BTreeMap::new();
    let mut polarities: BTreeMap<Hashtag, Vec<f64>> = BTreeMap::new();

    for record in records {
        let Some(hashtag) = record.hashtag else {
            continue;
        };
        let scored = analyze_with(model, &clean_text(&record.tweet))?;
        *labels.entry(hashtag).or_default().entry(scored.label).or_default() += 1;
        polarities.entry(hashtag).or_default().push(scored.polarity);
    }

    let mean_polarity = polarities
        .iter()
        .map(|(h, p)| (*h, p.iter().sum::<f64>() / p.len() as f64))
        .collect();

    let empty = Vec::new();
    let trump = polarities.get(&Hashtag::Trump).unwrap_or(&empty);
    let biden = polarities.get(&Hashtag::Biden).unwrap_or(&empty);
    let result = stat_test(trump, biden, POLARITY_TEST_NAME, TestKind::Independent, sink)?;

    Ok(SentimentSummary {
        labels,
        mean_polarity,
        polarity_test: NamedTest {
            name: POLARITY_TEST_NAME.to_string(),
            kind: TestKind::Independent,
            result,
        },
    })
}

/// Run the full comparison described by `config`.
pub fn run(config: &Config, sink: &mut ReportSink) -> Result<AnalysisOutcome, PipelineError> {
    let mapping = config.mapping().map_err(PipelineError::Mapping)?;

    let trump = load(&config.data.trump, &mapping, Hashtag::Trump)?;
    let biden = load(&config.data.biden, &mapping, Hashtag::Biden)?;

    let mut stages = StageCounts {
        trump_loaded: trump.len(),
        biden_loaded: biden.len(),
        ..StageCounts::default()
    };

    let combined: Vec<Record> = trump.into_iter().chain(biden).collect();
    stages.combined = combined.len();

    let in_country = filter_country(&combined, &config.filter.country);
    stages.in_country = in_country.len();

    let selected = filter_regions(&in_country, &config.filter.excluded_regions);
    stages.in_regions = selected.len();
    info!(
        "Kept {} of {} tweets ({} in {})",
        stages.in_regions, stages.combined, stages.in_country, config.filter.country
    );

    let tweets_per_hashtag = value_counts(&selected, Column::Hashtag);
    debug!("Kept tweets per hashtag: {:?}", tweets_per_hashtag);

    let by_date = pivot(&selected, Column::Date, Column::Hashtag, Column::Tweet, false);
    let by_state = pivot(&selected, Column::State, Column::Hashtag, Column::Tweet, true);
    debug!("Pivot shapes: by date {:?}, by state {:?}", by_date.shape(), by_state.shape());

    check_regions(&by_state, &config.filter)?;

    let sentiment_model = if config.analysis.sentiment {
        let model = LexiconModel::new();
        Some(match config.analysis.lexicon {
            Some(ref path) => model.with_lexicon_file(path)?,
            None => model,
        })
    } else {
        None
    };

    let (paired_test, sentiment) = if config.analysis.suppress_report {
        let mut guard = sink.suppress();
        let paired = compare_states(&by_state, &mut guard)?;
        let sentiment = match sentiment_model {
            Some(ref model) => Some(sentiment_pass(&selected, model, &mut guard)?),
            None => None,
        };
        (paired, sentiment)
    } else {
        let paired = compare_states(&by_state, sink)?;
        let sentiment = match sentiment_model {
            Some(ref model) => Some(sentiment_pass(&selected, model, sink)?),
            None => None,
        };
        (paired, sentiment)
    };

    Ok(AnalysisOutcome {
        stages,
        tweets_per_hashtag,
        by_date,
        by_state,
        paired_test,
        sentiment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnalysisConfig, DataConfig};
    use crate::report::sink::tests::buffered_sink;
    use std::fmt::Write as _;
    use std::io::Write;
    use tempfile::TempDir;

    const HEADER: &str = "created_at,tweet_id,tweet,likes,country,state\n";

    /// Per-state tweet counts: (state, trump, biden).
    fn state_counts() -> Vec<(&'static str, usize, usize)> {
        US_STATES
            .iter()
            .enumerate()
            .map(|(i, s)| (*s, 1 + i % 4, 1 + (i * 7) % 5))
            .collect()
    }

    fn dataset(counts: impl Iterator<Item = (&'static str, usize)>, words: &[&str]) -> String {
        let mut csv = HEADER.to_string();
        let mut id = 0;
        for (state, n) in counts {
            for k in 0..n {
                id += 1;
                let day = 15 + (k % 3);
                let word = words[k % words.len()];
                writeln!(
                    csv,
                    "2020-10-{} 08:00:00,{},\"#{} {} tweet\",0,United States of America,{}",
                    day, id, word, word, state
                )
                .unwrap();
            }
        }
        // Rows every filter must drop.
        csv.push_str("2020-10-15 09:00:00,900,\"guam\",0,United States of America,Guam\n");
        csv.push_str("2020-10-15 09:00:00,901,\"pr\",0,United States of America,Puerto Rico\n");
        csv.push_str("2020-10-15 09:00:00,902,\"no state\",0,United States of America,\n");
        csv.push_str("2020-10-15 09:00:00,903,\"abroad\",0,France,Île-de-France\n");
        csv
    }

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    fn config_for(dir: &TempDir, trump_csv: &str, biden_csv: &str) -> Config {
        Config {
            data: DataConfig {
                trump: write(dir, "trump.csv", trump_csv),
                biden: write(dir, "biden.csv", biden_csv),
                ..DataConfig::default()
            },
            filter: FilterConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }

    fn standard_config(dir: &TempDir) -> Config {
        let counts = state_counts();
        let trump = dataset(counts.iter().map(|(s, t, _)| (*s, *t)), &["great", "good"]);
        let biden = dataset(counts.iter().map(|(s, _, b)| (*s, *b)), &["sad", "bad"]);
        config_for(dir, &trump, &biden)
    }

    #[test]
    fn test_filters() {
        let dir = TempDir::new().unwrap();
        let outcome = run(&standard_config(&dir), &mut buffered_sink().0).unwrap();

        let counts = state_counts();
        let trump_total: usize = counts.iter().map(|c| c.1).sum();
        let biden_total: usize = counts.iter().map(|c| c.2).sum();

        assert_eq!(outcome.stages.trump_loaded, trump_total + 4);
        assert_eq!(outcome.stages.biden_loaded, biden_total + 4);
        assert_eq!(outcome.stages.combined, trump_total + biden_total + 8);
        assert_eq!(outcome.stages.in_country, trump_total + biden_total + 6);
        assert_eq!(outcome.stages.in_regions, trump_total + biden_total);
        assert_eq!(outcome.tweets_per_hashtag.get("Trump"), Some(&trump_total));
        assert_eq!(outcome.tweets_per_hashtag.get("Biden"), Some(&biden_total));
    }

    #[test]
    fn test_pivots_cover_states_and_dates() {
        let dir = TempDir::new().unwrap();
        let outcome = run(&standard_config(&dir), &mut buffered_sink().0).unwrap();

        assert_eq!(outcome.by_state.shape(), (51, 3));
        assert_eq!(outcome.by_date.shape(), (3, 2));
        assert_eq!(outcome.by_state.get("Alabama", "Trump"), Some(1));
        assert_eq!(outcome.by_state.get("Alaska", "Biden"), Some(3));
        assert_eq!(outcome.by_state.total(), outcome.stages.in_regions as u64);
        assert_eq!(outcome.by_date.total(), outcome.stages.in_regions as u64);
        assert_eq!(
            region_coverage(outcome.by_state.index_values()),
            (vec![], vec![])
        );
    }

    #[test]
    fn test_paired_test_on_state_counts() {
        let dir = TempDir::new().unwrap();
        let outcome = run(&standard_config(&dir), &mut buffered_sink().0).unwrap();

        let counts = state_counts();
        let trump: Vec<f64> = counts.iter().map(|c| c.1 as f64).collect();
        let biden: Vec<f64> = counts.iter().map(|c| c.2 as f64).collect();
        let expected = crate::analysis::stats::compare(&trump, &biden, TestKind::Paired).unwrap();

        assert_eq!(outcome.paired_test.name, PAIRED_TEST_NAME);
        assert!((outcome.paired_test.result.statistic - (-1.977165113594414)).abs() < 1e-6);
        assert!((outcome.paired_test.result.p_value - 0.05354980925697779).abs() < 1e-6);
        assert_eq!(outcome.paired_test.result, expected);
        assert!(outcome.sentiment.is_none());
    }

    #[test]
    fn test_report_suppressed_by_default() {
        let dir = TempDir::new().unwrap();
        let (mut sink, buffer) = buffered_sink();
        run(&standard_config(&dir), &mut sink).unwrap();
        assert_eq!(buffer.contents(), "");
        assert!(!sink.is_suppressed());
    }

    #[test]
    fn test_report_shown_when_not_suppressed() {
        let dir = TempDir::new().unwrap();
        let mut config = standard_config(&dir);
        config.analysis.suppress_report = false;

        let (mut sink, buffer) = buffered_sink();
        run(&config, &mut sink).unwrap();

        let mut expected = String::new();
        writeln!(expected, "{}", PAIRED_TEST_NAME).unwrap();
        assert!(buffer.contents().starts_with(&expected));
        assert!(buffer.contents().contains("T-Statistic        : -1.9772"));
        assert!(buffer.contents().contains("P-value            : 0.0535"));
    }

    #[test]
    fn test_missing_state_is_rejected() {
        let dir = TempDir::new().unwrap();
        let counts: Vec<_> = state_counts().into_iter().filter(|c| c.0 != "Wyoming").collect();
        let trump = dataset(counts.iter().map(|(s, t, _)| (*s, *t)), &["x"]);
        let biden = dataset(counts.iter().map(|(s, _, b)| (*s, *b)), &["y"]);
        let mut config = config_for(&dir, &trump, &biden);

        let err = run(&config, &mut buffered_sink().0).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::RegionCoverage { ref missing, .. } if missing == &vec!["Wyoming".to_string()]
        ));

        config.filter.require_all_states = false;
        let outcome = run(&config, &mut buffered_sink().0).unwrap();
        assert_eq!(outcome.by_state.shape(), (50, 3));
    }

    #[test]
    fn test_absent_cell_is_an_error_not_zero() {
        let dir = TempDir::new().unwrap();
        let counts = state_counts();
        let trump = dataset(counts.iter().map(|(s, t, _)| (*s, *t)), &["x"]);
        let biden = dataset(
            counts.iter().filter(|c| c.0 != "Ohio").map(|(s, _, b)| (*s, *b)),
            &["y"],
        );
        let config = config_for(&dir, &trump, &biden);

        let err = run(&config, &mut buffered_sink().0).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Aggregate(AggregateError::MissingCell { ref row, .. }) if row == "Ohio"
        ));
    }

    #[test]
    fn test_load_error_names_dataset() {
        let dir = TempDir::new().unwrap();
        let mut config = standard_config(&dir);
        config.data.biden = dir.path().join("missing.csv");

        let err = run(&config, &mut buffered_sink().0).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Load {
                hashtag: Hashtag::Biden,
                ..
            }
        ));
    }

    #[test]
    fn test_sentiment_pass() {
        let dir = TempDir::new().unwrap();
        let mut config = standard_config(&dir);
        config.analysis.sentiment = true;

        let outcome = run(&config, &mut buffered_sink().0).unwrap();
        let summary = outcome.sentiment.unwrap();

        let counts = state_counts();
        let trump_total: usize = counts.iter().map(|c| c.1).sum();
        assert_eq!(
            summary.labels[&Hashtag::Trump].get(&SentimentLabel::Positive),
            Some(&trump_total)
        );
        assert_eq!(summary.labels[&Hashtag::Biden].get(&SentimentLabel::Positive), None);
        assert!(summary.mean_polarity[&Hashtag::Trump] >= 0.7);
        assert!(summary.mean_polarity[&Hashtag::Biden] <= -0.5);
        assert!(summary.polarity_test.result.statistic > 0.0);
        assert_eq!(summary.polarity_test.kind, TestKind::Independent);
    }

    #[test]
    fn test_degenerate_sentiment_sample_fails_run() {
        let dir = TempDir::new().unwrap();
        let counts = state_counts();
        let trump = dataset(counts.iter().map(|(s, t, _)| (*s, *t)), &["great"]);
        let biden = dataset(counts.iter().map(|(s, _, b)| (*s, *b)), &["sad"]);
        let mut config = config_for(&dir, &trump, &biden);
        config.analysis.sentiment = true;

        let (mut sink, _buffer) = buffered_sink();
        let err = run(&config, &mut sink).unwrap_err();
        assert!(matches!(err, PipelineError::Stats(StatsError::ZeroVariance)));
        assert!(!sink.is_suppressed());
    }

    #[test]
    fn test_filter_helpers() {
        let base = Record {
            date: chrono::NaiveDate::from_ymd_opt(2020, 11, 1).unwrap(),
            tweet: "t".to_string(),
            country: "United States of America".to_string(),
            state: Some("Guam".to_string()),
            hashtag: None,
        };
        let records = vec![
            base.clone(),
            Record {
                state: Some("Iowa".to_string()),
                ..base.clone()
            },
            Record {
                country: "Canada".to_string(),
                ..base.clone()
            },
        ];

        assert_eq!(filter_country(&records, "United States of America").len(), 2);
        let kept = filter_regions(&records, &FilterConfig::default().excluded_regions);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].state.as_deref(), Some("Iowa"));

        let tagged = tag(&records, Hashtag::Trump);
        assert!(tagged.iter().all(|r| r.hashtag == Some(Hashtag::Trump)));
        assert!(records.iter().all(|r| r.hashtag.is_none()));
    }
}
