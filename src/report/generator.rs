//! Run summary generation.
//!
//! This module renders an [`AnalysisOutcome`] as a human-readable text
//! summary or as JSON.

use crate::analysis::stats::report_lines;
use crate::analysis::PivotTable;
use crate::models::SentimentLabel;
use crate::pipeline::{AnalysisOutcome, NamedTest, SentimentSummary, StageCounts};
use anyhow::Result;

/// Generate the complete text summary.
pub fn generate_text_report(outcome: &AnalysisOutcome) -> String {
    let mut output = String::new();

    output.push_str("# TweetCompare Report\n\n");
    output.push_str(&generate_stages_section(&outcome.stages));
    output.push_str(&generate_timeseries_section(&outcome.by_date));
    output.push_str(&generate_states_section(&outcome.by_state));
    output.push_str(&generate_test_section("Tweet Counts by State", &outcome.paired_test));

    if let Some(ref sentiment) = outcome.sentiment {
        output.push_str(&generate_sentiment_section(sentiment));
    }

    output
}

/// Generate the row counts section.
fn generate_stages_section(stages: &StageCounts) -> String {
    let mut section = String::new();

    section.push_str("## Rows\n\n");
    section.push_str(&format!("- **#Trump loaded:** {}\n", stages.trump_loaded));
    section.push_str(&format!("- **#Biden loaded:** {}\n", stages.biden_loaded));
    section.push_str(&format!("- **Combined:** {}\n", stages.combined));
    section.push_str(&format!("- **In country:** {}\n", stages.in_country));
    section.push_str(&format!("- **In 50 states + D.C.:** {}\n", stages.in_regions));
    section.push('\n');

    section
}

fn format_cell(cell: Option<u64>) -> String {
    cell.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string())
}

fn table_header(table: &PivotTable) -> String {
    let mut header = format!("| {} |", table.index);
    let mut rule = String::from("|:---|");
    for column in &table.columns {
        header.push_str(&format!(" {} |", column));
        rule.push_str(":---:|");
    }
    format!("{}\n{}\n", header, rule)
}

/// Generate the tweets-per-day table.
fn generate_timeseries_section(table: &PivotTable) -> String {
    let mut section = String::new();

    section.push_str("## Tweets per Day\n\n");
    if table.rows.is_empty() {
        section.push_str("No tweets left after filtering.\n\n");
        return section;
    }

    section.push_str(&table_header(table));
    for day in table.index_values() {
        section.push_str(&format!("| {} |", day));
        for column in &table.columns {
            section.push_str(&format!(" {} |", format_cell(table.get(day, column))));
        }
        section.push('\n');
    }
    section.push('\n');

    section
}

/// Generate the per-state summary.
fn generate_states_section(table: &PivotTable) -> String {
    let mut section = String::new();
    let (rows, width) = table.shape();

    section.push_str("## Tweets per State\n\n");
    section.push_str(&format!("- **Shape:** {} x {}\n", rows, width));
    section.push_str(&format!("- **Tweets counted:** {}\n", table.total()));
    for column in &table.columns {
        if let Some(mean) = table.column_mean(column) {
            section.push_str(&format!("- **Mean #{} per state:** {:.4}\n", column, mean));
        }
    }
    section.push('\n');

    section
}

/// Generate a section for one significance test.
fn generate_test_section(title: &str, test: &NamedTest) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {} ({} t-test)\n\n", title, test.kind));
    section.push_str("```\n");
    for line in report_lines(&test.name, &test.result) {
        section.push_str(&line);
        section.push('\n');
    }
    section.push_str("```\n\n");

    section
}

/// Generate the sentiment section.
fn generate_sentiment_section(summary: &SentimentSummary) -> String {
    let mut section = String::new();
    let labels = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ];

    section.push_str("## Sentiment\n\n");
    section.push_str("| Hashtag | POSITIVE | NEGATIVE | NEUTRAL | Mean Polarity |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---:|\n");
    for (hashtag, counts) in &summary.labels {
        section.push_str(&format!("| {} |", hashtag));
        for label in labels {
            section.push_str(&format!(" {} |", counts.get(&label).copied().unwrap_or(0)));
        }
        let mean = summary.mean_polarity.get(hashtag).copied().unwrap_or(0.0);
        section.push_str(&format!(" {:.4} |\n", mean));
    }
    section.push('\n');

    section.push_str(&generate_test_section("Tweet Polarity", &summary.polarity_test));

    section
}

/// Generate a JSON report.
pub fn generate_json_report(outcome: &AnalysisOutcome) -> Result<String> {
    serde_json::to_string_pretty(outcome).map_err(Into::into)
}
