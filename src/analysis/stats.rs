//! Two-sample t-tests.
//!
//! [`compare`] is the numeric contract. [`stat_test`] adds the three-line
//! human-readable report on top of it; report write failures never change
//! the returned result.

use crate::models::{TestKind, TestResult};
use crate::report::ReportSink;
use statrs::distribution::{ContinuousCDF, StudentsT};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised by a significance test.
#[derive(Debug, Error, PartialEq)]
pub enum StatsError {
    #[error("Paired test needs equal-length samples (got {left} and {right})")]
    LengthMismatch { left: usize, right: usize },

    #[error("{kind} test needs more observations (got {left} and {right})")]
    TooFewObservations {
        kind: TestKind,
        left: usize,
        right: usize,
    },

    #[error("Samples contain a non-finite value")]
    NonFinite,

    #[error("Samples have zero variance; the t statistic is undefined")]
    ZeroVariance,

    #[error("t distribution error: {0}")]
    Distribution(String),
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Unbiased sample variance (n - 1 denominator).
fn variance(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

/// Two-tailed p-value for `t` under Student's t with `df` degrees of freedom.
fn two_tailed_p(t: f64, df: f64) -> Result<f64, StatsError> {
    let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| StatsError::Distribution(e.to_string()))?;
    Ok((2.0 * dist.sf(t.abs())).clamp(0.0, 1.0))
}

fn paired(a: &[f64], b: &[f64]) -> Result<TestResult, StatsError> {
    if a.len() != b.len() {
        return Err(StatsError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    if a.len() < 2 {
        return Err(StatsError::TooFewObservations {
            kind: TestKind::Paired,
            left: a.len(),
            right: b.len(),
        });
    }

    let diffs: Vec<f64> = a.iter().zip(b).map(|(x, y)| x - y).collect();
    let n = diffs.len() as f64;
    let var = variance(&diffs);
    if var == 0.0 {
        return Err(StatsError::ZeroVariance);
    }

    let statistic = mean(&diffs) / (var / n).sqrt();
    let p_value = two_tailed_p(statistic, n - 1.0)?;
    Ok(TestResult { statistic, p_value })
}

fn independent(a: &[f64], b: &[f64]) -> Result<TestResult, StatsError> {
    let (n1, n2) = (a.len(), b.len());
    if n1 == 0 || n2 == 0 || n1 + n2 < 3 {
        return Err(StatsError::TooFewObservations {
            kind: TestKind::Independent,
            left: n1,
            right: n2,
        });
    }

    let df = (n1 + n2 - 2) as f64;
    let ss = |s: &[f64]| if s.len() > 1 { variance(s) * (s.len() - 1) as f64 } else { 0.0 };
    let pooled = (ss(a) + ss(b)) / df;
    if pooled == 0.0 {
        return Err(StatsError::ZeroVariance);
    }

    let se = (pooled * (1.0 / n1 as f64 + 1.0 / n2 as f64)).sqrt();
    let statistic = (mean(a) - mean(b)) / se;
    let p_value = two_tailed_p(statistic, df)?;
    Ok(TestResult { statistic, p_value })
}

/// Run a t-test of `kind` over two samples.
///
/// Paired tests treat `a[i]` and `b[i]` as the same unit; unequal lengths
/// are rejected rather than truncated.
pub fn compare(a: &[f64], b: &[f64], kind: TestKind) -> Result<TestResult, StatsError> {
    if a.iter().chain(b).any(|v| !v.is_finite()) {
        return Err(StatsError::NonFinite);
    }

    let result = match kind {
        TestKind::Paired => paired(a, b)?,
        TestKind::Independent => independent(a, b)?,
    };

    debug!(
        "{} t-test: t={:.6}, p={:.6} (n={} / {})",
        kind,
        result.statistic,
        result.p_value,
        a.len(),
        b.len()
    );
    Ok(result)
}

/// Round to 4 decimal places for display.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Report lines for a finished test.
pub fn report_lines(name: &str, result: &TestResult) -> [String; 3] {
    [
        name.to_string(),
        format!("T-Statistic        : {:?}", round4(result.statistic)),
        format!("P-value            : {:?}", round4(result.p_value)),
    ]
}

/// Run [`compare`] and write a titled report of the result to `sink`.
pub fn stat_test(
    a: &[f64],
    b: &[f64],
    name: &str,
    kind: TestKind,
    sink: &mut ReportSink,
) -> Result<TestResult, StatsError> {
    let result = compare(a, b, kind)?;

    if sink.is_suppressed() {
        debug!("Report for '{}' suppressed", name);
    }
    for line in report_lines(name, &result) {
        if let Err(e) = sink.line(&line) {
            warn!("Failed to write test report: {}", e);
            break;
        }
    }

    Ok(result)
}
