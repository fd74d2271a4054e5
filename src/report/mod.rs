//! Report output.
//!
//! `sink` carries the suppressible test report lines; `generator` renders
//! the run summary as text or JSON.

pub mod generator;
pub mod sink;

pub use generator::{generate_json_report, generate_text_report};
pub use sink::ReportSink;
