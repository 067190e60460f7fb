//! Verdicts and reports for the entity-expansion matrix
//!
//! Takes the [`CellResult`](xml_bomb_harness::CellResult)s produced by the
//! runner, classifies each one and renders the result as text, markdown or
//! JSON.

pub mod report;
pub mod verdict;

pub use report::{MatrixReport, MatrixSummary, ReportEntry};
pub use verdict::{classify, Classifier, Verdict};
