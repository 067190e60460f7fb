//! Per-cell outcomes

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use xml_parser_traits::{Error, ErrorKind, ParserConfig};

use crate::payload::SeverityTier;

/// Result of applying one parser variant to one payload.
///
/// This is also the wire format between the runner and an isolated worker
/// process, hence the serde tagging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Parse and traversal finished; total text length produced
    Completed { produced_length: u64 },
    /// The backend raised an error
    Failed { kind: ErrorKind, message: String },
    /// The caller's budget ran out first
    TimedOut { budget_ms: u64 },
}

impl Outcome {
    pub fn completed(produced_length: u64) -> Self {
        Outcome::Completed { produced_length }
    }

    pub fn failed<S: Into<String>>(kind: ErrorKind, message: S) -> Self {
        Outcome::Failed {
            kind,
            message: message.into(),
        }
    }

    pub fn timed_out(budget: Duration) -> Self {
        Outcome::TimedOut {
            budget_ms: budget.as_millis() as u64,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }

    pub fn is_timed_out(&self) -> bool {
        matches!(self, Outcome::TimedOut { .. })
    }

    pub fn produced_length(&self) -> Option<u64> {
        match self {
            Outcome::Completed { produced_length } => Some(*produced_length),
            _ => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Outcome::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl From<&Error> for Outcome {
    fn from(err: &Error) -> Self {
        Outcome::failed(err.kind(), err.message())
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Completed { produced_length } => {
                write!(f, "Completed: length={produced_length}")
            }
            Outcome::Failed { kind, message } => write!(f, "Failed: {kind}: {message}"),
            Outcome::TimedOut { .. } => write!(f, "TimedOut"),
        }
    }
}

/// One recorded cell of the matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellResult {
    pub variant: String,
    pub backend: String,
    pub config: ParserConfig,
    pub tier: SeverityTier,
    pub outcome: Outcome,
    /// Wall-clock time of the attempt, for reporting only
    pub duration: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_report_lines() {
        assert_eq!(Outcome::completed(4000).to_string(), "Completed: length=4000");
        assert_eq!(
            Outcome::failed(ErrorKind::EntityExpansionRejected, "too deep").to_string(),
            "Failed: EntityExpansionRejected: too deep"
        );
        assert_eq!(
            Outcome::timed_out(Duration::from_secs(2)).to_string(),
            "TimedOut"
        );
    }

    #[test]
    fn from_error_keeps_kind_and_message() {
        let outcome = Outcome::from(&Error::resource_exhausted("no memory"));
        assert_eq!(
            outcome,
            Outcome::failed(ErrorKind::ResourceExhausted, "no memory")
        );
        assert_eq!(outcome.error_kind(), Some(ErrorKind::ResourceExhausted));
        assert!(outcome.is_failed());
        assert_eq!(outcome.produced_length(), None);
    }

    #[test]
    fn json_wire_format() {
        let json = serde_json::to_string(&Outcome::completed(12)).unwrap();
        assert_eq!(json, r#"{"status":"completed","produced_length":12}"#);

        let failed: Outcome = serde_json::from_str(
            r#"{"status":"failed","kind":"MalformedDocument","message":"bad"}"#,
        )
        .unwrap();
        assert_eq!(failed, Outcome::failed(ErrorKind::MalformedDocument, "bad"));

        let timed_out: Outcome =
            serde_json::from_str(r#"{"status":"timed_out","budget_ms":500}"#).unwrap();
        assert!(timed_out.is_timed_out());
    }
}
