//! Verdict classification
//!
//! | Outcome | Verdict |
//! |---|---|
//! | `Completed`, length reaches the full expansion | `Vulnerable` |
//! | `Completed`, length below one level of expansion | `Protected` |
//! | `Completed`, anything in between | `Inconclusive` |
//! | `Failed(EntityExpansionRejected)` | `Protected` |
//! | `Failed(ExternalEntityDisallowed)` | `Protected` |
//! | any other `Failed` | `Inconclusive` |
//! | `TimedOut` | `Vulnerable` |
//!
//! A timeout is a runaway expansion: the backend was still producing text
//! when the budget ran out.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use xml_bomb_harness::{CellResult, Generator, Outcome, SeverityTier};
use xml_parser_traits::ErrorKind;

/// Safety posture of one variant against one tier
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
pub enum Verdict {
    Vulnerable,
    Protected,
    Inconclusive,
}

/// Classifies cells against the sizes predicted by a payload generator.
///
/// The generator must be the one the cells were run with.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    generator: Generator,
}

impl Classifier {
    pub fn new(generator: Generator) -> Self {
        Self { generator }
    }

    pub fn classify(&self, cell: &CellResult) -> Verdict {
        self.verdict(cell.tier, &cell.outcome)
    }

    /// Verdict for `outcome` observed on the payload for `tier`
    pub fn verdict(&self, tier: SeverityTier, outcome: &Outcome) -> Verdict {
        match outcome {
            Outcome::Completed { produced_length } => {
                if *produced_length >= self.generator.expanded_len(tier) {
                    Verdict::Vulnerable
                } else if *produced_length < self.suppressed_max() {
                    Verdict::Protected
                } else {
                    Verdict::Inconclusive
                }
            }
            Outcome::Failed { kind, .. } => match kind {
                ErrorKind::EntityExpansionRejected | ErrorKind::ExternalEntityDisallowed => {
                    Verdict::Protected
                }
                ErrorKind::MalformedDocument | ErrorKind::ResourceExhausted | ErrorKind::Unknown => {
                    Verdict::Inconclusive
                }
            },
            Outcome::TimedOut { .. } => Verdict::Vulnerable,
        }
    }

    /// Text produced by a single expanded chain entity. Anything shorter
    /// means the chain was never expanded.
    fn suppressed_max(&self) -> u64 {
        (self.generator.base_token().len() as u64)
            .saturating_mul(self.generator.fan_out() as u64)
    }
}

/// Classify `cell` against the default payload generator
pub fn classify(cell: &CellResult) -> Verdict {
    Classifier::default().classify(cell)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(tier: SeverityTier, outcome: Outcome) -> Verdict {
        Classifier::default().verdict(tier, &outcome)
    }

    #[test]
    fn full_expansion_is_vulnerable() {
        assert_eq!(
            verdict(SeverityTier::Small, Outcome::completed(4_000)),
            Verdict::Vulnerable
        );
        assert_eq!(
            verdict(SeverityTier::Large, Outcome::completed(4_000_000_000)),
            Verdict::Vulnerable
        );
    }

    #[test]
    fn suppressed_expansion_is_protected() {
        for tier in SeverityTier::ALL {
            assert_eq!(verdict(tier, Outcome::completed(0)), Verdict::Protected);
            assert_eq!(verdict(tier, Outcome::completed(39)), Verdict::Protected);
        }
    }

    #[test]
    fn partial_expansion_is_inconclusive() {
        assert_eq!(
            verdict(SeverityTier::Medium, Outcome::completed(4_000)),
            Verdict::Inconclusive
        );
        assert_eq!(
            verdict(SeverityTier::Small, Outcome::completed(40)),
            Verdict::Inconclusive
        );
    }

    #[test]
    fn policy_rejections_are_protected() {
        for kind in [
            ErrorKind::EntityExpansionRejected,
            ErrorKind::ExternalEntityDisallowed,
        ] {
            assert_eq!(
                verdict(SeverityTier::Large, Outcome::failed(kind, "no")),
                Verdict::Protected
            );
        }
    }

    #[test]
    fn other_failures_are_inconclusive() {
        for kind in [
            ErrorKind::MalformedDocument,
            ErrorKind::ResourceExhausted,
            ErrorKind::Unknown,
        ] {
            assert_eq!(
                verdict(SeverityTier::Small, Outcome::failed(kind, "x")),
                Verdict::Inconclusive
            );
        }
    }

    #[test]
    fn timeout_is_vulnerable() {
        assert_eq!(
            verdict(
                SeverityTier::Large,
                Outcome::timed_out(std::time::Duration::from_secs(1))
            ),
            Verdict::Vulnerable
        );
    }

    #[test]
    fn custom_generator_thresholds() {
        let classifier = Classifier::new(Generator::new().with_fan_out(2).with_base_token("ha"));
        assert_eq!(
            classifier.verdict(SeverityTier::Small, &Outcome::completed(16)),
            Verdict::Vulnerable
        );
        assert_eq!(
            classifier.verdict(SeverityTier::Small, &Outcome::completed(3)),
            Verdict::Protected
        );
    }
}
