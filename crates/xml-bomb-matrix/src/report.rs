//! Matrix report generation
//!
//! One entry per cell, in the order the runner returned them.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use xml_bomb_harness::{CellResult, Outcome, SeverityTier};
use xml_parser_traits::{DocumentModel, DtdProcessing, ExternalEntityResolution};

use crate::verdict::{Classifier, Verdict};

/// Name printed in report banners
pub const TOOL_NAME: &str = "xml-bomb";

/// Verdict counts across a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixSummary {
    pub total: usize,
    pub vulnerable: usize,
    pub protected: usize,
    pub inconclusive: usize,
    pub timed_out: usize,
}

impl MatrixSummary {
    pub fn from_entries(entries: &[ReportEntry]) -> Self {
        let count = |verdict: Verdict| entries.iter().filter(|e| e.verdict == verdict).count();
        Self {
            total: entries.len(),
            vulnerable: count(Verdict::Vulnerable),
            protected: count(Verdict::Protected),
            inconclusive: count(Verdict::Inconclusive),
            timed_out: entries.iter().filter(|e| e.outcome.is_timed_out()).count(),
        }
    }
}

/// One classified cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub variant: String,
    pub backend: String,
    pub dtd_processing: DtdProcessing,
    pub external_entities: ExternalEntityResolution,
    pub document_model: DocumentModel,
    pub tier: SeverityTier,
    pub outcome: Outcome,
    pub verdict: Verdict,
    pub duration_ms: u64,
}

impl ReportEntry {
    pub fn new(cell: &CellResult, verdict: Verdict) -> Self {
        Self {
            variant: cell.variant.clone(),
            backend: cell.backend.clone(),
            dtd_processing: cell.config.dtd_processing,
            external_entities: cell.config.external_entities,
            document_model: cell.config.document_model,
            tier: cell.tier,
            outcome: cell.outcome.clone(),
            verdict,
            duration_ms: cell.duration.as_millis() as u64,
        }
    }

    /// The multi-line text block for this cell
    pub fn to_block(&self) -> String {
        let mut block = String::new();
        let _ = writeln!(block, "[{}]", self.variant);
        let _ = writeln!(block, "  backend:  {}", self.backend);
        let _ = writeln!(
            block,
            "  DTD processing: {}, external resolver: {}, model: {}",
            self.dtd_processing, self.external_entities, self.document_model
        );
        let _ = writeln!(block, "  tier:     {}", self.tier);
        let _ = writeln!(block, "  outcome:  {}", self.outcome);
        let _ = writeln!(block, "  verdict:  {}", self.verdict);
        block
    }

    /// Length or error summary used in one-line listings
    pub fn detail(&self) -> String {
        match &self.outcome {
            Outcome::Completed { produced_length } => format!("length={produced_length}"),
            Outcome::Failed { kind, message } => format!("{kind}: {message}"),
            Outcome::TimedOut { budget_ms } => format!("no result after {budget_ms} ms"),
        }
    }
}

/// Classified results of one matrix run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixReport {
    pub tool: String,
    pub timestamp: DateTime<Utc>,
    pub summary: MatrixSummary,
    pub entries: Vec<ReportEntry>,
}

impl MatrixReport {
    /// Classify `results` with the default payload generator
    pub fn new(results: &[CellResult]) -> Self {
        Self::with_classifier(results, &Classifier::default())
    }

    pub fn with_classifier(results: &[CellResult], classifier: &Classifier) -> Self {
        let entries: Vec<ReportEntry> = results
            .iter()
            .map(|cell| ReportEntry::new(cell, classifier.classify(cell)))
            .collect();
        Self {
            tool: TOOL_NAME.to_string(),
            timestamp: Utc::now(),
            summary: MatrixSummary::from_entries(&entries),
            entries,
        }
    }

    /// Line-oriented report: a block per cell, then one line per cell and
    /// the verdict counts
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "== {} entity expansion report ==", self.tool);
        let _ = writeln!(
            out,
            "Date: {}\n",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        );

        for entry in &self.entries {
            out.push_str(&entry.to_block());
            out.push('\n');
        }

        let width = self
            .entries
            .iter()
            .map(|e| e.variant.len())
            .max()
            .unwrap_or(0);
        let _ = writeln!(out, "== Verdicts ==");
        for entry in &self.entries {
            let _ = writeln!(
                out,
                "{:<width$}  {:<6}  {:<12}  {}",
                entry.variant,
                entry.tier.to_string(),
                entry.verdict.to_string(),
                entry.detail(),
            );
        }

        let _ = writeln!(
            out,
            "\n{} cells: {} vulnerable, {} protected, {} inconclusive ({} timed out)",
            self.summary.total,
            self.summary.vulnerable,
            self.summary.protected,
            self.summary.inconclusive,
            self.summary.timed_out
        );
        out
    }

    /// Generate a markdown report
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("# {} Entity Expansion Report\n\n", self.tool));
        md.push_str(&format!(
            "**Date:** {}\n\n",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        md.push_str("## Summary\n\n");
        md.push_str("| Verdict | Count |\n");
        md.push_str("|---------|-------|\n");
        md.push_str(&format!("| Total | {} |\n", self.summary.total));
        md.push_str(&format!("| Vulnerable | {} |\n", self.summary.vulnerable));
        md.push_str(&format!("| Protected | {} |\n", self.summary.protected));
        md.push_str(&format!("| Inconclusive | {} |\n", self.summary.inconclusive));
        md.push_str(&format!("| Timed out | {} |\n\n", self.summary.timed_out));

        md.push_str("## Cells\n\n");
        md.push_str("| Variant | DTD | Resolver | Model | Tier | Outcome | Verdict | ms |\n");
        md.push_str("|---------|-----|----------|-------|------|---------|---------|----|\n");
        for e in &self.entries {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | **{}** | {} |\n",
                escape_cell(&e.variant),
                e.dtd_processing,
                e.external_entities,
                e.document_model,
                e.tier,
                escape_cell(&e.outcome.to_string()),
                e.verdict,
                e.duration_ms
            ));
        }

        md
    }

    /// Generate a JSON report
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
