//! Test matrix runner
//!
//! Variants are the outer loop and tiers the inner one. Every requested
//! (variant, tier) pair gets exactly one [`CellResult`], in that canonical
//! order, whatever happened inside the cell.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use crate::executor::{CellExecutor, InlineExecutor};
use crate::outcome::{CellResult, Outcome};
use crate::payload::{Generator, Payload, SeverityTier};
use crate::variant::ParserVariant;

/// Runs a matrix of cells through one executor
pub struct MatrixRunner<'e> {
    executor: &'e dyn CellExecutor,
    generator: Generator,
    jobs: usize,
}

impl<'e> MatrixRunner<'e> {
    pub fn new(executor: &'e dyn CellExecutor) -> Self {
        Self {
            executor,
            generator: Generator::default(),
            jobs: 1,
        }
    }

    pub fn with_generator(mut self, generator: Generator) -> Self {
        self.generator = generator;
        self
    }

    /// Number of cells run at the same time. Values below 1 are treated as 1.
    ///
    /// Only meaningful with an executor that isolates cells from each other.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Run every variant against every tier.
    ///
    /// Returns `variants.len() * tiers.len()` results, variant-major.
    pub fn run(&self, variants: &[ParserVariant], tiers: &[SeverityTier]) -> Vec<CellResult> {
        let payloads: Vec<Payload> = tiers
            .iter()
            .map(|&tier| self.generator.generate(tier))
            .collect();
        let cells: Vec<(usize, usize)> = (0..variants.len())
            .flat_map(|v| (0..tiers.len()).map(move |t| (v, t)))
            .collect();

        tracing::info!(
            variants = variants.len(),
            tiers = tiers.len(),
            jobs = self.jobs,
            "running matrix"
        );

        if self.jobs == 1 || cells.len() < 2 {
            return cells
                .iter()
                .map(|&(v, t)| self.run_cell(&variants[v], &payloads[t]))
                .collect();
        }

        let next = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel();
        thread::scope(|scope| {
            for _ in 0..self.jobs.min(cells.len()) {
                let tx = tx.clone();
                let next = &next;
                let cells = &cells;
                let payloads = &payloads;
                scope.spawn(move || loop {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    let Some(&(v, t)) = cells.get(index) else {
                        break;
                    };
                    let result = self.run_cell(&variants[v], &payloads[t]);
                    if tx.send((index, result)).is_err() {
                        break;
                    }
                });
            }
        });
        drop(tx);

        let mut finished: Vec<(usize, CellResult)> = rx.into_iter().collect();
        finished.sort_by_key(|(index, _)| *index);
        finished.into_iter().map(|(_, result)| result).collect()
    }

    fn run_cell(&self, variant: &ParserVariant, payload: &Payload) -> CellResult {
        tracing::info!(variant = variant.name(), tier = %payload.tier(), "cell started");
        let start = Instant::now();
        let outcome = self.executor.execute(variant, payload);
        let duration = start.elapsed();

        match &outcome {
            Outcome::Completed { produced_length } => tracing::info!(
                variant = variant.name(),
                tier = %payload.tier(),
                produced_length,
                elapsed_ms = duration.as_millis() as u64,
                "cell completed"
            ),
            Outcome::Failed { kind, message } => tracing::info!(
                variant = variant.name(),
                tier = %payload.tier(),
                %kind,
                message = message.as_str(),
                elapsed_ms = duration.as_millis() as u64,
                "cell failed"
            ),
            Outcome::TimedOut { budget_ms } => tracing::warn!(
                variant = variant.name(),
                tier = %payload.tier(),
                budget_ms,
                "cell timed out"
            ),
        }

        CellResult {
            variant: variant.name().to_string(),
            backend: variant.backend_name().to_string(),
            config: *variant.config(),
            tier: payload.tier(),
            outcome,
            duration,
        }
    }
}

/// Run the matrix sequentially on the current thread with the default
/// payload generator and no budget
pub fn run(variants: &[ParserVariant], tiers: &[SeverityTier]) -> Vec<CellResult> {
    MatrixRunner::new(&InlineExecutor).run(variants, tiers)
}
