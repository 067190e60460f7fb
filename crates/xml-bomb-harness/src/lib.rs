//! Entity-expansion test harness.
//!
//! Generates "billion laughs" payloads for fixed severity tiers and runs
//! every parser variant against every tier, recording one [`Outcome`] per
//! cell. Cells never affect each other: a failing, panicking or runaway
//! backend only ever changes its own cell.
//!
//! ```rust,ignore
//! use xml_bomb_harness::{payload::SeverityTier, runner::MatrixRunner, InlineExecutor};
//!
//! let results = MatrixRunner::new(&InlineExecutor).run(&variants, &SeverityTier::ALL);
//! for cell in &results {
//!     println!("{} {} {}", cell.variant, cell.tier, cell.outcome);
//! }
//! ```

pub mod adapter;
pub mod executor;
pub mod outcome;
pub mod payload;
pub mod runner;
pub mod variant;

pub use adapter::{attempt, attempt_document};
pub use executor::{CellExecutor, InlineExecutor, ProcessExecutor, ThreadExecutor};
pub use outcome::{CellResult, Outcome};
pub use payload::{generate, generate_unreferenced, Generator, Payload, SeverityTier};
pub use runner::{run, MatrixRunner};
pub use variant::ParserVariant;
