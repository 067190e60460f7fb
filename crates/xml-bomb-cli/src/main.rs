//! xml-bomb
//!
//! Runs "billion laughs" payloads of increasing severity against a catalog of
//! Rust XML parser presets and reports which ones expand them unboundedly.
//!
//! # Usage
//!
//! ```bash
//! xml-bomb                                   # whole matrix, one process per cell
//! xml-bomb run --tier small --tier medium --format markdown
//! xml-bomb run --variant "quick-xml streaming / dtd-parse" --isolation thread
//! xml-bomb list
//! xml-bomb payload --tier large --unreferenced
//! ```

use std::io::Read;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use xml_bomb_harness::{
    attempt, attempt_document, generate, generate_unreferenced, CellExecutor, InlineExecutor,
    MatrixRunner, ParserVariant, ProcessExecutor, SeverityTier, ThreadExecutor,
};
use xml_bomb_matrix::MatrixReport;

mod catalog;
mod output;

use output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "xml-bomb")]
#[command(version)]
#[command(about = "Entity-expansion (billion laughs) tester for Rust XML parsers", long_about = None)]
struct Cli {
    #[command(flatten)]
    run: RunArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Severity tier to run; repeat for several (default: all)
    #[arg(long = "tier", value_name = "TIER")]
    tiers: Vec<SeverityTier>,

    /// Catalog variant to run, by name; repeat for several (default: all)
    #[arg(long = "variant", value_name = "NAME")]
    variants: Vec<String>,

    /// Where each cell runs
    #[arg(long, value_enum, env = "XML_BOMB_ISOLATION", default_value_t = Isolation::Process)]
    isolation: Isolation,

    /// Per-cell budget in seconds; 0 disables it
    #[arg(long, env = "XML_BOMB_TIMEOUT_SECS", default_value_t = 60)]
    timeout_secs: u64,

    /// Cells run at the same time
    #[arg(long, env = "XML_BOMB_JOBS", default_value_t = 1)]
    jobs: usize,

    /// Report format
    #[arg(long, short, value_enum, env = "XML_BOMB_FORMAT", default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the matrix and print the report (the default)
    Run(RunArgs),
    /// List the variant catalog
    List,
    /// Print a generated payload
    Payload {
        #[arg(long)]
        tier: SeverityTier,
        /// Print only the open declaration text used to build the next tier
        #[arg(long)]
        unreferenced: bool,
    },
    /// Run a single cell and print its outcome as JSON.
    ///
    /// The document is read from stdin; with empty stdin the default payload
    /// for `--tier` is used.
    #[command(hide = true)]
    Cell {
        #[arg(long)]
        variant: String,
        #[arg(long)]
        tier: SeverityTier,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Isolation {
    /// On the main thread, no budget
    Inline,
    /// One thread per cell; a timed-out thread is abandoned, not stopped
    Thread,
    /// One child process per cell, killed past the budget
    Process,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        None => run(&cli.run),
        Some(Commands::Run(args)) => run(&args),
        Some(Commands::List) => list(),
        Some(Commands::Payload { tier, unreferenced }) => {
            if unreferenced {
                println!("{}", generate_unreferenced(tier));
            } else {
                println!("{}", generate(tier).as_str());
            }
            Ok(())
        }
        Some(Commands::Cell { variant, tier }) => cell(&variant, tier),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &RunArgs) -> Result<()> {
    let variants = select_variants(&args.variants)?;
    let tiers = if args.tiers.is_empty() {
        SeverityTier::ALL.to_vec()
    } else {
        args.tiers.clone()
    };
    let budget = (args.timeout_secs > 0).then(|| Duration::from_secs(args.timeout_secs));

    let executor: Box<dyn CellExecutor> = match args.isolation {
        Isolation::Inline => {
            if budget.is_some() {
                tracing::warn!("inline isolation ignores the per-cell budget");
            }
            Box::new(InlineExecutor)
        }
        Isolation::Thread => Box::new(ThreadExecutor::new(budget)),
        Isolation::Process => {
            let program =
                std::env::current_exe().context("Failed to locate the xml-bomb executable")?;
            Box::new(
                ProcessExecutor::new(program)
                    .with_args(["cell"])
                    .with_budget(budget),
            )
        }
    };
    if args.jobs > 1 && args.isolation != Isolation::Process {
        tracing::warn!(
            jobs = args.jobs,
            "parallel cells share one process; resource use is not attributable per cell"
        );
    }

    let results = MatrixRunner::new(executor.as_ref())
        .with_jobs(args.jobs)
        .run(&variants, &tiers);
    let report = MatrixReport::new(&results);
    print!("{}", args.format.render(&report));
    if args.format == OutputFormat::Json {
        println!();
    }
    Ok(())
}

fn select_variants(names: &[String]) -> Result<Vec<ParserVariant>> {
    let all = catalog::catalog().context("Failed to build the variant catalog")?;
    if names.is_empty() {
        return Ok(all);
    }

    let mut selected = Vec::with_capacity(names.len());
    for name in names {
        match all.iter().find(|variant| variant.name() == name) {
            Some(variant) => selected.push(variant.clone()),
            None => bail!(
                "Unknown variant '{}'; run `xml-bomb list` for the catalog",
                name
            ),
        }
    }
    Ok(selected)
}

fn list() -> Result<()> {
    for variant in catalog::catalog().context("Failed to build the variant catalog")? {
        println!("{}", variant.name());
        println!("    backend={} {}", variant.backend_name(), variant.config());
    }
    Ok(())
}

fn cell(name: &str, tier: SeverityTier) -> Result<()> {
    let variant = catalog::find(name)
        .context("Failed to build the variant catalog")?
        .with_context(|| format!("Unknown variant '{name}'"))?;

    let mut document = Vec::new();
    std::io::stdin()
        .read_to_end(&mut document)
        .context("Failed to read the payload from stdin")?;
    let outcome = if document.is_empty() {
        attempt(&variant, &generate(tier))
    } else {
        attempt_document(&variant, &document)
    };
    println!(
        "{}",
        serde_json::to_string(&outcome).context("Failed to encode the outcome")?
    );
    Ok(())
}
