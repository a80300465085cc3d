//! slotexpr - evaluate a planned scalar expression over rows

use anyhow::{bail, Context, Result};
use clap::Parser as ClapParser;
use slotexpr::access::Tuple;
use slotexpr::expression::ExpressionInterpreter;
use slotexpr::planner::{resolve_slots, ChannelLayout, PlanDocument, SlotCollector};
use std::fs;
use std::path::{Path, PathBuf};

/// Evaluate a planned scalar expression over rows of JSON scalars
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Plan document with `slots` and `expression`
    #[arg(short, long)]
    plan: PathBuf,

    /// JSON array of rows, one scalar per declared slot
    #[arg(short, long)]
    rows: PathBuf,

    /// Treat the expression as a filter and print matching row indexes
    #[arg(short, long)]
    filter: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let plan = PlanDocument::load(&args.plan)?;
    let expression = resolve_slots(&plan.expression, &plan.symbols())
        .context("Failed to resolve names to slots")?;

    // Rows carry one channel per declared slot, in declaration order
    let layout = ChannelLayout::from_slots(plan.slots.iter().cloned());
    let referenced = SlotCollector::collect(&expression)?;
    for slot in &referenced {
        if layout.channel(slot).is_none() {
            bail!("Expression references undeclared slot {}", slot);
        }
    }
    log::info!(
        "Expression references {} of {} declared slots",
        referenced.len(),
        layout.len()
    );

    let rows = load_rows(&args.rows)?;
    let interpreter = ExpressionInterpreter::new(layout.mapping().clone());

    for (index, row) in rows.iter().enumerate() {
        let channels = Tuple::row_from_json(row, layout.slots())
            .with_context(|| format!("Invalid row {}", index))?;
        if args.filter {
            let matched = interpreter
                .evaluate_predicate(&expression, &channels)
                .with_context(|| format!("Failed to evaluate row {}", index))?;
            if matched {
                println!("{}", index);
            }
        } else {
            let value = interpreter
                .evaluate(&expression, &channels)
                .with_context(|| format!("Failed to evaluate row {}", index))?;
            println!("{}", value);
        }
    }

    log::debug!("Evaluated {} rows", rows.len());
    Ok(())
}

fn load_rows(path: &Path) -> Result<Vec<serde_json::Value>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read rows file {}", path.display()))?;
    serde_json::from_str(&json).context("Rows file must be a JSON array of rows")
}
