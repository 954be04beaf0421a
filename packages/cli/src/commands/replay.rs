use super::{emit, load_editor};
use anyhow::{Context, Result};
use carbon_editor::Operation;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Document JSON model
    pub document: PathBuf,

    /// JSON array of operations to execute in order
    pub operations: PathBuf,

    /// Undo this many operations after replaying
    #[arg(long, default_value_t = 0)]
    pub undo: usize,

    /// Write the resulting document here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn replay(args: ReplayArgs, cwd: &str) -> Result<()> {
    let mut editor = load_editor(&args.document, cwd)?;

    let content = fs::read_to_string(&args.operations)
        .with_context(|| format!("Cannot read {}", args.operations.display()))?;
    let operations: Vec<Operation> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid operation log {}", args.operations.display()))?;

    let total = operations.len();
    for (index, operation) in operations.into_iter().enumerate() {
        editor
            .execute(operation)
            .with_context(|| format!("Operation {} of {} failed", index + 1, total))?;
    }
    info!(operations = total, "Replayed operation log");

    let mut undone = 0;
    while undone < args.undo && editor.undo()? {
        undone += 1;
    }

    let model = serde_json::to_string_pretty(&editor.to_json_model())?;
    emit(&model, args.output.as_deref())?;

    eprintln!(
        "{} Replayed {} operations, undid {}",
        "✓".green(),
        total,
        undone
    );
    Ok(())
}
