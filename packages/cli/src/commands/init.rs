use anyhow::Result;
use carbon_editor::{EditorConfig, DEFAULT_CONFIG_NAME};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Maximum undo levels (0 = unlimited)
    #[arg(long, default_value_t = 100)]
    pub max_undo_levels: usize,

    /// Seed for generated component names
    #[arg(long)]
    pub id_seed: Option<String>,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let config = EditorConfig {
        max_undo_levels: args.max_undo_levels,
        id_seed: args.id_seed,
        ..EditorConfig::default()
    };

    fs::write(&config_path, config.to_json_string()?)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("Next steps:");
    println!("  1. Add classDefaults to {}", DEFAULT_CONFIG_NAME);
    println!("  2. Run: carbon replay document.json operations.json");

    Ok(())
}
