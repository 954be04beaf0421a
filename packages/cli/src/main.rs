mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{init, render, replay, resolve, InitArgs, RenderArgs, ReplayArgs, ResolveArgs};

/// Carbon CLI - replay, resolve and render block editor documents
#[derive(Parser, Debug)]
#[command(name = "carbon")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default carbon.config.json
    Init(InitArgs),

    /// Apply an operation log to a document
    Replay(ReplayArgs),

    /// Resolve pasted input to a component
    Resolve(ResolveArgs),

    /// Render a document to HTML
    Render(RenderArgs),
}

fn main() {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| {
            let cwd = cwd.display().to_string();
            match cli.command {
                Command::Init(args) => init(args, &cwd),
                Command::Replay(args) => replay(args, &cwd),
                Command::Resolve(args) => resolve(args, &cwd),
                Command::Render(args) => render(args, &cwd),
            }
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
