use super::{emit, load_editor};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Document JSON model
    pub document: PathBuf,

    /// Write HTML here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn render(args: RenderArgs, cwd: &str) -> Result<()> {
    let editor = load_editor(&args.document, cwd)?;
    emit(&editor.render().to_html(), args.output.as_deref())
}
