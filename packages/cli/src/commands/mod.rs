pub mod init;
pub mod render;
pub mod replay;
pub mod resolve;

pub use init::{init, InitArgs};
pub use render::{render, RenderArgs};
pub use replay::{replay, ReplayArgs};
pub use resolve::{resolve, ResolveArgs};

use anyhow::{Context, Result};
use carbon_editor::{Editor, EditorConfig};
use std::fs;
use std::path::Path;

/// Load a document JSON model into an editor configured from `cwd`
pub(crate) fn load_editor(path: &Path, cwd: &str) -> Result<Editor> {
    let config = EditorConfig::load(cwd)?;
    let content =
        fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let model: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;
    Ok(Editor::from_json_model(&model, &config)?)
}

/// Write to `output` when given, otherwise print to stdout
pub(crate) fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("Cannot write {}", path.display()))?;
        }
        None => println!("{content}"),
    }
    Ok(())
}
