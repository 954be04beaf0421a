use anyhow::Result;
use carbon_editor::{ComponentFactory, EditorConfig, IdGenerator};
use clap::Args;
use colored::Colorize;

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Pasted text, e.g. a YouTube or image link
    pub input: String,
}

pub fn resolve(args: ResolveArgs, cwd: &str) -> Result<()> {
    let config = EditorConfig::load(cwd)?;

    let mut factory = ComponentFactory::with_defaults();
    for (class_name, defaults) in &config.class_defaults {
        factory.set_class_defaults(class_name.clone(), defaults.clone());
    }
    let mut ids = IdGenerator::new(config.id_seed.as_deref().unwrap_or("carbon-cli"));

    match factory.match_input(&args.input, &mut ids) {
        Some(component) => {
            println!("{} {}", "✓".green(), component.class_name().bright_white());
            println!("{}", serde_json::to_string_pretty(&component.json_model())?);
        }
        None => {
            println!(
                "{} No component matched, input would be typed as text",
                "⚠️".yellow()
            );
        }
    }

    Ok(())
}
