//! Configuration view and validation commands — `revpass config`.

use anyhow::Result;
use std::path::Path;

use revpass::config::{CONFIG_PATHS, RevpassConfig, RevpassToml};

use crate::{Cli, ConfigCommands};

pub fn cmd_config(cli: &Cli, project_dir: &Path, command: Option<ConfigCommands>) -> Result<()> {
    let config_path = RevpassToml::locate(project_dir);

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Revpass Configuration");
            println!("=====================");
            println!();

            let toml = match &config_path {
                Some(path) => {
                    println!("Config file: {}", path.display());
                    RevpassToml::load(path)?
                }
                None => {
                    println!("No revpass.toml found in {}", project_dir.display());
                    println!("Using default configuration.");
                    RevpassToml::default()
                }
            };
            println!();

            println!("[defaults]");
            println!("  model = \"{}\"", toml.defaults.model);
            println!("  review_type = \"{}\"", toml.defaults.review_type);
            println!("  overhead_factor = {}", toml.defaults.overhead_factor);
            println!();

            if !toml.review_types.overrides.is_empty() {
                println!("[review_types.overrides]");
                for (pattern, override_cfg) in &toml.review_types.overrides {
                    println!("  \"{}\":", pattern);
                    if let Some(factor) = override_cfg.overhead_factor {
                        println!("    overhead_factor = {}", factor);
                    }
                }
                println!();
            }

            if !toml.models.is_empty() {
                println!("[[models]]");
                for model in &toml.models {
                    println!("  {} = {} tokens", model.name, model.context_window);
                }
                println!();
            }

            let config = RevpassConfig::with_cli_args(
                project_dir.to_path_buf(),
                cli.model.clone(),
                cli.review_type.clone(),
                cli.overhead_factor,
            )?;
            let options = config.analysis_options();
            let budget = config.analyzer().budget_for(&options);
            println!(
                "Effective budget for {} ({} review):",
                config.model(),
                config.review_type()
            );
            println!("  context_window = {}", budget.context_window);
            println!("  overhead_factor = {}", budget.overhead_factor);
            println!("  effective_budget = {}", budget.effective_budget);
            println!();

            if config_path.is_none() {
                println!("Run 'revpass config init' to create a revpass.toml file.");
                println!();
            }
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            let Some(path) = config_path else {
                println!("No revpass.toml found. Using defaults (valid).");
                return Ok(());
            };

            let warnings = RevpassToml::load(&path)?.validate();
            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if let Some(path) = config_path {
                println!("revpass.toml already exists at {}", path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            let path = project_dir.join(CONFIG_PATHS[0]);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            RevpassToml::default().save(&path)?;

            println!("Created revpass.toml at {}", path.display());
            println!();
            println!("You can now customize:");
            println!("  - [defaults] model, review_type, overhead_factor");
            println!("  - [review_types.overrides.\"pattern-*\"] for review-type specific overhead");
            println!("  - [[models]] name, context_window for models revpass does not know");
            println!();
        }
    }

    Ok(())
}
