//! Model catalogue listing — `revpass models`.

use anyhow::Result;
use std::path::Path;

use revpass::config::RevpassToml;
use revpass::models::DEFAULT_CONTEXT_WINDOW;
use revpass::tokenizer::TokenizerRegistry;

pub fn cmd_models(project_dir: &Path) -> Result<()> {
    let toml = RevpassToml::load_or_default(project_dir)?;
    let registry = toml.model_registry();
    let tokenizers = TokenizerRegistry::with_defaults();

    println!();
    println!("{:<24} {:<12} {:>12}  Tokenizer", "Model", "Provider", "Context");
    println!("{}", "-".repeat(64));
    for model in registry.models() {
        println!(
            "{:<24} {:<12} {:>12}  {}",
            model.name,
            model.provider().to_string(),
            model.context_window,
            tokenizers.resolve(&model.name).model_name()
        );
    }
    println!();
    println!(
        "Unknown models use a {} token context window.",
        DEFAULT_CONTEXT_WINDOW
    );
    println!();
    Ok(())
}
