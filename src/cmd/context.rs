//! Persisted review context commands — `revpass context`.

use anyhow::{Context, Result};
use std::path::Path;

use revpass::context::ReviewContext;

pub fn cmd_context_show(file: &Path, files: &[String]) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read review context: {}", file.display()))?;
    let ctx = ReviewContext::from_json_str(&text)
        .with_context(|| format!("Invalid review context: {}", file.display()))?;

    // Without an explicit list, prime for every file the review covers.
    let next_files: &[String] = if files.is_empty() { ctx.files() } else { files };

    print!("{}", ctx.generate_next_pass_context(next_files));
    Ok(())
}
