//! Token analysis and pass planning — `revpass analyze`.

use anyhow::{Context, Result};
use console::style;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use revpass::analysis::{AggregateAnalysis, FileInput};
use revpass::config::RevpassConfig;

use crate::Cli;

/// Bytes inspected when deciding whether a file is binary.
const BINARY_SNIFF_LEN: usize = 8000;

pub fn cmd_analyze(cli: &Cli, project_dir: &Path, paths: &[PathBuf], json: bool) -> Result<()> {
    let config = RevpassConfig::with_cli_args(
        project_dir.to_path_buf(),
        cli.model.clone(),
        cli.review_type.clone(),
        cli.overhead_factor,
    )?;
    for warning in config.validate() {
        warn!("{}", warning);
    }

    let roots: Vec<PathBuf> = if paths.is_empty() {
        vec![project_dir.to_path_buf()]
    } else {
        paths.to_vec()
    };
    let files = collect_files(project_dir, &roots)?;
    debug!(count = files.len(), "Collected files for analysis");

    let analysis = config
        .analyzer()
        .analyze_files(&files, &config.analysis_options());

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print_analysis(&analysis, config.review_type());
    }

    Ok(())
}

/// Walk `roots` and read every text file below them.
///
/// Hidden directories and files are skipped while walking, though a hidden
/// path named explicitly is still read. Binary files are always skipped.
/// A file reachable from several roots is read once, at its first sighting.
pub fn collect_files(project_dir: &Path, roots: &[PathBuf]) -> Result<Vec<FileInput>> {
    let mut files = Vec::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();

    for root in roots {
        let root = if root.is_absolute() {
            root.clone()
        } else {
            project_dir.join(root)
        };
        if !root.exists() {
            anyhow::bail!("Path not found: {}", root.display());
        }

        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let canonical = path
                .canonicalize()
                .with_context(|| format!("Failed to resolve path: {}", path.display()))?;
            if !seen.insert(canonical) {
                debug!(path = %path.display(), "Skipping file already collected");
                continue;
            }

            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read file: {}", path.display()))?;

            let Some(content) = decode_text(bytes) else {
                debug!(path = %path.display(), "Skipping binary file");
                continue;
            };

            let relative = path
                .strip_prefix(project_dir)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/");
            files.push(FileInput::new(path.display().to_string(), relative, content));
        }
    }

    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

fn decode_text(bytes: Vec<u8>) -> Option<String> {
    let sniff = &bytes[..bytes.len().min(BINARY_SNIFF_LEN)];
    if sniff.contains(&0) {
        return None;
    }
    String::from_utf8(bytes).ok()
}

fn print_analysis(analysis: &AggregateAnalysis, review_type: &str) {
    println!();
    println!(
        "{} {} review with {} ({})",
        style("Token analysis:").bold(),
        review_type,
        style(&analysis.model_name).cyan(),
        analysis.tokenizer_name
    );
    println!(
        "  {} files, {} bytes, {} tokens",
        analysis.file_count, analysis.total_size_in_bytes, analysis.total_tokens
    );
    println!(
        "  Budget: {} tokens ({} context window, {:.0}% reserved)",
        analysis.effective_budget,
        analysis.context_window,
        analysis.overhead_factor * 100.0
    );
    println!(
        "  Utilization: {:.1}%",
        analysis.context_utilization * 100.0
    );
    println!();

    let recommendation = &analysis.chunking_recommendation;
    if recommendation.chunking_recommended {
        println!(
            "{} {} passes needed",
            style("Chunking recommended:").yellow().bold(),
            analysis.estimated_passes_needed
        );
    } else {
        println!("{}", style("Single pass is enough").green().bold());
    }
    println!("  {}", style(&recommendation.reason).dim());
    println!();

    if !recommendation.chunking_recommended {
        return;
    }

    for (i, chunk) in recommendation.recommended_chunks.iter().enumerate() {
        let marker = if chunk.oversized {
            format!(" {}", style("OVERSIZED").red().bold())
        } else {
            String::new()
        };
        println!(
            "Pass {}: {} files, {} tokens{}",
            i + 1,
            chunk.file_count(),
            chunk.estimated_token_count,
            marker
        );
        for file in &chunk.files {
            println!("  {:>8}  {}", file.token_count, file.relative_path);
        }
    }
    println!();

    if !analysis.is_feasible() {
        println!(
            "{} {} file(s) exceed the budget on their own and will need to be split or truncated",
            style("⚠").yellow(),
            analysis.oversized_chunks().len()
        );
        println!();
    }
}
