//! Greedy chunk planning under a token budget.

use std::cmp::Reverse;

use tracing::warn;

use super::types::{Chunk, FileTokenAnalysis};

/// Partition files into chunks of at most `budget` tokens.
///
/// Files are visited largest first; ties keep their input order. Each file
/// goes into the most recently opened chunk when it fits, otherwise it opens
/// a new one. A file larger than `budget` gets a chunk of its own marked
/// `oversized`, and the file after it starts a fresh chunk. No file is ever
/// dropped or split.
///
/// This is first-fit-decreasing against the last bin only: linear and
/// deterministic, but not guaranteed to find the minimal chunk count.
pub fn plan_chunks(files: &[FileTokenAnalysis], budget: usize) -> Vec<Chunk> {
    let mut ordered: Vec<&FileTokenAnalysis> = files.iter().collect();
    // sort_by_key is stable, which keeps equal counts in input order
    ordered.sort_by_key(|f| Reverse(f.token_count));

    let mut chunks: Vec<Chunk> = Vec::new();

    for file in ordered {
        if file.token_count > budget {
            warn!(
                file = %file.relative_path,
                tokens = file.token_count,
                budget,
                "File exceeds the context budget on its own, placing it in an oversized chunk"
            );
            chunks.push(Chunk {
                files: vec![file.file_ref()],
                estimated_token_count: file.token_count,
                oversized: true,
            });
            continue;
        }

        match chunks.last_mut() {
            Some(last)
                if !last.oversized && last.estimated_token_count + file.token_count <= budget =>
            {
                last.push(file.file_ref());
            }
            _ => {
                let mut chunk = Chunk::default();
                chunk.push(file.file_ref());
                chunks.push(chunk);
            }
        }
    }

    chunks
}
