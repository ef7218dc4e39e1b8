// Dataset files written by topic runs

use chrono::NaiveDateTime;
use harvest_scanner::CrawlRecord;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const README_FILENAME: &str = "DATASET_README.txt";

/// One dataset file produced for one topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetEntry {
    pub category: String,
    pub subcategory: String,
    pub topic: String,
    pub file_name: String,
}

/// `{category}_{subcategory}_{topic}_{index}.json` with spaces as underscores.
///
/// Path separators and other characters that are not portable in file names
/// also become underscores, so the result is always a single path component.
pub fn format_filename(category: &str, subcategory: &str, topic: &str, index: usize) -> String {
    format!("{}_{}_{}_{}.json", category, subcategory, topic, index)
        .chars()
        .map(|c| {
            if c.is_whitespace() || c.is_control() || UNSAFE_FILENAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect()
}

const UNSAFE_FILENAME_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Write `records` as a pretty-printed JSON array.
pub fn write_dataset(dir: &Path, file_name: &str, records: &[CrawlRecord]) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    let json = serde_json::to_string_pretty(records)?;
    fs::write(&path, json)?;
    Ok(path)
}

/// Total size in MB and number of files in `dir` ending with `extension`.
pub fn dataset_totals(dir: &Path, extension: &str) -> io::Result<(f64, usize)> {
    let mut total_bytes = 0u64;
    let mut count = 0;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if metadata.is_file() && entry.file_name().to_string_lossy().ends_with(extension) {
            total_bytes += metadata.len();
            count += 1;
        }
    }

    Ok((total_bytes as f64 / (1024.0 * 1024.0), count))
}

pub fn render_readme(
    entries: &[DatasetEntry],
    total_mb: f64,
    file_count: usize,
    depth_levels: usize,
    generated_at: NaiveDateTime,
) -> String {
    let rule = "=".repeat(60);
    let mut readme = String::new();

    readme.push_str("Harvest - Structured Wikipedia Dataset\n");
    readme.push_str(&format!("{}\n", rule));
    readme.push_str(&format!("Total JSON Datasets: {} files\n", file_count));
    readme.push_str(&format!("Total Data Size: {:.2} MB\n", total_mb));
    readme.push_str(&format!("{}\n\n", rule));

    readme.push_str("This dataset includes structured information extracted from Wikipedia,\n");
    readme.push_str(&format!(
        "following a branching strategy of {} levels deep.\n\n",
        depth_levels
    ));

    readme.push_str("Dataset Categories:\n");
    for entry in entries {
        readme.push_str(&format!(
            "- {} > {} > {} ({})\n",
            entry.category, entry.subcategory, entry.topic, entry.file_name
        ));
    }

    readme.push_str(&format!(
        "\nGenerated By: Harvest - {}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    readme
}

/// Write `DATASET_README.txt` describing every `.json` file in `dir`.
pub fn write_dataset_readme(
    dir: &Path,
    entries: &[DatasetEntry],
    depth_levels: usize,
    generated_at: NaiveDateTime,
) -> io::Result<PathBuf> {
    let (total_mb, file_count) = dataset_totals(dir, ".json")?;
    let readme = render_readme(entries, total_mb, file_count, depth_levels, generated_at);
    let path = dir.join(README_FILENAME);
    fs::write(&path, readme)?;
    Ok(path)
}
