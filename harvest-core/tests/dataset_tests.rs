// Tests for dataset files and the dataset README

use chrono::NaiveDate;
use harvest_core::dataset::{
    DatasetEntry, README_FILENAME, dataset_totals, format_filename, render_readme, write_dataset,
    write_dataset_readme,
};
use harvest_scanner::CrawlRecord;
use tempfile::tempdir;

fn record(title: &str, depth: usize) -> CrawlRecord {
    CrawlRecord::new(
        format!("https://en.wikipedia.org/wiki/{}", title),
        title.to_string(),
        format!("https://en.wikipedia.org/wiki/{}", title),
        format!("Summary of {}", title),
        depth,
    )
}

fn entry(topic: &str, file_name: &str) -> DatasetEntry {
    DatasetEntry {
        category: "Psychology".to_string(),
        subcategory: "Disorders".to_string(),
        topic: topic.to_string(),
        file_name: file_name.to_string(),
    }
}

// ============================================================================
// File names
// ============================================================================

#[test]
fn test_format_filename_replaces_spaces() {
    assert_eq!(
        format_filename("Mental Health", "Mood Disorders", "Bipolar disorder", 2),
        "Mental_Health_Mood_Disorders_Bipolar_disorder_2.json"
    );
}

#[test]
fn test_format_filename_plain() {
    assert_eq!(
        format_filename("Crypto", "Ciphers", "AES", 1),
        "Crypto_Ciphers_AES_1.json"
    );
}

#[test]
fn test_format_filename_strips_path_separators() {
    assert_eq!(
        format_filename("Net", "Proto", "TCP/IP", 1),
        "Net_Proto_TCP_IP_1.json"
    );
    assert_eq!(
        format_filename("Net", "Proto", r"..\Windows: a|b", 3),
        "Net_Proto_.._Windows__a_b_3.json"
    );

    let name = format_filename("A", "B", "../../etc/passwd", 1);
    assert_eq!(std::path::Path::new(&name).components().count(), 1);
}

#[test]
fn test_format_filename_keeps_punctuation() {
    assert_eq!(
        format_filename("Psychology", "Disorders", "Alzheimer's disease (AD)", 4),
        "Psychology_Disorders_Alzheimer's_disease_(AD)_4.json"
    );
}

// ============================================================================
// Dataset files
// ============================================================================

#[test]
fn test_write_dataset_pretty_json_array() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let records = vec![record("Anxiety", 0), record("Fear", 1)];

    let path = write_dataset(dir.path(), "Psychology_Disorders_Anxiety_1.json", &records)?;
    let content = std::fs::read_to_string(&path)?;

    assert!(content.starts_with("[\n"));
    let parsed: Vec<CrawlRecord> = serde_json::from_str(&content)?;
    assert_eq!(parsed, records);
    Ok(())
}

#[test]
fn test_write_empty_dataset() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = write_dataset(dir.path(), "empty.json", &[])?;
    assert_eq!(std::fs::read_to_string(path)?, "[]");
    Ok(())
}

#[test]
fn test_dataset_totals_counts_only_extension() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    std::fs::write(dir.path().join("a.json"), vec![b'x'; 1024 * 1024])?;
    std::fs::write(dir.path().join("b.json"), vec![b'x'; 1024 * 1024])?;
    std::fs::write(dir.path().join("notes.txt"), "ignored")?;
    std::fs::create_dir(dir.path().join("sub.json"))?;

    let (mb, count) = dataset_totals(dir.path(), ".json")?;
    assert_eq!(count, 2);
    assert!((mb - 2.0).abs() < f64::EPSILON);
    Ok(())
}

// ============================================================================
// README
// ============================================================================

#[test]
fn test_render_readme_lists_entries() {
    let generated_at = NaiveDate::from_ymd_opt(2025, 3, 14)
        .unwrap()
        .and_hms_opt(9, 26, 53)
        .unwrap();
    let entries = vec![
        entry("Anxiety disorder", "Psychology_Disorders_Anxiety_disorder_1.json"),
        entry("Bipolar disorder", "Psychology_Disorders_Bipolar_disorder_2.json"),
    ];

    let readme = render_readme(&entries, 1.5, 2, 4, generated_at);

    assert!(readme.contains("Total JSON Datasets: 2 files"));
    assert!(readme.contains("Total Data Size: 1.50 MB"));
    assert!(readme.contains("branching strategy of 4 levels deep"));
    assert!(readme.contains(
        "- Psychology > Disorders > Anxiety disorder (Psychology_Disorders_Anxiety_disorder_1.json)"
    ));
    assert!(readme.contains("Generated By: Harvest - 2025-03-14 09:26:53"));
}

#[test]
fn test_write_dataset_readme_counts_files_on_disk() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write_dataset(dir.path(), "one.json", &[record("A", 0)])?;
    write_dataset(dir.path(), "two.json", &[record("B", 0)])?;

    let generated_at = NaiveDate::from_ymd_opt(2025, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let path = write_dataset_readme(
        dir.path(),
        &[entry("A", "one.json"), entry("B", "two.json")],
        3,
        generated_at,
    )?;

    assert_eq!(path.file_name().unwrap(), README_FILENAME);
    let readme = std::fs::read_to_string(path)?;
    assert!(readme.contains("Total JSON Datasets: 2 files"));
    Ok(())
}
