use harvest::handlers::*;
use harvest_scanner::{
    BatchOutcome, CrawlOutcome, CrawlRecord, Seed, SeedFailure, SeedKind, Throttle,
};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::{NamedTempFile, tempdir};

#[test]
fn test_parse_seed_line_uses_default_kind() {
    let result = parse_seed_line("Anxiety disorder", SeedKind::Title);
    assert_eq!(result, Some(Seed::Title("Anxiety disorder".to_string())));
}

#[test]
fn test_parse_seed_line_prefix_overrides_kind() {
    assert_eq!(
        parse_seed_line("search: panic attack", SeedKind::Title),
        Some(Seed::Search("panic attack".to_string()))
    );
    assert_eq!(
        parse_seed_line("url:https://example.com/page", SeedKind::Title),
        Some(Seed::Url("https://example.com/page".to_string()))
    );
}

#[test]
fn test_parse_seed_line_keeps_plain_urls() {
    let result = parse_seed_line("https://en.wikipedia.org/wiki/Cipher", SeedKind::Url);
    assert_eq!(
        result,
        Some(Seed::Url("https://en.wikipedia.org/wiki/Cipher".to_string()))
    );
}

#[test]
fn test_parse_seed_line_keeps_namespaced_titles() {
    let result = parse_seed_line("Category:Ciphers", SeedKind::Title);
    assert_eq!(result, Some(Seed::Title("Category:Ciphers".to_string())));
}

#[test]
fn test_parse_seed_line_blank() {
    assert_eq!(parse_seed_line("   ", SeedKind::Title), None);
}

#[test]
fn test_load_seeds_from_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut temp_file = NamedTempFile::new()?;
    writeln!(temp_file, "Encryption")?;
    writeln!(temp_file, "# comment")?;
    writeln!(temp_file)?; // Empty line
    writeln!(temp_file, "search:hash function")?;

    let path = PathBuf::from(temp_file.path());
    let seeds = load_seeds_from_file(&path, SeedKind::Title)?;

    assert_eq!(seeds.len(), 2);
    assert_eq!(seeds[0], Seed::Title("Encryption".to_string()));
    assert_eq!(seeds[1], Seed::Search("hash function".to_string()));

    Ok(())
}

#[test]
fn test_load_seeds_from_file_empty() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file).unwrap();
    writeln!(temp_file, "   ").unwrap();

    let path = PathBuf::from(temp_file.path());
    let result = load_seeds_from_file(&path, SeedKind::Title);

    assert!(result.is_err());
    assert!(result.unwrap_err().contains("No seeds found"));
}

#[test]
fn test_load_seeds_from_file_missing() {
    let result = load_seeds_from_file(&PathBuf::from("/no/such/seeds.txt"), SeedKind::Title);
    assert!(result.unwrap_err().contains("Failed to read seeds file"));
}

#[test]
fn test_load_seeds_from_source_args() {
    let seeds = vec!["Encryption".to_string(), "Cipher".to_string()];
    let result = load_seeds_from_source(&seeds, None, SeedKind::Search).unwrap();

    assert_eq!(
        result,
        vec![
            Seed::Search("Encryption".to_string()),
            Seed::Search("Cipher".to_string())
        ]
    );
}

#[test]
fn test_load_seeds_from_source_no_input() {
    let result = load_seeds_from_source(&[], None, SeedKind::Title);
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("--seed or --seeds-file"));
}

#[test]
fn test_load_seeds_from_source_prefers_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut temp_file = NamedTempFile::new()?;
    writeln!(temp_file, "From file")?;

    let path = PathBuf::from(temp_file.path());
    let result = load_seeds_from_source(&["Ignored".to_string()], Some(&path), SeedKind::Title)?;

    assert_eq!(result, vec![Seed::Title("From file".to_string())]);
    Ok(())
}

#[test]
fn test_expand_path_tilde() {
    let expanded = expand_path("~/harvest/out.jsonl");
    assert!(!expanded.to_string_lossy().starts_with('~'));
    assert!(expanded.ends_with("harvest/out.jsonl"));
}

#[test]
fn test_write_json_records() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("nested").join("records.json");
    let records = vec![CrawlRecord::new(
        "https://en.wikipedia.org/wiki/Cipher".to_string(),
        "Cipher".to_string(),
        "https://en.wikipedia.org/wiki/Cipher".to_string(),
        "An algorithm.".to_string(),
        0,
    )];

    write_json_records(&path, records.iter())?;

    let parsed: Vec<CrawlRecord> = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(parsed, records);
    Ok(())
}

#[test]
fn test_all_seeds_failed_is_error() {
    let mut batch = BatchOutcome::default();
    batch.failures.push(SeedFailure {
        seed: "title:".to_string(),
        error: "Invalid seed: seed is empty".to_string(),
    });
    assert!(ensure_some_seed_succeeded(&batch).is_err());

    batch.push(CrawlOutcome::new("title:Cipher".to_string()));
    assert!(ensure_some_seed_succeeded(&batch).is_ok());
}

#[test]
fn test_empty_batch_is_not_error() {
    assert!(ensure_some_seed_succeeded(&BatchOutcome::default()).is_ok());
}

#[test]
fn test_throttle_rejects_non_finite_delays() {
    let err = throttle_from_secs(f64::INFINITY, None).unwrap_err();
    assert!(err.to_string().contains("finite"));

    let err = throttle_from_secs(1.0, Some(f64::INFINITY)).unwrap_err();
    assert!(err.to_string().contains("finite"));

    assert!(throttle_from_secs(f64::NAN, None).is_err());
    assert!(throttle_from_secs(-1.0, None).is_err());
}

#[test]
fn test_throttle_from_valid_delays() {
    assert_eq!(throttle_from_secs(0.0, None).unwrap(), Throttle::None);
    assert_eq!(
        throttle_from_secs(0.5, Some(2.0)).unwrap(),
        Throttle::Range(Duration::from_millis(500), Duration::from_secs(2))
    );
}
