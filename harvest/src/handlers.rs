use anyhow::{Context, bail};
use clap::ArgMatches;
use colored::Colorize;
use harvest_core::crawl::{
    CrawlOptions, CrawlProgressCallback, LinkScope, OutputMode, attach_spinner, build_crawler,
    default_priority_keywords, execute_crawl, finish_spinner, generate_crawl_report,
    run_topic_catalog,
};
use harvest_core::topics::TopicCatalog;
use harvest_scanner::{
    BatchOutcome, CancelToken, ContentMode, CrawlRecord, DepthMode, JsonlSink, Seed, SeedKind,
    Throttle, VisitedPolicy, fetch::DEFAULT_USER_AGENT,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

// Helper functions for crawl handler

/// Load seeds from either a file or the repeated `--seed` argument
pub fn load_seeds_from_source(
    seeds: &[String],
    seeds_file: Option<&PathBuf>,
    kind: SeedKind,
) -> Result<Vec<Seed>, String> {
    if let Some(seeds_file_path) = seeds_file {
        load_seeds_from_file(seeds_file_path, kind)
    } else if !seeds.is_empty() {
        let parsed: Vec<Seed> = seeds
            .iter()
            .filter_map(|line| parse_seed_line(line, kind))
            .collect();
        if parsed.is_empty() {
            return Err("Every --seed value was blank".to_string());
        }
        Ok(parsed)
    } else {
        Err("Either --seed or --seeds-file must be provided".to_string())
    }
}

/// Load seeds from a file, one per line. Blank lines and `#` comments are skipped.
pub fn load_seeds_from_file(path: &Path, kind: SeedKind) -> Result<Vec<Seed>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read seeds file {}: {}", path.display(), e))?;

    let seeds: Vec<Seed> = content
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .filter_map(|line| parse_seed_line(line, kind))
        .collect();

    if seeds.is_empty() {
        return Err(format!("No seeds found in {}", path.display()));
    }

    Ok(seeds)
}

/// Parse one seed. A `title:`, `search:` or `url:` prefix overrides `kind`.
pub fn parse_seed_line(line: &str, kind: SeedKind) -> Option<Seed> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Some((prefix, rest)) = line.split_once(':')
        && let Some(explicit) = SeedKind::from_str(prefix)
    {
        return Some(Seed::new(explicit, rest.trim()));
    }

    Some(Seed::new(kind, line))
}

/// Map the shared crawl tuning flags onto `CrawlOptions`
pub fn crawl_options_from_args(args: &ArgMatches) -> anyhow::Result<CrawlOptions> {
    let mut options = CrawlOptions::default();

    if let Some(base_url) = args.get_one::<Url>("base-url") {
        options.base_url = base_url.clone();
    }
    if let Some(depth) = args.get_one::<usize>("depth") {
        options.max_depth = *depth;
    }
    if let Some(branches) = args.get_one::<usize>("branches") {
        options.max_branches = *branches;
    }

    options.priority_keywords = if args.get_flag("default-keywords") {
        default_priority_keywords()
    } else {
        args.get_many::<String>("keyword")
            .map(|values| values.cloned().collect())
            .unwrap_or_default()
    };

    if let Some(scope) = args.get_one::<String>("scope") {
        options.link_scope = LinkScope::from_str(scope)
            .with_context(|| format!("Unknown link scope '{}'", scope))?;
    }

    if args.get_flag("shared-visited") {
        options.visited_policy = VisitedPolicy::SharedAcrossSeeds;
    }
    if args.get_flag("legacy-depth") {
        options.depth_mode = DepthMode::OneExtraLevel;
    }

    let throttle_min = args.get_one::<f64>("throttle").copied().unwrap_or(1.0);
    let throttle_max = args.get_one::<f64>("throttle-max").copied();
    options.throttle = throttle_from_secs(throttle_min, throttle_max)?;

    if let Some(timeout) = args.get_one::<u64>("timeout") {
        options.timeout_secs = *timeout;
    }
    options.user_agent = args
        .get_one::<String>("user-agent")
        .cloned()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

    if args.get_flag("full-text") {
        options.content_mode = ContentMode::FullText;
    }

    Ok(options)
}

/// Validate `--throttle` / `--throttle-max` before they become durations
pub fn throttle_from_secs(min: f64, max: Option<f64>) -> anyhow::Result<Throttle> {
    for value in std::iter::once(min).chain(max) {
        if !value.is_finite() {
            bail!("Throttle delays must be finite numbers of seconds, got {}", value);
        }
        if value < 0.0 {
            bail!("Throttle delays must not be negative");
        }
    }
    Ok(Throttle::from_secs(min, max))
}

/// Tilde-expand a user supplied path
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Write collected records as one pretty-printed JSON array.
pub fn write_json_records<'a>(
    path: &Path,
    records: impl Iterator<Item = &'a CrawlRecord>,
) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let records: Vec<&CrawlRecord> = records.collect();
    let json = serde_json::to_string_pretty(&records)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn init_tracing() {
    // Logs go to stderr so stdout stays clean for the report
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .try_init();
}

/// Cancel `token` on Ctrl-C. The running traversal stops at its next step.
fn cancel_on_ctrl_c(token: CancelToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!(
                "\n{} Interrupted, finishing with partial results...",
                "!".yellow().bold()
            );
            token.cancel();
        }
    });
}

fn progress_printer(quiet: bool) -> Option<CrawlProgressCallback> {
    if quiet {
        return None;
    }
    Some(Arc::new(|msg: String| {
        println!("{} {}", "→".blue(), msg);
    }))
}

pub async fn handle_crawl(sub_matches: &ArgMatches, quiet: bool) -> anyhow::Result<()> {
    init_tracing();

    let kind = sub_matches
        .get_one::<String>("kind")
        .and_then(|k| SeedKind::from_str(k))
        .unwrap_or(SeedKind::Title);
    let raw_seeds: Vec<String> = sub_matches
        .get_many::<String>("seed")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let seeds_file = sub_matches
        .get_one::<String>("seeds-file")
        .map(|p| expand_path(p));

    let seeds = load_seeds_from_source(&raw_seeds, seeds_file.as_ref(), kind)
        .map_err(anyhow::Error::msg)?;

    let mut options = crawl_options_from_args(sub_matches)?;
    options.seeds = seeds;
    options.show_progress_bars = !quiet;

    let output = sub_matches.get_one::<String>("output").map(|p| expand_path(p));
    let format = sub_matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("jsonl");

    if let Some(ref path) = output
        && format == "jsonl"
    {
        let sink = JsonlSink::append(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        options.output = OutputMode::Stream(Arc::new(sink));
    }

    if !quiet {
        println!(
            "{} Crawling {} seed(s) from {}",
            "✓".green().bold(),
            options.seeds.len(),
            options.base_url.as_str().bright_white()
        );
        println!(
            "  Depth: {}  Branches: {}  Throttle: {:?}\n",
            options.max_depth, options.max_branches, options.throttle
        );
    }

    let cancel = CancelToken::new();
    cancel_on_ctrl_c(cancel.clone());

    let batch = execute_crawl(options, cancel, progress_printer(quiet)).await?;

    if let Some(ref path) = output
        && format == "json"
    {
        write_json_records(path, batch.records())?;
    }

    print!("{}", generate_crawl_report(&batch));
    if let Some(ref path) = output {
        println!("{} Records written to {}", "✓".green().bold(), path.display());
    }

    ensure_some_seed_succeeded(&batch)
}

pub async fn handle_topics(sub_matches: &ArgMatches, quiet: bool) -> anyhow::Result<()> {
    init_tracing();

    let catalog_path = sub_matches
        .get_one::<String>("catalog")
        .map(|p| expand_path(p))
        .context("--catalog is required")?;
    let output_dir = sub_matches
        .get_one::<String>("output-dir")
        .map(|p| expand_path(p))
        .context("--output-dir is required")?;

    let catalog = TopicCatalog::load(&catalog_path)?;
    if catalog.is_empty() {
        bail!("Topic catalog {} has no topics", catalog_path.display());
    }
    info!("Loaded {} topics from {}", catalog.len(), catalog_path.display());

    let mut options = crawl_options_from_args(sub_matches)?;
    options.show_progress_bars = !quiet;

    let cancel = CancelToken::new();
    cancel_on_ctrl_c(cancel.clone());
    let crawler = build_crawler(&options, cancel)?;
    let (crawler, spinner) = if options.show_progress_bars {
        let (crawler, pb) = attach_spinner(crawler);
        (crawler, Some(pb))
    } else {
        (crawler, None)
    };

    let summary = run_topic_catalog(&catalog, &crawler, &output_dir, progress_printer(quiet))
        .await
        .with_context(|| format!("Failed to write datasets to {}", output_dir.display()));
    if let Some(ref pb) = spinner {
        match summary {
            Ok(ref summary) => finish_spinner(pb, &summary.batch),
            Err(_) => pb.finish_and_clear(),
        }
    }
    let summary = summary?;

    print!("{}", generate_crawl_report(&summary.batch));
    println!(
        "{} {} dataset(s) written to {}",
        "✓".green().bold(),
        summary.datasets.len(),
        output_dir.display()
    );
    if let Some(readme) = summary.readme_path {
        println!("{} Dataset README: {}", "✓".green().bold(), readme.display());
    }

    ensure_some_seed_succeeded(&summary.batch)
}

/// A run where every seed failed is an error; partial failures are not.
pub fn ensure_some_seed_succeeded(batch: &BatchOutcome) -> anyhow::Result<()> {
    if batch.outcomes.is_empty() && !batch.failures.is_empty() {
        warn!("All {} seeds failed", batch.failures.len());
        bail!("Every seed failed to crawl");
    }
    Ok(())
}
