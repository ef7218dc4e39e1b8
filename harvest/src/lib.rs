// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    crawl_options_from_args, ensure_some_seed_succeeded, load_seeds_from_file,
    load_seeds_from_source, parse_seed_line, throttle_from_secs, write_json_records,
};

// Re-export crawl functionality from harvest-core
pub use harvest_core::crawl::{
    CrawlOptions, CrawlProgressCallback, LinkScope, OutputMode, execute_crawl,
    generate_crawl_report,
};
