use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("harvest")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("harvest")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(crawl_tuning_args(
            command!("crawl")
                .about(
                    "Crawl outward from one or more seeds, following a few prioritized links \
                per page, and write one record per page.",
                )
                .arg(
                    arg!(-s --"seed" <SEED>)
                        .required(false)
                        .help("A page title, search query or URL to start from (repeatable)")
                        .action(clap::ArgAction::Append)
                        .conflicts_with("seeds-file"),
                )
                .arg(
                    arg!(-H --"seeds-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of seeds")
                        .conflicts_with("seed"),
                )
                .arg(
                    arg!(--"kind" <KIND>)
                        .required(false)
                        .help("How seeds are interpreted unless prefixed with title:, search: or url:")
                        .value_parser(["title", "search", "url"])
                        .default_value("title"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Write records to this file (default: print the report only)"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Output format: jsonl streams records as they are crawled, json writes one array at the end")
                        .value_parser(["jsonl", "json"])
                        .default_value("jsonl"),
                ),
        ))
        .subcommand(crawl_tuning_args(
            command!("topics")
                .about(
                    "Crawl every topic in a category catalog as a search seed and write one \
                dataset file per topic plus a dataset README.",
                )
                .arg(
                    arg!(-c --"catalog" <PATH>)
                        .required(false)
                        .help("Topic catalog: {\"category\": {\"subcategory\": [\"topic\", ...]}}")
                        .default_value("search_topics.json"),
                )
                .arg(
                    arg!(-o --"output-dir" <PATH>)
                        .required(false)
                        .help("Directory for the dataset files")
                        .default_value("wikipedia_data"),
                ),
        ))
}

/// Flags shared by every subcommand that runs a crawl
fn crawl_tuning_args(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        arg!(--"base-url" <URL>)
            .required(false)
            .help("Site that title and search seeds resolve against")
            .value_parser(clap::value_parser!(Url))
            .default_value("https://en.wikipedia.org"),
    )
    .arg(
        arg!(-d --"depth" <DEPTH>)
            .required(false)
            .help("Maximum link depth below each seed (0 = the seed page only)")
            .value_parser(clap::value_parser!(usize))
            .default_value("2"),
    )
    .arg(
        arg!(-b --"branches" <NUM>)
            .required(false)
            .help("Maximum number of links followed from each page")
            .value_parser(clap::value_parser!(usize))
            .default_value("3"),
    )
    .arg(
        arg!(-k --"keyword" <KEYWORD>)
            .required(false)
            .help("Prefer links whose text contains this keyword; earlier keywords rank higher (repeatable)")
            .action(clap::ArgAction::Append),
    )
    .arg(
        arg!(--"default-keywords")
            .required(false)
            .help("Prefer links matching the built-in mental health keyword list")
            .action(clap::ArgAction::SetTrue)
            .conflicts_with("keyword"),
    )
    .arg(
        arg!(--"scope" <SCOPE>)
            .required(false)
            .help("Which links are followed: wikipedia articles, anything on the same host, or any link")
            .value_parser(["wikipedia", "same-host", "any"])
            .default_value("wikipedia"),
    )
    .arg(
        arg!(--"shared-visited")
            .required(false)
            .help("Never revisit a page already crawled for an earlier seed in this run")
            .action(clap::ArgAction::SetTrue),
    )
    .arg(
        arg!(--"legacy-depth")
            .required(false)
            .help("Crawl one level beyond --depth, as older topic datasets did")
            .action(clap::ArgAction::SetTrue),
    )
    .arg(
        arg!(--"throttle" <SECONDS>)
            .required(false)
            .help("Delay between requests")
            .value_parser(clap::value_parser!(f64))
            .default_value("1"),
    )
    .arg(
        arg!(--"throttle-max" <SECONDS>)
            .required(false)
            .help("Upper bound for a random delay between --throttle and this value")
            .value_parser(clap::value_parser!(f64)),
    )
    .arg(
        arg!(--"timeout" <SECONDS>)
            .required(false)
            .help("Request timeout in seconds")
            .value_parser(clap::value_parser!(u64))
            .default_value("10"),
    )
    .arg(
        arg!(--"user-agent" <AGENT>)
            .required(false)
            .help("User-Agent header sent with every request"),
    )
    .arg(
        arg!(--"full-text")
            .required(false)
            .help("Keep every paragraph of each page instead of the first one")
            .action(clap::ArgAction::SetTrue),
    )
}
