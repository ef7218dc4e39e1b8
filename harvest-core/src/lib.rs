pub mod crawl;
pub mod dataset;
pub mod topics;

use colored::Colorize;

pub fn print_banner() {
    let banner = r#"
  _                               _
 | |__   __ _ _ ____   _____  ___| |_
 | '_ \ / _` | '__\ \ / / _ \/ __| __|
 | | | | (_| | |   \ V /  __/\__ \ |_
 |_| |_|\__,_|_|    \_/ \___||___/\__|
"#;
    println!("{}", banner.bright_green().bold());
    println!(
        "  {} {}\n",
        "bounded link-following corpus crawler".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
