use crate::error::{CrawlError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://en.wikipedia.org";

/// How a raw seed string should be turned into a starting URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedKind {
    /// A page title, resolved to `{base}/wiki/{Title}`
    Title,
    /// A search query, resolved to the site search page
    Search,
    /// An absolute http(s) URL
    Url,
}

impl SeedKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "title" | "page" => Some(SeedKind::Title),
            "search" | "query" => Some(SeedKind::Search),
            "url" => Some(SeedKind::Url),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Seed {
    Title(String),
    Search(String),
    Url(String),
}

impl Seed {
    pub fn new(kind: SeedKind, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        match kind {
            SeedKind::Title => Seed::Title(raw),
            SeedKind::Search => Seed::Search(raw),
            SeedKind::Url => Seed::Url(raw),
        }
    }

    pub fn raw(&self) -> &str {
        match self {
            Seed::Title(s) | Seed::Search(s) | Seed::Url(s) => s,
        }
    }

    /// Resolve this seed to the canonical URL of its starting page.
    ///
    /// Fails with `InvalidSeed` without touching the network.
    pub fn resolve(&self, base: &Url) -> Result<Url> {
        let raw = self.raw().trim();
        if raw.is_empty() {
            return Err(CrawlError::InvalidSeed("seed is empty".to_string()));
        }
        if raw.chars().any(char::is_control) {
            return Err(CrawlError::InvalidSeed(format!(
                "seed contains control characters: {:?}",
                raw
            )));
        }

        let url = match self {
            Seed::Title(title) => {
                let mut url = base
                    .join("/wiki/")
                    .map_err(|e| CrawlError::InvalidSeed(format!("{}: {}", title, e)))?;
                url.path_segments_mut()
                    .map_err(|_| CrawlError::InvalidSeed(format!("base URL cannot hold a path: {}", base)))?
                    .pop_if_empty()
                    .push(&raw.replace(' ', "_"));
                url
            }
            Seed::Search(query) => {
                let mut url = base
                    .join("/w/index.php")
                    .map_err(|e| CrawlError::InvalidSeed(format!("{}: {}", query, e)))?;
                url.query_pairs_mut().append_pair("search", raw);
                url
            }
            Seed::Url(_) => {
                let url = Url::parse(raw)
                    .map_err(|e| CrawlError::InvalidSeed(format!("{}: {}", raw, e)))?;
                if url.scheme() != "http" && url.scheme() != "https" {
                    return Err(CrawlError::InvalidSeed(format!(
                        "unsupported scheme '{}' in {}",
                        url.scheme(),
                        raw
                    )));
                }
                url
            }
        };

        Ok(canonical_url(url))
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seed::Title(s) => write!(f, "title:{}", s),
            Seed::Search(s) => write!(f, "search:{}", s),
            Seed::Url(s) => write!(f, "url:{}", s),
        }
    }
}

/// Strip the fragment so `#section` links collapse onto one node.
pub fn canonical_url(mut url: Url) -> Url {
    url.set_fragment(None);
    url
}
