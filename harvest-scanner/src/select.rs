//! Edge selection: resolve raw links, filter them, order by keyword priority
//! and cap the branch count.

use crate::parse::RawLink;
use crate::seed::canonical_url;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Keywords the topic crawler has always favoured when choosing branches
pub const DEFAULT_PRIORITY_KEYWORDS: &[&str] = &[
    "disorder",
    "psychology",
    "psychiatry",
    "mental",
    "treatment",
    "neurology",
    "therapy",
    "illness",
];

/// Extra caller-supplied rule: `(link, resolved)` -> keep?
pub type LinkPredicate = Arc<dyn Fn(&RawLink, &Url) -> bool + Send + Sync>;

/// A link that survived resolution and filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCandidate {
    pub identifier: String,
    pub href: String,
    pub anchor_text: String,
    /// Index of the first matching priority keyword, `None` when unmatched
    pub priority_rank: Option<usize>,
}

/// Decides which outbound links are content links worth following.
#[derive(Clone)]
pub struct LinkFilter {
    path_prefix: Option<String>,
    reject_namespaced: bool,
    home_pages: Vec<String>,
    blocked_fragments: Vec<String>,
    same_host_only: bool,
    predicate: Option<LinkPredicate>,
}

impl LinkFilter {
    /// Accepts any resolvable link that is not the current page.
    pub fn permissive() -> Self {
        Self {
            path_prefix: None,
            reject_namespaced: false,
            home_pages: Vec::new(),
            blocked_fragments: Vec::new(),
            same_host_only: false,
            predicate: None,
        }
    }

    /// Article links only: `/wiki/` paths on the same host, no namespaced
    /// pages (`Help:`, `Category:`, `Special:`...), no main page.
    pub fn wikipedia() -> Self {
        Self {
            path_prefix: Some("/wiki/".to_string()),
            reject_namespaced: true,
            home_pages: vec!["Main_Page".to_string()],
            blocked_fragments: vec!["index.php".to_string(), "Special:".to_string()],
            same_host_only: true,
            predicate: None,
        }
    }

    pub fn with_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = Some(prefix.into());
        self
    }

    pub fn with_home_page(mut self, page: impl Into<String>) -> Self {
        self.home_pages.push(page.into());
        self
    }

    pub fn with_same_host_only(mut self, same_host_only: bool) -> Self {
        self.same_host_only = same_host_only;
        self
    }

    pub fn with_predicate(mut self, predicate: LinkPredicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// `current` holds every URL the current page is known by (requested
    /// and post-redirect).
    pub fn allows(&self, link: &RawLink, resolved: &Url, current: &[Url]) -> bool {
        if current.iter().any(|c| c == resolved) {
            return false;
        }

        let href = link.href.as_str();
        let path = resolved.path();

        if self.same_host_only
            && let Some(first) = current.first()
            && first.host_str() != resolved.host_str()
        {
            return false;
        }

        if let Some(prefix) = &self.path_prefix
            && !path.starts_with(prefix.as_str())
        {
            return false;
        }

        if self.reject_namespaced {
            let tail = match &self.path_prefix {
                Some(prefix) => path.strip_prefix(prefix.as_str()).unwrap_or(path),
                None => path,
            };
            if tail.contains(':') || tail.contains("%3A") || tail.contains("%3a") {
                return false;
            }
        }

        if self
            .home_pages
            .iter()
            .any(|home| path.trim_end_matches('/').ends_with(&format!("/{}", home)))
        {
            return false;
        }

        if self
            .blocked_fragments
            .iter()
            .any(|blocked| href.contains(blocked.as_str()) || path.contains(blocked.as_str()))
        {
            return false;
        }

        match &self.predicate {
            Some(predicate) => predicate(link, resolved),
            None => true,
        }
    }
}

impl Default for LinkFilter {
    fn default() -> Self {
        Self::wikipedia()
    }
}

impl std::fmt::Debug for LinkFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkFilter")
            .field("path_prefix", &self.path_prefix)
            .field("reject_namespaced", &self.reject_namespaced)
            .field("home_pages", &self.home_pages)
            .field("blocked_fragments", &self.blocked_fragments)
            .field("same_host_only", &self.same_host_only)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

/// Resolve `href` against the page it was found on.
///
/// Returns `None` for links that can never be crawled.
pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    // Skip empty, javascript:, mailto:, tel:, etc.
    if href.is_empty()
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with('#')
    {
        return None;
    }

    let resolved = base.join(href).ok()?;
    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }

    Some(canonical_url(resolved))
}

/// Index of the first keyword found in the href or anchor text.
pub fn priority_rank(link: &RawLink, keywords: &[String]) -> Option<usize> {
    let href = link.href.to_lowercase();
    let anchor = link.anchor_text.to_lowercase();
    keywords.iter().position(|keyword| {
        let keyword = keyword.to_lowercase();
        !keyword.is_empty() && (href.contains(&keyword) || anchor.contains(&keyword))
    })
}

/// Stable partition: matched candidates first, ordered by keyword rank, then
/// unmatched ones. Discovery order is kept inside each group.
pub fn prioritize(mut candidates: Vec<LinkCandidate>) -> Vec<LinkCandidate> {
    candidates.sort_by_key(|c| c.priority_rank.unwrap_or(usize::MAX));
    candidates
}

/// Full edge-selection pipeline for one page.
///
/// A link repeated on the same page is only considered once.
pub fn select_links(
    links: &[RawLink],
    current: &[Url],
    filter: &LinkFilter,
    keywords: &[String],
    max_branches: usize,
) -> Vec<LinkCandidate> {
    let Some(base) = current.last() else {
        return Vec::new();
    };

    let mut seen = std::collections::HashSet::new();
    let mut candidates = Vec::new();

    for link in links {
        let Some(resolved) = resolve_link(base, &link.href) else {
            debug!("  -> Dropping unresolvable link {:?}", link.href);
            continue;
        };
        if !filter.allows(link, &resolved, current) {
            debug!("  -> Filtered out {}", resolved);
            continue;
        }
        if !seen.insert(resolved.to_string()) {
            continue;
        }
        candidates.push(LinkCandidate {
            identifier: resolved.to_string(),
            href: link.href.clone(),
            anchor_text: link.anchor_text.clone(),
            priority_rank: priority_rank(link, keywords),
        });
    }

    let mut selected = prioritize(candidates);
    selected.truncate(max_branches);
    selected
}
