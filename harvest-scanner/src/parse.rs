use crate::error::ParseError;
use scraper::{ElementRef, Html, Selector};

pub const NO_SUMMARY: &str = "No summary available";

/// An outbound link exactly as it appeared in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLink {
    pub href: String,
    pub anchor_text: String,
}

impl RawLink {
    pub fn new(href: impl Into<String>, anchor_text: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            anchor_text: anchor_text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPage {
    pub title: Option<String>,
    pub content: String,
    /// In document order
    pub links: Vec<RawLink>,
}

pub trait PageParser: Send + Sync {
    fn parse(&self, body: &str, content_type: Option<&str>) -> Result<ParsedPage, ParseError>;
}

/// What goes into a record's `content` field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentMode {
    /// First paragraph only
    #[default]
    Summary,
    /// Every paragraph, separated by blank lines
    FullText,
}

pub struct HtmlPageParser {
    title_selector: Selector,
    fallback_title_selector: Selector,
    paragraph_selector: Selector,
    link_selector: Selector,
    mode: ContentMode,
}

impl HtmlPageParser {
    pub fn new(mode: ContentMode) -> Self {
        Self {
            title_selector: Selector::parse("h1").unwrap(),
            fallback_title_selector: Selector::parse("title").unwrap(),
            paragraph_selector: Selector::parse("p").unwrap(),
            link_selector: Selector::parse("a[href]").unwrap(),
            mode,
        }
    }

    /// Restrict paragraph extraction to a CSS scope, e.g. `#mw-content-text p`.
    pub fn with_paragraph_selector(mut self, css: &str) -> Result<Self, ParseError> {
        self.paragraph_selector =
            Selector::parse(css).map_err(|e| ParseError::Selector(format!("{}: {:?}", css, e)))?;
        Ok(self)
    }

    fn element_text(element: ElementRef<'_>) -> String {
        element
            .text()
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn extract_title(&self, document: &Html) -> Option<String> {
        document
            .select(&self.title_selector)
            .chain(document.select(&self.fallback_title_selector))
            .map(Self::element_text)
            .find(|t| !t.is_empty())
    }

    fn extract_content(&self, document: &Html) -> String {
        let mut paragraphs = document
            .select(&self.paragraph_selector)
            .map(Self::element_text)
            .filter(|t| !t.is_empty());

        match self.mode {
            ContentMode::Summary => paragraphs
                .next()
                .unwrap_or_else(|| NO_SUMMARY.to_string()),
            ContentMode::FullText => {
                let text = paragraphs.collect::<Vec<_>>().join("\n\n");
                if text.is_empty() {
                    NO_SUMMARY.to_string()
                } else {
                    text
                }
            }
        }
    }

    fn extract_links(&self, document: &Html) -> Vec<RawLink> {
        document
            .select(&self.link_selector)
            .filter_map(|element| {
                let href = element.value().attr("href")?.trim();
                if href.is_empty() {
                    return None;
                }
                Some(RawLink::new(href, Self::element_text(element)))
            })
            .collect()
    }
}

impl Default for HtmlPageParser {
    fn default() -> Self {
        Self::new(ContentMode::Summary)
    }
}

impl PageParser for HtmlPageParser {
    fn parse(&self, body: &str, content_type: Option<&str>) -> Result<ParsedPage, ParseError> {
        // Only parse HTML content; a missing header is treated as HTML
        if let Some(ct) = content_type
            && !is_html_content_type(ct)
        {
            return Err(ParseError::UnsupportedContentType(ct.to_string()));
        }
        if body.trim().is_empty() {
            return Err(ParseError::EmptyDocument);
        }

        let document = Html::parse_document(body);
        Ok(ParsedPage {
            title: self.extract_title(&document),
            content: self.extract_content(&document),
            links: self.extract_links(&document),
        })
    }
}

/// Media types are case-insensitive, e.g. `Text/HTML; charset=UTF-8`
fn is_html_content_type(content_type: &str) -> bool {
    let ct = content_type.to_ascii_lowercase();
    ct.contains("text/html") || ct.contains("application/xhtml")
}
