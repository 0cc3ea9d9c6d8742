//! HTML extraction of on-page metadata and raw links
//!
//! This module handles parsing fetched bodies to extract:
//! - Meta robots, title, description, canonical and language
//! - Headings, main text, images and JSON-LD publish/modified dates
//! - Raw link references from every element that can carry one
//!
//! Links are returned unresolved and tagged with the element they came from;
//! resolution and scoping happen in the classifier.

use crate::crawler::encoding::sniff_encoding;
use crate::output::IndexStatus;
use crate::CrawlError;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

/// The kind of element a raw link was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkSource {
    Anchor,
    Link,
    Image,
    Script,
    Iframe,
    Source,
    OpenGraphUrl,
    OpenGraphImage,
    MetaRefresh,
    JsonLd,
}

impl LinkSource {
    /// Whether a link from this source points at a page a user can navigate to
    ///
    /// Only navigational links feed the crawl frontier; the others are
    /// reported and probed but never crawled.
    pub fn is_navigational(&self) -> bool {
        matches!(
            self,
            Self::Anchor | Self::Iframe | Self::MetaRefresh | Self::OpenGraphUrl
        )
    }
}

/// An unresolved link reference as written in the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLink {
    pub raw: String,
    pub source: LinkSource,
}

impl RawLink {
    fn new(raw: &str, source: LinkSource) -> Option<Self> {
        let raw = raw.trim();
        (!raw.is_empty()).then(|| Self {
            raw: raw.to_string(),
            source,
        })
    }
}

/// An `<img>` reference with its descriptive attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub src: String,
    /// `src` resolved against the page URL
    pub absolute: Option<String>,
    pub alt: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
}

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedPage {
    /// URL the document was served from, used as the link base
    pub final_url: String,
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_robots: Option<String>,
    pub canonical: Option<String>,
    pub lang: Option<String>,
    pub h1: Vec<String>,
    pub h2: Vec<String>,
    pub h3: Vec<String>,
    /// Paragraph-level text of the main content, one block per line
    pub text: String,
    pub images: Vec<ImageRef>,
    /// JSON-LD `datePublished`
    pub publish_date: Option<String>,
    /// JSON-LD `dateModified`
    pub modified_date: Option<String>,
    pub links: Vec<RawLink>,
}

impl ExtractedPage {
    pub fn index_status(&self) -> IndexStatus {
        IndexStatus::from_meta_robots(self.meta_robots.as_deref())
    }
}

/// Turns a fetched body into an [`ExtractedPage`]
pub trait Extract: Send + Sync {
    /// Extracts metadata and raw links
    ///
    /// `encoding` is the label the fetch settled on, if any. Returns
    /// `Err(CrawlError::ExtractionFailed)` when the body cannot be treated as
    /// an HTML document.
    fn extract(
        &self,
        body: &[u8],
        final_url: &str,
        encoding: Option<&str>,
    ) -> Result<ExtractedPage, CrawlError>;
}

/// Extractor backed by scraper
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExtractor;

impl Extract for HtmlExtractor {
    fn extract(
        &self,
        body: &[u8],
        final_url: &str,
        encoding: Option<&str>,
    ) -> Result<ExtractedPage, CrawlError> {
        let html = decode_body(body, encoding).ok_or_else(|| CrawlError::ExtractionFailed {
            url: final_url.to_string(),
            message: "body is not a text document".to_string(),
        })?;

        Ok(parse_html(&html, final_url))
    }
}

/// Decodes a body to text
///
/// A NUL byte marks the body as binary and yields `None`.
fn decode_body(body: &[u8], encoding: Option<&str>) -> Option<String> {
    if body.contains(&0) {
        return None;
    }

    let Some(encoding) = sniff_encoding(body, encoding) else {
        return Some(String::new());
    };
    let (text, _, _) = encoding.decode(body);
    Some(text.into_owned())
}

/// Parses HTML text and extracts metadata and raw links
///
/// # Link Sources
///
/// | Element | Attribute | Source |
/// |---------|-----------|--------|
/// | `<a>` | `href` | Anchor |
/// | `<link>` | `href` | Link |
/// | `<img>` | `src` | Image |
/// | `<script>` | `src` | Script |
/// | `<iframe>` | `src` | Iframe |
/// | `<source>` | `srcset` (each candidate) | Source |
/// | `<meta property="og:url">` | `content` | OpenGraphUrl |
/// | `<meta property="og:image">` | `content` | OpenGraphImage |
/// | `<meta http-equiv="refresh">` | `content` after `url=` | MetaRefresh |
/// | JSON-LD script | `url`, `@id`, `contentUrl`, `mainEntityOfPage`, `image` | JsonLd |
///
/// `rel="nofollow"` links are extracted like any other.
///
/// # Example
///
/// ```
/// use onpage_crawl::crawler::parse_html;
///
/// let html = r#"<html><head><meta name="robots" content="noindex"></head>
///     <body><a href="/page">Link</a></body></html>"#;
/// let page = parse_html(html, "https://example.com/");
/// assert_eq!(page.meta_robots.as_deref(), Some("noindex"));
/// assert_eq!(page.links[0].raw, "/page");
/// ```
pub fn parse_html(html: &str, final_url: &str) -> ExtractedPage {
    let document = Html::parse_document(html);
    let json_ld = json_ld_blocks(&document);
    let (publish_date, modified_date) = json_ld_dates(&json_ld);

    let mut links = extract_links(&document);
    for value in &json_ld {
        collect_json_ld_links(value, &mut links);
    }

    ExtractedPage {
        final_url: final_url.to_string(),
        title: first_text(&document, "title"),
        meta_description: named_meta(&document, "description"),
        meta_robots: named_meta(&document, "robots"),
        canonical: first_attr(&document, "link[rel='canonical'][href]", "href"),
        lang: first_attr(&document, "html[lang]", "lang"),
        h1: all_text(&document, "h1"),
        h2: all_text(&document, "h2"),
        h3: all_text(&document, "h3"),
        text: main_text(&document),
        images: extract_images(&document, final_url),
        publish_date,
        modified_date,
        links,
    }
}

/// Collapses runs of whitespace and trims
fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(element: ElementRef) -> String {
    clean_text(&element.text().collect::<String>())
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .map(element_text)
        .find(|s| !s.is_empty())
}

fn all_text(document: &Html, selector: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .map(element_text)
        .filter(|s| !s.is_empty())
        .collect()
}

fn first_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .filter_map(|e| e.value().attr(attr))
        .map(clean_text)
        .find(|s| !s.is_empty())
}

/// Content of the first `<meta>` whose `name` (or `property`) matches, case-insensitively
fn named_meta(document: &Html, name: &str) -> Option<String> {
    let selector = Selector::parse("meta[content]").ok()?;
    document
        .select(&selector)
        .filter(|e| {
            e.value()
                .attr("name")
                .or_else(|| e.value().attr("property"))
                .is_some_and(|n| n.trim().eq_ignore_ascii_case(name))
        })
        .filter_map(|e| e.value().attr("content"))
        .map(clean_text)
        .find(|s| !s.is_empty())
}

/// Text blocks of the main content: `<article>`, else `<main>`, else `<body>`
///
/// Consecutive duplicate blocks are collapsed.
fn main_text(document: &Html) -> String {
    let (Ok(roots), Ok(blocks)) = (
        Selector::parse("article, main, body"),
        Selector::parse("p, li, h2, h3, blockquote"),
    ) else {
        return String::new();
    };

    let candidates: Vec<ElementRef> = document.select(&roots).collect();
    let root = ["article", "main", "body"]
        .iter()
        .find_map(|name| candidates.iter().find(|e| e.value().name() == *name));
    let Some(root) = root else {
        return String::new();
    };

    let mut lines: Vec<String> = root
        .select(&blocks)
        .map(element_text)
        .filter(|s| !s.is_empty())
        .collect();
    lines.dedup();
    lines.join("\n")
}

fn extract_images(document: &Html, final_url: &str) -> Vec<ImageRef> {
    let Ok(selector) = Selector::parse("img[src]") else {
        return Vec::new();
    };
    let base = Url::parse(final_url).ok();
    let attr = |element: &ElementRef, name: &str| {
        element
            .value()
            .attr(name)
            .map(clean_text)
            .filter(|s| !s.is_empty())
    };

    document
        .select(&selector)
        .filter_map(|element| {
            let src = attr(&element, "src")?;
            Some(ImageRef {
                absolute: base
                    .as_ref()
                    .and_then(|base| base.join(&src).ok())
                    .map(String::from),
                alt: attr(&element, "alt"),
                width: attr(&element, "width"),
                height: attr(&element, "height"),
                src,
            })
        })
        .collect()
}

/// Parsed JSON-LD blocks; malformed ones are skipped
fn json_ld_blocks(document: &Html) -> Vec<serde_json::Value> {
    let Ok(selector) = Selector::parse("script[type='application/ld+json']") else {
        return Vec::new();
    };
    document
        .select(&selector)
        .filter_map(|element| {
            let text = element.text().collect::<String>();
            serde_json::from_str::<serde_json::Value>(text.trim())
                .map_err(|e| tracing::trace!("Ignoring malformed JSON-LD block: {}", e))
                .ok()
        })
        .collect()
}

/// First `datePublished` and `dateModified` of the top-level JSON-LD items
fn json_ld_dates(blocks: &[serde_json::Value]) -> (Option<String>, Option<String>) {
    let items = blocks.iter().flat_map(|block| match block {
        serde_json::Value::Array(items) => items.iter().collect::<Vec<_>>(),
        other => vec![other],
    });

    let mut published = None;
    let mut modified = None;
    for item in items {
        let date = |key: &str| {
            item.get(key)
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        published = published.or_else(|| date("datePublished"));
        modified = modified.or_else(|| date("dateModified"));
        if published.is_some() && modified.is_some() {
            break;
        }
    }
    (published, modified)
}

/// Collects raw links from every supported source, grouped by source in document order
fn extract_links(document: &Html) -> Vec<RawLink> {
    let mut links = Vec::new();

    let attribute_sources = [
        ("a[href]", "href", LinkSource::Anchor),
        ("link[href]", "href", LinkSource::Link),
        ("img[src]", "src", LinkSource::Image),
        ("script[src]", "src", LinkSource::Script),
        ("iframe[src]", "src", LinkSource::Iframe),
    ];
    for (selector, attr, source) in attribute_sources {
        if let Ok(selector) = Selector::parse(selector) {
            links.extend(
                document
                    .select(&selector)
                    .filter_map(|e| e.value().attr(attr))
                    .filter_map(|raw| RawLink::new(raw, source)),
            );
        }
    }

    if let Ok(selector) = Selector::parse("source[srcset]") {
        for element in document.select(&selector) {
            if let Some(srcset) = element.value().attr("srcset") {
                links.extend(
                    srcset_candidates(srcset)
                        .filter_map(|raw| RawLink::new(raw, LinkSource::Source)),
                );
            }
        }
    }

    if let Ok(selector) = Selector::parse("meta[property][content]") {
        for element in document.select(&selector) {
            let source = match element.value().attr("property").map(str::trim) {
                Some(p) if p.eq_ignore_ascii_case("og:url") => LinkSource::OpenGraphUrl,
                Some(p) if p.eq_ignore_ascii_case("og:image") => LinkSource::OpenGraphImage,
                _ => continue,
            };
            if let Some(link) = element
                .value()
                .attr("content")
                .and_then(|raw| RawLink::new(raw, source))
            {
                links.push(link);
            }
        }
    }

    if let Ok(selector) = Selector::parse("meta[http-equiv][content]") {
        for element in document.select(&selector) {
            let is_refresh = element
                .value()
                .attr("http-equiv")
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("refresh"));
            if !is_refresh {
                continue;
            }
            if let Some(link) = element
                .value()
                .attr("content")
                .and_then(refresh_target)
                .and_then(|raw| RawLink::new(raw, LinkSource::MetaRefresh))
            {
                links.push(link);
            }
        }
    }

    links
}

/// URL part of each `srcset` candidate
fn srcset_candidates(srcset: &str) -> impl Iterator<Item = &str> {
    srcset
        .split(',')
        .filter_map(|candidate| candidate.split_whitespace().next())
}

/// Target of a meta refresh `content` value such as `5; url=/next`
fn refresh_target(content: &str) -> Option<&str> {
    let lower = content.to_ascii_lowercase();
    let start = lower.find("url=")? + "url=".len();
    let target = content[start..]
        .trim()
        .trim_matches(|c| c == '"' || c == '\'');
    (!target.is_empty()).then_some(target)
}

const JSON_LD_URL_KEYS: [&str; 5] = ["url", "@id", "contentUrl", "mainEntityOfPage", "image"];

/// Walks a JSON-LD document collecting string values of URL-bearing keys
fn collect_json_ld_links(value: &serde_json::Value, links: &mut Vec<RawLink>) {
    match value {
        serde_json::Value::Array(items) => {
            for item in items {
                collect_json_ld_links(item, links);
            }
        }
        serde_json::Value::Object(map) => {
            for (key, child) in map {
                if JSON_LD_URL_KEYS.contains(&key.as_str()) {
                    push_json_ld_strings(child, links);
                }
                if child.is_object() || child.is_array() {
                    collect_json_ld_links(child, links);
                }
            }
        }
        _ => {}
    }
}

fn push_json_ld_strings(value: &serde_json::Value, links: &mut Vec<RawLink>) {
    match value {
        serde_json::Value::String(s) => links.extend(RawLink::new(s, LinkSource::JsonLd)),
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str())
            .for_each(|s| links.extend(RawLink::new(s, LinkSource::JsonLd))),
        _ => {}
    }
}
