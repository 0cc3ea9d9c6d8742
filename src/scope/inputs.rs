//! Domain inputs: crawl requests and domain list files

use crate::CrawlError;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// A crawl request as received from an API caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlRequest {
    /// Domain to crawl, with or without scheme
    pub domain: String,

    /// Page budget for this domain
    #[serde(default = "default_request_pages")]
    pub max_pages: usize,
}

fn default_request_pages() -> usize {
    10
}

/// Unresolved description of a domain to crawl
///
/// Accepts the simple shape `{"domain": "example.com", "max_pages": 10}` as
/// well as the advanced one with explicit seeds and path rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainInput {
    #[serde(default)]
    pub domain: String,

    #[serde(default)]
    pub slug: Option<String>,

    #[serde(default)]
    pub start_urls: Vec<String>,

    #[serde(default, deserialize_with = "deserialize_max_pages")]
    pub max_pages: Option<usize>,

    #[serde(default)]
    pub allowed_paths: Vec<String>,

    #[serde(default)]
    pub blocked_paths: Vec<String>,
}

impl DomainInput {
    /// Creates an input for a bare domain with no explicit rules
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ..Self::default()
        }
    }
}

impl From<CrawlRequest> for DomainInput {
    fn from(request: CrawlRequest) -> Self {
        Self {
            domain: request.domain,
            max_pages: Some(request.max_pages),
            ..Self::default()
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMaxPages {
    Number(f64),
    Text(String),
}

/// Accepts integers, floats and digit strings; anything else means "unset"
fn deserialize_max_pages<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawMaxPages>::deserialize(deserializer).unwrap_or(None);
    Ok(match raw {
        Some(RawMaxPages::Number(n)) if n >= 1.0 => Some(n as usize),
        Some(RawMaxPages::Text(s)) => s.trim().parse::<usize>().ok().filter(|n| *n > 0),
        _ => None,
    })
}

/// Loads domain inputs from a JSON file
///
/// # Supported Shapes
///
/// - An array of domain objects
/// - `{"domains": [...]}`
/// - A single domain object
///
/// Items that are not objects or fail to deserialize are skipped with a warning.
///
/// # Returns
///
/// * `Ok(Vec<DomainInput>)` - Inputs in file order
/// * `Err(CrawlError)` - The file could not be read or is not JSON
pub fn load_domain_inputs(path: &Path) -> Result<Vec<DomainInput>, CrawlError> {
    let content = std::fs::read_to_string(path)?;
    parse_domain_inputs(&content)
}

/// Parses domain inputs from JSON text (see [`load_domain_inputs`])
pub fn parse_domain_inputs(content: &str) -> Result<Vec<DomainInput>, CrawlError> {
    let raw: serde_json::Value = serde_json::from_str(content)?;

    let items = match raw {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut map) => match map.remove("domains") {
            Some(serde_json::Value::Array(items)) => items,
            Some(_) => Vec::new(),
            None => vec![serde_json::Value::Object(map)],
        },
        _ => Vec::new(),
    };

    let mut inputs = Vec::new();
    for (index, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            tracing::warn!("Skipping domain entry {}: not an object", index);
            continue;
        }
        match serde_json::from_value::<DomainInput>(item) {
            Ok(input) => inputs.push(input),
            Err(e) => tracing::warn!("Skipping domain entry {}: {}", index, e),
        }
    }

    Ok(inputs)
}
