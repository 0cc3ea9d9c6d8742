//! Configuration module for Onpage-Crawl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so a missing section or an empty file is valid.
//!
//! # Example
//!
//! ```no_run
//! use onpage_crawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Default page budget: {}", config.limits.max_pages_per_domain);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, HttpConfig, LimitsConfig, OutputConfig, DEFAULT_USER_AGENT};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};
pub use validation::validate;
