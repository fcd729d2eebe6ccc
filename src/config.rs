//! Site configuration module.
//!
//! Handles loading, validating, and merging `site.toml`. User values are laid
//! over stock defaults, so a config file only needs the keys it changes.
//!
//! ## Config File Location
//!
//! Place `site.toml` in the site root, next to `articles/` and `drafts/`:
//!
//! ```text
//! site/
//! ├── site.toml
//! ├── articles.data
//! ├── projects.data
//! ├── next-thread-id
//! ├── drafts/
//! └── articles/
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! title = "Home"
//! description = ""
//! author = ""
//!
//! [homepage]
//! articles_file = "articles.data"
//! projects_file = "projects.data"
//! gists_source = ""          # URL or local JSON file; empty = no gists
//! max_articles = 10
//! max_projects = 100
//! max_gists = 10
//!
//! [publish]
//! articles_dir = "articles"
//! drafts_dir = "drafts"
//! counter_file = "next-thread-id"
//! page_base_url = "https://example.com/articles/"
//! comments_script = "comments.js"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file looked up in the site root.
pub const CONFIG_FILENAME: &str = "site.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `site.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Homepage identity: `<title>`, meta description, footer author.
    pub site: SiteInfo,
    /// Homepage listing sources and limits.
    pub homepage: HomepageConfig,
    /// Draft publishing paths and comment-thread settings.
    pub publish: PublishConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.publish.page_base_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "publish.page_base_url must not be empty".into(),
            ));
        }
        for (key, value) in [
            ("publish.articles_dir", &self.publish.articles_dir),
            ("publish.drafts_dir", &self.publish.drafts_dir),
            ("publish.counter_file", &self.publish.counter_file),
            ("publish.comments_script", &self.publish.comments_script),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        if self.publish.articles_dir == self.publish.drafts_dir {
            return Err(ConfigError::Validation(
                "publish.articles_dir and publish.drafts_dir must differ".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    pub title: String,
    pub description: String,
    pub author: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            title: "Home".to_string(),
            description: String::new(),
            author: String::new(),
        }
    }
}

/// Homepage listing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HomepageConfig {
    /// Article summaries, relative to the site root.
    pub articles_file: String,
    /// Project summaries, relative to the site root.
    pub projects_file: String,
    /// Where the gist list comes from: an `http(s)://` URL or a JSON file
    /// relative to the site root. Empty disables the gist listing.
    pub gists_source: String,
    pub max_articles: usize,
    pub max_projects: usize,
    pub max_gists: usize,
}

impl Default for HomepageConfig {
    fn default() -> Self {
        Self {
            articles_file: "articles.data".to_string(),
            projects_file: "projects.data".to_string(),
            gists_source: String::new(),
            max_articles: 10,
            max_projects: 100,
            max_gists: 10,
        }
    }
}

/// Draft publishing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishConfig {
    /// Published article tree, relative to the site root.
    pub articles_dir: String,
    /// Draft tree, relative to the site root.
    pub drafts_dir: String,
    /// File holding the next available comment-thread identifier.
    pub counter_file: String,
    /// Prefix of every published article URL; the draft name is appended.
    pub page_base_url: String,
    /// Comment-thread embed script inside each draft folder.
    pub comments_script: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            articles_dir: "articles".to_string(),
            drafts_dir: "drafts".to_string(),
            counter_file: "next-thread-id".to_string(),
            page_base_url: "https://example.com/articles/".to_string(),
            comments_script: "comments.js".to_string(),
        }
    }
}

impl PublishConfig {
    /// Public URL of a published article.
    pub fn page_url(&self, name: &str) -> String {
        if self.page_base_url.ends_with('/') {
            format!("{}{}", self.page_base_url, name)
        } else {
            format!("{}/{}", self.page_base_url, name)
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `site.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `site.toml` in the site root, falling back to defaults.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `site.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# folio site configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Site identity (homepage <title>, meta description, footer)
# ---------------------------------------------------------------------------
[site]
title = "Home"
description = ""
author = ""

# ---------------------------------------------------------------------------
# Homepage listings
# ---------------------------------------------------------------------------
[homepage]
# Summary files, relative to the site root. Records are blocks of four lines
# separated by a blank line.
#   articles: title, date, description, url
#   projects: title, url, description, image url
articles_file = "articles.data"
projects_file = "projects.data"

# Gist list: an http(s) URL returning a JSON array of objects with
# "description" and "html_url", or a local JSON file with the same shape.
# Leave empty to skip the gist listing.
gists_source = ""

# Maximum number of entries shown per listing.
max_articles = 10
max_projects = 100
max_gists = 10

# ---------------------------------------------------------------------------
# Draft publishing
# ---------------------------------------------------------------------------
[publish]
articles_dir = "articles"
drafts_dir = "drafts"

# Holds the next comment-thread identifier; incremented on every publish.
counter_file = "next-thread-id"

# Published article URL = page_base_url + draft name.
page_base_url = "https://example.com/articles/"

# Comment-thread embed script inside each draft folder. Its
# #THREAD_PAGE_URL# and #THREAD_IDENTIFIER# tokens are filled at publish time.
comments_script = "comments.js"
"##
}
