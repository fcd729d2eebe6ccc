//! Gist listing for the homepage.
//!
//! The list is owned by a code-hosting service and never persisted here. The
//! response is a JSON array of objects; only `description` and `html_url` are
//! read. Gist listing is best-effort: a failed fetch or an unusable body logs
//! an error and leaves the listing empty instead of failing the build.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Hosting APIs reject requests without a user agent.
const USER_AGENT: &str = concat!("folio/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum GistError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected HTTP status {0}")]
    Status(reqwest::StatusCode),
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Gist {
    /// Gists may have no description; `null` reads as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    pub html_url: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Parse a gist list response, keeping at most `max` entries.
pub fn parse_gists(body: &str, max: usize) -> Vec<Gist> {
    let gists: Vec<Gist> = match serde_json::from_str(body) {
        Ok(gists) => gists,
        Err(e) => {
            log::error!("Malformed list of gists: {e}");
            return Vec::new();
        }
    };

    if gists.is_empty() {
        log::error!("Empty list of gists");
        return Vec::new();
    }

    log::info!("Gists loaded: {}", gists.len());
    gists.into_iter().take(max).collect()
}

/// Load the gist list from a URL or a local JSON file.
///
/// `root` anchors relative file paths. Never fails: every error is logged and
/// yields an empty list.
pub fn fetch_gists(source: &str, root: &Path, max: usize) -> Vec<Gist> {
    match load_body(source, root) {
        Ok(body) => parse_gists(&body, max),
        Err(e) => {
            log::error!("Could not load gists from {source}: {e}");
            Vec::new()
        }
    }
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Raw response body of `source`, without parsing it.
pub fn load_body(source: &str, root: &Path) -> Result<String, GistError> {
    if is_remote(source) {
        return fetch_remote(source);
    }
    let path = root.join(source);
    std::fs::read_to_string(&path).map_err(|source| GistError::Read { path, source })
}

fn fetch_remote(url: &str) -> Result<String, GistError> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build()?;
    let response = client.get(url).send()?;
    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(GistError::Status(status));
    }
    Ok(response.text()?)
}
