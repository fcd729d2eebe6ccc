//! Shared test utilities for the folio test suite.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_site();
//! let paths = SitePaths::new(tmp.path(), &PublishConfig::default());
//! let before = counter_value(&paths);
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::publish::SitePaths;

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_site() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    for entry in WalkDir::new(&fixtures).min_depth(1) {
        let entry = entry.unwrap();
        let target = tmp.path().join(entry.path().strip_prefix(&fixtures).unwrap());
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).unwrap();
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
    tmp
}

/// Current value of the thread id counter. Panics if unreadable.
pub fn counter_value(paths: &SitePaths) -> u64 {
    let raw = fs::read_to_string(&paths.counter_file)
        .unwrap_or_else(|e| panic!("counter {} unreadable: {e}", paths.counter_file.display()));
    raw.trim()
        .parse()
        .unwrap_or_else(|_| panic!("counter holds {raw:?}, not a number"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_site_copies_nested_fixture_files() {
        let tmp = setup_site();
        assert!(tmp.path().join("drafts/hello-world/assets/diagram.svg").is_file());
        assert!(tmp.path().join("drafts/_template/index.md").is_file());
        assert!(tmp.path().join("articles/older-post/article.json").is_file());
    }
}
