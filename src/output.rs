//! CLI output formatting for every command.
//!
//! # Output Format
//!
//! ## Home
//!
//! ```text
//! 002 articles
//! 003 projects
//! 002 gists
//!     skipped 1 malformed summary block
//! Home → index.html
//! ```
//!
//! ## Publish
//!
//! One line per completed step, in the order the steps run:
//!
//! ```text
//! > Draft found.
//! > Last modified date is: March 3rd 2018.
//! > Thread id will be 12
//! > Article folder created.
//! > Page title will be "Hello World".
//! > Page description will be "This is the first sentence."
//! > HTML file edited successfully.
//! > JSON info file created.
//! > Committed thread id.
//! Published hello-world → articles/hello-world (thread 12)
//! ```
//!
//! ## Preview
//!
//! ```text
//! Preview → drafts/hello-world/preview.html
//! ```
//!
//! ## Drafts
//!
//! ```text
//! Drafts
//! 001 hello-world
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::article::RenderedArticle;
use crate::homepage::HomepageReport;
use crate::publish::{PublishEvent, PublishReport};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Show `path` relative to `root` when it lives under it.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

// ============================================================================
// Home
// ============================================================================

pub fn format_homepage_report(report: &HomepageReport, root: &Path) -> Vec<String> {
    let mut lines = vec![
        format!("{} articles", format_index(report.articles)),
        format!("{} projects", format_index(report.projects)),
        format!("{} gists", format_index(report.gists)),
    ];
    if report.skipped > 0 {
        lines.push(format!(
            "    skipped {}",
            plural(report.skipped, "malformed summary block")
        ));
    }
    lines.push(format!("Home → {}", display_path(&report.output, root)));
    lines
}

pub fn print_homepage_report(report: &HomepageReport, root: &Path) {
    for line in format_homepage_report(report, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Article
// ============================================================================

/// Summary of a single rendered article. `output` is `None` when the HTML
/// went to stdout.
pub fn format_article_output(article: &RenderedArticle, output: Option<&Path>) -> Vec<String> {
    let mut lines = vec![match &article.title {
        Some(title) => format!("Title: {}", title),
        None => "Title: (none)".to_string(),
    }];
    match &article.description {
        Some(desc) => lines.push(format!("    {}", truncate_desc(desc, 60))),
        None => lines.push("    (no description)".to_string()),
    }
    if let Some(path) = output {
        lines.push(format!("Article → {}", path.display()));
    }
    lines
}

pub fn print_article_output(article: &RenderedArticle, output: Option<&Path>) {
    for line in format_article_output(article, output) {
        println!("{}", line);
    }
}

// ============================================================================
// Preview
// ============================================================================

pub fn format_preview(preview: &Path, root: &Path) -> String {
    format!("Preview → {}", display_path(preview, root))
}

pub fn print_preview(preview: &Path, root: &Path) {
    println!("{}", format_preview(preview, root));
}

// ============================================================================
// Drafts
// ============================================================================

pub fn format_drafts(drafts: &[String]) -> Vec<String> {
    if drafts.is_empty() {
        return vec!["No drafts".to_string()];
    }
    let mut lines = vec!["Drafts".to_string()];
    lines.extend(
        drafts
            .iter()
            .enumerate()
            .map(|(i, name)| format!("{} {}", format_index(i + 1), name)),
    );
    lines
}

pub fn print_drafts(drafts: &[String]) {
    for line in format_drafts(drafts) {
        println!("{}", line);
    }
}

// ============================================================================
// Publish
// ============================================================================

/// Format a single publish progress event as a display line.
pub fn format_publish_event(event: &PublishEvent) -> String {
    match event {
        PublishEvent::DraftFound => "> Draft found.".to_string(),
        PublishEvent::LastModified(date) => format!("> Last modified date is: {}.", date),
        PublishEvent::ThreadId(id) => format!("> Thread id will be {}", id),
        PublishEvent::ArticleFolderCreated => "> Article folder created.".to_string(),
        PublishEvent::PageTitle(title) => format!("> Page title will be \"{}\".", title),
        PublishEvent::PageDescription(Some(desc)) => {
            format!("> Page description will be \"{}\"", truncate_desc(desc, 80))
        }
        PublishEvent::PageDescription(None) => "> No page description found.".to_string(),
        PublishEvent::PageEdited => "> HTML file edited successfully.".to_string(),
        PublishEvent::MetadataSaved => "> JSON info file created.".to_string(),
        PublishEvent::ThreadIdCommitted(_) => "> Committed thread id.".to_string(),
        PublishEvent::RolledBack(_) => {
            "> Destination directory removed. Publishing aborted.".to_string()
        }
        PublishEvent::RollbackFailed(path, reason) => format!(
            "> Could not remove {}: {}. Remove it by hand before publishing again.",
            path.display(),
            reason
        ),
    }
}

pub fn format_publish_report(report: &PublishReport, root: &Path) -> String {
    format!(
        "Published {} → {} (thread {})",
        report.metadata.name,
        display_path(&report.destination, root),
        report.metadata.thread_id
    )
}

pub fn print_publish_report(report: &PublishReport, root: &Path) {
    println!("{}", format_publish_report(report, root));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publish::ArticleMetadata;
    use std::path::PathBuf;

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn truncate_desc_short() {
        assert_eq!(truncate_desc("Short text", 40), "Short text");
    }

    #[test]
    fn truncate_desc_exact() {
        let text = "a".repeat(40);
        assert_eq!(truncate_desc(&text, 40), text);
    }

    #[test]
    fn truncate_desc_long() {
        let text = "a".repeat(50);
        let expected = format!("{}...", "a".repeat(40));
        assert_eq!(truncate_desc(&text, 40), expected);
    }

    #[test]
    fn truncate_desc_multibyte() {
        assert_eq!(truncate_desc("héllo wörld", 4), "héll...");
    }

    #[test]
    fn display_path_relative_to_root() {
        let root = Path::new("/site");
        assert_eq!(
            display_path(Path::new("/site/articles/x"), root),
            "articles/x"
        );
        assert_eq!(display_path(Path::new("/elsewhere"), root), "/elsewhere");
    }

    // =========================================================================
    // Home
    // =========================================================================

    fn report(skipped: usize) -> HomepageReport {
        HomepageReport {
            output: PathBuf::from("/site/index.html"),
            articles: 2,
            projects: 3,
            gists: 0,
            skipped,
        }
    }

    #[test]
    fn homepage_report_lines() {
        let lines = format_homepage_report(&report(0), Path::new("/site"));
        assert_eq!(
            lines,
            [
                "002 articles",
                "003 projects",
                "000 gists",
                "Home → index.html"
            ]
        );
    }

    #[test]
    fn homepage_report_mentions_skipped_blocks() {
        let lines = format_homepage_report(&report(1), Path::new("/site"));
        assert_eq!(lines[3], "    skipped 1 malformed summary block");
        let lines = format_homepage_report(&report(2), Path::new("/site"));
        assert_eq!(lines[3], "    skipped 2 malformed summary blocks");
    }

    // =========================================================================
    // Article
    // =========================================================================

    #[test]
    fn article_output_with_metadata() {
        let article = RenderedArticle {
            html: String::new(),
            title: Some("Brushing".into()),
            description: Some("Selecting ranges.".into()),
        };
        let lines = format_article_output(&article, Some(Path::new("out.html")));
        assert_eq!(
            lines,
            ["Title: Brushing", "    Selecting ranges.", "Article → out.html"]
        );
    }

    #[test]
    fn article_output_without_metadata() {
        let article = RenderedArticle {
            html: String::new(),
            title: None,
            description: None,
        };
        let lines = format_article_output(&article, None);
        assert_eq!(lines, ["Title: (none)", "    (no description)"]);
    }

    // =========================================================================
    // Preview
    // =========================================================================

    #[test]
    fn preview_line_is_relative_to_root() {
        assert_eq!(
            format_preview(
                Path::new("/site/drafts/hello-world/preview.html"),
                Path::new("/site")
            ),
            "Preview → drafts/hello-world/preview.html"
        );
    }

    // =========================================================================
    // Drafts
    // =========================================================================

    #[test]
    fn drafts_numbered() {
        let drafts = vec!["a-post".to_string(), "b-post".to_string()];
        assert_eq!(
            format_drafts(&drafts),
            ["Drafts", "001 a-post", "002 b-post"]
        );
    }

    #[test]
    fn no_drafts() {
        assert_eq!(format_drafts(&[]), ["No drafts"]);
    }

    // =========================================================================
    // Publish
    // =========================================================================

    #[test]
    fn publish_event_lines() {
        assert_eq!(format_publish_event(&PublishEvent::DraftFound), "> Draft found.");
        assert_eq!(
            format_publish_event(&PublishEvent::LastModified("March 3rd 2018".into())),
            "> Last modified date is: March 3rd 2018."
        );
        assert_eq!(
            format_publish_event(&PublishEvent::ThreadId(12)),
            "> Thread id will be 12"
        );
        assert_eq!(
            format_publish_event(&PublishEvent::PageTitle("Hello".into())),
            "> Page title will be \"Hello\"."
        );
        assert_eq!(
            format_publish_event(&PublishEvent::PageDescription(None)),
            "> No page description found."
        );
        assert_eq!(
            format_publish_event(&PublishEvent::RolledBack(PathBuf::from("x"))),
            "> Destination directory removed. Publishing aborted."
        );
    }

    #[test]
    fn rollback_failure_names_the_folder() {
        let line = format_publish_event(&PublishEvent::RollbackFailed(
            PathBuf::from("articles/x"),
            "permission denied".into(),
        ));
        assert!(line.contains("articles/x"));
        assert!(line.contains("permission denied"));
    }

    #[test]
    fn publish_report_line() {
        let report = PublishReport {
            destination: PathBuf::from("/site/articles/hello-world"),
            metadata: ArticleMetadata {
                name: "hello-world".into(),
                thread_id: 12,
                thread_page_url: "https://example.com/articles/hello-world".into(),
                last_modified_date: "2018-03-03T00:00:00.000Z".into(),
                last_modified_date_display: "March 3rd 2018".into(),
            },
            title: Some("Hello World".into()),
            description: None,
        };
        assert_eq!(
            format_publish_report(&report, Path::new("/site")),
            "Published hello-world → articles/hello-world (thread 12)"
        );
    }
}
