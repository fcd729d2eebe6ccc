//! # Folio
//!
//! Build tool for a small personal website: a homepage of articles, projects
//! and gists, Markdown article pages, and a publishing step that promotes a
//! draft folder into the published articles tree.
//!
//! Everything is rendered ahead of time. The homepage and article pages are
//! plain HTML files with their listings and metadata already filled in.
//!
//! ```text
//! folio home               articles.data + projects.data + gists  →  index.html
//! folio article FILE       index.md                               →  HTML fragment
//! folio preview DRAFT      drafts/DRAFT/                          →  drafts/DRAFT/preview.html
//! folio publish DRAFT      drafts/DRAFT/                          →  articles/DRAFT/
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `site.toml` loading, validation, and stock defaults |
//! | [`summaries`] | Blank-line separated article and project summary lists |
//! | [`gists`] | Gist list fetching (HTTP or local file) and parsing |
//! | [`homepage`] | Concurrent source loading and homepage rendering with Maud |
//! | [`article`] | Markdown rendering plus title and description extraction |
//! | [`template`] | Placeholder filling for draft page layouts and comment scripts |
//! | [`publish`] | The draft → article pipeline with rollback, drafts listing, previews |
//! | [`output`] | CLI output formatting |
//!
//! # Publishing
//!
//! Publishing is a strict sequence: find the draft, read its modification
//! time, read the next comment-thread id, copy the folder, fill the page,
//! write `article.json`, then bump the counter. Once the copy has started, a
//! failure removes the copied folder. The counter is only written on success,
//! so a failed publish never consumes a thread id. See [`publish`].
//!
//! # Failure Isolation on the Homepage
//!
//! The three homepage sources load concurrently and independently. A source
//! that cannot be read is logged and rendered as an empty listing; it never
//! prevents the other two from rendering.

pub mod article;
pub mod config;
pub mod gists;
pub mod homepage;
pub mod output;
pub mod publish;
pub mod summaries;
pub mod template;

#[cfg(test)]
pub(crate) mod test_helpers;
