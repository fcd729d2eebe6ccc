//! Draft publishing.
//!
//! Promotes `drafts/<name>/` into `articles/<name>/` as a strict sequence of
//! steps. Each step must succeed before the next one runs:
//!
//! ```text
//! 1. check draft      drafts/<name>/ exists
//! 2. last modified    mtime of drafts/<name>/index.md
//! 3. thread id        read from the counter file
//! 4. copy             drafts/<name>/ → articles/<name>/   (must not exist yet)
//! 5. edit page        fill articles/<name>/index.html and comments script
//! 6. metadata         write articles/<name>/article.json
//! 7. commit id        write thread id + 1 to the counter file
//! ```
//!
//! ## Failure and rollback
//!
//! Steps 1–3 only read, so failing there leaves nothing behind. Once step 4
//! has started creating the destination, any failure removes the whole
//! destination tree again, along with an `articles/` folder the run had to
//! create. The counter is written last, through a staging file renamed over
//! it, so a failed publish never consumes a thread id. A destination that already exists is a
//! conflict reported before anything is copied; it is never touched.
//!
//! There is no locking: publishing is a manual step run by one person.

use crate::article::{self, RenderOptions, RenderedArticle};
use crate::config::PublishConfig;
use crate::template::{self, PageFill, TemplateError};
use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::mpsc::Sender;
use std::time::SystemTime;
use thiserror::Error;
use walkdir::WalkDir;

/// Markdown source inside every draft.
pub const ARTICLE_SOURCE: &str = "index.md";
/// Page layout inside every draft; filled in place after the copy.
pub const ARTICLE_PAGE: &str = "index.html";
/// Metadata side-file written into the published article.
pub const METADATA_FILENAME: &str = "article.json";
/// Preview output written into the draft; never published.
pub const PREVIEW_FILENAME: &str = "preview.html";

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("invalid draft name {0:?}: expected a single folder name not starting with '_'")]
    InvalidDraftName(String),
    #[error("draft not found: {0}")]
    DraftNotFound(PathBuf),
    #[error("cannot read last modified date of {path}: {source}")]
    ModifiedTime {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot read thread id counter {path}: {source}")]
    CounterMissing {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("thread id counter {path} does not hold a number: {value:?}")]
    CounterInvalid { path: PathBuf, value: String },
    #[error("destination already exists: {0}")]
    DestinationExists(PathBuf),
    #[error("error copying draft to {path}: {source}")]
    Copy {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed editing article page: {0}")]
    TemplateEdit(#[from] EditError),
    #[error("failed saving {path}: {source}")]
    MetadataWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("error committing thread id to {path}: {source}")]
    CounterCommit {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Why filling an article page failed.
#[derive(Error, Debug)]
pub enum EditError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Resolved locations of the publishing inputs and outputs.
#[derive(Debug, Clone)]
pub struct SitePaths {
    pub root: PathBuf,
    pub articles_dir: PathBuf,
    pub drafts_dir: PathBuf,
    pub counter_file: PathBuf,
}

impl SitePaths {
    pub fn new(root: &Path, config: &PublishConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            articles_dir: root.join(&config.articles_dir),
            drafts_dir: root.join(&config.drafts_dir),
            counter_file: root.join(&config.counter_file),
        }
    }

    pub fn draft(&self, name: &str) -> PathBuf {
        self.drafts_dir.join(name)
    }

    pub fn article(&self, name: &str) -> PathBuf {
        self.articles_dir.join(name)
    }
}

/// Metadata side-file of a published article. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleMetadata {
    pub name: String,
    pub thread_id: u64,
    pub thread_page_url: String,
    /// UTC, `YYYY-MM-DDTHH:MM:SS.mmmZ`.
    pub last_modified_date: String,
    /// Local date, e.g. "March 3rd 2018".
    pub last_modified_date_display: String,
}

/// Machine and human forms of a modification time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    pub iso: String,
    pub display: String,
}

impl Timestamp {
    pub fn from_system_time(time: SystemTime) -> Self {
        let utc: DateTime<Utc> = time.into();
        let local: DateTime<Local> = time.into();
        Self {
            iso: utc.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            display: display_date(local.date_naive()),
        }
    }
}

/// Progress of a publish run, one event per completed step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishEvent {
    DraftFound,
    LastModified(String),
    ThreadId(u64),
    ArticleFolderCreated,
    PageTitle(String),
    /// `None` when the article has no usable first paragraph.
    PageDescription(Option<String>),
    PageEdited,
    MetadataSaved,
    ThreadIdCommitted(u64),
    RolledBack(PathBuf),
    RollbackFailed(PathBuf, String),
}

/// Outcome of a successful publish.
#[derive(Debug, Clone)]
pub struct PublishReport {
    pub destination: PathBuf,
    pub metadata: ArticleMetadata,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Format a date as `MMMM Do YYYY`, e.g. "October 21st 2015".
pub fn display_date(date: NaiveDate) -> String {
    let day = date.day();
    let suffix = match day {
        11..=13 => "th",
        d if d % 10 == 1 => "st",
        d if d % 10 == 2 => "nd",
        d if d % 10 == 3 => "rd",
        _ => "th",
    };
    format!("{} {day}{suffix} {}", date.format("%B"), date.year())
}

fn send(progress: &Option<Sender<PublishEvent>>, event: PublishEvent) {
    if let Some(tx) = progress {
        // A dropped receiver only means nobody is watching.
        let _ = tx.send(event);
    }
}

/// Reject anything but a single plain folder name; `_`-prefixed folders are
/// draft templates.
fn validate_draft_name(name: &str) -> Result<(), PublishError> {
    let mut components = Path::new(name).components();
    let single = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single || name.starts_with('_') || name.starts_with('.') {
        return Err(PublishError::InvalidDraftName(name.to_string()));
    }
    Ok(())
}

/// Publish `drafts/<name>` into `articles/<name>`.
pub fn publish(
    paths: &SitePaths,
    config: &PublishConfig,
    name: &str,
    progress: Option<Sender<PublishEvent>>,
) -> Result<PublishReport, PublishError> {
    // 1. draft folder
    validate_draft_name(name)?;
    let draft_dir = paths.draft(name);
    if !draft_dir.is_dir() {
        return Err(PublishError::DraftNotFound(draft_dir));
    }
    send(&progress, PublishEvent::DraftFound);

    // 2. last modified date
    let modified = last_modified(&draft_dir.join(ARTICLE_SOURCE))?;
    send(&progress, PublishEvent::LastModified(modified.display.clone()));

    // 3. next thread id
    let thread_id = read_counter(&paths.counter_file)?;
    send(&progress, PublishEvent::ThreadId(thread_id));

    // 4. copy
    let destination = paths.article(name);
    if destination.exists() {
        return Err(PublishError::DestinationExists(destination));
    }
    let created = create_destination(&destination).map_err(|source| PublishError::Copy {
        path: destination.clone(),
        source,
    })?;
    if let Err(source) = copy_tree(&draft_dir, &destination) {
        rollback(&created, &progress);
        return Err(PublishError::Copy {
            path: destination,
            source,
        });
    }
    send(&progress, PublishEvent::ArticleFolderCreated);

    // 5–7 run against the copy; any failure removes it.
    let thread_page_url = config.page_url(name);
    let metadata = ArticleMetadata {
        name: name.to_string(),
        thread_id,
        thread_page_url,
        last_modified_date: modified.iso,
        last_modified_date_display: modified.display,
    };
    match finish(paths, config, &destination, &metadata, &progress) {
        Ok(rendered) => Ok(PublishReport {
            destination,
            metadata,
            title: rendered.title,
            description: rendered.description,
        }),
        Err(e) => {
            rollback(&created, &progress);
            Err(e)
        }
    }
}

fn finish(
    paths: &SitePaths,
    config: &PublishConfig,
    destination: &Path,
    metadata: &ArticleMetadata,
    progress: &Option<Sender<PublishEvent>>,
) -> Result<RenderedArticle, PublishError> {
    // 5. page
    let rendered = edit_article_page(destination, config, metadata)?;
    send(
        progress,
        PublishEvent::PageTitle(rendered.title.clone().unwrap_or_default()),
    );
    send(
        progress,
        PublishEvent::PageDescription(rendered.description.clone()),
    );
    send(progress, PublishEvent::PageEdited);

    // 6. metadata
    let metadata_path = destination.join(METADATA_FILENAME);
    write_metadata(&metadata_path, metadata).map_err(|source| PublishError::MetadataWrite {
        path: metadata_path.clone(),
        source,
    })?;
    send(progress, PublishEvent::MetadataSaved);

    // 7. counter
    let next = metadata.thread_id + 1;
    commit_counter(&paths.counter_file, next).map_err(|source| PublishError::CounterCommit {
        path: paths.counter_file.clone(),
        source,
    })?;
    send(progress, PublishEvent::ThreadIdCommitted(next));

    Ok(rendered)
}

fn rollback(destination: &Path, progress: &Option<Sender<PublishEvent>>) {
    if !destination.exists() {
        return;
    }
    match fs::remove_dir_all(destination) {
        Ok(()) => send(progress, PublishEvent::RolledBack(destination.to_path_buf())),
        Err(e) => {
            log::error!("could not remove {}: {e}", destination.display());
            send(
                progress,
                PublishEvent::RollbackFailed(destination.to_path_buf(), e.to_string()),
            );
        }
    }
}

fn last_modified(source: &Path) -> Result<Timestamp, PublishError> {
    let modified = fs::metadata(source)
        .and_then(|m| m.modified())
        .map_err(|e| PublishError::ModifiedTime {
            path: source.to_path_buf(),
            source: e,
        })?;
    Ok(Timestamp::from_system_time(modified))
}

/// Read the next available thread id.
pub fn read_counter(path: &Path) -> Result<u64, PublishError> {
    let content = fs::read_to_string(path).map_err(|source| PublishError::CounterMissing {
        path: path.to_path_buf(),
        source,
    })?;
    let value = content.trim();
    value.parse().map_err(|_| PublishError::CounterInvalid {
        path: path.to_path_buf(),
        value: value.to_string(),
    })
}

/// Create the destination folder and any missing parents.
///
/// Returns the outermost folder created, which is what a rollback removes.
/// Fails if the destination already exists, so a concurrent publish can never
/// be rolled back by this one.
fn create_destination(dst: &Path) -> io::Result<PathBuf> {
    let outermost = dst
        .ancestors()
        .take_while(|p| !p.as_os_str().is_empty() && !p.exists())
        .last()
        .unwrap_or(dst)
        .to_path_buf();
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::create_dir(dst)?;
    Ok(outermost)
}

/// Temporary file the counter is staged in before it replaces the real one.
fn counter_staging_path(counter: &Path) -> PathBuf {
    let name = counter
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    counter.with_file_name(format!(".{name}.tmp"))
}

/// Write the counter through a staging file and rename it into place, so the
/// counter holds either the old or the new value.
fn commit_counter(counter: &Path, next: u64) -> io::Result<()> {
    let staging = counter_staging_path(counter);
    if let Err(e) = fs::write(&staging, next.to_string()) {
        let _ = fs::remove_file(&staging);
        return Err(e);
    }
    fs::rename(&staging, counter).inspect_err(|_| {
        let _ = fs::remove_file(&staging);
    })
}

/// Copy the contents of `src` into the empty folder `dst`. Previews stay behind.
fn copy_tree(src: &Path, dst: &Path) -> io::Result<()> {
    for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        if relative == Path::new(PREVIEW_FILENAME) {
            continue;
        }
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

fn read(path: &Path) -> Result<String, EditError> {
    fs::read_to_string(path).map_err(|source| EditError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, contents: &str) -> Result<(), EditError> {
    fs::write(path, contents).map_err(|source| EditError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Fill the copied page and comments script in place.
fn edit_article_page(
    article_dir: &Path,
    config: &PublishConfig,
    metadata: &ArticleMetadata,
) -> Result<RenderedArticle, EditError> {
    let script_path = article_dir.join(&config.comments_script);
    let script = template::fill_comments_script(
        &read(&script_path)?,
        &metadata.thread_page_url,
        metadata.thread_id,
    )?;

    let page_path = article_dir.join(ARTICLE_PAGE);
    let (page, rendered) = render_page(
        article_dir,
        &metadata.last_modified_date_display,
        &script,
    )?;

    // Keep the filled script alongside the page for later reference.
    write(&script_path, &script)?;
    write(&page_path, &page)?;
    Ok(rendered)
}

/// Render `index.md` into the `index.html` layout of `dir`.
fn render_page(
    dir: &Path,
    last_updated: &str,
    comments_script: &str,
) -> Result<(String, RenderedArticle), EditError> {
    let markdown = read(&dir.join(ARTICLE_SOURCE))?;
    let layout = read(&dir.join(ARTICLE_PAGE))?;

    let rendered = article::render_article(
        &markdown,
        &RenderOptions {
            last_updated: Some(last_updated.to_string()),
        },
    );
    if rendered.description.is_none() {
        log::warn!("no page description found in {}", dir.display());
    }

    let page = template::fill_page(
        &layout,
        &PageFill {
            title: rendered.title.as_deref().unwrap_or_default(),
            description: rendered.description.as_deref().unwrap_or_default(),
            contents: &rendered.html,
            comments_script,
        },
    )?;
    Ok((page, rendered))
}

fn write_metadata(path: &Path, metadata: &ArticleMetadata) -> io::Result<()> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    metadata.serialize(&mut serializer).map_err(io::Error::other)?;
    fs::write(path, out)
}

/// Draft folders available for publishing, sorted by name.
pub fn list_drafts(drafts_dir: &Path) -> Result<Vec<String>, PublishError> {
    let mut drafts: Vec<String> = fs::read_dir(drafts_dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| !name.starts_with('_') && !name.starts_with('.'))
        .collect();
    drafts.sort();
    Ok(drafts)
}

/// Render a draft through its own layout into `drafts/<name>/preview.html`.
///
/// The comment thread is left out and nothing outside the draft is touched.
pub fn preview_draft(paths: &SitePaths, name: &str) -> Result<PathBuf, PublishError> {
    validate_draft_name(name)?;
    let draft_dir = paths.draft(name);
    if !draft_dir.is_dir() {
        return Err(PublishError::DraftNotFound(draft_dir));
    }
    let modified = last_modified(&draft_dir.join(ARTICLE_SOURCE))?;
    let (page, _) = render_page(&draft_dir, &modified.display, "")?;
    let output = draft_dir.join(PREVIEW_FILENAME);
    write(&output, &page)?;
    Ok(output)
}
