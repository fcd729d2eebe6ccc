//! Homepage generation.
//!
//! The homepage shows three listings, each built from its own source:
//!
//! - **Articles** from `articles.data` (title, date, description, url)
//! - **Projects** from `projects.data` (title, url, description, image url)
//! - **Gists** from a remote JSON list (description, html_url)
//!
//! The three loads are independent, so they run concurrently on the rayon
//! pool. Once all three are in, one element per record is appended to each
//! listing container. The container ids and element classes are stable so
//! site stylesheets can target them:
//!
//! ```text
//! ul#articles-container > li > a.article-url > .article-title, .article-date, .article-description
//! div#projects-container > a.project > .project-image, .project-title, .project-description
//! ul#gists-container > li > a.gist-url > .gist-description
//! ```
//!
//! A source that fails to load is logged and rendered as an empty listing;
//! the page is still written.

use crate::config::{HomepageConfig, SiteConfig, SiteInfo};
use crate::gists::{self, Gist};
use crate::summaries::{self, ArticleSummary, ProjectSummary, SummaryList, SummaryRecord};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CSS: &str = include_str!("../static/home.css");

#[derive(Error, Debug)]
pub enum HomepageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything the homepage displays.
#[derive(Debug, Default)]
pub struct HomepageData {
    pub articles: SummaryList<ArticleSummary>,
    pub projects: SummaryList<ProjectSummary>,
    pub gists: Vec<Gist>,
}

/// What [`build_homepage`] wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomepageReport {
    pub output: PathBuf,
    pub articles: usize,
    pub projects: usize,
    pub gists: usize,
    /// Malformed summary blocks left out of the listings.
    pub skipped: usize,
}

/// Load all three listing sources concurrently.
pub fn load_sources(root: &Path, config: &HomepageConfig) -> HomepageData {
    let ((articles, projects), gists) = rayon::join(
        || {
            rayon::join(
                || load_listing::<ArticleSummary>(root, &config.articles_file, config.max_articles),
                || load_listing::<ProjectSummary>(root, &config.projects_file, config.max_projects),
            )
        },
        || {
            if config.gists_source.trim().is_empty() {
                Vec::new()
            } else {
                gists::fetch_gists(config.gists_source.trim(), root, config.max_gists)
            }
        },
    );

    HomepageData {
        articles,
        projects,
        gists,
    }
}

fn load_listing<T: SummaryRecord>(root: &Path, file: &str, max: usize) -> SummaryList<T> {
    match summaries::load_summaries::<T>(&root.join(file), max) {
        Ok(list) => {
            log::info!("{} summaries loaded: {}", T::KIND, list.total_blocks);
            list
        }
        Err(e) => {
            log::error!("{e}");
            SummaryList::default()
        }
    }
}

/// Load, render, and write the homepage to `output`.
pub fn build_homepage(
    root: &Path,
    output: &Path,
    config: &SiteConfig,
) -> Result<HomepageReport, HomepageError> {
    let data = load_sources(root, &config.homepage);
    let page = render_homepage(&data, &config.site);

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, page.into_string())?;

    Ok(HomepageReport {
        output: output.to_path_buf(),
        articles: data.articles.records.len(),
        projects: data.projects.records.len(),
        gists: data.gists.len(),
        skipped: data.articles.skipped + data.projects.skipped,
    })
}

// ============================================================================
// HTML Components
// ============================================================================

fn article_item(article: &ArticleSummary) -> Markup {
    html! {
        li {
            a.article-url href=(article.url) {
                span.article-title { (article.title) }
                span.article-date { (article.date) }
                p.article-description { (article.description) }
            }
        }
    }
}

fn project_card(project: &ProjectSummary) -> Markup {
    let background = format!("background: url({}) center", project.image_url);
    html! {
        a.project href=(project.url) {
            div.project-image style=(background) {}
            span.project-title { (project.title) }
            span.project-description { (project.description) }
        }
    }
}

fn gist_item(gist: &Gist) -> Markup {
    html! {
        li {
            a.gist-url href=(gist.html_url) target="_blank" rel="noopener" {
                span.gist-description { (gist.description) }
            }
        }
    }
}

/// Renders the full homepage document.
pub fn render_homepage(data: &HomepageData, site: &SiteInfo) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (site.title) }
                @if !site.description.is_empty() {
                    meta name="description" content=(site.description);
                }
                style { (PreEscaped(CSS)) }
            }
            body {
                main {
                    h1 { (site.title) }
                    section.articles {
                        h2 { "Articles" }
                        ul #articles-container {
                            @for article in &data.articles.records {
                                (article_item(article))
                            }
                        }
                    }
                    section.projects {
                        h2 { "Projects" }
                        div #projects-container {
                            @for project in &data.projects.records {
                                (project_card(project))
                            }
                        }
                    }
                    section.gists {
                        h2 { "Gists" }
                        ul #gists-container {
                            @for gist in &data.gists {
                                (gist_item(gist))
                            }
                        }
                    }
                }
                @if !site.author.is_empty() {
                    footer { (site.author) }
                }
            }
        }
    }
}
