//! Line-delimited summary lists for the homepage.
//!
//! Articles and projects are listed without a database: each list is a plain
//! text file of records separated by a blank line, one field per line, in a
//! fixed order per list type.
//!
//! ```text
//! Brushing with D3          ← article: title
//! March 3rd 2018            ←          date
//! Selecting ranges on a...  ←          description
//! /articles/d3-brush/       ←          url
//!
//! Next article title
//! ...
//! ```
//!
//! Projects use `title, url, description, image url`.
//!
//! ## Malformed blocks
//!
//! A block whose line count does not match the record's field count is
//! skipped with a warning. The rest of the list still renders.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A record decoded from one blank-line-delimited block.
pub trait SummaryRecord: Sized {
    /// Label used in log and console output ("article", "project").
    const KIND: &'static str;
    /// Number of lines per block.
    const FIELDS: usize;

    /// Build a record from exactly [`Self::FIELDS`] lines, in file order.
    fn from_fields(fields: &[&str]) -> Self;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleSummary {
    pub title: String,
    /// Display string, shown as written.
    pub date: String,
    pub description: String,
    pub url: String,
}

impl SummaryRecord for ArticleSummary {
    const KIND: &'static str = "article";
    const FIELDS: usize = 4;

    fn from_fields(fields: &[&str]) -> Self {
        Self {
            title: fields[0].to_string(),
            date: fields[1].to_string(),
            description: fields[2].to_string(),
            url: fields[3].to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    pub title: String,
    pub url: String,
    pub description: String,
    pub image_url: String,
}

impl SummaryRecord for ProjectSummary {
    const KIND: &'static str = "project";
    const FIELDS: usize = 4;

    fn from_fields(fields: &[&str]) -> Self {
        Self {
            title: fields[0].to_string(),
            url: fields[1].to_string(),
            description: fields[2].to_string(),
            image_url: fields[3].to_string(),
        }
    }
}

/// Result of parsing a summary list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryList<T> {
    /// Records to display, in file order, at most `max`.
    pub records: Vec<T>,
    /// Non-empty blocks in the whole input, including those past `max`.
    pub total_blocks: usize,
    /// Malformed blocks within the displayed range.
    pub skipped: usize,
}

impl<T> Default for SummaryList<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            total_blocks: 0,
            skipped: 0,
        }
    }
}

/// Iterator over the non-empty blank-line-separated blocks of a list.
struct Blocks<'a> {
    lines: std::str::Lines<'a>,
}

impl<'a> Iterator for Blocks<'a> {
    type Item = Vec<&'a str>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut block = Vec::new();
        for line in self.lines.by_ref() {
            if line.trim().is_empty() {
                if block.is_empty() {
                    continue;
                }
                return Some(block);
            }
            block.push(line.trim());
        }
        (!block.is_empty()).then_some(block)
    }
}

fn blocks(data: &str) -> Blocks<'_> {
    Blocks { lines: data.lines() }
}

/// Parse a blank-line-delimited list, keeping at most `max` records.
pub fn parse_summaries<T: SummaryRecord>(data: &str, max: usize) -> SummaryList<T> {
    let mut list = SummaryList::default();

    for (index, block) in blocks(data).enumerate() {
        list.total_blocks += 1;
        if index >= max {
            continue;
        }
        if block.len() != T::FIELDS {
            log::warn!(
                "skipping {} #{}: expected {} lines, found {}",
                T::KIND,
                index + 1,
                T::FIELDS,
                block.len()
            );
            list.skipped += 1;
            continue;
        }
        list.records.push(T::from_fields(&block));
    }

    list
}

/// Read and parse a summary list file.
pub fn load_summaries<T: SummaryRecord>(
    path: &Path,
    max: usize,
) -> Result<SummaryList<T>, SummaryError> {
    let data = fs::read_to_string(path).map_err(|source| SummaryError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_summaries(&data, max))
}
