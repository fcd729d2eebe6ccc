//! Markdown article rendering.
//!
//! Renders an article's `index.md` to HTML and derives the page metadata from
//! the rendered content:
//!
//! - **Title**: text of the first level-1 heading.
//! - **Description**: first phrase of the first paragraph, i.e. everything up
//!   to the first `.`, with the period kept.
//!
//! Both are read off the pulldown-cmark event stream while rendering, so the
//! metadata always matches what ends up on the page.
//!
//! Code blocks are emitted as `<pre class="hljs"><code class="language-*">`.
//! Highlighting itself happens in the page, driven by those classes.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};

/// Output of [`render_article`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArticle {
    pub html: String,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Display date for the "Last updated" line placed under the first H1.
    pub last_updated: Option<String>,
}

/// Where the metadata scanner currently is in the event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    None,
    Title,
    Paragraph,
}

pub fn render_article(markdown: &str, options: &RenderOptions) -> RenderedArticle {
    let parser_options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let parser = Parser::new_ext(markdown, parser_options);

    let mut events = Vec::new();
    let mut capture = Capture::None;
    let mut title: Option<String> = None;
    let mut paragraph: Option<String> = None;
    let mut buffer = String::new();

    for event in parser {
        match &event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) if title.is_none() && capture == Capture::None => {
                capture = Capture::Title;
                buffer.clear();
            }
            Event::End(TagEnd::Heading(HeadingLevel::H1)) if capture == Capture::Title => {
                capture = Capture::None;
                title = Some(buffer.trim().to_string());
                events.push(event);
                if let Some(date) = &options.last_updated {
                    events.push(Event::Html(last_updated_html(date).into()));
                }
                continue;
            }
            Event::Start(Tag::Paragraph) if paragraph.is_none() && capture == Capture::None => {
                capture = Capture::Paragraph;
                buffer.clear();
            }
            Event::End(TagEnd::Paragraph) if capture == Capture::Paragraph => {
                capture = Capture::None;
                paragraph = Some(std::mem::take(&mut buffer));
            }
            Event::Text(text) | Event::Code(text) if capture != Capture::None => {
                buffer.push_str(text);
            }
            Event::SoftBreak | Event::HardBreak if capture != Capture::None => {
                buffer.push(' ');
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                events.push(Event::Html(code_block_open(kind).into()));
                continue;
            }
            Event::End(TagEnd::CodeBlock) => {
                events.push(Event::Html("</code></pre>\n".into()));
                continue;
            }
            _ => {}
        }
        events.push(event);
    }

    let mut body = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut body, events.into_iter());

    RenderedArticle {
        html: body,
        title,
        description: paragraph.as_deref().and_then(first_phrase),
    }
}

/// First run of characters that are not `.`, with a period appended.
///
/// `"Example sentence. More text."` → `"Example sentence."`
pub fn first_phrase(text: &str) -> Option<String> {
    text.split('.')
        .find(|run| !run.is_empty())
        .filter(|run| !run.trim().is_empty())
        .map(|run| format!("{run}."))
}

fn last_updated_html(date: &str) -> String {
    let line = maud::html! { p.last-updated { "Last updated " (date) } };
    format!("{}\n", line.into_string())
}

fn code_block_open(kind: &CodeBlockKind) -> String {
    let lang = match kind {
        CodeBlockKind::Fenced(info) => info.split_whitespace().next().unwrap_or(""),
        CodeBlockKind::Indented => "",
    };
    if lang.is_empty() {
        "<pre class=\"hljs\"><code>".to_string()
    } else {
        let class = maud::html! { (lang) }.into_string();
        format!("<pre class=\"hljs\"><code class=\"language-{class}\">")
    }
}
