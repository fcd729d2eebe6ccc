//! Article page template filling.
//!
//! Every draft carries its own `index.html` layout and a comment-thread embed
//! script. Publishing fills both by plain token substitution:
//!
//! | Token | File | Replaced with |
//! |-------|------|---------------|
//! | `#PAGE_TITLE#` | `index.html` | first H1 text (escaped) |
//! | `#PAGE_DESCRIPTION#` | `index.html` | first phrase of the first paragraph (escaped) |
//! | `#ARTICLE_CONTENTS#` | `index.html` | rendered article HTML (required) |
//! | `#COMMENTS_SCRIPT#` | `index.html` | the filled comments script |
//! | `#THREAD_PAGE_URL#` | comments script | public URL of the article |
//! | `#THREAD_IDENTIFIER#` | comments script | numeric comment-thread id |
//!
//! Draft layouts may also load development helpers (live Markdown preview and
//! the like) with `<script data-dev-dependency …>`. Those elements are
//! removed from the published page.

use maud::html;
use thiserror::Error;

pub const PAGE_TITLE: &str = "#PAGE_TITLE#";
pub const PAGE_DESCRIPTION: &str = "#PAGE_DESCRIPTION#";
pub const ARTICLE_CONTENTS: &str = "#ARTICLE_CONTENTS#";
pub const COMMENTS_SCRIPT: &str = "#COMMENTS_SCRIPT#";
pub const THREAD_PAGE_URL: &str = "#THREAD_PAGE_URL#";
pub const THREAD_IDENTIFIER: &str = "#THREAD_IDENTIFIER#";

const DEV_MARKER: &str = "data-dev-dependency";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TemplateError {
    #[error("{file} is missing the {token} placeholder")]
    MissingToken {
        file: &'static str,
        token: &'static str,
    },
}

/// Values substituted into a page template.
#[derive(Debug, Clone, Default)]
pub struct PageFill<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub contents: &'a str,
    /// Inlined comments script; empty for previews.
    pub comments_script: &'a str,
}

/// Fill the comment-thread tokens of an embed script.
pub fn fill_comments_script(
    script: &str,
    page_url: &str,
    thread_id: u64,
) -> Result<String, TemplateError> {
    for token in [THREAD_PAGE_URL, THREAD_IDENTIFIER] {
        if !script.contains(token) {
            return Err(TemplateError::MissingToken {
                file: "comments script",
                token,
            });
        }
    }
    let thread_id = thread_id.to_string();
    Ok(substitute(
        script,
        &[(THREAD_PAGE_URL, page_url), (THREAD_IDENTIFIER, thread_id.as_str())],
    ))
}

/// Fill a page template and drop its development-only scripts.
pub fn fill_page(template: &str, fill: &PageFill<'_>) -> Result<String, TemplateError> {
    if !template.contains(ARTICLE_CONTENTS) {
        return Err(TemplateError::MissingToken {
            file: "index.html",
            token: ARTICLE_CONTENTS,
        });
    }

    let title = html! { (fill.title) }.into_string();
    let description = html! { (fill.description) }.into_string();

    let page = substitute(
        &strip_dev_scripts(template),
        &[
            (PAGE_TITLE, title.as_str()),
            (PAGE_DESCRIPTION, description.as_str()),
            (COMMENTS_SCRIPT, fill.comments_script),
            (ARTICLE_CONTENTS, fill.contents),
        ],
    );
    Ok(page)
}

/// Replace every token of `values` in a single left-to-right pass.
///
/// Inserted values are never scanned again, so token text inside a title,
/// description or article body stays literal.
fn substitute(template: &str, values: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut remaining = template;

    while let Some(at) = remaining.find('#') {
        result.push_str(&remaining[..at]);
        let tail = &remaining[at..];
        match values.iter().find(|(token, _)| tail.starts_with(token)) {
            Some((token, value)) => {
                result.push_str(value);
                remaining = &tail[token.len()..];
            }
            None => {
                result.push('#');
                remaining = &tail[1..];
            }
        }
    }

    result.push_str(remaining);
    result
}

/// Remove every `<script …data-dev-dependency…>…</script>` element.
pub fn strip_dev_scripts(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut remaining = html;

    while let Some(start) = remaining.find("<script") {
        let Some(tag_end) = remaining[start..].find('>').map(|i| start + i) else {
            break;
        };
        let open_tag = &remaining[start..=tag_end];
        let close = remaining[tag_end..]
            .find("</script>")
            .map(|i| tag_end + i + "</script>".len());

        match close {
            Some(end) if open_tag.contains(DEV_MARKER) => {
                result.push_str(remaining[..start].trim_end_matches([' ', '\t']));
                remaining = &remaining[end..];
                // Drop the line break the element leaves behind
                if let Some(rest) = remaining.strip_prefix('\n') {
                    remaining = rest;
                }
            }
            Some(end) => {
                result.push_str(&remaining[..end]);
                remaining = &remaining[end..];
            }
            None => break,
        }
    }

    result.push_str(remaining);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: &str = r##"<html>
<head>
    <title>#PAGE_TITLE#</title>
    <meta name="description" content="#PAGE_DESCRIPTION#">
    <script src="../../vendor/marked.min.js" data-dev-dependency></script>
    <script src="../../js/highlight.js"></script>
</head>
<body>
    <div id="contents">#ARTICLE_CONTENTS#</div>
    <script id="comments-script">#COMMENTS_SCRIPT#</script>
</body>
</html>"##;

    #[test]
    fn fills_all_tokens() {
        let fill = PageFill {
            title: "Brushing",
            description: "Selecting ranges.",
            contents: "<h1>Brushing</h1>",
            comments_script: "var id = 7;",
        };
        let page = fill_page(LAYOUT, &fill).unwrap();
        assert!(page.contains("<title>Brushing</title>"));
        assert!(page.contains(r#"content="Selecting ranges.""#));
        assert!(page.contains(r#"<div id="contents"><h1>Brushing</h1></div>"#));
        assert!(page.contains(r#"<script id="comments-script">var id = 7;</script>"#));
        for token in [PAGE_TITLE, PAGE_DESCRIPTION, ARTICLE_CONTENTS, COMMENTS_SCRIPT] {
            assert!(!page.contains(token), "{token} left in page");
        }
    }

    #[test]
    fn title_and_description_are_escaped() {
        let fill = PageFill {
            title: "<script>alert('x')</script>",
            description: r#"Say "hi"."#,
            contents: "",
            comments_script: "",
        };
        let page = fill_page(LAYOUT, &fill).unwrap();
        assert!(page.contains("<title>&lt;script&gt;"));
        assert!(page.contains("Say &quot;hi&quot;."));
    }

    #[test]
    fn missing_contents_token_is_error() {
        let err = fill_page("<html></html>", &PageFill::default()).unwrap_err();
        assert_eq!(
            err,
            TemplateError::MissingToken {
                file: "index.html",
                token: ARTICLE_CONTENTS
            }
        );
    }

    #[test]
    fn tokens_inside_article_are_not_replaced() {
        let fill = PageFill {
            title: "T",
            contents: "<p>The #PAGE_TITLE# token</p>",
            ..Default::default()
        };
        let page = fill_page(LAYOUT, &fill).unwrap();
        assert!(page.contains("<p>The #PAGE_TITLE# token</p>"));
    }

    #[test]
    fn tokens_inside_title_and_description_are_not_replaced() {
        let fill = PageFill {
            title: "How #ARTICLE_CONTENTS# works",
            description: "About #COMMENTS_SCRIPT#.",
            contents: "<h1>BODY</h1>",
            comments_script: "var id = 7;",
        };
        let page = fill_page(LAYOUT, &fill).unwrap();
        assert!(page.contains("<title>How #ARTICLE_CONTENTS# works</title>"));
        assert!(page.contains(r#"content="About #COMMENTS_SCRIPT#.""#));
        assert!(page.contains(r#"<div id="contents"><h1>BODY</h1></div>"#));
        assert!(page.contains(r#"<script id="comments-script">var id = 7;</script>"#));
        assert_eq!(page.matches("<h1>BODY</h1>").count(), 1);
    }

    #[test]
    fn substitute_keeps_unknown_hashes() {
        let out = substitute("#a #X# ## #Y", &[("#X#", "x")]);
        assert_eq!(out, "#a x ## #Y");
    }

    #[test]
    fn every_contents_slot_is_filled() {
        let layout = "<main>#ARTICLE_CONTENTS#</main><noscript>#ARTICLE_CONTENTS#</noscript>";
        let fill = PageFill {
            contents: "<p>x</p>",
            ..Default::default()
        };
        let page = fill_page(layout, &fill).unwrap();
        assert_eq!(page, "<main><p>x</p></main><noscript><p>x</p></noscript>");
    }

    #[test]
    fn dev_scripts_are_removed() {
        let page = fill_page(LAYOUT, &PageFill::default()).unwrap();
        assert!(!page.contains("marked.min.js"));
        assert!(!page.contains(DEV_MARKER));
        assert!(page.contains("highlight.js"));
        assert!(page.contains("comments-script"));
    }

    #[test]
    fn strip_keeps_everything_else() {
        let html = "<p>a</p>\n<script>keep()</script>\n<script data-dev-dependency>drop()</script>\n<p>b</p>";
        let out = strip_dev_scripts(html);
        assert_eq!(out, "<p>a</p>\n<script>keep()</script>\n<p>b</p>");
    }

    #[test]
    fn strip_without_scripts_is_identity() {
        assert_eq!(strip_dev_scripts("<p>plain</p>"), "<p>plain</p>");
    }

    #[test]
    fn comments_script_tokens() {
        let script = "this.page.url = '#THREAD_PAGE_URL#';\nthis.page.identifier = '#THREAD_IDENTIFIER#';";
        let filled = fill_comments_script(script, "https://example.com/articles/x", 42).unwrap();
        assert!(filled.contains("this.page.url = 'https://example.com/articles/x';"));
        assert!(filled.contains("this.page.identifier = '42';"));
    }

    #[test]
    fn comments_script_missing_token_is_error() {
        let err = fill_comments_script("no tokens", "u", 1).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::MissingToken {
                token: THREAD_PAGE_URL,
                ..
            }
        ));
    }
}
