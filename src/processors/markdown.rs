//! # Markdown Rendering Module
//!
//! Renders Markdown pages to HTML with the extensions the site relies on:
//!
//! - **Raw HTML passthrough**: block and inline HTML reach the output as is
//! - **Automatic linking**: bare `http://`, `https://` and `www.` URLs
//!   become links
//! - **Typographic substitutions**: smart quotes, en and em dashes, ellipses
//! - **Heading anchors**: every heading gets an `id` built by
//!   [`slugify`](crate::slug::slugify), made unique within the page
//! - **Syntax highlighting**: fenced code blocks go through a
//!   [`SyntaxHighlighter`]
//!
//! ## Example Usage
//!
//! ```rust
//! use assetflow::processors::markdown::MarkdownRenderer;
//!
//! let renderer = MarkdownRenderer::new()
//!     .with_html(true)
//!     .with_linkify(true)
//!     .with_heading_anchors(true);
//!
//! let html = renderer.render("## Getting Started (quick)\n\nSee www.example.com").unwrap();
//! assert!(html.contains(r#"<h2 id="getting-started-quick">"#));
//! assert!(html.contains(r#"<a href="http://www.example.com">www.example.com</a>"#));
//! ```

use crate::core::{
    error::{AssetFlowError, Result},
    traits::Processor,
};
use crate::processors::syntax::{escape_html, SyntaxHighlighter};
use crate::slug::slugify;
use pulldown_cmark::{
    html, CodeBlockKind, CowStr, Event, Options as MarkdownOptions,
    Parser, Tag, TagEnd, TextMergeStream,
};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Bare URLs picked up by automatic linking, compiled on first use.
static URL: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r#"(?i)\b(?:https?://|www\.)[^\s<>"]+"#));

/// Trailing characters that end a sentence rather than a URL.
const TRAILING_PUNCTUATION: &[char] =
    &['.', ',', ':', ';', '!', '?', '\'', '"', '*', '_', '~'];

/// Markdown renderer with the site's extensions.
///
/// Every extension is off after [`MarkdownRenderer::new`]; the build
/// configurator switches on the ones the site uses.
#[derive(Debug)]
pub struct MarkdownRenderer {
    options: MarkdownOptions,
    html: bool,
    linkify: bool,
    heading_anchors: bool,
    highlighter: Option<SyntaxHighlighter>,
}

impl MarkdownRenderer {
    /// Creates a renderer with plain CommonMark behaviour and raw HTML
    /// escaped.
    pub fn new() -> Self {
        Self {
            options: MarkdownOptions::empty(),
            html: false,
            linkify: false,
            heading_anchors: false,
            highlighter: None,
        }
    }

    /// Passes raw HTML through when `true`; escapes it otherwise.
    pub fn with_html(mut self, enable: bool) -> Self {
        self.html = enable;
        self
    }

    /// Turns bare URLs into links.
    pub fn with_linkify(mut self, enable: bool) -> Self {
        self.linkify = enable;
        self
    }

    /// Enables smart quotes and dash substitution.
    pub fn with_typographer(mut self, enable: bool) -> Self {
        self.set_option(MarkdownOptions::ENABLE_SMART_PUNCTUATION, enable);
        self
    }

    /// Enables table support.
    pub fn with_tables(mut self, enable: bool) -> Self {
        self.set_option(MarkdownOptions::ENABLE_TABLES, enable);
        self
    }

    /// Enables `~~strikethrough~~`.
    pub fn with_strikethrough(mut self, enable: bool) -> Self {
        self.set_option(MarkdownOptions::ENABLE_STRIKETHROUGH, enable);
        self
    }

    /// Gives every heading a slug `id`.
    pub fn with_heading_anchors(mut self, enable: bool) -> Self {
        self.heading_anchors = enable;
        self
    }

    /// Highlights fenced code blocks with `highlighter`.
    pub fn with_highlighter(mut self, highlighter: SyntaxHighlighter) -> Self {
        self.highlighter = Some(highlighter);
        self
    }

    /// Returns `true` when raw HTML is passed through.
    pub fn html_enabled(&self) -> bool {
        self.html
    }

    /// Returns `true` when bare URLs are linked.
    pub fn linkify_enabled(&self) -> bool {
        self.linkify
    }

    /// Returns `true` when typographic substitutions are on.
    pub fn typographer_enabled(&self) -> bool {
        self.options
            .contains(MarkdownOptions::ENABLE_SMART_PUNCTUATION)
    }

    /// Returns `true` when headings get slug ids.
    pub fn heading_anchors_enabled(&self) -> bool {
        self.heading_anchors
    }

    /// The configured highlighter, if any.
    pub fn highlighter(&self) -> Option<&SyntaxHighlighter> {
        self.highlighter.as_ref()
    }

    fn set_option(&mut self, option: MarkdownOptions, enable: bool) {
        if enable {
            self.options.insert(option);
        } else {
            self.options.remove(option);
        }
    }

    /// Renders `content` to an HTML fragment.
    pub fn render(&self, content: &str) -> Result<String> {
        let parser = TextMergeStream::new(Parser::new_ext(content, self.options));
        let mut events: Vec<Event<'_>> = parser.collect();

        if !self.html {
            events = escape_raw_html(events);
        }
        if self.heading_anchors {
            events = add_heading_ids(events);
        }
        if self.linkify {
            let url = LazyLock::force(&URL).as_ref().map_err(|e| {
                AssetFlowError::content_processing_error(
                    "invalid link pattern",
                    Some(Box::new(e.clone())),
                )
            })?;
            events = linkify(events, url);
        }
        if let Some(highlighter) = &self.highlighter {
            events = highlight_code(events, highlighter);
        }

        let mut html_output = String::with_capacity(content.len() * 2);
        html::push_html(&mut html_output, events.into_iter());
        Ok(html_output)
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor for MarkdownRenderer {
    type Input = String;
    type Output = String;

    fn process(&self, input: Self::Input) -> Result<Self::Output> {
        self.render(&input)
    }
}

fn escape_raw_html<'a>(events: Vec<Event<'a>>) -> Vec<Event<'a>> {
    events
        .into_iter()
        .map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        })
        .collect()
}

/// Sets `id` on every heading that lacks one. Duplicates get `-1`, `-2`, ...
/// and headings with an empty slug get no id.
fn add_heading_ids<'a>(events: Vec<Event<'a>>) -> Vec<Event<'a>> {
    let mut used = HashSet::new();
    let mut out = Vec::with_capacity(events.len());
    let mut iter = events.into_iter();

    while let Some(event) = iter.next() {
        let (level, id, classes, attrs) = match event {
            Event::Start(Tag::Heading {
                level,
                id,
                classes,
                attrs,
            }) => (level, id, classes, attrs),
            other => {
                out.push(other);
                continue;
            }
        };

        let mut inner = Vec::new();
        let mut end = None;
        let mut text = String::new();
        for inner_event in iter.by_ref() {
            if matches!(inner_event, Event::End(TagEnd::Heading(_))) {
                end = Some(inner_event);
                break;
            }
            if let Event::Text(t) | Event::Code(t) = &inner_event {
                text.push_str(t);
            }
            inner.push(inner_event);
        }

        let id = match id {
            Some(explicit) => {
                _ = used.insert(explicit.to_string());
                Some(explicit)
            }
            None => unique_slug(&text, &mut used).map(CowStr::from),
        };

        out.push(Event::Start(Tag::Heading {
            level,
            id,
            classes,
            attrs,
        }));
        out.extend(inner);
        out.extend(end);
    }

    out
}

fn unique_slug(text: &str, used: &mut HashSet<String>) -> Option<String> {
    let slug = slugify(text);
    if slug.is_empty() {
        return None;
    }

    let mut candidate = slug.clone();
    let mut n = 1;
    while used.contains(&candidate) {
        candidate = format!("{}-{}", slug, n);
        n += 1;
    }
    _ = used.insert(candidate.clone());
    Some(candidate)
}

/// Replaces bare URLs in text with anchors, skipping code and text that is
/// already inside a link.
fn linkify<'a>(events: Vec<Event<'a>>, url: &Regex) -> Vec<Event<'a>> {
    let mut out = Vec::with_capacity(events.len());
    let mut link_depth = 0usize;
    let mut code_depth = 0usize;

    for event in events {
        match &event {
            Event::Start(Tag::Link { .. }) | Event::Start(Tag::Image { .. }) => {
                link_depth += 1
            }
            Event::End(TagEnd::Link) | Event::End(TagEnd::Image) => {
                link_depth = link_depth.saturating_sub(1)
            }
            Event::Start(Tag::CodeBlock(_)) => code_depth += 1,
            Event::End(TagEnd::CodeBlock) => {
                code_depth = code_depth.saturating_sub(1)
            }
            Event::InlineHtml(raw) => {
                let tag = raw.trim().to_ascii_lowercase();
                if tag.starts_with("<a ") || tag == "<a>" {
                    link_depth += 1;
                } else if tag.starts_with("</a") {
                    link_depth = link_depth.saturating_sub(1);
                }
            }
            _ => {}
        }

        match event {
            Event::Text(text)
                if link_depth == 0 && code_depth == 0 && url.is_match(&text) =>
            {
                push_linked(&text, url, &mut out);
            }
            other => out.push(other),
        }
    }

    out
}

fn push_linked(text: &str, url: &Regex, out: &mut Vec<Event<'_>>) {
    let mut last = 0;
    for found in url.find_iter(text) {
        let link = trim_url(found.as_str());
        if !has_link_prefix(link) {
            continue;
        }
        let start = found.start();
        let end = start + link.len();

        if start > last {
            out.push(Event::Text(CowStr::from(text[last..start].to_string())));
        }

        let href = if link.to_ascii_lowercase().starts_with("www.") {
            format!("http://{}", link)
        } else {
            link.to_string()
        };
        out.push(Event::InlineHtml(CowStr::from(format!(
            "<a href=\"{}\">{}</a>",
            escape_html(&href),
            escape_html(link)
        ))));
        last = end;
    }

    if last < text.len() {
        out.push(Event::Text(CowStr::from(text[last..].to_string())));
    }
}

/// Whether `link` still carries a scheme or a `www.` host after trimming.
fn has_link_prefix(link: &str) -> bool {
    let lower = link.to_ascii_lowercase();
    ["http://", "https://", "www."]
        .iter()
        .any(|prefix| lower.len() > prefix.len() && lower.starts_with(prefix))
}

/// Drops trailing punctuation and unbalanced closing parentheses.
fn trim_url(candidate: &str) -> &str {
    let mut link = candidate;
    loop {
        let trimmed = link.trim_end_matches(TRAILING_PUNCTUATION);
        let trimmed = if trimmed.ends_with(')')
            && trimmed.matches(')').count() > trimmed.matches('(').count()
        {
            &trimmed[..trimmed.len() - 1]
        } else {
            trimmed
        };
        if trimmed.len() == link.len() {
            return link;
        }
        link = trimmed;
    }
}

fn highlight_code<'a>(
    events: Vec<Event<'a>>,
    highlighter: &SyntaxHighlighter,
) -> Vec<Event<'a>> {
    let mut out = Vec::with_capacity(events.len());
    let mut block: Option<(Option<String>, String)> = None;

    for event in events {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().map(str::to_string)
                    }
                    CodeBlockKind::Indented => None,
                };
                block = Some((lang, String::new()));
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((lang, code)) = block.take() {
                    out.push(Event::Html(CowStr::from(
                        highlighter.highlight(&code, lang.as_deref()),
                    )));
                }
            }
            Event::Text(text) if block.is_some() => {
                if let Some((_, code)) = block.as_mut() {
                    code.push_str(&text);
                }
            }
            other => out.push(other),
        }
    }

    out
}
