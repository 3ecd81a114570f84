// src/utils/html.rs

use std::{
    borrow::Cow,
    collections::{HashMap, HashSet},
    sync::LazyLock,
};

use ammonia::{Builder, UrlRelative};
use regex::Regex;

/// Tags the rich-text editor produces.
const ALLOWED_TAGS: &[&str] = &[
    "p", "br", "h1", "h2", "h3", "h4", "h5", "h6", "strong", "b", "em", "i", "u", "s", "strike",
    "del", "ol", "ul", "li", "a", "img", "span", "blockquote", "pre", "code",
];

/// Dropped together with everything inside them.
const CONTENT_TAGS: &[&str] = &["script", "style"];

const URL_SCHEMES: &[&str] = &["http", "https", "mailto", "data"];

/// CSS properties the editor writes for color, background and alignment.
const STYLE_PROPERTIES: &[&str] = &["color", "background-color", "text-align"];

/// Editor classes for alignment and list indentation.
const EDITOR_CLASSES: &[&str] = &[
    "ql-align-center",
    "ql-align-right",
    "ql-align-justify",
    "ql-indent-1",
    "ql-indent-2",
    "ql-indent-3",
    "ql-indent-4",
    "ql-indent-5",
    "ql-indent-6",
    "ql-indent-7",
    "ql-indent-8",
];

const CLASSED_TAGS: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6", "li", "blockquote", "pre"];

/// Inline images the editor embeds as data URLs. SVG is excluded since it can carry script.
const INLINE_IMAGE_TYPES: &[&str] = &[
    "data:image/png",
    "data:image/jpeg",
    "data:image/jpg",
    "data:image/gif",
    "data:image/webp",
    "data:image/bmp",
];

static STYLE_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[#%(),.\w\s-]+$").expect("style value pattern is valid"));

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

/// A serialized `<pre>` start tag followed by newlines. The parser eats the
/// first newline after `<pre>` and the serializer does not put it back.
static PRE_LEADING_NEWLINES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(<pre(?:\s+[^\s="'>/]+="[^"]*")*>)\n+"#).expect("pre pattern is valid")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Clean HTML content using the ammonia library.
///
/// This employs a whitelist-based sanitization strategy: editor formatting
/// (headings, emphasis, lists, links, images, color and alignment) survives,
/// while `<script>`/`<style>` are removed with their content and every
/// `on*` attribute or `javascript:` URL is dropped.
///
/// The allow-list is fixed at construction. Build it once and share it.
pub struct ContentSanitizer {
    builder: Builder<'static>,
}

impl ContentSanitizer {
    pub fn new() -> Self {
        let mut builder = Builder::empty();

        builder
            .tags(ALLOWED_TAGS.iter().copied().collect())
            .clean_content_tags(CONTENT_TAGS.iter().copied().collect())
            .generic_attributes(HashSet::from(["style", "title"]))
            .tag_attributes(HashMap::from([
                ("a", HashSet::from(["href", "target"])),
                ("img", HashSet::from(["src", "alt", "width", "height"])),
            ]))
            .url_schemes(URL_SCHEMES.iter().copied().collect())
            .url_relative(UrlRelative::PassThrough)
            .link_rel(Some("noopener noreferrer nofollow"))
            .strip_comments(true)
            .attribute_filter(filter_attribute);

        for tag in CLASSED_TAGS {
            builder.add_allowed_classes(*tag, EDITOR_CLASSES.iter().copied());
        }

        Self { builder }
    }

    /// Returns markup safe to store and inject into a page.
    ///
    /// Never fails: malformed input is parsed best-effort and anything not on
    /// the allow-list is dropped. Running it on its own output is a no-op.
    pub fn sanitize(&self, raw_html: &str) -> String {
        let cleaned = self.builder.clean(raw_html).to_string();

        // Leading newlines in <pre> would shrink by one on every pass.
        PRE_LEADING_NEWLINES
            .replace_all(&cleaned, "${1}")
            .into_owned()
    }
}

impl Default for ContentSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Second pass over attributes that survived the allow-list.
fn filter_attribute<'u>(element: &str, attribute: &str, value: &'u str) -> Option<Cow<'u, str>> {
    match attribute {
        "style" => filter_style(value),
        "href" | "src" => {
            let lowered = value.trim_start().to_ascii_lowercase();
            if lowered.starts_with("data:") && !(element == "img" && is_inline_image(&lowered)) {
                None
            } else {
                Some(Cow::Borrowed(value))
            }
        }
        _ => Some(Cow::Borrowed(value)),
    }
}

fn is_inline_image(url: &str) -> bool {
    INLINE_IMAGE_TYPES.iter().any(|prefix| {
        url.strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with(';') || rest.starts_with(','))
    })
}

/// Keeps only whitelisted CSS declarations with plain values.
fn filter_style(value: &str) -> Option<Cow<'_, str>> {
    let kept: Vec<String> = value
        .split(';')
        .filter_map(|declaration| {
            let (property, val) = declaration.split_once(':')?;
            let property = property.trim().to_ascii_lowercase();
            let val = val.trim();

            if !STYLE_PROPERTIES.contains(&property.as_str()) || val.is_empty() {
                return None;
            }
            let lowered = val.to_ascii_lowercase();
            if lowered.contains("url(") || lowered.contains("expression(") || !STYLE_VALUE.is_match(val) {
                return None;
            }
            Some(format!("{}: {}", property, val))
        })
        .collect();

    if kept.is_empty() {
        None
    } else {
        Some(Cow::Owned(kept.join("; ")))
    }
}

/// Plain-text preview of stored HTML.
///
/// Tags are removed, whitespace collapsed, and the text is cut at
/// `max_chars` characters with a trailing ellipsis.
pub fn excerpt(html: &str, max_chars: usize) -> String {
    let without_tags = TAG.replace_all(html, "");
    let text = WHITESPACE.replace_all(&without_tags, " ");
    let text = text.trim();

    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}…", cut)
    } else {
        text.to_string()
    }
}
