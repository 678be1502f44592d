//! Best-effort extraction of visible text and links from raw HTML.
//!
//! Parsing never fails: `scraper` recovers from malformed markup and
//! unparseable fragments are simply dropped.

use scraper::{Html, Node, Selector};

/// Fallback title when the document has no usable `<title>`.
const NO_TITLE: &str = "No title found";

/// Subtrees whose text never counts as visible page content.
const SKIP_TAGS: &[&str] = &["script", "style", "img", "input", "noscript", "svg", "iframe"];

/// Title, visible text, and raw anchor targets pulled out of one HTML document.
#[derive(Debug, Clone)]
pub struct Extracted {
    /// `<title>` text, trimmed, or a fallback marker.
    pub title: String,
    /// Visible body text, one text node per line.
    pub text: String,
    /// `href` of every `<a href=...>` in document order — duplicates and
    /// empty values preserved, nothing resolved.
    pub links: Vec<String>,
}

/// Extract title, visible text, and links from raw HTML.
pub fn extract(html: &str) -> Extracted {
    let doc = Html::parse_document(html);

    Extracted {
        title: extract_title(&doc),
        text: extract_visible_text(&doc),
        links: extract_links(&doc),
    }
}

/// The `<title>` element's trimmed text, or the fallback marker.
fn extract_title(doc: &Html) -> String {
    let title_sel = Selector::parse("title").expect("valid selector");

    doc.select(&title_sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NO_TITLE.to_string())
}

/// Visible text of `<body>`, with non-content subtrees skipped.
///
/// Text nodes are trimmed and joined with newlines. Returns an empty string
/// when the document has no `<body>`.
fn extract_visible_text(doc: &Html) -> String {
    let body_sel = Selector::parse("body").expect("valid selector");

    let Some(body) = doc.select(&body_sel).next() else {
        return String::new();
    };

    let mut lines: Vec<String> = Vec::new();

    for node in body.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let inside_skipped = node.ancestors().any(|a| {
            matches!(a.value(), Node::Element(el) if SKIP_TAGS.contains(&el.name()))
        });
        if inside_skipped {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }

    lines.join("\n")
}

/// Every anchor target in document order, duplicates and empties included.
fn extract_links(doc: &Html) -> Vec<String> {
    let link_sel = Selector::parse("a[href]").expect("valid selector");

    doc.select(&link_sel)
        .filter_map(|el| el.value().attr("href"))
        .map(String::from)
        .collect()
}
