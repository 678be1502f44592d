//! Core domain types for a single brochure run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// A fetched and parsed web page, scoped to the current run.
///
/// `text` holds the visible body content with scripts/styles/media stripped;
/// `links` holds every anchor target in document order — duplicates and empty
/// values preserved, nothing resolved or normalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// The URL the page was fetched from.
    pub url: String,
    /// Page title from `<title>`, or a fallback marker.
    pub title: String,
    /// Visible body text, one text node per line.
    pub text: String,
    /// Raw anchor targets in document order.
    pub links: Vec<String>,
    /// When the page was fetched.
    pub fetched_at: DateTime<Utc>,
}

impl Page {
    /// Render the page as the title/contents block used in model prompts.
    pub fn contents(&self) -> String {
        format!(
            "Webpage Title:\n{}\nWebpage Contents:\n{}\n",
            self.title, self.text
        )
    }
}

// ---------------------------------------------------------------------------
// LinkSelection
// ---------------------------------------------------------------------------

/// One brochure-relevant link picked by the model.
///
/// The wire field for the category is `type` (e.g. "about page",
/// "careers page"), mapped here to `category`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedLink {
    /// Category label, e.g. "about page".
    #[serde(rename = "type")]
    pub category: String,
    /// The selected URL as the model returned it (may be relative).
    pub url: String,
}

/// The model's answer to the relevance filter: which links belong in the
/// brochure. Consumed once by the composer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSelection {
    /// Selected links in the model's order.
    #[serde(default)]
    pub links: Vec<SelectedLink>,
}

impl LinkSelection {
    /// Number of selected links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// True when the model selected nothing.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_page() -> Page {
        Page {
            url: "https://example.com".into(),
            title: "Example Corp".into(),
            text: "We make examples.".into(),
            links: vec!["/about".into(), "/careers".into()],
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn page_contents_block() {
        let page = sample_page();
        let contents = page.contents();
        assert!(contents.starts_with("Webpage Title:\nExample Corp\n"));
        assert!(contents.contains("Webpage Contents:\nWe make examples."));
    }

    #[test]
    fn selection_parses_model_reply() {
        let json = r#"{
            "links": [
                {"type": "about page", "url": "https://example.com/about"},
                {"type": "careers page", "url": "/careers"}
            ]
        }"#;
        let selection: LinkSelection = serde_json::from_str(json).expect("parse selection");
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.links[0].category, "about page");
        assert_eq!(selection.links[1].url, "/careers");
    }

    #[test]
    fn selection_empty_links_roundtrip() {
        let selection: LinkSelection = serde_json::from_str(r#"{"links": []}"#).expect("parse");
        assert!(selection.is_empty());

        let json = serde_json::to_string(&selection).expect("serialize");
        let parsed: LinkSelection = serde_json::from_str(&json).expect("roundtrip");
        assert_eq!(parsed, selection);
    }

    #[test]
    fn selection_missing_links_field_defaults_empty() {
        let selection: LinkSelection = serde_json::from_str("{}").expect("parse");
        assert!(selection.is_empty());
    }

    #[test]
    fn selected_link_serializes_wire_field() {
        let link = SelectedLink {
            category: "company page".into(),
            url: "https://example.com/company".into(),
        };
        let json = serde_json::to_string(&link).expect("serialize");
        assert!(json.contains(r#""type":"company page"#));
    }
}
