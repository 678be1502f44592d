//! Brochure composer: gather the selected pages and build the final prompt.

use tracing::{debug, warn};
use url::Url;

use brochure_scrape::Fetcher;
use brochure_shared::{LinkSelection, Page};

use crate::pipeline::ProgressReporter;

/// System prompt for the brochure-generation call.
pub const BROCHURE_SYSTEM_PROMPT: &str = "You are an assistant that analyzes the contents of \
several relevant pages from a company website and creates a short brochure about the company \
for prospective customers, investors and recruits. Respond in markdown. Include details of \
company culture, customers and careers/jobs if available.";

/// Marker appended when the gathered details exceed the character budget.
const TRUNCATION_MARKER: &str = "\n\n[... content truncated to fit the model context ...]";

/// The concatenated text of the home page and every selected page that
/// could be fetched.
#[derive(Debug)]
pub struct SiteDetails {
    /// Prompt-ready text block.
    pub text: String,
    /// Selected pages successfully fetched (home page not counted).
    pub pages_fetched: usize,
    /// Selected URLs that failed to fetch or resolve, in selection order.
    pub skipped: Vec<String>,
}

/// Fetch each selected page and concatenate the contents after the home page.
///
/// A selected page that fails to resolve or fetch is skipped and recorded —
/// never fatal. An empty selection yields the home page plus an explicit note.
pub async fn gather_site_details(
    fetcher: &Fetcher,
    home: &Page,
    selection: &LinkSelection,
    progress: &dyn ProgressReporter,
) -> SiteDetails {
    let mut text = format!("Landing page:\n{}", home.contents());
    let mut skipped = Vec::new();
    let mut pages_fetched = 0;

    if selection.is_empty() {
        text.push_str("\n\nNo relevant subpage links were found.\n");
        return SiteDetails {
            text,
            pages_fetched,
            skipped,
        };
    }

    let base = Url::parse(&home.url).ok();
    let total = selection.len();

    for (i, link) in selection.links.iter().enumerate() {
        let Some(resolved) = resolve_url(base.as_ref(), &link.url) else {
            warn!(url = %link.url, "selected link is not a resolvable URL, skipping");
            skipped.push(link.url.clone());
            continue;
        };

        progress.page_fetched(resolved.as_str(), i + 1, total);

        match fetcher.fetch_page(&resolved).await {
            Ok(page) => {
                debug!(url = %resolved, category = %link.category, "selected page fetched");
                pages_fetched += 1;
                text.push_str(&format!("\n\nURL: {resolved}\n{}", page.contents()));
            }
            Err(e) => {
                warn!(url = %resolved, error = %e, "selected page fetch failed, skipping");
                skipped.push(resolved.to_string());
            }
        }
    }

    SiteDetails {
        text,
        pages_fetched,
        skipped,
    }
}

/// Resolve a selected URL: absolute URLs pass through, relative ones join
/// against the home page URL.
fn resolve_url(base: Option<&Url>, raw: &str) -> Option<Url> {
    if let Ok(absolute) = Url::parse(raw) {
        return Some(absolute);
    }
    base.and_then(|b| b.join(raw).ok())
}

/// Build the brochure user prompt, with the gathered details truncated to
/// the configured character budget.
pub fn brochure_user_prompt(
    company_name: &str,
    url: &str,
    details: &str,
    max_chars: usize,
) -> String {
    format!(
        "You are looking at a company called: {company_name} ({url})\n\n\
         Here are the contents of its landing page and other relevant pages. \
         Use this information to build a short brochure of the company in markdown.\n\n{}",
        truncate_chars(details, max_chars)
    )
}

/// Truncate to at most `max_chars` characters (not bytes) with a marker.
fn truncate_chars(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        None => content.to_string(),
        Some((byte_idx, _)) => {
            let truncated = &content[..byte_idx];
            format!("{truncated}{TRUNCATION_MARKER}")
        }
    }
}
