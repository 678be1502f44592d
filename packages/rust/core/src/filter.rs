//! Relevance filter: ask the model which links belong in the brochure.

use tracing::{info, instrument};

use brochure_llm::{ChatMessage, OllamaClient, request_structured};
use brochure_shared::{LinkSelection, Page, Result};

/// System prompt for the link-selection call.
const LINK_SYSTEM_PROMPT: &str = "You are provided with a list of links found on a webpage. \
You decide which of the links are most relevant to include in a brochure about the company, \
such as links to an About page, a Company page, or Careers/Jobs pages.\n\
Respond only in JSON like this:\n\
{\n\
  \"links\": [\n\
    {\"type\": \"about page\", \"url\": \"https://example.com/about\"},\n\
    {\"type\": \"careers page\", \"url\": \"https://example.com/careers\"}\n\
  ]\n\
}";

/// Build the user prompt listing every candidate link from the home page.
///
/// An empty link list still produces a well-formed prompt — the model is
/// expected to answer with an empty selection.
pub fn links_user_prompt(page: &Page) -> String {
    let mut prompt = format!(
        "Here is the list of links on the website {}. \
         Please decide which of these are relevant for a brochure about the company \
         (About, Company, Careers). Ignore email, terms of service, and privacy links.\n\n",
        page.url
    );
    prompt.push_str(&page.links.join("\n"));
    prompt
}

/// Ask the model to pick the brochure-relevant links from `page`.
///
/// Exactly one structured request (plus at most one corrective retry inside
/// [`request_structured`]); a reply that still fails to parse aborts the run.
#[instrument(skip_all, fields(url = %page.url, candidates = page.links.len()))]
pub async fn select_links(client: &OllamaClient, page: &Page) -> Result<LinkSelection> {
    let messages = [
        ChatMessage::system(LINK_SYSTEM_PROMPT),
        ChatMessage::user(links_user_prompt(page)),
    ];

    let selection: LinkSelection = request_structured(client, &messages).await?;
    info!(selected = selection.len(), "link selection complete");

    Ok(selection)
}
