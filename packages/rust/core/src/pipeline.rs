//! End-to-end `generate` pipeline: fetch home → select links → fetch pages →
//! compose brochure.

use std::time::{Duration, Instant};

use tracing::{info, instrument};
use url::Url;

use brochure_llm::{ChatMessage, OllamaClient, strip_code_fences};
use brochure_scrape::Fetcher;
use brochure_shared::Result;

use crate::{compose, filter};

/// Configuration for one brochure run — every collaborator's settings are
/// explicit here, nothing is read from ambient state.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// The company website to start from.
    pub url: Url,
    /// Company name used in the brochure prompt (defaults to the hostname
    /// at the CLI layer).
    pub company_name: String,
    /// Base URL of the local Ollama service.
    pub ollama_base_url: String,
    /// Model used for both the filter and compose calls.
    pub model: String,
    /// Timeout in seconds for model calls.
    pub model_timeout_secs: u64,
    /// Timeout in seconds for page fetches.
    pub fetch_timeout_secs: u64,
    /// Character budget for the gathered site details in the final prompt.
    pub max_prompt_chars: usize,
    /// Stream the brochure token-by-token instead of one completion.
    pub stream: bool,
}

/// Result of a completed brochure run.
#[derive(Debug)]
pub struct GenerateResult {
    /// The generated markdown brochure.
    pub brochure: String,
    /// Company name the brochure was written for.
    pub company_name: String,
    /// Links the model selected as brochure-relevant.
    pub links_selected: usize,
    /// Pages whose text went into the prompt (home page included).
    pub pages_used: usize,
    /// Selected URLs dropped because they failed to fetch or resolve.
    pub pages_skipped: Vec<String>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when a selected page is about to be fetched.
    fn page_fetched(&self, url: &str, current: usize, total: usize);
    /// Called for each streamed brochure fragment (streaming mode only).
    fn token(&self, text: &str);
    /// Called when the pipeline completes.
    fn done(&self, result: &GenerateResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn page_fetched(&self, _url: &str, _current: usize, _total: usize) {}
    fn token(&self, _text: &str) {}
    fn done(&self, _result: &GenerateResult) {}
}

/// Run the full brochure pipeline.
///
/// 1. Fetch and extract the home page
/// 2. Ask the model which links matter
/// 3. Fetch the selected pages (failures skipped, recorded)
/// 4. Ask the model for the brochure
///
/// A home-page fetch failure or a model failure aborts the run; no partial
/// brochure is ever returned.
#[instrument(skip_all, fields(url = %config.url, company = %config.company_name))]
pub async fn generate(
    config: &GenerateConfig,
    progress: &dyn ProgressReporter,
) -> Result<GenerateResult> {
    let start = Instant::now();

    let fetcher = Fetcher::new(config.fetch_timeout_secs)?;
    let client = OllamaClient::new(
        &config.ollama_base_url,
        &config.model,
        config.model_timeout_secs,
    )?;

    progress.phase("Fetching home page");
    let home = fetcher.fetch_page(&config.url).await?;
    info!(title = %home.title, links = home.links.len(), "home page fetched");

    progress.phase("Selecting relevant links");
    let selection = filter::select_links(&client, &home).await?;

    progress.phase("Fetching selected pages");
    let details = compose::gather_site_details(&fetcher, &home, &selection, progress).await;

    progress.phase("Generating brochure");
    let messages = [
        ChatMessage::system(compose::BROCHURE_SYSTEM_PROMPT),
        ChatMessage::user(compose::brochure_user_prompt(
            &config.company_name,
            config.url.as_str(),
            &details.text,
            config.max_prompt_chars,
        )),
    ];

    let raw = if config.stream {
        client
            .chat_stream(&messages, &mut |t| progress.token(t))
            .await?
    } else {
        client.chat(&messages).await?
    };

    // Models occasionally wrap the whole document in a code fence.
    let brochure = strip_code_fences(&raw);

    let result = GenerateResult {
        brochure,
        company_name: config.company_name.clone(),
        links_selected: selection.len(),
        pages_used: details.pages_fetched + 1,
        pages_skipped: details.skipped,
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        links_selected = result.links_selected,
        pages_used = result.pages_used,
        pages_skipped = result.pages_skipped.len(),
        elapsed_ms = result.elapsed.as_millis(),
        "brochure generated"
    );

    Ok(result)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
