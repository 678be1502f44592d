//! CLI command definitions, routing, and tracing setup.

use std::io::Write;

use brochure_core::{GenerateConfig, GenerateResult, ProgressReporter};
use brochure_shared::{AppConfig, init_config, load_config};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use url::Url;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// brochure — turn a company website into a short markdown brochure.
#[derive(Parser)]
#[command(
    name = "brochure",
    version,
    about = "Turn a company website into a short markdown brochure via a local model.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate a brochure for a company website.
    Generate {
        /// Company website URL.
        url: String,

        /// Company name (defaults to the URL hostname).
        #[arg(short, long)]
        name: Option<String>,

        /// Stream the brochure to stdout as it is generated.
        #[arg(long)]
        stream: bool,

        /// Model to use (overrides config).
        #[arg(short, long)]
        model: Option<String>,

        /// Ollama base URL (overrides config).
        #[arg(long)]
        ollama_url: Option<String>,

        /// Character budget for page text in the brochure prompt (overrides config).
        #[arg(long)]
        max_chars: Option<usize>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "brochure=info",
        1 => "brochure=debug",
        _ => "brochure=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate {
            url,
            name,
            stream,
            model,
            ollama_url,
            max_chars,
        } => cmd_generate(&url, name, stream, model, ollama_url, max_chars).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

async fn cmd_generate(
    url: &str,
    name: Option<String>,
    stream: bool,
    model: Option<String>,
    ollama_url: Option<String>,
    max_chars: Option<usize>,
) -> Result<()> {
    let config = load_config()?;

    let parsed_url = Url::parse(url).map_err(|e| eyre!("invalid URL '{url}': {e}"))?;

    // Derive the company name from the hostname if not provided
    let company_name = name.unwrap_or_else(|| {
        parsed_url.host_str().unwrap_or("unknown").to_string()
    });

    let generate_config = GenerateConfig {
        url: parsed_url,
        company_name: company_name.clone(),
        ollama_base_url: ollama_url.unwrap_or(config.ollama.base_url),
        model: model.unwrap_or(config.ollama.model),
        model_timeout_secs: config.ollama.timeout_secs,
        fetch_timeout_secs: config.defaults.fetch_timeout_secs,
        max_prompt_chars: max_chars.unwrap_or(config.defaults.max_prompt_chars),
        stream,
    };

    info!(
        url,
        name = %company_name,
        model = %generate_config.model,
        stream,
        "generating brochure"
    );

    let reporter = CliProgress::new();
    let result = brochure_core::generate(&generate_config, &reporter).await?;

    if stream {
        // Tokens already went to stdout; just terminate the document.
        println!();
    } else {
        println!("{}", result.brochure);
    }

    println!();
    println!("  Brochure generated!");
    println!("  Company: {}", result.company_name);
    println!("  Links:   {} selected", result.links_selected);
    println!("  Pages:   {} used", result.pages_used);
    if !result.pages_skipped.is_empty() {
        println!("  Skipped: {}", result.pages_skipped.join(", "));
    }
    println!("  Time:    {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn page_fetched(&self, url: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Fetching [{current}/{total}] {url}"));
    }

    fn token(&self, text: &str) {
        self.spinner.suspend(|| {
            print!("{text}");
            let _ = std::io::stdout().flush();
        });
    }

    fn done(&self, _result: &GenerateResult) {
        self.spinner.finish_and_clear();
    }
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
