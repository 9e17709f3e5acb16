//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use sitekit_html::{HtmlPage, build_page_toc, generate_toc, page_assigner, render_markdown_list};
use sitekit_search::{IndexSource, build_index, load_index, search, write_index};
use sitekit_shared::{AnchorStrategy, AppConfig, init_config, load_config, load_config_from};
use sitekit_stars::{StarClient, inject_star_counts, providers_from_config};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// sitekit — documentation site support tools.
#[derive(Parser)]
#[command(
    name = "sitekit",
    version,
    about = "Table of contents, star-count widgets, and search index tools for doc sites.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ~/.sitekit/sitekit.toml).
    #[arg(long, global = true, env = "SITEKIT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Output format of the `toc` command.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum TocFormat {
    /// The page with anchor ids and the nav list injected.
    Html,
    /// The navigation tree as JSON.
    Json,
    /// The navigation tree as a nested Markdown list.
    Markdown,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate a table of contents from a page's headings.
    Toc {
        /// HTML page to read.
        input: PathBuf,

        /// Write output here instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Output format.
        #[arg(short, long, value_enum, default_value = "html")]
        format: TocFormat,

        /// Anchor id strategy for headings without an id.
        #[arg(short, long, value_enum)]
        strategy: Option<AnchorStrategy>,
    },

    /// Fill the page's star-count widgets from GitHub and GitLab.
    Stars {
        /// HTML page to read.
        input: PathBuf,

        /// Write output here instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// GitHub repository (owner/name).
        #[arg(long)]
        github: Option<String>,

        /// GitLab project id or namespace/path.
        #[arg(long)]
        gitlab: Option<String>,
    },

    /// Search index operations.
    Search {
        /// Search subcommand.
        #[command(subcommand)]
        action: SearchAction,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Search subcommands.
#[derive(Subcommand)]
pub(crate) enum SearchAction {
    /// Build search_index.json from a rendered site.
    Build {
        /// Rendered site directory.
        #[arg(long)]
        site_dir: Option<PathBuf>,

        /// Index output path.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Query a search index.
    Query {
        /// Search terms.
        #[arg(required = true)]
        terms: Vec<String>,

        /// Index file path or URL (defaults to the configured index).
        #[arg(long)]
        index: Option<String>,

        /// Maximum number of hits shown.
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Print hits as JSON.
        #[arg(long)]
        json: bool,
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
        0 => "sitekit=info",
        1 => "sitekit=debug",
        _ => "sitekit=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so page output on stdout stays clean.
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
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Toc {
            input,
            out,
            format,
            strategy,
        } => cmd_toc(config_path, &input, out.as_deref(), format, strategy),
        Command::Stars {
            input,
            out,
            github,
            gitlab,
        } => cmd_stars(config_path, &input, out.as_deref(), github, gitlab).await,
        Command::Search { action } => match action {
            SearchAction::Build { site_dir, out } => {
                cmd_search_build(config_path, site_dir, out)
            }
            SearchAction::Query {
                terms,
                index,
                limit,
                json,
            } => cmd_search_query(config_path, &terms, index.as_deref(), limit, json).await,
        },
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_toc(
    config_path: Option<&Path>,
    input: &Path,
    out: Option<&Path>,
    format: TocFormat,
    strategy: Option<AnchorStrategy>,
) -> Result<()> {
    let mut config = resolve_config(config_path)?;
    if let Some(strategy) = strategy {
        config.toc.anchor_strategy = strategy;
    }

    let mut page = read_page(input)?;
    info!(input = %input.display(), ?format, "generating table of contents");

    match format {
        TocFormat::Html => {
            let outcome = generate_toc(&mut page, &config.toc)?;
            info!(
                entries = outcome.tree.count(),
                ids_written = outcome.ids_written,
                "table of contents generated"
            );
            write_output(out, page.as_str())
        }
        TocFormat::Json | TocFormat::Markdown => {
            let existing = page.headings(config.toc.min_level, config.toc.max_level)?;
            let mut assigner = page_assigner(&config.toc, &existing);
            let outcome = build_page_toc(&mut page, &config.toc, assigner.as_mut())?;

            let rendered = match format {
                TocFormat::Json => serde_json::to_string_pretty(&outcome.tree)?,
                _ => render_markdown_list(&outcome.tree),
            };
            write_output(out, &rendered)
        }
    }
}

async fn cmd_stars(
    config_path: Option<&Path>,
    input: &Path,
    out: Option<&Path>,
    github: Option<String>,
    gitlab: Option<String>,
) -> Result<()> {
    let mut config = resolve_config(config_path)?;
    if github.is_some() {
        config.stars.github_repo = github;
    }
    if gitlab.is_some() {
        config.stars.gitlab_project = gitlab;
    }
    config.validate()?;

    let providers = providers_from_config(&config.stars);
    if providers.is_empty() {
        return Err(eyre!(
            "no repositories configured: pass --github/--gitlab or set [stars] in the config file"
        ));
    }

    let mut page = read_page(input)?;
    let client = StarClient::new(config.stars.timeout_secs)?;

    let mut counts = Vec::new();
    for fetch in client.fetch_all(providers).await {
        match fetch.result {
            Ok(count) => counts.push(count),
            Err(e) => warn!(
                provider = %fetch.provider,
                error = %e,
                "star count unavailable, widget left as is"
            ),
        }
    }

    let updated = inject_star_counts(&mut page, &counts);
    info!(fetched = counts.len(), updated, "star widgets filled");
    write_output(out, page.as_str())
}

fn cmd_search_build(
    config_path: Option<&Path>,
    site_dir: Option<PathBuf>,
    out: Option<PathBuf>,
) -> Result<()> {
    let config = resolve_config(config_path)?;
    let site_dir = site_dir.unwrap_or_else(|| PathBuf::from(&config.search.site_dir));
    let out = out.unwrap_or_else(|| index_path(&site_dir, &config.search.index_path));

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")?
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner.set_message(format!("Indexing {}", site_dir.display()));

    let built = build_index(&site_dir, &config.search);
    spinner.finish_and_clear();
    let index = built?;

    write_index(&index, &out)?;

    println!();
    println!("  Search index written!");
    println!("  Pages: {}", index.docs.len());
    println!("  Path:  {}", out.display());
    println!();

    Ok(())
}

async fn cmd_search_query(
    config_path: Option<&Path>,
    terms: &[String],
    index: Option<&str>,
    limit: usize,
    json: bool,
) -> Result<()> {
    let config = resolve_config(config_path)?;
    let source = match index {
        Some(raw) => IndexSource::parse(raw)?,
        None => IndexSource::Path(index_path(
            Path::new(&config.search.site_dir),
            &config.search.index_path,
        )),
    };

    let loaded = load_index(&source).await?;
    let query = terms.join(" ");
    let hits = search(&loaded, &query)?;

    if json {
        let values: Vec<serde_json::Value> = hits.iter().take(limit).map(|h| h.to_json()).collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }

    if hits.is_empty() {
        println!("No results for '{query}'.");
        return Ok(());
    }

    for hit in hits.iter().take(limit) {
        let location = if hit.location.is_empty() { "/" } else { &hit.location };
        println!("{:>4}  {}  ({location})", hit.score, hit.title);
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load the config from `--config`, or the default location.
fn resolve_config(config_path: Option<&Path>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

fn read_page(input: &Path) -> Result<HtmlPage> {
    let source = std::fs::read_to_string(input)
        .map_err(|e| eyre!("cannot read '{}': {e}", input.display()))?;
    Ok(HtmlPage::parse(source))
}

/// Write to `out`, or stdout when no path is given.
fn write_output(out: Option<&Path>, content: &str) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, content)
                .map_err(|e| eyre!("cannot write '{}': {e}", path.display()))?;
            info!(path = %path.display(), bytes = content.len(), "output written");
        }
        None => print!("{content}"),
    }
    Ok(())
}

/// The index path, resolved against the site directory unless absolute.
fn index_path(site_dir: &Path, index_path: &str) -> PathBuf {
    let path = Path::new(index_path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        site_dir.join(path)
    }
}
