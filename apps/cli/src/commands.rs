//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use contactscout_core::decode::TextEncoding;
use contactscout_core::pacing::FixedDelay;
use contactscout_core::pipeline::{EnrichRequest, EnrichSummary, ProgressReporter};
use contactscout_lookup::{EmailLookup, GeminiClient, GeminiSettings, LookupOutcome};
use contactscout_shared::{
    ApiKey, AppConfig, RowWindow, init_config, load_config, load_config_from, resolve_api_key,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// ContactScout: find contact emails for a list of companies.
#[derive(Parser)]
#[command(
    name = "contactscout",
    version,
    about = "Add a best-guess contact EMAIL column to a CSV of companies using Gemini with Google Search.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ~/.contactscout/contactscout.toml).
    #[arg(long, global = true)]
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

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Look up an email for every company in a CSV and write an enriched copy.
    Enrich {
        /// Input CSV with a header row.
        input: PathBuf,

        /// Output CSV (defaults to <input>.enriched.csv next to the input).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// First data row to look up (1-indexed, header excluded; must be at least 1).
        /// Earlier rows are copied as-is.
        #[arg(long, default_value_t = 1)]
        start_row: usize,

        /// Last data row to look up; must not be before --start-row.
        /// Rows after it are NOT written to the output.
        #[arg(long)]
        end_row: Option<usize>,

        /// Pause after each lookup, in milliseconds (overrides config).
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Gemini model ID (overrides config).
        #[arg(long)]
        model: Option<String>,

        /// Env var holding the Gemini API key (overrides config).
        #[arg(long)]
        api_key_env: Option<String>,

        /// Encodings to try in order, comma-separated (overrides config).
        #[arg(long, value_delimiter = ',')]
        encodings: Option<Vec<String>>,
    },

    /// Look up a single company and print the result.
    Lookup {
        /// Company name.
        company: String,

        /// Gemini model ID (overrides config).
        #[arg(long)]
        model: Option<String>,
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
        0 => "contactscout=info",
        1 => "contactscout=debug",
        _ => "contactscout=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

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
    let config_path = cli.config;
    match cli.command {
        Command::Enrich {
            input,
            output,
            start_row,
            end_row,
            delay_ms,
            model,
            api_key_env,
            encodings,
        } => {
            let mut config = load(config_path.as_deref())?;
            if let Some(ms) = delay_ms {
                config.pipeline.delay_ms = ms;
            }
            if let Some(model) = model {
                config.gemini.model = model;
            }
            if let Some(var) = api_key_env {
                config.gemini.api_key_env = var;
            }
            if let Some(encodings) = encodings {
                config.pipeline.encodings = encodings;
            }
            cmd_enrich(&config, input, output, start_row, end_row).await
        }
        Command::Lookup { company, model } => {
            let mut config = load(config_path.as_deref())?;
            if let Some(model) = model {
                config.gemini.model = model;
            }
            cmd_lookup(&config, &company).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(config_path.as_deref()).await,
        },
    }
}

fn load(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_enrich(
    config: &AppConfig,
    input: PathBuf,
    output: Option<PathBuf>,
    start_row: usize,
    end_row: Option<usize>,
) -> Result<()> {
    let window = RowWindow::new(start_row, end_row)?;
    let encodings = TextEncoding::parse_list(&config.pipeline.encodings)?;
    let output = output.unwrap_or_else(|| default_output_path(&input));

    // A missing key is reported once here; each lookup then comes back empty.
    let api_key = match resolve_api_key(&config.gemini) {
        Ok(key) => Some(key),
        Err(e) => {
            error!(error = %e, "continuing without a Gemini API key, every EMAIL will be empty");
            None
        }
    };

    let client = GeminiClient::new(GeminiSettings::from_config(&config.gemini, api_key))?;
    let pacer = FixedDelay::from_millis(config.pipeline.delay_ms);

    let request = EnrichRequest {
        input,
        output,
        window,
        encodings,
    };

    info!(
        input = %request.input.display(),
        output = %request.output.display(),
        window = %request.window,
        model = %config.gemini.model,
        "enriching company list"
    );

    let reporter = CliProgress::new();
    let summary =
        contactscout_core::pipeline::enrich_csv(&request, &client, &pacer, &reporter).await?;

    // Print summary
    println!();
    println!("  Enrichment finished!");
    println!("  Output:    {}", summary.output.display());
    println!("  Encoding:  {}", summary.encoding);
    println!("  Rows:      {} written of {}", summary.rows_written, summary.rows_read);
    println!("  Lookups:   {}", summary.lookups);
    println!("  Found:     {}", summary.emails_found);
    println!("  Not found: {}", summary.not_found);
    println!("  Failed:    {}", summary.lookup_failures);
    println!("  No name:   {}", summary.skipped_no_company);
    if let Some(row) = summary.stopped_at {
        println!("  Stopped:   at row {row} (past --end-row; later rows not written)");
    }
    println!(
        "  Time:      {:.1}s",
        summary.elapsed.as_secs_f64()
    );
    println!();

    Ok(())
}

async fn cmd_lookup(config: &AppConfig, company: &str) -> Result<()> {
    let api_key: ApiKey = resolve_api_key(&config.gemini)?;
    let client = GeminiClient::new(GeminiSettings::from_config(&config.gemini, Some(api_key)))?;

    info!(company, model = %config.gemini.model, "looking up company email");

    match client.lookup(company).await {
        Ok(LookupOutcome::Found(email)) => println!("{email}"),
        Ok(LookupOutcome::NotFound) => println!("Not Found"),
        Err(e) => return Err(eyre!("lookup for '{company}' failed: {e}")),
    }

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(path: Option<&Path>) -> Result<()> {
    let config = load(path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

/// `companies.csv` → `companies.enriched.csv` in the same directory.
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".into());
    input.with_file_name(format!("{stem}.enriched.csv"))
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif bar.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { bar }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn rows_total(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg} ({eta})",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
        );
    }

    fn row_done(&self, current: usize, _total: usize, detail: &str) {
        self.bar.set_position(current as u64);
        self.bar.set_message(detail.to_string());
    }

    fn done(&self, _summary: &EnrichSummary) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn enrich_help(arg: &str) -> String {
        let cmd = Cli::command();
        let enrich = cmd.find_subcommand("enrich").expect("enrich subcommand");
        enrich
            .get_arguments()
            .find(|a| a.get_id() == arg)
            .and_then(|a| a.get_help())
            .map(|h| h.to_string())
            .unwrap_or_default()
    }

    #[test]
    fn window_flags_document_their_bounds() {
        assert!(enrich_help("start_row").contains("must be at least 1"));
        let end = enrich_help("end_row");
        assert!(end.contains("must not be before --start-row"));
        assert!(end.contains("NOT written"));
    }

    #[test]
    fn zero_start_row_rejected_before_running() {
        let cli = Cli::parse_from(["contactscout", "enrich", "in.csv", "--start-row", "0"]);
        match cli.command {
            Command::Enrich {
                start_row, end_row, ..
            } => assert!(RowWindow::new(start_row, end_row).is_err()),
            _ => panic!("expected Enrich"),
        }
    }

    #[test]
    fn default_output_next_to_input() {
        assert_eq!(
            default_output_path(Path::new("/data/companies.csv")),
            PathBuf::from("/data/companies.enriched.csv")
        );
        assert_eq!(
            default_output_path(Path::new("list")),
            PathBuf::from("list.enriched.csv")
        );
    }

    #[test]
    fn enrich_args_parse() {
        let cli = Cli::parse_from([
            "contactscout",
            "enrich",
            "in.csv",
            "--start-row",
            "3",
            "--end-row",
            "10",
            "--encodings",
            "utf-8,cp1252",
        ]);
        match cli.command {
            Command::Enrich {
                input,
                start_row,
                end_row,
                encodings,
                output,
                ..
            } => {
                assert_eq!(input, PathBuf::from("in.csv"));
                assert_eq!(start_row, 3);
                assert_eq!(end_row, Some(10));
                assert_eq!(encodings, Some(vec!["utf-8".into(), "cp1252".into()]));
                assert!(output.is_none());
            }
            _ => panic!("expected Enrich"),
        }
    }

    #[test]
    fn enrich_defaults_to_whole_file() {
        let cli = Cli::parse_from(["contactscout", "enrich", "in.csv"]);
        match cli.command {
            Command::Enrich {
                start_row, end_row, ..
            } => {
                assert_eq!(start_row, 1);
                assert_eq!(end_row, None);
            }
            _ => panic!("expected Enrich"),
        }
    }
}
