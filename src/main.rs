use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mps_sender::config::Config;
use mps_sender::domain::{Credentials, TargetNumber};
use mps_sender::report::{self, ColorMode};
use mps_sender::session::{self, Session};

#[derive(Parser)]
#[command(name = "mps-sender")]
#[command(version)]
#[command(about = "Bulk SMS sender for Twilio, Nexmo (Vonage) and MessageBird")]
struct Cli {
    /// Directory holding credentials, the message and the target list
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file (default: <data-dir>/mps-sender.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Colored output: auto, always or never
    #[arg(long, global = true, default_value = "auto", value_parser = parse_color)]
    color: ColorMode,

    /// Log level for stderr diagnostics (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store and verify API credentials for a provider
    ///
    /// Fields are positional, in the provider's key order:
    ///   twilio:      ACCOUNT_SID AUTH_TOKEN FROM_PHONE_NUMBER
    ///   nexmo:       API_KEY API_SECRET
    ///   messagebird: API_KEY ORIGINATOR
    SetApi {
        /// twilio, nexmo (vonage) or messagebird; 1, 2 or 3 also work
        provider: String,

        fields: Vec<String>,
    },

    /// Store the SMS message (only the first line is sent)
    SetMessage { text: String },

    /// Replace the target list from a file or from numbers given inline
    SetTargets {
        #[arg(required = true)]
        inputs: Vec<String>,
    },

    /// Send the stored message to every stored target
    Start { provider: String },

    /// Check whether a number is a valid target
    Check { number: String },
}

fn parse_color(s: &str) -> Result<ColorMode, String> {
    ColorMode::parse(s).ok_or_else(|| format!("invalid color mode '{s}' (auto, always, never)"))
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mps_sender={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);
    colored::control::set_override(cli.color.should_use_color());

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", report::render_error(&format!("{err:#}"), cli.color));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let config = Config::resolve(cli.config.as_deref(), cli.data_dir.as_deref())?;
    let color = cli.color;

    match &cli.command {
        Commands::SetApi { provider, fields } => {
            let provider = session::parse_provider(provider)?;
            let expected = provider.field_count();
            if fields.len() != expected {
                bail!(
                    "{provider} expects {expected} fields ({}), got {}",
                    provider.credential_keys().join(" "),
                    fields.len()
                );
            }
            let credentials = Credentials::from_values(provider, fields)?;

            let mut session = Session::new(&config);
            session.set_credentials(credentials).await?;
            println!("{}", report::render_success("API credentials are valid.", color));
        }
        Commands::SetMessage { text } => {
            let mut session = Session::new(&config);
            session.set_message(text)?;
            println!("{}", report::render_success("Message saved.", color));
        }
        Commands::SetTargets { inputs } => {
            let numbers = collect_targets(inputs)?;
            let mut session = Session::new(&config);
            let count = session.set_targets(numbers.as_slice())?;
            println!(
                "{}",
                report::render_success(&format!("{count} target numbers saved."), color)
            );
        }
        Commands::Start { provider } => {
            println!("{}", report::render_header(color));
            let provider = session::parse_provider(provider)?;

            let mut session = Session::new(&config);
            session.select_provider(provider)?;
            println!("\n{}", report::render_start(provider, color));

            let summary = session
                .dispatch(|outcome| println!("{}", report::render_outcome(outcome, color)))
                .await?;
            println!("{}", report::render_summary(&summary));
            session.quit();
        }
        Commands::Check { number } => {
            let number = TargetNumber::new(number.as_str());
            let verdict = if number.is_valid() { "VALID" } else { "TIDAK VALID" };
            println!("[NOMOR]: {number} {verdict}");
        }
    }
    Ok(())
}

/// A single existing file argument is read as a list; anything else is taken as numbers.
fn collect_targets(inputs: &[String]) -> Result<Vec<String>> {
    if let [single] = inputs {
        let path = Path::new(single);
        if path.is_file() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            return Ok(content
                .trim()
                .lines()
                .map(|line| line.trim_end().to_owned())
                .collect());
        }
    }
    Ok(inputs.to_vec())
}
