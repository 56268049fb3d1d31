//! CLI entry point for `billsweep`.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

use billsweep::email::{ImapClient, MailScanner, ScanReport, ScanSettings};
use billsweep::error::ConfigError;
use billsweep::sanitize::redact_path;
use billsweep::storage::AttachmentStore;
use billsweep::window::DateWindow;
use billsweep::{load_config, Config};

#[derive(Parser)]
#[command(name = "billsweep", version, about)]
struct Cli {
    /// Month to scan; asked for interactively when omitted
    #[arg(short, long, value_name = "YYYY-MM")]
    month: Option<String>,

    /// Directory for saved attachments [default: invoices_<month>]
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Config file [default: <config dir>/billsweep/config.json]
    #[arg(short, long, env = "BILLSWEEP_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.json_logs) {
        eprintln!("billsweep: failed to initialize logging: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("billsweep: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr);
        tracing::subscriber::set_global_default(registry.with(layer))?;
    } else {
        let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
        tracing::subscriber::set_global_default(registry.with(layer))?;
    }

    // The IMAP client logs through the `log` facade.
    tracing_log::LogTracer::init()?;
    Ok(())
}

async fn run(cli: Cli) -> billsweep::Result<()> {
    let config = load_cli_config(cli.config.as_deref())?;

    let month = match cli.month {
        Some(month) => month,
        None => prompt_month()?,
    };
    let window = DateWindow::for_month(&month)?;

    let output = cli
        .output
        .unwrap_or_else(|| PathBuf::from(format!("invoices_{}", month.trim())));
    let store = AttachmentStore::new(&output);

    info!(
        "Scanning {} into {}",
        window,
        redact_path(store.output_directory())
    );

    let mut client = ImapClient::new(config.clone());
    client.connect().await?;

    let mut scanner = MailScanner::new(client, ScanSettings::from_config(&config));
    let result = scanner.scan(&window, &store).await;

    let mut client = scanner.into_provider();
    if let Err(e) = client.disconnect().await {
        tracing::warn!("Logout failed: {}", e);
    }

    let report = result?;
    print_summary(&report, &output);
    Ok(())
}

fn load_cli_config(path: Option<&std::path::Path>) -> Result<Config, ConfigError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => Config::default_path().ok_or(ConfigError::NoConfigDirectory)?,
    };
    load_config(path)
}

fn prompt_month() -> std::io::Result<String> {
    let mut stdout = std::io::stdout();
    write!(stdout, "Month to scan (YYYY-MM): ")?;
    stdout.flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn print_summary(report: &ScanReport, output: &std::path::Path) {
    for folder in &report.folders {
        match &folder.error {
            Some(reason) => println!("  {:<32} skipped ({})", folder.folder, reason),
            None => println!(
                "  {:<32} {} messages, {} saved",
                folder.folder, folder.messages, folder.written
            ),
        }
    }

    println!(
        "Saved {} file(s) to {}",
        report.written,
        output.display()
    );
    if report.duplicates > 0 {
        println!("{} duplicate attachment(s) skipped", report.duplicates);
    }
    if report.dropped > 0 {
        println!(
            "{} attachment(s) dropped: no free filename",
            report.dropped
        );
    }
    if report.failed > 0 || report.failed_batches > 0 {
        println!(
            "{} attachment(s) and {} batch(es) failed, see log for details",
            report.failed, report.failed_batches
        );
    }
}
