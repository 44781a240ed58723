use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use price_checker::app::Checker;
use price_checker::browser::ChromeSession;
use price_checker::config::Config;
use price_checker::logging::init_logging;
use price_checker::notify::{create_client, WebhookNotifier};
use price_checker::sheet;
use price_checker::ui::{dispatch, ConsoleView, Presenter};

#[derive(Parser, Debug)]
#[command(name = "price-checker", version, about = "Compare store and competitor prices and SKUs")]
struct Args {
    /// Spreadsheet with the link columns (xlsx, xls, ods or csv)
    #[arg(short, long)]
    file: PathBuf,

    /// TOML settings file (defaults to ./price_checker.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Minutes between runs; 0 runs once
    #[arg(short, long)]
    interval: Option<u64>,

    /// Run a single comparison and exit
    #[arg(long)]
    once: bool,

    /// Write the results of each run to this CSV file
    #[arg(long)]
    save: Option<PathBuf>,

    #[arg(long)]
    headless: bool,

    /// Attach to a running Chrome instead of launching one
    #[arg(long)]
    remote_debugging_url: Option<String>,

    /// Check the spreadsheet and exit
    #[arg(long)]
    validate_only: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(minutes) = args.interval {
        config.task.interval_minutes = minutes;
    }
    if args.headless {
        config.browser.headless = true;
    }
    if let Some(url) = &args.remote_debugging_url {
        config.browser.remote_debugging_url = Some(url.clone());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    apply_overrides(&mut config, &args);
    config.validate()?;

    let _log_guard = init_logging(&config.log, args.verbose)?;
    info!("Starting Price Checker");

    if args.validate_only {
        let report = sheet::validate(&args.file, &config.sheet)?;
        info!(
            "{} is valid: {} rows, {} blank link cells, expected SKU columns: {}",
            args.file.display(),
            report.rows,
            report.blank_links,
            if report.has_expected_skus { "yes" } else { "no" }
        );
        if report.blank_links > 0 {
            warn!("Rows with a blank link will be skipped");
        }
        return Ok(());
    }

    if !args.file.exists() {
        bail!("Spreadsheet not found: {}", args.file.display());
    }

    let config = Arc::new(config);
    let precision = config.compare.price_precision;

    let mut presenters: Vec<Box<dyn Presenter>> = vec![Box::new(ConsoleView::new(precision))];
    if let Some(webhook_url) = &config.notify.webhook_url {
        let client = create_client(&config.browser.user_agent)?;
        presenters.push(Box::new(WebhookNotifier::new(client, webhook_url.clone(), precision)));
        info!("Alerts will also be posted to the configured webhook");
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let presentation = tokio::spawn(dispatch(rx, presenters));

    let checker = Checker::new(
        config.clone(),
        Box::new(ChromeSession::new(config.browser.clone())),
        tx,
    );
    checker.set_input(args.file.clone()).await;

    let save = args.save.clone();
    let scheduled = checker.run_scheduled(args.once, |rows| {
        if let Some(path) = &save {
            match sheet::save_results(path, rows, precision) {
                Ok(()) => info!("Saved {} rows to {}", rows.len(), path.display()),
                Err(e) => error!("Failed to save results to {}: {}", path.display(), e),
            }
        }
    });

    tokio::select! {
        result = scheduled => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
            presentation.abort();
            return Ok(());
        }
    }

    drop(checker);
    if let Err(e) = presentation.await {
        error!("Presentation task failed: {}", e);
    }

    Ok(())
}
