pub mod shared;
pub mod usecases;

use clap::{Parser, Subcommand};
use contracts::usecases::u501_sync_vendor_feed::{SyncReport, SyncTarget};
use shared::config::{get_log_file_path, load_config, Credentials};
use shared::failure::failure_message;
use std::path::PathBuf;
use usecases::u501_sync_vendor_feed::{BatchSizes, FeedClient, OzonApiClient, SyncExecutor};

/// Выгрузка остатков и цен из отчёта поставщика в OZON
#[derive(Debug, Parser)]
#[command(name = "ozon-stock-sync", version, about)]
struct Cli {
    /// Путь к config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Command {
    /// Остатки, затем цены (по умолчанию)
    All,
    /// Только остатки
    Stocks,
    /// Только цены
    Prices,
}

impl From<Command> for SyncTarget {
    fn from(command: Command) -> Self {
        match command {
            Command::All => SyncTarget::All,
            Command::Stocks => SyncTarget::Stocks,
            Command::Prices => SyncTarget::Prices,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let cli = Cli::parse();
    let (config, source) = load_config(cli.config.as_deref())?;
    config.validate()?;

    // Создаем директорию для логов
    let log_file_path = get_log_file_path(&config.logging);
    if let Some(log_dir) = log_file_path.parent() {
        std::fs::create_dir_all(log_dir)?;
    }
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| {
                // Тела запросов reqwest/hyper не нужны в обычном режиме
                "info,reqwest=warn,hyper=warn".into()
            }),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Arc::new(log_file))
                .with_ansi(false),
        )
        .init();

    tracing::info!("Loaded config from: {}", source);

    let credentials = Credentials::from_env()?;
    let target = cli.command.map(SyncTarget::from).unwrap_or_default();

    let executor = SyncExecutor::new(
        OzonApiClient::new(&config.ozon, credentials)?,
        FeedClient::new(&config.feed)?,
        BatchSizes::from(&config.ozon),
    );

    match executor.run(target).await {
        Ok(report) => log_report(&report),
        Err(e) => {
            // Сбой синхронизации не роняет процесс: сообщение и штатный выход
            let message = failure_message(&e);
            tracing::error!("{}", message);
            eprintln!("{}", message);
        }
    }

    Ok(())
}

fn log_report(report: &SyncReport) {
    tracing::info!("Finished {}", report.summary());
    if report.target.includes_stocks() {
        tracing::info!(
            "Stocks: {} sent in {} batches, {} in stock, {} rejected",
            report.stocks.records,
            report.stocks.batches,
            report.in_stock,
            report.stocks.rejected
        );
    }
    if report.target.includes_prices() {
        tracing::info!(
            "Prices: {} sent in {} batches, {} rejected",
            report.prices.records,
            report.prices.batches,
            report.prices.rejected
        );
    }
}
