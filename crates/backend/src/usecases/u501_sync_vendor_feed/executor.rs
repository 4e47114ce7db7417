use super::feed_client::VendorFeed;
use super::processors::{build_price_records, build_stock_records};
use crate::shared::batch::split_into_batches;
use crate::shared::config::OzonConfig;
use crate::shared::marketplaces::MarketplaceClient;
use anyhow::{Context, Result};
use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::u501_sync_vendor_feed::{
    OfferId, SyncReport, SyncTarget, SyncVendorFeed, VendorRow,
};
use std::collections::HashSet;
use uuid::Uuid;

/// Размеры пачек для endpoint'ов импорта
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSizes {
    pub prices: usize,
    pub stocks: usize,
}

impl From<&OzonConfig> for BatchSizes {
    fn from(config: &OzonConfig) -> Self {
        Self {
            prices: config.price_batch_size,
            stocks: config.stock_batch_size,
        }
    }
}

/// Executor для UseCase синхронизации отчёта поставщика с OZON
pub struct SyncExecutor<M, F> {
    marketplace: M,
    feed: F,
    batch_sizes: BatchSizes,
}

impl<M: MarketplaceClient, F: VendorFeed> SyncExecutor<M, F> {
    pub fn new(marketplace: M, feed: F, batch_sizes: BatchSizes) -> Self {
        Self {
            marketplace,
            feed,
            batch_sizes,
        }
    }

    /// Выполнить синхронизацию.
    ///
    /// Каталог OZON и отчёт поставщика загружаются один раз, затем
    /// по очереди отправляются остатки и цены. Ошибка в любой пачке
    /// прерывает запуск.
    pub async fn run(&self, target: SyncTarget) -> Result<SyncReport> {
        let run_id = Uuid::new_v4().to_string();
        tracing::info!(
            "Starting {} '{}' ({:?}), run: {}",
            SyncVendorFeed::full_name(),
            SyncVendorFeed::display_name(),
            target,
            run_id
        );
        let mut report = SyncReport::new(run_id, target);

        if let Err(e) = self.execute(&mut report).await {
            // Отчёт остаётся в статусе running: видно, что успело уйти в OZON
            tracing::error!("Sync interrupted, {}", report.summary());
            return Err(e);
        }

        report.finish();
        tracing::info!("Sync completed, {}", report.summary());
        Ok(report)
    }

    async fn execute(&self, report: &mut SyncReport) -> Result<()> {
        let target = report.target;

        let known_offer_ids = dedupe_offer_ids(
            self.marketplace
                .list_offer_ids()
                .await
                .context("Failed to list OZON products")?,
        );
        report.known_offers = known_offer_ids.len();
        tracing::info!("OZON catalog: {} offers", known_offer_ids.len());

        let rows = self
            .feed
            .fetch_rows()
            .await
            .context("Failed to fetch vendor feed")?;
        report.vendor_rows = rows.len();

        if target.includes_stocks() {
            self.sync_stocks(report, &rows, &known_offer_ids).await?;
        }
        if target.includes_prices() {
            self.sync_prices(report, &rows, &known_offer_ids).await?;
        }

        Ok(())
    }

    async fn sync_stocks(
        &self,
        report: &mut SyncReport,
        rows: &[VendorRow],
        known_offer_ids: &[OfferId],
    ) -> Result<()> {
        let stocks = build_stock_records(rows, known_offer_ids)?;
        report.stocks.records = stocks.len();
        report.in_stock = stocks.iter().filter(|s| s.is_in_stock()).count();
        tracing::info!(
            "Uploading {} stocks ({} in stock)",
            stocks.len(),
            report.in_stock
        );

        for (index, batch) in split_into_batches(&stocks, self.batch_sizes.stocks)?.enumerate() {
            let outcome = self
                .marketplace
                .push_stocks(batch)
                .await
                .with_context(|| format!("Stock batch {} failed", index + 1))?;
            report.stocks.batches += 1;
            report.stocks.rejected += outcome.rejected;
            tracing::debug!(
                "Stock batch {}: {} sent, {} rejected",
                index + 1,
                outcome.submitted,
                outcome.rejected
            );
        }
        Ok(())
    }

    async fn sync_prices(
        &self,
        report: &mut SyncReport,
        rows: &[VendorRow],
        known_offer_ids: &[OfferId],
    ) -> Result<()> {
        let prices = build_price_records(rows, known_offer_ids)?;
        report.prices.records = prices.len();
        tracing::info!("Uploading {} prices", prices.len());

        for (index, batch) in split_into_batches(&prices, self.batch_sizes.prices)?.enumerate() {
            let outcome = self
                .marketplace
                .push_prices(batch)
                .await
                .with_context(|| format!("Price batch {} failed", index + 1))?;
            report.prices.batches += 1;
            report.prices.rejected += outcome.rejected;
            tracing::debug!(
                "Price batch {}: {} sent, {} rejected",
                index + 1,
                outcome.submitted,
                outcome.rejected
            );
        }
        Ok(())
    }
}

/// Убрать повторы, сохранив порядок каталога
fn dedupe_offer_ids(offer_ids: Vec<OfferId>) -> Vec<OfferId> {
    let mut seen = HashSet::with_capacity(offer_ids.len());
    offer_ids
        .into_iter()
        .filter(|id| seen.insert(id.clone()))
        .collect()
}
