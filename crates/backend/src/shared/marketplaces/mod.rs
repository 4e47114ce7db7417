use anyhow::Result;
use async_trait::async_trait;
use contracts::usecases::u501_sync_vendor_feed::{OfferId, PriceRecord, StockRecord};

/// Результат отправки одной пачки записей.
///
/// OZON отвечает 200 даже если часть записей не применена, такие записи
/// только подсчитываются.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    pub submitted: usize,
    pub rejected: usize,
}

/// Трейт для клиента маркетплейса
#[async_trait]
pub trait MarketplaceClient: Send + Sync {
    /// Все артикулы каталога (постранично, в порядке выдачи)
    async fn list_offer_ids(&self) -> Result<Vec<OfferId>>;

    /// Отправить пачку цен (не больше лимита endpoint)
    async fn push_prices(&self, batch: &[PriceRecord]) -> Result<ImportOutcome>;

    /// Отправить пачку остатков (не больше лимита endpoint)
    async fn push_stocks(&self, batch: &[StockRecord]) -> Result<ImportOutcome>;
}
