pub mod records;
pub mod report;
pub mod request;

pub use records::{OfferId, PriceRecord, StockRecord, VendorRow};
pub use report::{EndpointStats, SyncReport, SyncStatus};
pub use request::SyncTarget;

use crate::usecases::common::UseCaseMetadata;

/// Максимум записей в одном запросе /v1/product/import/prices
pub const MAX_PRICES_PER_REQUEST: usize = 1000;

/// Максимум записей в одном запросе /v1/product/import/stocks
pub const MAX_STOCKS_PER_REQUEST: usize = 100;

/// Максимальный размер страницы /v3/product/list
pub const MAX_PRODUCT_LIST_PAGE: u32 = 1000;

pub struct SyncVendorFeed;

impl UseCaseMetadata for SyncVendorFeed {
    fn usecase_index() -> &'static str {
        "u501"
    }

    fn usecase_name() -> &'static str {
        "sync_vendor_feed"
    }

    fn display_name() -> &'static str {
        "Синхронизация остатков и цен с OZON"
    }
}
