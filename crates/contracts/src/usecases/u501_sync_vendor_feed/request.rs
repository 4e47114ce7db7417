use serde::{Deserialize, Serialize};

/// Что именно выгружать в OZON за один запуск
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SyncTarget {
    /// Остатки, затем цены
    #[default]
    All,

    /// Только остатки
    Stocks,

    /// Только цены
    Prices,
}

impl SyncTarget {
    pub fn includes_stocks(self) -> bool {
        matches!(self, SyncTarget::All | SyncTarget::Stocks)
    }

    pub fn includes_prices(self) -> bool {
        matches!(self, SyncTarget::All | SyncTarget::Prices)
    }
}
