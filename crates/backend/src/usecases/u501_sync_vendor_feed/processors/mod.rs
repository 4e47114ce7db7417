pub mod prices;
pub mod stocks;

pub use prices::{build_price_records, normalize_price};
pub use stocks::{build_stock_records, parse_quantity};

use thiserror::Error;

/// Ошибки формата данных в отчёте поставщика
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("Invalid quantity {value:?} for offer {offer_id}")]
    InvalidQuantity { offer_id: String, value: String },

    #[error("Price {value:?} for offer {offer_id} has no digits")]
    InvalidPrice { offer_id: String, value: String },
}
