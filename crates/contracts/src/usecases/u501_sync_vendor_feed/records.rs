use serde::{Deserialize, Serialize};

/// Артикул товара в каталоге маркетплейса (offer_id), регистр значим
pub type OfferId = String;

/// Валюта, в которой передаются цены
pub const CURRENCY_RUB: &str = "RUB";

/// Значение флагов OZON "оставить как есть"
pub const FLAG_UNKNOWN: &str = "UNKNOWN";

/// Строка складского отчёта поставщика.
///
/// Значения хранятся в том виде, в каком их показывает таблица:
/// целые числа без дробной части, пустые ячейки как пустые строки.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorRow {
    /// Код товара, совпадает с offer_id в OZON
    pub code: String,
    /// Количество: число, ">10" или "1"
    pub quantity: String,
    /// Цена в формате поставщика, например "5'990.00"
    pub price: String,
}

impl VendorRow {
    pub fn new(
        code: impl Into<String>,
        quantity: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            quantity: quantity.into(),
            price: price.into(),
        }
    }
}

/// Элемент запроса /v1/product/import/stocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    pub offer_id: OfferId,
    pub stock: u32,
}

impl StockRecord {
    pub fn new(offer_id: impl Into<OfferId>, stock: u32) -> Self {
        Self {
            offer_id: offer_id.into(),
            stock,
        }
    }

    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Элемент запроса /v1/product/import/prices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub auto_action_enabled: String,
    pub currency_code: String,
    pub offer_id: OfferId,
    /// Цена до скидки; "0" означает "без зачёркнутой цены"
    pub old_price: String,
    /// Только цифры, без дробной части
    pub price: String,
}

impl PriceRecord {
    pub fn new(offer_id: impl Into<OfferId>, price: impl Into<String>) -> Self {
        Self {
            auto_action_enabled: FLAG_UNKNOWN.to_string(),
            currency_code: CURRENCY_RUB.to_string(),
            offer_id: offer_id.into(),
            old_price: "0".to_string(),
            price: price.into(),
        }
    }
}
