use super::ReconcileError;
use contracts::usecases::u501_sync_vendor_feed::{OfferId, PriceRecord, VendorRow};
use std::collections::HashSet;

/// Оставить в цене только цифры целой части.
///
/// Всё после первой точки отбрасывается без округления, из остатка
/// удаляются разделители разрядов, валюта и пробелы. `None`, если цифр нет.
///
/// ```ignore
/// assert_eq!(normalize_price("5'990.00").as_deref(), Some("5990"));
/// ```
pub fn normalize_price(raw: &str) -> Option<String> {
    let integer_part = raw.split('.').next().unwrap_or_default();
    let digits: String = integer_part.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

/// Собрать цены для строк отчёта, чей код есть в каталоге.
///
/// Порядок как в отчёте; повторы кода дают повторные записи.
pub fn build_price_records(
    rows: &[VendorRow],
    known_offer_ids: &[OfferId],
) -> Result<Vec<PriceRecord>, ReconcileError> {
    let known: HashSet<&str> = known_offer_ids.iter().map(String::as_str).collect();

    rows.iter()
        .filter(|row| known.contains(row.code.as_str()))
        .map(|row| {
            normalize_price(&row.price)
                .map(|price| PriceRecord::new(row.code.clone(), price))
                .ok_or_else(|| ReconcileError::InvalidPrice {
                    offer_id: row.code.clone(),
                    value: row.price.clone(),
                })
        })
        .collect()
}
