use super::ReconcileError;
use contracts::usecases::u501_sync_vendor_feed::{OfferId, StockRecord, VendorRow};
use std::collections::HashSet;

/// "Больше 10 штук" в отчёте поставщика
pub const MORE_THAN_TEN: &str = ">10";
/// Остаток, который выставляется вместо ">10"
pub const MORE_THAN_TEN_STOCK: u32 = 100;
/// Одна штука в отчёте поставщика выгружается как нулевой остаток
pub const SINGLE_UNIT: &str = "1";

/// Перевести количество из отчёта поставщика в остаток OZON
pub fn parse_quantity(offer_id: &str, raw: &str) -> Result<u32, ReconcileError> {
    match raw.trim() {
        MORE_THAN_TEN => Ok(MORE_THAN_TEN_STOCK),
        SINGLE_UNIT => Ok(0),
        value => value
            .parse::<u32>()
            .map_err(|_| ReconcileError::InvalidQuantity {
                offer_id: offer_id.to_string(),
                value: raw.to_string(),
            }),
    }
}

/// Собрать остатки для всех артикулов каталога.
///
/// Первая строка отчёта с данным кодом выигрывает, повторы игнорируются.
/// Артикулы, которых нет в отчёте, получают нулевой остаток и идут в
/// конце списка в порядке каталога. Длина результата равна числу
/// уникальных артикулов в `known_offer_ids`.
pub fn build_stock_records(
    rows: &[VendorRow],
    known_offer_ids: &[OfferId],
) -> Result<Vec<StockRecord>, ReconcileError> {
    let mut remaining: HashSet<&str> = known_offer_ids.iter().map(String::as_str).collect();
    let mut stocks = Vec::with_capacity(remaining.len());

    for row in rows {
        if remaining.remove(row.code.as_str()) {
            let stock = parse_quantity(&row.code, &row.quantity)?;
            stocks.push(StockRecord::new(row.code.clone(), stock));
        }
    }

    for offer_id in known_offer_ids {
        if remaining.remove(offer_id.as_str()) {
            stocks.push(StockRecord::new(offer_id.clone(), 0));
        }
    }

    Ok(stocks)
}
