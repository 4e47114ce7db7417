use crate::shared::config::FeedConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use contracts::usecases::u501_sync_vendor_feed::VendorRow;
use std::io::{Cursor, Read};

/// Источник строк складского отчёта поставщика
#[async_trait]
pub trait VendorFeed: Send + Sync {
    async fn fetch_rows(&self) -> Result<Vec<VendorRow>>;
}

/// Загрузка zip-архива с таблицей остатков поставщика
pub struct FeedClient {
    client: reqwest::Client,
    config: FeedConfig,
}

impl FeedClient {
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Скачать архив целиком в память
    pub async fn download_archive(&self) -> Result<Vec<u8>> {
        tracing::info!("Downloading vendor feed from {}", self.config.url);

        let response = self
            .client
            .get(&self.config.url)
            .send()
            .await?
            .error_for_status()?;
        let bytes = response.bytes().await?;

        tracing::debug!("Vendor feed archive: {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl VendorFeed for FeedClient {
    async fn fetch_rows(&self) -> Result<Vec<VendorRow>> {
        let archive = self.download_archive().await?;
        let (entry, spreadsheet) = extract_spreadsheet(&archive, &self.config.archive_entry)?;
        let rows = parse_spreadsheet(spreadsheet, &self.config)
            .with_context(|| format!("Failed to parse {} from vendor feed", entry))?;
        tracing::info!("Vendor feed {}: {} rows", entry, rows.len());
        Ok(rows)
    }
}

fn is_spreadsheet(name: &str) -> bool {
    let name = name.to_lowercase();
    name.ends_with(".xls") || name.ends_with(".xlsx")
}

/// Достать таблицу из архива.
///
/// Берётся запись с именем `entry`; если её нет, то единственная таблица
/// в архиве. Распаковка идёт в память, на диск ничего не пишется.
pub fn extract_spreadsheet(archive: &[u8], entry: &str) -> Result<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(archive))
        .context("Vendor feed is not a valid zip archive")?;

    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    let name = if names.iter().any(|n| n == entry) {
        entry.to_string()
    } else {
        let candidates: Vec<&String> = names.iter().filter(|n| is_spreadsheet(n)).collect();
        match candidates.as_slice() {
            [only] => {
                tracing::warn!("{} not found in vendor archive, using {}", entry, only);
                only.to_string()
            }
            [] => anyhow::bail!("Vendor archive contains no spreadsheet (entries: {:?})", names),
            _ => anyhow::bail!(
                "{} not found in vendor archive and several spreadsheets present: {:?}",
                entry,
                candidates
            ),
        }
    };

    let mut file = archive
        .by_name(&name)
        .with_context(|| format!("Failed to open {} in vendor archive", name))?;
    // размер из заголовка zip не проверен, поэтому без with_capacity
    let mut data = Vec::new();
    file.read_to_end(&mut data)
        .with_context(|| format!("Failed to extract {} from vendor archive", name))?;

    Ok((name, data))
}

/// Разобрать первый лист таблицы.
///
/// Строка `header_rows` (с нуля, от начала листа) содержит заголовки,
/// данные идут ниже. Полностью пустые строки пропускаются.
pub fn parse_spreadsheet(data: Vec<u8>, config: &FeedConfig) -> Result<Vec<VendorRow>> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(data)).context("Failed to open vendor spreadsheet")?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow::anyhow!("Vendor spreadsheet has no worksheets"))?
        .context("Failed to read first worksheet")?;

    // calamine отдаёт диапазон с первой непустой строки, а не с начала листа
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let skip = config.header_rows.checked_sub(first_row).ok_or_else(|| {
        anyhow::anyhow!(
            "Header row {} is above the first used row {}",
            config.header_rows,
            first_row
        )
    })?;

    let mut rows = range.rows().skip(skip);
    let header = rows.next().ok_or_else(|| {
        anyhow::anyhow!(
            "Vendor spreadsheet has no header row {}",
            config.header_rows
        )
    })?;
    let labels: Vec<String> = header.iter().map(cell_to_string).collect();

    let column = |label: &str| -> Result<usize> {
        labels
            .iter()
            .position(|l| l == label)
            .ok_or_else(|| anyhow::anyhow!("Column {:?} not found in header {:?}", label, labels))
    };
    let code_idx = column(&config.code_column)?;
    let quantity_idx = column(&config.quantity_column)?;
    let price_idx = column(&config.price_column)?;

    let cell = |row: &[Data], idx: usize| row.get(idx).map(cell_to_string).unwrap_or_default();

    let vendor_rows = rows
        .filter(|row| row.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|row| VendorRow {
            code: cell(row, code_idx),
            quantity: cell(row, quantity_idx),
            price: cell(row, price_idx),
        })
        .collect();

    Ok(vendor_rows)
}

/// Значение ячейки так, как его показывает таблица
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        // коды и количества хранятся как числа, "12345.0" не совпадёт с offer_id
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string().trim().to_string(),
    }
}
