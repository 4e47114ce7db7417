use super::request::SyncTarget;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Итог одного запуска синхронизации
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub run_id: String,
    pub target: SyncTarget,
    pub status: SyncStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,

    /// Количество артикулов в каталоге OZON
    pub known_offers: usize,
    /// Количество строк в отчёте поставщика
    pub vendor_rows: usize,
    /// Сколько артикулов ушло с ненулевым остатком
    pub in_stock: usize,

    pub stocks: EndpointStats,
    pub prices: EndpointStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Running,

    /// Все отправленные записи приняты
    Completed,

    /// OZON ответил 200, но часть записей не обновлена
    CompletedWithRejections,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Running => "running",
            SyncStatus::Completed => "completed",
            SyncStatus::CompletedWithRejections => "completed_with_rejections",
        }
    }
}

/// Статистика отправки по одному endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointStats {
    pub records: usize,
    pub batches: usize,
    pub rejected: usize,
}

impl SyncReport {
    pub fn new(run_id: String, target: SyncTarget) -> Self {
        Self {
            run_id,
            target,
            status: SyncStatus::Running,
            started_at: Utc::now(),
            completed_at: None,
            known_offers: 0,
            vendor_rows: 0,
            in_stock: 0,
            stocks: EndpointStats::default(),
            prices: EndpointStats::default(),
        }
    }

    pub fn total_rejected(&self) -> usize {
        self.stocks.rejected + self.prices.rejected
    }

    /// Однострочная сводка для логов, в том числе по прерванному запуску
    pub fn summary(&self) -> String {
        format!(
            "run {} [{}]: catalog {}, feed rows {}, stocks {}/{} batches ({} rejected), prices {}/{} batches ({} rejected)",
            self.run_id,
            self.status.as_str(),
            self.known_offers,
            self.vendor_rows,
            self.stocks.records,
            self.stocks.batches,
            self.stocks.rejected,
            self.prices.records,
            self.prices.batches,
            self.prices.rejected,
        )
    }

    pub fn finish(&mut self) {
        self.status = if self.total_rejected() > 0 {
            SyncStatus::CompletedWithRejections
        } else {
            SyncStatus::Completed
        };
        self.completed_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_without_rejections() {
        let mut report = SyncReport::new("run".into(), SyncTarget::All);
        report.stocks.records = 3;
        report.finish();
        assert_eq!(report.status, SyncStatus::Completed);
        assert!(report.completed_at.is_some());
    }

    #[test]
    fn test_finish_with_rejections() {
        let mut report = SyncReport::new("run".into(), SyncTarget::Prices);
        report.prices.rejected = 2;
        report.finish();
        assert_eq!(report.status, SyncStatus::CompletedWithRejections);
        assert_eq!(report.total_rejected(), 2);
    }

    #[test]
    fn test_summary_of_interrupted_run() {
        let mut report = SyncReport::new("run-1".into(), SyncTarget::All);
        report.stocks.records = 100;
        report.stocks.batches = 1;

        let summary = report.summary();
        assert!(summary.contains("run-1 [running]"));
        assert!(summary.contains("stocks 100/1 batches"));
        assert!(summary.contains("prices 0/0 batches"));
    }

    #[test]
    fn test_status_matches_serde_name() {
        for status in [
            SyncStatus::Running,
            SyncStatus::Completed,
            SyncStatus::CompletedWithRejections,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }
}
