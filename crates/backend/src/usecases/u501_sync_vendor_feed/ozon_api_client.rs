use crate::shared::config::{Credentials, OzonConfig};
use crate::shared::marketplaces::{ImportOutcome, MarketplaceClient};
use anyhow::Result;
use async_trait::async_trait;
use contracts::usecases::u501_sync_vendor_feed::{
    OfferId, PriceRecord, StockRecord, MAX_PRICES_PER_REQUEST, MAX_STOCKS_PER_REQUEST,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const PRODUCT_LIST_PATH: &str = "/v3/product/list";
const IMPORT_PRICES_PATH: &str = "/v1/product/import/prices";
const IMPORT_STOCKS_PATH: &str = "/v1/product/import/stocks";

/// HTTP-клиент для работы с OZON Seller API
pub struct OzonApiClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    page_size: u32,
}

impl OzonApiClient {
    pub fn new(config: &OzonConfig, credentials: Credentials) -> Result<Self> {
        // Проверка обязательных полей для OZON API
        if credentials.client_id.trim().is_empty() {
            anyhow::bail!("Client-Id is required for OZON API");
        }
        if credentials.api_key.trim().is_empty() {
            anyhow::bail!("Api-Key is required for OZON API");
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
            page_size: config.page_size,
        })
    }

    /// POST с JSON-телом, разбор JSON-ответа
    async fn post_json<Req, Resp>(&self, path: &str, request_body: &Req) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let body = serde_json::to_string(request_body)?;
        tracing::debug!(
            "POST {} Client-Id: {} Api-Key: **** Body: {}",
            url,
            self.credentials.client_id,
            preview(&body)
        );

        let response = self
            .client
            .post(&url)
            .header("Client-Id", &self.credentials.client_id)
            .header("Api-Key", &self.credentials.api_key)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("OZON API request {} failed: {}", path, body);
            anyhow::bail!("OZON API request {} failed with status {}: {}", path, status, body);
        }

        let body = response.text().await?;
        tracing::debug!("OZON API response preview: {}", preview(&body));

        match serde_json::from_str::<Resp>(&body) {
            Ok(data) => Ok(data),
            Err(e) => {
                tracing::error!("Failed to parse OZON API response from {}. Error: {}", path, e);
                anyhow::bail!(
                    "Failed to parse OZON API JSON from {}: {}. Response: {}",
                    path,
                    e,
                    preview(&body)
                )
            }
        }
    }

    /// Получить страницу списка товаров через POST /v3/product/list
    pub async fn fetch_product_list(
        &self,
        last_id: Option<String>,
    ) -> Result<OzonProductListResponse> {
        let request_body = OzonProductListRequest {
            filter: Some(OzonProductListFilter {
                visibility: Some("ALL".to_string()),
            }),
            last_id: last_id.unwrap_or_default(),
            limit: self.page_size,
        };
        self.post_json(PRODUCT_LIST_PATH, &request_body).await
    }

    /// Пройти все страницы каталога и собрать offer_id.
    ///
    /// Остановка: накоплено столько, сколько OZON сообщил в `total`,
    /// либо пришла пустая страница. Неполная страница без нового курсора
    /// считается ошибкой: повторный запрос вернул бы первую страницу.
    pub async fn fetch_offer_ids(&self) -> Result<Vec<OfferId>> {
        let mut offer_ids: Vec<OfferId> = Vec::new();
        let mut last_id: Option<String> = None;

        loop {
            let page = self.fetch_product_list(last_id.clone()).await?.result;
            let page_len = page.items.len();
            offer_ids.extend(page.items.into_iter().map(|item| item.offer_id));

            tracing::debug!(
                "Product list page: {} items, {} of {} collected",
                page_len,
                offer_ids.len(),
                page.total
            );

            if offer_ids.len() as u64 >= page.total {
                break;
            }
            if page_len == 0 {
                tracing::warn!(
                    "OZON returned an empty page with {} of {} products collected",
                    offer_ids.len(),
                    page.total
                );
                break;
            }
            if page.last_id.is_empty() || last_id.as_deref() == Some(page.last_id.as_str()) {
                anyhow::bail!(
                    "OZON product list returned no new cursor (last_id {:?}) with {} of {} products collected",
                    page.last_id,
                    offer_ids.len(),
                    page.total
                );
            }
            last_id = Some(page.last_id);
        }

        Ok(offer_ids)
    }

    /// Обновить цены через POST /v1/product/import/prices (до 1000 за раз)
    pub async fn import_prices(&self, prices: &[PriceRecord]) -> Result<OzonImportResponse> {
        if prices.len() > MAX_PRICES_PER_REQUEST {
            anyhow::bail!(
                "Price batch of {} exceeds OZON limit of {}",
                prices.len(),
                MAX_PRICES_PER_REQUEST
            );
        }
        self.post_json(IMPORT_PRICES_PATH, &OzonImportPricesRequest { prices })
            .await
    }

    /// Обновить остатки через POST /v1/product/import/stocks (до 100 за раз)
    pub async fn import_stocks(&self, stocks: &[StockRecord]) -> Result<OzonImportResponse> {
        if stocks.len() > MAX_STOCKS_PER_REQUEST {
            anyhow::bail!(
                "Stock batch of {} exceeds OZON limit of {}",
                stocks.len(),
                MAX_STOCKS_PER_REQUEST
            );
        }
        self.post_json(IMPORT_STOCKS_PATH, &OzonImportStocksRequest { stocks })
            .await
    }
}

#[async_trait]
impl MarketplaceClient for OzonApiClient {
    async fn list_offer_ids(&self) -> Result<Vec<OfferId>> {
        self.fetch_offer_ids().await
    }

    async fn push_prices(&self, batch: &[PriceRecord]) -> Result<ImportOutcome> {
        let response = self.import_prices(batch).await?;
        Ok(response.outcome(batch.len(), "price"))
    }

    async fn push_stocks(&self, batch: &[StockRecord]) -> Result<ImportOutcome> {
        let response = self.import_stocks(batch).await?;
        Ok(response.outcome(batch.len(), "stock"))
    }
}

fn preview(body: &str) -> String {
    let preview: String = body.chars().take(500).collect();
    if preview.len() < body.len() {
        format!("{}...", preview)
    } else {
        preview
    }
}

// ============================================================================
// Request/Response structures для OZON API
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonProductListRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<OzonProductListFilter>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_id: String,
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonProductListFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonProductListResponse {
    pub result: OzonProductListResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonProductListResult {
    pub items: Vec<OzonProductListItem>,
    pub total: u64,
    #[serde(default)]
    pub last_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonProductListItem {
    pub product_id: i64,
    pub offer_id: String,
}

#[derive(Debug, Serialize)]
struct OzonImportPricesRequest<'a> {
    prices: &'a [PriceRecord],
}

#[derive(Debug, Serialize)]
struct OzonImportStocksRequest<'a> {
    stocks: &'a [StockRecord],
}

/// Ответ /v1/product/import/prices и /v1/product/import/stocks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonImportResponse {
    #[serde(default)]
    pub result: Vec<OzonImportItemResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonImportItemResult {
    #[serde(default)]
    pub product_id: i64,
    #[serde(default)]
    pub offer_id: String,
    #[serde(default)]
    pub updated: bool,
    #[serde(default)]
    pub errors: Vec<OzonImportItemError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonImportItemError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl OzonImportResponse {
    /// Записи, которые OZON не применил
    pub fn rejected(&self) -> impl Iterator<Item = &OzonImportItemResult> {
        self.result
            .iter()
            .filter(|item| !item.updated || !item.errors.is_empty())
    }

    /// Подсчитать отказы и залогировать их; ошибкой это не считается
    fn outcome(&self, submitted: usize, kind: &str) -> ImportOutcome {
        let mut rejected = 0;
        for item in self.rejected() {
            rejected += 1;
            let reasons: Vec<String> = item
                .errors
                .iter()
                .map(|e| format!("{} {}", e.code, e.message).trim().to_string())
                .collect();
            tracing::warn!(
                "OZON did not apply {} update for {}: {}",
                kind,
                item.offer_id,
                reasons.join("; ")
            );
        }
        ImportOutcome {
            submitted,
            rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_with_mock(mock_uri: &str) -> OzonApiClient {
        let config = OzonConfig {
            base_url: mock_uri.to_string(),
            page_size: 2,
            ..OzonConfig::default()
        };
        let credentials = Credentials {
            client_id: "12345".to_string(),
            api_key: "test_key".to_string(),
        };
        OzonApiClient::new(&config, credentials).unwrap()
    }

    fn product_page(offer_ids: &[&str], total: u64, last_id: &str) -> serde_json::Value {
        let items: Vec<serde_json::Value> = offer_ids
            .iter()
            .enumerate()
            .map(|(i, id)| json!({ "product_id": i as i64 + 1, "offer_id": id }))
            .collect();
        json!({ "result": { "items": items, "total": total, "last_id": last_id } })
    }

    #[test]
    fn test_new_rejects_blank_credentials() {
        let credentials = Credentials {
            client_id: "12345".to_string(),
            api_key: "  ".to_string(),
        };
        assert!(OzonApiClient::new(&OzonConfig::default(), credentials).is_err());

        let credentials = Credentials {
            client_id: String::new(),
            api_key: "key".to_string(),
        };
        assert!(OzonApiClient::new(&OzonConfig::default(), credentials).is_err());
    }

    #[tokio::test]
    async fn test_fetch_offer_ids_follows_cursor() {
        let mock_server = MockServer::start().await;
        let client = client_with_mock(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path("/v3/product/list"))
            .and(header("Client-Id", "12345"))
            .and(header("Api-Key", "test_key"))
            .and(body_json(json!({ "filter": { "visibility": "ALL" }, "limit": 2 })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(product_page(&["A", "B"], 3, "cursor-1")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v3/product/list"))
            .and(body_json(json!({
                "filter": { "visibility": "ALL" },
                "last_id": "cursor-1",
                "limit": 2
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(product_page(&["C"], 3, "cursor-2")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let offer_ids = client.fetch_offer_ids().await.unwrap();
        assert_eq!(offer_ids, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_fetch_offer_ids_stops_on_empty_page() {
        let mock_server = MockServer::start().await;
        let client = client_with_mock(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path("/v3/product/list"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(product_page(&[], 5, "")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let offer_ids = client.fetch_offer_ids().await.unwrap();
        assert!(offer_ids.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_fails() {
        let mock_server = MockServer::start().await;
        let client = client_with_mock(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path("/v3/product/list"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "code": 7,
                "message": "Invalid Api-Key, please contact support",
                "details": []
            })))
            .mount(&mock_server)
            .await;

        let err = client.fetch_offer_ids().await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("403"));
        assert!(message.contains("Invalid Api-Key"));
    }

    #[tokio::test]
    async fn test_malformed_json_fails() {
        let mock_server = MockServer::start().await;
        let client = client_with_mock(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path("/v3/product/list"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&mock_server)
            .await;

        let err = client.fetch_offer_ids().await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse OZON API JSON"));
    }

    #[tokio::test]
    async fn test_push_prices_sends_wrapped_payload() {
        let mock_server = MockServer::start().await;
        let client = client_with_mock(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path("/v1/product/import/prices"))
            .and(body_json(json!({
                "prices": [{
                    "auto_action_enabled": "UNKNOWN",
                    "currency_code": "RUB",
                    "offer_id": "PH8865",
                    "old_price": "0",
                    "price": "1448"
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": [{ "product_id": 1386, "offer_id": "PH8865", "updated": true, "errors": [] }]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let outcome = client
            .push_prices(&[PriceRecord::new("PH8865", "1448")])
            .await
            .unwrap();
        assert_eq!(outcome, ImportOutcome { submitted: 1, rejected: 0 });
    }

    #[tokio::test]
    async fn test_push_stocks_counts_item_errors_without_failing() {
        let mock_server = MockServer::start().await;
        let client = client_with_mock(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path("/v1/product/import/stocks"))
            .and(body_json(json!({
                "stocks": [
                    { "offer_id": "PH11042", "stock": 100 },
                    { "offer_id": "PH11043", "stock": 0 }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": [
                    { "product_id": 118597312, "offer_id": "PH11042", "updated": true, "errors": [] },
                    {
                        "product_id": 118597313,
                        "offer_id": "PH11043",
                        "updated": false,
                        "errors": [{ "code": "NOT_FOUND", "message": "product not found" }]
                    }
                ]
            })))
            .mount(&mock_server)
            .await;

        let outcome = client
            .push_stocks(&[
                StockRecord::new("PH11042", 100),
                StockRecord::new("PH11043", 0),
            ])
            .await
            .unwrap();
        assert_eq!(outcome, ImportOutcome { submitted: 2, rejected: 1 });
    }

    #[tokio::test]
    async fn test_oversized_stock_batch_is_rejected_locally() {
        let mock_server = MockServer::start().await;
        let client = client_with_mock(&mock_server.uri());

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let stocks: Vec<StockRecord> = (0..101)
            .map(|i| StockRecord::new(i.to_string(), 1))
            .collect();
        assert!(client.push_stocks(&stocks).await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_offer_ids_fails_without_cursor() {
        let mock_server = MockServer::start().await;
        let client = client_with_mock(&mock_server.uri());

        // неполная страница с пустым last_id: следующий запрос начал бы сначала
        Mock::given(method("POST"))
            .and(path("/v3/product/list"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(product_page(&["A", "B"], 3, "")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let err = client.fetch_offer_ids().await.unwrap_err();
        assert!(err.to_string().contains("no new cursor"));
        assert!(err.to_string().contains("2 of 3"));
    }

    #[tokio::test]
    async fn test_fetch_offer_ids_fails_on_repeated_cursor() {
        let mock_server = MockServer::start().await;
        let client = client_with_mock(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path("/v3/product/list"))
            .and(body_json(json!({ "filter": { "visibility": "ALL" }, "limit": 2 })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(product_page(&["A", "B"], 5, "cursor-1")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v3/product/list"))
            .and(body_json(json!({
                "filter": { "visibility": "ALL" },
                "last_id": "cursor-1",
                "limit": 2
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(product_page(&["C", "D"], 5, "cursor-1")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let err = client.fetch_offer_ids().await.unwrap_err();
        assert!(err.to_string().contains("4 of 5"));
    }

    #[tokio::test]
    async fn test_push_prices_error_status_fails() {
        let mock_server = MockServer::start().await;
        let client = client_with_mock(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path("/v1/product/import/prices"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "code": 13,
                "message": "internal error",
                "details": []
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let err = client
            .push_prices(&[PriceRecord::new("PH8865", "1448")])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("/v1/product/import/prices"));
    }

    #[tokio::test]
    async fn test_push_stocks_error_status_fails() {
        let mock_server = MockServer::start().await;
        let client = client_with_mock(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path("/v1/product/import/stocks"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream unavailable"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let err = client
            .push_stocks(&[StockRecord::new("PH11042", 100)])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("upstream unavailable"));
    }

    #[tokio::test]
    async fn test_oversized_price_batch_is_rejected_locally() {
        let mock_server = MockServer::start().await;
        let client = client_with_mock(&mock_server.uri());

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let prices: Vec<PriceRecord> = (0..1001)
            .map(|i| PriceRecord::new(i.to_string(), "100"))
            .collect();
        let err = client.push_prices(&prices).await.unwrap_err();
        assert!(err.to_string().contains("exceeds OZON limit of 1000"));
    }
}
