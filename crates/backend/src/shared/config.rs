use contracts::usecases::u501_sync_vendor_feed::{
    MAX_PRICES_PER_REQUEST, MAX_PRODUCT_LIST_PAGE, MAX_STOCKS_PER_REQUEST,
};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Переменная окружения с Client-Id продавца
pub const CLIENT_ID_VAR: &str = "CLIENT_ID";

/// Переменная окружения с Api-Key продавца
pub const SELLER_TOKEN_VAR: &str = "SELLER_TOKEN";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub ozon: OzonConfig,
    pub feed: FeedConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OzonConfig {
    pub base_url: String,
    #[serde(default = "default_ozon_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_price_batch_size")]
    pub price_batch_size: usize,
    #[serde(default = "default_stock_batch_size")]
    pub stock_batch_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    pub url: String,
    #[serde(default = "default_feed_timeout")]
    pub request_timeout_secs: u64,
    /// Имя таблицы внутри zip-архива
    #[serde(default = "default_archive_entry")]
    pub archive_entry: String,
    /// Номер строки заголовка (с нуля), всё выше неё пропускается
    #[serde(default = "default_header_rows")]
    pub header_rows: usize,
    #[serde(default = "default_code_column")]
    pub code_column: String,
    #[serde(default = "default_quantity_column")]
    pub quantity_column: String,
    #[serde(default = "default_price_column")]
    pub price_column: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default = "default_log_file")]
    pub file_name: String,
}

fn default_ozon_timeout() -> u64 {
    30
}

fn default_feed_timeout() -> u64 {
    120
}

fn default_page_size() -> u32 {
    MAX_PRODUCT_LIST_PAGE
}

fn default_price_batch_size() -> usize {
    MAX_PRICES_PER_REQUEST
}

fn default_stock_batch_size() -> usize {
    MAX_STOCKS_PER_REQUEST
}

fn default_archive_entry() -> String {
    "ostatki.xls".to_string()
}

fn default_header_rows() -> usize {
    17
}

fn default_code_column() -> String {
    "Код".to_string()
}

fn default_quantity_column() -> String {
    "Количество".to_string()
}

fn default_price_column() -> String {
    "Цена".to_string()
}

fn default_log_dir() -> String {
    "target/logs".to_string()
}

fn default_log_file() -> String {
    "ozon-stock-sync.log".to_string()
}

impl Default for OzonConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api-seller.ozon.ru".to_string(),
            request_timeout_secs: default_ozon_timeout(),
            page_size: default_page_size(),
            price_batch_size: default_price_batch_size(),
            stock_batch_size: default_stock_batch_size(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: "https://timeworld.ru/upload/files/ostatki.zip".to_string(),
            request_timeout_secs: default_feed_timeout(),
            archive_entry: default_archive_entry(),
            header_rows: default_header_rows(),
            code_column: default_code_column(),
            quantity_column: default_quantity_column(),
            price_column: default_price_column(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            file_name: default_log_file(),
        }
    }
}

impl Config {
    /// Проверить лимиты OZON и обязательные поля
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.ozon.base_url.trim().is_empty() {
            anyhow::bail!("ozon.base_url must not be empty");
        }
        if self.feed.url.trim().is_empty() {
            anyhow::bail!("feed.url must not be empty");
        }
        if self.ozon.page_size == 0 || self.ozon.page_size > MAX_PRODUCT_LIST_PAGE {
            anyhow::bail!(
                "ozon.page_size must be between 1 and {}, got {}",
                MAX_PRODUCT_LIST_PAGE,
                self.ozon.page_size
            );
        }
        if self.ozon.price_batch_size == 0 || self.ozon.price_batch_size > MAX_PRICES_PER_REQUEST {
            anyhow::bail!(
                "ozon.price_batch_size must be between 1 and {}, got {}",
                MAX_PRICES_PER_REQUEST,
                self.ozon.price_batch_size
            );
        }
        if self.ozon.stock_batch_size == 0 || self.ozon.stock_batch_size > MAX_STOCKS_PER_REQUEST {
            anyhow::bail!(
                "ozon.stock_batch_size must be between 1 and {}, got {}",
                MAX_STOCKS_PER_REQUEST,
                self.ozon.stock_batch_size
            );
        }
        Ok(())
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[ozon]
base_url = "https://api-seller.ozon.ru"

[feed]
url = "https://timeworld.ru/upload/files/ostatki.zip"

[logging]
dir = "target/logs"
"#;

/// Откуда была взята конфигурация
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    NextToExecutable(PathBuf),
    Embedded,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Explicit(path) => write!(f, "{}", path.display()),
            ConfigSource::NextToExecutable(path) => {
                write!(f, "{} (next to executable)", path.display())
            }
            ConfigSource::Embedded => write!(f, "embedded default"),
        }
    }
}

/// Load configuration
///
/// Search order:
/// 1. Path given on the command line
/// 2. config.toml next to the executable
/// 3. Embedded default config
///
/// Logging is not initialised yet at this point, so the source is returned
/// to the caller instead of being logged here.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<(Config, ConfigSource)> {
    if let Some(path) = explicit {
        let config = read_config_file(path)?;
        return Ok((config, ConfigSource::Explicit(path.to_path_buf())));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");
            if config_path.exists() {
                let config = read_config_file(&config_path)?;
                return Ok((config, ConfigSource::NextToExecutable(config_path)));
            }
        }
    }

    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok((config, ConfigSource::Embedded))
}

fn read_config_file(path: &Path) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))?;
    Ok(config)
}

/// Get the log file path from configuration
/// Resolves relative directories relative to the current directory
pub fn get_log_file_path(config: &LoggingConfig) -> PathBuf {
    Path::new(&config.dir).join(&config.file_name)
}

/// Учётные данные OZON Seller API
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub api_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("api_key", &"****")
            .finish()
    }
}

impl Credentials {
    /// Прочитать CLIENT_ID и SELLER_TOKEN из окружения
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let read = |name: &str| -> anyhow::Result<String> {
            match lookup(name) {
                Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
                _ => anyhow::bail!("Environment variable {} is required", name),
            }
        };

        Ok(Self {
            client_id: read(CLIENT_ID_VAR)?,
            api_key: read(SELLER_TOKEN_VAR)?,
        })
    }
}
