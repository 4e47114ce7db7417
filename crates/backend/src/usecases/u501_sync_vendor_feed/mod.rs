pub mod executor;
pub mod feed_client;
pub mod ozon_api_client;
pub mod processors;

pub use executor::{BatchSizes, SyncExecutor};
pub use feed_client::{FeedClient, VendorFeed};
pub use ozon_api_client::OzonApiClient;
