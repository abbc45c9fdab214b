//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::models::product::{Product, ProductPage};
use crate::services::{AssistantClient, GatewayClient, VideoClient};

/// Catalog cache TTL. Admin edits show up in the storefront within this
/// window at the latest.
const CATALOG_CACHE_TTL: Duration = Duration::from_secs(60);
const CATALOG_CACHE_CAPACITY: u64 = 1_000;

/// Cache key for catalog reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CatalogCacheKey {
    /// A listing page: (category, search, page, `per_page`).
    List(Option<String>, Option<String>, u32, u32),
    /// One product detail page.
    Product(i32),
    /// The distinct category list.
    Categories,
}

/// Cached catalog value.
#[derive(Debug, Clone)]
pub enum CatalogCacheValue {
    Page(ProductPage),
    Product(Product),
    Categories(Vec<String>),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    gateway: GatewayClient,
    assistant: AssistantClient,
    video: Option<VideoClient>,
    catalog_cache: Cache<CatalogCacheKey, CatalogCacheValue>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let gateway = GatewayClient::new(&config.payment);
        let assistant = AssistantClient::new(&config.assistant);
        let video = config.video.as_ref().map(VideoClient::new);
        let catalog_cache = Cache::builder()
            .max_capacity(CATALOG_CACHE_CAPACITY)
            .time_to_live(CATALOG_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                gateway,
                assistant,
                video,
                catalog_cache,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the payment gateway client.
    #[must_use]
    pub fn gateway(&self) -> &GatewayClient {
        &self.inner.gateway
    }

    /// Get a reference to the design assistant client.
    #[must_use]
    pub fn assistant(&self) -> &AssistantClient {
        &self.inner.assistant
    }

    /// Get the video provider client, if the feature is configured.
    #[must_use]
    pub fn video(&self) -> Option<&VideoClient> {
        self.inner.video.as_ref()
    }

    /// Get a reference to the catalog read cache.
    #[must_use]
    pub fn catalog_cache(&self) -> &Cache<CatalogCacheKey, CatalogCacheValue> {
        &self.inner.catalog_cache
    }
}
