//! Catalog reads (cached).

use reqwest::Method;
use tracing::{debug, instrument, warn};
use vitrine_core::Product;

use super::cache::{CacheKey, CacheValue};
use super::{ApiClient, ApiError, ProductPage};

impl ApiClient {
    /// Get a product with its variants by slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self))]
    pub async fn get_product(&self, slug: &str) -> Result<Product, ApiError> {
        let cache_key = CacheKey::Product(slug.to_string());

        // Check cache
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let request = self.request(Method::GET, &format!("products/{slug}"))?;
        let product: Product = self.execute(request).await?;

        let duplicates = product.duplicate_combinations();
        if !duplicates.is_empty() {
            warn!(
                product = %product.slug,
                count = duplicates.len(),
                "Product has variants sharing the same option combination; first match wins"
            );
        }

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get a page of the product listing (1-based).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self, page: u32) -> Result<ProductPage, ApiError> {
        let page = page.max(1);
        let cache_key = CacheKey::Products { page };

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let request = self.request(Method::GET, &format!("products?page={page}"))?;
        let products: ProductPage = self.execute(request).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Invalidate a cached product.
    pub async fn invalidate_product(&self, slug: &str) {
        self.inner
            .cache
            .invalidate(&CacheKey::Product(slug.to_string()))
            .await;
    }

    /// Invalidate all cached catalog data.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}
