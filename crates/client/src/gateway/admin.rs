//! Administrative write path for the catalog.
//!
//! The admin panel is the only place products, categories and banners are
//! created or edited; customers never write these tables. Authenticates
//! with the service-role key, and reads bypass the `active = true` filter
//! so inactive rows stay editable.

use secrecy::SecretString;
use tracing::instrument;

use souq_core::{BannerId, CategoryId, ProductId};

use crate::config::{ClientConfig, ConfigError};
use crate::models::{Banner, Category, Product};

use super::rows::{BannerRow, BannerWrite, CategoryRow, CategoryWrite, ProductRow, ProductWrite};
use super::{Auth, QuerySpec, RemoteError, RemoteGateway, SortDirection};

/// Gateway for the admin panel's catalog writes.
#[derive(Clone)]
pub struct AdminGateway {
    gateway: RemoteGateway,
    service_key: SecretString,
}

impl AdminGateway {
    /// Build the admin gateway from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` when no service key is
    /// configured.
    pub fn new(gateway: RemoteGateway, config: &ClientConfig) -> Result<Self, ConfigError> {
        let service_key = config
            .service_key
            .clone()
            .ok_or_else(|| ConfigError::MissingEnvVar("SOUQ_SERVICE_KEY".to_string()))?;
        Ok(Self {
            gateway,
            service_key,
        })
    }

    fn auth(&self) -> Auth<'_> {
        Auth::Service(&self.service_key)
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List every product, active or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn all_products(&self) -> Result<Vec<Product>, RemoteError> {
        let rows: Vec<ProductRow> = self
            .gateway
            .get_rows("products", &QuerySpec::new(), self.auth())
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, product))]
    pub async fn create_product(&self, product: &Product) -> Result<Product, RemoteError> {
        let row: ProductRow = self
            .gateway
            .insert_one("products", &ProductWrite::from(product), self.auth())
            .await?;
        Ok(row.into())
    }

    /// Update a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, product), fields(product_id = %id))]
    pub async fn update_product(&self, id: ProductId, product: &Product) -> Result<(), RemoteError> {
        self.gateway
            .patch_rows(
                "products",
                &QuerySpec::new().eq("id", id),
                &ProductWrite::from(product),
                self.auth(),
            )
            .await?;
        self.gateway.invalidate_product(id).await;
        Ok(())
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), RemoteError> {
        self.gateway
            .delete_rows("products", &QuerySpec::new().eq("id", id), self.auth())
            .await?;
        self.gateway.invalidate_product(id).await;
        Ok(())
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// List every category, without derived counts.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn all_categories(&self) -> Result<Vec<Category>, RemoteError> {
        let rows: Vec<CategoryRow> = self
            .gateway
            .get_rows("categories", &QuerySpec::new(), self.auth())
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| row.into_category(0))
            .collect())
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, category))]
    pub async fn create_category(&self, category: &Category) -> Result<Category, RemoteError> {
        let row: CategoryRow = self
            .gateway
            .insert_one("categories", &CategoryWrite::from(category), self.auth())
            .await?;
        Ok(row.into_category(0))
    }

    /// Update a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, category), fields(category_id = %id))]
    pub async fn update_category(
        &self,
        id: CategoryId,
        category: &Category,
    ) -> Result<(), RemoteError> {
        self.gateway
            .patch_rows(
                "categories",
                &QuerySpec::new().eq("id", id),
                &CategoryWrite::from(category),
                self.auth(),
            )
            .await
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn delete_category(&self, id: CategoryId) -> Result<(), RemoteError> {
        self.gateway
            .delete_rows("categories", &QuerySpec::new().eq("id", id), self.auth())
            .await
    }

    // =========================================================================
    // Banners
    // =========================================================================

    /// List every banner in display order, active or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn all_banners(&self) -> Result<Vec<Banner>, RemoteError> {
        let query = QuerySpec::new().order_by("sort_order", SortDirection::Ascending);
        let rows: Vec<BannerRow> = self.gateway.get_rows("banners", &query, self.auth()).await?;
        Ok(rows.into_iter().map(Banner::from).collect())
    }

    /// Create a banner.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, banner))]
    pub async fn create_banner(&self, banner: &Banner) -> Result<Banner, RemoteError> {
        let row: BannerRow = self
            .gateway
            .insert_one("banners", &BannerWrite::from(banner), self.auth())
            .await?;
        Ok(row.into())
    }

    /// Update a banner.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, banner), fields(banner_id = %id))]
    pub async fn update_banner(&self, id: BannerId, banner: &Banner) -> Result<(), RemoteError> {
        self.gateway
            .patch_rows(
                "banners",
                &QuerySpec::new().eq("id", id),
                &BannerWrite::from(banner),
                self.auth(),
            )
            .await
    }

    /// Delete a banner.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(banner_id = %id))]
    pub async fn delete_banner(&self, id: BannerId) -> Result<(), RemoteError> {
        self.gateway
            .delete_rows("banners", &QuerySpec::new().eq("id", id), self.auth())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_requires_service_key() {
        let config = ClientConfig {
            backend_url: "https://store.example.co".parse().expect("valid url"),
            anon_key: "anon".to_string(),
            service_key: None,
            data_dir: std::path::PathBuf::from(".souq"),
            poll_interval: std::time::Duration::from_secs(10),
            poll_retry_interval: std::time::Duration::from_secs(5),
        };
        let gateway = RemoteGateway::new(&config);
        let result = AdminGateway::new(gateway, &config);
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
    }
}
