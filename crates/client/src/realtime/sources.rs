//! Gateway-backed collection sources for the synchronization managers.
//!
//! One adapter per watched record type, each delegating to the customer
//! read path (so the `active = true` filter and ordering rules apply).

use async_trait::async_trait;

use crate::gateway::{RemoteError, RemoteGateway};
use crate::models::{Banner, Category, Product};

use super::CollectionSource;

/// Active products, as watched by the storefront.
#[derive(Clone)]
pub struct ActiveProducts {
    gateway: RemoteGateway,
}

impl ActiveProducts {
    #[must_use]
    pub const fn new(gateway: RemoteGateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl CollectionSource<Product> for ActiveProducts {
    async fn fetch(&self) -> Result<Vec<Product>, RemoteError> {
        self.gateway.active_products().await
    }
}

/// Categories with derived product counts.
#[derive(Clone)]
pub struct ActiveCategories {
    gateway: RemoteGateway,
}

impl ActiveCategories {
    #[must_use]
    pub const fn new(gateway: RemoteGateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl CollectionSource<Category> for ActiveCategories {
    async fn fetch(&self) -> Result<Vec<Category>, RemoteError> {
        self.gateway.active_categories().await
    }
}

/// Active banners in display order.
#[derive(Clone)]
pub struct ActiveBanners {
    gateway: RemoteGateway,
}

impl ActiveBanners {
    #[must_use]
    pub const fn new(gateway: RemoteGateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl CollectionSource<Banner> for ActiveBanners {
    async fn fetch(&self) -> Result<Vec<Banner>, RemoteError> {
        self.gateway.active_banners().await
    }
}
