//! Wire rows for the hosted backend's REST surface.
//!
//! Rows mirror table columns one-to-one, including the three localized
//! column variants per text field. Conversions into the domain types in
//! [`crate::models`] happen here and nowhere else; display-language
//! resolution is never applied at this layer.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use souq_core::{
    AddressId, BannerId, CartLineId, CategoryId, LocalizedText, OrderId, ProductId, UserId,
};

use crate::models::{
    Address, Banner, CartItem, Category, ContactInfo, Order, OrderLine, OrderStatus, Product,
};

// =============================================================================
// Catalog Rows
// =============================================================================

/// A row of the `products` table.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRow {
    pub id: i64,
    pub name_ar: String,
    #[serde(default)]
    pub name_en: String,
    #[serde(default)]
    pub name_he: String,
    #[serde(default)]
    pub description_ar: String,
    #[serde(default)]
    pub description_en: String,
    #[serde(default)]
    pub description_he: String,
    pub price: Decimal,
    #[serde(default)]
    pub original_price: Option<Decimal>,
    #[serde(default)]
    pub wholesale_price: Option<Decimal>,
    #[serde(default)]
    pub in_stock: bool,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: i64,
    #[serde(default)]
    pub discount_percent: Option<i64>,
    #[serde(default)]
    pub featured: bool,
    pub active: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: LocalizedText::new(row.name_ar, row.name_en, row.name_he),
            description: LocalizedText::new(
                row.description_ar,
                row.description_en,
                row.description_he,
            ),
            price: row.price,
            original_price: row.original_price,
            wholesale_price: row.wholesale_price,
            in_stock: row.in_stock,
            stock_quantity: row.stock_quantity,
            rating: row.rating,
            review_count: row.review_count,
            discount_percent: row.discount_percent,
            featured: row.featured,
            active: row.active,
            tags: row.tags,
            image: row.image,
            images: row.images,
            category: row.category_id.map(CategoryId::new),
        }
    }
}

/// Writable product fields for the admin path (no server-assigned columns).
#[derive(Debug, Clone, Serialize)]
pub struct ProductWrite {
    pub name_ar: String,
    pub name_en: String,
    pub name_he: String,
    pub description_ar: String,
    pub description_en: String,
    pub description_he: String,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub wholesale_price: Option<Decimal>,
    pub in_stock: bool,
    pub stock_quantity: i64,
    pub discount_percent: Option<i64>,
    pub featured: bool,
    pub active: bool,
    pub tags: Vec<String>,
    pub image: String,
    pub images: Vec<String>,
    pub category_id: Option<i64>,
}

impl From<&Product> for ProductWrite {
    fn from(product: &Product) -> Self {
        Self {
            name_ar: product.name.ar.clone(),
            name_en: product.name.en.clone(),
            name_he: product.name.he.clone(),
            description_ar: product.description.ar.clone(),
            description_en: product.description.en.clone(),
            description_he: product.description.he.clone(),
            price: product.price,
            original_price: product.original_price,
            wholesale_price: product.wholesale_price,
            in_stock: product.in_stock,
            stock_quantity: product.stock_quantity,
            discount_percent: product.discount_percent,
            featured: product.featured,
            active: product.active,
            tags: product.tags.clone(),
            image: product.image.clone(),
            images: product.images.clone(),
            category_id: product.category.map(|id| id.as_i64()),
        }
    }
}

/// A row of the `categories` table.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRow {
    pub id: i64,
    pub name_ar: String,
    #[serde(default)]
    pub name_en: String,
    #[serde(default)]
    pub name_he: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub icon: String,
}

impl CategoryRow {
    /// Convert with the derived product count computed by the caller.
    pub fn into_category(self, product_count: usize) -> Category {
        Category {
            id: CategoryId::new(self.id),
            name: LocalizedText::new(self.name_ar, self.name_en, self.name_he),
            image: self.image,
            icon: self.icon,
            product_count,
        }
    }
}

/// Writable category fields for the admin path.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryWrite {
    pub name_ar: String,
    pub name_en: String,
    pub name_he: String,
    pub image: String,
    pub icon: String,
}

impl From<&Category> for CategoryWrite {
    fn from(category: &Category) -> Self {
        Self {
            name_ar: category.name.ar.clone(),
            name_en: category.name.en.clone(),
            name_he: category.name.he.clone(),
            image: category.image.clone(),
            icon: category.icon.clone(),
        }
    }
}

/// A row of the `banners` table.
#[derive(Debug, Clone, Deserialize)]
pub struct BannerRow {
    pub id: i64,
    pub title_ar: String,
    #[serde(default)]
    pub title_en: String,
    #[serde(default)]
    pub title_he: String,
    #[serde(default)]
    pub subtitle_ar: String,
    #[serde(default)]
    pub subtitle_en: String,
    #[serde(default)]
    pub subtitle_he: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub link: Option<String>,
    pub active: bool,
    #[serde(default)]
    pub sort_order: i64,
}

impl From<BannerRow> for Banner {
    fn from(row: BannerRow) -> Self {
        Self {
            id: BannerId::new(row.id),
            title: LocalizedText::new(row.title_ar, row.title_en, row.title_he),
            subtitle: LocalizedText::new(row.subtitle_ar, row.subtitle_en, row.subtitle_he),
            image: row.image,
            link: row.link,
            active: row.active,
            sort_order: row.sort_order,
        }
    }
}

/// Writable banner fields for the admin path.
#[derive(Debug, Clone, Serialize)]
pub struct BannerWrite {
    pub title_ar: String,
    pub title_en: String,
    pub title_he: String,
    pub subtitle_ar: String,
    pub subtitle_en: String,
    pub subtitle_he: String,
    pub image: String,
    pub link: Option<String>,
    pub active: bool,
    pub sort_order: i64,
}

impl From<&Banner> for BannerWrite {
    fn from(banner: &Banner) -> Self {
        Self {
            title_ar: banner.title.ar.clone(),
            title_en: banner.title.en.clone(),
            title_he: banner.title.he.clone(),
            subtitle_ar: banner.subtitle.ar.clone(),
            subtitle_en: banner.subtitle.en.clone(),
            subtitle_he: banner.subtitle.he.clone(),
            image: banner.image.clone(),
            link: banner.link.clone(),
            active: banner.active,
            sort_order: banner.sort_order,
        }
    }
}

// =============================================================================
// Account Rows
// =============================================================================

/// A row of the `cart_items` table with the product embedded.
#[derive(Debug, Clone, Deserialize)]
pub struct CartItemRow {
    pub id: i64,
    pub quantity: i64,
    pub product: ProductRow,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            id: CartLineId::remote(row.id),
            product: row.product.into(),
            quantity: u32::try_from(row.quantity.max(1)).unwrap_or(1),
        }
    }
}

/// A row of the `favorites` table with the product embedded.
///
/// The row's own ID is never used; favorites are keyed by product.
#[derive(Debug, Clone, Deserialize)]
pub struct FavoriteRow {
    pub product: ProductRow,
}

/// A row of the `addresses` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressRow {
    pub id: i64,
    pub user_id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub city: String,
    pub area: String,
    pub street: String,
    pub building: String,
    #[serde(default)]
    pub floor: Option<String>,
    #[serde(default)]
    pub apartment: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: AddressId::new(row.id),
            user: UserId::new(row.user_id),
            full_name: row.full_name,
            phone: row.phone,
            city: row.city,
            area: row.area,
            street: row.street,
            building: row.building,
            floor: row.floor,
            apartment: row.apartment,
            is_default: row.is_default,
        }
    }
}

/// A row of the `orders` table; `lines` is a JSON column.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub lines: Vec<OrderLine>,
    pub address_id: i64,
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            user: UserId::new(row.user_id),
            lines: row.lines,
            address: AddressId::new(row.address_id),
            total: row.total,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

/// The single row of the `contact_info` table.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ContactInfoRow {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub facebook: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
}

impl From<ContactInfoRow> for ContactInfo {
    fn from(row: ContactInfoRow) -> Self {
        Self {
            phone: row.phone,
            email: row.email,
            whatsapp: row.whatsapp,
            facebook: row.facebook,
            instagram: row.instagram,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_row_decodes_with_sparse_columns() {
        let json = r#"{
            "id": 5,
            "name_ar": "قهوة",
            "price": "24.50",
            "active": true
        }"#;
        let row: ProductRow = serde_json::from_str(json).unwrap();
        let product = Product::from(row);
        assert_eq!(product.id.as_i64(), 5);
        assert_eq!(product.price, Decimal::new(2450, 2));
        assert!(product.name.en.is_empty());
        assert!(product.wholesale_price.is_none());
    }

    #[test]
    fn test_cart_item_row_clamps_quantity() {
        let json = r#"{
            "id": 9,
            "quantity": 0,
            "product": {"id": 5, "name_ar": "x", "price": "1", "active": true}
        }"#;
        let row: CartItemRow = serde_json::from_str(json).unwrap();
        let item = CartItem::from(row);
        assert_eq!(item.quantity, 1);
        assert_eq!(item.id.as_str(), "9");
    }

    #[test]
    fn test_order_status_serde_lowercase() {
        let status: OrderStatus = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(status, OrderStatus::Pending);
    }

    #[test]
    fn test_product_write_round_trips_localized_fields() {
        let mut product = crate::testutil::product(3, 12);
        product.name = LocalizedText::new("تمر", "Dates", "תמרים");
        let write = ProductWrite::from(&product);
        assert_eq!(write.name_ar, "تمر");
        assert_eq!(write.name_he, "תמרים");
        let value = serde_json::to_value(&write).unwrap();
        assert_eq!(value["name_en"], "Dates");
    }
}
