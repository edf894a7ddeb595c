//! Shared fixtures for unit tests.

use rust_decimal::Decimal;
use souq_core::{LocalizedText, ProductId};

use crate::models::Product;

/// A minimal active product with the given ID and integer retail price.
pub(crate) fn product(id: i64, price: i64) -> Product {
    Product {
        id: ProductId::new(id),
        name: LocalizedText::new("منتج", "Product", "מוצר"),
        description: LocalizedText::default(),
        price: Decimal::from(price),
        original_price: None,
        wholesale_price: None,
        in_stock: true,
        stock_quantity: 10,
        rating: 4.5,
        review_count: 3,
        discount_percent: None,
        featured: false,
        active: true,
        tags: Vec::new(),
        image: String::new(),
        images: Vec::new(),
        category: None,
    }
}
