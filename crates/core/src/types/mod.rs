//! Core types for Souq.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod lang;
pub mod price;

pub use id::*;
pub use lang::{Language, LocalizedText};
pub use price::{AccountTier, PriceView};
