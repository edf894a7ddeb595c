//! Souq Core - Shared types library.
//!
//! This crate provides common types used across all Souq components:
//! - `client` - Data-synchronization client (gateway, realtime, cart)
//! - presentation layers embedding the client
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no async.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, localized text, prices,
//!   and account tiers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
