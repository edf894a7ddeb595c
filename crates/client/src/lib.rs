//! Souq Client - data-synchronization layer for the storefront.
//!
//! This crate keeps a mobile storefront's data in step with its hosted
//! backend and with the visitor's device:
//!
//! - [`gateway`] - typed CRUD against the backend's REST surface
//!   (catalog reads, user-scoped cart/favorites/addresses/orders, and the
//!   service-key admin write path)
//! - [`realtime`] - per-record-type synchronization managers: full refetch
//!   on any change notification, with a polling fallback when subscriptions
//!   are unavailable
//! - [`cart`] / [`favorites`] - reducer-based state engines bridging
//!   anonymous (locally persisted) and authenticated (remote) collections
//! - [`persistence`] - the durable key-value store behind anonymous state
//!
//! # Architecture
//!
//! The backend is source of truth for catalog data; the client never
//! patches its cache incrementally, it refetches. Cart and favorites are
//! owned by their stores: consumers dispatch actions and read snapshots,
//! side effects (persist locally or write remotely) run after the pure
//! state transition. Services like the [`notify::Notifier`] are constructed
//! explicitly and passed by reference - there are no process-wide
//! singletons.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod error;
pub mod favorites;
pub mod gateway;
pub mod models;
pub mod notify;
pub mod persistence;
pub mod realtime;
pub mod state;

#[cfg(test)]
mod testutil;

pub use config::{ClientConfig, ConfigError};
pub use error::{Result, StoreError};
pub use gateway::{AdminGateway, RemoteError, RemoteGateway};
pub use persistence::LocalStore;
pub use state::AppState;
