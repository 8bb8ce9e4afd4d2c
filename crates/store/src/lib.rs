//! `jsfashion-store`
//!
//! **Responsibility:** the storefront's cart as an explicit, injectable state
//! container.
//!
//! This crate provides:
//! - Copy-on-write snapshots for readers
//! - Mutate-then-flush transactions over the pure cart aggregate
//! - Change notification over an event bus
//! - User-facing stock-limit notices through a [`Notifier`]

pub mod config;
pub mod error;
pub mod notify;
pub mod store;
pub mod transaction;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use notify::{CollectingNotifier, Notifier, TracingNotifier};
pub use store::{CartChanged, CartStore, MutationOutcome, backup_key};
pub use transaction::CartTransaction;
