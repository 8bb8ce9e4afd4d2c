//! `jsfashion-storage`: durable, key-scoped persistence for the cart.
//!
//! A backend stores one opaque string blob per key. The cart is written in
//! full on every change and read in full at startup; see [`envelope`] for
//! the blob format.

pub mod backend;
pub mod envelope;
pub mod error;
pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use backend::{CartStorage, InMemoryStorage};
pub use envelope::{ENVELOPE_VERSION, decode_cart, encode_cart};
pub use error::{StorageError, StorageResult};
pub use file::FileStorage;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStorage;
