//! Shopping cart domain module.
//!
//! This crate contains the cart's business rules, implemented purely as
//! deterministic domain logic (no IO, no UI, no storage). Callers own
//! persistence and user notification.

pub mod cart;
pub mod checkout;
pub mod item;

pub use cart::{
    AddItem, Cart, CartCleared, CartCommand, CartError, CartEvent, ClearCart, Hydrated,
    HydrationRepair, ItemAdded, ItemRemoved, QuantityChanged, RemoveItem, StockLimitExceeded,
    UpdateQuantity,
};
pub use checkout::CheckoutLine;
pub use item::{CartItem, NewCartItem};
