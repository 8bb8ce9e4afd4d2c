//! Persisted cart blob format.
//!
//! ```json
//! {"state":{"items":[{"productId":1,"variantId":"...","quantity":2,...}]},"version":0}
//! ```
//!
//! This is the shape the storefront has always written under its cart key,
//! so existing browser-side blobs hydrate unchanged.

use serde::{Deserialize, Serialize};

use jsfashion_cart::{Cart, CartItem, Hydrated, HydrationRepair};

use crate::error::{StorageError, StorageResult};

/// Schema version written into every envelope.
pub const ENVELOPE_VERSION: u32 = 0;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    state: StateRef<'a>,
    version: u32,
}

#[derive(Serialize)]
struct StateRef<'a> {
    items: &'a [CartItem],
}

#[derive(Deserialize)]
struct Envelope {
    state: State,
    #[serde(default)]
    version: u32,
}

/// Items stay raw here so one unreadable entry cannot take the rest down.
#[derive(Deserialize)]
struct State {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

/// Serialize the full cart into an envelope.
pub fn encode_cart(cart: &Cart) -> StorageResult<String> {
    let envelope = EnvelopeRef {
        state: StateRef { items: cart.items() },
        version: ENVELOPE_VERSION,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Parse an envelope and rebuild the cart, repairing entries that would
/// violate cart invariants. Each repair is logged.
pub fn decode_cart(raw: &str) -> StorageResult<Hydrated> {
    let envelope: Envelope = serde_json::from_str(raw)?;
    if envelope.version != ENVELOPE_VERSION {
        return Err(StorageError::UnsupportedVersion {
            found: envelope.version,
            expected: ENVELOPE_VERSION,
        });
    }

    let mut items = Vec::with_capacity(envelope.state.items.len());
    let mut undecodable = Vec::new();
    for (index, value) in envelope.state.items.into_iter().enumerate() {
        match serde_json::from_value::<CartItem>(value) {
            Ok(item) => items.push(item),
            Err(err) => undecodable.push(HydrationRepair::UndecodableDropped {
                index,
                reason: err.to_string(),
            }),
        }
    }

    let mut hydrated = Cart::hydrate(items);
    undecodable.append(&mut hydrated.repairs);
    hydrated.repairs = undecodable;
    for repair in &hydrated.repairs {
        match repair {
            HydrationRepair::BlankVariantDropped => {
                tracing::warn!("dropped stored cart item with blank variant id");
            }
            HydrationRepair::DuplicateDropped { variant_id } => {
                tracing::warn!(%variant_id, "dropped duplicate stored cart item");
            }
            HydrationRepair::ZeroQuantityDropped { variant_id } => {
                tracing::warn!(%variant_id, "dropped stored cart item with zero quantity");
            }
            HydrationRepair::OutOfStockDropped { variant_id } => {
                tracing::warn!(%variant_id, "dropped stored cart item with no stock");
            }
            HydrationRepair::Clamped { variant_id, from, to } => {
                tracing::warn!(%variant_id, from, to, "clamped stored cart quantity to stock ceiling");
            }
            HydrationRepair::UndecodableDropped { index, reason } => {
                tracing::warn!(index, reason = %reason, "dropped undecodable stored cart item");
            }
        }
    }
    Ok(hydrated)
}
