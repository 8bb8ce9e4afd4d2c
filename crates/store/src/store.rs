//! The cart state container.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::Utc;

use jsfashion_cart::{
    AddItem, Cart, CartCommand, CartError, CartEvent, CartItem, ClearCart, NewCartItem, RemoveItem,
    StockLimitExceeded, UpdateQuantity,
};
use jsfashion_core::{DomainError, VariantId};
use jsfashion_events::{EventBus, InMemoryEventBus, Subscription};
use jsfashion_storage::{CartStorage, decode_cart, encode_cart};

use crate::config::StoreConfig;
use crate::error::StoreResult;
use crate::notify::{Notifier, TracingNotifier};
use crate::transaction::CartTransaction;

/// Published on the bus after every committed change.
#[derive(Debug, Clone)]
pub struct CartChanged {
    pub events: Vec<CartEvent>,
    /// The cart as of this change.
    pub snapshot: Arc<Cart>,
}

/// What a mutating call did.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// State changed, was flushed and published.
    Applied(Vec<CartEvent>),
    /// Benign no-op (unknown variant, same quantity, empty cart). Nothing written.
    Unchanged,
    /// Above the stock ceiling. Nothing written; the notifier was told.
    Rejected(StockLimitExceeded),
    /// The item data itself is unusable (e.g. a non-finite price). Nothing written.
    Invalid(DomainError),
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, MutationOutcome::Rejected(_))
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, MutationOutcome::Invalid(_))
    }
}

/// Key the unreadable blob found under `key` is copied to before it is replaced.
pub fn backup_key(key: &str) -> String {
    format!("{key}.bak")
}

/// Single source of truth for the shopping cart.
///
/// Readers take cheap `Arc<Cart>` snapshots; a mutation builds a new cart and
/// swaps it in whole, so no reader ever sees a half-applied change. Writers
/// are serialized.
pub struct CartStore<B = InMemoryEventBus<CartChanged>> {
    config: StoreConfig,
    storage: Arc<dyn CartStorage>,
    bus: B,
    notifier: Arc<dyn Notifier>,
    pub(crate) state: RwLock<Arc<Cart>>,
    pub(crate) writer: Mutex<()>,
}

impl CartStore {
    /// File-backed store with an in-process bus and log-only notices.
    pub fn from_config(config: StoreConfig) -> Self {
        let storage = Arc::new(config.file_storage());
        Self::open(config, storage, InMemoryEventBus::new(), Arc::new(TracingNotifier))
    }

    /// [`CartStore::from_config`] with configuration read from the environment.
    pub fn from_env() -> StoreResult<Self> {
        Ok(Self::from_config(StoreConfig::from_env()?))
    }
}

impl<B> CartStore<B>
where
    B: EventBus<CartChanged>,
{
    /// Hydrate from `storage`. Missing, unreadable or undecodable blobs start
    /// an empty cart; persistence problems never fail construction.
    ///
    /// An undecodable blob (bad JSON, unsupported version) is copied to
    /// [`backup_key`] first, so the next write does not destroy it.
    pub fn open(
        config: StoreConfig,
        storage: Arc<dyn CartStorage>,
        bus: B,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let key = config.storage_key.as_str();
        let (cart, repaired) = match storage.load(key) {
            Ok(Some(raw)) => match decode_cart(&raw) {
                Ok(hydrated) => {
                    let repaired = !hydrated.repairs.is_empty();
                    (hydrated.cart, repaired)
                }
                Err(err) => {
                    let backup = backup_key(key);
                    match storage.save(&backup, &raw) {
                        Ok(()) => tracing::warn!(
                            key,
                            backup = %backup,
                            error = %err,
                            "unreadable stored cart copied to backup; starting empty"
                        ),
                        Err(save_err) => tracing::error!(
                            key,
                            error = %err,
                            backup_error = %save_err,
                            "unreadable stored cart could not be backed up; starting empty"
                        ),
                    }
                    (Cart::new(), false)
                }
            },
            Ok(None) => (Cart::new(), false),
            Err(err) => {
                tracing::warn!(key, error = %err, "failed to load stored cart; starting empty");
                (Cart::new(), false)
            }
        };

        tracing::debug!(key, lines = cart.len(), "cart store opened");

        let store = Self {
            config,
            storage,
            bus,
            notifier,
            state: RwLock::new(Arc::new(cart)),
            writer: Mutex::new(()),
        };
        if repaired {
            store.persist(&store.snapshot());
        }
        store
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Current cart. The returned snapshot never changes underneath the caller.
    pub fn snapshot(&self) -> Arc<Cart> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&state)
    }

    pub fn items(&self) -> Vec<CartItem> {
        self.snapshot().items().to_vec()
    }

    pub fn total_items(&self) -> u64 {
        self.snapshot().total_items()
    }

    pub fn total_price(&self) -> f64 {
        self.snapshot().total_price()
    }

    /// Receive a [`CartChanged`] for every change committed from now on.
    pub fn subscribe(&self) -> Subscription<CartChanged> {
        self.bus.subscribe()
    }

    /// Start a transaction. Writers are serialized until it is committed or dropped.
    ///
    /// The writer lock is not reentrant: calling a mutating method on this
    /// store (or `begin` again) from the thread holding an open transaction
    /// deadlocks. Run commands through [`CartTransaction::execute`] instead,
    /// or use [`CartStore::try_begin`].
    pub fn begin(&self) -> CartTransaction<'_, B> {
        CartTransaction::new(self)
    }

    /// Like [`CartStore::begin`], but returns `None` instead of waiting when
    /// another transaction is open.
    pub fn try_begin(&self) -> Option<CartTransaction<'_, B>> {
        CartTransaction::try_new(self)
    }

    /// Add `quantity` units (default 1) of a variant, merging into an existing line.
    pub fn add_item(&self, item: NewCartItem, quantity: Option<u32>) -> MutationOutcome {
        self.dispatch(CartCommand::AddItem(AddItem {
            item,
            quantity,
            occurred_at: Utc::now(),
        }))
    }

    pub fn remove_item(&self, variant_id: &VariantId) -> MutationOutcome {
        self.dispatch(CartCommand::RemoveItem(RemoveItem {
            variant_id: variant_id.clone(),
            occurred_at: Utc::now(),
        }))
    }

    /// Set a line's quantity; `quantity <= 0` removes the line.
    pub fn update_quantity(&self, variant_id: &VariantId, quantity: i64) -> MutationOutcome {
        self.dispatch(CartCommand::UpdateQuantity(UpdateQuantity {
            variant_id: variant_id.clone(),
            quantity,
            occurred_at: Utc::now(),
        }))
    }

    pub fn clear_cart(&self) -> MutationOutcome {
        self.dispatch(CartCommand::ClearCart(ClearCart {
            occurred_at: Utc::now(),
        }))
    }

    /// Write the current snapshot now, surfacing storage errors.
    pub fn flush(&self) -> StoreResult<()> {
        let raw = encode_cart(&self.snapshot())?;
        self.storage.save(&self.config.storage_key, &raw)?;
        Ok(())
    }

    fn dispatch(&self, command: CartCommand) -> MutationOutcome {
        let mut tx = self.begin();
        match tx.execute(&command) {
            Ok(events) if events.is_empty() => MutationOutcome::Unchanged,
            Ok(_) => MutationOutcome::Applied(tx.commit()),
            Err(CartError::StockLimitExceeded(notice)) => {
                // Release the writer before handing control to UI code.
                drop(tx);
                tracing::debug!(variant_id = %notice.variant_id, "cart mutation rejected");
                self.notifier.stock_limit(&notice);
                MutationOutcome::Rejected(notice)
            }
            Err(CartError::InvalidItem(err)) => {
                drop(tx);
                tracing::warn!(error = %err, "cart mutation refused");
                MutationOutcome::Invalid(err)
            }
        }
    }

    /// Best-effort write-through; failures are logged, never returned.
    pub(crate) fn persist(&self, cart: &Cart) {
        let key = self.config.storage_key.as_str();
        let result = encode_cart(cart).and_then(|raw| self.storage.save(key, &raw));
        match result {
            Ok(()) => tracing::debug!(key, lines = cart.len(), "cart persisted"),
            Err(err) => tracing::error!(key, error = %err, "failed to persist cart"),
        }
    }

    pub(crate) fn publish(&self, change: CartChanged) {
        if let Err(err) = self.bus.publish(change) {
            tracing::error!(error = ?err, "failed to publish cart change");
        }
    }
}

impl<B> core::fmt::Debug for CartStore<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CartStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
