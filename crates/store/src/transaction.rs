//! Scoped mutate-then-flush unit of work.

use std::sync::{Arc, MutexGuard, PoisonError, TryLockError};

use jsfashion_cart::{Cart, CartCommand, CartError, CartEvent};
use jsfashion_core::Aggregate;
use jsfashion_events::EventBus;

use crate::store::{CartChanged, CartStore};

/// Holds the store's writer lock and a private working copy of the cart.
///
/// Commands run against the working copy only. [`CartTransaction::commit`]
/// swaps it in, flushes it to storage and publishes one [`CartChanged`].
/// Dropping the transaction without committing discards everything.
#[must_use = "changes are discarded unless the transaction is committed"]
pub struct CartTransaction<'a, B>
where
    B: EventBus<CartChanged>,
{
    store: &'a CartStore<B>,
    working: Cart,
    events: Vec<CartEvent>,
    _writer: MutexGuard<'a, ()>,
}

impl<'a, B> CartTransaction<'a, B>
where
    B: EventBus<CartChanged>,
{
    pub(crate) fn new(store: &'a CartStore<B>) -> Self {
        let writer = store.writer.lock().unwrap_or_else(PoisonError::into_inner);
        Self::with_writer(store, writer)
    }

    pub(crate) fn try_new(store: &'a CartStore<B>) -> Option<Self> {
        let writer = match store.writer.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return None,
        };
        Some(Self::with_writer(store, writer))
    }

    fn with_writer(store: &'a CartStore<B>, writer: MutexGuard<'a, ()>) -> Self {
        // Read under the writer lock so no commit lands between lock and clone.
        let working = Cart::clone(&store.snapshot());
        Self {
            store,
            working,
            events: Vec::new(),
            _writer: writer,
        }
    }

    /// Run one command against the working copy.
    ///
    /// A rejected command leaves the working copy as it was; earlier
    /// commands in the same transaction are kept.
    pub fn execute(&mut self, command: &CartCommand) -> Result<Vec<CartEvent>, CartError> {
        let events = self.working.execute(command)?;
        self.events.extend(events.iter().cloned());
        Ok(events)
    }

    /// The working copy, including uncommitted changes.
    pub fn cart(&self) -> &Cart {
        &self.working
    }

    pub fn has_changes(&self) -> bool {
        !self.events.is_empty()
    }

    /// Publish the working copy. Returns every event applied in this
    /// transaction; with no events this is a no-op (no write, no publish).
    pub fn commit(mut self) -> Vec<CartEvent> {
        let events = std::mem::take(&mut self.events);
        if events.is_empty() {
            return events;
        }

        let snapshot = Arc::new(std::mem::take(&mut self.working));
        {
            let mut state = self.store.state.write().unwrap_or_else(PoisonError::into_inner);
            *state = Arc::clone(&snapshot);
        }

        self.store.persist(&snapshot);
        tracing::debug!(events = events.len(), lines = snapshot.len(), "cart transaction committed");

        self.store.publish(CartChanged {
            events: events.clone(),
            snapshot,
        });
        events
    }
}

impl<B> Drop for CartTransaction<'_, B>
where
    B: EventBus<CartChanged>,
{
    fn drop(&mut self) {
        if !self.events.is_empty() {
            tracing::debug!(events = self.events.len(), "discarding uncommitted cart changes");
        }
    }
}
