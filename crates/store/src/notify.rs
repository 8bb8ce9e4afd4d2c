//! User-facing notices raised by cart mutations.

use std::sync::{Arc, Mutex, PoisonError};

use jsfashion_cart::StockLimitExceeded;

/// Sink for notices the UI layer should surface (toasts, banners, ...).
pub trait Notifier: Send + Sync {
    fn stock_limit(&self, notice: &StockLimitExceeded);
}

impl<N> Notifier for Arc<N>
where
    N: Notifier + ?Sized,
{
    fn stock_limit(&self, notice: &StockLimitExceeded) {
        (**self).stock_limit(notice)
    }
}

/// Logs notices; for headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn stock_limit(&self, notice: &StockLimitExceeded) {
        tracing::warn!(
            variant_id = %notice.variant_id,
            max_stock = notice.max_stock,
            requested = notice.requested,
            "{notice}"
        );
    }
}

/// Records notices so a UI loop (or a test) can poll them.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    notices: Mutex<Vec<StockLimitExceeded>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return every notice recorded so far.
    pub fn take(&self) -> Vec<StockLimitExceeded> {
        let mut notices = self.notices.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *notices)
    }

    /// User-facing messages of the recorded notices, oldest first.
    pub fn messages(&self) -> Vec<String> {
        let notices = self.notices.lock().unwrap_or_else(PoisonError::into_inner);
        notices.iter().map(ToString::to_string).collect()
    }
}

impl Notifier for CollectingNotifier {
    fn stock_limit(&self, notice: &StockLimitExceeded) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice.clone());
    }
}
