//! Synchronous "ledger changed" notifications.

use std::panic::{catch_unwind, AssertUnwindSafe};

use log::warn;

/// Emitted after a mutation has been committed. Carries no ledger data;
/// subscribers re-query the wallet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedgerChanged {
    pub version: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn Fn(&LedgerChanged)>;

#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    handlers: Vec<(SubscriptionId, Handler)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: Fn(&LedgerChanged) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(existing, _)| *existing != id);
        self.handlers.len() != before
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// A panicking handler is logged and skipped; the rest still run.
    pub fn emit(&self, event: &LedgerChanged) {
        for (id, handler) in &self.handlers {
            if catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
                warn!("ledger subscriber {id:?} panicked on {event:?}");
            }
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.handlers.len())
            .finish()
    }
}
