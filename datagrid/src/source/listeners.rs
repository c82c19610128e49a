//! Listener registry for rendered-view broadcasts.

use std::sync::{Arc, RwLock, Weak};

use log::trace;

use crate::model::ViewRow;

/// Callback invoked with the rendered view.
pub type Listener<T> = Arc<dyn Fn(&[ViewRow<T>]) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ListenerId(usize);

pub(crate) struct ListenerRegistry<T> {
    next_id: usize,
    listeners: Vec<(ListenerId, Listener<T>)>,
}

impl<T> Default for ListenerRegistry<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }
}

impl<T> ListenerRegistry<T> {
    fn add(&mut self, listener: Listener<T>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }
}

/// Shared handle to a registry.
///
/// Broadcasts iterate over a snapshot, so listeners may subscribe or
/// unsubscribe while a broadcast is running without skipping or repeating
/// calls in that broadcast.
pub(crate) struct Listeners<T> {
    inner: Arc<RwLock<ListenerRegistry<T>>>,
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(ListenerRegistry::default())),
        }
    }
}

impl<T> Listeners<T> {
    pub fn subscribe(&self, listener: Listener<T>) -> Subscription<T> {
        let id = match self.inner.write() {
            Ok(mut guard) => guard.add(listener),
            Err(poisoned) => poisoned.into_inner().add(listener),
        };
        Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    pub fn clear(&self) {
        if let Ok(mut guard) = self.inner.write() {
            guard.listeners.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|g| g.listeners.len()).unwrap_or(0)
    }

    pub fn broadcast(&self, rows: &[ViewRow<T>]) {
        let snapshot: Vec<Listener<T>> = self
            .inner
            .read()
            .map(|g| g.listeners.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default();
        trace!("Broadcasting {} rows to {} listeners", rows.len(), snapshot.len());
        for listener in snapshot {
            listener(rows);
        }
    }
}

/// Handle returned by [`GridDataSource::connect`](super::GridDataSource::connect).
///
/// Dropping the handle keeps the listener registered; call
/// [`unsubscribe`](Subscription::unsubscribe) to remove it.
pub struct Subscription<T> {
    id: ListenerId,
    registry: Weak<RwLock<ListenerRegistry<T>>>,
}

impl<T> Subscription<T> {
    /// Removes the listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        registry
            .write()
            .map(|mut g| g.remove(self.id))
            .unwrap_or(false)
    }
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id.0).finish()
    }
}
