//! Drag State Manager
//!
//! A non-reactive staging area that sits between the durable store and
//! whatever is mutating visual order during a drag (the external pointer
//! library, or the keyboard engine). Each container (a list holding
//! tasks, or a column holding lists) has its own staged item array and a
//! snapshot version. While a drag is active for a container, one-way
//! syncs from the durable source are ignored so they cannot clobber the
//! in-flight order; the first sync after the drag completes wins and
//! performs the implicit commit or rollback.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::{debug, warn};

/// Container identifier: a list id for task staging, a column index for
/// list staging.
pub type ContainerId = u64;

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// A staged view of one container's items
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    pub items: Vec<T>,
    /// Bumped on every staged write; unchanged by gated syncs
    pub version: u64,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            version: 0,
        }
    }
}

type Callback<T> = Arc<dyn Fn(&Snapshot<T>) + Send + Sync>;

struct ContainerState<T> {
    snapshot: Snapshot<T>,
    drag_active: bool,
}

impl<T> Default for ContainerState<T> {
    fn default() -> Self {
        Self {
            snapshot: Snapshot::default(),
            drag_active: false,
        }
    }
}

struct Inner<T> {
    containers: HashMap<ContainerId, ContainerState<T>>,
    subscribers: HashMap<ContainerId, Vec<(SubscriptionId, Callback<T>)>>,
    next_subscription: u64,
    drag_active: bool,
}

/// Per-container staging with drag-aware sync gating
pub struct DragStateManager<T: Clone> {
    inner: Mutex<Inner<T>>,
}

impl<T: Clone> Default for DragStateManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> DragStateManager<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                containers: HashMap::new(),
                subscribers: HashMap::new(),
                next_subscription: 0,
                drag_active: false,
            }),
        }
    }

    /// Register a callback for a container. It fires immediately with the
    /// current snapshot, then synchronously on every staged write.
    pub fn subscribe<F>(&self, container: ContainerId, callback: F) -> SubscriptionId
    where
        F: Fn(&Snapshot<T>) + Send + Sync + 'static,
    {
        let callback: Callback<T> = Arc::new(callback);
        let (id, snapshot) = {
            let mut inner = self.inner.lock().unwrap();
            let id = SubscriptionId(inner.next_subscription);
            inner.next_subscription += 1;
            inner
                .subscribers
                .entry(container)
                .or_default()
                .push((id, callback.clone()));
            let snapshot = inner
                .containers
                .get(&container)
                .map(|c| c.snapshot.clone())
                .unwrap_or_default();
            (id, snapshot)
        };
        callback(&snapshot);
        id
    }

    pub fn unsubscribe(&self, container: ContainerId, id: SubscriptionId) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(subs) = inner.subscribers.get_mut(&container) {
            subs.retain(|(sub_id, _)| *sub_id != id);
        }
    }

    /// One-way sync from the durable/reactive source into staging.
    ///
    /// No-op while a drag is active for the container: this is the gate
    /// that keeps a reactive re-read from overwriting an in-flight drag.
    /// Returns whether the sync was applied.
    pub fn initialize_from_source(&self, container: ContainerId, items: Vec<T>) -> bool {
        let (snapshot, callbacks) = {
            let mut inner = self.inner.lock().unwrap();
            let state = inner.containers.entry(container).or_default();
            if state.drag_active {
                debug!(
                    "initialize_from_source skipped for container {}: drag active",
                    container
                );
                return false;
            }
            state.snapshot.items = items;
            state.snapshot.version += 1;
            let snapshot = state.snapshot.clone();
            (snapshot, inner.callbacks_for(container))
        };
        for callback in callbacks {
            callback(&snapshot);
        }
        true
    }

    /// Mark both ends of a drag as drag-active and raise the global flag.
    /// Containers newly joining the drag have their stale staged items
    /// cleared; the caller writes fresh staging right after.
    pub fn start_drag(&self, source: ContainerId, target: ContainerId) {
        let mut inner = self.inner.lock().unwrap();
        inner.drag_active = true;
        for container in [source, target] {
            let state = inner.containers.entry(container).or_default();
            if !state.drag_active {
                state.drag_active = true;
                state.snapshot.items.clear();
            }
        }
    }

    /// Optimistic staged write during an active drag. Illegal (dropped
    /// with a warning) when the container is not drag-active.
    pub fn update_during_drag(&self, container: ContainerId, items: Vec<T>) {
        let (snapshot, callbacks) = {
            let mut inner = self.inner.lock().unwrap();
            let state = inner.containers.entry(container).or_default();
            if !state.drag_active {
                warn!(
                    "update_during_drag for container {} without an active drag; dropping",
                    container
                );
                return;
            }
            state.snapshot.items = items;
            state.snapshot.version += 1;
            let snapshot = state.snapshot.clone();
            (snapshot, inner.callbacks_for(container))
        };
        for callback in callbacks {
            callback(&snapshot);
        }
    }

    /// End the drag. Exactly one logical drag exists at a time, so every
    /// drag-active flag clears, not just the two named containers (an
    /// item that travelled A -> B -> C marked all three). Staged data
    /// stays visible until the next `initialize_from_source`, which then
    /// commits (success) or rolls back (failure) from the durable store.
    pub fn complete_drag(&self, source: ContainerId, target: ContainerId, success: bool) {
        let mut inner = self.inner.lock().unwrap();
        if !success {
            debug!(
                "drag {} -> {} completed without persisting; next sync rolls back",
                source, target
            );
        }
        inner.drag_active = false;
        for state in inner.containers.values_mut() {
            state.drag_active = false;
        }
    }

    pub fn is_drag_active(&self) -> bool {
        self.inner.lock().unwrap().drag_active
    }

    pub fn is_drag_active_for(&self, container: ContainerId) -> bool {
        self.inner
            .lock()
            .unwrap()
            .containers
            .get(&container)
            .is_some_and(|c| c.drag_active)
    }

    /// Current staged view of a container
    pub fn snapshot(&self, container: ContainerId) -> Snapshot<T> {
        self.inner
            .lock()
            .unwrap()
            .containers
            .get(&container)
            .map(|c| c.snapshot.clone())
            .unwrap_or_default()
    }
}

impl<T> Inner<T> {
    /// Clone the callback handles so they can run outside the lock;
    /// a callback that re-enters the manager must not deadlock.
    fn callbacks_for(&self, container: ContainerId) -> Vec<Callback<T>> {
        self.subscribers
            .get(&container)
            .map(|subs| subs.iter().map(|(_, cb)| cb.clone()).collect())
            .unwrap_or_default()
    }
}
