//! Registered routes.
//!
//! # Responsibilities
//! - Store committed `(Route, Handler)` bindings in registration order
//! - Serve lock-free snapshots to the dispatcher
//! - Support whole-table replacement for config reload
//!
//! # Design Decisions
//! - Copy-on-write: every mutation builds a new entry list and swaps it in
//!   through `ArcSwap`, so a dispatch sees either the old or the new table
//! - Writers serialize on a mutex; readers never lock
//! - Registration order is precedence order; identical routes are kept as
//!   distinct entries

use arc_swap::ArcSwap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::routing::descriptor::Descriptor;
use crate::routing::handler::SharedHandler;
use crate::routing::matcher::Args;
use crate::routing::route::Route;

/// Identifier assigned to a route when it is registered.
pub type RouteId = u64;

/// A committed route bound to its handler.
#[derive(Clone)]
pub struct Entry {
    pub id: RouteId,
    pub route: Arc<Route>,
    pub handler: SharedHandler,
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("route", &self.route)
            .finish_non_exhaustive()
    }
}

/// Ordered collection of registered routes.
pub struct RouteTable {
    entries: ArcSwap<Vec<Entry>>,
    writer: Mutex<()>,
    next_id: AtomicU64,
}

impl RouteTable {
    pub fn new() -> Self {
        Self {
            entries: ArcSwap::from_pointee(Vec::new()),
            writer: Mutex::new(()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Append a route; it takes precedence below every route registered before it.
    pub fn register(&self, route: Route, handler: SharedHandler) -> RouteId {
        let _guard = self.writer.lock().unwrap_or_else(|e| e.into_inner());

        let entry = self.entry(route, handler);
        let id = entry.id;

        let mut next: Vec<Entry> = self.entries.load().iter().cloned().collect();
        next.push(entry);
        self.entries.store(Arc::new(next));

        tracing::debug!(route_id = id, routes = self.len(), "Route registered");
        id
    }

    /// Atomically replace every entry with `routes`, in the given order.
    pub fn replace(&self, routes: Vec<(Route, SharedHandler)>) -> Vec<RouteId> {
        let _guard = self.writer.lock().unwrap_or_else(|e| e.into_inner());

        let next: Vec<Entry> = routes
            .into_iter()
            .map(|(route, handler)| self.entry(route, handler))
            .collect();
        let ids = next.iter().map(|e| e.id).collect();
        let count = next.len();
        self.entries.store(Arc::new(next));

        tracing::info!(routes = count, "Route table replaced");
        ids
    }

    fn entry(&self, route: Route, handler: SharedHandler) -> Entry {
        Entry {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            route: Arc::new(route),
            handler,
        }
    }

    /// Current entries. The snapshot is unaffected by later mutation.
    pub fn snapshot(&self) -> Arc<Vec<Entry>> {
        self.entries.load_full()
    }

    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First entry, in registration order, whose route matches `descriptor`.
    pub fn find(&self, descriptor: &Descriptor) -> Option<(Entry, Args)> {
        let entries = self.entries.load();
        entries.iter().find_map(|entry| {
            let mut args = Args::new();
            entry
                .route
                .matches(descriptor, &mut args)
                .then(|| (entry.clone(), args))
        })
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}
