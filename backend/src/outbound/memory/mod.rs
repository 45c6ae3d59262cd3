//! In-process adapters implementing every repository port.
//!
//! One [`InMemoryStore`] owns all tables behind a single mutex, so each port
//! call observes and mutates a consistent snapshot. The store mirrors the SQL
//! constraints of the PostgreSQL schema: unique pairs, cascading deletes and
//! protected ingredients. It backs the server when no database is configured
//! and the integration tests.

mod catalogue;
mod recipes;
mod relationships;
mod state;
mod users;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use state::State;

/// Shared in-memory store. Clones share the same tables.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
