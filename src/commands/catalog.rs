//! The command catalog.
//!
//! The shell only ever reads a snapshot of the catalog. [`InMemoryCatalog`]
//! replaces its snapshot atomically on every update, so a dispatch or
//! completion that already holds a snapshot is never affected by a concurrent
//! registration.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use super::registration::CommandRegistration;

/// Registrations keyed by full command name.
pub type Registrations = BTreeMap<String, CommandRegistration>;

/// Source of command registrations.
pub trait CommandCatalog: Send + Sync {
    /// Returns the current registrations. The returned map never changes.
    fn registrations(&self) -> Arc<Registrations>;
}

/// Copy-on-write catalog held in memory.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    snapshot: RwLock<Arc<Registrations>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog holding the given registrations.
    pub fn with_registrations(registrations: impl IntoIterator<Item = CommandRegistration>) -> Self {
        let map = registrations
            .into_iter()
            .map(|r| (r.name().to_string(), r))
            .collect();
        Self {
            snapshot: RwLock::new(Arc::new(map)),
        }
    }

    /// Adds a registration, returning the one it replaced.
    pub fn register(&self, registration: CommandRegistration) -> Option<CommandRegistration> {
        debug!(command = registration.name(), "Registering command");
        self.update(|map| map.insert(registration.name().to_string(), registration))
    }

    /// Removes the registration with the given full name.
    pub fn unregister(&self, name: &str) -> Option<CommandRegistration> {
        debug!(command = name, "Unregistering command");
        self.update(|map| map.remove(name))
    }

    pub fn len(&self) -> usize {
        self.registrations().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations().is_empty()
    }

    fn update<T>(&self, change: impl FnOnce(&mut Registrations) -> T) -> T {
        let mut guard = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = Registrations::clone(&guard);
        let result = change(&mut next);
        *guard = Arc::new(next);
        result
    }
}

impl CommandCatalog for InMemoryCatalog {
    fn registrations(&self) -> Arc<Registrations> {
        Arc::clone(&self.snapshot.read().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Finds the registration with the most words that prefix `words`.
///
/// Matching is whole-word: `hello world` never matches `helloworld`.
pub fn find_command<'a>(
    registrations: &'a Registrations,
    words: &[String],
) -> Option<&'a CommandRegistration> {
    registrations
        .values()
        .filter(|r| r.words().len() <= words.len() && words[..r.words().len()] == *r.words())
        .max_by_key(|r| r.words().len())
}
