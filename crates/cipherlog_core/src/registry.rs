//! Key book registry.
//!
//! Maps log identifiers to their key books. This used to be the job of a
//! process-wide singleton; it is now an explicitly constructed object
//! passed by reference to whatever needs the lookup, so creation and
//! teardown are visible in the code that owns it.

use crate::error::CoreResult;
use crate::keybook::KeyBook;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// A key book shared between a registry and the logs using it.
pub type SharedBook = Arc<Mutex<KeyBook>>;

/// An explicit directory of key books, keyed by log identifier.
///
/// Identifiers are caller-chosen strings - typically the hex rendering of
/// the log's public key. The registry hands out shared handles so a book
/// registered once can back several readers of the same log.
#[derive(Debug, Default)]
pub struct BookRegistry {
    books: RwLock<HashMap<String, SharedBook>>,
}

impl BookRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a book under `id` and returns the shared handle.
    ///
    /// Replacing a book already registered under the same id is allowed
    /// but logged, since readers holding the old handle keep resolving
    /// against it.
    pub fn insert(&self, id: impl Into<String>, book: KeyBook) -> SharedBook {
        self.insert_shared(id, Arc::new(Mutex::new(book)))
    }

    /// Registers an already-shared book under `id`.
    pub fn insert_shared(&self, id: impl Into<String>, book: SharedBook) -> SharedBook {
        let id = id.into();
        let mut books = self.books.write();

        if let Some(existing) = books.get(&id) {
            if !Arc::ptr_eq(existing, &book) {
                warn!(id = %id, "replacing key book already registered under this id");
            }
        }

        books.insert(id, Arc::clone(&book));
        book
    }

    /// Parses a serialized key book and registers it under `id`.
    ///
    /// # Errors
    ///
    /// Returns a deserialization error if the text is not a valid key
    /// book; nothing is registered in that case.
    pub fn insert_serialized(&self, id: impl Into<String>, json: &str) -> CoreResult<SharedBook> {
        let book = KeyBook::from_json(json)?;
        Ok(self.insert(id, book))
    }

    /// Registers several books at once.
    pub fn extend(&self, books: impl IntoIterator<Item = (String, KeyBook)>) {
        for (id, book) in books {
            self.insert(id, book);
        }
    }

    /// Looks up the book registered under `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<SharedBook> {
        self.books.read().get(id).map(Arc::clone)
    }

    /// Returns the registered identifiers.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.books.read().keys().cloned().collect()
    }

    /// Returns the number of registered books.
    #[must_use]
    pub fn len(&self) -> usize {
        self.books.read().len()
    }

    /// Returns true if no book is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.books.read().is_empty()
    }
}
