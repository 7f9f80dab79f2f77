//! Per-layer view registry keyed by [`ViewId`].
//!
//! Windows use [`Registry::register_unique`]: one instance per id, a second
//! registration is an error. Panels use [`Registry::retain`] and
//! [`Registry::release`]: duplicate registrations bump a reference count and
//! the instance is only handed back for teardown once the count hits zero.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{NavError, Result};
use crate::view::ViewId;

struct Registration<V: ?Sized> {
    view: Arc<V>,
    refs: usize,
}

/// Outcome of releasing one reference
pub enum Release<V: ?Sized> {
    /// Nothing was registered under the id
    NotRegistered,

    /// Other holders remain; carries the remaining count
    Retained(usize),

    /// Last reference dropped; the view is no longer registered
    Released(Arc<V>),
}

pub struct Registry<V: ?Sized> {
    entries: HashMap<ViewId, Registration<V>>,
}

impl<V: ?Sized> Default for Registry<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: ?Sized> Registry<V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Insert a view, failing if the id is already taken
    pub fn register_unique(&mut self, id: ViewId, view: Arc<V>) -> Result<()> {
        if self.entries.contains_key(&id) {
            return Err(NavError::DuplicateRegistration(id));
        }

        self.entries.insert(id, Registration { view, refs: 1 });
        Ok(())
    }

    /// Insert a view or add a reference to the existing registration.
    ///
    /// Returns the reference count after the call. When the id is already
    /// registered the passed instance is dropped and the original kept.
    pub fn retain(&mut self, id: ViewId, view: Arc<V>) -> usize {
        let entry = self
            .entries
            .entry(id)
            .and_modify(|registration| registration.refs += 1)
            .or_insert(Registration { view, refs: 1 });
        entry.refs
    }

    /// Drop one reference
    pub fn release(&mut self, id: &ViewId) -> Release<V> {
        let Some(registration) = self.entries.get_mut(id) else {
            return Release::NotRegistered;
        };

        registration.refs -= 1;
        if registration.refs > 0 {
            return Release::Retained(registration.refs);
        }

        match self.entries.remove(id) {
            Some(registration) => Release::Released(registration.view),
            None => Release::NotRegistered,
        }
    }

    /// Remove a registration regardless of its reference count
    pub fn remove(&mut self, id: &ViewId) -> Option<Arc<V>> {
        self.entries.remove(id).map(|registration| registration.view)
    }

    pub fn get(&self, id: &ViewId) -> Option<Arc<V>> {
        self.entries
            .get(id)
            .map(|registration| Arc::clone(&registration.view))
    }

    pub fn contains(&self, id: &ViewId) -> bool {
        self.entries.contains_key(id)
    }

    /// Reference count of a registration, 0 when not registered
    pub fn ref_count(&self, id: &ViewId) -> usize {
        self.entries.get(id).map_or(0, |registration| registration.refs)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ViewId> {
        self.entries.keys()
    }

    pub fn views(&self) -> impl Iterator<Item = (&ViewId, &Arc<V>)> {
        self.entries
            .iter()
            .map(|(id, registration)| (id, &registration.view))
    }
}
