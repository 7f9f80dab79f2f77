//! Lazy creation of views that are shown before anyone registered them.

use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

use crate::view::{View, ViewId};

/// Produces a view instance for an id the frame does not know yet.
///
/// Returning `None` means this loader has nothing for `id`; the frame then
/// tries the next loader and finally reports the id as unregistered.
#[async_trait]
pub trait ViewLoader: Send + Sync {
    async fn load(&self, id: &ViewId) -> Option<Arc<dyn View>>;
}

type ViewFactory = Box<dyn Fn() -> Arc<dyn View> + Send + Sync>;

/// Loader backed by one constructor closure per view id
#[derive(Default)]
pub struct FactoryLoader {
    factories: HashMap<ViewId, ViewFactory>,
}

impl FactoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor for `id`, replacing any previous one
    pub fn with_factory<F>(mut self, id: impl Into<ViewId>, factory: F) -> Self
    where
        F: Fn() -> Arc<dyn View> + Send + Sync + 'static,
    {
        self.insert(id, factory);
        self
    }

    pub fn insert<F>(&mut self, id: impl Into<ViewId>, factory: F)
    where
        F: Fn() -> Arc<dyn View> + Send + Sync + 'static,
    {
        self.factories.insert(id.into(), Box::new(factory));
    }

    pub fn contains(&self, id: &ViewId) -> bool {
        self.factories.contains_key(id)
    }
}

#[async_trait]
impl ViewLoader for FactoryLoader {
    async fn load(&self, id: &ViewId) -> Option<Arc<dyn View>> {
        let factory = self.factories.get(id)?;
        debug!("Creating view {} from its factory", id);
        Some(factory())
    }
}
