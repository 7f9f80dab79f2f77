//! Pure navigation state of the window layer.
//!
//! History is LIFO and its top is always the current window, so "current is
//! set iff history is non-empty" holds by construction. The queue is FIFO and
//! always wins over resuming history when the current window closes.

use log::{debug, warn};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use crate::error::{NavError, Result};
use crate::events::OpenReason;
use crate::settings::WindowShowSettings;
use crate::view::{ViewId, Window, WindowPriority};

/// A window together with the request that put it on the stack
#[derive(Clone)]
pub struct NavigationEntry {
    pub window: Arc<dyn Window>,
    pub settings: WindowShowSettings,
}

impl NavigationEntry {
    pub fn new(window: Arc<dyn Window>, settings: WindowShowSettings) -> Self {
        Self { window, settings }
    }

    pub fn id(&self) -> ViewId {
        self.window.id()
    }

    pub fn is_popup(&self) -> bool {
        self.window.is_popup()
    }
}

impl fmt::Debug for NavigationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationEntry")
            .field("window", &self.id())
            .field("settings", &self.settings)
            .finish()
    }
}

/// Result of closing the current window
#[derive(Debug)]
pub struct Advance {
    pub closed: NavigationEntry,

    /// Window that now owns the foreground and how it got there
    pub next: Option<(NavigationEntry, OpenReason)>,
}

#[derive(Debug, Default)]
pub struct WindowStack {
    queue: VecDeque<NavigationEntry>,
    history: Vec<NavigationEntry>,
}

impl WindowStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&NavigationEntry> {
        self.history.last()
    }

    pub fn current_id(&self) -> Option<ViewId> {
        self.current().map(NavigationEntry::id)
    }

    pub fn current_is_popup(&self) -> bool {
        self.current().is_some_and(NavigationEntry::is_popup)
    }

    /// No current window and nothing waiting
    pub fn is_idle(&self) -> bool {
        self.history.is_empty() && self.queue.is_empty()
    }

    pub fn should_enqueue(&self, priority: WindowPriority) -> bool {
        priority != WindowPriority::ForceForeground && !self.is_idle()
    }

    /// Defer a request; returns its 1-based position in the queue
    pub fn enqueue(&mut self, entry: NavigationEntry) -> usize {
        debug!("Queueing window {}", entry.id());
        self.queue.push_back(entry);
        self.queue.len()
    }

    /// Make `entry` the current window
    pub fn push(&mut self, entry: NavigationEntry) {
        let id = entry.id();
        if self.history.iter().any(|existing| existing.id() == id) {
            warn!(
                "Window {} is already in the history, pushing a duplicate entry. \
                 Windows that are opened repeatedly should close themselves before reopening.",
                id
            );
        }
        self.history.push(entry);
    }

    /// Close the current window, which must be `id`, and pick its successor
    pub fn pop_current(&mut self, id: &ViewId) -> Result<Advance> {
        let closed = match self.history.pop() {
            Some(entry) if entry.id() == *id => entry,
            other => {
                let current = other.as_ref().map(NavigationEntry::id);
                if let Some(entry) = other {
                    self.history.push(entry);
                }
                return Err(NavError::InvalidHideTarget {
                    requested: id.clone(),
                    current,
                });
            }
        };

        let next = self.advance();
        Ok(Advance { closed, next })
    }

    /// Pick the window that takes over an empty foreground slot.
    ///
    /// The queue head wins and becomes the history top; otherwise the
    /// history top is resumed.
    pub fn advance(&mut self) -> Option<(NavigationEntry, OpenReason)> {
        match self.queue.pop_front() {
            Some(entry) => {
                self.history.push(entry.clone());
                Some((entry, OpenReason::Dequeued))
            }
            None => self
                .history
                .last()
                .cloned()
                .map(|entry| (entry, OpenReason::Resumed)),
        }
    }

    /// Drop every queued and historical entry of `id`; returns how many went
    pub fn remove_window(&mut self, id: &ViewId) -> usize {
        let before = self.queue.len() + self.history.len();
        self.queue.retain(|entry| entry.id() != *id);
        self.history.retain(|entry| entry.id() != *id);
        before - self.queue.len() - self.history.len()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.history.clear();
    }

    pub fn contains(&self, id: &ViewId) -> bool {
        self.queue.iter().chain(self.history.iter()).any(|entry| entry.id() == *id)
    }

    /// History ids from oldest to current
    pub fn history_ids(&self) -> Vec<ViewId> {
        self.history.iter().map(NavigationEntry::id).collect()
    }

    /// Queued ids in the order they will be shown
    pub fn queue_ids(&self) -> Vec<ViewId> {
        self.queue.iter().map(NavigationEntry::id).collect()
    }
}
