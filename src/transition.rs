//! Transitioning set shared by both layers.
//!
//! Input is blocked iff at least one view is animating. Layers call
//! [`TransitionTracker::begin`] when an animation starts and
//! [`TransitionTracker::end`] when it finishes; the tracker flips the input
//! surface on the empty/non-empty edges and forwards lifecycle events to
//! subscribers.

use log::{debug, trace, warn};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{broadcast, watch};

use crate::config::FrameConfig;
use crate::events::FrameEvent;
use crate::view::ViewId;

/// Screen-wide input switch, e.g. the engine's pointer raycaster
pub trait InputSurface: Send + Sync {
    fn set_input_blocked(&self, blocked: bool);
}

pub struct TransitionTracker {
    /// Views currently animating, with the number of overlapping animations each
    in_flight: Mutex<HashMap<ViewId, usize>>,
    blocked: watch::Sender<bool>,
    events: broadcast::Sender<FrameEvent>,
    surface: Option<Arc<dyn InputSurface>>,
    timeout: Option<Duration>,
}

impl TransitionTracker {
    pub fn new(config: &FrameConfig, surface: Option<Arc<dyn InputSurface>>) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let (blocked, _) = watch::channel(false);

        Self {
            in_flight: Mutex::new(HashMap::new()),
            blocked,
            events,
            surface: surface.filter(|_| config.block_input),
            timeout: config.transition_timeout(),
        }
    }

    fn in_flight(&self) -> MutexGuard<'_, HashMap<ViewId, usize>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FrameEvent> {
        self.events.subscribe()
    }

    /// Forward an event to subscribers; dropped silently when nobody listens
    pub fn emit(&self, event: FrameEvent) {
        trace!("Frame event: {:?}", event);
        let _ = self.events.send(event);
    }

    /// Mark `id` as transitioning and raise its opening/closing event
    pub fn begin(&self, id: &ViewId, event: FrameEvent) {
        {
            let mut in_flight = self.in_flight();
            let was_idle = in_flight.is_empty();
            *in_flight.entry(id.clone()).or_insert(0) += 1;

            if was_idle {
                self.set_blocked(true);
            }
        }
        self.emit(event);
    }

    /// Mark one transition of `id` as finished and raise its opened/closed event
    pub fn end(&self, id: &ViewId, event: FrameEvent) {
        {
            let mut in_flight = self.in_flight();
            match in_flight.get_mut(id) {
                Some(count) if *count > 1 => *count -= 1,
                Some(_) => {
                    in_flight.remove(id);
                }
                None => warn!("Transition of {} ended but was never started", id),
            }

            if in_flight.is_empty() && *self.blocked.borrow() {
                self.set_blocked(false);
            }
        }
        self.emit(event);
    }

    fn set_blocked(&self, blocked: bool) {
        debug!("{} screen input", if blocked { "🔒 Blocking" } else { "🔓 Unblocking" });
        self.blocked.send_replace(blocked);

        if let Some(surface) = &self.surface {
            surface.set_input_blocked(blocked);
        }

        self.emit(if blocked {
            FrameEvent::InputBlocked
        } else {
            FrameEvent::InputUnblocked
        });
    }

    /// Run one animation, giving up after the configured timeout
    pub async fn animate<F>(&self, id: &ViewId, what: &str, animation: F)
    where
        F: Future<Output = ()>,
    {
        match self.timeout {
            None => animation.await,
            Some(limit) => {
                if tokio::time::timeout(limit, animation).await.is_err() {
                    warn!(
                        "⏱️ {} of {} did not finish within {:?}, treating it as complete",
                        what, id, limit
                    );
                }
            }
        }
    }

    pub fn is_blocked(&self) -> bool {
        *self.blocked.borrow()
    }

    pub fn is_transitioning(&self, id: &ViewId) -> bool {
        self.in_flight().contains_key(id)
    }

    pub fn transitioning(&self) -> Vec<ViewId> {
        let mut ids: Vec<ViewId> = self.in_flight().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Resolve once no view is transitioning
    pub async fn wait_until_idle(&self) {
        let mut rx = self.blocked.subscribe();
        let _ = rx.wait_for(|blocked| !*blocked).await;
    }
}
