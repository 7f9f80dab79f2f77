//! Window layer: drives the [`WindowStack`] and the window animations.
//!
//! Every entry point does all of its bookkeeping (stack, per-window state,
//! popup background, lifecycle "ing" events) inside a single critical
//! section and only then awaits animations. Anyone looking at the layer while
//! windows are still animating sees the state the request is heading to.

use futures::future::{BoxFuture, FutureExt, join_all};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::stack::{Advance, NavigationEntry, WindowStack};
use crate::error::{NavError, Result};
use crate::events::{CloseReason, FrameEvent, OpenReason};
use crate::popup::PopupOverlay;
use crate::registry::Registry;
use crate::settings::{WindowHideSettings, WindowShowSettings};
use crate::transition::TransitionTracker;
use crate::view::{Transition, ViewId, Window, WindowState};

/// What a show request ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowOutcome {
    /// The window took the foreground and finished animating in
    Shown,

    /// The window waits in the queue at this 1-based position
    Queued { position: usize },

    /// The window already was the current window; nothing happened
    AlreadyCurrent,
}

struct WindowLayerState {
    registry: Registry<dyn Window>,
    stack: WindowStack,
    states: HashMap<ViewId, WindowState>,
}

/// How the successor of a closed window gets on screen
enum FollowUp {
    /// Animate in while the closed window animates out
    Concurrent(BoxFuture<'static, ()>),

    /// Same instance as the closed window: animate in once it is hidden
    AfterHide(NavigationEntry, OpenReason),

    Nothing,
}

pub struct WindowLayer {
    state: Mutex<WindowLayerState>,
    popup: Arc<PopupOverlay>,
    tracker: Arc<TransitionTracker>,
}

impl WindowLayer {
    pub fn new(popup: Arc<PopupOverlay>, tracker: Arc<TransitionTracker>) -> Self {
        Self {
            state: Mutex::new(WindowLayerState {
                registry: Registry::new(),
                stack: WindowStack::new(),
                states: HashMap::new(),
            }),
            popup,
            tracker,
        }
    }

    fn state(&self) -> MutexGuard<'_, WindowLayerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register(&self, window: Arc<dyn Window>) -> Result<()> {
        let id = window.id();
        let mut state = self.state();

        if let Err(err) = state.registry.register_unique(id.clone(), window) {
            error!("{}, keeping the existing registration", err);
            return Err(err);
        }

        state.states.insert(id.clone(), WindowState::Hidden);
        debug!("Registered window {}", id);
        Ok(())
    }

    pub fn is_registered(&self, id: &ViewId) -> bool {
        self.state().registry.contains(id)
    }

    pub fn current_window(&self) -> Option<ViewId> {
        self.state().stack.current_id()
    }

    /// History from oldest to current
    pub fn history(&self) -> Vec<ViewId> {
        self.state().stack.history_ids()
    }

    pub fn queue(&self) -> Vec<ViewId> {
        self.state().stack.queue_ids()
    }

    pub fn window_state(&self, id: &ViewId) -> Option<WindowState> {
        self.state().states.get(id).copied()
    }

    /// Windows currently in [`WindowState::Visible`]
    pub fn visible_windows(&self) -> Vec<ViewId> {
        let state = self.state();
        let mut ids: Vec<ViewId> = state
            .states
            .iter()
            .filter(|(_, window_state)| **window_state == WindowState::Visible)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Show a registered window, or queue it behind the current one
    pub async fn show(self: &Arc<Self>, id: &ViewId, settings: WindowShowSettings) -> Result<ShowOutcome> {
        let (hide, show) = {
            let mut state = self.state();

            let Some(window) = state.registry.get(id) else {
                error!("Window {} is not registered to the window layer", id);
                return Err(NavError::Unregistered(id.clone()));
            };

            let priority = settings.priority.unwrap_or_else(|| window.priority());
            if state.stack.should_enqueue(priority) {
                let position = state.stack.enqueue(NavigationEntry::new(window, settings));
                info!("📥 Window {} queued at position {}", id, position);
                return Ok(ShowOutcome::Queued { position });
            }

            let previous = state.stack.current().cloned();
            if previous.as_ref().is_some_and(|entry| entry.id() == *id) {
                warn!(
                    "Window {} is already the current window, ignoring duplicate open. \
                     Windows opened repeatedly should close themselves before reopening.",
                    id
                );
                return Ok(ShowOutcome::AlreadyCurrent);
            }

            let previous_id = previous.as_ref().map(NavigationEntry::id);
            let out_transition = settings.out_transition.clone();
            let is_popup = window.is_popup();

            let entry = NavigationEntry::new(window, settings);
            state.stack.push(entry.clone());
            if !is_popup {
                self.popup.refresh_background(state.stack.current_is_popup());
            }
            info!("🪟 Showing window {} in the foreground (previous: {:?})", id, previous_id);
            self.tracker.emit(FrameEvent::CurrentWindowChanged {
                previous: previous_id.clone(),
                current: Some(id.clone()),
            });

            let hide = match previous {
                Some(previous)
                    if previous.window.hide_on_foreground_lost()
                        && !is_popup
                        && is_shown(&state, &previous.id()) =>
                {
                    Some(self.begin_hide(
                        &mut state,
                        previous.window,
                        out_transition,
                        Some(id.clone()),
                        CloseReason::ForegroundLost,
                    ))
                }
                _ => None,
            };

            let show = self.begin_show(&mut state, entry, previous_id, OpenReason::Requested);
            (hide, show)
        };

        // The window losing the foreground starts hiding before the new one
        // shows but does not hold it up
        if let Some(mut hide) = hide {
            if futures::poll!(&mut hide).is_pending() {
                tokio::spawn(hide);
            }
        }
        show.await;

        Ok(ShowOutcome::Shown)
    }

    /// Close the current window, which must be `id`, and bring up its successor
    pub async fn hide(self: &Arc<Self>, id: &ViewId, settings: WindowHideSettings) -> Result<()> {
        let (hide, follow_up) = {
            let mut state = self.state();

            let Advance { closed, next } = match state.stack.pop_current(id) {
                Ok(advance) => advance,
                Err(err) => {
                    error!("{}. Ignoring request.", err);
                    return Err(err);
                }
            };

            let next_id = next.as_ref().map(|(entry, _)| entry.id());
            info!("Hiding window {} (next: {:?})", id, next_id);

            if closed.is_popup() && !state.stack.current_is_popup() {
                self.popup.hide_background();
            }

            self.tracker.emit(FrameEvent::CurrentWindowChanged {
                previous: Some(id.clone()),
                current: next_id.clone(),
            });

            let hide = self.begin_hide(
                &mut state,
                closed.window,
                settings.transition,
                next_id.clone(),
                CloseReason::Requested,
            );

            let follow_up = match next {
                Some((entry, reason)) if next_id.as_ref() == Some(id) => FollowUp::AfterHide(entry, reason),
                Some((entry, reason)) if !is_shown(&state, &entry.id()) => FollowUp::Concurrent(
                    self.begin_show(&mut state, entry, Some(id.clone()), reason),
                ),
                Some((entry, _)) => {
                    debug!("Window {} is still on screen, not animating it again", entry.id());
                    if entry.is_popup() {
                        self.popup.show_background();
                    }
                    FollowUp::Nothing
                }
                None => FollowUp::Nothing,
            };

            (hide, follow_up)
        };

        match follow_up {
            FollowUp::Concurrent(show) => {
                futures::join!(hide, show);
            }
            FollowUp::AfterHide(entry, reason) => {
                hide.await;
                let show = {
                    let mut state = self.state();
                    self.begin_show(&mut state, entry, Some(id.clone()), reason)
                };
                show.await;
            }
            FollowUp::Nothing => hide.await,
        }

        Ok(())
    }

    /// Hide whatever window is current; no-op when there is none
    pub async fn close_current(self: &Arc<Self>) -> Result<()> {
        match self.current_window() {
            Some(id) => self.hide(&id, WindowHideSettings::default()).await,
            None => {
                debug!("Close requested but no window is open");
                Ok(())
            }
        }
    }

    /// Dismiss the current popup if it allows closing from its background.
    ///
    /// Returns whether a hide was triggered.
    pub async fn on_background_clicked(self: &Arc<Self>) -> Result<bool> {
        if !self.popup.accepts_click() {
            return Ok(false);
        }

        let target = {
            let state = self.state();
            state
                .stack
                .current()
                .filter(|entry| entry.is_popup() && entry.window.close_on_background_click())
                .map(NavigationEntry::id)
        };

        match target {
            Some(id) => {
                info!("Background clicked, closing popup {}", id);
                self.hide(&id, WindowHideSettings::default()).await?;
                Ok(true)
            }
            None => {
                debug!("Background clicked but the current window does not close on it");
                Ok(false)
            }
        }
    }

    /// Hide every shown window and forget all navigation state
    pub async fn hide_all(self: &Arc<Self>) {
        let hides = {
            let mut state = self.state();

            let previous = state.stack.current_id();
            state.stack.clear();
            self.popup.refresh_background(state.stack.current_is_popup());
            if previous.is_some() {
                self.tracker.emit(FrameEvent::CurrentWindowChanged { previous, current: None });
            }

            let targets: Vec<Arc<dyn Window>> = state
                .registry
                .views()
                .filter(|(id, _)| is_shown(&state, id))
                .map(|(_, window)| Arc::clone(window))
                .collect();

            targets
                .into_iter()
                .map(|window| self.begin_hide(&mut state, window, None, None, CloseReason::HideAll))
                .collect::<Vec<_>>()
        };

        info!("Hiding all windows ({} on screen)", hides.len());
        join_all(hides).await;
    }

    /// Unregister a window that is not current, hiding it if needed.
    ///
    /// Returns `Ok(false)` when nothing was registered under `id`.
    pub async fn release(self: &Arc<Self>, id: &ViewId) -> Result<bool> {
        let (window, hide) = {
            let mut state = self.state();

            if state.stack.current_id().as_ref() == Some(id) {
                let err = NavError::WindowIsCurrent(id.clone());
                error!("{}", err);
                return Err(err);
            }

            let Some(window) = state.registry.remove(id) else {
                return Ok(false);
            };

            let purged = state.stack.remove_window(id);
            if purged > 0 {
                debug!("Dropped {} stack entries of released window {}", purged, id);
            }

            let hide = is_shown(&state, id).then(|| {
                self.begin_hide(&mut state, Arc::clone(&window), None, None, CloseReason::Released)
            });
            state.states.remove(id);
            (window, hide)
        };

        if let Some(hide) = hide {
            hide.await;
        }
        window.destroy();
        info!("Released window {}", id);
        Ok(true)
    }

    /// Drop a window whose instance is already gone, without animating it.
    ///
    /// If it was current, the queue head takes over, or else the window
    /// below it in history is brought back.
    pub async fn forget(self: &Arc<Self>, id: &ViewId) -> bool {
        let resume = {
            let mut state = self.state();

            if state.registry.remove(id).is_none() {
                return false;
            }
            state.states.remove(id);

            let previous = state.stack.current_id();
            let was_current = previous.as_ref() == Some(id);
            state.stack.remove_window(id);
            let next = if was_current { state.stack.advance() } else { None };
            let current_id = state.stack.current_id();

            self.popup.refresh_background(state.stack.current_is_popup());
            if previous != current_id {
                self.tracker.emit(FrameEvent::CurrentWindowChanged {
                    previous: previous.clone(),
                    current: current_id,
                });
            }

            match next {
                Some((entry, reason)) if !is_shown(&state, &entry.id()) => {
                    Some(self.begin_show(&mut state, entry, Some(id.clone()), reason))
                }
                _ => None,
            }
        };

        warn!("Window {} was destroyed while registered", id);
        if let Some(show) = resume {
            show.await;
        }
        true
    }

    /// Mark `entry` as showing and return its animation
    fn begin_show(
        self: &Arc<Self>,
        state: &mut WindowLayerState,
        entry: NavigationEntry,
        previous: Option<ViewId>,
        reason: OpenReason,
    ) -> BoxFuture<'static, ()> {
        let id = entry.id();

        if entry.is_popup() {
            self.popup.show_background();
        }

        state.states.insert(id.clone(), WindowState::Showing);
        self.tracker.begin(
            &id,
            FrameEvent::WindowOpening {
                window: id.clone(),
                previous: previous.clone(),
                reason,
            },
        );

        let layer = Arc::clone(self);
        async move {
            let NavigationEntry { window, settings } = entry;
            layer
                .tracker
                .animate(&id, "show", window.show(settings.transition.as_ref(), &settings.payload))
                .await;

            layer.settle(&id, WindowState::Showing, WindowState::Visible);
            layer.tracker.end(
                &id,
                FrameEvent::WindowOpened {
                    window: id.clone(),
                    previous,
                    reason,
                },
            );
        }
        .boxed()
    }

    /// Mark `window` as hiding and return its animation
    fn begin_hide(
        self: &Arc<Self>,
        state: &mut WindowLayerState,
        window: Arc<dyn Window>,
        transition: Option<Transition>,
        next: Option<ViewId>,
        reason: CloseReason,
    ) -> BoxFuture<'static, ()> {
        let id = window.id();

        state.states.insert(id.clone(), WindowState::Hiding);
        self.tracker.begin(
            &id,
            FrameEvent::WindowClosing {
                window: id.clone(),
                next: next.clone(),
                reason,
            },
        );

        let layer = Arc::clone(self);
        async move {
            layer
                .tracker
                .animate(&id, "hide", window.hide(transition.as_ref()))
                .await;

            layer.settle(&id, WindowState::Hiding, WindowState::Hidden);
            layer.tracker.end(
                &id,
                FrameEvent::WindowClosed {
                    window: id.clone(),
                    next,
                    reason,
                },
            );
        }
        .boxed()
    }

    /// Advance `id` to `to` unless a later transition already replaced `from`
    fn settle(&self, id: &ViewId, from: WindowState, to: WindowState) {
        let mut state = self.state();
        if let Some(current) = state.states.get_mut(id) {
            if *current == from {
                *current = to;
            }
        }
    }
}

fn is_shown(state: &WindowLayerState, id: &ViewId) -> bool {
    state.states.get(id).is_some_and(WindowState::is_shown)
}
