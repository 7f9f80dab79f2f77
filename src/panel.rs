//! Panel layer.
//!
//! Panels live outside the window stack: no queue, no history, any number
//! of them on screen at once. Registrations are reference counted so several
//! owners can hold the same panel; it is only torn down once the last one
//! releases it.

use futures::future::join_all;
use log::{debug, error, info};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{NavError, Result};
use crate::events::FrameEvent;
use crate::registry::{Registry, Release};
use crate::settings::{PanelHideSettings, PanelShowSettings};
use crate::transition::TransitionTracker;
use crate::view::{Panel, Transition, ViewId};

/// Outcome of releasing one reference to a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisposeOutcome {
    NotRegistered,

    /// Still held by this many owners
    Retained(usize),

    /// Unregistered, hidden and destroyed
    Released,
}

struct PanelLayerState {
    registry: Registry<dyn Panel>,
    /// Panels shown or animating in
    visible: HashSet<ViewId>,
}

pub struct PanelLayer {
    state: Mutex<PanelLayerState>,
    tracker: Arc<TransitionTracker>,
}

impl PanelLayer {
    pub fn new(tracker: Arc<TransitionTracker>) -> Self {
        Self {
            state: Mutex::new(PanelLayerState {
                registry: Registry::new(),
                visible: HashSet::new(),
            }),
            tracker,
        }
    }

    fn state(&self) -> MutexGuard<'_, PanelLayerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a panel or add a reference to it; returns the new count
    pub fn register(&self, panel: Arc<dyn Panel>) -> usize {
        let id = panel.id();
        let refs = self.state().registry.retain(id.clone(), panel);
        debug!("Registered panel {} (references: {})", id, refs);
        refs
    }

    pub fn is_registered(&self, id: &ViewId) -> bool {
        self.state().registry.contains(id)
    }

    pub fn ref_count(&self, id: &ViewId) -> usize {
        self.state().registry.ref_count(id)
    }

    pub fn is_visible(&self, id: &ViewId) -> bool {
        self.state().visible.contains(id)
    }

    pub fn visible_panels(&self) -> Vec<ViewId> {
        let mut ids: Vec<ViewId> = self.state().visible.iter().cloned().collect();
        ids.sort();
        ids
    }

    pub async fn show(&self, id: &ViewId, settings: PanelShowSettings) -> Result<()> {
        let panel = {
            let mut state = self.state();

            let Some(panel) = state.registry.get(id) else {
                error!("Panel {} is not registered to the panel layer", id);
                return Err(NavError::Unregistered(id.clone()));
            };

            if !state.visible.insert(id.clone()) {
                debug!("Panel {} is already shown", id);
                return Ok(());
            }

            self.tracker.begin(id, FrameEvent::PanelOpening(id.clone()));
            panel
        };

        self.tracker
            .animate(id, "show", panel.show(settings.transition.as_ref(), &settings.payload))
            .await;
        self.tracker.end(id, FrameEvent::PanelOpened(id.clone()));
        Ok(())
    }

    pub async fn hide(&self, id: &ViewId, settings: PanelHideSettings) -> Result<()> {
        let panel = {
            let mut state = self.state();

            let Some(panel) = state.registry.get(id) else {
                error!("Could not hide panel {} as it is not registered to the panel layer", id);
                return Err(NavError::Unregistered(id.clone()));
            };

            if !state.visible.remove(id) {
                debug!("Panel {} is already hidden", id);
                return Ok(());
            }

            self.tracker.begin(id, FrameEvent::PanelClosing(id.clone()));
            panel
        };

        self.animate_out(id, panel, settings.transition).await;
        Ok(())
    }

    /// Release one reference; the last release hides and destroys the panel
    pub async fn dispose(&self, id: &ViewId) -> DisposeOutcome {
        let (panel, was_visible) = {
            let mut state = self.state();

            match state.registry.release(id) {
                Release::NotRegistered => {
                    debug!("Dispose of unregistered panel {} ignored", id);
                    return DisposeOutcome::NotRegistered;
                }
                Release::Retained(refs) => {
                    debug!("Panel {} still has {} references", id, refs);
                    return DisposeOutcome::Retained(refs);
                }
                Release::Released(panel) => {
                    let was_visible = state.visible.remove(id);
                    if was_visible {
                        self.tracker.begin(id, FrameEvent::PanelClosing(id.clone()));
                    }
                    (panel, was_visible)
                }
            }
        };

        if was_visible {
            self.animate_out(id, Arc::clone(&panel), None).await;
        }
        panel.destroy();
        info!("Released panel {}", id);
        DisposeOutcome::Released
    }

    pub async fn hide_all(&self) {
        let targets: Vec<(ViewId, Arc<dyn Panel>)> = {
            let mut state = self.state();
            let ids: Vec<ViewId> = state.visible.drain().collect();

            ids.into_iter()
                .filter_map(|id| state.registry.get(&id).map(|panel| (id, panel)))
                .inspect(|(id, _)| self.tracker.begin(id, FrameEvent::PanelClosing(id.clone())))
                .collect()
        };

        info!("Hiding all panels ({} on screen)", targets.len());
        join_all(
            targets
                .into_iter()
                .map(|(id, panel)| async move { self.animate_out(&id, panel, None).await }),
        )
        .await;
    }

    /// Drop a panel whose instance is already gone, ignoring its references
    pub fn forget(&self, id: &ViewId) -> bool {
        let mut state = self.state();
        state.visible.remove(id);
        state.registry.remove(id).is_some()
    }

    async fn animate_out(&self, id: &ViewId, panel: Arc<dyn Panel>, transition: Option<Transition>) {
        self.tracker
            .animate(id, "hide", panel.hide(transition.as_ref()))
            .await;
        self.tracker.end(id, FrameEvent::PanelClosed(id.clone()));
    }
}
