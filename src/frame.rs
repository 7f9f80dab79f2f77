//! Frame coordinator: the single entry point for navigation requests.
//!
//! Owns both layers, the popup overlay and the transition tracker, routes
//! each request to the layer of the view's role and turns view signals into
//! navigation requests.

use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::config::FrameConfig;
use crate::error::{NavError, Result};
use crate::events::{BackgroundClickSender, FrameEvent, FrameSignal};
use crate::loader::ViewLoader;
use crate::panel::{DisposeOutcome, PanelLayer};
use crate::popup::{Dimmer, PopupOverlay};
use crate::settings::{PanelHideSettings, PanelShowSettings, WindowHideSettings, WindowShowSettings};
use crate::transition::{InputSurface, TransitionTracker};
use crate::view::{RoleView, View, ViewId, ViewRole, ViewSignals, WindowState};
use crate::window::{ShowOutcome, WindowLayer};

/// Collects the collaborators of a [`UiFrame`]
#[derive(Default)]
pub struct FrameBuilder {
    config: FrameConfig,
    surface: Option<Arc<dyn InputSurface>>,
    dimmer: Option<Arc<dyn Dimmer>>,
    loaders: Vec<Arc<dyn ViewLoader>>,
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: FrameConfig) -> Self {
        self.config = config;
        self
    }

    pub fn input_surface(mut self, surface: Arc<dyn InputSurface>) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn dimmer(mut self, dimmer: Arc<dyn Dimmer>) -> Self {
        self.dimmer = Some(dimmer);
        self
    }

    /// Add a loader; loaders are asked in the order they were added
    pub fn loader(mut self, loader: impl ViewLoader + 'static) -> Self {
        self.loaders.push(Arc::new(loader));
        self
    }

    pub fn build(self) -> Arc<UiFrame> {
        let tracker = Arc::new(TransitionTracker::new(&self.config, self.surface));
        let popup = Arc::new(PopupOverlay::new(self.dimmer));
        let windows = Arc::new(WindowLayer::new(Arc::clone(&popup), Arc::clone(&tracker)));
        let panels = PanelLayer::new(Arc::clone(&tracker));
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();

        info!(
            "Frame ready (transition timeout: {:?}, input blocking: {}, loaders: {})",
            self.config.transition_timeout(),
            self.config.block_input,
            self.loaders.len()
        );

        Arc::new(UiFrame {
            config: self.config,
            windows,
            panels,
            popup,
            tracker,
            roles: Mutex::new(HashMap::new()),
            loaders: self.loaders,
            signal_tx,
            signal_rx: tokio::sync::Mutex::new(signal_rx),
        })
    }
}

pub struct UiFrame {
    config: FrameConfig,
    windows: Arc<WindowLayer>,
    panels: PanelLayer,
    popup: Arc<PopupOverlay>,
    tracker: Arc<TransitionTracker>,

    /// Which layer each registered id lives in
    roles: Mutex<HashMap<ViewId, ViewRole>>,
    loaders: Vec<Arc<dyn ViewLoader>>,
    signal_tx: mpsc::UnboundedSender<FrameSignal>,
    signal_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<FrameSignal>>,
}

impl UiFrame {
    pub fn builder() -> FrameBuilder {
        FrameBuilder::new()
    }

    /// Frame with the given config and no collaborators
    pub fn new(config: FrameConfig) -> Arc<Self> {
        FrameBuilder::new().config(config).build()
    }

    fn roles(&self) -> MutexGuard<'_, HashMap<ViewId, ViewRole>> {
        self.roles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Register a view with the layer of its role.
    ///
    /// Windows must be unique per id. Registering a panel again adds a
    /// reference that has to be released separately.
    pub fn register_view(&self, view: Arc<dyn View>) -> Result<ViewRole> {
        let id = view.id();

        let Some(resolved) = RoleView::resolve(Arc::clone(&view)) else {
            let err = NavError::RoleMismatch(id);
            error!("{}", err);
            return Err(err);
        };
        let role = resolved.role();

        let first_registration = {
            let mut roles = self.roles();

            if let Some(existing) = roles.get(&id) {
                if *existing != role {
                    error!("Cannot register {} {} as it is already registered as a {}", role, id, existing);
                    return Err(NavError::DuplicateRegistration(id));
                }
            }

            let first = match resolved {
                RoleView::Window(window) => {
                    self.windows.register(window)?;
                    true
                }
                RoleView::Panel(panel) => self.panels.register(panel) == 1,
            };
            roles.insert(id.clone(), role);
            first
        };

        if first_registration {
            view.attach(ViewSignals::new(id, self.signal_tx.clone()));
        }
        Ok(role)
    }

    /// Show a window, loading it first if no window is registered under `id`
    pub async fn show_window(&self, id: &ViewId, settings: WindowShowSettings) -> Result<ShowOutcome> {
        self.ensure_registered(id, ViewRole::Window).await?;
        self.windows.show(id, settings).await
    }

    pub async fn hide_window(&self, id: &ViewId, settings: WindowHideSettings) -> Result<()> {
        self.check_role(id, ViewRole::Window)?;
        self.windows.hide(id, settings).await
    }

    pub async fn close_current_window(&self) -> Result<()> {
        self.windows.close_current().await
    }

    /// Show a panel, loading it first if no panel is registered under `id`
    pub async fn show_panel(&self, id: &ViewId, settings: PanelShowSettings) -> Result<()> {
        self.ensure_registered(id, ViewRole::Panel).await?;
        self.panels.show(id, settings).await
    }

    pub async fn hide_panel(&self, id: &ViewId, settings: PanelHideSettings) -> Result<()> {
        self.check_role(id, ViewRole::Panel)?;
        self.panels.hide(id, settings).await
    }

    /// Give up one hold on a view.
    ///
    /// Panels lose one reference and are torn down on the last one; windows
    /// are unregistered right away. Unknown ids are ignored.
    pub async fn release_view(&self, id: &ViewId) -> Result<()> {
        let role = self.view_role(id);
        match role {
            Some(ViewRole::Window) => {
                self.windows.release(id).await?;
            }
            Some(ViewRole::Panel) => {
                if let DisposeOutcome::Retained(refs) = self.panels.dispose(id).await {
                    debug!("Panel {} kept alive by {} other references", id, refs);
                }
            }
            None => {
                debug!("Release of unknown view {} ignored", id);
                return Ok(());
            }
        }

        self.sync_role(id);
        Ok(())
    }

    /// Hide every window and panel; resolves once nothing is transitioning
    pub async fn hide_all(&self) {
        info!("Hiding everything");
        futures::join!(self.windows.hide_all(), self.panels.hide_all());
        self.tracker.wait_until_idle().await;
    }

    /// Handle a click on the popup background
    pub async fn background_clicked(&self) -> Result<bool> {
        self.windows.on_background_clicked().await
    }

    /// Handle the dimmer can use to report clicks through the signal queue
    pub fn background_click_sender(&self) -> BackgroundClickSender {
        BackgroundClickSender::new(self.signal_tx.clone())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FrameEvent> {
        self.tracker.subscribe()
    }

    pub async fn handle_signal(&self, signal: FrameSignal) -> Result<()> {
        debug!("Handling view signal {:?}", signal);

        match signal {
            FrameSignal::CloseRequested(id) => {
                let role = self.view_role(&id);
                match role {
                    Some(ViewRole::Window) => self.hide_window(&id, WindowHideSettings::default()).await,
                    Some(ViewRole::Panel) => self.hide_panel(&id, PanelHideSettings::default()).await,
                    None => {
                        warn!("Close requested by unregistered view {}", id);
                        Err(NavError::Unregistered(id))
                    }
                }
            }
            FrameSignal::Destroyed(id) => {
                let role = self.view_role(&id);
                let removed = match role {
                    Some(ViewRole::Window) => self.windows.forget(&id).await,
                    Some(ViewRole::Panel) => self.panels.forget(&id),
                    None => false,
                };
                if removed {
                    self.sync_role(&id);
                } else {
                    debug!("Destroyed view {} was not registered", id);
                }
                Ok(())
            }
            FrameSignal::BackgroundClicked => self.background_clicked().await.map(|_| ()),
        }
    }

    /// Handle every signal queued so far; returns how many were handled.
    ///
    /// Returns 0 right away while a [`UiFrame::spawn_signal_loop`] task owns
    /// the signal queue.
    pub async fn process_pending_signals(&self) -> usize {
        let Ok(mut signals) = self.signal_rx.try_lock() else {
            debug!("Signal loop is running, leaving pending signals to it");
            return 0;
        };
        let mut handled = 0;

        while let Ok(signal) = signals.try_recv() {
            if let Err(err) = self.handle_signal(signal).await {
                debug!("Signal not applied: {}", err);
            }
            handled += 1;
        }

        handled
    }

    /// Handle signals as they arrive until the returned task is aborted.
    ///
    /// The task owns the signal queue while it runs, so
    /// [`UiFrame::process_pending_signals`] finds nothing to do meanwhile.
    pub fn spawn_signal_loop(self: &Arc<Self>) -> JoinHandle<()> {
        let frame = Arc::clone(self);

        tokio::spawn(async move {
            loop {
                let next = frame.signal_rx.lock().await.recv().await;
                let Some(signal) = next else {
                    break;
                };

                if let Err(err) = frame.handle_signal(signal).await {
                    debug!("Signal not applied: {}", err);
                }
            }
        })
    }

    pub fn current_window(&self) -> Option<ViewId> {
        self.windows.current_window()
    }

    /// Window history from oldest to current
    pub fn history(&self) -> Vec<ViewId> {
        self.windows.history()
    }

    pub fn queue(&self) -> Vec<ViewId> {
        self.windows.queue()
    }

    pub fn window_state(&self, id: &ViewId) -> Option<WindowState> {
        self.windows.window_state(id)
    }

    pub fn is_view_registered(&self, id: &ViewId) -> bool {
        self.roles().contains_key(id)
    }

    pub fn view_role(&self, id: &ViewId) -> Option<ViewRole> {
        self.roles().get(id).copied()
    }

    pub fn panel_ref_count(&self, id: &ViewId) -> usize {
        self.panels.ref_count(id)
    }

    pub fn is_panel_visible(&self, id: &ViewId) -> bool {
        self.panels.is_visible(id)
    }

    pub fn is_background_visible(&self) -> bool {
        self.popup.is_background_visible()
    }

    pub fn is_input_blocked(&self) -> bool {
        self.tracker.is_blocked()
    }

    /// Views animating right now
    pub fn transitioning(&self) -> Vec<ViewId> {
        self.tracker.transitioning()
    }

    pub async fn wait_until_idle(&self) {
        self.tracker.wait_until_idle().await
    }

    fn check_role(&self, id: &ViewId, expected: ViewRole) -> Result<()> {
        match self.view_role(id) {
            Some(role) if role == expected => Ok(()),
            Some(_) => {
                let err = NavError::WrongLayer {
                    id: id.clone(),
                    expected,
                };
                error!("{}", err);
                Err(err)
            }
            None => {
                let err = NavError::Unregistered(id.clone());
                error!("{}", err);
                Err(err)
            }
        }
    }

    /// Make sure `id` is registered as `expected`, asking the loaders if it is unknown
    async fn ensure_registered(&self, id: &ViewId, expected: ViewRole) -> Result<()> {
        if self.is_view_registered(id) {
            return self.check_role(id, expected);
        }

        for loader in &self.loaders {
            let Some(view) = loader.load(id).await else {
                continue;
            };

            if view.id() != *id {
                warn!("Loader returned view {} when asked for {}, discarding it", view.id(), id);
                continue;
            }

            match self.register_view(view) {
                // Another request loaded the same window first
                Ok(_) | Err(NavError::DuplicateRegistration(_)) => {}
                Err(err) => return Err(err),
            }
            info!("Loaded {} on demand", id);
            return self.check_role(id, expected);
        }

        let err = NavError::Unregistered(id.clone());
        error!("{} and no loader could provide it", err);
        Err(err)
    }

    /// Drop the role entry of `id` once neither layer knows it anymore
    fn sync_role(&self, id: &ViewId) {
        let mut roles = self.roles();
        let still_registered = match roles.get(id) {
            Some(ViewRole::Window) => self.windows.is_registered(id),
            Some(ViewRole::Panel) => self.panels.is_registered(id),
            None => return,
        };

        if !still_registered {
            roles.remove(id);
        }
    }
}
