//! Navigation contract of a view.
//!
//! The frame never looks inside a view: it only knows how to identify it,
//! ask it to animate in or out, and which navigation role it plays. Views
//! talk back through the [`ViewSignals`] handle they receive on registration.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::events::FrameSignal;

/// Free-form data handed to a view when it is shown
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Stable identity of a registered view.
///
/// Assigned by the view itself and used as the registry key in both layers,
/// so two instances reporting the same id are the same navigation target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ViewId(String);

impl ViewId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ViewId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ViewId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Which layer a view belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewRole {
    Window,
    Panel,
}

impl fmt::Display for ViewRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewRole::Window => f.write_str("window"),
            ViewRole::Panel => f.write_str("panel"),
        }
    }
}

/// How a show request competes for the foreground
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WindowPriority {
    /// Wait in the queue while another window owns the foreground
    Normal,

    /// Take the foreground immediately
    #[default]
    ForceForeground,
}

/// Per-window transition state.
///
/// `Hidden -> Showing -> Visible -> Hiding -> Hidden`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WindowState {
    #[default]
    Hidden,
    Showing,
    Visible,
    Hiding,
}

impl WindowState {
    /// Whether the window is on screen or on its way there
    pub fn is_shown(&self) -> bool {
        matches!(self, WindowState::Showing | WindowState::Visible)
    }
}

/// Opaque transition effect passed through to the view.
///
/// The frame never interprets it; a view decides what `name` means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub name: String,
    pub duration: Option<Duration>,
}

impl Transition {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            duration: None,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

/// Handle a view uses to talk back to the frame that registered it
#[derive(Debug, Clone)]
pub struct ViewSignals {
    id: ViewId,
    tx: mpsc::UnboundedSender<FrameSignal>,
}

impl ViewSignals {
    pub(crate) fn new(id: ViewId, tx: mpsc::UnboundedSender<FrameSignal>) -> Self {
        Self { id, tx }
    }

    pub fn id(&self) -> &ViewId {
        &self.id
    }

    /// Ask the frame to close this view (e.g. its close button was pressed)
    pub fn request_close(&self) {
        self.send(FrameSignal::CloseRequested(self.id.clone()));
    }

    /// Tell the frame the backing instance is gone
    pub fn destroyed(&self) {
        self.send(FrameSignal::Destroyed(self.id.clone()));
    }

    fn send(&self, signal: FrameSignal) {
        if self.tx.send(signal).is_err() {
            log::debug!("Frame dropped before signal from view {} was delivered", self.id);
        }
    }
}

/// Capabilities shared by every navigable view.
#[async_trait]
pub trait View: Send + Sync {
    fn id(&self) -> ViewId;

    /// Animate in. Completes when the view is fully visible.
    async fn show(&self, transition: Option<&Transition>, payload: &Payload);

    /// Animate out. Completes when the view is fully hidden.
    async fn hide(&self, transition: Option<&Transition>);

    /// Called once on registration with the view's signal handle
    fn attach(&self, _signals: ViewSignals) {}

    /// Release the backing instance
    fn destroy(&self) {}

    /// Window role, if this view participates in the window stack
    fn as_window(self: Arc<Self>) -> Option<Arc<dyn Window>> {
        None
    }

    /// Panel role, if this view is shown independently of the stack
    fn as_panel(self: Arc<Self>) -> Option<Arc<dyn Panel>> {
        None
    }
}

/// A view taking part in the exclusive window stack
pub trait Window: View {
    fn is_popup(&self) -> bool {
        false
    }

    fn priority(&self) -> WindowPriority {
        WindowPriority::ForceForeground
    }

    fn hide_on_foreground_lost(&self) -> bool {
        true
    }

    fn close_on_background_click(&self) -> bool {
        true
    }
}

/// A view shown and hidden independently of the window stack
pub trait Panel: View {}

/// A view resolved to exactly one navigation role
#[derive(Clone)]
pub enum RoleView {
    Window(Arc<dyn Window>),
    Panel(Arc<dyn Panel>),
}

impl RoleView {
    /// Resolve the role of a view; `None` unless it is exactly one of window or panel
    pub fn resolve(view: Arc<dyn View>) -> Option<Self> {
        let window = Arc::clone(&view).as_window();
        let panel = view.as_panel();

        match (window, panel) {
            (Some(window), None) => Some(RoleView::Window(window)),
            (None, Some(panel)) => Some(RoleView::Panel(panel)),
            _ => None,
        }
    }

    pub fn role(&self) -> ViewRole {
        match self {
            RoleView::Window(_) => ViewRole::Window,
            RoleView::Panel(_) => ViewRole::Panel,
        }
    }

    pub fn id(&self) -> ViewId {
        match self {
            RoleView::Window(window) => window.id(),
            RoleView::Panel(panel) => panel.id(),
        }
    }
}
