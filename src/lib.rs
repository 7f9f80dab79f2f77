//! Screen navigation and lifecycle orchestration.
//!
//! A [`UiFrame`] owns two layers of views. Windows form an exclusive stack
//! with a history and a pending queue; panels are shown independently and
//! are reference counted. The frame animates views in and out, blocks input
//! while anything is transitioning and reports every lifecycle step on an
//! event bus.

pub mod config;
pub mod error;
pub mod events;
pub mod frame;
pub mod loader;
pub mod panel;
pub mod popup;
pub mod registry;
pub mod settings;
pub mod transition;
pub mod view;
pub mod window;

pub use config::FrameConfig;
pub use error::{NavError, Result};
pub use events::{BackgroundClickSender, CloseReason, FrameEvent, FrameSignal, OpenReason};
pub use frame::{FrameBuilder, UiFrame};
pub use loader::{FactoryLoader, ViewLoader};
pub use panel::{DisposeOutcome, PanelLayer};
pub use popup::{Dimmer, PopupOverlay};
pub use settings::{PanelHideSettings, PanelShowSettings, WindowHideSettings, WindowShowSettings};
pub use transition::{InputSurface, TransitionTracker};
pub use view::{Panel, Payload, RoleView, Transition, View, ViewId, ViewRole, ViewSignals, Window, WindowPriority, WindowState};
pub use window::{ShowOutcome, WindowLayer};
