use tokio::sync::mpsc;

use crate::view::ViewId;

/// Why a window is being shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenReason {
    /// Shown directly by a show request
    Requested,

    /// Next entry taken from the pending queue
    Dequeued,

    /// Previous window resumed from history
    Resumed,
}

/// Why a window is being hidden
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Closed by a hide request, a close button or a background click
    Requested,

    /// Another window took the foreground
    ForegroundLost,

    /// Part of a hide-all sweep
    HideAll,

    /// The window was released by its owner
    Released,
}

/// Lifecycle notifications raised by the frame.
///
/// Opening/closing events are raised after the navigation state has been
/// updated and before the animation starts; opened/closed after it ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameEvent {
    WindowOpening {
        window: ViewId,
        previous: Option<ViewId>,
        reason: OpenReason,
    },
    WindowOpened {
        window: ViewId,
        previous: Option<ViewId>,
        reason: OpenReason,
    },
    WindowClosing {
        window: ViewId,
        next: Option<ViewId>,
        reason: CloseReason,
    },
    WindowClosed {
        window: ViewId,
        next: Option<ViewId>,
        reason: CloseReason,
    },
    CurrentWindowChanged {
        previous: Option<ViewId>,
        current: Option<ViewId>,
    },
    PanelOpening(ViewId),
    PanelOpened(ViewId),
    PanelClosing(ViewId),
    PanelClosed(ViewId),
    InputBlocked,
    InputUnblocked,
}

impl FrameEvent {
    /// The view this event is about, if any
    pub fn view(&self) -> Option<&ViewId> {
        match self {
            FrameEvent::WindowOpening { window, .. }
            | FrameEvent::WindowOpened { window, .. }
            | FrameEvent::WindowClosing { window, .. }
            | FrameEvent::WindowClosed { window, .. } => Some(window),
            FrameEvent::CurrentWindowChanged { current, .. } => current.as_ref(),
            FrameEvent::PanelOpening(id)
            | FrameEvent::PanelOpened(id)
            | FrameEvent::PanelClosing(id)
            | FrameEvent::PanelClosed(id) => Some(id),
            FrameEvent::InputBlocked | FrameEvent::InputUnblocked => None,
        }
    }
}

/// Requests flowing into the frame from views and the popup dimmer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameSignal {
    CloseRequested(ViewId),
    Destroyed(ViewId),
    BackgroundClicked,
}

/// Cloneable handle for collaborators that only raise background clicks
#[derive(Debug, Clone)]
pub struct BackgroundClickSender {
    tx: mpsc::UnboundedSender<FrameSignal>,
}

impl BackgroundClickSender {
    pub(crate) fn new(tx: mpsc::UnboundedSender<FrameSignal>) -> Self {
        Self { tx }
    }

    pub fn clicked(&self) {
        if self.tx.send(FrameSignal::BackgroundClicked).is_err() {
            log::debug!("Frame dropped before background click was delivered");
        }
    }
}
