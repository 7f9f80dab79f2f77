//! Shared dimmed background behind popup windows.

use log::debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// The visual that dims everything below the popup layer
pub trait Dimmer: Send + Sync {
    fn set_visible(&self, visible: bool);
}

/// Owns the dimmer and its visibility.
///
/// Show and hide are idempotent: the dimmer is only touched when the
/// visibility actually changes.
pub struct PopupOverlay {
    visible: AtomicBool,
    dimmer: Option<Arc<dyn Dimmer>>,
}

impl PopupOverlay {
    pub fn new(dimmer: Option<Arc<dyn Dimmer>>) -> Self {
        Self {
            visible: AtomicBool::new(false),
            dimmer,
        }
    }

    pub fn show_background(&self) {
        if !self.visible.swap(true, Ordering::SeqCst) {
            debug!("Showing popup background");
            self.apply(true);
        }
    }

    pub fn hide_background(&self) {
        if self.visible.swap(false, Ordering::SeqCst) {
            debug!("Hiding popup background");
            self.apply(false);
        }
    }

    /// Recompute visibility from whether a popup currently owns the foreground
    pub fn refresh_background(&self, popup_in_foreground: bool) {
        if popup_in_foreground {
            self.show_background();
        } else {
            self.hide_background();
        }
    }

    pub fn is_background_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    /// Whether a click on the background should be acted upon
    pub fn accepts_click(&self) -> bool {
        let visible = self.is_background_visible();
        if !visible {
            debug!("Ignoring background click, popup background is hidden");
        }
        visible
    }

    fn apply(&self, visible: bool) {
        if let Some(dimmer) = &self.dimmer {
            dimmer.set_visible(visible);
        }
    }
}
