use thiserror::Error;

use crate::view::{ViewId, ViewRole};

/// Result type for navigation operations.
pub type Result<T> = std::result::Result<T, NavError>;

/// Errors reported by the frame and its layers.
///
/// None of these are fatal: by the time one is returned it has already been
/// logged and the navigation state is exactly what it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavError {
    /// The view is not registered and no loader could provide it
    #[error("view `{0}` is not registered")]
    Unregistered(ViewId),

    /// Hide was requested on a window that is not the foreground window
    #[error("hide requested on window `{requested}` but the current window is {}", display_current(.current))]
    InvalidHideTarget {
        requested: ViewId,
        current: Option<ViewId>,
    },

    /// A window (or a view of another role) already uses this id
    #[error("view `{0}` is already registered")]
    DuplicateRegistration(ViewId),

    /// The view is neither a window nor a panel, or claims to be both
    #[error("view `{0}` must be either a window or a panel")]
    RoleMismatch(ViewId),

    /// A window operation named a panel, or the other way around
    #[error("view `{id}` is not a {expected}")]
    WrongLayer { id: ViewId, expected: ViewRole },

    /// The foreground window cannot be released; hide it first
    #[error("window `{0}` is the current window and cannot be released")]
    WindowIsCurrent(ViewId),
}

fn display_current(current: &Option<ViewId>) -> String {
    match current {
        Some(id) => format!("`{}`", id),
        None => "none".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_hide_target_message() {
        let err = NavError::InvalidHideTarget {
            requested: ViewId::new("settings"),
            current: Some(ViewId::new("inventory")),
        };
        assert_eq!(
            err.to_string(),
            "hide requested on window `settings` but the current window is `inventory`"
        );

        let err = NavError::InvalidHideTarget {
            requested: ViewId::new("settings"),
            current: None,
        };
        assert!(err.to_string().ends_with("is none"));
    }

    #[test]
    fn test_wrong_layer_message() {
        let err = NavError::WrongLayer {
            id: ViewId::new("hud"),
            expected: ViewRole::Window,
        };
        assert_eq!(err.to_string(), "view `hud` is not a window");
    }
}
