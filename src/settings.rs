//! Parameters attached to show and hide requests.

use serde_json::Value;

use crate::view::{Payload, Transition, WindowPriority};

/// Parameters of a window show request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowShowSettings {
    /// Overrides the window's own priority when set
    pub priority: Option<WindowPriority>,

    /// In-transition override for the window being shown
    pub transition: Option<Transition>,

    /// Out-transition for the window that loses the foreground
    pub out_transition: Option<Transition>,

    pub payload: Payload,
}

impl WindowShowSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_priority(mut self, priority: WindowPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transition = Some(transition);
        self
    }

    pub fn with_out_transition(mut self, transition: Transition) -> Self {
        self.out_transition = Some(transition);
        self
    }

    pub fn with_payload(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }
}

/// Parameters of a window hide request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowHideSettings {
    pub transition: Option<Transition>,
}

impl WindowHideSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transition = Some(transition);
        self
    }
}

/// Parameters of a panel show request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelShowSettings {
    pub transition: Option<Transition>,
    pub payload: Payload,
}

impl PanelShowSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transition = Some(transition);
        self
    }

    pub fn with_payload(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }
}

/// Parameters of a panel hide request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelHideSettings {
    pub transition: Option<Transition>,
}

impl PanelHideSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transition = Some(transition);
        self
    }
}
