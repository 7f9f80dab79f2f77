//! Console-backed views for the demo binary.
//!
//! Animations are plain sleeps; every lifecycle step is printed so the
//! navigation order can be followed in the terminal.

use async_trait::async_trait;
use colored::*;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use view_frame::{
    Dimmer, FrameEvent, InputSurface, Panel, Payload, Transition, View, ViewId, ViewSignals, Window,
    WindowPriority,
};

fn describe(transition: Option<&Transition>) -> String {
    transition
        .map(|transition| format!(" ({})", transition.name))
        .unwrap_or_default()
}

fn animation_time(transition: Option<&Transition>, fallback: Duration) -> Duration {
    transition.and_then(|transition| transition.duration).unwrap_or(fallback)
}

pub struct ConsoleWindow {
    id: ViewId,
    animation: Duration,
    popup: bool,
    priority: WindowPriority,
    hide_on_foreground_lost: bool,
    signals: Mutex<Option<ViewSignals>>,
}

impl ConsoleWindow {
    pub fn new(id: &str, animation: Duration) -> Self {
        Self {
            id: ViewId::new(id),
            animation,
            popup: false,
            priority: WindowPriority::ForceForeground,
            hide_on_foreground_lost: true,
            signals: Mutex::new(None),
        }
    }

    pub fn popup(mut self) -> Self {
        self.popup = true;
        self
    }

    /// Wait in the queue instead of taking the foreground
    pub fn queued(mut self) -> Self {
        self.priority = WindowPriority::Normal;
        self
    }

    pub fn stay_visible(mut self) -> Self {
        self.hide_on_foreground_lost = false;
        self
    }

    /// Simulate the window's own close button
    pub fn press_close(&self) {
        if let Ok(signals) = self.signals.lock() {
            if let Some(signals) = signals.as_ref() {
                println!("    {} close button of {}", "🖱".bright_white(), self.id);
                signals.request_close();
            }
        }
    }
}

#[async_trait]
impl View for ConsoleWindow {
    fn id(&self) -> ViewId {
        self.id.clone()
    }

    async fn show(&self, transition: Option<&Transition>, payload: &Payload) {
        let data = if payload.is_empty() {
            String::new()
        } else {
            format!(" {}", serde_json::Value::Object(payload.clone()))
        };
        println!("    {} {}{}{}", "▶".bright_green(), self.id, describe(transition), data.dimmed());
        tokio::time::sleep(animation_time(transition, self.animation)).await;
    }

    async fn hide(&self, transition: Option<&Transition>) {
        println!("    {} {}{}", "◀".bright_red(), self.id, describe(transition));
        tokio::time::sleep(animation_time(transition, self.animation)).await;
    }

    fn attach(&self, signals: ViewSignals) {
        if let Ok(mut slot) = self.signals.lock() {
            *slot = Some(signals);
        }
    }

    fn destroy(&self) {
        println!("    {} {} destroyed", "✗".bright_red(), self.id);
    }

    fn as_window(self: Arc<Self>) -> Option<Arc<dyn Window>> {
        Some(self)
    }
}

impl Window for ConsoleWindow {
    fn is_popup(&self) -> bool {
        self.popup
    }

    fn priority(&self) -> WindowPriority {
        self.priority
    }

    fn hide_on_foreground_lost(&self) -> bool {
        self.hide_on_foreground_lost
    }
}

pub struct ConsolePanel {
    id: ViewId,
    animation: Duration,
}

impl ConsolePanel {
    pub fn new(id: &str, animation: Duration) -> Self {
        Self {
            id: ViewId::new(id),
            animation,
        }
    }
}

#[async_trait]
impl View for ConsolePanel {
    fn id(&self) -> ViewId {
        self.id.clone()
    }

    async fn show(&self, transition: Option<&Transition>, _payload: &Payload) {
        println!("    {} panel {}{}", "▶".bright_cyan(), self.id, describe(transition));
        tokio::time::sleep(animation_time(transition, self.animation)).await;
    }

    async fn hide(&self, transition: Option<&Transition>) {
        println!("    {} panel {}{}", "◀".bright_cyan(), self.id, describe(transition));
        tokio::time::sleep(animation_time(transition, self.animation)).await;
    }

    fn destroy(&self) {
        println!("    {} panel {} destroyed", "✗".bright_red(), self.id);
    }

    fn as_panel(self: Arc<Self>) -> Option<Arc<dyn Panel>> {
        Some(self)
    }
}

impl Panel for ConsolePanel {}

pub struct ConsoleDimmer;

impl Dimmer for ConsoleDimmer {
    fn set_visible(&self, visible: bool) {
        let state = if visible { "on" } else { "off" };
        println!("    {} background {}", "▒".bright_black(), state);
    }
}

/// Stands in for the pointer raycaster; input state goes to the log only
pub struct LoggingSurface;

impl InputSurface for LoggingSurface {
    fn set_input_blocked(&self, blocked: bool) {
        log::debug!("Input surface {}", if blocked { "disabled" } else { "enabled" });
    }
}

fn print_event(event: &FrameEvent) {
    match event {
        FrameEvent::WindowOpened { window, reason, .. } => {
            println!("  {} {} opened ({:?})", "●".bright_green().bold(), window.as_str().bright_green(), reason);
        }
        FrameEvent::WindowClosed { window, reason, .. } => {
            println!("  {} {} closed ({:?})", "○".bright_red().bold(), window.as_str().bright_red(), reason);
        }
        FrameEvent::CurrentWindowChanged { current, .. } => {
            let current = current.as_ref().map(ViewId::as_str).unwrap_or("none");
            println!("  {} foreground: {}", "→".bright_yellow().bold(), current.bright_yellow());
        }
        FrameEvent::PanelOpened(id) => println!("  {} panel {} opened", "●".bright_cyan().bold(), id),
        FrameEvent::PanelClosed(id) => println!("  {} panel {} closed", "○".bright_cyan().bold(), id),
        _ => log::trace!("Unprinted frame event {:?}", event),
    }
}

/// Print frame events until the bus closes or the task is aborted
pub fn spawn_event_printer(mut events: broadcast::Receiver<FrameEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => print_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    println!("  {} {} events skipped", "⚠️".bright_yellow(), skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
