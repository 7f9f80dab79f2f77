//! Scripted views and collaborators shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use view_frame::{
    Dimmer, InputSurface, Panel, Payload, Transition, View, ViewId, ViewSignals, Window, WindowPriority,
};

pub fn id(name: &str) -> ViewId {
    ViewId::new(name)
}

pub fn ids(names: &[&str]) -> Vec<ViewId> {
    names.iter().map(|name| ViewId::new(*name)).collect()
}

/// Ordered record of every animation call across all mocks of a test
#[derive(Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: String) {
        self.entries.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries.lock().unwrap().iter().filter(|e| *e == entry).count()
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

/// Holds animations until opened; tracks how many reached it
#[derive(Clone)]
pub struct Gate {
    open: Arc<watch::Sender<bool>>,
    arrived: Arc<watch::Sender<usize>>,
}

impl Gate {
    pub fn new() -> Self {
        Self {
            open: Arc::new(watch::channel(false).0),
            arrived: Arc::new(watch::channel(0).0),
        }
    }

    pub fn open(&self) {
        self.open.send_replace(true);
    }

    pub async fn pass(&self) {
        self.arrived.send_modify(|count| *count += 1);
        let mut rx = self.open.subscribe();
        let _ = rx.wait_for(|open| *open).await;
    }

    /// Resolve once `count` animations are waiting at (or went through) the gate
    pub async fn arrivals(&self, count: usize) {
        let mut rx = self.arrived.subscribe();
        let _ = rx.wait_for(|arrived| *arrived >= count).await;
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Pace {
    Instant,
    Stalled,
}

/// Animation behaviour shared by the mock windows and panels
struct Script {
    id: ViewId,
    journal: Journal,
    show_gate: Option<Gate>,
    hide_gate: Option<Gate>,
    pace: Pace,
    signals: Mutex<Option<ViewSignals>>,
    payloads: Mutex<Vec<Payload>>,
    transitions: Mutex<Vec<String>>,
    destroyed: AtomicUsize,
}

impl Script {
    fn new(id: &str, journal: &Journal) -> Self {
        Self {
            id: ViewId::new(id),
            journal: journal.clone(),
            show_gate: None,
            hide_gate: None,
            pace: Pace::Instant,
            signals: Mutex::new(None),
            payloads: Mutex::new(Vec::new()),
            transitions: Mutex::new(Vec::new()),
            destroyed: AtomicUsize::new(0),
        }
    }

    async fn show(&self, transition: Option<&Transition>, payload: &Payload) {
        self.journal.record(format!("show {}", self.id));
        self.payloads.lock().unwrap().push(payload.clone());
        if let Some(transition) = transition {
            self.transitions.lock().unwrap().push(transition.name.clone());
        }
        self.wait(self.show_gate.as_ref()).await;
    }

    async fn hide(&self, transition: Option<&Transition>) {
        self.journal.record(format!("hide {}", self.id));
        if let Some(transition) = transition {
            self.transitions.lock().unwrap().push(transition.name.clone());
        }
        self.wait(self.hide_gate.as_ref()).await;
    }

    async fn wait(&self, gate: Option<&Gate>) {
        if let Some(gate) = gate {
            gate.pass().await;
        }
        if self.pace == Pace::Stalled {
            std::future::pending::<()>().await;
        }
    }

    fn attach(&self, signals: ViewSignals) {
        *self.signals.lock().unwrap() = Some(signals);
    }

    fn destroy(&self) {
        self.journal.record(format!("destroy {}", self.id));
        self.destroyed.fetch_add(1, Ordering::SeqCst);
    }

    fn signals(&self) -> ViewSignals {
        self.signals
            .lock()
            .unwrap()
            .clone()
            .expect("view was never attached to a frame")
    }
}

pub struct MockWindow {
    script: Script,
    popup: bool,
    priority: WindowPriority,
    hide_on_foreground_lost: bool,
    close_on_background_click: bool,
}

impl MockWindow {
    pub fn new(id: &str, journal: &Journal) -> Self {
        Self {
            script: Script::new(id, journal),
            popup: false,
            priority: WindowPriority::ForceForeground,
            hide_on_foreground_lost: true,
            close_on_background_click: true,
        }
    }

    pub fn popup(mut self) -> Self {
        self.popup = true;
        self
    }

    pub fn normal_priority(mut self) -> Self {
        self.priority = WindowPriority::Normal;
        self
    }

    pub fn stay_visible(mut self) -> Self {
        self.hide_on_foreground_lost = false;
        self
    }

    pub fn ignore_background_click(mut self) -> Self {
        self.close_on_background_click = false;
        self
    }

    pub fn gate_show(mut self, gate: &Gate) -> Self {
        self.script.show_gate = Some(gate.clone());
        self
    }

    pub fn gate_hide(mut self, gate: &Gate) -> Self {
        self.script.hide_gate = Some(gate.clone());
        self
    }

    /// Animations never complete on their own
    pub fn stalled(mut self) -> Self {
        self.script.pace = Pace::Stalled;
        self
    }

    pub fn build(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn signals(&self) -> ViewSignals {
        self.script.signals()
    }

    pub fn payloads(&self) -> Vec<Payload> {
        self.script.payloads.lock().unwrap().clone()
    }

    pub fn transitions(&self) -> Vec<String> {
        self.script.transitions.lock().unwrap().clone()
    }

    pub fn destroyed(&self) -> usize {
        self.script.destroyed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl View for MockWindow {
    fn id(&self) -> ViewId {
        self.script.id.clone()
    }

    async fn show(&self, transition: Option<&Transition>, payload: &Payload) {
        self.script.show(transition, payload).await;
    }

    async fn hide(&self, transition: Option<&Transition>) {
        self.script.hide(transition).await;
    }

    fn attach(&self, signals: ViewSignals) {
        self.script.attach(signals);
    }

    fn destroy(&self) {
        self.script.destroy();
    }

    fn as_window(self: Arc<Self>) -> Option<Arc<dyn Window>> {
        Some(self)
    }
}

impl Window for MockWindow {
    fn is_popup(&self) -> bool {
        self.popup
    }

    fn priority(&self) -> WindowPriority {
        self.priority
    }

    fn hide_on_foreground_lost(&self) -> bool {
        self.hide_on_foreground_lost
    }

    fn close_on_background_click(&self) -> bool {
        self.close_on_background_click
    }
}

pub struct MockPanel {
    script: Script,
}

impl MockPanel {
    pub fn new(id: &str, journal: &Journal) -> Self {
        Self {
            script: Script::new(id, journal),
        }
    }

    pub fn gate_show(mut self, gate: &Gate) -> Self {
        self.script.show_gate = Some(gate.clone());
        self
    }

    pub fn build(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn signals(&self) -> ViewSignals {
        self.script.signals()
    }

    pub fn destroyed(&self) -> usize {
        self.script.destroyed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl View for MockPanel {
    fn id(&self) -> ViewId {
        self.script.id.clone()
    }

    async fn show(&self, transition: Option<&Transition>, payload: &Payload) {
        self.script.show(transition, payload).await;
    }

    async fn hide(&self, transition: Option<&Transition>) {
        self.script.hide(transition).await;
    }

    fn attach(&self, signals: ViewSignals) {
        self.script.attach(signals);
    }

    fn destroy(&self) {
        self.script.destroy();
    }

    fn as_panel(self: Arc<Self>) -> Option<Arc<dyn Panel>> {
        Some(self)
    }
}

impl Panel for MockPanel {}

/// Claims both roles, which the frame must refuse
pub struct AmbiguousView;

#[async_trait]
impl View for AmbiguousView {
    fn id(&self) -> ViewId {
        ViewId::new("ambiguous")
    }

    async fn show(&self, _transition: Option<&Transition>, _payload: &Payload) {}

    async fn hide(&self, _transition: Option<&Transition>) {}

    fn as_window(self: Arc<Self>) -> Option<Arc<dyn Window>> {
        Some(self)
    }

    fn as_panel(self: Arc<Self>) -> Option<Arc<dyn Panel>> {
        Some(self)
    }
}

impl Window for AmbiguousView {}

impl Panel for AmbiguousView {}

/// Plays no role at all
pub struct DetachedView;

#[async_trait]
impl View for DetachedView {
    fn id(&self) -> ViewId {
        ViewId::new("detached")
    }

    async fn show(&self, _transition: Option<&Transition>, _payload: &Payload) {}

    async fn hide(&self, _transition: Option<&Transition>) {}
}

#[derive(Default)]
pub struct RecordingSurface {
    pub calls: Mutex<Vec<bool>>,
}

impl InputSurface for RecordingSurface {
    fn set_input_blocked(&self, blocked: bool) {
        self.calls.lock().unwrap().push(blocked);
    }
}

#[derive(Default)]
pub struct RecordingDimmer {
    pub calls: Mutex<Vec<bool>>,
}

impl Dimmer for RecordingDimmer {
    fn set_visible(&self, visible: bool) {
        self.calls.lock().unwrap().push(visible);
    }
}
