use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::*;
use log::info;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use view_frame::{
    FactoryLoader, FrameConfig, PanelShowSettings, Transition, UiFrame, View, ViewId, WindowHideSettings,
    WindowShowSettings,
};

use crate::demo::{ConsoleDimmer, ConsolePanel, ConsoleWindow, LoggingSurface, spawn_event_printer};

#[derive(Args)]
pub struct DemoCommands {
    /// Scenario to run
    #[arg(short, long, value_enum, default_value_t = Scenario::All)]
    pub scenario: Scenario,

    /// Per-transition timeout, overrides the config file
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Length of every show/hide animation
    #[arg(long, default_value_t = 120)]
    pub animation_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Forward navigation and resuming from history
    Navigation,
    /// Normal-priority windows waiting behind the foreground
    Queue,
    /// Popup background and close signals
    Popup,
    /// Reference-counted panels
    Panels,
    All,
}

struct Views {
    windows: HashMap<&'static str, Arc<ConsoleWindow>>,
}

impl Views {
    fn window(&self, id: &str) -> Result<Arc<ConsoleWindow>> {
        self.windows
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Demo window '{}' does not exist", id))
    }
}

pub async fn demo_command(args: DemoCommands, mut config: FrameConfig) -> Result<()> {
    if let Some(timeout_ms) = args.timeout_ms {
        config.transition_timeout_ms = Some(timeout_ms);
    }

    let animation = Duration::from_millis(args.animation_ms);
    let loader = FactoryLoader::new().with_factory("settings", move || {
        Arc::new(ConsoleWindow::new("settings", animation)) as Arc<dyn View>
    });

    let frame = UiFrame::builder()
        .config(config)
        .input_surface(Arc::new(LoggingSurface))
        .dimmer(Arc::new(ConsoleDimmer))
        .loader(loader)
        .build();
    let printer = spawn_event_printer(frame.subscribe());

    let views = register_views(&frame, animation)?;
    info!("Running demo scenario {:?}", args.scenario);

    let scenarios = match args.scenario {
        Scenario::All => vec![Scenario::Navigation, Scenario::Queue, Scenario::Popup, Scenario::Panels],
        single => vec![single],
    };

    for scenario in scenarios {
        println!();
        println!("{}", format!("== {:?} ==", scenario).bright_white().bold());
        match scenario {
            Scenario::Navigation => navigation(&frame).await?,
            Scenario::Queue => queue(&frame).await?,
            Scenario::Popup => popup(&frame, &views).await?,
            Scenario::Panels => panels(&frame, animation).await?,
            Scenario::All => {}
        }
        frame.hide_all().await;
    }

    // Let the printer drain what is already on the bus
    tokio::time::sleep(Duration::from_millis(20)).await;
    printer.abort();

    println!();
    println!("{} Demo finished", "✓".bright_green().bold());
    Ok(())
}

fn register_views(frame: &UiFrame, animation: Duration) -> Result<Views> {
    let windows: Vec<(&'static str, ConsoleWindow)> = vec![
        ("main_menu", ConsoleWindow::new("main_menu", animation)),
        ("inventory", ConsoleWindow::new("inventory", animation)),
        ("map", ConsoleWindow::new("map", animation)),
        ("reward", ConsoleWindow::new("reward", animation).queued()),
        ("achievement", ConsoleWindow::new("achievement", animation).queued()),
        ("hud_menu", ConsoleWindow::new("hud_menu", animation).stay_visible()),
        ("confirm", ConsoleWindow::new("confirm", animation).popup()),
    ];

    let mut registered = HashMap::new();
    for (name, window) in windows {
        let window = Arc::new(window);
        frame.register_view(window.clone())?;
        registered.insert(name, window);
    }

    Ok(Views { windows: registered })
}

fn print_stack(frame: &UiFrame) {
    let join = |ids: Vec<ViewId>| {
        ids.iter()
            .map(ViewId::as_str)
            .collect::<Vec<_>>()
            .join(" > ")
    };
    println!("  history: [{}]  queue: [{}]", join(frame.history()), join(frame.queue()));
}

async fn navigation(frame: &UiFrame) -> Result<()> {
    frame.show_window(&ViewId::new("main_menu"), WindowShowSettings::new()).await?;
    frame
        .show_window(
            &ViewId::new("inventory"),
            WindowShowSettings::new()
                .with_transition(Transition::named("slide-left"))
                .with_payload("tab", "weapons"),
        )
        .await?;
    frame.show_window(&ViewId::new("settings"), WindowShowSettings::new()).await?;
    print_stack(frame);

    frame
        .hide_window(
            &ViewId::new("settings"),
            WindowHideSettings::new().with_transition(Transition::named("fade")),
        )
        .await?;
    frame.close_current_window().await?;
    print_stack(frame);
    Ok(())
}

async fn queue(frame: &UiFrame) -> Result<()> {
    frame.show_window(&ViewId::new("main_menu"), WindowShowSettings::new()).await?;
    for id in ["reward", "achievement"] {
        let outcome = frame.show_window(&ViewId::new(id), WindowShowSettings::new()).await?;
        println!("  {} {:?}", id, outcome);
    }
    print_stack(frame);

    while frame.current_window().is_some() {
        frame.close_current_window().await?;
        print_stack(frame);
    }
    Ok(())
}

async fn popup(frame: &UiFrame, views: &Views) -> Result<()> {
    frame.show_window(&ViewId::new("hud_menu"), WindowShowSettings::new()).await?;
    frame.show_window(&ViewId::new("map"), WindowShowSettings::new()).await?;
    frame.show_window(&ViewId::new("confirm"), WindowShowSettings::new()).await?;
    println!("  background visible: {}", frame.is_background_visible());

    frame.background_click_sender().clicked();
    frame.process_pending_signals().await;
    println!("  background visible: {}", frame.is_background_visible());

    views.window("map")?.press_close();
    frame.process_pending_signals().await;
    print_stack(frame);
    Ok(())
}

async fn panels(frame: &UiFrame, animation: Duration) -> Result<()> {
    let hud = Arc::new(ConsolePanel::new("hud", animation));
    let id = ViewId::new("hud");

    // Two independent owners of the same panel
    frame.register_view(hud.clone())?;
    frame.register_view(hud)?;
    frame
        .show_panel(&id, PanelShowSettings::new().with_transition(Transition::named("pop")))
        .await?;
    println!("  references: {}", frame.panel_ref_count(&id));

    frame.release_view(&id).await?;
    println!(
        "  references: {}, visible: {}",
        frame.panel_ref_count(&id),
        frame.is_panel_visible(&id)
    );

    frame.release_view(&id).await?;
    println!("  registered: {}", frame.is_view_registered(&id));
    Ok(())
}
