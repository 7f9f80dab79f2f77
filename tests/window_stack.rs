//! Window stack behaviour driven through the frame: foreground switching,
//! history resume, the pending queue and popups.

mod common;

use common::{Gate, Journal, MockWindow, RecordingDimmer, id, ids};
use std::sync::Arc;
use view_frame::{
    FrameConfig, NavError, ShowOutcome, Transition, UiFrame, WindowHideSettings, WindowPriority, WindowShowSettings,
    WindowState,
};

fn frame() -> Arc<UiFrame> {
    UiFrame::new(FrameConfig::default())
}

async fn show(frame: &UiFrame, name: &str) -> ShowOutcome {
    frame.show_window(&id(name), WindowShowSettings::new()).await.unwrap()
}

async fn hide(frame: &UiFrame, name: &str) {
    frame.hide_window(&id(name), WindowHideSettings::new()).await.unwrap()
}

/// Number of windows fully on screen
fn visible_count(frame: &UiFrame, names: &[&str]) -> usize {
    names
        .iter()
        .filter(|name| frame.window_state(&id(name)) == Some(WindowState::Visible))
        .count()
}

#[tokio::test]
async fn test_hidden_history_window_is_shown_again() {
    let journal = Journal::new();
    let frame = frame();
    frame.register_view(MockWindow::new("a", &journal).normal_priority().build()).unwrap();
    frame.register_view(MockWindow::new("b", &journal).build()).unwrap();

    assert_eq!(show(&frame, "a").await, ShowOutcome::Shown);
    assert_eq!(frame.window_state(&id("a")), Some(WindowState::Visible));
    assert_eq!(frame.history(), ids(&["a"]));

    assert_eq!(show(&frame, "b").await, ShowOutcome::Shown);
    assert_eq!(frame.history(), ids(&["a", "b"]));
    assert_eq!(frame.current_window(), Some(id("b")));

    frame.wait_until_idle().await;
    assert_eq!(frame.window_state(&id("a")), Some(WindowState::Hidden));
    assert_eq!(frame.window_state(&id("b")), Some(WindowState::Visible));

    hide(&frame, "b").await;
    assert_eq!(frame.history(), ids(&["a"]));
    assert_eq!(frame.current_window(), Some(id("a")));
    assert_eq!(frame.window_state(&id("a")), Some(WindowState::Visible));
    assert_eq!(frame.window_state(&id("b")), Some(WindowState::Hidden));

    assert_eq!(journal.entries(), vec!["show a", "hide a", "show b", "hide b", "show a"]);
}

#[tokio::test]
async fn test_single_window_visible_when_settled() {
    let journal = Journal::new();
    let frame = frame();
    let names = ["a", "b", "c"];
    for name in names {
        frame.register_view(MockWindow::new(name, &journal).build()).unwrap();
    }

    for step in ["a", "b", "c", "a"] {
        show(&frame, step).await;
        frame.wait_until_idle().await;
        assert_eq!(visible_count(&frame, &names), 1);
    }

    while let Some(current) = frame.current_window() {
        hide(&frame, current.as_str()).await;
        frame.wait_until_idle().await;
        let expected = usize::from(frame.current_window().is_some());
        assert_eq!(visible_count(&frame, &names), expected);
    }
    assert!(frame.history().is_empty());
}

#[tokio::test]
async fn test_queue_is_fifo_across_unrelated_windows() {
    let journal = Journal::new();
    let frame = frame();
    frame.register_view(MockWindow::new("a", &journal).build()).unwrap();
    frame.register_view(MockWindow::new("x", &journal).build()).unwrap();
    for name in ["q1", "q2", "q3"] {
        frame.register_view(MockWindow::new(name, &journal).normal_priority().build()).unwrap();
    }

    show(&frame, "a").await;
    assert_eq!(show(&frame, "q1").await, ShowOutcome::Queued { position: 1 });
    assert_eq!(show(&frame, "q2").await, ShowOutcome::Queued { position: 2 });
    assert_eq!(show(&frame, "q3").await, ShowOutcome::Queued { position: 3 });
    assert_eq!(frame.queue(), ids(&["q1", "q2", "q3"]));
    assert_eq!(journal.count("show q1"), 0);

    hide(&frame, "a").await;
    assert_eq!(frame.current_window(), Some(id("q1")));
    assert_eq!(frame.history(), ids(&["q1"]));

    // A forced window in between does not reorder the queue
    show(&frame, "x").await;
    assert_eq!(frame.history(), ids(&["q1", "x"]));
    hide(&frame, "x").await;
    assert_eq!(frame.history(), ids(&["q1", "q2"]));

    hide(&frame, "q2").await;
    assert_eq!(frame.history(), ids(&["q1", "q3"]));
    assert!(frame.queue().is_empty());

    hide(&frame, "q3").await;
    assert_eq!(frame.current_window(), Some(id("q1")));

    let shown: Vec<String> = journal
        .entries()
        .into_iter()
        .filter(|entry| entry.starts_with("show q"))
        .collect();
    assert_eq!(shown, vec!["show q1", "show q2", "show q3", "show q1"]);
}

#[tokio::test]
async fn test_normal_priority_shows_immediately_when_idle() {
    let journal = Journal::new();
    let frame = frame();
    frame.register_view(MockWindow::new("a", &journal).normal_priority().build()).unwrap();

    assert_eq!(show(&frame, "a").await, ShowOutcome::Shown);
    assert!(frame.queue().is_empty());
}

#[tokio::test]
async fn test_priority_override_from_settings() {
    let journal = Journal::new();
    let frame = frame();
    frame.register_view(MockWindow::new("a", &journal).build()).unwrap();
    frame.register_view(MockWindow::new("b", &journal).build()).unwrap();

    show(&frame, "a").await;
    let outcome = frame
        .show_window(&id("b"), WindowShowSettings::new().with_priority(WindowPriority::Normal))
        .await
        .unwrap();

    assert_eq!(outcome, ShowOutcome::Queued { position: 1 });
    assert_eq!(frame.current_window(), Some(id("a")));
}

#[tokio::test]
async fn test_hide_of_non_current_window_is_rejected() {
    let journal = Journal::new();
    let frame = frame();
    frame.register_view(MockWindow::new("a", &journal).build()).unwrap();
    frame.register_view(MockWindow::new("b", &journal).build()).unwrap();
    show(&frame, "a").await;
    show(&frame, "b").await;
    frame.wait_until_idle().await;

    let err = frame
        .hide_window(&id("a"), WindowHideSettings::new())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        NavError::InvalidHideTarget {
            requested: id("a"),
            current: Some(id("b")),
        }
    );
    assert_eq!(frame.history(), ids(&["a", "b"]));
    assert_eq!(frame.window_state(&id("b")), Some(WindowState::Visible));
    assert_eq!(journal.count("hide b"), 0);
}

#[tokio::test]
async fn test_unregistered_window_requests_fail() {
    let frame = frame();

    let err = frame
        .show_window(&id("ghost"), WindowShowSettings::new())
        .await
        .unwrap_err();
    assert_eq!(err, NavError::Unregistered(id("ghost")));

    let err = frame
        .hide_window(&id("ghost"), WindowHideSettings::new())
        .await
        .unwrap_err();
    assert_eq!(err, NavError::Unregistered(id("ghost")));
    assert!(frame.history().is_empty());
}

#[tokio::test]
async fn test_opening_current_window_again_is_ignored() {
    let journal = Journal::new();
    let frame = frame();
    frame.register_view(MockWindow::new("a", &journal).build()).unwrap();

    show(&frame, "a").await;
    assert_eq!(show(&frame, "a").await, ShowOutcome::AlreadyCurrent);

    assert_eq!(frame.history(), ids(&["a"]));
    assert_eq!(journal.count("show a"), 1);
}

#[tokio::test]
async fn test_requeued_current_window_hides_before_showing_again() {
    let journal = Journal::new();
    let frame = frame();
    frame.register_view(MockWindow::new("a", &journal).normal_priority().build()).unwrap();

    show(&frame, "a").await;
    assert_eq!(show(&frame, "a").await, ShowOutcome::Queued { position: 1 });

    hide(&frame, "a").await;

    assert_eq!(journal.entries(), vec!["show a", "hide a", "show a"]);
    assert_eq!(frame.current_window(), Some(id("a")));
    assert_eq!(frame.window_state(&id("a")), Some(WindowState::Visible));
    assert!(!frame.is_input_blocked());
}

#[tokio::test]
async fn test_window_kept_on_screen_is_not_animated_again() {
    let journal = Journal::new();
    let frame = frame();
    frame.register_view(MockWindow::new("a", &journal).stay_visible().build()).unwrap();
    frame.register_view(MockWindow::new("b", &journal).build()).unwrap();

    show(&frame, "a").await;
    show(&frame, "b").await;
    frame.wait_until_idle().await;
    assert_eq!(frame.window_state(&id("a")), Some(WindowState::Visible));

    hide(&frame, "b").await;
    assert_eq!(frame.current_window(), Some(id("a")));
    assert_eq!(journal.count("show a"), 1);
    assert_eq!(journal.count("hide a"), 0);
}

#[tokio::test]
async fn test_popup_keeps_window_below_and_drives_background() {
    let journal = Journal::new();
    let dimmer = Arc::new(RecordingDimmer::default());
    let frame = UiFrame::builder().dimmer(dimmer.clone()).build();
    frame.register_view(MockWindow::new("a", &journal).build()).unwrap();
    frame.register_view(MockWindow::new("p", &journal).popup().build()).unwrap();

    show(&frame, "a").await;
    assert!(!frame.is_background_visible());

    show(&frame, "p").await;
    frame.wait_until_idle().await;
    assert!(frame.is_background_visible());
    assert_eq!(frame.window_state(&id("a")), Some(WindowState::Visible));
    assert_eq!(frame.history(), ids(&["a", "p"]));

    hide(&frame, "p").await;
    assert!(!frame.is_background_visible());
    assert_eq!(frame.current_window(), Some(id("a")));
    assert_eq!(journal.count("show a"), 1);
    assert_eq!(*dimmer.calls.lock().unwrap(), vec![true, false]);
}

#[tokio::test]
async fn test_window_over_popup_drops_background_until_popup_returns() {
    let journal = Journal::new();
    let dimmer = Arc::new(RecordingDimmer::default());
    let frame = UiFrame::builder().dimmer(dimmer.clone()).build();
    frame.register_view(MockWindow::new("p", &journal).popup().build()).unwrap();
    frame.register_view(MockWindow::new("b", &journal).build()).unwrap();

    show(&frame, "p").await;
    show(&frame, "b").await;
    frame.wait_until_idle().await;
    assert!(!frame.is_background_visible());
    assert_eq!(frame.window_state(&id("p")), Some(WindowState::Hidden));

    hide(&frame, "b").await;
    frame.wait_until_idle().await;
    assert_eq!(frame.current_window(), Some(id("p")));
    assert!(frame.is_background_visible());
    assert_eq!(*dimmer.calls.lock().unwrap(), vec![true, false, true]);
}

#[tokio::test]
async fn test_stacked_popups_keep_background() {
    let journal = Journal::new();
    let frame = frame();
    frame.register_view(MockWindow::new("p1", &journal).popup().build()).unwrap();
    frame.register_view(MockWindow::new("p2", &journal).popup().build()).unwrap();

    show(&frame, "p1").await;
    show(&frame, "p2").await;
    hide(&frame, "p2").await;

    assert!(frame.is_background_visible());
    assert_eq!(frame.current_window(), Some(id("p1")));

    hide(&frame, "p1").await;
    assert!(!frame.is_background_visible());
}

#[tokio::test]
async fn test_background_click_closes_popup_once() {
    let journal = Journal::new();
    let frame = frame();
    frame.register_view(MockWindow::new("a", &journal).build()).unwrap();
    frame.register_view(MockWindow::new("p", &journal).popup().build()).unwrap();

    show(&frame, "a").await;
    show(&frame, "p").await;

    assert!(frame.background_clicked().await.unwrap());
    assert_eq!(journal.count("hide p"), 1);
    assert_eq!(frame.current_window(), Some(id("a")));

    // Background is gone, further clicks do nothing
    assert!(!frame.background_clicked().await.unwrap());
    assert_eq!(frame.current_window(), Some(id("a")));
}

#[tokio::test]
async fn test_background_click_ignored_when_popup_opts_out() {
    let journal = Journal::new();
    let frame = frame();
    frame
        .register_view(MockWindow::new("p", &journal).popup().ignore_background_click().build())
        .unwrap();

    show(&frame, "p").await;

    assert!(!frame.background_clicked().await.unwrap());
    assert_eq!(frame.current_window(), Some(id("p")));
    assert_eq!(journal.count("hide p"), 0);
}

#[tokio::test]
async fn test_background_click_through_signal_queue() {
    let journal = Journal::new();
    let frame = frame();
    frame.register_view(MockWindow::new("p", &journal).popup().build()).unwrap();
    show(&frame, "p").await;

    frame.background_click_sender().clicked();
    assert_eq!(frame.process_pending_signals().await, 1);

    assert!(frame.current_window().is_none());
    assert!(!frame.is_background_visible());
}

#[tokio::test]
async fn test_transitions_and_payload_reach_views() {
    let journal = Journal::new();
    let frame = frame();
    let a = MockWindow::new("a", &journal).build();
    let b = MockWindow::new("b", &journal).build();
    frame.register_view(a.clone()).unwrap();
    frame.register_view(b.clone()).unwrap();

    show(&frame, "a").await;
    frame
        .show_window(
            &id("b"),
            WindowShowSettings::new()
                .with_transition(Transition::named("slide"))
                .with_out_transition(Transition::named("fade"))
                .with_payload("tab", "weapons"),
        )
        .await
        .unwrap();
    frame.wait_until_idle().await;

    assert_eq!(b.transitions(), vec!["slide"]);
    assert_eq!(a.transitions(), vec!["fade"]);
    assert_eq!(b.payloads()[0]["tab"], "weapons");

    frame
        .hide_window(&id("b"), WindowHideSettings::new().with_transition(Transition::named("shrink")))
        .await
        .unwrap();
    assert_eq!(b.transitions(), vec!["slide", "shrink"]);
}

#[tokio::test]
async fn test_state_is_updated_before_animation_finishes() {
    let journal = Journal::new();
    let gate = Gate::new();
    let frame = frame();
    frame.register_view(MockWindow::new("a", &journal).build()).unwrap();
    frame.register_view(MockWindow::new("b", &journal).gate_show(&gate).build()).unwrap();
    show(&frame, "a").await;

    let pending = {
        let frame = Arc::clone(&frame);
        tokio::spawn(async move { frame.show_window(&id("b"), WindowShowSettings::new()).await })
    };
    gate.arrivals(1).await;

    assert_eq!(frame.current_window(), Some(id("b")));
    assert_eq!(frame.history(), ids(&["a", "b"]));
    assert_eq!(frame.window_state(&id("b")), Some(WindowState::Showing));
    assert!(frame.is_input_blocked());
    assert!(frame.transitioning().contains(&id("b")));

    gate.open();
    assert_eq!(pending.await.unwrap().unwrap(), ShowOutcome::Shown);
    frame.wait_until_idle().await;

    assert_eq!(frame.window_state(&id("b")), Some(WindowState::Visible));
    assert!(!frame.is_input_blocked());
    assert!(frame.transitioning().is_empty());
}

#[tokio::test]
async fn test_close_current_window_without_any_window() {
    let frame = frame();
    frame.close_current_window().await.unwrap();
    assert!(frame.current_window().is_none());
}
