// Integration tests for the capture session controller.
//
// Every scenario drives ticking through the manual scheduler and verifies
// resource parity through the mock provider's ledger: each acquired stream
// must see its tracks stopped exactly once, on every exit path.

mod common;

use std::sync::Arc;

use common::{MockProvider, MockRasterizer};
use mediacap::{
    CaptureConfig, CaptureError, CaptureKind, CaptureSessionController, ManualTickScheduler,
    Point, SessionState,
};

fn controller_with(
    provider: Arc<MockProvider>,
    rasterizer: MockRasterizer,
) -> (CaptureSessionController, ManualTickScheduler) {
    let scheduler = ManualTickScheduler::new();
    let controller = CaptureSessionController::new(
        provider,
        Arc::new(rasterizer),
        Arc::new(scheduler.clone()),
        CaptureConfig::default(),
    );
    (controller, scheduler)
}

// ---------------------------------------------------------------------------
// Still image
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_still_image_commit_produces_png_artifact() {
    let provider = Arc::new(MockProvider::granting());
    let (mut controller, scheduler) = controller_with(provider, MockRasterizer::new(1280, 720));

    let id = controller.start_session(CaptureKind::StillImage).await.unwrap();
    assert_eq!(
        controller.session_snapshot(id).unwrap().state,
        SessionState::Selecting
    );

    controller.begin_selection(id, Point::new(10.0, 10.0)).unwrap();
    let rect = controller.update_selection(id, Point::new(210.0, 160.0)).unwrap();
    assert_eq!(rect.width, 200.0);
    assert_eq!(rect.height, 150.0);

    let usable = controller.end_selection(id, Point::new(210.0, 160.0)).unwrap();
    assert!(usable);

    let artifact = controller.commit_selection(id).await.unwrap();
    assert_eq!(artifact.mime_type(), "image/png");
    assert_eq!(artifact.origin(), CaptureKind::StillImage);
    assert_eq!(&artifact.bytes()[..4], &[0x89, 0x50, 0x4E, 0x47]);

    let snapshot = controller.session_snapshot(id).unwrap();
    assert_eq!(snapshot.state, SessionState::Completed);
    assert!(snapshot.current_rect.is_none(), "tracker reset on release");
    assert_eq!(scheduler.active_count(), 0);
}

#[tokio::test]
async fn test_sub_threshold_commit_is_rejected_and_selection_stays_open() {
    let provider = Arc::new(MockProvider::granting());
    let (mut controller, _) = controller_with(provider, MockRasterizer::new(1280, 720));

    let id = controller.start_session(CaptureKind::StillImage).await.unwrap();
    controller.begin_selection(id, Point::new(0.0, 0.0)).unwrap();
    let usable = controller.end_selection(id, Point::new(9.0, 50.0)).unwrap();
    assert!(!usable, "9-unit width is below the 10-unit minimum");

    let result = controller.commit_selection(id).await;
    assert!(matches!(result, Err(CaptureError::InvalidRegion(_))));
    assert_eq!(
        controller.session_snapshot(id).unwrap().state,
        SessionState::Selecting
    );
}

#[tokio::test]
async fn test_out_of_bounds_commit_keeps_session_selecting_for_retry() {
    let provider = Arc::new(MockProvider::granting());
    // Snapshot smaller than the selection: crop must fail, not clamp.
    let (mut controller, _) = controller_with(provider, MockRasterizer::new(100, 100));

    let id = controller.start_session(CaptureKind::StillImage).await.unwrap();
    controller.begin_selection(id, Point::new(0.0, 0.0)).unwrap();
    controller.end_selection(id, Point::new(200.0, 150.0)).unwrap();

    let result = controller.commit_selection(id).await;
    assert!(matches!(result, Err(CaptureError::InvalidRegion(_))));
    assert_eq!(
        controller.session_snapshot(id).unwrap().state,
        SessionState::Selecting
    );

    // A corrected selection on the same session succeeds.
    controller.begin_selection(id, Point::new(0.0, 0.0)).unwrap();
    controller.end_selection(id, Point::new(50.0, 50.0)).unwrap();
    let artifact = controller.commit_selection(id).await.unwrap();
    assert!(!artifact.is_empty());
    assert_eq!(
        controller.session_snapshot(id).unwrap().state,
        SessionState::Completed
    );
}

#[tokio::test]
async fn test_selection_calls_are_invalid_for_recording_sessions() {
    let provider = Arc::new(MockProvider::granting());
    let (mut controller, _) = controller_with(provider, MockRasterizer::new(100, 100));

    let id = controller.start_session(CaptureKind::VoiceAudio).await.unwrap();
    let result = controller.begin_selection(id, Point::new(0.0, 0.0));
    assert!(matches!(result, Err(CaptureError::InvalidTransition { .. })));

    controller.cancel(id).unwrap();
}

// ---------------------------------------------------------------------------
// Recording (screen video / voice audio)
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_pause_resume_stop_excludes_paused_window() {
    let provider = Arc::new(MockProvider::granting());
    let (mut controller, scheduler) = controller_with(
        Arc::clone(&provider),
        MockRasterizer::new(100, 100),
    );

    let id = controller.start_session(CaptureKind::VoiceAudio).await.unwrap();
    scheduler.advance(3);

    controller.pause(id).unwrap();
    assert_eq!(
        controller.session_snapshot(id).unwrap().state,
        SessionState::ActivePaused
    );
    scheduler.advance(2);

    controller.resume(id).unwrap();
    scheduler.advance(2);

    let artifact = controller.stop(id).unwrap();
    let snapshot = controller.session_snapshot(id).unwrap();

    assert_eq!(snapshot.elapsed_seconds, 5, "pause window excluded");
    assert_eq!(snapshot.state, SessionState::Completed);
    // Kept sequence numbers: 0..2 from the ticks, 3 from the pause flush,
    // 7..8 after resume and 9 from the stop flush. Seqs 4..6 were drained
    // during the pause window and discarded.
    assert_eq!(artifact.bytes(), &[0, 1, 2, 3, 7, 8, 9]);
    assert!(provider.ledger.balanced());
    assert_eq!(scheduler.active_count(), 0, "no leaked tick sources");
}

#[tokio::test]
async fn test_controller_stop_is_idempotent() {
    let provider = Arc::new(MockProvider::granting());
    let (mut controller, scheduler) =
        controller_with(Arc::clone(&provider), MockRasterizer::new(100, 100));

    let id = controller.start_session(CaptureKind::ScreenVideo).await.unwrap();
    scheduler.advance(2);

    let first = controller.stop(id).unwrap();
    let second = controller.stop(id).unwrap();
    assert_eq!(first, second);
    assert!(provider.ledger.balanced());
}

#[tokio::test]
async fn test_second_session_of_same_kind_is_rejected() {
    let provider = Arc::new(MockProvider::granting());
    let (mut controller, _) =
        controller_with(Arc::clone(&provider), MockRasterizer::new(100, 100));

    let id = controller.start_session(CaptureKind::ScreenVideo).await.unwrap();

    let result = controller.start_session(CaptureKind::ScreenVideo).await;
    assert!(matches!(
        result,
        Err(CaptureError::SessionInProgress(CaptureKind::ScreenVideo))
    ));
    assert_eq!(
        provider.ledger.acquired(),
        1,
        "no second stream may be acquired"
    );

    // A different kind is its own exclusivity domain.
    let voice = controller.start_session(CaptureKind::VoiceAudio).await.unwrap();
    assert_ne!(id, voice);

    controller.shutdown();
    assert!(provider.ledger.balanced());
}

#[tokio::test]
async fn test_permission_denial_fails_the_session_holding_nothing() {
    let provider = Arc::new(MockProvider::denying());
    let (mut controller, scheduler) =
        controller_with(Arc::clone(&provider), MockRasterizer::new(100, 100));

    let result = controller.start_session(CaptureKind::ScreenVideo).await;
    assert!(matches!(result, Err(CaptureError::Permission(_))));

    let id = controller.session_of_kind(CaptureKind::ScreenVideo).unwrap();
    let snapshot = controller.session_snapshot(id).unwrap();
    assert_eq!(snapshot.state, SessionState::Failed);
    assert_eq!(snapshot.elapsed_seconds, 0);
    assert!(snapshot.error.unwrap().contains("denied"));
    assert!(matches!(
        controller.last_error(id).unwrap(),
        Some(CaptureError::Permission(_))
    ));

    assert_eq!(provider.ledger.acquired(), 0, "no stream held");
    assert_eq!(scheduler.active_count(), 0, "no timer running");

    // A failed session is terminal and does not block a retry.
    assert!(matches!(
        controller.start_session(CaptureKind::ScreenVideo).await,
        Err(CaptureError::Permission(_))
    ));
}

#[tokio::test]
async fn test_external_revocation_finalizes_with_partial_data() {
    let provider = Arc::new(MockProvider::granting());
    let (mut controller, scheduler) =
        controller_with(Arc::clone(&provider), MockRasterizer::new(100, 100));

    let id = controller.start_session(CaptureKind::ScreenVideo).await.unwrap();
    scheduler.advance(2);

    // User revokes sharing through a platform control outside the widget.
    provider.revoke_sharing();
    scheduler.advance(1);

    let state = controller.poll(id).unwrap();
    assert_eq!(state, SessionState::Completed);

    let artifact = controller.stop(id).unwrap();
    assert!(
        !artifact.is_empty(),
        "accumulated chunks survive the revocation"
    );
    assert!(provider.ledger.balanced());
    assert_eq!(scheduler.active_count(), 0);
}

#[tokio::test]
async fn test_pause_after_external_revocation_reports_stream_ended() {
    let provider = Arc::new(MockProvider::granting());
    let (mut controller, scheduler) =
        controller_with(Arc::clone(&provider), MockRasterizer::new(100, 100));

    let id = controller.start_session(CaptureKind::VoiceAudio).await.unwrap();
    scheduler.advance(1);
    provider.revoke_sharing();
    scheduler.advance(1);

    let result = controller.pause(id);
    assert!(matches!(result, Err(CaptureError::StreamEndedExternally)));
    assert_eq!(
        controller.session_snapshot(id).unwrap().state,
        SessionState::Completed,
        "the implicit stop already finalized the session"
    );
    assert!(provider.ledger.balanced());
}

#[tokio::test]
async fn test_revocation_while_paused_is_noticed_on_poll() {
    let provider = Arc::new(MockProvider::granting());
    let (mut controller, scheduler) =
        controller_with(Arc::clone(&provider), MockRasterizer::new(100, 100));

    let id = controller.start_session(CaptureKind::ScreenVideo).await.unwrap();
    scheduler.advance(1);
    controller.pause(id).unwrap();

    provider.revoke_sharing();
    scheduler.advance(1);

    assert_eq!(controller.poll(id).unwrap(), SessionState::Completed);
    assert!(provider.ledger.balanced());
    assert_eq!(scheduler.active_count(), 0);
}

#[tokio::test]
async fn test_pause_is_rejected_without_touching_the_timer() {
    let provider = Arc::new(MockProvider::granting());
    let (mut controller, scheduler) =
        controller_with(Arc::clone(&provider), MockRasterizer::new(100, 100));

    let id = controller.start_session(CaptureKind::VoiceAudio).await.unwrap();
    scheduler.advance(2);
    controller.pause(id).unwrap();

    // Pausing a paused session is caller misuse, reported not swallowed.
    let result = controller.pause(id);
    assert!(matches!(
        result,
        Err(CaptureError::InvalidTransition {
            from: "active_paused",
            requested: "pause",
        })
    ));

    controller.resume(id).unwrap();
    scheduler.advance(1);
    assert_eq!(controller.session_snapshot(id).unwrap().elapsed_seconds, 3);

    controller.cancel(id).unwrap();
}

// ---------------------------------------------------------------------------
// Cancellation and teardown
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_cancel_from_every_non_terminal_state_releases_everything() {
    let provider = Arc::new(MockProvider::granting());
    let (mut controller, scheduler) =
        controller_with(Arc::clone(&provider), MockRasterizer::new(1280, 720));

    // Selecting
    let id = controller.start_session(CaptureKind::StillImage).await.unwrap();
    controller.begin_selection(id, Point::new(0.0, 0.0)).unwrap();
    controller.update_selection(id, Point::new(80.0, 80.0)).unwrap();
    controller.cancel(id).unwrap();
    let snapshot = controller.session_snapshot(id).unwrap();
    assert_eq!(snapshot.state, SessionState::Cancelled);
    assert!(snapshot.current_rect.is_none(), "in-progress rect discarded");

    // Active
    let id = controller.start_session(CaptureKind::VoiceAudio).await.unwrap();
    scheduler.advance(2);
    controller.cancel(id).unwrap();
    assert!(provider.ledger.balanced());
    assert_eq!(scheduler.active_count(), 0);

    // ActivePaused
    let id = controller.start_session(CaptureKind::VoiceAudio).await.unwrap();
    scheduler.advance(1);
    controller.pause(id).unwrap();
    controller.cancel(id).unwrap();
    assert!(provider.ledger.balanced());
    assert_eq!(scheduler.active_count(), 0);

    // Cancelling a terminal session stays a successful no-op.
    controller.cancel(id).unwrap();
    assert!(provider.ledger.balanced());
}

#[tokio::test]
async fn test_shutdown_cancels_all_live_sessions() {
    let provider = Arc::new(MockProvider::granting());
    let (mut controller, scheduler) =
        controller_with(Arc::clone(&provider), MockRasterizer::new(1280, 720));

    let video = controller.start_session(CaptureKind::ScreenVideo).await.unwrap();
    let voice = controller.start_session(CaptureKind::VoiceAudio).await.unwrap();
    let still = controller.start_session(CaptureKind::StillImage).await.unwrap();
    scheduler.advance(2);

    controller.shutdown();

    for id in [video, voice, still] {
        assert_eq!(
            controller.session_snapshot(id).unwrap().state,
            SessionState::Cancelled
        );
    }
    assert_eq!(provider.ledger.acquired(), 2);
    assert!(provider.ledger.balanced());
    assert_eq!(scheduler.active_count(), 0);
}

#[tokio::test]
async fn test_terminal_sessions_are_evicted_when_a_new_one_starts() {
    let provider = Arc::new(MockProvider::granting());
    let (mut controller, scheduler) =
        controller_with(Arc::clone(&provider), MockRasterizer::new(100, 100));

    let first = controller.start_session(CaptureKind::VoiceAudio).await.unwrap();
    scheduler.advance(1);
    controller.stop(first).unwrap();
    assert!(controller.session_snapshot(first).is_ok());

    // Starting a new session of the same kind drops the finished one, so
    // the registry never grows across repeated captures.
    let second = controller.start_session(CaptureKind::VoiceAudio).await.unwrap();
    assert_ne!(first, second);
    assert!(matches!(
        controller.session_snapshot(first),
        Err(CaptureError::UnknownSession(_))
    ));
    assert_eq!(
        controller.session_of_kind(CaptureKind::VoiceAudio),
        Some(second)
    );

    controller.cancel(second).unwrap();
    assert!(provider.ledger.balanced());
}

#[tokio::test]
async fn test_remove_session_requires_a_terminal_state() {
    let provider = Arc::new(MockProvider::granting());
    let (mut controller, _) =
        controller_with(Arc::clone(&provider), MockRasterizer::new(100, 100));

    let id = controller.start_session(CaptureKind::ScreenVideo).await.unwrap();
    assert!(matches!(
        controller.remove_session(id),
        Err(CaptureError::InvalidTransition {
            from: "active",
            requested: "remove",
        })
    ));

    controller.cancel(id).unwrap();
    controller.remove_session(id).unwrap();
    assert!(matches!(
        controller.session_snapshot(id),
        Err(CaptureError::UnknownSession(_))
    ));
    assert!(provider.ledger.balanced());
}

#[tokio::test]
async fn test_unknown_session_ids_are_rejected() {
    let provider = Arc::new(MockProvider::granting());
    let (mut controller, _) = controller_with(provider, MockRasterizer::new(100, 100));

    let bogus = uuid::Uuid::new_v4();
    assert!(matches!(
        controller.pause(bogus),
        Err(CaptureError::UnknownSession(_))
    ));
    assert!(matches!(
        controller.session_snapshot(bogus),
        Err(CaptureError::UnknownSession(_))
    ));
}
