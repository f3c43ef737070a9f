mod common;

use std::sync::atomic::Ordering;

use serde_json::json;

use quizify::{
    QuizError,
    quiz::{BuilderController, QuizController},
    types::Track,
};

use common::Harness;

#[tokio::test]
async fn play_starts_clip_then_pauses() {
    let h = Harness::start().await;
    h.log_in().await;
    let quiz = QuizController::new(h.api.clone(), h.lists.clone(), "quiz");

    let track = Track::new("spotify:track:t1", 30000, 50);
    quiz.on_play_requested(&track).await.unwrap();

    let calls = h.mock.state.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].0, "PUT");
    assert_eq!(calls[0].1, "/me/player/play");
    assert_eq!(
        calls[0].2,
        Some(json!({ "uris": ["spotify:track:t1"], "position_ms": 30000 }))
    );
    assert_eq!(calls[1].1, "/me/player/pause");
}

#[tokio::test]
async fn failed_pause_does_not_fail_the_clip() {
    let h = Harness::start().await;
    h.log_in().await;
    h.mock.state.pause_fails.store(true, Ordering::SeqCst);
    let quiz = QuizController::new(h.api.clone(), h.lists.clone(), "quiz");

    quiz.on_play_requested(&Track::new("spotify:track:t1", 0, 20))
        .await
        .unwrap();

    let calls = h.mock.state.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].1, "/me/player/play");
    assert_eq!(calls[1].1, "/me/player/pause");
}

#[tokio::test]
async fn play_without_active_device_fails_before_pausing() {
    let h = Harness::start().await;
    h.log_in().await;
    let quiz = QuizController::new(h.api.clone(), h.lists.clone(), "quiz");

    let track = Track::new("spotify:track:nodevice", 0, 50);
    let err = quiz.on_play_requested(&track).await.unwrap_err();

    assert!(err.is_no_active_device());
    assert_eq!(h.mock.state.calls().len(), 1);
}

#[tokio::test]
async fn play_while_logged_out_sends_nothing() {
    let h = Harness::start().await;
    let quiz = QuizController::new(h.api.clone(), h.lists.clone(), "quiz");

    let err = quiz
        .on_play_requested(&Track::new("spotify:track:t1", 0, 50))
        .await
        .unwrap_err();
    assert!(matches!(err, QuizError::Unauthenticated));
    assert!(err.is_auth_error());
    assert_eq!(h.mock.state.api_hits(), 0);
}

#[tokio::test]
async fn play_falls_back_to_id() {
    let h = Harness::start().await;
    h.log_in().await;
    let quiz = QuizController::new(h.api.clone(), h.lists.clone(), "quiz");

    let track: Track = serde_json::from_value(json!({ "id": "t2", "durationMs": 0 })).unwrap();
    assert_eq!(track.clip_duration_ms(), 2000);

    let track = Track {
        duration_ms: Some(20),
        ..track
    };
    quiz.on_play_requested(&track).await.unwrap();
    assert_eq!(
        h.mock.state.calls()[0].2,
        Some(json!({ "uris": ["spotify:track:t2"], "position_ms": 0 }))
    );
}

#[tokio::test]
async fn reveal_joins_artists_and_caches() {
    let h = Harness::start().await;
    h.log_in().await;
    let quiz = QuizController::new(h.api.clone(), h.lists.clone(), "quiz");

    let mut track = Track::new("spotify:track:t2", 0, 2000);
    let reveal = quiz.on_confirm_requested(&mut track).await.unwrap();
    assert_eq!(reveal.artist, "Queen, David Bowie");
    assert_eq!(reveal.title, "Under Pressure");
    assert_eq!(track.artist_name.as_deref(), Some("Queen, David Bowie"));
    assert_eq!(track.track_title.as_deref(), Some("Under Pressure"));

    let hits = h.mock.state.api_hits();
    let again = quiz.on_confirm_requested(&mut track).await.unwrap();
    assert_eq!(again, reveal);
    assert_eq!(h.mock.state.api_hits(), hits);

    let stored = serde_json::to_value(&track).unwrap();
    assert_eq!(stored["_artistName"], "Queen, David Bowie");
    assert_eq!(stored["_trackTitle"], "Under Pressure");
}

#[tokio::test]
async fn reveal_uses_placeholders_for_missing_metadata() {
    let h = Harness::start().await;
    h.log_in().await;
    let quiz = QuizController::new(h.api.clone(), h.lists.clone(), "quiz");

    let mut track = Track::new("spotify:track:t3", 0, 2000);
    let reveal = quiz.on_confirm_requested(&mut track).await.unwrap();
    assert_eq!(reveal.artist, "Unknown artist");
    assert_eq!(reveal.title, "Unknown title");
}

#[tokio::test]
async fn reveal_of_unknown_track_is_an_api_error() {
    let h = Harness::start().await;
    h.log_in().await;
    let quiz = QuizController::new(h.api.clone(), h.lists.clone(), "quiz");

    let mut track = Track::new("spotify:track:missing", 0, 2000);
    let err = quiz.on_confirm_requested(&mut track).await.unwrap_err();
    assert!(matches!(err, QuizError::ApiError { status: 404, .. }));
    assert_eq!(track.reveal(), None);
}

#[tokio::test]
async fn quiz_selection_requires_existing_list() {
    let h = Harness::start().await;
    let quiz = QuizController::new(h.api.clone(), h.lists.clone(), "quiz");

    assert!(matches!(
        quiz.select("Nope").await,
        Err(QuizError::ListNotFound(_))
    ));
    assert_eq!(quiz.load_selected().await.unwrap(), None);

    h.lists
        .save_list("Party", &[Track::new("spotify:track:t1", 0, 2000)])
        .await
        .unwrap();
    assert_eq!(quiz.select("Party").await.unwrap().len(), 1);

    let (name, tracks) = quiz.load_selected().await.unwrap().unwrap();
    assert_eq!(name, "Party");
    assert_eq!(tracks.len(), 1);
}

#[tokio::test]
async fn builder_creates_and_refuses_duplicates() {
    let h = Harness::start().await;
    let mut builder = BuilderController::new(h.api.clone(), h.lists.clone(), "builder");

    builder.create_list("  Party ").await.unwrap();
    assert_eq!(builder.current(), Some("Party"));
    assert_eq!(h.lists.load_list("Party").await.unwrap(), Some(Vec::new()));

    assert!(matches!(
        builder.create_list("Party").await,
        Err(QuizError::ListAlreadyExists(_))
    ));
    assert!(matches!(
        builder.create_list("   ").await,
        Err(QuizError::MissingListName)
    ));
}

#[tokio::test]
async fn builder_add_track_looks_up_name() {
    let h = Harness::start().await;
    h.log_in().await;
    let mut builder = BuilderController::new(h.api.clone(), h.lists.clone(), "builder");

    assert!(matches!(
        builder.add_track(Track::new("spotify:track:t1", 0, 2000)).await,
        Err(QuizError::NoListSelected)
    ));

    builder.create_list("Party").await.unwrap();
    assert_eq!(
        builder
            .add_track(Track::new("spotify:track:t1", 1000, 2500))
            .await
            .unwrap(),
        1
    );

    let mut named = Track::new("spotify:track:t2", 0, 2000);
    named.name = Some("My label".into());
    assert_eq!(builder.add_track(named).await.unwrap(), 2);

    let tracks = h.lists.load_list("Party").await.unwrap().unwrap();
    assert_eq!(tracks[0].name.as_deref(), Some("Bohemian Rhapsody"));
    assert_eq!(tracks[0].start_ms, Some(1000));
    assert_eq!(tracks[1].name.as_deref(), Some("My label"));
}

#[tokio::test]
async fn builder_add_track_works_logged_out() {
    let h = Harness::start().await;
    let mut builder = BuilderController::new(h.api.clone(), h.lists.clone(), "builder");
    builder.create_list("Offline").await.unwrap();

    builder
        .add_track(Track::new("spotify:track:t1", 0, 2000))
        .await
        .unwrap();
    let tracks = h.lists.load_list("Offline").await.unwrap().unwrap();
    assert_eq!(tracks[0].name, None);
}

#[tokio::test]
async fn builder_restores_selection_per_context() {
    let h = Harness::start().await;
    let mut first = BuilderController::new(h.api.clone(), h.lists.clone(), "builder");
    first.create_list("Party").await.unwrap();
    first
        .save(&[Track::new("spotify:track:t1", 0, 2000)])
        .await
        .unwrap();

    let mut second = BuilderController::new(h.api.clone(), h.lists.clone(), "builder");
    assert_eq!(second.restore().await.unwrap().as_deref(), Some("Party"));

    let mut other = BuilderController::new(h.api.clone(), h.lists.clone(), "quiz");
    assert_eq!(other.restore().await.unwrap(), None);
    assert!(matches!(
        other.select("Nope").await,
        Err(QuizError::ListNotFound(_))
    ));
    assert_eq!(other.select("Party").await.unwrap().len(), 1);
}

#[tokio::test]
async fn builder_open_keeps_stored_selection() {
    let h = Harness::start().await;
    h.lists.save_list("Selected", &[]).await.unwrap();
    h.lists.save_list("Other", &[]).await.unwrap();
    h.lists
        .save_selection("builder", Some("Selected"))
        .await
        .unwrap();

    let mut builder = BuilderController::new(h.api.clone(), h.lists.clone(), "builder");
    assert!(matches!(
        builder.open("Missing").await,
        Err(QuizError::ListNotFound(_))
    ));

    builder.open("Other").await.unwrap();
    assert_eq!(builder.current(), Some("Other"));
    builder
        .add_track(Track::new("spotify:track:t1", 0, 2000))
        .await
        .unwrap();

    assert_eq!(h.lists.load_list("Other").await.unwrap().unwrap().len(), 1);
    assert_eq!(h.lists.load_list("Selected").await.unwrap(), Some(Vec::new()));
    assert_eq!(
        h.lists.load_selection("builder").await.unwrap().as_deref(),
        Some("Selected")
    );
}
