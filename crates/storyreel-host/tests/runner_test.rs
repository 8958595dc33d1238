//! Integration tests for loading and playing a story headlessly.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use storyreel_content::ContentError;
use storyreel_core::registry::DispatchRegistry;
use storyreel_host::error::HostError;
use storyreel_host::runner::{self, RunOutcome};

#[tokio::test]
async fn test_inline_story_plays_to_completion() {
    // Arrange
    let dir = common::scratch_dir("inline").await;
    let path = common::write_file(&dir, "manor.yaml", common::INLINE_STORY).await;
    let config = common::config_for(path);
    let scene = runner::prepare(&config).await.unwrap();
    tokio::time::pause();

    // Act
    let outcome = runner::play(&scene, 0, None, std::future::pending()).await.unwrap();

    // Assert
    assert_eq!(outcome, RunOutcome::Completed);
    assert!(!scene.is_playing());
    assert_eq!(scene.chapter_count(), 2);
}

#[tokio::test]
async fn test_external_chapters_load_from_story_directory() {
    // Arrange
    let dir = common::scratch_dir("external").await;
    let path = common::write_file(&dir, "estate.yaml", common::EXTERNAL_STORY).await;
    common::write_file(&dir, "garden.yaml", common::GARDEN_CHAPTER).await;
    common::write_file(&dir, "library.yml", common::LIBRARY_CHAPTER).await;
    let config = common::config_for(path);
    let scene = runner::prepare(&config).await.unwrap();

    // Act
    let outcome = tokio::time::timeout(
        Duration::from_secs(30),
        runner::play(&scene, 0, None, std::future::pending()),
    )
    .await
    .unwrap()
    .unwrap();

    // Assert
    assert_eq!(outcome, RunOutcome::Completed);
    assert!(!scene.is_playing());
}

#[tokio::test]
async fn test_gated_story_completes_with_auto_confirm() {
    // Arrange
    let dir = common::scratch_dir("auto-confirm").await;
    let path = common::write_file(&dir, "gated.yaml", common::GATED_STORY).await;
    let config = common::config_for(path);
    let scene = runner::prepare(&config).await.unwrap();
    tokio::time::pause();

    // Act
    let outcome = runner::play(
        &scene,
        0,
        Some(Duration::from_millis(250)),
        std::future::pending(),
    )
    .await
    .unwrap();

    // Assert
    assert_eq!(outcome, RunOutcome::Completed);
}

#[tokio::test]
async fn test_shutdown_stops_scene_waiting_for_input() {
    // Arrange
    let dir = common::scratch_dir("shutdown").await;
    let path = common::write_file(&dir, "gated.yaml", common::GATED_STORY).await;
    let config = common::config_for(path);
    let scene = runner::prepare(&config).await.unwrap();
    tokio::time::pause();

    // Act
    let outcome = runner::play(&scene, 0, None, tokio::time::sleep(Duration::from_secs(5)))
        .await
        .unwrap();

    // Assert
    assert_eq!(outcome, RunOutcome::Interrupted);
    assert!(!scene.is_playing());
}

#[tokio::test]
async fn test_start_chapter_out_of_range_is_not_started() {
    // Arrange
    let dir = common::scratch_dir("bad-start").await;
    let path = common::write_file(&dir, "manor.yaml", common::INLINE_STORY).await;
    let config = common::config_for(path);
    let scene = runner::prepare(&config).await.unwrap();

    // Act
    let result = runner::play(&scene, 9, None, std::future::pending()).await;

    // Assert
    assert!(matches!(result, Err(HostError::NotStarted(name)) if name == "The Manor"));
}

#[tokio::test]
async fn test_invalid_story_is_rejected_before_playback() {
    // Arrange
    let dir = common::scratch_dir("invalid").await;
    let story = common::INLINE_STORY.replace("duration: 2", "duration: -2");
    let path = common::write_file(&dir, "manor.yaml", &story).await;
    let config = common::config_for(path);

    // Act
    let result = runner::prepare(&config).await;

    // Assert
    assert!(matches!(result, Err(HostError::Content(ContentError::Invalid(_)))));
}

#[tokio::test]
async fn test_missing_story_file_is_a_content_error() {
    let config = common::config_for("does/not/exist.yaml".into());

    let result = runner::prepare(&config).await;

    assert!(matches!(result, Err(HostError::Content(ContentError::Io { .. }))));
}

#[tokio::test]
async fn test_unregistered_hook_is_rejected_at_load() {
    // Arrange
    let dir = common::scratch_dir("unregistered-hook").await;
    let path = common::write_file(&dir, "belfry.yaml", common::HOOKED_STORY).await;
    let config = common::config_for(path);

    // Act
    let result = runner::prepare(&config).await;

    // Assert
    match result {
        Err(HostError::Content(ContentError::Invalid(issues))) => {
            assert_eq!(issues.len(), 1);
            assert!(issues[0].problem.contains("chime"));
        }
        other => panic!("expected an invalid story, got {other:?}"),
    }
}

#[tokio::test]
async fn test_registered_hook_is_accepted_and_invoked() {
    // Arrange
    let dir = common::scratch_dir("registered-hook").await;
    let path = common::write_file(&dir, "belfry.yaml", common::HOOKED_STORY).await;
    let config = common::config_for(path);
    let rings = Arc::new(AtomicUsize::new(0));
    let mut registry = DispatchRegistry::new();
    {
        let rings = Arc::clone(&rings);
        registry.register_hook("chime", move || {
            rings.fetch_add(1, Ordering::SeqCst);
        });
    }
    let scene = runner::prepare_with_registry(&config, registry).await.unwrap();
    tokio::time::pause();

    // Act
    let outcome = runner::play(&scene, 0, None, std::future::pending()).await.unwrap();

    // Assert
    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(rings.load(Ordering::SeqCst), 1);
}
