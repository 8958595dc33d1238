//! Shared helpers for host integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use storyreel_host::config::HostConfig;
use storyreel_sequencer::PlaybackConfig;

/// A fresh scratch directory unique to this process and test.
pub async fn scratch_dir(test: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("storyreel-host-{}-{test}", std::process::id()));
    let _ = tokio::fs::remove_dir_all(&dir).await;
    tokio::fs::create_dir_all(&dir).await.unwrap();
    dir
}

/// Writes `contents` to `dir/name` and returns the path.
pub async fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    tokio::fs::write(&path, contents).await.unwrap();
    path
}

/// Configuration with short fades and no auto-confirm.
pub fn config_for(story_path: PathBuf) -> HostConfig {
    HostConfig {
        story_path,
        playback: PlaybackConfig {
            fade_out: Duration::from_millis(100),
            fade_in: Duration::from_millis(100),
        },
        start_chapter: 0,
        auto_confirm: None,
    }
}

/// Two inline chapters, each one short cut.
pub const INLINE_STORY: &str = "
id: manor
name: The Manor
chapters:
  - name: Arrival
    character: inspector
    acts:
      - name: Gate
        cuts:
          - name: Drive up
            duration: 1
            start_events:
              - name: engine
                kind: play_audio
                clip: car_engine
  - name: Hall
    character: butler
    acts:
      - name: Greeting
        cuts:
          - name: Bow
            duration: 2
";

/// One inline chapter whose only cut waits for input before ending.
pub const GATED_STORY: &str = "
name: Gated
chapters:
  - name: Door
    acts:
      - name: Knock
        cuts:
          - name: Wait for answer
            duration: 0
            wait_before_end: true
";

/// A scene whose chapters live in sibling resource files.
pub const EXTERNAL_STORY: &str = "
name: Estate
use_external_chapter_resources: true
chapters:
  - resource: garden
  - resource: library
";

pub const GARDEN_CHAPTER: &str = "
name: Garden
character: gardener
acts:
  - name: Roses
    cuts:
      - name: Prune
        duration: 1
";

pub const LIBRARY_CHAPTER: &str = "
name: Library
acts:
  - name: Shelves
    cuts:
      - name: Browse
        duration: 1
";

/// One inline chapter whose cut rings a hook.
pub const HOOKED_STORY: &str = "
name: Belfry
chapters:
  - name: Tower
    acts:
      - name: Climb
        cuts:
          - name: Ring
            duration: 1
            start_events:
              - name: bell
                kind: invoke_hooks
                hook: chime
";
