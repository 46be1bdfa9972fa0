use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use framescribe_core::{
    error::{FramescribeError, Result},
    frames::{extract_screenshots, screenshot_filename, FrameCapture},
};
use tempfile::tempdir;

struct WritingCapture {
    calls: AtomicUsize,
}

impl WritingCapture {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl FrameCapture for WritingCapture {
    async fn capture(
        &self,
        _video_path: &Path,
        _timestamp: f64,
        output_path: &Path,
    ) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::fs::write(output_path, b"jpeg")?;
        Ok(())
    }
}

/// Fails for one specific timestamp, succeeds for the rest.
struct FailingAt {
    bad: f64,
}

#[async_trait]
impl FrameCapture for FailingAt {
    async fn capture(&self, _video_path: &Path, timestamp: f64, output_path: &Path) -> Result<()> {
        if timestamp == self.bad {
            return Err(FramescribeError::FrameCaptureFailed {
                timestamp,
                reason: "simulated tool failure".to_string(),
            });
        }
        std::fs::write(output_path, b"jpeg")?;
        Ok(())
    }
}

/// Reports success but never writes the output file.
struct SilentCapture;

#[async_trait]
impl FrameCapture for SilentCapture {
    async fn capture(
        &self,
        _video_path: &Path,
        _timestamp: f64,
        _output_path: &Path,
    ) -> Result<()> {
        Ok(())
    }
}

struct AlwaysFailing;

#[async_trait]
impl FrameCapture for AlwaysFailing {
    async fn capture(&self, _video_path: &Path, timestamp: f64, _output_path: &Path) -> Result<()> {
        Err(FramescribeError::FrameCaptureFailed {
            timestamp,
            reason: "simulated tool failure".to_string(),
        })
    }
}

fn fixture_video(dir: &Path) -> std::path::PathBuf {
    let video = dir.join("video.mp4");
    std::fs::write(&video, b"not really a video").unwrap();
    video
}

#[tokio::test]
async fn missing_video_fails_before_any_capture() {
    let dir = tempdir().unwrap();
    let capture = WritingCapture::new();
    let result = extract_screenshots(
        &capture,
        &dir.path().join("missing.mp4"),
        &[10.0],
        &dir.path().join("shots"),
    )
    .await;

    assert!(!result.success);
    assert!(result.error_message.unwrap().contains("not found"));
    assert_eq!(capture.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_timestamps_fail_but_still_create_the_directory() {
    let dir = tempdir().unwrap();
    let video = fixture_video(dir.path());
    let shots_dir = dir.path().join("shots");
    let capture = WritingCapture::new();
    let result = extract_screenshots(&capture, &video, &[], &shots_dir).await;

    assert!(!result.success);
    assert!(result.error_message.unwrap().contains("No timestamps"));
    assert!(shots_dir.is_dir());
    assert_eq!(capture.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn successful_captures_come_back_as_parallel_lists() {
    let dir = tempdir().unwrap();
    let video = fixture_video(dir.path());
    let shots_dir = dir.path().join("shots");
    let capture = WritingCapture::new();
    let result = extract_screenshots(&capture, &video, &[10.0, 20.5], &shots_dir).await;

    assert!(result.success);
    assert!(result.error_message.is_none());
    assert_eq!(result.timestamps, vec![10.0, 20.5]);
    assert_eq!(
        result.file_paths,
        vec![
            shots_dir.join("screenshot_10s.jpg"),
            shots_dir.join("screenshot_20.5s.jpg"),
        ]
    );
    for path in &result.file_paths {
        assert!(path.is_file());
    }
}

#[tokio::test]
async fn one_failed_timestamp_is_skipped() {
    let dir = tempdir().unwrap();
    let video = fixture_video(dir.path());
    let result = extract_screenshots(
        &FailingAt { bad: 20.0 },
        &video,
        &[10.0, 20.0, 30.0],
        &dir.path().join("shots"),
    )
    .await;

    assert!(result.success);
    assert_eq!(result.file_paths.len(), 2);
    assert_eq!(result.timestamps, vec![10.0, 30.0]);
    assert!(result.error_message.is_none());
}

#[tokio::test]
async fn missing_output_file_counts_as_a_failure() {
    let dir = tempdir().unwrap();
    let video = fixture_video(dir.path());
    let result =
        extract_screenshots(&SilentCapture, &video, &[1.0, 2.0], &dir.path().join("shots")).await;

    assert!(!result.success);
    assert!(result.error_message.unwrap().contains("2"));
    assert!(result.file_paths.is_empty());
    assert!(result.timestamps.is_empty());
}

#[tokio::test]
async fn all_failures_aggregate_into_one_message() {
    let dir = tempdir().unwrap();
    let video = fixture_video(dir.path());
    let result = extract_screenshots(
        &AlwaysFailing,
        &video,
        &[1.0, 2.0, 3.0],
        &dir.path().join("shots"),
    )
    .await;

    assert!(!result.success);
    assert_eq!(
        result.error_message.as_deref(),
        Some("All 3 frame captures failed")
    );
}

#[tokio::test]
async fn rerunning_the_same_timestamps_overwrites_instead_of_accumulating() {
    let dir = tempdir().unwrap();
    let video = fixture_video(dir.path());
    let shots_dir = dir.path().join("shots");
    let capture = WritingCapture::new();

    for _ in 0..2 {
        let result = extract_screenshots(&capture, &video, &[10.0, 20.0], &shots_dir).await;
        assert!(result.success);
    }

    let entries = std::fs::read_dir(&shots_dir).unwrap().count();
    assert_eq!(entries, 2);
    assert!(shots_dir.join(screenshot_filename(10.0)).is_file());
    assert!(shots_dir.join(screenshot_filename(20.0)).is_file());
}
