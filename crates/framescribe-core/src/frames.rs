use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::{
    error::{FramescribeError, Result},
    types::ScreenshotResult,
};

/// Upper bound for a single frame-capture call. A stuck external tool is
/// treated the same as a failed one.
pub const CAPTURE_TIMEOUT: Duration = Duration::from_secs(30);

/// Capability interface for writing one still frame of a video to disk.
/// The production implementation shells out to ffmpeg; tests inject fakes.
#[async_trait]
pub trait FrameCapture: Send + Sync {
    async fn capture(&self, video_path: &Path, timestamp: f64, output_path: &Path)
        -> Result<()>;
}

/// Grabs a single frame per call with `ffmpeg -ss <t> -i <video> -frames:v 1`.
pub struct FfmpegFrameCapture;

#[async_trait]
impl FrameCapture for FfmpegFrameCapture {
    async fn capture(
        &self,
        video_path: &Path,
        timestamp: f64,
        output_path: &Path,
    ) -> Result<()> {
        let fail = |reason: String| FramescribeError::FrameCaptureFailed { timestamp, reason };

        let output = timeout(
            CAPTURE_TIMEOUT,
            Command::new("ffmpeg")
                .arg("-y")
                .arg("-ss")
                .arg(timestamp.to_string())
                .arg("-i")
                .arg(video_path)
                .arg("-frames:v")
                .arg("1")
                .arg("-q:v")
                .arg("2")
                .arg(output_path)
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| fail(format!("timed out after {}s", CAPTURE_TIMEOUT.as_secs())))?
        .map_err(|e| fail(format!("could not run ffmpeg: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(fail(stderr.trim().to_string()));
        }
        Ok(())
    }
}

/// Deterministic image filename for a timestamp, so rerunning a video with
/// the same timestamps overwrites instead of accumulating files.
pub fn screenshot_filename(timestamp: f64) -> String {
    format!("screenshot_{}s.jpg", timestamp)
}

/// Capture one frame per timestamp into `output_dir`.
///
/// A missing video or an empty timestamp list fails the whole call. Inside
/// the loop, failures are per-timestamp: a capture error, a timeout, or a
/// call that reports success without writing its output file all just drop
/// that timestamp from the result. Only when every capture fails does the
/// result flip to failure, carrying the attempt count.
pub async fn extract_screenshots(
    capture: &dyn FrameCapture,
    video_path: &Path,
    timestamps: &[f64],
    output_dir: &Path,
) -> ScreenshotResult {
    if !video_path.exists() {
        return ScreenshotResult::failed(format!(
            "Video file not found: {}",
            video_path.display()
        ));
    }
    if let Err(e) = fs::create_dir_all(output_dir).await {
        return ScreenshotResult::failed(format!(
            "Could not create screenshot directory {}: {}",
            output_dir.display(),
            e
        ));
    }
    if timestamps.is_empty() {
        return ScreenshotResult::failed("No timestamps provided".to_string());
    }

    info!(
        "Extracting {} frames from {}",
        timestamps.len(),
        video_path.display()
    );

    let mut file_paths = Vec::new();
    let mut captured = Vec::new();
    let mut failures = 0usize;
    for &timestamp in timestamps {
        let output_path = output_dir.join(screenshot_filename(timestamp));
        match capture.capture(video_path, timestamp, &output_path).await {
            Ok(()) if output_path.exists() => {
                file_paths.push(output_path);
                captured.push(timestamp);
            }
            Ok(()) => {
                warn!("Frame capture at {}s wrote no output file", timestamp);
                failures += 1;
            }
            Err(e) => {
                warn!("Frame capture at {}s failed: {}", timestamp, e);
                failures += 1;
            }
        }
    }

    if file_paths.is_empty() {
        return ScreenshotResult::failed(format!("All {} frame captures failed", failures));
    }

    info!("Captured {}/{} frames", file_paths.len(), timestamps.len());
    ScreenshotResult {
        file_paths,
        timestamps: captured,
        success: true,
        error_message: None,
    }
}
