use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use crate::error::{FramescribeError, Result};

/// Port for retrieving source media: a video file when illustration is
/// enabled, an audio-only file otherwise.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch_video(&self, url: &str, dest_dir: &Path) -> Result<PathBuf>;
    async fn fetch_audio(&self, url: &str, dest_dir: &Path) -> Result<PathBuf>;
}

/// yt-dlp backed fetcher
pub struct YtDlpFetcher;

impl YtDlpFetcher {
    async fn run_yt_dlp(&self, url: &str, format: &str, output_template: &Path) -> Result<PathBuf> {
        let output = Command::new("yt-dlp")
            .arg(url)
            .arg("--print")
            .arg("after_move:filepath")
            .arg("--extractor-args")
            .arg("youtube:player_client=android,web")
            .arg("-f")
            .arg(format)
            .arg("-o")
            .arg(output_template)
            .output()
            .await?;

        if !output.status.success() {
            return Err(FramescribeError::DownloadFailed {
                url: url.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        let stdout_str = String::from_utf8_lossy(output.stdout.as_slice());
        Ok(PathBuf::from(stdout_str.trim()))
    }
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    async fn fetch_video(&self, url: &str, dest_dir: &Path) -> Result<PathBuf> {
        info!("Fetching video from {}", url);
        self.run_yt_dlp(url, "best", &dest_dir.join("video.%(ext)s"))
            .await
    }

    async fn fetch_audio(&self, url: &str, dest_dir: &Path) -> Result<PathBuf> {
        info!("Fetching audio from {}", url);
        self.run_yt_dlp(url, "bestaudio", &dest_dir.join("audio_src.%(ext)s"))
            .await
    }
}

/// Convert fetched media to the 16 kHz mono wav the speech-to-text engine
/// consumes
pub async fn convert_to_wav(media_path: &Path, wav_path: &Path) -> Result<()> {
    let output = Command::new("ffmpeg")
        .arg("-y")
        .arg("-i")
        .arg(media_path)
        .arg("-vn")
        .arg("-acodec")
        .arg("pcm_s16le")
        .arg("-ar")
        .arg("16000")
        .arg("-ac")
        .arg("1")
        .arg(wav_path)
        .output()
        .await?;

    if !output.status.success() {
        return Err(FramescribeError::AudioConversionFailed {
            media_path: media_path.to_path_buf(),
            reason: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    Ok(())
}
