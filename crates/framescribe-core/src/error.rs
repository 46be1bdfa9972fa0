use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FramescribeError {
    #[error("Download failed for {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("Audio conversion failed for {media_path}: {reason}")]
    AudioConversionFailed { media_path: PathBuf, reason: String },

    #[error("Transcription failed for {audio_path}: {reason}")]
    TranscriptionFailed { audio_path: PathBuf, reason: String },

    #[error("Model download failed from {url}: {reason}")]
    ModelDownloadFailed { url: String, reason: String },

    #[error("Summary generation failed: {reason}")]
    GenerationFailed { reason: String },

    #[error("Frame capture failed at {timestamp}s: {reason}")]
    FrameCaptureFailed { timestamp: f64, reason: String },

    #[error("Unknown summary style: {style}")]
    UnknownStyle { style: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Missing API key: {env_var} environment variable is not set")]
    MissingApiKey { env_var: String },
}

pub type Result<T> = std::result::Result<T, FramescribeError>;
