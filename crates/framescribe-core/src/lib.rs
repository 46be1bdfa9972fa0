//! Core library for framescribe.
//!
//! Takes a video source, transcribes it into timed segments, asks a language
//! model which moments deserve a still frame, captures those frames with an
//! external tool, and assembles a markdown summary with each frame placed
//! under its matching section header. Every external collaborator sits
//! behind a trait so the whole flow is testable with fakes.

pub mod cache;
pub mod error;
pub mod fetch;
pub mod format;
pub mod frames;
pub mod moments;
pub mod pipeline;
pub mod provider;
pub mod summary;
pub mod transcribe;
pub mod types;

pub use cache::default_workspace_root;
pub use error::{FramescribeError, Result};
pub use fetch::{MediaFetcher, YtDlpFetcher};
pub use frames::{extract_screenshots, FfmpegFrameCapture, FrameCapture};
pub use moments::select_key_moments;
pub use pipeline::{Pipeline, PipelineOptions};
pub use provider::{LanguageModel, Provider};
pub use summary::{generate_summary, insert_screenshots, SummaryStyle};
pub use transcribe::{ensure_model, PunctuationNormalizer, SpeechToText, Transcriber, WhisperStt};
pub use types::{
    AnalysisMode, AnalysisResult, KeyMoment, ScreenshotResult, Transcript, TranscriptSegment,
};
