use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub segments: Vec<TranscriptSegment>,
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// A candidate illustration point picked by the reasoning model.
/// `timestamp_seconds` joins it to an extracted frame, `title` joins it to a
/// generated section header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyMoment {
    pub timestamp_seconds: f64,
    pub title: String,
    pub importance_score: f64,
}

/// Outcome of one frame-extraction run. `file_paths` and `timestamps` are
/// parallel lists holding only the successful subset; `success` is true iff
/// at least one frame was written; `error_message` is set only on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenshotResult {
    pub file_paths: Vec<PathBuf>,
    pub timestamps: Vec<f64>,
    pub success: bool,
    pub error_message: Option<String>,
}

impl ScreenshotResult {
    pub fn failed(message: String) -> Self {
        Self {
            file_paths: Vec::new(),
            timestamps: Vec::new(),
            success: false,
            error_message: Some(message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    Plain,
    Illustrated,
}

impl AnalysisMode {
    pub fn name(&self) -> &'static str {
        match self {
            AnalysisMode::Plain => "plain",
            AnalysisMode::Illustrated => "illustrated",
        }
    }
}

/// Per-style output bundle of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub style: String,
    pub mode: AnalysisMode,
    pub success: bool,
    pub summary: Option<String>,
    pub summary_path: Option<PathBuf>,
    pub screenshots_requested: usize,
    pub screenshots_extracted: usize,
}
