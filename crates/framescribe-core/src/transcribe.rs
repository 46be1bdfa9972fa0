use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::{fs, process::Command};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::{
    cache::model_dir,
    error::{FramescribeError, Result},
    types::{Transcript, TranscriptSegment},
};

pub const MODEL_NAME: &str = "ggml-medium-q5_0.bin";

/// Download the whisper model on first use, returning its cached path
pub async fn ensure_model(workspace_root: &Path) -> Result<PathBuf> {
    let download_url = format!(
        "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/{}",
        MODEL_NAME
    );
    let dir = model_dir(workspace_root);

    if !dir.exists() {
        fs::create_dir_all(&dir).await?;
    }

    let model_path = dir.join(MODEL_NAME);
    if !model_path.exists() {
        let output = Command::new("curl")
            .arg("-L")
            .arg(&download_url)
            .arg("-o")
            .arg(&model_path)
            .output()
            .await?;

        if !output.status.success() {
            return Err(FramescribeError::ModelDownloadFailed {
                url: download_url,
                reason: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }
    }

    Ok(model_path)
}

/// Port for the speech-to-text engine. A failing engine is fatal for the
/// run: there is no meaningful partial transcript.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript>;
}

/// whisper.cpp backed engine
pub struct WhisperStt {
    model_path: PathBuf,
}

impl WhisperStt {
    pub fn new(model_path: PathBuf) -> Self {
        Self { model_path }
    }
}

#[async_trait]
impl SpeechToText for WhisperStt {
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript> {
        let fail = |reason: String| FramescribeError::TranscriptionFailed {
            audio_path: audio_path.to_path_buf(),
            reason,
        };

        let mut reader = hound::WavReader::open(audio_path).map_err(|e| fail(e.to_string()))?;
        let samples = reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / i16::MAX as f32))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| fail(e.to_string()))?;

        let ctx_params = WhisperContextParameters {
            use_gpu: true,
            flash_attn: true,
            ..Default::default()
        };
        let model_path = self.model_path.to_string_lossy();
        let ctx = WhisperContext::new_with_params(&model_path, ctx_params)
            .map_err(|e| fail(e.to_string()))?;

        let params = FullParams::new(SamplingStrategy::Greedy { best_of: 5 });

        let mut state = ctx.create_state().map_err(|e| fail(e.to_string()))?;
        state
            .full(params, &samples)
            .map_err(|e| fail(e.to_string()))?;

        let mut text = String::new();
        let mut segments: Vec<TranscriptSegment> = Vec::new();

        for segment in state.as_iter() {
            let Ok(seg_text) = segment.to_str() else {
                continue;
            };
            segments.push(TranscriptSegment {
                start: segment.start_timestamp() as f64 / 100.0,
                end: segment.end_timestamp() as f64 / 100.0,
                text: seg_text.to_string(),
            });
            text.push_str(seg_text);
        }

        let language_index = state.full_lang_id_from_state();
        let language = whisper_rs::get_lang_str(language_index);

        Ok(Transcript {
            text,
            segments,
            language: language.unwrap_or("unknown").to_string(),
        })
    }
}

/// Per-segment text cleanup applied before heading matching. Implementations
/// for script conversion (e.g. between variants of one language) plug in
/// here.
pub trait TextNormalizer: Send + Sync {
    fn normalize(&self, text: &str) -> String;
}

/// Folds typographic quote and space variants to their plain equivalents so
/// title matching downstream operates on one canonical form
pub struct PunctuationNormalizer;

impl TextNormalizer for PunctuationNormalizer {
    fn normalize(&self, text: &str) -> String {
        text.chars()
            .map(|c| match c {
                '\u{2018}' | '\u{2019}' => '\'',
                '\u{201C}' | '\u{201D}' => '"',
                '\u{00A0}' | '\u{3000}' => ' ',
                other => other,
            })
            .collect()
    }
}

/// Wraps a speech-to-text engine and guarantees the transcript invariants:
/// trimmed segment text, chronological order, one canonical script, and a
/// flat `text` rebuilt from the cleaned segments.
pub struct Transcriber<S> {
    engine: S,
    normalizer: Option<Box<dyn TextNormalizer>>,
}

impl<S: SpeechToText> Transcriber<S> {
    pub fn new(engine: S) -> Self {
        Self {
            engine,
            normalizer: None,
        }
    }

    pub fn with_normalizer(mut self, normalizer: Box<dyn TextNormalizer>) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    pub async fn transcribe(&self, audio_path: &Path) -> Result<Transcript> {
        let raw = self.engine.transcribe(audio_path).await?;

        let mut segments: Vec<TranscriptSegment> = raw
            .segments
            .into_iter()
            .map(|seg| {
                let trimmed = seg.text.trim();
                let text = match &self.normalizer {
                    Some(normalizer) => normalizer.normalize(trimmed),
                    None => trimmed.to_string(),
                };
                TranscriptSegment {
                    start: seg.start,
                    end: seg.end,
                    text,
                }
            })
            .collect();
        segments.sort_by(|a, b| {
            a.start
                .partial_cmp(&b.start)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let text = segments
            .iter()
            .map(|seg| seg.text.as_str())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Ok(Transcript {
            text,
            segments,
            language: raw.language,
        })
    }
}
