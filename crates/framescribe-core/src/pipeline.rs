use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{info, warn};

use crate::{
    cache,
    error::Result,
    fetch::{self, MediaFetcher},
    frames::{extract_screenshots, FrameCapture},
    moments::select_key_moments,
    provider::LanguageModel,
    summary::{generate_summary, insert_screenshots, SummaryStyle},
    transcribe::{SpeechToText, Transcriber},
    types::{AnalysisMode, AnalysisResult, KeyMoment, ScreenshotResult, Transcript},
};

/// Per-run settings, assembled by the caller (usually the CLI).
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Source reference handed to the media fetcher.
    pub source: String,
    /// Human-readable title threaded into the prompts.
    pub video_title: Option<String>,
    /// Style identifiers, one summary per entry.
    pub styles: Vec<String>,
    /// Screenshot budget; 0 disables illustration for the run.
    pub screenshot_count: usize,
    /// Overrides the transcript's detected language for the summaries.
    pub language_override: Option<String>,
    /// Re-run every stage even when cached artifacts exist.
    pub force: bool,
    /// Cache root holding one workspace directory per source.
    pub workspace_root: PathBuf,
}

/// The analysis pipeline over its four collaborator ports. Stages run
/// strictly in sequence: fetch, transcribe, then per-run moment selection
/// and frame extraction when illustration is enabled, then one generation
/// call per requested style.
pub struct Pipeline<F, S, L, C> {
    fetcher: F,
    transcriber: Transcriber<S>,
    model: L,
    capture: C,
}

impl<F, S, L, C> Pipeline<F, S, L, C>
where
    F: MediaFetcher,
    S: SpeechToText,
    L: LanguageModel,
    C: FrameCapture,
{
    pub fn new(fetcher: F, transcriber: Transcriber<S>, model: L, capture: C) -> Self {
        Self {
            fetcher,
            transcriber,
            model,
            capture,
        }
    }

    /// Run one analysis, producing one result per requested style.
    ///
    /// Transcription failures abort the run. Moment selection and frame
    /// extraction degrade to an unillustrated summary. An unknown style or a
    /// failed generation call turns into a failed result for that style only,
    /// leaving the other styles untouched.
    pub async fn run(&self, options: &PipelineOptions) -> Result<Vec<AnalysisResult>> {
        let workspace = cache::workspace_dir(&options.workspace_root, &options.source);
        fs::create_dir_all(&workspace).await?;

        let illustrated = options.screenshot_count > 0;
        let mode = if illustrated {
            AnalysisMode::Illustrated
        } else {
            AnalysisMode::Plain
        };

        let media = self.acquire_media(options, &workspace, illustrated).await?;
        let wav = ensure_wav(&media, &workspace, options.force).await?;
        let transcript = self.ensure_transcript(&wav, &workspace, options.force).await?;
        let language = options
            .language_override
            .clone()
            .unwrap_or_else(|| transcript.language.clone());

        let mut moments: Vec<KeyMoment> = Vec::new();
        let mut shots: Option<ScreenshotResult> = None;
        if illustrated {
            info!("Selecting key moments");
            moments = select_key_moments(
                &self.model,
                &transcript.segments,
                options.screenshot_count,
                options.video_title.as_deref(),
            )
            .await;
            if moments.is_empty() {
                warn!("No usable key moments; continuing without illustrations");
            } else {
                let timestamps: Vec<f64> =
                    moments.iter().map(|m| m.timestamp_seconds).collect();
                let result = extract_screenshots(
                    &self.capture,
                    &media,
                    &timestamps,
                    &cache::screenshots_dir(&workspace),
                )
                .await;
                if result.success {
                    shots = Some(result);
                } else {
                    warn!(
                        "Frame extraction failed: {}",
                        result.error_message.as_deref().unwrap_or("unknown")
                    );
                }
            }
        }

        let screenshots_requested = if illustrated {
            options.screenshot_count
        } else {
            0
        };
        let screenshots_extracted = shots.as_ref().map(|s| s.file_paths.len()).unwrap_or(0);

        let mut results = Vec::new();
        for raw_style in &options.styles {
            let style = match raw_style.parse::<SummaryStyle>() {
                Ok(style) => style,
                Err(e) => {
                    warn!("{}", e);
                    results.push(AnalysisResult {
                        style: raw_style.clone(),
                        mode,
                        success: false,
                        summary: None,
                        summary_path: None,
                        screenshots_requested,
                        screenshots_extracted,
                    });
                    continue;
                }
            };

            info!("Generating {} summary", style.key());
            let section_hints: &[KeyMoment] = if shots.is_some() { &moments } else { &[] };
            match generate_summary(
                &self.model,
                &transcript.text,
                style,
                &language,
                options.video_title.as_deref(),
                section_hints,
            )
            .await
            {
                Ok(text) => {
                    let final_text = match &shots {
                        Some(s) => insert_screenshots(&text, &moments, s),
                        None => text,
                    };
                    let summary_path = cache::summary_path(&workspace, style.key(), &language);
                    fs::write(&summary_path, &final_text).await?;
                    results.push(AnalysisResult {
                        style: raw_style.clone(),
                        mode,
                        success: true,
                        summary: Some(final_text),
                        summary_path: Some(summary_path),
                        screenshots_requested,
                        screenshots_extracted,
                    });
                }
                Err(e) => {
                    warn!("Summary generation failed for {}: {}", style.key(), e);
                    results.push(AnalysisResult {
                        style: raw_style.clone(),
                        mode,
                        success: false,
                        summary: None,
                        summary_path: None,
                        screenshots_requested,
                        screenshots_extracted,
                    });
                }
            }
        }

        Ok(results)
    }

    async fn acquire_media(
        &self,
        options: &PipelineOptions,
        workspace: &Path,
        illustrated: bool,
    ) -> Result<PathBuf> {
        if !options.force {
            let cached = if illustrated {
                cache::find_video_in_workspace(workspace)
            } else {
                cache::find_audio_in_workspace(workspace)
            };
            if let Some(path) = cached {
                info!("Reusing cached media {}", path.display());
                return Ok(path);
            }
        }
        if illustrated {
            self.fetcher.fetch_video(&options.source, workspace).await
        } else {
            self.fetcher.fetch_audio(&options.source, workspace).await
        }
    }

    async fn ensure_transcript(
        &self,
        wav: &Path,
        workspace: &Path,
        force: bool,
    ) -> Result<Transcript> {
        let transcript_path = cache::transcript_path(workspace);
        if !force {
            if let Some(transcript) = load_cached_transcript(&transcript_path).await {
                info!("Reusing cached transcript");
                return Ok(transcript);
            }
        }
        info!("Transcribing {}", wav.display());
        let transcript = self.transcriber.transcribe(wav).await?;
        fs::write(&transcript_path, serde_json::to_string_pretty(&transcript)?).await?;
        Ok(transcript)
    }
}

/// The speech-to-text engine wants 16 kHz mono wav. Media that is already
/// wav is passed through untouched; everything else goes through ffmpeg once
/// per workspace unless `force` is set.
async fn ensure_wav(media: &Path, workspace: &Path, force: bool) -> Result<PathBuf> {
    if media.extension().and_then(|e| e.to_str()) == Some("wav") {
        return Ok(media.to_path_buf());
    }
    let wav = cache::wav_path(workspace);
    if force || !wav.exists() {
        fetch::convert_to_wav(media, &wav).await?;
    }
    Ok(wav)
}

async fn load_cached_transcript(path: &Path) -> Option<Transcript> {
    let raw = fs::read_to_string(path).await.ok()?;
    match serde_json::from_str(&raw) {
        Ok(transcript) => Some(transcript),
        Err(e) => {
            warn!("Ignoring unreadable transcript cache: {}", e);
            None
        }
    }
}
