use std::str::FromStr;

use crate::{
    error::{FramescribeError, Result},
    provider::LanguageModel,
    types::{KeyMoment, ScreenshotResult},
};

/// Supported writing styles. Closed set: a style identifier that is not one
/// of these keys is a typed error, never silently replaced by a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryStyle {
    LongForm,
    Bullets,
    Social,
    StudyNotes,
}

impl SummaryStyle {
    /// The identifier used on the command line and in summary filenames.
    pub fn key(&self) -> &'static str {
        match self {
            SummaryStyle::LongForm => "long-form",
            SummaryStyle::Bullets => "bullets",
            SummaryStyle::Social => "social",
            SummaryStyle::StudyNotes => "study-notes",
        }
    }

    fn template(&self) -> &'static str {
        match self {
            SummaryStyle::LongForm => LONG_FORM_PROMPT,
            SummaryStyle::Bullets => BULLETS_PROMPT,
            SummaryStyle::Social => SOCIAL_PROMPT,
            SummaryStyle::StudyNotes => STUDY_NOTES_PROMPT,
        }
    }
}

impl FromStr for SummaryStyle {
    type Err = FramescribeError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw {
            "long-form" => Ok(SummaryStyle::LongForm),
            "bullets" => Ok(SummaryStyle::Bullets),
            "social" => Ok(SummaryStyle::Social),
            "study-notes" => Ok(SummaryStyle::StudyNotes),
            _ => Err(FramescribeError::UnknownStyle {
                style: raw.to_string(),
            }),
        }
    }
}

static LONG_FORM_PROMPT: &str = r#"You are a careful technical writer who turns video transcripts into polished long-form summaries.

INPUT: A video transcript, with an optional title and language note.

TASK: Write a thorough prose summary of the video in markdown.

OUTPUT FORMAT:
# <Document title>

<Opening paragraph placing the video in context>

## <Section heading>
<Section prose>

RULES:
- Use ## section headings to structure the summary
- Cover every major topic in the order the video presents it
- Keep the speaker's claims as stated; do not add outside facts
- Write in the same language as the transcript unless a language note says otherwise"#;

static BULLETS_PROMPT: &str = r#"You are a note-taker who compresses video transcripts into tight bullet lists.

INPUT: A video transcript, with an optional title and language note.

TASK: Summarize the video as a markdown bullet list.

OUTPUT FORMAT:
## <Section heading>
- <point>
- <point>

RULES:
- One section per major topic, 3-6 bullets each
- Each bullet states a single fact or claim from the video
- No introduction, no closing remarks
- Write in the same language as the transcript unless a language note says otherwise"#;

static SOCIAL_PROMPT: &str = r#"You are a social media editor promoting a video.

INPUT: A video transcript, with an optional title and language note.

TASK: Write a short, engaging social post presenting the video's main takeaway.

OUTPUT FORMAT: 2-4 short paragraphs of plain text, then up to 3 hashtags on the final line.

RULES:
- The first sentence must hook the reader
- Stay faithful to the transcript; no invented claims
- No markdown headings
- Write in the same language as the transcript unless a language note says otherwise"#;

static STUDY_NOTES_PROMPT: &str = r###"You are a tutor preparing study notes from a recorded lecture.

INPUT: A video transcript, with an optional title and language note.

TASK: Turn the transcript into structured study notes in markdown.

OUTPUT FORMAT:
## <Topic>
**Key idea:** <one sentence>
- <supporting detail>

RULES:
- Define every term of art the video introduces
- Keep notes factual and tied to the transcript
- End with a "## Review questions" section of 3-5 questions
- Write in the same language as the transcript unless a language note says otherwise"###;

/// Generate prose for one style. When `section_hints` is non-empty the model
/// is asked to reuse those labels as section headings, which is what lets the
/// screenshot insertion pass find them again.
pub async fn generate_summary(
    model: &dyn LanguageModel,
    transcript_text: &str,
    style: SummaryStyle,
    language: &str,
    video_title: Option<&str>,
    section_hints: &[KeyMoment],
) -> Result<String> {
    let user_prompt = render_user_prompt(transcript_text, language, video_title, section_hints);
    model.complete(style.template(), &user_prompt).await
}

fn render_user_prompt(
    transcript_text: &str,
    language: &str,
    video_title: Option<&str>,
    section_hints: &[KeyMoment],
) -> String {
    let mut user_prompt = String::new();
    if let Some(title) = video_title {
        user_prompt.push_str(&format!("Video title: {}\n", title));
    }
    if !language.is_empty() && language != "unknown" {
        user_prompt.push_str(&format!(
            "Language note: write the summary in '{}'.\n",
            language
        ));
    }
    if !section_hints.is_empty() {
        user_prompt.push_str("Where they fit the content, use these section headings:\n");
        for hint in section_hints {
            user_prompt.push_str(&format!("- {}\n", hint.title));
        }
    }
    user_prompt.push_str(&format!("\nTranscript:\n{}", transcript_text));
    user_prompt
}

/// Weave captured frames into a generated summary.
///
/// Each moment is paired with its frame through the timestamp lists, then the
/// summary is walked line by line: the first markdown header whose visible
/// text contains an unconsumed moment's title gets that moment's image
/// reference inserted right after it, and the moment is consumed. Moments
/// with no matching header insert nothing. With no pairable moments at all
/// the input text comes back byte-identical.
pub fn insert_screenshots(
    summary: &str,
    moments: &[KeyMoment],
    screenshots: &ScreenshotResult,
) -> String {
    let mut pending: Vec<(&str, &std::path::Path)> = moments
        .iter()
        .filter_map(|moment| {
            let index = screenshots
                .timestamps
                .iter()
                .position(|&t| t == moment.timestamp_seconds)?;
            Some((
                moment.title.as_str(),
                screenshots.file_paths[index].as_path(),
            ))
        })
        .collect();
    if pending.is_empty() {
        return summary.to_string();
    }

    let mut output_lines: Vec<String> = Vec::new();
    for line in summary.split('\n') {
        output_lines.push(line.to_string());
        let trimmed = line.trim_start();
        let stripped = trimmed.trim_start_matches('#');
        // ATX shape only: hash marks then a space. Hashtag lines like
        // "#Rust #video" are content, not headers.
        if stripped.len() < trimmed.len() && stripped.starts_with(' ') {
            let header_text = stripped.trim();
            if let Some(index) = pending
                .iter()
                .position(|(title, _)| header_text.contains(title))
            {
                let (_, path) = pending.remove(index);
                output_lines.push(format!("![Screenshot]({})", path.display()));
            }
        }
    }
    output_lines.join("\n")
}
