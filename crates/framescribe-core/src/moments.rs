use std::cmp::Ordering;

use tracing::warn;

use crate::{
    error::Result,
    format::format_segments_with_timestamps,
    provider::LanguageModel,
    types::{KeyMoment, TranscriptSegment},
};

/// Ask the reasoning model for up to `screenshot_count` moments worth
/// illustrating. Any model failure or malformed reply degrades to an empty
/// list; this stage never aborts the run.
pub async fn select_key_moments(
    model: &dyn LanguageModel,
    segments: &[TranscriptSegment],
    screenshot_count: usize,
    video_title: Option<&str>,
) -> Vec<KeyMoment> {
    match request_moments(model, segments, screenshot_count, video_title).await {
        Ok(reply) => parse_key_moments(&reply, screenshot_count),
        Err(e) => {
            warn!("Key moment selection failed: {}", e);
            Vec::new()
        }
    }
}

async fn request_moments(
    model: &dyn LanguageModel,
    segments: &[TranscriptSegment],
    screenshot_count: usize,
    video_title: Option<&str>,
) -> Result<String> {
    let (system_prompt, user_prompt) =
        render_moment_prompt(segments, screenshot_count, video_title);
    model.complete(&system_prompt, &user_prompt).await
}

fn render_moment_prompt(
    segments: &[TranscriptSegment],
    screenshot_count: usize,
    video_title: Option<&str>,
) -> (String, String) {
    let system_prompt = format!(
        r#"You are a video content analyzer. Your task is to pick the moments of a video most worth illustrating with a still frame.

INPUT: Video transcript with timestamps in format [MM:SS] text

OUTPUT: Return ONLY a valid JSON array (no markdown, no explanation):
[
  {{"timestamp_seconds": 12.5, "title": "Short section label", "importance_score": 0.9}}
]

RULES:
- Pick at most {count} moments, fewer if the video has fewer distinct visual beats
- timestamp_seconds must fall within the video duration
- title is a short label (3-6 words) that will double as a section heading
- importance_score is a number between 0.0 and 1.0
- Prefer moments where something is shown: demos, diagrams, charts, on-screen code
- Output ONLY the JSON array, nothing else"#,
        count = screenshot_count
    );

    let duration_seconds = segments.last().map(|seg| seg.end).unwrap_or(0.0);
    let mut user_prompt = String::new();
    if let Some(title) = video_title {
        user_prompt.push_str(&format!("Video title: {}\n", title));
    }
    user_prompt.push_str(&format!(
        "Pick the key visual moments of this transcript (duration: {:.1} minutes):\n\n{}",
        duration_seconds / 60.0,
        format_segments_with_timestamps(segments)
    ));

    (system_prompt, user_prompt)
}

/// Strip an optional markdown code fence from around a reply body
pub fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed);
    trimmed.trim()
}

/// Parse and validate a model reply into a clean moment list.
///
/// Strict parsing: anything but a JSON array yields an empty list, never a
/// repair attempt. Candidates missing `timestamp_seconds` or `title` are
/// dropped; a missing `importance_score` defaults to 0.5 while a present
/// value is kept as supplied, in range or not. Survivors come back sorted
/// ascending by timestamp and capped at `screenshot_count`.
pub fn parse_key_moments(reply: &str, screenshot_count: usize) -> Vec<KeyMoment> {
    let body = strip_code_fence(reply);

    let candidates: Vec<serde_json::Value> = match serde_json::from_str(body) {
        Ok(candidates) => candidates,
        Err(e) => {
            warn!("Key moment reply is not a JSON array: {}", e);
            return Vec::new();
        }
    };

    let mut moments: Vec<KeyMoment> = candidates
        .iter()
        .filter_map(|candidate| {
            let timestamp_seconds = candidate.get("timestamp_seconds")?.as_f64()?;
            let title = candidate.get("title")?.as_str()?;
            let importance_score = candidate
                .get("importance_score")
                .and_then(|score| score.as_f64())
                .unwrap_or(0.5);
            Some(KeyMoment {
                timestamp_seconds,
                title: title.to_string(),
                importance_score,
            })
        })
        .collect();

    moments.sort_by(|a, b| {
        a.timestamp_seconds
            .partial_cmp(&b.timestamp_seconds)
            .unwrap_or(Ordering::Equal)
    });
    moments.truncate(screenshot_count);
    moments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fence_stripping_handles_plain_and_tagged_fences() {
        assert_eq!(strip_code_fence("[1]"), "[1]");
        assert_eq!(strip_code_fence("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fence("```\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fence("  \n```json\n[1]\n```\n  "), "[1]");
    }

    #[test]
    fn malformed_reply_yields_no_moments() {
        assert!(parse_key_moments("not json", 5).is_empty());
        assert!(parse_key_moments("", 5).is_empty());
        assert!(parse_key_moments("{\"moments\": []}", 5).is_empty());
    }

    #[test]
    fn missing_score_defaults_to_half() {
        let moments =
            parse_key_moments(r#"[{"timestamp_seconds": 10.0, "title": "Intro"}]"#, 1);
        assert_eq!(moments.len(), 1);
        assert_eq!(moments[0].timestamp_seconds, 10.0);
        assert_eq!(moments[0].title, "Intro");
        assert_eq!(moments[0].importance_score, 0.5);
    }

    #[test]
    fn out_of_range_score_is_kept_unclamped() {
        let moments = parse_key_moments(
            r#"[{"timestamp_seconds": 3.0, "title": "Spike", "importance_score": 5.0}]"#,
            1,
        );
        assert_eq!(moments[0].importance_score, 5.0);
    }

    #[test]
    fn candidates_missing_required_fields_are_dropped() {
        let reply = r#"[
            {"timestamp_seconds": 10.0, "title": "Kept"},
            {"timestamp_seconds": 20.0},
            {"title": "No timestamp"},
            {"timestamp_seconds": 30.0, "title": 42},
            7
        ]"#;
        let moments = parse_key_moments(reply, 10);
        assert_eq!(moments.len(), 1);
        assert_eq!(moments[0].title, "Kept");
    }

    #[test]
    fn moments_come_back_sorted_by_timestamp() {
        let reply = r#"[
            {"timestamp_seconds": 30.0, "title": "c"},
            {"timestamp_seconds": 10.0, "title": "a"},
            {"timestamp_seconds": 20.0, "title": "b"}
        ]"#;
        let moments = parse_key_moments(reply, 10);
        let timestamps: Vec<f64> = moments.iter().map(|m| m.timestamp_seconds).collect();
        assert_eq!(timestamps, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn list_is_capped_at_the_screenshot_budget() {
        let reply = r#"[
            {"timestamp_seconds": 30.0, "title": "c"},
            {"timestamp_seconds": 10.0, "title": "a"},
            {"timestamp_seconds": 20.0, "title": "b"}
        ]"#;
        let moments = parse_key_moments(reply, 2);
        assert_eq!(moments.len(), 2);
        assert_eq!(moments[0].timestamp_seconds, 10.0);
        assert_eq!(moments[1].timestamp_seconds, 20.0);
    }

    #[test]
    fn fenced_reply_is_parsed() {
        let reply = "```json\n[{\"timestamp_seconds\": 1.0, \"title\": \"t\"}]\n```";
        assert_eq!(parse_key_moments(reply, 5).len(), 1);
    }

    #[test]
    fn integer_timestamps_are_accepted() {
        let moments = parse_key_moments(r#"[{"timestamp_seconds": 10, "title": "t"}]"#, 1);
        assert_eq!(moments[0].timestamp_seconds, 10.0);
    }

    #[test]
    fn prompt_carries_the_budget_and_the_rendered_transcript() {
        let segments = vec![TranscriptSegment {
            start: 0.0,
            end: 5.0,
            text: "hello".to_string(),
        }];
        let (system_prompt, user_prompt) =
            render_moment_prompt(&segments, 3, Some("Demo day"));
        assert!(system_prompt.contains("at most 3 moments"));
        assert!(user_prompt.contains("Video title: Demo day"));
        assert!(user_prompt.contains("[00:00] hello"));
    }
}
