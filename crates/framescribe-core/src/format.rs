use crate::types::TranscriptSegment;

/// Format seconds as MM:SS timestamp
pub fn format_timestamp(seconds: f64) -> String {
    let mins = (seconds / 60.0) as u32;
    let secs = (seconds % 60.0) as u32;
    format!("{:02}:{:02}", mins, secs)
}

/// Render segments as `[MM:SS] text` lines for prompt input. Segments that
/// trimmed down to nothing carry no information for the model and are
/// skipped.
pub fn format_segments_with_timestamps(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .filter(|seg| !seg.text.is_empty())
        .map(|seg| format!("[{}] {}", format_timestamp(seg.start), seg.text))
        .collect::<Vec<_>>()
        .join("\n")
}
