use std::{
    hash::{DefaultHasher, Hash, Hasher},
    path::{Path, PathBuf},
};

/// Default root for per-source workspaces and model weights
pub fn default_workspace_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("framescribe")
}

/// Workspace directory for a given source reference
pub fn workspace_dir(root: &Path, url: &str) -> PathBuf {
    let mut hasher = DefaultHasher::new();
    url.hash(&mut hasher);
    root.join(hasher.finish().to_string())
}

pub fn model_dir(root: &Path) -> PathBuf {
    root.join("models")
}

/// Find a previously fetched video file in the workspace
pub fn find_video_in_workspace(workspace: &Path) -> Option<PathBuf> {
    let Ok(entries) = std::fs::read_dir(workspace) else {
        return None;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        // bestaudio downloads share extensions with video containers
        if path.file_stem().is_some_and(|stem| stem == "audio_src") {
            continue;
        }
        if let Some(ext) = path.extension() {
            let ext = ext.to_string_lossy().to_lowercase();
            if matches!(ext.as_str(), "mp4" | "webm" | "mkv" | "mov" | "avi") {
                return Some(path);
            }
        }
    }
    None
}

/// Find a previously fetched audio-only file in the workspace. The fetcher
/// pins the stem to `audio_src`, so any extension but a partial download
/// counts.
pub fn find_audio_in_workspace(workspace: &Path) -> Option<PathBuf> {
    let Ok(entries) = std::fs::read_dir(workspace) else {
        return None;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let is_partial = path.extension().is_some_and(|ext| ext == "part");
        if path.file_stem().is_some_and(|stem| stem == "audio_src") && !is_partial {
            return Some(path);
        }
    }
    None
}

/// Path for the 16 kHz wav fed to the speech-to-text engine
pub fn wav_path(workspace: &Path) -> PathBuf {
    workspace.join("audio.wav")
}

/// Path for the cached transcript
pub fn transcript_path(workspace: &Path) -> PathBuf {
    workspace.join("transcript.json")
}

/// Directory for extracted frames
pub fn screenshots_dir(workspace: &Path) -> PathBuf {
    workspace.join("screenshots")
}

/// Path for a generated summary (style and language aware)
pub fn summary_path(workspace: &Path, style_key: &str, lang: &str) -> PathBuf {
    workspace.join(format!("summary_{}_{}.md", style_key, lang))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_dir_is_deterministic_per_url() {
        let root = Path::new("/tmp/fs-test");
        let a = workspace_dir(root, "https://example.com/watch?v=abc");
        let b = workspace_dir(root, "https://example.com/watch?v=abc");
        let c = workspace_dir(root, "https://example.com/watch?v=xyz");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with(root));
    }

    #[test]
    fn summary_path_carries_style_and_language() {
        let path = summary_path(Path::new("/ws"), "long-form", "en");
        assert_eq!(path, PathBuf::from("/ws/summary_long-form_en.md"));
    }

    #[test]
    fn audio_probe_matches_stem_and_skips_partials() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_audio_in_workspace(dir.path()), None);

        std::fs::write(dir.path().join("audio_src.m4a.part"), b"x").unwrap();
        assert_eq!(find_audio_in_workspace(dir.path()), None);

        std::fs::write(dir.path().join("audio_src.m4a"), b"x").unwrap();
        assert_eq!(
            find_audio_in_workspace(dir.path()),
            Some(dir.path().join("audio_src.m4a"))
        );
    }

    #[test]
    fn video_probe_matches_known_extensions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("transcript.json"), b"{}").unwrap();
        assert_eq!(find_video_in_workspace(dir.path()), None);

        std::fs::write(dir.path().join("video.mp4"), b"x").unwrap();
        assert_eq!(
            find_video_in_workspace(dir.path()),
            Some(dir.path().join("video.mp4"))
        );
    }

    #[test]
    fn video_probe_ignores_audio_only_downloads() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("audio_src.webm"), b"x").unwrap();
        assert_eq!(find_video_in_workspace(dir.path()), None);
    }
}
