//! Video analysis via key-frame extraction.
//!
//! Frames are pulled out with ffmpeg (first, middle and last) and described
//! together by a vision model so progression across the clip is visible.

use super::{image::to_data_url, is_remote};
use crate::config::{Prompts, VisionSettings};
use crate::error::{Result, SvarError};
use crate::llm::{single_turn, ChatCompletion, ChatMessage, ChatOptions};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Describes videos by analyzing extracted key frames.
pub struct VideoAnalyzer {
    chat: Arc<dyn ChatCompletion>,
    http: reqwest::Client,
    settings: VisionSettings,
    temp_dir: PathBuf,
    prompts: Prompts,
}

impl VideoAnalyzer {
    pub fn new(
        chat: Arc<dyn ChatCompletion>,
        settings: VisionSettings,
        temp_dir: PathBuf,
        prompts: Prompts,
    ) -> Self {
        Self {
            chat,
            http: reqwest::Client::new(),
            settings,
            temp_dir,
            prompts,
        }
    }

    /// Describe the video at a URL or local path.
    #[instrument(skip(self))]
    pub async fn describe(&self, source: &str) -> Result<String> {
        info!("Analyzing video: {}", source);

        std::fs::create_dir_all(&self.temp_dir)?;
        let scratch = tempfile::Builder::new()
            .prefix("svar-video-")
            .tempdir_in(&self.temp_dir)?;

        let local_path = if is_remote(source) {
            self.download(source, scratch.path()).await?
        } else {
            let path = PathBuf::from(source);
            if !path.exists() {
                return Err(SvarError::Media(format!("Video file not found: {}", source)));
            }
            path
        };

        let frames = extract_key_frames(&local_path, scratch.path()).await?;
        if frames.is_empty() {
            return Err(SvarError::Media("No frames extracted from video".to_string()));
        }
        info!("Extracted {} frames", frames.len());

        let mut images = Vec::with_capacity(frames.len());
        for frame in &frames {
            let bytes = tokio::fs::read(frame).await?;
            images.push(to_data_url(&bytes, "image/jpeg"));
        }

        single_turn(
            self.chat.as_ref(),
            &self.settings.model,
            &self.prompts.vision.video_system,
            ChatMessage::user_with_images(self.prompts.vision.video_user.clone(), images),
            &ChatOptions {
                temperature: None,
                max_tokens: Some(self.settings.max_tokens),
            },
        )
        .await
    }

    async fn download(&self, url: &str, dir: &Path) -> Result<PathBuf> {
        info!("Downloading video from {}", url);
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SvarError::Media(format!(
                "Downloading video {} returned status {}",
                url, status
            )));
        }

        let target = dir.join("download.mp4");
        let bytes = response.bytes().await?;
        tokio::fs::write(&target, &bytes).await?;
        debug!("Saved {} bytes to {:?}", bytes.len(), target);
        Ok(target)
    }
}

/// Timestamps (seconds) for the frames to extract from a clip.
///
/// Very short clips get a single frame; anything longer gets first, middle
/// and just-before-last so the analysis sees the clip's progression.
pub fn frame_timestamps(duration: f64) -> Vec<f64> {
    if duration <= 0.5 {
        vec![0.0]
    } else {
        vec![0.0, duration / 2.0, (duration - 0.1).max(0.0)]
    }
}

/// Extract key frames from a video into JPEG files under `out_dir`.
async fn extract_key_frames(video: &Path, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let duration = probe_duration(video).await?;
    debug!("Video duration: {:.1}s", duration);

    let mut frames = Vec::new();
    for (idx, ts) in frame_timestamps(duration).into_iter().enumerate() {
        let frame_path = out_dir.join(format!("frame_{:02}.jpg", idx));
        extract_frame(video, &frame_path, ts).await?;
        if frame_path.exists() {
            frames.push(frame_path);
        }
    }
    Ok(frames)
}

/// Extract a single frame at the given timestamp.
async fn extract_frame(video: &Path, dest: &Path, seconds: f64) -> Result<()> {
    let result = Command::new("ffmpeg")
        .arg("-ss").arg(format!("{:.3}", seconds))
        .arg("-i").arg(video)
        .arg("-frames:v").arg("1")
        .arg("-q:v").arg("2")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            Err(SvarError::Media(format!("ffmpeg frame extraction failed: {err}")))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(SvarError::ToolNotFound("ffmpeg".into()))
        }
        Err(e) => Err(SvarError::Media(format!("ffmpeg error: {e}"))),
    }
}

/// Queries the duration of a video file using ffprobe with JSON output.
async fn probe_duration(path: &Path) -> Result<f64> {
    let result = Command::new("ffprobe")
        .arg("-v").arg("quiet")
        .arg("-print_format").arg("json")
        .arg("-show_format")
        .arg(path)
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SvarError::ToolNotFound("ffprobe".into()));
        }
        Err(e) => {
            return Err(SvarError::Media(format!("ffprobe failed: {e}")));
        }
    };

    if !output.status.success() {
        return Err(SvarError::Media("ffprobe returned error".into()));
    }

    let json_str = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&json_str)
        .map_err(|_| SvarError::Media("Invalid ffprobe output".into()))?;

    parsed["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| SvarError::Media("Could not determine video duration".into()))
}
