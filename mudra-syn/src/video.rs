//! Video segment concatenation through an external `ffmpeg`

use crate::error::SynthesisError;
use mudra_core::VideoConfig;
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Lines of ffmpeg stderr kept in an encoding error
const STDERR_TAIL_LINES: usize = 12;

/// Joins clips in order with ffmpeg's concat demuxer, re-encoding to a fixed
/// frame rate
#[derive(Debug, Clone)]
pub struct VideoEncoder {
    ffmpeg: PathBuf,
    fps: u32,
}

impl Default for VideoEncoder {
    fn default() -> Self {
        Self::from_config(&VideoConfig::default())
    }
}

impl VideoEncoder {
    pub fn new(ffmpeg: impl Into<PathBuf>, fps: u32) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            fps,
        }
    }

    pub fn from_config(config: &VideoConfig) -> Self {
        Self::new(config.ffmpeg.clone(), config.fps)
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Whether `ffmpeg -version` runs successfully
    pub fn is_available(&self) -> bool {
        Command::new(&self.ffmpeg)
            .arg("-version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Concat demuxer list: one `file '<path>'` line per clip, with single
    /// quotes escaped the way the demuxer expects
    pub fn concat_list(clips: &[PathBuf]) -> String {
        clips
            .iter()
            .map(|clip| {
                let absolute = std::fs::canonicalize(clip).unwrap_or_else(|_| clip.clone());
                let escaped = absolute.to_string_lossy().replace('\'', r"'\''");
                format!("file '{}'\n", escaped)
            })
            .collect()
    }

    pub fn command_args(&self, list: &Path, output: &Path) -> Vec<OsString> {
        vec![
            "-y".into(),
            "-f".into(),
            "concat".into(),
            "-safe".into(),
            "0".into(),
            "-i".into(),
            list.as_os_str().to_os_string(),
            "-r".into(),
            self.fps.to_string().into(),
            "-pix_fmt".into(),
            "yuv420p".into(),
            output.as_os_str().to_os_string(),
        ]
    }

    /// Encode `clips`, in order, into `output`. The container is picked by
    /// ffmpeg from the output extension. The result is written next to
    /// `output` and renamed into place once ffmpeg succeeds.
    pub fn encode(&self, clips: &[PathBuf], output: &Path) -> Result<(), SynthesisError> {
        if clips.is_empty() {
            return Err(SynthesisError::Encoding("no clips to encode".to_string()));
        }

        let mut list = tempfile::Builder::new()
            .prefix("mudra-concat-")
            .suffix(".txt")
            .tempfile()?;
        list.write_all(Self::concat_list(clips).as_bytes())?;
        list.flush()?;

        let dir = match output.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let suffix = output
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let staged: NamedTempFile = tempfile::Builder::new()
            .prefix(".mudra-")
            .suffix(&suffix)
            .tempfile_in(dir)?;

        debug!(
            "Encoding {} clips at {} fps into {}",
            clips.len(),
            self.fps,
            output.display()
        );
        let result = Command::new(&self.ffmpeg)
            .args(self.command_args(list.path(), staged.path()))
            .output()
            .map_err(|e| {
                SynthesisError::Encoding(format!(
                    "failed to run {}: {}",
                    self.ffmpeg.display(),
                    e
                ))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let lines: Vec<&str> = stderr.lines().collect();
            let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n");
            return Err(SynthesisError::Encoding(format!(
                "ffmpeg exited with {}: {}",
                result.status, tail
            )));
        }

        staged
            .persist(output)
            .map_err(|e| SynthesisError::Encoding(format!("failed to move output: {}", e.error)))?;
        info!("Wrote {} ({} clips)", output.display(), clips.len());
        Ok(())
    }
}
