use std::path::PathBuf;
use std::str::FromStr;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::frame::FrameRGBA;

/// Compressed container produced by a recording.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    /// Fragmented MP4 with H.264 video and AAC audio.
    #[default]
    Mp4,
    /// WebM with VP9 video and Opus audio.
    Webm,
}

impl Container {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
        }
    }

    /// Media type of the container.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Mp4 => "video/mp4",
            Self::Webm => "video/webm",
        }
    }
}

impl FromStr for Container {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mp4" => Ok(Self::Mp4),
            "webm" => Ok(Self::Webm),
            other => Err(ReelError::validation(format!(
                "unknown container '{other}' (expected mp4 or webm)"
            ))),
        }
    }
}

impl std::fmt::Display for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Configuration provided to a [`StreamSink`] when a recording starts.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Capture rate.
    pub fps: Fps,
    /// Raw PCM input muxed alongside the frames.
    pub audio: Option<AudioInputConfig>,
}

/// Raw PCM audio input for sinks that encode audio.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioInputConfig {
    /// Path to interleaved `f32le` PCM data.
    pub path: PathBuf,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
}

/// Consumer of a combined stream that produces container fragments.
///
/// `push_frame` is called in strictly increasing `FrameIndex` order between one `begin` and one
/// `end`. `end` returns every fragment written, in order.
pub trait StreamSink: Send {
    /// Container this sink writes.
    fn container(&self) -> Container;
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()>;
    /// Finish the recording and hand back its fragments.
    fn end(&mut self) -> ReelResult<Vec<Vec<u8>>>;
}

/// In-memory sink for tests and dry runs.
///
/// It keeps the index of every pushed frame and emits one small fragment per second of
/// captured frames instead of encoded video.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    container: Container,
    frames: Vec<FrameIndex>,
    fragments: Vec<Vec<u8>>,
}

impl InMemorySink {
    /// Create a new in-memory sink labelled as MP4.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink labelled with `container`.
    pub fn with_container(container: Container) -> Self {
        Self {
            container,
            ..Self::default()
        }
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Indices of the pushed frames.
    pub fn frames(&self) -> &[FrameIndex] {
        &self.frames
    }

    /// Seconds covered by the pushed frames.
    pub fn recorded_secs(&self) -> f64 {
        self.cfg
            .as_ref()
            .map(|c| c.fps.frames_to_secs(self.frames.len() as u64))
            .unwrap_or(0.0)
    }
}

impl StreamSink for InMemorySink {
    fn container(&self) -> Container {
        self.container
    }

    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.fragments.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, _frame: &FrameRGBA) -> ReelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReelError::recording("in-memory sink not started"))?;
        let per_fragment = u64::from(cfg.fps.num.div_ceil(cfg.fps.den).max(1));
        if self.frames.len() as u64 % per_fragment == 0 {
            self.fragments.push(Vec::new());
        }
        if let Some(fragment) = self.fragments.last_mut() {
            fragment.extend_from_slice(&idx.0.to_le_bytes());
        }
        self.frames.push(idx);
        Ok(())
    }

    fn end(&mut self) -> ReelResult<Vec<Vec<u8>>> {
        if self.cfg.is_none() {
            return Err(ReelError::recording("in-memory sink not started"));
        }
        Ok(std::mem::take(&mut self.fragments))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
