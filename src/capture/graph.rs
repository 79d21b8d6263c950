use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::audio::decode::DecodedAudio;
use crate::capture::track::AudioTrack;
use crate::foundation::error::{ReelError, ReelResult};

/// Routes decoded PCM into a stream destination the encoder can read.
///
/// The destination is an interleaved `f32le` scratch file. It exists for exactly as long as the
/// graph is open: [`AudioGraph::close`] or dropping the graph removes it.
pub struct AudioGraph {
    scratch: Option<tempfile::NamedTempFile>,
    path: PathBuf,
    sample_rate: u32,
    channels: u16,
    duration: Duration,
}

impl std::fmt::Debug for AudioGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioGraph")
            .field("path", &self.path)
            .field("sample_rate", &self.sample_rate)
            .field("channels", &self.channels)
            .field("duration", &self.duration)
            .field("open", &self.is_open())
            .finish()
    }
}

impl AudioGraph {
    /// Write `audio` into a fresh scratch destination.
    #[tracing::instrument(skip_all, fields(sample_rate = audio.sample_rate, channels = audio.channels))]
    pub fn open(audio: &DecodedAudio) -> ReelResult<Self> {
        if audio.sample_rate == 0 || audio.channels == 0 {
            return Err(ReelError::stream(
                "audio graph needs a non-zero sample rate and channel count",
            ));
        }
        if audio.frames() == 0 {
            return Err(ReelError::stream("audio graph needs at least one sample"));
        }

        let mut scratch = tempfile::Builder::new()
            .prefix("lesson-reel-audio-")
            .suffix(".f32le")
            .tempfile()
            .map_err(|e| ReelError::stream(format!("failed to create audio scratch file: {e}")))?;

        {
            let mut w = std::io::BufWriter::new(scratch.as_file_mut());
            for s in &audio.interleaved_f32 {
                w.write_all(&s.to_le_bytes())
                    .map_err(|e| ReelError::stream(format!("failed to write audio samples: {e}")))?;
            }
            w.flush()
                .map_err(|e| ReelError::stream(format!("failed to flush audio samples: {e}")))?;
        }

        let path = scratch.path().to_path_buf();
        tracing::debug!(path = %path.display(), "audio graph opened");
        Ok(Self {
            scratch: Some(scratch),
            path,
            sample_rate: audio.sample_rate,
            channels: audio.channels,
            duration: audio.duration(),
        })
    }

    /// Location of the PCM destination.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sample rate of the routed PCM.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel count of the routed PCM.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Length of the routed PCM.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Whether the destination still exists.
    pub fn is_open(&self) -> bool {
        self.scratch.is_some()
    }

    /// Audio track reading from this graph.
    pub fn track(&self) -> ReelResult<AudioTrack<'_>> {
        if !self.is_open() {
            return Err(ReelError::stream("audio graph is closed"));
        }
        Ok(AudioTrack::new(self))
    }

    /// Release the destination. Closing twice is a no-op.
    pub fn close(&mut self) -> ReelResult<()> {
        if let Some(scratch) = self.scratch.take() {
            scratch
                .close()
                .map_err(|e| ReelError::stream(format!("failed to remove audio scratch file: {e}")))?;
            tracing::debug!(path = %self.path.display(), "audio graph closed");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/graph.rs"]
mod tests;
