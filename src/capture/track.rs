use std::sync::Arc;
use std::time::Duration;

use crate::capture::graph::AudioGraph;
use crate::encode::sink::AudioInputConfig;
use crate::foundation::core::Fps;
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::frame::FrameRGBA;

/// Fixed-rate capture of a rendered frame.
///
/// The frame is static for the whole recording; every captured frame repeats the same committed
/// pixels.
#[derive(Clone, Debug)]
pub struct VideoTrack {
    frame: Arc<FrameRGBA>,
    fps: Fps,
    start: Duration,
}

impl VideoTrack {
    /// Start capturing `frame` at `fps`.
    pub fn capture(frame: FrameRGBA, fps: Fps) -> ReelResult<Self> {
        let fps = Fps::new(fps.num, fps.den)
            .map_err(|e| ReelError::stream(format!("invalid capture rate: {e}")))?;
        if frame.width == 0 || frame.height == 0 {
            return Err(ReelError::stream("cannot capture an empty frame"));
        }
        let expected = (frame.width as usize)
            .saturating_mul(frame.height as usize)
            .saturating_mul(4);
        if frame.data.len() != expected {
            return Err(ReelError::stream(format!(
                "frame buffer holds {} bytes, expected {expected} for {}x{}",
                frame.data.len(),
                frame.width,
                frame.height
            )));
        }
        Ok(Self {
            frame: Arc::new(frame),
            fps,
            start: Duration::ZERO,
        })
    }

    /// Captured frame.
    pub fn frame(&self) -> &FrameRGBA {
        &self.frame
    }

    /// Capture rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Presentation time of the first captured frame.
    pub fn start(&self) -> Duration {
        self.start
    }

    #[cfg(test)]
    pub(crate) fn delayed(mut self, by: Duration) -> Self {
        self.start += by;
        self
    }
}

/// PCM flowing out of an open [`AudioGraph`].
#[derive(Clone, Copy, Debug)]
pub struct AudioTrack<'g> {
    graph: &'g AudioGraph,
    start: Duration,
}

impl<'g> AudioTrack<'g> {
    pub(crate) fn new(graph: &'g AudioGraph) -> Self {
        Self {
            graph,
            start: Duration::ZERO,
        }
    }

    /// Length of the audio.
    pub fn duration(&self) -> Duration {
        self.graph.duration()
    }

    /// Presentation time of the first sample.
    pub fn start(&self) -> Duration {
        self.start
    }

    /// Encoder input description for this track.
    pub fn input_config(&self) -> AudioInputConfig {
        AudioInputConfig {
            path: self.graph.path().to_path_buf(),
            sample_rate: self.graph.sample_rate(),
            channels: self.graph.channels(),
        }
    }
}
