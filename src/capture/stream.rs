use std::time::Duration;

use crate::capture::track::{AudioTrack, VideoTrack};
use crate::encode::sink::SinkConfig;
use crate::foundation::error::{ReelError, ReelResult};

/// One video track and one audio track joined into a single recordable stream.
#[derive(Clone, Debug)]
pub struct CombinedStream<'g> {
    video: VideoTrack,
    audio: AudioTrack<'g>,
}

impl<'g> CombinedStream<'g> {
    /// Join the tracks.
    ///
    /// Both tracks are required. Their start times may differ by at most one frame interval.
    pub fn compose(video: Option<VideoTrack>, audio: Option<AudioTrack<'g>>) -> ReelResult<Self> {
        let video = video.ok_or_else(|| ReelError::stream("combined stream has no video track"))?;
        let audio = audio.ok_or_else(|| ReelError::stream("combined stream has no audio track"))?;

        let stream = Self { video, audio };
        let skew = stream.start_skew();
        let interval = stream.video.fps().frame_interval();
        if skew > interval {
            return Err(ReelError::stream(format!(
                "track start skew {:.3}s exceeds one frame ({:.3}s)",
                skew.as_secs_f64(),
                interval.as_secs_f64()
            )));
        }
        Ok(stream)
    }

    /// Video track.
    pub fn video(&self) -> &VideoTrack {
        &self.video
    }

    /// Audio track.
    pub fn audio(&self) -> &AudioTrack<'g> {
        &self.audio
    }

    /// Absolute difference between the tracks' start times.
    pub fn start_skew(&self) -> Duration {
        self.video.start().abs_diff(self.audio.start())
    }

    /// Configuration handed to a sink when recording this stream.
    pub fn sink_config(&self) -> SinkConfig {
        let frame = self.video.frame();
        SinkConfig {
            width: frame.width,
            height: frame.height,
            fps: self.video.fps(),
            audio: Some(self.audio.input_config()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/stream.rs"]
mod tests;
