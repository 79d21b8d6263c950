use std::time::Duration;

use crate::capture::stream::CombinedStream;
use crate::encode::sink::StreamSink;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};

/// Stop point of a recording, expressed in frames.
///
/// Armed from the decoded narration length. Rounding to the nearest frame keeps the recorded
/// length within half a frame of the narration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordingDeadline {
    frames: u64,
    fps: Fps,
}

impl RecordingDeadline {
    /// Deadline for `duration` of media captured at `fps`.
    pub fn arm(duration: Duration, fps: Fps) -> ReelResult<Self> {
        let fps = Fps::new(fps.num, fps.den)?;
        if duration.is_zero() {
            return Err(ReelError::recording("recording duration must be > 0"));
        }
        let frames = fps.secs_to_frames_round(duration.as_secs_f64()).max(1);
        Ok(Self { frames, fps })
    }

    /// Number of frames to record.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Capture rate the deadline was armed for.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Media time at which recording stops.
    pub fn stop_at(&self) -> Duration {
        Duration::from_secs_f64(self.fps.frames_to_secs(self.frames))
    }

    /// Whether frame `idx` lies past the stop point.
    pub fn is_reached(&self, idx: FrameIndex) -> bool {
        idx.0 >= self.frames
    }
}

/// Drives a [`StreamSink`] over a combined stream until a deadline.
#[derive(Debug, Default)]
pub struct Recorder;

impl Recorder {
    /// Record `stream` into `sink` and return the sink's fragments in order.
    ///
    /// The sink is always ended once it has begun, even when a frame push fails.
    #[tracing::instrument(skip_all, fields(frames = deadline.frames()))]
    pub fn record(
        &self,
        stream: &CombinedStream<'_>,
        deadline: RecordingDeadline,
        sink: &mut dyn StreamSink,
    ) -> ReelResult<Vec<Vec<u8>>> {
        if deadline.fps() != stream.video().fps() {
            return Err(ReelError::recording(
                "deadline was armed for a different capture rate",
            ));
        }

        sink.begin(stream.sink_config())?;
        let frame = stream.video().frame();
        let mut idx = FrameIndex(0);
        while !deadline.is_reached(idx) {
            if let Err(e) = sink.push_frame(idx, frame) {
                if let Err(end_err) = sink.end() {
                    tracing::debug!(error = %end_err, "sink end after failed push");
                }
                return Err(e);
            }
            idx = FrameIndex(idx.0 + 1);
        }
        let fragments = sink.end()?;
        tracing::info!(
            frames = idx.0,
            stop_at_secs = deadline.stop_at().as_secs_f64(),
            fragments = fragments.len(),
            "recording stopped"
        );
        Ok(fragments)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/recorder.rs"]
mod tests;
