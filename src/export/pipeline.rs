use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::audio::decode::decode_audio;
use crate::audio::fetch::{AudioFetcher, decode_hint};
use crate::capture::graph::AudioGraph;
use crate::capture::stream::CombinedStream;
use crate::capture::track::VideoTrack;
use crate::content::model::PresentationContent;
use crate::encode::sink::StreamSink;
use crate::export::job::{ExportJob, ExportStatus};
use crate::export::notify::{Notice, Notifier};
use crate::export::package::{Download, package};
use crate::export::recorder::{Recorder, RecordingDeadline};
use crate::export::slot::ExportSlot;
use crate::foundation::core::Fps;
use crate::foundation::error::ReelResult;
use crate::render::frame::FrameSource;

/// Options for [`Exporter`].
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExportOpts {
    /// Capture rate of the video track.
    pub fps: Fps,
    /// Timeout for remote narration downloads.
    pub http_timeout: Duration,
}

impl Default for ExportOpts {
    fn default() -> Self {
        Self {
            fps: Fps::EXPORT,
            http_timeout: AudioFetcher::HTTP_TIMEOUT,
        }
    }
}

/// Outcome of a successful export.
#[derive(Clone, Debug)]
pub struct ExportReport {
    /// Where the download target put the file.
    pub path: PathBuf,
    /// Saved file name.
    pub file_name: String,
    /// Size of the saved file.
    pub bytes: usize,
    /// Frames recorded.
    pub frames: u64,
    /// Decoded narration length.
    pub audio_duration: Duration,
    /// Media time at which recording stopped.
    pub recorded_duration: Duration,
}

/// Runs the narrated video export for one presentation.
///
/// Stages run in order: render the frame, fetch and decode narration, capture and join the
/// tracks, record until the narration ends, package and save. Every outcome produces exactly one
/// notice.
pub struct Exporter {
    frames: Box<dyn FrameSource>,
    fetcher: AudioFetcher,
    slot: ExportSlot,
    notifier: Arc<dyn Notifier>,
    opts: ExportOpts,
    last_status: Option<ExportStatus>,
}

impl Exporter {
    /// Create an exporter drawing frames with `frames`.
    pub fn new(
        frames: Box<dyn FrameSource>,
        notifier: Arc<dyn Notifier>,
        opts: ExportOpts,
    ) -> Self {
        Self {
            frames,
            fetcher: AudioFetcher::with_timeout(opts.http_timeout),
            slot: ExportSlot::new(),
            notifier,
            opts,
            last_status: None,
        }
    }

    /// Share an existing slot instead of the exporter's own.
    pub fn with_slot(mut self, slot: ExportSlot) -> Self {
        self.slot = slot;
        self
    }

    /// Handle on the slot guarding this exporter. Views use it to show a busy state.
    pub fn slot(&self) -> ExportSlot {
        self.slot.clone()
    }

    /// Options in use.
    pub fn opts(&self) -> &ExportOpts {
        &self.opts
    }

    /// Final status of the most recent export, if one ran.
    pub fn last_status(&self) -> Option<ExportStatus> {
        self.last_status
    }

    /// Export `content` through `sink` and save the result with `download`.
    ///
    /// Fails fast with `ReelError::Busy` while another export holds the slot. Errors are not
    /// retried.
    #[tracing::instrument(skip_all, fields(title = %content.title))]
    pub fn export(
        &mut self,
        content: &PresentationContent,
        sink: &mut dyn StreamSink,
        download: &mut dyn Download,
    ) -> ReelResult<ExportReport> {
        let _guard = match self.slot.try_acquire() {
            Ok(guard) => guard,
            Err(e) => {
                tracing::warn!("export rejected: another export is in progress");
                self.notifier.notify(Notice::error("Busy", e.user_message()));
                return Err(e);
            }
        };

        let mut job = ExportJob::new();
        let result = self.run(&mut job, content, sink, download);
        match &result {
            Ok(report) => {
                tracing::info!(
                    path = %report.path.display(),
                    frames = report.frames,
                    audio_secs = report.audio_duration.as_secs_f64(),
                    "export complete"
                );
                self.notifier.notify(Notice::success(
                    "Video downloaded",
                    format!("Saved {}", report.file_name),
                ));
            }
            Err(e) => {
                let stage = job.status();
                job.fail();
                tracing::error!(stage = %stage, error = %e, "export failed");
                self.notifier.notify(Notice::error("Error", e.user_message()));
            }
        }
        self.last_status = Some(job.status());
        result
    }

    fn run(
        &mut self,
        job: &mut ExportJob,
        content: &PresentationContent,
        sink: &mut dyn StreamSink,
        download: &mut dyn Download,
    ) -> ReelResult<ExportReport> {
        content.validate()?;

        job.advance(ExportStatus::Rendering)?;
        let frame = self.frames.render_frame(content)?;

        job.advance(ExportStatus::Decoding)?;
        let bytes = self.fetcher.fetch(&content.audio)?;
        let hint = decode_hint(&content.audio);
        let audio = decode_audio(bytes, hint.as_deref())?;
        let deadline = RecordingDeadline::arm(audio.duration(), self.opts.fps)?;

        job.advance(ExportStatus::Capturing)?;
        let video = VideoTrack::capture(frame, self.opts.fps)?;
        let mut graph = AudioGraph::open(&audio)?;
        drop(audio);

        job.advance(ExportStatus::Recording)?;
        let chunks = {
            let stream = CombinedStream::compose(Some(video), Some(graph.track()?))?;
            Recorder.record(&stream, deadline, sink)?
        };
        graph.close()?;
        job.store_chunks(chunks)?;

        let artifact = package(&content.title, sink.container(), job.chunks())?;
        let path = download.save(&artifact)?;
        job.advance(ExportStatus::Complete)?;

        Ok(ExportReport {
            path,
            file_name: artifact.file_name,
            bytes: artifact.bytes.len(),
            frames: deadline.frames(),
            audio_duration: graph.duration(),
            recorded_duration: deadline.stop_at(),
        })
    }
}

impl std::fmt::Debug for Exporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exporter")
            .field("slot", &self.slot)
            .field("opts", &self.opts)
            .field("last_status", &self.last_status)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/pipeline.rs"]
mod tests;
