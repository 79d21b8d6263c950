//! lesson-reel turns a study presentation into a narrated video file.
//!
//! A presentation (title, summary, difficulty label and a narration clip) is drawn once onto a
//! 1920x1080 frame, the narration is fetched and decoded, and the still frame plus the audio are
//! recorded into an MP4 or WebM container for exactly the length of the narration:
//!
//! - Build [`PresentationContent`] directly, from JSON, or from a summarization reply
//! - Render it with a [`FrameRenderer`]
//! - Hand both to an [`Exporter`] together with a [`StreamSink`] and a [`Download`] target
//!
//! The [`PlaybackController`] models the play/pause/mute transport shown next to the
//! presentation and is independent of exports.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod audio;
pub(crate) mod capture;
pub(crate) mod content;
pub(crate) mod encode;
pub(crate) mod export;
pub(crate) mod layout;
pub(crate) mod playback;
pub(crate) mod render;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Rect, Rgba8};
pub use crate::foundation::error::{ReelError, ReelResult};

pub use crate::content::model::{AudioLocator, Difficulty, PresentationContent};
pub use crate::content::reply::{FALLBACK_TITLE, extract_json_block};

pub use crate::layout::frame::{FrameLayout, FrameStyle, TextLine, layout_frame};
pub use crate::layout::wrap::{TextMeasure, wrap_words};
pub use crate::render::frame::{FrameRGBA, FrameRenderer, FrameSource};
pub use crate::render::text::{TextBrushRgba8, TextLayoutEngine};

pub use crate::audio::decode::{DecodedAudio, decode_audio};
pub use crate::audio::fetch::{AudioFetcher, decode_hint};

pub use crate::capture::graph::AudioGraph;
pub use crate::capture::stream::CombinedStream;
pub use crate::capture::track::{AudioTrack, VideoTrack};

pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{AudioInputConfig, Container, InMemorySink, SinkConfig, StreamSink};

pub use crate::export::job::{ExportJob, ExportStatus};
pub use crate::export::notify::{LogNotifier, Notice, NoticeLevel, Notifier, RecordingNotifier};
pub use crate::export::package::{
    Artifact, DirectoryDownload, Download, InMemoryDownload, package, sanitize_file_name,
};
pub use crate::export::pipeline::{ExportOpts, ExportReport, Exporter};
pub use crate::export::recorder::{Recorder, RecordingDeadline};
pub use crate::export::slot::{ExportSlot, SlotGuard};

pub use crate::playback::controller::{
    ListenerGuard, MediaElement, MediaEvent, MediaEvents, PlaybackController, PlaybackState,
    format_time,
};
