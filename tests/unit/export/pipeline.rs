use super::*;
use crate::content::model::{AudioLocator, Difficulty};
use crate::encode::sink::InMemorySink;
use crate::export::notify::{NoticeLevel, RecordingNotifier};
use crate::export::package::InMemoryDownload;
use crate::foundation::error::ReelError;
use crate::render::frame::FrameRGBA;
use std::io::{Read as _, Write as _};
use std::sync::atomic::{AtomicUsize, Ordering};

struct SolidFrames {
    calls: Arc<AtomicUsize>,
}

impl FrameSource for SolidFrames {
    fn render_frame(&mut self, _content: &PresentationContent) -> ReelResult<FrameRGBA> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(FrameRGBA {
            width: 16,
            height: 8,
            data: vec![200; 16 * 8 * 4],
            premultiplied: true,
        })
    }
}

fn exporter() -> (Exporter, RecordingNotifier, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let notifier = RecordingNotifier::new();
    let exporter = Exporter::new(
        Box::new(SolidFrames {
            calls: Arc::clone(&calls),
        }),
        Arc::new(notifier.clone()),
        ExportOpts::default(),
    );
    (exporter, notifier, calls)
}

fn wav_bytes(sample_rate: u32, secs: u32) -> Vec<u8> {
    let frames = sample_rate * secs;
    let data_len = frames * 2;
    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVEfmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.resize(44 + data_len as usize, 0);
    out
}

fn photosynthesis(audio: AudioLocator) -> PresentationContent {
    let summary = (0..250)
        .map(|i| format!("chlorophyll{i}"))
        .collect::<Vec<_>>()
        .join(" ");
    PresentationContent {
        title: "Photosynthesis".to_string(),
        summary,
        key_points: vec!["Light reactions".to_string(), "Calvin cycle".to_string()],
        difficulty: Difficulty::Grade9To10,
        audio,
    }
}

#[test]
fn exports_one_artifact_bounded_by_the_narration() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("narration.wav");
    std::fs::write(&wav, wav_bytes(8_000, 42)).unwrap();

    let (mut exporter, notifier, calls) = exporter();
    let mut sink = InMemorySink::new();
    let mut download = InMemoryDownload::new();
    let report = exporter
        .export(
            &photosynthesis(AudioLocator::File(wav)),
            &mut sink,
            &mut download,
        )
        .unwrap();

    assert_eq!(report.file_name, "Photosynthesis.mp4");
    assert_eq!(report.audio_duration, Duration::from_secs(42));
    assert_eq!(report.frames, 1_260);
    assert!((report.recorded_duration.as_secs_f64() - 42.0).abs() <= 1.0 / 30.0);
    assert!((sink.recorded_secs() - 42.0).abs() <= 1.0 / 30.0);

    assert_eq!(download.saved().len(), 1);
    assert_eq!(download.saved()[0].bytes.len(), report.bytes);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(exporter.last_status(), Some(ExportStatus::Complete));
    assert!(!exporter.slot().is_busy());

    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Success);
    assert!(notices[0].description.contains("Photosynthesis.mp4"));
}

#[test]
fn missing_narration_fails_before_recording() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        stream
            .write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
            .unwrap();
    });

    let (mut exporter, notifier, _) = exporter();
    let mut sink = InMemorySink::new();
    let mut download = InMemoryDownload::new();
    let audio = AudioLocator::Http(format!("http://{addr}/tts/narration.mp3"));
    let err = exporter
        .export(&photosynthesis(audio), &mut sink, &mut download)
        .unwrap_err();

    assert!(matches!(err, ReelError::Fetch(_)), "{err}");
    assert_eq!(exporter.last_status(), Some(ExportStatus::Failed));
    assert!(download.saved().is_empty());
    assert!(sink.config().is_none());
    assert!(sink.frames().is_empty());

    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert!(notices[0].description.contains("narration"));
}

#[test]
fn undecodable_narration_is_a_decode_failure() {
    let (mut exporter, notifier, _) = exporter();
    let mut sink = InMemorySink::new();
    let mut download = InMemoryDownload::new();
    let audio = AudioLocator::DataUrl {
        mime: "audio/mpeg".to_string(),
        bytes: b"this is not an mp3".to_vec(),
    };
    let err = exporter
        .export(&photosynthesis(audio), &mut sink, &mut download)
        .unwrap_err();

    assert!(matches!(err, ReelError::Decode(_)), "{err}");
    assert_eq!(exporter.last_status(), Some(ExportStatus::Failed));
    assert!(download.saved().is_empty());
    assert_eq!(notifier.notices().len(), 1);
}

#[test]
fn concurrent_export_is_rejected_without_rendering() {
    let (mut exporter, notifier, calls) = exporter();
    let slot = exporter.slot();
    let _in_flight = slot.try_acquire().unwrap();
    assert!(slot.is_busy());

    let mut sink = InMemorySink::new();
    let mut download = InMemoryDownload::new();
    let audio = AudioLocator::File("unused.wav".into());
    let err = exporter
        .export(&photosynthesis(audio), &mut sink, &mut download)
        .unwrap_err();

    assert!(matches!(err, ReelError::Busy));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(exporter.last_status(), None);
    assert!(download.saved().is_empty());
    assert_eq!(notifier.notices().len(), 1);
}

#[test]
fn empty_presentation_is_rejected() {
    let (mut exporter, _, calls) = exporter();
    let content = PresentationContent {
        title: " ".to_string(),
        summary: String::new(),
        key_points: Vec::new(),
        difficulty: Difficulty::General,
        audio: AudioLocator::File("unused.wav".into()),
    };
    let err = exporter
        .export(&content, &mut InMemorySink::new(), &mut InMemoryDownload::new())
        .unwrap_err();
    assert!(matches!(err, ReelError::Validation(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(exporter.last_status(), Some(ExportStatus::Failed));
}

/// Accepts `fail_at` frames, then reports a write failure.
struct BrokenPipeSink {
    inner: InMemorySink,
    fail_at: u64,
    audio_path: Option<std::path::PathBuf>,
    audio_existed: bool,
}

impl crate::encode::sink::StreamSink for BrokenPipeSink {
    fn container(&self) -> crate::encode::sink::Container {
        self.inner.container()
    }

    fn begin(&mut self, cfg: crate::encode::sink::SinkConfig) -> ReelResult<()> {
        if let Some(audio) = &cfg.audio {
            self.audio_existed = audio.path.is_file();
            self.audio_path = Some(audio.path.clone());
        }
        self.inner.begin(cfg)
    }

    fn push_frame(
        &mut self,
        idx: crate::foundation::core::FrameIndex,
        frame: &FrameRGBA,
    ) -> ReelResult<()> {
        if idx.0 >= self.fail_at {
            return Err(ReelError::recording("encoder pipe closed"));
        }
        self.inner.push_frame(idx, frame)
    }

    fn end(&mut self) -> ReelResult<Vec<Vec<u8>>> {
        self.inner.end()
    }
}

#[test]
fn recording_failure_fails_the_job_and_releases_the_audio_graph() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("narration.wav");
    std::fs::write(&wav, wav_bytes(8_000, 3)).unwrap();

    let (mut exporter, notifier, _) = exporter();
    let mut sink = BrokenPipeSink {
        inner: InMemorySink::new(),
        fail_at: 45,
        audio_path: None,
        audio_existed: false,
    };
    let mut download = InMemoryDownload::new();
    let err = exporter
        .export(
            &photosynthesis(AudioLocator::File(wav)),
            &mut sink,
            &mut download,
        )
        .unwrap_err();

    assert!(matches!(err, ReelError::Recording(_)), "{err}");
    assert_eq!(exporter.last_status(), Some(ExportStatus::Failed));
    assert!(download.saved().is_empty());
    assert_eq!(sink.inner.frames().len(), 45);
    assert!(!exporter.slot().is_busy());

    let scratch = sink.audio_path.expect("sink saw the audio input");
    assert!(sink.audio_existed);
    assert!(!scratch.exists(), "{} was left behind", scratch.display());
    let name = scratch.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("lesson-reel-audio-") && name.ends_with(".f32le"));

    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
}
