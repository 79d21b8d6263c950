use super::*;
use crate::encode::sink::AudioInputConfig;

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::EXPORT,
        audio: None,
    }
}

fn args(cmd: &Command) -> Vec<String> {
    cmd.get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

#[test]
fn flatten_premul_alpha_0_returns_bg() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, true, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_premul_alpha_255_is_identity() {
    let src = vec![1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, true, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn flatten_straight_over_black_produces_expected_rgb() {
    let src = vec![255u8, 0, 0, 128];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, false, [0, 0, 0, 255]).unwrap();
    assert_eq!(dst, vec![128, 0, 0, 255]);
}

#[test]
fn flatten_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(flatten_to_opaque_rgba8(&mut dst, &[0u8; 4], true, [0, 0, 0, 255]).is_err());
}

#[test]
fn mp4_command_writes_fragmented_mp4_to_stdout() {
    let sink = FfmpegSink::new(FfmpegSinkOpts::default());
    let mut c = cfg(1920, 1080);
    c.audio = Some(AudioInputConfig {
        path: "narration.f32le".into(),
        sample_rate: 44_100,
        channels: 2,
    });
    let a = args(&sink.command(&c).unwrap());
    let joined = a.join(" ");

    assert!(joined.contains("-s 1920x1080"));
    assert!(joined.contains("-r 30/1 -i pipe:0"));
    assert!(joined.contains("-f f32le -ar 44100 -ac 2 -i narration.f32le"));
    assert!(joined.contains("-c:v libx264"));
    assert!(joined.contains("-c:a aac"));
    assert!(joined.contains("frag_keyframe+empty_moov+default_base_moof"));
    assert!(joined.contains("-shortest"));
    assert_eq!(a.last().map(String::as_str), Some("pipe:1"));
}

#[test]
fn webm_command_uses_vp9_and_opus() {
    let sink = FfmpegSink::new(FfmpegSinkOpts::new(Container::Webm));
    let mut c = cfg(640, 360);
    c.audio = Some(AudioInputConfig {
        path: "narration.f32le".into(),
        sample_rate: 24_000,
        channels: 1,
    });
    let joined = args(&sink.command(&c).unwrap()).join(" ");
    assert!(joined.contains("-c:v libvpx-vp9"));
    assert!(joined.contains("-c:a libopus"));
    assert!(joined.contains("-f webm"));
    assert!(!joined.contains("movflags"));
}

#[test]
fn silent_command_disables_audio() {
    let sink = FfmpegSink::new(FfmpegSinkOpts::default());
    let a = args(&sink.command(&cfg(64, 64)).unwrap());
    assert!(a.iter().any(|x| x == "-an"));
    assert!(!a.iter().any(|x| x == "-shortest"));
}

#[test]
fn begin_rejects_odd_or_empty_sizes() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::default());
    assert!(matches!(
        sink.begin(cfg(0, 64)).unwrap_err(),
        ReelError::Validation(_)
    ));
    assert!(matches!(
        sink.begin(cfg(63, 64)).unwrap_err(),
        ReelError::Validation(_)
    ));
}

#[test]
fn push_and_end_before_begin_are_recording_errors() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::default());
    let frame = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 16],
        premultiplied: true,
    };
    assert!(matches!(
        sink.push_frame(FrameIndex(0), &frame).unwrap_err(),
        ReelError::Recording(_)
    ));
    assert!(matches!(sink.end().unwrap_err(), ReelError::Recording(_)));
}
