use super::*;

fn wav_bytes(sample_rate: u32, channels: u16, frames: u32) -> Vec<u8> {
    let data_len = frames * u32::from(channels) * 2;
    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * u32::from(channels) * 2).to_le_bytes());
    out.extend_from_slice(&(channels * 2).to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for i in 0..frames {
        let v = if i % 2 == 0 { 8_000i16 } else { -8_000i16 };
        for _ in 0..channels {
            out.extend_from_slice(&v.to_le_bytes());
        }
    }
    out
}

#[test]
fn decodes_pcm_wav_at_native_rate() {
    let audio = decode_audio(wav_bytes(8_000, 1, 16_000), Some("wav")).unwrap();
    assert_eq!(audio.sample_rate, 8_000);
    assert_eq!(audio.channels, 1);
    assert_eq!(audio.frames(), 16_000);
    assert!((audio.duration_secs() - 2.0).abs() < 1e-9);
    assert_eq!(audio.duration(), Duration::from_secs(2));
}

#[test]
fn keeps_stereo_layout_interleaved() {
    let audio = decode_audio(wav_bytes(16_000, 2, 1_600), None).unwrap();
    assert_eq!(audio.channels, 2);
    assert_eq!(audio.interleaved_f32.len(), 3_200);
    assert_eq!(audio.frames(), 1_600);
    assert!(audio.interleaved_f32[0] > 0.0);
    assert_eq!(audio.interleaved_f32[0], audio.interleaved_f32[1]);
}

#[test]
fn garbage_bytes_are_decode_errors() {
    let err = decode_audio(b"definitely not audio at all".to_vec(), Some("mp3")).unwrap_err();
    assert!(matches!(err, ReelError::Decode(_)), "{err}");
}

#[test]
fn silent_container_without_samples_is_rejected() {
    let err = decode_audio(wav_bytes(8_000, 1, 0), Some("wav")).unwrap_err();
    assert!(matches!(err, ReelError::Decode(_)), "{err}");
}

#[test]
fn empty_decoded_audio_has_zero_duration() {
    let audio = DecodedAudio {
        sample_rate: 0,
        channels: 0,
        interleaved_f32: Vec::new(),
    };
    assert_eq!(audio.frames(), 0);
    assert_eq!(audio.duration_secs(), 0.0);
}
