use crate::audio::AudioError;

/// Narration audio comes back as raw 16-bit little-endian PCM.
pub const SAMPLE_RATE: u32 = 24_000;
pub const CHANNELS: u16 = 1;

/// Decoded narration, ready for the output device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmClip {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl PcmClip {
    pub fn duration_secs(&self) -> f32 {
        let frames = self.samples.len() / self.channels.max(1) as usize;
        frames as f32 / self.sample_rate as f32
    }
}

/// A trailing odd byte cannot form a sample and is dropped.
pub fn decode_pcm16(bytes: &[u8]) -> Result<PcmClip, AudioError> {
    let samples: Vec<i16> = bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    if samples.is_empty() {
        return Err(AudioError::EmptyPcm);
    }

    Ok(PcmClip {
        samples,
        sample_rate: SAMPLE_RATE,
        channels: CHANNELS,
    })
}
