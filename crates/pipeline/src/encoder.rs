//! WAV encoding
//!
//! Converts a floating-point waveform into an in-memory mono 16-bit PCM
//! RIFF/WAVE container at the waveform's own sample rate.

use std::io::Cursor;

use aksa_tts_core::{AudioError, Waveform};
use bytes::Bytes;

/// Multiplier mapping `[-1.0, 1.0]` onto the `i16` range
pub const PCM_SCALE: f32 = 32767.0;

const BITS_PER_SAMPLE: u16 = 16;
const CHANNELS: u16 = 1;

/// Scale one sample to 16-bit PCM
///
/// Truncates toward zero. Out-of-range input saturates at the `i16`
/// bounds and NaN maps to 0 (float-to-int `as` semantics).
#[inline]
pub fn float_to_pcm16(sample: f32) -> i16 {
    (sample * PCM_SCALE) as i16
}

/// An encoded WAV payload owned by a single request
#[derive(Debug, Clone)]
pub struct EncodedAudio {
    bytes: Bytes,
    sample_rate: u32,
    num_samples: usize,
}

impl EncodedAudio {
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.num_samples as f64 / self.sample_rate as f64
    }
}

/// Encode `waveform` as a mono 16-bit WAV file in memory
pub fn encode_wav(waveform: &Waveform) -> Result<EncodedAudio, AudioError> {
    if waveform.sample_rate() == 0 {
        return Err(AudioError::InvalidFormat(
            "sample rate must be greater than zero".to_string(),
        ));
    }

    let spec = hound::WavSpec {
        channels: CHANNELS,
        sample_rate: waveform.sample_rate(),
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(44 + waveform.len() * 2));
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| AudioError::Codec(e.to_string()))?;

        let mut samples = writer.get_i16_writer(waveform.len() as u32);
        for &sample in waveform.samples() {
            samples.write_sample(float_to_pcm16(sample));
        }
        samples
            .flush()
            .map_err(|e| AudioError::Codec(e.to_string()))?;

        writer
            .finalize()
            .map_err(|e| AudioError::Codec(e.to_string()))?;
    }

    Ok(EncodedAudio {
        bytes: Bytes::from(cursor.into_inner()),
        sample_rate: waveform.sample_rate(),
        num_samples: waveform.len(),
    })
}
