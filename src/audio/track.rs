//! Decoded music track.

use std::io::Read;
use std::path::Path;

use hound::{SampleFormat, WavReader};

use super::AudioError;

/// A whole track decoded to stereo `f32` frames in `[-1, 1]`
#[derive(Debug, Clone)]
pub struct Track {
    sample_rate: u32,
    frames: Vec<[f32; 2]>,
}

impl Track {
    /// Decode a WAV file (integer or float PCM, mono or stereo)
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AudioError> {
        let reader = WavReader::open(path)?;
        Self::from_reader(reader)
    }

    pub fn from_reader<R: Read>(reader: WavReader<R>) -> Result<Self, AudioError> {
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<_, _>>()?,
            SampleFormat::Int => {
                let scale = 1.0 / (1_i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<Result<_, _>>()?
            }
        };

        let frames: Vec<[f32; 2]> = match spec.channels {
            1 => samples.iter().map(|&s| [s, s]).collect(),
            2 => samples.chunks_exact(2).map(|lr| [lr[0], lr[1]]).collect(),
            n => return Err(AudioError::UnsupportedChannels(n)),
        };

        Self::from_frames(spec.sample_rate, frames)
    }

    /// Wrap already decoded stereo frames
    pub fn from_frames(sample_rate: u32, frames: Vec<[f32; 2]>) -> Result<Self, AudioError> {
        if frames.is_empty() || sample_rate == 0 {
            return Err(AudioError::EmptyTrack);
        }
        Ok(Self {
            sample_rate,
            frames,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames(&self) -> &[[f32; 2]] {
        &self.frames
    }

    pub fn duration_s(&self) -> f32 {
        self.frames.len() as f32 / self.sample_rate as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};

    fn write_wav(path: &Path, channels: u16, samples: &[i16]) {
        let spec = WavSpec {
            channels,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_mono_is_duplicated_and_scaled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mono.wav");
        write_wav(&path, 1, &[0, 16384, -32768]);

        let track = Track::load(&path).unwrap();

        assert_eq!(track.sample_rate(), 8000);
        assert_eq!(track.frames().len(), 3);
        assert_eq!(track.frames()[1], [0.5, 0.5]);
        assert_eq!(track.frames()[2], [-1.0, -1.0]);
    }

    #[test]
    fn test_stereo_frames_keep_channels_apart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_wav(&path, 2, &[8192, -8192, 0, 16384]);

        let track = Track::load(&path).unwrap();

        assert_eq!(track.frames(), &[[0.25, -0.25], [0.0, 0.5]]);
        assert!((track.duration_s() - 2.0 / 8000.0).abs() < 1e-9);
    }

    #[test]
    fn test_surround_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("surround.wav");
        write_wav(&path, 3, &[0, 0, 0]);

        assert!(matches!(
            Track::load(&path),
            Err(AudioError::UnsupportedChannels(3))
        ));
    }

    #[test]
    fn test_empty_and_missing_files_fail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.wav");
        write_wav(&path, 2, &[]);

        assert!(matches!(Track::load(&path), Err(AudioError::EmptyTrack)));
        assert!(matches!(
            Track::load(dir.path().join("missing.wav")),
            Err(AudioError::Wav(_))
        ));
    }
}
