//! Audio system managing looped track playback and spectrum analysis.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample};
use log::{error, info};

use super::fft::SpectrumAnalyzer;
use super::{AudioError, Track};
use crate::params::SpectrumConfig;
use crate::spectrum::{upsample, Spectrum, SpectrumSource};

/// Most recently played stereo frames, oldest first
struct History {
    left: VecDeque<f32>,
    right: VecDeque<f32>,
    capacity: usize,
}

impl History {
    fn new(capacity: usize) -> Self {
        Self {
            left: VecDeque::with_capacity(capacity),
            right: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, [l, r]: [f32; 2]) {
        if self.left.len() == self.capacity {
            self.left.pop_front();
            self.right.pop_front();
        }
        self.left.push_back(l);
        self.right.push_back(r);
    }

    fn len(&self) -> usize {
        self.left.len()
    }

    fn snapshot(&self) -> (Vec<f32>, Vec<f32>) {
        (
            self.left.iter().copied().collect(),
            self.right.iter().copied().collect(),
        )
    }
}

/// Playback state shared between the output callback and the render loop
struct Playback {
    track: Track,
    /// Fractional frame position in the track
    cursor: f64,
    /// Track frames consumed per output frame (`track_rate / device_rate`)
    step: f64,
    paused: bool,
    history: History,
}

impl Playback {
    fn new(track: Track, device_rate: u32, history_capacity: usize) -> Self {
        let step = track.sample_rate() as f64 / device_rate.max(1) as f64;
        Self {
            track,
            cursor: 0.0,
            step,
            paused: false,
            history: History::new(history_capacity),
        }
    }

    /// Next output frame, linearly interpolated and looping at the end of the track
    fn next_frame(&mut self) -> [f32; 2] {
        if self.paused {
            return [0.0, 0.0];
        }

        let frames = self.track.frames();
        let len = frames.len();
        let index = self.cursor as usize % len;
        let frac = (self.cursor - self.cursor.floor()) as f32;
        let [l0, r0] = frames[index];
        let [l1, r1] = frames[(index + 1) % len];
        let frame = [l0 + (l1 - l0) * frac, r0 + (r1 - r0) * frac];

        self.history.push(frame);

        self.cursor += self.step;
        if self.cursor >= len as f64 {
            self.cursor -= len as f64;
        }

        frame
    }
}

/// Write one stereo frame into a device frame of any channel count
fn write_frame<T: SizedSample + FromSample<f32>>(out: &mut [T], [l, r]: [f32; 2]) {
    match out.len() {
        0 => {}
        1 => out[0] = T::from_sample((l + r) * 0.5),
        _ => {
            out[0] = T::from_sample(l);
            out[1] = T::from_sample(r);
            for extra in &mut out[2..] {
                *extra = T::from_sample(0.0);
            }
        }
    }
}

/// Audio system managing track playback and FFT analysis
pub struct AudioSystem {
    playback: Arc<Mutex<Playback>>,

    analyzer: SpectrumAnalyzer,

    /// Audio output stream (kept alive)
    _stream: cpal::Stream,
}

impl AudioSystem {
    /// Start looping `track` on the default output device
    pub fn new(track: Track, config: &SpectrumConfig) -> Result<Self, AudioError> {
        config.validate().map_err(AudioError::InvalidConfig)?;

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;

        let supported = device.default_output_config()?;
        let device_rate = supported.sample_rate().0;

        info!(
            "Audio: {} @ {}Hz, {} channel(s), {:?}",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            device_rate,
            supported.channels(),
            supported.sample_format()
        );
        info!(
            "Track: {:.1}s @ {}Hz",
            track.duration_s(),
            track.sample_rate()
        );

        let playback = Arc::new(Mutex::new(Playback::new(
            track,
            device_rate,
            config.fft_size,
        )));

        let stream_config: cpal::StreamConfig = supported.config();
        let stream = match supported.sample_format() {
            SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, &playback)?,
            SampleFormat::F64 => build_stream::<f64>(&device, &stream_config, &playback)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, &playback)?,
            SampleFormat::I32 => build_stream::<i32>(&device, &stream_config, &playback)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, &playback)?,
            other => return Err(AudioError::UnsupportedSampleFormat(format!("{:?}", other))),
        };

        stream.play()?;

        Ok(Self {
            playback,
            analyzer: SpectrumAnalyzer::new(config.fft_size),
            _stream: stream,
        })
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    playback: &Arc<Mutex<Playback>>,
) -> Result<cpal::Stream, AudioError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let playback = Arc::clone(playback);

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let Ok(mut playback) = playback.lock() else {
                data.fill(T::EQUILIBRIUM);
                return;
            };
            for frame in data.chunks_mut(channels.max(1)) {
                let next = playback.next_frame();
                write_frame(frame, next);
            }
        },
        |err| error!("Audio stream error: {}", err),
        None,
    )?;

    Ok(stream)
}

impl SpectrumSource for AudioSystem {
    fn spectrum(&mut self, resolution: usize) -> Option<Spectrum> {
        let (left, right) = {
            let playback = self.playback.lock().ok()?;
            if playback.paused || playback.history.len() < self.analyzer.fft_size() {
                return None;
            }
            playback.history.snapshot()
        };

        let left = self.analyzer.analyze(&left)?;
        let right = self.analyzer.analyze(&right)?;
        upsample([&left, &right], resolution)
    }

    fn toggle_paused(&mut self) {
        if let Ok(mut playback) = self.playback.lock() {
            playback.paused = !playback.paused;
            info!(
                "Music {}",
                if playback.paused { "paused" } else { "playing" }
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_track(len: usize, rate: u32) -> Track {
        let frames = (0..len).map(|i| [i as f32, -(i as f32)]).collect();
        Track::from_frames(rate, frames).unwrap()
    }

    #[test]
    fn test_history_keeps_most_recent() {
        let mut history = History::new(3);
        for i in 0..5 {
            history.push([i as f32, 0.0]);
        }

        let (left, right) = history.snapshot();
        assert_eq!(left, vec![2.0, 3.0, 4.0]);
        assert_eq!(right.len(), 3);
    }

    #[test]
    fn test_playback_loops_at_end() {
        let mut playback = Playback::new(ramp_track(3, 44100), 44100, 16);

        let played: Vec<f32> = (0..7).map(|_| playback.next_frame()[0]).collect();
        assert_eq!(played, vec![0.0, 1.0, 2.0, 0.0, 1.0, 2.0, 0.0]);
        assert_eq!(playback.history.len(), 7);
    }

    #[test]
    fn test_playback_resamples_by_rate_ratio() {
        // Track at half the device rate: every other output frame is interpolated
        let mut playback = Playback::new(ramp_track(8, 22050), 44100, 16);

        let played: Vec<f32> = (0..4).map(|_| playback.next_frame()[0]).collect();
        assert_eq!(played, vec![0.0, 0.5, 1.0, 1.5]);
    }

    #[test]
    fn test_paused_playback_is_silent_and_still() {
        let mut playback = Playback::new(ramp_track(4, 44100), 44100, 16);
        playback.next_frame();
        playback.paused = true;

        assert_eq!(playback.next_frame(), [0.0, 0.0]);
        assert_eq!(playback.cursor, 1.0);
        assert_eq!(playback.history.len(), 1);
    }

    #[test]
    fn test_write_frame_layouts() {
        let mut mono = [0.0_f32; 1];
        write_frame(&mut mono, [0.5, 0.25]);
        assert_eq!(mono, [0.375]);

        let mut quad = [9.0_f32; 4];
        write_frame(&mut quad, [0.5, 0.25]);
        assert_eq!(quad, [0.5, 0.25, 0.0, 0.0]);

        let mut ints = [0_i16; 2];
        write_frame(&mut ints, [1.0, -1.0]);
        assert!(ints[0] > 32000);
        assert!(ints[1] < -32000);
    }
}
