//! Per-frame two-channel magnitude snapshots and where they come from.

mod smoothing;

pub use smoothing::{upsample, MIN_RESOLUTION};

/// Left/right magnitudes at display resolution
///
/// Both channels always have the same, non-zero length and hold non-negative values.
#[derive(Clone, Debug, PartialEq)]
pub struct Spectrum {
    channels: [Vec<f32>; 2],
}

impl Spectrum {
    /// Build a snapshot from two equally long channels
    ///
    /// Negative or NaN magnitudes are stored as zero. Returns `None` for empty or
    /// mismatched channels.
    pub fn new(left: Vec<f32>, right: Vec<f32>) -> Option<Self> {
        if left.is_empty() || left.len() != right.len() {
            return None;
        }

        let sanitize = |mut ch: Vec<f32>| {
            ch.iter_mut().for_each(|v| *v = v.max(0.0));
            ch
        };

        Some(Self {
            channels: [sanitize(left), sanitize(right)],
        })
    }

    /// Bins per channel
    pub fn resolution(&self) -> usize {
        self.channels[0].len()
    }

    /// Raw bins of channel `channel % 2`
    pub fn channel(&self, channel: usize) -> &[f32] {
        &self.channels[channel % 2]
    }

    /// Magnitude at any signed index, wrapped into the channel
    pub fn sample(&self, channel: usize, index: isize) -> f32 {
        let bins = self.channel(channel);
        bins[index.rem_euclid(bins.len() as isize) as usize]
    }
}

/// Anything that can hand out a spectrum once per frame
///
/// `None` means no spectrum this frame; consumers draw undistorted shapes.
pub trait SpectrumSource {
    fn spectrum(&mut self, resolution: usize) -> Option<Spectrum>;

    /// Pause or resume whatever is producing the signal
    fn toggle_paused(&mut self) {}
}

/// A source that never has a spectrum (no audio device, `--mute`)
#[derive(Debug, Default, Clone, Copy)]
pub struct Silence;

impl SpectrumSource for Silence {
    fn spectrum(&mut self, _resolution: usize) -> Option<Spectrum> {
        None
    }
}

/// Replays one raw two-channel analysis every frame
#[derive(Debug, Clone)]
pub struct FixedSpectrum {
    left: Vec<f32>,
    right: Vec<f32>,
    paused: bool,
}

impl FixedSpectrum {
    pub fn new(left: Vec<f32>, right: Vec<f32>) -> Self {
        Self {
            left,
            right,
            paused: false,
        }
    }

    /// Same raw magnitude in every bin of both channels
    pub fn flat(bins: usize, magnitude: f32) -> Self {
        Self::new(vec![magnitude; bins], vec![magnitude; bins])
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

impl SpectrumSource for FixedSpectrum {
    fn spectrum(&mut self, resolution: usize) -> Option<Spectrum> {
        if self.paused {
            return None;
        }
        upsample([&self.left, &self.right], resolution)
    }

    fn toggle_paused(&mut self) {
        self.paused = !self.paused;
    }
}
