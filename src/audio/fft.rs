//! Windowed FFT magnitude analysis.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Forward FFT over the most recent `fft_size` samples of one channel
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
}

impl SpectrumAnalyzer {
    /// `fft_size` should be a power of two (`SpectrumConfig::validate` checks this)
    pub fn new(fft_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let window = (0..fft_size).map(|i| hann_window(i, fft_size)).collect();

        Self {
            fft,
            window,
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
        }
    }

    pub fn fft_size(&self) -> usize {
        self.window.len()
    }

    /// Magnitudes `2|X_k| / N` of the first `N / 2` bins
    ///
    /// Uses the last `N` samples; returns `None` if fewer are available.
    pub fn analyze(&mut self, samples: &[f32]) -> Option<Vec<f32>> {
        let size = self.fft_size();
        if size == 0 || samples.len() < size {
            return None;
        }

        let recent = &samples[samples.len() - size..];
        for ((slot, &sample), &w) in self.buffer.iter_mut().zip(recent).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }

        self.fft.process(&mut self.buffer);

        let norm = 2.0 / size as f32;
        Some(self.buffer[..size / 2].iter().map(|c| c.norm() * norm).collect())
    }
}

/// Hann window function for FFT analysis
pub fn hann_window(index: usize, size: usize) -> f32 {
    0.5 * (1.0 - ((2.0 * PI * index as f32) / (size as f32 - 1.0)).cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hann_window() {
        let size = 1024;

        // Hann window should be 0 at edges, 1 at center
        assert!((hann_window(0, size) - 0.0).abs() < 0.01);
        assert!((hann_window(size - 1, size) - 0.0).abs() < 0.01);
        assert!((hann_window(size / 2, size) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_sine_peaks_at_its_bin() {
        let size = 1024;
        let bin = 32;
        let samples: Vec<f32> = (0..size)
            .map(|i| (2.0 * PI * bin as f32 * i as f32 / size as f32).sin())
            .collect();

        let mut analyzer = SpectrumAnalyzer::new(size);
        let magnitudes = analyzer.analyze(&samples).unwrap();

        assert_eq!(magnitudes.len(), size / 2);
        let peak = magnitudes
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, bin);

        // Hann window halves a unit sine's amplitude
        assert!((magnitudes[bin] - 0.5).abs() < 0.05);
        assert!(magnitudes[bin + 10] < 0.01);
    }

    #[test]
    fn test_uses_most_recent_samples() {
        let mut analyzer = SpectrumAnalyzer::new(256);

        let mut samples = vec![1.0; 256];
        samples.extend(std::iter::repeat(0.0).take(256));

        let magnitudes = analyzer.analyze(&samples).unwrap();
        assert!(magnitudes.iter().all(|&m| m == 0.0));
    }

    #[test]
    fn test_too_few_samples_unavailable() {
        let mut analyzer = SpectrumAnalyzer::new(2048);
        assert!(analyzer.analyze(&[0.0; 100]).is_none());
    }
}
