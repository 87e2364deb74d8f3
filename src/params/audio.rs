//! Audio analysis configuration.

use crate::spectrum::MIN_RESOLUTION;

/// Spectrum analysis configuration
#[derive(Debug, Clone)]
pub struct SpectrumConfig {
    /// FFT window size in frames (must be power of 2)
    pub fft_size: usize,

    /// Display resolution (bins per channel handed to the meshes)
    pub resolution: usize,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            resolution: 100,
        }
    }
}

impl SpectrumConfig {
    /// Number of magnitude bins one analysis produces per channel
    pub fn analysis_bins(&self) -> usize {
        self.fft_size / 2
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<(), String> {
        if !self.fft_size.is_power_of_two() {
            return Err(format!(
                "FFT size must be power of 2, got {}",
                self.fft_size
            ));
        }
        if self.resolution < MIN_RESOLUTION {
            return Err(format!(
                "Spectrum resolution must be at least {}, got {}",
                MIN_RESOLUTION, self.resolution
            ));
        }
        if self.analysis_bins() < self.resolution {
            return Err(format!(
                "FFT size {} yields {} bins, fewer than resolution {}",
                self.fft_size,
                self.analysis_bins(),
                self.resolution
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SpectrumConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_configs() {
        let not_pow2 = SpectrumConfig {
            fft_size: 1000,
            ..Default::default()
        };
        assert!(not_pow2.validate().is_err());

        let too_coarse = SpectrumConfig {
            fft_size: 64,
            resolution: 100,
        };
        assert!(too_coarse.validate().is_err());

        let tiny = SpectrumConfig {
            fft_size: 2048,
            resolution: MIN_RESOLUTION - 1,
        };
        assert!(tiny.validate().is_err());

        let smallest = SpectrumConfig {
            fft_size: 2048,
            resolution: MIN_RESOLUTION,
        };
        assert!(smallest.validate().is_ok());
    }
}
