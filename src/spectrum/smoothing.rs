//! Upsampling a coarse analysis into display-resolution bins.
//!
//! Raw per-bin magnitudes facet badly on a closed sphere, so each raw bin is stretched
//! over four display bins with linear in-betweens, and the places where the circular
//! meshes close on themselves are blended towards their wraparound neighbour.

use super::Spectrum;

/// Weight of the far sample in the two seam blend bins
const SEAM_NEAR: f32 = 0.33;
const SEAM_FAR: f32 = 0.67;

/// Smallest resolution with room for a seam in each half of a channel
pub const MIN_RESOLUTION: usize = 8;

/// Upsample a two-channel raw analysis to `resolution` bins per channel
///
/// Returns `None` (no spectrum this frame) when either raw channel is shorter than
/// `resolution` or the resolution is too small to blend seams.
pub fn upsample(raw: [&[f32]; 2], resolution: usize) -> Option<Spectrum> {
    if resolution < MIN_RESOLUTION || raw.iter().any(|ch| ch.len() < resolution) {
        return None;
    }

    let mut channels = [vec![0.0; resolution], vec![0.0; resolution]];

    for (out, raw) in channels.iter_mut().zip(raw) {
        let mut bin = 0;
        while bin + 3 < resolution {
            let here = raw[bin / 4];
            let next = raw[bin / 4 + 1];

            out[bin] = here;
            out[bin + 2] = (here + next) / 2.0;
            out[bin + 1] = (out[bin] + out[bin + 2]) / 2.0;
            out[bin + 3] = (out[bin + 2] + next) / 2.0;

            bin += 4;
        }

        blend_seam(out, resolution);
    }

    // The lower hemisphere reads channel 1 half a turn around, which puts the
    // sphere's longitude seam in the middle of that channel
    blend_seam(&mut channels[1], resolution / 2);

    let [left, right] = channels;
    Spectrum::new(left, right)
}

/// Blend the three bins before `end` into the bin at `end` (wrapping)
fn blend_seam(bins: &mut [f32], end: usize) {
    let next = bins[end % bins.len()];
    let anchor = bins[end - 4];

    bins[end - 1] = next;
    bins[end - 2] = SEAM_NEAR * anchor + SEAM_FAR * next;
    bins[end - 3] = SEAM_FAR * anchor + SEAM_NEAR * next;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> Vec<f32> {
        (0..len).map(|i| i as f32).collect()
    }

    #[test]
    fn test_short_analysis_is_unavailable() {
        let short = vec![0.5; 64];
        let long = vec![0.5; 1024];

        assert!(upsample([&short, &long], 100).is_none());
        assert!(upsample([&long, &short], 100).is_none());
        assert!(upsample([&long, &long], 4).is_none());
        assert!(upsample([&long, &long], 100).is_some());
    }

    #[test]
    fn test_interior_bins_interpolate_linearly() {
        let raw = ramp(1024);
        let spectrum = upsample([&raw, &raw], 100).unwrap();
        let left = spectrum.channel(0);

        // A linear ramp stays linear: bin i sits at i / 4
        for i in 0..96 {
            assert!((left[i] - i as f32 / 4.0).abs() < 1e-6, "bin {}", i);
        }
    }

    #[test]
    fn test_tail_seam_blends_towards_first_bin() {
        let raw = ramp(1024);
        let spectrum = upsample([&raw, &raw], 100).unwrap();

        for ch in 0..2 {
            let bins = spectrum.channel(ch);
            assert_eq!(bins[99], bins[0]);
            assert!((bins[98] - (0.33 * bins[96] + 0.67 * bins[99])).abs() < 1e-6);
            assert!((bins[97] - (0.67 * bins[96] + 0.33 * bins[99])).abs() < 1e-6);
        }
    }

    #[test]
    fn test_second_channel_has_mid_seam() {
        let raw = ramp(1024);
        let spectrum = upsample([&raw, &raw], 100).unwrap();
        let left = spectrum.channel(0);
        let right = spectrum.channel(1);

        assert_eq!(right[49], right[50]);
        assert!((right[48] - (0.33 * right[46] + 0.67 * right[49])).abs() < 1e-6);
        assert!((right[47] - (0.67 * right[46] + 0.33 * right[49])).abs() < 1e-6);

        // First channel has no seam there
        assert!((left[49] - 49.0 / 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_flat_input_stays_flat() {
        let raw = vec![0.25; 1024];
        let spectrum = upsample([&raw, &raw], 100).unwrap();

        for ch in 0..2 {
            assert!(spectrum.channel(ch).iter().all(|&v| (v - 0.25).abs() < 1e-6));
        }
    }
}
