//! Spectrum-driven mesh parameters (visualizer sphere and stage).

/// Bounce multipliers selectable at runtime
pub const BOUNCE_MULTIPLIERS: [u32; 4] = [2, 4, 6, 8];

/// Visualizer sphere parameters
#[derive(Debug, Clone)]
pub struct SphereParams {
    /// Undistorted radius (scene units)
    pub radius: f32,

    /// Longitude count (also the spectrum resolution the sphere samples)
    pub slices: usize,

    /// Latitude count
    pub stacks: usize,

    /// Bulge amplitude multiplier (one of `BOUNCE_MULTIPLIERS`)
    pub bounce_multiplier: u32,
}

impl Default for SphereParams {
    fn default() -> Self {
        Self {
            radius: 1.0,
            slices: 100,
            stacks: 50,
            bounce_multiplier: 8,
        }
    }
}

impl SphereParams {
    /// Longitude count actually generated (at least 3)
    pub fn num_lngs(&self) -> usize {
        self.slices.max(3)
    }

    /// Latitude count actually generated (at least 3)
    pub fn num_lats(&self) -> usize {
        self.stacks.max(3)
    }
}

/// Next multiplier in `BOUNCE_MULTIPLIERS` order, wrapping around
pub fn next_bounce_multiplier(current: u32) -> u32 {
    match BOUNCE_MULTIPLIERS.iter().position(|&m| m == current) {
        Some(i) => BOUNCE_MULTIPLIERS[(i + 1) % BOUNCE_MULTIPLIERS.len()],
        None => BOUNCE_MULTIPLIERS[0],
    }
}

/// Stage (deformed floor grid) parameters
#[derive(Debug, Clone)]
pub struct StageParams {
    /// Minimum x/z coordinate (scene units)
    pub left: f32,

    /// Maximum x/z coordinate (scene units)
    pub right: f32,

    /// Undistorted height (scene units)
    pub height: f32,

    /// Cells per side
    pub resolution: usize,

    /// Spectrum bin both axes sample (low frequency energy)
    pub spectrum_bin: usize,

    /// Visual exaggeration of the saddle displacement
    pub exaggeration: f32,
}

impl Default for StageParams {
    fn default() -> Self {
        Self {
            left: -2.0,
            right: 2.0,
            height: -2.0,
            resolution: 10,
            spectrum_bin: 5,
            exaggeration: 80.0,
        }
    }
}
