//! Rendering and view configuration.

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Window width (pixels)
    pub window_width: u32,

    /// Window height (pixels)
    pub window_height: u32,

    /// Half extent of the orthographic view volume (scene units)
    pub ortho_half_extent: f32,

    /// Perspective field of view (degrees)
    pub fov_degrees: f32,

    /// Near clipping plane (scene units)
    pub near_plane: f32,

    /// Far clipping plane (scene units)
    pub far_plane: f32,

    /// Eye position, looking at the origin with +Y up
    pub eye: [f32; 3],

    /// Length of one animation cycle (milliseconds)
    pub animation_cycle_ms: u32,

    /// Length of each axis line (scene units)
    pub axes_length: f32,

    /// Degrees of rotation per pixel of left-button drag
    pub angle_factor: f32,

    /// Scale change per pixel of middle-button drag
    pub scale_factor: f32,

    /// Smallest allowed scene scale (keeps the scene from turning inside out)
    pub min_scale: f32,

    /// Depth cue fog start distance from the eye (scene units)
    pub fog_start: f32,

    /// Depth cue fog end distance from the eye (scene units)
    pub fog_end: f32,

    /// Particle point opacity
    pub particle_alpha: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 600,
            window_height: 600,
            ortho_half_extent: 3.0,
            fov_degrees: 90.0,
            near_plane: 0.1,
            far_plane: 1000.0,
            eye: [0.0, 0.0, 3.0],
            animation_cycle_ms: 2000,
            axes_length: 1.5,
            angle_factor: 1.0,
            scale_factor: 0.005,
            min_scale: 0.05,
            fog_start: 1.5,
            fog_end: 4.0,
            particle_alpha: 80.0 / 255.0,
        }
    }
}

impl RenderConfig {
    /// Animation cycle length in seconds
    pub fn animation_cycle_s(&self) -> f32 {
        self.animation_cycle_ms as f32 / 1000.0
    }
}
