//! Particle fountain physics parameters.

/// Particle engine physics parameters
#[derive(Debug, Clone)]
pub struct ParticlePhysics {
    /// Fixed pool size (particles allocated once, recycled forever)
    pub capacity: usize,

    /// Spawn target (particles per second)
    pub flow_rate: f32,

    /// Flow change per "more"/"less" command (particles per second)
    pub flow_step: f32,

    /// Vertical acceleration (scene units per second squared, negative = down)
    pub gravity: f32,

    /// Point every particle is spawned from (scene units)
    pub spawn_origin: [f32; 3],

    /// Upper bound (exclusive) of the random per-particle bounce dampening
    pub max_dampening: f32,

    /// Height of the ground plane particles bounce on (scene units)
    pub ground_height: f32,

    /// Particles below this height with near-zero vertical speed are retired
    pub rest_height: f32,

    /// Vertical speed tolerance for the rest test (scene units per second)
    pub rest_epsilon: f32,

    /// Frame deltas above this trigger the slow-down (seconds)
    /// 0.1 s = hold the simulation together down to ~10 fps
    pub slow_frame_s: f32,

    /// Radius of the collider sphere at the scene origin (scene units)
    pub collider_radius: f32,

    /// RNG seed; `None` seeds from system entropy
    pub seed: Option<u64>,
}

impl Default for ParticlePhysics {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            flow_rate: 500.0,
            flow_step: 100.0,
            gravity: -0.8,
            spawn_origin: [0.0, 9.0, 0.0],
            max_dampening: 0.45,
            ground_height: -2.0,
            rest_height: -1.9,
            rest_epsilon: 0.1,
            slow_frame_s: 0.1,
            collider_radius: 1.0,
            seed: None,
        }
    }
}

impl ParticlePhysics {
    /// Clamp a requested flow rate into `[0, capacity]`
    pub fn clamp_flow(&self, flow: f32) -> f32 {
        flow.clamp(0.0, self.capacity as f32)
    }
}
