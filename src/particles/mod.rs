//! Particle fountain: fixed pool, gravity, ground bounce and sphere collision.

mod engine;
mod particle;
mod pool;

// Re-export public types
pub use engine::{particle_color, ParticleEngine, StepStats};
pub use particle::Particle;
pub use pool::ParticlePool;
