//! Parameter definitions with units and documented semantics.
//!
//! All magic numbers live here with:
//! - Units (scene units, seconds, particles per second, etc.)
//! - Documented ranges and meanings
//! - Defaults matching the visualizer's reset state

mod audio;
mod particles;
mod render;
mod visualizer;

// Re-export all types
pub use audio::SpectrumConfig;
pub use particles::ParticlePhysics;
pub use render::RenderConfig;
pub use visualizer::{next_bounce_multiplier, SphereParams, StageParams, BOUNCE_MULTIPLIERS};
