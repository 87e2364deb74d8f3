//! Particle fountain simulation: spawning, integration, collisions and retirement.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::particle::Particle;
use super::pool::ParticlePool;
use crate::mesh::ColorVertex;
use crate::params::ParticlePhysics;

/// What happened during one simulation step
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepStats {
    pub spawned: usize,
    pub bounced: usize,
    pub retired: usize,
}

/// Particle fountain over a fixed pool
///
/// Generic over the random source so runs can be reproduced exactly.
pub struct ParticleEngine<R = StdRng> {
    pool: ParticlePool,
    physics: ParticlePhysics,
    flow_rate: f32,
    /// Fractional spawns carried over between steps
    spawn_budget: f64,
    rng: R,
}

impl ParticleEngine<StdRng> {
    /// Create an engine seeded from `physics.seed` (or system entropy)
    pub fn new(physics: ParticlePhysics) -> Self {
        let rng = match physics.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(physics, rng)
    }
}

impl<R: Rng> ParticleEngine<R> {
    pub fn with_rng(physics: ParticlePhysics, rng: R) -> Self {
        let pool = ParticlePool::new(physics.capacity);
        let flow_rate = physics.clamp_flow(physics.flow_rate);
        Self {
            pool,
            physics,
            flow_rate,
            spawn_budget: 0.0,
            rng,
        }
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn physics(&self) -> &ParticlePhysics {
        &self.physics
    }

    pub fn alive_count(&self) -> usize {
        self.pool.alive_count()
    }

    pub fn flow_rate(&self) -> f32 {
        self.flow_rate
    }

    /// Set the flow rate, clamped to `[0, capacity]`; returns the value applied
    pub fn set_flow_rate(&mut self, flow: f32) -> f32 {
        self.flow_rate = self.physics.clamp_flow(flow);
        self.flow_rate
    }

    pub fn increase_flow(&mut self) -> f32 {
        self.set_flow_rate(self.flow_rate + self.physics.flow_step)
    }

    pub fn decrease_flow(&mut self) -> f32 {
        self.set_flow_rate(self.flow_rate - self.physics.flow_step)
    }

    /// Kill all particles
    pub fn reset(&mut self) {
        self.pool.clear();
        self.spawn_budget = 0.0;
    }

    /// Time step actually simulated for a measured frame delta
    ///
    /// Slow frames are scaled by `1 / (100 * dt)`, trading physical accuracy for a
    /// simulation that stays stable while the host stalls.
    pub fn effective_dt(&self, frame_dt: f32) -> f32 {
        let dt = frame_dt.max(0.0);
        if dt > self.physics.slow_frame_s {
            dt * (1.0 / (100.0 * dt))
        } else {
            dt
        }
    }

    /// Advance by one measured frame delta
    pub fn advance(&mut self, frame_dt: f32) -> StepStats {
        let dt = self.effective_dt(frame_dt);
        self.step(dt)
    }

    /// Number of particles one step of `dt` spawns
    ///
    /// Fractions left over from earlier steps count towards this one, so over any run
    /// the total stays at `floor(flow * elapsed)` whatever the frame rate.
    pub fn spawn_count(&self, dt: f32) -> usize {
        let wanted = (self.spawn_budget + self.spawn_increment(dt)).floor() as usize;
        wanted.min(self.pool.capacity())
    }

    fn spawn_increment(&self, dt: f32) -> f64 {
        (self.flow_rate * dt.max(0.0)) as f64
    }

    /// Spawn, integrate, collide and retire with an already-scaled time step
    pub fn step(&mut self, dt: f32) -> StepStats {
        let mut stats = StepStats {
            spawned: self.spawn(dt),
            ..Default::default()
        };

        let gravity = self.physics.gravity;
        let collider_radius = self.physics.collider_radius;
        let ground = self.physics.ground_height;
        let rest_height = self.physics.rest_height;
        let rest_epsilon = self.physics.rest_epsilon;

        for p in self.pool.iter_mut().filter(|p| p.alive) {
            p.time_step(dt, gravity);
            p.collide_sphere(Vec3::ZERO, collider_radius);

            if p.position.y <= ground {
                p.bounce(dt, ground);
                stats.bounced += 1;
            }

            if p.is_resting(rest_height, rest_epsilon) {
                p.alive = false;
                stats.retired += 1;
            }
        }

        stats
    }

    /// Recycle slots into new particles; each gets a small random head start so
    /// particles spawned in the same frame do not move in lockstep
    fn spawn(&mut self, dt: f32) -> usize {
        let count = self.spawn_count(dt);
        // A capped step drops its excess instead of bursting later
        self.spawn_budget = (self.spawn_budget + self.spawn_increment(dt) - count as f64).fract();
        let origin = Vec3::from_array(self.physics.spawn_origin);

        for _ in 0..count {
            let velocity = Vec3::new(
                2.0 * (self.rng.random::<f32>() - 0.5),
                2.0 * (self.rng.random::<f32>() - 0.5),
                2.0 * (self.rng.random::<f32>() - 0.5),
            );
            let dampening = self.physics.max_dampening * self.rng.random::<f32>();
            let head_start = 2.0 * dt * self.rng.random::<f32>();

            let p: &mut Particle = self.pool.recycle();
            p.respawn(origin, velocity, dampening);
            p.time_step(head_start, self.physics.gravity);
        }

        count
    }

    /// Render snapshot: one coloured point per live particle
    pub fn write_points(&self, alpha: f32, out: &mut Vec<ColorVertex>) {
        out.clear();
        out.extend(self.pool.alive().map(|p| ColorVertex {
            position: p.position.to_array(),
            color: particle_color(p.position.y, alpha),
        }));
    }
}

/// Particles redden with distance from the `y = 0` plane
pub fn particle_color(height: f32, alpha: f32) -> [f32; 4] {
    [(height.abs() / 2.0).min(1.0), 0.5, 0.5, alpha]
}
