//! A single simulated point mass and its collision responses.

use glam::Vec3;

/// One point mass in the fountain
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    /// Position at the start of the current step (used to find the impact time)
    pub previous: Vec3,
    pub velocity: Vec3,
    /// Fraction of velocity kept after a ground bounce, in `[0, max_dampening)`
    pub dampening: f32,
    pub alive: bool,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            previous: Vec3::ZERO,
            velocity: Vec3::ZERO,
            dampening: 0.0,
            alive: false,
        }
    }
}

impl Particle {
    /// Reset this slot as a freshly spawned particle
    pub fn respawn(&mut self, origin: Vec3, velocity: Vec3, dampening: f32) {
        self.position = origin;
        self.previous = origin;
        self.velocity = velocity;
        self.dampening = dampening;
        self.alive = true;
    }

    /// Apply gravity to the vertical velocity, then move
    pub fn time_step(&mut self, dt: f32, gravity: f32) {
        if !self.alive {
            return;
        }

        self.velocity.y += gravity * dt;
        self.previous = self.position;
        self.position += self.velocity * dt;
    }

    /// Push the particle out of a sphere it has entered
    ///
    /// The particle is projected onto the surface, its previous position is reset there
    /// (so the next step cannot re-penetrate), and it leaves with a unit radial velocity.
    /// Returns true when a collision was resolved.
    pub fn collide_sphere(&mut self, center: Vec3, radius: f32) -> bool {
        if !self.alive {
            return false;
        }

        let offset = self.position - center;
        let distance = offset.length();
        if distance >= radius {
            return false;
        }

        // Dead centre has no radial direction; leave upwards
        let normal = if distance > 0.0 {
            offset / distance
        } else {
            Vec3::Y
        };

        self.position = center + normal * radius;
        self.previous = self.position;
        self.velocity = normal;
        true
    }

    /// Bounce off the horizontal plane `y = plane_y` crossed during the last step
    ///
    /// ```text
    ///  - -   o A (previous position)
    ///  | |    \
    ///  | s     \   o (position after the bounce)  -
    ///  t |      \ /                                | t - s
    ///  | - ------X--------                         -
    ///  |          \
    ///  -           o B (position without the plane)
    /// ```
    ///
    /// `s` is the time into the step at which the plane was hit. Motion up to `s` uses the
    /// incoming velocity, the remaining `dt - s` uses the velocity scaled by `dampening`,
    /// reflected vertically.
    ///
    /// A particle that reaches the plane without falling (zero or upward vertical velocity)
    /// has no defined impact time; it is set to rest on the plane instead.
    pub fn bounce(&mut self, dt: f32, plane_y: f32) {
        if !self.alive {
            return;
        }

        if self.velocity.y >= 0.0 {
            self.position.y = plane_y;
            self.velocity.y = 0.0;
            return;
        }

        // Only the vertical axis can cross a horizontal plane
        let s = ((plane_y - self.previous.y) / self.velocity.y).clamp(0.0, dt);
        let after = dt - s;
        let d = self.dampening;

        self.position.x = self.previous.x + self.velocity.x * s + self.velocity.x * after * d;
        self.position.y = plane_y - self.velocity.y * after * d;
        self.position.z = self.previous.z + self.velocity.z * s + self.velocity.z * after * d;

        self.velocity.x *= d;
        self.velocity.y *= -d;
        self.velocity.z *= d;
    }

    /// Below the rest height and (almost) not moving vertically
    pub fn is_resting(&self, rest_height: f32, epsilon: f32) -> bool {
        self.position.y < rest_height && self.velocity.y.abs() < epsilon
    }
}
