//! Fixed-capacity particle storage with a circular recycle cursor.

use super::particle::Particle;

/// Fixed-size particle arena
///
/// Slots are allocated once; spawning recycles the slot under the cursor whether or not
/// it is still alive, so the oldest particles are the first to be replaced.
pub struct ParticlePool {
    particles: Vec<Particle>,
    /// Next slot to recycle, always in `[0, capacity)`
    cursor: usize,
}

impl ParticlePool {
    /// Allocate `capacity` dead particles (at least one slot)
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: vec![Particle::default(); capacity.max(1)],
            cursor: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Hand out the slot under the cursor and advance it circularly
    pub fn recycle(&mut self) -> &mut Particle {
        let index = self.cursor;
        self.cursor = (self.cursor + 1) % self.particles.len();
        &mut self.particles[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Particle> {
        self.particles.iter_mut()
    }

    /// Live particles only; dead slots are never exposed
    pub fn alive(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| p.alive)
    }

    pub fn alive_count(&self) -> usize {
        self.alive().count()
    }

    /// Kill every particle and rewind the cursor
    pub fn clear(&mut self) {
        self.particles.fill(Particle::default());
        self.cursor = 0;
    }
}
