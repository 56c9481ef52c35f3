use rand::Rng;
use std::f32::consts::TAU;

use super::target::Rgb;

/// Lifetime at which a particle is drawn fully opaque
pub const PARTICLE_FULL_LIFE: f32 = 45.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub velocity_x: f32,
    pub velocity_y: f32,
    /// Frames left before the particle disappears
    pub lifetime: f32,
    pub color: Rgb,
}

impl Particle {
    pub fn new(x: f32, y: f32, velocity_x: f32, velocity_y: f32, lifetime: f32, color: Rgb) -> Self {
        Self {
            x,
            y,
            velocity_x,
            velocity_y,
            lifetime,
            color,
        }
    }

    /// Moves, then lets gravity pull on the vertical velocity
    pub fn update(&mut self, gravity: f32) {
        self.x += self.velocity_x;
        self.y += self.velocity_y;
        self.velocity_y += gravity;
        self.lifetime -= 1.0;
    }

    pub fn is_dead(&self) -> bool {
        self.lifetime <= 0.0
    }

    /// Opacity in [0, 1] for fading out
    pub fn alpha(&self) -> f32 {
        (self.lifetime / PARTICLE_FULL_LIFE).clamp(0.0, 1.0)
    }
}

/// Creates a pop burst of `count` particles flying out of a point
pub fn create_pop_particles<R: Rng>(
    rng: &mut R,
    center_x: f32,
    center_y: f32,
    color: Rgb,
    count: usize,
) -> Vec<Particle> {
    (0..count)
        .map(|_| {
            let speed = rng.random_range(1.0..4.0f32);
            let angle = rng.random_range(0.0..TAU);
            Particle::new(
                center_x,
                center_y,
                angle.cos() * speed,
                angle.sin() * speed,
                rng.random_range(30.0..48.0f32),
                color,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const WHITE: Rgb = Rgb(255, 255, 255);

    #[test]
    fn test_particle_update_applies_gravity_after_moving() {
        let mut particle = Particle::new(10.0, 10.0, 2.0, -1.0, 10.0, WHITE);
        particle.update(0.5);
        assert_eq!(particle.x, 12.0);
        assert_eq!(particle.y, 9.0);
        assert_eq!(particle.velocity_y, -0.5);
        assert_eq!(particle.lifetime, 9.0);
    }

    #[test]
    fn test_particle_lifetime_expires() {
        let mut particle = Particle::new(10.0, 10.0, 0.0, 0.0, 2.0, WHITE);
        assert!(!particle.is_dead());
        particle.update(0.0);
        assert!(!particle.is_dead());
        particle.update(0.0);
        assert!(particle.is_dead());
    }

    #[test]
    fn test_particle_alpha_fades() {
        let particle = Particle::new(0.0, 0.0, 0.0, 0.0, 90.0, WHITE);
        assert_eq!(particle.alpha(), 1.0);
        let particle = Particle::new(0.0, 0.0, 0.0, 0.0, 22.5, WHITE);
        assert_eq!(particle.alpha(), 0.5);
    }

    #[test]
    fn test_create_pop_particles() {
        let mut rng = Pcg32::seed_from_u64(3);
        let particles = create_pop_particles(&mut rng, 50.0, 60.0, WHITE, 16);
        assert_eq!(particles.len(), 16);

        for particle in &particles {
            assert_eq!((particle.x, particle.y), (50.0, 60.0));
            let speed = particle.velocity_x.hypot(particle.velocity_y);
            assert!((0.99..4.01).contains(&speed));
            assert!((30.0..48.0).contains(&particle.lifetime));
            assert_eq!(particle.color, WHITE);
        }
    }
}
