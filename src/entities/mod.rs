mod bullet;
mod particle;
mod player;
mod target;

// Re-export all public types
pub use bullet::Bullet;
pub use particle::{PARTICLE_FULL_LIFE, Particle, create_pop_particles};
pub use player::Player;
pub use target::{BALLOON_PALETTE, INVADER_PALETTE, Rgb, Target, TargetShape};
