// Library exports for testing
pub use config::{GameConfig, Variant};
pub use entities::{Bullet, Particle, Player, Rgb, Target, TargetShape};
pub use input::InputFlags;
pub use session::{GameEvent, GameState, Session};

pub mod app;
pub mod audio;
pub mod collision;
pub mod config;
pub mod entities;
pub mod input;
pub mod logging;
pub mod renderer;
pub mod scheduler;
pub mod session;
