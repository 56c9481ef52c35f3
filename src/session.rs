//! One game session: all mutable state plus the per-frame update step
//!
//! A [`Session`] never touches the terminal. The app feeds it input flags and
//! elapsed time once per frame through [`Session::tick`] and reacts to the
//! returned [`GameEvent`]s (sound cues, logging).

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use std::time::Duration;

use crate::collision::bullet_hits_target;
use crate::config::{GameConfig, MIN_PLAY_HEIGHT, MIN_PLAY_WIDTH};
use crate::entities::{Bullet, Particle, Player, Target, create_pop_particles};
use crate::input::InputFlags;
use crate::scheduler::{Difficulty, DifficultyRamp, FireController, Spawner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Playing,
    Paused,
    GameOver,
}

/// Things that happened during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    BulletFired,
    TargetSpawned,
    TargetPopped { x: f32, y: f32 },
    LifeLost { lives_left: u32 },
    DifficultyRamped { level: u32 },
    GameOver { score: u32 },
}

/// Clamps a requested play area to the supported minimum
pub fn clamp_play_area(width: f32, height: f32) -> (f32, f32) {
    let width = if width.is_finite() { width } else { 0.0 };
    let height = if height.is_finite() { height } else { 0.0 };
    (width.max(MIN_PLAY_WIDTH), height.max(MIN_PLAY_HEIGHT))
}

/// The whole mutable state of a game
#[derive(Debug, Clone)]
pub struct Session {
    pub config: GameConfig,
    pub game_state: GameState,
    pub player: Player,
    /// Live bullets, oldest first
    pub bullets: Vec<Bullet>,
    /// Live targets, oldest first
    pub targets: Vec<Target>,
    pub particles: Vec<Particle>,
    pub score: u32,
    pub lives: u32,
    pub difficulty: Difficulty,
    pub play_width: f32,
    pub play_height: f32,
    /// Frames simulated while playing
    pub frame_count: u64,
    /// Play time, excluding pauses
    pub elapsed: Duration,
    spawner: Spawner,
    fire_controller: FireController,
    difficulty_ramp: DifficultyRamp,
    rng: Pcg32,
    seed: u64,
}

impl Session {
    /// Starts a session on a play area of the given logical size
    pub fn new(config: GameConfig, play_width: f32, play_height: f32) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self::with_seed(config, play_width, play_height, seed)
    }

    fn with_seed(config: GameConfig, play_width: f32, play_height: f32, seed: u64) -> Self {
        let (play_width, play_height) = clamp_play_area(play_width, play_height);
        let shape = config.variant.target_shape();
        log::info!(
            "Starting {} session on {}x{} with seed {}",
            config.variant.as_str(),
            play_width,
            play_height,
            seed
        );

        Self {
            game_state: GameState::Playing,
            player: Player::new(play_width, play_height, config.player_speed),
            bullets: Vec::new(),
            targets: Vec::new(),
            particles: Vec::new(),
            score: 0,
            lives: config.starting_lives,
            difficulty: Difficulty::new(&config),
            play_width,
            play_height,
            frame_count: 0,
            elapsed: Duration::ZERO,
            spawner: Spawner::new(&config, shape),
            fire_controller: FireController::new(&config),
            difficulty_ramp: DifficultyRamp::new(&config),
            rng: Pcg32::seed_from_u64(seed),
            seed,
            config,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn is_game_over(&self) -> bool {
        self.game_state == GameState::GameOver
    }

    /// Current spawn interval the spawner runs at
    pub fn spawn_interval(&self) -> Duration {
        self.spawner.interval()
    }

    /// Starts over from game-over; ignored in any other state
    ///
    /// Returns whether a restart happened. The new session keeps the config
    /// and play area and draws its seed from the old session's RNG.
    pub fn restart(&mut self) -> bool {
        if self.game_state != GameState::GameOver {
            return false;
        }
        let seed = self.rng.random();
        *self = Self::with_seed(self.config.clone(), self.play_width, self.play_height, seed);
        true
    }

    pub fn pause(&mut self) {
        if self.game_state == GameState::Playing {
            self.game_state = GameState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.game_state == GameState::Paused {
            self.game_state = GameState::Playing;
        }
    }

    /// Adopts a new play area without rescaling anything
    ///
    /// The player is re-fitted to the new size and everything is clamped
    /// horizontally into the new bounds.
    pub fn resize(&mut self, play_width: f32, play_height: f32) {
        let (play_width, play_height) = clamp_play_area(play_width, play_height);
        if play_width == self.play_width && play_height == self.play_height {
            return;
        }
        log::debug!(
            "Play area resized from {}x{} to {}x{}",
            self.play_width,
            self.play_height,
            play_width,
            play_height
        );
        self.play_width = play_width;
        self.play_height = play_height;

        self.player.fit_to(play_width, play_height);
        self.player.clamp_to(play_width, self.config.player_margin);

        for target in &mut self.targets {
            target.x = target.x.clamp(0.0, (play_width - target.size).max(0.0));
        }
        for bullet in &mut self.bullets {
            bullet.x = bullet.x.clamp(0.0, (play_width - bullet.width).max(0.0));
        }
        for particle in &mut self.particles {
            particle.x = particle.x.clamp(0.0, play_width);
        }
    }

    /// Advances the game by one frame
    ///
    /// Does nothing unless playing: paused and finished sessions keep their
    /// timers frozen, so a late call after game-over cannot revive anything.
    pub fn tick(&mut self, input: InputFlags, dt: Duration) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.game_state != GameState::Playing {
            return events;
        }

        self.frame_count += 1;
        self.elapsed += dt;

        self.run_timers(input, dt, &mut events);
        self.update_player(input);
        self.update_bullets();

        if self.update_targets(&mut events) {
            self.enter_game_over(&mut events);
            return events;
        }

        self.check_collisions(&mut events);
        self.update_particles();

        events
    }

    fn run_timers(&mut self, input: InputFlags, dt: Duration, events: &mut Vec<GameEvent>) {
        for _ in 0..self.spawner.poll(dt) {
            let target = self
                .spawner
                .spawn(&mut self.rng, self.play_width, self.difficulty.target_speed);
            self.targets.push(target);
            events.push(GameEvent::TargetSpawned);
        }

        for _ in 0..self.fire_controller.poll(dt, input.fire) {
            self.bullets.push(self.player.fire(
                self.config.bullet_width,
                self.config.bullet_height,
                self.config.bullet_speed,
            ));
            events.push(GameEvent::BulletFired);
        }

        let ramps = self.difficulty_ramp.poll(dt);
        if ramps > 0 {
            for _ in 0..ramps {
                self.difficulty_ramp.apply(&mut self.difficulty);
                events.push(GameEvent::DifficultyRamped {
                    level: self.difficulty.level,
                });
            }
            self.spawner.reschedule(self.difficulty.spawn_interval);
            log::info!(
                "Difficulty level {}: target speed {:.2}, spawn every {:?}",
                self.difficulty.level,
                self.difficulty.target_speed,
                self.difficulty.spawn_interval
            );
        }
    }

    fn update_player(&mut self, input: InputFlags) {
        if input.left {
            self.player.move_left();
        }
        if input.right {
            self.player.move_right();
        }
        self.player.clamp_to(self.play_width, self.config.player_margin);
    }

    fn update_bullets(&mut self) {
        for bullet in &mut self.bullets {
            bullet.update();
        }
        self.bullets.retain(|b| !b.is_out_of_bounds());
    }

    /// Moves targets and charges a life for each one that got away
    ///
    /// Returns true when the last life is gone.
    fn update_targets(&mut self, events: &mut Vec<GameEvent>) -> bool {
        for target in &mut self.targets {
            target.update();
        }

        let play_height = self.play_height;
        let before = self.targets.len();
        self.targets.retain(|t| !t.has_escaped(play_height));
        let escaped = before - self.targets.len();

        for _ in 0..escaped {
            if self.lives == 0 {
                break;
            }
            self.lives -= 1;
            events.push(GameEvent::LifeLost {
                lives_left: self.lives,
            });
        }

        self.lives == 0
    }

    /// Pops every target touched by a bullet
    ///
    /// Targets are scanned oldest first and each checks the bullets oldest
    /// first; the first bullet found is spent on that target.
    fn check_collisions(&mut self, events: &mut Vec<GameEvent>) {
        let mut t_idx = 0;
        while t_idx < self.targets.len() {
            let target = &self.targets[t_idx];
            let Some(b_idx) = self
                .bullets
                .iter()
                .position(|bullet| bullet_hits_target(bullet, target))
            else {
                t_idx += 1;
                continue;
            };

            self.bullets.remove(b_idx);
            let target = self.targets.remove(t_idx);
            self.score += 1;

            let (cx, cy) = target.center();
            let burst = create_pop_particles(
                &mut self.rng,
                cx,
                cy,
                target.color,
                self.config.particles_per_pop,
            );
            self.particles.extend(burst);
            events.push(GameEvent::TargetPopped { x: cx, y: cy });
        }
    }

    fn update_particles(&mut self) {
        let gravity = self.config.particle_gravity;
        for particle in &mut self.particles {
            particle.update(gravity);
        }
        self.particles.retain(|p| !p.is_dead());
    }

    fn enter_game_over(&mut self, events: &mut Vec<GameEvent>) {
        self.game_state = GameState::GameOver;
        log::info!(
            "Game over after {:?}: final score {}",
            self.elapsed,
            self.score
        );
        events.push(GameEvent::GameOver { score: self.score });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Variant;
    use crate::entities::{Rgb, TargetShape};

    const FRAME: Duration = Duration::from_millis(16);
    const RED: Rgb = Rgb(255, 0, 0);

    /// Config with the spawner and ramp pushed far into the future
    fn quiet_config() -> GameConfig {
        GameConfig {
            initial_spawn_interval_ms: 3_600_000,
            difficulty_ramp_secs: 3_600,
            seed: Some(1),
            ..GameConfig::default()
        }
    }

    fn balloon(x: f32, y: f32, size: f32, speed: f32) -> Target {
        Target::new(x, y, size, speed, RED, TargetShape::Balloon)
    }

    #[test]
    fn test_new_session_starting_values() {
        let session = Session::new(GameConfig::default(), 400.0, 300.0);
        assert_eq!(session.game_state, GameState::Playing);
        assert_eq!(session.score, 0);
        assert_eq!(session.lives, 3);
        assert!(session.bullets.is_empty());
        assert!(session.targets.is_empty());
        assert_eq!(session.spawn_interval(), Duration::from_millis(1400));
    }

    #[test]
    fn test_play_area_is_clamped_to_minimum() {
        let session = Session::new(quiet_config(), 0.0, -5.0);
        assert_eq!(session.play_width, MIN_PLAY_WIDTH);
        assert_eq!(session.play_height, MIN_PLAY_HEIGHT);

        assert_eq!(clamp_play_area(f32::NAN, 500.0), (MIN_PLAY_WIDTH, 500.0));
    }

    #[test]
    fn test_player_moves_and_is_clamped() {
        let mut session = Session::new(quiet_config(), 400.0, 300.0);
        let start = session.player.x;
        let left = InputFlags {
            left: true,
            ..InputFlags::NONE
        };
        session.tick(left, FRAME);
        assert_eq!(session.player.x, start - session.player.speed);

        for _ in 0..200 {
            session.tick(left, FRAME);
        }
        assert_eq!(session.player.x, session.config.player_margin);
    }

    #[test]
    fn test_spawner_adds_targets_over_time() {
        let config = GameConfig {
            seed: Some(9),
            ..GameConfig::default()
        };
        let mut session = Session::new(config, 400.0, 300.0);
        let events = session.tick(InputFlags::NONE, Duration::from_millis(1399));
        assert!(!events.contains(&GameEvent::TargetSpawned));
        assert!(session.targets.is_empty());

        let events = session.tick(InputFlags::NONE, Duration::from_millis(1));
        assert!(events.contains(&GameEvent::TargetSpawned));
        assert_eq!(session.targets.len(), 1);
    }

    #[test]
    fn test_fire_controller_emits_bullets_while_held() {
        let mut session = Session::new(quiet_config(), 400.0, 300.0);
        let fire = InputFlags {
            fire: true,
            ..InputFlags::NONE
        };
        let events = session.tick(fire, Duration::from_millis(170));
        assert_eq!(events, vec![GameEvent::BulletFired]);
        assert_eq!(session.bullets.len(), 1);

        session.tick(InputFlags::NONE, Duration::from_millis(170));
        assert_eq!(session.bullets.len(), 1);
    }

    #[test]
    fn test_difficulty_ramp_reschedules_spawner() {
        let config = GameConfig {
            seed: Some(2),
            ..GameConfig::default()
        };
        let mut session = Session::new(config, 400.0, 300.0);
        let events = session.tick(InputFlags::NONE, Duration::from_secs(20));
        assert!(events.contains(&GameEvent::DifficultyRamped { level: 1 }));
        assert_eq!(session.spawn_interval(), Duration::from_millis(1288));
        assert!((session.difficulty.target_speed - 1.78).abs() < 1e-5);
    }

    #[test]
    fn test_escaped_target_costs_a_life() {
        let mut session = Session::new(quiet_config(), 400.0, 300.0);
        session.targets.push(balloon(100.0, 339.0, 40.0, 2.0));

        let events = session.tick(InputFlags::NONE, FRAME);
        assert_eq!(events, vec![GameEvent::LifeLost { lives_left: 2 }]);
        assert!(session.targets.is_empty());
        assert_eq!(session.lives, 2);
    }

    #[test]
    fn test_hit_removes_both_and_scores_one() {
        let mut session = Session::new(quiet_config(), 400.0, 300.0);
        session.targets.push(balloon(100.0, 100.0, 40.0, 0.0));
        session.bullets.push(Bullet::new(115.0, 123.0, 10.0, 18.0, 12.0));

        let events = session.tick(InputFlags::NONE, FRAME);
        assert!(events.contains(&GameEvent::TargetPopped { x: 120.0, y: 120.0 }));
        assert!(session.targets.is_empty());
        assert!(session.bullets.is_empty());
        assert_eq!(session.score, 1);
        assert_eq!(session.particles.len(), 16);
    }

    #[test]
    fn test_bullet_does_not_pierce() {
        let mut session = Session::new(quiet_config(), 400.0, 300.0);
        // Two overlapping balloons, one bullet between them
        session.targets.push(balloon(100.0, 100.0, 40.0, 0.0));
        session.targets.push(balloon(104.0, 100.0, 40.0, 0.0));
        session.bullets.push(Bullet::new(112.0, 123.0, 10.0, 18.0, 12.0));

        session.tick(InputFlags::NONE, FRAME);
        assert_eq!(session.score, 1);
        assert_eq!(session.targets.len(), 1);
        // The older target is the one popped
        assert_eq!(session.targets[0].x, 104.0);
    }

    #[test]
    fn test_oldest_bullet_is_spent_first() {
        let mut session = Session::new(quiet_config(), 400.0, 300.0);
        session.targets.push(balloon(100.0, 100.0, 40.0, 0.0));
        session.bullets.push(Bullet::new(115.0, 123.0, 10.0, 18.0, 12.0));
        session.bullets.push(Bullet::new(113.0, 125.0, 10.0, 18.0, 12.0));

        session.tick(InputFlags::NONE, FRAME);
        assert_eq!(session.bullets.len(), 1);
        assert_eq!(session.bullets[0].x, 113.0);
    }

    #[test]
    fn test_last_life_ends_the_game_and_freezes_it() {
        let config = GameConfig {
            starting_lives: 1,
            ..quiet_config()
        };
        let mut session = Session::new(config, 400.0, 300.0);
        session.targets.push(balloon(100.0, 339.0, 40.0, 2.0));
        session.targets.push(balloon(200.0, 0.0, 40.0, 2.0));

        let events = session.tick(InputFlags::NONE, FRAME);
        assert_eq!(
            events,
            vec![
                GameEvent::LifeLost { lives_left: 0 },
                GameEvent::GameOver { score: 0 }
            ]
        );
        assert!(session.is_game_over());

        let frozen = session.clone();
        let all = InputFlags {
            left: true,
            right: false,
            fire: true,
        };
        let events = session.tick(all, Duration::from_secs(60));
        assert!(events.is_empty());
        assert_eq!(session.targets, frozen.targets);
        assert_eq!(session.player, frozen.player);
        assert!(session.bullets.is_empty());
        assert_eq!(session.elapsed, frozen.elapsed);
    }

    #[test]
    fn test_restart_only_from_game_over() {
        let config = GameConfig {
            starting_lives: 1,
            ..quiet_config()
        };
        let mut session = Session::new(config, 400.0, 300.0);
        session.score = 7;
        assert!(!session.restart());
        assert_eq!(session.score, 7);

        session.targets.push(balloon(100.0, 339.0, 40.0, 2.0));
        session.particles.push(Particle::new(1.0, 1.0, 0.0, 0.0, 10.0, RED));
        session.tick(InputFlags::NONE, FRAME);
        assert!(session.is_game_over());

        assert!(session.restart());
        assert_eq!(session.game_state, GameState::Playing);
        assert_eq!(session.score, 0);
        assert_eq!(session.lives, 1);
        assert!(session.targets.is_empty());
        assert!(session.bullets.is_empty());
        assert!(session.particles.is_empty());
        assert_eq!(session.difficulty, Difficulty::new(&session.config));
        assert_eq!(session.play_width, 400.0);
    }

    #[test]
    fn test_pause_freezes_time() {
        let mut session = Session::new(quiet_config(), 400.0, 300.0);
        session.targets.push(balloon(100.0, 0.0, 40.0, 2.0));
        session.pause();
        assert_eq!(session.game_state, GameState::Paused);
        session.tick(InputFlags::NONE, FRAME);
        assert_eq!(session.targets[0].y, 0.0);
        assert_eq!(session.frame_count, 0);

        session.resume();
        session.tick(InputFlags::NONE, FRAME);
        assert_eq!(session.targets[0].y, 2.0);
    }

    #[test]
    fn test_resize_clamps_without_rescaling() {
        let mut session = Session::new(quiet_config(), 800.0, 600.0);
        session.player.x = 700.0;
        session.targets.push(balloon(750.0, 50.0, 40.0, 2.0));
        session.targets.push(balloon(10.0, 60.0, 40.0, 2.0));

        session.resize(400.0, 300.0);
        assert_eq!(session.targets[0].x, 360.0);
        assert_eq!(session.targets[0].y, 50.0);
        assert_eq!(session.targets[0].size, 40.0);
        assert_eq!(session.targets[1].x, 10.0);
        assert_eq!(
            session.player.x,
            400.0 - session.player.width - session.config.player_margin
        );
        assert_eq!(session.player.y, 300.0 - 16.0 - 24.0);
    }

    #[test]
    fn test_same_seed_same_game() {
        let config = GameConfig {
            seed: Some(1234),
            ..GameConfig::default()
        };
        let mut a = Session::new(config.clone(), 640.0, 352.0);
        let mut b = Session::new(config, 640.0, 352.0);
        let fire = InputFlags {
            fire: true,
            right: true,
            left: false,
        };
        for _ in 0..600 {
            a.tick(fire, FRAME);
            b.tick(fire, FRAME);
        }
        assert_eq!(a.targets, b.targets);
        assert_eq!(a.score, b.score);
        assert_eq!(a.particles, b.particles);
    }

    #[test]
    fn test_invaders_use_box_targets() {
        let config = GameConfig {
            seed: Some(5),
            ..GameConfig::for_variant(Variant::Invaders)
        };
        let mut session = Session::new(config, 400.0, 300.0);
        session.tick(InputFlags::NONE, Duration::from_millis(1100));
        assert_eq!(session.targets.len(), 1);
        assert_eq!(session.targets[0].shape, TargetShape::Invader);
    }
}
