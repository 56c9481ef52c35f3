use color_eyre::Result;
use log::{debug, info};
use ratatui::{Terminal, backend::Backend, layout::Rect};
use std::time::{Duration, Instant};

use crate::audio::AudioManager;
use crate::config::GameConfig;
use crate::input::{InputAction, InputManager};
use crate::renderer::{ButtonLayout, GameRenderer, RenderView, logical_size, play_area};
use crate::session::{GameEvent, GameState, Session};

/// Frame times above this are clamped so a stall (window drag, suspend)
/// cannot fast-forward the timers
pub const MAX_FRAME_DT: Duration = Duration::from_millis(250);
const FRAME_SLEEP: Duration = Duration::from_millis(8);

/// The main application: owns the session and wires it to the terminal
pub struct App {
    running: bool,
    session: Session,
    last_frame_time: Instant,
    fps: u32,
    /// internal components
    input_manager: InputManager,
    renderer: GameRenderer,
    audio_manager: AudioManager,
}

impl App {
    /// Construct a new instance of [`App`] for a terminal of the given size.
    pub fn new(
        config: GameConfig,
        terminal_area: Rect,
        reports_release: bool,
        audio_manager: AudioManager,
    ) -> Self {
        let (width, height) = logical_size(play_area(terminal_area));
        let session = Session::new(config, width, height);

        Self {
            running: true,
            renderer: GameRenderer::new(session.config.variant),
            session,
            last_frame_time: Instant::now(),
            fps: 0,
            input_manager: InputManager::new(reports_release),
            audio_manager,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run the application's main loop.
    pub fn run<B: Backend>(mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while self.running {
            let now = Instant::now();
            let frame_time = now.duration_since(self.last_frame_time);
            self.last_frame_time = now;
            if frame_time.as_micros() > 0 {
                self.fps = (1_000_000 / frame_time.as_micros()) as u32;
            }
            let dt = frame_time.min(MAX_FRAME_DT);

            // Adopt the current terminal size before drawing
            let size = terminal.size()?;
            let area = Rect::new(0, 0, size.width, size.height);
            let (width, height) = logical_size(play_area(area));
            self.session.resize(width, height);

            terminal.draw(|frame| {
                let view = RenderView {
                    session: &self.session,
                    area: frame.area(),
                    input: self.input_manager.flags(),
                    muted: self.audio_manager.is_muted(),
                    fps: self.fps,
                };
                self.renderer.render(frame, &view);
            })?;

            let buttons = ButtonLayout::for_area(area);
            self.input_manager
                .poll_events(self.session.game_state, &buttons, dt)?;
            let actions = self.input_manager.actions().to_vec();
            self.process_actions(&actions);

            self.step(dt);

            // Small sleep to prevent CPU spinning
            std::thread::sleep(FRAME_SLEEP);
        }
        info!("Exiting with score {}", self.session.score);
        Ok(())
    }

    /// Applies one-shot actions
    fn process_actions(&mut self, actions: &[InputAction]) {
        for action in actions {
            match action {
                InputAction::Quit => {
                    self.running = false;
                }
                InputAction::Pause => {
                    self.session.pause();
                    debug!("Paused");
                }
                InputAction::Resume => {
                    self.session.resume();
                    debug!("Resumed");
                }
                InputAction::Restart => {
                    if self.session.restart() {
                        self.input_manager.clear();
                    }
                }
                InputAction::ToggleMute => {
                    let muted = self.audio_manager.toggle_mute();
                    info!("Audio {}", if muted { "muted" } else { "unmuted" });
                }
            }
        }
    }

    /// Advances the session one frame and turns its events into sound
    fn step(&mut self, dt: Duration) {
        if self.session.game_state != GameState::Playing {
            return;
        }
        let events = self.session.tick(self.input_manager.flags(), dt);
        for event in &events {
            self.handle_event(event);
        }
    }

    fn handle_event(&self, event: &GameEvent) {
        match event {
            GameEvent::BulletFired => self.audio_manager.play_fire(),
            GameEvent::TargetPopped { .. } => self.audio_manager.play_pop(),
            GameEvent::TargetSpawned => {}
            GameEvent::LifeLost { lives_left } => debug!("Life lost, {lives_left} left"),
            // the session logs ramps and game over itself
            GameEvent::DifficultyRamped { .. } | GameEvent::GameOver { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn app() -> App {
        let config = GameConfig {
            seed: Some(5),
            ..GameConfig::default()
        };
        App::new(config, Rect::new(0, 0, 80, 24), false, AudioManager::silent())
    }

    #[test]
    fn test_new_app_sizes_session_to_terminal() {
        let app = app();
        assert_eq!(app.session().play_width, 640.0);
        assert_eq!(app.session().play_height, 352.0);
        assert_eq!(app.session().seed(), 5);
    }

    #[test]
    fn test_quit_stops_loop() {
        let mut app = app();
        app.process_actions(&[InputAction::Quit]);
        assert!(!app.running);
    }

    #[test]
    fn test_pause_resume_actions() {
        let mut app = app();
        app.process_actions(&[InputAction::Pause]);
        assert_eq!(app.session.game_state, GameState::Paused);
        app.step(Duration::from_millis(16));
        assert_eq!(app.session.frame_count, 0);
        app.process_actions(&[InputAction::Resume]);
        assert_eq!(app.session.game_state, GameState::Playing);
        app.step(Duration::from_millis(16));
        assert_eq!(app.session.frame_count, 1);
    }

    #[test]
    fn test_restart_only_after_game_over() {
        let mut app = app();
        app.step(Duration::from_millis(16));
        app.process_actions(&[InputAction::Restart]);
        assert_eq!(app.session.frame_count, 1);

        app.session.game_state = GameState::GameOver;
        app.process_actions(&[InputAction::Restart]);
        assert_eq!(app.session.game_state, GameState::Playing);
        assert_eq!(app.session.frame_count, 0);
    }

    #[test]
    fn test_toggle_mute() {
        let mut app = app();
        assert!(app.audio_manager.is_muted());
        app.process_actions(&[InputAction::ToggleMute]);
        assert!(!app.audio_manager.is_muted());
    }

    #[test]
    fn test_draws_on_test_backend() {
        let app = app();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal
            .draw(|frame| {
                let view = RenderView {
                    session: &app.session,
                    area: frame.area(),
                    input: app.input_manager.flags(),
                    muted: true,
                    fps: 0,
                };
                app.renderer.render(frame, &view);
            })
            .unwrap();
    }
}
