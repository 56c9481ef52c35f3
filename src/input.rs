use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::layout::Position;
use std::ops::BitOr;
use std::time::Duration;

use crate::renderer::ButtonLayout;
use crate::session::GameState;

/// How long a key press counts as held when the terminal never reports
/// key releases. Key repeat refreshes it.
pub const KEY_HOLD_WINDOW: Duration = Duration::from_millis(150);

/// The three logical inputs every device maps onto
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputFlags {
    pub left: bool,
    pub right: bool,
    pub fire: bool,
}

impl InputFlags {
    pub const NONE: InputFlags = InputFlags {
        left: false,
        right: false,
        fire: false,
    };

    pub fn any(&self) -> bool {
        self.left || self.right || self.fire
    }
}

/// A flag is held if any source holds it
impl BitOr for InputFlags {
    type Output = InputFlags;

    fn bitor(self, rhs: InputFlags) -> InputFlags {
        InputFlags {
            left: self.left || rhs.left,
            right: self.right || rhs.right,
            fire: self.fire || rhs.fire,
        }
    }
}

/// A holdable control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Left,
    Right,
    Fire,
}

/// One-shot actions raised by input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Pause,
    Resume,
    Restart,
    ToggleMute,
    Quit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Hold {
    #[default]
    Released,
    UntilRelease,
    For(Duration),
}

impl Hold {
    fn is_held(&self) -> bool {
        *self != Hold::Released
    }

    fn advance(&mut self, dt: Duration) {
        if let Hold::For(remaining) = *self {
            let remaining = remaining.saturating_sub(dt);
            *self = if remaining.is_zero() {
                Hold::Released
            } else {
                Hold::For(remaining)
            };
        }
    }
}

/// Keyboard device adapter
#[derive(Debug, Default)]
pub struct KeyboardState {
    left: Hold,
    right: Hold,
    fire: Hold,
    /// Whether the terminal sends key release events
    reports_release: bool,
}

impl KeyboardState {
    pub fn new(reports_release: bool) -> Self {
        Self {
            reports_release,
            ..Self::default()
        }
    }

    fn slot(&mut self, control: Control) -> &mut Hold {
        match control {
            Control::Left => &mut self.left,
            Control::Right => &mut self.right,
            Control::Fire => &mut self.fire,
        }
    }

    pub fn press(&mut self, control: Control) {
        let hold = if self.reports_release {
            Hold::UntilRelease
        } else {
            Hold::For(KEY_HOLD_WINDOW)
        };
        *self.slot(control) = hold;
    }

    pub fn release(&mut self, control: Control) {
        *self.slot(control) = Hold::Released;
    }

    /// Ages timed holds by one frame
    pub fn advance(&mut self, dt: Duration) {
        self.left.advance(dt);
        self.right.advance(dt);
        self.fire.advance(dt);
    }

    pub fn flags(&self) -> InputFlags {
        InputFlags {
            left: self.left.is_held(),
            right: self.right.is_held(),
            fire: self.fire.is_held(),
        }
    }

    pub fn clear(&mut self) {
        self.left = Hold::Released;
        self.right = Hold::Released;
        self.fire = Hold::Released;
    }
}

/// Mouse / touch adapter for the on-screen buttons
#[derive(Debug, Default)]
pub struct PointerState {
    pressed: Option<Control>,
}

impl PointerState {
    pub fn press(&mut self, control: Control) {
        self.pressed = Some(control);
    }

    pub fn release(&mut self) {
        self.pressed = None;
    }

    pub fn pressed(&self) -> Option<Control> {
        self.pressed
    }

    pub fn flags(&self) -> InputFlags {
        InputFlags {
            left: self.pressed == Some(Control::Left),
            right: self.pressed == Some(Control::Right),
            fire: self.pressed == Some(Control::Fire),
        }
    }
}

fn control_for_key(code: KeyCode) -> Option<Control> {
    match code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Control::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Control::Right),
        KeyCode::Char(' ') | KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => {
            Some(Control::Fire)
        }
        _ => None,
    }
}

/// Manages input polling and translates raw terminal events into the
/// shared input flags plus one-shot actions
pub struct InputManager {
    keyboard: KeyboardState,
    pointer: PointerState,
    oneshot_actions: Vec<InputAction>,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new(false)
    }
}

impl InputManager {
    pub fn new(reports_release: bool) -> Self {
        Self {
            keyboard: KeyboardState::new(reports_release),
            pointer: PointerState::default(),
            oneshot_actions: Vec::new(),
        }
    }

    /// Drains every pending terminal event without blocking
    /// Should be called once per frame before reading flags or actions
    pub fn poll_events(
        &mut self,
        game_state: GameState,
        buttons: &ButtonLayout,
        dt: Duration,
    ) -> color_eyre::Result<()> {
        self.oneshot_actions.clear();
        self.keyboard.advance(dt);

        while event::poll(Duration::from_millis(0))? {
            let event = event::read()?;
            self.handle_event(event, game_state, buttons);
        }

        Ok(())
    }

    /// Routes one terminal event to the matching device adapter
    pub fn handle_event(&mut self, event: Event, game_state: GameState, buttons: &ButtonLayout) {
        match event {
            Event::Key(key_event) => self.handle_key_event(key_event, game_state),
            Event::Mouse(mouse_event) => self.handle_mouse_event(mouse_event, game_state, buttons),
            // the app re-reads the terminal size every frame
            Event::Resize(_, _) => {}
            Event::FocusLost => {
                self.keyboard.clear();
                self.pointer.release();
            }
            _ => {}
        }
    }

    fn handle_key_event(&mut self, key_event: KeyEvent, game_state: GameState) {
        match key_event.kind {
            KeyEventKind::Press => self.handle_key_press(key_event, game_state),
            KeyEventKind::Repeat => {
                if !self.keyboard.reports_release
                    && let Some(control) = control_for_key(key_event.code)
                {
                    self.keyboard.press(control);
                }
            }
            KeyEventKind::Release => {
                if let Some(control) = control_for_key(key_event.code) {
                    self.keyboard.release(control);
                }
            }
        }
    }

    fn handle_key_press(&mut self, key_event: KeyEvent, game_state: GameState) {
        // Quit works in any state
        if matches!(
            key_event.code,
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc
        ) || (matches!(key_event.code, KeyCode::Char('c') | KeyCode::Char('C'))
            && key_event.modifiers.contains(KeyModifiers::CONTROL))
        {
            self.oneshot_actions.push(InputAction::Quit);
            return;
        }

        if matches!(key_event.code, KeyCode::Char('m') | KeyCode::Char('M')) {
            self.oneshot_actions.push(InputAction::ToggleMute);
            return;
        }

        match game_state {
            GameState::Playing => {
                if matches!(key_event.code, KeyCode::Char('p') | KeyCode::Char('P')) {
                    self.oneshot_actions.push(InputAction::Pause);
                    return;
                }
            }
            GameState::Paused => {
                if matches!(key_event.code, KeyCode::Char('p') | KeyCode::Char('P')) {
                    self.oneshot_actions.push(InputAction::Resume);
                }
                return;
            }
            GameState::GameOver => {
                if matches!(
                    key_event.code,
                    KeyCode::Char('r') | KeyCode::Char('R') | KeyCode::Enter
                ) {
                    self.oneshot_actions.push(InputAction::Restart);
                }
                return;
            }
        }

        if let Some(control) = control_for_key(key_event.code) {
            self.keyboard.press(control);
        }
    }

    fn handle_mouse_event(
        &mut self,
        mouse_event: MouseEvent,
        game_state: GameState,
        buttons: &ButtonLayout,
    ) {
        let position = Position::new(mouse_event.column, mouse_event.row);
        match mouse_event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if game_state == GameState::GameOver {
                    if buttons.restart.contains(position) {
                        self.oneshot_actions.push(InputAction::Restart);
                    }
                    return;
                }
                if game_state == GameState::Playing
                    && let Some(control) = buttons.control_at(position)
                {
                    self.pointer.press(control);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                // Dragging off a button lets go of it
                if let Some(pressed) = self.pointer.pressed()
                    && buttons.control_at(position) != Some(pressed)
                {
                    self.pointer.release();
                }
            }
            MouseEventKind::Up(_) => self.pointer.release(),
            _ => {}
        }
    }

    /// Current flags with OR semantics across keyboard and pointer
    pub fn flags(&self) -> InputFlags {
        self.keyboard.flags() | self.pointer.flags()
    }

    /// One-shot actions gathered by the last poll
    pub fn actions(&self) -> &[InputAction] {
        &self.oneshot_actions
    }

    /// Drops all held inputs (used on restart)
    pub fn clear(&mut self) {
        self.keyboard.clear();
        self.pointer.release();
        self.oneshot_actions.clear();
    }
}
