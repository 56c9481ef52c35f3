use balloon_shooter::{app::App, audio::AudioManager, config::GameConfig, logging};
use color_eyre::Result;
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::info;
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use std::io::stdout;

fn main() -> Result<()> {
    color_eyre::install()?;
    let log_path = logging::init()?;

    // First argument: a variant name or a JSON config path
    let arg = std::env::args().nth(1);
    let (config, source) = GameConfig::load(arg.as_deref())?;
    info!("Loaded config from {source}, logging to {}", log_path.display());

    let supports_keyboard_enhancement = matches!(
        crossterm::terminal::supports_keyboard_enhancement(),
        Ok(true)
    );
    info!("Keyboard enhancement supported: {supports_keyboard_enhancement}");

    let audio_manager = AudioManager::new(config.master_volume, config.muted);
    info!("Audio available: {}", audio_manager.is_available());

    // Setup terminal manually for full control
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    // Enable keyboard enhancement AFTER entering alternate screen
    if supports_keyboard_enhancement {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let size = terminal.size()?;

    let app = App::new(
        config,
        Rect::new(0, 0, size.width, size.height),
        supports_keyboard_enhancement,
        audio_manager,
    );
    let result = app.run(&mut terminal);

    // Cleanup
    if supports_keyboard_enhancement {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}
