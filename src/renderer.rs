use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Alignment, Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Block, Borders, Clear, Paragraph,
        canvas::{Canvas, Circle, Context, Line as CanvasLine, Points, Rectangle},
    },
};

use crate::config::Variant;
use crate::entities::{Bullet, Particle, Player, Rgb, Target, TargetShape};
use crate::input::{Control, InputFlags};
use crate::session::{GameState, Session};

/// Logical units covered by one terminal cell
pub const CELL_WIDTH: f32 = 8.0;
pub const CELL_HEIGHT: f32 = 16.0;

const LEFT_LABEL: &str = "[ <- ]";
const FIRE_LABEL: &str = "[ FIRE ]";
const RIGHT_LABEL: &str = "[ -> ]";
const RESTART_LABEL: &str = "[ RESTART ]";

/// The rows between the HUD line and the button bar
pub fn play_area(area: Rect) -> Rect {
    Rect {
        x: area.x,
        y: area.y + 1u16.min(area.height),
        width: area.width,
        height: area.height.saturating_sub(2),
    }
}

/// Logical size of a play area rect
pub fn logical_size(play: Rect) -> (f32, f32) {
    (
        f32::from(play.width) * CELL_WIDTH,
        f32::from(play.height) * CELL_HEIGHT,
    )
}

/// Screen positions of the clickable on-screen buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonLayout {
    pub left: Rect,
    pub fire: Rect,
    pub right: Rect,
    /// Only shown (and clickable) on the game-over screen
    pub restart: Rect,
}

impl ButtonLayout {
    pub fn for_area(area: Rect) -> Self {
        let row = area.y + area.height.saturating_sub(1);
        let label_width = |label: &str| label.len() as u16;

        let left = Rect::new(area.x + 1, row, label_width(LEFT_LABEL), 1);
        let right_w = label_width(RIGHT_LABEL);
        let right = Rect::new(area.x + area.width.saturating_sub(right_w + 1), row, right_w, 1);
        let fire_w = label_width(FIRE_LABEL);
        let fire = Rect::new(area.x + area.width.saturating_sub(fire_w) / 2, row, fire_w, 1);
        let restart_w = label_width(RESTART_LABEL);
        let restart = Rect::new(
            area.x + area.width.saturating_sub(restart_w) / 2,
            area.y + area.height / 2 + 3,
            restart_w,
            1,
        );

        Self {
            left,
            fire,
            right,
            restart,
        }
    }

    /// Which movement/fire button covers a screen cell
    pub fn control_at(&self, position: Position) -> Option<Control> {
        if self.left.contains(position) {
            Some(Control::Left)
        } else if self.right.contains(position) {
            Some(Control::Right)
        } else if self.fire.contains(position) {
            Some(Control::Fire)
        } else {
            None
        }
    }
}

/// Everything the renderer needs for one frame
pub struct RenderView<'a> {
    pub session: &'a Session,
    pub area: Rect,
    /// Held inputs, to light up pressed buttons
    pub input: InputFlags,
    pub muted: bool,
    pub fps: u32,
}

struct Theme {
    background: Color,
    player_body: Color,
    player_barrel: Color,
    player_wheels: Color,
    bullet: Color,
    accent: Color,
}

impl Theme {
    fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Balloons => Self {
                background: Color::Rgb(0x87, 0xce, 0xeb),
                player_body: Color::Rgb(0x00, 0xb4, 0xd8),
                player_barrel: Color::Rgb(0x35, 0x2f, 0x3b),
                player_wheels: Color::Rgb(0x07, 0x3b, 0x4c),
                bullet: Color::Rgb(0xff, 0xf1, 0x76),
                accent: Color::Yellow,
            },
            Variant::Invaders => Self {
                background: Color::Black,
                player_body: Color::Green,
                player_barrel: Color::LightGreen,
                player_wheels: Color::DarkGray,
                bullet: Color::White,
                accent: Color::Green,
            },
        }
    }
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Darkens a color toward black as `alpha` goes to zero
fn fade(rgb: Rgb, alpha: f32) -> Color {
    let scale = |c: u8| (f32::from(c) * alpha).round() as u8;
    Color::Rgb(scale(rgb.0), scale(rgb.1), scale(rgb.2))
}

/// Handles all drawing; holds no game state
pub struct GameRenderer {
    theme: Theme,
}

impl GameRenderer {
    pub fn new(variant: Variant) -> Self {
        Self {
            theme: Theme::for_variant(variant),
        }
    }

    /// Draws a frame for the current state
    pub fn render(&self, frame: &mut Frame, view: &RenderView) {
        self.render_game(frame, view);
        match view.session.game_state {
            GameState::Playing => {}
            GameState::Paused => self.render_paused(frame, view),
            GameState::GameOver => self.render_game_over(frame, view),
        }
    }

    fn render_game(&self, frame: &mut Frame, view: &RenderView) {
        let area = view.area;
        let session = view.session;
        let play = play_area(area);
        let width = f64::from(session.play_width);
        let height = f64::from(session.play_height);

        let canvas = Canvas::default()
            .background_color(self.theme.background)
            .marker(Marker::Braille)
            .x_bounds([0.0, width])
            .y_bounds([0.0, height])
            .paint(|ctx| {
                if session.config.variant == Variant::Balloons {
                    self.draw_clouds(ctx, session);
                    ctx.layer();
                }
                for target in &session.targets {
                    self.draw_target(ctx, session, target);
                }
                self.draw_player(ctx, session, &session.player);
                for bullet in &session.bullets {
                    self.draw_bullet(ctx, session, bullet);
                }
                for particle in &session.particles {
                    self.draw_particle(ctx, session, particle);
                }
            });
        frame.render_widget(canvas, play);

        self.render_hud(frame, view);
        self.render_buttons(frame.buffer_mut(), view);
    }

    fn draw_clouds(&self, ctx: &mut Context, session: &Session) {
        let width = session.play_width;
        let height = session.play_height;
        for i in 0..3 {
            let phase = session.frame_count as f32 / 30.0 + i as f32;
            let cx = (i as f32 * 0.33 + 0.15) * width;
            let cy = height * 0.12 + phase.sin() * 6.0;
            ctx.draw(&Circle {
                x: f64::from(cx),
                y: flip(session, cy),
                radius: f64::from(width * 0.05),
                color: Color::White,
            });
        }
    }

    fn draw_target(&self, ctx: &mut Context, session: &Session, target: &Target) {
        let color = to_color(target.color);
        match target.shape {
            TargetShape::Balloon => {
                let (cx, cy) = target.center();
                // concentric rings read as a filled balloon in braille
                for scale in [1.0, 0.7, 0.4] {
                    ctx.draw(&Circle {
                        x: f64::from(cx),
                        y: flip(session, cy),
                        radius: f64::from(target.radius() * scale),
                        color,
                    });
                }
                ctx.draw(&CanvasLine {
                    x1: f64::from(cx),
                    y1: flip(session, target.y + target.size),
                    x2: f64::from(cx),
                    y2: flip(session, target.y + target.size + 18.0),
                    color: Color::Gray,
                });
                ctx.draw(&Points {
                    coords: &[(
                        f64::from(cx - target.size * 0.18),
                        flip(session, cy - target.size * 0.26),
                    )],
                    color: Color::White,
                });
            }
            TargetShape::Invader => {
                let size = target.size;
                ctx.draw(&Rectangle {
                    x: f64::from(target.x),
                    y: flip(session, target.y + size),
                    width: f64::from(size),
                    height: f64::from(size),
                    color,
                });
                ctx.draw(&Rectangle {
                    x: f64::from(target.x + size * 0.25),
                    y: flip(session, target.y + size * 0.75),
                    width: f64::from(size * 0.5),
                    height: f64::from(size * 0.5),
                    color,
                });
                // eyes
                ctx.draw(&Points {
                    coords: &[
                        (
                            f64::from(target.x + size * 0.3),
                            flip(session, target.y + size * 0.35),
                        ),
                        (
                            f64::from(target.x + size * 0.7),
                            flip(session, target.y + size * 0.35),
                        ),
                    ],
                    color: Color::White,
                });
            }
        }
    }

    fn draw_player(&self, ctx: &mut Context, session: &Session, player: &Player) {
        let (x, y, w, h) = (player.x, player.y, player.width, player.height);
        ctx.draw(&Rectangle {
            x: f64::from(x + w / 2.0 - 6.0),
            y: flip(session, y),
            width: 12.0,
            height: f64::from(h * 0.9),
            color: self.theme.player_barrel,
        });
        ctx.draw(&Rectangle {
            x: f64::from(x),
            y: flip(session, y + h),
            width: f64::from(w),
            height: f64::from(h),
            color: self.theme.player_body,
        });
        for wheel_x in [x + w * 0.15, x + w * 0.85] {
            ctx.draw(&Circle {
                x: f64::from(wheel_x),
                y: flip(session, y + h + 6.0),
                radius: 8.0,
                color: self.theme.player_wheels,
            });
        }
    }

    fn draw_bullet(&self, ctx: &mut Context, session: &Session, bullet: &Bullet) {
        ctx.draw(&Rectangle {
            x: f64::from(bullet.x),
            y: flip(session, bullet.y + bullet.height),
            width: f64::from(bullet.width),
            height: f64::from(bullet.height),
            color: self.theme.bullet,
        });
    }

    fn draw_particle(&self, ctx: &mut Context, session: &Session, particle: &Particle) {
        ctx.draw(&Points {
            coords: &[(f64::from(particle.x), flip(session, particle.y))],
            color: fade(particle.color, particle.alpha()),
        });
    }

    fn render_hud(&self, frame: &mut Frame, view: &RenderView) {
        let area = view.area;
        let session = view.session;
        let minutes = session.elapsed.as_secs() / 60;
        let seconds = session.elapsed.as_secs() % 60;
        let label = Style::default().fg(Color::DarkGray);
        let value = Style::default()
            .fg(self.theme.accent)
            .add_modifier(Modifier::BOLD);

        let lives_style = if session.lives > 1 {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK)
        };

        let mut stats = vec![
            Span::styled("Score: ", label),
            Span::styled(format!("{}", session.score), value),
            Span::styled("  Lives: ", label),
            Span::styled(format!("{}", session.lives), lives_style),
            Span::styled("  Level: ", label),
            Span::styled(format!("{}", session.difficulty.level + 1), value),
            Span::styled("  Time: ", label),
            Span::styled(format!("{:02}:{:02}", minutes, seconds), value),
        ];
        if view.muted {
            stats.push(Span::styled("  [muted]", label));
        }

        let hud_area = Rect {
            x: area.x + 1u16.min(area.width),
            y: area.y,
            width: area.width.saturating_sub(2),
            height: 1u16.min(area.height),
        };
        frame.render_widget(Paragraph::new(Line::from(stats)), hud_area);

        let title = Line::from(vec![
            Span::styled(
                session.config.variant.title(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  FPS: {}", view.fps), label),
        ]);
        frame.render_widget(Paragraph::new(title).alignment(Alignment::Right), hud_area);
    }

    /// Draws the on-screen controls straight into the buffer
    fn render_buttons(&self, buffer: &mut Buffer, view: &RenderView) {
        let layout = ButtonLayout::for_area(view.area);
        let buttons = [
            (layout.left, LEFT_LABEL, view.input.left),
            (layout.fire, FIRE_LABEL, view.input.fire),
            (layout.right, RIGHT_LABEL, view.input.right),
        ];

        for (rect, text, pressed) in buttons {
            if !buffer.area.contains(Position::new(rect.x, rect.y)) {
                continue;
            }
            let mut style = Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD);
            if pressed {
                style = style.add_modifier(Modifier::REVERSED);
            }
            buffer.set_string(rect.x, rect.y, text, style);
        }
    }

    /// Renders the pause box over the frozen game
    fn render_paused(&self, frame: &mut Frame, view: &RenderView) {
        let area = view.area;
        let pause_text = vec![
            Line::from(""),
            Line::from("PAUSED").centered().bold().yellow(),
            Line::from(""),
            Line::from("Press P to resume").centered().white(),
        ];

        let pause_area = centered_rect(area, 30, 6);
        frame.render_widget(Clear, pause_area);
        frame.render_widget(
            Paragraph::new(pause_text)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Yellow)),
                )
                .alignment(Alignment::Center),
            pause_area,
        );
    }

    /// Renders the game over box with the final score and restart control
    fn render_game_over(&self, frame: &mut Frame, view: &RenderView) {
        let area = view.area;
        let session = view.session;
        let minutes = session.elapsed.as_secs() / 60;
        let seconds = session.elapsed.as_secs() % 60;

        let game_over_text = vec![
            Line::from("GAME OVER").centered().red().bold(),
            Line::from(""),
            Line::from(format!("Score: {}", session.score))
                .centered()
                .yellow()
                .bold(),
            Line::from(format!("Time: {:02}:{:02}", minutes, seconds))
                .centered()
                .cyan(),
            Line::from(""),
            Line::from("R / Enter to restart, Q to quit")
                .centered()
                .white(),
        ];

        let box_area = Rect {
            x: area.x + area.width.saturating_sub(36) / 2,
            y: area.y + (area.height / 2).saturating_sub(4),
            width: 36u16.min(area.width),
            height: 9u16.min(area.height),
        };
        frame.render_widget(Clear, box_area);
        frame.render_widget(
            Paragraph::new(game_over_text)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Red)),
                )
                .alignment(Alignment::Center),
            box_area,
        );

        let restart = ButtonLayout::for_area(area).restart;
        let buffer = frame.buffer_mut();
        if buffer.area.contains(Position::new(restart.x, restart.y)) {
            buffer.set_string(
                restart.x,
                restart.y,
                RESTART_LABEL,
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        }
    }
}

/// Converts a y coordinate (down from the top) to canvas space (up from
/// the bottom)
fn flip(session: &Session, y: f32) -> f64 {
    f64::from(session.play_height - y)
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
