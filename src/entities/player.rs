use super::bullet::Bullet;

/// The launcher at the bottom of the play area
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Horizontal distance covered per frame while a direction is held
    pub speed: f32,
}

impl Player {
    /// Creates a player sized for, and centered in, the given play area
    pub fn new(play_width: f32, play_height: f32, speed: Option<f32>) -> Self {
        let mut player = Self {
            x: 0.0,
            y: 0.0,
            width: 80.0,
            height: 28.0,
            speed: speed.unwrap_or_else(|| Self::speed_for_width(play_width)),
        };
        player.fit_to(play_width, play_height);
        player.x = (play_width - player.width) / 2.0;
        player
    }

    /// Default horizontal speed for a play width
    pub fn speed_for_width(play_width: f32) -> f32 {
        (play_width * 0.0065).round().max(5.0)
    }

    /// Recomputes size and vertical anchor for a play area
    ///
    /// The horizontal position is kept; callers clamp it afterwards.
    pub fn fit_to(&mut self, play_width: f32, play_height: f32) {
        self.width = (play_width * 0.12).floor().clamp(48.0, 100.0);
        self.height = (self.width * 0.35).floor();
        let ground = (play_height * 0.06).floor().max(24.0);
        self.y = play_height - self.height - ground;
    }

    pub fn move_left(&mut self) {
        self.x -= self.speed;
    }

    pub fn move_right(&mut self) {
        self.x += self.speed;
    }

    /// Keeps the launcher `margin` units away from both side walls
    pub fn clamp_to(&mut self, play_width: f32, margin: f32) {
        let max_x = (play_width - self.width - margin).max(margin);
        self.x = self.x.clamp(margin, max_x);
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Builds a bullet leaving the barrel at the launcher's center
    pub fn fire(&self, width: f32, height: f32, speed: f32) -> Bullet {
        Bullet::new(self.center_x() - width / 2.0, self.y - 8.0, width, height, speed)
    }
}
