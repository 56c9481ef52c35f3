/// A shot travelling straight up from the launcher
#[derive(Debug, Clone, PartialEq)]
pub struct Bullet {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Upward distance per frame
    pub speed: f32,
}

impl Bullet {
    pub fn new(x: f32, y: f32, width: f32, height: f32, speed: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            speed,
        }
    }

    pub fn update(&mut self) {
        self.y -= self.speed;
    }

    /// True once the whole bullet has left through the top edge
    pub fn is_out_of_bounds(&self) -> bool {
        self.y + self.height < 0.0
    }
}
