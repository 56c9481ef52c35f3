/// How a target is drawn and hit-tested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetShape {
    /// Round balloon, circular hit test
    Balloon,
    /// Boxy invader, box overlap hit test
    Invader,
}

/// Plain RGB so the simulation does not depend on the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const BALLOON_PALETTE: [Rgb; 7] = [
    Rgb(0xff, 0x6b, 0x6b),
    Rgb(0xff, 0xb8, 0x6b),
    Rgb(0xff, 0xf5, 0x6b),
    Rgb(0x6b, 0xff, 0x8f),
    Rgb(0x6b, 0xd8, 0xff),
    Rgb(0xb3, 0x6b, 0xff),
    Rgb(0xff, 0x6b, 0xd3),
];

pub const INVADER_PALETTE: [Rgb; 4] = [
    Rgb(0x7c, 0xfc, 0x00),
    Rgb(0x00, 0xff, 0x7f),
    Rgb(0x40, 0xe0, 0xd0),
    Rgb(0xad, 0xff, 0x2f),
];

impl TargetShape {
    pub fn palette(&self) -> &'static [Rgb] {
        match self {
            TargetShape::Balloon => &BALLOON_PALETTE,
            TargetShape::Invader => &INVADER_PALETTE,
        }
    }
}

/// A falling balloon or enemy
///
/// `(x, y)` is the top-left corner of its `size`-square bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    /// Downward distance per frame
    pub speed: f32,
    pub color: Rgb,
    pub shape: TargetShape,
}

impl Target {
    pub fn new(x: f32, y: f32, size: f32, speed: f32, color: Rgb, shape: TargetShape) -> Self {
        Self {
            x,
            y,
            size,
            speed,
            color,
            shape,
        }
    }

    pub fn update(&mut self) {
        self.y += self.speed;
    }

    /// True once the target has dropped a full size below the bottom edge
    pub fn has_escaped(&self, play_height: f32) -> bool {
        self.y - self.size > play_height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.size / 2.0, self.y + self.size / 2.0)
    }

    pub fn radius(&self) -> f32 {
        self.size / 2.0
    }
}
