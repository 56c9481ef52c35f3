//! Hit tests between bullets and targets
//!
//! Balloons use the carnival game's forgiving circle test; invaders use a
//! plain box overlap.

use crate::entities::{Bullet, Target, TargetShape};

/// Share of the bullet's half-extent that counts toward a balloon hit
const BULLET_REACH: f32 = 0.8;

/// Axis-aligned box, `(x, y)` at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Aabb {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

impl From<&Bullet> for Aabb {
    fn from(bullet: &Bullet) -> Self {
        Aabb::new(bullet.x, bullet.y, bullet.width, bullet.height)
    }
}

impl From<&Target> for Aabb {
    fn from(target: &Target) -> Self {
        Aabb::new(target.x, target.y, target.size, target.size)
    }
}

/// Circle test between a rectangle's center and a circle
///
/// The rectangle contributes its larger half-extent scaled by
/// [`BULLET_REACH`] to the hit distance.
pub fn rect_circle_collide(rect: &Aabb, cx: f32, cy: f32, radius: f32) -> bool {
    let dx = (rect.x + rect.width / 2.0) - cx;
    let dy = (rect.y + rect.height / 2.0) - cy;
    let reach = radius + rect.width.max(rect.height) / 2.0 * BULLET_REACH;
    // squared distances avoid the sqrt
    dx * dx + dy * dy < reach * reach
}

/// Whether `bullet` hits `target`, using the test for the target's shape
pub fn bullet_hits_target(bullet: &Bullet, target: &Target) -> bool {
    let rect = Aabb::from(bullet);
    match target.shape {
        TargetShape::Balloon => {
            let (cx, cy) = target.center();
            rect_circle_collide(&rect, cx, cy, target.radius())
        }
        TargetShape::Invader => rect.overlaps(&Aabb::from(target)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Rgb;

    fn target(shape: TargetShape) -> Target {
        Target::new(100.0, 100.0, 40.0, 2.0, Rgb(255, 0, 0), shape)
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Aabb::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Aabb::new(10.0, 0.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Aabb::new(0.0, 20.0, 10.0, 10.0)));
    }

    #[test]
    fn test_bullet_through_balloon_center_hits() {
        let bullet = Bullet::new(115.0, 111.0, 10.0, 18.0, 12.0);
        assert!(bullet_hits_target(&bullet, &target(TargetShape::Balloon)));
    }

    #[test]
    fn test_balloon_hit_reach_includes_bullet_extent() {
        // balloon center (120, 120), reach = 20 + 9 * 0.8 = 27.2
        let touching = Bullet::new(115.0, 111.0 - 27.0, 10.0, 18.0, 12.0);
        assert!(bullet_hits_target(&touching, &target(TargetShape::Balloon)));

        let missing = Bullet::new(115.0, 111.0 - 27.5, 10.0, 18.0, 12.0);
        assert!(!bullet_hits_target(&missing, &target(TargetShape::Balloon)));
    }

    #[test]
    fn test_balloon_corner_is_not_a_hit() {
        // inside the bounding box but outside the circle reach
        let bullet = Bullet::new(92.0, 84.0, 10.0, 18.0, 12.0);
        assert!(Aabb::from(&bullet).overlaps(&Aabb::from(&target(TargetShape::Balloon))));
        assert!(!bullet_hits_target(&bullet, &target(TargetShape::Balloon)));
    }

    #[test]
    fn test_invader_uses_box_overlap() {
        let bullet = Bullet::new(92.0, 84.0, 10.0, 18.0, 12.0);
        assert!(bullet_hits_target(&bullet, &target(TargetShape::Invader)));

        let bullet = Bullet::new(141.0, 110.0, 10.0, 18.0, 12.0);
        assert!(!bullet_hits_target(&bullet, &target(TargetShape::Invader)));
    }
}
