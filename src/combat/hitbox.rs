//! Geometric hit-testing.
//!
//! Attacks are resolved analytically from the attacker's center and facing
//! angle: a line is a forward/lateral projection test, an arc is a
//! distance + angular-difference test.

use std::f32::consts::{PI, TAU};

use bevy::math::Vec2;

use super::weapons::HitShape;

/// Normalize an angle into (-PI, PI]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Unit vector for a facing angle (radians, x right / y down)
pub fn facing_vector(facing: f32) -> Vec2 {
    Vec2::new(facing.cos(), facing.sin())
}

/// Line test: `0 <= forward <= range` and `|lateral| <= width / 2`
pub fn line_hit(origin: Vec2, facing: f32, target: Vec2, range: f32, width: f32) -> bool {
    let offset = target - origin;
    let dir = facing_vector(facing);
    let forward = offset.dot(dir);
    let lateral = offset.perp_dot(dir);
    (0.0..=range).contains(&forward) && lateral.abs() <= width / 2.0
}

/// Arc test: within `range` and inside half of `arc_angle` around the facing
pub fn arc_hit(origin: Vec2, facing: f32, target: Vec2, range: f32, arc_angle: f32) -> bool {
    let offset = target - origin;
    let distance = offset.length();
    if distance > range {
        return false;
    }
    // standing on the attacker counts as inside any arc
    if distance <= f32::EPSILON {
        return true;
    }
    let to_target = offset.y.atan2(offset.x);
    wrap_angle(to_target - facing).abs() <= arc_angle / 2.0
}

/// Dispatch on a weapon/skill hit shape
pub fn shape_hit(origin: Vec2, facing: f32, target: Vec2, range: f32, shape: HitShape) -> bool {
    match shape {
        HitShape::Line { width } => line_hit(origin, facing, target, range, width),
        HitShape::Arc { angle } => arc_hit(origin, facing, target, range, angle),
    }
}

/// Plain distance check (harvesting, pickups)
pub fn within_range(origin: Vec2, target: Vec2, range: f32) -> bool {
    origin.distance_squared(target) <= range * range
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polar(distance: f32, degrees: f32) -> Vec2 {
        let r = degrees.to_radians();
        Vec2::new(r.cos(), r.sin()) * distance
    }

    #[test]
    fn test_line_hit_and_lateral_miss() {
        let origin = Vec2::ZERO;
        assert!(line_hit(origin, 0.0, Vec2::new(40.0, 0.0), 48.0, 38.0));
        assert!(!line_hit(origin, 0.0, Vec2::new(40.0, 25.0), 48.0, 38.0));
    }

    #[test]
    fn test_line_rejects_behind_and_beyond() {
        let origin = Vec2::new(100.0, 100.0);
        assert!(!line_hit(origin, 0.0, Vec2::new(90.0, 100.0), 48.0, 38.0));
        assert!(!line_hit(origin, 0.0, Vec2::new(149.0, 100.0), 48.0, 38.0));
        // facing down (+y)
        assert!(line_hit(origin, PI / 2.0, Vec2::new(100.0, 130.0), 48.0, 38.0));
    }

    #[test]
    fn test_arc_hit_and_angle_miss() {
        let half_cone = 45f32.to_radians();
        let arc = half_cone * 2.0;
        assert!(arc_hit(Vec2::ZERO, 0.0, polar(30.0, 10.0), 48.0, arc));
        assert!(!arc_hit(Vec2::ZERO, 0.0, polar(30.0, 100.0), 48.0, arc));
        assert!(!arc_hit(Vec2::ZERO, 0.0, polar(60.0, 0.0), 48.0, arc));
    }

    #[test]
    fn test_arc_across_the_seam() {
        // facing just below +PI, target just above -PI
        let facing = 175f32.to_radians();
        let target = polar(20.0, -175.0);
        assert!(arc_hit(Vec2::ZERO, facing, target, 48.0, 30f32.to_radians()));
    }

    #[test]
    fn test_wrap_angle_range() {
        assert!((wrap_angle(3.0 * PI) - PI).abs() < 1e-5);
        assert!((wrap_angle(-PI) - PI).abs() < 1e-5);
        assert!((wrap_angle(0.5) - 0.5).abs() < 1e-6);
        assert!((wrap_angle(-0.5 - TAU) + 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_full_circle_arc_hits_everywhere() {
        for deg in [0.0, 90.0, 180.0, -135.0] {
            assert!(arc_hit(Vec2::ZERO, 0.3, polar(10.0, deg), 48.0, TAU));
        }
    }
}
