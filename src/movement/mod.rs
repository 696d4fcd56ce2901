//! Collision-aware movement against tile solidity.
//!
//! Movement is axis-separated: the horizontal delta is attempted first, then
//! the vertical delta from the (possibly updated) horizontal position. Each
//! attempt samples the four corners of the moved bounding box and commits
//! only if none of them land on a blocking tile.

use bevy::math::Vec2;

use crate::entity::Body;
use crate::world::TileGrid;

/// Which axes actually moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveResult {
    pub moved_x: bool,
    pub moved_y: bool,
}

impl MoveResult {
    pub fn moved(&self) -> bool {
        self.moved_x || self.moved_y
    }
}

/// Corner samples shrink the box by this much so an entity flush against a
/// wall does not sample into the wall tile itself
const CORNER_INSET: f32 = 0.01;

/// True when a box at `pos` with `size` touches no blocking tile
pub fn box_is_clear(pos: Vec2, size: Vec2, grid: &TileGrid) -> bool {
    let min = pos;
    let max = pos + size - Vec2::splat(CORNER_INSET);
    let corners = [
        Vec2::new(min.x, min.y),
        Vec2::new(max.x, min.y),
        Vec2::new(min.x, max.y),
        Vec2::new(max.x, max.y),
    ];
    corners.iter().all(|c| !grid.is_solid_px(*c))
}

/// Attempt to translate `body` by `delta`, one axis at a time
pub fn try_move(body: &mut Body, delta: Vec2, grid: &TileGrid) -> MoveResult {
    let mut result = MoveResult::default();

    if delta.x != 0.0 && delta.x.is_finite() {
        let candidate = Vec2::new(body.pos.x + delta.x, body.pos.y);
        if box_is_clear(candidate, body.size, grid) {
            body.pos = candidate;
            result.moved_x = true;
        }
    }

    if delta.y != 0.0 && delta.y.is_finite() {
        let candidate = Vec2::new(body.pos.x, body.pos.y + delta.y);
        if box_is_clear(candidate, body.size, grid) {
            body.pos = candidate;
            result.moved_y = true;
        }
    }

    result
}

/// Normalized movement intent from held direction keys
pub fn input_direction(up: bool, down: bool, left: bool, right: bool) -> Vec2 {
    let mut dir = Vec2::ZERO;
    if up {
        dir.y -= 1.0;
    }
    if down {
        dir.y += 1.0;
    }
    if left {
        dir.x -= 1.0;
    }
    if right {
        dir.x += 1.0;
    }
    dir.normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Tile, TileKind};

    fn room() -> TileGrid {
        // 6x6 open room with a wall ring
        let mut grid = TileGrid::filled(6, 6, TileKind::OpenGround);
        for i in 0..6 {
            grid.set(Tile::new(i, 0, TileKind::SolidWall));
            grid.set(Tile::new(i, 5, TileKind::SolidWall));
            grid.set(Tile::new(0, i, TileKind::SolidWall));
            grid.set(Tile::new(5, i, TileKind::SolidWall));
        }
        grid
    }

    fn body_at(x: f32, y: f32) -> Body {
        Body::new(Vec2::new(x, y), Vec2::splat(20.0), 10.0, 100.0)
    }

    #[test]
    fn test_free_move() {
        let grid = room();
        let mut body = body_at(64.0, 64.0);
        let result = try_move(&mut body, Vec2::new(10.0, 5.0), &grid);
        assert!(result.moved_x && result.moved_y);
        assert_eq!(body.pos, Vec2::new(74.0, 69.0));
    }

    #[test]
    fn test_diagonal_slides_along_wall() {
        let grid = room();
        // flush against the left wall (wall tile spans 0..32)
        let mut body = body_at(32.0, 64.0);
        let result = try_move(&mut body, Vec2::new(-8.0, 8.0), &grid);
        assert!(!result.moved_x);
        assert!(result.moved_y);
        assert_eq!(body.pos, Vec2::new(32.0, 72.0));
    }

    #[test]
    fn test_blocked_both_axes_in_corner() {
        let grid = room();
        let mut body = body_at(32.0, 32.0);
        let result = try_move(&mut body, Vec2::new(-4.0, -4.0), &grid);
        assert!(!result.moved());
        assert_eq!(body.pos, Vec2::new(32.0, 32.0));
    }

    #[test]
    fn test_uninitialized_cells_block() {
        let mut grid = TileGrid::new(4, 4);
        grid.set(Tile::new(1, 1, TileKind::OpenGround));
        let mut body = body_at(34.0, 34.0);
        // any step leaves the single initialized tile
        let result = try_move(&mut body, Vec2::new(20.0, 0.0), &grid);
        assert!(!result.moved_x);
    }

    #[test]
    fn test_out_of_bounds_blocks() {
        let grid = TileGrid::filled(4, 4, TileKind::OpenGround);
        let mut body = body_at(2.0, 2.0);
        let result = try_move(&mut body, Vec2::new(-5.0, 0.0), &grid);
        assert!(!result.moved_x);
    }

    #[test]
    fn test_input_direction_normalized() {
        let dir = input_direction(true, false, false, true);
        assert!((dir.length() - 1.0).abs() < 1e-5);
        assert_eq!(input_direction(true, true, false, false), Vec2::ZERO);
    }
}
