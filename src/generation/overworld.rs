//! Overworld chunks: random-walk carve through mountains.
//!
//! The walker starts at the map center, so the spawn tile is always open.
//! Trees and rock outcrops are scattered over open ground by independent
//! per-tile rolls. The three special entrances are also rolled independently
//! and the last success decides the kind, so a chunk holds zero or one
//! entrance.

use rand::Rng;

use super::{GeneratedLocation, MapParams};
use crate::constants::{
    DUNGEON_ENTRANCE_CHANCE, ENTRANCE_MIN_DISTANCE, ENTRANCE_RETRY_CAP, MINE_ENTRANCE_CHANCE,
    OVERWORLD_FLOOR_TARGET, OVERWORLD_STEP_BUDGET_FACTOR, ROCK_OUTCROP_CHANCE,
    TOWN_ENTRANCE_CHANCE, TREE_CHANCE,
};
use crate::entity::IdGen;
use crate::harvest::{HarvestKind, ResourceNode};
use crate::world::{Location, Tile, TileGrid, TileKind, TileMeta, TilePos};

/// Open-tile count the carve must reach
pub fn floor_target(params: MapParams) -> usize {
    (OVERWORLD_FLOOR_TARGET * params.area() as f32).ceil() as usize
}

/// Random-walk carve; returns the number of open tiles
pub fn carve_walk(grid: &mut TileGrid, start: TilePos, rng: &mut impl Rng) -> usize {
    let target = floor_target(MapParams::new(grid.width, grid.height));
    let budget = OVERWORLD_STEP_BUDGET_FACTOR * grid.area();
    let (max_x, max_y) = (grid.width - 2, grid.height - 2);

    let (mut x, mut y) = (start.x.clamp(1, max_x), start.y.clamp(1, max_y));
    grid.set(Tile::new(x, y, TileKind::OpenGround));
    let mut open = 1;

    let mut steps = 0;
    while open < target && steps < budget {
        match rng.gen_range(0..4) {
            0 => y = y.saturating_sub(1).max(1),
            1 => y = (y + 1).min(max_y),
            2 => x = x.saturating_sub(1).max(1),
            _ => x = (x + 1).min(max_x),
        }
        if grid.kind_at(TilePos::new(x, y)) != Some(TileKind::OpenGround) {
            grid.set(Tile::new(x, y, TileKind::OpenGround));
            open += 1;
        }
        steps += 1;
    }

    if open < target {
        tracing::warn!(open, target, "Overworld step budget exhausted before coverage");
    }
    open
}

/// Independent entrance rolls, last success wins
fn roll_entrance(rng: &mut impl Rng) -> Option<TileKind> {
    let mut kind = None;
    if rng.gen::<f32>() < TOWN_ENTRANCE_CHANCE {
        kind = Some(TileKind::TownEntrance);
    }
    if rng.gen::<f32>() < DUNGEON_ENTRANCE_CHANCE {
        kind = Some(TileKind::DungeonEntrance);
    }
    if rng.gen::<f32>() < MINE_ENTRANCE_CHANCE {
        kind = Some(TileKind::MineEntrance);
    }
    kind
}

/// Rejection-sample an open interior cell far enough from spawn
fn place_entrance(
    grid: &mut TileGrid,
    spawn: TilePos,
    kind: TileKind,
    rng: &mut impl Rng,
) -> Option<TilePos> {
    for _ in 0..ENTRANCE_RETRY_CAP {
        let pos = TilePos::new(
            rng.gen_range(1..grid.width - 1),
            rng.gen_range(1..grid.height - 1),
        );
        if grid.is_passable(pos) && pos.distance(spawn) >= ENTRANCE_MIN_DISTANCE {
            let mut tile = Tile::new(pos.x, pos.y, kind);
            match kind {
                TileKind::DungeonEntrance => {
                    tile = tile.with_meta(TileMeta::Entrance {
                        max_depth: rng.gen_range(3..=5),
                    });
                }
                TileKind::MineEntrance => {
                    tile = tile.with_meta(TileMeta::Entrance {
                        max_depth: rng.gen_range(3..=6),
                    });
                }
                _ => {}
            }
            grid.set(tile);
            return Some(pos);
        }
    }
    tracing::warn!(?kind, "No cell for special entrance, skipping");
    None
}

pub fn generate(
    location: Location,
    params: MapParams,
    ids: &mut IdGen,
    rng: &mut impl Rng,
) -> GeneratedLocation {
    let mut grid = TileGrid::filled(params.width, params.height, TileKind::Mountain);
    let spawn = params.center();
    carve_walk(&mut grid, spawn, rng);

    let entrance = roll_entrance(rng).and_then(|kind| place_entrance(&mut grid, spawn, kind, rng));

    let mut resources = Vec::new();
    for y in 1..params.height - 1 {
        for x in 1..params.width - 1 {
            let pos = TilePos::new(x, y);
            if pos == spawn || Some(pos) == entrance {
                continue;
            }
            if grid.kind_at(pos) != Some(TileKind::OpenGround) {
                continue;
            }
            let roll = rng.gen::<f32>();
            if roll < TREE_CHANCE {
                resources.push(ResourceNode::at_tile(ids, HarvestKind::Tree, pos));
            } else if roll < TREE_CHANCE + ROCK_OUTCROP_CHANCE {
                resources.push(ResourceNode::at_tile(ids, HarvestKind::Rock, pos));
            }
        }
    }

    GeneratedLocation {
        location,
        grid,
        spawn,
        boss_spawn: None,
        chests: Vec::new(),
        npcs: Vec::new(),
        resources,
    }
}

/// Neighbouring chunk offset when `pos` sits on the walkable rim
pub fn edge_exit(grid: &TileGrid, pos: TilePos) -> Option<(i32, i32)> {
    if pos.x <= 1 {
        Some((-1, 0))
    } else if pos.x + 2 >= grid.width {
        Some((1, 0))
    } else if pos.y <= 1 {
        Some((0, -1))
    } else if pos.y + 2 >= grid.height {
        Some((0, 1))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn world() -> Location {
        Location::default()
    }

    #[test]
    fn test_coverage_and_spawn() {
        for seed in 0..5 {
            let mut ids = IdGen::default();
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            let params = MapParams::new(48, 40);
            let gen = generate(world(), params, &mut ids, &mut rng);
            assert!(gen.grid.passable_count() >= floor_target(params));
            assert!(gen.grid.is_passable(gen.spawn));
        }
    }

    #[test]
    fn test_border_stays_mountain() {
        let mut ids = IdGen::default();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let gen = generate(world(), MapParams::new(32, 32), &mut ids, &mut rng);
        for i in 0..32 {
            assert_eq!(gen.grid.kind_at(TilePos::new(i, 0)), Some(TileKind::Mountain));
            assert_eq!(gen.grid.kind_at(TilePos::new(0, i)), Some(TileKind::Mountain));
            assert_eq!(gen.grid.kind_at(TilePos::new(31, i)), Some(TileKind::Mountain));
        }
    }

    #[test]
    fn test_at_most_one_entrance_far_from_spawn() {
        for seed in 0..20 {
            let mut ids = IdGen::default();
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            let gen = generate(world(), MapParams::new(48, 48), &mut ids, &mut rng);
            let entrances: Vec<TilePos> = gen
                .grid
                .tiles()
                .filter(|t| t.kind.is_transition())
                .map(|t| TilePos::new(t.x, t.y))
                .collect();
            assert!(entrances.len() <= 1);
            for e in entrances {
                assert!(e.distance(gen.spawn) >= ENTRANCE_MIN_DISTANCE);
            }
        }
    }

    #[test]
    fn test_entrance_skipped_when_nowhere_to_go() {
        // only the spawn is open, nothing is 12 tiles away
        let mut grid = TileGrid::filled(30, 30, TileKind::Mountain);
        let spawn = TilePos::new(15, 15);
        grid.set(Tile::new(15, 15, TileKind::OpenGround));
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        assert!(place_entrance(&mut grid, spawn, TileKind::MineEntrance, &mut rng).is_none());
        assert_eq!(grid.count_kind(TileKind::MineEntrance), 0);
    }

    #[test]
    fn test_resources_on_open_ground_only() {
        let mut ids = IdGen::default();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);
        let gen = generate(world(), MapParams::new(40, 40), &mut ids, &mut rng);
        assert!(!gen.resources.is_empty());
        for node in &gen.resources {
            let tile = TilePos::from_px(node.body.center()).unwrap();
            assert_eq!(gen.grid.kind_at(tile), Some(TileKind::OpenGround));
            assert_ne!(tile, gen.spawn);
        }
    }

    #[test]
    fn test_edge_exit() {
        let grid = TileGrid::filled(30, 30, TileKind::OpenGround);
        assert_eq!(edge_exit(&grid, TilePos::new(1, 10)), Some((-1, 0)));
        assert_eq!(edge_exit(&grid, TilePos::new(28, 10)), Some((1, 0)));
        assert_eq!(edge_exit(&grid, TilePos::new(10, 28)), Some((0, 1)));
        assert_eq!(edge_exit(&grid, TilePos::new(10, 10)), None);
    }
}
