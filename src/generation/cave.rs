//! Mine levels: cellular-automaton caves.
//!
//! Interior cells start as floor with a fixed probability, then a fixed number
//! of smoothing passes reclassify each cell from its 8-neighbour wall count.
//! Each pass reads a snapshot of the previous generation. Out-of-bounds
//! neighbours count as solid and the border ring stays wall.

use std::collections::VecDeque;

use rand::Rng;

use super::{GeneratedLocation, MapParams};
use crate::constants::{
    CAVE_FLOOR_CHANCE, CAVE_FLOOR_THRESHOLD, CAVE_SMOOTHING_PASSES, CAVE_WALL_THRESHOLD,
    FAR_POINT_SAMPLES, GOLD_MIN_DEPTH, ORE_GOLD_CHANCE, ORE_IRON_CHANCE, ORE_ROCK_CHANCE,
};
use crate::entity::IdGen;
use crate::harvest::{HarvestKind, ResourceNode};
use crate::world::{Location, Tile, TileGrid, TileKind, TilePos};

/// Initial noise, true = solid
pub fn seed_mask(width: usize, height: usize, rng: &mut impl Rng) -> Vec<bool> {
    let mut mask = vec![true; width * height];
    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            mask[y * width + x] = rng.gen::<f32>() >= CAVE_FLOOR_CHANCE;
        }
    }
    mask
}

fn solid_neighbors(mask: &[bool], width: usize, height: usize, x: usize, y: usize) -> usize {
    let mut count = 0;
    for dy in -1i64..=1 {
        for dx in -1i64..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            let outside = nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64;
            if outside || mask[ny as usize * width + nx as usize] {
                count += 1;
            }
        }
    }
    count
}

/// One smoothing generation over a full snapshot of `mask`
pub fn smooth_pass(mask: &[bool], width: usize, height: usize) -> Vec<bool> {
    let mut next = mask.to_vec();
    for y in 0..height {
        for x in 0..width {
            let i = y * width + x;
            if x == 0 || y == 0 || x + 1 == width || y + 1 == height {
                next[i] = true;
                continue;
            }
            let walls = solid_neighbors(mask, width, height, x, y);
            if walls >= CAVE_WALL_THRESHOLD {
                next[i] = true;
            } else if walls <= CAVE_FLOOR_THRESHOLD {
                next[i] = false;
            }
        }
    }
    next
}

/// Seed and smooth a cave mask
pub fn cave_mask(width: usize, height: usize, rng: &mut impl Rng) -> Vec<bool> {
    let mut mask = seed_mask(width, height, rng);
    for _ in 0..CAVE_SMOOTHING_PASSES {
        mask = smooth_pass(&mask, width, height);
    }
    mask
}

/// One weighted ore roll, gold gated by depth
pub fn roll_ore(depth: u32, rng: &mut impl Rng) -> Option<HarvestKind> {
    let roll = rng.gen::<f32>();
    let mut acc = 0.0;
    if depth >= GOLD_MIN_DEPTH {
        acc += ORE_GOLD_CHANCE;
        if roll < acc {
            return Some(HarvestKind::GoldOre);
        }
    }
    acc += ORE_IRON_CHANCE;
    if roll < acc {
        return Some(HarvestKind::IronOre);
    }
    acc += ORE_ROCK_CHANCE;
    if roll < acc {
        return Some(HarvestKind::Rock);
    }
    None
}

/// Passable cells 4-connected to `start`, indexed `y * width + x`
pub fn region_from(grid: &TileGrid, start: TilePos) -> Vec<bool> {
    let mut seen = vec![false; grid.width * grid.height];
    if !grid.is_passable(start) {
        return seen;
    }
    seen[start.y * grid.width + start.x] = true;
    let mut queue = VecDeque::from([start]);
    while let Some(pos) = queue.pop_front() {
        let (x, y) = (pos.x as i64, pos.y as i64);
        for (nx, ny) in [(x + 1, y), (x - 1, y), (x, y + 1), (x, y - 1)] {
            if !grid.in_bounds(nx, ny) {
                continue;
            }
            let next = TilePos::new(nx as usize, ny as usize);
            let idx = next.y * grid.width + next.x;
            if !seen[idx] && grid.is_passable(next) {
                seen[idx] = true;
                queue.push_back(next);
            }
        }
    }
    seen
}

/// Carve an L-shaped dirt tunnel, horizontal leg first
fn carve_tunnel(grid: &mut TileGrid, from: TilePos, to: TilePos) {
    let (x0, x1) = (from.x.min(to.x), from.x.max(to.x));
    for x in x0..=x1 {
        if !grid.is_passable(TilePos::new(x, from.y)) {
            grid.set(Tile::carved(x, from.y, TileKind::Dirt));
        }
    }
    let (y0, y1) = (from.y.min(to.y), from.y.max(to.y));
    for y in y0..=y1 {
        if !grid.is_passable(TilePos::new(to.x, y)) {
            grid.set(Tile::carved(to.x, y, TileKind::Dirt));
        }
    }
}

/// Tunnel from `spawn` to the largest open region when spawn sits in a
/// smaller pocket. Returns spawn's region after any join.
fn join_largest_region(grid: &mut TileGrid, spawn: TilePos) -> Vec<bool> {
    let region = region_from(grid, spawn);
    let own = region.iter().filter(|c| **c).count();

    let mut visited = region.clone();
    let mut largest: Option<(Vec<bool>, usize)> = None;
    for y in 1..grid.height - 1 {
        for x in 1..grid.width - 1 {
            let pos = TilePos::new(x, y);
            if visited[y * grid.width + x] || !grid.is_passable(pos) {
                continue;
            }
            let other = region_from(grid, pos);
            let size = other.iter().filter(|c| **c).count();
            for (v, o) in visited.iter_mut().zip(&other) {
                *v |= *o;
            }
            if size > own && largest.as_ref().is_none_or(|(_, best)| size > *best) {
                largest = Some((other, size));
            }
        }
    }

    let Some((other, size)) = largest else {
        return region;
    };
    let nearest = other
        .iter()
        .enumerate()
        .filter(|(_, open)| **open)
        .map(|(i, _)| TilePos::new(i % grid.width, i / grid.width))
        .min_by(|a, b| a.distance_sq(spawn).total_cmp(&b.distance_sq(spawn)));
    if let Some(to) = nearest {
        carve_tunnel(grid, spawn, to);
        tracing::debug!(own, size, ?to, "Cave spawn pocket joined to main region");
    }
    region_from(grid, spawn)
}

/// Farthest cell of `region` from `from` among bounded random samples
fn far_point(
    grid: &TileGrid,
    region: &[bool],
    from: TilePos,
    rng: &mut impl Rng,
) -> Option<TilePos> {
    let mut best: Option<(TilePos, f32)> = None;
    for _ in 0..FAR_POINT_SAMPLES {
        let pos = TilePos::new(
            rng.gen_range(1..grid.width - 1),
            rng.gen_range(1..grid.height - 1),
        );
        if pos == from || !region[pos.y * grid.width + pos.x] {
            continue;
        }
        let d = pos.distance_sq(from);
        if best.is_none_or(|(_, bd)| d > bd) {
            best = Some((pos, d));
        }
    }
    best.map(|(pos, _)| pos)
}

pub fn generate(
    location: Location,
    params: MapParams,
    ids: &mut IdGen,
    rng: &mut impl Rng,
) -> GeneratedLocation {
    let (w, h) = (params.width, params.height);
    let mask = cave_mask(w, h, rng);

    let mut grid = TileGrid::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let kind = if mask[y * w + x] {
                TileKind::SolidWall
            } else {
                TileKind::Dirt
            };
            grid.set(Tile::new(x, y, kind));
        }
    }

    let spawn = params.center();
    if !grid.is_passable(spawn) {
        for y in spawn.y - 1..=spawn.y + 1 {
            for x in spawn.x - 1..=spawn.x + 1 {
                grid.set(Tile::carved(x, y, TileKind::Dirt));
            }
        }
        tracing::debug!("Cave spawn was solid, patched");
    }

    let region = join_largest_region(&mut grid, spawn);
    let mut target = match far_point(&grid, &region, spawn, rng) {
        Some(pos) => pos,
        None => {
            let pos = TilePos::new(rng.gen_range(1..w - 1), rng.gen_range(1..h - 1));
            carve_tunnel(&mut grid, spawn, pos);
            tracing::warn!("No open far point in cave, forced one");
            pos
        }
    };

    let mut boss_spawn = None;
    if location.is_bottom() {
        // room for a boss-sized body: 3x3 open cells, off the border ring
        target = TilePos::new(target.x.clamp(2, w - 3), target.y.clamp(2, h - 3));
        for y in target.y - 1..=target.y + 1 {
            for x in target.x - 1..=target.x + 1 {
                if !grid.is_passable(TilePos::new(x, y)) {
                    grid.set(Tile::carved(x, y, TileKind::Dirt));
                }
            }
        }
        boss_spawn = Some(target);
    } else {
        grid.set(Tile::new(target.x, target.y, TileKind::StairsDown));
    }

    let depth = location.depth();
    let mut resources = Vec::new();
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let pos = TilePos::new(x, y);
            if grid.kind_at(pos) != Some(TileKind::Dirt) || pos == target {
                continue;
            }
            // keep the arrival area clear
            if pos.x.abs_diff(spawn.x) <= 1 && pos.y.abs_diff(spawn.y) <= 1 {
                continue;
            }
            if let Some(kind) = roll_ore(depth, rng) {
                resources.push(ResourceNode::at_tile(ids, kind, pos));
            }
        }
    }

    GeneratedLocation {
        location,
        grid,
        spawn,
        boss_spawn,
        chests: Vec::new(),
        npcs: Vec::new(),
        resources,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monster::{spawn_enemy, Race, Rank};
    use crate::movement::box_is_clear;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn mine(level: u32, max_depth: u32) -> Location {
        Location::Mine { level, max_depth }
    }

    #[test]
    fn test_smoothing_deterministic() {
        let a = cave_mask(40, 30, &mut Xoshiro256PlusPlus::seed_from_u64(99));
        let b = cave_mask(40, 30, &mut Xoshiro256PlusPlus::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_smooth_pass_reads_snapshot() {
        // a lone floor cell in solid rock fills in; a lone wall in open floor clears
        let (w, h) = (7, 7);
        let mut mask = vec![true; w * h];
        mask[3 * w + 3] = false;
        let next = smooth_pass(&mask, w, h);
        assert!(next[3 * w + 3]);

        let mut open = vec![false; w * h];
        for y in 0..h {
            for x in 0..w {
                if x == 0 || y == 0 || x + 1 == w || y + 1 == h {
                    open[y * w + x] = true;
                }
            }
        }
        open[3 * w + 3] = true;
        let next = smooth_pass(&open, w, h);
        assert!(!next[3 * w + 3]);
        // neighbours of the cleared cell still saw it as wall in the snapshot
        assert!(!next[3 * w + 2]);
    }

    #[test]
    fn test_border_counts_as_solid() {
        let (w, h) = (5, 5);
        let mask = vec![false; w * h];
        let next = smooth_pass(&mask, w, h);
        assert!(next[0]);
        assert!(next[w * h - 1]);
        assert!(!next[2 * w + 2]);
    }

    #[test]
    fn test_stairs_above_bottom_boss_at_bottom() {
        let params = MapParams::new(48, 48);
        let mut ids = IdGen::default();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(4);
        let upper = generate(mine(1, 3), params, &mut ids, &mut rng);
        assert_eq!(upper.grid.count_kind(TileKind::StairsDown), 1);
        assert!(upper.boss_spawn.is_none());

        let bottom = generate(mine(3, 3), params, &mut ids, &mut rng);
        assert_eq!(bottom.grid.count_kind(TileKind::StairsDown), 0);
        let boss = bottom.boss_spawn.unwrap();
        assert!(bottom.grid.is_passable(boss));
    }

    #[test]
    fn test_exit_reachable_from_spawn() {
        for seed in 0..24 {
            let mut ids = IdGen::default();
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            let level = 1 + (seed % 3) as u32;
            let gen = generate(mine(level, 3), MapParams::new(40, 40), &mut ids, &mut rng);
            let exit = match gen.boss_spawn {
                Some(boss) => boss,
                None => gen.grid.find_kind(TileKind::StairsDown)[0],
            };
            let region = region_from(&gen.grid, gen.spawn);
            assert!(region[exit.y * 40 + exit.x], "seed {seed}: exit {exit:?} cut off");
        }
    }

    #[test]
    fn test_spawn_pocket_joined_to_main_region() {
        let mut grid = TileGrid::filled(20, 20, TileKind::SolidWall);
        // sealed 3x3 pocket around spawn, large open hall elsewhere
        for y in 9..=11 {
            for x in 9..=11 {
                grid.set(Tile::new(x, y, TileKind::Dirt));
            }
        }
        for y in 2..=6 {
            for x in 2..=17 {
                grid.set(Tile::new(x, y, TileKind::Dirt));
            }
        }
        let spawn = TilePos::new(10, 10);
        assert!(!region_from(&grid, spawn)[3 * 20 + 2]);

        let region = join_largest_region(&mut grid, spawn);
        assert!(region[3 * 20 + 2]);
        assert!(region[6 * 20 + 17]);
    }

    #[test]
    fn test_boss_marker_fits_boss_body() {
        for seed in 0..16 {
            let mut ids = IdGen::default();
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            let gen = generate(mine(3, 3), MapParams::new(32, 32), &mut ids, &mut rng);
            let tile = gen.boss_spawn.unwrap();
            // golem is the widest race
            let boss = spawn_enemy(&mut ids, Race::Golem, Rank::Boss, 3, tile.center_px(), 1.0);
            assert!(
                box_is_clear(boss.body.pos, boss.body.size, &gen.grid),
                "seed {seed}: boss at {tile:?} overlaps rock"
            );
        }
    }

    #[test]
    fn test_spawn_always_passable() {
        for seed in 0..10 {
            let mut ids = IdGen::default();
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            let gen = generate(mine(1, 4), MapParams::new(32, 32), &mut ids, &mut rng);
            assert!(gen.grid.is_passable(gen.spawn));
        }
    }

    #[test]
    fn test_gold_gated_by_depth() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(8);
        for _ in 0..5000 {
            assert_ne!(roll_ore(1, &mut rng), Some(HarvestKind::GoldOre));
        }
        let mut saw_gold = false;
        for _ in 0..5000 {
            if roll_ore(GOLD_MIN_DEPTH, &mut rng) == Some(HarvestKind::GoldOre) {
                saw_gold = true;
                break;
            }
        }
        assert!(saw_gold);
    }
}
