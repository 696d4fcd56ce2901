//! Dungeon levels: rectangular rooms joined by L-shaped corridors.
//!
//! Rooms are placed by rejection sampling (bounded attempts per room, 2-tile
//! buffer between rooms). Corridors follow a greedy minimum spanning tree:
//! each step joins the closest (connected, unconnected) room pair by squared
//! center distance. The room adjacency is also kept as a `petgraph` graph,
//! which generation checks for a single component.

use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{GeneratedLocation, GenerationError, MapParams};
use crate::constants::{
    DUNGEON_MAX_ROOMS, DUNGEON_MIN_ROOMS, ROOM_ATTEMPTS, ROOM_BUFFER, ROOM_MAX_SIZE, ROOM_MIN_SIZE,
};
use crate::world::{Location, Tile, TileGrid, TileKind, TilePos};

/// Axis-aligned room in tile coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl Room {
    pub fn center(&self) -> TilePos {
        TilePos::new(self.x + self.w / 2, self.y + self.h / 2)
    }

    /// Overlap test with `buffer` empty tiles required between the rooms
    pub fn intersects(&self, other: &Room, buffer: usize) -> bool {
        self.x < other.x + other.w + buffer
            && other.x < self.x + self.w + buffer
            && self.y < other.y + other.h + buffer
            && other.y < self.y + self.h + buffer
    }

    pub fn contains(&self, pos: TilePos) -> bool {
        pos.x >= self.x && pos.x < self.x + self.w && pos.y >= self.y && pos.y < self.y + self.h
    }
}

/// Rooms, corridors and the resulting grid of one dungeon level
#[derive(Debug, Clone)]
pub struct DungeonLayout {
    pub grid: TileGrid,
    pub rooms: Vec<Room>,
    /// MST edges as room index pairs
    pub edges: Vec<(usize, usize)>,
}

impl DungeonLayout {
    /// Room connectivity graph, node weight = room center
    pub fn room_graph(&self) -> UnGraph<TilePos, ()> {
        let mut graph = UnGraph::new_undirected();
        let nodes: Vec<NodeIndex> = self
            .rooms
            .iter()
            .map(|r| graph.add_node(r.center()))
            .collect();
        for &(a, b) in &self.edges {
            graph.add_edge(nodes[a], nodes[b], ());
        }
        graph
    }

    /// Every room reachable from every other through corridors
    pub fn is_connected(&self) -> bool {
        connected_components(&self.room_graph()) == 1
    }

    pub fn farthest_room(&self) -> usize {
        farthest_room(&self.rooms)
    }
}

/// Index of the room whose center is farthest from the first room's
pub fn farthest_room(rooms: &[Room]) -> usize {
    let Some(first) = rooms.first() else {
        return 0;
    };
    let origin = first.center();
    rooms
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| {
            origin
                .distance_sq(a.center())
                .total_cmp(&origin.distance_sq(b.center()))
        })
        .map_or(0, |(i, _)| i)
}

/// How many rooms to aim for
pub fn room_target(rng: &mut impl Rng) -> usize {
    rng.gen_range(DUNGEON_MIN_ROOMS..=DUNGEON_MAX_ROOMS)
}

fn place_rooms(params: MapParams, target: usize, rng: &mut impl Rng) -> Vec<Room> {
    let mut rooms: Vec<Room> = Vec::with_capacity(target);
    for _ in 0..target {
        for _ in 0..ROOM_ATTEMPTS {
            let w = rng.gen_range(ROOM_MIN_SIZE..=ROOM_MAX_SIZE);
            let h = rng.gen_range(ROOM_MIN_SIZE..=ROOM_MAX_SIZE);
            if w + 2 >= params.width || h + 2 >= params.height {
                continue;
            }
            let room = Room {
                x: rng.gen_range(1..params.width - w - 1),
                y: rng.gen_range(1..params.height - h - 1),
                w,
                h,
            };
            if rooms.iter().all(|r| !r.intersects(&room, ROOM_BUFFER)) {
                rooms.push(room);
                break;
            }
        }
    }
    rooms
}

fn carve_room(grid: &mut TileGrid, room: &Room) {
    for y in room.y..room.y + room.h {
        for x in room.x..room.x + room.w {
            grid.set(Tile::new(x, y, TileKind::OpenGround));
        }
    }
}

/// Corridor cells only replace solid rock, room floors stay as they are
fn carve_corridor_cell(grid: &mut TileGrid, x: usize, y: usize) {
    if grid.is_solid(x as i64, y as i64) {
        grid.set(Tile::carved(x, y, TileKind::Dirt));
    }
}

fn carve_h(grid: &mut TileGrid, x1: usize, x2: usize, y: usize) {
    for x in x1.min(x2)..=x1.max(x2) {
        carve_corridor_cell(grid, x, y);
    }
}

fn carve_v(grid: &mut TileGrid, y1: usize, y2: usize, x: usize) {
    for y in y1.min(y2)..=y1.max(y2) {
        carve_corridor_cell(grid, x, y);
    }
}

fn carve_l(grid: &mut TileGrid, a: TilePos, b: TilePos, rng: &mut impl Rng) {
    if rng.gen_bool(0.5) {
        carve_h(grid, a.x, b.x, a.y);
        carve_v(grid, a.y, b.y, b.x);
    } else {
        carve_v(grid, a.y, b.y, a.x);
        carve_h(grid, a.x, b.x, b.y);
    }
}

/// Greedy MST over room centers; returns the edges in join order
fn connect_rooms(grid: &mut TileGrid, rooms: &[Room], rng: &mut impl Rng) -> Vec<(usize, usize)> {
    let mut edges = Vec::with_capacity(rooms.len().saturating_sub(1));
    if rooms.is_empty() {
        return edges;
    }
    let mut connected = vec![0usize];
    let mut unconnected: Vec<usize> = (1..rooms.len()).collect();

    while !unconnected.is_empty() {
        let mut best: Option<(usize, usize, f32)> = None;
        for &c in &connected {
            for (slot, &u) in unconnected.iter().enumerate() {
                let d = rooms[c].center().distance_sq(rooms[u].center());
                if best.is_none_or(|(_, _, bd)| d < bd) {
                    best = Some((c, slot, d));
                }
            }
        }
        let Some((c, slot, _)) = best else {
            break;
        };
        let u = unconnected.swap_remove(slot);
        carve_l(grid, rooms[c].center(), rooms[u].center(), rng);
        edges.push((c, u));
        connected.push(u);
    }
    edges
}

/// Rooms and corridors only
pub fn layout(
    params: MapParams,
    target_rooms: usize,
    rng: &mut impl Rng,
) -> Result<DungeonLayout, GenerationError> {
    let mut grid = TileGrid::filled(params.width, params.height, TileKind::SolidWall);
    let rooms = place_rooms(params, target_rooms, rng);
    if rooms.is_empty() {
        return Err(GenerationError::NoRoomsPlaced {
            attempts: ROOM_ATTEMPTS * target_rooms as u32,
        });
    }
    for room in &rooms {
        carve_room(&mut grid, room);
    }
    let edges = connect_rooms(&mut grid, &rooms, rng);
    if rooms.len() < target_rooms {
        tracing::debug!(
            placed = rooms.len(),
            target_rooms,
            "Dungeon placed fewer rooms than targeted"
        );
    }
    Ok(DungeonLayout { grid, rooms, edges })
}

pub fn generate(
    location: Location,
    params: MapParams,
    rng: &mut impl Rng,
    target_rooms: usize,
) -> Result<GeneratedLocation, GenerationError> {
    let layout = layout(params, target_rooms, rng)?;
    if !layout.is_connected() {
        tracing::warn!(rooms = layout.rooms.len(), "Dungeon rooms left disconnected");
    }
    let spawn = layout.rooms[0].center();
    let far_room = layout.rooms[layout.farthest_room()];
    let mut target = far_room.center();
    if target == spawn {
        // single room: one tile in from its corner, rooms are at least 4 wide
        target = TilePos::new(far_room.x + 1, far_room.y + 1);
    }
    let DungeonLayout { mut grid, .. } = layout;

    let mut boss_spawn = None;
    if location.is_bottom() {
        boss_spawn = Some(target);
    } else {
        grid.set(Tile::new(target.x, target.y, TileKind::StairsDown));
    }

    Ok(GeneratedLocation {
        location,
        grid,
        spawn,
        boss_spawn,
        chests: Vec::new(),
        npcs: Vec::new(),
        resources: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::IdGen;
    use crate::monster::{spawn_enemy, Race, Rank};
    use crate::movement::box_is_clear;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;
    use std::collections::{HashSet, VecDeque};

    fn dungeon(level: u32, max_depth: u32) -> Location {
        Location::Dungeon {
            level,
            max_depth,
            id: 1,
        }
    }

    fn reachable(grid: &TileGrid, from: TilePos) -> HashSet<TilePos> {
        let mut seen = HashSet::from([from]);
        let mut queue = VecDeque::from([from]);
        while let Some(p) = queue.pop_front() {
            let (x, y) = (p.x as i64, p.y as i64);
            for (nx, ny) in [(x + 1, y), (x - 1, y), (x, y + 1), (x, y - 1)] {
                if grid.is_solid(nx, ny) {
                    continue;
                }
                let n = TilePos::new(nx as usize, ny as usize);
                if seen.insert(n) {
                    queue.push_back(n);
                }
            }
        }
        seen
    }

    #[test]
    fn test_eight_rooms_single_component() {
        for seed in 0..10 {
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            let layout = layout(MapParams::new(64, 64), 8, &mut rng).unwrap();
            assert!(layout.rooms.len() <= 8);
            assert_eq!(layout.edges.len(), layout.rooms.len() - 1);
            assert!(layout.is_connected());

            let seen = reachable(&layout.grid, layout.rooms[0].center());
            for room in &layout.rooms {
                assert!(seen.contains(&room.center()), "seed {seed}: room unreachable");
            }
        }
    }

    #[test]
    fn test_rooms_keep_buffer() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(2);
        let layout = layout(MapParams::new(64, 64), 12, &mut rng).unwrap();
        for (i, a) in layout.rooms.iter().enumerate() {
            for b in &layout.rooms[i + 1..] {
                assert!(!a.intersects(b, ROOM_BUFFER));
            }
        }
    }

    #[test]
    fn test_single_stairs_in_farthest_room() {
        for seed in 0..10 {
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            let gen = generate(dungeon(1, 3), MapParams::new(64, 64), &mut rng, 8).unwrap();
            let stairs = gen.grid.find_kind(TileKind::StairsDown);
            assert_eq!(stairs.len(), 1);
            assert!(gen.boss_spawn.is_none());

            // rebuild the same layout to find the farthest room
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            let layout = layout(MapParams::new(64, 64), 8, &mut rng).unwrap();
            let far = layout.rooms[layout.farthest_room()];
            assert!(far.contains(stairs[0]));
            assert_eq!(gen.spawn, layout.rooms[0].center());
        }
    }

    #[test]
    fn test_boss_room_at_bottom() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let gen = generate(dungeon(3, 3), MapParams::new(64, 64), &mut rng, 8).unwrap();
        assert_eq!(gen.grid.count_kind(TileKind::StairsDown), 0);
        let boss = gen.boss_spawn.unwrap();
        assert!(gen.grid.is_passable(boss));
        assert_ne!(boss, gen.spawn);
    }

    #[test]
    fn test_single_room_boss_fits_inside_room() {
        for seed in 0..10 {
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            let gen = generate(dungeon(3, 3), MapParams::new(24, 24), &mut rng, 1).unwrap();
            let tile = gen.boss_spawn.unwrap();
            assert_ne!(tile, gen.spawn);

            let mut ids = IdGen::default();
            let boss = spawn_enemy(&mut ids, Race::Golem, Rank::Boss, 3, tile.center_px(), 1.0);
            assert!(box_is_clear(boss.body.pos, boss.body.size, &gen.grid));
        }
    }

    #[test]
    fn test_missing_corridor_breaks_connectivity() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(4);
        let mut layout = layout(MapParams::new(64, 64), 8, &mut rng).unwrap();
        assert!(layout.rooms.len() > 1);
        assert!(layout.is_connected());
        layout.edges.pop();
        assert!(!layout.is_connected());
    }

    #[test]
    fn test_zero_rooms_is_an_error() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        assert!(matches!(
            layout(MapParams::new(64, 64), 0, &mut rng),
            Err(GenerationError::NoRoomsPlaced { .. })
        ));
    }

    #[test]
    fn test_room_intersects_with_buffer() {
        let a = Room { x: 1, y: 1, w: 4, h: 4 };
        let touching = Room { x: 6, y: 1, w: 4, h: 4 };
        let clear = Room { x: 7, y: 1, w: 4, h: 4 };
        assert!(a.intersects(&touching, 2));
        assert!(!a.intersects(&clear, 2));
    }
}
