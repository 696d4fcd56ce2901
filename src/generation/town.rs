//! The town: a fixed layout around the map center.
//!
//! Walled border, a dirt plaza, five role shops with 3x3 shop-floor
//! footprints, a small crop plot and a portal back out near the southern edge.

use rand::Rng;

use super::{GeneratedLocation, MapParams};
use crate::entity::IdGen;
use crate::npc::{Npc, NpcRole};
use crate::world::{Location, Tile, TileGrid, TileKind, TileMeta, TilePos};

const PLAZA_RADIUS: usize = 3;

/// Shop footprint center offsets from the map center
pub fn shop_offset(role: NpcRole) -> (i64, i64) {
    match role {
        NpcRole::Inn => (-7, -6),
        NpcRole::Blacksmith => (7, -6),
        NpcRole::Alchemist => (-7, 4),
        NpcRole::Priest => (7, 4),
        NpcRole::GuildRecruiter => (0, -8),
    }
}

fn offset(center: TilePos, (dx, dy): (i64, i64)) -> TilePos {
    TilePos::new(
        (center.x as i64 + dx).max(2) as usize,
        (center.y as i64 + dy).max(2) as usize,
    )
}

pub fn generate(
    location: Location,
    params: MapParams,
    ids: &mut IdGen,
    rng: &mut impl Rng,
) -> GeneratedLocation {
    let (w, h) = (params.width, params.height);
    let mut grid = TileGrid::filled(w, h, TileKind::OpenGround);
    for x in 0..w {
        grid.set(Tile::new(x, 0, TileKind::SolidWall));
        grid.set(Tile::new(x, h - 1, TileKind::SolidWall));
    }
    for y in 0..h {
        grid.set(Tile::new(0, y, TileKind::SolidWall));
        grid.set(Tile::new(w - 1, y, TileKind::SolidWall));
    }

    let center = params.center();
    for y in center.y - PLAZA_RADIUS..=center.y + PLAZA_RADIUS {
        for x in center.x - PLAZA_RADIUS..=center.x + PLAZA_RADIUS {
            grid.set(Tile::new(x, y, TileKind::Dirt));
        }
    }

    let mut npcs = Vec::with_capacity(NpcRole::ALL.len());
    for role in NpcRole::ALL {
        let shop = offset(center, shop_offset(role));
        for y in shop.y - 1..=shop.y + 1 {
            for x in shop.x - 1..=shop.x + 1 {
                grid.set(Tile::new(x, y, TileKind::ShopFloor));
            }
        }
        npcs.push(Npc::at_tile(ids, role, shop));
    }

    // crop plot south-west of the plaza
    let plot = offset(center, (-9, 7));
    for y in plot.y..plot.y + 2 {
        for x in plot.x..plot.x + 4 {
            if grid.is_interior(x, y) {
                let stage = rng.gen_range(0..=3);
                grid.set(Tile::new(x, y, TileKind::Crop).with_meta(TileMeta::Growth { stage }));
            }
        }
    }

    let portal = TilePos::new(center.x, h - 3);
    grid.set(Tile::new(portal.x, portal.y, TileKind::PortalOut));

    GeneratedLocation {
        location,
        grid,
        spawn: center,
        boss_spawn: None,
        chests: Vec::new(),
        npcs,
        resources: Vec::new(),
    }
}
