//! Simulation session and update loop.
//!
//! [`GameSession`] owns every piece of mutable game state: the player, the
//! party and the active [`LocationState`]. The host drives it with
//! [`GameSession::tick`] and a handful of narrow UI commands. A location
//! transition replaces the whole `LocationState` in one assignment, so the
//! grid and its entity lists always belong to the same location.

pub mod config;
pub mod input;
pub mod plugin;
pub mod snapshot;
mod tick;

pub use config::{Difficulty, EngineConfig, Settings};
pub use input::{InputKey, InputSnapshot};
pub use plugin::{InputResource, SessionResource, SimulationPlugin};
pub use snapshot::{camera_offset, HudSnapshot};

use bevy::math::Vec2;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::constants::{
    DEPTH_ENEMY_BASE, DEPTH_ENEMY_PER_LEVEL, SPAWN_RETRY_CAP, WORLD_SPAWN_MIN_TILES,
};
use crate::economy::{self, crafting};
use crate::entity::{Arena, EntityId, IdGen, Particle, ParticleKind};
use crate::generation::{self, overworld, GeneratedLocation, GenerationError, MapParams, WorldSeed};
use crate::harvest::ResourceNode;
use crate::loot::{Chest, DroppedItem};
use crate::monster::{self, Enemy, Rank};
use crate::npc::{Npc, NpcRole};
use crate::persistence::SaveData;
use crate::player::party::{Companion, MAX_PARTY};
use crate::player::{Job, Player};
use crate::world::{Location, TileGrid, TileKind, TileMeta, TilePos};

/// Salt separating the session RNG stream from location generation
const SESSION_RNG_SALT: u64 = 0x5EED_CAFE;
/// Entrance tiles without depth meta lead this deep
const DEFAULT_MAX_DEPTH: u32 = 3;
/// Boss level above the location's regular enemies
const BOSS_LEVEL_BONUS: u32 = 2;

const RECRUIT_NAMES: [&str; 6] = ["Mira", "Oren", "Tamsin", "Bram", "Yeva", "Corin"];
const RECRUIT_JOBS: [Job; 4] = [Job::Warrior, Job::Ranger, Job::Mage, Job::Cleric];

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    #[default]
    Uninitialized,
    Generating,
    Active,
    Paused,
}

/// A tile grid together with every entity list that lives on it
#[derive(Debug, Clone)]
pub struct LocationState {
    pub location: Location,
    pub grid: TileGrid,
    pub spawn: TilePos,
    pub boss_spawn: Option<TilePos>,
    pub chests: Arena<Chest>,
    pub npcs: Arena<Npc>,
    pub resources: Arena<ResourceNode>,
    pub enemies: Arena<Enemy>,
    pub drops: Arena<DroppedItem>,
    pub particles: Arena<Particle>,
}

impl LocationState {
    /// Placeholder before the first generation; every cell reads solid
    fn blank(location: Location, width: usize, height: usize) -> Self {
        Self {
            location,
            grid: TileGrid::new(width, height),
            spawn: MapParams::new(width, height).center(),
            boss_spawn: None,
            chests: Arena::new(),
            npcs: Arena::new(),
            resources: Arena::new(),
            enemies: Arena::new(),
            drops: Arena::new(),
            particles: Arena::new(),
        }
    }

    fn from_generated(generated: GeneratedLocation) -> Self {
        Self {
            location: generated.location,
            grid: generated.grid,
            spawn: generated.spawn,
            boss_spawn: generated.boss_spawn,
            chests: Arena::from_vec(generated.chests),
            npcs: Arena::from_vec(generated.npcs),
            resources: Arena::from_vec(generated.resources),
            enemies: Arena::new(),
            drops: Arena::new(),
            particles: Arena::new(),
        }
    }
}

/// Open, non-transition cell at least `WORLD_SPAWN_MIN_TILES` from `away_from`
fn spawn_cell(grid: &TileGrid, away_from: TilePos, rng: &mut impl Rng) -> Option<TilePos> {
    for _ in 0..SPAWN_RETRY_CAP {
        let Some(pos) = generation::random_open_cell(grid, 1, rng) else {
            continue;
        };
        let on_transition = grid.kind_at(pos).is_some_and(|k| k.is_transition());
        if !on_transition && pos.distance(away_from) >= WORLD_SPAWN_MIN_TILES {
            return Some(pos);
        }
    }
    None
}

/// Initial dungeon/mine batch plus the boss, if this level has one
fn populate_depths(state: &mut LocationState, ids: &mut IdGen, hp_mult: f32, rng: &mut impl Rng) {
    if !matches!(
        state.location,
        Location::Dungeon { .. } | Location::Mine { .. }
    ) {
        return;
    }

    let count = DEPTH_ENEMY_BASE + DEPTH_ENEMY_PER_LEVEL * state.location.depth() as usize;
    for _ in 0..count {
        let Some(tile) = spawn_cell(&state.grid, state.spawn, rng) else {
            tracing::warn!("No spawn cell left for depth enemies");
            break;
        };
        if let Some(enemy) =
            monster::roll_enemy(ids, &state.location, tile.center_px(), hp_mult, rng)
        {
            state.enemies.push(enemy);
        }
    }

    if let Some(tile) = state.boss_spawn {
        let race = monster::boss_race_for(&state.location);
        let level = monster::level_for(&state.location) + BOSS_LEVEL_BONUS;
        let boss = monster::spawn_enemy(ids, race, Rank::Boss, level, tile.center_px(), hp_mult);
        state.enemies.push(boss);
    }
}

/// The single owner of mutable game state
pub struct GameSession {
    pub config: EngineConfig,
    pub seed: WorldSeed,
    pub settings: Settings,
    pub player: Player,
    pub party: Vec<Companion>,
    state: EngineState,
    current: LocationState,
    /// Overworld chunk that portals lead back to
    last_world: Location,
    ids: IdGen,
    /// Combat, AI and loot rolls
    rng: Xoshiro256PlusPlus,
    /// Session time in seconds
    clock: f64,
    tick_count: u64,
    near_npc: Option<EntityId>,
}

impl GameSession {
    pub fn new(config: EngineConfig) -> Self {
        let mut ids = IdGen::default();
        let player = Player::new(ids.next_id(), config.start_job, Vec2::ZERO);
        let start = config.start_location;
        Self {
            seed: WorldSeed { seed: config.seed },
            settings: config.settings,
            player,
            party: Vec::new(),
            state: EngineState::Uninitialized,
            current: LocationState::blank(start, config.map_width, config.map_height),
            last_world: if start.is_world() {
                start
            } else {
                Location::default()
            },
            ids,
            rng: Xoshiro256PlusPlus::seed_from_u64(config.seed ^ SESSION_RNG_SALT),
            clock: 0.0,
            tick_count: 0,
            near_npc: None,
            config,
        }
    }

    /// Generate the starting location and go active
    pub fn start(&mut self) -> Result<(), GenerationError> {
        if self.state != EngineState::Uninitialized {
            return Ok(());
        }
        self.state = EngineState::Generating;
        let target = self.current.location;
        match self.enter(target) {
            Ok(()) => {
                self.state = EngineState::Active;
                Ok(())
            }
            Err(err) => {
                self.state = EngineState::Uninitialized;
                Err(err)
            }
        }
    }

    /// Rebuild a session from a save snapshot
    pub fn from_save(mut config: EngineConfig, data: SaveData) -> Result<Self, GenerationError> {
        config.seed = data.seed;
        config.settings = data.settings;
        config.start_location = data.location;
        config.start_job = data.player.job;

        let mut session = Self::new(config);
        let max_id = data
            .party
            .iter()
            .map(|c| c.id)
            .chain(std::iter::once(data.player.id))
            .max()
            .unwrap_or(data.player.id);
        session.ids = IdGen::starting_at(max_id.0);
        session.player = data.player;
        // cooldown stamps belong to the old session clock
        for skill in &mut session.player.skills {
            skill.last_used = None;
        }
        session.party = data.party;
        session.last_world = data.last_world;
        session.start()?;
        tracing::info!(location = %session.current.location.label(), "Session restored");
        Ok(session)
    }

    /// Snapshot for the persistence collaborator
    pub fn save_data(&self) -> SaveData {
        SaveData {
            player: self.player.clone(),
            party: self.party.clone(),
            settings: self.settings,
            location: self.current.location,
            seed: self.seed.seed,
            last_world: self.last_world,
        }
    }

    /// Generate `location` and swap it in; the old location stays on failure
    fn enter(&mut self, location: Location) -> Result<(), GenerationError> {
        let params = MapParams::new(self.config.map_width, self.config.map_height);
        let mut gen_rng = self.seed.rng_for(&location);
        let generated = generation::generate(location, params, &mut self.ids, &mut gen_rng)?;

        let mut next = LocationState::from_generated(generated);
        let hp_mult = self.settings.difficulty.hp_mult();
        populate_depths(&mut next, &mut self.ids, hp_mult, &mut self.rng);

        let arrival = next.spawn.center_px();
        self.current = next;
        self.near_npc = None;
        if location.is_world() {
            self.last_world = location;
        }

        self.player.body.set_center(arrival);
        for companion in &mut self.party {
            companion.revive();
            companion.body.set_center(arrival);
        }

        tracing::info!(
            location = %location.label(),
            enemies = self.current.enemies.live_count(),
            "Entered location"
        );
        Ok(())
    }

    /// Leave for `location`, keeping the current one if generation fails
    fn travel(&mut self, location: Location) -> bool {
        let previous = self.state;
        self.state = EngineState::Generating;
        let result = self.enter(location);
        self.state = previous;
        match result {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(
                    %err,
                    destination = %location.label(),
                    "Transition failed, staying put"
                );
                false
            }
        }
    }

    /// Location the player's current tile leads to, if any
    fn transition_target(&self) -> Option<Location> {
        let pos = TilePos::from_px(self.player.body.center())?;
        let tile = self.current.grid.get(pos.x, pos.y)?;
        let max_depth = match tile.meta {
            Some(TileMeta::Entrance { max_depth }) => max_depth,
            _ => DEFAULT_MAX_DEPTH,
        };
        match tile.kind {
            TileKind::DungeonEntrance => Some(Location::Dungeon {
                level: 1,
                max_depth,
                id: self.dungeon_id(pos),
            }),
            TileKind::MineEntrance => Some(Location::Mine {
                level: 1,
                max_depth,
            }),
            TileKind::TownEntrance => Some(Location::Town),
            TileKind::StairsDown => self.current.location.descend(),
            TileKind::PortalOut => Some(self.last_world),
            _ => {
                let Location::World { chunk_x, chunk_y } = self.current.location else {
                    return None;
                };
                let (dx, dy) = overworld::edge_exit(&self.current.grid, pos)?;
                Some(Location::World {
                    chunk_x: chunk_x + dx,
                    chunk_y: chunk_y + dy,
                })
            }
        }
    }

    /// Stable identity for the dungeon behind an entrance tile
    fn dungeon_id(&self, entrance: TilePos) -> u64 {
        self.seed.location_hash(&self.current.location)
            ^ ((entrance.x as u64) << 32 | entrance.y as u64)
    }

    fn spawn_particle(&mut self, at: Vec2, kind: ParticleKind) {
        let id = self.ids.next_id();
        self.current.particles.push(Particle::spawn(id, at, kind));
    }

    fn is_running(&self) -> bool {
        matches!(self.state, EngineState::Active | EngineState::Paused)
    }

    // =====================================================
    // Read-only views
    // =====================================================

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn location(&self) -> &LocationState {
        &self.current
    }

    pub fn last_world(&self) -> Location {
        self.last_world
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot::capture(
            &self.player,
            &self.current.location,
            self.party.len(),
            self.clock,
        )
    }

    pub fn camera_offset(&self) -> Vec2 {
        let (w, h) = self.config.viewport;
        camera_offset(self.player.body.center(), Vec2::new(w, h), &self.current.grid)
    }

    /// NPC within interaction range, as flagged by the last tick
    pub fn nearby_npc(&self) -> Option<&Npc> {
        self.near_npc.and_then(|id| self.current.npcs.get(id))
    }

    pub fn active_shop(&self) -> Option<&Npc> {
        self.nearby_npc().filter(|npc| npc.is_shop())
    }

    pub fn active_crafting(&self) -> Option<&Npc> {
        self.nearby_npc().filter(|npc| npc.is_crafter())
    }

    // =====================================================
    // UI commands (silent no-ops on failed preconditions)
    // =====================================================

    pub fn set_paused(&mut self, paused: bool) {
        self.state = match (self.state, paused) {
            (EngineState::Active, true) => EngineState::Paused,
            (EngineState::Paused, false) => EngineState::Active,
            (state, _) => state,
        };
    }

    pub fn toggle_attack_mode(&mut self) {
        self.player.attack_mode = self.player.attack_mode.toggled();
    }

    /// Put a known skill (or nothing) into a hotbar slot
    pub fn assign_hotbar(&mut self, slot: usize, skill_id: Option<u32>) -> bool {
        if slot >= self.player.hotbar.len() {
            return false;
        }
        if let Some(id) = skill_id {
            if !self.player.knows_skill(id) {
                tracing::debug!(slot, skill = id, "Hotbar assignment of unknown skill");
                return false;
            }
        }
        self.player.hotbar[slot] = skill_id;
        true
    }

    pub fn craft(&mut self, recipe_index: usize) -> bool {
        if !self.is_running() {
            return false;
        }
        let Some(recipe) = self
            .active_crafting()
            .and_then(|npc| npc.recipes.as_ref())
            .and_then(|recipes| recipes.get(recipe_index))
            .cloned()
        else {
            return false;
        };
        match crafting::craft(&recipe, &mut self.player.inventory, &mut self.player.gold) {
            Ok(()) => {
                tracing::info!(item = %recipe.output.name, "Crafted");
                true
            }
            Err(err) => {
                tracing::debug!(%err, recipe = %recipe.name, "Craft rejected");
                false
            }
        }
    }

    pub fn buy(&mut self, stock_index: usize) -> bool {
        if !self.is_running() {
            return false;
        }
        let Some(stock) = self.active_shop().and_then(|npc| npc.stock.clone()) else {
            return false;
        };
        match economy::purchase(
            &stock,
            stock_index,
            &mut self.player.inventory,
            &mut self.player.gold,
        ) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(%err, "Purchase rejected");
                false
            }
        }
    }

    /// Inn rest, priest heal or guild recruit, depending on who is nearby
    pub fn use_service(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        let Some(role) = self.nearby_npc().map(|npc| npc.role) else {
            return false;
        };
        let Some(price) = economy::service_price(role) else {
            return false;
        };
        if role == NpcRole::GuildRecruiter && self.party.len() >= MAX_PARTY {
            tracing::debug!("Party is full");
            return false;
        }
        if let Err(err) = economy::pay(&mut self.player.gold, price) {
            tracing::debug!(%err, ?role, "Service rejected");
            return false;
        }

        match role {
            NpcRole::Inn => {
                self.player.restore();
                self.party.iter_mut().for_each(Companion::revive);
            }
            NpcRole::Priest => {
                self.player.body.heal(self.player.body.max_hp);
                self.party.iter_mut().for_each(Companion::revive);
                let at = self.player.body.center();
                self.spawn_particle(at, ParticleKind::Heal);
            }
            NpcRole::GuildRecruiter => {
                let n = self.party.len() + self.player.level as usize;
                let name = RECRUIT_NAMES[n % RECRUIT_NAMES.len()];
                let job = RECRUIT_JOBS[n % RECRUIT_JOBS.len()];
                let at = self.player.body.center();
                let companion = Companion::recruit(&mut self.ids, name, job, self.player.level, at);
                tracing::info!(name, ?job, "Companion joined");
                self.party.push(companion);
            }
            NpcRole::Blacksmith | NpcRole::Alchemist => {}
        }
        true
    }

    pub fn equip(&mut self, inventory_index: usize) -> bool {
        self.player.equip(inventory_index)
    }

    pub fn use_item(&mut self, inventory_index: usize) -> bool {
        self.player.use_item(inventory_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_at(location: Location) -> EngineConfig {
        EngineConfig {
            map_width: 48,
            map_height: 48,
            start_location: location,
            ..EngineConfig::default()
        }
    }

    fn started(location: Location) -> GameSession {
        let mut session = GameSession::new(config_at(location));
        session.start().unwrap();
        session
    }

    fn stand_next_to(session: &mut GameSession, role: NpcRole) {
        let at = session
            .location()
            .npcs
            .iter()
            .find(|n| n.role == role)
            .map(|n| n.body.center())
            .unwrap();
        session.player.body.set_center(at);
        session.near_npc = session
            .current
            .npcs
            .iter()
            .find(|n| n.role == role)
            .map(|n| n.id);
    }

    #[test]
    fn test_lifecycle_states() {
        let mut session = GameSession::new(config_at(Location::Town));
        assert_eq!(session.state(), EngineState::Uninitialized);
        session.set_paused(true);
        assert_eq!(session.state(), EngineState::Uninitialized);
        session.start().unwrap();
        assert_eq!(session.state(), EngineState::Active);
        session.set_paused(true);
        assert_eq!(session.state(), EngineState::Paused);
        session.set_paused(false);
        assert_eq!(session.state(), EngineState::Active);
    }

    #[test]
    fn test_start_places_player_on_spawn() {
        let session = started(Location::Town);
        let tile = TilePos::from_px(session.player.body.center()).unwrap();
        assert_eq!(tile, session.location().spawn);
        assert_eq!(session.location().npcs.live_count(), 5);
    }

    #[test]
    fn test_depth_batch_and_boss() {
        let bottom = Location::Mine {
            level: 2,
            max_depth: 2,
        };
        let session = started(bottom);
        let enemies = &session.location().enemies;
        assert_eq!(enemies.iter().filter(|e| e.is_boss()).count(), 1);
        assert!(enemies.live_count() <= DEPTH_ENEMY_BASE + 2 * DEPTH_ENEMY_PER_LEVEL + 1);
        assert!(enemies.live_count() > 1);
    }

    #[test]
    fn test_transition_swaps_everything() {
        let mut session = started(Location::Town);
        let town_chests: Vec<EntityId> = session.location().chests.iter().map(|c| c.id).collect();
        assert!(session.travel(Location::Mine {
            level: 1,
            max_depth: 3
        }));
        let state = session.location();
        assert_eq!(state.location.depth(), 1);
        assert_eq!(state.npcs.live_count(), 0);
        assert!(state.chests.iter().all(|c| !town_chests.contains(&c.id)));
        assert!(state.grid.is_passable(state.spawn));
    }

    #[test]
    fn test_same_location_regenerates_identically() {
        let a = started(Location::default());
        let b = started(Location::default());
        assert_eq!(a.location().grid, b.location().grid);
    }

    #[test]
    fn test_assign_hotbar_only_known_skills() {
        let mut session = started(Location::Town);
        assert!(session.assign_hotbar(4, Some(crate::abilities::HEAL)));
        assert!(!session.assign_hotbar(4, Some(crate::abilities::FIRE_BOLT)));
        assert!(!session.assign_hotbar(5, None));
        assert!(session.assign_hotbar(0, None));
        assert_eq!(session.player.hotbar[0], None);
    }

    #[test]
    fn test_buy_needs_shop_and_gold() {
        let mut session = started(Location::Town);
        assert!(!session.buy(0));

        stand_next_to(&mut session, NpcRole::Alchemist);
        let price = session.active_shop().unwrap().stock.as_ref().unwrap()[0].price;
        let items = session.player.inventory.len();
        session.player.gold = price;
        assert!(session.buy(0));
        assert_eq!(session.player.gold, 0);
        assert_eq!(session.player.inventory.len(), items + 1);
        assert!(!session.buy(0));
        assert!(!session.buy(99));
    }

    #[test]
    fn test_guild_recruits_until_full() {
        let mut session = started(Location::Town);
        stand_next_to(&mut session, NpcRole::GuildRecruiter);
        session.player.gold = 10_000;
        for _ in 0..MAX_PARTY {
            assert!(session.use_service());
        }
        assert!(!session.use_service());
        assert_eq!(session.party.len(), MAX_PARTY);
    }

    #[test]
    fn test_inn_restores_and_charges() {
        let mut session = started(Location::Town);
        stand_next_to(&mut session, NpcRole::Inn);
        session.player.body.hp = 1.0;
        session.player.mp = 0.0;
        let gold = session.player.gold;
        assert!(session.use_service());
        assert!((session.player.body.hp - session.player.body.max_hp).abs() < f32::EPSILON);
        assert!(session.player.mp > 0.0);
        assert!(session.player.gold < gold);

        session.player.gold = 0;
        session.player.body.hp = 1.0;
        assert!(!session.use_service());
        assert!((session.player.body.hp - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_craft_without_materials_is_noop() {
        let mut session = started(Location::Town);
        stand_next_to(&mut session, NpcRole::Blacksmith);
        assert!(session.active_crafting().is_some());
        session.player.gold = 0;
        let before = session.player.inventory.clone();
        assert!(!session.craft(0));
        assert_eq!(session.player.inventory, before);
    }

    #[test]
    fn test_save_and_restore() {
        let mut session = started(Location::Mine {
            level: 1,
            max_depth: 4,
        });
        session.player.gold = 777;
        let data = session.save_data();

        let restored = GameSession::from_save(EngineConfig::default(), data).unwrap();
        assert_eq!(restored.player.gold, 777);
        assert_eq!(restored.location().location, session.location().location);
        assert_eq!(restored.config.map_width, EngineConfig::default().map_width);
        assert_eq!(restored.state(), EngineState::Active);
        assert!(restored.ids.clone().next_id() > restored.player.id);
    }
}
