//! Enemy and companion behavior.
//!
//! Enemies idle with an occasional jitter and pursue the player once inside
//! their sight radius. Every move goes through the movement system, so AI
//! never clips walls. Contact damage lands on whatever the enemy's box
//! overlaps, at most once per [`CONTACT_COOLDOWN`].

use bevy::math::Vec2;
use rand::Rng;

use super::Enemy;
use crate::combat::{compute_damage, StrikeHit};
use crate::constants::{
    BOSS_CONTACT_MULT, COMPANION_ATTACK_SECS, COMPANION_FOLLOW_TILES, COMPANION_REACH_TILES,
    CONTACT_ATTACK_COEFF, CONTACT_COOLDOWN, CONTACT_DEFENSE_COEFF, TILE_SIZE, WANDER_CHANCE,
    WANDER_JITTER,
};
use crate::entity::{Arena, Body, EntityId};
use crate::movement::try_move;
use crate::player::party::Companion;
use crate::world::TileGrid;

/// Something enemies can bump into: the player or a standing companion
pub struct ContactTarget<'a> {
    pub id: EntityId,
    pub body: &'a mut Body,
    pub defense: f32,
}

/// One contact-damage application
#[derive(Debug, Clone, PartialEq)]
pub struct ContactHit {
    pub enemy: EntityId,
    pub target: EntityId,
    pub damage: f32,
    pub lethal: bool,
}

/// `max(1, attack * 0.1 * hp_mult - defense * 0.05)`, x1.5 for bosses
pub fn contact_damage(attack: f32, hp_mult: f32, defense: f32, boss: bool) -> f32 {
    let base = (attack * CONTACT_ATTACK_COEFF * hp_mult - defense * CONTACT_DEFENSE_COEFF).max(1.0);
    if boss {
        base * BOSS_CONTACT_MULT
    } else {
        base
    }
}

/// Unit vector toward the player when inside sight range
pub fn pursuit_direction(enemy: &Enemy, player_center: Vec2) -> Option<Vec2> {
    let to_player = player_center - enemy.body.center();
    let sight = enemy.sight_radius * TILE_SIZE;
    if to_player.length_squared() > sight * sight {
        return None;
    }
    to_player.try_normalize()
}

/// Move every live enemy and apply contact damage
pub fn enemy_pass(
    enemies: &mut Arena<Enemy>,
    player_center: Vec2,
    targets: &mut [ContactTarget<'_>],
    grid: &TileGrid,
    hp_mult: f32,
    dt: f32,
    rng: &mut impl Rng,
) -> Vec<ContactHit> {
    let mut hits = Vec::new();

    for enemy in enemies.iter_mut() {
        if !enemy.body.is_alive() {
            continue;
        }

        if rng.gen::<f32>() < WANDER_CHANCE {
            let jitter = Vec2::new(
                rng.gen_range(-WANDER_JITTER..=WANDER_JITTER),
                rng.gen_range(-WANDER_JITTER..=WANDER_JITTER),
            );
            try_move(&mut enemy.body, jitter, grid);
        }

        if let Some(dir) = pursuit_direction(enemy, player_center) {
            let step = dir * enemy.body.speed * dt;
            try_move(&mut enemy.body, step, grid);
        }

        enemy.contact_timer = (enemy.contact_timer - dt).max(0.0);
        if enemy.contact_timer > 0.0 {
            continue;
        }

        let mut landed = false;
        for target in targets.iter_mut() {
            if !target.body.is_alive() || !enemy.body.overlaps(&*target.body) {
                continue;
            }
            let damage = contact_damage(enemy.attack, hp_mult, target.defense, enemy.is_boss());
            let lethal = target.body.take_damage(damage);
            hits.push(ContactHit {
                enemy: enemy.id,
                target: target.id,
                damage,
                lethal,
            });
            landed = true;
        }
        if landed {
            enemy.contact_timer = CONTACT_COOLDOWN;
        }
    }

    hits
}

/// Companions trail the player and swing at the closest enemy in reach
pub fn companion_pass(
    companions: &mut [Companion],
    player_center: Vec2,
    enemies: &mut Arena<Enemy>,
    grid: &TileGrid,
    dt: f32,
) -> Vec<StrikeHit> {
    let follow = COMPANION_FOLLOW_TILES * TILE_SIZE;
    let reach = COMPANION_REACH_TILES * TILE_SIZE;
    let mut hits = Vec::new();

    for companion in companions.iter_mut() {
        if companion.downed {
            continue;
        }

        let to_player = player_center - companion.body.center();
        if to_player.length() > follow {
            if let Some(dir) = to_player.try_normalize() {
                let step = dir * companion.body.speed * dt;
                try_move(&mut companion.body, step, grid);
            }
        }

        companion.attack_timer = (companion.attack_timer - dt).max(0.0);
        if companion.attack_timer > 0.0 {
            continue;
        }

        let center = companion.body.center();
        let Some(enemy) = enemies
            .iter_mut()
            .filter(|e| e.body.is_alive() && e.body.center().distance(center) <= reach)
            .min_by(|a, b| {
                let da = center.distance_squared(a.body.center());
                let db = center.distance_squared(b.body.center());
                da.total_cmp(&db)
            })
        else {
            continue;
        };

        let damage = compute_damage(&companion.attack_profile(), 1.0, enemy.defense);
        let killed = enemy.body.take_damage(damage);
        companion.attack_timer = COMPANION_ATTACK_SECS;
        hits.push(StrikeHit {
            target: enemy.id,
            at: enemy.body.center(),
            damage,
            crit: false,
            killed,
            target_level: enemy.level,
            rank: enemy.rank,
            drop_rate: enemy.drop_rate,
        });
    }

    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::IdGen;
    use crate::monster::{spawn_enemy, Race, Rank};
    use crate::player::Job;
    use crate::world::TileKind;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn open_grid() -> TileGrid {
        TileGrid::filled(20, 20, TileKind::OpenGround)
    }

    fn enemy_at(ids: &mut IdGen, center: Vec2) -> Enemy {
        spawn_enemy(ids, Race::Goblin, Rank::Normal, 1, center, 1.0)
    }

    #[test]
    fn test_contact_damage_floor_and_boss_scale() {
        assert!((contact_damage(1.0, 1.0, 500.0, false) - 1.0).abs() < f32::EPSILON);
        assert!((contact_damage(1.0, 1.0, 500.0, true) - 1.5).abs() < f32::EPSILON);
        // 100 * 0.1 * 1.0 - 20 * 0.05 = 9
        assert!((contact_damage(100.0, 1.0, 20.0, false) - 9.0).abs() < 1e-4);
    }

    #[test]
    fn test_pursues_inside_sight_only() {
        let mut ids = IdGen::default();
        let enemy = enemy_at(&mut ids, Vec2::new(100.0, 100.0));
        let near = Vec2::new(100.0 + TILE_SIZE * 2.0, 100.0);
        let dir = pursuit_direction(&enemy, near).unwrap();
        assert!((dir.x - 1.0).abs() < 1e-5);

        let far = Vec2::new(100.0 + enemy.sight_radius * TILE_SIZE + 10.0, 100.0);
        assert!(pursuit_direction(&enemy, far).is_none());
    }

    #[test]
    fn test_contact_respects_cooldown() {
        let mut ids = IdGen::default();
        let grid = open_grid();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(2);
        let center = Vec2::new(160.0, 160.0);
        let mut enemies = Arena::from_vec(vec![enemy_at(&mut ids, center)]);
        let mut body = Body::centered(center, Vec2::splat(20.0), 100.0, 0.0);

        let mut targets = [ContactTarget {
            id: EntityId(99),
            body: &mut body,
            defense: 0.0,
        }];
        let first = enemy_pass(&mut enemies, center, &mut targets, &grid, 1.0, 0.016, &mut rng);
        assert_eq!(first.len(), 1);
        let second = enemy_pass(&mut enemies, center, &mut targets, &grid, 1.0, 0.016, &mut rng);
        assert!(second.is_empty());
    }

    #[test]
    fn test_dead_enemy_is_skipped() {
        let mut ids = IdGen::default();
        let grid = open_grid();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(2);
        let center = Vec2::new(160.0, 160.0);
        let mut dead = enemy_at(&mut ids, center);
        dead.body.hp = 0.0;
        let before = dead.body.pos;
        let mut enemies = Arena::from_vec(vec![dead]);
        let mut body = Body::centered(center, Vec2::splat(20.0), 100.0, 0.0);

        let mut targets = [ContactTarget {
            id: EntityId(99),
            body: &mut body,
            defense: 0.0,
        }];
        let hits = enemy_pass(&mut enemies, center, &mut targets, &grid, 1.0, 0.5, &mut rng);
        assert!(hits.is_empty());
        assert!((body.hp - 100.0).abs() < f32::EPSILON);
        assert_eq!(enemies.slot(0).unwrap().body.pos, before);
    }

    #[test]
    fn test_companion_follows_and_strikes() {
        let mut ids = IdGen::default();
        let grid = open_grid();
        let player = Vec2::new(320.0, 160.0);
        let start_at = Vec2::new(160.0, 160.0);
        let mut party = vec![Companion::recruit(&mut ids, "Mira", Job::Warrior, 3, start_at)];
        let mut enemies = Arena::new();

        let start = party[0].body.center().x;
        companion_pass(&mut party, player, &mut enemies, &grid, 0.1);
        // one full step of the companion's own speed toward the player
        let stepped = party[0].body.center().x - start;
        assert!((stepped - party[0].body.speed * 0.1).abs() < 1e-3);

        let at = party[0].body.center() + Vec2::new(TILE_SIZE, 0.0);
        enemies.push(enemy_at(&mut ids, at));
        let hits = companion_pass(&mut party, player, &mut enemies, &grid, 0.0);
        assert_eq!(hits.len(), 1);
        assert!(party[0].attack_timer > 0.0);
        let again = companion_pass(&mut party, player, &mut enemies, &grid, 0.0);
        assert!(again.is_empty());
    }

    #[test]
    fn test_downed_companion_idles() {
        let mut ids = IdGen::default();
        let grid = open_grid();
        let start_at = Vec2::new(160.0, 160.0);
        let mut party = vec![Companion::recruit(&mut ids, "Oren", Job::Ranger, 1, start_at)];
        party[0].downed = true;
        let before = party[0].body.pos;
        let mut enemies = Arena::new();
        companion_pass(&mut party, Vec2::new(400.0, 160.0), &mut enemies, &grid, 0.5);
        assert_eq!(party[0].body.pos, before);
    }
}
