//! The per-tick pipeline.
//!
//! Stages run in a fixed order and each one sees what the earlier stages of
//! the same tick wrote:
//!
//! 1. player movement
//! 2. attack-animation and swing timers
//! 3. hotbar skills
//! 4. held attack (or harvest)
//! 5. transition tiles
//! 6. shop/crafting proximity
//! 7. enemy and companion AI, contact damage
//! 8. pickups and chests
//! 9. particle decay
//! 10. dead-entity purge
//! 11. overworld population upkeep

use bevy::math::Vec2;
use rand::Rng;

use super::{spawn_cell, EngineState, GameSession, InputSnapshot};
use crate::abilities::{self, Caster, SelfEffect, Skill, TargetMode};
use crate::combat::weapons::{HitShape, WeaponStats};
use crate::combat::{self, resolve_strike, Strike, StrikeHit};
use crate::constants::{
    ATTACK_ANIM_SECS, INTERACT_RADIUS, PICKUP_RADIUS, RANGED_DAMAGE_MULT, RANGED_LINE_WIDTH,
    RANGED_RANGE_MULT, TILE_SIZE, WORLD_ENEMY_FLOOR, WORLD_SPAWN_CHANCE,
};
use crate::entity::ParticleKind;
use crate::harvest;
use crate::loot::{self, DropPayload, DroppedItem};
use crate::monster::ai::{self, ContactTarget};
use crate::monster::{self, Rank};
use crate::movement::try_move;
use crate::player::{AttackMode, Buff};
use crate::world::{Location, Tile, TileKind, TilePos};

impl GameSession {
    /// Advance the simulation by `dt` seconds. No-op unless active.
    pub fn tick(&mut self, input: &InputSnapshot, dt: f32) {
        if self.state != EngineState::Active {
            return;
        }
        self.clock += dt as f64;
        self.tick_count += 1;
        self.player.tick_buffs(dt);

        self.stage_movement(input, dt);
        self.stage_timers(dt);
        self.stage_hotbar(input);
        self.stage_attack(input);
        self.stage_transition();
        self.stage_interaction();
        self.stage_ai(dt);
        self.stage_pickup();
        self.stage_particles(dt);
        self.stage_purge();
        self.stage_population();
    }

    fn stage_movement(&mut self, input: &InputSnapshot, dt: f32) {
        let dir = input.move_direction();
        if dir != Vec2::ZERO {
            self.player.facing = dir.y.atan2(dir.x);
            let delta = dir * self.player.body.speed * dt;
            try_move(&mut self.player.body, delta, &self.current.grid);
        }
        if input.pointer_down {
            let aim = input.pointer + self.camera_offset() - self.player.body.center();
            if aim != Vec2::ZERO {
                self.player.facing = aim.y.atan2(aim.x);
            }
        }
    }

    fn stage_timers(&mut self, dt: f32) {
        self.player.attack_anim = (self.player.attack_anim - dt).max(0.0);
        self.player.attack_cooldown = (self.player.attack_cooldown - dt).max(0.0);
    }

    fn stage_hotbar(&mut self, input: &InputSnapshot) {
        let pressed: Vec<usize> = input.hotbar_pressed().collect();
        for slot in pressed {
            let Some(skill) = self.player.hotbar[slot].and_then(abilities::find) else {
                continue;
            };
            let caster = Caster {
                level: self.player.level,
                job: self.player.job,
            };
            let now = self.clock;
            let player = &mut self.player;
            let Some(state) = player.skills.iter_mut().find(|s| s.skill_id == skill.id) else {
                continue;
            };
            if let Err(block) = abilities::try_activate(skill, state, &mut player.mp, caster, now) {
                tracing::debug!(skill = skill.name, ?block, "Skill blocked");
                continue;
            }
            self.cast(skill);
        }
    }

    fn cast(&mut self, skill: &Skill) {
        self.player.attack_anim = ATTACK_ANIM_SECS;
        match skill.target {
            TargetMode::SelfCast(SelfEffect::Heal { fraction }) => {
                let amount = self.player.body.max_hp * fraction;
                self.player.body.heal(amount);
                let at = self.player.body.center();
                self.spawn_particle(at, ParticleKind::Heal);
            }
            TargetMode::SelfCast(SelfEffect::Buff {
                attack_mult,
                duration,
            }) => {
                self.player.buffs.push(Buff {
                    attack_mult,
                    remaining: duration,
                });
            }
            TargetMode::Directional { width } => {
                self.skill_strike(skill, HitShape::Line { width });
            }
            TargetMode::Area { angle } => {
                self.skill_strike(skill, HitShape::Arc { angle });
            }
        }
        tracing::debug!(skill = skill.name, "Skill cast");
    }

    fn skill_strike(&mut self, skill: &Skill, shape: HitShape) {
        let weapon = self.player.weapon();
        let range = skill
            .range
            .map_or_else(|| weapon.range_px(), |tiles| tiles * TILE_SIZE);
        let strike = Strike {
            origin: self.player.body.center(),
            facing: self.player.facing,
            range,
            shape,
            multiplier: skill.multiplier,
            profile: self.player.attack_profile(),
            hit_rate: weapon.hit_rate,
            crit_rate: weapon.crit_rate,
            knockback: weapon.knockback,
        };
        let hits = resolve_strike(
            &strike,
            &mut self.current.enemies,
            &self.current.grid,
            &mut self.rng,
        );
        self.apply_hits(&hits);
    }

    fn stage_attack(&mut self, input: &InputSnapshot) {
        if !input.attack_held() || self.player.attack_cooldown > 0.0 {
            return;
        }
        let weapon = self.player.weapon();
        self.player.attack_cooldown = weapon.attack_speed;
        self.player.attack_anim = ATTACK_ANIM_SECS;

        let (range, shape, multiplier) = match self.player.attack_mode {
            AttackMode::Melee => (weapon.range_px(), weapon.shape, 1.0),
            AttackMode::Ranged => (
                weapon.range_px() * RANGED_RANGE_MULT,
                HitShape::Line {
                    width: RANGED_LINE_WIDTH,
                },
                RANGED_DAMAGE_MULT,
            ),
        };
        let strike = Strike {
            origin: self.player.body.center(),
            facing: self.player.facing,
            range,
            shape,
            multiplier,
            profile: self.player.attack_profile(),
            hit_rate: weapon.hit_rate,
            crit_rate: weapon.crit_rate,
            knockback: weapon.knockback,
        };
        // a melee swing with no enemy in reach works the nearest resource
        if self.player.attack_mode == AttackMode::Melee
            && !combat::strike_reaches_any(&strike, &self.current.enemies)
        {
            self.harvest(&weapon);
            return;
        }
        let hits = resolve_strike(
            &strike,
            &mut self.current.enemies,
            &self.current.grid,
            &mut self.rng,
        );
        self.apply_hits(&hits);
    }

    fn harvest(&mut self, weapon: &WeaponStats) {
        let origin = self.player.body.center();
        let Some(hit) = harvest::harvest_nearest(origin, weapon, &mut self.current.resources) else {
            return;
        };
        self.spawn_particle(hit.at, ParticleKind::Harvest);
        for item in hit.drops {
            if self.player.inventory.is_full() {
                let drop = DroppedItem::spawn(&mut self.ids, hit.at, DropPayload::Item(item));
                self.current.drops.push(drop);
            } else {
                self.player.inventory.add(item);
            }
        }
        if hit.depleted {
            tracing::debug!(node = ?hit.node, "Resource depleted");
        }
    }

    /// Particles, rewards, loot and boss portals for a batch of hits
    fn apply_hits(&mut self, hits: &[StrikeHit]) {
        for hit in hits {
            let kind = if hit.crit {
                ParticleKind::Crit
            } else {
                ParticleKind::Hit
            };
            self.spawn_particle(hit.at, kind);
            self.spawn_particle(hit.at, ParticleKind::Damage(hit.damage.round() as u32));
            if !hit.killed {
                continue;
            }

            let reward = combat::kill_reward(hit.target_level, hit.rank);
            self.player.gold += reward.gold;
            let levels = self.player.gain_xp(reward.xp);
            if levels > 0 {
                tracing::info!(level = self.player.level, "Level up");
            }
            self.spawn_particle(hit.at, ParticleKind::Death);

            if let Some(payload) = loot::roll_drop(hit.drop_rate, hit.target_level, &mut self.rng) {
                let drop = DroppedItem::spawn(&mut self.ids, hit.at, payload);
                self.current.drops.push(drop);
            }

            if hit.rank == Rank::Boss {
                if let Some(tile) = TilePos::from_px(hit.at) {
                    self.current
                        .grid
                        .set(Tile::new(tile.x, tile.y, TileKind::PortalOut));
                    tracing::info!(?tile, "Boss defeated, portal opened");
                }
            }
            tracing::debug!(
                enemy = ?hit.target,
                xp = reward.xp,
                gold = reward.gold,
                "Enemy killed"
            );
        }
    }

    fn stage_transition(&mut self) {
        if let Some(target) = self.transition_target() {
            self.travel(target);
        }
    }

    fn stage_interaction(&mut self) {
        let center = self.player.body.center();
        self.near_npc = self
            .current
            .npcs
            .iter()
            .filter(|npc| npc.body.center().distance(center) <= INTERACT_RADIUS)
            .min_by(|a, b| {
                let da = center.distance_squared(a.body.center());
                let db = center.distance_squared(b.body.center());
                da.total_cmp(&db)
            })
            .map(|npc| npc.id);
    }

    fn stage_ai(&mut self, dt: f32) {
        let hp_mult = self.settings.difficulty.hp_mult();
        let player_center = self.player.body.center();
        let player_id = self.player.id;
        let player_defense = self.player.stats.defense;

        let mut targets = Vec::with_capacity(1 + self.party.len());
        targets.push(ContactTarget {
            id: player_id,
            body: &mut self.player.body,
            defense: player_defense,
        });
        for companion in self.party.iter_mut().filter(|c| !c.downed) {
            targets.push(ContactTarget {
                id: companion.id,
                defense: companion.stats.defense,
                body: &mut companion.body,
            });
        }
        let contacts = ai::enemy_pass(
            &mut self.current.enemies,
            player_center,
            &mut targets,
            &self.current.grid,
            hp_mult,
            dt,
            &mut self.rng,
        );
        drop(targets);
        if !contacts.is_empty() {
            tracing::trace!(hits = contacts.len(), "Contact damage");
        }

        for companion in &mut self.party {
            if !companion.downed && companion.body.hp <= 0.0 {
                companion.downed = true;
                tracing::info!(name = %companion.name, "Companion downed");
            }
        }

        let strikes = ai::companion_pass(
            &mut self.party,
            player_center,
            &mut self.current.enemies,
            &self.current.grid,
            dt,
        );
        self.apply_hits(&strikes);

        if self.player.body.hp <= 0.0 {
            self.player_defeated();
        }
    }

    /// Wake up in town with half the gold
    fn player_defeated(&mut self) {
        self.player.gold /= 2;
        self.player.restore();
        tracing::info!(gold = self.player.gold, "Player defeated, returning to town");
        self.travel(Location::Town);
    }

    fn stage_pickup(&mut self) {
        let center = self.player.body.center();
        for drop in self.current.drops.iter_mut() {
            if drop.body.center().distance(center) > PICKUP_RADIUS {
                continue;
            }
            match &drop.payload {
                DropPayload::Gold(amount) => self.player.gold += *amount,
                DropPayload::Item(item) => {
                    if !self.player.inventory.add(item.clone()) {
                        continue;
                    }
                }
            }
            drop.body.removed = true;
        }

        let depth = self.current.location.depth();
        let mut spilled = Vec::new();
        for chest in self.current.chests.iter_mut() {
            if chest.opened || chest.body.center().distance(center) > PICKUP_RADIUS {
                continue;
            }
            chest.opened = true;
            let at = chest.body.center();
            spilled.extend(
                loot::chest_loot(depth, &mut self.rng)
                    .into_iter()
                    .map(|payload| (at, payload)),
            );
        }
        for (at, payload) in spilled {
            let drop = DroppedItem::spawn(&mut self.ids, at, payload);
            self.current.drops.push(drop);
        }
    }

    fn stage_particles(&mut self, dt: f32) {
        for particle in self.current.particles.iter_mut() {
            particle.decay(dt);
        }
    }

    fn stage_purge(&mut self) {
        for enemy in self.current.enemies.iter_mut() {
            if enemy.body.hp <= 0.0 {
                enemy.body.removed = true;
            }
        }
        for node in self.current.resources.iter_mut() {
            if node.body.hp <= 0.0 {
                node.body.removed = true;
            }
        }
        let tick = self.tick_count;
        self.current.enemies.maybe_compact(tick);
        self.current.resources.maybe_compact(tick);
        self.current.drops.maybe_compact(tick);
        self.current.particles.maybe_compact(tick);
    }

    fn stage_population(&mut self) {
        if !self.current.location.is_world()
            || self.current.enemies.live_count() >= WORLD_ENEMY_FLOOR
            || self.rng.gen::<f32>() >= WORLD_SPAWN_CHANCE
        {
            return;
        }
        let Some(player_tile) = TilePos::from_px(self.player.body.center()) else {
            return;
        };
        let Some(tile) = spawn_cell(&self.current.grid, player_tile, &mut self.rng) else {
            tracing::debug!("No cell for a maintenance spawn");
            return;
        };
        let hp_mult = self.settings.difficulty.hp_mult();
        if let Some(enemy) = monster::roll_enemy(
            &mut self.ids,
            &self.current.location,
            tile.center_px(),
            hp_mult,
            &mut self.rng,
        ) {
            tracing::debug!(race = ?enemy.race, ?tile, "Enemy spawned");
            self.current.enemies.push(enemy);
        }
    }
}
