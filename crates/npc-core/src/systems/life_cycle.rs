//! Life Cycle Systems
//!
//! The per-tick upkeep of every NPC: the position index other systems read,
//! the sleep schedule, need/emotion decay, and the periodic safety recompute
//! that turns spatial context into the safety need. Also owns the world-level
//! day tracker that drives rumor expiration sweeps.

use bevy_ecs::prelude::*;
use uuid::Uuid;

use crate::components::{
    memory_tags, need_constants, safety_constants, Armed, Home, LifeData, Memory, Npc, NpcId,
    Position, SafetyReport,
};
use crate::social::{Affiliation, Faction, RelationGraph, RumorNetwork};
use crate::SimClock;

/// A flat snapshot of one NPC's whereabouts, rebuilt every tick.
#[derive(Debug, Clone, Copy)]
pub struct IndexedNpc {
    pub entity: Entity,
    pub id: Uuid,
    pub x: f32,
    pub y: f32,
    pub faction: Faction,
    pub armed: bool,
}

/// Spatial index over the NPC population.
///
/// Cleared and refilled by [`build_position_index`] before anything else runs
/// in a pass, so consumers always see positions from the current tick. Entries
/// are sorted by id, which keeps pair scans independent of archetype layout.
#[derive(Resource, Debug, Default)]
pub struct PositionIndex {
    entries: Vec<IndexedNpc>,
}

impl PositionIndex {
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn add(&mut self, entry: IndexedNpc) {
        self.entries.push(entry);
    }

    pub fn sort_by_id(&mut self) {
        self.entries.sort_by_key(|e| e.id);
    }

    pub fn entries(&self) -> &[IndexedNpc] {
        &self.entries
    }

    pub fn entity_of(&self, id: Uuid) -> Option<Entity> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.entity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A crime somebody witnessed, kept long enough to depress nearby safety.
#[derive(Debug, Clone, Copy)]
pub struct CrimeRecord {
    pub x: f32,
    pub y: f32,
    pub tick: u64,
}

/// Recent witnessed crimes, pruned on the safety cadence.
#[derive(Resource, Debug, Default)]
pub struct CrimeLog {
    records: Vec<CrimeRecord>,
}

impl CrimeLog {
    pub fn record(&mut self, x: f32, y: f32, tick: u64) {
        self.records.push(CrimeRecord { x, y, tick });
    }

    /// Drops records older than the crime memory window.
    pub fn prune(&mut self, now: u64) {
        self.records
            .retain(|r| now.saturating_sub(r.tick) <= safety_constants::CRIME_MEMORY_TICKS);
    }

    /// Whether any in-window crime happened close to a point.
    pub fn any_near(&self, x: f32, y: f32, now: u64) -> bool {
        use safety_constants::*;
        self.records.iter().any(|r| {
            now.saturating_sub(r.tick) <= CRIME_MEMORY_TICKS && {
                let dx = x - r.x;
                let dy = y - r.y;
                dx * dx + dy * dy <= CRIME_RADIUS * CRIME_RADIUS
            }
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Last day the world-level rollover work ran.
#[derive(Resource, Debug, Default)]
pub struct DayTracker {
    pub last_day: Option<u64>,
}

/// Rebuilds [`PositionIndex`] from the live population. Must run first in the
/// schedule; everything spatial reads this instead of querying positions.
pub fn build_position_index(
    mut index: ResMut<PositionIndex>,
    query: Query<(Entity, &NpcId, &Position, &Affiliation, Option<&Armed>), With<Npc>>,
) {
    index.clear();
    for (entity, id, position, affiliation, armed) in &query {
        index.add(IndexedNpc {
            entity,
            id: id.0,
            x: position.x,
            y: position.y,
            faction: affiliation.0,
            armed: armed.is_some(),
        });
    }
    index.sort_by_id();
}

/// Puts NPCs to bed at nightfall and wakes them at dawn. Watch members patrol
/// through the night and never sleep on shift.
pub fn update_sleep_state(
    clock: Res<SimClock>,
    mut query: Query<(&Affiliation, &mut LifeData), With<Npc>>,
) {
    let night = clock.0.is_night();
    for (affiliation, mut life) in &mut query {
        if !life.enabled {
            continue;
        }
        let should_sleep = night && affiliation.0 != Faction::CityWatch;
        if life.needs.is_sleeping() != should_sleep {
            life.needs.set_sleeping(should_sleep);
        }
    }
}

/// Advances every NPC's internal state machine by one tick.
pub fn tick_life(clock: Res<SimClock>, mut query: Query<&mut LifeData, With<Npc>>) {
    for mut life in &mut query {
        life.tick(&clock.0);
    }
}

/// Recomputes the safety need from spatial context on a slow cadence.
pub fn update_safety(
    clock: Res<SimClock>,
    index: Res<PositionIndex>,
    relations: Res<RelationGraph>,
    mut crimes: ResMut<CrimeLog>,
    mut query: Query<(&NpcId, &Position, &Affiliation, Option<&Home>, &mut LifeData), With<Npc>>,
) {
    let now = clock.0.tick;
    if now % need_constants::SAFETY_UPDATE_INTERVAL != 0 {
        return;
    }
    crimes.prune(now);
    let night = clock.0.is_night();
    for (id, position, affiliation, home, mut life) in &mut query {
        if !life.enabled {
            continue;
        }
        let report = build_safety_report(
            id.0,
            position,
            affiliation.0,
            home,
            &life.memory,
            &index,
            &relations,
            &crimes,
            now,
            night,
        );
        life.needs.apply_safety(&report);
    }
}

/// Assembles the environment report one NPC's safety recompute consumes.
#[allow(clippy::too_many_arguments)]
fn build_safety_report(
    npc: Uuid,
    position: &Position,
    faction: Faction,
    home: Option<&Home>,
    memory: &Memory,
    index: &PositionIndex,
    relations: &RelationGraph,
    crimes: &CrimeLog,
    now: u64,
    night: bool,
) -> SafetyReport {
    use safety_constants::*;

    let near_home = home
        .map(|h| {
            let dx = position.x - h.x;
            let dy = position.y - h.y;
            dx * dx + dy * dy <= HOME_RADIUS_SQ
        })
        .unwrap_or(false);

    let mut report = SafetyReport {
        near_home,
        exposed_at_night: night && !near_home,
        recent_crime_nearby: crimes.any_near(position.x, position.y, now),
        ..SafetyReport::default()
    };

    for other in index.entries() {
        if other.id == npc {
            continue;
        }
        let dx = position.x - other.x;
        let dy = position.y - other.y;
        let dist_sq = dx * dx + dy * dy;

        if other.faction == Faction::CityWatch && dist_sq <= WATCH_RADIUS * WATCH_RADIUS {
            report.watch_nearby = true;
        }
        if dist_sq <= FRIEND_RADIUS * FRIEND_RADIUS
            && relations.get(npc, other.id) >= FRIEND_RELATION_FLOOR
        {
            report.friend_nearby = true;
        }
        if dist_sq <= CRIMINAL_RADIUS * CRIMINAL_RADIUS
            && (memory.has_tag(other.id, memory_tags::TAG_CRIMINAL)
                || memory.has_tag(other.id, memory_tags::TAG_DANGEROUS))
        {
            report.known_criminal_nearby = true;
        }
        // A uniformed watch member never reads as an armed stranger.
        if other.armed
            && other.faction != Faction::CityWatch
            && other.faction != faction
            && dist_sq <= ARMED_RADIUS * ARMED_RADIUS
            && relations.get(npc, other.id) <= 0
        {
            report.armed_stranger_nearby = true;
        }
    }
    report
}

/// Runs once per day change: the rumor network sweeps expired and worn-out
/// rumors so the next day starts from a pruned state.
pub fn roll_world_day(
    clock: Res<SimClock>,
    mut tracker: ResMut<DayTracker>,
    mut rumors: ResMut<RumorNetwork>,
) {
    let day = clock.0.day();
    if tracker.last_day == Some(day) {
        return;
    }
    if tracker.last_day.is_some() {
        tracing::info!(day, "day rolled over");
    }
    tracker.last_day = Some(day);
    rumors.on_day_change(day);
}
