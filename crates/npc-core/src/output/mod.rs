//! Snapshot Output
//!
//! Builds observability snapshots from a live world and writes them out as
//! JSON. The snapshot types live in `npc-events` so downstream readers do not
//! need the engine's component definitions.

use bevy_ecs::prelude::*;
use npc_events::{FactionMoodSnapshot, NpcSnapshot, WorldSnapshot};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::components::{LifeData, NeedKind, Npc, NpcId, NpcName};
use crate::social::{Affiliation, Faction, RumorNetwork};
use crate::SimClock;

/// Errors that can occur while writing snapshots.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Builds a full psychological snapshot of the world.
///
/// The listed price modifier is the combined figure a buyer would see:
/// personality baseline times the current emotional adjustment.
pub fn generate_snapshot(world: &mut World, reason: &str) -> WorldSnapshot {
    let clock = world.resource::<SimClock>().0;
    let mut snapshot = WorldSnapshot::new(clock.tick, clock.day(), reason);

    let mut moods: BTreeMap<Faction, (usize, f32, f32)> = BTreeMap::new();

    let mut query =
        world.query_filtered::<(&NpcId, &NpcName, &Affiliation, &LifeData), With<Npc>>();
    let rumors = world.resource::<RumorNetwork>();
    snapshot.tracked_rumor_subjects = rumors.subject_count();
    snapshot.active_rumors = rumors.rumor_count();

    for (id, name, affiliation, life) in query.iter(world) {
        let faction = affiliation.0;
        let energy = life.needs.get(NeedKind::Energy);
        let safety = life.needs.get(NeedKind::Safety);

        let entry = moods.entry(faction).or_insert((0, 0.0, 0.0));
        entry.0 += 1;
        entry.1 += energy;
        entry.2 += safety;

        snapshot.npcs.push(NpcSnapshot {
            id: id.0,
            name: name.0.clone(),
            faction: faction.name().to_string(),
            energy,
            safety,
            sleeping: life.needs.is_sleeping(),
            emotion: life.emotions.current().name().to_string(),
            emotion_intensity: life.emotions.intensity(),
            price_modifier: life.combined_price_modifier(),
            social_modifier: life.combined_social_modifier(),
            archetype: life.personality.archetype().name().to_string(),
            memory_subjects: life.memory.subject_count(),
            known_rumors: rumors.known_count(id.0),
        });
    }

    // Entity iteration order follows archetype layout, not spawn order.
    snapshot.npcs.sort_by_key(|npc| npc.id);

    for (faction, (members, energy_sum, safety_sum)) in moods {
        snapshot.faction_moods.push(FactionMoodSnapshot {
            faction: faction.name().to_string(),
            members,
            average_energy: energy_sum / members as f32,
            average_safety: safety_sum / members as f32,
        });
    }

    snapshot
}

/// Writes a snapshot as pretty-printed JSON.
pub fn write_snapshot(snapshot: &WorldSnapshot, path: impl AsRef<Path>) -> Result<(), OutputError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, snapshot)?;
    Ok(())
}

/// Writes a snapshot into the directory as `snap_<tick>.json`, creating the
/// directory if needed. Returns the path written.
pub fn write_snapshot_to_dir(
    snapshot: &WorldSnapshot,
    dir: impl AsRef<Path>,
) -> Result<PathBuf, OutputError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("snap_{:06}.json", snapshot.tick));
    write_snapshot(snapshot, &path)?;
    Ok(path)
}

/// Overwrites the rolling `current_state.json` in the directory.
pub fn write_current_state(
    snapshot: &WorldSnapshot,
    dir: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    write_snapshot(snapshot, dir.join("current_state.json"))
}
