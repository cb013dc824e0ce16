//! NPC Mind Simulation
//!
//! Standalone driver for the social and psychological engine. Builds a town,
//! ticks it, and plays the part of a game host by injecting occasional
//! outside events so reactions to players can be observed without a game
//! attached.

use bevy_ecs::prelude::*;
use clap::Parser;
use npc_events::{SocialEvent, SocialEventKind};
use rand::Rng;
use std::collections::BTreeMap;
use std::path::Path;
use uuid::Uuid;

use npc_core::config::{Config, DEFAULT_TUNING_PATH};
use npc_core::output;
use npc_core::setup::build_world;
use npc_core::systems::{
    build_position_index, process_social_events, roll_world_day, run_ambient_encounters,
    tick_interactions, tick_life, update_safety, update_sleep_state, PositionIndex,
    SocialEventQueue,
};
use npc_core::{Affiliation, Npc, SimClock, SimRng};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "npc_sim")]
#[command(about = "An NPC social and psychological simulation engine")]
struct Args {
    /// Tuning file path
    #[arg(long, default_value = DEFAULT_TUNING_PATH)]
    tuning: String,

    /// Random seed, overriding the tuning file
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to simulate, overriding the tuning file
    #[arg(long)]
    ticks: Option<u64>,

    /// Interval between world snapshots (in ticks), overriding the tuning file
    #[arg(long)]
    snapshot_interval: Option<u64>,

    /// Output directory for snapshots and current state
    #[arg(long, default_value = "output")]
    output_dir: String,

    /// Ticks between injected host events (0 disables them)
    #[arg(long, default_value_t = 400)]
    event_interval: u64,
}

fn main() {
    let args = Args::parse();

    // The default tuning path may be absent; an explicitly given one may not.
    let mut config = if args.tuning == DEFAULT_TUNING_PATH {
        Config::load_or_default()
    } else {
        match Config::load(&args.tuning) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: could not load {}: {}", args.tuning, e);
                std::process::exit(1);
            }
        }
    };
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if let Some(ticks) = args.ticks {
        config.simulation.default_ticks = ticks;
    }
    if let Some(interval) = args.snapshot_interval {
        config.simulation.snapshot_interval = interval;
    }

    let ticks = config.simulation.default_ticks;
    let snapshot_interval = config.simulation.snapshot_interval.max(1);
    let snapshots_dir = Path::new(&args.output_dir).join("snapshots");

    println!("NPC Mind Simulation");
    println!("===================");
    println!("Seed: {}", config.simulation.seed);
    println!("Ticks: {}", ticks);
    println!("Snapshot interval: {}", snapshot_interval);
    println!();

    println!("Building world...");
    let mut world = build_world(&config);
    {
        let mut query = world.query_filtered::<&Affiliation, With<Npc>>();
        let mut by_faction: BTreeMap<&'static str, usize> = BTreeMap::new();
        for affiliation in query.iter(&world) {
            *by_faction.entry(affiliation.0.display()).or_insert(0) += 1;
        }
        let total: usize = by_faction.values().sum();
        println!("  Spawned {} NPCs", total);
        for (faction, count) in by_faction {
            println!("    {}: {}", faction, count);
        }
    }

    let initial = output::generate_snapshot(&mut world, "simulation_start");
    if let Err(e) = output::write_snapshot_to_dir(&initial, &snapshots_dir) {
        eprintln!("Warning: could not write initial snapshot: {}", e);
    }
    if let Err(e) = output::write_current_state(&initial, &args.output_dir) {
        eprintln!("Warning: could not write current state: {}", e);
    } else {
        println!("  Wrote initial snapshot (tick 0)");
    }

    // One pass of the chain is one world tick. The order mirrors how a tick
    // unfolds: refresh the spatial index, settle bodies and minds, absorb
    // outside events, then let NPCs seek each other out.
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            build_position_index,
            update_sleep_state,
            tick_life,
            update_safety,
            process_social_events,
            run_ambient_encounters,
            tick_interactions,
            roll_world_day,
        )
            .chain(),
    );

    println!();
    println!("Starting simulation...");
    println!();

    for _ in 0..ticks {
        world.resource_mut::<SimClock>().0.advance();
        let tick = world.resource::<SimClock>().0.tick;

        if args.event_interval > 0 && tick % args.event_interval == 0 {
            inject_host_event(&mut world, tick);
        }

        schedule.run(&mut world);

        if tick % snapshot_interval == 0 {
            let snapshot = output::generate_snapshot(&mut world, "periodic");
            if let Err(e) = output::write_snapshot_to_dir(&snapshot, &snapshots_dir) {
                eprintln!("Warning: could not write snapshot at tick {}: {}", tick, e);
            }
            if let Err(e) = output::write_current_state(&snapshot, &args.output_dir) {
                eprintln!("Warning: could not write current state at tick {}: {}", tick, e);
            }
            let clock = world.resource::<SimClock>().0;
            println!(
                "[Tick {:>6}] day {}, {:02}:00 - {} active rumors about {} subjects",
                tick,
                clock.day(),
                clock.hour(),
                snapshot.active_rumors,
                snapshot.tracked_rumor_subjects
            );
        }
    }

    let final_snapshot = output::generate_snapshot(&mut world, "simulation_end");
    if let Err(e) = output::write_snapshot_to_dir(&final_snapshot, &snapshots_dir) {
        eprintln!("Warning: could not write final snapshot: {}", e);
    }
    if let Err(e) = output::write_current_state(&final_snapshot, &args.output_dir) {
        eprintln!("Warning: could not write final current state: {}", e);
    }

    println!();
    let clock = world.resource::<SimClock>().0;
    println!(
        "Simulation complete. Ran {} ticks (ending on day {}).",
        ticks,
        clock.day()
    );
    println!(
        "{} active rumors about {} subjects.",
        final_snapshot.active_rumors, final_snapshot.tracked_rumor_subjects
    );
}

/// Plays the game host: every so often an outside actor trades with, gifts,
/// helps, hires, or robs a random townsperson.
fn inject_host_event(world: &mut World, tick: u64) {
    // The demo host's one wandering player stand-in.
    let actor = Uuid::from_u128(0xD00D);

    let entries: Vec<(Uuid, f32, f32)> = world
        .resource::<PositionIndex>()
        .entries()
        .iter()
        .map(|entry| (entry.id, entry.x, entry.y))
        .collect();
    if entries.is_empty() {
        return;
    }

    let kind = {
        let mut rng = world.resource_mut::<SimRng>();
        let rng = &mut rng.0;
        let (npc, x, y) = entries[rng.gen_range(0..entries.len())];
        match rng.gen_range(0..6) {
            0 | 1 => SocialEventKind::Transaction {
                actor,
                npc,
                value: rng.gen_range(20..=400),
                fair: rng.gen_bool(0.8),
            },
            2 => SocialEventKind::Gift {
                actor,
                npc,
                value: rng.gen_range(50..=600),
            },
            3 => SocialEventKind::HelpGiven { actor, npc },
            4 => SocialEventKind::QuestCompleted { actor, npc },
            _ => SocialEventKind::CrimeWitnessed {
                actor,
                npc,
                severity: rng.gen_range(2..=7),
                against_underworld: false,
                x,
                y,
            },
        }
    };

    world
        .resource_mut::<SocialEventQueue>()
        .push(SocialEvent::new(tick, kind));
}
