use anyhow::Result;
use clap::Parser;
use log::info;

use transit_platform::simulation::{
    demo_level, BalanceConfig, BoardingPosKind, PassengerId, ServiceClass, SimEvent, SimWorld,
    Timing, TrackSide,
};

#[derive(Parser)]
#[command(name = "transit_platform")]
#[command(about = "Headless train platform boarding simulation")]
struct Cli {
    /// Number of simulation ticks to run
    #[arg(long, default_value = "1200")]
    ticks: u32,

    /// Time delta per tick in milliseconds
    #[arg(long, default_value = "100")]
    delta: f64,

    /// Seed for the generated passengers
    #[arg(long, default_value = "7")]
    seed: u64,

    /// Number of generated passengers
    #[arg(long, default_value = "40")]
    passengers: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    run_headless(&cli)
}

/// Queue kind a simple dispatcher sends a passenger to
fn preferred_kind(timing: Timing) -> BoardingPosKind {
    match timing {
        Timing::NoPreference => BoardingPosKind::Service(ServiceClass::Local),
        Timing::RapidTolerant(_) => BoardingPosKind::Service(ServiceClass::Rapid),
        Timing::ExpressTolerant { .. } => BoardingPosKind::Service(ServiceClass::Express),
        Timing::LimitedExpress => BoardingPosKind::Service(ServiceClass::LimitedExpress),
        Timing::Airport => BoardingPosKind::Airport,
    }
}

/// Send every released passenger to a queue on a track serving their
/// destination, preferring the lane matching their timing.
fn dispatch_waiting(world: &mut SimWorld) -> Result<()> {
    let waiting: Vec<(PassengerId, String, Timing)> = world
        .unboarded()
        .iter()
        .filter_map(|p| {
            p.fare()
                .map(|f| (p.id, f.config.destination.clone(), f.config.timing))
        })
        .collect();

    for (id, destination, timing) in waiting {
        let side = TrackSide::BOTH.into_iter().find(|&side| {
            let track = world.track(side);
            track
                .current_train()
                .into_iter()
                .chain(track.remaining_trains())
                .any(|t| t.destination == destination)
        });
        let Some(side) = side else {
            continue;
        };

        let positions = world.boarding_positions(side);
        let wanted = preferred_kind(timing);
        let handle = positions
            .iter()
            .filter(|(_, p)| p.kind() == wanted)
            .min_by_key(|(_, p)| p.len())
            .or_else(|| positions.iter().min_by_key(|(_, p)| p.len()))
            .map(|(handle, _)| *handle);

        if let Some(handle) = handle {
            world.enqueue_passenger(id, handle)?;
        }
    }
    Ok(())
}

/// Run the simulation in headless mode (no graphics)
fn run_headless(cli: &Cli) -> Result<()> {
    info!("Running platform simulation in headless mode...");
    info!("Ticks: {}, Delta: {}ms", cli.ticks, cli.delta);

    let level = demo_level(cli.seed, cli.passengers);
    let mut world = SimWorld::new(level, BalanceConfig::default())?;

    let ticks_per_second = (1000.0 / cli.delta).ceil().max(1.0) as u32;
    let mut boardings = 0;
    let mut departures = 0;

    for tick in 1..=cli.ticks {
        world.step(cli.delta)?;
        dispatch_waiting(&mut world)?;

        for event in world.take_events() {
            match event {
                SimEvent::Boarded { .. } => boardings += 1,
                SimEvent::TrainDeparted { .. } => departures += 1,
                _ => {}
            }
        }

        if tick % (ticks_per_second * 10) == 0 {
            world.print_summary();
        }
        if world.is_finished() {
            info!("All trains have left after tick {}", tick);
            break;
        }
    }

    info!("=== SIMULATION COMPLETE ===");
    info!("Trains departed: {}", departures);
    info!("Passengers boarded: {}", boardings);
    world.print_summary();
    Ok(())
}
