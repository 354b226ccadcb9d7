use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

use simaquarium::config::SimulationConfig;
use simaquarium::metrics::{Metrics, MetricsSummary};
use simaquarium::setup;
use simaquarium::world::aquarium::{Aquarium, AquariumSnapshot};
use simaquarium::world::state::Speed;
use simaquarium::world::systems::clock::{start_world_clock, WorldClock};
use simaquarium::world::systems::swimmer::{start_swimmer, Swimmer};

const REPORT_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Serialize)]
struct FinalReport {
    seed: u64,
    fairness_index: Option<f64>,
    metrics: MetricsSummary,
    world: AquariumSnapshot,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Simulated aquarium v{}", env!("CARGO_PKG_VERSION"));

    let config = SimulationConfig::load_or_default();
    config.validate().map_err(|e| anyhow!("invalid configuration: {}", e))?;

    let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!(
        "Configuration loaded: {}x{}, fish={}, food={}, obstacles={}, seed={}",
        config.width, config.height, config.fish_count, config.food, config.obstacles, seed
    );

    let mut rng = StdRng::seed_from_u64(seed);
    let world = Arc::new(Aquarium::new());
    let metrics = Arc::new(Metrics::new());

    setup::populate(&world, &config, &mut rng)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let clock = WorldClock::new(world.clone(), metrics.clone(), config.clock, rng.gen());
    let clock_handle = start_world_clock(clock, shutdown_rx.clone());

    let mut swimmers = Vec::with_capacity(config.fish_count);
    for i in 0..config.fish_count {
        let id = setup::spawn_fish(&world, &format!("fish{}", i), &mut rng)?;
        Metrics::incr(&metrics.fish_live);
        let swimmer = Swimmer::new(id, world.clone(), metrics.clone(), Speed::Normal, rng.gen());
        swimmers.push(start_swimmer(swimmer, config.tick, shutdown_rx.clone()));
    }

    let report_metrics = metrics.clone();
    let report_world = world.clone();
    let mut report_shutdown = shutdown_rx.clone();
    let reporter = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(REPORT_INTERVAL);
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let s = report_metrics.summary();
                    info!(
                        "live={} food={} eaten={} moves={} decision_p95={}us",
                        s.fish_live,
                        report_world.food_count(),
                        s.food_eaten,
                        s.moves,
                        s.decision_time_p95_us
                    );
                }
                _ = report_shutdown.changed() => break,
            }
        }
    });

    let run_for = async {
        match config.run_secs {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Shutdown signal received");
        }
        _ = run_for => {
            info!("Run time elapsed");
        }
    }

    shutdown_tx.send(true)?;
    clock_handle.await?;
    for handle in swimmers {
        handle.await?;
    }
    reporter.await?;

    let report = FinalReport {
        seed,
        fairness_index: world.fairness_index().ok(),
        metrics: metrics.summary(),
        world: world.snapshot(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    info!("Simulation stopped");
    Ok(())
}
