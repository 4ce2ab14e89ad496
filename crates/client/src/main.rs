//! `arena-sim`: run one battle between two AI-controlled teams.
//!
//! ```bash
//! cargo run -p arena-client -- --seed 7 --max-rounds 30
//! RUST_LOG=arena=debug,runtime=debug cargo run -p arena-client -- --data-dir data
//! ```

use anyhow::{Context, Result};

use arena_client::Simulation;
use arena_client::cli::{self, Args};
use arena_content::{ContentFactory, MatchConfig, MatchLoader, Roster, RosterLoader};
use arena_core::Battle;
use arena_runtime::{Host, RandRng};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::parse_args();
    setup_logging();

    let (roster, config) = load_content(&args)?;
    let (actors, passives) = config.assemble(&roster)?;
    tracing::info!(
        seed = config.seed,
        actors = actors.len(),
        rules = passives.len(),
        "match loaded"
    );

    let battle = Battle::builder(actors)
        .config(config.battle.clone())
        .passives(passives)
        .rng(RandRng::seeded(config.seed))
        .build()?;
    let host = Host::builder(battle).spawn();

    let outcome = Simulation::builder(host.handle())
        .max_rounds(config.max_rounds)
        .build()
        .run()
        .await?;
    println!("{}", outcome.report);

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&outcome)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write match log to {}", path.display()))?;
        tracing::info!("Match log written to {}", path.display());
    }

    host.shutdown().await?;
    Ok(())
}

/// Install a stderr subscriber; `RUST_LOG` overrides the `info` default.
fn setup_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn load_content(args: &Args) -> Result<(Roster, MatchConfig)> {
    let factory = ContentFactory::new(&args.data_dir);
    let roster = match &args.roster {
        Some(path) => RosterLoader::load(path)?,
        None => factory.load_roster()?,
    };
    let mut config = match &args.match_file {
        Some(path) => MatchLoader::load(path)?,
        None => factory.load_match()?,
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.max_rounds.is_some() {
        config.max_rounds = args.max_rounds;
    }
    if let Some(delay) = args.stun_delay {
        config.battle.stun_skip_delay_ms = delay;
    }
    Ok((roster, config))
}
