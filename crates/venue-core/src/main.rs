//! Venue Simulation Runner
//!
//! Builds a world from a scenario file, runs it for a number of weeks and
//! writes one JSON line per weekly report.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use venue_core::ledger::net_worth;
use venue_core::valuation::estimate_sale;
use venue_core::{
    build_world, run_week, ReportLogger, Result, SeededSource, SimConfig, StandardCollaborators,
    VenueRequest,
};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "venue_sim")]
#[command(about = "Weekly economics simulation for a group of venues")]
struct Args {
    /// Scenario TOML file; a single fresh bistro when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of weeks to simulate (overrides the scenario)
    #[arg(long)]
    weeks: Option<u32>,

    /// Random seed for reproducibility (overrides the scenario)
    #[arg(long)]
    seed: Option<u64>,

    /// JSON Lines report file (overrides the scenario)
    #[arg(long)]
    report: Option<PathBuf>,

    /// Print the effective scenario as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn load_config(args: &Args) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => SimConfig::from_file(path)?,
        None => SimConfig {
            venues: vec![VenueRequest::default()],
            ..Default::default()
        },
    };
    if let Some(weeks) = args.weeks {
        config.simulation.weeks = weeks;
    }
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if let Some(report) = &args.report {
        config.simulation.report_path = report.display().to_string();
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("venue_core=info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    if args.print_config {
        println!("{}", config.to_toml()?);
        return Ok(());
    }

    println!("Venue Simulation");
    println!("================");
    println!("Seed: {}", config.simulation.seed);
    println!("Weeks: {}", config.simulation.weeks);
    println!("City: {}", config.world.home_city);
    println!("Venues: {}", config.venues.len());
    println!("Reports: {}", config.simulation.report_path);
    println!();

    let source = SeededSource::new(config.simulation.seed);
    let collaborators = StandardCollaborators;
    let mut world = build_world(&config, &source)?;
    let mut logger = ReportLogger::new(&config.simulation.report_path)?;

    for _ in 0..config.simulation.weeks {
        let report = run_week(&mut world, &source, &collaborators);
        logger.log(&report)?;
    }
    logger.flush()?;

    let sale = estimate_sale(&world);
    println!();
    println!("Simulation complete after {} weeks", logger.report_count());
    println!("Final cash: {:.2}", world.cash);
    println!("Net worth: {:.2}", net_worth(&world));
    println!("Reputation: {:.1}", world.reputation);
    println!("Prestige: {:.1}", world.prestige);
    println!("Estimated sale price: {:.2}", sale.sale_price);

    Ok(())
}
