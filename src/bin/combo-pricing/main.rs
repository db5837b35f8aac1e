//! Combo Pricing CLI
//!
//! Loads a fixture set, resolves combos, applies the threshold gift rule and
//! prints the receipt.
//!
//! Use `-f` to pick a fixture set by name
//! Use `-d` to point at another fixtures directory

use std::{io, time::Instant};

use anyhow::Result;
use clap::Parser;
use combo_pricing::{
    fixtures::Fixture,
    receipt::Receipt,
    solvers::{exhaustive::ExhaustiveSolver, observer::BranchCounter},
};
use tracing::info;

mod config;
mod logging;

use config::Config;

#[expect(clippy::print_stdout, reason = "CLI output")]
fn main() -> Result<()> {
    let config = Config::parse();

    logging::init_subscriber(&config)?;

    let fixture = Fixture::from_set_in(&config.fixtures_dir, &config.fixture)?;

    let basket = fixture.basket()?;
    let catalog = fixture.catalog()?;
    let gift_promotion = fixture.gift_promotion()?;

    let mut counter = BranchCounter::default();
    let start = Instant::now();

    let resolution = ExhaustiveSolver::solve_with_observer(&catalog, &basket, &mut counter)?;

    let elapsed = start.elapsed().as_secs_f32();

    info!(
        fixture = %config.fixture,
        branches = counter.branches,
        improvements = counter.improvements,
        max_depth = counter.max_depth,
        "combo search finished"
    );

    let receipt = Receipt::from_resolution(&basket, resolution, gift_promotion)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    receipt.write_to(&mut handle, &basket)?;

    println!("\nSearched {} branches in {elapsed}s", counter.branches);

    Ok(())
}
