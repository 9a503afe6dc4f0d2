//! Runs every built-in scenario and prints a console report for each.
//!
//! Usage: simulate [--today YYYY-MM-DD] [--seed N]

use chrono::NaiveDate;
use std::process::ExitCode;
use surplus_match::config::Settings;
use surplus_match::core::{render_summary, AllocationPipeline};
use surplus_match::logging;
use surplus_match::scenarios::Scenario;

struct Args {
    today: NaiveDate,
    seed: Option<u64>,
}

fn parse_args() -> Result<Args, String> {
    let mut today = chrono::Local::now().date_naive();
    let mut seed = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--today" => {
                let value = args.next().ok_or("--today needs a date")?;
                today = NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                    .map_err(|e| format!("invalid --today {}: {}", value, e))?;
            }
            "--seed" => {
                let value = args.next().ok_or("--seed needs a number")?;
                seed = Some(
                    value
                        .parse()
                        .map_err(|e| format!("invalid --seed {}: {}", value, e))?,
                );
            }
            other => return Err(format!("unknown argument: {}", other)),
        }
    }

    Ok(Args { today, seed })
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    logging::init_stderr(&settings.logging);

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Usage: simulate [--today YYYY-MM-DD] [--seed N]");
            return ExitCode::from(2);
        }
    };

    let pipeline = AllocationPipeline::new(
        settings.allocation.urgency_horizon_days,
        settings.allocation.expired_policy,
    );
    let seed = args
        .seed
        .or(settings.scenarios.seed)
        .unwrap_or_else(rand::random);

    let mut all_conserved = true;

    for scenario in Scenario::ALL {
        println!("\n==================================================");
        println!(" RUNNING SCENARIO: {} ({})", scenario, scenario.description());
        println!("==================================================");

        let (lots, recipients) =
            match scenario.build(args.today, seed, settings.scenarios.mock_lot_count) {
                Ok(batch) => batch,
                Err(e) => {
                    tracing::error!("Failed to build scenario {}: {}", scenario, e);
                    all_conserved = false;
                    continue;
                }
            };

        match pipeline.run(lots, recipients, args.today) {
            Ok(run) => {
                all_conserved &= run.report.conserved;
                print!("{}", render_summary(&run));
            }
            Err(e) => {
                tracing::error!("Scenario {} rejected: {}", scenario, e);
                all_conserved = false;
            }
        }
    }

    println!("\nSeed used for generated scenarios: {}", seed);

    if all_conserved {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

