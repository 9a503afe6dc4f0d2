//! Built-in donation/recipient fixtures used by the simulator and the
//! `/scenarios` endpoints.

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::models::{DonationLot, Recipient, ValidationError};

/// Staple items used by the randomly generated scenario
pub const STAPLE_ITEMS: &[&str] = &[
    "Milk",
    "Bread",
    "Canned Soup",
    "Apples",
    "Pasta",
    "Flour",
    "Rice",
    "Yogurt",
];

/// Lot count used when none is configured
pub const DEFAULT_MOCK_LOT_COUNT: usize = 15;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Unknown scenario: {0}")]
    Unknown(String),

    #[error("Invalid fixture: {0}")]
    Invalid(#[from] ValidationError),
}

/// Lots and recipients making up one batch
pub type Batch = (Vec<DonationLot>, Vec<Recipient>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Random lots against the three standard charity profiles
    Standard,
    /// One huge, urgent milk lot against a combined milk need of 90
    Oversupply,
    /// A lot no recipient accepts
    NoMatch,
    /// A lot that exactly fills one recipient's need and capacity
    ExactFit,
    /// Two lots of one item competing for a single recipient's capacity
    Contention,
}

impl Scenario {
    pub const ALL: [Scenario; 5] = [
        Scenario::Standard,
        Scenario::Oversupply,
        Scenario::NoMatch,
        Scenario::ExactFit,
        Scenario::Contention,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Standard => "standard",
            Scenario::Oversupply => "oversupply",
            Scenario::NoMatch => "no_match",
            Scenario::ExactFit => "exact_fit",
            Scenario::Contention => "contention",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Scenario::Standard => "Randomly generated lots against three charity profiles",
            Scenario::Oversupply => "Oversupply of a single, highly urgent item (expect high waste)",
            Scenario::NoMatch => "Donations no charity needs (expect 100% waste)",
            Scenario::ExactFit => "One lot exactly fills one charity's need and capacity",
            Scenario::Contention => "Urgent and relaxed lots competing for scarce capacity",
        }
    }

    /// Whether the batch depends on the seed
    pub fn is_random(&self) -> bool {
        matches!(self, Scenario::Standard)
    }

    /// Build the scenario's batch for `today`
    ///
    /// `seed` and `lot_count` only affect [`Scenario::Standard`].
    pub fn build(&self, today: NaiveDate, seed: u64, lot_count: usize) -> Result<Batch, ScenarioError> {
        let batch = match self {
            Scenario::Standard => standard(today, seed, lot_count)?,
            Scenario::Oversupply => oversupply(today)?,
            Scenario::NoMatch => no_match(today)?,
            Scenario::ExactFit => exact_fit(today)?,
            Scenario::Contention => contention(today)?,
        };
        Ok(batch)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.name() == normalized)
            .ok_or_else(|| ScenarioError::Unknown(s.to_string()))
    }
}

fn in_days(today: NaiveDate, days: i64) -> NaiveDate {
    today + Duration::days(days)
}

/// The three charity profiles every standard run allocates against
pub fn standard_recipients() -> Result<Vec<Recipient>, ValidationError> {
    Ok(vec![
        Recipient::new(
            "C001",
            "Central Kitchen",
            300,
            [("Milk", 50), ("Bread", 80), ("Canned Soup", 120), ("Flour", 50)],
        )?,
        Recipient::new(
            "C002",
            "Community Shelter",
            250,
            [("Apples", 75), ("Pasta", 100), ("Rice", 50), ("Bread", 25), ("Yogurt", 50)],
        )?,
        Recipient::new(
            "C003",
            "Youth Center",
            150,
            [("Milk", 40), ("Canned Soup", 60), ("Pasta", 50)],
        )?,
    ])
}

/// Random lots: item from the staples, 10-100 units, expiring in 1-30 days
pub fn generate_lots(today: NaiveDate, seed: u64, count: usize) -> Result<Vec<DonationLot>, ValidationError> {
    let mut rng = StdRng::seed_from_u64(seed);

    (1..=count)
        .map(|i| {
            let item = STAPLE_ITEMS[rng.random_range(0..STAPLE_ITEMS.len())];
            let days_to_expiry = rng.random_range(1..=30);
            let quantity = rng.random_range(10..=100);
            DonationLot::new(format!("D{:03}", i), item, quantity, in_days(today, days_to_expiry))
        })
        .collect()
}

fn standard(today: NaiveDate, seed: u64, lot_count: usize) -> Result<Batch, ValidationError> {
    Ok((generate_lots(today, seed, lot_count)?, standard_recipients()?))
}

fn oversupply(today: NaiveDate) -> Result<Batch, ValidationError> {
    let lots = vec![
        DonationLot::new("DSUPER1", "Milk", 1000, in_days(today, 1))?,
        DonationLot::new("D2", "Bread", 50, in_days(today, 20))?,
    ];
    let recipients = vec![
        Recipient::new("C10", "Small Pantry", 100, [("Milk", 50), ("Bread", 20)])?,
        Recipient::new("C11", "Milk Only Center", 50, [("Milk", 40)])?,
    ];
    Ok((lots, recipients))
}

fn no_match(today: NaiveDate) -> Result<Batch, ValidationError> {
    let lots = vec![DonationLot::new("DNOMATCH1", "Exotic Fruit", 200, in_days(today, 5))?];
    let recipients = vec![Recipient::new("C20", "Basic Needs", 100, [("Bread", 50)])?];
    Ok((lots, recipients))
}

fn exact_fit(today: NaiveDate) -> Result<Batch, ValidationError> {
    let lots = vec![DonationLot::new("DFIT1", "Rice", 60, in_days(today, 3))?];
    let recipients = vec![Recipient::new("C30", "Family Pantry", 60, [("Rice", 60)])?];
    Ok((lots, recipients))
}

fn contention(today: NaiveDate) -> Result<Batch, ValidationError> {
    let lots = vec![
        DonationLot::new("DRELAXED", "Yogurt", 40, in_days(today, 25))?,
        DonationLot::new("DURGENT", "Yogurt", 40, in_days(today, 2))?,
    ];
    let recipients = vec![Recipient::new("C40", "Night Shelter", 50, [("Yogurt", 100)])?];
    Ok((lots, recipients))
}
