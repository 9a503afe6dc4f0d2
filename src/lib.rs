//! Surplus Match - urgency-driven allocation of perishable food donations
//!
//! This library scores donation lots by how close they are to expiry, orders
//! them by that urgency and greedily assigns them to charity recipients within
//! each recipient's per-item needs and overall capacity. Whatever cannot be
//! placed is recorded as waste, and every run reports its distribution
//! efficiency.

pub mod config;
pub mod core;
pub mod logging;
pub mod models;
pub mod routes;
pub mod scenarios;
pub mod services;

// Re-export commonly used types
pub use crate::core::{AllocationPipeline, AllocationRun, Allocator, ExpiredLotPolicy, UrgencyScorer};
pub use crate::models::{AllocationRecord, DonationLot, Recipient, ValidationError, WasteReason};
pub use crate::scenarios::Scenario;
