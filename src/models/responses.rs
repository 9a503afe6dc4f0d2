use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{AllocationRun, DistributionReport};
use crate::models::domain::{AllocationRecord, DonationLot, Recipient};

/// Response for a completed allocation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRunResponse {
    pub run_id: String,
    /// Name of the built-in scenario, when the run came from one
    pub scenario: Option<String>,
    pub seed: Option<u64>,
    pub today: NaiveDate,
    pub prioritized_lots: Vec<DonationLot>,
    pub ledger: Vec<AllocationRecord>,
    pub recipients: Vec<Recipient>,
    pub total_distributed: u64,
    pub total_wasted: u64,
    pub report: DistributionReport,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

impl AllocationRunResponse {
    pub fn from_run(run: AllocationRun) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            scenario: None,
            seed: None,
            today: run.today,
            prioritized_lots: run.prioritized_lots,
            ledger: run.ledger,
            recipients: run.recipients,
            total_distributed: run.total_distributed,
            total_wasted: run.total_wasted,
            report: run.report,
            completed_at: chrono::Utc::now(),
        }
    }

    pub fn with_scenario(mut self, name: impl Into<String>, seed: Option<u64>) -> Self {
        self.scenario = Some(name.into());
        self.seed = seed;
        self
    }
}

/// Built-in scenario description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioInfo {
    pub name: String,
    pub description: String,
}

/// Response listing built-in scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioListResponse {
    pub scenarios: Vec<ScenarioInfo>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub stored_runs: u64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
