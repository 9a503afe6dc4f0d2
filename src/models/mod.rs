// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AllocationRecord, DonationLot, ReceivedAllocation, Recipient, ValidationError, WasteReason,
    WASTE_RECIPIENT_ID, WASTE_RECIPIENT_NAME,
};
pub use requests::{LotInput, RecipientInput, RunAllocationRequest, RunScenarioRequest};
pub use responses::{
    AllocationRunResponse, ErrorResponse, HealthResponse, ScenarioInfo, ScenarioListResponse,
};
