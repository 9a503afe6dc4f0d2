// Core algorithm exports
pub mod allocator;
pub mod pipeline;
pub mod priority;
pub mod report;
pub mod urgency;

pub use allocator::{allocatable_amount, AllocationOutcome, Allocator, ExpiredLotPolicy};
pub use pipeline::{AllocationPipeline, AllocationRun};
pub use priority::{compare_priority, prioritize};
pub use report::{percentage, render_summary, DistributionReport, ItemQuantity, RecipientStats};
pub use urgency::{score_for_days_left, urgency_score, UrgencyScorer, DEFAULT_HORIZON_DAYS, MAX_URGENCY};
