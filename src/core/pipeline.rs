use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, instrument, warn};

use crate::core::allocator::{AllocationOutcome, Allocator, ExpiredLotPolicy};
use crate::core::priority::prioritize;
use crate::core::report::DistributionReport;
use crate::core::urgency::UrgencyScorer;
use crate::models::{AllocationRecord, DonationLot, Recipient, ValidationError};

/// Result of one complete allocation run
#[derive(Debug, Clone, Serialize)]
pub struct AllocationRun {
    pub today: NaiveDate,
    /// Lots in the order they were allocated, with urgency scores filled in
    pub prioritized_lots: Vec<DonationLot>,
    pub ledger: Vec<AllocationRecord>,
    /// Recipients after the run: updated stock, needs and histories
    pub recipients: Vec<Recipient>,
    pub total_distributed: u64,
    pub total_wasted: u64,
    pub report: DistributionReport,
}

/// Main allocation orchestrator
///
/// # Pipeline Stages
/// 1. Input checks (unique lot and recipient ids)
/// 2. Urgency scoring
/// 3. Priority sort
/// 4. Greedy allocation
/// 5. Distribution report
///
/// A run owns its recipients from start to finish and hands them back in the
/// result, so nothing outside the run sees intermediate state and nothing
/// carries over into the next run.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationPipeline {
    scorer: UrgencyScorer,
    allocator: Allocator,
}

impl AllocationPipeline {
    pub fn new(horizon_days: u32, expired_policy: ExpiredLotPolicy) -> Self {
        Self {
            scorer: UrgencyScorer::new(horizon_days),
            allocator: Allocator::new(expired_policy),
        }
    }

    pub fn scorer(&self) -> &UrgencyScorer {
        &self.scorer
    }

    pub fn allocator(&self) -> &Allocator {
        &self.allocator
    }

    /// Score, sort and allocate one batch of lots against a recipient list
    ///
    /// # Arguments
    /// * `lots` - Donation lots in any order
    /// * `recipients` - Recipients in preference order (earlier wins ties)
    /// * `today` - Reference date for urgency scoring
    #[instrument(skip(self, lots, recipients), fields(lots = lots.len(), recipients = recipients.len()))]
    pub fn run(
        &self,
        lots: Vec<DonationLot>,
        mut recipients: Vec<Recipient>,
        today: NaiveDate,
    ) -> Result<AllocationRun, ValidationError> {
        ensure_unique_ids(&lots, &recipients)?;

        let mut prioritized_lots = prioritize(lots, today, &self.scorer);
        let outcome = self
            .allocator
            .allocate(&mut prioritized_lots, &mut recipients, today);
        let report = DistributionReport::build(&prioritized_lots, &recipients, &outcome);

        if !report.conserved {
            warn!(
                donated = report.total_donated,
                processed = outcome.total_processed(),
                "Allocated and wasted quantities do not add up to the donated total"
            );
        }

        info!(
            donated = report.total_donated,
            distributed = outcome.total_distributed,
            wasted = outcome.total_wasted,
            efficiency_pct = report.distribution_efficiency_pct,
            "Allocation run complete"
        );

        let AllocationOutcome {
            ledger,
            total_distributed,
            total_wasted,
        } = outcome;

        Ok(AllocationRun {
            today,
            prioritized_lots,
            ledger,
            recipients,
            total_distributed,
            total_wasted,
            report,
        })
    }
}

fn ensure_unique_ids(lots: &[DonationLot], recipients: &[Recipient]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(lots.len());
    for lot in lots {
        if !seen.insert(lot.id.as_str()) {
            return Err(ValidationError::DuplicateLot(lot.id.clone()));
        }
    }

    let mut seen = HashSet::with_capacity(recipients.len());
    for recipient in recipients {
        if !seen.insert(recipient.id.as_str()) {
            return Err(ValidationError::DuplicateRecipient(recipient.id.clone()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_rejects_duplicate_lot_ids() {
        let lots = vec![
            DonationLot::new("D1", "Milk", 5, today()).unwrap(),
            DonationLot::new("D1", "Bread", 5, today()).unwrap(),
        ];
        let result = AllocationPipeline::default().run(lots, vec![], today());
        assert_eq!(result.unwrap_err(), ValidationError::DuplicateLot("D1".to_string()));
    }

    #[test]
    fn test_rejects_duplicate_recipient_ids() {
        let recipients = vec![
            Recipient::new("C1", "A", 10, [("Milk", 5)]).unwrap(),
            Recipient::new("C1", "B", 10, [("Milk", 5)]).unwrap(),
        ];
        let result = AllocationPipeline::default().run(vec![], recipients, today());
        assert!(matches!(result, Err(ValidationError::DuplicateRecipient(_))));
    }

    #[test]
    fn test_urgent_lot_allocated_first() {
        let lots = vec![
            DonationLot::new("LATE", "Yogurt", 40, today() + Duration::days(25)).unwrap(),
            DonationLot::new("SOON", "Yogurt", 40, today() + Duration::days(1)).unwrap(),
        ];
        let recipients = vec![Recipient::new("C1", "Shelter", 50, [("Yogurt", 100)]).unwrap()];

        let run = AllocationPipeline::default().run(lots, recipients, today()).unwrap();

        assert_eq!(run.prioritized_lots[0].id, "SOON");
        assert_eq!(run.ledger[0].donation_id, "SOON");
        assert_eq!(run.ledger[0].quantity, 40);
        assert_eq!(run.total_distributed, 50);
        assert_eq!(run.total_wasted, 30);
        assert!(run.report.conserved);
    }

    #[test]
    fn test_configured_horizon_applies() {
        let lots = vec![DonationLot::new("D1", "Milk", 5, today() + Duration::days(5)).unwrap()];
        let run = AllocationPipeline::new(10, ExpiredLotPolicy::Prioritize)
            .run(lots, vec![], today())
            .unwrap();
        assert_eq!(run.prioritized_lots[0].urgency_score, 50.0);
    }
}
