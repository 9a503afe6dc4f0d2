use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::models::{AllocationRecord, DonationLot, ReceivedAllocation, Recipient, WasteReason};

/// What to do with lots whose expiry date is already in the past
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiredLotPolicy {
    /// Score them as maximally urgent and allocate them first
    #[default]
    Prioritize,
    /// Keep them in the ledger but send the whole quantity to waste
    Exclude,
}

/// Ledger and totals produced by one allocation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AllocationOutcome {
    pub ledger: Vec<AllocationRecord>,
    pub total_distributed: u64,
    pub total_wasted: u64,
}

impl AllocationOutcome {
    /// Everything the pass accounted for, distributed or wasted
    pub fn total_processed(&self) -> u64 {
        self.total_distributed + self.total_wasted
    }
}

/// How much of `available` units of `item` a recipient can take right now
///
/// Zero unless the recipient accepts the item, still needs some and has
/// capacity left; otherwise the smallest of lot remainder, item need and
/// free capacity.
#[inline]
pub fn allocatable_amount(recipient: &Recipient, item: &str, available: u32) -> u32 {
    let need = match recipient.remaining_need(item) {
        Some(need) if need > 0 => need,
        _ => return 0,
    };

    let capacity = recipient.remaining_capacity();
    if capacity == 0 {
        return 0;
    }

    available.min(need).min(capacity)
}

/// Greedy first-fit allocation engine
///
/// Lots are handled in the order given (callers pass them highest urgency
/// first), so urgent lots get first claim on scarce capacity. Recipients are
/// scanned in list order for every lot: when several recipients want the same
/// item, the one listed earlier is served first.
#[derive(Debug, Clone, Copy, Default)]
pub struct Allocator {
    expired_policy: ExpiredLotPolicy,
}

impl Allocator {
    pub fn new(expired_policy: ExpiredLotPolicy) -> Self {
        Self { expired_policy }
    }

    pub fn expired_policy(&self) -> ExpiredLotPolicy {
        self.expired_policy
    }

    /// Allocate every lot in order, mutating recipients in place
    ///
    /// Each lot ends up marked as allocated and the ledger holds, per lot,
    /// rows whose quantities add up to the lot's quantity.
    #[instrument(skip_all, fields(lots = lots.len(), recipients = recipients.len()))]
    pub fn allocate(
        &self,
        lots: &mut [DonationLot],
        recipients: &mut [Recipient],
        today: NaiveDate,
    ) -> AllocationOutcome {
        let mut outcome = AllocationOutcome::default();

        for lot in lots.iter_mut() {
            self.allocate_lot(lot, recipients, today, &mut outcome);
        }

        debug!(
            distributed = outcome.total_distributed,
            wasted = outcome.total_wasted,
            records = outcome.ledger.len(),
            "Allocation pass finished"
        );

        outcome
    }

    fn allocate_lot(
        &self,
        lot: &mut DonationLot,
        recipients: &mut [Recipient],
        today: NaiveDate,
        outcome: &mut AllocationOutcome,
    ) {
        let mut remaining = lot.quantity;
        let excluded =
            self.expired_policy == ExpiredLotPolicy::Exclude && lot.is_expired(today);

        if !excluded {
            for recipient in recipients.iter_mut() {
                if remaining == 0 {
                    break;
                }

                let amount = allocatable_amount(recipient, &lot.item, remaining);
                if amount == 0 {
                    continue;
                }

                if let Some(need) = recipient.needs.get_mut(&lot.item) {
                    *need -= amount;
                }
                recipient.current_stock_count += amount;
                recipient.allocation_history.push(ReceivedAllocation {
                    donation_id: lot.id.clone(),
                    item: lot.item.clone(),
                    quantity: amount,
                    urgency_score: lot.urgency_score,
                });

                outcome.ledger.push(AllocationRecord::delivery(lot, recipient, amount));
                outcome.total_distributed += amount as u64;
                remaining -= amount;

                debug!(
                    lot = %lot.id,
                    item = %lot.item,
                    recipient = %recipient.id,
                    amount,
                    "Allocated"
                );
            }
        }

        if remaining > 0 {
            let reason = if excluded {
                WasteReason::Expired
            } else {
                WasteReason::NoMatch
            };
            outcome.ledger.push(AllocationRecord::waste(lot, remaining, reason));
            outcome.total_wasted += remaining as u64;

            debug!(lot = %lot.id, item = %lot.item, remaining, ?reason, "Unmatched quantity wasted");
        }

        lot.is_allocated = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn lot(id: &str, item: &str, quantity: i64, score: f64) -> DonationLot {
        let mut lot = DonationLot::new(id, item, quantity, today() + Duration::days(2)).unwrap();
        lot.urgency_score = score;
        lot
    }

    fn recipient(id: &str, capacity: i64, needs: &[(&str, i64)]) -> Recipient {
        Recipient::new(id, format!("Charity {}", id), capacity, needs.iter().copied()).unwrap()
    }

    #[test]
    fn test_three_way_minimum() {
        let r = recipient("C1", 30, &[("Milk", 50)]);
        assert_eq!(allocatable_amount(&r, "Milk", 100), 30);
        assert_eq!(allocatable_amount(&r, "Milk", 10), 10);

        let r = recipient("C1", 300, &[("Milk", 50)]);
        assert_eq!(allocatable_amount(&r, "Milk", 100), 50);
    }

    #[test]
    fn test_ineligible_recipients_get_nothing() {
        let r = recipient("C1", 100, &[("Milk", 0)]);
        assert_eq!(allocatable_amount(&r, "Milk", 10), 0);
        assert_eq!(allocatable_amount(&r, "Bread", 10), 0);

        let full = recipient("C2", 10, &[("Milk", 10)]).with_stock(10).unwrap();
        assert_eq!(allocatable_amount(&full, "Milk", 10), 0);
    }

    #[test]
    fn test_split_across_recipients_in_list_order() {
        let mut lots = vec![lot("D1", "Milk", 70, 90.0)];
        let mut recipients = vec![
            recipient("C1", 100, &[("Milk", 50)]),
            recipient("C2", 100, &[("Milk", 40)]),
        ];

        let outcome = Allocator::default().allocate(&mut lots, &mut recipients, today());

        assert_eq!(outcome.ledger.len(), 2);
        assert_eq!(outcome.ledger[0].recipient_id, "C1");
        assert_eq!(outcome.ledger[0].quantity, 50);
        assert_eq!(outcome.ledger[1].recipient_id, "C2");
        assert_eq!(outcome.ledger[1].quantity, 20);
        assert_eq!(outcome.total_distributed, 70);
        assert_eq!(outcome.total_wasted, 0);
        assert_eq!(recipients[1].remaining_need("Milk"), Some(20));
        assert!(lots[0].is_allocated);
    }

    #[test]
    fn test_stops_once_lot_exhausted() {
        let mut lots = vec![lot("D1", "Milk", 30, 90.0)];
        let mut recipients = vec![
            recipient("C1", 100, &[("Milk", 50)]),
            recipient("C2", 100, &[("Milk", 40)]),
        ];

        let outcome = Allocator::default().allocate(&mut lots, &mut recipients, today());

        assert_eq!(outcome.ledger.len(), 1);
        assert!(recipients[1].allocation_history.is_empty());
    }

    #[test]
    fn test_leftover_becomes_waste() {
        let mut lots = vec![lot("D1", "Milk", 100, 50.0)];
        let mut recipients = vec![recipient("C1", 100, &[("Milk", 60)])];

        let outcome = Allocator::default().allocate(&mut lots, &mut recipients, today());

        let waste = outcome.ledger.last().unwrap();
        assert!(waste.is_waste());
        assert_eq!(waste.quantity, 40);
        assert_eq!(waste.waste_reason, Some(WasteReason::NoMatch));
        assert_eq!(outcome.total_wasted, 40);
    }

    #[test]
    fn test_history_carries_urgency_score() {
        let mut lots = vec![lot("D1", "Bread", 10, 73.33)];
        let mut recipients = vec![recipient("C1", 100, &[("Bread", 60)])];

        Allocator::default().allocate(&mut lots, &mut recipients, today());

        let entry = &recipients[0].allocation_history[0];
        assert_eq!(entry.donation_id, "D1");
        assert_eq!(entry.urgency_score, 73.33);
        assert_eq!(recipients[0].current_stock_count, 10);
    }

    #[test]
    fn test_zero_quantity_lot_is_inert() {
        let mut lots = vec![lot("D1", "Milk", 0, 50.0)];
        let mut recipients = vec![recipient("C1", 100, &[("Milk", 60)])];

        let outcome = Allocator::default().allocate(&mut lots, &mut recipients, today());

        assert!(outcome.ledger.is_empty());
        assert_eq!(outcome.total_processed(), 0);
        assert!(lots[0].is_allocated);
    }

    #[test]
    fn test_exclude_policy_wastes_expired_lots() {
        let mut expired = DonationLot::new("D1", "Milk", 25, today() - Duration::days(1)).unwrap();
        expired.urgency_score = 100.0;
        let mut lots = vec![expired, lot("D2", "Milk", 10, 90.0)];
        let mut recipients = vec![recipient("C1", 100, &[("Milk", 60)])];

        let outcome = Allocator::new(ExpiredLotPolicy::Exclude)
            .allocate(&mut lots, &mut recipients, today());

        assert_eq!(outcome.ledger[0].waste_reason, Some(WasteReason::Expired));
        assert_eq!(outcome.ledger[0].quantity, 25);
        assert_eq!(outcome.total_distributed, 10);
        assert_eq!(outcome.total_wasted, 25);
        assert_eq!(recipients[0].remaining_need("Milk"), Some(50));
    }

    #[test]
    fn test_prioritize_policy_allocates_expired_lots() {
        let mut expired = DonationLot::new("D1", "Milk", 25, today() - Duration::days(1)).unwrap();
        expired.urgency_score = 100.0;
        let mut lots = vec![expired];
        let mut recipients = vec![recipient("C1", 100, &[("Milk", 60)])];

        let outcome = Allocator::default().allocate(&mut lots, &mut recipients, today());

        assert_eq!(outcome.total_distributed, 25);
        assert_eq!(outcome.total_wasted, 0);
    }
}
