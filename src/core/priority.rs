use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::core::urgency::UrgencyScorer;
use crate::models::DonationLot;

/// Priority order: higher urgency first, equal scores broken by ascending lot id
#[inline]
pub fn compare_priority(a: &DonationLot, b: &DonationLot) -> Ordering {
    b.urgency_score
        .total_cmp(&a.urgency_score)
        .then_with(|| a.id.cmp(&b.id))
}

/// Score every lot against `today` and order them for allocation
///
/// The resulting order does not depend on the input order, so the same batch
/// always allocates the same way.
pub fn prioritize(
    lots: Vec<DonationLot>,
    today: NaiveDate,
    scorer: &UrgencyScorer,
) -> Vec<DonationLot> {
    let mut scored: Vec<DonationLot> = lots
        .into_iter()
        .map(|mut lot| {
            lot.urgency_score = scorer.score(lot.expiry_date, today);
            lot
        })
        .collect();

    scored.sort_by(compare_priority);
    scored
}
