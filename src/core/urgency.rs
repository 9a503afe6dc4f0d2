use chrono::NaiveDate;

/// Expiry window beyond which a lot is not considered urgent at all
pub const DEFAULT_HORIZON_DAYS: u32 = 30;

/// Score given to lots expiring today (or already expired)
pub const MAX_URGENCY: f64 = 100.0;

/// Round to two decimal places
#[inline]
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Calculate the urgency score (0-100) for a number of days left before expiry
///
/// Scoring formula:
/// - `days_left <= 0`       -> 100 (expiring today or already expired)
/// - `days_left > horizon`  -> 0
/// - otherwise              -> 100 * (1 - days_left / horizon), rounded to 2 dp
#[inline]
pub fn score_for_days_left(days_left: i64, horizon_days: u32) -> f64 {
    let days_left = days_left.max(0);

    if days_left == 0 {
        return MAX_URGENCY;
    }
    // Also covers a zero horizon, so the division below never sees 0
    if days_left > horizon_days as i64 {
        return 0.0;
    }

    let fraction = days_left as f64 / horizon_days as f64;
    round2(MAX_URGENCY * (1.0 - fraction))
}

/// Calculate the urgency score of a lot expiring on `expiry` as seen from `today`
#[inline]
pub fn urgency_score(expiry: NaiveDate, today: NaiveDate, horizon_days: u32) -> f64 {
    score_for_days_left((expiry - today).num_days(), horizon_days)
}

/// Urgency scorer bound to a configured horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrgencyScorer {
    horizon_days: u32,
}

impl UrgencyScorer {
    pub fn new(horizon_days: u32) -> Self {
        Self { horizon_days }
    }

    pub fn horizon_days(&self) -> u32 {
        self.horizon_days
    }

    pub fn score(&self, expiry: NaiveDate, today: NaiveDate) -> f64 {
        urgency_score(expiry, today, self.horizon_days)
    }
}

impl Default for UrgencyScorer {
    fn default() -> Self {
        Self::new(DEFAULT_HORIZON_DAYS)
    }
}
