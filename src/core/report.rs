use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write;

use crate::core::allocator::AllocationOutcome;
use crate::core::pipeline::AllocationRun;
use crate::core::urgency::round2;
use crate::models::{DonationLot, Recipient};

/// Number of history entries listed per recipient in the report
const TOP_ITEMS: usize = 3;

/// Number of ledger rows shown by [`render_summary`]
const LEDGER_PREVIEW: usize = 5;

/// Share of `part` in `whole` as a percentage, 0.0 when `whole` is zero
#[inline]
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round2(part as f64 / whole as f64 * 100.0)
}

/// Item and quantity pair listed in a recipient summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemQuantity {
    pub item: String,
    pub quantity: u32,
}

/// Per-recipient distribution statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientStats {
    pub recipient_id: String,
    pub name: String,
    pub items_received: u64,
    pub current_stock_count: u32,
    pub capacity_limit: u32,
    pub capacity_utilization_pct: f64,
    pub top_items: Vec<ItemQuantity>,
}

impl RecipientStats {
    pub fn from_recipient(recipient: &Recipient) -> Self {
        Self {
            recipient_id: recipient.id.clone(),
            name: recipient.name.clone(),
            items_received: recipient.items_received(),
            current_stock_count: recipient.current_stock_count,
            capacity_limit: recipient.capacity_limit,
            capacity_utilization_pct: percentage(
                recipient.current_stock_count as u64,
                recipient.capacity_limit as u64,
            ),
            top_items: recipient
                .allocation_history
                .iter()
                .take(TOP_ITEMS)
                .map(|a| ItemQuantity {
                    item: a.item.clone(),
                    quantity: a.quantity,
                })
                .collect(),
        }
    }
}

/// Impact metrics for one allocation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionReport {
    pub total_donated: u64,
    pub total_distributed: u64,
    pub total_wasted: u64,
    /// Distributed share of everything donated
    pub distribution_efficiency_pct: f64,
    /// Whether distributed + wasted accounts for every donated unit
    pub conserved: bool,
    pub recipients: Vec<RecipientStats>,
    pub waste_by_item: BTreeMap<String, u64>,
}

impl DistributionReport {
    pub fn build(
        lots: &[DonationLot],
        recipients: &[Recipient],
        outcome: &AllocationOutcome,
    ) -> Self {
        let total_donated: u64 = lots.iter().map(|l| l.quantity as u64).sum();

        let mut waste_by_item = BTreeMap::new();
        for record in outcome.ledger.iter().filter(|r| r.is_waste()) {
            *waste_by_item.entry(record.item.clone()).or_insert(0u64) += record.quantity as u64;
        }

        Self {
            total_donated,
            total_distributed: outcome.total_distributed,
            total_wasted: outcome.total_wasted,
            distribution_efficiency_pct: percentage(outcome.total_distributed, total_donated),
            conserved: outcome.total_processed() == total_donated,
            recipients: recipients.iter().map(RecipientStats::from_recipient).collect(),
            waste_by_item,
        }
    }
}

/// Render a run as a console report
pub fn render_summary(run: &AllocationRun) -> String {
    let report = &run.report;
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "--- TOP PRIORITIZED LOTS ---");
    for lot in run.prioritized_lots.iter().take(3) {
        let _ = writeln!(
            out,
            "  - {} {} (x{}) | Score: {:.2}",
            lot.id, lot.item, lot.quantity, lot.urgency_score
        );
    }

    let _ = writeln!(out, "\n--- IMPACT METRICS ---");
    let _ = writeln!(out, "Total Donations Received: {} units", report.total_donated);
    let _ = writeln!(out, "Total Food Distributed:   {} units", report.total_distributed);
    let _ = writeln!(out, "Total Unmatched Waste:    {} units", report.total_wasted);
    let _ = writeln!(
        out,
        "Distribution Efficiency:  {:.2}%",
        report.distribution_efficiency_pct
    );

    let _ = writeln!(out, "\n--- PER-RECIPIENT DISTRIBUTION ---");
    for stats in &report.recipients {
        let items = stats
            .top_items
            .iter()
            .map(|i| format!("{} ({})", i.item, i.quantity))
            .collect::<Vec<_>>()
            .join(", ");

        let _ = writeln!(out, "[{}]: {}", stats.recipient_id, stats.name);
        let _ = writeln!(out, "  > Items Received: {} units", stats.items_received);
        let _ = writeln!(
            out,
            "  > Capacity Utilized: {} / {} ({:.2}%)",
            stats.current_stock_count, stats.capacity_limit, stats.capacity_utilization_pct
        );
        if items.is_empty() {
            let _ = writeln!(out, "  > Items Distributed: none");
        } else {
            let _ = writeln!(out, "  > Items Distributed: {}", items);
        }
    }

    if !report.waste_by_item.is_empty() {
        let _ = writeln!(out, "\n--- WASTE BY ITEM ---");
        for (item, quantity) in &report.waste_by_item {
            let _ = writeln!(out, "  {}: {} units", item, quantity);
        }
    }

    let _ = writeln!(out, "\n--- ALLOCATION LOG (FIRST {}) ---", LEDGER_PREVIEW);
    for (i, record) in run.ledger.iter().take(LEDGER_PREVIEW).enumerate() {
        let _ = writeln!(
            out,
            "  {}. Donation {} ({} x {}) -> {}",
            i + 1,
            record.donation_id,
            record.item,
            record.quantity,
            record.recipient_name
        );
    }
    if run.ledger.len() > LEDGER_PREVIEW {
        let _ = writeln!(out, "  ... and {} more records.", run.ledger.len() - LEDGER_PREVIEW);
    }

    let verdict = if report.conserved { "PASSED" } else { "FAILED" };
    let _ = writeln!(
        out,
        "\nConservation check: {} (distributed + wasted = {} of {})",
        verdict,
        report.total_distributed + report.total_wasted,
        report.total_donated
    );

    out
}
