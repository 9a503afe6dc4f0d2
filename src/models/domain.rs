use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Recipient id used on ledger rows that record unmatched quantity
pub const WASTE_RECIPIENT_ID: &str = "WASTE";

/// Recipient name used on ledger rows that record unmatched quantity
pub const WASTE_RECIPIENT_NAME: &str = "WASTE/NO MATCH";

/// Invalid input rejected before an allocation run starts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("lot {lot_id}: quantity must be non-negative, got {value}")]
    NegativeQuantity { lot_id: String, value: i64 },

    #[error("recipient {recipient_id}: capacity limit must be non-negative, got {value}")]
    NegativeCapacity { recipient_id: String, value: i64 },

    #[error("recipient {recipient_id}: need for {item} must be non-negative, got {value}")]
    NegativeNeed { recipient_id: String, item: String, value: i64 },

    #[error("recipient {recipient_id}: stock count must be non-negative, got {value}")]
    NegativeStock { recipient_id: String, value: i64 },

    #[error("recipient {recipient_id}: stock count {stock} exceeds capacity limit {capacity}")]
    StockExceedsCapacity { recipient_id: String, stock: u32, capacity: u32 },

    #[error("{field} {value} is out of range")]
    OutOfRange { field: &'static str, value: i64 },

    #[error("duplicate lot id: {0}")]
    DuplicateLot(String),

    #[error("duplicate recipient id: {0}")]
    DuplicateRecipient(String),
}

fn non_negative_u32(
    value: i64,
    field: &'static str,
    err: impl FnOnce() -> ValidationError,
) -> Result<u32, ValidationError> {
    if value < 0 {
        return Err(err());
    }
    u32::try_from(value).map_err(|_| ValidationError::OutOfRange { field, value })
}

fn non_empty(value: String, field: &'static str) -> Result<String, ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(value)
}

/// One donation entry: an item, how much of it, and when it expires
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationLot {
    pub id: String,
    pub item: String,
    pub quantity: u32,
    #[serde(rename = "expiryDate")]
    pub expiry_date: NaiveDate,
    #[serde(rename = "urgencyScore", default)]
    pub urgency_score: f64,
    #[serde(rename = "isAllocated", default)]
    pub is_allocated: bool,
}

impl DonationLot {
    /// Build a lot, rejecting negative quantities and blank identifiers.
    ///
    /// A zero quantity is accepted; such a lot never produces a ledger row.
    pub fn new(
        id: impl Into<String>,
        item: impl Into<String>,
        quantity: i64,
        expiry_date: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let id = non_empty(id.into(), "lot id")?;
        let item = non_empty(item.into(), "lot item")?;
        let quantity = non_negative_u32(quantity, "quantity", || ValidationError::NegativeQuantity {
            lot_id: id.clone(),
            value: quantity,
        })?;

        Ok(Self {
            id,
            item,
            quantity,
            expiry_date,
            urgency_score: 0.0,
            is_allocated: false,
        })
    }

    /// Whole days until expiry; negative once the lot has expired
    pub fn days_until_expiry(&self, today: NaiveDate) -> i64 {
        (self.expiry_date - today).num_days()
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.days_until_expiry(today) < 0
    }
}

/// Entry in a recipient's allocation history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceivedAllocation {
    #[serde(rename = "donationId")]
    pub donation_id: String,
    pub item: String,
    pub quantity: u32,
    #[serde(rename = "urgencyScore")]
    pub urgency_score: f64,
}

/// A charity with per-item need ceilings and an overall capacity ceiling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    pub id: String,
    pub name: String,
    #[serde(rename = "capacityLimit")]
    pub capacity_limit: u32,
    #[serde(rename = "currentStockCount")]
    pub current_stock_count: u32,
    pub needs: BTreeMap<String, u32>,
    #[serde(rename = "allocationHistory", default)]
    pub allocation_history: Vec<ReceivedAllocation>,
}

impl Recipient {
    /// Build a recipient with an empty stock.
    pub fn new<I, K>(
        id: impl Into<String>,
        name: impl Into<String>,
        capacity_limit: i64,
        needs: I,
    ) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, i64)>,
        K: Into<String>,
    {
        let id = non_empty(id.into(), "recipient id")?;
        let name = non_empty(name.into(), "recipient name")?;
        let capacity = non_negative_u32(capacity_limit, "capacity limit", || ValidationError::NegativeCapacity {
            recipient_id: id.clone(),
            value: capacity_limit,
        })?;

        let mut parsed = BTreeMap::new();
        for (item, value) in needs {
            let item = non_empty(item.into(), "need item")?;
            let qty = non_negative_u32(value, "need", || ValidationError::NegativeNeed {
                recipient_id: id.clone(),
                item: item.clone(),
                value,
            })?;
            parsed.insert(item, qty);
        }

        Ok(Self {
            id,
            name,
            capacity_limit: capacity,
            current_stock_count: 0,
            needs: parsed,
            allocation_history: Vec::new(),
        })
    }

    /// Set the stock already held before the run
    pub fn with_stock(mut self, current_stock_count: i64) -> Result<Self, ValidationError> {
        let stock = non_negative_u32(current_stock_count, "stock count", || ValidationError::NegativeStock {
            recipient_id: self.id.clone(),
            value: current_stock_count,
        })?;
        if stock > self.capacity_limit {
            return Err(ValidationError::StockExceedsCapacity {
                recipient_id: self.id.clone(),
                stock,
                capacity: self.capacity_limit,
            });
        }
        self.current_stock_count = stock;
        Ok(self)
    }

    #[inline]
    pub fn remaining_capacity(&self) -> u32 {
        self.capacity_limit.saturating_sub(self.current_stock_count)
    }

    /// Remaining need for an item, `None` when the item is not accepted at all
    #[inline]
    pub fn remaining_need(&self, item: &str) -> Option<u32> {
        self.needs.get(item).copied()
    }

    /// Total quantity received during the run
    pub fn items_received(&self) -> u64 {
        self.allocation_history.iter().map(|a| a.quantity as u64).sum()
    }
}

/// Why a ledger row went to waste
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WasteReason {
    /// No eligible recipient had need and capacity left
    NoMatch,
    /// Lot expired before the run and expired lots are excluded
    Expired,
}

/// One quantity movement in the allocation ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRecord {
    #[serde(rename = "donationId")]
    pub donation_id: String,
    pub item: String,
    pub quantity: u32,
    #[serde(rename = "recipientId")]
    pub recipient_id: String,
    #[serde(rename = "recipientName")]
    pub recipient_name: String,
    #[serde(rename = "wasteReason", default, skip_serializing_if = "Option::is_none")]
    pub waste_reason: Option<WasteReason>,
}

impl AllocationRecord {
    pub fn delivery(lot: &DonationLot, recipient: &Recipient, quantity: u32) -> Self {
        Self {
            donation_id: lot.id.clone(),
            item: lot.item.clone(),
            quantity,
            recipient_id: recipient.id.clone(),
            recipient_name: recipient.name.clone(),
            waste_reason: None,
        }
    }

    pub fn waste(lot: &DonationLot, quantity: u32, reason: WasteReason) -> Self {
        Self {
            donation_id: lot.id.clone(),
            item: lot.item.clone(),
            quantity,
            recipient_id: WASTE_RECIPIENT_ID.to_string(),
            recipient_name: WASTE_RECIPIENT_NAME.to_string(),
            waste_reason: Some(reason),
        }
    }

    #[inline]
    pub fn is_waste(&self) -> bool {
        self.recipient_id == WASTE_RECIPIENT_ID
    }
}
