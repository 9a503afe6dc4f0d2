use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

use crate::models::domain::{DonationLot, Recipient, ValidationError};

/// Donation lot as submitted by a client
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LotInput {
    #[validate(length(min = 1))]
    pub id: String,
    #[validate(length(min = 1))]
    pub item: String,
    #[validate(range(min = 0))]
    pub quantity: i64,
    #[serde(alias = "expiry_date", rename = "expiryDate")]
    pub expiry_date: NaiveDate,
}

impl TryFrom<LotInput> for DonationLot {
    type Error = ValidationError;

    fn try_from(input: LotInput) -> Result<Self, Self::Error> {
        DonationLot::new(input.id, input.item, input.quantity, input.expiry_date)
    }
}

/// Recipient profile as submitted by a client
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecipientInput {
    #[validate(length(min = 1))]
    pub id: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 0))]
    #[serde(alias = "capacity_limit", rename = "capacityLimit")]
    pub capacity_limit: i64,
    #[validate(range(min = 0))]
    #[serde(alias = "current_stock_count", rename = "currentStockCount", default)]
    pub current_stock_count: i64,
    #[serde(default)]
    pub needs: BTreeMap<String, i64>,
}

impl TryFrom<RecipientInput> for Recipient {
    type Error = ValidationError;

    fn try_from(input: RecipientInput) -> Result<Self, Self::Error> {
        Recipient::new(input.id, input.name, input.capacity_limit, input.needs)?
            .with_stock(input.current_stock_count)
    }
}

/// Request to run one allocation batch
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RunAllocationRequest {
    /// Reference date for urgency scoring, defaults to the server's local date
    #[serde(default)]
    pub today: Option<NaiveDate>,
    #[validate(nested)]
    #[serde(default)]
    pub lots: Vec<LotInput>,
    #[validate(nested)]
    #[serde(default)]
    pub recipients: Vec<RecipientInput>,
}

impl RunAllocationRequest {
    /// Convert the payload into domain values, stopping at the first invalid entry
    pub fn into_domain(self) -> Result<(Vec<DonationLot>, Vec<Recipient>), ValidationError> {
        let lots = self
            .lots
            .into_iter()
            .map(DonationLot::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let recipients = self
            .recipients
            .into_iter()
            .map(Recipient::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((lots, recipients))
    }
}

/// Request to run a built-in scenario
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunScenarioRequest {
    #[serde(default)]
    pub today: Option<NaiveDate>,
    /// Seed for randomly generated scenarios; falls back to the configured seed
    #[serde(default)]
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_deserializes_camel_case() {
        let json = r#"{
            "today": "2024-06-01",
            "lots": [{"id": "D1", "item": "Milk", "quantity": 40, "expiryDate": "2024-06-03"}],
            "recipients": [{"id": "C1", "name": "Pantry", "capacityLimit": 100, "needs": {"Milk": 30}}]
        }"#;

        let req: RunAllocationRequest = serde_json::from_str(json).unwrap();
        assert!(req.validate().is_ok());

        let (lots, recipients) = req.into_domain().unwrap();
        assert_eq!(lots[0].quantity, 40);
        assert_eq!(recipients[0].remaining_need("Milk"), Some(30));
        assert_eq!(recipients[0].current_stock_count, 0);
    }

    #[test]
    fn test_negative_quantity_fails_validation() {
        let json = r#"{
            "lots": [{"id": "D1", "item": "Milk", "quantity": -4, "expiryDate": "2024-06-03"}],
            "recipients": []
        }"#;

        let req: RunAllocationRequest = serde_json::from_str(json).unwrap();
        assert!(req.validate().is_err());
        assert!(matches!(
            req.into_domain(),
            Err(ValidationError::NegativeQuantity { value: -4, .. })
        ));
    }

    #[test]
    fn test_negative_need_rejected_by_domain() {
        let json = r#"{
            "lots": [],
            "recipients": [{"id": "C1", "name": "Pantry", "capacityLimit": 10, "needs": {"Milk": -1}}]
        }"#;

        let req: RunAllocationRequest = serde_json::from_str(json).unwrap();
        // Map values are not covered by the derive; the domain constructor catches them
        assert!(req.validate().is_ok());
        assert!(matches!(req.into_domain(), Err(ValidationError::NegativeNeed { .. })));
    }
}
