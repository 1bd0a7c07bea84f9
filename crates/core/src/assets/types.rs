//! Factory asset types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use kassa_shared::types::AssetId;
use kassa_shared::types::money::{is_cent_precise, is_storable};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::AssetError;

/// Kind of property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    /// Buildings and premises.
    Building,
    /// Production equipment.
    Equipment,
    /// Vehicles.
    Vehicle,
    /// Furniture.
    Furniture,
    /// Computers and other electronics.
    Electronics,
    /// Anything else.
    Other,
}

impl AssetType {
    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Building => "building",
            Self::Equipment => "equipment",
            Self::Vehicle => "vehicle",
            Self::Furniture => "furniture",
            Self::Electronics => "electronics",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "building" => Ok(Self::Building),
            "equipment" => Ok(Self::Equipment),
            "vehicle" => Ok(Self::Vehicle),
            "furniture" => Ok(Self::Furniture),
            "electronics" => Ok(Self::Electronics),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown asset type: {s}")),
        }
    }
}

/// A registered piece of factory property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactoryAsset {
    /// Unique identifier.
    pub id: AssetId,
    /// Display name.
    pub name: String,
    /// Kind of property.
    pub asset_type: AssetType,
    /// Optional description.
    pub description: Option<String>,
    /// What was paid for it.
    pub purchase_price: Decimal,
    /// What it is worth now.
    pub current_value: Decimal,
    /// Purchase date.
    pub purchase_date: NaiveDate,
    /// Where it is kept.
    pub location: Option<String>,
    /// Supplier name.
    pub supplier: Option<String>,
    /// Last day of warranty.
    pub warranty_expiry: Option<NaiveDate>,
    /// False once written off; inactive assets count toward no total.
    pub is_active: bool,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl FactoryAsset {
    /// Value lost since purchase; negative if the asset appreciated.
    #[must_use]
    pub fn depreciation(&self) -> Decimal {
        self.purchase_price - self.current_value
    }

    /// Returns true if the warranty still covers `today`.
    #[must_use]
    pub fn is_under_warranty(&self, today: NaiveDate) -> bool {
        self.warranty_expiry.is_some_and(|end| today <= end)
    }
}

/// Sums the current value of active assets.
#[must_use]
pub fn total_value(assets: &[FactoryAsset]) -> Decimal {
    assets
        .iter()
        .filter(|a| a.is_active)
        .map(|a| a.current_value)
        .sum()
}

/// Input for registering an asset.
#[derive(Debug, Clone)]
pub struct CreateAssetInput {
    /// Display name.
    pub name: String,
    /// Kind of property.
    pub asset_type: AssetType,
    /// Optional description.
    pub description: Option<String>,
    /// What was paid for it.
    pub purchase_price: Decimal,
    /// What it is worth now; usually the purchase price.
    pub current_value: Decimal,
    /// Purchase date.
    pub purchase_date: NaiveDate,
    /// Where it is kept.
    pub location: Option<String>,
    /// Supplier name.
    pub supplier: Option<String>,
    /// Last day of warranty.
    pub warranty_expiry: Option<NaiveDate>,
}

impl CreateAssetInput {
    /// Validates the input.
    ///
    /// # Errors
    ///
    /// Returns `EmptyField`, a value error, or `WarrantyBeforePurchase`.
    pub fn validate(&self) -> Result<(), AssetError> {
        if self.name.trim().is_empty() {
            return Err(AssetError::EmptyField("name"));
        }
        validate_value("purchase_price", self.purchase_price)?;
        validate_value("current_value", self.current_value)?;
        if let Some(warranty_expiry) = self.warranty_expiry
            && warranty_expiry < self.purchase_date
        {
            return Err(AssetError::WarrantyBeforePurchase {
                purchase_date: self.purchase_date,
                warranty_expiry,
            });
        }
        Ok(())
    }
}

/// Validates a non-negative, cent-precise, storable value.
///
/// # Errors
///
/// Returns `NegativeValue`, `SubCentAmount` or `AmountTooLarge`.
pub fn validate_value(field: &'static str, amount: Decimal) -> Result<(), AssetError> {
    if amount < Decimal::ZERO {
        return Err(AssetError::NegativeValue { field, amount });
    }
    if !is_cent_precise(amount) {
        return Err(AssetError::SubCentAmount { field, amount });
    }
    if !is_storable(amount) {
        return Err(AssetError::AmountTooLarge { field, amount });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn input() -> CreateAssetInput {
        CreateAssetInput {
            name: "Glass cutting table".to_string(),
            asset_type: AssetType::Equipment,
            description: None,
            purchase_price: dec!(250000.00),
            current_value: dec!(250000.00),
            purchase_date: date(2025, 6, 1),
            location: Some("Workshop 1".to_string()),
            supplier: None,
            warranty_expiry: Some(date(2027, 6, 1)),
        }
    }

    fn asset(current_value: Decimal, is_active: bool) -> FactoryAsset {
        FactoryAsset {
            id: AssetId::new(),
            name: "Forklift".to_string(),
            asset_type: AssetType::Vehicle,
            description: None,
            purchase_price: dec!(900000.00),
            current_value,
            purchase_date: date(2024, 1, 10),
            location: None,
            supplier: None,
            warranty_expiry: Some(date(2026, 1, 10)),
            is_active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_valid_input() {
        assert!(input().validate().is_ok());
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut bad = input();
        bad.name = "  ".to_string();
        assert!(matches!(bad.validate(), Err(AssetError::EmptyField("name"))));
    }

    #[rstest]
    #[case(dec!(-1.00))]
    #[case(dec!(0.001))]
    #[case(dec!(100000000000000000))]
    fn test_bad_values_rejected(#[case] value: Decimal) {
        let mut bad = input();
        bad.current_value = value;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_fully_depreciated_value_allowed() {
        let mut written_down = input();
        written_down.current_value = Decimal::ZERO;
        assert!(written_down.validate().is_ok());
    }

    #[test]
    fn test_warranty_before_purchase_rejected() {
        let mut bad = input();
        bad.warranty_expiry = Some(date(2025, 5, 31));
        assert!(matches!(
            bad.validate(),
            Err(AssetError::WarrantyBeforePurchase { .. })
        ));
    }

    #[test]
    fn test_total_value_skips_inactive() {
        let assets = [
            asset(dec!(700000.00), true),
            asset(dec!(120000.50), true),
            asset(dec!(50000.00), false),
        ];
        assert_eq!(total_value(&assets), dec!(820000.50));
        assert_eq!(total_value(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_depreciation_and_warranty() {
        let forklift = asset(dec!(700000.00), true);
        assert_eq!(forklift.depreciation(), dec!(200000.00));
        assert!(forklift.is_under_warranty(date(2026, 1, 10)));
        assert!(!forklift.is_under_warranty(date(2026, 1, 11)));
    }

    #[test]
    fn test_asset_type_round_trips_through_str() {
        for kind in [
            AssetType::Building,
            AssetType::Equipment,
            AssetType::Vehicle,
            AssetType::Furniture,
            AssetType::Electronics,
            AssetType::Other,
        ] {
            assert_eq!(kind.as_str().parse::<AssetType>().unwrap(), kind);
        }
        assert!("land".parse::<AssetType>().is_err());
    }
}
