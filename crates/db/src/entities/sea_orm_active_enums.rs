//! `SeaORM` active enums mapped to Postgres enum types.

use kassa_core::{accounts, assets, cash, debt, fiscal, ledger};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
pub enum AccountType {
    #[sea_orm(string_value = "asset")]
    Asset,
    #[sea_orm(string_value = "liability")]
    Liability,
    #[sea_orm(string_value = "equity")]
    Equity,
    #[sea_orm(string_value = "income")]
    Income,
    #[sea_orm(string_value = "expense")]
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "normal_side")]
pub enum NormalSide {
    #[sea_orm(string_value = "debit")]
    Debit,
    #[sea_orm(string_value = "credit")]
    Credit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_status")]
pub enum EntryStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "posted")]
    Posted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "period_type")]
pub enum PeriodType {
    #[sea_orm(string_value = "month")]
    Month,
    #[sea_orm(string_value = "quarter")]
    Quarter,
    #[sea_orm(string_value = "year")]
    Year,
    #[sea_orm(string_value = "custom")]
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "event_kind")]
pub enum EventKind {
    #[sea_orm(string_value = "deposit")]
    Deposit,
    #[sea_orm(string_value = "withdrawal")]
    Withdrawal,
    #[sea_orm(string_value = "expense")]
    Expense,
    #[sea_orm(string_value = "income")]
    Income,
    #[sea_orm(string_value = "debt_payment")]
    DebtPayment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "debt_direction")]
pub enum DebtDirection {
    #[sea_orm(string_value = "payable")]
    Payable,
    #[sea_orm(string_value = "receivable")]
    Receivable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "asset_type")]
pub enum AssetType {
    #[sea_orm(string_value = "building")]
    Building,
    #[sea_orm(string_value = "equipment")]
    Equipment,
    #[sea_orm(string_value = "vehicle")]
    Vehicle,
    #[sea_orm(string_value = "furniture")]
    Furniture,
    #[sea_orm(string_value = "electronics")]
    Electronics,
    #[sea_orm(string_value = "other")]
    Other,
}

/// Maps a database enum onto its domain twin, both directions.
macro_rules! bridge_enum {
    ($db:ident <=> $module:ident :: $domain:ident { $($variant:ident),+ $(,)? }) => {
        impl From<$db> for $module::$domain {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$module::$domain> for $db {
            fn from(value: $module::$domain) -> Self {
                match value {
                    $($module::$domain::$variant => Self::$variant,)+
                }
            }
        }
    };
}

bridge_enum!(AccountType <=> accounts::AccountType {
    Asset, Liability, Equity, Income, Expense
});
bridge_enum!(NormalSide <=> accounts::NormalSide { Debit, Credit });
bridge_enum!(EntryStatus <=> ledger::EntryStatus { Draft, Posted });
bridge_enum!(PeriodType <=> fiscal::PeriodType { Month, Quarter, Year, Custom });
bridge_enum!(EventKind <=> cash::EventKind {
    Deposit, Withdrawal, Expense, Income, DebtPayment
});
bridge_enum!(DebtDirection <=> debt::DebtDirection { Payable, Receivable });
bridge_enum!(AssetType <=> assets::AssetType {
    Building, Equipment, Vehicle, Furniture, Electronics, Other
});
