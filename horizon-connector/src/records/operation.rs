use std::collections::HashMap;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use super::{Asset, DecodeError, Price, RecordFamily, StreamRecord};

/// Fields common to every operation record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationBase {
    pub id: String,
    pub paging_token: String,
    pub source_account: String,
    #[serde(rename = "type")]
    pub operation_type: String,
    pub type_i: i32,
    pub created_at: DateTime<Utc>,
    pub transaction_hash: String,
    pub order: i32,
}

/// Discriminator codes of the operation family. Unlike effects, the wire
/// discriminator here is the integer `type_i`, not the type name.
/// [`OperationKind::TABLE`] is the single source of truth for the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    CreateAccount,
    Payment,
    PathPayment,
    ManageOffer,
    CreatePassiveOffer,
    SetOptions,
    ChangeTrust,
    AllowTrust,
    AccountMerge,
    Inflation,
    ManageData,
}

impl OperationKind {
    /// Every discriminator code the decoder recognizes.
    pub const TABLE: [(i32, OperationKind); 11] = [
        (0, OperationKind::CreateAccount),
        (1, OperationKind::Payment),
        (2, OperationKind::PathPayment),
        (3, OperationKind::ManageOffer),
        (4, OperationKind::CreatePassiveOffer),
        (5, OperationKind::SetOptions),
        (6, OperationKind::ChangeTrust),
        (7, OperationKind::AllowTrust),
        (8, OperationKind::AccountMerge),
        (9, OperationKind::Inflation),
        (10, OperationKind::ManageData),
    ];

    /// Looks up the kind for a discriminator code.
    pub fn from_discriminator(code: i32) -> Option<Self> {
        OPERATION_KINDS.get(&code).copied()
    }
}

lazy_static! {
    static ref OPERATION_KINDS: HashMap<i32, OperationKind> =
        OperationKind::TABLE.iter().copied().collect();
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateAccount {
    #[serde(flatten)]
    pub base: OperationBase,
    pub starting_balance: String,
    pub funder: String,
    pub account: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Payment {
    #[serde(flatten)]
    pub base: OperationBase,
    #[serde(flatten)]
    pub asset: Asset,
    pub from: String,
    pub to: String,
    pub amount: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathPayment {
    #[serde(flatten)]
    pub payment: Payment,
    pub path: Vec<Asset>,
    pub source_max: String,
    pub source_asset_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_asset_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_asset_issuer: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatePassiveOffer {
    #[serde(flatten)]
    pub base: OperationBase,
    pub amount: String,
    pub price: String,
    pub price_r: Price,
    pub buying_asset_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buying_asset_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buying_asset_issuer: Option<String>,
    pub selling_asset_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selling_asset_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selling_asset_issuer: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManageOffer {
    #[serde(flatten)]
    pub offer: CreatePassiveOffer,
    pub offer_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetOptions {
    #[serde(flatten)]
    pub base: OperationBase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inflation_dest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_key_weight: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signer_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signer_weight: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_flags: Option<Vec<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_flags_s: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clear_flags: Option<Vec<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clear_flags_s: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_threshold: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub med_threshold: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_threshold: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeTrust {
    #[serde(flatten)]
    pub base: OperationBase,
    #[serde(flatten)]
    pub asset: Asset,
    pub limit: String,
    pub trustee: String,
    pub trustor: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllowTrust {
    #[serde(flatten)]
    pub base: OperationBase,
    #[serde(flatten)]
    pub asset: Asset,
    pub trustee: String,
    pub trustor: String,
    pub authorize: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountMerge {
    #[serde(flatten)]
    pub base: OperationBase,
    pub account: String,
    pub into: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Inflation {
    #[serde(flatten)]
    pub base: OperationBase,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManageData {
    #[serde(flatten)]
    pub base: OperationBase,
    pub name: String,
    pub value: String,
}

/// A decoded operation record: one variant per discriminator code, plus an
/// `Unknown` fallback holding the base fields of records this build does not
/// recognize.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    CreateAccount(CreateAccount),
    Payment(Payment),
    PathPayment(PathPayment),
    ManageOffer(ManageOffer),
    CreatePassiveOffer(CreatePassiveOffer),
    SetOptions(SetOptions),
    ChangeTrust(ChangeTrust),
    AllowTrust(AllowTrust),
    AccountMerge(AccountMerge),
    Inflation(Inflation),
    ManageData(ManageData),
    Unknown(OperationBase),
}

impl Operation {
    /// The fields shared by every operation variant.
    pub fn base(&self) -> &OperationBase {
        match self {
            Operation::CreateAccount(o) => &o.base,
            Operation::Payment(o) => &o.base,
            Operation::PathPayment(o) => &o.payment.base,
            Operation::ManageOffer(o) => &o.offer.base,
            Operation::CreatePassiveOffer(o) => &o.base,
            Operation::SetOptions(o) => &o.base,
            Operation::ChangeTrust(o) => &o.base,
            Operation::AllowTrust(o) => &o.base,
            Operation::AccountMerge(o) => &o.base,
            Operation::Inflation(o) => &o.base,
            Operation::ManageData(o) => &o.base,
            Operation::Unknown(base) => base,
        }
    }

    /// The kind this record decoded as, `None` for `Unknown`.
    pub fn kind(&self) -> Option<OperationKind> {
        match self {
            Operation::CreateAccount(_) => Some(OperationKind::CreateAccount),
            Operation::Payment(_) => Some(OperationKind::Payment),
            Operation::PathPayment(_) => Some(OperationKind::PathPayment),
            Operation::ManageOffer(_) => Some(OperationKind::ManageOffer),
            Operation::CreatePassiveOffer(_) => Some(OperationKind::CreatePassiveOffer),
            Operation::SetOptions(_) => Some(OperationKind::SetOptions),
            Operation::ChangeTrust(_) => Some(OperationKind::ChangeTrust),
            Operation::AllowTrust(_) => Some(OperationKind::AllowTrust),
            Operation::AccountMerge(_) => Some(OperationKind::AccountMerge),
            Operation::Inflation(_) => Some(OperationKind::Inflation),
            Operation::ManageData(_) => Some(OperationKind::ManageData),
            Operation::Unknown(_) => None,
        }
    }
}

impl StreamRecord for Operation {
    const FAMILY: RecordFamily = RecordFamily::Operations;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        #[derive(Deserialize)]
        struct Probe {
            type_i: i32,
        }

        let probe: Probe = serde_json::from_slice(payload)?;
        let operation = match OperationKind::from_discriminator(probe.type_i) {
            None => Operation::Unknown(serde_json::from_slice(payload)?),
            Some(OperationKind::CreateAccount) => {
                Operation::CreateAccount(serde_json::from_slice(payload)?)
            }
            Some(OperationKind::Payment) => Operation::Payment(serde_json::from_slice(payload)?),
            Some(OperationKind::PathPayment) => {
                Operation::PathPayment(serde_json::from_slice(payload)?)
            }
            Some(OperationKind::ManageOffer) => {
                Operation::ManageOffer(serde_json::from_slice(payload)?)
            }
            Some(OperationKind::CreatePassiveOffer) => {
                Operation::CreatePassiveOffer(serde_json::from_slice(payload)?)
            }
            Some(OperationKind::SetOptions) => {
                Operation::SetOptions(serde_json::from_slice(payload)?)
            }
            Some(OperationKind::ChangeTrust) => {
                Operation::ChangeTrust(serde_json::from_slice(payload)?)
            }
            Some(OperationKind::AllowTrust) => {
                Operation::AllowTrust(serde_json::from_slice(payload)?)
            }
            Some(OperationKind::AccountMerge) => {
                Operation::AccountMerge(serde_json::from_slice(payload)?)
            }
            Some(OperationKind::Inflation) => {
                Operation::Inflation(serde_json::from_slice(payload)?)
            }
            Some(OperationKind::ManageData) => {
                Operation::ManageData(serde_json::from_slice(payload)?)
            }
        };

        Ok(operation)
    }

    fn paging_token(&self) -> &str {
        &self.base().paging_token
    }
}
