use std::collections::HashMap;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use super::{Asset, DecodeError, RecordFamily, StreamRecord};

/// Fields common to every effect record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectBase {
    pub id: String,
    pub paging_token: String,
    pub account: String,
    #[serde(rename = "type")]
    pub effect_type: String,
    pub type_i: i32,
    pub operation_id: String,
    pub order: i32,
}

/// Discriminator values of the effect family. [`EffectKind::TABLE`] is the
/// single source of truth for the string-to-kind mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    AccountCreated,
    AccountRemoved,
    AccountCredited,
    AccountDebited,
    AccountThresholdsUpdated,
    AccountHomeDomainUpdated,
    AccountFlagsUpdated,
    AccountInflationDestinationUpdated,
    SignerCreated,
    SignerRemoved,
    SignerUpdated,
    TrustlineCreated,
    TrustlineRemoved,
    TrustlineUpdated,
    TrustlineAuthorized,
    TrustlineDeauthorized,
    OfferCreated,
    OfferRemoved,
    OfferUpdated,
    Trade,
    DataCreated,
    DataRemoved,
    DataUpdated,
}

impl EffectKind {
    /// Every discriminator value the decoder recognizes.
    pub const TABLE: [(&'static str, EffectKind); 23] = [
        ("account_created", EffectKind::AccountCreated),
        ("account_removed", EffectKind::AccountRemoved),
        ("account_credited", EffectKind::AccountCredited),
        ("account_debited", EffectKind::AccountDebited),
        ("account_thresholds_updated", EffectKind::AccountThresholdsUpdated),
        ("account_home_domain_updated", EffectKind::AccountHomeDomainUpdated),
        ("account_flags_updated", EffectKind::AccountFlagsUpdated),
        (
            "account_inflation_destination_updated",
            EffectKind::AccountInflationDestinationUpdated,
        ),
        ("signer_created", EffectKind::SignerCreated),
        ("signer_removed", EffectKind::SignerRemoved),
        ("signer_updated", EffectKind::SignerUpdated),
        ("trustline_created", EffectKind::TrustlineCreated),
        ("trustline_removed", EffectKind::TrustlineRemoved),
        ("trustline_updated", EffectKind::TrustlineUpdated),
        ("trustline_authorized", EffectKind::TrustlineAuthorized),
        ("trustline_deauthorized", EffectKind::TrustlineDeauthorized),
        ("offer_created", EffectKind::OfferCreated),
        ("offer_removed", EffectKind::OfferRemoved),
        ("offer_updated", EffectKind::OfferUpdated),
        ("trade", EffectKind::Trade),
        ("data_created", EffectKind::DataCreated),
        ("data_removed", EffectKind::DataRemoved),
        ("data_updated", EffectKind::DataUpdated),
    ];

    /// Looks up the kind for a discriminator value.
    pub fn from_discriminator(value: &str) -> Option<Self> {
        EFFECT_KINDS.get(value).copied()
    }
}

lazy_static! {
    static ref EFFECT_KINDS: HashMap<&'static str, EffectKind> =
        EffectKind::TABLE.iter().copied().collect();
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountCreated {
    #[serde(flatten)]
    pub base: EffectBase,
    pub starting_balance: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountRemoved {
    #[serde(flatten)]
    pub base: EffectBase,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountCredited {
    #[serde(flatten)]
    pub base: EffectBase,
    #[serde(flatten)]
    pub asset: Asset,
    pub amount: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountDebited {
    #[serde(flatten)]
    pub base: EffectBase,
    #[serde(flatten)]
    pub asset: Asset,
    pub amount: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountThresholdsUpdated {
    #[serde(flatten)]
    pub base: EffectBase,
    pub low_threshold: i32,
    pub med_threshold: i32,
    pub high_threshold: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountHomeDomainUpdated {
    #[serde(flatten)]
    pub base: EffectBase,
    pub home_domain: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountFlagsUpdated {
    #[serde(flatten)]
    pub base: EffectBase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_required_flag: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_revokable_flag: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountInflationDestinationUpdated {
    #[serde(flatten)]
    pub base: EffectBase,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignerCreated {
    #[serde(flatten)]
    pub base: EffectBase,
    pub weight: i32,
    pub public_key: String,
    pub key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignerRemoved {
    #[serde(flatten)]
    pub base: EffectBase,
    pub weight: i32,
    pub public_key: String,
    pub key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignerUpdated {
    #[serde(flatten)]
    pub base: EffectBase,
    pub weight: i32,
    pub public_key: String,
    pub key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustlineCreated {
    #[serde(flatten)]
    pub base: EffectBase,
    #[serde(flatten)]
    pub asset: Asset,
    pub limit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustlineRemoved {
    #[serde(flatten)]
    pub base: EffectBase,
    #[serde(flatten)]
    pub asset: Asset,
    pub limit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustlineUpdated {
    #[serde(flatten)]
    pub base: EffectBase,
    #[serde(flatten)]
    pub asset: Asset,
    pub limit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustlineAuthorized {
    #[serde(flatten)]
    pub base: EffectBase,
    pub trustor: String,
    pub asset_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustlineDeauthorized {
    #[serde(flatten)]
    pub base: EffectBase,
    pub trustor: String,
    pub asset_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfferCreated {
    #[serde(flatten)]
    pub base: EffectBase,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfferRemoved {
    #[serde(flatten)]
    pub base: EffectBase,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfferUpdated {
    #[serde(flatten)]
    pub base: EffectBase,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trade {
    #[serde(flatten)]
    pub base: EffectBase,
    pub seller: String,
    pub offer_id: i64,
    pub sold_amount: String,
    pub sold_asset_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sold_asset_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sold_asset_issuer: Option<String>,
    pub bought_amount: String,
    pub bought_asset_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bought_asset_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bought_asset_issuer: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataCreated {
    #[serde(flatten)]
    pub base: EffectBase,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataRemoved {
    #[serde(flatten)]
    pub base: EffectBase,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataUpdated {
    #[serde(flatten)]
    pub base: EffectBase,
}

/// A decoded effect record: one variant per discriminator value, plus an
/// `Unknown` fallback holding the base fields of records this build does not
/// recognize.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    AccountCreated(AccountCreated),
    AccountRemoved(AccountRemoved),
    AccountCredited(AccountCredited),
    AccountDebited(AccountDebited),
    AccountThresholdsUpdated(AccountThresholdsUpdated),
    AccountHomeDomainUpdated(AccountHomeDomainUpdated),
    AccountFlagsUpdated(AccountFlagsUpdated),
    AccountInflationDestinationUpdated(AccountInflationDestinationUpdated),
    SignerCreated(SignerCreated),
    SignerRemoved(SignerRemoved),
    SignerUpdated(SignerUpdated),
    TrustlineCreated(TrustlineCreated),
    TrustlineRemoved(TrustlineRemoved),
    TrustlineUpdated(TrustlineUpdated),
    TrustlineAuthorized(TrustlineAuthorized),
    TrustlineDeauthorized(TrustlineDeauthorized),
    OfferCreated(OfferCreated),
    OfferRemoved(OfferRemoved),
    OfferUpdated(OfferUpdated),
    Trade(Trade),
    DataCreated(DataCreated),
    DataRemoved(DataRemoved),
    DataUpdated(DataUpdated),
    Unknown(EffectBase),
}

impl Effect {
    /// The fields shared by every effect variant.
    pub fn base(&self) -> &EffectBase {
        match self {
            Effect::AccountCreated(e) => &e.base,
            Effect::AccountRemoved(e) => &e.base,
            Effect::AccountCredited(e) => &e.base,
            Effect::AccountDebited(e) => &e.base,
            Effect::AccountThresholdsUpdated(e) => &e.base,
            Effect::AccountHomeDomainUpdated(e) => &e.base,
            Effect::AccountFlagsUpdated(e) => &e.base,
            Effect::AccountInflationDestinationUpdated(e) => &e.base,
            Effect::SignerCreated(e) => &e.base,
            Effect::SignerRemoved(e) => &e.base,
            Effect::SignerUpdated(e) => &e.base,
            Effect::TrustlineCreated(e) => &e.base,
            Effect::TrustlineRemoved(e) => &e.base,
            Effect::TrustlineUpdated(e) => &e.base,
            Effect::TrustlineAuthorized(e) => &e.base,
            Effect::TrustlineDeauthorized(e) => &e.base,
            Effect::OfferCreated(e) => &e.base,
            Effect::OfferRemoved(e) => &e.base,
            Effect::OfferUpdated(e) => &e.base,
            Effect::Trade(e) => &e.base,
            Effect::DataCreated(e) => &e.base,
            Effect::DataRemoved(e) => &e.base,
            Effect::DataUpdated(e) => &e.base,
            Effect::Unknown(base) => base,
        }
    }

    /// The kind this record decoded as, `None` for `Unknown`.
    pub fn kind(&self) -> Option<EffectKind> {
        match self {
            Effect::AccountCreated(_) => Some(EffectKind::AccountCreated),
            Effect::AccountRemoved(_) => Some(EffectKind::AccountRemoved),
            Effect::AccountCredited(_) => Some(EffectKind::AccountCredited),
            Effect::AccountDebited(_) => Some(EffectKind::AccountDebited),
            Effect::AccountThresholdsUpdated(_) => Some(EffectKind::AccountThresholdsUpdated),
            Effect::AccountHomeDomainUpdated(_) => Some(EffectKind::AccountHomeDomainUpdated),
            Effect::AccountFlagsUpdated(_) => Some(EffectKind::AccountFlagsUpdated),
            Effect::AccountInflationDestinationUpdated(_) => {
                Some(EffectKind::AccountInflationDestinationUpdated)
            }
            Effect::SignerCreated(_) => Some(EffectKind::SignerCreated),
            Effect::SignerRemoved(_) => Some(EffectKind::SignerRemoved),
            Effect::SignerUpdated(_) => Some(EffectKind::SignerUpdated),
            Effect::TrustlineCreated(_) => Some(EffectKind::TrustlineCreated),
            Effect::TrustlineRemoved(_) => Some(EffectKind::TrustlineRemoved),
            Effect::TrustlineUpdated(_) => Some(EffectKind::TrustlineUpdated),
            Effect::TrustlineAuthorized(_) => Some(EffectKind::TrustlineAuthorized),
            Effect::TrustlineDeauthorized(_) => Some(EffectKind::TrustlineDeauthorized),
            Effect::OfferCreated(_) => Some(EffectKind::OfferCreated),
            Effect::OfferRemoved(_) => Some(EffectKind::OfferRemoved),
            Effect::OfferUpdated(_) => Some(EffectKind::OfferUpdated),
            Effect::Trade(_) => Some(EffectKind::Trade),
            Effect::DataCreated(_) => Some(EffectKind::DataCreated),
            Effect::DataRemoved(_) => Some(EffectKind::DataRemoved),
            Effect::DataUpdated(_) => Some(EffectKind::DataUpdated),
            Effect::Unknown(_) => None,
        }
    }
}

impl StreamRecord for Effect {
    const FAMILY: RecordFamily = RecordFamily::Effects;

    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        #[derive(Deserialize)]
        struct Probe {
            #[serde(rename = "type")]
            effect_type: String,
        }

        let probe: Probe = serde_json::from_slice(payload)?;
        let effect = match EffectKind::from_discriminator(&probe.effect_type) {
            None => Effect::Unknown(serde_json::from_slice(payload)?),
            Some(EffectKind::AccountCreated) => {
                Effect::AccountCreated(serde_json::from_slice(payload)?)
            }
            Some(EffectKind::AccountRemoved) => {
                Effect::AccountRemoved(serde_json::from_slice(payload)?)
            }
            Some(EffectKind::AccountCredited) => {
                Effect::AccountCredited(serde_json::from_slice(payload)?)
            }
            Some(EffectKind::AccountDebited) => {
                Effect::AccountDebited(serde_json::from_slice(payload)?)
            }
            Some(EffectKind::AccountThresholdsUpdated) => {
                Effect::AccountThresholdsUpdated(serde_json::from_slice(payload)?)
            }
            Some(EffectKind::AccountHomeDomainUpdated) => {
                Effect::AccountHomeDomainUpdated(serde_json::from_slice(payload)?)
            }
            Some(EffectKind::AccountFlagsUpdated) => {
                Effect::AccountFlagsUpdated(serde_json::from_slice(payload)?)
            }
            Some(EffectKind::AccountInflationDestinationUpdated) => {
                Effect::AccountInflationDestinationUpdated(serde_json::from_slice(payload)?)
            }
            Some(EffectKind::SignerCreated) => {
                Effect::SignerCreated(serde_json::from_slice(payload)?)
            }
            Some(EffectKind::SignerRemoved) => {
                Effect::SignerRemoved(serde_json::from_slice(payload)?)
            }
            Some(EffectKind::SignerUpdated) => {
                Effect::SignerUpdated(serde_json::from_slice(payload)?)
            }
            Some(EffectKind::TrustlineCreated) => {
                Effect::TrustlineCreated(serde_json::from_slice(payload)?)
            }
            Some(EffectKind::TrustlineRemoved) => {
                Effect::TrustlineRemoved(serde_json::from_slice(payload)?)
            }
            Some(EffectKind::TrustlineUpdated) => {
                Effect::TrustlineUpdated(serde_json::from_slice(payload)?)
            }
            Some(EffectKind::TrustlineAuthorized) => {
                Effect::TrustlineAuthorized(serde_json::from_slice(payload)?)
            }
            Some(EffectKind::TrustlineDeauthorized) => {
                Effect::TrustlineDeauthorized(serde_json::from_slice(payload)?)
            }
            Some(EffectKind::OfferCreated) => {
                Effect::OfferCreated(serde_json::from_slice(payload)?)
            }
            Some(EffectKind::OfferRemoved) => {
                Effect::OfferRemoved(serde_json::from_slice(payload)?)
            }
            Some(EffectKind::OfferUpdated) => {
                Effect::OfferUpdated(serde_json::from_slice(payload)?)
            }
            Some(EffectKind::Trade) => Effect::Trade(serde_json::from_slice(payload)?),
            Some(EffectKind::DataCreated) => Effect::DataCreated(serde_json::from_slice(payload)?),
            Some(EffectKind::DataRemoved) => Effect::DataRemoved(serde_json::from_slice(payload)?),
            Some(EffectKind::DataUpdated) => Effect::DataUpdated(serde_json::from_slice(payload)?),
        };

        Ok(effect)
    }

    fn paging_token(&self) -> &str {
        &self.base().paging_token
    }
}
