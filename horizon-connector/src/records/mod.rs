//! # Record Decoding
//!
//! Records arrive as JSON payloads and come in two families, each with its
//! own discriminator convention: effects carry a string `type`, operations
//! an integer `type_i`. Decoding peeks the discriminator, selects the
//! concrete variant through an immutable lookup table, and only then decodes
//! the full field set. A discriminator absent from the table falls back to
//! the family's `Unknown` variant so that feeds introducing new record kinds
//! keep flowing; a structural JSON failure is a hard [`DecodeError`].

mod effect;
mod operation;

pub use effect::{
    AccountCreated, AccountCredited, AccountDebited, AccountFlagsUpdated,
    AccountHomeDomainUpdated, AccountInflationDestinationUpdated, AccountRemoved,
    AccountThresholdsUpdated, DataCreated, DataRemoved, DataUpdated, Effect, EffectBase,
    EffectKind, OfferCreated, OfferRemoved, OfferUpdated, SignerCreated, SignerRemoved,
    SignerUpdated, Trade, TrustlineAuthorized, TrustlineCreated, TrustlineDeauthorized,
    TrustlineRemoved, TrustlineUpdated,
};
pub use operation::{
    AccountMerge, AllowTrust, ChangeTrust, CreateAccount, CreatePassiveOffer, Inflation,
    ManageData, ManageOffer, Operation, OperationBase, OperationKind, PathPayment, Payment,
    SetOptions,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structural decode failure: the payload is not valid JSON, or does not fit
/// the field set of the variant its discriminator selected.
#[derive(Debug, Error)]
#[error("record payload failed to decode: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// The grouping of records sharing one discriminator convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFamily {
    Effects,
    Operations,
}

/// A decoded record from either family.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Effect(Effect),
    Operation(Operation),
}

impl Record {
    /// The opaque resumption cursor carried by the record.
    pub fn paging_token(&self) -> &str {
        match self {
            Record::Effect(effect) => effect.paging_token(),
            Record::Operation(operation) => operation.paging_token(),
        }
    }
}

/// Decodes one data payload according to `family`'s discriminator
/// convention.
pub fn decode_record(payload: &[u8], family: RecordFamily) -> Result<Record, DecodeError> {
    match family {
        RecordFamily::Effects => Effect::decode(payload).map(Record::Effect),
        RecordFamily::Operations => Operation::decode(payload).map(Record::Operation),
    }
}

/// A typed record family member the stream engine can deliver.
pub trait StreamRecord: Sized + Send + 'static {
    /// The family this record type belongs to.
    const FAMILY: RecordFamily;

    /// Decodes a frame's data payload into this record type.
    fn decode(payload: &[u8]) -> Result<Self, DecodeError>;

    /// The opaque resumption cursor carried by every record.
    fn paging_token(&self) -> &str;
}

/// An asset referenced by a record's variant-specific fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Asset {
    pub asset_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_issuer: Option<String>,
}

/// A rational price quoted by offer-related records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Price {
    pub n: i32,
    pub d: i32,
}
