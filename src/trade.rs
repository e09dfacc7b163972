use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// One side of a trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    pub external_id: String,
    pub full_name: String,
    pub company_name: String,
}

/// Immutable record of a trade. Constructed once before the contract is
/// composed and never touched by the layout engine. `display_id` is the
/// 6-character code from [`crate::idgen::DisplayIdGenerator`]; uniqueness of
/// `id` is the caller's responsibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: Uuid,
    pub display_id: String,
    pub created_at: DateTime<Utc>,
    pub buyer: Party,
    pub seller: Party,
}

/// Signer roles. Closed set, used as the key into the signature region
/// table of the layout plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Signee {
    Buyer,
    Seller,
    Admin,
}

impl Signee {
    pub const ALL: [Signee; 3] = [Signee::Buyer, Signee::Seller, Signee::Admin];

    pub(crate) fn index(self) -> usize {
        match self {
            Signee::Buyer => 0,
            Signee::Seller => 1,
            Signee::Admin => 2,
        }
    }
}

impl fmt::Display for Signee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signee::Buyer => write!(f, "Buyer"),
            Signee::Seller => write!(f, "Seller"),
            Signee::Admin => write!(f, "Admin"),
        }
    }
}
