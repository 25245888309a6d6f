//! Patient payments.
//!
//! Amounts are held in minor currency units (cents) to keep totals exact.

use crate::Reference;
use chrono::{DateTime, Utc};
use portal_types::EntityId;
use serde::{Deserialize, Serialize};

wire_enum! {
    /// Settlement state of a payment.
    pub enum PaymentStatus {
        Pending => "PENDING",
        Paid => "PAID",
        Failed => "FAILED",
        Refunded => "REFUNDED",
    }
}

wire_enum! {
    /// How the payment was (or will be) settled.
    pub enum PaymentMethod {
        Card => "CARD",
        Cash => "CASH",
        Insurance => "INSURANCE",
        BankTransfer => "BANK_TRANSFER",
    }
}

/// A charge raised against a patient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Payment {
    pub id: EntityId,
    pub patient: Reference,
    pub description: String,
    pub amount_cents: i64,
    pub currency: String,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    /// Processor or invoice reference shown on receipts.
    #[serde(default)]
    pub reference: String,
}
