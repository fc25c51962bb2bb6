//! Read-only guest profile shown beside the chat surface.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    #[default]
    Pending,
    Cancelled,
}

impl BookingStatus {
    pub fn label(self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Pending => "Pending",
            BookingStatus::Cancelled => "Cancelled",
        }
    }
}

/// An outstanding charge on a guest's folio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DueItem {
    pub label: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub uid: String,
    pub booking_status: BookingStatus,
    pub id_proof_status: String,
    pub pending_balance: f64,
}

impl UserProfile {
    pub fn new(
        uid: String,
        booking_status: BookingStatus,
        id_proof_status: String,
        pending_balance: f64,
    ) -> Result<Self> {
        if !pending_balance.is_finite() || pending_balance < 0.0 {
            return Err(SessionError::InvalidProfile(format!(
                "pending balance must be a non-negative amount, got {pending_balance}"
            )));
        }
        Ok(Self {
            uid,
            booking_status,
            id_proof_status,
            pending_balance,
        })
    }

    /// Builds a profile from a guest record: booking flag, ID-proof flag and open charges.
    pub fn from_guest_record(
        email: &str,
        booked: bool,
        id_proof_uploaded: bool,
        due_items: &[DueItem],
    ) -> Result<Self> {
        let booking_status = if booked {
            BookingStatus::Confirmed
        } else {
            BookingStatus::Pending
        };
        let id_proof_status = if id_proof_uploaded {
            "Verified"
        } else {
            "Pending Upload"
        };
        let balance = due_items.iter().map(|item| item.amount).sum();
        Self::new(
            email.to_string(),
            booking_status,
            id_proof_status.to_string(),
            balance,
        )
    }
}
