//! Appointments between clients and therapists, with their payments.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::therapist::SlotTime;

/// Lifecycle status of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    /// Stable wire/storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// All statuses, in lifecycle order. Used for dashboard rollups.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::Confirmed,
        Self::Cancelled,
        Self::Completed,
    ];
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown appointment status: {other}")),
        }
    }
}

/// How the session is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentKind {
    Video,
    Audio,
    InPerson,
    Chat,
}

impl AppointmentKind {
    /// Stable wire/storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::InPerson => "in_person",
            Self::Chat => "chat",
        }
    }
}

impl FromStr for AppointmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            "in_person" => Ok(Self::InPerson),
            "chat" => Ok(Self::Chat),
            other => Err(format!("unknown appointment kind: {other}")),
        }
    }
}

/// Settlement state of a payment or event registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    /// Stable wire/storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            other => Err(format!("unknown payment status: {other}")),
        }
    }
}

/// Payment instrument used for an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Paypal,
    BankTransfer,
}

impl PaymentMethod {
    /// Stable wire/storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Paypal => "paypal",
            Self::BankTransfer => "bank_transfer",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(Self::Card),
            "paypal" => Ok(Self::Paypal),
            "bank_transfer" => Ok(Self::BankTransfer),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

/// Payment attached 1:1 to an appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(value_type = String)]
    pub appointment_id: Uuid,
    pub amount_cents: i32,
    pub status: PaymentStatus,
    pub method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: DateTime<Utc>,
}

/// A booked session, served with participant display names and payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(value_type = String)]
    pub user_id: Uuid,
    #[schema(value_type = String)]
    pub therapist_id: Uuid,
    pub user_name: String,
    pub therapist_name: String,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    #[schema(value_type = String, example = "14:30")]
    pub time: SlotTime,
    pub status: AppointmentStatus,
    pub kind: AppointmentKind,
    pub notes: String,
    pub duration_minutes: i32,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<Payment>,
}

/// Payload for booking an appointment.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub user_id: Uuid,
    pub therapist_id: Uuid,
    pub date: NaiveDate,
    pub time: SlotTime,
    pub status: AppointmentStatus,
    pub kind: AppointmentKind,
    pub notes: String,
    pub duration_minutes: i32,
}

/// Payment payload nested in an appointment booking.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub amount_cents: i32,
    pub status: PaymentStatus,
    pub method: PaymentMethod,
    pub transaction_id: Option<String>,
}

/// Partial update for an appointment. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct AppointmentPatch {
    pub date: Option<NaiveDate>,
    pub time: Option<SlotTime>,
    pub status: Option<AppointmentStatus>,
    pub kind: Option<AppointmentKind>,
    pub notes: Option<String>,
    pub duration_minutes: Option<i32>,
}

/// List filter for appointment queries. Visibility scoping is applied on top
/// of these via the caller's [`super::user::Viewer`].
#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub status: Option<AppointmentStatus>,
    pub date: Option<NaiveDate>,
    pub therapist_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_uses_snake_case_on_the_wire() {
        let value = serde_json::to_value(AppointmentKind::InPerson).expect("serialize");
        assert_eq!(value.as_str(), Some("in_person"));
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in AppointmentStatus::ALL {
            assert_eq!(status.as_str().parse::<AppointmentStatus>(), Ok(status));
        }
    }
}
