//! Daily platform statistics and the admin dashboard summary.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::appointment::AppointmentStatus;

/// One day's stored platform rollup; unique per date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub total_therapists: i32,
    pub active_users: i32,
    pub appointments_today: i32,
    pub total_resources: i32,
    pub user_growth: f64,
    pub success_rate: f64,
}

/// Payload for storing a day's rollup.
#[derive(Debug, Clone)]
pub struct NewAdminStats {
    pub date: NaiveDate,
    pub total_therapists: i32,
    pub active_users: i32,
    pub appointments_today: i32,
    pub total_resources: i32,
    pub user_growth: f64,
    pub success_rate: f64,
}

/// Count of appointments in one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: AppointmentStatus,
    pub count: i64,
}

/// Dashboard payload combining the stored rollup with live counts.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub stats: AdminStats,
    pub appointments_by_status: Vec<StatusCount>,
    pub upcoming_events: i64,
}
