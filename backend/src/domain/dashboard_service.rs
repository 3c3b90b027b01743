//! Admin dashboard rollup.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::Error;
use crate::domain::ports::{
    AppointmentRepository, EventRepository, ResourceRepository, StatsRepository,
    TherapistRepository, UserRepository,
};
use crate::domain::stats::{AdminStats, DashboardSummary, NewAdminStats, StatusCount};
use crate::domain::user::UserRole;

fn saturating_i32(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Computes the day's statistics rollup, storing it on first access.
#[derive(Clone)]
pub struct DashboardService {
    stats: Arc<dyn StatsRepository>,
    users: Arc<dyn UserRepository>,
    therapists: Arc<dyn TherapistRepository>,
    appointments: Arc<dyn AppointmentRepository>,
    resources: Arc<dyn ResourceRepository>,
    events: Arc<dyn EventRepository>,
}

impl DashboardService {
    /// Build the service over its ports.
    pub fn new(
        stats: Arc<dyn StatsRepository>,
        users: Arc<dyn UserRepository>,
        therapists: Arc<dyn TherapistRepository>,
        appointments: Arc<dyn AppointmentRepository>,
        resources: Arc<dyn ResourceRepository>,
        events: Arc<dyn EventRepository>,
    ) -> Self {
        Self {
            stats,
            users,
            therapists,
            appointments,
            resources,
            events,
        }
    }

    /// Fetch the dashboard summary for `today`.
    ///
    /// The stored rollup is created from live counts the first time a day is
    /// requested; later requests reuse the stored row. Growth and success
    /// rate need historical data the platform does not collect yet, so they
    /// are stored as zero.
    pub async fn summary(&self, today: NaiveDate) -> Result<DashboardSummary, Error> {
        let stats = match self.stats.find_by_date(today).await? {
            Some(stored) => stored,
            None => self.compute_and_store(today).await?,
        };

        let appointments_by_status = self
            .appointments
            .count_by_status()
            .await?
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect();
        let upcoming_events = self.events.count_upcoming(today).await?;

        Ok(DashboardSummary {
            stats,
            appointments_by_status,
            upcoming_events,
        })
    }

    async fn compute_and_store(&self, today: NaiveDate) -> Result<AdminStats, Error> {
        let total_therapists = self.therapists.count().await?;
        let active_users = self.users.count_by_role(UserRole::Client).await?;
        let appointments_today = self.appointments.count_on(today).await?;
        let total_resources = self.resources.count().await?;

        Ok(self
            .stats
            .insert(NewAdminStats {
                date: today,
                total_therapists: saturating_i32(total_therapists),
                active_users: saturating_i32(active_users),
                appointments_today: saturating_i32(appointments_today),
                total_resources: saturating_i32(total_resources),
                user_growth: 0.0,
                success_rate: 0.0,
            })
            .await?)
    }
}
