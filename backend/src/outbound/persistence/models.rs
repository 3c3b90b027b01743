//! Internal Diesel row structs for database operations.
//!
//! Implementation details of the persistence layer; never exposed to the
//! domain. Enum-valued columns are stored as their stable string forms and
//! converted back when rows are hydrated.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    admin_stats, appointments, categories, event_registrations, events, messages, notifications,
    payments, progress_entries, reading_list_items, reading_lists, resources, reviews,
    schedule_slots, therapists, users,
};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub profile_image: Option<String>,
    pub password_hash: String,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub profile_image: Option<String>,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset {
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
    pub role: Option<String>,
    pub profile_image: Option<Option<String>>,
    pub password_hash: Option<String>,
}

// ---------------------------------------------------------------------------
// Therapists and schedule slots
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = therapists)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TherapistRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub specialty: String,
    pub experience_years: i32,
    pub available: bool,
    pub price_cents: i32,
    pub languages: Vec<String>,
    pub specializations: Vec<String>,
    pub education: Vec<String>,
    pub about: String,
    pub rating: f64,
    pub reviews_count: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = therapists)]
pub(crate) struct NewTherapistRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub specialty: String,
    pub experience_years: i32,
    pub available: bool,
    pub price_cents: i32,
    pub languages: Vec<String>,
    pub specializations: Vec<String>,
    pub education: Vec<String>,
    pub about: String,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = therapists)]
pub(crate) struct TherapistChangeset {
    pub specialty: Option<String>,
    pub experience_years: Option<i32>,
    pub available: Option<bool>,
    pub price_cents: Option<i32>,
    pub languages: Option<Vec<String>>,
    pub specializations: Option<Vec<String>>,
    pub education: Option<Vec<String>>,
    pub about: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = schedule_slots)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SlotRow {
    pub id: Uuid,
    pub therapist_id: Uuid,
    pub day: String,
    pub time: String,
    pub available: bool,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schedule_slots)]
pub(crate) struct NewSlotRow {
    pub id: Uuid,
    pub therapist_id: Uuid,
    pub day: String,
    pub time: String,
    pub available: bool,
}

// ---------------------------------------------------------------------------
// Appointments and payments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = appointments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AppointmentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub therapist_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub status: String,
    pub kind: String,
    pub notes: String,
    pub duration_minutes: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = appointments)]
pub(crate) struct NewAppointmentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub therapist_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub status: String,
    pub kind: String,
    pub notes: String,
    pub duration_minutes: i32,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = appointments)]
pub(crate) struct AppointmentChangeset {
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub status: Option<String>,
    pub kind: Option<String>,
    pub notes: Option<String>,
    pub duration_minutes: Option<i32>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PaymentRow {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub amount_cents: i32,
    pub status: String,
    pub method: String,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payments)]
pub(crate) struct NewPaymentRow {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub amount_cents: i32,
    pub status: String,
    pub method: String,
    pub transaction_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReviewRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub therapist_id: Uuid,
    pub rating: i16,
    pub comment: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reviews)]
pub(crate) struct NewReviewRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub therapist_id: Uuid,
    pub rating: i16,
    pub comment: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = reviews)]
pub(crate) struct ReviewChangeset {
    pub rating: Option<i16>,
    pub comment: Option<String>,
    pub date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = resources)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ResourceRow {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub url: String,
    pub featured: bool,
    pub thumbnail_url: Option<String>,
    pub duration: Option<String>,
    pub kind: String,
    pub rating: f64,
    pub reviews_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = resources)]
pub(crate) struct NewResourceRow {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub url: String,
    pub featured: bool,
    pub thumbnail_url: Option<String>,
    pub duration: Option<String>,
    pub kind: String,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = resources)]
pub(crate) struct ResourceChangeset {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub url: Option<String>,
    pub featured: Option<bool>,
    pub thumbnail_url: Option<Option<String>>,
    pub duration: Option<Option<String>>,
    pub kind: Option<String>,
}

// ---------------------------------------------------------------------------
// Events and registrations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EventRow {
    pub id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    pub time: String,
    pub location: String,
    pub category: String,
    pub capacity: i32,
    pub description: String,
    pub presenter: String,
    pub price_cents: i32,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = events)]
pub(crate) struct NewEventRow {
    pub id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    pub time: String,
    pub location: String,
    pub category: String,
    pub capacity: i32,
    pub description: String,
    pub presenter: String,
    pub price_cents: i32,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = events)]
pub(crate) struct EventChangeset {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub capacity: Option<i32>,
    pub description: Option<String>,
    pub presenter: Option<String>,
    pub price_cents: Option<i32>,
    pub image: Option<Option<String>>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = event_registrations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RegistrationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub registered_at: DateTime<Utc>,
    pub payment_status: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = event_registrations)]
pub(crate) struct NewRegistrationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub payment_status: String,
}

// ---------------------------------------------------------------------------
// Reading lists
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reading_lists)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReadingListRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reading_lists)]
pub(crate) struct NewReadingListRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = reading_lists)]
pub(crate) struct ReadingListChangeset {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image: Option<Option<String>>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reading_list_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ItemRow {
    pub id: Uuid,
    pub reading_list_id: Uuid,
    pub title: String,
    pub position: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reading_list_items)]
pub(crate) struct NewItemRow {
    pub id: Uuid,
    pub reading_list_id: Uuid,
    pub title: String,
    pub position: i32,
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CategoryRow {
    pub id: Uuid,
    pub title: String,
    pub icon: String,
    pub color: String,
    pub count: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = categories)]
pub(crate) struct NewCategoryRow {
    pub id: Uuid,
    pub title: String,
    pub icon: String,
    pub color: String,
    pub count: i32,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = categories)]
pub(crate) struct CategoryChangeset {
    pub title: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub count: Option<i32>,
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub audience: String,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub read: bool,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub(crate) struct NewNotificationRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub audience: String,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub date: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MessageRow {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = messages)]
pub(crate) struct NewMessageRow {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Progress entries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = progress_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProgressRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub mood: i16,
    pub notes: String,
    pub completed_exercises: Vec<String>,
    pub therapist_feedback: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = progress_entries)]
pub(crate) struct NewProgressRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub mood: i16,
    pub notes: String,
    pub completed_exercises: Vec<String>,
    pub therapist_feedback: String,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = progress_entries)]
pub(crate) struct ProgressChangeset {
    pub date: Option<NaiveDate>,
    pub mood: Option<i16>,
    pub notes: Option<String>,
    pub completed_exercises: Option<Vec<String>>,
    pub therapist_feedback: Option<String>,
}

// ---------------------------------------------------------------------------
// Admin stats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = admin_stats)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AdminStatsRow {
    pub id: Uuid,
    pub date: NaiveDate,
    pub total_therapists: i32,
    pub active_users: i32,
    pub appointments_today: i32,
    pub total_resources: i32,
    pub user_growth: f64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = admin_stats)]
pub(crate) struct NewAdminStatsRow {
    pub id: Uuid,
    pub date: NaiveDate,
    pub total_therapists: i32,
    pub active_users: i32,
    pub appointments_today: i32,
    pub total_resources: i32,
    pub user_growth: f64,
    pub success_rate: f64,
}
