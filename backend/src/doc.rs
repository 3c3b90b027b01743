//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST endpoint and the domain schemas they
//! reference. The generated specification feeds Swagger UI in debug builds
//! and is exported via `cargo run --bin openapi-dump` for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::appointment::{
    Appointment, AppointmentKind, AppointmentStatus, Payment, PaymentMethod, PaymentStatus,
};
use crate::domain::category::Category;
use crate::domain::error::{Error, ErrorCode};
use crate::domain::event::{Event, EventCategory, EventRegistration};
use crate::domain::message::{Conversation, Message};
use crate::domain::notification::{Audience, Notification, NotificationKind};
use crate::domain::progress::ProgressEntry;
use crate::domain::reading_list::{ReadingList, ReadingListItem};
use crate::domain::resource::{Resource, ResourceKind};
use crate::domain::review::Review;
use crate::domain::stats::{AdminStats, DashboardSummary, StatusCount};
use crate::domain::therapist::{ScheduleSlot, Therapist, Weekday};
use crate::domain::user::{User, UserRole};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Therapy platform backend API",
        description = "REST interface for accounts, booking, content and messaging."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::me,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::therapists::list_therapists,
        crate::inbound::http::therapists::create_therapist,
        crate::inbound::http::therapists::get_therapist,
        crate::inbound::http::therapists::update_therapist,
        crate::inbound::http::therapists::delete_therapist,
        crate::inbound::http::therapists::list_therapist_reviews,
        crate::inbound::http::therapists::list_therapist_appointments,
        crate::inbound::http::therapists::get_therapist_availability,
        crate::inbound::http::appointments::list_appointments,
        crate::inbound::http::appointments::create_appointment,
        crate::inbound::http::appointments::get_appointment,
        crate::inbound::http::appointments::update_appointment,
        crate::inbound::http::appointments::update_appointment_status,
        crate::inbound::http::appointments::delete_appointment,
        crate::inbound::http::reviews::list_reviews,
        crate::inbound::http::reviews::create_review,
        crate::inbound::http::reviews::get_review,
        crate::inbound::http::reviews::update_review,
        crate::inbound::http::reviews::delete_review,
        crate::inbound::http::resources::list_resources,
        crate::inbound::http::resources::list_featured_resources,
        crate::inbound::http::resources::create_resource,
        crate::inbound::http::resources::get_resource,
        crate::inbound::http::resources::update_resource,
        crate::inbound::http::resources::delete_resource,
        crate::inbound::http::events::list_events,
        crate::inbound::http::events::create_event,
        crate::inbound::http::events::get_event,
        crate::inbound::http::events::update_event,
        crate::inbound::http::events::delete_event,
        crate::inbound::http::events::register_for_event,
        crate::inbound::http::events::unregister_from_event,
        crate::inbound::http::reading_lists::list_reading_lists,
        crate::inbound::http::reading_lists::create_reading_list,
        crate::inbound::http::reading_lists::get_reading_list,
        crate::inbound::http::reading_lists::update_reading_list,
        crate::inbound::http::reading_lists::delete_reading_list,
        crate::inbound::http::categories::list_categories,
        crate::inbound::http::categories::create_category,
        crate::inbound::http::categories::get_category,
        crate::inbound::http::categories::update_category,
        crate::inbound::http::categories::delete_category,
        crate::inbound::http::notifications::list_notifications,
        crate::inbound::http::notifications::create_notification,
        crate::inbound::http::notifications::mark_notification_read,
        crate::inbound::http::notifications::mark_all_notifications_read,
        crate::inbound::http::notifications::delete_notification,
        crate::inbound::http::messages::list_messages,
        crate::inbound::http::messages::send_message,
        crate::inbound::http::messages::list_conversations,
        crate::inbound::http::messages::mark_message_read,
        crate::inbound::http::progress::list_progress,
        crate::inbound::http::progress::create_progress,
        crate::inbound::http::progress::get_progress,
        crate::inbound::http::progress::update_progress,
        crate::inbound::http::progress::delete_progress,
        crate::inbound::http::admin::dashboard,
        crate::inbound::http::admin::list_stats,
        crate::inbound::http::admin::create_stats,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        UserRole,
        Therapist,
        ScheduleSlot,
        Weekday,
        Appointment,
        AppointmentStatus,
        AppointmentKind,
        Payment,
        PaymentStatus,
        PaymentMethod,
        Review,
        Resource,
        ResourceKind,
        Event,
        EventCategory,
        EventRegistration,
        ReadingList,
        ReadingListItem,
        Category,
        Notification,
        NotificationKind,
        Audience,
        Message,
        Conversation,
        ProgressEntry,
        AdminStats,
        StatusCount,
        DashboardSummary,
    )),
    tags(
        (name = "auth", description = "Registration and session management"),
        (name = "users", description = "User accounts"),
        (name = "therapists", description = "Therapist profiles and schedules"),
        (name = "appointments", description = "Appointment booking"),
        (name = "reviews", description = "Therapist reviews"),
        (name = "resources", description = "Educational resources"),
        (name = "events", description = "Events and registration"),
        (name = "reading-lists", description = "Curated reading lists"),
        (name = "categories", description = "Display categories"),
        (name = "notifications", description = "Broadcast and targeted notifications"),
        (name = "messages", description = "Direct messages"),
        (name = "progress", description = "Progress tracking"),
        (name = "admin", description = "Platform statistics"),
        (name = "health", description = "Health probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_registers_core_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/auth/login",
            "/api/v1/therapists/{id}/availability",
            "/api/v1/events/{id}/register",
            "/api/v1/admin/dashboard",
        ] {
            assert!(
                doc.paths.paths.contains_key(path),
                "missing path: {path}"
            );
        }
    }

    #[test]
    fn error_schema_is_registered() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        assert!(schemas.contains_key("Error"));
        assert!(schemas.contains_key("Therapist"));
    }
}
