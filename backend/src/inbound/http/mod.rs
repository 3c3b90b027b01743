//! HTTP inbound adapter exposing REST endpoints.

pub mod admin;
pub mod appointments;
pub mod auth;
pub mod categories;
pub mod error;
pub mod events;
pub mod health;
pub mod messages;
pub mod notifications;
pub mod progress;
pub mod reading_lists;
pub mod resources;
pub mod reviews;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod therapists;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// Register every API endpoint on the given scope.
///
/// Static segments (`/users/me`, `/resources/featured`,
/// `/messages/conversations`) are registered before their `{id}` siblings so
/// they are not captured as path parameters.
pub fn register_api(scope: actix_web::Scope) -> actix_web::Scope {
    scope
        .service(users::register)
        .service(users::login)
        .service(users::logout)
        .service(users::me)
        .service(users::list_users)
        .service(users::get_user)
        .service(users::update_user)
        .service(users::delete_user)
        .service(therapists::list_therapists)
        .service(therapists::create_therapist)
        .service(therapists::get_therapist)
        .service(therapists::update_therapist)
        .service(therapists::delete_therapist)
        .service(therapists::list_therapist_reviews)
        .service(therapists::list_therapist_appointments)
        .service(therapists::get_therapist_availability)
        .service(appointments::list_appointments)
        .service(appointments::create_appointment)
        .service(appointments::get_appointment)
        .service(appointments::update_appointment)
        .service(appointments::update_appointment_status)
        .service(appointments::delete_appointment)
        .service(reviews::list_reviews)
        .service(reviews::create_review)
        .service(reviews::get_review)
        .service(reviews::update_review)
        .service(reviews::delete_review)
        .service(resources::list_resources)
        .service(resources::list_featured_resources)
        .service(resources::create_resource)
        .service(resources::get_resource)
        .service(resources::update_resource)
        .service(resources::delete_resource)
        .service(events::list_events)
        .service(events::create_event)
        .service(events::get_event)
        .service(events::update_event)
        .service(events::delete_event)
        .service(events::register_for_event)
        .service(events::unregister_from_event)
        .service(reading_lists::list_reading_lists)
        .service(reading_lists::create_reading_list)
        .service(reading_lists::get_reading_list)
        .service(reading_lists::update_reading_list)
        .service(reading_lists::delete_reading_list)
        .service(categories::list_categories)
        .service(categories::create_category)
        .service(categories::get_category)
        .service(categories::update_category)
        .service(categories::delete_category)
        .service(notifications::list_notifications)
        .service(notifications::create_notification)
        .service(notifications::mark_all_notifications_read)
        .service(notifications::mark_notification_read)
        .service(notifications::delete_notification)
        .service(messages::list_messages)
        .service(messages::send_message)
        .service(messages::list_conversations)
        .service(messages::mark_message_read)
        .service(progress::list_progress)
        .service(progress::create_progress)
        .service(progress::get_progress)
        .service(progress::update_progress)
        .service(progress::delete_progress)
        .service(admin::dashboard)
        .service(admin::list_stats)
        .service(admin::create_stats)
}
