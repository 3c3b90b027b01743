//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; regenerate with
//! `diesel print-schema` when migrations change.

diesel::table! {
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Varchar,
        phone -> Nullable<Varchar>,
        role -> Varchar,
        profile_image -> Nullable<Varchar>,
        password_hash -> Varchar,
        date_joined -> Timestamptz,
    }
}

diesel::table! {
    therapists (id) {
        id -> Uuid,
        user_id -> Uuid,
        specialty -> Varchar,
        experience_years -> Int4,
        available -> Bool,
        price_cents -> Int4,
        languages -> Array<Text>,
        specializations -> Array<Text>,
        education -> Array<Text>,
        about -> Text,
        rating -> Float8,
        reviews_count -> Int4,
    }
}

diesel::table! {
    schedule_slots (id) {
        id -> Uuid,
        therapist_id -> Uuid,
        day -> Varchar,
        time -> Varchar,
        available -> Bool,
    }
}

diesel::table! {
    appointments (id) {
        id -> Uuid,
        user_id -> Uuid,
        therapist_id -> Uuid,
        date -> Date,
        time -> Varchar,
        status -> Varchar,
        kind -> Varchar,
        notes -> Text,
        duration_minutes -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    payments (id) {
        id -> Uuid,
        appointment_id -> Uuid,
        amount_cents -> Int4,
        status -> Varchar,
        method -> Varchar,
        transaction_id -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    reviews (id) {
        id -> Uuid,
        user_id -> Uuid,
        therapist_id -> Uuid,
        rating -> Int2,
        comment -> Text,
        date -> Date,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    resources (id) {
        id -> Uuid,
        title -> Varchar,
        author -> Varchar,
        description -> Text,
        category -> Varchar,
        tags -> Array<Text>,
        url -> Varchar,
        featured -> Bool,
        thumbnail_url -> Nullable<Varchar>,
        duration -> Nullable<Varchar>,
        kind -> Varchar,
        rating -> Float8,
        reviews_count -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    events (id) {
        id -> Uuid,
        title -> Varchar,
        date -> Date,
        time -> Varchar,
        location -> Varchar,
        category -> Varchar,
        capacity -> Int4,
        description -> Text,
        presenter -> Varchar,
        price_cents -> Int4,
        image -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    event_registrations (id) {
        id -> Uuid,
        user_id -> Uuid,
        event_id -> Uuid,
        registered_at -> Timestamptz,
        payment_status -> Varchar,
    }
}

diesel::table! {
    reading_lists (id) {
        id -> Uuid,
        title -> Varchar,
        description -> Text,
        category -> Varchar,
        image -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    reading_list_items (id) {
        id -> Uuid,
        reading_list_id -> Uuid,
        title -> Varchar,
        position -> Int4,
    }
}

diesel::table! {
    categories (id) {
        id -> Uuid,
        title -> Varchar,
        icon -> Varchar,
        color -> Varchar,
        count -> Int4,
    }
}

diesel::table! {
    notifications (id) {
        id -> Uuid,
        user_id -> Nullable<Uuid>,
        audience -> Varchar,
        title -> Varchar,
        message -> Text,
        kind -> Varchar,
        read -> Bool,
        date -> Timestamptz,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    messages (id) {
        id -> Uuid,
        sender_id -> Uuid,
        receiver_id -> Uuid,
        body -> Text,
        sent_at -> Timestamptz,
        read -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    progress_entries (id) {
        id -> Uuid,
        user_id -> Uuid,
        date -> Date,
        mood -> Int2,
        notes -> Text,
        completed_exercises -> Array<Text>,
        therapist_feedback -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    admin_stats (id) {
        id -> Uuid,
        date -> Date,
        total_therapists -> Int4,
        active_users -> Int4,
        appointments_today -> Int4,
        total_resources -> Int4,
        user_growth -> Float8,
        success_rate -> Float8,
    }
}

diesel::joinable!(therapists -> users (user_id));
diesel::joinable!(schedule_slots -> therapists (therapist_id));
diesel::joinable!(appointments -> users (user_id));
diesel::joinable!(appointments -> therapists (therapist_id));
diesel::joinable!(payments -> appointments (appointment_id));
diesel::joinable!(reviews -> users (user_id));
diesel::joinable!(reviews -> therapists (therapist_id));
diesel::joinable!(event_registrations -> events (event_id));
diesel::joinable!(event_registrations -> users (user_id));
diesel::joinable!(reading_list_items -> reading_lists (reading_list_id));
diesel::joinable!(notifications -> users (user_id));
diesel::joinable!(progress_entries -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    therapists,
    schedule_slots,
    appointments,
    payments,
    reviews,
    resources,
    events,
    event_registrations,
    reading_lists,
    reading_list_items,
    categories,
    notifications,
    messages,
    progress_entries,
    admin_stats,
);
