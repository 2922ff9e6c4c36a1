//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match `backend/migrations`. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Club accounts. Never deleted; `is_active` is cleared instead.
    users (id) {
        id -> Uuid,
        display_name -> Varchar,
        /// One of `admin`, `leader`, `member`.
        role -> Text,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    tours (id) {
        id -> Uuid,
        leader_id -> Uuid,
        title -> Varchar,
        tour_date -> Date,
        description -> Nullable<Text>,
        max_participants -> Nullable<Int4>,
        /// One of `draft`, `published`, `cancelled`.
        status -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Sign-ups; cascades with the owning tour.
    tour_participants (tour_id, user_id) {
        tour_id -> Uuid,
        user_id -> Uuid,
        joined_at -> Timestamptz,
    }
}

diesel::table! {
    invitations (token) {
        token -> Uuid,
        email -> Text,
        role -> Text,
        invited_by -> Uuid,
        created_at -> Timestamptz,
        expires_at -> Timestamptz,
        accepted_at -> Nullable<Timestamptz>,
        accepted_user_id -> Nullable<Uuid>,
    }
}

diesel::joinable!(tours -> users (leader_id));
diesel::joinable!(tour_participants -> tours (tour_id));
diesel::joinable!(tour_participants -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(invitations, tour_participants, tours, users);
