//! Diesel table definitions for the SQLite schema.
//!
//! These definitions must match the embedded migrations exactly; they drive
//! Diesel's compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Registered accounts. Only the store knows password digests.
    users (id) {
        id -> BigInt,
        name -> Text,
        email -> Text,
        password_digest -> Text,
        gender -> Text,
        created_at -> Timestamp,
    }
}

diesel::table! {
    /// User-declared itineraries, independent of any date.
    routes (id) {
        id -> BigInt,
        slot_code -> Text,
        end_point -> Text,
        major_stops -> Nullable<Text>,
        depart_time -> Nullable<Text>,
        transport_mode -> Nullable<Text>,
        rider_count -> BigInt,
    }
}

diesel::table! {
    /// Per-join rider detail records.
    links (id) {
        id -> BigInt,
        user_id -> Nullable<BigInt>,
        name -> Text,
        gender -> Text,
        drop_point -> Text,
        phone -> Text,
        course_year -> Text,
        branch -> Text,
        created_at -> Timestamp,
    }
}

diesel::table! {
    /// Date/route activations (`link_id` NULL) and rider joins (`link_id`
    /// set).
    calendar (id) {
        id -> BigInt,
        travel_date -> Date,
        route_id -> BigInt,
        link_id -> Nullable<BigInt>,
    }
}

diesel::table! {
    /// Group (route-scoped) and direct (pair-scoped) conversations.
    conversations (id) {
        id -> BigInt,
        title -> Nullable<Text>,
        is_group -> Bool,
        route_id -> Nullable<BigInt>,
        created_at -> Timestamp,
    }
}

diesel::table! {
    /// Conversation membership, one row per (conversation, user).
    conversation_members (conversation_id, user_id) {
        conversation_id -> BigInt,
        user_id -> BigInt,
    }
}

diesel::table! {
    /// Append-only message log.
    messages (id) {
        id -> BigInt,
        conversation_id -> BigInt,
        sender_id -> BigInt,
        body -> Text,
        sent_at -> Timestamp,
    }
}

diesel::joinable!(calendar -> routes (route_id));
diesel::joinable!(calendar -> links (link_id));
diesel::joinable!(links -> users (user_id));
diesel::joinable!(conversation_members -> conversations (conversation_id));
diesel::joinable!(conversation_members -> users (user_id));
diesel::joinable!(messages -> conversations (conversation_id));
diesel::joinable!(messages -> users (sender_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    routes,
    links,
    calendar,
    conversations,
    conversation_members,
    messages,
);
