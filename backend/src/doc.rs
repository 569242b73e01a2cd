//! OpenAPI documentation for the REST API.
//!
//! Aggregates the handler annotations into a single document, served as
//! JSON in debug builds and available to external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

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
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "RouteLink backend API",
        description = "Campus commute matching: routes, date-scoped joins, and \
                       match-derived conversations."
    ),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::me,
        crate::inbound::http::routes::create_route,
        crate::inbound::http::routes::next_slot,
        crate::inbound::http::routes::active_on_date,
        crate::inbound::http::routes::rider_count,
        crate::inbound::http::routes::riders_on_route,
        crate::inbound::http::routes::update_route,
        crate::inbound::http::routes::delete_route,
        crate::inbound::http::riders::join_route,
        crate::inbound::http::riders::list_riders,
        crate::inbound::http::riders::update_rider,
        crate::inbound::http::riders::delete_rider,
        crate::inbound::http::conversations::ensure_direct,
        crate::inbound::http::conversations::ensure_route_group,
        crate::inbound::http::conversations::list_conversations,
        crate::inbound::http::messages::list_messages,
        crate::inbound::http::messages::post_message,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        crate::domain::Error,
        crate::domain::ErrorCode,
        crate::domain::Gender,
        crate::domain::UserId,
        crate::domain::RouteId,
        crate::domain::LinkId,
        crate::domain::ConversationId,
        crate::domain::routes::RouteSummary,
        crate::domain::riders::RiderRecord,
        crate::domain::conversations::ConversationSummary,
        crate::domain::messages::MessageRecord,
    )),
    tags(
        (name = "accounts", description = "Registration and session boundary"),
        (name = "routes", description = "Route catalogue and calendar"),
        (name = "riders", description = "Rider links"),
        (name = "conversations", description = "Conversation provisioning"),
        (name = "messages", description = "Per-conversation message log"),
        (name = "health", description = "Probes")
    )
)]
pub struct ApiDoc;
