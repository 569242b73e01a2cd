//! Server assembly: state wiring, session middleware, and route
//! registration shared between the binary and the integration tests.

mod config;

pub use config::AppConfig;

use std::sync::Arc;

use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use mockable::DefaultClock;

use crate::domain::accounts::AccountService;
use crate::domain::calendar::CalendarQueryService;
use crate::domain::conversations::ConversationService;
use crate::domain::messages::MessageService;
use crate::domain::riders::RiderRegistryService;
use crate::domain::routes::RouteCatalogService;
use crate::inbound::http::{auth, conversations, messages, riders, routes, HttpState};
use crate::outbound::persistence::{
    DbPool, DieselCalendarRepository, DieselConversationRepository, DieselMessageRepository,
    DieselRiderRepository, DieselRouteRepository, DieselUserRepository,
};

/// Wire the Diesel adapters into the domain services.
pub fn build_http_state(pool: &DbPool, email_domain: Option<String>) -> HttpState {
    let clock = Arc::new(DefaultClock);
    let routes_repo = Arc::new(DieselRouteRepository::new(pool.clone()));
    let users_repo = Arc::new(DieselUserRepository::new(pool.clone()));

    HttpState {
        accounts: AccountService::new(users_repo.clone(), email_domain),
        catalog: RouteCatalogService::new(routes_repo.clone(), clock.clone()),
        calendar: CalendarQueryService::new(Arc::new(DieselCalendarRepository::new(pool.clone()))),
        riders: RiderRegistryService::new(
            Arc::new(DieselRiderRepository::new(pool.clone())),
            routes_repo,
            clock,
        ),
        conversations: ConversationService::new(
            Arc::new(DieselConversationRepository::new(pool.clone())),
            users_repo,
        ),
        messages: MessageService::new(Arc::new(DieselMessageRepository::new(pool.clone()))),
    }
}

/// Cookie-session middleware carrying the authenticated user id.
pub fn session_middleware(key: Key, cookie_secure: bool) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_same_site(SameSite::Lax)
        .build()
}

/// Register every `/api/v1` endpoint on the given service config.
pub fn api_services(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::register)
        .service(auth::login)
        .service(auth::logout)
        .service(auth::me)
        .service(routes::create_route)
        .service(routes::next_slot)
        .service(routes::active_on_date)
        .service(routes::rider_count)
        .service(routes::riders_on_route)
        .service(riders::join_route)
        .service(routes::update_route)
        .service(routes::delete_route)
        .service(riders::list_riders)
        .service(riders::update_rider)
        .service(riders::delete_rider)
        .service(conversations::ensure_direct)
        .service(conversations::ensure_route_group)
        .service(conversations::list_conversations)
        .service(messages::list_messages)
        .service(messages::post_message);
}
