//! Shared HTTP adapter state.
//!
//! Handlers accept this bundle via `actix_web::web::Data`, so they depend
//! only on domain services and stay testable without a real server.

use crate::domain::accounts::AccountService;
use crate::domain::calendar::CalendarQueryService;
use crate::domain::conversations::ConversationService;
use crate::domain::messages::MessageService;
use crate::domain::riders::RiderRegistryService;
use crate::domain::routes::RouteCatalogService;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: AccountService,
    pub catalog: RouteCatalogService,
    pub calendar: CalendarQueryService,
    pub riders: RiderRegistryService,
    pub conversations: ConversationService,
    pub messages: MessageService,
}
