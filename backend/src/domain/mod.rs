//! Domain services, ports, and primitives.
//!
//! Everything in this module is transport agnostic. Inbound adapters map
//! [`Error`] values to HTTP responses; outbound adapters implement the
//! traits in [`ports`].

pub mod accounts;
pub mod calendar;
pub mod conversations;
pub mod error;
pub mod ids;
pub mod messages;
pub mod ports;
pub mod riders;
pub mod routes;

pub use self::error::{Error, ErrorCode};
pub use self::ids::{ConversationId, LinkId, RouteId, UserId};
pub use self::riders::Gender;

/// Convenient result alias for domain operations.
pub type ApiResult<T> = Result<T, Error>;
