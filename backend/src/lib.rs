//! RouteLink backend library.
//!
//! Coordinates campus commuters: riders advertise or join a scheduled trip
//! on a calendar date, and matches are promoted into persistent group
//! conversations. The crate is organised hexagonally:
//!
//! - [`domain`]: services, ports, and the error taxonomy (transport
//!   agnostic).
//! - [`outbound`]: Diesel/SQLite persistence adapters implementing the
//!   domain ports.
//! - [`inbound`]: the Actix Web HTTP adapter mapping requests onto domain
//!   services.
//! - [`middleware`]: request-scoped tracing.
//! - [`doc`]: the OpenAPI document.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use middleware::trace::Trace;
