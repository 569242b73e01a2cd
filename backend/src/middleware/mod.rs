//! Request-level middleware.

pub mod trace;
