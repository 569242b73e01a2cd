//! Inbound adapters exposing the domain over transport protocols.

pub mod http;
