//! Inbound adapters: the REST API surface.

pub mod http;
