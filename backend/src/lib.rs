//! Backend library for the therapy-booking platform.
//!
//! Layering follows ports-and-adapters: `domain` holds entities, services
//! and repository traits; `inbound::http` exposes them over REST; `outbound`
//! persists them (PostgreSQL via Diesel, or in memory when no database is
//! configured).

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

pub use doc::ApiDoc;
pub use middleware::Trace;
