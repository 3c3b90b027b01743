//! Domain entities, services and repository ports.
//!
//! Types here are transport and storage agnostic. Inbound adapters parse
//! requests into them; outbound adapters persist them. Serialisation
//! contracts (serde, camelCase) are documented on each type.

pub mod appointment;
pub mod category;
pub mod dashboard_service;
pub mod error;
pub mod event;
pub mod event_service;
pub mod message;
pub mod notification;
pub mod ports;
pub mod progress;
pub mod reading_list;
pub mod resource;
pub mod review;
pub mod review_service;
pub mod stats;
pub mod therapist;
pub mod user;

pub use self::dashboard_service::DashboardService;
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::event_service::EventService;
pub use self::review_service::ReviewService;
pub use self::user::{User, UserRole, Viewer};

/// Convenient result alias for fallible domain operations.
pub type ApiResult<T> = Result<T, Error>;
