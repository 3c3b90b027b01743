//! HTTP server configuration object.

use std::net::SocketAddr;

use actix_web::cookie::Key;
use backend::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a server configuration.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            bind_addr,
            db_pool: None,
        }
    }

    /// Attach a database connection pool for the persistence adapters.
    ///
    /// Without a pool the server falls back to the in-memory store, which is
    /// suitable for demos and tests only.
    #[must_use]
    pub fn with_db_pool(mut self, pool: Option<DbPool>) -> Self {
        self.db_pool = pool;
        self
    }
}
