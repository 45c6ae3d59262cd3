//! Inputs needed to start the HTTP server.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};

use crate::inbound::http::session_config::SessionSettings;
use crate::inbound::http::state::HttpState;

/// Cookie settings applied by the session middleware.
#[derive(Clone)]
pub struct SessionCookie {
    pub key: Key,
    pub secure: bool,
    pub same_site: SameSite,
}

impl From<SessionSettings> for SessionCookie {
    fn from(settings: SessionSettings) -> Self {
        Self {
            key: settings.key,
            secure: settings.cookie_secure,
            same_site: settings.same_site,
        }
    }
}

/// Everything [`super::create_server`] needs.
pub struct ServerConfig {
    pub(crate) session: SessionCookie,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) http_state: HttpState,
}

impl ServerConfig {
    #[must_use]
    pub fn new(session: SessionCookie, bind_addr: SocketAddr, http_state: HttpState) -> Self {
        Self {
            session,
            bind_addr,
            http_state,
        }
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
