//! Cookie session access for handlers.
//!
//! Handlers see the session only through [`SessionContext`], which stores
//! and reads the authenticated [`UserId`].

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Session wrapper exposing user-level operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store the authenticated user, rotating the session id.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id.as_ref())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Current user, if any. A tampered id is treated as anonymous.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let raw = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(raw.and_then(|raw| match UserId::new(&raw) {
            Ok(id) => Some(id),
            Err(error) => {
                tracing::warn!(%error, "invalid user id in session cookie");
                None
            }
        }))
    }

    /// Current user or `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("authentication credentials were not provided"))
    }

    /// Forget the session entirely; the cookie is removed on response.
    pub fn purge(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    const USER: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    async fn login(session: SessionContext) -> Result<HttpResponse, Error> {
        session.persist_user(&UserId::new(USER).expect("fixture id"))?;
        Ok(HttpResponse::Ok().finish())
    }

    async fn whoami(session: SessionContext) -> Result<HttpResponse, Error> {
        let id = session.require_user_id()?;
        Ok(HttpResponse::Ok().body(id.to_string()))
    }

    async fn logout(session: SessionContext) -> HttpResponse {
        session.purge();
        HttpResponse::NoContent().finish()
    }

    async fn tamper(session: Session) -> HttpResponse {
        match session.insert(USER_ID_KEY, "not-a-uuid") {
            Ok(()) => HttpResponse::Ok().finish(),
            Err(_) => HttpResponse::InternalServerError().finish(),
        }
    }

    macro_rules! session_app {
        () => {
            test::init_service(
                App::new()
                    .wrap(test_session_middleware())
                    .route("/login", web::post().to(login))
                    .route("/whoami", web::get().to(whoami))
                    .route("/logout", web::post().to(logout))
                    .route("/tamper", web::post().to(tamper)),
            )
            .await
        };
    }

    #[rstest]
    #[actix_web::test]
    async fn round_trips_user_id() {
        let app = session_app!();
        let res = test::call_service(&app, test::TestRequest::post().uri("/login").to_request())
            .await;
        let cookie = session_cookie(&res).expect("session cookie set");

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/whoami").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, USER);
    }

    #[rstest]
    #[actix_web::test]
    async fn anonymous_requests_are_unauthorised() {
        let app = session_app!();
        let res =
            test::call_service(&app, test::TestRequest::get().uri("/whoami").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn tampered_user_id_is_unauthorised() {
        let app = session_app!();
        let res = test::call_service(&app, test::TestRequest::post().uri("/tamper").to_request())
            .await;
        let cookie = session_cookie(&res).expect("session cookie set");
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/whoami").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn purge_removes_the_cookie() {
        let app = session_app!();
        let res = test::call_service(&app, test::TestRequest::post().uri("/login").to_request())
            .await;
        let cookie = session_cookie(&res).expect("session cookie set");
        let res = test::call_service(
            &app,
            test::TestRequest::post().uri("/logout").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        let removal = session_cookie(&res).expect("removal cookie");
        assert!(removal.value().is_empty());
    }
}
