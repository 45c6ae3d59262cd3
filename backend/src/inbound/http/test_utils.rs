//! Shared fixtures for HTTP handler tests.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::ServiceResponse;
use mockable::DefaultClock;

use crate::domain::ports::{
    IngredientRepository, LoginService, PasswordHasher, SeededShortCodes, TagRepository,
    UserRepository,
};
use crate::domain::{Ingredient, IngredientDraft, PasswordHash, Tag, TagDraft, User, test_fixtures};
use crate::inbound::http::state::HttpState;
use crate::outbound::media::InMemoryImageStore;
use crate::outbound::memory::InMemoryStore;
use crate::outbound::security::Argon2PasswordHasher;
use crate::server::{Collaborators, SessionCookie, memory_http_state};

/// Password of every seeded user.
pub(crate) const PASSWORD: &str = "correct horse battery";

/// Session middleware with a throwaway key and an insecure cookie.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Cookie settings matching [`test_session_middleware`].
pub(crate) fn test_session_cookie() -> SessionCookie {
    SessionCookie {
        key: Key::generate(),
        secure: false,
        same_site: SameSite::Lax,
    }
}

/// The `session` cookie set on a response, if any.
pub(crate) fn session_cookie<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

fn cheap_hasher() -> Argon2PasswordHasher {
    Argon2PasswordHasher::with_cost(8, 1).expect("valid argon2 cost")
}

/// In-memory adapters plus helpers to seed them.
#[derive(Clone, Default)]
pub(crate) struct TestWorld {
    pub(crate) store: InMemoryStore,
    pub(crate) images: InMemoryImageStore,
}

impl TestWorld {
    pub(crate) fn collaborators(&self) -> Collaborators {
        Collaborators {
            images: Arc::new(self.images.clone()),
            hasher: Arc::new(cheap_hasher()),
            short_codes: Arc::new(SeededShortCodes::new(7)),
            clock: Arc::new(DefaultClock),
        }
    }

    pub(crate) fn state(&self) -> HttpState {
        memory_http_state(&self.store, self.collaborators())
    }

    async fn insert(&self, user: User) -> User {
        let hash: PasswordHash = cheap_hasher().hash(PASSWORD).expect("hash");
        UserRepository::insert(&self.store, &user, &hash)
            .await.expect("seed user");
        user
    }

    pub(crate) async fn user(&self, username: &str) -> User {
        self.insert(test_fixtures::user(username)).await
    }

    pub(crate) async fn staff(&self, username: &str) -> User {
        self.insert(test_fixtures::staff(username)).await
    }

    pub(crate) async fn ingredient(&self, name: &str, unit: &str) -> Ingredient {
        let draft = IngredientDraft::validate(Some(name.to_owned()), Some(unit.to_owned()))
            .expect("valid ingredient");
        IngredientRepository::create(&self.store, &draft)
            .await
            .expect("seed ingredient")
    }

    pub(crate) async fn tag(&self, name: &str, slug: &str) -> Tag {
        let draft =
            TagDraft::validate(Some(name.to_owned()), Some(slug.to_owned())).expect("valid tag");
        TagRepository::create(&self.store, &draft)
            .await
            .expect("seed tag")
    }
}

/// Memory-backed [`HttpState`] with optional port overrides.
pub(crate) struct StateBuilder {
    state: HttpState,
}

impl StateBuilder {
    pub(crate) fn memory() -> Self {
        Self {
            state: TestWorld::default().state(),
        }
    }

    pub(crate) fn login(mut self, login: Arc<dyn LoginService>) -> Self {
        self.state.login = login;
        self
    }

    pub(crate) fn build(self) -> HttpState {
        self.state
    }
}

/// Full application over a [`TestWorld`], as served in production.
macro_rules! world_app {
    ($world:expr) => {
        actix_web::test::init_service($crate::server::build_app(
            $crate::server::AppDependencies {
                health_state: actix_web::web::Data::new(
                    $crate::inbound::http::health::HealthState::new(),
                ),
                http_state: actix_web::web::Data::new($world.state()),
                session: $crate::inbound::http::test_utils::test_session_cookie(),
            },
        ))
        .await
    };
}
pub(crate) use world_app;

/// Log `username` in and return the session cookie.
macro_rules! login_as {
    ($app:expr, $user:expr) => {{
        let req = actix_web::test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(serde_json::json!({
                "email": $user.email.to_string(),
                "password": $crate::inbound::http::test_utils::PASSWORD,
            }))
            .to_request();
        let res = actix_web::test::call_service(&$app, req).await;
        assert_eq!(res.status(), actix_web::http::StatusCode::OK, "login failed");
        $crate::inbound::http::test_utils::session_cookie(&res).expect("session cookie")
    }};
}
pub(crate) use login_as;
