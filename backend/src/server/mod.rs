//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{ServerConfig, SessionCookie};
pub use state_builders::{
    Collaborators, Repositories, build_http_state, diesel_http_state, memory_http_state,
};

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use crate::Trace;
#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::error::{json_config, path_config, query_config};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{auth, catalogue, recipes, short_links, users};

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "session";

/// Per-worker application inputs.
#[derive(Clone)]
pub struct AppDependencies {
    pub health_state: web::Data<HealthState>,
    pub http_state: web::Data<HttpState>,
    pub session: SessionCookie,
}

/// Route table shared by the server and the HTTP integration tests.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        session,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), session.key)
        .cookie_name(SESSION_COOKIE_NAME.into())
        .cookie_path("/".into())
        .cookie_secure(session.secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(session.same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    // Literal segments are registered before `{id}` captures.
    let api = web::scope("/api/v1")
        .wrap(session)
        .service(auth::login)
        .service(auth::logout)
        .service(users::register)
        .service(users::list_users)
        .service(users::current_user)
        .service(users::set_avatar)
        .service(users::delete_avatar)
        .service(users::set_password)
        .service(users::subscriptions)
        .service(users::get_user)
        .service(users::subscribe)
        .service(users::unsubscribe)
        .service(catalogue::list_tags)
        .service(catalogue::get_tag)
        .service(catalogue::create_tag)
        .service(catalogue::update_tag)
        .service(catalogue::delete_tag)
        .service(catalogue::list_ingredients)
        .service(catalogue::get_ingredient)
        .service(catalogue::create_ingredient)
        .service(catalogue::update_ingredient)
        .service(catalogue::delete_ingredient)
        .service(recipes::download_shopping_cart)
        .service(recipes::list_recipes)
        .service(recipes::create_recipe)
        .service(recipes::get_recipe)
        .service(recipes::update_recipe)
        .service(recipes::delete_recipe)
        .service(recipes::get_link)
        .service(recipes::add_favorite)
        .service(recipes::remove_favorite)
        .service(recipes::add_to_cart)
        .service(recipes::remove_from_cart);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .wrap(Trace)
        .service(api)
        .service(short_links::follow_short_link)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Bind and start the HTTP server, marking the health state ready.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        session,
        bind_addr,
        http_state,
    } = config;
    let http_state = web::Data::new(http_state);
    let deps = AppDependencies {
        health_state: health_state.clone(),
        http_state,
        session,
    };

    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(bind_addr)?
        .run();

    health_state.mark_ready();
    tracing::info!(%bind_addr, "server listening");
    Ok(server)
}
