//! End-to-end HTTP flow over the in-memory store: sign up, publish,
//! favourite, shop, share and subscribe.

#[allow(dead_code)]
#[path = "recipes_support/mod.rs"]
mod support;

use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::http::{StatusCode, header};
use actix_web::{test, web};
use recipes::inbound::http::health::HealthState;
use recipes::server::{AppDependencies, SessionCookie, build_app};
use serde_json::{Value, json};
use support::{MemoryWorld, PASSWORD, PNG_URI};

fn dependencies(world: &MemoryWorld) -> AppDependencies {
    AppDependencies {
        health_state: web::Data::new(HealthState::new()),
        http_state: web::Data::new(world.state.clone()),
        session: SessionCookie {
            key: Key::generate(),
            secure: false,
            same_site: SameSite::Lax,
        },
    }
}

fn session_of<B>(res: &actix_web::dev::ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie")
}

macro_rules! call {
    ($app:expr, $req:expr) => {
        test::call_service(&$app, $req.to_request()).await
    };
}

macro_rules! sign_up_and_login {
    ($app:expr, $username:literal) => {{
        let res = call!(
            $app,
            test::TestRequest::post().uri("/api/v1/users").set_json(json!({
                "email": concat!($username, "@example.org"),
                "username": $username,
                "firstName": "Test",
                "lastName": "Cook",
                "password": PASSWORD,
            }))
        );
        assert_eq!(res.status(), StatusCode::CREATED);
        let user: Value = test::read_body_json(res).await;
        let res = call!(
            $app,
            test::TestRequest::post().uri("/api/v1/auth/login").set_json(json!({
                "email": concat!($username, "@example.org"),
                "password": PASSWORD,
            }))
        );
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = session_of(&res);
        (user["id"].as_str().expect("user id").to_owned(), cookie)
    }};
}

#[actix_web::test]
async fn recipe_lifecycle_over_http() {
    let world = MemoryWorld::new();
    let flour = world.ingredient("flour", "g").await;
    let sugar = world.ingredient("sugar", "g").await;
    let dessert = world.tag("Dessert", "dessert").await;
    let app = test::init_service(build_app(dependencies(&world))).await;

    let (cook_id, cook) = sign_up_and_login!(app, "cook");
    let (_, fan) = sign_up_and_login!(app, "fan");

    // publish
    let res = call!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/recipes")
            .cookie(cook.clone())
            .set_json(json!({
                "name": "Cake",
                "text": "Mix and bake.",
                "cookingTime": 40,
                "image": PNG_URI,
                "ingredients": [
                    {"id": flour.id.get(), "amount": 250},
                    {"id": sugar.id.get(), "amount": 100}
                ],
                "tags": [dessert.id.get()]
            }))
    );
    assert_eq!(res.status(), StatusCode::CREATED);
    let recipe: Value = test::read_body_json(res).await;
    let recipe_id = recipe["id"].as_i64().expect("recipe id");
    assert_eq!(world.images.len(), 1);

    // browse anonymously
    let res = call!(
        app,
        test::TestRequest::get().uri("/api/v1/recipes?tags=dessert&limit=1")
    );
    assert_eq!(res.status(), StatusCode::OK);
    let page: Value = test::read_body_json(res).await;
    assert_eq!(page["count"], 1);
    assert_eq!(page["results"][0]["author"]["id"], cook_id.as_str());
    assert_eq!(page["results"][0]["isFavorited"], false);

    // favourite and shop
    for list in ["favorite", "shopping_cart"] {
        let res = call!(
            app,
            test::TestRequest::post()
                .uri(&format!("/api/v1/recipes/{recipe_id}/{list}"))
                .cookie(fan.clone())
        );
        assert_eq!(res.status(), StatusCode::CREATED, "{list}");
    }
    let res = call!(
        app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/recipes/{recipe_id}"))
            .cookie(fan.clone())
    );
    let seen: Value = test::read_body_json(res).await;
    assert_eq!(seen["isFavorited"], true);
    assert_eq!(seen["isInShoppingCart"], true);

    let res = call!(
        app,
        test::TestRequest::get()
            .uri("/api/v1/recipes/download_shopping_cart")
            .cookie(fan.clone())
    );
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key(header::ETAG));
    let body = test::read_body(res).await;
    assert_eq!(&body[..], b"flour (g) - 250\nsugar (g) - 100\n");

    // share
    let res = call!(
        app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/recipes/{recipe_id}/get-link"))
            .insert_header((header::HOST, "cook.example"))
    );
    let link: Value = test::read_body_json(res).await;
    let link = link["short-link"].as_str().expect("short link").to_owned();
    let path = link
        .strip_prefix("http://cook.example")
        .expect("link on request host");
    let res = call!(app, test::TestRequest::get().uri(path));
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(
        res.headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok()),
        Some(format!("/recipes/{recipe_id}/").as_str())
    );

    // subscribe
    let res = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/users/{cook_id}/subscribe?recipes_limit=1"))
            .cookie(fan.clone())
    );
    assert_eq!(res.status(), StatusCode::CREATED);
    let res = call!(
        app,
        test::TestRequest::get()
            .uri("/api/v1/users/subscriptions")
            .cookie(fan.clone())
    );
    let subscriptions: Value = test::read_body_json(res).await;
    assert_eq!(subscriptions["count"], 1);
    assert_eq!(subscriptions["results"][0]["recipesCount"], 1);
    assert_eq!(subscriptions["results"][0]["isSubscribed"], true);

    // the author deletes; memberships go with it
    let res = call!(
        app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/recipes/{recipe_id}"))
            .cookie(cook)
    );
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(world.images.is_empty());
    let res = call!(
        app,
        test::TestRequest::get()
            .uri("/api/v1/recipes/download_shopping_cart")
            .cookie(fan)
    );
    assert!(test::read_body(res).await.is_empty());
}

#[actix_web::test]
async fn errors_carry_trace_ids() {
    let world = MemoryWorld::new();
    let app = test::init_service(build_app(dependencies(&world))).await;

    let res = call!(app, test::TestRequest::get().uri("/api/v1/users/me"));
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let header_id = res
        .headers()
        .get(recipes::domain::TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("trace id header");
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "unauthorized");
    assert_eq!(body["traceId"], header_id.as_str());
}

#[actix_web::test]
async fn health_probes_report_ready() {
    let world = MemoryWorld::new();
    let deps = dependencies(&world);
    deps.health_state.mark_ready();
    let app = test::init_service(build_app(deps)).await;

    for probe in ["/health/ready", "/health/live"] {
        let res = call!(app, test::TestRequest::get().uri(probe));
        assert_eq!(res.status(), StatusCode::OK, "{probe}");
    }
}
