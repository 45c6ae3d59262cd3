//! Public short links that redirect to a recipe page.

use actix_web::http::header;
use actix_web::{HttpResponse, get, web};

use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Path prefix under which short codes are served.
pub const SHORT_LINK_PREFIX: &str = "/s/";

/// Redirect `/s/{code}` to the recipe it names.
#[utoipa::path(
    get,
    path = "/s/{code}",
    params(("code" = String, Path, description = "Ten-character short code")),
    responses(
        (status = 302, description = "Redirect to the recipe page",
            headers(("Location" = String, description = "/recipes/{id}/"))),
        (status = 404, description = "Unknown code", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "followShortLink",
    security([])
)]
#[get("/s/{code}")]
pub async fn follow_short_link(
    state: web::Data<HttpState>,
    code: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = state.recipe_query.resolve(&code).await?;
    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, format!("/recipes/{id}/")))
        .finish())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;

    use super::*;
    use crate::domain::{Error, RecipeId};
    use crate::domain::ports::MockRecipeQuery;
    use crate::inbound::http::test_utils::StateBuilder;

    async fn call(query: MockRecipeQuery, uri: &str) -> actix_web::dev::ServiceResponse {
        let mut state = StateBuilder::memory().build();
        state.recipe_query = Arc::new(query);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(follow_short_link),
        )
        .await;
        test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await
    }

    #[rstest]
    #[actix_web::test]
    async fn known_code_redirects_to_the_recipe() {
        let mut query = MockRecipeQuery::new();
        query
            .expect_resolve()
            .withf(|code| code == "AbCdE12345")
            .returning(|_| Ok(RecipeId::new(42)));
        let res = call(query, "/s/AbCdE12345").await;
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(
            res.headers()
                .get(header::LOCATION)
                .and_then(|value| value.to_str().ok()),
            Some("/recipes/42/")
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn unknown_code_is_not_found() {
        let mut query = MockRecipeQuery::new();
        query
            .expect_resolve()
            .returning(|code| Err(Error::not_found(format!("no recipe for {code}"))));
        let res = call(query, "/s/nope").await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
