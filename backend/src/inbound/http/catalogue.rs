//! Tags and ingredients.
//!
//! Reads are public. Writes require a staff session.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{IngredientId, TagId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::dto::{IngredientRequest, IngredientResponse, TagRequest, TagResponse};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Every tag, ordered by id. Not paginated.
#[utoipa::path(
    get,
    path = "/api/v1/tags",
    responses((status = 200, description = "Tags", body = [TagResponse])),
    tags = ["catalogue"],
    operation_id = "listTags",
    security([])
)]
#[get("/tags")]
pub async fn list_tags(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<TagResponse>>> {
    let tags = state.catalogue_query.tags().await?;
    Ok(web::Json(tags.into_iter().map(TagResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/tags/{id}",
    params(("id" = i64, Path, description = "Tag id")),
    responses(
        (status = 200, description = "Tag", body = TagResponse),
        (status = 404, description = "Unknown tag", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "getTag",
    security([])
)]
#[get("/tags/{id}")]
pub async fn get_tag(
    state: web::Data<HttpState>,
    path: web::Path<TagId>,
) -> ApiResult<web::Json<TagResponse>> {
    let tag = state.catalogue_query.tag(path.into_inner()).await?;
    Ok(web::Json(tag.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/tags",
    request_body = TagRequest,
    responses(
        (status = 201, description = "Created", body = TagResponse),
        (status = 400, description = "Invalid tag", body = ErrorSchema),
        (status = 403, description = "Staff only", body = ErrorSchema),
        (status = 409, description = "Slug taken", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "createTag"
)]
#[post("/tags")]
pub async fn create_tag(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<TagRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let TagRequest { name, slug } = payload.into_inner();
    let tag = state.catalogue.create_tag(&actor, name, slug).await?;
    Ok(HttpResponse::Created().json(TagResponse::from(tag)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/tags/{id}",
    params(("id" = i64, Path, description = "Tag id")),
    request_body = TagRequest,
    responses(
        (status = 200, description = "Updated", body = TagResponse),
        (status = 403, description = "Staff only", body = ErrorSchema),
        (status = 404, description = "Unknown tag", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "updateTag"
)]
#[patch("/tags/{id}")]
pub async fn update_tag(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<TagId>,
    payload: web::Json<TagRequest>,
) -> ApiResult<web::Json<TagResponse>> {
    let actor = session.require_user_id()?;
    let tag = state
        .catalogue
        .update_tag(&actor, path.into_inner(), payload.into_inner().into())
        .await?;
    Ok(web::Json(tag.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/tags/{id}",
    params(("id" = i64, Path, description = "Tag id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Staff only", body = ErrorSchema),
        (status = 404, description = "Unknown tag", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "deleteTag"
)]
#[delete("/tags/{id}")]
pub async fn delete_tag(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<TagId>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    state.catalogue.delete_tag(&actor, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// `GET /api/v1/ingredients` query.
#[derive(Debug, Deserialize, IntoParams)]
pub struct IngredientSearch {
    /// Case-insensitive name prefix.
    pub name: Option<String>,
}

/// Ingredients ordered by name, optionally filtered by name prefix.
#[utoipa::path(
    get,
    path = "/api/v1/ingredients",
    params(IngredientSearch),
    responses((status = 200, description = "Ingredients", body = [IngredientResponse])),
    tags = ["catalogue"],
    operation_id = "listIngredients",
    security([])
)]
#[get("/ingredients")]
pub async fn list_ingredients(
    state: web::Data<HttpState>,
    query: web::Query<IngredientSearch>,
) -> ApiResult<web::Json<Vec<IngredientResponse>>> {
    let prefix = query.into_inner().name.filter(|name| !name.trim().is_empty());
    let ingredients = state.catalogue_query.ingredients(prefix).await?;
    Ok(web::Json(
        ingredients.into_iter().map(IngredientResponse::from).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/ingredients/{id}",
    params(("id" = i64, Path, description = "Ingredient id")),
    responses(
        (status = 200, description = "Ingredient", body = IngredientResponse),
        (status = 404, description = "Unknown ingredient", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "getIngredient",
    security([])
)]
#[get("/ingredients/{id}")]
pub async fn get_ingredient(
    state: web::Data<HttpState>,
    path: web::Path<IngredientId>,
) -> ApiResult<web::Json<IngredientResponse>> {
    let ingredient = state.catalogue_query.ingredient(path.into_inner()).await?;
    Ok(web::Json(ingredient.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/ingredients",
    request_body = IngredientRequest,
    responses(
        (status = 201, description = "Created", body = IngredientResponse),
        (status = 400, description = "Invalid ingredient", body = ErrorSchema),
        (status = 403, description = "Staff only", body = ErrorSchema),
        (status = 409, description = "Name and unit already exist", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "createIngredient"
)]
#[post("/ingredients")]
pub async fn create_ingredient(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<IngredientRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let IngredientRequest {
        name,
        measurement_unit,
    } = payload.into_inner();
    let ingredient = state
        .catalogue
        .create_ingredient(&actor, name, measurement_unit)
        .await?;
    Ok(HttpResponse::Created().json(IngredientResponse::from(ingredient)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/ingredients/{id}",
    params(("id" = i64, Path, description = "Ingredient id")),
    request_body = IngredientRequest,
    responses(
        (status = 200, description = "Updated", body = IngredientResponse),
        (status = 403, description = "Staff only", body = ErrorSchema),
        (status = 404, description = "Unknown ingredient", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "updateIngredient"
)]
#[patch("/ingredients/{id}")]
pub async fn update_ingredient(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<IngredientId>,
    payload: web::Json<IngredientRequest>,
) -> ApiResult<web::Json<IngredientResponse>> {
    let actor = session.require_user_id()?;
    let ingredient = state
        .catalogue
        .update_ingredient(&actor, path.into_inner(), payload.into_inner().into())
        .await?;
    Ok(web::Json(ingredient.into()))
}

/// Delete an ingredient; `409` while any recipe uses it.
#[utoipa::path(
    delete,
    path = "/api/v1/ingredients/{id}",
    params(("id" = i64, Path, description = "Ingredient id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Staff only", body = ErrorSchema),
        (status = 404, description = "Unknown ingredient", body = ErrorSchema),
        (status = 409, description = "Used by a recipe", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "deleteIngredient"
)]
#[delete("/ingredients/{id}")]
pub async fn delete_ingredient(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<IngredientId>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    state
        .catalogue
        .delete_ingredient(&actor, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{TestWorld, login_as, world_app};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[actix_web::test]
    async fn lists_are_public_and_ordered() {
        let world = TestWorld::default();
        world.tag("Lunch", "lunch").await;
        world.tag("Breakfast", "breakfast").await;
        world.ingredient("sugar", "g").await;
        world.ingredient("salt", "g").await;
        world.ingredient("flour", "kg").await;
        let app = world_app!(world);

        let res = test::call_service(&app, test::TestRequest::get().uri("/api/v1/tags").to_request())
            .await;
        let tags: Vec<TagResponse> = test::read_body_json(res).await;
        let slugs: Vec<_> = tags.iter().map(|tag| tag.slug.as_str()).collect();
        assert_eq!(slugs, ["lunch", "breakfast"]);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/ingredients?name=S")
                .to_request(),
        )
        .await;
        let ingredients: Vec<IngredientResponse> = test::read_body_json(res).await;
        let names: Vec<_> = ingredients.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["salt", "sugar"]);
    }

    #[rstest]
    #[case("/api/v1/tags/999")]
    #[case("/api/v1/tags/abc")]
    #[case("/api/v1/ingredients/999")]
    #[actix_web::test]
    async fn unknown_entries_are_not_found(#[case] uri: &str) {
        let world = TestWorld::default();
        let app = world_app!(world);
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[actix_web::test]
    async fn writes_require_staff() {
        let world = TestWorld::default();
        let cook = world.user("cook").await;
        let admin = world.staff("admin").await;
        let app = world_app!(world);
        let body = json!({"name": "Dinner", "slug": "dinner"});

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/tags")
                .set_json(&body)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let cookie = login_as!(app, cook);
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/tags")
                .cookie(cookie)
                .set_json(&body)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let cookie = login_as!(app, admin);
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/tags")
                .cookie(cookie.clone())
                .set_json(&body)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created: TagResponse = test::read_body_json(res).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/tags")
                .cookie(cookie.clone())
                .set_json(&body)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CONFLICT);

        let res = test::call_service(
            &app,
            test::TestRequest::patch()
                .uri(&format!("/api/v1/tags/{}", created.id))
                .cookie(cookie.clone())
                .set_json(json!({"name": "Supper"}))
                .to_request(),
        )
        .await;
        let updated: TagResponse = test::read_body_json(res).await;
        assert_eq!((updated.name.as_str(), updated.slug.as_str()), ("Supper", "dinner"));

        let res = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&format!("/api/v1/tags/{}", created.id))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[rstest]
    #[actix_web::test]
    async fn ingredient_validation_reports_fields() {
        let world = TestWorld::default();
        let admin = world.staff("admin").await;
        let app = world_app!(world);
        let cookie = login_as!(app, admin);
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/ingredients")
                .cookie(cookie)
                .set_json(json!({"name": "flour"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["violations"][0]["field"], "measurementUnit");
    }
}
