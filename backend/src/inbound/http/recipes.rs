//! Recipes, favorites, the shopping cart and short links.
//!
//! ```text
//! GET    /api/v1/recipes?tags=&author=&is_favorited=&is_in_shopping_cart=
//! POST   /api/v1/recipes
//! GET    /api/v1/recipes/{id}/get-link
//! POST   /api/v1/recipes/{id}/favorite
//! GET    /api/v1/recipes/download_shopping_cart
//! ```

use actix_web::http::header::{
    self, ContentDisposition, DispositionParam, DispositionType, EntityTag,
};
use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, web};
use pagination::Paginated;
use sha2::{Digest, Sha256};

use crate::domain::RecipeId;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::dto::{
    PaginatedSchema, RecipeRequest, RecipeResponse, RecipeSummaryResponse, ShortLinkResponse,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::short_links::SHORT_LINK_PREFIX;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::QueryParams;

const SHOPPING_LIST_FILENAME: &str = "shopping_list.txt";

/// Recipes newest first, filtered and paginated.
#[utoipa::path(
    get,
    path = "/api/v1/recipes",
    params(
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("limit" = Option<u32>, Query, description = "Page size, default 6, at most 100"),
        ("tags" = Option<Vec<String>>, Query, description = "Tag slugs; any match qualifies"),
        ("author" = Option<String>, Query, description = "Author id or `me`"),
        ("is_favorited" = Option<String>, Query, description = "1|0|true|false"),
        ("is_in_shopping_cart" = Option<String>, Query, description = "1|0|true|false")
    ),
    responses(
        (status = 200, description = "Recipes", body = PaginatedSchema<RecipeResponse>),
        (status = 400, description = "Invalid filter", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "listRecipes",
    security([])
)]
#[get("/recipes")]
pub async fn list_recipes(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
) -> ApiResult<web::Json<Paginated<RecipeResponse>>> {
    let viewer = session.user_id()?;
    let params = QueryParams::parse(req.query_string());
    let filter = params.recipe_filter()?;
    let request = params.page_request()?;
    let page = state.recipe_query.list(viewer, &filter, request).await?;
    Ok(web::Json(Paginated::from_page(
        page.map(RecipeResponse::from),
        &req.full_url(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/recipes",
    request_body = RecipeRequest,
    responses(
        (status = 201, description = "Created", body = RecipeResponse),
        (status = 400, description = "Invalid recipe", body = ErrorSchema),
        (status = 401, description = "Not logged in", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "createRecipe"
)]
#[post("/recipes")]
pub async fn create_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RecipeRequest>,
) -> ApiResult<HttpResponse> {
    let author = session.require_user_id()?;
    let details = state
        .recipes
        .create(&author, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(RecipeResponse::from(details)))
}

#[utoipa::path(
    get,
    path = "/api/v1/recipes/{id}",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe", body = RecipeResponse),
        (status = 404, description = "Unknown recipe", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "getRecipe",
    security([])
)]
#[get("/recipes/{id}")]
pub async fn get_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<RecipeId>,
) -> ApiResult<web::Json<RecipeResponse>> {
    let viewer = session.user_id()?;
    let details = state.recipe_query.get(viewer, path.into_inner()).await?;
    Ok(web::Json(details.into()))
}

/// Replace a recipe's content. Without an image the stored one is kept.
#[utoipa::path(
    patch,
    path = "/api/v1/recipes/{id}",
    params(("id" = i64, Path, description = "Recipe id")),
    request_body = RecipeRequest,
    responses(
        (status = 200, description = "Updated", body = RecipeResponse),
        (status = 400, description = "Invalid recipe", body = ErrorSchema),
        (status = 403, description = "Not the author", body = ErrorSchema),
        (status = 404, description = "Unknown recipe", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "updateRecipe"
)]
#[patch("/recipes/{id}")]
pub async fn update_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<RecipeId>,
    payload: web::Json<RecipeRequest>,
) -> ApiResult<web::Json<RecipeResponse>> {
    let actor = session.require_user_id()?;
    let details = state
        .recipes
        .update(&actor, path.into_inner(), payload.into_inner().into())
        .await?;
    Ok(web::Json(details.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/recipes/{id}",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the author", body = ErrorSchema),
        (status = 404, description = "Unknown recipe", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "deleteRecipe"
)]
#[delete("/recipes/{id}")]
pub async fn delete_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<RecipeId>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    state.recipes.delete(&actor, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Absolute short link for sharing.
#[utoipa::path(
    get,
    path = "/api/v1/recipes/{id}/get-link",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Short link", body = ShortLinkResponse),
        (status = 404, description = "Unknown recipe", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "getRecipeLink",
    security([])
)]
#[get("/recipes/{id}/get-link")]
pub async fn get_link(
    state: web::Data<HttpState>,
    path: web::Path<RecipeId>,
    req: HttpRequest,
) -> ApiResult<web::Json<ShortLinkResponse>> {
    let code = state.recipe_query.short_link(path.into_inner()).await?;
    let info = req.connection_info();
    Ok(web::Json(ShortLinkResponse {
        short_link: format!(
            "{}://{}{SHORT_LINK_PREFIX}{code}",
            info.scheme(),
            info.host()
        ),
    }))
}

/// Aggregated ingredients of every recipe in the cart as a text file.
#[utoipa::path(
    get,
    path = "/api/v1/recipes/download_shopping_cart",
    responses(
        (status = 200, description = "Shopping list", content_type = "text/plain", body = String,
            headers(("ETag" = String, description = "SHA-256 of the body"))),
        (status = 304, description = "Unchanged since the given ETag"),
        (status = 401, description = "Not logged in", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "downloadShoppingCart"
)]
#[get("/recipes/download_shopping_cart")]
pub async fn download_shopping_cart(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
) -> ApiResult<HttpResponse> {
    let me = session.require_user_id()?;
    let body = state.recipe_query.shopping_list(&me).await?.render();
    let etag = EntityTag::new_strong(hex::encode(Sha256::digest(body.as_bytes())));

    let unchanged = req
        .headers()
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| raw.parse::<EntityTag>().ok())
        .is_some_and(|given| given.strong_eq(&etag));
    if unchanged {
        return Ok(HttpResponse::NotModified()
            .insert_header(header::ETag(etag))
            .finish());
    }

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(SHOPPING_LIST_FILENAME.to_owned())],
        })
        .insert_header(header::ETag(etag))
        .body(body))
}

#[utoipa::path(
    post,
    path = "/api/v1/recipes/{id}/favorite",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 201, description = "Added to favorites", body = RecipeSummaryResponse),
        (status = 401, description = "Not logged in", body = ErrorSchema),
        (status = 404, description = "Unknown recipe", body = ErrorSchema),
        (status = 409, description = "Already in favorites", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "addFavorite"
)]
#[post("/recipes/{id}/favorite")]
pub async fn add_favorite(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<RecipeId>,
) -> ApiResult<HttpResponse> {
    let me = session.require_user_id()?;
    let summary = state.relationships.add_favorite(&me, path.into_inner()).await?;
    Ok(HttpResponse::Created().json(RecipeSummaryResponse::from(summary)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/recipes/{id}/favorite",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Removed from favorites"),
        (status = 401, description = "Not logged in", body = ErrorSchema),
        (status = 404, description = "Not in favorites", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "removeFavorite"
)]
#[delete("/recipes/{id}/favorite")]
pub async fn remove_favorite(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<RecipeId>,
) -> ApiResult<HttpResponse> {
    let me = session.require_user_id()?;
    state.relationships.remove_favorite(&me, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    post,
    path = "/api/v1/recipes/{id}/shopping_cart",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 201, description = "Added to the shopping cart", body = RecipeSummaryResponse),
        (status = 401, description = "Not logged in", body = ErrorSchema),
        (status = 404, description = "Unknown recipe", body = ErrorSchema),
        (status = 409, description = "Already in the shopping cart", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "addToShoppingCart"
)]
#[post("/recipes/{id}/shopping_cart")]
pub async fn add_to_cart(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<RecipeId>,
) -> ApiResult<HttpResponse> {
    let me = session.require_user_id()?;
    let summary = state.relationships.add_to_cart(&me, path.into_inner()).await?;
    Ok(HttpResponse::Created().json(RecipeSummaryResponse::from(summary)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/recipes/{id}/shopping_cart",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Removed from the shopping cart"),
        (status = 401, description = "Not logged in", body = ErrorSchema),
        (status = 404, description = "Not in the shopping cart", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "removeFromShoppingCart"
)]
#[delete("/recipes/{id}/shopping_cart")]
pub async fn remove_from_cart(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<RecipeId>,
) -> ApiResult<HttpResponse> {
    let me = session.require_user_id()?;
    state.relationships.remove_from_cart(&me, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
