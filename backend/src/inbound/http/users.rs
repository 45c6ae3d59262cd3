//! User accounts, avatars and subscriptions.
//!
//! ```text
//! POST   /api/v1/users
//! GET    /api/v1/users?page=&limit=
//! GET    /api/v1/users/me
//! PUT    /api/v1/users/me/avatar
//! GET    /api/v1/users/subscriptions?recipes_limit=
//! POST   /api/v1/users/{id}/subscribe
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use pagination::Paginated;

use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::dto::{
    AvatarBody, PaginatedSchema, RegisterRequest, RegisteredUser, SetPasswordRequest,
    SubscriptionResponse, UserResponse,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{QueryParams, image_payload, path_user_id};

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = RegisteredUser),
        (status = 400, description = "Invalid registration", body = ErrorSchema),
        (status = 409, description = "Email or username taken", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "registerUser",
    security([])
)]
#[post("/users")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let user = state.accounts.register(payload.into_inner().into()).await?;
    tracing::info!(user = %user.id, "user registered");
    Ok(HttpResponse::Created().json(RegisteredUser::from(user)))
}

/// List users ordered by username.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("limit" = Option<u32>, Query, description = "Page size, at most 100")
    ),
    responses(
        (status = 200, description = "Users", body = PaginatedSchema<UserResponse>),
        (status = 400, description = "Invalid pagination", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers",
    security([])
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
) -> ApiResult<web::Json<Paginated<UserResponse>>> {
    let viewer = session.user_id()?;
    let request = QueryParams::parse(req.query_string()).page_request()?;
    let page = state.account_query.list(viewer, request).await?;
    Ok(web::Json(Paginated::from_page(
        page.map(UserResponse::from),
        &req.full_url(),
    )))
}

/// Profile of the signed-in user.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not logged in", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserResponse>> {
    let me = session.require_user_id()?;
    let profile = state.account_query.profile(Some(me.clone()), &me).await?;
    Ok(web::Json(profile.into()))
}

/// Upload a new avatar as a base64 data URI.
#[utoipa::path(
    put,
    path = "/api/v1/users/me/avatar",
    request_body = AvatarBody,
    responses(
        (status = 200, description = "Avatar stored", body = AvatarBody),
        (status = 400, description = "Invalid image", body = ErrorSchema),
        (status = 401, description = "Not logged in", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "setAvatar"
)]
#[put("/users/me/avatar")]
pub async fn set_avatar(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AvatarBody>,
) -> ApiResult<web::Json<AvatarBody>> {
    let me = session.require_user_id()?;
    let image = image_payload("avatar", payload.avatar.as_deref())?;
    let stored = state.accounts.set_avatar(&me, image).await?;
    Ok(web::Json(AvatarBody {
        avatar: Some(stored.url()),
    }))
}

/// Remove the avatar of the signed-in user.
#[utoipa::path(
    delete,
    path = "/api/v1/users/me/avatar",
    responses(
        (status = 204, description = "Avatar removed"),
        (status = 401, description = "Not logged in", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteAvatar"
)]
#[delete("/users/me/avatar")]
pub async fn delete_avatar(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let me = session.require_user_id()?;
    state.accounts.clear_avatar(&me).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Change the password of the signed-in user.
#[utoipa::path(
    post,
    path = "/api/v1/users/set_password",
    request_body = SetPasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Wrong current password or weak new one", body = ErrorSchema),
        (status = 401, description = "Not logged in", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "setPassword"
)]
#[post("/users/set_password")]
pub async fn set_password(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SetPasswordRequest>,
) -> ApiResult<HttpResponse> {
    let me = session.require_user_id()?;
    state
        .accounts
        .set_password(&me, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Authors the signed-in user follows, each with a recipe preview.
#[utoipa::path(
    get,
    path = "/api/v1/users/subscriptions",
    params(
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("limit" = Option<u32>, Query, description = "Page size, at most 100"),
        ("recipes_limit" = Option<usize>, Query, description = "Recipes shown per author")
    ),
    responses(
        (status = 200, description = "Subscriptions", body = PaginatedSchema<SubscriptionResponse>),
        (status = 401, description = "Not logged in", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listSubscriptions"
)]
#[get("/users/subscriptions")]
pub async fn subscriptions(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
) -> ApiResult<web::Json<Paginated<SubscriptionResponse>>> {
    let me = session.require_user_id()?;
    let params = QueryParams::parse(req.query_string());
    let request = params.page_request()?;
    let recipes_limit = params.recipes_limit()?;
    let page = state
        .relationship_query
        .subscriptions(&me, request, recipes_limit)
        .await?;
    Ok(web::Json(Paginated::from_page(
        page.map(SubscriptionResponse::from),
        &req.full_url(),
    )))
}

/// Public profile of a user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "Unknown user", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser",
    security([])
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserResponse>> {
    let id = path_user_id(&path)?;
    let viewer = session.user_id()?;
    let profile = state.account_query.profile(viewer, &id).await?;
    Ok(web::Json(profile.into()))
}

/// Follow an author.
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/subscribe",
    params(
        ("id" = String, Path, description = "Author id"),
        ("recipes_limit" = Option<usize>, Query, description = "Recipes shown in the response")
    ),
    responses(
        (status = 201, description = "Subscribed", body = SubscriptionResponse),
        (status = 400, description = "Cannot follow yourself", body = ErrorSchema),
        (status = 404, description = "Unknown author", body = ErrorSchema),
        (status = 409, description = "Already subscribed", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "subscribe"
)]
#[post("/users/{id}/subscribe")]
pub async fn subscribe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    req: HttpRequest,
) -> ApiResult<HttpResponse> {
    let me = session.require_user_id()?;
    let author = path_user_id(&path)?;
    let recipes_limit = QueryParams::parse(req.query_string()).recipes_limit()?;
    let subscription = state
        .relationships
        .follow(&me, &author, recipes_limit)
        .await?;
    Ok(HttpResponse::Created().json(SubscriptionResponse::from(subscription)))
}

/// Stop following an author.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}/subscribe",
    params(("id" = String, Path, description = "Author id")),
    responses(
        (status = 204, description = "Unsubscribed"),
        (status = 404, description = "Not subscribed", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "unsubscribe"
)]
#[delete("/users/{id}/subscribe")]
pub async fn unsubscribe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let me = session.require_user_id()?;
    let author = path_user_id(&path)?;
    state.relationships.unfollow(&me, &author).await?;
    Ok(HttpResponse::NoContent().finish())
}
