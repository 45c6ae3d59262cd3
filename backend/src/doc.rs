//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every REST endpoint under `/api/v1`, the short link
//! redirect and the health probes, together with the DTO schemas and the
//! session cookie security scheme. Swagger UI serves it in debug builds and
//! `openapi-dump` prints it for external tooling.

use crate::inbound::http::dto::{
    AvatarBody, IngredientAmountRequest, IngredientRequest, IngredientResponse, LoginRequest,
    RecipeIngredientResponse, RecipeRequest, RecipeResponse, RecipeSummaryResponse,
    RegisterRequest, RegisteredUser, SetPasswordRequest, ShortLinkResponse,
    SubscriptionResponse, TagRequest, TagResponse, UserResponse,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Recipes API",
        description = "Recipes, tags, ingredients, favorites, shopping carts and subscriptions.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::users::register,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::set_avatar,
        crate::inbound::http::users::delete_avatar,
        crate::inbound::http::users::set_password,
        crate::inbound::http::users::subscriptions,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::subscribe,
        crate::inbound::http::users::unsubscribe,
        crate::inbound::http::catalogue::list_tags,
        crate::inbound::http::catalogue::get_tag,
        crate::inbound::http::catalogue::create_tag,
        crate::inbound::http::catalogue::update_tag,
        crate::inbound::http::catalogue::delete_tag,
        crate::inbound::http::catalogue::list_ingredients,
        crate::inbound::http::catalogue::get_ingredient,
        crate::inbound::http::catalogue::create_ingredient,
        crate::inbound::http::catalogue::update_ingredient,
        crate::inbound::http::catalogue::delete_ingredient,
        crate::inbound::http::recipes::list_recipes,
        crate::inbound::http::recipes::create_recipe,
        crate::inbound::http::recipes::get_recipe,
        crate::inbound::http::recipes::update_recipe,
        crate::inbound::http::recipes::delete_recipe,
        crate::inbound::http::recipes::get_link,
        crate::inbound::http::recipes::download_shopping_cart,
        crate::inbound::http::recipes::add_favorite,
        crate::inbound::http::recipes::remove_favorite,
        crate::inbound::http::recipes::add_to_cart,
        crate::inbound::http::recipes::remove_from_cart,
        crate::inbound::http::short_links::follow_short_link,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        LoginRequest,
        RegisterRequest,
        RegisteredUser,
        SetPasswordRequest,
        AvatarBody,
        UserResponse,
        SubscriptionResponse,
        TagRequest,
        TagResponse,
        IngredientRequest,
        IngredientResponse,
        IngredientAmountRequest,
        RecipeRequest,
        RecipeResponse,
        RecipeIngredientResponse,
        RecipeSummaryResponse,
        ShortLinkResponse,
    )),
    tags(
        (name = "auth", description = "Session login and logout"),
        (name = "users", description = "Accounts, avatars and subscriptions"),
        (name = "tags", description = "Recipe tags"),
        (name = "ingredients", description = "Ingredient catalogue"),
        (name = "recipes", description = "Recipes, favorites, shopping cart and short links"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated document.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    fn error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
        assert_object_schema_has_field(error_schema, "traceId");
    }

    #[rstest]
    #[case("/api/v1/recipes")]
    #[case("/api/v1/recipes/{id}")]
    #[case("/api/v1/recipes/{id}/get-link")]
    #[case("/api/v1/recipes/{id}/favorite")]
    #[case("/api/v1/recipes/{id}/shopping_cart")]
    #[case("/api/v1/recipes/download_shopping_cart")]
    #[case("/api/v1/users/{id}/subscribe")]
    #[case("/api/v1/tags")]
    #[case("/api/v1/ingredients")]
    #[case("/s/{code}")]
    #[case("/health/ready")]
    fn documents_path(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn recipe_response_uses_camel_case() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let recipe = schemas.get("RecipeResponse").expect("RecipeResponse schema");
        assert_object_schema_has_field(recipe, "cookingTime");
        assert_object_schema_has_field(recipe, "isInShoppingCart");
    }

    #[rstest]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.as_ref().expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
