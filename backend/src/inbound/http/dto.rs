//! Wire representations for the JSON API.
//!
//! Request bodies keep every field optional so that missing values surface
//! as field violations from domain validation rather than as opaque JSON
//! errors. Responses use camelCase keys throughout.

use pagination::Paginated;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::{
    Ingredient, IngredientAmountInput, IngredientPatch, PasswordChange, RecipeDetails,
    RecipeIngredient, RecipeSubmission, RecipeSummary, RegistrationForm, Subscription, Tag,
    TagPatch, User, UserProfile,
};

/// `POST /api/v1/auth/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "cook@example.com")]
    pub email: String,
    pub password: String,
}

/// `POST /api/v1/users`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
}

impl From<RegisterRequest> for RegistrationForm {
    fn from(value: RegisterRequest) -> Self {
        Self {
            email: value.email,
            username: value.username,
            first_name: value.first_name,
            last_name: value.last_name,
            password: value.password.map(Zeroizing::new),
        }
    }
}

/// `POST /api/v1/users/set_password`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetPasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

impl From<SetPasswordRequest> for PasswordChange {
    fn from(value: SetPasswordRequest) -> Self {
        Self {
            current: Zeroizing::new(value.current_password),
            new: Zeroizing::new(value.new_password),
        }
    }
}

/// Avatar upload and response body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AvatarBody {
    /// Base64 data URI on upload; media URL in responses.
    #[schema(example = "data:image/png;base64,iVBORw0KGgo=")]
    pub avatar: Option<String>,
}

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
    pub is_subscribed: bool,
}

impl UserResponse {
    fn from_user(user: &User, is_subscribed: bool) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.to_string(),
            username: user.username.to_string(),
            first_name: user.first_name.to_string(),
            last_name: user.last_name.to_string(),
            avatar: user.avatar.as_ref().map(|avatar| avatar.url()),
            is_subscribed,
        }
    }
}

impl From<&UserProfile> for UserResponse {
    fn from(profile: &UserProfile) -> Self {
        Self::from_user(&profile.user, profile.is_subscribed)
    }
}

impl From<UserProfile> for UserResponse {
    fn from(profile: UserProfile) -> Self {
        Self::from(&profile)
    }
}

/// Body of `201 Created` after registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
    pub id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for RegisteredUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.to_string(),
            username: user.username.to_string(),
            first_name: user.first_name.to_string(),
            last_name: user.last_name.to_string(),
        }
    }
}

/// Tag create and patch body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct TagRequest {
    #[schema(example = "Breakfast")]
    pub name: Option<String>,
    #[schema(example = "breakfast")]
    pub slug: Option<String>,
}

impl From<TagRequest> for TagPatch {
    fn from(value: TagRequest) -> Self {
        Self {
            name: value.name,
            slug: value.slug,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TagResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id.get(),
            name: tag.name,
            slug: tag.slug,
        }
    }
}

/// Ingredient create and patch body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngredientRequest {
    #[schema(example = "flour")]
    pub name: Option<String>,
    #[schema(example = "g")]
    pub measurement_unit: Option<String>,
}

impl From<IngredientRequest> for IngredientPatch {
    fn from(value: IngredientRequest) -> Self {
        Self {
            name: value.name,
            measurement_unit: value.measurement_unit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngredientResponse {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
}

impl From<Ingredient> for IngredientResponse {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.id.get(),
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
        }
    }
}

/// One ingredient line of a recipe submission.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct IngredientAmountRequest {
    pub id: Option<i64>,
    pub amount: Option<i64>,
}

/// Recipe create (`POST`) and update (`PATCH`) body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRequest {
    pub name: Option<String>,
    pub text: Option<String>,
    #[schema(example = 30)]
    pub cooking_time: Option<i64>,
    /// Base64 data URI; required on create.
    pub image: Option<String>,
    pub ingredients: Option<Vec<IngredientAmountRequest>>,
    pub tags: Option<Vec<i64>>,
}

impl From<RecipeRequest> for RecipeSubmission {
    fn from(value: RecipeRequest) -> Self {
        Self {
            name: value.name,
            text: value.text,
            cooking_time: value.cooking_time,
            image: value.image,
            ingredients: value.ingredients.map(|lines| {
                lines
                    .into_iter()
                    .map(|line| IngredientAmountInput {
                        id: line.id,
                        amount: line.amount,
                    })
                    .collect()
            }),
            tags: value.tags,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIngredientResponse {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: u16,
}

impl From<RecipeIngredient> for RecipeIngredientResponse {
    fn from(line: RecipeIngredient) -> Self {
        Self {
            id: line.ingredient.id.get(),
            name: line.ingredient.name,
            measurement_unit: line.ingredient.measurement_unit,
            amount: line.amount,
        }
    }
}

/// Full recipe as seen by the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeResponse {
    pub id: i64,
    pub tags: Vec<TagResponse>,
    pub author: UserResponse,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    #[schema(example = "/media/recipes/3fa85f64-5717-4562-b3fc-2c963f66afa6.png")]
    pub image: String,
    pub text: String,
    pub cooking_time: u16,
}

impl From<RecipeDetails> for RecipeResponse {
    fn from(details: RecipeDetails) -> Self {
        let RecipeDetails {
            recipe,
            author,
            is_favorited,
            is_in_shopping_cart,
        } = details;
        Self {
            id: recipe.id.get(),
            tags: recipe.tags.into_iter().map(TagResponse::from).collect(),
            author: UserResponse::from(author),
            ingredients: recipe
                .ingredients
                .into_iter()
                .map(RecipeIngredientResponse::from)
                .collect(),
            is_favorited,
            is_in_shopping_cart,
            name: recipe.name,
            image: recipe.image.url(),
            text: recipe.text,
            cooking_time: recipe.cooking_time,
        }
    }
}

/// Minified recipe returned by favorite, cart and subscription endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummaryResponse {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub cooking_time: u16,
}

impl From<RecipeSummary> for RecipeSummaryResponse {
    fn from(summary: RecipeSummary) -> Self {
        Self {
            id: summary.id.get(),
            name: summary.name,
            image: summary.image.url(),
            cooking_time: summary.cooking_time,
        }
    }
}

/// A followed author with a preview of their recipes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    #[serde(flatten)]
    pub author: UserResponse,
    pub recipes: Vec<RecipeSummaryResponse>,
    pub recipes_count: u64,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(subscription: Subscription) -> Self {
        Self {
            author: UserResponse::from_user(&subscription.author, true),
            recipes: subscription
                .recipes
                .into_iter()
                .map(RecipeSummaryResponse::from)
                .collect(),
            recipes_count: subscription.recipes_count,
        }
    }
}

/// Body of `GET /api/v1/recipes/{id}/get-link`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ShortLinkResponse {
    #[serde(rename = "short-link")]
    #[schema(example = "https://recipes.example/s/aB3dE5gH7j")]
    pub short_link: String,
}

/// OpenAPI shape of the pagination envelope.
#[derive(ToSchema)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct PaginatedSchema<T: ToSchema> {
    count: u64,
    next: Option<String>,
    previous: Option<String>,
    results: Vec<T>,
}

/// Paginated list of recipes.
pub type RecipePage = Paginated<RecipeResponse>;
/// Paginated list of users.
pub type UserPage = Paginated<UserResponse>;
/// Paginated list of subscriptions.
pub type SubscriptionPage = Paginated<SubscriptionResponse>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_fixtures;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn recipe_request_uses_camel_case() {
        let request: RecipeRequest = serde_json::from_value(json!({
            "name": "Soup",
            "cookingTime": 15,
            "ingredients": [{"id": 1, "amount": 2}],
            "tags": [4]
        }))
        .expect("valid body");
        let submission = RecipeSubmission::from(request);
        assert_eq!(submission.cooking_time, Some(15));
        assert_eq!(
            submission.ingredients,
            Some(vec![IngredientAmountInput {
                id: Some(1),
                amount: Some(2)
            }])
        );
        assert!(submission.image.is_none());
    }

    #[rstest]
    fn short_link_uses_hyphenated_key() {
        let body = ShortLinkResponse {
            short_link: "http://localhost/s/abcdefghij".to_owned(),
        };
        assert_eq!(
            serde_json::to_value(body).expect("serialises"),
            json!({"short-link": "http://localhost/s/abcdefghij"})
        );
    }

    #[rstest]
    fn subscription_flattens_author_and_marks_subscribed() {
        let author = test_fixtures::user("chef");
        let value = serde_json::to_value(SubscriptionResponse::from(Subscription {
            author: author.clone(),
            recipes: Vec::new(),
            recipes_count: 0,
        }))
        .expect("serialises");
        assert_eq!(value["username"], "chef");
        assert_eq!(value["isSubscribed"], true);
        assert_eq!(value["recipesCount"], 0);
        assert_eq!(value["id"], author.id.to_string());
    }
}
