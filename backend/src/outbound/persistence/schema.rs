//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate
//! with `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts. `email` and `username` are unique.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        username -> Varchar,
        first_name -> Varchar,
        last_name -> Varchar,
        /// Image reference relative to the media root.
        avatar -> Nullable<Text>,
        is_staff -> Bool,
        /// Argon2id PHC string.
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Ingredient catalogue; `(name, measurement_unit)` is unique.
    ingredients (id) {
        id -> Int8,
        name -> Varchar,
        measurement_unit -> Varchar,
    }
}

diesel::table! {
    /// Recipe tags with unique slugs.
    tags (id) {
        id -> Int8,
        name -> Varchar,
        slug -> Varchar,
    }
}

diesel::table! {
    /// Recipes; `short_code` is unique and immutable.
    recipes (id) {
        id -> Int8,
        author_id -> Uuid,
        name -> Varchar,
        text -> Text,
        image -> Text,
        cooking_time -> Int4,
        short_code -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Ingredient lines; `id` order is insertion order.
    recipe_ingredients (id) {
        id -> Int8,
        recipe_id -> Int8,
        ingredient_id -> Int8,
        amount -> Int4,
    }
}

diesel::table! {
    recipe_tags (recipe_id, tag_id) {
        recipe_id -> Int8,
        tag_id -> Int8,
    }
}

diesel::table! {
    favorites (user_id, recipe_id) {
        user_id -> Uuid,
        recipe_id -> Int8,
    }
}

diesel::table! {
    cart_items (user_id, recipe_id) {
        user_id -> Uuid,
        recipe_id -> Int8,
    }
}

diesel::table! {
    follows (follower_id, author_id) {
        follower_id -> Uuid,
        author_id -> Uuid,
    }
}

diesel::joinable!(recipes -> users (author_id));
diesel::joinable!(recipe_ingredients -> recipes (recipe_id));
diesel::joinable!(recipe_ingredients -> ingredients (ingredient_id));
diesel::joinable!(recipe_tags -> recipes (recipe_id));
diesel::joinable!(recipe_tags -> tags (tag_id));
diesel::joinable!(favorites -> recipes (recipe_id));
diesel::joinable!(cart_items -> recipes (recipe_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    ingredients,
    tags,
    recipes,
    recipe_ingredients,
    recipe_tags,
    favorites,
    cart_items,
    follows,
);
