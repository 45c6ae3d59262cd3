//! Sample domain values shared by service tests.

use chrono::{TimeZone, Utc};

use crate::domain::{
    Email, ImageRef, Ingredient, IngredientId, PersonName, Recipe, RecipeId, RecipeIngredient,
    Tag, TagId, User, UserId, Username,
};

pub(crate) fn user(username: &str) -> User {
    User {
        id: UserId::random(),
        email: Email::new(format!("{username}@example.org")).expect("email"),
        username: Username::new(username).expect("username"),
        first_name: PersonName::new("Test").expect("first name"),
        last_name: PersonName::new("Cook").expect("last name"),
        avatar: None,
        is_staff: false,
    }
}

pub(crate) fn staff(username: &str) -> User {
    User {
        is_staff: true,
        ..user(username)
    }
}

pub(crate) fn recipe(id: i64, author: &User) -> Recipe {
    Recipe {
        id: RecipeId::new(id),
        author: author.clone(),
        name: format!("Recipe {id}"),
        text: "Cook it.".to_owned(),
        image: ImageRef::new(format!("recipes/{id}.png")),
        cooking_time: 10,
        short_code: "AbCdEfGh12".parse().expect("short code"),
        created_at: Utc
            .with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp"),
        tags: vec![Tag {
            id: TagId::new(1),
            name: "Breakfast".to_owned(),
            slug: "breakfast".to_owned(),
        }],
        ingredients: vec![RecipeIngredient {
            ingredient: Ingredient {
                id: IngredientId::new(1),
                name: "Flour".to_owned(),
                measurement_unit: "g".to_owned(),
            },
            amount: 200,
        }],
    }
}
