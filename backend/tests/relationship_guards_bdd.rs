//! Behaviour tests for duplicate and missing relationship guards.
//
// rstest-bdd generates guard variables with double underscores, which trips
// the non_snake_case lint under -D warnings.
#![allow(non_snake_case)]

#[allow(dead_code)]
#[path = "recipes_support/mod.rs"]
mod support;

use std::cell::RefCell;

use recipes::domain::{Error, IngredientAmountInput, RecipeId, RecipeSubmission, User};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;
use support::{MemoryWorld, PNG_URI};
use tokio::runtime::Runtime;

struct GuardWorld {
    runtime: Runtime,
    memory: MemoryWorld,
    cook: RefCell<Option<User>>,
    recipe: RefCell<Option<RecipeId>>,
    reader: RefCell<Option<User>>,
    outcome: RefCell<Option<Result<(), Error>>>,
}

impl GuardWorld {
    fn new() -> Self {
        Self {
            runtime: Runtime::new().expect("tokio runtime"),
            memory: MemoryWorld::new(),
            cook: RefCell::new(None),
            recipe: RefCell::new(None),
            reader: RefCell::new(None),
            outcome: RefCell::new(None),
        }
    }

    fn reader(&self) -> User {
        self.reader.borrow().clone().expect("reader registered")
    }

    fn cook(&self) -> User {
        self.cook.borrow().clone().expect("cook registered")
    }

    fn recipe(&self) -> RecipeId {
        (*self.recipe.borrow()).expect("recipe published")
    }

    fn record<T>(&self, result: Result<T, Error>) {
        *self.outcome.borrow_mut() = Some(result.map(|_| ()));
    }
}

#[fixture]
fn world() -> GuardWorld {
    GuardWorld::new()
}

#[given("a cook with a published recipe")]
fn a_cook_with_a_published_recipe(world: &GuardWorld) {
    let memory = &world.memory;
    let (cook, recipe) = world.runtime.block_on(async {
        let cook = memory.register("cook").await;
        let flour = memory.ingredient("flour", "g").await;
        let tag = memory.tag("Dinner", "dinner").await;
        let details = memory
            .state
            .recipes
            .create(
                &cook.id,
                RecipeSubmission {
                    name: Some("Pie".to_owned()),
                    text: Some("Bake it.".to_owned()),
                    cooking_time: Some(45),
                    image: Some(PNG_URI.to_owned()),
                    ingredients: Some(vec![IngredientAmountInput {
                        id: Some(flour.id.get()),
                        amount: Some(300),
                    }]),
                    tags: Some(vec![tag.id.get()]),
                },
            )
            .await
            .expect("recipe created");
        (cook, details.recipe.id)
    });
    *world.cook.borrow_mut() = Some(cook);
    *world.recipe.borrow_mut() = Some(recipe);
}

#[given("a reader")]
fn a_reader(world: &GuardWorld) {
    let reader = world.runtime.block_on(world.memory.register("reader"));
    *world.reader.borrow_mut() = Some(reader);
}

#[when("the reader adds the recipe to favorites")]
fn the_reader_favorites(world: &GuardWorld) {
    let (reader, recipe) = (world.reader(), world.recipe());
    let result = world
        .runtime
        .block_on(world.memory.state.relationships.add_favorite(&reader.id, recipe));
    world.record(result);
}

#[when("the reader adds recipe {id} to favorites")]
fn the_reader_favorites_by_id(world: &GuardWorld, id: i64) {
    let reader = world.reader();
    let result = world.runtime.block_on(
        world
            .memory
            .state
            .relationships
            .add_favorite(&reader.id, RecipeId::new(id)),
    );
    world.record(result);
}

#[when("the reader removes the recipe from favorites")]
fn the_reader_unfavorites(world: &GuardWorld) {
    let (reader, recipe) = (world.reader(), world.recipe());
    let result = world.runtime.block_on(
        world
            .memory
            .state
            .relationships
            .remove_favorite(&reader.id, recipe),
    );
    world.record(result);
}

#[when("the reader adds the recipe to the shopping cart")]
fn the_reader_adds_to_cart(world: &GuardWorld) {
    let (reader, recipe) = (world.reader(), world.recipe());
    let result = world
        .runtime
        .block_on(world.memory.state.relationships.add_to_cart(&reader.id, recipe));
    world.record(result);
}

#[when("the reader removes the recipe from the shopping cart")]
fn the_reader_removes_from_cart(world: &GuardWorld) {
    let (reader, recipe) = (world.reader(), world.recipe());
    let result = world.runtime.block_on(
        world
            .memory
            .state
            .relationships
            .remove_from_cart(&reader.id, recipe),
    );
    world.record(result);
}

#[when("the reader follows themselves")]
fn the_reader_follows_themselves(world: &GuardWorld) {
    let reader = world.reader();
    let result = world.runtime.block_on(
        world
            .memory
            .state
            .relationships
            .follow(&reader.id, &reader.id, None),
    );
    world.record(result);
}

#[when("the reader follows the cook")]
fn the_reader_follows_the_cook(world: &GuardWorld) {
    let (reader, cook) = (world.reader(), world.cook());
    let result = world.runtime.block_on(
        world
            .memory
            .state
            .relationships
            .follow(&reader.id, &cook.id, None),
    );
    world.record(result);
}

#[when("the reader unfollows the cook")]
fn the_reader_unfollows_the_cook(world: &GuardWorld) {
    let (reader, cook) = (world.reader(), world.cook());
    let result = world
        .runtime
        .block_on(world.memory.state.relationships.unfollow(&reader.id, &cook.id));
    world.record(result);
}

#[then("the last request succeeds")]
fn the_last_request_succeeds(world: &GuardWorld) {
    let outcome = world.outcome.borrow();
    match outcome.as_ref().expect("a request was made") {
        Ok(()) => {}
        Err(error) => panic!("expected success, got {error}"),
    }
}

#[then("the last request fails with {code}")]
fn the_last_request_fails_with(world: &GuardWorld, code: String) {
    let outcome = world.outcome.borrow();
    let error = match outcome.as_ref().expect("a request was made") {
        Ok(()) => panic!("expected {code}, got success"),
        Err(error) => error,
    };
    let actual = serde_json::to_value(error.code()).expect("serialise code");
    assert_eq!(actual, Value::String(code));
}

#[scenario(
    path = "tests/features/relationship_guards.feature",
    name = "The first favorite is accepted"
)]
fn first_favorite_is_accepted(world: GuardWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/relationship_guards.feature",
    name = "Favoriting twice is a conflict"
)]
fn favoriting_twice_conflicts(world: GuardWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/relationship_guards.feature",
    name = "Removing a recipe that was never favorited is not found"
)]
fn removing_missing_favorite(world: GuardWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/relationship_guards.feature",
    name = "Adding to the shopping cart twice is a conflict"
)]
fn cart_twice_conflicts(world: GuardWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/relationship_guards.feature",
    name = "Removing a recipe that is not in the cart is not found"
)]
fn removing_missing_cart_entry(world: GuardWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/relationship_guards.feature",
    name = "Favoriting an unknown recipe is not found"
)]
fn favoriting_unknown_recipe(world: GuardWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/relationship_guards.feature",
    name = "Following yourself is an invalid operation"
)]
fn following_yourself(world: GuardWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/relationship_guards.feature",
    name = "Following twice is a conflict"
)]
fn following_twice(world: GuardWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/relationship_guards.feature",
    name = "Unfollowing an author who is not followed is not found"
)]
fn unfollowing_unknown(world: GuardWorld) {
    drop(world);
}
