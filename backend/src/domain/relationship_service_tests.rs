//! Tests for the relationship guard service.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{
    AuthorRecipes, MockFollowRepository, MockMembershipRepository, MockRecipeRepository,
    MockUserRepository,
};
use crate::domain::test_fixtures::{recipe, user};

type Service = RelationshipService<
    MockRecipeRepository,
    MockMembershipRepository,
    MockUserRepository,
    MockFollowRepository,
>;

struct Mocks {
    recipes: MockRecipeRepository,
    memberships: MockMembershipRepository,
    users: MockUserRepository,
    follows: MockFollowRepository,
}

impl Mocks {
    fn into_service(self) -> Service {
        RelationshipService::new(
            Arc::new(self.recipes),
            Arc::new(self.memberships),
            Arc::new(self.users),
            Arc::new(self.follows),
        )
    }
}

#[fixture]
fn mocks() -> Mocks {
    Mocks {
        recipes: MockRecipeRepository::new(),
        memberships: MockMembershipRepository::new(),
        users: MockUserRepository::new(),
        follows: MockFollowRepository::new(),
    }
}

fn known_recipe(mocks: &mut Mocks, id: i64) {
    let author = user("author");
    let stored = recipe(id, &author);
    mocks
        .recipes
        .expect_find()
        .returning(move |_| Ok(Some(stored.clone())));
}

#[rstest]
#[case(RecipeList::Favorites)]
#[case(RecipeList::ShoppingCart)]
#[tokio::test]
async fn first_add_returns_summary(mut mocks: Mocks, #[case] list: RecipeList) {
    let viewer = user("viewer");
    known_recipe(&mut mocks, 4);
    mocks
        .memberships
        .expect_add()
        .withf(move |target, _, recipe| *target == list && *recipe == RecipeId::new(4))
        .times(1)
        .returning(|_, _, _| Ok(true));

    let summary = mocks
        .into_service()
        .add_to_list(list, &viewer.id, RecipeId::new(4))
        .await
        .expect("added");
    assert_eq!(summary.id, RecipeId::new(4));
    assert_eq!(summary.image.as_str(), "recipes/4.png");
}

#[rstest]
#[tokio::test]
async fn duplicate_favorite_is_a_conflict(mut mocks: Mocks) {
    let viewer = user("viewer");
    known_recipe(&mut mocks, 4);
    mocks.memberships.expect_add().returning(|_, _, _| Ok(false));

    let err = mocks
        .into_service()
        .add_favorite(&viewer.id, RecipeId::new(4))
        .await
        .expect_err("duplicate add");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn removing_absent_cart_item_is_not_found(mut mocks: Mocks) {
    let viewer = user("viewer");
    known_recipe(&mut mocks, 4);
    mocks
        .memberships
        .expect_remove()
        .returning(|_, _, _| Ok(false));

    let err = mocks
        .into_service()
        .remove_from_cart(&viewer.id, RecipeId::new(4))
        .await
        .expect_err("absent pair");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn unknown_recipe_is_not_found(mut mocks: Mocks) {
    let viewer = user("viewer");
    mocks.recipes.expect_find().returning(|_| Ok(None));
    mocks.memberships.expect_add().never();

    let err = mocks
        .into_service()
        .add_to_cart(&viewer.id, RecipeId::new(99))
        .await
        .expect_err("unknown recipe");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn self_follow_is_rejected_before_store_access(mocks: Mocks) {
    let viewer = user("viewer");

    let err = mocks
        .into_service()
        .follow(&viewer.id, &viewer.id, None)
        .await
        .expect_err("self follow");
    assert_eq!(err.code(), ErrorCode::InvalidOperation);
}

#[rstest]
#[tokio::test]
async fn follow_returns_truncated_recipe_preview(mut mocks: Mocks) {
    let viewer = user("viewer");
    let author = user("author");
    let author_id = author.id.clone();
    let preview_author = author.clone();
    mocks
        .users
        .expect_find_by_id()
        .returning(move |_| Ok(Some(author.clone())));
    mocks.follows.expect_follow().times(1).returning(|_, _| Ok(true));
    mocks
        .recipes
        .expect_by_author()
        .withf(|_, limit| *limit == Some(1))
        .returning(move |_, _| {
            Ok(AuthorRecipes {
                recipes: vec![RecipeSummary::from(&recipe(8, &preview_author))],
                total: 3,
            })
        });

    let subscription = mocks
        .into_service()
        .follow(&viewer.id, &author_id, Some(1))
        .await
        .expect("subscribed");
    assert_eq!(subscription.author.id, author_id);
    assert_eq!(subscription.recipes.len(), 1);
    assert_eq!(subscription.recipes_count, 3);
}

#[rstest]
#[tokio::test]
async fn duplicate_follow_is_a_conflict(mut mocks: Mocks) {
    let viewer = user("viewer");
    let author = user("author");
    let author_id = author.id.clone();
    mocks
        .users
        .expect_find_by_id()
        .returning(move |_| Ok(Some(author.clone())));
    mocks.follows.expect_follow().returning(|_, _| Ok(false));

    let err = mocks
        .into_service()
        .follow(&viewer.id, &author_id, None)
        .await
        .expect_err("already following");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn unfollowing_unknown_author_is_not_found(mut mocks: Mocks) {
    let viewer = user("viewer");
    mocks.users.expect_find_by_id().returning(|_| Ok(None));
    mocks.follows.expect_unfollow().never();

    let err = mocks
        .into_service()
        .unfollow(&viewer.id, &UserId::random())
        .await
        .expect_err("unknown author");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn subscriptions_keep_page_metadata(mut mocks: Mocks) {
    let viewer = user("viewer");
    let first = user("alpha");
    let second = user("beta");
    mocks
        .follows
        .expect_followed()
        .returning(move |_, request| Ok(Page::new(vec![first.clone(), second.clone()], 5, request)));
    mocks
        .recipes
        .expect_by_author()
        .times(2)
        .returning(|_, _| Ok(AuthorRecipes::default()));

    let request = PageRequest::new(1, 2).expect("valid page");
    let page = mocks
        .into_service()
        .subscriptions(&viewer.id, request, None)
        .await
        .expect("subscriptions");
    assert_eq!(page.total(), 5);
    assert_eq!(page.items().len(), 2);
    assert_eq!(page.items()[0].author.username.as_ref(), "alpha");
}
