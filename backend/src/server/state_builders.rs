//! Wiring of domain services over a concrete set of adapters.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use crate::domain::ports::{
    FollowRepository, ImageStore, IngredientRepository, MembershipRepository, PasswordHasher,
    RandomShortCodes, RecipeRepository, ShortCodeSource, TagRepository, UserRepository,
};
use crate::domain::{AccountService, CatalogueService, RecipeService, RelationshipService};
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::InMemoryStore;
use crate::outbound::persistence::{
    DbPool, DieselFollowRepository, DieselIngredientRepository, DieselMembershipRepository,
    DieselRecipeRepository, DieselTagRepository, DieselUserRepository,
};
use crate::outbound::security::Argon2PasswordHasher;

/// Non-repository collaborators shared by the services.
#[derive(Clone)]
pub struct Collaborators {
    pub images: Arc<dyn ImageStore>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub short_codes: Arc<dyn ShortCodeSource>,
    pub clock: Arc<dyn Clock>,
}

impl Collaborators {
    /// Argon2 hashing, random short codes and the system clock.
    pub fn production(images: Arc<dyn ImageStore>) -> Self {
        Self {
            images,
            hasher: Arc::new(Argon2PasswordHasher::new()),
            short_codes: Arc::new(RandomShortCodes),
            clock: Arc::new(DefaultClock),
        }
    }
}

/// One adapter per repository port.
pub struct Repositories<U, F, I, T, R, M> {
    pub users: Arc<U>,
    pub follows: Arc<F>,
    pub ingredients: Arc<I>,
    pub tags: Arc<T>,
    pub recipes: Arc<R>,
    pub memberships: Arc<M>,
}

/// Build every driving port over the given adapters.
pub fn build_http_state<U, F, I, T, R, M>(
    repos: Repositories<U, F, I, T, R, M>,
    collaborators: Collaborators,
) -> HttpState
where
    U: UserRepository + 'static,
    F: FollowRepository + 'static,
    I: IngredientRepository + 'static,
    T: TagRepository + 'static,
    R: RecipeRepository + 'static,
    M: MembershipRepository + 'static,
{
    let Repositories {
        users,
        follows,
        ingredients,
        tags,
        recipes,
        memberships,
    } = repos;
    let Collaborators {
        images,
        hasher,
        short_codes,
        clock,
    } = collaborators;

    let accounts = Arc::new(AccountService::new(
        users.clone(),
        follows.clone(),
        hasher,
        images.clone(),
    ));
    let catalogue = Arc::new(CatalogueService::new(ingredients, tags, users.clone()));
    let recipe_service = Arc::new(RecipeService::new(
        recipes.clone(),
        memberships.clone(),
        follows.clone(),
        images,
        short_codes,
        clock,
    ));
    let relationships = Arc::new(RelationshipService::new(recipes, memberships, users, follows));

    HttpState {
        login: accounts.clone(),
        accounts: accounts.clone(),
        account_query: accounts,
        catalogue: catalogue.clone(),
        catalogue_query: catalogue,
        recipes: recipe_service.clone(),
        recipe_query: recipe_service,
        relationships: relationships.clone(),
        relationship_query: relationships,
    }
}

/// Services over the in-process store.
pub fn memory_http_state(store: &InMemoryStore, collaborators: Collaborators) -> HttpState {
    let store = Arc::new(store.clone());
    build_http_state(
        Repositories {
            users: store.clone(),
            follows: store.clone(),
            ingredients: store.clone(),
            tags: store.clone(),
            recipes: store.clone(),
            memberships: store,
        },
        collaborators,
    )
}

/// Services over PostgreSQL.
pub fn diesel_http_state(pool: &DbPool, collaborators: Collaborators) -> HttpState {
    build_http_state(
        Repositories {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            follows: Arc::new(DieselFollowRepository::new(pool.clone())),
            ingredients: Arc::new(DieselIngredientRepository::new(pool.clone())),
            tags: Arc::new(DieselTagRepository::new(pool.clone())),
            recipes: Arc::new(DieselRecipeRepository::new(pool.clone())),
            memberships: Arc::new(DieselMembershipRepository::new(pool.clone())),
        },
        collaborators,
    )
}
