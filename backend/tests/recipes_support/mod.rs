//! In-memory wiring shared by the integration suites.
//!
//! Integration tests compile as separate crates, so each suite pulls this
//! module in with `#[path]` and uses the parts it needs.

use std::sync::Arc;

use mockable::DefaultClock;
use recipes::domain::ports::{IngredientRepository, SeededShortCodes, TagRepository};
use recipes::domain::{Ingredient, IngredientDraft, RegistrationForm, Tag, TagDraft, User};
use recipes::inbound::http::state::HttpState;
use recipes::outbound::media::InMemoryImageStore;
use recipes::outbound::memory::InMemoryStore;
use recipes::outbound::security::Argon2PasswordHasher;
use recipes::server::{Collaborators, memory_http_state};
use zeroize::Zeroizing;

/// Password given to every registered user.
pub const PASSWORD: &str = "correct horse battery";

/// One PNG signature as a data URI.
pub const PNG_URI: &str = "data:image/png;base64,iVBORw0KGgo=";

/// Memory adapters plus the service graph built over them.
#[derive(Clone)]
pub struct MemoryWorld {
    pub store: InMemoryStore,
    pub images: InMemoryImageStore,
    pub state: HttpState,
}

impl MemoryWorld {
    pub fn new() -> Self {
        let store = InMemoryStore::new();
        let images = InMemoryImageStore::new();
        let collaborators = Collaborators {
            images: Arc::new(images.clone()),
            hasher: Arc::new(Argon2PasswordHasher::with_cost(8, 1).expect("argon2 cost")),
            short_codes: Arc::new(SeededShortCodes::new(11)),
            clock: Arc::new(DefaultClock),
        };
        let state = memory_http_state(&store, collaborators);
        Self {
            store,
            images,
            state,
        }
    }

    /// Register `username` through the account service.
    pub async fn register(&self, username: &str) -> User {
        self.state
            .accounts
            .register(RegistrationForm {
                email: Some(format!("{username}@example.org")),
                username: Some(username.to_owned()),
                first_name: Some("Test".to_owned()),
                last_name: Some("Cook".to_owned()),
                password: Some(Zeroizing::new(PASSWORD.to_owned())),
            })
            .await
            .expect("registration")
    }

    /// Seed an ingredient, bypassing the staff-only catalogue service.
    pub async fn ingredient(&self, name: &str, unit: &str) -> Ingredient {
        let draft = IngredientDraft::validate(Some(name.to_owned()), Some(unit.to_owned()))
            .expect("valid ingredient");
        IngredientRepository::create(&self.store, &draft)
            .await
            .expect("seed ingredient")
    }

    pub async fn tag(&self, name: &str, slug: &str) -> Tag {
        let draft =
            TagDraft::validate(Some(name.to_owned()), Some(slug.to_owned())).expect("valid tag");
        TagRepository::create(&self.store, &draft)
            .await
            .expect("seed tag")
    }
}

impl Default for MemoryWorld {
    fn default() -> Self {
        Self::new()
    }
}
