//! PostgreSQL persistence adapters using Diesel.
//!
//! Each adapter implements one driven port from [`crate::domain::ports`] over
//! a shared [`DbPool`]. Row structs (`models.rs`) and the table definitions
//! (`schema.rs`) stay private to this module; conversions back into domain
//! values re-run domain validation.
//!
//! # Example
//!
//! ```no_run
//! use recipes::outbound::persistence::{DbPool, DieselTagRepository, PoolConfig};
//!
//! # async fn connect() -> Result<(), recipes::outbound::persistence::PoolError> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/recipes")).await?;
//! let tags = DieselTagRepository::new(pool);
//! # let _ = tags;
//! # Ok(())
//! # }
//! ```

mod diesel_basic_error_mapping;
mod diesel_catalogue_repository;
mod diesel_helpers;
mod diesel_recipe_repository;
mod diesel_relationship_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_catalogue_repository::{DieselIngredientRepository, DieselTagRepository};
pub use diesel_recipe_repository::DieselRecipeRepository;
pub use diesel_relationship_repository::{DieselFollowRepository, DieselMembershipRepository};
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_migrations, run_pending};
pub use pool::{DbPool, PoolConfig, PoolError};
