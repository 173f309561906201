use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewRecipe, NewUser, Recipe, RecipeChanges, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    #[error("{entity} with this {field} already exists")]
    Duplicate {
        entity: &'static str,
        field: &'static str,
    },

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Persistence for recipes. Identifiers are assigned by the store.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// All recipes, newest (highest id) first
    async fn list(&self) -> Result<Vec<Recipe>, StoreError>;

    async fn get(&self, id: u64) -> Result<Recipe, StoreError>;

    async fn insert(&self, recipe: NewRecipe) -> Result<Recipe, StoreError>;

    async fn update(&self, id: u64, changes: RecipeChanges) -> Result<Recipe, StoreError>;

    async fn delete(&self, id: u64) -> Result<(), StoreError>;
}

/// Persistence for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with [`StoreError::Duplicate`] when the email is taken.
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;
}
