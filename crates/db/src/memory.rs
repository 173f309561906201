use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::{NewRecipe, NewUser, Recipe, RecipeChanges, User};
use crate::store::{RecipeStore, StoreError, UserStore};

/// Process-local store backing both recipes and users.
#[derive(Debug, Default)]
pub struct MemoryStore {
    recipes: RwLock<Table<Recipe>>,
    users: RwLock<Table<User>>,
}

#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<u64, T>,
    next_id: u64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T> Table<T> {
    /// Identifiers are never reused, even after deletes.
    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Recipe>, StoreError> {
        let table = self.recipes.read().await;
        Ok(table.rows.values().rev().cloned().collect())
    }

    async fn get(&self, id: u64) -> Result<Recipe, StoreError> {
        let table = self.recipes.read().await;
        table.rows.get(&id).cloned().ok_or(StoreError::NotFound {
            entity: "recipe",
            id,
        })
    }

    async fn insert(&self, recipe: NewRecipe) -> Result<Recipe, StoreError> {
        let mut table = self.recipes.write().await;
        let id = table.allocate_id();
        let stored = Recipe {
            id,
            title: recipe.title,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
            description: recipe.description,
        };
        table.rows.insert(id, stored.clone());

        tracing::debug!(recipe_id = id, "recipe inserted");
        Ok(stored)
    }

    async fn update(&self, id: u64, changes: RecipeChanges) -> Result<Recipe, StoreError> {
        let mut table = self.recipes.write().await;
        let recipe = table.rows.get_mut(&id).ok_or(StoreError::NotFound {
            entity: "recipe",
            id,
        })?;
        changes.apply(recipe);

        tracing::debug!(recipe_id = id, "recipe updated");
        Ok(recipe.clone())
    }

    async fn delete(&self, id: u64) -> Result<(), StoreError> {
        let mut table = self.recipes.write().await;
        table.rows.remove(&id).ok_or(StoreError::NotFound {
            entity: "recipe",
            id,
        })?;

        tracing::debug!(recipe_id = id, "recipe deleted");
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let mut table = self.users.write().await;
        if table.rows.values().any(|existing| existing.email == user.email) {
            return Err(StoreError::Duplicate {
                entity: "user",
                field: "email",
            });
        }

        let id = table.allocate_id();
        let stored = User {
            id,
            email: user.email,
            name: user.name,
            password_hash: user.password_hash,
        };
        table.rows.insert(id, stored.clone());

        tracing::debug!(user_id = id, "user inserted");
        Ok(stored)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let table = self.users.read().await;
        Ok(table.rows.values().find(|user| user.email == email).cloned())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.users.read().await.rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::price::Price;

    fn soup() -> NewRecipe {
        NewRecipe {
            title: "Soup".to_string(),
            time_minutes: 10,
            price: Price::from_cents(500),
            link: String::new(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn recipe_ids_are_assigned_and_not_reused() {
        let store = MemoryStore::new();

        let first = RecipeStore::insert(&store, soup()).await.unwrap();
        let second = RecipeStore::insert(&store, soup()).await.unwrap();
        assert_eq!((first.id, second.id), (1, 2));

        store.delete(second.id).await.unwrap();
        let third = RecipeStore::insert(&store, soup()).await.unwrap();
        assert_eq!(third.id, 3);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = MemoryStore::new();
        for _ in 0..3 {
            RecipeStore::insert(&store, soup()).await.unwrap();
        }

        let ids: Vec<u64> = store.list().await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn update_applies_only_given_fields() {
        let store = MemoryStore::new();
        let recipe = RecipeStore::insert(&store, soup()).await.unwrap();

        let updated = store
            .update(
                recipe.id,
                RecipeChanges {
                    title: Some("Stew".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Stew");
        assert_eq!(updated.time_minutes, 10);
        assert_eq!(store.get(recipe.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn missing_recipe_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.get(42).await,
            Err(StoreError::NotFound { id: 42, .. })
        ));
        assert!(matches!(
            store.delete(42).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        let user = NewUser {
            email: "cook@example.com".to_string(),
            name: "Cook".to_string(),
            password_hash: "hash".to_string(),
        };

        UserStore::insert(&store, user.clone()).await.unwrap();
        let err = UserStore::insert(&store, user).await.unwrap_err();

        assert!(matches!(err, StoreError::Duplicate { field: "email", .. }));
        assert_eq!(store.count().await.unwrap(), 1);
        assert!(store
            .find_by_email("cook@example.com")
            .await
            .unwrap()
            .is_some());
    }
}
