pub mod recipes;
pub mod users;

use std::sync::Arc;

use recipe_db::{MemoryStore, StoreError};
use recipe_http::AppError;
use recipe_kernel::ModuleRegistry;

/// Register every application module, all backed by `store`
pub fn register_all(registry: &mut ModuleRegistry, store: Arc<MemoryStore>) -> anyhow::Result<()> {
    registry.register(recipes::create_module(store.clone()))?;
    registry.register(users::create_module(store))?;
    Ok(())
}

/// Map storage failures onto HTTP errors
pub(crate) fn store_error(err: StoreError) -> AppError {
    match err {
        StoreError::NotFound { .. } => AppError::not_found(err.to_string()),
        StoreError::Duplicate { field, .. } => AppError::validation(
            vec![serde_json::json!({ "field": field, "error": err.to_string() })],
            "duplicate value",
        ),
        StoreError::Backend(e) => AppError::Internal(e),
    }
}
