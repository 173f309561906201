//! Recipe API application library
//!
//! Wires the recipe and user modules onto the module kernel and HTTP facade.

pub mod modules;
pub mod validation;

use std::sync::Arc;

use recipe_db::MemoryStore;
use recipe_kernel::{settings::Settings, InitCtx, ModuleRegistry};

pub use modules::recipes::serializers::RecipeSerializer;
pub use modules::users::serializer::UserSerializer;

/// Registry with every application module sharing one in-memory store
pub fn build_registry() -> anyhow::Result<ModuleRegistry> {
    let store = Arc::new(MemoryStore::new());
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store)?;
    Ok(registry)
}

/// Run the full lifecycle: init, start, serve until shutdown, stop
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let registry = build_registry()?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    let served = recipe_http::start_server(&registry, &settings).await;

    // Stop modules even when serving failed, then report the first error.
    let stopped = registry.stop_modules().await;
    served?;
    stopped
}
