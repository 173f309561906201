use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use recipe_db::RecipeStore;
use recipe_http::AppError;
use serde_json::Value;

use super::serializers::RecipeSerializer;
use crate::modules::store_error;
use crate::validation::Representation;

pub type RecipeState = Arc<dyn RecipeStore>;

/// GET /recipes
pub async fn list_recipes(
    State(store): State<RecipeState>,
) -> Result<Json<Vec<Representation>>, AppError> {
    let serializer = RecipeSerializer::base();
    let recipes = store.list().await.map_err(store_error)?;

    Ok(Json(
        recipes
            .iter()
            .map(|recipe| serializer.to_representation(recipe))
            .collect(),
    ))
}

/// POST /recipes
pub async fn create_recipe(
    State(store): State<RecipeState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Representation>), AppError> {
    let Json(payload) = payload?;
    let serializer = RecipeSerializer::detail();

    let new_recipe = serializer.validate_create(&payload)?;
    let recipe = store.insert(new_recipe).await.map_err(store_error)?;

    tracing::info!(recipe_id = recipe.id, "recipe created");
    Ok((
        StatusCode::CREATED,
        Json(serializer.to_representation(&recipe)),
    ))
}

/// GET /recipes/{id}
pub async fn get_recipe(
    State(store): State<RecipeState>,
    Path(id): Path<u64>,
) -> Result<Json<Representation>, AppError> {
    let recipe = store.get(id).await.map_err(store_error)?;
    Ok(Json(RecipeSerializer::detail().to_representation(&recipe)))
}

/// PUT /recipes/{id}
pub async fn update_recipe(
    state: State<RecipeState>,
    path: Path<u64>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Representation>, AppError> {
    apply_update(state, path, payload, false).await
}

/// PATCH /recipes/{id}
pub async fn partial_update_recipe(
    state: State<RecipeState>,
    path: Path<u64>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Representation>, AppError> {
    apply_update(state, path, payload, true).await
}

async fn apply_update(
    State(store): State<RecipeState>,
    Path(id): Path<u64>,
    payload: Result<Json<Value>, JsonRejection>,
    partial: bool,
) -> Result<Json<Representation>, AppError> {
    let Json(payload) = payload?;
    let serializer = RecipeSerializer::detail();

    // Unknown ids are reported before the body is judged.
    store.get(id).await.map_err(store_error)?;

    let changes = serializer.validate_update(&payload, partial)?;
    let recipe = store.update(id, changes).await.map_err(store_error)?;

    tracing::info!(recipe_id = id, partial, "recipe updated");
    Ok(Json(serializer.to_representation(&recipe)))
}

/// DELETE /recipes/{id}
pub async fn delete_recipe(
    State(store): State<RecipeState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    store.delete(id).await.map_err(store_error)?;

    tracing::info!(recipe_id = id, "recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}
