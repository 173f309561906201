pub mod serializers;
pub mod views;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Router};
use recipe_db::RecipeStore;
use recipe_kernel::{InitCtx, Module};
use serde_json::json;

/// Recipe endpoints, mounted under `/api/recipe`
pub struct RecipeModule {
    store: Arc<dyn RecipeStore>,
}

impl RecipeModule {
    pub fn new(store: Arc<dyn RecipeStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for RecipeModule {
    fn name(&self) -> &'static str {
        "recipe"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "recipe module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route(
                "/recipes",
                get(views::list_recipes).post(views::create_recipe),
            )
            .route(
                "/recipes/{id}",
                get(views::get_recipe)
                    .put(views::update_recipe)
                    .patch(views::partial_update_recipe)
                    .delete(views::delete_recipe),
            )
            .with_state(Arc::clone(&self.store))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let id_param = json!({
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "integer", "format": "int64" }
        });
        let error = json!({
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        });
        let detail_body = json!({
            "application/json": {
                "schema": { "$ref": "#/components/schemas/RecipeDetail" }
            }
        });

        Some(json!({
            "paths": {
                "/recipes": {
                    "get": {
                        "summary": "List recipes",
                        "tags": ["Recipes"],
                        "responses": {
                            "200": {
                                "description": "Recipes, newest first",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Recipe" }
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "post": {
                        "summary": "Create a recipe",
                        "tags": ["Recipes"],
                        "requestBody": { "required": true, "content": detail_body },
                        "responses": {
                            "201": { "description": "Recipe created", "content": detail_body },
                            "400": { "description": "Malformed body", "content": error },
                            "422": { "description": "Validation error", "content": error }
                        }
                    }
                },
                "/recipes/{id}": {
                    "parameters": [id_param],
                    "get": {
                        "summary": "Get recipe detail",
                        "tags": ["Recipes"],
                        "responses": {
                            "200": { "description": "Recipe detail", "content": detail_body },
                            "404": { "description": "Recipe not found", "content": error }
                        }
                    },
                    "put": {
                        "summary": "Replace a recipe",
                        "tags": ["Recipes"],
                        "requestBody": { "required": true, "content": detail_body },
                        "responses": {
                            "200": { "description": "Recipe updated", "content": detail_body },
                            "404": { "description": "Recipe not found", "content": error },
                            "422": { "description": "Validation error", "content": error }
                        }
                    },
                    "patch": {
                        "summary": "Update some recipe fields",
                        "tags": ["Recipes"],
                        "requestBody": { "required": true, "content": detail_body },
                        "responses": {
                            "200": { "description": "Recipe updated", "content": detail_body },
                            "404": { "description": "Recipe not found", "content": error },
                            "422": { "description": "Validation error", "content": error }
                        }
                    },
                    "delete": {
                        "summary": "Delete a recipe",
                        "tags": ["Recipes"],
                        "responses": {
                            "204": { "description": "Recipe deleted" },
                            "404": { "description": "Recipe not found", "content": error }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Recipe": recipe_schema(false),
                    "RecipeDetail": recipe_schema(true)
                }
            }
        }))
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "recipe module stopped");
        Ok(())
    }
}

fn recipe_schema(detail: bool) -> serde_json::Value {
    let mut schema = json!({
        "type": "object",
        "properties": {
            "id": { "type": "integer", "format": "int64", "readOnly": true },
            "title": { "type": "string", "maxLength": 255 },
            "time_minutes": { "type": "integer", "format": "int32" },
            "price": { "type": "string", "format": "decimal", "example": "5.00" },
            "link": { "type": "string", "maxLength": 255 }
        },
        "required": ["title", "time_minutes", "price"]
    });
    if detail {
        schema["properties"]["description"] = json!({ "type": "string" });
    }
    schema
}

/// Create a new instance of the recipe module
pub fn create_module(store: Arc<dyn RecipeStore>) -> Arc<dyn Module> {
    Arc::new(RecipeModule::new(store))
}
