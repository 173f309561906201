pub mod serializer;
pub mod views;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::post, Router};
use recipe_db::UserStore;
use recipe_kernel::{InitCtx, Module};
use serde_json::json;

/// User creation endpoint, mounted under `/api/user`
pub struct UserModule {
    store: Arc<dyn UserStore>,
}

impl UserModule {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for UserModule {
    fn name(&self) -> &'static str {
        "user"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "user module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/create", post(views::create_user))
            .with_state(Arc::clone(&self.store))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/create": {
                    "post": {
                        "summary": "Create a new user",
                        "tags": ["Users"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/CreateUser" }
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "description": "User created",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/User" }
                                    }
                                }
                            },
                            "422": {
                                "description": "Validation error",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "User": {
                        "type": "object",
                        "properties": {
                            "email": { "type": "string", "format": "email" },
                            "name": { "type": "string" }
                        },
                        "required": ["email", "name"]
                    },
                    "CreateUser": {
                        "type": "object",
                        "properties": {
                            "email": { "type": "string", "format": "email", "maxLength": 255 },
                            "password": { "type": "string", "format": "password", "minLength": 5, "writeOnly": true },
                            "name": { "type": "string", "maxLength": 255 }
                        },
                        "required": ["email", "password", "name"]
                    }
                }
            }
        }))
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "user module stopped");
        Ok(())
    }
}

/// Create a new instance of the user module
pub fn create_module(store: Arc<dyn UserStore>) -> Arc<dyn Module> {
    Arc::new(UserModule::new(store))
}
