use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use recipe_db::{StoreError, UserStore};
use recipe_http::AppError;
use serde_json::Value;

use super::serializer::{UserSerializer, DUPLICATE_EMAIL};
use crate::validation::{Representation, ValidationErrors};

pub type UserState = Arc<dyn UserStore>;

/// Result of a creation attempt that did not fail outright.
#[derive(Debug)]
pub enum CreateOutcome {
    Created(Representation),
    Invalid(ValidationErrors),
}

/// Validate `payload` and persist it through `store`.
///
/// Nothing is written when validation fails. Storage faults are returned as
/// errors rather than outcomes.
pub async fn create(payload: &Value, store: &dyn UserStore) -> anyhow::Result<CreateOutcome> {
    let serializer = UserSerializer;

    let input = match serializer.validate(payload, store).await? {
        Ok(input) => input,
        Err(errors) => return Ok(CreateOutcome::Invalid(errors)),
    };

    let row = serializer.prepare(input).await?;
    match store.insert(row).await {
        Ok(user) => {
            tracing::info!(user_id = user.id, "user created");
            Ok(CreateOutcome::Created(serializer.to_representation(&user)))
        }
        // Lost a race with a concurrent signup for the same address.
        Err(StoreError::Duplicate { .. }) => Ok(CreateOutcome::Invalid(
            ValidationErrors::single("email", DUPLICATE_EMAIL),
        )),
        Err(err) => Err(err.into()),
    }
}

/// POST /create
pub async fn create_user(
    State(store): State<UserState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Representation>), AppError> {
    let Json(payload) = payload?;

    match create(&payload, store.as_ref()).await? {
        CreateOutcome::Created(repr) => Ok((StatusCode::CREATED, Json(repr))),
        CreateOutcome::Invalid(errors) => {
            tracing::debug!(fields = errors.errors().len(), "user payload rejected");
            Err(errors.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::response::IntoResponse;
    use http_body_util::BodyExt;
    use recipe_db::{MemoryStore, NewUser, User};
    use serde_json::json;

    /// A store whose backend is down.
    struct UnavailableStore;

    #[async_trait]
    impl UserStore for UnavailableStore {
        async fn insert(&self, _user: NewUser) -> Result<User, StoreError> {
            Err(anyhow::anyhow!("connection refused").into())
        }

        async fn find_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
            Err(anyhow::anyhow!("connection refused").into())
        }

        async fn count(&self) -> Result<usize, StoreError> {
            Err(anyhow::anyhow!("connection refused").into())
        }
    }

    fn signup() -> Value {
        json!({"email": "cook@example.com", "password": "secret", "name": "Cook"})
    }

    #[tokio::test]
    async fn valid_payload_is_created() {
        let store = MemoryStore::new();
        let payload = json!({"email": "cook@example.com", "password": "secret", "name": "Cook"});

        let outcome = create(&payload, &store).await.unwrap();

        let CreateOutcome::Created(repr) = outcome else {
            panic!("expected creation, got {outcome:?}");
        };
        assert_eq!(
            serde_json::to_value(&repr).unwrap(),
            json!({"email": "cook@example.com", "name": "Cook"})
        );
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn invalid_payload_persists_nothing() {
        let store = MemoryStore::new();
        let payload = json!({"email": "cook@example.com", "password": "pw", "name": "Cook"});

        let outcome = create(&payload, &store).await.unwrap();

        assert!(matches!(outcome, CreateOutcome::Invalid(ref e) if e.has_field("password")));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn second_signup_with_same_email_is_invalid() {
        let store = MemoryStore::new();
        let payload = json!({"email": "cook@example.com", "password": "secret", "name": "Cook"});

        create(&payload, &store).await.unwrap();
        let outcome = create(&payload, &store).await.unwrap();

        assert!(matches!(outcome, CreateOutcome::Invalid(ref e) if e.has_field("email")));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn store_failure_is_an_error_not_an_outcome() {
        let result = create(&signup(), &UnavailableStore).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn store_failure_answers_internal_error() {
        let store: UserState = Arc::new(UnavailableStore);

        let err = create_user(State(store), Ok(Json(signup())))
            .await
            .unwrap_err();
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"]["code"], "internal_error");
    }
}
