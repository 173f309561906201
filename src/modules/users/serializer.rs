//! User representation mapping: `email, password, name`, with `password`
//! write-only.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use recipe_db::{NewUser, User, UserStore};
use serde_json::Value;
use validator::ValidateEmail;

use crate::validation::{
    char_field, expect_object, CharRules, Representation, ValidationErrors, INVALID_EMAIL,
    REQUIRED,
};

const EMAIL_MAX_LENGTH: usize = 255;
const NAME_MAX_LENGTH: usize = 255;
const PASSWORD_MIN_LENGTH: usize = 5;

pub const DUPLICATE_EMAIL: &str = "user with this email already exists.";

/// Field order on input; `password` never appears on output.
pub const USER_FIELDS: &[&str] = &["email", "password", "name"];

/// A creation payload that passed validation.
#[derive(Clone, PartialEq, Eq)]
pub struct UserInput {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl std::fmt::Debug for UserInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserInput")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UserSerializer;

impl UserSerializer {
    pub fn to_representation(&self, user: &User) -> Representation {
        let mut repr = Representation::new();
        repr.insert("email", user.email.clone().into());
        repr.insert("name", user.name.clone().into());
        repr
    }

    /// Check the payload shape and field rules, then email uniqueness.
    pub async fn validate(
        &self,
        input: &Value,
        store: &dyn UserStore,
    ) -> anyhow::Result<Result<UserInput, ValidationErrors>> {
        let fields = match self.validate_fields(input) {
            Ok(fields) => fields,
            Err(errors) => return Ok(Err(errors)),
        };

        if store.find_by_email(&fields.email).await?.is_some() {
            return Ok(Err(ValidationErrors::single("email", DUPLICATE_EMAIL)));
        }

        Ok(Ok(fields))
    }

    /// Field-level rules that need no storage access.
    pub fn validate_fields(&self, input: &Value) -> Result<UserInput, ValidationErrors> {
        let object = expect_object(input)?;
        let mut errors = ValidationErrors::new();

        let mut take = |name: &'static str, rules: CharRules| match object.get(name) {
            None => {
                errors.add(name, REQUIRED);
                None
            }
            Some(value) => match char_field(value, rules) {
                Ok(text) => Some(text),
                Err(message) => {
                    errors.add(name, message);
                    None
                }
            },
        };

        let email = take("email", CharRules::required_text(EMAIL_MAX_LENGTH));
        let password = take(
            "password",
            CharRules {
                max_length: None,
                min_length: Some(PASSWORD_MIN_LENGTH),
                allow_blank: false,
            },
        );
        let name = take("name", CharRules::required_text(NAME_MAX_LENGTH));

        let email = email.and_then(|email| {
            if email.validate_email() {
                Some(normalize_email(&email))
            } else {
                errors.add("email", INVALID_EMAIL);
                None
            }
        });

        match (email, password, name) {
            (Some(email), Some(password), Some(name)) if errors.is_empty() => Ok(UserInput {
                email,
                name,
                password,
            }),
            _ => Err(errors),
        }
    }

    /// Hash the password and build the row to persist.
    pub async fn prepare(&self, input: UserInput) -> anyhow::Result<NewUser> {
        let UserInput {
            email,
            name,
            password,
        } = input;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;

        Ok(NewUser {
            email,
            name,
            password_hash,
        })
    }
}

/// Lower-case the domain part; the local part is case-sensitive.
pub fn normalize_email(email: &str) -> String {
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?;
    Ok(hash.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::{PasswordHash, PasswordVerifier};
    use recipe_db::MemoryStore;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "email": "Cook@Example.COM",
            "password": "secret-pass",
            "name": "Test Cook"
        })
    }

    #[test]
    fn valid_payload_is_normalized() {
        let input = UserSerializer.validate_fields(&payload()).unwrap();
        assert_eq!(input.email, "Cook@example.com");
        assert_eq!(input.name, "Test Cook");
    }

    #[test]
    fn missing_and_invalid_fields_are_reported_together() {
        let errors = UserSerializer
            .validate_fields(&json!({"email": "not-an-email", "password": "abc"}))
            .unwrap_err();

        assert_eq!(
            errors.for_field("email").collect::<Vec<_>>(),
            vec![INVALID_EMAIL]
        );
        assert_eq!(
            errors.for_field("password").collect::<Vec<_>>(),
            vec!["Ensure this field has at least 5 characters."]
        );
        assert_eq!(errors.for_field("name").collect::<Vec<_>>(), vec![REQUIRED]);
    }

    #[test]
    fn representation_omits_password() {
        let user = User {
            id: 3,
            email: "cook@example.com".to_string(),
            name: "Cook".to_string(),
            password_hash: "hash".to_string(),
        };

        let repr = UserSerializer.to_representation(&user);
        assert_eq!(repr.keys().copied().collect::<Vec<_>>(), vec!["email", "name"]);
        assert!(repr.get("password").is_none());
    }

    #[test]
    fn debug_redacts_password() {
        let input = UserSerializer.validate_fields(&payload()).unwrap();
        let rendered = format!("{input:?}");
        assert!(!rendered.contains("secret-pass"));
    }

    #[tokio::test]
    async fn taken_email_is_a_field_error() {
        let store = MemoryStore::new();
        let input = UserSerializer.validate_fields(&payload()).unwrap();
        let row = UserSerializer.prepare(input).await.unwrap();
        UserStore::insert(&store, row).await.unwrap();

        let errors = UserSerializer
            .validate(&payload(), &store)
            .await
            .unwrap()
            .unwrap_err();
        assert_eq!(
            errors.for_field("email").collect::<Vec<_>>(),
            vec![DUPLICATE_EMAIL]
        );
    }

    #[tokio::test]
    async fn prepared_hash_verifies() {
        let input = UserSerializer.validate_fields(&payload()).unwrap();
        let row = UserSerializer.prepare(input).await.unwrap();

        assert_ne!(row.password_hash, "secret-pass");
        let parsed = PasswordHash::new(&row.password_hash).unwrap();
        assert!(Argon2::default()
            .verify_password(b"secret-pass", &parsed)
            .is_ok());
    }
}
