//! Entities and the storage collaborators the API modules are handed.
//!
//! Stores are injected as trait objects; [`MemoryStore`] is the bundled
//! implementation.

pub mod memory;
pub mod models;
pub mod price;
pub mod store;

pub use memory::MemoryStore;
pub use models::{NewRecipe, NewUser, Recipe, RecipeChanges, User};
pub use price::{Price, PriceError};
pub use store::{RecipeStore, StoreError, UserStore};
