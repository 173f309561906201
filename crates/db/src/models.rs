use crate::price::Price;

/// Persisted recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    /// Store-assigned identifier
    pub id: u64,
    pub title: String,
    pub time_minutes: i32,
    pub price: Price,
    /// Optional source URL, empty when not given
    pub link: String,
    /// Free text, empty when not given
    pub description: String,
}

/// Values for a recipe that does not have an identifier yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecipe {
    pub title: String,
    pub time_minutes: i32,
    pub price: Price,
    pub link: String,
    pub description: String,
}

/// Field updates for an existing recipe; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeChanges {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Price>,
    pub link: Option<String>,
    pub description: Option<String>,
}

impl RecipeChanges {
    pub fn apply(self, recipe: &mut Recipe) {
        if let Some(title) = self.title {
            recipe.title = title;
        }
        if let Some(time_minutes) = self.time_minutes {
            recipe.time_minutes = time_minutes;
        }
        if let Some(price) = self.price {
            recipe.price = price;
        }
        if let Some(link) = self.link {
            recipe.link = link;
        }
        if let Some(description) = self.description {
            recipe.description = description;
        }
    }
}

/// Persisted user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    /// Normalized address, unique across users
    pub email: String,
    pub name: String,
    /// PHC-formatted password hash
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
}
