//! Recipe representation mapping.
//!
//! A serializer is just an ordered field list. The detail variant is the base
//! list with `description` appended, so adding a field to the base list
//! carries over to the detail view automatically.

use once_cell::sync::Lazy;
use recipe_db::{NewRecipe, Recipe, RecipeChanges};
use serde_json::Value;

use crate::validation::{
    char_field, decimal_field, expect_object, integer_field, CharRules, Representation,
    ValidationErrors, NON_FIELD_ERRORS, REQUIRED,
};

const TITLE_MAX_LENGTH: usize = 255;
const LINK_MAX_LENGTH: usize = 255;

/// A recipe attribute that can take part in a representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeField {
    Id,
    Title,
    TimeMinutes,
    Price,
    Link,
    Description,
}

impl RecipeField {
    pub const fn name(self) -> &'static str {
        match self {
            RecipeField::Id => "id",
            RecipeField::Title => "title",
            RecipeField::TimeMinutes => "time_minutes",
            RecipeField::Price => "price",
            RecipeField::Link => "link",
            RecipeField::Description => "description",
        }
    }

    /// Emitted on output, never taken from input.
    pub const fn is_read_only(self) -> bool {
        matches!(self, RecipeField::Id)
    }

    /// Must be present on create and full update.
    pub const fn is_required(self) -> bool {
        matches!(
            self,
            RecipeField::Title | RecipeField::TimeMinutes | RecipeField::Price
        )
    }

    fn value_of(self, recipe: &Recipe) -> Value {
        match self {
            RecipeField::Id => recipe.id.into(),
            RecipeField::Title => recipe.title.clone().into(),
            RecipeField::TimeMinutes => recipe.time_minutes.into(),
            RecipeField::Price => recipe.price.to_string().into(),
            RecipeField::Link => recipe.link.clone().into(),
            RecipeField::Description => recipe.description.clone().into(),
        }
    }
}

pub const RECIPE_FIELDS: &[RecipeField] = &[
    RecipeField::Id,
    RecipeField::Title,
    RecipeField::TimeMinutes,
    RecipeField::Price,
    RecipeField::Link,
];

pub static RECIPE_DETAIL_FIELDS: Lazy<Vec<RecipeField>> =
    Lazy::new(|| [RECIPE_FIELDS, &[RecipeField::Description][..]].concat());

/// Maps recipes to and from their wire form for one field list.
#[derive(Debug, Clone, Copy)]
pub struct RecipeSerializer {
    fields: &'static [RecipeField],
}

impl RecipeSerializer {
    /// List view: `id, title, time_minutes, price, link`
    pub fn base() -> Self {
        Self {
            fields: RECIPE_FIELDS,
        }
    }

    /// Detail view: the base fields plus `description`
    pub fn detail() -> Self {
        Self {
            fields: RECIPE_DETAIL_FIELDS.as_slice(),
        }
    }

    pub fn fields(&self) -> &'static [RecipeField] {
        self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> {
        let fields = self.fields;
        fields.iter().map(|field| field.name())
    }

    pub fn to_representation(&self, recipe: &Recipe) -> Representation {
        let mut repr = Representation::new();
        for field in self.fields {
            repr.insert(field.name(), field.value_of(recipe));
        }
        repr
    }

    /// Validate a create payload. Absent optional fields default to empty.
    pub fn validate_create(&self, input: &Value) -> Result<NewRecipe, ValidationErrors> {
        let changes = self.validate_fields(input, true)?;

        let RecipeChanges {
            title: Some(title),
            time_minutes: Some(time_minutes),
            price: Some(price),
            link,
            description,
        } = changes
        else {
            // Required fields were checked above; this only guards the
            // destructuring.
            return Err(ValidationErrors::single(NON_FIELD_ERRORS, REQUIRED));
        };

        Ok(NewRecipe {
            title,
            time_minutes,
            price,
            link: link.unwrap_or_default(),
            description: description.unwrap_or_default(),
        })
    }

    /// Validate an update payload. With `partial` set, absent required
    /// fields are not reported.
    pub fn validate_update(
        &self,
        input: &Value,
        partial: bool,
    ) -> Result<RecipeChanges, ValidationErrors> {
        self.validate_fields(input, !partial)
    }

    fn validate_fields(
        &self,
        input: &Value,
        require: bool,
    ) -> Result<RecipeChanges, ValidationErrors> {
        let object = expect_object(input)?;
        let mut changes = RecipeChanges::default();
        let mut errors = ValidationErrors::new();

        for &field in self.fields.iter().filter(|f| !f.is_read_only()) {
            let Some(value) = object.get(field.name()) else {
                if require && field.is_required() {
                    errors.add(field.name(), REQUIRED);
                }
                continue;
            };

            let outcome = match field {
                RecipeField::Title => {
                    char_field(value, CharRules::required_text(TITLE_MAX_LENGTH))
                        .map(|v| changes.title = Some(v))
                }
                RecipeField::TimeMinutes => {
                    integer_field(value).map(|v| changes.time_minutes = Some(v))
                }
                RecipeField::Price => decimal_field(value).map(|v| changes.price = Some(v)),
                RecipeField::Link => {
                    char_field(value, CharRules::optional_text(Some(LINK_MAX_LENGTH)))
                        .map(|v| changes.link = Some(v))
                }
                RecipeField::Description => char_field(value, CharRules::optional_text(None))
                    .map(|v| changes.description = Some(v)),
                RecipeField::Id => Ok(()),
            };

            if let Err(message) = outcome {
                errors.add(field.name(), message);
            }
        }

        errors.into_result()?;
        Ok(changes)
    }
}
