use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

use crate::error::StoreError;
use crate::RecipeId;

/// Validation message for a missing or blank title.
pub const TITLE_REQUIRED: &str = "title is required";

/// Dish categories a recipe can be filed under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Starter,
    Main,
    Dessert,
    Soup,
    Salad,
    Snack,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Starter,
        Category::Main,
        Category::Dessert,
        Category::Soup,
        Category::Salad,
        Category::Snack,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Starter => "starter",
            Category::Main => "main",
            Category::Dessert => "dessert",
            Category::Soup => "soup",
            Category::Salad => "salad",
            Category::Snack => "snack",
            Category::Other => "other",
        }
    }

    /// Case-insensitive lookup; `None` for anything outside the enumeration.
    pub fn parse(value: &str) -> Option<Category> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(value))
    }

    /// Unknown or missing values fall back to [`Category::Other`].
    pub fn coerce(value: Option<&str>) -> Category {
        value.and_then(Category::parse).unwrap_or_default()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    pub category: Category,
    pub ingredients: String,
    pub instructions: String,
    /// Reference to an externally hosted image, empty when absent.
    pub image_url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Write payload as submitted by a client. Every field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub ingredients: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// The mutable part of a [`Recipe`] after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeFields {
    pub title: String,
    pub category: Category,
    pub ingredients: String,
    pub instructions: String,
    pub image_url: String,
}

impl RecipeInput {
    pub fn titled(title: impl Into<String>) -> Self {
        Self { title: Some(title.into()), ..Self::default() }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_ingredients(mut self, ingredients: impl Into<String>) -> Self {
        self.ingredients = Some(ingredients.into());
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Trim and require the title, coerce the category, default the rest.
    /// Pure: touches no storage, so create and update share it.
    pub fn normalize(self) -> Result<RecipeFields, StoreError> {
        let title = self.title.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() {
            return Err(StoreError::validation(TITLE_REQUIRED));
        }
        Ok(RecipeFields {
            title: title.to_string(),
            category: Category::coerce(self.category.as_deref()),
            ingredients: self.ingredients.unwrap_or_default(),
            instructions: self.instructions.unwrap_or_default(),
            image_url: self.image_url.unwrap_or_default(),
        })
    }
}

impl Recipe {
    pub(crate) fn create(id: RecipeId, fields: RecipeFields, now: OffsetDateTime) -> Self {
        Self {
            id,
            title: fields.title,
            category: fields.category,
            ingredients: fields.ingredients,
            instructions: fields.instructions,
            image_url: fields.image_url,
            created_at: now,
            updated_at: now,
        }
    }

    /// Wholesale overwrite of the mutable fields; id and creation time stay.
    pub(crate) fn replaced(&self, fields: RecipeFields, now: OffsetDateTime) -> Self {
        Self {
            updated_at: now.max(self.created_at),
            ..Self::create(self.id.clone(), fields, self.created_at)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parse_is_case_insensitive() {
        assert_eq!(Category::parse("Soup"), Some(Category::Soup));
        assert_eq!(Category::parse(" dessert "), Some(Category::Dessert));
        assert_eq!(Category::parse("soep"), None);
    }

    #[test]
    fn unknown_category_coerces_to_other() {
        assert_eq!(Category::coerce(Some("breakfast")), Category::Other);
        assert_eq!(Category::coerce(None), Category::Other);
        assert_eq!(Category::coerce(Some("")), Category::Other);
    }

    #[test]
    fn normalize_trims_title_and_fills_defaults() {
        let fields = RecipeInput::titled("  Pea soup ").normalize().unwrap();
        assert_eq!(fields.title, "Pea soup");
        assert_eq!(fields.category, Category::Other);
        assert!(fields.ingredients.is_empty());
        assert!(fields.instructions.is_empty());
        assert!(fields.image_url.is_empty());
    }

    #[test]
    fn blank_title_is_rejected() {
        for title in [None, Some(""), Some("   \t")] {
            let input = RecipeInput { title: title.map(String::from), ..RecipeInput::default() };
            assert!(matches!(input.normalize(), Err(StoreError::Validation(_))));
        }
    }

    #[test]
    fn recipe_serializes_camel_case() {
        let now = time::macros::datetime!(2024-03-01 12:00 UTC);
        let fields = RecipeInput::titled("Tart").with_category("dessert").normalize().unwrap();
        let recipe = Recipe::create("00000000000000a1".into(), fields, now);
        let json = serde_json::to_value(&recipe).unwrap();
        assert_eq!(json["category"], "dessert");
        assert_eq!(json["imageUrl"], "");
        assert_eq!(json["createdAt"], "2024-03-01T12:00:00Z");
    }
}
