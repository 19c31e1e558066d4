//! Recipe catalog storage: the data model, input normalization and the
//! sled-backed store with its keyword index.

pub mod error;
pub mod index;
pub mod model;
pub mod query;
pub mod store;
pub mod tokenizer;

pub use error::StoreError;
pub use model::{Category, Recipe, RecipeFields, RecipeInput};
pub use query::RecipeFilter;
pub use store::RecipeStore;

pub type RecipeId = String;
