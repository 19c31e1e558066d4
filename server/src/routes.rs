use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use recipe_core::{Recipe, RecipeFilter, RecipeInput};
use serde::{Deserialize, Serialize};

use crate::context::AppContext;
use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub category: Option<String>,
    pub keywords: Option<String>,
}

impl From<ListParams> for RecipeFilter {
    fn from(params: ListParams) -> Self {
        RecipeFilter { category: params.category, search: params.search, keywords: params.keywords }
    }
}

#[derive(Debug, Serialize)]
pub struct Confirmation {
    pub message: &'static str,
}

pub async fn list_recipes(
    State(ctx): State<AppContext>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Recipe>>, ApiError> {
    let store = ctx.store().await.map_err(ApiError::connection)?;
    let filter = RecipeFilter::from(params);
    let recipes = store
        .find(&filter)
        .map_err(|e| ApiError::store(e, "failed to load recipes"))?;
    tracing::debug!(hits = recipes.len(), ?filter, "listed recipes");
    Ok(Json(recipes))
}

pub async fn get_recipe(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<Recipe>, ApiError> {
    let store = ctx.store().await.map_err(ApiError::connection)?;
    let recipe = store
        .find_by_id(&id)
        .map_err(|e| ApiError::store(e, "failed to load recipe"))?;
    Ok(Json(recipe))
}

pub async fn create_recipe(
    State(ctx): State<AppContext>,
    payload: Result<Json<RecipeInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Recipe>), ApiError> {
    let Json(input) = payload?;
    let store = ctx.store().await.map_err(ApiError::connection)?;
    let recipe = store
        .insert(input)
        .map_err(|e| ApiError::store(e, "failed to save recipe"))?;
    tracing::info!(id = %recipe.id, title = %recipe.title, "recipe created");
    Ok((StatusCode::CREATED, Json(recipe)))
}

pub async fn update_recipe(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    payload: Result<Json<RecipeInput>, JsonRejection>,
) -> Result<Json<Recipe>, ApiError> {
    let Json(input) = payload?;
    let store = ctx.store().await.map_err(ApiError::connection)?;
    let recipe = store
        .replace(&id, input)
        .map_err(|e| ApiError::store(e, "failed to update recipe"))?;
    tracing::info!(id = %recipe.id, "recipe updated");
    Ok(Json(recipe))
}

pub async fn delete_recipe(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<Confirmation>, ApiError> {
    let store = ctx.store().await.map_err(ApiError::connection)?;
    store
        .delete(&id)
        .map_err(|e| ApiError::store(e, "failed to delete recipe"))?;
    tracing::info!(%id, "recipe deleted");
    Ok(Json(Confirmation { message: "recipe deleted" }))
}
