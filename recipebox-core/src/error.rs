use std::path::PathBuf;

use thiserror::Error;

use crate::types::RecipeId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    #[error("Recipe not found: {}", join_ids(.ids))]
    RecipeNotFound { ids: Vec<RecipeId> },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Recipe file {} is corrupted and no usable backup exists: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to serialize recipes: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum RecipeError {
    #[error("Recipe name cannot be empty")]
    EmptyName,

    #[error("Ingredient name cannot be empty")]
    EmptyIngredientName,

    #[error("Recipe {0} not found")]
    NotFound(RecipeId),

    #[error("No recipe ids left to assign")]
    IdsExhausted,

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn join_ids(ids: &[RecipeId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
