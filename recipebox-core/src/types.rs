use std::fmt;

use serde::{Deserialize, Serialize};

/// Store-assigned recipe identifier. Positive, increasing, never reused.
pub type RecipeId = u64;

/// A single ingredient line as the user entered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientEntry {
    pub name: String,
    /// Free-text quantity, kept verbatim ("200g", "2", "a pinch").
    pub quantity: String,
}

impl IngredientEntry {
    pub fn new(name: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
        }
    }
}

impl fmt::Display for IngredientEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.quantity)
    }
}

/// A stored recipe record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<IngredientEntry>,
    #[serde(default)]
    pub steps: String,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.id, self.name)?;
        if let Some(category) = &self.category {
            write!(f, " [{}]", category)?;
        }
        if self.favorite {
            write!(f, " ★")?;
        }
        Ok(())
    }
}

/// Fields supplied by the user when adding a recipe. The id is assigned by the book.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewRecipe {
    pub name: String,
    pub ingredients: Vec<IngredientEntry>,
    pub steps: String,
    pub favorite: bool,
    pub category: Option<String>,
}
