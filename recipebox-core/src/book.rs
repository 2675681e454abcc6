//! The recipe collection and the operations a user performs on it.

use crate::error::{AggregateError, RecipeError};
use crate::shopping_list::{aggregate, RecipeSource, ShoppingList};
use crate::store::{JsonStore, RecipeFile};
use crate::types::{NewRecipe, Recipe, RecipeId};

/// A loaded recipe collection. Every mutation is saved immediately.
pub struct RecipeBook {
    store: JsonStore,
    file: RecipeFile,
}

impl RecipeBook {
    /// Load the collection from `store`.
    pub fn open(store: JsonStore) -> Result<Self, RecipeError> {
        let file = store.load()?;
        Ok(Self { store, file })
    }

    /// Add a recipe and return it with its assigned id.
    ///
    /// The name and category are trimmed; an empty category is dropped.
    pub fn add(&mut self, new: NewRecipe) -> Result<&Recipe, RecipeError> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(RecipeError::EmptyName);
        }
        if new
            .ingredients
            .iter()
            .any(|ingredient| ingredient.name.trim().is_empty())
        {
            return Err(RecipeError::EmptyIngredientName);
        }

        let category = new
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        let id = self.file.next_id;
        let next_id = id.checked_add(1).ok_or(RecipeError::IdsExhausted)?;
        self.file.recipes.push(Recipe {
            id,
            name: name.to_string(),
            ingredients: new.ingredients,
            steps: new.steps,
            favorite: new.favorite,
            category,
        });
        self.file.next_id = next_id;

        if let Err(error) = self.store.save(&self.file) {
            self.file.recipes.pop();
            self.file.next_id = id;
            return Err(error.into());
        }

        tracing::info!(id, "added recipe");
        Ok(&self.file.recipes[self.file.recipes.len() - 1])
    }

    /// All recipes in the order they were added.
    pub fn recipes(&self) -> &[Recipe] {
        &self.file.recipes
    }

    pub fn get(&self, id: RecipeId) -> Option<&Recipe> {
        self.file.recipes.iter().find(|recipe| recipe.id == id)
    }

    pub fn len(&self) -> usize {
        self.file.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file.recipes.is_empty()
    }

    pub fn favorites(&self) -> Vec<&Recipe> {
        self.file.recipes.iter().filter(|r| r.favorite).collect()
    }

    pub fn favorite_count(&self) -> usize {
        self.file.recipes.iter().filter(|r| r.favorite).count()
    }

    /// Case-insensitive substring search over recipe and ingredient names.
    ///
    /// A blank term matches nothing. Each recipe appears at most once.
    pub fn search(&self, term: &str) -> Vec<&Recipe> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return Vec::new();
        }

        self.file
            .recipes
            .iter()
            .filter(|recipe| {
                recipe.name.to_lowercase().contains(&term)
                    || recipe
                        .ingredients
                        .iter()
                        .any(|ingredient| ingredient.name.to_lowercase().contains(&term))
            })
            .collect()
    }

    /// Flip the favorite flag and return the new value.
    pub fn toggle_favorite(&mut self, id: RecipeId) -> Result<bool, RecipeError> {
        let recipe = self
            .file
            .recipes
            .iter_mut()
            .find(|recipe| recipe.id == id)
            .ok_or(RecipeError::NotFound(id))?;
        recipe.favorite = !recipe.favorite;
        let favorite = recipe.favorite;

        if let Err(error) = self.store.save(&self.file) {
            if let Some(recipe) = self.file.recipes.iter_mut().find(|r| r.id == id) {
                recipe.favorite = !favorite;
            }
            return Err(error.into());
        }

        tracing::info!(id, favorite, "toggled favorite");
        Ok(favorite)
    }

    /// Remove a recipe and return it. Its id is never handed out again.
    pub fn delete(&mut self, id: RecipeId) -> Result<Recipe, RecipeError> {
        let idx = self
            .file
            .recipes
            .iter()
            .position(|recipe| recipe.id == id)
            .ok_or(RecipeError::NotFound(id))?;
        let removed = self.file.recipes.remove(idx);

        if let Err(error) = self.store.save(&self.file) {
            self.file.recipes.insert(idx, removed);
            return Err(error.into());
        }

        tracing::info!(id, "deleted recipe");
        Ok(removed)
    }

    /// Aggregate a shopping list for the selected recipes.
    pub fn shopping_list(&self, selected: &[RecipeId]) -> Result<ShoppingList, AggregateError> {
        aggregate(&self.file.recipes, selected)
    }
}

impl RecipeSource for RecipeBook {
    fn get_by_id(&self, id: RecipeId) -> Option<&Recipe> {
        self.get(id)
    }
}
