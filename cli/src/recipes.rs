use anyhow::{bail, Context, Result};
use recipebox_core::{IngredientEntry, NewRecipe, Recipe, RecipeBook, RecipeId};
use std::io::{self, BufRead, Write};

/// Add a recipe and print its assigned id.
pub fn add(
    book: &mut RecipeBook,
    name: String,
    ingredients: Vec<IngredientEntry>,
    steps: String,
    category: Option<String>,
    favorite: bool,
) -> Result<()> {
    let recipe = book
        .add(NewRecipe {
            name,
            ingredients,
            steps,
            favorite,
            category,
        })
        .context("Failed to add recipe")?;

    println!("Added recipe '{}' (id {})", recipe.name, recipe.id);

    Ok(())
}

pub fn list(book: &RecipeBook) {
    if book.is_empty() {
        println!("No recipes found. Add some recipes to get started!");
        return;
    }

    println!("All recipes ({} total):", book.len());
    print_summaries(book.recipes().iter());
}

pub fn view(book: &RecipeBook, id: RecipeId) -> Result<()> {
    let Some(recipe) = book.get(id) else {
        bail!("Recipe {} not found", id);
    };

    print!("{}", render_detail(recipe));

    Ok(())
}

pub fn search(book: &RecipeBook, term: &str) {
    let matches = book.search(term);
    if matches.is_empty() {
        println!("No recipes match '{}'", term.trim());
        return;
    }

    println!("{} recipe(s) matching '{}':", matches.len(), term.trim());
    print_summaries(matches.into_iter());
}

pub fn favorites(book: &RecipeBook) {
    let favorites = book.favorites();
    if favorites.is_empty() {
        println!("No favorite recipes yet.");
        return;
    }

    println!("Favorite recipes ({}):", favorites.len());
    print_summaries(favorites.into_iter());
}

pub fn toggle(book: &mut RecipeBook, id: RecipeId) -> Result<()> {
    let favorite = book.toggle_favorite(id)?;

    if favorite {
        println!("Recipe {} marked as favorite", id);
    } else {
        println!("Recipe {} removed from favorites", id);
    }

    Ok(())
}

/// Delete a recipe, asking for confirmation on stdin unless `yes` is set.
pub fn delete(book: &mut RecipeBook, id: RecipeId, yes: bool) -> Result<()> {
    let Some(recipe) = book.get(id) else {
        bail!("Recipe {} not found", id);
    };

    if !yes {
        let prompt = format!("Are you sure you want to delete '{}'? (y/n): ", recipe.name);
        if !confirm(&prompt)? {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    let removed = book.delete(id)?;
    println!("Deleted recipe '{}'", removed.name);

    Ok(())
}

fn print_summaries<'a>(recipes: impl Iterator<Item = &'a Recipe>) {
    for recipe in recipes {
        println!("  {}", recipe);
    }
}

fn render_detail(recipe: &Recipe) -> String {
    let mut out = String::new();
    out.push_str(&format!("Recipe: {}\n", recipe.name));
    out.push_str(&format!("ID: {}\n", recipe.id));
    if let Some(category) = &recipe.category {
        out.push_str(&format!("Category: {}\n", category));
    }
    out.push_str(&format!(
        "Favorite: {}\n",
        if recipe.favorite { "Yes" } else { "No" }
    ));

    out.push_str("\nIngredients:\n");
    if recipe.ingredients.is_empty() {
        out.push_str("  (none)\n");
    }
    for ingredient in &recipe.ingredients {
        out.push_str(&format!("  - {}\n", ingredient));
    }

    out.push_str("\nSteps:\n");
    for line in recipe.steps.lines() {
        out.push_str(&format!("  {}\n", line));
    }

    out
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
