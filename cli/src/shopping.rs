use anyhow::{Context, Result};
use recipebox_core::{RecipeBook, RecipeId};

/// Aggregate and print a shopping list for the selected recipes.
pub fn print(book: &RecipeBook, ids: &[RecipeId], json: bool) -> Result<()> {
    let list = book
        .shopping_list(ids)
        .context("Failed to build shopping list")?;

    if json {
        let out = serde_json::to_string_pretty(&list)?;
        println!("{}", out);
        return Ok(());
    }

    println!("{}", list);
    if !list.is_empty() {
        println!(
            "\n{} ingredient(s) from {} entr{}",
            list.ingredient_count(),
            list.total_entries(),
            if list.total_entries() == 1 { "y" } else { "ies" }
        );
    }

    Ok(())
}
