mod recipes;
mod shopping;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use recipebox_core::{IngredientEntry, JsonStore, RecipeBook, RecipeId};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "recipebox")]
#[command(about = "RecipeBox - your personal recipe collection", long_about = None)]
struct Cli {
    /// Recipe file (default: ~/.recipebox/recipes.json)
    #[arg(long, global = true, env = "RECIPEBOX_DATA")]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new recipe
    Add {
        /// Recipe name
        #[arg(long)]
        name: String,
        /// Ingredient as NAME:QUANTITY (repeatable), e.g. -i "Tomato:2" -i "Olive Oil:100 ml"
        #[arg(short = 'i', long = "ingredient", value_parser = parse_ingredient_arg)]
        ingredients: Vec<IngredientEntry>,
        /// Cooking steps
        #[arg(long, default_value = "")]
        steps: String,
        /// Optional category (e.g. breakfast, dinner)
        #[arg(long)]
        category: Option<String>,
        /// Mark as favorite
        #[arg(long)]
        favorite: bool,
    },
    /// List all recipes
    List,
    /// Show a recipe in detail
    View {
        id: RecipeId,
    },
    /// Search recipes by name or ingredient
    Search {
        term: String,
    },
    /// List favorite recipes
    Favorites,
    /// Toggle the favorite status of a recipe
    Toggle {
        id: RecipeId,
    },
    /// Delete a recipe
    Delete {
        id: RecipeId,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Build a combined shopping list from recipes
    Shopping {
        /// Recipe ids, in the order to list ingredients
        ids: Vec<RecipeId>,
        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let path = cli.data_file.unwrap_or_else(JsonStore::default_path);
    tracing::debug!(path = %path.display(), "using recipe file");

    let mut book = RecipeBook::open(JsonStore::new(&path))
        .with_context(|| format!("Failed to open recipes at {}", path.display()))?;

    match cli.command {
        Commands::Add {
            name,
            ingredients,
            steps,
            category,
            favorite,
        } => {
            recipes::add(&mut book, name, ingredients, steps, category, favorite)?;
        }
        Commands::List => recipes::list(&book),
        Commands::View { id } => recipes::view(&book, id)?,
        Commands::Search { term } => recipes::search(&book, &term),
        Commands::Favorites => recipes::favorites(&book),
        Commands::Toggle { id } => recipes::toggle(&mut book, id)?,
        Commands::Delete { id, yes } => recipes::delete(&mut book, id, yes)?,
        Commands::Shopping { ids, json } => shopping::print(&book, &ids, json)?,
    }

    Ok(())
}

/// Console logging to stderr, filtered by RUST_LOG (warnings by default).
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Parse "NAME:QUANTITY" into an ingredient entry. Splits at the first colon.
fn parse_ingredient_arg(s: &str) -> Result<IngredientEntry, String> {
    let (name, quantity) = s
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:QUANTITY, got '{}'", s))?;
    let name = name.trim();
    let quantity = quantity.trim();
    if name.is_empty() {
        return Err("ingredient name cannot be empty".to_string());
    }
    if quantity.is_empty() {
        return Err(format!("quantity for '{}' cannot be empty", name));
    }
    Ok(IngredientEntry::new(name, quantity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ingredient_arg() {
        assert_eq!(
            parse_ingredient_arg("Olive Oil: 100 ml").unwrap(),
            IngredientEntry::new("Olive Oil", "100 ml")
        );
        assert_eq!(
            parse_ingredient_arg("Salt:a pinch: or two").unwrap(),
            IngredientEntry::new("Salt", "a pinch: or two")
        );
        assert!(parse_ingredient_arg("Tomato").is_err());
        assert!(parse_ingredient_arg(" :2").is_err());
        assert!(parse_ingredient_arg("Tomato: ").is_err());
    }

    #[test]
    fn test_parse_shopping_ids() {
        let cli = Cli::try_parse_from(["recipebox", "shopping", "3", "1", "--json"]).unwrap();
        match cli.command {
            Commands::Shopping { ids, json } => {
                assert_eq!(ids, vec![3, 1]);
                assert!(json);
            }
            _ => panic!("expected shopping command"),
        }
    }

    #[test]
    fn test_parse_add_with_ingredients() {
        let cli = Cli::try_parse_from([
            "recipebox",
            "--data-file",
            "/tmp/r.json",
            "add",
            "--name",
            "Salad",
            "-i",
            "Tomato:2",
            "-i",
            "Onion:1",
        ])
        .unwrap();
        assert_eq!(cli.data_file, Some(PathBuf::from("/tmp/r.json")));
        match cli.command {
            Commands::Add {
                name, ingredients, ..
            } => {
                assert_eq!(name, "Salad");
                assert_eq!(ingredients.len(), 2);
            }
            _ => panic!("expected add command"),
        }
    }
}
