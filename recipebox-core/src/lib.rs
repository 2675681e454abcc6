pub mod book;
pub mod error;
pub mod normalize;
pub mod quantity_parser;
pub mod shopping_list;
pub mod store;
pub mod types;

pub use book::RecipeBook;
pub use error::{AggregateError, RecipeError, StoreError};
pub use normalize::{display_name, normalize_name};
pub use quantity_parser::{format_amount, parse_quantity, ParsedQuantity, Quantity};
pub use shopping_list::{
    aggregate, aggregate_from, LineQuantity, RecipeSource, ShoppingList, ShoppingListLine,
};
pub use store::{JsonStore, RecipeFile};
pub use types::{IngredientEntry, NewRecipe, Recipe, RecipeId};
