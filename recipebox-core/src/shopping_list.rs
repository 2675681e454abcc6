//! Shopping list aggregation.
//!
//! Merges the ingredient entries of several recipes into one list. Entries are
//! grouped by normalized ingredient name; parsed quantities are summed per
//! exact unit, and quantities that could not be parsed are carried through
//! verbatim on a separate line so nothing is lost.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::error::AggregateError;
use crate::normalize::{display_name, normalize_name};
use crate::quantity_parser::{format_amount, parse_quantity, ParsedQuantity, Quantity};
use crate::types::{Recipe, RecipeId};

/// Read access to stored recipes, as needed by the aggregation engine.
pub trait RecipeSource {
    fn get_by_id(&self, id: RecipeId) -> Option<&Recipe>;
}

impl RecipeSource for [Recipe] {
    fn get_by_id(&self, id: RecipeId) -> Option<&Recipe> {
        self.iter().find(|recipe| recipe.id == id)
    }
}

/// What a shopping list line asks the user to buy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineQuantity {
    /// Sum of every parsed entry sharing this ingredient and unit.
    Total { amount: f64, unit: Option<String> },
    /// Quantity texts that could not be parsed, in encounter order.
    Fragments { fragments: Vec<String> },
}

/// One line of a shopping list. An ingredient gets one line per unit plus at
/// most one line of unparsable fragments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShoppingListLine {
    /// Canonical grouping key (normalized ingredient name).
    pub key: String,
    pub ingredient_name: String,
    #[serde(flatten)]
    pub quantity: LineQuantity,
    /// Number of ingredient entries merged into this line.
    pub entries: usize,
}

impl fmt::Display for ShoppingListLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.quantity {
            LineQuantity::Total { amount, unit } => write!(
                f,
                "{}: {}{}",
                self.ingredient_name,
                format_amount(*amount),
                unit.as_deref().unwrap_or("")
            ),
            LineQuantity::Fragments { fragments } => {
                let joined = fragments
                    .iter()
                    .map(|fragment| fragment.trim())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{}: {}", self.ingredient_name, joined)
            }
        }
    }
}

/// Ordered result of an aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShoppingList {
    pub lines: Vec<ShoppingListLine>,
}

impl ShoppingList {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct ingredients (an ingredient may span several lines).
    pub fn ingredient_count(&self) -> usize {
        self.lines
            .iter()
            .map(|line| line.key.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Number of ingredient entries that went into the list.
    pub fn total_entries(&self) -> usize {
        self.lines.iter().map(|line| line.entries).sum()
    }

    /// Rendered lines, one string per line.
    pub fn render_lines(&self) -> Vec<String> {
        self.lines.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for ShoppingList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shopping List:")?;
        if self.lines.is_empty() {
            return write!(f, "\n(empty)");
        }
        for line in &self.lines {
            write!(f, "\n- {}", line)?;
        }
        Ok(())
    }
}

/// Running sum for one (ingredient, unit) pair.
struct UnitTotal {
    unit: Option<String>,
    amount: f64,
    entries: usize,
}

/// Everything collected for one canonical ingredient name.
struct IngredientGroup {
    key: String,
    display: String,
    totals: Vec<UnitTotal>,
    fragments: Vec<String>,
}

impl IngredientGroup {
    fn new(key: String) -> Self {
        let display = display_name(&key);
        Self {
            key,
            display,
            totals: Vec::new(),
            fragments: Vec::new(),
        }
    }

    /// Fold one quantity text into the group. A parsed amount that would push
    /// its unit total past the largest finite value is kept as a fragment.
    fn add(&mut self, raw: &str) {
        match parse_quantity(raw) {
            Quantity::Parsed(ParsedQuantity { amount, unit }) => {
                match self.totals.iter_mut().find(|total| total.unit == unit) {
                    Some(total) => {
                        let sum = total.amount + amount;
                        if sum.is_finite() {
                            total.amount = sum;
                            total.entries += 1;
                        } else {
                            tracing::warn!(key = %self.key, raw, "quantity total overflows, keeping as text");
                            self.fragments.push(raw.to_string());
                        }
                    }
                    None => self.totals.push(UnitTotal {
                        unit,
                        amount,
                        entries: 1,
                    }),
                }
            }
            Quantity::Unparsable(raw) => self.fragments.push(raw),
        }
    }

    fn into_lines(self) -> impl Iterator<Item = ShoppingListLine> {
        let Self {
            key,
            display,
            totals,
            fragments,
        } = self;

        let mut lines: Vec<ShoppingListLine> = totals
            .into_iter()
            .map(|total| ShoppingListLine {
                key: key.clone(),
                ingredient_name: display.clone(),
                quantity: LineQuantity::Total {
                    amount: total.amount,
                    unit: total.unit,
                },
                entries: total.entries,
            })
            .collect();

        if !fragments.is_empty() {
            lines.push(ShoppingListLine {
                key,
                ingredient_name: display,
                entries: fragments.len(),
                quantity: LineQuantity::Fragments { fragments },
            });
        }

        lines.into_iter()
    }
}

/// Build a shopping list from `recipes` for the recipes named in `selected`.
///
/// Every selected id must resolve; otherwise the call fails with
/// [`AggregateError::RecipeNotFound`] listing all unresolved ids and no
/// partial list is produced. Repeated ids are counted once. An empty
/// selection yields an empty list.
pub fn aggregate(
    recipes: &[Recipe],
    selected: &[RecipeId],
) -> Result<ShoppingList, AggregateError> {
    aggregate_from(recipes, selected)
}

/// Same as [`aggregate`], reading recipes through any [`RecipeSource`].
pub fn aggregate_from<S>(source: &S, selected: &[RecipeId]) -> Result<ShoppingList, AggregateError>
where
    S: RecipeSource + ?Sized,
{
    let recipes = resolve(source, selected)?;

    let mut groups: Vec<IngredientGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for recipe in &recipes {
        for entry in &recipe.ingredients {
            let key = normalize_name(&entry.name);
            let idx = match index.get(&key) {
                Some(&idx) => idx,
                None => {
                    groups.push(IngredientGroup::new(key.clone()));
                    index.insert(key, groups.len() - 1);
                    groups.len() - 1
                }
            };
            groups[idx].add(&entry.quantity);
        }
    }

    let lines: Vec<ShoppingListLine> = groups
        .into_iter()
        .flat_map(IngredientGroup::into_lines)
        .collect();

    tracing::debug!(
        recipes = recipes.len(),
        lines = lines.len(),
        "aggregated shopping list"
    );

    Ok(ShoppingList { lines })
}

/// Resolve the selection in order, dropping repeats.
fn resolve<'a, S>(source: &'a S, selected: &[RecipeId]) -> Result<Vec<&'a Recipe>, AggregateError>
where
    S: RecipeSource + ?Sized,
{
    let mut seen = HashSet::new();
    let mut recipes = Vec::with_capacity(selected.len());
    let mut missing = Vec::new();

    for &id in selected {
        if !seen.insert(id) {
            continue;
        }
        match source.get_by_id(id) {
            Some(recipe) => recipes.push(recipe),
            None => missing.push(id),
        }
    }

    if !missing.is_empty() {
        return Err(AggregateError::RecipeNotFound { ids: missing });
    }

    Ok(recipes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IngredientEntry;

    fn recipe(id: RecipeId, ingredients: &[(&str, &str)]) -> Recipe {
        Recipe {
            id,
            name: format!("Recipe {}", id),
            ingredients: ingredients
                .iter()
                .map(|(name, quantity)| IngredientEntry::new(*name, *quantity))
                .collect(),
            steps: String::new(),
            favorite: false,
            category: None,
        }
    }

    #[test]
    fn test_end_to_end_example() {
        let recipes = vec![
            recipe(1, &[("Tomato", "2"), ("Onion", "1")]),
            recipe(2, &[("Tomato", "2"), ("Olive Oil", "100 ml")]),
        ];
        let list = aggregate(&recipes, &[1, 2]).unwrap();
        assert_eq!(
            list.render_lines(),
            vec!["Tomato: 4", "Onion: 1", "Olive Oil: 100ml"]
        );
    }

    #[test]
    fn test_empty_selection_is_empty_list() {
        let recipes = vec![recipe(1, &[("Tomato", "2")])];
        let list = aggregate(&recipes, &[]).unwrap();
        assert!(list.is_empty());
        assert_eq!(list.to_string(), "Shopping List:\n(empty)");
    }

    #[test]
    fn test_missing_recipe_fails_without_partial_output() {
        let recipes = vec![recipe(1, &[("Tomato", "2")])];
        let err = aggregate(&recipes, &[1, 9, 4, 9]).unwrap_err();
        assert_eq!(err, AggregateError::RecipeNotFound { ids: vec![9, 4] });
        assert_eq!(err.to_string(), "Recipe not found: 9, 4");
    }

    #[test]
    fn test_case_and_whitespace_variants_merge() {
        let recipes = vec![
            recipe(1, &[("Tomato", "2")]),
            recipe(2, &[(" tomato ", "3"), ("TOMATO", "1")]),
        ];
        let list = aggregate(&recipes, &[1, 2]).unwrap();
        assert_eq!(list.render_lines(), vec!["Tomato: 6"]);
        assert_eq!(list.lines[0].entries, 3);
    }

    #[test]
    fn test_display_name_comes_from_first_occurrence() {
        let recipes = vec![
            recipe(1, &[("olive   OIL", "1 tbsp")]),
            recipe(2, &[("Olive Oil", "2 tbsp")]),
        ];
        let list = aggregate(&recipes, &[1, 2]).unwrap();
        assert_eq!(list.render_lines(), vec!["Olive Oil: 3tbsp"]);
    }

    #[test]
    fn test_different_units_never_merge() {
        let recipes = vec![
            recipe(1, &[("Tomato", "2")]),
            recipe(2, &[("Tomato", "200g"), ("Tomato", "1 kg")]),
        ];
        let list = aggregate(&recipes, &[1, 2]).unwrap();
        assert_eq!(
            list.render_lines(),
            vec!["Tomato: 2", "Tomato: 200g", "Tomato: 1kg"]
        );
        assert_eq!(list.ingredient_count(), 1);
    }

    #[test]
    fn test_unparsable_quantity_becomes_fragment() {
        let recipes = vec![recipe(1, &[("Salt", "a pinch")])];
        let list = aggregate(&recipes, &[1]).unwrap();
        assert_eq!(list.render_lines(), vec!["Salt: a pinch"]);
        assert_eq!(
            list.lines[0].quantity,
            LineQuantity::Fragments {
                fragments: vec!["a pinch".to_string()]
            }
        );
    }

    #[test]
    fn test_numeric_total_and_fragments_stay_separate() {
        let recipes = vec![
            recipe(1, &[("Salt", "a pinch"), ("Pepper", "1 tsp")]),
            recipe(2, &[("salt", "2 tsp"), ("Salt", "to taste")]),
        ];
        let list = aggregate(&recipes, &[1, 2]).unwrap();
        assert_eq!(
            list.render_lines(),
            vec!["Salt: 2tsp", "Salt: a pinch, to taste", "Pepper: 1tsp"]
        );
    }

    #[test]
    fn test_fragments_keep_original_text() {
        let recipes = vec![recipe(1, &[("Basil", " a few leaves ")])];
        let list = aggregate(&recipes, &[1]).unwrap();
        assert_eq!(
            list.lines[0].quantity,
            LineQuantity::Fragments {
                fragments: vec![" a few leaves ".to_string()]
            }
        );
        assert_eq!(list.render_lines(), vec!["Basil: a few leaves"]);
    }

    #[test]
    fn test_overflowing_total_keeps_entry_as_fragment() {
        let huge = format!("1{}", "0".repeat(308));
        let recipes = vec![
            recipe(1, &[("Flour", huge.as_str())]),
            recipe(2, &[("flour", huge.as_str())]),
        ];
        let list = aggregate(&recipes, &[1, 2]).unwrap();

        assert_eq!(list.lines.len(), 2);
        assert_eq!(
            list.lines[0].quantity,
            LineQuantity::Total {
                amount: 1e308,
                unit: None
            }
        );
        assert_eq!(
            list.lines[1].quantity,
            LineQuantity::Fragments {
                fragments: vec![huge.clone()]
            }
        );
        assert_eq!(list.total_entries(), 2);
        assert!(list.render_lines().iter().all(|line| !line.contains("inf")));
    }

    #[test]
    fn test_duplicates_within_one_recipe_each_count() {
        let recipes = vec![recipe(1, &[("Egg", "2"), ("Egg", "1")])];
        let list = aggregate(&recipes, &[1]).unwrap();
        assert_eq!(list.render_lines(), vec!["Egg: 3"]);
    }

    #[test]
    fn test_order_follows_selection_order() {
        let recipes = vec![
            recipe(1, &[("Onion", "1")]),
            recipe(2, &[("Garlic", "2 cloves"), ("Onion", "1")]),
        ];
        let list = aggregate(&recipes, &[2, 1]).unwrap();
        assert_eq!(list.render_lines(), vec!["Garlic: 2cloves", "Onion: 2"]);
    }

    #[test]
    fn test_repeated_selection_counts_once() {
        let recipes = vec![recipe(1, &[("Tomato", "2")])];
        let list = aggregate(&recipes, &[1, 1]).unwrap();
        assert_eq!(list.render_lines(), vec!["Tomato: 2"]);
    }

    #[test]
    fn test_fractional_sums_are_formatted() {
        let recipes = vec![
            recipe(1, &[("Sugar", "1/2 cup")]),
            recipe(2, &[("Sugar", "1/4 cup")]),
        ];
        let list = aggregate(&recipes, &[1, 2]).unwrap();
        assert_eq!(list.render_lines(), vec!["Sugar: 0.75cup"]);
    }

    #[test]
    fn test_recipe_without_ingredients_contributes_nothing() {
        let recipes = vec![recipe(1, &[]), recipe(2, &[("Milk", "1 l")])];
        let list = aggregate(&recipes, &[1, 2]).unwrap();
        assert_eq!(list.render_lines(), vec!["Milk: 1l"]);
    }

    #[test]
    fn test_no_entry_is_dropped() {
        let recipes = vec![
            recipe(1, &[("Tomato", "2"), ("Salt", "a pinch"), ("Flour", "200g")]),
            recipe(2, &[("tomato", "200g"), ("Salt", "1 tsp"), ("Flour", "")]),
        ];
        let list = aggregate(&recipes, &[1, 2]).unwrap();
        assert_eq!(list.total_entries(), 6);
        assert_eq!(list.ingredient_count(), 3);
    }

    #[test]
    fn test_aggregation_is_repeatable_and_leaves_input_untouched() {
        let recipes = vec![
            recipe(1, &[("Tomato", "2"), ("Salt", "a pinch")]),
            recipe(2, &[("Tomato", "2")]),
        ];
        let before = recipes.clone();
        let first = aggregate(&recipes, &[1, 2]).unwrap();
        let second = aggregate(&recipes, &[1, 2]).unwrap();
        assert_eq!(first, second);
        assert_eq!(recipes, before);
    }

    #[test]
    fn test_list_display() {
        let recipes = vec![recipe(1, &[("Tomato", "2"), ("Salt", "a pinch")])];
        let list = aggregate(&recipes, &[1]).unwrap();
        assert_eq!(
            list.to_string(),
            "Shopping List:\n- Tomato: 2\n- Salt: a pinch"
        );
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let recipes = vec![recipe(1, &[("Tomato", "200g")])];
        let list = aggregate(&recipes, &[1]).unwrap();
        let value = serde_json::to_value(&list).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "lines": [{
                    "key": "tomato",
                    "ingredient_name": "Tomato",
                    "kind": "total",
                    "amount": 200.0,
                    "unit": "g",
                    "entries": 1
                }]
            })
        );
    }
}
