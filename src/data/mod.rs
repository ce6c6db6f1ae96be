//! Core data models for Foody
//!
//! This module contains the recipe payload types, the meal/diet filter
//! selection, and the query parameters sent to the recipe search API.

pub mod recipe;
pub mod spoonacular;

pub use recipe::{ExtendedIngredient, Recipe, RecipeResultSet};
pub use spoonacular::{FetchError, RecipeClient, RecipeSource};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Query key for the number of results
pub const QUERY_NUMBER: &str = "number";
/// Query key for the meal type filter
pub const QUERY_TYPE: &str = "type";
/// Query key for the diet filter
pub const QUERY_DIET: &str = "diet";
/// Query key asking the API to include full recipe information
pub const QUERY_ADD_RECIPE_INFORMATION: &str = "addRecipeInformation";
/// Query key asking the API to include ingredients
pub const QUERY_FILL_INGREDIENTS: &str = "fillIngredients";

/// Number of recipes requested per search
pub const DEFAULT_RECIPES_NUMBER: &str = "50";
pub const DEFAULT_MEAL_TYPE: &str = "main course";
pub const DEFAULT_DIET_TYPE: &str = "gluten free";

/// Meal types offered in the filter sheet; a type's id is its index here
pub const MEAL_TYPES: [&str; 14] = [
    "main course",
    "side dish",
    "dessert",
    "appetizer",
    "salad",
    "bread",
    "breakfast",
    "soup",
    "beverage",
    "sauce",
    "marinade",
    "fingerfood",
    "snack",
    "drink",
];

/// Diet types offered in the filter sheet; a type's id is its index here
pub const DIET_TYPES: [&str; 8] = [
    "gluten free",
    "ketogenic",
    "vegetarian",
    "vegan",
    "pescetarian",
    "paleo",
    "primal",
    "whole30",
];

/// The user's selected meal and diet type
///
/// Strings hold the chip text sent to the API, ids hold the chip position so
/// the filter sheet can restore its selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MealAndDietType {
    pub selected_meal_type: String,
    pub selected_meal_type_id: usize,
    pub selected_diet_type: String,
    pub selected_diet_type_id: usize,
}

impl Default for MealAndDietType {
    fn default() -> Self {
        Self {
            selected_meal_type: DEFAULT_MEAL_TYPE.to_string(),
            selected_meal_type_id: 0,
            selected_diet_type: DEFAULT_DIET_TYPE.to_string(),
            selected_diet_type_id: 0,
        }
    }
}

impl MealAndDietType {
    /// Builds a selection from chip positions in [`MEAL_TYPES`] and [`DIET_TYPES`]
    ///
    /// Returns `None` if either index is out of range.
    pub fn from_ids(meal_type_id: usize, diet_type_id: usize) -> Option<Self> {
        Some(Self {
            selected_meal_type: MEAL_TYPES.get(meal_type_id)?.to_string(),
            selected_meal_type_id: meal_type_id,
            selected_diet_type: DIET_TYPES.get(diet_type_id)?.to_string(),
            selected_diet_type_id: diet_type_id,
        })
    }
}

/// Looks up the chip position of a meal type (case-insensitive)
pub fn meal_type_id(name: &str) -> Option<usize> {
    let name = name.trim().to_lowercase();
    MEAL_TYPES.iter().position(|t| *t == name)
}

/// Looks up the chip position of a diet type (case-insensitive)
pub fn diet_type_id(name: &str) -> Option<usize> {
    let name = name.trim().to_lowercase();
    DIET_TYPES.iter().position(|t| *t == name)
}

/// Filter keys and values that fully determine one search request
///
/// Ordered so the generated URL is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParameters {
    params: BTreeMap<String, String>,
}

impl QueryParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a parameter, builder style
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Builds the search query for a meal/diet selection
pub fn apply_queries(selection: &MealAndDietType) -> QueryParameters {
    QueryParameters::new()
        .with(QUERY_NUMBER, DEFAULT_RECIPES_NUMBER)
        .with(QUERY_TYPE, selection.selected_meal_type.as_str())
        .with(QUERY_DIET, selection.selected_diet_type.as_str())
        .with(QUERY_ADD_RECIPE_INFORMATION, "true")
        .with(QUERY_FILL_INGREDIENTS, "true")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selection() {
        let selection = MealAndDietType::default();
        assert_eq!(selection.selected_meal_type, "main course");
        assert_eq!(selection.selected_diet_type, "gluten free");
        assert_eq!(selection.selected_meal_type_id, 0);
        assert_eq!(selection.selected_diet_type_id, 0);
    }

    #[test]
    fn test_apply_queries_default() {
        let query = apply_queries(&MealAndDietType::default());

        assert_eq!(query.get(QUERY_NUMBER), Some("50"));
        assert_eq!(query.get(QUERY_TYPE), Some("main course"));
        assert_eq!(query.get(QUERY_DIET), Some("gluten free"));
        assert_eq!(query.get(QUERY_ADD_RECIPE_INFORMATION), Some("true"));
        assert_eq!(query.get(QUERY_FILL_INGREDIENTS), Some("true"));
        assert_eq!(query.len(), 5);
    }

    #[test]
    fn test_apply_queries_uses_selection() {
        let selection = MealAndDietType::from_ids(2, 3).unwrap();
        let query = apply_queries(&selection);

        assert_eq!(query.get(QUERY_TYPE), Some("dessert"));
        assert_eq!(query.get(QUERY_DIET), Some("vegan"));
    }

    #[test]
    fn test_from_ids_out_of_range() {
        assert!(MealAndDietType::from_ids(MEAL_TYPES.len(), 0).is_none());
        assert!(MealAndDietType::from_ids(0, DIET_TYPES.len()).is_none());
    }

    #[test]
    fn test_type_id_lookup_is_case_insensitive() {
        assert_eq!(meal_type_id("Side Dish"), Some(1));
        assert_eq!(diet_type_id(" VEGAN "), Some(3));
        assert_eq!(meal_type_id("brunch"), None);
    }

    #[test]
    fn test_with_replaces_existing_key() {
        let query = QueryParameters::new()
            .with(QUERY_TYPE, "soup")
            .with(QUERY_TYPE, "salad");
        assert_eq!(query.get(QUERY_TYPE), Some("salad"));
        assert_eq!(query.len(), 1);
    }
}
