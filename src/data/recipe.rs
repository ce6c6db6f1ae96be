//! Recipe models as returned by the Spoonacular search API
//!
//! The field names follow the API payload (camelCase), so a search response
//! deserializes straight into a [`RecipeResultSet`] and the same JSON shape is
//! used for the on-disk snapshot.

use serde::{Deserialize, Serialize};

/// A single ingredient line of a recipe
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtendedIngredient {
    /// Quantity of the ingredient
    pub amount: f64,
    /// Physical consistency ("solid", "liquid")
    pub consistency: Option<String>,
    /// Image file name on the Spoonacular CDN
    pub image: Option<String>,
    /// Ingredient name
    pub name: String,
    /// Original ingredient line as written in the source recipe
    pub original: String,
    /// Unit of the amount
    pub unit: String,
}

/// A recipe record
///
/// Opaque to the retrieval layer, which only passes whole result sets around.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Recipe {
    /// Spoonacular recipe id
    pub id: i64,
    /// Recipe title
    pub title: String,
    /// Image URL
    pub image: Option<String>,
    /// HTML summary text
    pub summary: String,
    /// Preparation time in minutes
    pub ready_in_minutes: u32,
    /// Number of likes
    pub aggregate_likes: u32,
    pub vegan: bool,
    pub vegetarian: bool,
    pub gluten_free: bool,
    pub dairy_free: bool,
    pub very_healthy: bool,
    pub cheap: bool,
    /// Name of the site the recipe comes from
    pub source_name: Option<String>,
    /// Link to the original recipe
    pub source_url: Option<String>,
    /// Ingredients, filled when `fillIngredients=true` is requested
    pub extended_ingredients: Vec<ExtendedIngredient>,
}

/// An ordered set of recipes produced by one query
///
/// Immutable once built: there are no mutating accessors, and a new fetch
/// replaces the whole set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeResultSet {
    #[serde(default)]
    results: Vec<Recipe>,
}

impl RecipeResultSet {
    /// Creates a result set from recipes in display order
    pub fn new(results: Vec<Recipe>) -> Self {
        Self { results }
    }

    /// An empty result set
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Recipe> {
        self.results.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Recipe> {
        self.results.get(index)
    }
}

impl FromIterator<Recipe> for RecipeResultSet {
    fn from_iter<I: IntoIterator<Item = Recipe>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RecipeResultSet {
    type Item = &'a Recipe;
    type IntoIter = std::slice::Iter<'a, Recipe>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_api_payload() {
        let json = r#"{
            "results": [
                {
                    "id": 716429,
                    "title": "Pasta with Garlic, Scallions, Cauliflower & Breadcrumbs",
                    "image": "https://spoonacular.com/recipeImages/716429-312x231.jpg",
                    "readyInMinutes": 45,
                    "aggregateLikes": 209,
                    "vegan": false,
                    "glutenFree": false,
                    "summary": "<b>Pasta</b> is a main course.",
                    "extendedIngredients": [
                        {"name": "butter", "amount": 1.0, "unit": "tbsp", "original": "1 tbsp butter"}
                    ],
                    "unknownField": 1
                }
            ],
            "offset": 0,
            "number": 1
        }"#;

        let set: RecipeResultSet = serde_json::from_str(json).expect("Failed to parse payload");

        assert_eq!(set.len(), 1);
        let recipe = set.get(0).unwrap();
        assert_eq!(recipe.id, 716429);
        assert_eq!(recipe.ready_in_minutes, 45);
        assert_eq!(recipe.aggregate_likes, 209);
        assert!(!recipe.dairy_free, "Missing booleans should default to false");
        assert!(recipe.source_url.is_none());
        assert_eq!(recipe.extended_ingredients[0].name, "butter");
        assert!(recipe.extended_ingredients[0].consistency.is_none());
    }

    #[test]
    fn test_missing_results_is_empty_set() {
        let set: RecipeResultSet = serde_json::from_str("{}").unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_order_is_preserved() {
        let set: RecipeResultSet = (1..=3)
            .map(|id| Recipe {
                id,
                ..Default::default()
            })
            .collect();

        let ids: Vec<i64> = set.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
