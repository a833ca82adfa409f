use anyhow::Context;
use tracing::{info, warn};

use crate::recipes::repo_types::{NewRecipe, RecipeFilter};
use crate::storage::NutritionStore;

const SAMPLE_RECIPES: &str = include_str!("../seed/recipes.json");

pub fn sample_recipes() -> anyhow::Result<Vec<NewRecipe>> {
    serde_json::from_str(SAMPLE_RECIPES).context("parse seed/recipes.json")
}

/// Loads the sample catalog into an empty store. Returns how many were inserted.
pub async fn seed_catalog(store: &dyn NutritionStore) -> anyhow::Result<usize> {
    if store.count_recipes(&RecipeFilter::default()).await? > 0 {
        warn!("catalog already contains recipes; skipping seed");
        return Ok(0);
    }
    let recipes = sample_recipes()?;
    for recipe in &recipes {
        store
            .insert_recipe(recipe)
            .await
            .with_context(|| format!("seed recipe '{}'", recipe.name))?;
    }
    info!(count = recipes.len(), "catalog seeded");
    Ok(recipes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;

    #[test]
    fn bundled_recipes_parse() {
        let recipes = sample_recipes().unwrap();
        assert_eq!(recipes.len(), 10);
        let toast = &recipes[0];
        assert_eq!(toast.name, "Avocado Toast with Poached Eggs");
        assert_eq!(toast.calories, 380.0);
        assert_eq!(toast.ingredients.len(), 5);
        assert_eq!(toast.tags, vec!["Vegetarian", "High-Protein", "Healthy-Fats"]);
        assert!(recipes.iter().all(|r| !r.instructions.is_empty()));
    }

    #[tokio::test]
    async fn seeding_runs_once() {
        let store = MemoryStore::new();
        assert_eq!(seed_catalog(&store).await.unwrap(), 10);
        assert_eq!(seed_catalog(&store).await.unwrap(), 0);
        assert_eq!(
            store.count_recipes(&RecipeFilter::default()).await.unwrap(),
            10
        );
    }
}
