use anyhow::Context;
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::nutrition::Macros;

/// Storage shape of a recipe. The three sequences are JSON text.
#[derive(Debug, Clone, FromRow)]
pub struct RecipeRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub servings: i32,
    pub calories: f64,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fats: Option<f64>,
    pub fiber: Option<f64>,
    pub ingredients_json: String,
    pub instructions_json: String,
    pub tags_json: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub servings: i32,
    pub calories: f64,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fats: Option<f64>,
    pub fiber: Option<f64>,
    ingredients: Vec<String>,
    instructions: Vec<String>,
    tags: Vec<String>,
}

/// Recipe as it arrives from the seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRecipe {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub prep_time: Option<i32>,
    #[serde(default)]
    pub cook_time: Option<i32>,
    #[serde(default = "default_servings")]
    pub servings: i32,
    pub calories: f64,
    #[serde(default)]
    pub protein: Option<f64>,
    #[serde(default)]
    pub carbs: Option<f64>,
    #[serde(default)]
    pub fats: Option<f64>,
    #[serde(default)]
    pub fiber: Option<f64>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_servings() -> i32 {
    1
}

fn decode_list(blob: &str, field: &str) -> anyhow::Result<Vec<String>> {
    if blob.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(blob).with_context(|| format!("decode recipe {field}"))
}

fn encode_list(items: &[String]) -> anyhow::Result<String> {
    serde_json::to_string(items).context("encode recipe list")
}

impl Recipe {
    pub fn ingredients(&self) -> &[String] {
        &self.ingredients
    }

    pub fn instructions(&self) -> &[String] {
        &self.instructions
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Prep plus cook minutes, missing values counted as zero.
    pub fn total_time(&self) -> i32 {
        self.prep_time.unwrap_or(0) + self.cook_time.unwrap_or(0)
    }

    pub fn macros(&self) -> Macros {
        Macros::new(
            self.calories,
            self.protein.unwrap_or(0.0),
            self.carbs.unwrap_or(0.0),
            self.fats.unwrap_or(0.0),
        )
    }
}

impl TryFrom<RecipeRow> for Recipe {
    type Error = anyhow::Error;

    fn try_from(r: RecipeRow) -> anyhow::Result<Self> {
        Ok(Self {
            ingredients: decode_list(&r.ingredients_json, "ingredients")?,
            instructions: decode_list(&r.instructions_json, "instructions")?,
            tags: decode_list(&r.tags_json, "tags")?,
            id: r.id,
            name: r.name,
            description: r.description,
            image_url: r.image_url,
            category: r.category,
            prep_time: r.prep_time,
            cook_time: r.cook_time,
            servings: r.servings,
            calories: r.calories,
            protein: r.protein,
            carbs: r.carbs,
            fats: r.fats,
            fiber: r.fiber,
        })
    }
}

impl RecipeRow {
    pub fn encode(id: Uuid, r: &NewRecipe) -> anyhow::Result<Self> {
        Ok(Self {
            id,
            name: r.name.clone(),
            description: r.description.clone(),
            image_url: r.image_url.clone(),
            category: r.category.clone(),
            prep_time: r.prep_time,
            cook_time: r.cook_time,
            servings: r.servings,
            calories: r.calories,
            protein: r.protein,
            carbs: r.carbs,
            fats: r.fats,
            fiber: r.fiber,
            ingredients_json: encode_list(&r.ingredients)?,
            instructions_json: encode_list(&r.instructions)?,
            tags_json: encode_list(&r.tags)?,
        })
    }
}

/// Catalog predicate: exact category AND every tag present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeFilter {
    pub category: Option<String>,
    pub tags: Vec<String>,
}

impl RecipeFilter {
    pub fn new(category: Option<String>, tags: Vec<String>) -> Self {
        Self {
            category: category.filter(|c| !c.is_empty()),
            tags: tags.into_iter().filter(|t| !t.is_empty()).collect(),
        }
    }

    pub fn matches(&self, recipe: &Recipe) -> bool {
        let category_ok = match &self.category {
            Some(c) => recipe.category.as_deref() == Some(c.as_str()),
            None => true,
        };
        category_ok && self.tags.iter().all(|t| recipe.has_tag(t))
    }

    /// Tags as a JSON array, for a containment test against the stored blob.
    pub fn tags_json(&self) -> anyhow::Result<Option<String>> {
        if self.tags.is_empty() {
            return Ok(None);
        }
        encode_list(&self.tags).map(Some)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::NewRecipe;

    pub fn new_recipe(name: &str, category: &str, calories: f64, tags: &[&str]) -> NewRecipe {
        NewRecipe {
            name: name.to_string(),
            description: format!("{name} description"),
            image_url: None,
            category: Some(category.to_string()),
            prep_time: Some(5),
            cook_time: None,
            servings: 1,
            calories,
            protein: Some(10.0),
            carbs: Some(20.0),
            fats: None,
            fiber: None,
            ingredients: vec!["salt".into(), "pepper".into()],
            instructions: vec!["mix".into()],
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }
}
