use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::Macros;

pub const DEFAULT_CALORIE_GOAL: f64 = 2000.0;
pub const DEFAULT_PROTEIN_GOAL: f64 = 150.0;
pub const DEFAULT_CARBS_GOAL: f64 = 200.0;
pub const DEFAULT_FATS_GOAL: f64 = 65.0;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub calorie_goal: f64,
    pub protein_goal: f64,
    pub carbs_goal: f64,
    pub fats_goal: f64,
    #[serde(skip_serializing)]
    pub created_at: OffsetDateTime,
}

impl User {
    /// A user with the default goals, not yet persisted.
    pub fn with_defaults(username: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            calorie_goal: DEFAULT_CALORIE_GOAL,
            protein_goal: DEFAULT_PROTEIN_GOAL,
            carbs_goal: DEFAULT_CARBS_GOAL,
            fats_goal: DEFAULT_FATS_GOAL,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn goals(&self) -> Macros {
        Macros::new(
            self.calorie_goal,
            self.protein_goal,
            self.carbs_goal,
            self.fats_goal,
        )
    }
}
