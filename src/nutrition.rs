use serde::{Deserialize, Serialize};

pub const PROTEIN_KCAL_PER_G: f64 = 4.0;
pub const CARBS_KCAL_PER_G: f64 = 4.0;
pub const FATS_KCAL_PER_G: f64 = 9.0;

pub const FALLBACK_COLOR: &str = "#999999";

/// Calories and macro grams. Absent fields deserialize as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Macros {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl Macros {
    pub fn new(calories: f64, protein: f64, carbs: f64, fats: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fats,
        }
    }
}

impl std::ops::AddAssign for Macros {
    fn add_assign(&mut self, rhs: Self) {
        self.calories += rhs.calories;
        self.protein += rhs.protein;
        self.carbs += rhs.carbs;
        self.fats += rhs.fats;
    }
}

impl std::iter::Sum for Macros {
    fn sum<I: Iterator<Item = Macros>>(iter: I) -> Self {
        iter.fold(Macros::default(), |mut acc, m| {
            acc += m;
            acc
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MacroPercentages {
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

/// Share of calories contributed by a macro, plus its chart color.
#[derive(Debug, Clone, Serialize)]
pub struct MacroShare {
    pub grams: f64,
    pub percent: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct MacroBreakdown {
    pub protein: MacroShare,
    pub carbs: MacroShare,
    pub fats: MacroShare,
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

pub fn calories_from_macros(protein_g: f64, carbs_g: f64, fats_g: f64) -> f64 {
    protein_g * PROTEIN_KCAL_PER_G + carbs_g * CARBS_KCAL_PER_G + fats_g * FATS_KCAL_PER_G
}

/// Percent of total calories coming from each macro, one decimal place.
/// All zeros when there are no calories at all.
pub fn macro_percentages(protein_g: f64, carbs_g: f64, fats_g: f64) -> MacroPercentages {
    let protein_cals = protein_g * PROTEIN_KCAL_PER_G;
    let carbs_cals = carbs_g * CARBS_KCAL_PER_G;
    let fats_cals = fats_g * FATS_KCAL_PER_G;
    let total = protein_cals + carbs_cals + fats_cals;

    if total == 0.0 {
        return MacroPercentages::default();
    }

    MacroPercentages {
        protein: round1(protein_cals / total * 100.0),
        carbs: round1(carbs_cals / total * 100.0),
        fats: round1(fats_cals / total * 100.0),
    }
}

/// Goal minus consumed, field by field. Negative means the goal was exceeded.
pub fn remaining(consumed: &Macros, goals: &Macros) -> Macros {
    Macros {
        calories: goals.calories - consumed.calories,
        protein: goals.protein - consumed.protein,
        carbs: goals.carbs - consumed.carbs,
        fats: goals.fats - consumed.fats,
    }
}

pub fn macro_display_color(kind: &str) -> &'static str {
    match kind {
        "protein" => "#FF6384",
        "carbs" => "#36A2EB",
        "fats" => "#FFCE56",
        _ => FALLBACK_COLOR,
    }
}

pub fn macro_breakdown(m: &Macros) -> MacroBreakdown {
    let pct = macro_percentages(m.protein, m.carbs, m.fats);
    MacroBreakdown {
        protein: MacroShare {
            grams: m.protein,
            percent: pct.protein,
            color: macro_display_color("protein"),
        },
        carbs: MacroShare {
            grams: m.carbs,
            percent: pct.carbs,
            color: macro_display_color("carbs"),
        },
        fats: MacroShare {
            grams: m.fats,
            percent: pct.fats,
            color: macro_display_color("fats"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_macros_give_zero_percentages() {
        assert_eq!(macro_percentages(0.0, 0.0, 0.0), MacroPercentages::default());
    }

    #[test]
    fn percentages_for_known_recipe() {
        // 18g protein, 35g carbs, 20g fats -> 72 + 140 + 180 = 392 kcal
        let p = macro_percentages(18.0, 35.0, 20.0);
        assert_eq!(p.protein, 18.4);
        assert_eq!(p.carbs, 35.7);
        assert_eq!(p.fats, 45.9);
    }

    #[test]
    fn calories_use_fixed_factors() {
        assert_eq!(calories_from_macros(10.0, 20.0, 5.0), 40.0 + 80.0 + 45.0);
        assert_eq!(calories_from_macros(0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn remaining_can_go_negative() {
        let goals = Macros::new(2000.0, 150.0, 200.0, 65.0);
        let consumed = Macros::new(2100.0, 100.0, 50.0, 70.0);
        let r = remaining(&consumed, &goals);
        assert_eq!(r, Macros::new(-100.0, 50.0, 150.0, -5.0));
    }

    #[test]
    fn remaining_treats_missing_fields_as_zero() {
        let consumed: Macros = serde_json::from_str(r#"{"calories": 380}"#).unwrap();
        let goals: Macros = serde_json::from_str(r#"{"calories": 2000, "protein": 150}"#).unwrap();
        let r = remaining(&consumed, &goals);
        assert_eq!(r, Macros::new(1620.0, 150.0, 0.0, 0.0));
    }

    #[test]
    fn colors_with_fallback() {
        assert_eq!(macro_display_color("protein"), "#FF6384");
        assert_eq!(macro_display_color("carbs"), "#36A2EB");
        assert_eq!(macro_display_color("fats"), "#FFCE56");
        assert_eq!(macro_display_color("fiber"), FALLBACK_COLOR);
        assert_eq!(macro_display_color(""), FALLBACK_COLOR);
    }

    #[test]
    fn breakdown_pairs_percent_and_color() {
        let b = macro_breakdown(&Macros::new(380.0, 18.0, 35.0, 20.0));
        assert_eq!(b.fats.percent, 45.9);
        assert_eq!(b.fats.color, "#FFCE56");
        assert_eq!(b.protein.grams, 18.0);
    }

    #[test]
    fn macros_sum() {
        let total: Macros = vec![
            Macros::new(380.0, 18.0, 35.0, 20.0),
            Macros::new(420.0, 45.0, 25.0, 15.0),
        ]
        .into_iter()
        .sum();
        assert_eq!(total, Macros::new(800.0, 63.0, 60.0, 35.0));
    }

    proptest! {
        #[test]
        fn percentages_sum_to_one_hundred(
            p in 0.0f64..500.0,
            c in 0.0f64..500.0,
            f in 0.0f64..500.0,
        ) {
            prop_assume!(p > 0.0 || c > 0.0 || f > 0.0);
            let pct = macro_percentages(p, c, f);
            let sum = pct.protein + pct.carbs + pct.fats;
            prop_assert!((sum - 100.0).abs() <= 0.150_001, "sum was {}", sum);
        }

        #[test]
        fn calories_match_formula(
            p in 0.0f64..500.0,
            c in 0.0f64..500.0,
            f in 0.0f64..500.0,
        ) {
            prop_assert_eq!(calories_from_macros(p, c, f), 4.0 * p + 4.0 * c + 9.0 * f);
        }
    }
}
