use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::Food;

pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
pub const KCAL_PER_G_CARBS: f64 = 4.0;
pub const KCAL_PER_G_FAT: f64 = 9.0;

/// Calories and macros (grams) for a concrete amount of food.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrients {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl Nutrients {
    /// Share of protein, carbs, and fat in total macro grams, as percentages.
    #[must_use]
    pub fn macro_split(&self) -> MacroSplit {
        let total = self.protein + self.carbs + self.fat;
        if total <= 0.0 {
            return MacroSplit::default();
        }
        MacroSplit {
            protein_pct: self.protein / total * 100.0,
            carbs_pct: self.carbs / total * 100.0,
            fat_pct: self.fat / total * 100.0,
        }
    }
}

impl Add for Nutrients {
    type Output = Nutrients;

    fn add(self, rhs: Nutrients) -> Nutrients {
        Nutrients {
            calories: self.calories + rhs.calories,
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fat: self.fat + rhs.fat,
        }
    }
}

impl AddAssign for Nutrients {
    fn add_assign(&mut self, rhs: Nutrients) {
        *self = *self + rhs;
    }
}

impl Sum for Nutrients {
    fn sum<I: Iterator<Item = Nutrients>>(iter: I) -> Nutrients {
        iter.fold(Nutrients::default(), Add::add)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MacroSplit {
    pub protein_pct: f64,
    pub carbs_pct: f64,
    pub fat_pct: f64,
}

fn check_grams(grams: f64) -> Result<(), EngineError> {
    if grams.is_nan() || grams.is_infinite() || grams < 0.0 {
        return Err(EngineError::InvalidQuantity { quantity: grams });
    }
    Ok(())
}

/// Scale a food's per-100g profile to `grams`. No rounding is applied.
pub fn scale(food: &Food, grams: f64) -> Result<Nutrients, EngineError> {
    check_grams(grams)?;
    let factor = grams / 100.0;
    Ok(Nutrients {
        calories: food.calories_per_100g * factor,
        protein: food.protein_per_100g * factor,
        carbs: food.carbs_per_100g * factor,
        fat: food.fat_per_100g * factor,
    })
}

pub fn scale_calories(food: &Food, grams: f64) -> Result<f64, EngineError> {
    check_grams(grams)?;
    Ok(food.calories_per_100g * grams / 100.0)
}
