use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::error::EngineError;
use crate::models::{FavoriteFood, Food};
use crate::nutrients;

/// Quick-add ordering: most used first, then most recently used, then oldest
/// favorite (lowest id) so equal records always come out in the same order.
#[must_use]
pub fn compare(a: &FavoriteFood, b: &FavoriteFood) -> Ordering {
    b.use_count
        .cmp(&a.use_count)
        .then_with(|| b.last_used.cmp(&a.last_used))
        .then_with(|| a.id.cmp(&b.id))
}

#[must_use]
pub fn rank(mut favorites: Vec<FavoriteFood>) -> Vec<FavoriteFood> {
    favorites.sort_by(compare);
    favorites
}

/// The `limit` highest-ranked favorites.
#[must_use]
pub fn top(favorites: Vec<FavoriteFood>, limit: usize) -> Vec<FavoriteFood> {
    let mut ranked = rank(favorites);
    ranked.truncate(limit);
    ranked
}

/// A ranked favorite ready for one-tap logging.
#[derive(Debug, Clone, Serialize)]
pub struct QuickAddItem {
    pub favorite: FavoriteFood,
    pub food: Food,
    pub quantity_g: f64,
    /// Calories for `quantity_g` of the food.
    pub calories: f64,
}

/// Join ranked favorites to their foods with a calorie preview. Favorites
/// whose food is not in `foods` are skipped.
pub fn quick_add_items(
    favorites: Vec<FavoriteFood>,
    foods: &[Food],
) -> Result<Vec<QuickAddItem>, EngineError> {
    let by_id: HashMap<i64, &Food> = foods.iter().map(|f| (f.id, f)).collect();
    let mut items = Vec::with_capacity(favorites.len());
    for favorite in rank(favorites) {
        let Some(food) = by_id.get(&favorite.food_id) else {
            continue;
        };
        let quantity_g = favorite.default_quantity_g;
        let calories = nutrients::scale_calories(food, quantity_g)?;
        items.push(QuickAddItem {
            food: (*food).clone(),
            favorite,
            quantity_g,
            calories,
        });
    }
    Ok(items)
}
