use crate::models::Food;

/// Case-insensitive substring match against a food's name and, when set, its
/// alias. An empty query matches every food.
///
/// Lowercasing uses Unicode default case mapping, so the result does not
/// depend on the process locale ("PHỞ" matches "phở").
#[must_use]
pub fn matches(food: &Food, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    if food.name.to_lowercase().contains(&needle) {
        return true;
    }
    food.alias
        .as_deref()
        .filter(|alias| !alias.is_empty())
        .is_some_and(|alias| alias.to_lowercase().contains(&needle))
}

/// Foods matching `query`, sorted by name.
#[must_use]
pub fn filter_foods<'a, I>(foods: I, query: &str) -> Vec<&'a Food>
where
    I: IntoIterator<Item = &'a Food>,
{
    let mut found: Vec<&Food> = foods.into_iter().filter(|f| matches(f, query)).collect();
    found.sort_by(|a, b| a.name.cmp(&b.name));
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn food(name: &str, alias: Option<&str>) -> Food {
        Food {
            id: 1,
            name: name.to_string(),
            calories_per_100g: 100.0,
            protein_per_100g: 0.0,
            carbs_per_100g: 0.0,
            fat_per_100g: 0.0,
            category: "other".to_string(),
            is_custom: false,
            alias: alias.map(str::to_string),
            serving_size: 100.0,
            serving_unit: "g".to_string(),
        }
    }

    #[test]
    fn test_matches_alias_case_insensitive() {
        let pho = food("Phở bò", Some("pho, bun"));
        assert!(matches(&pho, "PHO"));
        assert!(matches(&pho, "bun"));
        assert!(!matches(&pho, "xyz"));
    }

    #[test]
    fn test_empty_query_matches_everything() {
        assert!(matches(&food("Phở bò", None), ""));
        assert!(matches(&food("", None), ""));
    }

    #[test]
    fn test_matches_vietnamese_name() {
        let pho = food("Phở bò", None);
        assert!(matches(&pho, "PHỞ"));
        assert!(matches(&pho, "phở b"));
        assert!(matches(&pho, "Ở BÒ"));
        // No alias, so unaccented text does not match the accented name
        assert!(!matches(&pho, "pho"));
    }

    #[test]
    fn test_empty_alias_is_ignored() {
        let rice = food("Cơm trắng", Some(""));
        assert!(!matches(&rice, "com"));
        assert!(matches(&rice, "CƠM"));
    }

    #[test]
    fn test_filter_foods_sorted() {
        let foods = vec![
            food("Phở gà", Some("pho")),
            food("Bún chả", Some("bun")),
            food("Phở bò", Some("pho, bun")),
        ];
        let names: Vec<&str> = filter_foods(&foods, "pho")
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["Phở bò", "Phở gà"]);

        assert_eq!(filter_foods(&foods, "").len(), 3);
        assert!(filter_foods(&foods, "xyz").is_empty());
    }
}
