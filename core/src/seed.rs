//! Built-in catalog inserted on first migration.

/// name, kcal, protein, carbs, fat (per 100 g), category, alias
pub(crate) type SeedFood = (
    &'static str,
    f64,
    f64,
    f64,
    f64,
    &'static str,
    &'static str,
);

pub(crate) const FOODS: &[SeedFood] = &[
    ("Cơm trắng", 130.0, 2.7, 28.0, 0.3, "com", "com trang, rice"),
    ("Cơm rang", 180.0, 4.0, 25.0, 7.0, "com", "com rang, fried rice"),
    ("Phở bò", 450.0, 20.0, 60.0, 12.0, "pho", "pho bo, pho, bun"),
    ("Phở gà", 380.0, 18.0, 55.0, 8.0, "pho", "pho ga, pho"),
    ("Bún bò Huế", 480.0, 22.0, 58.0, 15.0, "bun", "bun bo hue, bun"),
    ("Bún chả", 550.0, 25.0, 50.0, 25.0, "bun", "bun cha, bun"),
    ("Bánh mì thịt", 350.0, 15.0, 40.0, 14.0, "banh", "banh mi"),
    ("Bánh cuốn", 180.0, 6.0, 28.0, 5.0, "banh", "banh cuon"),
    ("Xôi xéo", 280.0, 6.0, 45.0, 8.0, "xoi", "xoi xeo, xoi"),
    ("Thịt heo luộc", 250.0, 27.0, 0.0, 15.0, "thit", "thit heo, pork"),
    ("Thịt bò xào", 280.0, 26.0, 3.0, 18.0, "thit", "thit bo, beef"),
    ("Thịt gà luộc", 165.0, 31.0, 0.0, 3.6, "thit", "thit ga, chicken"),
    ("Cá kho", 180.0, 22.0, 3.0, 9.0, "hai_san", "ca kho, fish"),
    ("Tôm luộc", 99.0, 21.0, 0.2, 1.0, "hai_san", "tom luoc, shrimp"),
    ("Rau muống xào", 80.0, 3.0, 4.0, 6.0, "rau", "rau muong"),
    ("Đậu phụ chiên", 180.0, 12.0, 5.0, 13.0, "rau", "dau phu, tofu"),
    ("Trứng luộc", 155.0, 13.0, 1.1, 11.0, "trung", "trung luoc, egg"),
    ("Trứng chiên", 196.0, 14.0, 1.0, 15.0, "trung", "trung chien, egg"),
    ("Cà phê sữa đá", 120.0, 2.0, 18.0, 4.0, "do_uong", "ca phe sua, coffee"),
    ("Trà sữa trân châu", 300.0, 2.0, 50.0, 10.0, "do_uong", "tra sua, bubble tea"),
    ("Nước cam", 45.0, 0.7, 10.0, 0.2, "do_uong", "nuoc cam, orange juice"),
    ("Gỏi cuốn (2 cuốn)", 150.0, 8.0, 20.0, 4.0, "an_vat", "goi cuon, spring roll"),
    ("Chả giò (2 cuốn)", 180.0, 6.0, 15.0, 11.0, "an_vat", "cha gio, nem"),
    ("Chuối", 89.0, 1.1, 23.0, 0.3, "trai_cay", "chuoi, banana"),
    ("Xoài", 60.0, 0.8, 15.0, 0.4, "trai_cay", "xoai, mango"),
];

/// name, kcal per unit, unit, category
pub(crate) const WORKOUTS: &[(&str, f64, &str, &str)] = &[
    ("Chạy bộ", 10.0, "min", "cardio"),
    ("Đi bộ nhanh", 5.0, "min", "cardio"),
    ("Đạp xe", 8.0, "min", "cardio"),
    ("Bơi lội", 11.0, "min", "cardio"),
    ("Nhảy dây", 12.0, "min", "cardio"),
    ("Chạy bộ (km)", 60.0, "km", "cardio"),
    ("Đi bộ (km)", 40.0, "km", "cardio"),
    ("Tập gym", 6.0, "min", "strength"),
    ("Plank", 5.0, "min", "strength"),
    ("Hít đất", 0.5, "reps", "strength"),
    ("Squat", 0.3, "reps", "strength"),
    ("Yoga", 4.0, "min", "flexibility"),
    ("Cầu lông", 7.0, "min", "cardio"),
];
