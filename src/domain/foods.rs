//! Foods commonly recommended for each deficiency class.

/// Foods for a deficiency label, matched loosely ("Vitamin D", "VITAMIN_D"
/// and "vitamin-d" all resolve to the same list). Unknown labels get an
/// empty list.
#[must_use]
pub fn recommended_foods(label: &str) -> &'static [&'static str] {
    let key: String = label
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect();

    match key.as_str() {
        "iron" => &["Spinach", "Lentils", "Pumpkin seeds", "Tofu", "Broccoli"],
        "b12" | "vitamin_b12" => &["Eggs", "Milk", "Yogurt", "Fish", "Fortified cereals"],
        "calcium" => &["Milk", "Cheese", "Yogurt", "Almonds", "Broccoli"],
        "vitamin_d" => &[
            "Mushrooms",
            "Salmon",
            "Egg yolk",
            "Fortified milk",
            "Cod liver oil",
        ],
        "zinc" => &["Chickpeas", "Cashews", "Pumpkin seeds", "Oats", "Yogurt"],
        "protein" => &["Paneer", "Eggs", "Chicken", "Lentils", "Greek yogurt"],
        _ => &[],
    }
}
