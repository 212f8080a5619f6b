/// Markdown rendering of recommendation cards.
///
/// Display is the only place where unknown values get substitutes. Numeric nutrients
/// fall back to 0 for the headline figures; allergen data that is missing is shown
/// as unknown, never as "none".
use crate::model::{NutritionGrade, Recommendation};

pub const UNKNOWN_ALLERGENS: &str = "Unknown (not declared in the product data)";

pub const ALLERGEN_POLICY_NOTICE: &str = "Allergen exclusion matches declared allergen text only. \
Products with no allergen information are kept, and a product that does not mention an \
allergen is not guaranteed to be free of it.";

/// Colored badge for a nutrition grade, e.g. "🟢 A". Unknown grades get a white dot.
pub fn nutriscore_badge(grade: Option<&str>) -> String {
    match grade.and_then(NutritionGrade::parse) {
        Some(g) => {
            let dot = match g {
                NutritionGrade::A | NutritionGrade::B => "🟢",
                NutritionGrade::C => "🟡",
                NutritionGrade::D => "🟠",
                NutritionGrade::E => "🔴",
            };
            format!("{dot} {}", g.letter())
        }
        None => format!("⚪ {}", grade.map(str::trim).filter(|g| !g.is_empty()).unwrap_or("N/A")),
    }
}

/// Image to show for a product: its own, or `default_image` when missing.
///
/// Stores exported from dataframes sometimes carry the literal text "nan".
pub fn card_image<'a>(image_url: Option<&'a str>, default_image: Option<&'a str>) -> Option<&'a str> {
    image_url
        .map(str::trim)
        .filter(|url| !url.is_empty() && !url.eq_ignore_ascii_case("nan"))
        .or(default_image)
}

pub fn render_card(rec: &Recommendation<'_>, default_image: Option<&str>) -> String {
    let product = rec.product;
    let name = product.product_name.as_deref().unwrap_or("Unnamed Product");
    let mut card = format!("### {name}\n\n");

    if let Some(image) = card_image(product.image_url.as_deref(), default_image) {
        card.push_str(&format!("![{name}]({image})\n\n"));
    }

    card.push_str(&format!(
        "**Brand:** {}\n\n",
        product.brands.as_deref().unwrap_or("N/A")
    ));
    card.push_str(&format!(
        "| Score | Energy | Protein | Match |\n|---|---|---|---|\n| {} | {:.0}kcal | {:.1}g | {:.0}% |\n\n",
        nutriscore_badge(product.nutriscore_grade.as_deref()),
        product.energy_100g.unwrap_or(0.0),
        product.proteins_100g.unwrap_or(0.0),
        rec.similarity * 100.0,
    ));
    card.push_str(&format!(
        "- **Ingredients:** {}\n",
        product.ingredients_text.as_deref().unwrap_or("Not specified")
    ));
    card.push_str(&format!(
        "- **Allergens:** {}\n",
        product.allergens.as_deref().unwrap_or(UNKNOWN_ALLERGENS)
    ));
    card.push_str(&format!(
        "- **Countries:** {}\n",
        product.countries.as_deref().unwrap_or("N/A")
    ));
    card
}
