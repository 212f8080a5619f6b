/// A product record from the store.
///
/// Every field may be absent. `None` means "unknown" and is never read as zero;
/// only the display layer substitutes explicit fallbacks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Product {
    pub product_name: Option<String>,
    pub brands: Option<String>,
    /// Comma-separated category list as stored.
    pub categories: Option<String>,
    /// Comma-separated country list as stored, e.g. "France, Germany".
    pub countries: Option<String>,
    pub ingredients_text: Option<String>,
    pub allergens: Option<String>,
    pub nutriscore_score: Option<f64>,
    /// Grade letter as stored (the store uses lowercase, e.g. "a").
    pub nutriscore_grade: Option<String>,
    pub energy_100g: Option<f64>,
    pub fat_100g: Option<f64>,
    pub saturated_fat_100g: Option<f64>,
    pub carbohydrates_100g: Option<f64>,
    pub sugars_100g: Option<f64>,
    pub fiber_100g: Option<f64>,
    pub proteins_100g: Option<f64>,
    pub salt_100g: Option<f64>,
    pub image_url: Option<String>,
}

impl Product {
    /// Individual country names from the comma-separated country field.
    pub fn country_names(&self) -> impl Iterator<Item = &str> {
        self.countries
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// Nutrition grade letter, A (best) through E (worst).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NutritionGrade {
    A,
    B,
    C,
    D,
    E,
}

impl NutritionGrade {
    pub const ALL: [NutritionGrade; 5] = [Self::A, Self::B, Self::C, Self::D, Self::E];

    /// Parse a grade letter, case-insensitive. Anything else is unknown.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            "E" => Some(Self::E),
            _ => None,
        }
    }

    pub fn letter(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
        }
    }
}

/// A product that survived filtering, with its similarity to the query.
#[derive(Debug, Clone, Copy)]
pub struct Recommendation<'a> {
    pub product: &'a Product,
    /// Cosine similarity in [0, 1].
    pub similarity: f32,
}
