use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RecommendProductsParams {
    /// Comma-separated ingredient list, e.g. "tomato, cheese, flour".
    pub ingredients: String,
    /// Keep only products sold in this country (case-insensitive substring). "Any" disables the filter.
    pub country: Option<String>,
    /// Keep only products with this nutrition grade (A-E). "Any" disables the filter.
    pub nutriscore: Option<String>,
    /// Allergens to exclude, e.g. ["gluten", "nuts"]. Products with unknown allergen data are kept.
    pub allergens: Option<Vec<String>>,
    /// Maximum number of results (default: 5, max: 50).
    pub top_n: Option<u32>,
    /// When no product matches the filters, re-run without filters and return a short preview.
    pub relax_if_empty: Option<bool>,
}

/// One recommended product. Field names follow the product store.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProductRow {
    pub product_name: Option<String>,
    pub brands: Option<String>,
    pub categories: Option<String>,
    pub countries: Option<String>,
    pub ingredients_text: Option<String>,
    pub allergens: Option<String>,
    pub nutriscore_score: Option<f64>,
    pub nutriscore_grade: Option<String>,
    pub energy_100g: Option<f64>,
    pub fat_100g: Option<f64>,
    #[serde(rename = "saturated-fat_100g")]
    pub saturated_fat_100g: Option<f64>,
    pub carbohydrates_100g: Option<f64>,
    pub sugars_100g: Option<f64>,
    pub fiber_100g: Option<f64>,
    pub proteins_100g: Option<f64>,
    pub salt_100g: Option<f64>,
    pub image_url: Option<String>,
    /// Cosine similarity to the query, in [0, 1].
    pub similarity: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecommendProductsResponse {
    /// Human-readable outcome, e.g. "Found 5 matches".
    pub message: String,
    /// True when the results come from a re-run with all filters cleared.
    pub relaxed: bool,
    /// Present when an allergen exclusion was applied.
    pub allergen_notice: Option<String>,
    pub results: Vec<ProductRow>,
    /// Markdown product cards, one per result.
    pub cards: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FilterOptionsResponse {
    pub countries: Vec<String>,
    pub nutriscores: Vec<String>,
    pub allergens: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExportRecommendationsResponse {
    pub file_name: String,
    pub mime_type: String,
    pub row_count: usize,
    /// True when the rows come from a re-run with all filters cleared.
    pub relaxed: bool,
    /// Delimited text, one header row followed by one row per product.
    pub content: String,
}
