/// Delimited-text export of a recommendation set.
///
/// One header row, then one row per product with every product field plus the
/// similarity score. Unknown values are written as empty cells.
use serde::Serialize;

use crate::error::AppError;
use crate::model::Recommendation;

pub const EXPORT_FILE_NAME: &str = "food_recommendations.csv";
pub const EXPORT_MIME_TYPE: &str = "text/csv";

const EXPORT_COLUMNS: [&str; 18] = [
    "product_name",
    "brands",
    "categories",
    "countries",
    "ingredients_text",
    "allergens",
    "nutriscore_score",
    "nutriscore_grade",
    "energy_100g",
    "fat_100g",
    "saturated-fat_100g",
    "carbohydrates_100g",
    "sugars_100g",
    "fiber_100g",
    "proteins_100g",
    "salt_100g",
    "image_url",
    "similarity",
];

#[derive(Serialize)]
struct ExportRow<'a> {
    product_name: Option<&'a str>,
    brands: Option<&'a str>,
    categories: Option<&'a str>,
    countries: Option<&'a str>,
    ingredients_text: Option<&'a str>,
    allergens: Option<&'a str>,
    nutriscore_score: Option<f64>,
    nutriscore_grade: Option<&'a str>,
    energy_100g: Option<f64>,
    fat_100g: Option<f64>,
    saturated_fat_100g: Option<f64>,
    carbohydrates_100g: Option<f64>,
    sugars_100g: Option<f64>,
    fiber_100g: Option<f64>,
    proteins_100g: Option<f64>,
    salt_100g: Option<f64>,
    image_url: Option<&'a str>,
    similarity: f32,
}

impl<'a> From<&Recommendation<'a>> for ExportRow<'a> {
    fn from(rec: &Recommendation<'a>) -> Self {
        let p = rec.product;
        Self {
            product_name: p.product_name.as_deref(),
            brands: p.brands.as_deref(),
            categories: p.categories.as_deref(),
            countries: p.countries.as_deref(),
            ingredients_text: p.ingredients_text.as_deref(),
            allergens: p.allergens.as_deref(),
            nutriscore_score: p.nutriscore_score,
            nutriscore_grade: p.nutriscore_grade.as_deref(),
            energy_100g: p.energy_100g,
            fat_100g: p.fat_100g,
            saturated_fat_100g: p.saturated_fat_100g,
            carbohydrates_100g: p.carbohydrates_100g,
            sugars_100g: p.sugars_100g,
            fiber_100g: p.fiber_100g,
            proteins_100g: p.proteins_100g,
            salt_100g: p.salt_100g,
            image_url: p.image_url.as_deref(),
            similarity: rec.similarity,
        }
    }
}

/// Render `recommendations` as CSV text. The header is written even for an empty set.
pub fn to_csv(recommendations: &[Recommendation<'_>]) -> Result<String, AppError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(EXPORT_COLUMNS)?;
    for rec in recommendations {
        writer.serialize(ExportRow::from(rec))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Export(format!("flushing csv failed: {e}")))?;
    String::from_utf8(bytes).map_err(|e| AppError::Export(format!("csv is not utf-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Product;

    #[test]
    fn empty_set_writes_header_only() {
        let csv = to_csv(&[]).expect("export");
        assert_eq!(csv.lines().count(), 1);
        assert!(csv.starts_with("product_name,brands,"));
        assert!(csv.trim_end().ends_with("image_url,similarity"));
    }

    #[test]
    fn rows_quote_free_text_and_leave_unknowns_empty() {
        let product = Product {
            product_name: Some("Pizza".to_string()),
            ingredients_text: Some("tomato, cheese, flour".to_string()),
            nutriscore_grade: Some("c".to_string()),
            energy_100g: Some(250.0),
            ..Default::default()
        };
        let recs = [Recommendation {
            product: &product,
            similarity: 0.5,
        }];
        let csv = to_csv(&recs).expect("export");

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let headers = reader.headers().expect("headers").clone();
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.expect("record")).collect();
        assert_eq!(records.len(), 1);

        let field = |name: &str| {
            let idx = headers.iter().position(|h| h == name).expect("column");
            records[0].get(idx).expect("cell").to_string()
        };
        assert_eq!(field("product_name"), "Pizza");
        assert_eq!(field("ingredients_text"), "tomato, cheese, flour");
        assert_eq!(field("brands"), "");
        assert_eq!(field("energy_100g"), "250.0");
        assert_eq!(field("saturated-fat_100g"), "");
        assert_eq!(field("similarity"), "0.5");
    }
}
