/// Product catalog: the in-memory dataset the recommender queries.
///
/// Built once at startup from the store's documents and never mutated afterwards.
/// Document conversion is lenient: the store is loosely typed (numbers may arrive as
/// strings, lists as arrays or comma-joined text), and anything unreadable becomes
/// `None` rather than an error.
use std::collections::HashSet;

use mongodb::bson::{Bson, Document};
use tracing::{info, warn};

use food_common::error::CommonError;
use food_common::store::ProductStore;

use crate::model::Product;

/// Number of distinct countries offered as filter options.
pub const COUNTRY_OPTION_LIMIT: usize = 20;

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Fetch every product from the store.
    pub async fn load(store: &ProductStore) -> Result<Self, CommonError> {
        let documents = store.fetch_products().await?;
        let catalog = Self::from_documents(&documents);

        let without_ingredients = catalog
            .products
            .iter()
            .filter(|p| p.ingredients_text.is_none())
            .count();
        if catalog.is_empty() {
            warn!("product store returned no documents, every query will come back empty");
        } else if without_ingredients > 0 {
            warn!(
                without_ingredients,
                "products without ingredient text will never score above zero"
            );
        }
        info!(products = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    pub fn from_documents(documents: &[Document]) -> Self {
        Self::new(documents.iter().map(product_from_document).collect())
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Country names for the country selector.
    ///
    /// Takes the first `limit` distinct names in data order, then sorts them.
    pub fn country_options(&self, limit: usize) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut countries: Vec<String> = Vec::new();
        for name in self.products.iter().flat_map(Product::country_names) {
            if countries.len() == limit {
                break;
            }
            if seen.insert(name) {
                countries.push(name.to_string());
            }
        }
        countries.sort();
        countries
    }
}

/// Convert one projected store document into a `Product`.
pub fn product_from_document(doc: &Document) -> Product {
    Product {
        product_name: text_field(doc, "product_name"),
        brands: text_field(doc, "brands"),
        categories: text_field(doc, "categories"),
        countries: text_field(doc, "countries"),
        ingredients_text: text_field(doc, "ingredients_text"),
        allergens: text_field(doc, "allergens"),
        nutriscore_score: number_field(doc, "nutriscore_score"),
        nutriscore_grade: text_field(doc, "nutriscore_grade"),
        energy_100g: number_field(doc, "energy_100g"),
        fat_100g: number_field(doc, "fat_100g"),
        saturated_fat_100g: number_field(doc, "saturated-fat_100g"),
        carbohydrates_100g: number_field(doc, "carbohydrates_100g"),
        sugars_100g: number_field(doc, "sugars_100g"),
        fiber_100g: number_field(doc, "fiber_100g"),
        proteins_100g: number_field(doc, "proteins_100g"),
        salt_100g: number_field(doc, "salt_100g"),
        image_url: text_field(doc, "image_url"),
    }
}

fn text_field(doc: &Document, key: &str) -> Option<String> {
    let text = match doc.get(key)? {
        Bson::String(s) => s.clone(),
        Bson::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        Bson::Int32(n) => n.to_string(),
        Bson::Int64(n) => n.to_string(),
        Bson::Double(n) if n.is_finite() => n.to_string(),
        _ => return None,
    };
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn number_field(doc: &Document, key: &str) -> Option<f64> {
    let value = match doc.get(key)? {
        Bson::Double(n) => *n,
        Bson::Int32(n) => f64::from(*n),
        Bson::Int64(n) => *n as f64,
        Bson::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}
