/// Recommendation engine.
///
/// Holds the catalog, the fitted vectorizer and the synonym table as one immutable
/// service object built at startup. A query canonicalizes its ingredients, applies the
/// filters as independent masks, scores the survivors by cosine similarity and keeps
/// the best `top_n`. Query-time state is local to the call, so a shared reference can
/// serve any number of concurrent requests.
use std::cmp::Ordering;

use tracing::debug;

use food_common::assets::ModelAssets;

use crate::catalog::Catalog;
use crate::model::{Product, Recommendation};
use crate::synonyms::SynonymMap;
use crate::vectorizer::{cosine_similarity, SparseVector, TfidfVectorizer};

pub const DEFAULT_TOP_N: usize = 5;

/// Optional product filters, ANDed together.
///
/// All matches are case-insensitive substring tests on free text, which is imprecise:
/// a product whose allergen field does not mention an allergen is not thereby
/// guaranteed free of it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    /// Keep products whose country list contains this text. Missing country excludes.
    pub country: Option<String>,
    /// Keep products whose grade equals this letter. Missing grade excludes.
    pub nutriscore: Option<String>,
    /// Drop products whose allergen text contains any of these.
    /// Missing allergen data is unknown and passes.
    pub allergens: Vec<String>,
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        active(&self.country).is_none()
            && active(&self.nutriscore).is_none()
            && !self.excludes_allergens()
    }

    /// True when at least one allergen exclusion is in effect.
    pub fn excludes_allergens(&self) -> bool {
        self.active_allergens().next().is_some()
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.country_matches(product) && self.grade_matches(product) && self.allergens_match(product)
    }

    fn country_matches(&self, product: &Product) -> bool {
        match active(&self.country) {
            None => true,
            Some(country) => product
                .countries
                .as_deref()
                .is_some_and(|countries| contains_ignore_case(countries, country)),
        }
    }

    fn grade_matches(&self, product: &Product) -> bool {
        match active(&self.nutriscore) {
            None => true,
            Some(grade) => product
                .nutriscore_grade
                .as_deref()
                .is_some_and(|g| g.to_lowercase() == grade.to_lowercase()),
        }
    }

    fn allergens_match(&self, product: &Product) -> bool {
        let Some(declared) = product.allergens.as_deref() else {
            return true;
        };
        self.active_allergens()
            .all(|allergen| !contains_ignore_case(declared, allergen))
    }

    fn active_allergens(&self) -> impl Iterator<Item = &str> {
        self.allergens
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationQuery {
    /// Raw ingredient tokens, in the order the user gave them.
    pub ingredients: Vec<String>,
    pub filters: Filters,
    pub top_n: usize,
}

impl RecommendationQuery {
    pub fn new(ingredients: Vec<String>) -> Self {
        Self {
            ingredients,
            filters: Filters::default(),
            top_n: DEFAULT_TOP_N,
        }
    }

    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// The same query with every filter cleared.
    pub fn relaxed(&self) -> Self {
        Self {
            filters: Filters::default(),
            ..self.clone()
        }
    }
}

pub struct Recommender {
    catalog: Catalog,
    synonyms: SynonymMap,
    vectorizer: TfidfVectorizer,
    /// Row `i` is the vectorized ingredient text of catalog product `i`.
    product_vectors: Vec<SparseVector>,
}

impl Recommender {
    /// Fit the vectorizer on the catalog and precompute every product vector.
    pub fn new(catalog: Catalog, assets: &ModelAssets) -> Self {
        let texts: Vec<&str> = catalog
            .products()
            .iter()
            .map(|p| p.ingredients_text.as_deref().unwrap_or(""))
            .collect();
        let vectorizer = TfidfVectorizer::fit(&assets.vocab, &texts);
        let product_vectors = vectorizer.transform_many(&texts);
        let synonyms = SynonymMap::new(&assets.synonyms);

        debug!(
            products = catalog.len(),
            dimensions = vectorizer.dimensions(),
            synonyms = synonyms.len(),
            "recommender ready"
        );

        Self {
            catalog,
            synonyms,
            vectorizer,
            product_vectors,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Canonical query string for a list of raw ingredients.
    pub fn normalize_query<S: AsRef<str>>(&self, ingredients: &[S]) -> String {
        self.synonyms.normalize_query(ingredients)
    }

    /// Top `query.top_n` products by similarity, best first.
    ///
    /// Equal scores keep catalog order. An empty filtered set yields an empty result.
    pub fn get_recommendations(&self, query: &RecommendationQuery) -> Vec<Recommendation<'_>> {
        let query_text = self.normalize_query(&query.ingredients);
        let query_vector = self.vectorizer.transform(&query_text);

        let mut scored: Vec<(usize, f32)> = self
            .catalog
            .products()
            .iter()
            .enumerate()
            .filter(|(_, product)| query.filters.matches(product))
            .map(|(i, _)| (i, cosine_similarity(&query_vector, &self.product_vectors[i])))
            .collect();
        let survivors = scored.len();

        // Stable sort keeps catalog order among ties.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(query.top_n);

        debug!(
            query = %query_text,
            filters = ?query.filters,
            survivors,
            returned = scored.len(),
            "recommendation computed"
        );

        scored
            .into_iter()
            .map(|(i, similarity)| Recommendation {
                product: &self.catalog.products()[i],
                similarity,
            })
            .collect()
    }
}

/// A filter value that is present and non-blank.
fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    pub(crate) fn product(
        name: &str,
        ingredients: Option<&str>,
        countries: Option<&str>,
        grade: Option<&str>,
        allergens: Option<&str>,
    ) -> Product {
        Product {
            product_name: Some(name.to_string()),
            ingredients_text: ingredients.map(str::to_string),
            countries: countries.map(str::to_string),
            nutriscore_grade: grade.map(str::to_string),
            allergens: allergens.map(str::to_string),
            ..Default::default()
        }
    }

    pub(crate) fn fixture_assets() -> ModelAssets {
        let vocab = ["tomato", "cheese", "flour", "peanut", "milk", "sugar", "salt", "oil"]
            .iter()
            .map(|t| t.to_string())
            .collect();
        let synonyms = HashMap::from([
            ("tomatoes".to_string(), "tomato".to_string()),
            ("groundnut".to_string(), "peanut".to_string()),
        ]);
        ModelAssets { vocab, synonyms }
    }

    pub(crate) fn fixture_catalog() -> Catalog {
        Catalog::new(vec![
            product("Pizza", Some("tomato, cheese, flour, oil"), Some("France, Italy"), Some("c"), Some("en:gluten,en:milk")),
            product("Tomato sauce", Some("tomato, salt, oil"), Some("Italy"), Some("a"), None),
            product("Peanut butter", Some("peanut, salt, sugar"), Some("United States"), Some("d"), Some("en:nuts,en:peanuts")),
            product("Groundnut snack", Some("peanut, oil, salt"), None, Some("c"), Some("")),
            product("Cheese plate", Some("cheese, milk, salt"), Some("France"), None, Some("en:milk")),
            product("Crackers", Some("flour, oil, salt"), Some("Germany, France"), Some("B"), Some("en:gluten")),
            product("Mystery box", None, Some("France"), Some("e"), None),
        ])
    }

    fn recommender() -> Recommender {
        Recommender::new(fixture_catalog(), &fixture_assets())
    }

    fn names(recs: &[Recommendation<'_>]) -> Vec<String> {
        recs.iter()
            .map(|r| r.product.product_name.clone().unwrap_or_default())
            .collect()
    }

    fn query(ingredients: &[&str]) -> RecommendationQuery {
        RecommendationQuery::new(ingredients.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn unfiltered_result_size_is_min_of_top_n_and_catalog() {
        let engine = recommender();
        assert_eq!(engine.get_recommendations(&query(&["tomato"])).len(), 5);
        assert_eq!(
            engine.get_recommendations(&query(&["tomato"]).with_top_n(100)).len(),
            engine.catalog().len()
        );
        assert!(engine.get_recommendations(&query(&["tomato"]).with_top_n(0)).is_empty());
    }

    #[test]
    fn scores_are_bounded_and_descending() {
        let engine = recommender();
        let recs = engine.get_recommendations(&query(&["tomato", "cheese", "flour"]));
        assert!(recs.len() <= 5);
        assert_eq!(recs[0].product.product_name.as_deref(), Some("Pizza"));
        for pair in recs.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity);
        }
        for rec in &recs {
            assert!((0.0..=1.0 + 1e-6).contains(&rec.similarity));
        }
    }

    #[test]
    fn ties_keep_catalog_order() {
        let engine = recommender();
        // Nothing matches the vocabulary, so every product scores zero.
        let recs = engine.get_recommendations(&query(&["basil"]).with_top_n(3));
        assert_eq!(names(&recs), vec!["Pizza", "Tomato sauce", "Peanut butter"]);
        assert!(recs.iter().all(|r| r.similarity == 0.0));
    }

    #[test]
    fn synonyms_are_applied_before_vectorizing() {
        let engine = recommender();
        assert_eq!(engine.normalize_query(&["Tomatoes", "GroundNut"]), "tomato peanut");
        let recs = engine.get_recommendations(&query(&["groundnut"]).with_top_n(2));
        // Sugar is rarer than oil, so peanut carries less of the peanut butter vector.
        assert_eq!(names(&recs), vec!["Groundnut snack", "Peanut butter"]);
        assert!(recs[0].similarity > 0.0);
    }

    #[test]
    fn country_filter_is_case_insensitive_substring() {
        let engine = recommender();
        let filters = Filters {
            country: Some("fRaNcE".to_string()),
            ..Default::default()
        };
        let recs = engine.get_recommendations(&query(&["tomato"]).with_filters(filters).with_top_n(10));
        assert_eq!(recs.len(), 4);
        for rec in &recs {
            let countries = rec.product.countries.as_deref().expect("country present");
            assert!(countries.to_lowercase().contains("france"));
        }
    }

    #[test]
    fn nutriscore_filter_requires_matching_grade() {
        let engine = recommender();
        let filters = Filters {
            nutriscore: Some("A".to_string()),
            ..Default::default()
        };
        let recs = engine.get_recommendations(&query(&["tomato"]).with_filters(filters));
        assert_eq!(names(&recs), vec!["Tomato sauce"]);
        for rec in &recs {
            assert!(rec.product.nutriscore_grade.as_deref().unwrap().eq_ignore_ascii_case("a"));
        }

        let filters = Filters {
            nutriscore: Some("b".to_string()),
            ..Default::default()
        };
        let recs = engine.get_recommendations(&query(&["flour"]).with_filters(filters));
        assert_eq!(names(&recs), vec!["Crackers"]);
    }

    #[test]
    fn allergen_exclusion_drops_declared_and_keeps_unknown() {
        let engine = recommender();
        let filters = Filters {
            allergens: vec!["nuts".to_string()],
            ..Default::default()
        };
        let recs = engine.get_recommendations(&query(&["peanut"]).with_filters(filters).with_top_n(10));
        let returned = names(&recs);
        assert!(!returned.contains(&"Peanut butter".to_string()));
        assert!(returned.contains(&"Groundnut snack".to_string()));
        assert!(returned.contains(&"Tomato sauce".to_string()));
        for rec in &recs {
            if let Some(allergens) = rec.product.allergens.as_deref() {
                assert!(!allergens.to_lowercase().contains("nuts"));
            }
        }
    }

    #[test]
    fn multiple_allergens_are_all_excluded() {
        let engine = recommender();
        let filters = Filters {
            allergens: vec!["Gluten".to_string(), "milk".to_string(), " ".to_string()],
            ..Default::default()
        };
        let recs = engine.get_recommendations(&query(&["cheese"]).with_filters(filters).with_top_n(10));
        assert_eq!(
            names(&recs),
            vec!["Tomato sauce", "Peanut butter", "Groundnut snack", "Mystery box"]
        );
    }

    #[test]
    fn missing_fields_exclude_under_country_and_grade_filters() {
        let engine = recommender();
        let filters = Filters {
            country: Some("a".to_string()),
            nutriscore: Some("c".to_string()),
            ..Default::default()
        };
        let recs = engine.get_recommendations(&query(&["peanut"]).with_filters(filters).with_top_n(10));
        assert_eq!(names(&recs), vec!["Pizza"]);
    }

    #[test]
    fn filters_matching_nothing_return_empty() {
        let engine = recommender();
        let filters = Filters {
            country: Some("Atlantis".to_string()),
            ..Default::default()
        };
        let q = query(&["tomato"]).with_filters(filters);
        assert!(engine.get_recommendations(&q).is_empty());
        assert!(!engine.get_recommendations(&q.relaxed()).is_empty());
    }

    #[test]
    fn blank_filters_are_inactive() {
        let filters = Filters {
            country: Some("  ".to_string()),
            nutriscore: Some(String::new()),
            allergens: vec![String::new()],
        };
        assert!(filters.is_empty());
        assert!(filters.matches(&Product::default()));
    }
}
