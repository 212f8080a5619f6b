/// MCP server for food recommendations.
///
/// Exposes three tools:
/// - `recommend_products`: Ingredient-similarity recommendations with optional filters
/// - `list_filter_options`: Countries, nutrition grades and allergens to offer as filters
/// - `export_recommendations`: The same recommendations as downloadable CSV text
use std::sync::Arc;

use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use tracing::info;

use crate::catalog::COUNTRY_OPTION_LIMIT;
use crate::config::MAX_TOP_N;
use crate::display::{render_card, ALLERGEN_POLICY_NOTICE};
use crate::error::AppError;
use crate::export::{to_csv, EXPORT_FILE_NAME, EXPORT_MIME_TYPE};
use crate::model::{NutritionGrade, Recommendation};
use crate::recommend::{Filters, RecommendationQuery, Recommender};
use food_common::mcp_api::{
    ExportRecommendationsResponse, FilterOptionsResponse, ProductRow, RecommendProductsParams,
    RecommendProductsResponse,
};

/// Allergens offered in the exclusion selector.
pub const ALLERGEN_OPTIONS: [&str; 5] = ["gluten", "milk", "nuts", "soy", "eggs"];

/// Results shown when a query is re-run with its filters cleared.
const RELAXED_PREVIEW: usize = 3;

const EMPTY_INGREDIENTS: &str = "Please enter at least one ingredient";
const NO_MATCHES: &str = "No products found. Try relaxing your filters.";
const RELAXED_MATCHES: &str =
    "No products found with these filters. Here are similar products without filters.";

/// Outcome of one query, before conversion to the wire types.
struct QueryOutcome<'a> {
    query: RecommendationQuery,
    recommendations: Vec<Recommendation<'a>>,
    relaxed: bool,
}

#[derive(Clone)]
pub struct FoodRecommenderServer {
    recommender: Arc<Recommender>,
    default_image_url: Option<String>,
    default_top_n: usize,
    tool_router: ToolRouter<FoodRecommenderServer>,
}

impl FoodRecommenderServer {
    pub fn new(
        recommender: Arc<Recommender>,
        default_image_url: Option<String>,
        default_top_n: usize,
    ) -> Self {
        Self {
            recommender,
            default_image_url,
            default_top_n,
            tool_router: Self::tool_router(),
        }
    }

    fn build_query(&self, params: &RecommendProductsParams) -> Result<RecommendationQuery, AppError> {
        let ingredients = parse_ingredient_list(&params.ingredients);
        if ingredients.is_empty() {
            return Err(AppError::Validation(EMPTY_INGREDIENTS.to_string()));
        }

        let filters = Filters {
            country: filter_value(params.country.as_deref()),
            nutriscore: filter_value(params.nutriscore.as_deref()),
            allergens: params.allergens.clone().unwrap_or_default(),
        };
        let top_n = params
            .top_n
            .map(|n| (n as usize).clamp(1, MAX_TOP_N))
            .unwrap_or(self.default_top_n);

        Ok(RecommendationQuery::new(ingredients)
            .with_filters(filters)
            .with_top_n(top_n))
    }

    fn run_query(&self, params: &RecommendProductsParams) -> Result<QueryOutcome<'_>, AppError> {
        let query = self.build_query(params)?;
        let recommendations = self.recommender.get_recommendations(&query);

        let wants_relaxed = params.relax_if_empty.unwrap_or(false);
        if recommendations.is_empty() && wants_relaxed && !query.filters.is_empty() {
            info!(filters = ?query.filters, "no matches, re-running without filters");
            let relaxed_query = query.relaxed().with_top_n(query.top_n.min(RELAXED_PREVIEW));
            let recommendations = self.recommender.get_recommendations(&relaxed_query);
            return Ok(QueryOutcome {
                query,
                recommendations,
                relaxed: true,
            });
        }

        Ok(QueryOutcome {
            query,
            recommendations,
            relaxed: false,
        })
    }

    pub fn recommend(
        &self,
        params: &RecommendProductsParams,
    ) -> Result<RecommendProductsResponse, AppError> {
        let outcome = self.run_query(params)?;

        let message = match (outcome.recommendations.len(), outcome.relaxed) {
            (0, _) => NO_MATCHES.to_string(),
            (_, true) => RELAXED_MATCHES.to_string(),
            (1, false) => "Found 1 match".to_string(),
            (n, false) => format!("Found {n} matches"),
        };
        let allergen_notice = outcome
            .query
            .filters
            .excludes_allergens()
            .then(|| ALLERGEN_POLICY_NOTICE.to_string());

        let default_image = self.default_image_url.as_deref();
        Ok(RecommendProductsResponse {
            message,
            relaxed: outcome.relaxed,
            allergen_notice,
            results: outcome.recommendations.iter().map(to_api_product).collect(),
            cards: outcome
                .recommendations
                .iter()
                .map(|rec| render_card(rec, default_image))
                .collect(),
        })
    }

    pub fn filter_options(&self) -> FilterOptionsResponse {
        FilterOptionsResponse {
            countries: self
                .recommender
                .catalog()
                .country_options(COUNTRY_OPTION_LIMIT),
            nutriscores: NutritionGrade::ALL
                .iter()
                .map(|g| g.letter().to_string())
                .collect(),
            allergens: ALLERGEN_OPTIONS.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn export(
        &self,
        params: &RecommendProductsParams,
    ) -> Result<ExportRecommendationsResponse, AppError> {
        let outcome = self.run_query(params)?;
        let content = to_csv(&outcome.recommendations)?;
        Ok(ExportRecommendationsResponse {
            file_name: EXPORT_FILE_NAME.to_string(),
            mime_type: EXPORT_MIME_TYPE.to_string(),
            row_count: outcome.recommendations.len(),
            relaxed: outcome.relaxed,
            content,
        })
    }
}

#[tool_router]
impl FoodRecommenderServer {
    #[tool(description = "Recommend food products whose ingredients resemble a comma-separated ingredient list. Optional filters: country, nutrition grade (A-E) and allergens to exclude. Products with unknown allergen data are not excluded.")]
    async fn recommend_products(
        &self,
        Parameters(params): Parameters<RecommendProductsParams>,
    ) -> Result<Json<RecommendProductsResponse>, String> {
        self.recommend(&params)
            .map(Json)
            .map_err(|e| format!("recommendation failed: {e}"))
    }

    #[tool(description = "List the values accepted by the recommend_products filters: countries present in the catalog, nutrition grades and common allergens.")]
    async fn list_filter_options(&self) -> Result<Json<FilterOptionsResponse>, String> {
        Ok(Json(self.filter_options()))
    }

    #[tool(description = "Run the same query as recommend_products and return the results as CSV text suitable for download.")]
    async fn export_recommendations(
        &self,
        Parameters(params): Parameters<RecommendProductsParams>,
    ) -> Result<Json<ExportRecommendationsResponse>, String> {
        self.export(&params)
            .map(Json)
            .map_err(|e| format!("export failed: {e}"))
    }
}

/// Split the comma-separated form input into trimmed, non-empty ingredients.
pub fn parse_ingredient_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// A selector value, or `None` for blank and "Any".
fn filter_value(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("any"))
        .map(str::to_string)
}

fn to_api_product(rec: &Recommendation<'_>) -> ProductRow {
    let p = rec.product;
    ProductRow {
        product_name: p.product_name.clone(),
        brands: p.brands.clone(),
        categories: p.categories.clone(),
        countries: p.countries.clone(),
        ingredients_text: p.ingredients_text.clone(),
        allergens: p.allergens.clone(),
        nutriscore_score: p.nutriscore_score,
        nutriscore_grade: p.nutriscore_grade.clone(),
        energy_100g: p.energy_100g,
        fat_100g: p.fat_100g,
        saturated_fat_100g: p.saturated_fat_100g,
        carbohydrates_100g: p.carbohydrates_100g,
        sugars_100g: p.sugars_100g,
        fiber_100g: p.fiber_100g,
        proteins_100g: p.proteins_100g,
        salt_100g: p.salt_100g,
        image_url: p.image_url.clone(),
        similarity: rec.similarity,
    }
}

#[tool_handler]
impl ServerHandler for FoodRecommenderServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            server_info: Implementation {
                name: "food-recommender".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Food product recommender. Use list_filter_options to discover filter values, \
                 recommend_products with a comma-separated ingredient list to find similar \
                 products, and export_recommendations to get the same results as CSV. \
                 Allergen exclusion only matches declared allergen text; products without \
                 allergen data are kept."
                    .to_string(),
            ),
        }
    }
}
