/// Read-only MongoDB wrapper over the products collection.
///
/// The store is read once at startup. Documents come back with a fixed projection
/// (every field the recommender filters on or displays, `_id` excluded); converting
/// them into typed products is left to the caller, which must tolerate missing fields.
use std::time::Duration;

use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::error::ErrorKind;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use tracing::info;

use crate::error::CommonError;

/// Product fields fetched from the store, in display order.
pub const PRODUCT_FIELDS: &[&str] = &[
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
];

pub struct ProductStore {
    collection: Collection<Document>,
}

impl ProductStore {
    /// Connect to the store and verify it answers a `ping`.
    ///
    /// `timeout` bounds server selection, so an unreachable host fails with
    /// `CommonError::Connectivity` instead of hanging.
    pub async fn connect(
        uri: &str,
        database: &str,
        collection: &str,
        timeout: Duration,
    ) -> Result<Self, CommonError> {
        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|e| CommonError::Connectivity(format!("invalid store uri: {e}")))?;
        options.server_selection_timeout = Some(timeout);
        options.app_name = Some("food-recommender".to_string());

        let client = Client::with_options(options)
            .map_err(|e| CommonError::Connectivity(format!("client creation failed: {e}")))?;
        let db = client.database(database);
        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| CommonError::Connectivity(format!("ping failed: {e}")))?;

        info!(database, collection, "document store connected");
        Ok(Self {
            collection: db.collection(collection),
        })
    }

    /// Fetch every product document with the fixed field projection.
    ///
    /// Documents are returned in the order the store yields them; that order is the
    /// tie-break order for equal similarity scores downstream.
    pub async fn fetch_products(&self) -> Result<Vec<Document>, CommonError> {
        let cursor = self
            .collection
            .find(doc! {})
            .projection(product_projection())
            .await
            .map_err(read_error)?;
        let documents: Vec<Document> = cursor.try_collect().await.map_err(read_error)?;
        info!(count = documents.len(), "product documents fetched");
        Ok(documents)
    }
}

/// Classify a read failure: losing the server is a connectivity failure, anything
/// else is reported as a store error.
fn read_error(e: mongodb::error::Error) -> CommonError {
    if matches!(
        e.kind.as_ref(),
        ErrorKind::ServerSelection { .. } | ErrorKind::Io(_)
    ) {
        CommonError::Connectivity(format!("read failed: {e}"))
    } else {
        CommonError::Store(e)
    }
}

/// Projection document selecting `PRODUCT_FIELDS` and excluding `_id`.
pub fn product_projection() -> Document {
    let mut projection = Document::new();
    for field in PRODUCT_FIELDS {
        projection.insert(*field, 1);
    }
    projection.insert("_id", 0);
    projection
}
